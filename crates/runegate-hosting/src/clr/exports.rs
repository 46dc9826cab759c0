//! Raw export signatures and string encoding for the runtime hosting
//! libraries.
//!
//! The discovery library (`nethost`) and the hosting library (`hostfxr`)
//! publish C entry points; the function typedefs here mirror their published
//! signatures. Hosting-library exports use the C calling convention, while
//! the discovery export and the delegates handed back by the runtime use the
//! platform's system convention.
//!
//! Native strings are UTF-16 on Windows and UTF-8 elsewhere; [`CharT`] and
//! the `to_native`/`path_to_native`/`from_native` helpers cover both.

use std::ffi::c_void;
use std::path::Path;

/// Native character unit of the hosting contract.
#[cfg(windows)]
pub type CharT = u16;

/// Native character unit of the hosting contract.
#[cfg(not(windows))]
pub type CharT = std::os::raw::c_char;

/// Buffer capacity, in `CharT` units, handed to the discovery export.
pub const DISCOVERY_PATH_CAPACITY: usize = 260;

/// Capability tag requesting the get-function-pointer delegate.
pub const HDT_GET_FUNCTION_POINTER: i32 = 6;

/// Capability tag requesting the load-assembly delegate.
pub const HDT_LOAD_ASSEMBLY: i32 = 7;

/// `get_hostfxr_path` export of the discovery library.
///
/// Writes the hosting library path into `buffer`; `buffer_size` is in/out in
/// `CharT` units. A null `parameters` pointer selects default discovery.
pub type GetHostPathFn = unsafe extern "system" fn(
    buffer: *mut CharT,
    buffer_size: *mut usize,
    parameters: *const c_void,
) -> i32;

/// `hostfxr_initialize_for_runtime_config` export.
pub type InitializeForConfigFn = unsafe extern "C" fn(
    runtime_config_path: *const CharT,
    parameters: *const c_void,
    host_context_handle: *mut *mut c_void,
) -> u32;

/// `hostfxr_get_runtime_delegate` export.
pub type GetRuntimeDelegateFn = unsafe extern "C" fn(
    host_context_handle: *const c_void,
    delegate_type: i32,
    delegate: *mut *mut c_void,
) -> u32;

/// Callback receiving runtime diagnostic text.
pub type ErrorWriterFn = unsafe extern "C" fn(message: *const CharT);

/// `hostfxr_set_error_writer` export; returns the previously registered
/// writer, if any.
pub type SetErrorWriterFn =
    unsafe extern "C" fn(error_writer: Option<ErrorWriterFn>) -> Option<ErrorWriterFn>;

/// `hostfxr_close` export. Resolved to honor the hosting contract; never
/// called, because the runtime does not support being unloaded.
pub type CloseFn = unsafe extern "C" fn(host_context_handle: *const c_void) -> u32;

/// Load-assembly delegate obtained from the initialized runtime.
pub type LoadAssemblyFn = unsafe extern "system" fn(
    assembly_path: *const CharT,
    load_context: *mut c_void,
    reserved: *mut c_void,
) -> u32;

/// Get-function-pointer delegate obtained from the initialized runtime.
pub type GetFunctionPointerFn = unsafe extern "system" fn(
    type_name: *const CharT,
    method_name: *const CharT,
    delegate_type_name: *const CharT,
    load_context: *mut c_void,
    reserved: *mut c_void,
    delegate: *mut *mut c_void,
) -> u32;

/// Component entry point produced by the get-function-pointer delegate
/// with a null delegate-type name.
pub type ComponentEntryPointFn =
    unsafe extern "system" fn(args: *mut c_void, size_bytes: i32) -> i32;

/// Encodes text as a NUL-terminated native string.
#[cfg(windows)]
pub fn to_native(text: &str) -> Vec<CharT> {
    text.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Encodes text as a NUL-terminated native string.
#[cfg(not(windows))]
pub fn to_native(text: &str) -> Vec<CharT> {
    text.bytes()
        .map(|b| b as CharT)
        .chain(std::iter::once(0))
        .collect()
}

/// Encodes a filesystem path as a NUL-terminated native string.
#[cfg(windows)]
pub fn path_to_native(path: &Path) -> Vec<CharT> {
    use std::os::windows::ffi::OsStrExt;
    path.as_os_str()
        .encode_wide()
        .chain(std::iter::once(0))
        .collect()
}

/// Encodes a filesystem path as a NUL-terminated native string.
#[cfg(not(windows))]
pub fn path_to_native(path: &Path) -> Vec<CharT> {
    use std::os::unix::ffi::OsStrExt;
    path.as_os_str()
        .as_bytes()
        .iter()
        .map(|&b| b as CharT)
        .chain(std::iter::once(0))
        .collect()
}

/// Decodes a native string buffer up to its first NUL.
pub fn buffer_to_string(buffer: &[CharT]) -> String {
    let end = buffer.iter().position(|&c| c == 0).unwrap_or(buffer.len());
    decode(&buffer[..end])
}

/// Decodes a NUL-terminated native string pointer. Null yields an empty
/// string.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated native string.
pub unsafe fn from_native(ptr: *const CharT) -> String {
    if ptr.is_null() {
        return String::new();
    }
    let mut len = 0usize;
    while *ptr.add(len) != 0 {
        len += 1;
    }
    decode(std::slice::from_raw_parts(ptr, len))
}

#[cfg(windows)]
fn decode(units: &[CharT]) -> String {
    String::from_utf16_lossy(units)
}

#[cfg(not(windows))]
fn decode(units: &[CharT]) -> String {
    let bytes: Vec<u8> = units.iter().map(|&c| c as u8).collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_native_terminates() {
        let encoded = to_native("mods");
        assert_eq!(encoded.len(), 5);
        assert_eq!(encoded[4], 0);
    }

    #[test]
    fn test_string_roundtrip() {
        let encoded = to_native("Sample.Greeter, Greeter");
        assert_eq!(buffer_to_string(&encoded), "Sample.Greeter, Greeter");
    }

    #[test]
    fn test_path_roundtrip() {
        let encoded = path_to_native(Path::new("runegate/mods/Greeter/Greeter.dll"));
        assert_eq!(
            buffer_to_string(&encoded),
            "runegate/mods/Greeter/Greeter.dll"
        );
    }

    #[test]
    fn test_from_native_null_is_empty() {
        // SAFETY: null is explicitly handled.
        let text = unsafe { from_native(std::ptr::null()) };
        assert_eq!(text, "");
    }

    #[test]
    fn test_from_native_reads_to_nul() {
        let encoded = to_native("diagnostic text");
        // SAFETY: encoded is NUL-terminated and outlives the call.
        let text = unsafe { from_native(encoded.as_ptr()) };
        assert_eq!(text, "diagnostic text");
    }

    #[test]
    fn test_buffer_to_string_without_nul() {
        let encoded: Vec<CharT> = to_native("abc")[..3].to_vec();
        assert_eq!(buffer_to_string(&encoded), "abc");
    }
}
