//! The C ABI value encoding at the host boundary.
//!
//! [`RawValue`] is the tagged value the host process reads and writes when
//! calling the exported bridge functions. It is a boundary encoding only:
//! the host's own value representation never crosses, and array payloads do
//! not cross either (only the tag and element count do).
//!
//! Strings handed to the host are allocated here and must come back through
//! [`RawValue::release_text`] (exported as `runegate_string_release`).

use runegate_interop_core::DynValue;
use std::ffi::{c_char, CStr, CString};
use std::ptr;

/// Tag: numeric value in `real`.
pub const KIND_REAL: i32 = 0;
/// Tag: NUL-terminated UTF-8 string in `text`.
pub const KIND_STRING: i32 = 1;
/// Tag: boolean, nonzero `real` is true.
pub const KIND_BOOL: i32 = 2;
/// Tag: no value.
pub const KIND_UNDEFINED: i32 = 3;
/// Tag: array marker; `real` carries the element count, elements stay
/// behind the boundary.
pub const KIND_ARRAY: i32 = 4;

/// One dynamically-typed value crossing the C ABI.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawValue {
    /// One of the `KIND_*` tags.
    pub kind: i32,

    /// Numeric payload for real/bool tags, element count for arrays.
    pub real: f64,

    /// String payload for the string tag, otherwise null.
    pub text: *mut c_char,
}

impl RawValue {
    /// The undefined value.
    pub fn undefined() -> Self {
        Self {
            kind: KIND_UNDEFINED,
            real: 0.0,
            text: ptr::null_mut(),
        }
    }

    /// Encode a bridge value for the host.
    ///
    /// String payloads are freshly allocated; the host owns them and must
    /// release each one through `runegate_string_release`.
    pub fn from_dyn(value: &DynValue) -> Self {
        match value {
            DynValue::Real(v) => Self {
                kind: KIND_REAL,
                real: *v,
                text: ptr::null_mut(),
            },
            DynValue::Bool(b) => Self {
                kind: KIND_BOOL,
                real: if *b { 1.0 } else { 0.0 },
                text: ptr::null_mut(),
            },
            DynValue::Str(s) => Self {
                kind: KIND_STRING,
                real: 0.0,
                text: to_c_string(s).into_raw(),
            },
            DynValue::Undefined => Self::undefined(),
            DynValue::Array(elements) => Self {
                kind: KIND_ARRAY,
                real: elements.len() as f64,
                text: ptr::null_mut(),
            },
        }
    }

    /// Decode a host-provided value.
    ///
    /// Unknown tags and null string payloads decode to safe values
    /// (undefined and the empty string) rather than being rejected.
    ///
    /// # Safety
    ///
    /// For the string tag, `text` must be null or point to a
    /// NUL-terminated buffer valid for the duration of the call.
    pub unsafe fn to_dyn(&self) -> DynValue {
        match self.kind {
            KIND_REAL => DynValue::Real(self.real),
            KIND_BOOL => DynValue::Bool(self.real != 0.0),
            KIND_STRING => {
                if self.text.is_null() {
                    DynValue::Str(String::new())
                } else {
                    // SAFETY: non-null string payloads are NUL-terminated
                    // per the tag contract
                    let text = unsafe { CStr::from_ptr(self.text) };
                    DynValue::Str(text.to_string_lossy().into_owned())
                }
            }
            KIND_ARRAY => DynValue::Array(Vec::new()),
            _ => DynValue::Undefined,
        }
    }

    /// Reclaim a string previously handed out by [`RawValue::from_dyn`].
    ///
    /// # Safety
    ///
    /// `text` must be null or a pointer obtained from `from_dyn`, released
    /// at most once.
    pub unsafe fn release_text(text: *mut c_char) {
        if !text.is_null() {
            // SAFETY: the pointer came from CString::into_raw in from_dyn
            drop(unsafe { CString::from_raw(text) });
        }
    }
}

/// Interior NULs cannot cross a C string boundary; the payload is truncated
/// at the first one.
fn to_c_string(text: &str) -> CString {
    let end = text.find('\0').unwrap_or(text.len());
    CString::new(&text[..end]).unwrap_or_default()
}
