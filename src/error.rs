//! Error handling for the wrapper layer.
//!
//! Every fallible call into HDF5 goes through [`check`], which turns a negative
//! (or otherwise invalid) return value into [`Error::NativeCall`] carrying the
//! wrapper call site, the primitive name and whatever HDF5 left on its error
//! stack. Context such as the path or mode is attached afterwards with
//! [`ResultExt::with_context`], only on the failure path.

use std::ffi::CStr;
use std::os::raw::{c_uint, c_void};

use hdf5_sys::h5::herr_t;
use hdf5_sys::h5d::H5D_layout_t;
use hdf5_sys::h5e::{H5E_DEFAULT, H5E_WALK_DOWNWARD, H5E_error2_t, H5Eclear2, H5Ewalk2};
use hdf5_sys::h5t::H5T_class_t;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised by the wrapper layer.
#[derive(Debug, Error)]
pub enum Error {
    /// A call into the native library returned its failure sentinel.
    #[error("{location}: {call} failed{}", describe(.context, .detail))]
    NativeCall {
        /// Wrapper call site, `file:line`
        location: &'static str,
        /// Name of the failing native primitive
        call: &'static str,
        /// Arguments useful for diagnosis (path, mode, object name)
        context: String,
        /// Innermost message from the native error stack, if any
        detail: Option<String>,
    },

    /// Requested rank differs from the rank stored in the file.
    #[error("rank mismatch: requested rank {expected}, dataset has rank {actual}")]
    RankMismatch { expected: usize, actual: usize },

    /// Stored rank exceeds what the readers' scratch buffers can hold.
    #[error("rank {rank} is too high, at most {max} dimensions are supported")]
    RankTooHigh { rank: usize, max: usize },

    /// Operation attempted on a default-constructed or closed wrapper.
    #[error("{operation} called on a {kind} wrapper that holds no handle")]
    InvalidHandle {
        kind: &'static str,
        operation: &'static str,
    },

    /// Name or path cannot be passed to C (interior NUL byte).
    #[error("invalid name {name:?}: contains an interior NUL byte")]
    InvalidName { name: String },

    /// Indexed array read on a dataset whose element type is not an array.
    #[error("element type of {name:?} is not an array type")]
    NotArrayType { name: String },

    /// Caller buffer does not match the size of the selection.
    #[error("buffer holds {actual} bytes but the selection needs {expected}")]
    BufferSize { expected: usize, actual: usize },

    /// Shape of data read back could not be turned into the requested array.
    #[error("shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// Option JSON could not be parsed.
    #[error("invalid options JSON: {0}")]
    Options(#[from] serde_json::Error),
}

/// Coarse classification of [`Error`], stable across message changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NativeCall,
    RankMismatch,
    RankTooHigh,
    InvalidHandle,
    InvalidName,
    NotArrayType,
    BufferSize,
    Shape,
    Options,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NativeCall { .. } => ErrorKind::NativeCall,
            Error::RankMismatch { .. } => ErrorKind::RankMismatch,
            Error::RankTooHigh { .. } => ErrorKind::RankTooHigh,
            Error::InvalidHandle { .. } => ErrorKind::InvalidHandle,
            Error::InvalidName { .. } => ErrorKind::InvalidName,
            Error::NotArrayType { .. } => ErrorKind::NotArrayType,
            Error::BufferSize { .. } => ErrorKind::BufferSize,
            Error::Shape(_) => ErrorKind::Shape,
            Error::Options(_) => ErrorKind::Options,
        }
    }

    /// Name of the failing native primitive, for [`Error::NativeCall`].
    pub fn native_call(&self) -> Option<&'static str> {
        match self {
            Error::NativeCall { call, .. } => Some(call),
            _ => None,
        }
    }

    pub(crate) fn invalid_handle(kind: &'static str, operation: &'static str) -> Self {
        Error::InvalidHandle { kind, operation }
    }
}

fn describe(context: &str, detail: &Option<String>) -> String {
    let mut out = String::new();
    if !context.is_empty() {
        out.push_str(" (");
        out.push_str(context);
        out.push(')');
    }
    if let Some(detail) = detail {
        out.push_str(": ");
        out.push_str(detail);
    }
    out
}

/// Attach diagnostic context to a failed native call.
pub trait ResultExt<T> {
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|mut e| {
            if let Error::NativeCall { context, .. } = &mut e {
                let extra = f();
                if context.is_empty() {
                    *context = extra;
                } else {
                    context.push_str(", ");
                    context.push_str(&extra);
                }
            }
            e
        })
    }
}

/// Return values whose failure sentinel the translator understands.
pub(crate) trait NativeReturn: Copy {
    fn failed(self) -> bool;
}

macro_rules! negative_is_failure {
    ($($ty:ty),*) => {
        $(impl NativeReturn for $ty {
            fn failed(self) -> bool {
                self < 0
            }
        })*
    };
}

negative_is_failure!(i32, i64, isize);

impl NativeReturn for H5T_class_t {
    fn failed(self) -> bool {
        self == H5T_class_t::H5T_NO_CLASS
    }
}

impl NativeReturn for H5D_layout_t {
    fn failed(self) -> bool {
        self == H5D_layout_t::H5D_LAYOUT_ERROR
    }
}

/// Convert a native return value into a `Result`.
///
/// Must be called while the library lock is held, the error stack read here
/// belongs to the calling thread's most recent failure.
pub(crate) fn check<R: NativeReturn>(
    ret: R,
    call: &'static str,
    location: &'static str,
) -> Result<R> {
    if ret.failed() {
        Err(Error::NativeCall {
            location,
            call,
            context: String::new(),
            detail: take_error_stack(),
        })
    } else {
        Ok(ret)
    }
}

unsafe extern "C" fn collect_message(
    _n: c_uint,
    err: *const H5E_error2_t,
    data: *mut c_void,
) -> herr_t {
    let messages = unsafe { &mut *(data as *mut Vec<String>) };
    if let Some(err) = unsafe { err.as_ref() } {
        if !err.desc.is_null() {
            let desc = unsafe { CStr::from_ptr(err.desc) };
            let desc = desc.to_string_lossy().trim().to_string();
            if !desc.is_empty() {
                messages.push(desc);
            }
        }
    }
    0
}

/// Read and clear the default error stack.
///
/// Returns the outermost and innermost descriptions joined together, which
/// is usually "what failed" followed by "why".
fn take_error_stack() -> Option<String> {
    let mut messages: Vec<String> = Vec::new();
    unsafe {
        H5Ewalk2(
            H5E_DEFAULT,
            H5E_WALK_DOWNWARD,
            Some(collect_message),
            &mut messages as *mut Vec<String> as *mut c_void,
        );
        H5Eclear2(H5E_DEFAULT);
    }
    match messages.len() {
        0 => None,
        1 => messages.pop(),
        _ => {
            let inner = messages.pop().unwrap_or_default();
            Some(format!("{}: {inner}", messages[0]))
        }
    }
}
