//! Utility functions for passing strings across the native boundary.

use std::ffi::CString;
use std::os::raw::c_char;
use std::path::Path;

use libc::size_t;

use crate::error::{Error, Result};

/// Convert a Rust name or path to a C string.
///
/// Returns an error if the string contains an interior NUL byte.
pub fn to_cstring(name: &str) -> Result<CString> {
    CString::new(name).map_err(|_| Error::InvalidName {
        name: name.to_string(),
    })
}

/// Convert a filesystem path to a C string, byte for byte.
///
/// Returns an error for an interior NUL byte, and on platforms without
/// byte paths for a path that is not valid UTF-8.
#[cfg(unix)]
pub fn path_to_cstring(path: &Path) -> Result<CString> {
    use std::os::unix::ffi::OsStrExt;

    CString::new(path.as_os_str().as_bytes()).map_err(|_| invalid_path(path))
}

/// Convert a filesystem path to a C string.
///
/// Returns an error for a path that is not valid UTF-8 or that contains an
/// interior NUL byte.
#[cfg(not(unix))]
pub fn path_to_cstring(path: &Path) -> Result<CString> {
    let utf8 = path.to_str().ok_or_else(|| invalid_path(path))?;
    to_cstring(utf8)
}

fn invalid_path(path: &Path) -> Error {
    Error::InvalidName {
        name: path.to_string_lossy().into_owned(),
    }
}

/// Read a string from a native "query size, then fill" style primitive.
///
/// `fill` is called first with a null buffer to learn the length, then with
/// a buffer one byte longer for the terminator.
pub fn read_native_string<F>(mut fill: F) -> Result<String>
where
    F: FnMut(*mut c_char, size_t) -> Result<isize>,
{
    let len = fill(std::ptr::null_mut(), 0)?;
    if len <= 0 {
        return Ok(String::new());
    }
    let mut buf = vec![0u8; len as usize + 1];
    fill(buf.as_mut_ptr() as *mut c_char, buf.len())?;
    buf.truncate(len as usize);
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Last component of a `/`-separated path. The root maps to `/`.
pub fn basename(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return if path.starts_with('/') { "/" } else { "" };
    }
    match trimmed.rfind('/') {
        Some(pos) => &trimmed[pos + 1..],
        None => trimmed,
    }
}

/// Parent of an absolute `/`-separated path, `None` for the root.
pub fn parent_path(path: &str) -> Option<&str> {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.rfind('/') {
        Some(0) => Some("/"),
        Some(pos) => Some(&trimmed[..pos]),
        None => None,
    }
}
