//! Process-wide library state: one-time initialisation and the call macro.

use std::os::raw::c_uint;
use std::ptr;
use std::sync::Once;

use hdf5_sys::h5::{H5get_libversion, H5open};
use hdf5_sys::h5e::{H5E_DEFAULT, H5Eset_auto2};

use crate::error::Result;

static INIT: Once = Once::new();

/// Initialise the native library exactly once.
///
/// Predefined type and property-list class ids are only valid after
/// `H5open`, and automatic error printing is switched off so failures are
/// reported through [`crate::Error`] only.
pub(crate) fn ensure_init() {
    INIT.call_once(|| {
        let _guard = hdf5_sys::LOCK.lock();
        unsafe {
            if H5open() < 0 {
                tracing::warn!("H5open reported a failure during initialisation");
            }
            H5Eset_auto2(H5E_DEFAULT, None, ptr::null_mut());
        }
        tracing::debug!("native HDF5 library initialised");
    });
}

/// Call a native primitive under the library lock and translate its result.
///
/// Expands to a `Result` holding the raw return value. Arguments are
/// evaluated after initialisation, so predefined ids may be dereferenced
/// inside the call.
macro_rules! h5call {
    ($func:ident ( $($arg:expr),* $(,)? )) => {{
        $crate::library::ensure_init();
        let _guard = ::hdf5_sys::LOCK.lock();
        #[allow(unused_unsafe, deprecated)]
        let ret = unsafe { $func($($arg),*) };
        $crate::error::check(ret, stringify!($func), concat!(file!(), ":", line!()))
    }};
}

pub(crate) use h5call;

/// Runtime version of the linked HDF5 library as `(major, minor, release)`.
pub fn library_version() -> Result<(u32, u32, u32)> {
    let (mut major, mut minor, mut release): (c_uint, c_uint, c_uint) = (0, 0, 0);
    h5call!(H5get_libversion(&mut major, &mut minor, &mut release))?;
    Ok((major as u32, minor as u32, release as u32))
}
