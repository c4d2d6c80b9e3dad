//! Shared ownership of native object handles.

use std::fmt;
use std::rc::Rc;

use hdf5_sys::h5a::H5Aclose;
use hdf5_sys::h5d::H5Dclose;
use hdf5_sys::h5f::H5Fclose;
use hdf5_sys::h5g::H5Gclose;
use hdf5_sys::h5i::hid_t;
use hdf5_sys::h5s::H5Sclose;
use hdf5_sys::h5t::H5Tclose;

use crate::error::{Error, Result};
use crate::library::h5call;

/// Kind of native object behind a [`Handle`]; selects the close primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    File,
    Group,
    DataSet,
    Attribute,
    DataSpace,
    Datatype,
}

impl ObjectKind {
    /// Human readable name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            ObjectKind::File => "file",
            ObjectKind::Group => "group",
            ObjectKind::DataSet => "dataset",
            ObjectKind::Attribute => "attribute",
            ObjectKind::DataSpace => "dataspace",
            ObjectKind::Datatype => "datatype",
        }
    }

    fn release(self, id: hid_t) -> Result<()> {
        match self {
            ObjectKind::File => h5call!(H5Fclose(id)),
            ObjectKind::Group => h5call!(H5Gclose(id)),
            ObjectKind::DataSet => h5call!(H5Dclose(id)),
            ObjectKind::Attribute => h5call!(H5Aclose(id)),
            ObjectKind::DataSpace => h5call!(H5Sclose(id)),
            ObjectKind::Datatype => h5call!(H5Tclose(id)),
        }
        .map(|_| ())
    }
}

struct Owned {
    id: hid_t,
    kind: ObjectKind,
}

impl Drop for Owned {
    fn drop(&mut self) {
        // Close failures cannot be propagated out of drop.
        if let Err(e) = self.kind.release(self.id) {
            tracing::warn!(kind = self.kind.name(), id = self.id, error = %e, "failed to close handle");
        } else {
            tracing::trace!(kind = self.kind.name(), id = self.id, "closed handle");
        }
    }
}

/// Reference-counted owner of one native object id.
///
/// Cloning shares the id; the matching close primitive runs exactly once,
/// when the last clone is dropped or closed. A default handle holds nothing.
///
/// # Thread Safety
///
/// `Handle` is NOT `Send` or `Sync`. All wrappers sharing a handle must be
/// used from the thread that created them.
#[derive(Clone, Default)]
pub struct Handle {
    inner: Option<Rc<Owned>>,
}

impl Handle {
    /// Take ownership of a freshly created or opened id.
    pub(crate) fn from_raw(id: hid_t, kind: ObjectKind) -> Self {
        Self {
            inner: Some(Rc::new(Owned { id, kind })),
        }
    }

    /// True while an id is held.
    pub fn valid(&self) -> bool {
        self.inner.is_some()
    }

    /// The native id, if any.
    pub fn id(&self) -> Option<hid_t> {
        self.inner.as_ref().map(|o| o.id)
    }

    /// Number of wrapper values sharing this id (0 for an empty handle).
    pub fn share_count(&self) -> usize {
        self.inner.as_ref().map_or(0, Rc::strong_count)
    }

    /// Native id, or an [`Error::InvalidHandle`] naming the operation.
    pub(crate) fn require(&self, kind: ObjectKind, operation: &'static str) -> Result<hid_t> {
        self.id()
            .ok_or_else(|| Error::invalid_handle(kind.name(), operation))
    }

    /// Release this value's share. Safe to call repeatedly.
    pub fn close(&mut self) {
        self.inner = None;
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Some(o) => write!(f, "Handle({} {})", o.kind.name(), o.id),
            None => f.write_str("Handle(none)"),
        }
    }
}
