//! Dataspace wrapper: shape plus selection.

use std::os::raw::c_int;
use std::ptr;

use hdf5_sys::h5::hsize_t;
use hdf5_sys::h5i::hid_t;
use hdf5_sys::h5s::{
    H5S_SCALAR, H5S_SELECT_SET, H5Scopy, H5Screate, H5Screate_simple,
    H5Sget_select_npoints, H5Sget_simple_extent_dims, H5Sget_simple_extent_ndims,
    H5Sget_simple_extent_npoints, H5Sselect_all, H5Sselect_hyperslab, H5Sselect_none,
};

use crate::error::{Error, Result, ResultExt};
use crate::handle::{Handle, ObjectKind};
use crate::library::h5call;

/// Maximum extent value meaning "unlimited".
pub const UNLIMITED: u64 = hdf5_sys::h5s::H5S_UNLIMITED;

/// Owning wrapper around a dataspace id.
///
/// Clones share the native dataspace, including its selection; use
/// [`DataSpace::try_clone`] for an independent copy.
#[derive(Debug, Clone, Default)]
pub struct DataSpace {
    handle: Handle,
}

impl DataSpace {
    pub(crate) fn from_raw(id: hid_t) -> Self {
        Self {
            handle: Handle::from_raw(id, ObjectKind::DataSpace),
        }
    }

    /// Scalar dataspace holding exactly one element.
    pub fn scalar() -> Result<Self> {
        let id = h5call!(H5Screate(H5S_SCALAR))?;
        Ok(Self::from_raw(id))
    }

    /// Fixed-size simple dataspace.
    pub fn simple(dims: &[u64]) -> Result<Self> {
        let id = h5call!(H5Screate_simple(
            dims.len() as c_int,
            dims.as_ptr() as *const hsize_t,
            ptr::null()
        ))
        .with_context(|| format!("dims={dims:?}"))?;
        Ok(Self::from_raw(id))
    }

    /// Simple dataspace with maximum extents; use [`UNLIMITED`] for
    /// extendible dimensions (requires a chunked dataset).
    pub fn simple_with_max(dims: &[u64], max_dims: &[u64]) -> Result<Self> {
        if dims.len() != max_dims.len() {
            return Err(Error::RankMismatch {
                expected: dims.len(),
                actual: max_dims.len(),
            });
        }
        let id = h5call!(H5Screate_simple(
            dims.len() as c_int,
            dims.as_ptr() as *const hsize_t,
            max_dims.as_ptr() as *const hsize_t
        ))
        .with_context(|| format!("dims={dims:?}, max_dims={max_dims:?}"))?;
        Ok(Self::from_raw(id))
    }

    pub(crate) fn id_for(&self, operation: &'static str) -> Result<hid_t> {
        self.handle.require(ObjectKind::DataSpace, operation)
    }

    /// True while a dataspace id is held.
    pub fn valid(&self) -> bool {
        self.handle.valid()
    }

    /// Native dataspace id, `None` once closed.
    pub fn id(&self) -> Option<hid_t> {
        self.handle.id()
    }

    /// Release this value's share of the dataspace.
    pub fn close(&mut self) {
        self.handle.close();
    }

    /// Independent copy including the current selection.
    pub fn try_clone(&self) -> Result<Self> {
        let id = self.id_for("try_clone")?;
        Ok(Self::from_raw(h5call!(H5Scopy(id))?))
    }

    /// Number of dimensions, 0 for a scalar dataspace.
    pub fn rank(&self) -> Result<usize> {
        let id = self.id_for("rank")?;
        Ok(h5call!(H5Sget_simple_extent_ndims(id))? as usize)
    }

    /// Current extent of every dimension.
    pub fn dims(&self) -> Result<Vec<u64>> {
        Ok(self.extents()?.0)
    }

    /// Maximum extent of every dimension.
    pub fn max_dims(&self) -> Result<Vec<u64>> {
        Ok(self.extents()?.1)
    }

    fn extents(&self) -> Result<(Vec<u64>, Vec<u64>)> {
        let id = self.id_for("dims")?;
        let rank = self.rank()?;
        let mut dims = vec![0 as hsize_t; rank];
        let mut max = vec![0 as hsize_t; rank];
        if rank > 0 {
            h5call!(H5Sget_simple_extent_dims(id, dims.as_mut_ptr(), max.as_mut_ptr()))?;
        }
        Ok((dims, max))
    }

    /// Total number of elements in the extent.
    pub fn npoints(&self) -> Result<usize> {
        let id = self.id_for("npoints")?;
        Ok(h5call!(H5Sget_simple_extent_npoints(id))? as usize)
    }

    /// Number of elements in the current selection.
    pub fn selected_points(&self) -> Result<usize> {
        let id = self.id_for("selected_points")?;
        Ok(h5call!(H5Sget_select_npoints(id))? as usize)
    }

    /// Select one element of a rank-1 dataspace.
    pub fn select_single(&mut self, index: u64) -> Result<()> {
        self.select_hyperslab(&[index], &[1])
    }

    /// Select a contiguous block starting at `start` with `count` elements
    /// per dimension. Both slices must have the dataspace's rank.
    pub fn select_hyperslab(&mut self, start: &[u64], count: &[u64]) -> Result<()> {
        let id = self.id_for("select_hyperslab")?;
        let rank = self.rank()?;
        for len in [start.len(), count.len()] {
            if len != rank {
                return Err(Error::RankMismatch {
                    expected: len,
                    actual: rank,
                });
            }
        }
        h5call!(H5Sselect_hyperslab(
            id,
            H5S_SELECT_SET,
            start.as_ptr() as *const hsize_t,
            ptr::null(),
            count.as_ptr() as *const hsize_t,
            ptr::null()
        ))
        .with_context(|| format!("start={start:?}, count={count:?}"))?;
        Ok(())
    }

    /// Select the whole extent.
    pub fn select_all(&mut self) -> Result<()> {
        let id = self.id_for("select_all")?;
        h5call!(H5Sselect_all(id))?;
        Ok(())
    }

    /// Clear the selection.
    pub fn select_none(&mut self) -> Result<()> {
        let id = self.id_for("select_none")?;
        h5call!(H5Sselect_none(id))?;
        Ok(())
    }
}
