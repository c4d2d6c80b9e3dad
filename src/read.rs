//! One-call readers combining a dataset lookup, a dataspace selection and a
//! typed read.
//!
//! Shapes are read into fixed scratch buffers of [`MAX_RANK`] dimensions;
//! higher ranks are rejected with [`Error::RankTooHigh`] before any data is
//! touched. Arrays come back row-major as [`ndarray::Array`].

use std::ptr;

use hdf5_sys::h5::hsize_t;
use hdf5_sys::h5s::H5Sget_simple_extent_dims;
use hdf5_sys::h5t::H5Tget_array_dims2;
use ndarray::{Array, Dimension, IxDyn};

use crate::dataset::DataSet;
use crate::datatype::{H5Type, Type};
use crate::dataspace::DataSpace;
use crate::error::{Error, Result};
use crate::group::Group;
use crate::library::h5call;
use crate::plist::DataSetAccessProps;

/// Highest dataset (or array element) rank the readers accept.
pub const MAX_RANK: usize = 6;

/// Read one value.
///
/// With `index == None` the dataset must be scalar. With `Some(i)` it must
/// be rank 1 and element `i` is read.
pub fn read_dataset<T: H5Type>(ds: &DataSet, index: Option<u64>) -> Result<T> {
    let mut file_space = ds.data_space()?;
    let rank = file_space.rank()?;
    match index {
        None => require_rank(0, rank)?,
        Some(i) => {
            require_rank(1, rank)?;
            file_space.select_single(i)?;
        }
    }
    let mut value = [T::default()];
    ds.read_into(
        &DataSpace::scalar()?,
        &file_space,
        &T::native_type()?,
        &mut value,
    )?;
    Ok(value[0])
}

/// Read an n-dimensional array.
///
/// With `index == None` the whole dataset is read and its rank must equal
/// the rank of `D` (any rank is accepted for [`IxDyn`]). With `Some(i)` the
/// dataset must be rank 1 with an array element type whose array rank
/// matches `D`; element `i` is read and its array payload returned.
pub fn read_ndarray<T, D>(ds: &DataSet, index: Option<u64>) -> Result<Array<T, D>>
where
    T: H5Type,
    D: Dimension,
{
    match index {
        None => read_whole(ds),
        Some(i) => read_element(ds, i),
    }
}

fn read_whole<T: H5Type, D: Dimension>(ds: &DataSet) -> Result<Array<T, D>> {
    let file_space = ds.data_space()?;
    let rank = file_space.rank()?;
    check_rank::<D>(rank)?;

    let mut scratch = [0 as hsize_t; MAX_RANK];
    if rank > 0 {
        let space_id = file_space.id_for("read_ndarray")?;
        h5call!(H5Sget_simple_extent_dims(
            space_id,
            scratch.as_mut_ptr(),
            ptr::null_mut()
        ))?;
    }
    let data = ds.read_vec::<T>()?;
    shaped(&scratch[..rank], data)
}

fn read_element<T: H5Type, D: Dimension>(ds: &DataSet, index: u64) -> Result<Array<T, D>> {
    let dtype = ds.dtype()?;
    if !dtype.is_array()? {
        return Err(Error::NotArrayType { name: ds.name()? });
    }
    let mut file_space = ds.data_space()?;
    require_rank(1, file_space.rank()?)?;
    let rank = dtype.array_rank()?;
    check_rank::<D>(rank)?;

    let mut scratch = [0 as hsize_t; MAX_RANK];
    let type_id = dtype.id_for("read_ndarray")?;
    h5call!(H5Tget_array_dims2(type_id, scratch.as_mut_ptr()))?;
    let dims = &scratch[..rank];

    let mem_type = Type::array(&T::native_type()?, dims)?;
    file_space.select_single(index)?;
    let len = dims.iter().product::<hsize_t>() as usize;
    let mut buf = vec![T::default(); len];
    ds.read_into(&DataSpace::scalar()?, &file_space, &mem_type, &mut buf)?;
    shaped(dims, buf)
}

/// Open `name` relative to `group`, then [`read_dataset`].
pub fn read_dataset_at<T: H5Type>(group: &Group, name: &str, index: Option<u64>) -> Result<T> {
    let ds = group.open_dataset(name, &DataSetAccessProps::default())?;
    read_dataset(&ds, index)
}

/// Open `name` relative to `group`, then [`read_ndarray`].
pub fn read_ndarray_at<T, D>(group: &Group, name: &str, index: Option<u64>) -> Result<Array<T, D>>
where
    T: H5Type,
    D: Dimension,
{
    let ds = group.open_dataset(name, &DataSetAccessProps::default())?;
    read_ndarray(&ds, index)
}

fn require_rank(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::RankMismatch { expected, actual });
    }
    Ok(())
}

/// Too-high ranks are reported first, whatever `D` is.
fn check_rank<D: Dimension>(rank: usize) -> Result<()> {
    if rank > MAX_RANK {
        return Err(Error::RankTooHigh {
            rank,
            max: MAX_RANK,
        });
    }
    match D::NDIM {
        Some(expected) => require_rank(expected, rank),
        None => Ok(()),
    }
}

fn shaped<T, D: Dimension>(dims: &[hsize_t], data: Vec<T>) -> Result<Array<T, D>> {
    let shape: Vec<usize> = dims.iter().map(|&d| d as usize).collect();
    let array = Array::from_shape_vec(IxDyn(&shape), data)?;
    Ok(array.into_dimensionality::<D>()?)
}
