//! Dataset wrapper and typed I/O.

use std::mem;
use std::os::raw::c_void;

use hdf5_sys::h5d::{
    H5Dcreate2, H5Dget_create_plist, H5Dget_space, H5Dget_type, H5Dopen2, H5Dread, H5Dwrite,
};
use hdf5_sys::h5i::{H5Iget_name, hid_t};
use hdf5_sys::h5p::H5P_DEFAULT;
use hdf5_sys::h5s::H5S_ALL;

use crate::datatype::{H5Type, Type};
use crate::dataspace::DataSpace;
use crate::error::{Error, Result, ResultExt};
use crate::handle::{Handle, ObjectKind};
use crate::library::h5call;
use crate::plist::{DataSetAccessProps, DataSetCreateProps};
use crate::util::{read_native_string, to_cstring};

/// Owning wrapper around a dataset id.
///
/// The element type is not part of the wrapper; typed reads and writes take
/// it as a parameter and convert through the registered native type.
#[derive(Debug, Clone, Default)]
pub struct DataSet {
    handle: Handle,
}

impl DataSet {
    pub(crate) fn create(
        loc: hid_t,
        name: &str,
        dtype: &Type,
        space: &DataSpace,
        create: &DataSetCreateProps,
        access: &DataSetAccessProps,
    ) -> Result<Self> {
        let cname = to_cstring(name)?;
        let type_id = dtype.id_for("create_dataset")?;
        let space_id = space.id_for("create_dataset")?;
        let id = h5call!(H5Dcreate2(
            loc,
            cname.as_ptr(),
            type_id,
            space_id,
            H5P_DEFAULT,
            create.id(),
            access.id()
        ))
        .with_context(|| format!("name={name}"))?;
        tracing::debug!(name, id, "created dataset");
        Ok(Self::from_raw(id))
    }

    pub(crate) fn open(loc: hid_t, name: &str, access: &DataSetAccessProps) -> Result<Self> {
        let cname = to_cstring(name)?;
        let id = h5call!(H5Dopen2(loc, cname.as_ptr(), access.id()))
            .with_context(|| format!("name={name}"))?;
        Ok(Self::from_raw(id))
    }

    fn from_raw(id: hid_t) -> Self {
        Self {
            handle: Handle::from_raw(id, ObjectKind::DataSet),
        }
    }

    fn id_for(&self, operation: &'static str) -> Result<hid_t> {
        self.handle.require(ObjectKind::DataSet, operation)
    }

    /// True while a dataset id is held.
    pub fn valid(&self) -> bool {
        self.handle.valid()
    }

    /// Native dataset id, `None` once closed.
    pub fn id(&self) -> Option<hid_t> {
        self.handle.id()
    }

    /// Release this value's share of the dataset.
    pub fn close(&mut self) {
        self.handle.close();
    }

    /// Absolute path of the dataset.
    pub fn name(&self) -> Result<String> {
        let id = self.id_for("name")?;
        read_native_string(|buf, size| h5call!(H5Iget_name(id, buf, size)))
    }

    /// Fresh copy of the file dataspace (shape, everything selected).
    pub fn data_space(&self) -> Result<DataSpace> {
        let id = self.id_for("data_space")?;
        Ok(DataSpace::from_raw(h5call!(H5Dget_space(id))?))
    }

    /// Stored element type.
    pub fn dtype(&self) -> Result<Type> {
        let id = self.id_for("dtype")?;
        Ok(Type::from_raw(h5call!(H5Dget_type(id))?))
    }

    /// Copy of the creation properties the dataset was made with.
    pub fn create_plist(&self) -> Result<DataSetCreateProps> {
        let id = self.id_for("create_plist")?;
        Ok(DataSetCreateProps::from_raw(h5call!(H5Dget_create_plist(id))?))
    }

    /// Write the whole dataset from `data`.
    pub fn write<T: H5Type>(&self, data: &[T]) -> Result<()> {
        self.write_with_type(&T::native_type()?, data)
    }

    /// Write a scalar (or single-element) dataset.
    pub fn write_scalar<T: H5Type>(&self, value: &T) -> Result<()> {
        self.write(std::slice::from_ref(value))
    }

    /// Write the whole dataset using an explicit memory type, e.g. an array
    /// type whose elements are laid out contiguously in `data`.
    pub fn write_with_type<T: H5Type>(&self, mem_type: &Type, data: &[T]) -> Result<()> {
        let id = self.id_for("write")?;
        let type_id = mem_type.id_for("write")?;
        let npoints = self.data_space()?.npoints()?;
        check_buffer(npoints * mem_type.size()?, mem::size_of_val(data))?;
        h5call!(H5Dwrite(
            id,
            type_id,
            H5S_ALL,
            H5S_ALL,
            H5P_DEFAULT,
            data.as_ptr() as *const c_void
        ))?;
        Ok(())
    }

    /// Read the selection of `file_space` into `buf` laid out as `mem_space`.
    pub fn read_into<T: H5Type>(
        &self,
        mem_space: &DataSpace,
        file_space: &DataSpace,
        mem_type: &Type,
        buf: &mut [T],
    ) -> Result<()> {
        let id = self.id_for("read")?;
        let type_id = mem_type.id_for("read")?;
        let mem_id = mem_space.id_for("read")?;
        let file_id = file_space.id_for("read")?;
        let expected = mem_space.selected_points()? * mem_type.size()?;
        check_buffer(expected, mem::size_of_val(buf))?;
        h5call!(H5Dread(
            id,
            type_id,
            mem_id,
            file_id,
            H5P_DEFAULT,
            buf.as_mut_ptr() as *mut c_void
        ))?;
        Ok(())
    }

    /// Read the whole dataset.
    pub fn read_vec<T: H5Type>(&self) -> Result<Vec<T>> {
        let id = self.id_for("read")?;
        let mem_type = T::native_type()?;
        let type_id = mem_type.id_for("read")?;
        let npoints = self.data_space()?.npoints()?;
        let mut buf = vec![T::default(); npoints];
        check_buffer(npoints * mem_type.size()?, mem::size_of_val(buf.as_slice()))?;
        h5call!(H5Dread(
            id,
            type_id,
            H5S_ALL,
            H5S_ALL,
            H5P_DEFAULT,
            buf.as_mut_ptr() as *mut c_void
        ))?;
        Ok(buf)
    }

    /// Read a dataset holding exactly one element.
    pub fn read_scalar<T: H5Type>(&self) -> Result<T> {
        let file_space = self.data_space()?;
        let mut value = [T::default()];
        self.read_into(
            &DataSpace::scalar()?,
            &file_space,
            &T::native_type()?,
            &mut value,
        )?;
        Ok(value[0])
    }
}

pub(crate) fn check_buffer(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::BufferSize { expected, actual });
    }
    Ok(())
}
