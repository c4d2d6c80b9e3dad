//! Typed attribute wrapper.

use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::os::raw::c_void;

use hdf5_sys::h5a::{H5Acreate2, H5Aget_space, H5Aget_type, H5Aopen, H5Aread, H5Awrite};
use hdf5_sys::h5i::hid_t;
use hdf5_sys::h5p::H5P_DEFAULT;

use crate::dataset::check_buffer;
use crate::datatype::{H5Type, Type};
use crate::dataspace::DataSpace;
use crate::error::{Result, ResultExt};
use crate::handle::{Handle, ObjectKind};
use crate::library::h5call;
use crate::util::to_cstring;

/// Owning wrapper around an attribute id holding elements of type `T`.
pub struct Attribute<T: H5Type> {
    handle: Handle,
    _marker: PhantomData<T>,
}

impl<T: H5Type> Attribute<T> {
    pub(crate) fn create(loc: hid_t, name: &str, space: &DataSpace) -> Result<Self> {
        let cname = to_cstring(name)?;
        let stored = T::stored_type()?;
        let type_id = stored.id_for("create_attr")?;
        let space_id = space.id_for("create_attr")?;
        let id = h5call!(H5Acreate2(
            loc,
            cname.as_ptr(),
            type_id,
            space_id,
            H5P_DEFAULT,
            H5P_DEFAULT
        ))
        .with_context(|| format!("attribute={name}"))?;
        Ok(Self::from_raw(id))
    }

    pub(crate) fn open(loc: hid_t, name: &str) -> Result<Self> {
        let cname = to_cstring(name)?;
        let id = h5call!(H5Aopen(loc, cname.as_ptr(), H5P_DEFAULT))
            .with_context(|| format!("attribute={name}"))?;
        Ok(Self::from_raw(id))
    }

    fn from_raw(id: hid_t) -> Self {
        Self {
            handle: Handle::from_raw(id, ObjectKind::Attribute),
            _marker: PhantomData,
        }
    }

    fn id_for(&self, operation: &'static str) -> Result<hid_t> {
        self.handle.require(ObjectKind::Attribute, operation)
    }

    /// True while an attribute id is held.
    pub fn valid(&self) -> bool {
        self.handle.valid()
    }

    /// Native attribute id, `None` once closed.
    pub fn id(&self) -> Option<hid_t> {
        self.handle.id()
    }

    /// Release this value's share of the attribute.
    pub fn close(&mut self) {
        self.handle.close();
    }

    /// Shape of the attribute.
    pub fn data_space(&self) -> Result<DataSpace> {
        let id = self.id_for("data_space")?;
        Ok(DataSpace::from_raw(h5call!(H5Aget_space(id))?))
    }

    pub fn dtype(&self) -> Result<Type> {
        let id = self.id_for("dtype")?;
        Ok(Type::from_raw(h5call!(H5Aget_type(id))?))
    }

    /// Write every element of the attribute.
    pub fn write(&self, data: &[T]) -> Result<()> {
        let id = self.id_for("write")?;
        let mem_type = T::native_type()?;
        let type_id = mem_type.id_for("write")?;
        let npoints = self.data_space()?.npoints()?;
        check_buffer(npoints * mem_type.size()?, mem::size_of_val(data))?;
        h5call!(H5Awrite(id, type_id, data.as_ptr() as *const c_void))?;
        Ok(())
    }

    pub fn write_scalar(&self, value: &T) -> Result<()> {
        self.write(std::slice::from_ref(value))
    }

    /// Read every element of the attribute.
    pub fn read_vec(&self) -> Result<Vec<T>> {
        let id = self.id_for("read")?;
        let mem_type = T::native_type()?;
        let type_id = mem_type.id_for("read")?;
        let npoints = self.data_space()?.npoints()?;
        let mut buf = vec![T::default(); npoints];
        check_buffer(npoints * mem_type.size()?, mem::size_of_val(buf.as_slice()))?;
        h5call!(H5Aread(id, type_id, buf.as_mut_ptr() as *mut c_void))?;
        Ok(buf)
    }

    pub fn read_scalar(&self) -> Result<T> {
        let values = self.read_vec()?;
        check_buffer(mem::size_of::<T>(), mem::size_of_val(values.as_slice()))?;
        Ok(values[0])
    }
}

impl<T: H5Type> Clone for Attribute<T> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: H5Type> Default for Attribute<T> {
    fn default() -> Self {
        Self {
            handle: Handle::default(),
            _marker: PhantomData,
        }
    }
}

impl<T: H5Type> fmt::Debug for Attribute<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("handle", &self.handle)
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}
