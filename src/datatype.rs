//! Datatype wrapper and the static element-type registry.

use std::os::raw::c_uint;

use hdf5_sys::h5::hsize_t;
use hdf5_sys::h5i::hid_t;
use hdf5_sys::h5t::{
    self, H5T_class_t, H5Tarray_create2, H5Tcopy, H5Tequal, H5Tget_array_dims2,
    H5Tget_array_ndims, H5Tget_class, H5Tget_size, H5Tget_super,
};

use crate::error::{Error, Result, ResultExt};
use crate::handle::{Handle, ObjectKind};
use crate::library::h5call;

pub(crate) mod sealed {
    /// Restricts [`super::H5Type`] to the types registered in this module.
    pub trait Sealed {}
}

/// Element types with a registered native mapping.
///
/// `native_type` describes the in-memory layout, `stored_type` the layout
/// written to new datasets and attributes. The trait is sealed: the table
/// below is the complete set of element types, so a missing mapping is a
/// build error and every native type matches the size of its Rust type.
pub trait H5Type: sealed::Sealed + Copy + Default + 'static {
    fn native_type() -> Result<Type>;
    fn stored_type() -> Result<Type>;
}

macro_rules! impl_h5type {
    ($($ty:ty => $native:ident, $stored:ident;)*) => {
        $(impl sealed::Sealed for $ty {}

        impl H5Type for $ty {
            fn native_type() -> Result<Type> {
                Type::predefined(h5t::$native)
            }

            fn stored_type() -> Result<Type> {
                Type::predefined(h5t::$stored)
            }
        })*
    };
}

impl_h5type! {
    i8 => H5T_NATIVE_INT8, H5T_STD_I8LE;
    i16 => H5T_NATIVE_INT16, H5T_STD_I16LE;
    i32 => H5T_NATIVE_INT32, H5T_STD_I32LE;
    i64 => H5T_NATIVE_INT64, H5T_STD_I64LE;
    u8 => H5T_NATIVE_UINT8, H5T_STD_U8LE;
    u16 => H5T_NATIVE_UINT16, H5T_STD_U16LE;
    u32 => H5T_NATIVE_UINT32, H5T_STD_U32LE;
    u64 => H5T_NATIVE_UINT64, H5T_STD_U64LE;
    f32 => H5T_NATIVE_FLOAT, H5T_IEEE_F32LE;
    f64 => H5T_NATIVE_DOUBLE, H5T_IEEE_F64LE;
}

/// Owning wrapper around a datatype id.
#[derive(Debug, Clone, Default)]
pub struct Type {
    handle: Handle,
}

impl Type {
    /// Private copy of a predefined type. Predefined ids are library owned
    /// and must never be closed, so the wrapper always holds a copy.
    fn predefined(global: &'static hid_t) -> Result<Self> {
        let id = h5call!(H5Tcopy(*global))?;
        Ok(Self::from_raw(id))
    }

    pub(crate) fn from_raw(id: hid_t) -> Self {
        Self {
            handle: Handle::from_raw(id, ObjectKind::Datatype),
        }
    }

    /// In-memory type of `T`.
    pub fn native<T: H5Type>() -> Result<Self> {
        T::native_type()
    }

    /// On-disk type of `T`.
    pub fn stored<T: H5Type>() -> Result<Self> {
        T::stored_type()
    }

    /// Fixed-size array type of `base` elements with shape `dims`.
    pub fn array(base: &Type, dims: &[u64]) -> Result<Self> {
        let base_id = base.id_for("array")?;
        let id = h5call!(H5Tarray_create2(
            base_id,
            dims.len() as c_uint,
            dims.as_ptr() as *const hsize_t
        ))
        .with_context(|| format!("dims={dims:?}"))?;
        Ok(Self::from_raw(id))
    }

    pub(crate) fn id_for(&self, operation: &'static str) -> Result<hid_t> {
        self.handle.require(ObjectKind::Datatype, operation)
    }

    /// True while a datatype id is held.
    pub fn valid(&self) -> bool {
        self.handle.valid()
    }

    /// Native datatype id, `None` once closed.
    pub fn id(&self) -> Option<hid_t> {
        self.handle.id()
    }

    /// Release this value's share of the datatype.
    pub fn close(&mut self) {
        self.handle.close();
    }

    /// Type class (integer, float, array, ...).
    pub fn class(&self) -> Result<H5T_class_t> {
        let id = self.id_for("class")?;
        h5call!(H5Tget_class(id))
    }

    pub fn is_array(&self) -> Result<bool> {
        Ok(self.class()? == H5T_class_t::H5T_ARRAY)
    }

    /// Size of one element in bytes.
    pub fn size(&self) -> Result<usize> {
        let id = self.id_for("size")?;
        // H5Tget_size signals failure with 0, not a negative value.
        let size = {
            crate::library::ensure_init();
            let _guard = hdf5_sys::LOCK.lock();
            unsafe { H5Tget_size(id) }
        };
        if size == 0 {
            return Err(Error::NativeCall {
                location: concat!(file!(), ":", line!()),
                call: "H5Tget_size",
                context: format!("type id {id}"),
                detail: None,
            });
        }
        Ok(size)
    }

    /// Rank of an array type.
    pub fn array_rank(&self) -> Result<usize> {
        let id = self.id_for("array_rank")?;
        let rank = h5call!(H5Tget_array_ndims(id))?;
        Ok(rank as usize)
    }

    /// Dimensions of an array type.
    pub fn array_dims(&self) -> Result<Vec<u64>> {
        let id = self.id_for("array_dims")?;
        let rank = self.array_rank()?;
        let mut dims = vec![0 as hsize_t; rank];
        h5call!(H5Tget_array_dims2(id, dims.as_mut_ptr()))?;
        Ok(dims.into_iter().map(|d| d as u64).collect())
    }

    /// Element type of an array (or the parent of a derived type).
    pub fn base(&self) -> Result<Type> {
        let id = self.id_for("base")?;
        let super_id = h5call!(H5Tget_super(id))?;
        Ok(Self::from_raw(super_id))
    }

    /// Whether both types describe the same layout.
    pub fn equals(&self, other: &Type) -> Result<bool> {
        let a = self.id_for("equals")?;
        let b = other.id_for("equals")?;
        Ok(h5call!(H5Tequal(a, b))? > 0)
    }
}
