//! Reference-counted owning wrappers around the HDF5 C API.
//!
//! Every HDF5 object (file, group, dataset, attribute, dataspace, datatype,
//! property list) is exposed as a wrapper that owns its native id, closes
//! it exactly once, and turns failing native calls into a typed [`Error`]
//! naming the call site, the primitive and the arguments involved.
//!
//! ```no_run
//! use h5wrap::{CreateMode, DataSetAccessProps, DataSetCreateProps, DataSpace, File,
//!              FileAccessProps, FileCreateProps, OpenMode, read_dataset_at};
//!
//! # fn main() -> h5wrap::Result<()> {
//! let file = File::create("t.h5", CreateMode::Truncate,
//!                         &FileCreateProps::default(), &FileAccessProps::default())?;
//! let g = file.create_group("g")?;
//! let ds = g.create_dataset::<i32>("ds", &DataSpace::scalar()?,
//!                                  &DataSetCreateProps::default(),
//!                                  &DataSetAccessProps::default())?;
//! ds.write_scalar(&42)?;
//! drop((ds, g, file));
//!
//! let file = File::open("t.h5", OpenMode::Read, &FileAccessProps::default())?;
//! let value: i32 = read_dataset_at(&file.open_group("/g")?, "ds", None)?;
//! assert_eq!(value, 42);
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! Wrappers are NOT `Send` or `Sync`: ownership is tracked with `Rc`. Native
//! calls are serialised on the bindings' global lock, but the wrappers of one
//! file must be used from the thread that opened it.
//!
//! # Memory Management
//!
//! - Cloning a wrapper shares its id; the id is closed when the last clone
//!   is dropped or closed
//! - `close()` releases only the caller's share and is safe to repeat
//! - Property lists are the exception: `try_clone` deep-copies them, and the
//!   default list is never copied or closed
//! - Close failures during `Drop` are reported through `tracing` at warn level

mod attribute;
mod dataset;
mod dataspace;
mod datatype;
mod error;
mod file;
mod group;
mod handle;
mod library;
mod plist;
mod read;
mod util;

pub use attribute::Attribute;
pub use dataset::DataSet;
pub use dataspace::{DataSpace, UNLIMITED};
pub use datatype::{H5Type, Type};
pub use error::{Error, ErrorKind, Result, ResultExt};
pub use file::{CreateMode, File, OpenMode};
pub use group::{Group, LinkType};
pub use handle::{Handle, ObjectKind};
pub use library::library_version;
pub use plist::{
    ChunkCache, CloseDegree, DataSetAccessProps, DataSetCreateProps, FileAccessProps,
    FileCreateProps, PListClass, PropertyList,
};
pub use read::{MAX_RANK, read_dataset, read_dataset_at, read_ndarray, read_ndarray_at};

/// Element type classes, as returned by [`Type::class`].
pub use hdf5_sys::h5t::H5T_class_t as TypeClass;

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array3, Ix3};
    use pretty_assertions::assert_eq;
    use std::collections::{BTreeSet, HashSet};
    use std::path::Path;

    fn create(path: &Path, mode: CreateMode) -> Result<File> {
        File::create(
            path,
            mode,
            &FileCreateProps::default(),
            &FileAccessProps::default(),
        )
    }

    fn open(path: &Path, mode: OpenMode) -> Result<File> {
        File::open(path, mode, &FileAccessProps::default())
    }

    fn new_dataset<T: H5Type>(group: &Group, name: &str, space: &DataSpace) -> DataSet {
        group
            .create_dataset::<T>(
                name,
                space,
                &DataSetCreateProps::default(),
                &DataSetAccessProps::default(),
            )
            .unwrap()
    }

    #[test]
    fn test_scalar_round_trip_through_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.h5");
        {
            let mut file = create(&path, CreateMode::Truncate).unwrap();
            let g = file.create_group("/g").unwrap();
            let ds = new_dataset::<i32>(&g, "ds", &DataSpace::scalar().unwrap());
            ds.write_scalar(&42).unwrap();
            file.close();
        }

        let file = open(&path, OpenMode::Read).unwrap();
        let g = file.open_group("/g").unwrap();
        let ds = g.open_dataset("/g/ds", &DataSetAccessProps::default()).unwrap();
        assert_eq!(read_dataset::<i32>(&ds, None).unwrap(), 42);
        assert_eq!(ds.name().unwrap(), "/g/ds");
        assert_eq!(ds.dtype().unwrap().size().unwrap(), 4);
    }

    #[test]
    fn test_exclusive_then_truncate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("excl.h5");
        {
            let file = create(&path, CreateMode::Exclusive).unwrap();
            file.create_group("old").unwrap();
        }

        let e = create(&path, CreateMode::Exclusive).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::NativeCall);
        assert_eq!(e.native_call(), Some("H5Fcreate"));
        let msg = e.to_string();
        assert!(msg.contains("Exclusive"), "{msg}");
        assert!(msg.contains("excl.h5"), "{msg}");

        let file = create(&path, CreateMode::Truncate).unwrap();
        let root = file.root().unwrap();
        assert!(root.children().unwrap().is_empty());
        assert!(!root.has_child("old").unwrap());
    }

    #[test]
    fn test_read_mode_rejects_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ro.h5");
        {
            let file = create(&path, CreateMode::Truncate).unwrap();
            let ds = new_dataset::<u32>(&file.root().unwrap(), "n", &DataSpace::scalar().unwrap());
            ds.write_scalar(&1).unwrap();
        }

        let file = open(&path, OpenMode::Read).unwrap();
        let e = file.create_group("g").unwrap_err();
        assert_eq!(e.native_call(), Some("H5Gcreate2"));

        let root = file.root().unwrap();
        let ds = root.open_dataset("n", &DataSetAccessProps::default()).unwrap();
        let e = ds.write_scalar(&2u32).unwrap_err();
        assert_eq!(e.native_call(), Some("H5Dwrite"));
        assert!(root.create_attr::<u8>("a", &DataSpace::scalar().unwrap()).is_err());
        assert_eq!(ds.read_scalar::<u32>().unwrap(), 1);
    }

    #[test]
    fn test_update_mode_allows_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rw.h5");
        drop(create(&path, CreateMode::Truncate).unwrap());

        let file = open(&path, OpenMode::Update).unwrap();
        file.create_group("late").unwrap();
        assert!(file.has_child("late").unwrap());
    }

    #[test]
    fn test_same_path_twice_is_one_key() {
        let dir = tempfile::tempdir().unwrap();
        let file = create(&dir.path().join("keys.h5"), CreateMode::Truncate).unwrap();
        file.create_group("a").unwrap();
        file.create_group("b").unwrap();

        let a1 = file.open_group("a").unwrap();
        let a2 = file.open_group("/a").unwrap();
        let b = file.open_group("b").unwrap();
        assert_eq!(a1, a2);

        let mut ordered = BTreeSet::new();
        assert!(ordered.insert(a1.clone()));
        assert!(!ordered.insert(a2.clone()));
        assert!(ordered.insert(b.clone()));
        assert_eq!(ordered.len(), 2);

        let hashed: HashSet<Group> = [a1, a2, b].into_iter().collect();
        assert_eq!(hashed.len(), 2);
    }

    #[test]
    fn test_ndarray_round_trip_with_chunking() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.h5");
        let cube = Array3::from_shape_fn((2, 3, 4), |(i, j, k)| (i * 100 + j * 10 + k) as f64);
        {
            let file = create(&path, CreateMode::Truncate).unwrap();
            let create_props =
                DataSetCreateProps::from_json(r#"{"chunk":[1,3,4],"shuffle":true,"deflate":4}"#)
                    .unwrap();
            let ds = file
                .root()
                .unwrap()
                .create_dataset::<f64>(
                    "cube",
                    &DataSpace::simple(&[2, 3, 4]).unwrap(),
                    &create_props,
                    &DataSetAccessProps::default(),
                )
                .unwrap();
            ds.write(cube.as_slice().unwrap()).unwrap();
            assert_eq!(ds.create_plist().unwrap().chunk().unwrap(), Some(vec![1, 3, 4]));
        }

        let file = open(&path, OpenMode::Read).unwrap();
        let root = file.root().unwrap();
        let back = read_ndarray_at::<f64, Ix3>(&root, "cube", None).unwrap();
        assert_eq!(back, cube);
        let e = read_ndarray_at::<f64, ndarray::Ix2>(&root, "cube", None).unwrap_err();
        assert!(matches!(e, Error::RankMismatch { expected: 2, actual: 3 }));
    }

    #[test]
    fn test_attributes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("attrs.h5");
        {
            let file = create(&path, CreateMode::Truncate).unwrap();
            let g = file.create_group("g").unwrap();
            g.create_attr::<i16>("dims", &DataSpace::simple(&[2]).unwrap())
                .unwrap()
                .write(&[640, 480])
                .unwrap();
        }

        let file = open(&path, OpenMode::Read).unwrap();
        let g = file.open_group("g").unwrap();
        let attr = g.open_attr::<i16>("dims").unwrap().unwrap();
        assert_eq!(attr.read_vec().unwrap(), vec![640, 480]);
        assert_eq!(attr.data_space().unwrap().dims().unwrap(), vec![2]);
        assert!(g.open_attr::<i16>("nope").unwrap().is_none());
    }

    #[test]
    fn test_soft_link_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("links.h5");
        {
            let file = create(&path, CreateMode::Truncate).unwrap();
            let g = file.create_group("data").unwrap();
            new_dataset::<u8>(&g, "raw", &DataSpace::simple(&[3]).unwrap())
                .write(&[7u8, 8, 9])
                .unwrap();
            file.root().unwrap().make_soft_link("/data/raw", "latest").unwrap();
        }

        let file = open(&path, OpenMode::Read).unwrap();
        let root = file.root().unwrap();
        assert_eq!(root.link_type("latest").unwrap(), LinkType::Soft);
        assert_eq!(root.soft_link("latest").unwrap().as_deref(), Some("/data/raw"));
        assert_eq!(read_dataset_at::<u8>(&root, "latest", Some(2)).unwrap(), 9);
    }

    #[test]
    fn test_closed_wrappers_report_invalid_handle() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = create(&dir.path().join("closed.h5"), CreateMode::Truncate).unwrap();
        let mut group = file.create_group("g").unwrap();
        let mut space = DataSpace::simple(&[2]).unwrap();
        let mut ds = new_dataset::<i32>(&group, "d", &space);
        let mut attr = group.create_attr::<i32>("a", &space).unwrap();
        let mut dtype = ds.dtype().unwrap();

        file.close();
        group.close();
        space.close();
        ds.close();
        attr.close();
        dtype.close();

        for valid in [
            file.valid(),
            group.valid(),
            space.valid(),
            ds.valid(),
            attr.valid(),
            dtype.valid(),
        ] {
            assert!(!valid);
        }
        assert_eq!(file.root().unwrap_err().kind(), ErrorKind::InvalidHandle);
        assert_eq!(group.has_attr("a").unwrap_err().kind(), ErrorKind::InvalidHandle);
        assert_eq!(space.npoints().unwrap_err().kind(), ErrorKind::InvalidHandle);
        assert_eq!(ds.read_vec::<i32>().unwrap_err().kind(), ErrorKind::InvalidHandle);
        assert_eq!(attr.read_vec().unwrap_err().kind(), ErrorKind::InvalidHandle);
        assert_eq!(dtype.size().unwrap_err().kind(), ErrorKind::InvalidHandle);
        assert_eq!(
            read_dataset::<i32>(&ds, Some(0)).unwrap_err().kind(),
            ErrorKind::InvalidHandle
        );
    }

    #[test]
    fn test_buffer_size_checked_before_write() {
        let dir = tempfile::tempdir().unwrap();
        let file = create(&dir.path().join("buf.h5"), CreateMode::Truncate).unwrap();
        let ds = new_dataset::<f32>(&file.root().unwrap(), "v", &DataSpace::simple(&[4]).unwrap());
        let e = ds.write(&[1.0f32, 2.0]).unwrap_err();
        assert!(matches!(e, Error::BufferSize { expected: 16, actual: 8 }));

        let mut short = [0.0f32; 3];
        let space = ds.data_space().unwrap();
        let e = ds
            .read_into(&space, &space, &Type::native::<f32>().unwrap(), &mut short)
            .unwrap_err();
        assert_eq!(e.kind(), ErrorKind::BufferSize);
    }
}
