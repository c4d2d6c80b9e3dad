//! Property lists.
//!
//! Unlike the other wrappers a property list is never shared: cloning
//! deep-copies the native list. The distinguished default list stands for
//! `H5P_DEFAULT`, is never copied and never closed. A default list acquires
//! a class on first mutation, so `Default` values cost nothing until used.

use std::os::raw::{c_double, c_int, c_uint};

use hdf5_sys::h5::hsize_t;
use hdf5_sys::h5d::H5D_layout_t;
use hdf5_sys::h5f::H5F_close_degree_t;
use hdf5_sys::h5i::hid_t;
use hdf5_sys::h5p::{
    self, H5P_DEFAULT, H5Pclose, H5Pcopy, H5Pcreate, H5Pget_chunk, H5Pget_chunk_cache,
    H5Pget_fclose_degree, H5Pget_layout, H5Pget_nfilters, H5Pget_userblock,
    H5Pset_chunk, H5Pset_chunk_cache, H5Pset_deflate, H5Pset_fclose_degree, H5Pset_shuffle,
    H5Pset_userblock,
};
use libc::size_t;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ResultExt};
use crate::library::h5call;

/// Property list class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PListClass {
    FileCreate,
    FileAccess,
    DataSetCreate,
    DataSetAccess,
}

impl PListClass {
    /// Native class id. Only meaningful once the library is initialised,
    /// so this is evaluated inside `h5call!`.
    fn class_id(self) -> hid_t {
        match self {
            PListClass::FileCreate => *h5p::H5P_CLS_FILE_CREATE,
            PListClass::FileAccess => *h5p::H5P_CLS_FILE_ACCESS,
            PListClass::DataSetCreate => *h5p::H5P_CLS_DATASET_CREATE,
            PListClass::DataSetAccess => *h5p::H5P_CLS_DATASET_ACCESS,
        }
    }
}

/// Owning wrapper around one property list id, or the default list.
#[derive(Debug)]
pub struct PropertyList {
    id: hid_t,
}

impl PropertyList {
    /// The process-wide default list.
    pub const fn default_list() -> Self {
        Self { id: H5P_DEFAULT }
    }

    /// New list of the given class.
    pub fn new(class: PListClass) -> Result<Self> {
        let id = h5call!(H5Pcreate(class.class_id())).with_context(|| format!("class={class:?}"))?;
        Ok(Self { id })
    }

    pub(crate) fn from_raw(id: hid_t) -> Self {
        Self { id }
    }

    pub fn is_default(&self) -> bool {
        self.id == H5P_DEFAULT
    }

    /// Id to pass to native calls (`H5P_DEFAULT` for the default list).
    pub fn id(&self) -> hid_t {
        self.id
    }

    /// Deep copy. The default list is returned as the default list.
    pub fn try_clone(&self) -> Result<Self> {
        if self.is_default() {
            return Ok(Self::default_list());
        }
        let id = h5call!(H5Pcopy(self.id))?;
        Ok(Self { id })
    }

    /// Give a default list its class. Lists that already have a class are
    /// left untouched.
    pub fn set_class(&mut self, class: PListClass) -> Result<()> {
        if self.is_default() {
            *self = Self::new(class)?;
        }
        Ok(())
    }
}

impl Default for PropertyList {
    fn default() -> Self {
        Self::default_list()
    }
}

impl Drop for PropertyList {
    fn drop(&mut self) {
        if self.is_default() {
            return;
        }
        if let Err(e) = h5call!(H5Pclose(self.id)) {
            tracing::warn!(id = self.id, error = %e, "failed to close property list");
        }
    }
}

macro_rules! plist_variant {
    ($(#[$meta:meta])* $name:ident, $class:expr) => {
        $(#[$meta])*
        #[derive(Debug, Default)]
        pub struct $name {
            plist: PropertyList,
        }

        impl $name {
            /// New list with its class already set.
            pub fn new() -> Result<Self> {
                Ok(Self {
                    plist: PropertyList::new($class)?,
                })
            }

            pub fn plist(&self) -> &PropertyList {
                &self.plist
            }

            pub fn id(&self) -> hid_t {
                self.plist.id()
            }

            pub fn is_default(&self) -> bool {
                self.plist.is_default()
            }

            pub fn try_clone(&self) -> Result<Self> {
                Ok(Self {
                    plist: self.plist.try_clone()?,
                })
            }

            fn classed_id(&mut self) -> Result<hid_t> {
                self.plist.set_class($class)?;
                Ok(self.plist.id())
            }
        }
    };
}

plist_variant!(
    /// File creation properties.
    FileCreateProps,
    PListClass::FileCreate
);

plist_variant!(
    /// File access properties.
    FileAccessProps,
    PListClass::FileAccess
);

plist_variant!(
    /// Dataset creation properties: layout and filters.
    DataSetCreateProps,
    PListClass::DataSetCreate
);

plist_variant!(
    /// Dataset access properties.
    DataSetAccessProps,
    PListClass::DataSetAccess
);

impl DataSetCreateProps {
    /// Adopt a creation list returned by the library, e.g. `H5Dget_create_plist`.
    pub(crate) fn from_raw(id: hid_t) -> Self {
        Self {
            plist: PropertyList::from_raw(id),
        }
    }
}

/// File close behaviour when objects inside the file are still open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloseDegree {
    Default,
    Weak,
    Semi,
    Strong,
}

impl From<CloseDegree> for H5F_close_degree_t {
    fn from(d: CloseDegree) -> Self {
        match d {
            CloseDegree::Default => H5F_close_degree_t::H5F_CLOSE_DEFAULT,
            CloseDegree::Weak => H5F_close_degree_t::H5F_CLOSE_WEAK,
            CloseDegree::Semi => H5F_close_degree_t::H5F_CLOSE_SEMI,
            CloseDegree::Strong => H5F_close_degree_t::H5F_CLOSE_STRONG,
        }
    }
}

impl From<H5F_close_degree_t> for CloseDegree {
    fn from(d: H5F_close_degree_t) -> Self {
        match d {
            H5F_close_degree_t::H5F_CLOSE_WEAK => CloseDegree::Weak,
            H5F_close_degree_t::H5F_CLOSE_SEMI => CloseDegree::Semi,
            H5F_close_degree_t::H5F_CLOSE_STRONG => CloseDegree::Strong,
            _ => CloseDegree::Default,
        }
    }
}

impl FileCreateProps {
    /// Reserve `size` bytes at the start of the file for user data.
    pub fn set_userblock(&mut self, size: u64) -> Result<()> {
        let id = self.classed_id()?;
        h5call!(H5Pset_userblock(id, size as hsize_t)).with_context(|| format!("size={size}"))?;
        Ok(())
    }

    pub fn userblock(&self) -> Result<u64> {
        if self.is_default() {
            return Ok(0);
        }
        let mut size: hsize_t = 0;
        h5call!(H5Pget_userblock(self.id(), &mut size))?;
        Ok(size as u64)
    }

    /// Build from JSON such as `{"userblock": 512}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let opts: FileCreateOptions = serde_json::from_str(json)?;
        opts.into_props()
    }
}

impl FileAccessProps {
    pub fn set_close_degree(&mut self, degree: CloseDegree) -> Result<()> {
        let id = self.classed_id()?;
        h5call!(H5Pset_fclose_degree(id, degree.into()))
            .with_context(|| format!("degree={degree:?}"))?;
        Ok(())
    }

    pub fn close_degree(&self) -> Result<CloseDegree> {
        if self.is_default() {
            return Ok(CloseDegree::Default);
        }
        let mut degree = H5F_close_degree_t::H5F_CLOSE_DEFAULT;
        h5call!(H5Pget_fclose_degree(self.id(), &mut degree))?;
        Ok(degree.into())
    }

    /// Build from JSON such as `{"close_degree": "strong"}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let opts: FileAccessOptions = serde_json::from_str(json)?;
        opts.into_props()
    }
}

impl DataSetCreateProps {
    /// Use chunked layout with the given chunk shape.
    pub fn set_chunk(&mut self, dims: &[u64]) -> Result<()> {
        let id = self.classed_id()?;
        h5call!(H5Pset_chunk(
            id,
            dims.len() as c_int,
            dims.as_ptr() as *const hsize_t
        ))
        .with_context(|| format!("chunk={dims:?}"))?;
        Ok(())
    }

    /// Chunked layout for rank-1 datasets.
    pub fn set_chunk_1d(&mut self, size: u64) -> Result<()> {
        self.set_chunk(&[size])
    }

    /// Add the deflate (zlib) filter at `level` 0-9.
    pub fn set_deflate(&mut self, level: u32) -> Result<()> {
        let id = self.classed_id()?;
        h5call!(H5Pset_deflate(id, level as c_uint)).with_context(|| format!("level={level}"))?;
        Ok(())
    }

    /// Add the byte shuffle filter.
    pub fn set_shuffle(&mut self) -> Result<()> {
        let id = self.classed_id()?;
        h5call!(H5Pset_shuffle(id))?;
        Ok(())
    }

    /// Chunk shape, `None` unless the layout is chunked.
    pub fn chunk(&self) -> Result<Option<Vec<u64>>> {
        if self.is_default() {
            return Ok(None);
        }
        if h5call!(H5Pget_layout(self.id()))? != H5D_layout_t::H5D_CHUNKED {
            return Ok(None);
        }
        let mut dims = [0 as hsize_t; 32];
        let rank = h5call!(H5Pget_chunk(self.id(), dims.len() as c_int, dims.as_mut_ptr()))?;
        Ok(Some(dims[..rank as usize].to_vec()))
    }

    /// Number of filters in the pipeline.
    pub fn filter_count(&self) -> Result<usize> {
        if self.is_default() {
            return Ok(0);
        }
        Ok(h5call!(H5Pget_nfilters(self.id()))? as usize)
    }

    /// Build from JSON such as `{"chunk": [64], "deflate": 6, "shuffle": true}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let opts: DataSetCreateOptions = serde_json::from_str(json)?;
        opts.into_props()
    }
}

impl DataSetAccessProps {
    /// Raw chunk cache parameters.
    pub fn set_chunk_cache(&mut self, slots: usize, bytes: usize, w0: f64) -> Result<()> {
        let id = self.classed_id()?;
        h5call!(H5Pset_chunk_cache(
            id,
            slots as size_t,
            bytes as size_t,
            w0 as c_double
        ))
        .with_context(|| format!("slots={slots}, bytes={bytes}, w0={w0}"))?;
        Ok(())
    }

    pub fn chunk_cache(&self) -> Result<Option<ChunkCache>> {
        if self.is_default() {
            return Ok(None);
        }
        let (mut slots, mut bytes, mut w0): (size_t, size_t, c_double) = (0, 0, 0.0);
        h5call!(H5Pget_chunk_cache(self.id(), &mut slots, &mut bytes, &mut w0))?;
        Ok(Some(ChunkCache { slots, bytes, w0 }))
    }

    /// Build from JSON such as `{"chunk_cache": {"slots": 521, "bytes": 1048576, "w0": 0.75}}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let opts: DataSetAccessOptions = serde_json::from_str(json)?;
        opts.into_props()
    }
}

/// JSON schema for file creation options.
#[derive(Debug, Default, Deserialize)]
struct FileCreateOptions {
    #[serde(default)]
    userblock: Option<u64>,
}

impl FileCreateOptions {
    fn into_props(self) -> Result<FileCreateProps> {
        let mut props = FileCreateProps::default();
        if let Some(size) = self.userblock {
            props.set_userblock(size)?;
        }
        Ok(props)
    }
}

/// JSON schema for file access options.
#[derive(Debug, Default, Deserialize)]
struct FileAccessOptions {
    #[serde(default)]
    close_degree: Option<CloseDegree>,
}

impl FileAccessOptions {
    fn into_props(self) -> Result<FileAccessProps> {
        let mut props = FileAccessProps::default();
        if let Some(degree) = self.close_degree {
            props.set_close_degree(degree)?;
        }
        Ok(props)
    }
}

/// JSON schema for dataset creation options.
#[derive(Debug, Default, Deserialize)]
struct DataSetCreateOptions {
    #[serde(default)]
    chunk: Option<Vec<u64>>,
    #[serde(default)]
    shuffle: Option<bool>,
    #[serde(default)]
    deflate: Option<u32>,
}

impl DataSetCreateOptions {
    fn into_props(self) -> Result<DataSetCreateProps> {
        let mut props = DataSetCreateProps::default();
        if let Some(chunk) = self.chunk {
            props.set_chunk(&chunk)?;
        }
        // Shuffle goes before deflate in the filter pipeline.
        if self.shuffle == Some(true) {
            props.set_shuffle()?;
        }
        if let Some(level) = self.deflate {
            props.set_deflate(level)?;
        }
        Ok(props)
    }
}

/// Chunk cache parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChunkCache {
    pub slots: usize,
    pub bytes: usize,
    pub w0: f64,
}

/// JSON schema for dataset access options.
#[derive(Debug, Default, Deserialize)]
struct DataSetAccessOptions {
    #[serde(default)]
    chunk_cache: Option<ChunkCache>,
}

impl DataSetAccessOptions {
    fn into_props(self) -> Result<DataSetAccessProps> {
        let mut props = DataSetAccessProps::default();
        if let Some(cache) = self.chunk_cache {
            props.set_chunk_cache(cache.slots, cache.bytes, cache.w0)?;
        }
        Ok(props)
    }
}
