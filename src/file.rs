//! File lifecycle: create, open, flush and close.

use std::fmt;
use std::path::{Path, PathBuf};

use hdf5_sys::h5f::{
    H5F_ACC_EXCL, H5F_ACC_RDONLY, H5F_ACC_RDWR, H5F_ACC_TRUNC, H5F_scope_t, H5Fcreate, H5Fflush,
    H5Fopen,
};
use hdf5_sys::h5i::hid_t;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ResultExt};
use crate::group::Group;
use crate::handle::{Handle, ObjectKind};
use crate::library::h5call;
use crate::plist::{FileAccessProps, FileCreateProps};
use crate::util::path_to_cstring;

/// How [`File::create`] treats an existing file at the target path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreateMode {
    /// Overwrite any existing file.
    Truncate,
    /// Fail if the file already exists.
    Exclusive,
}

impl CreateMode {
    fn flags(self) -> u32 {
        match self {
            CreateMode::Truncate => H5F_ACC_TRUNC,
            CreateMode::Exclusive => H5F_ACC_EXCL,
        }
    }
}

impl fmt::Display for CreateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CreateMode::Truncate => "Truncate",
            CreateMode::Exclusive => "Exclusive",
        })
    }
}

/// Access mode for [`File::open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenMode {
    Read,
    Update,
}

impl OpenMode {
    fn flags(self) -> u32 {
        match self {
            OpenMode::Read => H5F_ACC_RDONLY,
            OpenMode::Update => H5F_ACC_RDWR,
        }
    }
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OpenMode::Read => "Read",
            OpenMode::Update => "Update",
        })
    }
}

/// Owning wrapper around a file id.
///
/// # Lifecycle
///
/// A default `File` is unopened. [`File::create`] and [`File::open`] return
/// an open file; [`File::close`] releases this value's share. The native
/// file stays open while clones, or objects opened from it, are alive
/// (weak close degree by default).
#[derive(Debug, Clone, Default)]
pub struct File {
    handle: Handle,
    path: PathBuf,
}

impl File {
    /// Create a new file at `path`.
    ///
    /// # Errors
    ///
    /// [`Error::NativeCall`](crate::Error::NativeCall) naming the path and
    /// mode, e.g. when `mode` is [`CreateMode::Exclusive`] and the file exists.
    pub fn create(
        path: impl AsRef<Path>,
        mode: CreateMode,
        create: &FileCreateProps,
        access: &FileAccessProps,
    ) -> Result<Self> {
        let path = path.as_ref();
        let cpath = path_to_cstring(path)?;
        let id = h5call!(H5Fcreate(cpath.as_ptr(), mode.flags(), create.id(), access.id()))
            .with_context(|| format!("path={}, mode={mode}", path.display()))?;
        tracing::debug!(path = %path.display(), %mode, id, "created file");
        Ok(Self::from_raw(id, path))
    }

    /// Open an existing file at `path`.
    ///
    /// # Errors
    ///
    /// [`Error::NativeCall`](crate::Error::NativeCall) naming the path and mode.
    pub fn open(path: impl AsRef<Path>, mode: OpenMode, access: &FileAccessProps) -> Result<Self> {
        let path = path.as_ref();
        let cpath = path_to_cstring(path)?;
        let id = h5call!(H5Fopen(cpath.as_ptr(), mode.flags(), access.id()))
            .with_context(|| format!("path={}, mode={mode}", path.display()))?;
        tracing::debug!(path = %path.display(), %mode, id, "opened file");
        Ok(Self::from_raw(id, path))
    }

    fn from_raw(id: hid_t, path: &Path) -> Self {
        Self {
            handle: Handle::from_raw(id, ObjectKind::File),
            path: path.to_path_buf(),
        }
    }

    fn id_for(&self, operation: &'static str) -> Result<hid_t> {
        self.handle.require(ObjectKind::File, operation)
    }

    /// True while a file id is held.
    pub fn valid(&self) -> bool {
        self.handle.valid()
    }

    /// Native file id, `None` once closed.
    pub fn id(&self) -> Option<hid_t> {
        self.handle.id()
    }

    /// Path the file was created or opened with.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release this value's share of the file.
    pub fn close(&mut self) {
        if self.handle.valid() {
            tracing::debug!(path = %self.path.display(), "closing file");
        }
        self.handle.close();
    }

    /// Flush buffered data of this file to storage.
    pub fn flush(&self) -> Result<()> {
        let id = self.id_for("flush")?;
        h5call!(H5Fflush(id, H5F_scope_t::H5F_SCOPE_LOCAL))
            .with_context(|| format!("path={}", self.path.display()))?;
        Ok(())
    }

    /// Root group `/`.
    pub fn root(&self) -> Result<Group> {
        Group::open(self.id_for("root")?, "/")
    }

    /// Create a group; relative names resolve from the root.
    pub fn create_group(&self, name: &str) -> Result<Group> {
        Group::create(self.id_for("create_group")?, name)
    }

    /// Open an existing group; relative names resolve from the root.
    pub fn open_group(&self, name: &str) -> Result<Group> {
        Group::open(self.id_for("open_group")?, name)
    }

    /// Whether the root group has a link called `name`.
    pub fn has_child(&self, name: &str) -> Result<bool> {
        self.root()?.has_child(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;

    fn create(path: &Path, mode: CreateMode) -> Result<File> {
        File::create(
            path,
            mode,
            &FileCreateProps::default(),
            &FileAccessProps::default(),
        )
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(CreateMode::Exclusive.to_string(), "Exclusive");
        assert_eq!(OpenMode::Update.to_string(), "Update");
        assert_eq!(serde_json::to_string(&CreateMode::Truncate).unwrap(), "\"truncate\"");
        let mode: OpenMode = serde_json::from_str("\"read\"").unwrap();
        assert_eq!(mode, OpenMode::Read);
    }

    #[test]
    fn test_create_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.h5");
        {
            let file = create(&path, CreateMode::Truncate).unwrap();
            assert!(file.valid());
            assert_eq!(file.path(), path.as_path());
            file.create_group("g").unwrap();
            assert!(file.has_child("g").unwrap());
            file.flush().unwrap();
        }
        let file = File::open(&path, OpenMode::Update, &FileAccessProps::default()).unwrap();
        assert!(file.has_child("g").unwrap());
        file.open_group("/g").unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_path_names_the_same_file() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(OsStr::from_bytes(b"data\xff.h5"));
        drop(create(&path, CreateMode::Exclusive).unwrap());

        assert!(path.exists());
        let lossy = dir.path().join("data\u{fffd}.h5");
        assert!(!lossy.exists());
        let file = File::open(&path, OpenMode::Read, &FileAccessProps::default()).unwrap();
        assert_eq!(file.path(), path.as_path());
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.h5");
        let e = File::open(&path, OpenMode::Read, &FileAccessProps::default()).unwrap_err();
        assert_eq!(e.native_call(), Some("H5Fopen"));
        let msg = e.to_string();
        assert!(msg.contains("missing.h5"), "{msg}");
        assert!(msg.contains("mode=Read"), "{msg}");
    }

    #[test]
    fn test_close_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = create(&dir.path().join("c.h5"), CreateMode::Truncate).unwrap();
        let other = file.clone();
        file.close();
        file.close();
        assert!(!file.valid());
        assert_eq!(file.root().unwrap_err().kind(), ErrorKind::InvalidHandle);
        assert_eq!(file.flush().unwrap_err().kind(), ErrorKind::InvalidHandle);
        assert!(other.root().is_ok());
    }

    #[test]
    fn test_default_file() {
        let file = File::default();
        assert!(!file.valid());
        assert_eq!(file.id(), None);
        assert!(file.create_group("g").is_err());
    }
}
