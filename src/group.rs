//! Group wrapper: hierarchy navigation, links, attributes and the
//! per-group dataset cache.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::ffi::CStr;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::os::raw::c_void;
use std::rc::Rc;

use hdf5_sys::h5::{H5_index_t, H5_iter_order_t};
use hdf5_sys::h5a::H5Aexists;
use hdf5_sys::h5g::{H5G_info_t, H5Gcreate2, H5Gget_info, H5Gopen2};
use hdf5_sys::h5i::{H5Iget_name, hid_t};
use hdf5_sys::h5l::{H5L_type_t, H5Lcreate_soft, H5Lexists, H5Lget_name_by_idx, H5Lget_val};
#[cfg(not(hdf5_1_12))]
use hdf5_sys::h5l::{H5L_info1_t, H5Lget_info1};
#[cfg(hdf5_1_12)]
use hdf5_sys::h5l::{H5L_info2_t, H5Lget_info2};
#[cfg(not(hdf5_1_12))]
use hdf5_sys::h5o::H5O_info1_t;
#[cfg(all(hdf5_1_10_3, not(hdf5_1_12)))]
use hdf5_sys::h5o::H5Oget_info2;
#[cfg(hdf5_1_12)]
use hdf5_sys::h5o::{H5O_MAX_TOKEN_SIZE, H5O_info2_t, H5Oget_info3};
#[cfg(hdf5_1_10_3)]
use hdf5_sys::h5o::H5O_INFO_BASIC;
#[cfg(not(hdf5_1_10_3))]
use hdf5_sys::h5o::H5Oget_info1;
use hdf5_sys::h5p::H5P_DEFAULT;

use crate::attribute::Attribute;
use crate::dataset::DataSet;
use crate::datatype::{H5Type, Type};
use crate::dataspace::DataSpace;
use crate::error::{Result, ResultExt};
use crate::handle::{Handle, ObjectKind};
use crate::library::h5call;
use crate::plist::{DataSetAccessProps, DataSetCreateProps};
use crate::util::{basename, parent_path, read_native_string, to_cstring};

/// Kind of link stored under a name in a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkType {
    Hard,
    Soft,
    External,
    UserDefined,
}

/// Identity of the object behind an id: the open file's number and the
/// object's location token (its header address on older libraries).
///
/// Independent of the path used to reach the object, so soft links and
/// renames do not change it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct ObjectIdentity {
    fileno: u64,
    token: [u8; 16],
}

#[cfg(hdf5_1_12)]
fn object_identity(id: hid_t) -> Result<ObjectIdentity> {
    // SAFETY: every field of H5O_info2_t is an integer, a byte array or an
    // enum with a zero discriminant.
    let mut info: H5O_info2_t = unsafe { std::mem::zeroed() };
    h5call!(H5Oget_info3(id, &mut info, H5O_INFO_BASIC))?;
    // SAFETY: H5O_token_t is a repr(C) wrapper around its byte array.
    let token: [u8; H5O_MAX_TOKEN_SIZE] = unsafe { std::mem::transmute(info.token) };
    Ok(ObjectIdentity {
        fileno: info.fileno as u64,
        token,
    })
}

#[cfg(not(hdf5_1_12))]
fn object_identity(id: hid_t) -> Result<ObjectIdentity> {
    let mut info = H5O_info1_t::default();
    #[cfg(hdf5_1_10_3)]
    h5call!(H5Oget_info2(id, &mut info, H5O_INFO_BASIC))?;
    #[cfg(not(hdf5_1_10_3))]
    h5call!(H5Oget_info1(id, &mut info))?;
    let mut token = [0u8; 16];
    token[..8].copy_from_slice(&info.addr.to_ne_bytes());
    Ok(ObjectIdentity {
        fileno: info.fileno as u64,
        token,
    })
}

/// Kind of a link and, for soft and external links, the size of its value.
struct LinkInfo {
    kind: H5L_type_t,
    val_size: usize,
}

#[cfg(hdf5_1_12)]
fn link_info(loc: hid_t, name: &CStr) -> Result<LinkInfo> {
    let mut info = H5L_info2_t::default();
    h5call!(H5Lget_info2(loc, name.as_ptr(), &mut info, H5P_DEFAULT))?;
    Ok(LinkInfo {
        kind: info.type_,
        val_size: unsafe { *info.u.val_size() },
    })
}

#[cfg(not(hdf5_1_12))]
fn link_info(loc: hid_t, name: &CStr) -> Result<LinkInfo> {
    let mut info = H5L_info1_t::default();
    h5call!(H5Lget_info1(loc, name.as_ptr(), &mut info, H5P_DEFAULT))?;
    Ok(LinkInfo {
        kind: info.type_,
        val_size: unsafe { *info.u.val_size() },
    })
}

type DsCache = BTreeMap<String, DataSet>;

/// Owning wrapper around a group id.
///
/// Names passed to group operations are relative to this group unless they
/// start with `/`, in which case they are resolved from the file root.
///
/// Clones share the id and the dataset cache. Datasets made through
/// [`Group::create_dataset`] stay cached, and therefore open, for as long
/// as any clone of the group is alive.
#[derive(Clone, Default)]
pub struct Group {
    handle: Handle,
    identity: Option<ObjectIdentity>,
    cache: Rc<RefCell<DsCache>>,
}

impl Group {
    pub(crate) fn create(loc: hid_t, name: &str) -> Result<Self> {
        let cname = to_cstring(name)?;
        let id = h5call!(H5Gcreate2(
            loc,
            cname.as_ptr(),
            H5P_DEFAULT,
            H5P_DEFAULT,
            H5P_DEFAULT
        ))
        .with_context(|| format!("group={name}"))?;
        tracing::debug!(name, id, "created group");
        Self::from_raw(id)
    }

    pub(crate) fn open(loc: hid_t, name: &str) -> Result<Self> {
        let cname = to_cstring(name)?;
        let id = h5call!(H5Gopen2(loc, cname.as_ptr(), H5P_DEFAULT))
            .with_context(|| format!("group={name}"))?;
        Self::from_raw(id)
    }

    fn from_raw(id: hid_t) -> Result<Self> {
        // Take ownership first so the id is closed if the lookup below fails.
        let handle = Handle::from_raw(id, ObjectKind::Group);
        let identity = object_identity(id)?;
        Ok(Self {
            handle,
            identity: Some(identity),
            cache: Rc::default(),
        })
    }

    fn id_for(&self, operation: &'static str) -> Result<hid_t> {
        self.handle.require(ObjectKind::Group, operation)
    }

    /// True while a live group id is held.
    pub fn valid(&self) -> bool {
        self.handle.valid()
    }

    /// Native group id, `None` once closed.
    pub fn id(&self) -> Option<hid_t> {
        self.handle.id()
    }

    /// Release this value's share of the group and its dataset cache.
    pub fn close(&mut self) {
        self.handle.close();
        self.identity = None;
        self.cache = Rc::default();
    }

    /// Create a child group.
    pub fn create_group(&self, name: &str) -> Result<Group> {
        Group::create(self.id_for("create_group")?, name)
    }

    /// Open an existing group.
    pub fn open_group(&self, name: &str) -> Result<Group> {
        Group::open(self.id_for("open_group")?, name)
    }

    /// Whether a link with this name exists.
    pub fn has_child(&self, name: &str) -> Result<bool> {
        let id = self.id_for("has_child")?;
        let cname = to_cstring(name)?;
        let exists = h5call!(H5Lexists(id, cname.as_ptr(), H5P_DEFAULT))
            .with_context(|| format!("name={name}"))?;
        Ok(exists > 0)
    }

    /// Names of all links in this group, in name order.
    pub fn children(&self) -> Result<Vec<String>> {
        let id = self.id_for("children")?;
        let mut info = H5G_info_t::default();
        h5call!(H5Gget_info(id, &mut info))?;
        (0..info.nlinks)
            .map(|idx| {
                read_native_string(|buf, size| {
                    h5call!(H5Lget_name_by_idx(
                        id,
                        c".".as_ptr(),
                        H5_index_t::H5_INDEX_NAME,
                        H5_iter_order_t::H5_ITER_INC,
                        idx,
                        buf,
                        size,
                        H5P_DEFAULT
                    ))
                })
            })
            .collect()
    }

    /// Enclosing group, or `None` for the root group.
    pub fn parent(&self) -> Result<Option<Group>> {
        let id = self.id_for("parent")?;
        let name = self.name()?;
        match parent_path(&name) {
            Some(parent) => Group::open(id, parent).map(Some),
            None => Ok(None),
        }
    }

    /// Absolute path of the group; ambiguous if the group has several links.
    pub fn name(&self) -> Result<String> {
        let id = self.id_for("name")?;
        read_native_string(|buf, size| h5call!(H5Iget_name(id, buf, size)))
    }

    /// Last component of [`Group::name`], `/` for the root.
    pub fn basename(&self) -> Result<String> {
        Ok(basename(&self.name()?).to_string())
    }

    /// Create an attribute on this group.
    pub fn create_attr<T: H5Type>(&self, name: &str, space: &DataSpace) -> Result<Attribute<T>> {
        Attribute::create(self.id_for("create_attr")?, name, space)
    }

    /// Open an attribute, `None` if the group has no attribute of that name.
    pub fn open_attr<T: H5Type>(&self, name: &str) -> Result<Option<Attribute<T>>> {
        if !self.has_attr(name)? {
            return Ok(None);
        }
        Attribute::open(self.id_for("open_attr")?, name).map(Some)
    }

    /// Whether the group carries an attribute called `name`.
    pub fn has_attr(&self, name: &str) -> Result<bool> {
        let id = self.id_for("has_attr")?;
        let cname = to_cstring(name)?;
        let exists = h5call!(H5Aexists(id, cname.as_ptr()))
            .with_context(|| format!("attribute={name}"))?;
        Ok(exists > 0)
    }

    /// Create a dataset whose stored type comes from `T`, and cache it.
    pub fn create_dataset<T: H5Type>(
        &self,
        name: &str,
        space: &DataSpace,
        create: &DataSetCreateProps,
        access: &DataSetAccessProps,
    ) -> Result<DataSet> {
        self.create_dataset_with_type(name, &T::stored_type()?, space, create, access)
    }

    /// Create a dataset with an explicit stored type, and cache it.
    ///
    /// A cached dataset of the same name is replaced.
    pub fn create_dataset_with_type(
        &self,
        name: &str,
        dtype: &Type,
        space: &DataSpace,
        create: &DataSetCreateProps,
        access: &DataSetAccessProps,
    ) -> Result<DataSet> {
        let id = self.id_for("create_dataset")?;
        let ds = DataSet::create(id, name, dtype, space, create, access)?;
        self.cache.borrow_mut().insert(name.to_string(), ds.clone());
        Ok(ds)
    }

    /// Open an existing dataset. Always opens afresh, the cache is neither
    /// consulted nor updated.
    pub fn open_dataset(&self, name: &str, access: &DataSetAccessProps) -> Result<DataSet> {
        DataSet::open(self.id_for("open_dataset")?, name, access)
    }

    /// Dataset previously created through this group under `name`.
    pub fn cached_dataset(&self, name: &str) -> Option<DataSet> {
        self.cache.borrow().get(name).cloned()
    }

    /// Names of all cached datasets.
    pub fn cached_names(&self) -> Vec<String> {
        self.cache.borrow().keys().cloned().collect()
    }

    /// Create soft link `link_name` in this group pointing at `target`.
    pub fn make_soft_link(&self, target: &str, link_name: &str) -> Result<()> {
        let id = self.id_for("make_soft_link")?;
        let ctarget = to_cstring(target)?;
        let clink = to_cstring(link_name)?;
        h5call!(H5Lcreate_soft(
            ctarget.as_ptr(),
            id,
            clink.as_ptr(),
            H5P_DEFAULT,
            H5P_DEFAULT
        ))
        .with_context(|| format!("target={target}, link={link_name}"))?;
        Ok(())
    }

    fn link_info(&self, name: &str, operation: &'static str) -> Result<LinkInfo> {
        let id = self.id_for(operation)?;
        let cname = to_cstring(name)?;
        link_info(id, &cname).with_context(|| format!("link={name}"))
    }

    /// Kind of the link stored under `name`.
    pub fn link_type(&self, name: &str) -> Result<LinkType> {
        let info = self.link_info(name, "link_type")?;
        Ok(match info.kind {
            H5L_type_t::H5L_TYPE_HARD => LinkType::Hard,
            H5L_type_t::H5L_TYPE_SOFT => LinkType::Soft,
            H5L_type_t::H5L_TYPE_EXTERNAL => LinkType::External,
            _ => LinkType::UserDefined,
        })
    }

    /// Target path of a soft link, `None` if `name` is another kind of link.
    pub fn soft_link(&self, name: &str) -> Result<Option<String>> {
        let info = self.link_info(name, "soft_link")?;
        if info.kind != H5L_type_t::H5L_TYPE_SOFT {
            return Ok(None);
        }
        let id = self.id_for("soft_link")?;
        let cname = to_cstring(name)?;
        let size = info.val_size;
        let mut buf = vec![0u8; size];
        h5call!(H5Lget_val(
            id,
            cname.as_ptr(),
            buf.as_mut_ptr() as *mut c_void,
            size,
            H5P_DEFAULT
        ))
        .with_context(|| format!("link={name}"))?;
        if let Some(nul) = buf.iter().position(|&b| b == 0) {
            buf.truncate(nul);
        }
        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }
}

/// Groups are equal when they refer to the same object of the same open
/// file, however they were reached.
impl PartialEq for Group {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl Eq for Group {}

impl PartialOrd for Group {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Group {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identity.cmp(&other.identity)
    }
}

impl Hash for Group {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity.hash(state);
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("handle", &self.handle)
            .field("identity", &self.identity)
            .finish()
    }
}

/// Dumps name and id of the group.
impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.name(), self.handle.id()) {
            (Ok(name), Some(id)) => write!(f, "Group(name={name}, id={id})"),
            _ => f.write_str("Group(invalid)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ErrorKind};
    use crate::file::{CreateMode, File};
    use crate::plist::{FileAccessProps, FileCreateProps};
    use hdf5_sys::h5i::H5Iis_valid;
    use pretty_assertions::assert_eq;
    use std::collections::{BTreeSet, HashSet};
    use tempfile::TempDir;

    fn scratch() -> (TempDir, File) {
        let dir = tempfile::tempdir().unwrap();
        let file = File::create(
            dir.path().join("group.h5"),
            CreateMode::Truncate,
            &FileCreateProps::default(),
            &FileAccessProps::default(),
        )
        .unwrap();
        (dir, file)
    }

    fn defaults() -> (DataSetCreateProps, DataSetAccessProps) {
        (DataSetCreateProps::default(), DataSetAccessProps::default())
    }

    #[test]
    fn test_create_then_has_child() {
        let (_dir, file) = scratch();
        let root = file.root().unwrap();
        for name in ["a", "b", "c"] {
            root.create_group(name).unwrap();
            assert!(root.has_child(name).unwrap());
        }
        assert!(!root.has_child("missing").unwrap());
        assert_eq!(root.children().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_relative_and_absolute_names() {
        let (_dir, file) = scratch();
        let root = file.root().unwrap();
        let g = root.create_group("g").unwrap();
        let sub = g.create_group("sub").unwrap();
        assert_eq!(sub.name().unwrap(), "/g/sub");
        assert_eq!(sub.basename().unwrap(), "sub");

        let via_abs = sub.open_group("/g").unwrap();
        assert_eq!(via_abs.name().unwrap(), "/g");
        assert!(root.has_child("g/sub").unwrap());
    }

    #[test]
    fn test_parent() {
        let (_dir, file) = scratch();
        let root = file.root().unwrap();
        assert_eq!(root.basename().unwrap(), "/");
        assert!(root.parent().unwrap().is_none());

        let g = root.create_group("g").unwrap();
        let sub = g.create_group("sub").unwrap();
        let parent = sub.parent().unwrap().unwrap();
        assert_eq!(parent, g);
        assert_eq!(g.parent().unwrap().unwrap(), root);
    }

    #[test]
    fn test_duplicate_group_fails() {
        let (_dir, file) = scratch();
        let root = file.root().unwrap();
        root.create_group("dup").unwrap();
        let e = root.create_group("dup").unwrap_err();
        assert_eq!(e.native_call(), Some("H5Gcreate2"));
        assert!(e.to_string().contains("group=dup"));
    }

    #[test]
    fn test_equality_and_ordering() {
        let (_dir, file) = scratch();
        let root = file.root().unwrap();
        root.create_group("x").unwrap();
        root.create_group("y").unwrap();

        let x1 = root.open_group("x").unwrap();
        let x2 = root.open_group("/x").unwrap();
        let y = root.open_group("y").unwrap();
        assert_ne!(x1.id(), x2.id());
        assert_eq!(x1, x2);
        assert_ne!(x1, y);
        assert_eq!(x1.cmp(&x2), Ordering::Equal);
        assert_eq!(x1.cmp(&y), y.cmp(&x1).reverse());
        assert_ne!(x1.cmp(&y), Ordering::Equal);

        let ordered: BTreeSet<Group> = [y.clone(), x1.clone(), x2.clone()].into_iter().collect();
        assert_eq!(ordered.len(), 2);
        let hashed: HashSet<Group> = [x1, x2, y].into_iter().collect();
        assert_eq!(hashed.len(), 2);
    }

    #[test]
    fn test_default_group_is_invalid() {
        let g = Group::default();
        assert!(!g.valid());
        assert_eq!(g.to_string(), "Group(invalid)");
        let e = g.create_group("x").unwrap_err();
        assert_eq!(e.kind(), ErrorKind::InvalidHandle);
        assert_eq!(g, Group::default());
    }

    #[test]
    fn test_close_group() {
        let (_dir, file) = scratch();
        let mut g = file.root().unwrap().create_group("g").unwrap();
        let other = g.clone();
        g.close();
        g.close();
        assert!(!g.valid());
        assert!(matches!(
            g.has_child("x"),
            Err(Error::InvalidHandle { operation: "has_child", .. })
        ));
        assert!(other.valid());
        assert_eq!(other.name().unwrap(), "/g");
    }

    #[test]
    fn test_display() {
        let (_dir, file) = scratch();
        let g = file.root().unwrap().create_group("shown").unwrap();
        let text = g.to_string();
        assert!(text.starts_with("Group(name=/shown, id="));
    }

    #[test]
    fn test_attributes() {
        let (_dir, file) = scratch();
        let g = file.root().unwrap().create_group("g").unwrap();
        assert!(!g.has_attr("version").unwrap());
        assert!(g.open_attr::<u32>("version").unwrap().is_none());

        let attr = g
            .create_attr::<u32>("version", &DataSpace::scalar().unwrap())
            .unwrap();
        attr.write_scalar(&7).unwrap();
        assert!(g.has_attr("version").unwrap());

        let back = g.open_attr::<u32>("version").unwrap().unwrap();
        assert_eq!(back.read_scalar().unwrap(), 7);

        let arr = g
            .create_attr::<f64>("scale", &DataSpace::simple(&[3]).unwrap())
            .unwrap();
        arr.write(&[0.5, 1.5, 2.5]).unwrap();
        assert_eq!(arr.read_vec().unwrap(), vec![0.5, 1.5, 2.5]);

        let e = arr.write(&[1.0]).unwrap_err();
        assert!(matches!(e, Error::BufferSize { expected: 24, actual: 8 }));
    }

    #[test]
    fn test_dataset_cache() {
        let (_dir, file) = scratch();
        let g = file.root().unwrap().create_group("g").unwrap();
        let (create, access) = defaults();
        let space = DataSpace::simple(&[4]).unwrap();

        let ds = g.create_dataset::<i32>("ds", &space, &create, &access).unwrap();
        assert_eq!(g.cached_names(), vec!["ds"]);
        assert_eq!(g.cached_dataset("ds").unwrap().id(), ds.id());

        let shared = g.clone();
        assert!(shared.cached_dataset("ds").is_some());

        let opened = g.open_dataset("ds", &access).unwrap();
        assert_ne!(opened.id(), ds.id());
        assert_eq!(g.cached_dataset("ds").unwrap().id(), ds.id());
        assert!(g.cached_dataset("other").is_none());
    }

    #[test]
    fn test_cache_last_write_wins() {
        let (_dir, file) = scratch();
        let g = file.root().unwrap().create_group("g").unwrap();
        let (create, access) = defaults();
        let space = DataSpace::scalar().unwrap();

        let first = g.create_dataset::<f32>("a", &space, &create, &access).unwrap();
        let f64_type = Type::stored::<f64>().unwrap();
        let second = g
            .create_dataset_with_type("/g/b", &f64_type, &space, &create, &access)
            .unwrap();
        assert_eq!(g.cached_names(), vec!["/g/b", "a"]);
        assert_eq!(g.cached_dataset("a").unwrap().id(), first.id());
        assert_eq!(g.cached_dataset("/g/b").unwrap().id(), second.id());

        // Re-creating an existing name fails natively and leaves the cache alone.
        let e = g.create_dataset::<f32>("a", &space, &create, &access).unwrap_err();
        assert_eq!(e.native_call(), Some("H5Dcreate2"));
        assert_eq!(g.cached_dataset("a").unwrap().id(), first.id());
    }

    #[test]
    fn test_close_drops_cache_share() {
        let (_dir, file) = scratch();
        let mut g = file.root().unwrap().create_group("g").unwrap();
        let (create, access) = defaults();
        g.create_dataset::<u8>("d", &DataSpace::scalar().unwrap(), &create, &access)
            .unwrap();
        g.close();
        assert!(g.cached_names().is_empty());
    }

    fn is_live(id: hid_t) -> bool {
        h5call!(H5Iis_valid(id)).unwrap() > 0
    }

    #[test]
    fn test_cached_datasets_close_with_last_share() {
        let (_dir, file) = scratch();
        let mut g = file.root().unwrap().create_group("g").unwrap();
        let shared = g.clone();
        let (create, access) = defaults();
        let id = g
            .create_dataset::<i32>("d", &DataSpace::simple(&[2]).unwrap(), &create, &access)
            .unwrap()
            .id()
            .unwrap();

        g.close();
        assert!(is_live(id));
        assert_eq!(shared.cached_dataset("d").unwrap().id(), Some(id));

        drop(shared);
        assert!(!is_live(id));
    }

    #[test]
    fn test_soft_links() {
        let (_dir, file) = scratch();
        let root = file.root().unwrap();
        let g = root.create_group("g").unwrap();
        let (create, access) = defaults();
        g.create_dataset::<i64>("ds", &DataSpace::scalar().unwrap(), &create, &access)
            .unwrap()
            .write_scalar(&-5i64)
            .unwrap();

        root.make_soft_link("/g/ds", "alias").unwrap();
        assert_eq!(root.link_type("alias").unwrap(), LinkType::Soft);
        assert_eq!(root.link_type("g").unwrap(), LinkType::Hard);
        assert_eq!(root.soft_link("alias").unwrap().as_deref(), Some("/g/ds"));
        assert_eq!(root.soft_link("g").unwrap(), None);

        let via_link = root.open_dataset("alias", &access).unwrap();
        assert_eq!(via_link.read_scalar::<i64>().unwrap(), -5);

        // Dangling soft links are allowed and resolved at access time.
        root.make_soft_link("nowhere", "dangling").unwrap();
        assert!(root.has_child("dangling").unwrap());
        assert!(root.open_dataset("dangling", &access).is_err());

        let e = root.link_type("missing").unwrap_err();
        assert_eq!(e.kind(), ErrorKind::NativeCall);
        assert!(e.to_string().contains("link=missing"));
    }

    #[test]
    fn test_group_reached_through_soft_link_is_its_target() {
        let (_dir, file) = scratch();
        let root = file.root().unwrap();
        let target = root.create_group("g").unwrap();
        root.make_soft_link("/g", "alias").unwrap();

        let via_alias = root.open_group("alias").unwrap();
        assert_eq!(via_alias.name().unwrap(), "/alias");
        assert_eq!(via_alias, target);
        assert_eq!(via_alias.cmp(&target), Ordering::Equal);

        let other = root.create_group("other").unwrap();
        assert_ne!(via_alias, other);

        let set: HashSet<Group> = [target, via_alias, root.open_group("/g").unwrap()]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 1);
    }
}
