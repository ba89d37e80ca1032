//! Directory-backed object store.

use crate::error::{StoreError, StoreResult};
use crate::store::{ObjectMeta, ObjectStore};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::trace;

/// Suffix of files that hold an object still being written.
const PARTIAL_SUFFIX: &str = ".partial";

/// An object store that keeps one file per object under a root directory.
///
/// The root plays the role of a bucket. Key segments separated by `/` map
/// onto nested directories, so `db/0000000001` lives at `<root>/db/0000000001`.
/// Leading `/`s are dropped when mapping a key to a path, so an absolute
/// name such as `/tmp/app.db` lives under `<root>/tmp/app.db` and aliases
/// `tmp/app.db`. Listings keep the spelling of the requested prefix.
///
/// # Durability
///
/// `put` writes the object to a sibling `.partial` file, calls
/// `File::sync_all()`, and renames it into place. A concurrent `get` sees
/// either the old object or the new one.
///
/// # Example
///
/// ```no_run
/// use blockvfs_store::{DirObjectStore, ObjectStore};
/// use std::path::Path;
///
/// let store = DirObjectStore::open(Path::new("bucket")).unwrap();
/// store.put("db/0000000000", b"page one").unwrap();
/// ```
#[derive(Debug)]
pub struct DirObjectStore {
    root: PathBuf,
}

impl DirObjectStore {
    /// Opens a store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(root: &Path) -> StoreResult<Self> {
        fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Returns the root directory of the bucket.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, key: &str) -> StoreResult<PathBuf> {
        let segments: Vec<&str> = key.trim_start_matches('/').split('/').collect();
        if segments.iter().any(|s| !is_valid_segment(s)) {
            return Err(StoreError::InvalidKey(key.to_owned()));
        }
        Ok(segments.iter().fold(self.root.clone(), |p, s| p.join(s)))
    }

    /// Directory that must contain every object matching `prefix`.
    fn listing_dir(&self, prefix: &str) -> StoreResult<(PathBuf, String)> {
        match prefix.rfind('/') {
            None => Ok((self.root.clone(), String::new())),
            Some(pos) => {
                let dir_key = &prefix[..pos];
                let dir = if dir_key.trim_start_matches('/').is_empty() {
                    self.root.clone()
                } else {
                    self.object_path(dir_key)?
                };
                Ok((dir, format!("{dir_key}/")))
            }
        }
    }

    fn collect(&self, dir: &Path, key_base: &str, prefix: &str, out: &mut Vec<ObjectMeta>) -> io::Result<()> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e),
        };

        for entry in entries {
            let entry = entry?;
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            let key = format!("{key_base}{name}");
            let file_type = entry.file_type()?;

            if file_type.is_dir() {
                let nested = format!("{key}/");
                if nested.starts_with(prefix) || prefix.starts_with(&nested) {
                    self.collect(&entry.path(), &nested, prefix, out)?;
                }
            } else if file_type.is_file() && !name.ends_with(PARTIAL_SUFFIX) && key.starts_with(prefix) {
                out.push(ObjectMeta {
                    key,
                    size: entry.metadata()?.len(),
                });
            }
        }
        Ok(())
    }

    /// Removes now-empty directories between `path` and the root.
    fn prune_empty_dirs(&self, path: &Path) {
        let mut current = path.parent();
        while let Some(dir) = current {
            if dir == self.root || !dir.starts_with(&self.root) {
                break;
            }
            if fs::remove_dir(dir).is_err() {
                break;
            }
            trace!(dir = %dir.display(), "pruned empty directory");
            current = dir.parent();
        }
    }
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.ends_with(PARTIAL_SUFFIX)
        && !segment.contains(['\\', '\0'])
}

impl ObjectStore for DirObjectStore {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let path = self.object_path(key)?;
        match fs::read(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, key: &str, data: &[u8]) -> StoreResult<()> {
        let path = self.object_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut partial = path.clone().into_os_string();
        partial.push(PARTIAL_SUFFIX);
        let partial = PathBuf::from(partial);

        {
            let mut file = File::create(&partial)?;
            file.write_all(data)?;
            file.sync_all()?;
        }
        fs::rename(&partial, &path)?;

        trace!(key, size = data.len(), "put object");
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        let path = self.object_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                trace!(key, "deleted object");
                self.prune_empty_dirs(&path);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn delete_prefix(&self, prefix: &str) -> StoreResult<u64> {
        let doomed = self.list(prefix)?;
        for meta in &doomed {
            self.delete(&meta.key)?;
        }
        Ok(doomed.len() as u64)
    }

    fn list(&self, prefix: &str) -> StoreResult<Vec<ObjectMeta>> {
        let (dir, key_base) = self.listing_dir(prefix)?;
        let mut out = Vec::new();
        self.collect(&dir, &key_base, prefix, &mut out)?;
        out.sort();
        Ok(out)
    }
}
