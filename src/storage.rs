//! Defines the [`Storage`] trait through which every build stage touches
//! source and output files, along with two backends: [`FsStorage`] for the
//! real filesystem and [`MemoryStorage`] for tests.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::SystemTime;

/// Whether a [`DirEntry`] is a regular file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// An immediate child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// The entry's file name (not its full path).
    pub name: String,
    pub kind: EntryKind,
}

impl DirEntry {
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Synchronous access to source and output files. Paths are interpreted by
/// the backend; the build only ever joins them onto configured roots.
pub trait Storage {
    /// Reads a whole file as UTF-8.
    fn read(&self, path: &Path) -> io::Result<String>;

    /// Lists the immediate children of `dir`, sorted by name. Entries which
    /// are neither regular files nor directories are omitted.
    fn list(&self, dir: &Path) -> io::Result<Vec<DirEntry>>;

    /// Returns the creation time of a file.
    fn created(&self, path: &Path) -> io::Result<SystemTime>;

    /// Creates or truncates `path` with `contents`, creating any missing
    /// parent directories.
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;
}

/// [`Storage`] backed by the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsStorage;

impl FsStorage {
    pub fn new() -> Self {
        FsStorage
    }
}

impl Storage for FsStorage {
    fn read(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn list(&self, dir: &Path) -> io::Result<Vec<DirEntry>> {
        use walkdir::WalkDir;

        // `WalkDir` yields nothing at all for a plain file.
        if !fs::metadata(dir)?.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("not a directory: {}", dir.display()),
            ));
        }

        let mut entries = Vec::new();
        for result in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) if e.depth() > 0 && is_symlink(e.path()) => {
                    log::warn!("skipping broken link: {}", e);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            let kind = if entry.file_type().is_file() {
                EntryKind::File
            } else if entry.file_type().is_dir() {
                EntryKind::Directory
            } else {
                continue;
            };
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind,
            });
        }

        Ok(entries)
    }

    fn created(&self, path: &Path) -> io::Result<SystemTime> {
        let metadata = fs::metadata(path)?;
        match metadata.created() {
            Ok(time) => Ok(time),
            Err(_) => {
                log::warn!(
                    "creation time unavailable for '{}'; using modification time",
                    path.display()
                );
                metadata.modified()
            }
        }
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        fs::write(path, contents)
    }
}

fn is_symlink(path: Option<&Path>) -> bool {
    path.and_then(|path| fs::symlink_metadata(path).ok())
        .map_or(false, |metadata| metadata.file_type().is_symlink())
}

#[derive(Debug, Clone)]
struct MemoryFile {
    contents: String,
    created: SystemTime,
}

/// In-memory [`Storage`]. Directories exist implicitly as ancestors of files
/// or explicitly via [`MemoryStorage::with_dir`]. Files without an explicit
/// creation time were created at [`SystemTime::UNIX_EPOCH`].
///
/// ```ignore
/// let storage = MemoryStorage::new()
///     .with_file("posts/hello.md", "title: Hello\n\nHi there.")
///     .with_created("posts/hello.md", SystemTime::UNIX_EPOCH + Duration::from_secs(60));
/// ```
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: RwLock<BTreeMap<PathBuf, MemoryFile>>,
    dirs: RwLock<BTreeSet<PathBuf>>,
    reads: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file with the given contents.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_file(self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.files.write().unwrap().insert(
            path.into(),
            MemoryFile {
                contents: contents.into(),
                created: SystemTime::UNIX_EPOCH,
            },
        );
        self
    }

    /// Sets the creation time of a file previously added with
    /// [`MemoryStorage::with_file`].
    ///
    /// # Panics
    ///
    /// Panics if the file was never added or the internal lock is poisoned.
    #[must_use]
    pub fn with_created(self, path: impl AsRef<Path>, created: SystemTime) -> Self {
        self.files
            .write()
            .unwrap()
            .get_mut(path.as_ref())
            .expect("with_created called for a file that does not exist")
            .created = created;
        self
    }

    /// Adds an (initially empty) directory.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_dir(self, path: impl Into<PathBuf>) -> Self {
        self.dirs.write().unwrap().insert(path.into());
        self
    }

    /// Number of successful [`Storage::read`] calls so far.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Returns whether a file or directory exists at `path`.
    pub fn contains(&self, path: &Path) -> bool {
        self.files.read().unwrap().contains_key(path) || self.is_dir(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        if self.dirs.read().unwrap().iter().any(|d| d.starts_with(path)) {
            return true;
        }
        self.files
            .read()
            .unwrap()
            .keys()
            .any(|f| f != path && f.starts_with(path))
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("no such file or directory: {}", path.display()),
    )
}

/// Returns the first component of `path` below `dir`, plus whether that
/// component is the last one.
fn child_of(dir: &Path, path: &Path) -> Option<(String, bool)> {
    let rest = path.strip_prefix(dir).ok()?;
    let mut components = rest.components();
    let first = components.next()?;
    Some((
        first.as_os_str().to_string_lossy().into_owned(),
        components.next().is_none(),
    ))
}

impl Storage for MemoryStorage {
    fn read(&self, path: &Path) -> io::Result<String> {
        let files = self.files.read().unwrap();
        let file = files.get(path).ok_or_else(|| not_found(path))?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(file.contents.clone())
    }

    fn list(&self, dir: &Path) -> io::Result<Vec<DirEntry>> {
        if !self.is_dir(dir) {
            return Err(not_found(dir));
        }

        let mut children: BTreeMap<String, EntryKind> = BTreeMap::new();
        for path in self.files.read().unwrap().keys() {
            if let Some((name, last)) = child_of(dir, path) {
                let kind = if last {
                    EntryKind::File
                } else {
                    EntryKind::Directory
                };
                children.insert(name, kind);
            }
        }
        for path in self.dirs.read().unwrap().iter() {
            if let Some((name, _)) = child_of(dir, path) {
                children.insert(name, EntryKind::Directory);
            }
        }

        Ok(children
            .into_iter()
            .map(|(name, kind)| DirEntry { name, kind })
            .collect())
    }

    fn created(&self, path: &Path) -> io::Result<SystemTime> {
        self.files
            .read()
            .unwrap()
            .get(path)
            .map(|file| file.created)
            .ok_or_else(|| not_found(path))
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        let mut files = self.files.write().unwrap();
        let created = files
            .get(path)
            .map(|file| file.created)
            .unwrap_or(SystemTime::UNIX_EPOCH);
        files.insert(
            path.to_owned(),
            MemoryFile {
                contents: contents.to_owned(),
                created,
            },
        );
        Ok(())
    }
}
