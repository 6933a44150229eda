//! The page tree: the standalone-pages source directory loaded into a tree of
//! [`Directory`] and leaf [`Content`] nodes, plus the memoizing
//! [`PageTreeBuilder`] that produces it.

use crate::error::{Error, Resource, Result};
use crate::markdown::{Content, ContentLoader};
use crate::storage::Storage;
use crate::util;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// A node in the page tree.
#[derive(Debug, Clone)]
pub enum PageNode {
    /// A subdirectory. Shared with the builder's cache.
    Directory(Rc<Directory>),

    /// A converted Markdown page.
    Leaf(Content),
}

/// A directory of pages, keyed by file or directory name. Iteration is in
/// name order.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    pub entries: BTreeMap<String, PageNode>,
}

impl Directory {
    /// Subdirectories, sorted by name.
    pub fn subdirectories(&self) -> impl Iterator<Item = (&str, &Directory)> {
        self.entries.iter().filter_map(|(name, node)| match node {
            PageNode::Directory(dir) => Some((name.as_str(), dir.as_ref())),
            PageNode::Leaf(_) => None,
        })
    }

    /// Pages directly inside this directory, sorted by file name.
    pub fn pages(&self) -> impl Iterator<Item = (&str, &Content)> {
        self.entries.iter().filter_map(|(name, node)| match node {
            PageNode::Leaf(page) => Some((name.as_str(), page)),
            PageNode::Directory(_) => None,
        })
    }

    /// Number of pages in this directory and all of its descendants.
    pub fn page_count(&self) -> usize {
        self.entries
            .values()
            .map(|node| match node {
                PageNode::Directory(dir) => dir.page_count(),
                PageNode::Leaf(_) => 1,
            })
            .sum()
    }
}

/// A page's display title: its `title` metadata if present, else the source
/// file name without extension.
pub fn page_title(file_name: &str, page: &Content) -> String {
    match page.meta.title() {
        Some(title) => title.to_owned(),
        None => util::stem(Path::new(file_name)),
    }
}

/// Loads page directories, remembering every directory it has loaded. The
/// cache is valid for one build run only; a builder must not outlive the
/// run that created it.
pub struct PageTreeBuilder<'a> {
    storage: &'a dyn Storage,
    loader: ContentLoader<'a>,
    cache: RefCell<HashMap<PathBuf, Rc<Directory>>>,
}

impl<'a> PageTreeBuilder<'a> {
    pub fn new(storage: &'a dyn Storage, loader: ContentLoader<'a>) -> PageTreeBuilder<'a> {
        PageTreeBuilder {
            storage,
            loader,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Loads `directory` recursively. Markdown files become leaves,
    /// subdirectories become nested directories, and everything else is
    /// ignored. A directory already loaded by this builder is returned from
    /// the cache without touching storage.
    pub fn load_pages(&self, directory: &Path) -> Result<Rc<Directory>> {
        if let Some(dir) = self.cache.borrow().get(directory) {
            log::debug!("page tree cache hit for '{}'", directory.display());
            return Ok(Rc::clone(dir));
        }

        let mut dir = Directory::default();
        let entries = self
            .storage
            .list(directory)
            .map_err(|e| Error::missing(Resource::Directory, directory, e))?;
        for entry in entries {
            let path = directory.join(&entry.name);
            if entry.is_file() && util::is_markdown(&entry.name) {
                let page = self.loader.load(&path)?;
                dir.entries.insert(entry.name, PageNode::Leaf(page));
            } else if entry.is_dir() {
                let subdir = self.load_pages(&path)?;
                dir.entries.insert(entry.name, PageNode::Directory(subdir));
            }
        }

        let dir = Rc::new(dir);
        self.cache
            .borrow_mut()
            .insert(directory.to_owned(), Rc::clone(&dir));
        Ok(dir)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::storage::MemoryStorage;

    fn storage() -> MemoryStorage {
        MemoryStorage::new()
            .with_file("pages/about.md", "title: About Me\n\nHello.")
            .with_file("pages/contact.md", "Write to me.")
            .with_file("pages/notes.txt", "ignored")
            .with_file("pages/projects/rust.md", "title: Rust\n\nCrabs.")
            .with_file("pages/projects/old/legacy.md", "Old stuff.")
            .with_dir("pages/empty")
    }

    #[test]
    fn test_load_pages_builds_tree() -> Result<()> {
        let storage = storage();
        let builder = PageTreeBuilder::new(&storage, ContentLoader::new(&storage, None));
        let tree = builder.load_pages(Path::new("pages"))?;

        let pages: Vec<&str> = tree.pages().map(|(name, _)| name).collect();
        assert_eq!(vec!["about.md", "contact.md"], pages);

        let dirs: Vec<&str> = tree.subdirectories().map(|(name, _)| name).collect();
        assert_eq!(vec!["empty", "projects"], dirs);

        let (_, projects) = tree
            .subdirectories()
            .find(|(name, _)| *name == "projects")
            .unwrap();
        assert_eq!(1, projects.pages().count());
        assert_eq!(1, projects.subdirectories().count());
        assert_eq!(4, tree.page_count());
        Ok(())
    }

    #[test]
    fn test_load_pages_is_memoized() -> Result<()> {
        let storage = storage();
        let builder = PageTreeBuilder::new(&storage, ContentLoader::new(&storage, None));

        let first = builder.load_pages(Path::new("pages"))?;
        let reads = storage.read_count();
        let second = builder.load_pages(Path::new("pages"))?;
        let nested = builder.load_pages(Path::new("pages/projects"))?;

        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(reads, storage.read_count());
        match first.entries.get("projects") {
            Some(PageNode::Directory(dir)) => assert!(Rc::ptr_eq(dir, &nested)),
            other => panic!("expected a directory, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_fresh_builder_does_not_share_cache() -> Result<()> {
        let storage = storage();
        let first = PageTreeBuilder::new(&storage, ContentLoader::new(&storage, None))
            .load_pages(Path::new("pages"))?;
        let second = PageTreeBuilder::new(&storage, ContentLoader::new(&storage, None))
            .load_pages(Path::new("pages"))?;
        assert!(!Rc::ptr_eq(&first, &second));
        assert_eq!(8, storage.read_count());
        Ok(())
    }

    #[test]
    fn test_missing_pages_directory_is_fatal() {
        let storage = MemoryStorage::new();
        let builder = PageTreeBuilder::new(&storage, ContentLoader::new(&storage, None));
        match builder.load_pages(Path::new("pages")) {
            Err(Error::MissingResource { kind, .. }) => assert_eq!(Resource::Directory, kind),
            other => panic!("expected a missing directory, got {:?}", other),
        }
    }

    #[test]
    fn test_page_title_falls_back_to_stem() -> Result<()> {
        let storage = storage();
        let builder = PageTreeBuilder::new(&storage, ContentLoader::new(&storage, None));
        let tree = builder.load_pages(Path::new("pages"))?;
        let titles: Vec<String> = tree
            .pages()
            .map(|(name, page)| page_title(name, page))
            .collect();
        assert_eq!(vec!["About Me", "contact"], titles);
        Ok(())
    }
}
