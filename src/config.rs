//! Project layout and site-wide metadata.
//!
//! A project directory looks like this:
//!
//! ```text
//! meta.md          site metadata: title, tagline, author, url
//! nanosite.yaml    optional build settings
//! pages/           standalone pages, possibly nested in category directories
//! posts/           blog posts (flat)
//! templates/       {header,footer,main,front,page,post}-template.html
//! ```

use crate::error::{Error, Resource, Result};
use crate::markdown::{self, Metadata};
use crate::storage::Storage;
use crate::template::token_for;
use anyhow::anyhow;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const PROJECT_FILE: &str = "nanosite.yaml";
pub const META_FILE: &str = "meta.md";
pub const PAGES_DIRECTORY: &str = "pages";
pub const POSTS_DIRECTORY: &str = "posts";
pub const TEMPLATES_DIRECTORY: &str = "templates";
pub const ARCHIVE_DIRECTORY: &str = "archive";

#[derive(Deserialize)]
struct FrontMaxPosts(usize);
impl Default for FrontMaxPosts {
    fn default() -> Self {
        FrontMaxPosts(5)
    }
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct Project {
    #[serde(default)]
    front_max_posts: FrontMaxPosts,

    #[serde(default)]
    output_directory: Option<PathBuf>,
}

/// Where everything lives, plus the handful of build settings.
#[derive(Debug, Clone)]
pub struct Config {
    /// The project directory.
    pub root_directory: PathBuf,

    /// The site metadata file.
    pub meta_file: PathBuf,

    /// Source directory for standalone pages.
    pub pages_directory: PathBuf,

    /// Source directory for posts.
    pub posts_directory: PathBuf,

    /// Directory holding the template files.
    pub templates_directory: PathBuf,

    /// Root of the generated site. `index.html`, `archive.html` and one file
    /// per page are written here.
    pub output_directory: PathBuf,

    /// Where post permalink documents are written.
    pub archive_output_directory: PathBuf,

    /// The archive's path relative to the site URL, with a trailing slash.
    pub archive_url_path: String,

    /// How many of the most recent posts the front page shows.
    pub front_max_posts: usize,
}

impl Config {
    /// The default layout rooted at `root_directory`, writing output into the
    /// project directory itself.
    pub fn new(root_directory: impl Into<PathBuf>) -> Config {
        let root: PathBuf = root_directory.into();
        Config::with_project(root, Project::default())
    }

    fn with_project(root: PathBuf, project: Project) -> Config {
        let output_directory = match project.output_directory {
            Some(dir) => root.join(dir),
            None => root.clone(),
        };
        Config {
            meta_file: root.join(META_FILE),
            pages_directory: root.join(PAGES_DIRECTORY),
            posts_directory: root.join(POSTS_DIRECTORY),
            templates_directory: root.join(TEMPLATES_DIRECTORY),
            archive_output_directory: output_directory.join(ARCHIVE_DIRECTORY),
            archive_url_path: format!("{}/", ARCHIVE_DIRECTORY),
            output_directory,
            front_max_posts: project.front_max_posts.0,
            root_directory: root,
        }
    }

    /// Sets the front-page cap.
    pub fn front_max_posts(mut self, front_max_posts: usize) -> Config {
        self.front_max_posts = front_max_posts;
        self
    }

    /// Loads the configuration for the project in `dir`, reading
    /// [`PROJECT_FILE`] if there is one.
    pub fn from_directory(dir: &Path) -> anyhow::Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            match Config::from_project_file(&path) {
                Ok(config) => Ok(config),
                Err(e) => Err(anyhow!("Loading configuration: {:?}", e)),
            }
        } else {
            Ok(Config::new(dir))
        }
    }

    /// Loads the configuration from a project file; the project directory is
    /// the file's parent.
    pub fn from_project_file(path: &Path) -> anyhow::Result<Config> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Opening project file `{}`: {}", path.display(), e))?;
        let project: Project = match contents.trim().is_empty() {
            true => Project::default(),
            false => serde_yaml::from_str(&contents)?,
        };
        match path.parent() {
            None => Err(anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )),
            Some(project_root) => Ok(Config::with_project(project_root.to_owned(), project)),
        }
    }
}

/// Site-wide metadata, loaded once per build from [`META_FILE`]. The `url`
/// value always ends with `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteMetadata {
    meta: Metadata,
}

const EXPECTED_KEYS: [&str; 4] = ["title", "tagline", "author", "url"];

impl SiteMetadata {
    /// Reads the metadata file's front matter. The file must exist; missing
    /// individual keys only produce a warning.
    pub fn load(storage: &dyn Storage, path: &Path) -> Result<SiteMetadata> {
        let raw = storage
            .read(path)
            .map_err(|e| Error::missing(Resource::SiteMetadata, path, e))?;
        Ok(SiteMetadata::from_metadata(markdown::convert(&raw).meta))
    }

    pub fn from_metadata(mut meta: Metadata) -> SiteMetadata {
        for key in EXPECTED_KEYS.iter() {
            if meta.get(key).is_none() {
                log::warn!("site metadata has no `{}`; using an empty value", key);
            }
        }
        let url = meta.get("url").unwrap_or_default();
        if !url.ends_with('/') {
            let url = format!("{}/", url);
            meta.set("url", &url);
        }
        SiteMetadata { meta }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.meta.get(key)
    }

    fn get_or_empty(&self, key: &str) -> &str {
        self.meta.get(key).unwrap_or_default()
    }

    pub fn title(&self) -> &str {
        self.get_or_empty("title")
    }

    pub fn tagline(&self) -> &str {
        self.get_or_empty("tagline")
    }

    pub fn author(&self) -> &str {
        self.get_or_empty("author")
    }

    /// The site's base URL, with a trailing slash.
    pub fn url(&self) -> &str {
        self.get_or_empty("url")
    }

    /// `$key$ -> value` bindings for every key, in file order.
    pub fn token_bindings(&self) -> Vec<(String, String)> {
        self.meta
            .iter()
            .map(|(k, v)| (token_for(k), v.to_owned()))
            .collect()
    }
}
