//! Defines the [`PostPipeline`], which discovers posts, orders them newest
//! first, and renders each one through the post template.
//!
//! Posts live in a single flat directory. A post's date is its source file's
//! creation time; its permalink is `{site url}archive/{stem}.html`.

use crate::config::{Config, SiteMetadata};
use crate::error::{Error, Resource, Result};
use crate::markdown::ContentLoader;
use crate::storage::Storage;
use crate::template::{token, TemplateName, Templates};
use crate::util;
use chrono::{DateTime, Local};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::SystemTime;

/// A post after it has gone through the post template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPost {
    /// The post's `title` metadata, or the empty string.
    pub title: String,

    /// The URL of the post's archive document.
    pub permalink: String,

    /// The filled-in post template.
    pub html: String,
}

/// Formats a date as `D Mon YYYY`, e.g. `3 Jan 2024`.
pub fn format_date(date: &DateTime<Local>) -> String {
    date.format("%-d %b %Y").to_string()
}

/// Discovers and renders posts. Rendered posts are cached by source path for
/// the lifetime of the pipeline, which is one build run.
pub struct PostPipeline<'a> {
    storage: &'a dyn Storage,
    loader: ContentLoader<'a>,
    templates: &'a Templates,
    site: &'a SiteMetadata,
    posts_directory: &'a Path,
    archive_url_path: &'a str,
    front_max_posts: usize,
    cache: RefCell<HashMap<PathBuf, Rc<RenderedPost>>>,
}

impl<'a> PostPipeline<'a> {
    pub fn new(
        storage: &'a dyn Storage,
        templates: &'a Templates,
        site: &'a SiteMetadata,
        config: &'a Config,
    ) -> PostPipeline<'a> {
        PostPipeline {
            storage,
            loader: ContentLoader::new(storage, Some(site)),
            templates,
            site,
            posts_directory: &config.posts_directory,
            archive_url_path: &config.archive_url_path,
            front_max_posts: config.front_max_posts,
            cache: RefCell::new(HashMap::new()),
        }
    }

    fn created(&self, path: &Path) -> Result<SystemTime> {
        self.storage
            .created(path)
            .map_err(|e| Error::content(path, e))
    }

    /// Returns the paths of all posts (Markdown files in the posts
    /// directory), newest first. Posts created at the same instant are
    /// ordered by path.
    pub fn sorted_posts(&self) -> Result<Vec<PathBuf>> {
        let entries = self
            .storage
            .list(self.posts_directory)
            .map_err(|e| Error::missing(Resource::Directory, self.posts_directory, e))?;

        let mut posts: Vec<(SystemTime, PathBuf)> = Vec::with_capacity(entries.len());
        for entry in entries {
            if entry.is_file() && util::is_markdown(&entry.name) {
                let path = self.posts_directory.join(&entry.name);
                posts.push((self.created(&path)?, path));
            }
        }

        posts.sort_by(|(a_time, a_path), (b_time, b_path)| {
            b_time.cmp(a_time).then_with(|| a_path.cmp(b_path))
        });
        Ok(posts.into_iter().map(|(_, path)| path).collect())
    }

    /// The permalink for a post source file.
    pub fn permalink(&self, path: &Path) -> String {
        format!(
            "{}{}{}",
            self.site.url(),
            self.archive_url_path,
            util::html_name(path)
        )
    }

    /// Renders one post, binding its title, body, date, and permalink into
    /// the post template in that order.
    pub fn render_post(&self, path: &Path) -> Result<Rc<RenderedPost>> {
        if let Some(post) = self.cache.borrow().get(path) {
            log::debug!("post cache hit for '{}'", path.display());
            return Ok(Rc::clone(post));
        }

        let content = self.loader.load(path)?;
        let title = content.meta.title().unwrap_or_default().to_owned();
        let date = format_date(&DateTime::<Local>::from(self.created(path)?));
        let permalink = self.permalink(path);
        let html = self.templates.fill(
            TemplateName::Post,
            &[
                (token::POST_TITLE, title.as_str()),
                (token::POST_CONTENT, content.html.as_str()),
                (token::POST_DATE, date.as_str()),
                (token::POST_PERMALINK, permalink.as_str()),
            ],
        );

        let post = Rc::new(RenderedPost {
            title,
            permalink,
            html,
        });
        self.cache
            .borrow_mut()
            .insert(path.to_owned(), Rc::clone(&post));
        Ok(post)
    }

    /// Renders the most recent posts for the front page, newest first, up
    /// to the configured cap.
    pub fn front_page_posts(&self) -> Result<Vec<Rc<RenderedPost>>> {
        self.sorted_posts()?
            .iter()
            .take(self.front_max_posts)
            .map(|path| self.render_post(path))
            .collect()
    }
}
