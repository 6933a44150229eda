//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site: loading site metadata and
//! templates, writing the front page, writing every standalone page
//! ([`crate::page`]), and writing the post archive ([`crate::post`]).
//!
//! All memoized state for a run (the page tree, rendered posts, header and
//! footer) lives in a [`BuildContext`], which is created fresh by every call
//! to [`build_site`] and dropped when it returns.

use crate::config::{Config, SiteMetadata};
use crate::error::Result;
use crate::markdown::{self, Content, ContentLoader, Metadata};
use crate::menu::build_menu;
use crate::page::{page_title, Directory, PageTreeBuilder};
use crate::post::{PostPipeline, RenderedPost};
use crate::storage::Storage;
use crate::template::{token, TemplateName, Templates};
use crate::util;
use crate::write::{Nav, Writer};
use std::cell::{OnceCell, RefCell};
use std::collections::HashSet;
use std::path::Path;
use std::rc::Rc;

/// What a successful build produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Standalone pages written, not counting the archive index.
    pub pages: usize,

    /// Posts written to the archive.
    pub posts: usize,
}

/// Builds the site described by `config`, reading sources from and writing
/// output to `storage`. The first error aborts the build; documents written
/// before it are left in place.
pub fn build_site(config: &Config, storage: &dyn Storage) -> Result<Summary> {
    log::info!("building site in '{}'", config.root_directory.display());
    let site = SiteMetadata::load(storage, &config.meta_file)?;
    let templates = Templates::load(storage, &config.templates_directory)?;

    let summary = BuildContext::new(config, storage, &site, &templates).build()?;
    log::info!(
        "generated {} pages and {} posts into '{}'",
        summary.pages,
        summary.posts,
        config.output_directory.display()
    );
    Ok(summary)
}

/// One build run's state. The page tree, rendered posts, header, and footer
/// are each computed the first time they are needed and reused for the rest
/// of the run; nothing is ever invalidated, and nothing outlives the context.
pub struct BuildContext<'a> {
    config: &'a Config,
    site: &'a SiteMetadata,
    templates: &'a Templates,
    pages: PageTreeBuilder<'a>,
    posts: PostPipeline<'a>,
    writer: Writer<'a>,
    header: OnceCell<String>,
    footer: OnceCell<String>,
    written_pages: RefCell<HashSet<String>>,
}

impl<'a> BuildContext<'a> {
    pub fn new(
        config: &'a Config,
        storage: &'a dyn Storage,
        site: &'a SiteMetadata,
        templates: &'a Templates,
    ) -> BuildContext<'a> {
        BuildContext {
            config,
            site,
            templates,
            pages: PageTreeBuilder::new(storage, ContentLoader::new(storage, Some(site))),
            posts: PostPipeline::new(storage, templates, site, config),
            writer: Writer {
                storage,
                templates,
                site,
            },
            header: OnceCell::new(),
            footer: OnceCell::new(),
            written_pages: RefCell::new(HashSet::new()),
        }
    }

    /// Runs the whole build: front page, pages, then archive.
    pub fn build(&self) -> Result<Summary> {
        self.gen_front()?;
        let tree = self.page_tree()?;
        self.gen_pages(&tree)?;
        let posts = self.gen_archive()?;
        Ok(Summary {
            pages: tree.page_count(),
            posts,
        })
    }

    /// The full page tree.
    pub fn page_tree(&self) -> Result<Rc<Directory>> {
        self.pages.load_pages(&self.config.pages_directory)
    }

    /// The site header, including the navigation menu.
    pub fn header(&self) -> Result<&str> {
        if let Some(header) = self.header.get() {
            return Ok(header);
        }
        let tree = self.page_tree()?;
        let menu = build_menu(&tree, self.site.url(), true);
        let header = self.templates.fill(
            TemplateName::Header,
            &[
                (token::SITE_URL, self.site.url()),
                (token::TITLE, self.site.title()),
                (token::TAGLINE, self.site.tagline()),
                (token::MENU, menu.as_str()),
            ],
        );
        Ok(self.header.get_or_init(|| header))
    }

    /// The site footer.
    pub fn footer(&self) -> &str {
        self.footer.get_or_init(|| {
            self.templates
                .fill(TemplateName::Footer, &[(token::AUTHOR, self.site.author())])
        })
    }

    fn write_document(&self, path: &Path, content: &str, nav: &Nav) -> Result<()> {
        let document = self
            .writer
            .document(self.header()?, content, nav, self.footer());
        self.writer.write(path, &document)
    }

    /// Writes `index.html`: the most recent posts inside the front template.
    pub fn gen_front(&self) -> Result<()> {
        let posts: String = self
            .posts
            .front_page_posts()?
            .iter()
            .map(|post| post.html.as_str())
            .collect();
        let content = self
            .templates
            .fill(TemplateName::Front, &[(token::POSTS, posts.as_str())]);
        self.write_document(
            &self.config.output_directory.join("index.html"),
            &content,
            &Nav::older_posts(self.site),
        )
    }

    /// Writes one standalone page to `{output}/{stem}.html`.
    pub fn gen_page(&self, file_name: &str, page: &Content) -> Result<()> {
        let output_name = util::html_name(Path::new(file_name));
        if !self.written_pages.borrow_mut().insert(output_name.clone()) {
            log::warn!(
                "more than one page is named '{}'; the last one written wins",
                output_name
            );
        }

        let content = self
            .writer
            .page_content(&page_title(file_name, page), &page.html);
        self.write_document(
            &self.config.output_directory.join(&output_name),
            &content,
            &Nav::home(self.site),
        )
    }

    /// Writes every page in `dir` and its subdirectories. Output paths are
    /// flat: a page's directory only shows up in the menu.
    pub fn gen_pages(&self, dir: &Directory) -> Result<()> {
        for (_, subdir) in dir.subdirectories() {
            self.gen_pages(subdir)?;
        }
        for (file_name, page) in dir.pages() {
            self.gen_page(file_name, page)?;
        }
        Ok(())
    }

    /// Writes the permalink document for one post.
    pub fn gen_archive_entry(&self, path: &Path) -> Result<Rc<RenderedPost>> {
        let post = self.posts.render_post(path)?;
        self.write_document(
            &self
                .config
                .archive_output_directory
                .join(util::html_name(path)),
            &post.html,
            &Nav::archive(self.site),
        )?;
        Ok(post)
    }

    /// Writes a permalink document for every post, then `archive.html`
    /// listing them all, newest first. Returns the number of posts.
    pub fn gen_archive(&self) -> Result<usize> {
        let paths = self.posts.sorted_posts()?;
        let mut listing = String::new();
        for path in paths.iter() {
            let post = self.gen_archive_entry(path)?;
            listing.push_str(&format!("* [{}]({})\n", post.title, post.permalink));
        }

        let mut meta = Metadata::new();
        meta.insert("title", "Archive");
        let archive = Content {
            html: markdown::to_html(&listing),
            meta,
        };
        self.gen_page("archive.html", &archive)?;
        Ok(paths.len())
    }
}
