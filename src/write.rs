//! Composes output documents and writes them to storage. Every document is
//! the main template wrapped around some content, with the site header,
//! footer, and a single navigation link.

use crate::config::SiteMetadata;
use crate::error::{Error, Result};
use crate::storage::Storage;
use crate::template::{token, TemplateName, Templates};
use std::path::Path;

/// The navigation link shown below a document's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nav {
    pub link: String,
    pub text: &'static str,
}

impl Nav {
    /// Back to the front page, for standalone pages.
    pub fn home(site: &SiteMetadata) -> Nav {
        Nav {
            link: site.url().to_owned(),
            text: "Return to home.",
        }
    }

    /// On to the archive index, for the front page.
    pub fn older_posts(site: &SiteMetadata) -> Nav {
        Nav {
            link: format!("{}archive.html", site.url()),
            text: "View older posts.",
        }
    }

    /// Back to the archive index, for post permalink documents.
    pub fn archive(site: &SiteMetadata) -> Nav {
        Nav {
            link: format!("{}archive.html", site.url()),
            text: "Return to archives.",
        }
    }
}

/// Fills templates that frame content and writes the results.
pub struct Writer<'a> {
    /// Where output documents go.
    pub storage: &'a dyn Storage,

    /// The site's templates.
    pub templates: &'a Templates,

    /// Site metadata, for the main template's site URL and title.
    pub site: &'a SiteMetadata,
}

impl Writer<'_> {
    /// Fills the page template with a title and body.
    pub fn page_content(&self, title: &str, html: &str) -> String {
        self.templates.fill(
            TemplateName::Page,
            &[(token::PAGE_TITLE, title), (token::CONTENT, html)],
        )
    }

    /// Fills the main template. Bindings are applied in this order: site URL,
    /// site title, header, content, navigation link, navigation text, footer.
    pub fn document(&self, header: &str, content: &str, nav: &Nav, footer: &str) -> String {
        self.templates.fill(
            TemplateName::Main,
            &[
                (token::SITE_URL, self.site.url()),
                (token::TITLE, self.site.title()),
                (token::HEADER, header),
                (token::CONTENT, content),
                (token::NAV_LINK, nav.link.as_str()),
                (token::NAV_TEXT, nav.text),
                (token::FOOTER, footer),
            ],
        )
    }

    /// Writes one output document.
    pub fn write(&self, path: &Path, contents: &str) -> Result<()> {
        self.storage
            .write(path, contents)
            .map_err(|e| Error::write(path, e))?;
        log::debug!("wrote '{}'", path.display());
        Ok(())
    }
}
