//! The template store and the placeholder substitution engine.
//!
//! Templates are plain HTML containing `$NAME$` placeholder tokens. Filling a
//! template is a sequence of literal find-and-replace operations, applied in
//! exactly the order the caller lists them (see [`substitute`]). There is no
//! escaping, no conditional logic, and no recursive resolution.

use crate::error::{Error, Resource, Result};
use crate::storage::Storage;
use std::fmt;
use std::path::Path;

/// Placeholder tokens recognized by the bundled templates. Each template
/// consumes a fixed subset; the binding order at each call site is part of
/// the output contract.
pub mod token {
    pub const SITE_URL: &str = "$SITE_URL$";
    pub const TITLE: &str = "$TITLE$";
    pub const TAGLINE: &str = "$TAGLINE$";
    pub const MENU: &str = "$MENU$";
    pub const AUTHOR: &str = "$AUTHOR$";
    pub const POSTS: &str = "$POSTS$";
    pub const PAGE_TITLE: &str = "$PAGE_TITLE$";
    pub const CONTENT: &str = "$CONTENT$";
    pub const POST_TITLE: &str = "$POST_TITLE$";
    pub const POST_CONTENT: &str = "$POST_CONTENT$";
    pub const POST_DATE: &str = "$POST_DATE$";
    pub const POST_PERMALINK: &str = "$POST_PERMALINK$";
    pub const HEADER: &str = "$HEADER$";
    pub const NAV_LINK: &str = "$NAV_LINK$";
    pub const NAV_TEXT: &str = "$NAV_TEXT$";
    pub const FOOTER: &str = "$FOOTER$";
}

/// Replaces every occurrence of each binding's token with its value, one
/// binding at a time, in order. Text introduced by an earlier binding is
/// visible to later bindings, but a binding never rescans its own
/// replacements. Tokens with no binding are left verbatim.
///
/// ```
/// use nanosite::template::substitute;
///
/// assert_eq!("final", substitute("$A$", &[("$A$", "$B$"), ("$B$", "final")]));
/// assert_eq!("$B$", substitute("$A$", &[("$B$", "final"), ("$A$", "$B$")]));
/// ```
pub fn substitute(template: &str, bindings: &[(&str, &str)]) -> String {
    let mut out = template.to_owned();
    for (token, value) in bindings {
        // An empty pattern would match between every character.
        if token.is_empty() {
            continue;
        }
        out = out.replace(token, value);
    }
    out
}

/// Wraps a key as a placeholder token: `title` becomes `$title$`.
pub fn token_for(key: &str) -> String {
    format!("${}$", key)
}

/// The fixed set of templates a site provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateName {
    Header,
    Footer,
    Main,
    Front,
    Page,
    Post,
}

impl TemplateName {
    pub const ALL: [TemplateName; 6] = [
        TemplateName::Footer,
        TemplateName::Header,
        TemplateName::Main,
        TemplateName::Front,
        TemplateName::Page,
        TemplateName::Post,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TemplateName::Header => "header",
            TemplateName::Footer => "footer",
            TemplateName::Main => "main",
            TemplateName::Front => "front",
            TemplateName::Page => "page",
            TemplateName::Post => "post",
        }
    }

    /// The template's file name inside the templates directory, e.g.
    /// `post-template.html`.
    pub fn file_name(self) -> String {
        format!("{}-template.html", self.as_str())
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for TemplateName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every template source, loaded once per build and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Templates {
    sources: [String; 6],
}

impl Templates {
    /// Loads all templates from `directory`. Any missing template is fatal.
    pub fn load(storage: &dyn Storage, directory: &Path) -> Result<Templates> {
        let mut sources: [String; 6] = Default::default();
        for name in TemplateName::ALL.iter() {
            let path = directory.join(name.file_name());
            sources[name.index()] = storage
                .read(&path)
                .map_err(|e| Error::missing(Resource::Template, &path, e))?;
            log::debug!("loaded {} template from '{}'", name, path.display());
        }
        Ok(Templates { sources })
    }

    /// Builds a store from in-memory sources, looked up by name.
    pub fn from_fn<F: FnMut(TemplateName) -> String>(mut source: F) -> Templates {
        let mut sources: [String; 6] = Default::default();
        for name in TemplateName::ALL.iter() {
            sources[name.index()] = source(*name);
        }
        Templates { sources }
    }

    pub fn get(&self, name: TemplateName) -> &str {
        &self.sources[name.index()]
    }

    /// Fills the named template. Shorthand for [`substitute`].
    pub fn fill(&self, name: TemplateName, bindings: &[(&str, &str)]) -> String {
        substitute(self.get(name), bindings)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_substitution_order_is_significant() {
        assert_eq!("final", substitute("$A$", &[("$A$", "$B$"), ("$B$", "final")]));
        assert_eq!("$B$", substitute("$A$", &[("$B$", "final"), ("$A$", "$B$")]));
    }

    #[test]
    fn test_substitution_is_not_recursive() {
        // A value containing its own token is inserted once, not expanded.
        assert_eq!(
            "<$X$> <$X$>",
            substitute("<$X$> <$X$>", &[("$X$", "$X$")])
        );
        assert_eq!("[[$X$]]", substitute("$X$", &[("$X$", "[$X$]"), ("$X$", "[$X$]")]));
    }

    #[test]
    fn test_substitution_replaces_globally_and_keeps_unmatched() {
        assert_eq!(
            "a-a $UNBOUND$",
            substitute("$V$-$V$ $UNBOUND$", &[("$V$", "a")])
        );
        assert_eq!("unchanged", substitute("unchanged", &[("", "x")]));
    }

    #[test]
    fn test_load_reads_every_template() -> Result<()> {
        let mut storage = MemoryStorage::new();
        for name in TemplateName::ALL.iter() {
            storage = storage.with_file(
                Path::new("templates").join(name.file_name()),
                format!("<{}>", name),
            );
        }
        let templates = Templates::load(&storage, Path::new("templates"))?;
        assert_eq!("<header>", templates.get(TemplateName::Header));
        assert_eq!("<post>", templates.get(TemplateName::Post));
        assert_eq!(6, storage.read_count());
        Ok(())
    }

    #[test]
    fn test_load_missing_template_is_fatal() {
        let storage = MemoryStorage::new()
            .with_file("templates/header-template.html", "")
            .with_file("templates/footer-template.html", "");
        match Templates::load(&storage, Path::new("templates")) {
            Err(Error::MissingResource { kind, path, .. }) => {
                assert_eq!(Resource::Template, kind);
                assert_eq!(Path::new("templates/main-template.html"), path);
            }
            other => panic!("expected a missing template, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_fill_uses_named_template() {
        let templates = Templates::from_fn(|name| match name {
            TemplateName::Footer => String::from("by $AUTHOR$"),
            _ => String::new(),
        });
        assert_eq!(
            "by Ada",
            templates.fill(TemplateName::Footer, &[(token::AUTHOR, "Ada")])
        );
    }
}
