//! Converts Markdown source files into HTML plus front-matter metadata, and
//! provides the [`ContentLoader`] which every page and post goes through.
//!
//! Front matter is a run of `Key: Value` lines at the top of the file:
//!
//! ```md
//! Title: Hello, world!
//! Summary: A first post,
//!     continued on an indented line.
//!
//! # Hello
//!
//! World
//! ```
//!
//! Keys are case-insensitive (stored lowercased). The metadata block ends at
//! the first blank line, at a `---`/`...` fence, or at the first line that is
//! neither a `Key: Value` line nor an indented continuation; in the last case
//! that line is kept as part of the body. An optional `---` line may open the
//! block.

use crate::config::SiteMetadata;
use crate::error::{Error, Result};
use crate::storage::Storage;
use crate::template::substitute;
use pulldown_cmark::{html, Options, Parser};
use std::path::Path;

/// Flat, ordered metadata: each key maps to one string. When a key is given
/// more than once (or continued over several lines), the values are
/// concatenated with no separator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: Vec<(String, String)>,
}

impl Metadata {
    pub fn new() -> Metadata {
        Metadata::default()
    }

    /// Appends `value` to `key`, adding the key if it is new.
    pub fn insert(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => existing.push_str(value),
            None => self.entries.push((key.to_owned(), value.to_owned())),
        }
    }

    /// Replaces the value of `key`, adding the key if it is new.
    pub fn set(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value.to_owned(),
            None => self.entries.push((key.to_owned(), value.to_owned())),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The `title` entry, if any.
    pub fn title(&self) -> Option<&str> {
        self.get("title")
    }

    /// Iterates entries in the order their keys first appeared.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> std::iter::FromIterator<(&'a str, &'a str)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Metadata {
        let mut meta = Metadata::new();
        for (k, v) in iter {
            meta.insert(k, v);
        }
        meta
    }
}

/// A converted source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    /// The rendered body.
    pub html: String,

    /// The front matter.
    pub meta: Metadata,
}

fn leading_spaces(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Parses a `Key: Value` line, indented by at most three spaces.
fn meta_line(line: &str) -> Option<(&str, &str)> {
    if leading_spaces(line) > 3 {
        return None;
    }
    let line = line.trim_start_matches(' ');
    let colon = line.find(':')?;
    let key = &line[..colon];
    if key.is_empty() || !key.chars().all(is_key_char) {
        return None;
    }
    Some((key, line[colon + 1..].trim()))
}

/// Returns whether `line` is a fence: one of `markers`, then whitespace or
/// nothing.
fn is_fence(line: &str, markers: &[&str]) -> bool {
    markers.iter().any(|marker| match line.strip_prefix(marker) {
        Some(rest) => rest.is_empty() || rest.starts_with(char::is_whitespace),
        None => false,
    })
}

/// Parses a continuation line, indented by four or more spaces.
fn continuation_line(line: &str) -> Option<&str> {
    match leading_spaces(line) >= 4 {
        true => Some(line.trim()),
        false => None,
    }
}

/// Splits `input` into its front matter and the remaining body.
pub fn parse_front_matter(input: &str) -> (Metadata, &str) {
    let mut meta = Metadata::new();
    let mut body_start = 0;
    let mut last_key: Option<String> = None;

    let mut lines = input.split_inclusive('\n').peekable();
    if let Some(first) = lines.peek() {
        if is_fence(first.trim_end_matches(|c| c == '\n' || c == '\r'), &["---"]) {
            body_start += first.len();
            lines.next();
        }
    }

    for raw in lines {
        let line = raw.trim_end_matches(|c| c == '\n' || c == '\r');
        if line.trim().is_empty() || is_fence(line, &["---", "..."]) {
            body_start += raw.len();
            break;
        }
        if let Some((key, value)) = meta_line(line) {
            let key = key.to_lowercase();
            meta.insert(&key, value);
            last_key = Some(key);
        } else {
            match (continuation_line(line), &last_key) {
                (Some(value), Some(key)) => meta.insert(key, value),
                _ => break,
            }
        }
        body_start += raw.len();
    }

    (meta, &input[body_start..])
}

/// Renders a Markdown body to HTML.
pub fn to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, Parser::new_ext(markdown, options));
    out
}

/// Converts a whole source file: front matter plus rendered body.
pub fn convert(input: &str) -> Content {
    let (meta, body) = parse_front_matter(input);
    Content {
        html: to_html(body),
        meta,
    }
}

/// Loads source files from [`Storage`] and converts them. When site metadata
/// is available, every `$key$` token for a site metadata key is replaced
/// with its value before conversion, so content can refer to e.g. `$author$`.
pub struct ContentLoader<'a> {
    storage: &'a dyn Storage,
    site: Option<&'a SiteMetadata>,
}

impl<'a> ContentLoader<'a> {
    pub fn new(storage: &'a dyn Storage, site: Option<&'a SiteMetadata>) -> ContentLoader<'a> {
        ContentLoader { storage, site }
    }

    pub fn load(&self, path: &Path) -> Result<Content> {
        let raw = self
            .storage
            .read(path)
            .map_err(|e| Error::content(path, e))?;
        Ok(match self.site {
            Some(site) => {
                let bindings = site.token_bindings();
                let bindings: Vec<(&str, &str)> = bindings
                    .iter()
                    .map(|(token, value)| (token.as_str(), value.as_str()))
                    .collect();
                convert(&substitute(&raw, &bindings))
            }
            None => convert(&raw),
        })
    }
}
