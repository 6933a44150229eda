//! Builds the site navigation from the page tree.
//!
//! The navigation is at most two levels deep: a Home link, one category per
//! top-level page directory, then the top-level pages. Pages in deeper
//! directories are listed flat inside their top-level category.

use crate::page::{page_title, Directory};
use crate::util;
use std::path::Path;

/// One item in the navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    /// Link to the front page.
    Home { url: String },

    /// A top-level page directory and the pages under it.
    Category { name: String, entries: Vec<MenuEntry> },

    /// Link to a standalone page.
    Page { title: String, url: String },
}

/// Collects the menu entries for `tree`. Directories and pages are each
/// visited in name order, directories first.
pub fn menu_entries(tree: &Directory, site_url: &str, top_level: bool) -> Vec<MenuEntry> {
    let mut entries = Vec::new();
    if top_level {
        entries.push(MenuEntry::Home {
            url: format!("{}index.html", site_url),
        });
    }

    for (name, dir) in tree.subdirectories() {
        let nested = menu_entries(dir, site_url, false);
        match top_level {
            true => entries.push(MenuEntry::Category {
                name: name.to_owned(),
                entries: nested,
            }),
            false => entries.extend(nested),
        }
    }

    for (name, page) in tree.pages() {
        entries.push(MenuEntry::Page {
            title: page_title(name, page),
            url: format!("{}{}", site_url, util::html_name(Path::new(name))),
        });
    }
    entries
}

fn push_link(out: &mut String, url: &str, text: &str) {
    out.push_str(r#"<li><a href=""#);
    out.push_str(url);
    out.push_str(r#"">"#);
    out.push_str(text);
    out.push_str("</a></li>");
}

fn render_entries(out: &mut String, entries: &[MenuEntry]) {
    for entry in entries {
        match entry {
            MenuEntry::Home { url } => push_link(out, url, "Home"),
            MenuEntry::Category { name, entries } => {
                out.push_str(r##"<li><a href="#">"##);
                out.push_str(name);
                out.push_str("</a><ul>");
                render_entries(out, entries);
                out.push_str("</ul></li>");
            }
            MenuEntry::Page { title, url } => push_link(out, url, title),
        }
    }
}

/// Renders entries as nested `<li>` items. At the top level the list is
/// wrapped in `<nav class="nav-bar"><ul>…</ul></nav>`.
pub fn render(entries: &[MenuEntry], top_level: bool) -> String {
    let mut out = String::new();
    if top_level {
        out.push_str(r#"<nav class="nav-bar"><ul>"#);
    }
    render_entries(&mut out, entries);
    if top_level {
        out.push_str("</ul></nav>");
    }
    out
}

/// Builds the navigation markup for `tree`.
pub fn build_menu(tree: &Directory, site_url: &str, top_level: bool) -> String {
    render(&menu_entries(tree, site_url, top_level), top_level)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::Result;
    use crate::markdown::ContentLoader;
    use crate::page::PageTreeBuilder;
    use crate::storage::MemoryStorage;

    const URL: &str = "http://example.org/";

    fn tree(storage: &MemoryStorage) -> Result<std::rc::Rc<Directory>> {
        PageTreeBuilder::new(storage, ContentLoader::new(storage, None))
            .load_pages(Path::new("pages"))
    }

    #[test]
    fn test_menu_orders_categories_and_pages_by_name() -> Result<()> {
        // Insertion order deliberately disagrees with name order.
        let storage = MemoryStorage::new()
            .with_file("pages/z.md", "Zed.")
            .with_file("pages/b/two.md", "title: Two\n\nB page.")
            .with_file("pages/y.md", "title: Why\n\nY.")
            .with_file("pages/a/one.md", "A page.");
        let menu = build_menu(&*tree(&storage)?, URL, true);

        assert_eq!(
            concat!(
                r#"<nav class="nav-bar"><ul>"#,
                r#"<li><a href="http://example.org/index.html">Home</a></li>"#,
                r##"<li><a href="#">a</a><ul>"##,
                r#"<li><a href="http://example.org/one.html">one</a></li>"#,
                "</ul></li>",
                r##"<li><a href="#">b</a><ul>"##,
                r#"<li><a href="http://example.org/two.html">Two</a></li>"#,
                "</ul></li>",
                r#"<li><a href="http://example.org/y.html">Why</a></li>"#,
                r#"<li><a href="http://example.org/z.html">z</a></li>"#,
                "</ul></nav>",
            ),
            menu
        );
        Ok(())
    }

    #[test]
    fn test_nested_directories_are_flattened_into_category() -> Result<()> {
        let storage = MemoryStorage::new()
            .with_file("pages/guides/intro.md", "Intro.")
            .with_file("pages/guides/deep/inner.md", "Inner.")
            .with_file("pages/guides/deep/deeper/innermost.md", "Innermost.");
        let entries = menu_entries(&*tree(&storage)?, URL, true);

        let page = |title: &str| MenuEntry::Page {
            title: title.to_owned(),
            url: format!("{}{}.html", URL, title),
        };
        assert_eq!(
            vec![
                MenuEntry::Home {
                    url: format!("{}index.html", URL),
                },
                MenuEntry::Category {
                    name: String::from("guides"),
                    entries: vec![page("innermost"), page("inner"), page("intro")],
                },
            ],
            entries
        );
        Ok(())
    }

    #[test]
    fn test_nested_menu_has_no_nav_wrapper() -> Result<()> {
        let storage = MemoryStorage::new().with_file("pages/only.md", "Only.");
        assert_eq!(
            r#"<li><a href="http://example.org/only.html">only</a></li>"#,
            build_menu(&*tree(&storage)?, URL, false)
        );
        Ok(())
    }
}
