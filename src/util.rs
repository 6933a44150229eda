use std::path::Path;

pub const MARKDOWN_EXTENSION: &str = "md";
pub const HTML_EXTENSION: &str = "html";

/// Returns whether `name` names a Markdown source file.
pub fn is_markdown(name: &str) -> bool {
    Path::new(name)
        .extension()
        .map_or(false, |ext| ext == MARKDOWN_EXTENSION)
}

/// The file name of `path` without its extension, or the empty string.
pub fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// The output file name for a source file: `{stem}.html`.
pub fn html_name(path: &Path) -> String {
    format!("{}.{}", stem(path), HTML_EXTENSION)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_is_markdown() {
        assert!(is_markdown("about.md"));
        assert!(!is_markdown("about.md.bak"));
        assert!(!is_markdown("md"));
        assert!(!is_markdown("style.css"));
    }

    #[test]
    fn test_html_name() {
        assert_eq!("hello.html", html_name(Path::new("posts/hello.md")));
        assert_eq!("archive.html", html_name(Path::new("archive.html")));
    }
}
