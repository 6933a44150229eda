//! Scaffolds a new site: the metadata file, the source directories, and a
//! default theme, followed by a first build. The interactive wizard collects
//! the metadata from a reader and prompts on a writer so it can be driven by
//! a terminal or by a test.

use crate::build::{build_site, Summary};
use crate::config::Config;
use crate::storage::FsStorage;
use crate::template::TemplateName;
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io::{BufRead, Write};
use std::path::Path;

/// The stylesheet written into a new site's output root.
pub const STYLESHEET: &str = include_str!("../theme/style.css");

/// The stylesheet's file name.
pub const STYLESHEET_FILE: &str = "style.css";

/// Returns the bundled default for a template.
pub fn default_template(name: TemplateName) -> &'static str {
    match name {
        TemplateName::Header => include_str!("../theme/header-template.html"),
        TemplateName::Footer => include_str!("../theme/footer-template.html"),
        TemplateName::Main => include_str!("../theme/main-template.html"),
        TemplateName::Front => include_str!("../theme/front-template.html"),
        TemplateName::Page => include_str!("../theme/page-template.html"),
        TemplateName::Post => include_str!("../theme/post-template.html"),
    }
}

/// The answers a new site starts from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteFields {
    pub title: String,
    pub tagline: String,
    pub author: String,
    pub url: String,
}

impl SiteFields {
    /// Renders the fields as a metadata file.
    pub fn to_meta(&self) -> String {
        format!(
            "title: {}\ntagline: {}\nauthor: {}\nurl: {}\n",
            self.title, self.tagline, self.author, self.url
        )
    }
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).with_context(|| format!("Creating directory '{}'", path.display()))
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("Writing '{}'", path.display()))
}

/// Lays out a blank site under `config`'s root and builds it. Existing
/// directories are kept; the metadata file, templates, and stylesheet are
/// overwritten.
pub fn setup_blank_site(config: &Config, fields: &SiteFields) -> Result<Summary> {
    create_dir(&config.root_directory)?;
    write_file(&config.meta_file, &fields.to_meta())?;

    for dir in [
        &config.pages_directory,
        &config.posts_directory,
        &config.templates_directory,
        &config.archive_output_directory,
    ]
    .iter()
    {
        create_dir(dir)?;
    }

    for name in TemplateName::ALL.iter() {
        write_file(
            &config.templates_directory.join(name.file_name()),
            default_template(*name),
        )?;
    }
    write_file(&config.output_directory.join(STYLESHEET_FILE), STYLESHEET)?;

    log::info!("scaffolded site in '{}'", config.root_directory.display());
    Ok(build_site(config, &FsStorage::new())?)
}

fn read_answer<R: BufRead>(input: &mut R) -> Result<String> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(anyhow!("Unexpected end of input"));
    }
    Ok(line.trim_end_matches(|c| c == '\n' || c == '\r').to_owned())
}

fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> Result<String> {
    write!(output, "{}", prompt)?;
    output.flush()?;
    read_answer(input)
}

/// Asks a yes/no question until the answer starts with `y` or `n`.
fn ask_yes_no<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> Result<bool> {
    let prompt = format!("{} [y/n] ", prompt);
    loop {
        let answer = ask(input, output, &prompt)?;
        match answer.chars().next().map(|c| c.to_ascii_lowercase()) {
            Some('y') => return Ok(true),
            Some('n') => return Ok(false),
            _ => writeln!(output, "Invalid option. Type 'y' for yes and 'n' for no.")?,
        }
    }
}

/// Runs the setup wizard. Returns `None` if the user declines.
pub fn setup_site_interactive<R: BufRead, W: Write>(
    config: &Config,
    input: &mut R,
    output: &mut W,
) -> Result<Option<Summary>> {
    writeln!(output, "-- nanosite --")?;
    if !ask_yes_no(
        input,
        output,
        "Would you like to set up a site in this directory?",
    )? {
        writeln!(output, "Canceled.")?;
        return Ok(None);
    }

    let title = ask(input, output, "Enter a title for your site: ")?;
    let tagline = ask(input, output, "Enter a tagline for your site: ")?;
    let author = ask(input, output, "Enter the author name for your site: ")?;
    writeln!(output, "Enter the base URL where you will upload your site to.")?;
    writeln!(output, " - Example: http://mysite.com/")?;
    let mut url = ask(input, output, "Base URL: ")?;
    if !url.ends_with('/') {
        url.push('/');
    }

    let summary = setup_blank_site(
        config,
        &SiteFields {
            title,
            tagline,
            author,
            url,
        },
    )?;
    writeln!(output, "Success! Generated site.")?;
    Ok(Some(summary))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::META_FILE;
    use std::io::Cursor;

    #[test]
    fn test_default_templates_carry_their_tokens() {
        use crate::template::token::*;
        let expected: [(TemplateName, &[&str]); 6] = [
            (TemplateName::Header, &[SITE_URL, TITLE, TAGLINE, MENU]),
            (TemplateName::Footer, &[AUTHOR]),
            (TemplateName::Front, &[POSTS]),
            (TemplateName::Page, &[PAGE_TITLE, CONTENT]),
            (
                TemplateName::Post,
                &[POST_TITLE, POST_CONTENT, POST_DATE, POST_PERMALINK],
            ),
            (
                TemplateName::Main,
                &[SITE_URL, TITLE, HEADER, CONTENT, NAV_LINK, NAV_TEXT, FOOTER],
            ),
        ];
        for (name, tokens) in expected.iter() {
            for token in tokens.iter() {
                assert!(
                    default_template(*name).contains(token),
                    "{} template is missing {}",
                    name,
                    token
                );
            }
        }
    }

    #[test]
    fn test_setup_blank_site() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = Config::new(dir.path());
        let fields = SiteFields {
            title: String::from("Paradoxical"),
            tagline: String::from("A blog."),
            author: String::from("Ada"),
            url: String::from("http://example.org/"),
        };
        let summary = setup_blank_site(&config, &fields)?;
        assert_eq!(Summary { pages: 0, posts: 0 }, summary);

        assert_eq!(
            "title: Paradoxical\ntagline: A blog.\nauthor: Ada\nurl: http://example.org/\n",
            fs::read_to_string(dir.path().join(META_FILE))?
        );
        for name in TemplateName::ALL.iter() {
            assert!(config.templates_directory.join(name.file_name()).is_file());
        }
        assert!(config.pages_directory.is_dir());
        assert!(config.archive_output_directory.is_dir());
        assert!(dir.path().join(STYLESHEET_FILE).is_file());

        let index = fs::read_to_string(dir.path().join("index.html"))?;
        assert!(index.contains("<title>Paradoxical</title>"));
        assert!(index.contains("http://example.org/style.css"));
        assert!(dir.path().join("archive.html").is_file());
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_rebuild_ignores_broken_page_links() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = Config::new(dir.path());
        setup_blank_site(&config, &SiteFields::default())?;
        fs::write(config.pages_directory.join("about.md"), "title: About\n\nHi.")?;
        std::os::unix::fs::symlink(
            dir.path().join("nowhere"),
            config.pages_directory.join("stale-link"),
        )?;

        let summary = build_site(&config, &FsStorage::new())?;
        assert_eq!(Summary { pages: 1, posts: 0 }, summary);
        assert!(dir.path().join("about.html").is_file());
        Ok(())
    }

    #[test]
    fn test_interactive_setup() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = Config::new(dir.path());
        let mut input = Cursor::new("maybe\nYes\nParadoxical\nA blog.\nAda\nhttp://example.org\n");
        let mut output = Vec::new();

        let summary = setup_site_interactive(&config, &mut input, &mut output)?;
        assert_eq!(Some(Summary { pages: 0, posts: 0 }), summary);

        let output = String::from_utf8(output)?;
        assert!(output.starts_with("-- nanosite --\n"));
        assert_eq!(
            2,
            output
                .matches("Would you like to set up a site in this directory? [y/n] ")
                .count()
        );
        assert!(output.contains("Invalid option. Type 'y' for yes and 'n' for no.\n"));
        assert!(output.ends_with("Base URL: Success! Generated site.\n"));

        // The trailing slash is added to the base URL.
        let meta = fs::read_to_string(dir.path().join(META_FILE))?;
        assert!(meta.ends_with("url: http://example.org/\n"));
        Ok(())
    }

    #[test]
    fn test_interactive_setup_canceled() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = Config::new(dir.path());
        let mut output = Vec::new();

        let summary = setup_site_interactive(&config, &mut Cursor::new("no\n"), &mut output)?;
        assert_eq!(None, summary);
        assert!(String::from_utf8(output)?.ends_with("Canceled.\n"));
        assert!(!dir.path().join(META_FILE).exists());
        Ok(())
    }

    #[test]
    fn test_interactive_setup_end_of_input() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = Config::new(dir.path());
        let mut input = Cursor::new("y\nTitle\n");
        assert!(setup_site_interactive(&config, &mut input, &mut Vec::new()).is_err());
        assert!(!dir.path().join(META_FILE).exists());
        Ok(())
    }
}
