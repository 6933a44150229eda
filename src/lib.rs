//! The library code for the `nanosite` static site generator. A site is a
//! directory holding a metadata file, a tree of Markdown pages, a flat
//! directory of Markdown posts, and six HTML templates. A build turns these
//! into:
//!
//! 1. A front page showing the most recent posts ([`crate::post`])
//! 2. One document per page, with a navigation menu synthesized from the
//!    page tree ([`crate::page`], [`crate::menu`])
//! 3. One permalink document per post, plus an archive index listing them
//!    all
//!
//! Templates are filled by ordered literal substitution of `$NAME$` tokens
//! ([`crate::template`]). Every document is finally wrapped in the main
//! template along with a shared header and footer ([`crate::write`]).
//!
//! [`crate::build`] orchestrates a run. All storage access goes through the
//! [`crate::storage::Storage`] trait, and everything a run memoizes is owned
//! by its [`crate::build::BuildContext`].

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod error;
pub mod init;
pub mod markdown;
pub mod menu;
pub mod page;
pub mod post;
pub mod storage;
pub mod template;
pub mod util;
pub mod write;
