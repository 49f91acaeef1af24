//! The extraction core: everything that reads markup we do not control.
//!
//! # Submodules
//!
//! | Module | Role |
//! |--------|------|
//! | [`recency`] | Whole-day age check on raw timestamps |
//! | [`access`] | Login / subscription wall detection |
//! | [`resolver`] | First-non-empty value over a selector chain |
//! | [`articles`] | Listing cards → [`ExtractedArticle`](crate::models::ExtractedArticle)s |
//! | [`dedup`] | Collapse repeated cards |
//! | [`content`] | Article body with layered fallbacks |
//! | [`selectors`] | The chains and phrase lists all of the above consume |
//!
//! None of these functions return errors. Missing markup, unparseable dates
//! and gated pages all become "no result" so that one odd page never stops a
//! run.

pub mod access;
pub mod articles;
pub mod content;
pub mod dedup;
mod dom;
pub mod recency;
pub mod resolver;
pub mod selectors;
