#![warn(missing_docs)]
//! Harvest Wikipedia article text, category structure, links, redirects,
//! and templates through the MediaWiki API, for corpus construction.
//!
//! The crate centers on one retrying, rate-limited transport
//! ([`WikiClient`], or [`blocking::WikiClient`] outside async contexts);
//! every endpoint operation funnels through it. Offline transforms in
//! [`process`] turn fetched relations into labeled sparse matrices and
//! seed-similarity scores.

pub mod api;
pub mod blocking;
mod error;
mod http;
mod limiter;
pub mod models;
pub mod process;
mod sparse;

pub use api::category::normalize_category;
pub use error::Error;
pub use http::{WikiClient, WikiClientBuilder, USER_AGENT};
pub use limiter::RateLimiter;
pub use models::{
    Article, ArticleBatch, CategoryMatrix, CategoryMember, HeadingFrequency, LinkDirection,
    LinkMatrix, Namespace, Section, SeedSimilarity, WikiLink,
};
pub use process::link_matrix::{link_matrix, seed_similarity};
pub use process::redirects::overwrite_redirects;
pub use process::text::{
    cut_articles_at_headings, cut_at_headings, get_headings, heading_frequencies, split_text,
};
pub use sparse::CsrMatrix;
