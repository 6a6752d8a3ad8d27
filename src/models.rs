//! Value types returned by API calls and offline transforms.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::sparse::CsrMatrix;

/// Direction of page links relative to the queried page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkDirection {
    /// Pages linking to the queried page (`prop=linkshere`).
    Incoming,
    /// Pages the queried page links to (`prop=links`).
    Outgoing,
}

/// MediaWiki namespace identifiers this crate distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Namespace {
    /// Main article namespace (0).
    Main,
    /// Category namespace (14).
    Category,
}

impl Namespace {
    /// Numeric namespace identifier used in API parameters.
    pub fn id(self) -> u32 {
        match self {
            Self::Main => 0,
            Self::Category => 14,
        }
    }
}

/// A Wikipedia article with its plaintext extract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// Canonical title (may differ from the requested title).
    pub title: String,
    /// Plaintext extract; empty when the page has no extractable text.
    pub text: String,
    /// Page identifier, -1 when the API omitted it.
    pub pageid: i64,
    /// Language code of the wiki the article came from.
    pub lang: String,
    /// Heuristic flag: the extract looks cut short. Informational only.
    pub possibly_truncated: bool,
    /// Wikitext length in bytes as reported by `prop=info`.
    pub wikitext_length: Option<u64>,
}

/// Outcome of a concurrent multi-article fetch.
///
/// Missing pages are kept apart from the successes; every requested title
/// lands in exactly one of the two collections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticleBatch {
    /// Successfully fetched articles, in completion order.
    pub articles: Vec<Article>,
    /// Requested titles that resolved to a missing page.
    pub missing: Vec<String>,
}

/// A section within an article's plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Level-2 heading name; the leading section is named `Lead`.
    pub heading: String,
    /// Body text up to the next level-2 heading.
    pub text: String,
}

/// A heading name and how often it occurred across a corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingFrequency {
    /// Heading name.
    pub heading: String,
    /// Occurrence count.
    pub count: usize,
}

/// A member of a Wikipedia category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMember {
    /// Page identifier.
    pub pageid: i64,
    /// Namespace the member lives in.
    pub ns: i64,
    /// Member title (categories keep their `Category:` prefix here).
    pub title: String,
}

/// A link to or from a Wikipedia page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikiLink {
    /// Page identifier, 0 when the API omitted it.
    pub pageid: i64,
    /// Namespace of the linked page.
    pub ns: i64,
    /// Title of the linked page.
    pub title: String,
}

/// Binary sparse matrix of category-member relationships.
///
/// Rows are categories, columns are members; labels are index-aligned with
/// the matrix axes.
#[derive(Debug, Clone)]
pub struct CategoryMatrix {
    /// Sparse binary matrix, shape `(row_labels.len(), col_labels.len())`.
    pub matrix: CsrMatrix,
    /// Category labels in fetch order.
    pub row_labels: Vec<String>,
    /// Member labels, sorted and deduplicated.
    pub col_labels: Vec<String>,
}

/// Binary sparse matrix of page-link adjacency.
///
/// Rows are source pages, columns are link targets.
#[derive(Debug, Clone)]
pub struct LinkMatrix {
    /// Sparse binary matrix, shape `(row_labels.len(), col_labels.len())`.
    pub matrix: CsrMatrix,
    /// Source page labels in input order.
    pub row_labels: Vec<String>,
    /// Target page labels, sorted and deduplicated.
    pub col_labels: Vec<String>,
}

/// Result of seed-page similarity scoring.
#[derive(Debug, Clone)]
pub struct SeedSimilarity {
    /// Cosine similarity per source page; every row label is present.
    pub scores: HashMap<String, f64>,
    /// Per-column seed weight over the retained columns.
    pub page_weight: Vec<f64>,
    /// Target vector the rows were scored against (equals `page_weight`).
    pub target_vec: Vec<f64>,
    /// Columns dropped for having zero total in-degree.
    pub n_columns_removed: usize,
    /// Columns that entered the similarity computation.
    pub n_columns_used: usize,
}
