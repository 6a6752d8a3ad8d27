//! Heading-based segmentation of article plaintext.
//!
//! The MediaWiki plaintext extractor renders level-2 wikitext headings as
//! `== Heading ==` on their own line; everything here keys off that shape.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::models::{HeadingFrequency, Section};

static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n *={2} *([^=].+?) *={2} *\n").expect("heading pattern compiles")
});

/// Extracts level-2 heading names from article plaintext.
pub fn get_headings(text: &str) -> Vec<String> {
    HEADING
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|group| group.as_str().to_string())
        .collect()
}

/// Splits article plaintext into sections at level-2 headings.
///
/// The text before the first heading becomes a section named `Lead`.
/// Joining the sections back together reconstructs the original content
/// modulo the heading delimiter markup itself.
pub fn split_text(text: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut heading = "Lead".to_string();
    let mut start = 0;

    for caps in HEADING.captures_iter(text) {
        let matched = caps.get(0).expect("group 0 always present");
        sections.push(Section {
            heading,
            text: text[start..matched.start()].to_string(),
        });
        heading = caps
            .get(1)
            .map(|group| group.as_str())
            .unwrap_or("")
            .to_string();
        start = matched.end();
    }

    sections.push(Section {
        heading,
        text: text[start..].to_string(),
    });
    sections
}

/// Removes everything from each named heading onward.
///
/// For each entry in `sections_to_remove`, the text from that heading to
/// the end of the article is dropped.
pub fn cut_at_headings<S: AsRef<str>>(text: &str, sections_to_remove: &[S]) -> String {
    let mut text = text.to_string();
    for section in sections_to_remove {
        let escaped = regex::escape(section.as_ref());
        let pattern = Regex::new(&format!(r"\n *={{2}} *{escaped} *={{2}} *\n"))
            .expect("escaped heading pattern compiles");
        if let Some(matched) = pattern.find(&text) {
            text.truncate(matched.start());
        }
    }
    text
}

/// Applies [`cut_at_headings`] to every article.
pub fn cut_articles_at_headings<A, S>(articles: &[A], sections_to_remove: &[S]) -> Vec<String>
where
    A: AsRef<str>,
    S: AsRef<str>,
{
    articles
        .iter()
        .map(|article| cut_at_headings(article.as_ref(), sections_to_remove))
        .collect()
}

/// Tallies headings into the canonical ordered frequency table.
///
/// Rows are sorted by descending count, ties broken by heading name. This
/// is the single input shape downstream plotting consumes.
pub fn heading_frequencies<I, S>(headings: I) -> Vec<HeadingFrequency>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for heading in headings {
        *counts.entry(heading.into()).or_insert(0) += 1;
    }

    let mut table: Vec<HeadingFrequency> = counts
        .into_iter()
        .map(|(heading, count)| HeadingFrequency { heading, count })
        .collect();
    table.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.heading.cmp(&b.heading)));
    table
}
