//! Rewrite title lists through a resolved redirect map.

use std::collections::{HashMap, HashSet};

/// Replaces redirect origins with their destinations and deduplicates.
///
/// Titles absent from `redirect_map` pass through unchanged. The first
/// occurrence of each resolved title keeps its position; later duplicates
/// are dropped.
pub fn overwrite_redirects<S: AsRef<str>>(
    titles: &[S],
    redirect_map: &HashMap<String, String>,
) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut result = Vec::new();
    for title in titles {
        let title = title.as_ref();
        let resolved = redirect_map
            .get(title)
            .map(String::as_str)
            .unwrap_or(title);
        if seen.insert(resolved.to_string()) {
            result.push(resolved.to_string());
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_and_deduplicates() {
        let mut map = HashMap::new();
        map.insert("Morals".to_string(), "Morality".to_string());
        map.insert("Ethic".to_string(), "Ethics".to_string());

        let titles = ["Morals", "Morality", "Ethic", "Aristotle"];
        let rewritten = overwrite_redirects(&titles, &map);
        assert_eq!(rewritten, vec!["Morality", "Ethics", "Aristotle"]);
    }

    #[test]
    fn empty_map_passes_titles_through() {
        let titles = ["A", "B", "A"];
        let rewritten = overwrite_redirects(&titles, &HashMap::new());
        assert_eq!(rewritten, vec!["A", "B"]);
    }
}
