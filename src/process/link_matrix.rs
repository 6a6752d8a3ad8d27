//! Page-link matrices and seed-page similarity scoring.

use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::info;

use crate::models::{LinkMatrix, SeedSimilarity};
use crate::sparse::labeled_binary_matrix;

/// Converts a source → targets mapping into a sparse binary link matrix.
///
/// Rows are source pages in the map's iteration order; columns are the
/// sorted, deduplicated union of all targets.
pub fn link_matrix(links: &IndexMap<String, Vec<String>>) -> LinkMatrix {
    let (matrix, row_labels, col_labels) = labeled_binary_matrix(links);
    LinkMatrix {
        matrix,
        row_labels,
        col_labels,
    }
}

/// Scores each source page's link profile against a seed-weighted target.
///
/// Every target column `j` gets weight `in_degree_from_seeds[j] /
/// in_degree_all[j]`; columns with zero total in-degree carry no signal and
/// are dropped first. Each row is then scored by cosine similarity between
/// its weighted link vector and the weight vector itself. Rows with no
/// overlap against the weighted columns score exactly 0.0, as does every
/// row when the target vector is all zeros.
pub fn seed_similarity(
    links: &LinkMatrix,
    in_degree_all: &HashMap<String, u64>,
    in_degree_from_seeds: &HashMap<String, u64>,
) -> SeedSimilarity {
    let in_all: Vec<f64> = links
        .col_labels
        .iter()
        .map(|label| in_degree_all.get(label).copied().unwrap_or(0) as f64)
        .collect();
    let in_seeds: Vec<f64> = links
        .col_labels
        .iter()
        .map(|label| in_degree_from_seeds.get(label).copied().unwrap_or(0) as f64)
        .collect();

    let keep: Vec<usize> = (0..links.col_labels.len())
        .filter(|&j| in_all[j] > 0.0)
        .collect();
    let n_columns_removed = links.col_labels.len() - keep.len();
    if n_columns_removed > 0 {
        info!(n_columns_removed, "removing pages with zero in-degree");
    }

    let matrix = links.matrix.select_columns(&keep);
    let page_weight: Vec<f64> = keep.iter().map(|&j| in_seeds[j] / in_all[j]).collect();
    let target_vec = page_weight.clone();
    let n_columns_used = keep.len();

    let target_norm = target_vec
        .iter()
        .map(|w| w * w)
        .sum::<f64>()
        .sqrt();
    if target_norm == 0.0 {
        let scores = links
            .row_labels
            .iter()
            .map(|label| (label.clone(), 0.0))
            .collect();
        return SeedSimilarity {
            scores,
            page_weight,
            target_vec,
            n_columns_removed,
            n_columns_used,
        };
    }

    let weighted = matrix.scale_columns(&page_weight);
    let dots = weighted.row_dot(&target_vec);
    let row_norms = weighted.row_norms();

    let scores = links
        .row_labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let similarity = dots[i] / (row_norms[i] * target_norm);
            let similarity = if similarity.is_finite() {
                similarity
            } else {
                0.0
            };
            (label.clone(), similarity)
        })
        .collect();

    SeedSimilarity {
        scores,
        page_weight,
        target_vec,
        n_columns_removed,
        n_columns_used,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links_map(pairs: &[(&str, &[&str])]) -> IndexMap<String, Vec<String>> {
        pairs
            .iter()
            .map(|(k, vs)| {
                (
                    k.to_string(),
                    vs.iter().map(|v| v.to_string()).collect::<Vec<_>>(),
                )
            })
            .collect()
    }

    fn degrees(pairs: &[(&str, u64)]) -> HashMap<String, u64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn link_matrix_shape_and_labels() {
        let matrix = link_matrix(&links_map(&[
            ("Morality", &["Ethics", "Value"]),
            ("Aristotle", &["Ethics"]),
        ]));
        assert_eq!(matrix.matrix.shape(), (2, 2));
        assert_eq!(matrix.row_labels, vec!["Morality", "Aristotle"]);
        assert_eq!(matrix.col_labels, vec!["Ethics", "Value"]);
        assert_eq!(matrix.matrix.nnz(), 3);
    }

    #[test]
    fn identical_profiles_score_one() {
        let matrix = link_matrix(&links_map(&[("Seed", &["X", "Y"]), ("Other", &["X", "Y"])]));
        let all = degrees(&[("X", 2), ("Y", 2)]);
        let seeds = degrees(&[("X", 1), ("Y", 1)]);
        let result = seed_similarity(&matrix, &all, &seeds);

        assert_eq!(result.n_columns_removed, 0);
        assert_eq!(result.n_columns_used, 2);
        assert!((result.scores["Seed"] - 1.0).abs() < 1e-12);
        assert!((result.scores["Other"] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_in_degree_columns_are_dropped() {
        let matrix = link_matrix(&links_map(&[("A", &["X", "Dead"]), ("B", &["X"])]));
        let all = degrees(&[("X", 3)]);
        let seeds = degrees(&[("X", 1)]);
        let result = seed_similarity(&matrix, &all, &seeds);

        assert_eq!(result.n_columns_removed, 1);
        assert_eq!(result.n_columns_used, 1);
        assert_eq!(result.page_weight.len(), 1);
    }

    #[test]
    fn all_zero_in_degree_scores_zero() {
        let matrix = link_matrix(&links_map(&[("A", &["X"]), ("B", &["Y"])]));
        let result = seed_similarity(&matrix, &HashMap::new(), &HashMap::new());

        assert_eq!(result.n_columns_used, 0);
        assert_eq!(result.scores.len(), 2);
        assert_eq!(result.scores["A"], 0.0);
        assert_eq!(result.scores["B"], 0.0);
    }

    #[test]
    fn zero_norm_row_scores_zero_not_nan() {
        // B links only to the column whose seed weight is zero.
        let matrix = link_matrix(&links_map(&[("A", &["X"]), ("B", &["Y"])]));
        let all = degrees(&[("X", 2), ("Y", 2)]);
        let seeds = degrees(&[("X", 2)]);
        let result = seed_similarity(&matrix, &all, &seeds);

        assert!((result.scores["A"] - 1.0).abs() < 1e-12);
        assert_eq!(result.scores["B"], 0.0);
        assert!(result.scores.values().all(|s| s.is_finite()));
    }

    #[test]
    fn weights_shape_partial_overlap() {
        let matrix = link_matrix(&links_map(&[("A", &["X", "Y"]), ("B", &["Y"])]));
        let all = degrees(&[("X", 4), ("Y", 2)]);
        let seeds = degrees(&[("X", 1), ("Y", 2)]);
        let result = seed_similarity(&matrix, &all, &seeds);

        // page_weight = [0.25, 1.0]; A's weighted row is identical to the
        // target, B overlaps only on Y.
        assert!((result.scores["A"] - 1.0).abs() < 1e-12);
        let expected_b = 1.0 / (0.25f64 * 0.25 + 1.0).sqrt();
        assert!((result.scores["B"] - expected_b).abs() < 1e-12);
    }
}
