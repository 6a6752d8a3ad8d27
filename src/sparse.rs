//! Compressed sparse row matrices for label-relation data.
//!
//! The matrices this crate builds are small, binary, and consumed by exactly
//! one similarity computation, so the storage is a plain CSR triplet rather
//! than a linear-algebra dependency.

use indexmap::IndexMap;

/// Sparse matrix in compressed sparse row form.
///
/// `indptr` has `rows + 1` entries; row `i` owns the slice
/// `indices[indptr[i]..indptr[i + 1]]` of column positions with the matching
/// `data` values. Column indices are strictly increasing within a row.
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix {
    rows: usize,
    cols: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    data: Vec<f64>,
}

impl CsrMatrix {
    /// Builds a matrix from per-row `(column, value)` entries.
    ///
    /// Entries within a row must already be sorted by column and free of
    /// duplicates; the labeled builders below guarantee that.
    pub(crate) fn from_rows(rows: usize, cols: usize, row_entries: Vec<Vec<(usize, f64)>>) -> Self {
        debug_assert_eq!(row_entries.len(), rows);
        let mut indptr = Vec::with_capacity(rows + 1);
        let mut indices = Vec::new();
        let mut data = Vec::new();
        indptr.push(0);
        for entries in row_entries {
            for (col, value) in entries {
                debug_assert!(col < cols);
                indices.push(col);
                data.push(value);
            }
            indptr.push(indices.len());
        }
        Self {
            rows,
            cols,
            indptr,
            indices,
            data,
        }
    }

    /// Matrix shape as `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Number of explicitly stored entries.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Value at `(row, col)`; implicit zeros return 0.0.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        let span = &self.indices[self.indptr[row]..self.indptr[row + 1]];
        match span.binary_search(&col) {
            Ok(pos) => self.data[self.indptr[row] + pos],
            Err(_) => 0.0,
        }
    }

    /// Stored `(column, value)` entries of one row.
    pub fn row(&self, row: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let span = self.indptr[row]..self.indptr[row + 1];
        span.map(move |k| (self.indices[k], self.data[k]))
    }

    /// Restricts the matrix to the given columns, renumbering them
    /// `0..keep.len()` in the order given.
    pub fn select_columns(&self, keep: &[usize]) -> CsrMatrix {
        let mut remap = vec![usize::MAX; self.cols];
        for (new, &old) in keep.iter().enumerate() {
            remap[old] = new;
        }

        let mut indptr = Vec::with_capacity(self.rows + 1);
        let mut indices = Vec::new();
        let mut data = Vec::new();
        indptr.push(0);
        for row in 0..self.rows {
            for (col, value) in self.row(row) {
                let new_col = remap[col];
                if new_col != usize::MAX {
                    indices.push(new_col);
                    data.push(value);
                }
            }
            indptr.push(indices.len());
        }
        CsrMatrix {
            rows: self.rows,
            cols: keep.len(),
            indptr,
            indices,
            data,
        }
    }

    /// Multiplies every column `j` by `weights[j]`.
    pub fn scale_columns(&self, weights: &[f64]) -> CsrMatrix {
        debug_assert_eq!(weights.len(), self.cols);
        let mut scaled = self.clone();
        for (k, &col) in self.indices.iter().enumerate() {
            scaled.data[k] = self.data[k] * weights[col];
        }
        scaled
    }

    /// Dot product of each row against a dense vector.
    pub fn row_dot(&self, vector: &[f64]) -> Vec<f64> {
        debug_assert_eq!(vector.len(), self.cols);
        (0..self.rows)
            .map(|row| self.row(row).map(|(col, value)| value * vector[col]).sum())
            .collect()
    }

    /// Euclidean norm of each row.
    pub fn row_norms(&self) -> Vec<f64> {
        (0..self.rows)
            .map(|row| {
                self.row(row)
                    .map(|(_, value)| value * value)
                    .sum::<f64>()
                    .sqrt()
            })
            .collect()
    }
}

/// Converts a label-relation map into a labeled binary CSR matrix.
///
/// Row order follows the map's insertion order. Column labels are the
/// sorted, deduplicated union of all targets. A target repeated within one
/// row still produces a single 1-cell.
pub(crate) fn labeled_binary_matrix(
    relations: &IndexMap<String, Vec<String>>,
) -> (CsrMatrix, Vec<String>, Vec<String>) {
    let row_labels: Vec<String> = relations.keys().cloned().collect();

    let mut col_labels: Vec<String> = relations
        .values()
        .flatten()
        .cloned()
        .collect();
    col_labels.sort_unstable();
    col_labels.dedup();

    let col_index: IndexMap<&str, usize> = col_labels
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();

    let row_entries = relations
        .values()
        .map(|targets| {
            let mut cols: Vec<usize> = targets
                .iter()
                .filter_map(|t| col_index.get(t.as_str()).copied())
                .collect();
            cols.sort_unstable();
            cols.dedup();
            cols.into_iter().map(|c| (c, 1.0)).collect()
        })
        .collect();

    let matrix = CsrMatrix::from_rows(row_labels.len(), col_labels.len(), row_entries);
    (matrix, row_labels, col_labels)
}
