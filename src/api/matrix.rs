//! Build category-member matrices, optionally expanding subcategories
//! breadth-first.

use std::collections::BTreeSet;

use futures_util::stream::{self, StreamExt};
use indexmap::IndexMap;
use tracing::{info, warn};

use crate::error::Error;
use crate::http::WikiClient;
use crate::models::{CategoryMatrix, Namespace};
use crate::sparse::labeled_binary_matrix;

fn strip_category_prefix(title: &str) -> &str {
    title.strip_prefix("Category:").unwrap_or(title)
}

impl WikiClient {
    /// Builds a binary sparse matrix of category-member relationships.
    ///
    /// Rows are the requested categories (input order preserved), columns
    /// the sorted union of their members; labels carry no `Category:`
    /// prefix. With `depth > 1` and [`Namespace::Category`], members that
    /// are not yet rows are fetched as categories themselves, level by
    /// level, until `depth` levels are expanded or nothing new remains.
    ///
    /// `depth > 1` combined with any other namespace fails with
    /// [`Error::Validation`] before any request is issued.
    pub async fn category_members_matrix<S: AsRef<str>>(
        &self,
        categories: &[S],
        depth: u32,
        namespace: Namespace,
    ) -> Result<CategoryMatrix, Error> {
        if depth > 1 && namespace != Namespace::Category {
            return Err(Error::Validation(
                "depth > 1 only applies to the category namespace (14)".to_string(),
            ));
        }
        if depth > 3 {
            warn!(depth, "depth > 3 may return too many results to be useful");
        }

        let seeds: Vec<String> = categories
            .iter()
            .map(|c| c.as_ref().to_string())
            .collect();
        let mut member_map: IndexMap<String, Vec<String>> = IndexMap::new();
        for (category, members) in self.fetch_member_lists(seeds, namespace).await? {
            member_map.insert(category, members);
        }

        for level in 2..=depth {
            // Members seen so far that have not been expanded into rows yet.
            let to_fetch: Vec<String> = member_map
                .values()
                .flatten()
                .filter(|member| !member_map.contains_key(member.as_str()))
                .cloned()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            if to_fetch.is_empty() {
                break;
            }

            info!(level, count = to_fetch.len(), "retrieving members at depth");
            for (category, members) in self.fetch_member_lists(to_fetch, namespace).await? {
                member_map.insert(category, members);
            }
        }

        let (matrix, row_labels, col_labels) = labeled_binary_matrix(&member_map);
        Ok(CategoryMatrix {
            matrix,
            row_labels,
            col_labels,
        })
    }

    /// Fetches member lists for many categories, preserving input order.
    async fn fetch_member_lists(
        &self,
        categories: Vec<String>,
        namespace: Namespace,
    ) -> Result<Vec<(String, Vec<String>)>, Error> {
        let mut pending = stream::iter(categories.into_iter().map(|category| async move {
            let members = self.category_members(&category, namespace).await?;
            let row = strip_category_prefix(&category).to_string();
            let targets = members
                .into_iter()
                .map(|member| strip_category_prefix(&member.title).to_string())
                .collect();
            Ok::<_, Error>((row, targets))
        }))
        .buffered(self.max_concurrency());

        let mut fetched = Vec::new();
        while let Some(entry) = pending.next().await {
            fetched.push(entry?);
        }
        Ok(fetched)
    }
}
