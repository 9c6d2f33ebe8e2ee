use crate::{models::OriginFilter, store::CatalogStore};

/// Titles containing `query` (case-insensitive) within the origin filter
///
/// Results keep catalog order. A blank query lists every title in the filter.
pub fn search_titles(
    catalog: &CatalogStore,
    query: &str,
    origin_filter: &OriginFilter,
) -> Vec<String> {
    let needle = query.trim().to_lowercase();

    catalog
        .records()
        .iter()
        .filter(|record| origin_filter.allows(record.origin.as_ref()))
        .filter(|record| needle.is_empty() || record.title.to_lowercase().contains(&needle))
        .map(|record| record.title.clone())
        .collect()
}
