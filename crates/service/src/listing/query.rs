use serde::Serialize;
use uuid::Uuid;

/// Facet price range reported when no active listing exists.
pub const DEFAULT_PRICE_RANGE: [f64; 2] = [0.0, 1000.0];

/// AND-composed search filter over active listings. Every field is optional;
/// an empty filter matches the whole active set.
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    /// Exact category match.
    pub category: Option<Uuid>,
    /// Inclusive lower price bound.
    pub min_price: Option<f64>,
    /// Inclusive upper price bound.
    pub max_price: Option<f64>,
    /// Case-insensitive substring over the location field.
    pub location: Option<String>,
    /// Case-insensitive substring over title OR description.
    pub search: Option<String>,
}

/// Aggregates over the full active set (not the current page), used to
/// populate filter widgets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Facets {
    pub categories: Vec<Uuid>,
    pub locations: Vec<String>,
    pub price_range: [f64; 2],
}

impl Default for Facets {
    fn default() -> Self {
        Self { categories: Vec::new(), locations: Vec::new(), price_range: DEFAULT_PRICE_RANGE }
    }
}

/// One page of matches plus the pre-pagination total and facet summary.
#[derive(Debug, Serialize)]
pub struct SearchResult {
    pub items: Vec<models::listing::Model>,
    pub total: u64,
    pub facets: Facets,
}

/// Case-insensitive substring match, shared by the in-memory repository so
/// its semantics track the SQL `ILIKE '%term%'` predicate.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::contains_ci;

    #[test]
    fn substring_match_ignores_case() {
        assert!(contains_ci("Downtown Cairo", "cairo"));
        assert!(contains_ci("Downtown Cairo", "TOWN"));
        assert!(!contains_ci("Downtown Cairo", "alexandria"));
    }
}
