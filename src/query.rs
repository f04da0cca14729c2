//! Scopus query construction.
//!
//! Combines the user's keyword clause with a `PUBYEAR` predicate. The keyword
//! text is inserted verbatim: Scopus query syntax (quotes, parentheses, field
//! codes) passes straight through, and unbalanced input is rejected by Scopus
//! itself rather than here.

/// Build the full Scopus query for `keywords` restricted to `[start_year, end_year]`.
///
/// A single-year range uses the exact `PUBYEAR IS` predicate; anything wider
/// uses two strict comparisons widened by one year on each side.
pub fn build_query(keywords: &str, start_year: i32, end_year: i32) -> String {
    if start_year == end_year {
        format!("{} AND PUBYEAR IS {}", keywords, start_year)
    } else {
        format!(
            "{} AND PUBYEAR > {} AND PUBYEAR < {}",
            keywords,
            start_year.saturating_sub(1),
            end_year.saturating_add(1)
        )
    }
}
