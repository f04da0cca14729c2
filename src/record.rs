//! Scopus entry schema and record normalization.
//!
//! Each Scopus search entry is flattened into a [`NormalizedRecord`]: a row of
//! plain strings ready for display or CSV export. Absent fields become empty
//! strings, never `None`.

use serde::{Deserialize, Serialize};

/// Link placeholder for records without a DOI
pub const NO_DOI_LINK: &str = "No DOI/link";

/// Affiliations placeholder for records without any affiliation entry
pub const NO_AFFILIATIONS: &str = "No Affiliations";

/// Resolver prefix used to build the `Link` column
const DOI_RESOLVER: &str = "https://doi.org/";

/// One flattened article row.
///
/// Serialized field names are the export column headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct NormalizedRecord {
    #[serde(rename = "Title")]
    pub title: String,
    /// All listed authors, comma separated
    #[serde(rename = "First Author")]
    pub first_author: String,
    /// First four characters of the cover date
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "Journal")]
    pub journal: String,
    #[serde(rename = "DOI")]
    pub doi: String,
    #[serde(rename = "Link")]
    pub link: String,
    #[serde(rename = "Volume")]
    pub volume: String,
    #[serde(rename = "Page Range")]
    pub page_range: String,
    #[serde(rename = "ISSN")]
    pub issn: String,
    #[serde(rename = "Affiliations")]
    pub affiliations: String,
    #[serde(rename = "Cited By Count")]
    pub cited_by_count: String,
}

impl NormalizedRecord {
    /// Field values in export column order.
    pub fn fields(&self) -> [&str; 11] {
        [
            &self.title,
            &self.first_author,
            &self.year,
            &self.journal,
            &self.doi,
            &self.link,
            &self.volume,
            &self.page_range,
            &self.issn,
            &self.affiliations,
            &self.cited_by_count,
        ]
    }
}

// === Scopus Search API Entry Types ===

/// A single entry from `search-results.entry`, as Scopus sends it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScopusEntry {
    #[serde(rename = "dc:title", default)]
    pub title: Option<String>,
    #[serde(rename = "dc:creator", default)]
    pub creator: Option<String>,
    #[serde(rename = "prism:coverDate", default)]
    pub cover_date: Option<String>,
    #[serde(rename = "prism:publicationName", default)]
    pub publication_name: Option<String>,
    #[serde(rename = "prism:doi", default)]
    pub doi: Option<String>,
    #[serde(rename = "prism:volume", default)]
    pub volume: Option<String>,
    #[serde(rename = "prism:pageRange", default)]
    pub page_range: Option<String>,
    #[serde(rename = "prism:issn", default)]
    pub issn: Option<String>,
    #[serde(default)]
    pub affiliation: Option<Vec<ScopusAffiliation>>,
    #[serde(rename = "citedby-count", default)]
    pub cited_by_count: Option<String>,
    /// Set on the placeholder entry Scopus returns for an empty result set
    #[serde(default)]
    pub error: Option<String>,
}

impl ScopusEntry {
    /// Whether this is the `"Result set was empty"` placeholder rather than an article.
    pub fn is_placeholder(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScopusAffiliation {
    #[serde(default)]
    pub affilname: Option<String>,
    #[serde(rename = "affiliation-city", default)]
    pub city: Option<String>,
    #[serde(rename = "affiliation-country", default)]
    pub country: Option<String>,
}

/// Flatten a Scopus entry into a [`NormalizedRecord`].
pub fn normalize(entry: ScopusEntry) -> NormalizedRecord {
    let doi = entry.doi.unwrap_or_default();
    let link = doi_link(&doi);

    NormalizedRecord {
        title: entry.title.unwrap_or_default().trim().to_string(),
        first_author: split_authors(entry.creator.as_deref().unwrap_or_default()),
        year: cover_year(entry.cover_date.as_deref().unwrap_or_default()),
        journal: entry.publication_name.unwrap_or_default().trim().to_string(),
        doi,
        link,
        volume: entry.volume.unwrap_or_default(),
        page_range: entry.page_range.unwrap_or_default(),
        issn: entry.issn.unwrap_or_default(),
        affiliations: format_affiliations(entry.affiliation.as_deref().unwrap_or_default()),
        cited_by_count: entry.cited_by_count.unwrap_or_else(|| "0".to_string()),
    }
}

/// Resolver link for a DOI, or [`NO_DOI_LINK`] when the DOI is empty.
pub fn doi_link(doi: &str) -> String {
    if doi.is_empty() {
        NO_DOI_LINK.to_string()
    } else {
        format!("{}{}", DOI_RESOLVER, doi)
    }
}

/// Split an author field on `;` or `,`, trim each name, drop blanks and
/// rejoin with `", "`.
pub fn split_authors(creator: &str) -> String {
    creator
        .split([';', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Leading four characters of a cover date such as `2023-06-15`.
pub fn cover_year(cover_date: &str) -> String {
    cover_date.chars().take(4).collect()
}

/// Render affiliations as `name (city, country)` joined by `"; "`.
pub fn format_affiliations(affiliations: &[ScopusAffiliation]) -> String {
    if affiliations.is_empty() {
        return NO_AFFILIATIONS.to_string();
    }

    affiliations
        .iter()
        .map(|a| {
            format!(
                "{} ({}, {})",
                a.affilname.as_deref().unwrap_or_default(),
                a.city.as_deref().unwrap_or_default(),
                a.country.as_deref().unwrap_or_default()
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}
