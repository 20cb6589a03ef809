//! Data model shared by the adapters and the orchestrator
//!
//! - `JobCard`: what a listing page tells us about one posting
//! - `JobDetail`: what the detail page (or JSON record) adds
//! - `JobPosting`: the scored unit of output
//! - `HarvestOutcome`: the merged result of one harvest

use serde::Serialize;

/// Fallback company name when a card has none
pub const COMPANY_FALLBACK: &str = "Not specified";

/// Fallback location when a card has none
pub const LOCATION_FALLBACK: &str = "location not given";

/// Fallback posted-at value when no date is printed
pub const POSTED_AT_FALLBACK: &str = "---";

/// A scored job posting
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    /// Site-native posted information, not normalized to a calendar date
    pub posted_at: String,
    pub url: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub relevance_score: f64,
}

/// Result of a harvest (or of one adapter run)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HarvestOutcome {
    pub jobs: Vec<JobPosting>,
    pub total_count: usize,
}

impl HarvestOutcome {
    /// Builds an outcome whose count matches the number of postings
    pub fn from_jobs(jobs: Vec<JobPosting>) -> Self {
        let total_count = jobs.len();
        Self { jobs, total_count }
    }

    /// Appends another outcome, summing the counts
    pub fn merge(&mut self, other: HarvestOutcome) {
        self.total_count += other.total_count;
        self.jobs.extend(other.jobs);
    }
}

/// One job summary found on a listing page
///
/// Every field is optional: sites differ in what their cards carry, and
/// missing markup degrades to a fallback when the posting is assembled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobCard {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub posted_at: Option<String>,
    /// Canonical link to the posting
    pub url: Option<String>,
    /// Site-specific key for the detail lookup (e.g. a job id)
    pub detail_key: Option<String>,
    /// Description shipped with the listing itself (JSON APIs)
    pub description: Option<String>,
}

/// Fields recovered from a detail page or record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobDetail {
    pub description: String,
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub posted_at: Option<String>,
}

impl JobDetail {
    pub fn with_description(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Default::default()
        }
    }
}
