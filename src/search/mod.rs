//! Caller-facing search request and search-URL planning
//!
//! A [`SearchRequest`] names one or more job titles, the keyword phrases used
//! for scoring, a coarse recency filter and a free-text location. Planning
//! expands it into one search URL per (title x site); the resulting list is
//! what the orchestrator partitions and harvests.

use crate::harvest::HarvestContext;
use crate::scoring::RecencyBucket;
use crate::sites::SiteAdapter;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// One caller request
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub titles: Vec<String>,

    /// Keyword phrases; `false` in the JSON input means "no scoring"
    #[serde(default, deserialize_with = "keywords_or_false")]
    pub keywords: Vec<String>,

    #[serde(default, alias = "recencyFilter")]
    pub recency: RecencyFilter,

    #[serde(default)]
    pub location: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum KeywordsField {
    List(Vec<String>),
    Flag(bool),
}

fn keywords_or_false<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match KeywordsField::deserialize(deserializer)? {
        KeywordsField::List(keywords) => keywords,
        KeywordsField::Flag(_) => Vec::new(),
    })
}

/// Coarse "posted within" filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum RecencyFilter {
    Day,
    Week,
    Month,
    #[default]
    Any,
}

impl RecencyFilter {
    /// Oldest bucket a card may fall in, or `None` when nothing is filtered
    pub fn threshold(&self) -> Option<RecencyBucket> {
        match self {
            Self::Day => Some(RecencyBucket::Day),
            Self::Week => Some(RecencyBucket::Week),
            Self::Month => Some(RecencyBucket::Month),
            Self::Any => None,
        }
    }

    /// Window in seconds, as used by LinkedIn's `f_TPR` parameter
    pub fn seconds(&self) -> Option<u64> {
        self.threshold().map(|bucket| bucket.seconds())
    }

    /// Window in days, as used by Indeed's `fromage` parameter
    pub fn days(&self) -> Option<u32> {
        match self {
            Self::Day => Some(1),
            Self::Week => Some(7),
            Self::Month => Some(30),
            Self::Any => None,
        }
    }

    /// Returns true if a card of `bucket` passes this filter
    pub fn admits(&self, bucket: RecencyBucket) -> bool {
        self.threshold().map_or(true, |limit| bucket <= limit)
    }
}

impl FromStr for RecencyFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "24h" | "1d" | "day" | "past 24 hours" => Ok(Self::Day),
            "7d" | "week" | "past week" => Ok(Self::Week),
            "30d" | "month" | "past month" => Ok(Self::Month),
            "any" | "" | "any time" => Ok(Self::Any),
            other => Err(format!(
                "unknown recency filter '{}' (expected 24h, 7d, 30d or any)",
                other
            )),
        }
    }
}

impl TryFrom<String> for RecencyFilter {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for RecencyFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Day => "24h",
            Self::Week => "7d",
            Self::Month => "30d",
            Self::Any => "any",
        };
        f.write_str(label)
    }
}

/// A "city, state, country" location split from the right
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    /// The location exactly as the caller wrote it
    pub raw: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

impl Location {
    /// Splits on commas; the last part is the country, then state, then city
    pub fn parse(raw: &str) -> Self {
        let parts: Vec<&str> = raw
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();
        let from_right = |offset: usize| {
            parts
                .len()
                .checked_sub(offset)
                .map(|index| parts[index].to_string())
        };

        Self {
            raw: raw.trim().to_string(),
            country: from_right(1),
            state: from_right(2),
            city: from_right(3),
        }
    }
}

/// Percent-encodes one query value (spaces become `%20`)
pub fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Lowercase, accent-free, dash-joined form of a place name for URL paths
pub fn slugify(value: &str) -> String {
    use unicode_normalization::char::is_combining_mark;
    use unicode_normalization::UnicodeNormalization;

    value
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Expands a request into one search URL per (title x adapter)
///
/// Adapters that cannot build a URL for a title (for example because a
/// location lookup failed hard) simply contribute nothing.
pub async fn plan(
    request: &SearchRequest,
    adapters: &[Arc<dyn SiteAdapter>],
    ctx: &HarvestContext,
) -> Vec<String> {
    let location = Location::parse(&request.location);
    let mut urls = Vec::new();

    for title in request.titles.iter().filter(|t| !t.trim().is_empty()) {
        for adapter in adapters {
            let planned: Vec<String> = adapter
                .search_urls(ctx, title.trim(), &location, request.recency)
                .await;
            tracing::debug!(
                "Planned {} URL(s) for '{}' on {}",
                planned.len(),
                title,
                adapter.site()
            );
            urls.extend(planned);
        }
    }

    urls
}
