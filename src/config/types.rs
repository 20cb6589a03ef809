use serde::Deserialize;

/// Default browser-like user agent; several job boards reject obvious bots
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/112.0.0.0 Safari/537.36";

/// Main configuration structure for Vaga-Harvest
///
/// Every section is optional; a missing section falls back to its defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub harvest: HarvestConfig,
    pub http: HttpConfig,
    pub scoring: ScoringConfig,
    pub output: OutputConfig,
}

/// Harvest pipeline limits
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HarvestConfig {
    /// Cooperative ceiling for a whole harvest, in seconds
    pub deadline_secs: u64,

    /// Maximum number of cards processed per search URL
    pub card_cap: usize,

    /// Concurrent listing fetches per adapter
    pub listing_workers: usize,

    /// Upper bound for the sqrt-scaled detail pool of one card group
    pub max_detail_workers: usize,

    /// Process-wide bound on in-flight network requests
    pub max_concurrent_fetches: usize,

    /// Minimum interval between two requests to the same host (milliseconds)
    pub politeness_delay_ms: u64,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            deadline_secs: 90,
            card_cap: 10,
            listing_workers: 10,
            max_detail_workers: 10,
            max_concurrent_fetches: 32,
            politeness_delay_ms: 500,
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HttpConfig {
    /// User agent sent with every request
    pub user_agent: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 10,
            connect_timeout_secs: 5,
        }
    }
}

/// Relevance scoring configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ScoringConfig {
    /// Upper bound of the relevance score
    pub scale_factor: f64,

    /// Strip diacritics before matching ("ação" matches "acao")
    pub fold_accents: bool,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            scale_factor: crate::scoring::SCALE_FACTOR,
            fold_accents: false,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Keep the scored description text on each emitted posting
    pub include_descriptions: bool,
}
