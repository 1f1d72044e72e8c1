use std::env;
use std::path::PathBuf;

use tracing::info;

pub const DEFAULT_GDACS_URL: &str = "https://www.gdacs.org/xml/rss_7d.xml";
pub const DEFAULT_HAZARD_TYPES_URL: &str = "https://raw.githubusercontent.com/idmc-labs/idmc-monitoring-platform/master/hazard_monitoring/IDMC_Hazard_Types_Translator.csv";
pub const DEFAULT_ACLED_URL: &str = "https://api.acleddata.com/acled/read?terms=accept";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Feed endpoints
    pub gdacs_url: String,
    pub hazard_types_url: String,
    pub acled_url: String,
    pub acled_key: Option<String>,
    pub acled_email: Option<String>,
    pub acled_max_pages: u32,

    // Collaborators
    pub output_dir: PathBuf,
    pub borders_path: Option<PathBuf>,
    pub http_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gdacs_url: DEFAULT_GDACS_URL.to_string(),
            hazard_types_url: DEFAULT_HAZARD_TYPES_URL.to_string(),
            acled_url: DEFAULT_ACLED_URL.to_string(),
            acled_key: None,
            acled_email: None,
            acled_max_pages: 50,
            output_dir: PathBuf::from("data"),
            borders_path: None,
            http_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to the
    /// public feed endpoints. Panics with a clear message on malformed numbers.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            gdacs_url: env::var("FEEDWATCH_GDACS_URL").unwrap_or(defaults.gdacs_url),
            hazard_types_url: env::var("FEEDWATCH_HAZARD_TYPES_URL")
                .unwrap_or(defaults.hazard_types_url),
            acled_url: env::var("FEEDWATCH_ACLED_URL").unwrap_or(defaults.acled_url),
            acled_key: env::var("FEEDWATCH_ACLED_KEY").ok(),
            acled_email: env::var("FEEDWATCH_ACLED_EMAIL").ok(),
            acled_max_pages: env::var("FEEDWATCH_ACLED_MAX_PAGES")
                .map(|v| v.parse().expect("FEEDWATCH_ACLED_MAX_PAGES must be a number"))
                .unwrap_or(defaults.acled_max_pages),
            output_dir: env::var("FEEDWATCH_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            borders_path: env::var("FEEDWATCH_BORDERS").ok().map(PathBuf::from),
            http_timeout_secs: env::var("FEEDWATCH_HTTP_TIMEOUT_SECS")
                .map(|v| v.parse().expect("FEEDWATCH_HTTP_TIMEOUT_SECS must be a number"))
                .unwrap_or(defaults.http_timeout_secs),
        }
    }

    /// URL of one ACLED result page, credentials appended when configured.
    pub fn acled_page_url(&self, page: u32) -> String {
        let mut url = format!("{}&page={page}", self.acled_url);
        if let Some(ref key) = self.acled_key {
            url.push_str(&format!("&key={key}"));
        }
        if let Some(ref email) = self.acled_email {
            url.push_str(&format!("&email={email}"));
        }
        url
    }

    /// Log the effective configuration without credentials.
    pub fn log_redacted(&self) {
        info!(
            gdacs_url = self.gdacs_url.as_str(),
            hazard_types_url = self.hazard_types_url.as_str(),
            acled_url = self.acled_url.as_str(),
            acled_key = if self.acled_key.is_some() { "[set]" } else { "[unset]" },
            acled_max_pages = self.acled_max_pages,
            output_dir = %self.output_dir.display(),
            borders_path = ?self.borders_path,
            http_timeout_secs = self.http_timeout_secs,
            "Loaded config"
        );
    }
}
