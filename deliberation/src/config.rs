use chrono::NaiveDateTime;
use serde::Deserialize;

/// Application settings read from Rocket's figment (`Rocket.toml` or
/// `ROCKET_*` variables). The database URL is configured separately under
/// `databases.deliberation.url`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub site_name: String,
    /// `strftime` pattern for timestamps shown in pages.
    pub time_format: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            site_name: "Deliberation".to_owned(),
            time_format: "%Y-%m-%d %H:%M".to_owned(),
        }
    }
}

impl AppConfig {
    pub fn format_time(&self, value: NaiveDateTime) -> String {
        value.format(&self.time_format).to_string()
    }

    pub fn format_optional(&self, value: Option<NaiveDateTime>) -> Option<String> {
        value.map(|v| self.format_time(v))
    }
}
