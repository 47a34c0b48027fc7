//! Nobel pipeline configuration

use std::path::PathBuf;

use nobeline_core::SinkOptions;

use crate::state::Entity;
use crate::transform::Language;

/// Public Nobel Prize API, version 2.1
pub const DEFAULT_BASE_URL: &str = "https://api.nobelprize.org/2.1";

/// Records requested per page
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// Runtime configuration for one fetch + flatten run
#[derive(Debug, Clone)]
pub struct Config {
    /// API base URL, without trailing slash
    pub base_url: String,
    /// Endpoint to fetch
    pub entity: Entity,
    /// Output directory for table files
    pub output_dir: PathBuf,
    /// Output format, delimiter and compression
    pub sink: SinkOptions,
    /// `limit` sent with every page request
    pub page_size: usize,
    /// Stop after this many records (for testing)
    pub max_records: Option<usize>,
    /// Language used to resolve localized text
    pub language: Language,
    /// Extra query parameters passed through verbatim
    pub filters: Vec<(String, String)>,
    /// Also write the concatenated raw records
    pub save_raw: bool,
    /// Read records from a raw dump instead of the API
    pub input: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            entity: Entity::Laureates,
            output_dir: PathBuf::from("output"),
            sink: SinkOptions::default(),
            page_size: DEFAULT_PAGE_SIZE,
            max_records: None,
            language: Language::En,
            filters: Vec::new(),
            save_raw: false,
            input: None,
        }
    }
}

impl Config {
    /// Listing URL for the configured entity
    pub fn endpoint_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.entity.endpoint()
        )
    }

    /// Path of the raw record dump
    pub fn raw_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_raw.json", self.entity.output_prefix()))
    }
}

/// Parse a `key=value` query filter
pub fn parse_filter(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty filter key in '{s}'"));
    }
    if matches!(key, "offset" | "limit") {
        return Err(format!("'{key}' is controlled by the pager"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nobeline_core::OutputFormat;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert_eq!(config.entity, Entity::Laureates);
        assert_eq!(config.page_size, 25);
        assert_eq!(config.sink.format, OutputFormat::Csv);
        assert!(config.max_records.is_none());
        assert!(config.filters.is_empty());
        assert!(!config.save_raw);
    }

    #[test]
    fn endpoint_url_trims_slash() {
        let config = Config {
            base_url: "http://localhost:8080/2.1/".into(),
            entity: Entity::NobelPrizes,
            ..Default::default()
        };
        assert_eq!(config.endpoint_url(), "http://localhost:8080/2.1/nobelPrizes");
    }

    #[test]
    fn raw_path_uses_prefix() {
        let config = Config {
            entity: Entity::NobelPrizes,
            ..Default::default()
        };
        assert_eq!(
            config.raw_path(),
            PathBuf::from("output/nobel_prizes_raw.json")
        );
    }

    #[test]
    fn parse_filter_ok() {
        assert_eq!(
            parse_filter("nobelPrizeCategory=phy").unwrap(),
            ("nobelPrizeCategory".to_string(), "phy".to_string())
        );
        assert_eq!(
            parse_filter("birthCountry=United Kingdom").unwrap().1,
            "United Kingdom"
        );
    }

    #[test]
    fn parse_filter_rejects_bad_input() {
        assert!(parse_filter("novalue").is_err());
        assert!(parse_filter("=x").is_err());
        assert!(parse_filter("offset=10").is_err());
    }
}
