use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{Result, ScrapingError};
use crate::extractor::SiteId;

pub const DEFAULT_CONFIG_PATH: &str = "seeder.toml";
pub const ENV_PREFIX: &str = "SEEDER";
/// Upper bound on the number of pages a single site range may span.
pub const MAX_PAGES_PER_SITE: u32 = 1_000;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub sites: Vec<SiteId>,
    pub xici_category: String,
    pub inter_job_delay_ms: u64,
    /// 0 waits on a navigation forever.
    pub navigation_timeout_ms: u64,
    pub pop_order: PopOrder,
    pub page_ranges: PageRanges,
    pub browser: BrowserSettings,
    pub output: OutputConfig,
}

/// Inclusive page-index bounds for a paginated site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct PageRange {
    pub first: u32,
    pub last: u32,
}

impl PageRange {
    pub fn new(first: u32, last: u32) -> Self {
        Self { first, last }
    }

    pub fn pages(&self) -> RangeInclusive<u32> {
        self.first..=self.last
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PageRanges {
    pub proxyru: PageRange,
    pub kuai: PageRange,
    pub xici: PageRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PopOrder {
    /// Last constructed job runs first.
    Lifo,
    Fifo,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub headless: bool,
    pub randomize_user_agent: bool,
    pub extra_args: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Jsonl,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sites: SiteId::all().to_vec(),
            xici_category: "nn".to_string(),
            inter_job_delay_ms: 500,
            navigation_timeout_ms: 30_000,
            pop_order: PopOrder::Lifo,
            page_ranges: PageRanges::default(),
            browser: BrowserSettings::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for PageRanges {
    fn default() -> Self {
        Self {
            proxyru: PageRange::new(1, 2),
            kuai: PageRange::new(1, 10),
            xici: PageRange::new(1, 19),
        }
    }
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            randomize_user_agent: true,
            extra_args: Vec::new(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
        }
    }
}

impl Config {
    pub fn inter_job_delay(&self) -> Duration {
        Duration::from_millis(self.inter_job_delay_ms)
    }

    pub fn navigation_timeout(&self) -> Option<Duration> {
        match self.navigation_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    pub fn runs_site(&self, site: SiteId) -> bool {
        self.sites.contains(&site)
    }
}

#[async_trait::async_trait]
pub trait ConfigManager {
    async fn load_config(&self) -> Result<Config>;
    async fn save_config(&self, config: &Config) -> Result<()>;
    fn validate_config(&self, config: &Config) -> Result<()>;
}

pub struct FileConfigManager {
    config_path: PathBuf,
    env_prefix: String,
}

impl FileConfigManager {
    pub fn new(config_path: PathBuf) -> Self {
        Self::with_env_prefix(config_path, ENV_PREFIX)
    }

    pub fn with_env_prefix(config_path: PathBuf, env_prefix: &str) -> Self {
        Self {
            config_path,
            env_prefix: env_prefix.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl ConfigManager for FileConfigManager {
    async fn load_config(&self) -> Result<Config> {
        info!("Loading configuration from {:?}", self.config_path);

        if !self.config_path.exists() {
            warn!("Configuration file not found, creating default config at {:?}", self.config_path);
            self.create_default_config().await?;
        }

        // file first, then SEEDER__* environment overrides on top
        let layered = ::config::Config::builder()
            .add_source(
                ::config::File::from(self.config_path.as_path()).format(::config::FileFormat::Toml),
            )
            .add_source(
                ::config::Environment::with_prefix(&self.env_prefix)
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("sites")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ScrapingError::ConfigError(format!("Failed to read config file: {}", e)))?;

        let config: Config = layered
            .try_deserialize()
            .map_err(|e| ScrapingError::ConfigError(format!("Failed to parse TOML config: {}", e)))?;

        self.validate_config(&config)?;

        info!("Configuration loaded successfully");
        Ok(config)
    }

    fn validate_config(&self, config: &Config) -> Result<()> {
        debug!("Validating configuration");

        if config.sites.is_empty() {
            return Err(ScrapingError::ConfigError("Site list cannot be empty".to_string()).into());
        }

        let ranges = [
            ("proxyru", config.page_ranges.proxyru),
            ("kuai", config.page_ranges.kuai),
            ("xici", config.page_ranges.xici),
        ];
        for (name, range) in ranges {
            if range.first == 0 {
                return Err(ScrapingError::ConfigError(format!("{} page range must start at 1 or above", name)).into());
            }
            if range.first > range.last {
                return Err(ScrapingError::ConfigError(format!(
                    "{} page range start ({}) is after its end ({})",
                    name, range.first, range.last
                ))
                .into());
            }
            if range.last - range.first >= MAX_PAGES_PER_SITE {
                return Err(ScrapingError::ConfigError(format!(
                    "{} page range spans more than {} pages",
                    name, MAX_PAGES_PER_SITE
                ))
                .into());
            }
        }

        if config.xici_category.trim().is_empty() {
            return Err(ScrapingError::ConfigError("xici_category cannot be empty".to_string()).into());
        }
        if config.xici_category.contains('/') {
            return Err(ScrapingError::ConfigError(format!(
                "xici_category '{}' cannot contain '/'",
                config.xici_category
            ))
            .into());
        }

        if config.inter_job_delay_ms > 60_000 {
            return Err(ScrapingError::ConfigError("inter_job_delay_ms cannot exceed 60 seconds".to_string()).into());
        }

        debug!("Configuration validation passed");
        Ok(())
    }

    async fn save_config(&self, config: &Config) -> Result<()> {
        info!("Saving configuration to {:?}", self.config_path);

        let toml_content = toml::to_string_pretty(config)
            .map_err(|e| ScrapingError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        fs::write(&self.config_path, toml_content)
            .map_err(|e| ScrapingError::ConfigError(format!("Failed to write config file: {}", e)))?;

        info!("Configuration saved successfully");
        Ok(())
    }
}

impl FileConfigManager {
    async fn create_default_config(&self) -> Result<()> {
        let toml_content = toml::to_string_pretty(&Config::default())
            .map_err(|e| ScrapingError::ConfigError(format!("Failed to serialize default config: {}", e)))?;

        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| ScrapingError::ConfigError(format!("Failed to create config directory: {}", e)))?;
            }
        }

        fs::write(&self.config_path, toml_content)
            .map_err(|e| ScrapingError::ConfigError(format!("Failed to write default config: {}", e)))?;

        info!("Default configuration file created at {:?}", self.config_path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_load_default_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("seeder.toml");
        let manager = FileConfigManager::with_env_prefix(config_path.clone(), "SEEDER_TEST_DEFAULT");

        let config = manager.load_config().await.unwrap();

        assert_eq!(config.sites, SiteId::all().to_vec());
        assert_eq!(config.inter_job_delay_ms, 500);
        assert_eq!(config.page_ranges.kuai, PageRange::new(1, 10));
        assert_eq!(config.xici_category, "nn");
        assert_eq!(config.pop_order, PopOrder::Lifo);
        assert!(config_path.exists());
    }

    #[tokio::test]
    async fn test_load_partial_file_fills_defaults() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("seeder.toml");
        fs::write(
            &config_path,
            r#"
sites = ["kuai", "xici"]
inter_job_delay_ms = 1200
pop_order = "fifo"

[page_ranges.xici]
first = 3
last = 4
"#,
        )
        .unwrap();

        let manager = FileConfigManager::with_env_prefix(config_path, "SEEDER_TEST_PARTIAL");
        let config = manager.load_config().await.unwrap();

        assert_eq!(config.sites, vec![SiteId::Kuai, SiteId::Xici]);
        assert_eq!(config.inter_job_delay(), Duration::from_millis(1200));
        assert_eq!(config.pop_order, PopOrder::Fifo);
        assert_eq!(config.page_ranges.xici, PageRange::new(3, 4));
        assert_eq!(config.page_ranges.proxyru, PageRange::new(1, 2));
        assert!(!config.runs_site(SiteId::Proxy360));
    }

    #[tokio::test]
    async fn test_environment_overrides_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("seeder.toml");
        std::env::set_var("SEEDER_TEST_ENV__INTER_JOB_DELAY_MS", "750");

        let manager = FileConfigManager::with_env_prefix(config_path, "SEEDER_TEST_ENV");
        let config = manager.load_config().await.unwrap();

        assert_eq!(config.inter_job_delay_ms, 750);
        std::env::remove_var("SEEDER_TEST_ENV__INTER_JOB_DELAY_MS");
    }

    #[tokio::test]
    async fn test_environment_overrides_site_list() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("seeder.toml");
        std::env::set_var("SEEDER_TEST_SITES__SITES", "kuai,xici");

        let manager = FileConfigManager::with_env_prefix(config_path, "SEEDER_TEST_SITES");
        let config = manager.load_config().await;
        std::env::remove_var("SEEDER_TEST_SITES__SITES");

        let config = config.unwrap();
        assert_eq!(config.sites, vec![SiteId::Kuai, SiteId::Xici]);
        assert_eq!(config.page_ranges.xici, PageRange::new(1, 19));
    }

    #[tokio::test]
    async fn test_environment_single_site() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("seeder.toml");
        std::env::set_var("SEEDER_TEST_ONE_SITE__SITES", "proxyru");

        let manager = FileConfigManager::with_env_prefix(config_path, "SEEDER_TEST_ONE_SITE");
        let config = manager.load_config().await;
        std::env::remove_var("SEEDER_TEST_ONE_SITE__SITES");

        assert_eq!(config.unwrap().sites, vec![SiteId::Proxyru]);
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("seeder.toml");
        let manager = FileConfigManager::with_env_prefix(config_path, "SEEDER_TEST_SAVE");

        let mut config = Config::default();
        config.sites = vec![SiteId::Proxyru];
        config.navigation_timeout_ms = 0;
        config.output.format = OutputFormat::Jsonl;
        manager.save_config(&config).await.unwrap();

        let loaded = manager.load_config().await.unwrap();
        assert_eq!(loaded.sites, vec![SiteId::Proxyru]);
        assert_eq!(loaded.navigation_timeout(), None);
        assert_eq!(loaded.output.format, OutputFormat::Jsonl);
    }

    #[test]
    fn test_config_validation() {
        let manager = FileConfigManager::new(PathBuf::from("test.toml"));

        assert!(manager.validate_config(&Config::default()).is_ok());

        let mut invalid_config = Config::default();
        invalid_config.sites.clear();
        assert!(manager.validate_config(&invalid_config).is_err());

        let mut invalid_config = Config::default();
        invalid_config.page_ranges.kuai = PageRange::new(5, 2);
        assert!(manager.validate_config(&invalid_config).is_err());

        let mut invalid_config = Config::default();
        invalid_config.page_ranges.proxyru = PageRange::new(0, 2);
        assert!(manager.validate_config(&invalid_config).is_err());

        let mut invalid_config = Config::default();
        invalid_config.xici_category = "nn/extra".to_string();
        assert!(manager.validate_config(&invalid_config).is_err());

        let mut invalid_config = Config::default();
        invalid_config.inter_job_delay_ms = 120_000;
        assert!(manager.validate_config(&invalid_config).is_err());
    }

    #[test]
    fn test_page_range_size_is_capped() {
        let manager = FileConfigManager::new(PathBuf::from("test.toml"));

        let mut config = Config::default();
        config.page_ranges.xici = PageRange::new(1, MAX_PAGES_PER_SITE);
        assert!(manager.validate_config(&config).is_ok());

        config.page_ranges.xici = PageRange::new(1, MAX_PAGES_PER_SITE + 1);
        assert!(manager.validate_config(&config).is_err());

        config.page_ranges.xici = PageRange::new(1, 4_000_000_000);
        let err = manager.validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("xici page range spans more than"));
    }

    #[test]
    fn test_navigation_timeout() {
        let mut config = Config::default();
        assert_eq!(config.navigation_timeout(), Some(Duration::from_secs(30)));
        config.navigation_timeout_ms = 0;
        assert_eq!(config.navigation_timeout(), None);
    }
}
