use thiserror::Error;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Error, Debug)]
pub enum ScrapingError {
    #[error("Navigation error: {0}")]
    NavigationError(String),

    #[error("Browser error: {0}")]
    BrowserError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Output error: {0}")]
    OutputError(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryStrategy {
    /// Abandon the current job and move on to the next one.
    SkipJob,
    /// Drop the offending row, keep extracting the rest of the page.
    SkipRow,
    /// Nothing sensible left to do; stop before or after the run.
    AbortRun,
}

impl ScrapingError {
    pub fn recovery_strategy(&self) -> RecoveryStrategy {
        match self {
            ScrapingError::NavigationError(_) => RecoveryStrategy::SkipJob,
            ScrapingError::BrowserError(_) => RecoveryStrategy::SkipJob,
            ScrapingError::ParseError(_) => RecoveryStrategy::SkipRow,
            ScrapingError::ConfigError(_) => RecoveryStrategy::AbortRun,
            ScrapingError::OutputError(_) => RecoveryStrategy::AbortRun,
        }
    }
}

// Conversion implementations for common error types
impl From<std::io::Error> for ScrapingError {
    fn from(err: std::io::Error) -> Self {
        ScrapingError::OutputError(err.to_string())
    }
}

impl From<serde_json::Error> for ScrapingError {
    fn from(err: serde_json::Error) -> Self {
        ScrapingError::OutputError(err.to_string())
    }
}

impl From<toml::de::Error> for ScrapingError {
    fn from(err: toml::de::Error) -> Self {
        ScrapingError::ConfigError(err.to_string())
    }
}

impl From<::config::ConfigError> for ScrapingError {
    fn from(err: ::config::ConfigError) -> Self {
        ScrapingError::ConfigError(err.to_string())
    }
}

impl From<chromiumoxide::error::CdpError> for ScrapingError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        ScrapingError::BrowserError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovery_strategy() {
        assert_eq!(
            ScrapingError::NavigationError("timeout".to_string()).recovery_strategy(),
            RecoveryStrategy::SkipJob
        );
        assert_eq!(
            ScrapingError::ParseError("short row".to_string()).recovery_strategy(),
            RecoveryStrategy::SkipRow
        );
        assert_eq!(
            ScrapingError::ConfigError("bad range".to_string()).recovery_strategy(),
            RecoveryStrategy::AbortRun
        );
    }

    #[test]
    fn test_io_error_maps_to_output_error() {
        let err: ScrapingError = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed").into();
        assert!(matches!(err, ScrapingError::OutputError(_)));
        assert!(err.to_string().starts_with("Output error"));
    }
}
