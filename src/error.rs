use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Config directory not found at {0}. Run 'dashboard init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    /// Transport-level failure: DNS, refused connection, timeout.
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response. Display text matches what the dashboard panels show.
    #[error("API {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid month '{0}'. Expected YYYY-MM (e.g., 2026-01)")]
    InvalidMonth(String),

    #[error("Invalid company id '{0}'. Expected an integer")]
    InvalidEntityId(String),

    #[error("Invalid date range: {from} is after {to}")]
    InvalidDateRange { from: String, to: String },

    #[error("No companies selected. Use 'dashboard companies <family>' or --company <id>.")]
    EmptySelection,

    #[error("Unknown dashboard family '{0}'. Use 'retail', 'b2b' or 'branches'.")]
    UnknownFamily(String),

    #[error("Report '{report}' not found for {family}. Use 'dashboard reports {family}' to list them.")]
    UnknownReport { family: String, report: String },

    #[error("Failed to write workbook: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DashboardError {
    /// True for the errors a report fetch can produce.
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            DashboardError::Network(_) | DashboardError::Http { .. } | DashboardError::Decode(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_keeps_status_and_body_text() {
        let err = DashboardError::Http {
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "API 502: bad gateway");
        assert!(err.is_fetch_error());
        assert!(!DashboardError::EmptySelection.is_fetch_error());
    }
}
