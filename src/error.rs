use thiserror::Error;

/// Failures that stop a row or the whole run, as opposed to per-film
/// detail lookups which fall back to defaults.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("could not find the main table with film data at {url}")]
    TableNotFound { url: String },

    #[error("row {row}: title anchor has no text")]
    MissingTitle { row: usize },
}
