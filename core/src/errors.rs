use std::path::PathBuf;
use thiserror::Error;

/// Felles feiltype for kjernen.
///
/// `DataNotFound` er fatal (konfigurert fil mangler helt); enkeltverdier som
/// ikke lar seg parse håndteres lokalt i `coerce` og blir aldri en feil her.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("datafil ikke funnet: {path}")]
    DataNotFound { path: PathBuf },

    #[error("CSV-feil i {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("JSON-feil ved {path}: {detail}")]
    Json { path: String, detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("ugyldig mål: {0}")]
    InvalidGoal(String),

    #[error("ugyldige innstillinger: {0}")]
    Settings(String),
}

impl ViewerError {
    /// Bygg en `Json`-feil fra serde_path_to_error, med feltsti i meldingen.
    pub fn json_at<E: std::fmt::Display>(err: serde_path_to_error::Error<E>) -> Self {
        ViewerError::Json {
            path: err.path().to_string(),
            detail: err.inner().to_string(),
        }
    }
}
