use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::errors::ViewerError;
use crate::models::Goal;

fn default_ftp() -> f64 {
    285.0
}
fn default_weight() -> f64 {
    77.0
}
fn default_max_hr() -> u32 {
    185
}
fn default_raw_file() -> PathBuf {
    PathBuf::from("activities_raw.csv")
}
fn default_moving_file() -> PathBuf {
    PathBuf::from("activities_moving.csv")
}
fn default_summary_file() -> PathBuf {
    PathBuf::from("activity_summary.json")
}
fn default_streams_dir() -> PathBuf {
    PathBuf::from("Streams")
}

/// Ferdig oppløste innstillinger. En ekstern loader (YAML/env) produserer
/// JSON-blobben – kjernen parser aldri YAML eller miljøvariabler selv.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: PathBuf,

    #[serde(default = "default_raw_file")]
    pub activities_raw_file: PathBuf,
    #[serde(default = "default_moving_file")]
    pub activities_moving_file: PathBuf,
    #[serde(default = "default_summary_file")]
    pub activity_summary_file: PathBuf,
    #[serde(default = "default_streams_dir")]
    pub streams_dir: PathBuf,

    // Utøverparametre
    #[serde(default = "default_ftp")]
    pub ftp: f64,
    #[serde(default = "default_weight")]
    pub weight_kg: f64,
    #[serde(default = "default_max_hr")]
    pub max_hr: u32,
    #[serde(default)]
    pub cp: Option<f64>,
    #[serde(default)]
    pub w_prime: Option<f64>,

    // Målsporing (valgfritt)
    #[serde(default)]
    pub target_wkg: Option<f64>,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
    #[serde(default)]
    pub baseline_ftp: Option<f64>,
    #[serde(default)]
    pub baseline_date: Option<NaiveDate>,
}

impl Settings {
    /// Parse den oppløste JSON-blobben fra pipelinen, med feltsti i feilmeldingen.
    pub fn from_json_str(json: &str) -> Result<Self, ViewerError> {
        let mut de = serde_json::Deserializer::from_str(json);
        let settings: Settings =
            serde_path_to_error::deserialize(&mut de).map_err(ViewerError::json_at)?;
        Ok(settings.resolve())
    }

    /// Forankre relative filnavn under `data_dir`. Absolutte stier beholdes.
    pub fn resolve(mut self) -> Self {
        let anchor = |dir: &Path, p: PathBuf| -> PathBuf {
            if p.is_absolute() {
                p
            } else {
                dir.join(p)
            }
        };
        self.activities_raw_file = anchor(&self.data_dir, self.activities_raw_file);
        self.activities_moving_file = anchor(&self.data_dir, self.activities_moving_file);
        self.activity_summary_file = anchor(&self.data_dir, self.activity_summary_file);
        self.streams_dir = anchor(&self.data_dir, self.streams_dir);
        self
    }

    /// Valider at påkrevde filer finnes. Raw-CSV og summary er påkrevd;
    /// moving-fil og streams-katalog er valgfrie (raw brukes som fallback).
    pub fn validate_files(&self) -> Result<(), ViewerError> {
        if !self.activities_raw_file.exists() {
            return Err(ViewerError::DataNotFound {
                path: self.activities_raw_file.clone(),
            });
        }
        if !self.activities_moving_file.exists() {
            warn!(
                "⚠️ Fant ikke moving-fil {} – bruker raw-data for begge visninger",
                self.activities_moving_file.display()
            );
        }
        if !self.activity_summary_file.exists() {
            return Err(ViewerError::DataNotFound {
                path: self.activity_summary_file.clone(),
            });
        }
        if !self.streams_dir.exists() {
            warn!(
                "⚠️ Streams-katalog mangler: {} (valgfri)",
                self.streams_dir.display()
            );
        }
        Ok(())
    }

    pub fn stream_path(&self, activity_id: i64) -> PathBuf {
        self.streams_dir.join(format!("stream_{activity_id}.csv"))
    }

    /// Bygg et `Goal` fra målblokken. `None` når ingen target er satt.
    /// `baseline_ftp` faller tilbake til konfigurert FTP; `baseline_date`
    /// er påkrevd for tidslinjen.
    pub fn goal(&self) -> Result<Option<Goal>, ViewerError> {
        let (target_wkg, target_date) = match (self.target_wkg, self.target_date) {
            (Some(w), Some(d)) => (w, d),
            _ => return Ok(None),
        };
        let baseline_date = self.baseline_date.ok_or_else(|| {
            ViewerError::InvalidGoal(
                "baseline_date kreves når target_wkg/target_date er satt".into(),
            )
        })?;
        if self.weight_kg <= 0.0 {
            return Err(ViewerError::Settings("weight_kg må være positiv".into()));
        }
        let start_wkg = self.baseline_ftp.unwrap_or(self.ftp) / self.weight_kg;
        Goal::new(start_wkg, target_wkg, baseline_date, target_date).map(Some)
    }
}
