//! Kjernen i aktivitetsvieweren: CSV-repository med mtime-cache,
//! aggregeringstjeneste, måltjeneste og FTP-estimering.
//!
//! Presentasjonslaget snakker med kjernen enten via de typede tjenestene
//! ([`repository`], [`analysis`], [`goals`], [`fitness`]) eller via
//! JSON-grenseflaten i [`report`].

pub mod analysis;
pub mod cache;
pub mod coerce;
pub mod config;
pub mod errors;
pub mod fitness;
pub mod goals;
pub mod metrics;
pub mod models;
pub mod report;
pub mod repository;
pub mod storage;
pub mod telemetry;

pub use config::Settings;
pub use errors::ViewerError;
pub use models::{Activity, Athlete, Goal, Stream, StreamPoint, Summary, YearSummary};
pub use repository::CsvActivityRepository;
pub use telemetry::Metrics;
