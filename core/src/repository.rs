//! CSV-repository for aktiviteter: to filer (raw/moving) med hver sin
//! mtime-cache, pluss lat innlasting av streams.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use log::warn;

use crate::cache::FileCache;
use crate::config::Settings;
use crate::errors::ViewerError;
use crate::metrics as agg;
use crate::models::{Activity, Stream, YearSummary};
use crate::storage;
use crate::telemetry::Metrics;

pub struct CsvActivityRepository {
    raw_path: PathBuf,
    moving_path: PathBuf,
    streams_dir: PathBuf,
    raw_cache: FileCache<Vec<Activity>>,
    moving_cache: FileCache<Vec<Activity>>,
    metrics: Metrics,
}

impl CsvActivityRepository {
    pub fn new(
        raw_path: PathBuf,
        moving_path: PathBuf,
        streams_dir: PathBuf,
        metrics: Metrics,
    ) -> Self {
        Self {
            raw_path,
            moving_path,
            streams_dir,
            raw_cache: FileCache::new(),
            moving_cache: FileCache::new(),
            metrics,
        }
    }

    pub fn from_settings(settings: &Settings, metrics: Metrics) -> Self {
        Self::new(
            settings.activities_raw_file.clone(),
            settings.activities_moving_file.clone(),
            settings.streams_dir.clone(),
            metrics,
        )
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Alle aktiviteter fra raw-datasettet (alle datapunkter), nyeste først.
    pub fn activities_raw(&self) -> Result<Arc<Vec<Activity>>, ViewerError> {
        self.raw_cache.get_or_load(&self.raw_path, &self.metrics, |p| {
            storage::load_activities(p, &self.metrics)
        })
    }

    /// Aktiviteter fra moving-datasettet (kun bevegelse). Mangler filen
    /// brukes raw-dataene for begge visninger.
    pub fn activities_moving(&self) -> Result<Arc<Vec<Activity>>, ViewerError> {
        if !self.moving_path.exists() {
            warn!(
                "⚠️ Moving-fil mangler ({}), faller tilbake til raw",
                self.moving_path.display()
            );
            return self.activities_raw();
        }
        self.moving_cache
            .get_or_load(&self.moving_path, &self.metrics, |p| {
                storage::load_activities(p, &self.metrics)
            })
    }

    pub fn get_activity(&self, activity_id: i64) -> Result<Option<Activity>, ViewerError> {
        let all = self.activities_raw()?;
        Ok(all.iter().find(|a| a.id == activity_id).cloned())
    }

    pub fn get_activity_moving(
        &self,
        activity_id: i64,
    ) -> Result<Option<Activity>, ViewerError> {
        let all = self.activities_moving()?;
        Ok(all.iter().find(|a| a.id == activity_id).cloned())
    }

    /// Aktiviteter i datointervallet (inklusivt, lokal veggdato).
    /// `None` i en ende betyr åpent intervall.
    pub fn activities_between(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Activity>, ViewerError> {
        let all = self.activities_raw()?;
        Ok(all
            .iter()
            .filter(|a| {
                let d = a.local_date();
                start.map_or(true, |s| d >= s) && end.map_or(true, |e| d <= e)
            })
            .cloned()
            .collect())
    }

    /// Årssammendrag. Tomt år gir nullverdier, aldri feil.
    pub fn year_summary(&self, year: i32) -> Result<YearSummary, ViewerError> {
        use chrono::Datelike;

        let all = self.activities_raw()?;
        let in_year: Vec<&Activity> = all
            .iter()
            .filter(|a| a.start_date_local.year() == year)
            .collect();

        if in_year.is_empty() {
            return Ok(YearSummary::empty(year));
        }

        Ok(YearSummary {
            year,
            total_distance: in_year.iter().map(|a| a.distance).sum(),
            total_time: in_year.iter().map(|a| a.moving_time).sum(),
            total_elevation: in_year.iter().map(|a| a.total_elevation_gain).sum(),
            activity_count: in_year.len(),
            avg_power: agg::mean(in_year.iter().map(|a| a.normalized_power)),
            total_tss: Some(agg::sum_or_zero(
                in_year.iter().map(|a| a.training_stress_score),
            )),
        })
    }

    /// Tilgjengelige år i datasettet, nyeste først.
    pub fn available_years(&self) -> Result<Vec<i32>, ViewerError> {
        use chrono::Datelike;

        let all = self.activities_raw()?;
        let mut years: Vec<i32> = all.iter().map(|a| a.start_date_local.year()).collect();
        years.sort_unstable();
        years.dedup();
        years.reverse();
        Ok(years)
    }

    /// Lat per-forespørsel-innlasting av én aktivitetsstrøm. Ingen cache –
    /// detaljvisningen spør sjelden om samme strøm to ganger.
    pub fn activity_stream(&self, activity_id: i64) -> Result<Stream, ViewerError> {
        let path = self.streams_dir.join(format!("stream_{activity_id}.csv"));
        storage::load_stream(&path)
    }

    /// Glem begge cache-oppføringene; neste lesing går til disk.
    pub fn invalidate(&self) {
        self.raw_cache.invalidate();
        self.moving_cache.invalidate();
    }
}
