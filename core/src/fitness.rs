//! Auto-estimering av formparametre fra historikken: FTP fra beste
//! 20-minutters effekt (Coggan-protokollen), makspuls-observasjoner og
//! vekttrend. Mater måltjenesten med "nåværende FTP".

use std::collections::BTreeMap;
use std::ops::Bound;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::Activity;

/// Standard estimeringsfaktor: FTP ≈ 95 % av beste 20-minutterseffekt.
pub const FTP_ESTIMATE_FACTOR: f64 = 0.95;

/// Rullerende vindu for FTP-trenden, i dager (samme som CTL-vinduet).
pub const ROLLING_FTP_WINDOW_DAYS: i64 = 42;

const MAX_HR_OBSERVATIONS: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FtpEstimate {
    pub date: NaiveDateTime,
    pub best_20min: f64,
    pub estimated_ftp: f64,
    pub activity_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingFtpPoint {
    pub date: NaiveDate,
    pub rolling_ftp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaxHrObservation {
    pub date: NaiveDateTime,
    pub max_hr_recorded: i64,
    pub activity_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightPoint {
    pub date: NaiveDateTime,
    pub weight_kg: f64,
}

/// FTP-estimater per økt med 20-minuttersdata, nyeste først.
pub fn ftp_estimates(activities: &[Activity], factor: f64) -> Vec<FtpEstimate> {
    let mut estimates: Vec<FtpEstimate> = activities
        .iter()
        .filter_map(|a| {
            let best = a.power_curve_20min?;
            Some(FtpEstimate {
                date: a.start_date_local,
                best_20min: best,
                estimated_ftp: (best * factor).round(),
                activity_name: a.name.clone(),
            })
        })
        .collect();
    estimates.sort_by(|a, b| b.date.cmp(&a.date));
    estimates
}

/// Rullerende maks av daglige FTP-estimater over vinduet. Ett punkt per dag
/// med data, stigende datoorden – FTP-en "henger igjen" til et bedre estimat
/// faller ut av vinduet.
pub fn rolling_ftp(estimates: &[FtpEstimate], window_days: i64) -> Vec<RollingFtpPoint> {
    if estimates.is_empty() {
        return Vec::new();
    }

    // Daglig maks først, så vindus-maks over dagene
    let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for e in estimates {
        let day = e.date.date();
        let entry = daily.entry(day).or_insert(e.estimated_ftp);
        if e.estimated_ftp > *entry {
            *entry = e.estimated_ftp;
        }
    }

    daily
        .iter()
        .map(|(&day, _)| {
            // Venstre-åpent vindu: et estimat på nøyaktig window_days alder
            // er falt ut
            let window_start = day - Duration::days(window_days);
            let best = daily
                .range((Bound::Excluded(window_start), Bound::Included(day)))
                .map(|(_, &v)| v)
                .fold(f64::MIN, f64::max);
            RollingFtpPoint {
                date: day,
                rolling_ftp: best,
            }
        })
        .collect()
}

/// Høyeste registrerte pulser, synkende, begrenset til de 50 øverste.
pub fn max_hr_observations(activities: &[Activity]) -> Vec<MaxHrObservation> {
    let mut obs: Vec<MaxHrObservation> = activities
        .iter()
        .filter_map(|a| {
            let hr = a.max_hr_recorded()?;
            Some(MaxHrObservation {
                date: a.start_date_local,
                max_hr_recorded: hr.round() as i64,
                activity_name: a.name.clone(),
            })
        })
        .collect();
    obs.sort_by(|a, b| b.max_hr_recorded.cmp(&a.max_hr_recorded));
    obs.truncate(MAX_HR_OBSERVATIONS);
    obs
}

/// Vekttrend fra økter der sykkelcomputeren har stemplet ryttervekt.
pub fn weight_trend(activities: &[Activity]) -> Vec<WeightPoint> {
    let mut points: Vec<WeightPoint> = activities
        .iter()
        .filter_map(|a| {
            Some(WeightPoint {
                date: a.start_date_local,
                weight_kg: a.rider_weight_kg?,
            })
        })
        .collect();
    points.sort_by_key(|p| p.date);
    points
}

/// Nåværende FTP: nyeste punkt i den rullerende trenden, ellers konfigurert
/// fallback-verdi.
pub fn current_ftp(activities: &[Activity], fallback: f64) -> f64 {
    let estimates = ftp_estimates(activities, FTP_ESTIMATE_FACTOR);
    rolling_ftp(&estimates, ROLLING_FTP_WINDOW_DAYS)
        .last()
        .map(|p| p.rolling_ftp)
        .unwrap_or(fallback)
}
