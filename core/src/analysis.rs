//! Aggregeringstjenesten: tilstandsløse funksjoner over `&[Activity]`.
//!
//! Aggregeringspolicyen er fast, ikke konfigurerbar:
//! - belastning (TSS, distanse, høyde, tid) summeres
//! - intensitet (IF, NP, snittwatt) tidsvektes med moving_time
//! - fysiologi (EF, decoupling) snittes kun over rolige steady-økter
//! - effektkurven tar maks per varighet over hele intervallet
//!
//! Tomt intervall gir nullede aggregater, aldri feil.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::metrics::{max_value, mean, time_weighted_mean};
use crate::models::{Activity, POWER_CURVE_DURATIONS};

/// Sum-aggregerte belastningsmetrikker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadSummary {
    pub total_tss: f64,
    pub total_hours: f64,
    pub total_kj: f64,
    pub total_distance_km: f64,
    pub total_elevation_m: f64,
    pub activity_count: usize,
    pub avg_tss_per_activity: f64,
    pub avg_hours_per_activity: f64,
}

/// Tidsvektede intensitetsmetrikker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntensitySummary {
    pub avg_intensity_factor: f64,
    pub avg_normalized_power: f64,
    pub avg_power: f64,
}

/// Treningsintensitetsfordeling, renormalisert til prosent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TidSummary {
    pub z1_percentage: f64,
    pub z2_percentage: f64,
    pub z3_percentage: f64,
}

/// Fysiologi-snitt over filtrerte steady-økter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhysiologySummary {
    pub avg_efficiency_factor: f64,
    pub avg_decoupling: f64,
    pub filtered_activity_count: usize,
}

/// Beste effekt for én varighetsbøtte. 0.0 når ingen data finnes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerBest {
    pub duration: String,
    pub seconds: u32,
    pub watts: f64,
}

/// Samlet periodeanalyse – kontrakten mot presentasjonslaget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodReport {
    pub load: LoadSummary,
    pub intensity: IntensitySummary,
    pub tid: TidSummary,
    pub physiology: PhysiologySummary,
    pub power_curve: Vec<PowerBest>,
}

/// Ett punkt i Performance Management Chart-serien.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PmcPoint {
    pub date: NaiveDateTime,
    pub ctl: f64,
    pub atl: f64,
    pub tsb: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyPoint {
    pub date: NaiveDateTime,
    pub efficiency_factor: f64,
    pub decoupling: Option<f64>,
    pub cardiac_drift: Option<f64>,
}

/// Restitusjonsmetrikker over et sammenhengende dagspenn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecoveryMetrics {
    pub monotony_index: f64,
    pub strain_index: f64,
    pub rest_days: usize,
    pub weekly_tss: f64,
    pub daily_tss_values: Vec<f64>,
    pub avg_daily_tss: f64,
    pub max_daily_tss: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseClassification {
    pub phase: String,
    pub confidence: f64,
    pub volume_trend: f64,
    pub intensity_trend: f64,
    pub description: String,
    pub current_volume_hours: f64,
    pub current_avg_if: f64,
    pub previous_volume_hours: Option<f64>,
    pub previous_avg_if: Option<f64>,
}

/// Belastning: ren summering. TSS/kJ med manglende verdi teller som 0.
pub fn aggregate_load(activities: &[Activity]) -> LoadSummary {
    if activities.is_empty() {
        return LoadSummary::default();
    }

    let total_tss: f64 = activities
        .iter()
        .filter_map(|a| a.training_stress_score)
        .sum();
    let total_moving: f64 = activities.iter().map(|a| a.moving_time).sum();
    let total_kj: f64 = activities.iter().filter_map(|a| a.kilojoules).sum();
    let total_distance: f64 = activities.iter().map(|a| a.distance).sum();
    let total_elevation: f64 = activities.iter().map(|a| a.total_elevation_gain).sum();
    let n = activities.len();

    LoadSummary {
        total_tss,
        total_hours: total_moving / 3600.0,
        total_kj,
        total_distance_km: total_distance / 1000.0,
        total_elevation_m: total_elevation,
        activity_count: n,
        avg_tss_per_activity: total_tss / n as f64,
        avg_hours_per_activity: (total_moving / 3600.0) / n as f64,
    }
}

/// Intensitet: tidsvektet snitt med moving_time som vekt.
pub fn aggregate_intensity(activities: &[Activity]) -> IntensitySummary {
    let weight = |a: &Activity| {
        if a.moving_time > 0.0 {
            Some(a.moving_time)
        } else {
            None
        }
    };

    IntensitySummary {
        avg_intensity_factor: time_weighted_mean(
            activities.iter().map(|a| (a.intensity_factor, weight(a))),
        ),
        avg_normalized_power: time_weighted_mean(
            activities.iter().map(|a| (a.normalized_power, weight(a))),
        ),
        avg_power: time_weighted_mean(
            activities.iter().map(|a| (a.average_watts, weight(a))),
        ),
    }
}

/// TID: sonetider summeres på tvers av øktene og renormaliseres.
/// Kun rader med alle tre soner og moving_time deltar.
pub fn aggregate_tid(activities: &[Activity]) -> TidSummary {
    let mut z1_time = 0.0;
    let mut z2_time = 0.0;
    let mut z3_time = 0.0;

    for a in activities {
        if let (Some(z1), Some(z2), Some(z3)) = (
            a.power_tid_z1_percentage,
            a.power_tid_z2_percentage,
            a.power_tid_z3_percentage,
        ) {
            if a.moving_time > 0.0 {
                z1_time += z1 * a.moving_time / 100.0;
                z2_time += z2 * a.moving_time / 100.0;
                z3_time += z3 * a.moving_time / 100.0;
            }
        }
    }

    let total = z1_time + z2_time + z3_time;
    if total <= 0.0 {
        return TidSummary::default();
    }
    TidSummary {
        z1_percentage: z1_time / total * 100.0,
        z2_percentage: z2_time / total * 100.0,
        z3_percentage: z3_time / total * 100.0,
    }
}

/// Steady-state-filteret for EF-trender: rolig (IF < 0.75), ikke ritt,
/// og med både EF og decoupling til stede.
fn is_steady_state(a: &Activity) -> bool {
    a.intensity_factor.map_or(false, |ifv| ifv < 0.75)
        && a.workout_type.map_or(true, |w| w != 10.0)
        && a.efficiency_factor.is_some()
        && a.power_hr_decoupling.is_some()
}

/// Fysiologi: enkelt snitt, men kun over steady-økter. Trender i EF
/// er meningsløse hvis intervalløkter og ritt blandes inn.
pub fn aggregate_physiology(activities: &[Activity]) -> PhysiologySummary {
    let steady: Vec<&Activity> = activities.iter().filter(|a| is_steady_state(a)).collect();
    if steady.is_empty() {
        return PhysiologySummary::default();
    }

    PhysiologySummary {
        avg_efficiency_factor: mean(steady.iter().map(|a| a.efficiency_factor)).unwrap_or(0.0),
        avg_decoupling: mean(steady.iter().map(|a| a.power_hr_decoupling)).unwrap_or(0.0),
        filtered_activity_count: steady.len(),
    }
}

/// Effektkurve: maks per varighetsbøtte over hele intervallet (maks av maks).
pub fn power_curve_max(activities: &[Activity]) -> Vec<PowerBest> {
    POWER_CURVE_DURATIONS
        .iter()
        .enumerate()
        .map(|(i, &(label, seconds))| PowerBest {
            duration: label.to_string(),
            seconds,
            watts: max_value(activities.iter().map(|a| a.power_curve()[i])).unwrap_or(0.0),
        })
        .collect()
}

/// Full periodeanalyse – alle aggregatene samlet.
pub fn analyze_period(activities: &[Activity]) -> PeriodReport {
    PeriodReport {
        load: aggregate_load(activities),
        intensity: aggregate_intensity(activities),
        tid: aggregate_tid(activities),
        physiology: aggregate_physiology(activities),
        power_curve: power_curve_max(activities),
    }
}

/// PMC-serie (CTL/ATL/TSB) sortert stigende på dato. Rader der noen av de
/// tre mangler hoppes over.
pub fn pmc_series(activities: &[Activity]) -> Vec<PmcPoint> {
    let mut points: Vec<PmcPoint> = activities
        .iter()
        .filter_map(|a| {
            match (
                a.chronic_training_load,
                a.acute_training_load,
                a.training_stress_balance,
            ) {
                (Some(ctl), Some(atl), Some(tsb)) => Some(PmcPoint {
                    date: a.start_date_local,
                    ctl,
                    atl,
                    tsb,
                }),
                _ => None,
            }
        })
        .collect();
    points.sort_by_key(|p| p.date);
    points
}

/// EF/decoupling-tidsserie. Med `filter_steady_state` brukes samme filter
/// som [`aggregate_physiology`] pluss EF > 0; ellers bare EF > 0.
pub fn efficiency_series(activities: &[Activity], filter_steady_state: bool) -> Vec<EfficiencyPoint> {
    let mut points: Vec<EfficiencyPoint> = activities
        .iter()
        .filter(|a| {
            let ef_positive = a.efficiency_factor.map_or(false, |ef| ef > 0.0);
            if filter_steady_state {
                ef_positive && is_steady_state(a)
            } else {
                ef_positive
            }
        })
        .filter_map(|a| {
            // Decoupling kan mangle i ufiltrert modus; raden beholdes
            Some(EfficiencyPoint {
                date: a.start_date_local,
                efficiency_factor: a.efficiency_factor?,
                decoupling: a.power_hr_decoupling,
                cardiac_drift: a.cardiac_drift,
            })
        })
        .collect();
    points.sort_by_key(|p| p.date);
    points
}

/// Restitusjonsmetrikker: daglig TSS over hele dagspennet (hull nullfylles),
/// monotoni = snitt/std (populasjonsstd), strain = total TSS × monotoni,
/// hviledager = dager med TSS < 20.
pub fn recovery_metrics(activities: &[Activity]) -> RecoveryMetrics {
    if activities.is_empty() {
        return RecoveryMetrics::default();
    }

    let mut per_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for a in activities {
        *per_day.entry(a.local_date()).or_insert(0.0) +=
            a.training_stress_score.unwrap_or(0.0);
    }

    // BTreeMap er sortert, så første/siste nøkkel gir dagspennet
    let first = *per_day.keys().next().unwrap();
    let last = *per_day.keys().next_back().unwrap();

    let mut daily = Vec::new();
    let mut day = first;
    while day <= last {
        daily.push(per_day.get(&day).copied().unwrap_or(0.0));
        day += Duration::days(1);
    }

    let n = daily.len() as f64;
    let total: f64 = daily.iter().sum();
    let avg = total / n;
    let variance = daily.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();

    let monotony = if daily.len() > 1 && std > 0.0 {
        avg / std
    } else {
        0.0
    };

    RecoveryMetrics {
        monotony_index: monotony,
        strain_index: total * monotony,
        rest_days: daily.iter().filter(|&&v| v < 20.0).count(),
        weekly_tss: total,
        avg_daily_tss: avg,
        max_daily_tss: daily.iter().copied().fold(0.0, f64::max),
        daily_tss_values: daily,
    }
}

/// Klassifiser treningsfase ut fra volum- og intensitetstrend mot forrige
/// periode. Uten forrige periode brukes absolutte terskler.
pub fn classify_training_phase(
    current: &[Activity],
    previous: Option<&[Activity]>,
) -> PhaseClassification {
    if current.is_empty() {
        return PhaseClassification {
            phase: "Unknown".into(),
            confidence: 0.0,
            volume_trend: 0.0,
            intensity_trend: 0.0,
            description: "No data available".into(),
            current_volume_hours: 0.0,
            current_avg_if: 0.0,
            previous_volume_hours: None,
            previous_avg_if: None,
        };
    }

    let current_volume = aggregate_load(current).total_hours;
    let current_if = aggregate_intensity(current).avg_intensity_factor;

    let previous = previous.filter(|p| !p.is_empty());
    let Some(prev) = previous else {
        let (phase, confidence, description) = if current_if > 0.80 {
            ("Build/Peak", 0.6, "High intensity training detected".to_string())
        } else if current_volume > 10.0 {
            ("Base Building", 0.6, "High volume training detected".to_string())
        } else if current_volume < 5.0 {
            ("Recovery/Transition", 0.6, "Low volume period".to_string())
        } else {
            ("General Training", 0.5, "Moderate volume and intensity".to_string())
        };
        return PhaseClassification {
            phase: phase.into(),
            confidence,
            volume_trend: 0.0,
            intensity_trend: 0.0,
            description,
            current_volume_hours: current_volume,
            current_avg_if: current_if,
            previous_volume_hours: None,
            previous_avg_if: None,
        };
    };

    let prev_volume = aggregate_load(prev).total_hours;
    let prev_if = aggregate_intensity(prev).avg_intensity_factor;

    let volume_trend = if prev_volume > 0.0 {
        (current_volume - prev_volume) / prev_volume * 100.0
    } else {
        0.0
    };
    let intensity_trend = if prev_if > 0.0 {
        (current_if - prev_if) / prev_if * 100.0
    } else {
        0.0
    };

    let (phase, confidence, description) = if volume_trend > 10.0 && intensity_trend.abs() < 10.0 {
        (
            "Base Building",
            0.8,
            format!("Volume up {volume_trend:.0}%, intensity stable"),
        )
    } else if volume_trend > 10.0 && intensity_trend > 10.0 {
        (
            "Overload (Risky)",
            0.9,
            format!(
                "⚠️ Both volume (+{volume_trend:.0}%) and intensity (+{intensity_trend:.0}%) increasing"
            ),
        )
    } else if volume_trend.abs() < 10.0 && intensity_trend > 10.0 {
        (
            "Build/Intensification",
            0.8,
            format!("Volume stable, intensity up {intensity_trend:.0}%"),
        )
    } else if volume_trend < -20.0 {
        (
            "Taper/Recovery",
            0.9,
            format!("Volume down {:.0}%", volume_trend.abs()),
        )
    } else if current_if > 0.85 && current_volume > 8.0 {
        (
            "Peak/Race Prep",
            0.7,
            "High intensity and volume maintained".to_string(),
        )
    } else if current_volume < 5.0 && current_if < 0.70 {
        (
            "Transition/Off-Season",
            0.8,
            "Low volume and intensity".to_string(),
        )
    } else {
        ("Maintenance", 0.6, "Stable training load".to_string())
    };

    PhaseClassification {
        phase: phase.into(),
        confidence,
        volume_trend,
        intensity_trend,
        description,
        current_volume_hours: current_volume,
        current_avg_if: current_if,
        previous_volume_hours: Some(prev_volume),
        previous_avg_if: Some(prev_if),
    }
}
