//! Måltjenesten: fremdrift og statusklassifisering mot et W/kg-mål.
//!
//! Alle funksjoner er rene: "i dag" sendes inn av kalleren, så samme input
//! gir alltid samme svar.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::ViewerError;
use crate::models::Goal;

/// Standard toleranse (±10 % av planlagt total fremgang) for on-track-vurderingen.
pub const DEFAULT_TOLERANCE_PCT: f64 = 10.0;

/// Ordnede statusbøtter: fra foran skjema til mål-i-fare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Ahead,
    OnTrack,
    Behind,
    Critical,
}

impl GoalStatus {
    pub fn label(&self) -> &'static str {
        match self {
            GoalStatus::Ahead => "Ahead",
            GoalStatus::OnTrack => "On Track",
            GoalStatus::Behind => "Behind",
            GoalStatus::Critical => "Critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub current_wkg: f64,
    pub target_wkg: f64,
    pub progress_percentage: f64,
    pub wkg_remaining: f64,
    pub days_remaining: i64,
    pub weeks_remaining: f64,
}

/// Samlerapport for presentasjonslaget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalReport {
    #[serde(flatten)]
    pub progress: GoalProgress,
    pub status: GoalStatus,
    pub status_label: String,
    pub required_weekly_gain: f64,
    pub expected_wkg_now: f64,
    pub ahead_behind_wkg: f64,
    pub on_pace: bool,
}

fn current_wkg(current_ftp: f64, weight_kg: f64) -> Result<f64, ViewerError> {
    if weight_kg <= 0.0 {
        return Err(ViewerError::InvalidGoal(format!(
            "weight_kg må være positiv, var {weight_kg}"
        )));
    }
    Ok(current_ftp / weight_kg)
}

/// Fremdrift mot målet. Prosenten kan overstige 100 når man er foran.
pub fn progress(
    current_ftp: f64,
    weight_kg: f64,
    goal: &Goal,
    today: NaiveDate,
) -> Result<GoalProgress, ViewerError> {
    let wkg = current_wkg(current_ftp, weight_kg)?;
    let total_improvement = goal.wkg_improvement_needed();
    let achieved = wkg - goal.start_wkg;

    let progress_percentage = if total_improvement > 0.0 {
        achieved / total_improvement * 100.0
    } else {
        0.0
    };

    Ok(GoalProgress {
        current_wkg: wkg,
        target_wkg: goal.target_wkg,
        progress_percentage,
        wkg_remaining: goal.target_wkg - wkg,
        days_remaining: goal.days_remaining(today),
        weeks_remaining: goal.weeks_remaining(today),
    })
}

/// Klassifiser status mot den lineære forventningskurven fra start til mål.
///
/// Avviket måles i prosent av total planlagt fremgang:
/// over +toleranse → Ahead, ned til −toleranse → OnTrack,
/// ned til −2·toleranse → Behind, ellers Critical.
/// Ugyldig tidslinje (mål på/før start) → Critical.
pub fn status(
    current_ftp: f64,
    weight_kg: f64,
    goal: &Goal,
    today: NaiveDate,
    tolerance_pct: f64,
) -> Result<GoalStatus, ViewerError> {
    let wkg = current_wkg(current_ftp, weight_kg)?;

    let total_days = (goal.target_date - goal.start_date).num_days();
    if total_days <= 0 {
        return Ok(GoalStatus::Critical);
    }
    let elapsed_days = (today - goal.start_date).num_days();

    let time_progress = elapsed_days as f64 / total_days as f64;
    let total_improvement = goal.wkg_improvement_needed();
    let expected_wkg = goal.start_wkg + total_improvement * time_progress;

    let deviation_pct = if total_improvement > 0.0 {
        (wkg - expected_wkg) / total_improvement * 100.0
    } else {
        0.0
    };

    Ok(if deviation_pct > tolerance_pct {
        GoalStatus::Ahead
    } else if deviation_pct >= -tolerance_pct {
        GoalStatus::OnTrack
    } else if deviation_pct >= -(tolerance_pct * 2.0) {
        GoalStatus::Behind
    } else {
        GoalStatus::Critical
    })
}

/// Forventet W/kg på en gitt dato, lineært interpolert og klemt til [start, mål].
pub fn expected_wkg_at(goal: &Goal, date: NaiveDate) -> f64 {
    let total_days = (goal.target_date - goal.start_date).num_days();
    if total_days <= 0 {
        return goal.start_wkg;
    }
    let elapsed = (date - goal.start_date).num_days();
    let time_progress = (elapsed as f64 / total_days as f64).clamp(0.0, 1.0);
    goal.start_wkg + goal.wkg_improvement_needed() * time_progress
}

/// Nødvendig W/kg-økning per uke for å nå målet i tide, fra dagens nivå.
/// 0.0 når fristen er ute.
pub fn required_ramp_rate(goal: &Goal, current_wkg: f64, today: NaiveDate) -> f64 {
    let weeks = goal.weeks_remaining(today);
    if weeks <= 0.0 {
        0.0
    } else {
        (goal.target_wkg - current_wkg) / weeks
    }
}

/// Full målrapport: fremdrift + status + tempo-krav.
pub fn goal_report(
    current_ftp: f64,
    weight_kg: f64,
    goal: &Goal,
    today: NaiveDate,
) -> Result<GoalReport, ViewerError> {
    let progress = progress(current_ftp, weight_kg, goal, today)?;
    let status = status(current_ftp, weight_kg, goal, today, DEFAULT_TOLERANCE_PCT)?;
    let expected_now = expected_wkg_at(goal, today);

    Ok(GoalReport {
        required_weekly_gain: required_ramp_rate(goal, progress.current_wkg, today),
        expected_wkg_now: expected_now,
        ahead_behind_wkg: progress.current_wkg - expected_now,
        on_pace: matches!(status, GoalStatus::Ahead | GoalStatus::OnTrack),
        status,
        status_label: status.label().to_string(),
        progress,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn six_month_goal() -> Goal {
        // Referansescenario: 285 W @ 77 kg → 3.70 W/kg, mål 4.0 om seks måneder
        Goal::new(285.0 / 77.0, 4.0, d("2026-08-26"), d("2027-02-26")).unwrap()
    }

    #[test]
    fn referansescenario_er_on_track_ved_start() {
        let goal = six_month_goal();
        let st = status(285.0, 77.0, &goal, d("2026-08-26"), DEFAULT_TOLERANCE_PCT).unwrap();
        assert_eq!(st, GoalStatus::OnTrack);
    }

    #[test]
    fn referansescenario_er_reproduserbart() {
        let goal = six_month_goal();
        let today = d("2026-11-26");
        let first = status(285.0, 77.0, &goal, today, DEFAULT_TOLERANCE_PCT).unwrap();
        let second = status(285.0, 77.0, &goal, today, DEFAULT_TOLERANCE_PCT).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn stillstand_halvveis_er_critical() {
        let goal = six_month_goal();
        // Halvveis i tidslinjen uten fremgang: forventet ≈ 3.85, avvik ≈ −50 %
        let st = status(285.0, 77.0, &goal, d("2026-11-26"), DEFAULT_TOLERANCE_PCT).unwrap();
        assert_eq!(st, GoalStatus::Critical);
    }

    #[test]
    fn foran_skjema_er_ahead() {
        let goal = six_month_goal();
        // 3.95 W/kg kort etter start er langt foran den lineære kurven
        let st = status(3.95 * 77.0, 77.0, &goal, d("2026-09-05"), DEFAULT_TOLERANCE_PCT)
            .unwrap();
        assert_eq!(st, GoalStatus::Ahead);
    }

    #[test]
    fn ugyldig_vekt_gir_feil() {
        let goal = six_month_goal();
        assert!(status(285.0, 0.0, &goal, d("2026-08-26"), 10.0).is_err());
        assert!(progress(285.0, -3.0, &goal, d("2026-08-26")).is_err());
    }

    #[test]
    fn forventet_wkg_klemmes_til_tidslinjen() {
        let goal = six_month_goal();
        assert_eq!(expected_wkg_at(&goal, d("2020-01-01")), goal.start_wkg);
        assert_eq!(expected_wkg_at(&goal, d("2030-01-01")), goal.target_wkg);
        let mid = expected_wkg_at(&goal, d("2026-11-26"));
        assert!(mid > goal.start_wkg && mid < goal.target_wkg);
    }

    #[test]
    fn fremdrift_kan_overstige_hundre_prosent() {
        let goal = six_month_goal();
        let p = progress(4.1 * 77.0, 77.0, &goal, d("2027-01-01")).unwrap();
        assert!(p.progress_percentage > 100.0);
        assert!(p.wkg_remaining < 0.0);
    }

    #[test]
    fn utløpt_frist_gir_null_ramp_rate() {
        let goal = six_month_goal();
        assert_eq!(required_ramp_rate(&goal, 3.8, d("2027-03-01")), 0.0);
    }

    #[test]
    fn rapporten_er_konsistent() {
        let goal = six_month_goal();
        let today = d("2026-08-26");
        let report = goal_report(285.0, 77.0, &goal, today).unwrap();
        assert_eq!(report.status, GoalStatus::OnTrack);
        assert!(report.on_pace);
        assert!((report.ahead_behind_wkg).abs() < 1e-9);
        assert_eq!(report.status_label, "On Track");
    }
}
