use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ViewerError;

/// Varighetsbøtter i effektkurven, i stigende rekkefølge.
/// Rekkefølgen matcher kolonnene i oppstrøms-CSV-en.
pub const POWER_CURVE_DURATIONS: [(&str, u32); 15] = [
    ("1s", 1),
    ("2s", 2),
    ("5s", 5),
    ("10s", 10),
    ("15s", 15),
    ("20s", 20),
    ("30s", 30),
    ("1min", 60),
    ("2min", 120),
    ("5min", 300),
    ("10min", 600),
    ("15min", 900),
    ("20min", 1200),
    ("30min", 1800),
    ("1hr", 3600),
];

/// Én rad per økt fra StravaAnalyzer-CSV-en. Immutabel etter innlasting –
/// kilden er CSV-en, kjernen skriver aldri tilbake.
///
/// Alle valgfrie metrikker er `Option<f64>`; manglende verdi er `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    // Identitet
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub activity_type: String,
    #[serde(default)]
    pub sport_type: String,
    #[serde(default)]
    pub workout_type: Option<f64>,

    // Tidsstempler
    pub start_date: DateTime<Utc>,
    pub start_date_local: NaiveDateTime,

    // Kjerne: tid/distanse/høyde (0.0 ved manglende verdi, sum-aggregeres)
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub moving_time: f64,
    #[serde(default)]
    pub elapsed_time: f64,
    #[serde(default)]
    pub total_elevation_gain: f64,

    // Fart
    #[serde(default)]
    pub average_speed: Option<f64>,
    #[serde(default)]
    pub max_speed: Option<f64>,

    // Effekt
    #[serde(default)]
    pub average_watts: Option<f64>,
    #[serde(default)]
    pub max_watts: Option<f64>,
    #[serde(default)]
    pub weighted_average_watts: Option<f64>,
    #[serde(default)]
    pub kilojoules: Option<f64>,
    #[serde(default, alias = "np")]
    pub normalized_power: Option<f64>,
    #[serde(default, alias = "if")]
    pub intensity_factor: Option<f64>,
    #[serde(default, alias = "tss")]
    pub training_stress_score: Option<f64>,
    #[serde(default, alias = "vi")]
    pub variability_index: Option<f64>,
    #[serde(default)]
    pub power_per_kg: Option<f64>,
    #[serde(default)]
    pub estimated_ftp: Option<f64>,
    #[serde(default)]
    pub ftp: Option<f64>,

    // Puls (berikede felt pluss Strava-originalene som fallback)
    #[serde(default)]
    pub average_heartrate: Option<f64>,
    #[serde(default)]
    pub max_heartrate: Option<f64>,
    #[serde(default)]
    pub average_hr: Option<f64>,
    #[serde(default)]
    pub max_hr: Option<f64>,
    #[serde(default)]
    pub hr_training_stress: Option<f64>,

    // Effektivitet
    #[serde(default, alias = "ef")]
    pub efficiency_factor: Option<f64>,
    #[serde(default, alias = "decoupling")]
    pub power_hr_decoupling: Option<f64>,
    #[serde(default)]
    pub cardiac_drift: Option<f64>,

    // Treningsbelastning (langsgående, forhåndsberegnet oppstrøms)
    #[serde(default, alias = "ctl")]
    pub chronic_training_load: Option<f64>,
    #[serde(default, alias = "atl")]
    pub acute_training_load: Option<f64>,
    #[serde(default, alias = "tsb")]
    pub training_stress_balance: Option<f64>,
    #[serde(default)]
    pub acwr: Option<f64>,

    // Treningsintensitetsfordeling (3-sonemodell)
    #[serde(default)]
    pub power_tid_z1_percentage: Option<f64>,
    #[serde(default)]
    pub power_tid_z2_percentage: Option<f64>,
    #[serde(default)]
    pub power_tid_z3_percentage: Option<f64>,
    #[serde(default)]
    pub power_polarization_index: Option<f64>,
    #[serde(default)]
    pub power_tdr: Option<f64>,
    #[serde(default)]
    pub power_tid_classification: Option<String>,

    // Effektkurve (toppverdier per varighet)
    #[serde(default)]
    pub power_curve_1sec: Option<f64>,
    #[serde(default)]
    pub power_curve_2sec: Option<f64>,
    #[serde(default)]
    pub power_curve_5sec: Option<f64>,
    #[serde(default)]
    pub power_curve_10sec: Option<f64>,
    #[serde(default)]
    pub power_curve_15sec: Option<f64>,
    #[serde(default)]
    pub power_curve_20sec: Option<f64>,
    #[serde(default)]
    pub power_curve_30sec: Option<f64>,
    #[serde(default)]
    pub power_curve_1min: Option<f64>,
    #[serde(default)]
    pub power_curve_2min: Option<f64>,
    #[serde(default)]
    pub power_curve_5min: Option<f64>,
    #[serde(default)]
    pub power_curve_10min: Option<f64>,
    #[serde(default)]
    pub power_curve_15min: Option<f64>,
    #[serde(default)]
    pub power_curve_20min: Option<f64>,
    #[serde(default)]
    pub power_curve_30min: Option<f64>,
    #[serde(default)]
    pub power_curve_1hr: Option<f64>,

    // Flagg og profil
    #[serde(default)]
    pub trainer: Option<bool>,
    #[serde(default)]
    pub commute: Option<bool>,
    #[serde(default)]
    pub rider_weight_kg: Option<f64>,
}

impl Activity {
    /// Lokal veggdato – all datofiltrering skjer på denne.
    pub fn local_date(&self) -> NaiveDate {
        self.start_date_local.date()
    }

    pub fn distance_km(&self) -> f64 {
        self.distance / 1000.0
    }

    /// "1h 23m"-format av moving_time.
    pub fn duration_hms(&self) -> String {
        let hours = (self.moving_time / 3600.0) as i64;
        let minutes = ((self.moving_time % 3600.0) / 60.0) as i64;
        format!("{}h {}m", hours, minutes)
    }

    /// Beriket snittpuls, faller tilbake til Strava-feltet.
    pub fn avg_hr(&self) -> Option<f64> {
        self.average_hr.or(self.average_heartrate)
    }

    /// Høyeste registrerte puls, beriket felt foretrekkes.
    pub fn max_hr_recorded(&self) -> Option<f64> {
        self.max_heartrate.or(self.max_hr)
    }

    /// Effektkurveverdier i samme rekkefølge som [`POWER_CURVE_DURATIONS`].
    pub fn power_curve(&self) -> [Option<f64>; 15] {
        [
            self.power_curve_1sec,
            self.power_curve_2sec,
            self.power_curve_5sec,
            self.power_curve_10sec,
            self.power_curve_15sec,
            self.power_curve_20sec,
            self.power_curve_30sec,
            self.power_curve_1min,
            self.power_curve_2min,
            self.power_curve_5min,
            self.power_curve_10min,
            self.power_curve_15min,
            self.power_curve_20min,
            self.power_curve_30min,
            self.power_curve_1hr,
        ]
    }
}

/// Aggregert årsstatistikk. Tomt år gir nullverdier, aldri feil.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearSummary {
    pub year: i32,
    pub total_distance: f64,
    pub total_time: f64,
    pub total_elevation: f64,
    pub activity_count: usize,
    pub avg_power: Option<f64>,
    pub total_tss: Option<f64>,
}

impl YearSummary {
    pub fn empty(year: i32) -> Self {
        Self {
            year,
            total_distance: 0.0,
            total_time: 0.0,
            total_elevation: 0.0,
            activity_count: 0,
            avg_power: None,
            total_tss: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Athlete {
    pub ftp: f64,
    pub weight_kg: f64,
    pub max_hr: u32,
}

/// Mål: W/kg-ratio innen en dato. Ren data – "nå" sendes alltid inn utenfra
/// slik at klassifiseringen er deterministisk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub start_wkg: f64,
    pub target_wkg: f64,
    pub start_date: NaiveDate,
    pub target_date: NaiveDate,
}

impl Goal {
    pub fn new(
        start_wkg: f64,
        target_wkg: f64,
        start_date: NaiveDate,
        target_date: NaiveDate,
    ) -> Result<Self, ViewerError> {
        if !(start_wkg > 0.0) {
            return Err(ViewerError::InvalidGoal(format!(
                "start_wkg må være positiv, var {start_wkg}"
            )));
        }
        if target_wkg <= start_wkg {
            return Err(ViewerError::InvalidGoal(format!(
                "target_wkg ({target_wkg}) må være større enn start_wkg ({start_wkg})"
            )));
        }
        if target_date <= start_date {
            return Err(ViewerError::InvalidGoal(format!(
                "target_date ({target_date}) må være etter start_date ({start_date})"
            )));
        }
        Ok(Self {
            start_wkg,
            target_wkg,
            start_date,
            target_date,
        })
    }

    pub fn days_remaining(&self, today: NaiveDate) -> i64 {
        (self.target_date - today).num_days().max(0)
    }

    pub fn weeks_remaining(&self, today: NaiveDate) -> f64 {
        self.days_remaining(today) as f64 / 7.0
    }

    pub fn wkg_improvement_needed(&self) -> f64 {
        self.target_wkg - self.start_wkg
    }

    /// Nødvendig W/kg-økning per uke fra start til mål. 0.0 når fristen er ute.
    pub fn required_weekly_gain(&self, today: NaiveDate) -> f64 {
        let weeks = self.weeks_remaining(today);
        if weeks <= 0.0 {
            0.0
        } else {
            self.wkg_improvement_needed() / weeks
        }
    }
}

/// Forhåndsberegnede totaler fra activity_summary.json, lastet én gang som
/// en opak mapping.
pub type Summary = serde_json::Map<String, serde_json::Value>;

/// Ett punkt i en aktivitetsstrøm (1 Hz-tidsserie fra sidefil).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamPoint {
    #[serde(default)]
    pub time: Option<f64>,
    #[serde(default)]
    pub watts: Option<f64>,
    #[serde(default)]
    pub heartrate: Option<f64>,
    #[serde(default)]
    pub cadence: Option<f64>,
    #[serde(default)]
    pub velocity_smooth: Option<f64>,
    #[serde(default)]
    pub altitude: Option<f64>,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub temp: Option<f64>,
    #[serde(default)]
    pub grade_smooth: Option<f64>,
    #[serde(default)]
    pub moving: Option<bool>,
}

/// Per-aktivitet tidsserie. Lastes lat – kun når detaljvisning ber om den.
/// Manglende fil gir en tom strøm, ikke feil.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stream {
    pub points: Vec<StreamPoint>,
}

impl Stream {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }
}
