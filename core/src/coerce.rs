//! Eksplisitt koerserings-tabell for CSV-kolonner.
//!
//! Oppstrøms-CSV-en kan ha blanke felter, "nan"/"None"-strenger og annet rusk.
//! Policyen er per kolonne: tekst og flagg beholdes som de er, tidsstempler
//! normaliseres, og alt annet parses tolerant til tall. En verdi som ikke lar
//! seg parse blir `None` (eller `0.0` for kjernemetrikkene) – raden beholdes.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use once_cell::sync::Lazy;

/// Semantisk type for en CSV-kolonne.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Aktivitets-id. Uparserbar id gjør raden ukeybar.
    Id,
    /// Beholdes som streng (tom streng → manglende verdi).
    Text,
    /// UTC-tidsstempel, normaliseres til RFC 3339.
    Timestamp,
    /// Lokalt tidsstempel; offset droppes etter parse.
    LocalTimestamp,
    /// Tolerant flyttall, manglende → `None`.
    Float,
    /// Tolerant flyttall, manglende → `0.0` (sum-aggregerte kjernefelter).
    FloatZero,
    /// Boolsk flagg (true/false/1/0).
    Flag,
}

static COLUMN_KINDS: Lazy<HashMap<&'static str, ColumnKind>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("id", ColumnKind::Id);

    m.insert("start_date", ColumnKind::Timestamp);
    m.insert("start_date_local", ColumnKind::LocalTimestamp);

    // Strengkolonner som aldri skal tallkoerseres
    for col in [
        "name",
        "type",
        "sport_type",
        "gear_id",
        "timezone",
        "location_city",
        "location_state",
        "location_country",
        "visibility",
        "device_name",
        "external_id",
        "upload_id_str",
        "start_latlng",
        "end_latlng",
        "map.id",
        "map.summary_polyline",
        "power_tid_classification",
        "hr_tid_classification",
    ] {
        m.insert(col, ColumnKind::Text);
    }

    for col in [
        "trainer",
        "commute",
        "manual",
        "private",
        "flagged",
        "has_kudoed",
        "from_accepted_tag",
        "has_heartrate",
        "heartrate_opt_out",
        "display_hide_heartrate_option",
        "device_watts",
    ] {
        m.insert(col, ColumnKind::Flag);
    }

    // Kjernefelter som aggregeres med sum: 0.0 i stedet for manglende
    for col in [
        "distance",
        "moving_time",
        "elapsed_time",
        "total_elevation_gain",
    ] {
        m.insert(col, ColumnKind::FloatZero);
    }

    m
});

/// Slå opp kolonnetype; ukjente kolonner behandles som tolerante flyttall.
pub fn column_kind(name: &str) -> ColumnKind {
    COLUMN_KINDS
        .get(name)
        .copied()
        .unwrap_or(ColumnKind::Float)
}

fn is_missing(s: &str) -> bool {
    let t = s.trim();
    t.is_empty()
        || t.eq_ignore_ascii_case("nan")
        || t.eq_ignore_ascii_case("none")
        || t.eq_ignore_ascii_case("null")
}

/// Tolerant flyttallsparse. Blank/"nan"/rusk → `None`.
pub fn parse_f64(s: &str) -> Option<f64> {
    if is_missing(s) {
        return None;
    }
    let v: f64 = s.trim().parse().ok()?;
    if v.is_finite() {
        Some(v)
    } else {
        None
    }
}

/// Tolerant heltallsparse; aksepterer også "123.0" fra pandas-eksport.
pub fn parse_i64(s: &str) -> Option<i64> {
    if is_missing(s) {
        return None;
    }
    let t = s.trim();
    if let Ok(v) = t.parse::<i64>() {
        return Some(v);
    }
    let f: f64 = t.parse().ok()?;
    if f.is_finite() && f.fract() == 0.0 {
        Some(f as i64)
    } else {
        None
    }
}

pub fn parse_bool(s: &str) -> Option<bool> {
    if is_missing(s) {
        return None;
    }
    match s.trim() {
        "true" | "True" | "TRUE" | "1" | "1.0" => Some(true),
        "false" | "False" | "FALSE" | "0" | "0.0" => Some(false),
        _ => None,
    }
}

/// UTC-tidsstempel: RFC 3339 eller "YYYY-MM-DD HH:MM:SS"-varianter.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if is_missing(s) {
        return None;
    }
    let t = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(t) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(t, fmt) {
            return Some(naive.and_utc());
        }
    }
    None
}

/// Lokalt tidsstempel: veggklokken beholdes, eventuell offset droppes.
/// All datofiltrering i repoet skjer på lokal dato.
pub fn parse_local_timestamp(s: &str) -> Option<NaiveDateTime> {
    if is_missing(s) {
        return None;
    }
    let t = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(t) {
        return Some(dt.naive_local());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(t, fmt) {
            return Some(naive);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_og_nan_blir_none() {
        for s in ["", "  ", "nan", "NaN", "None", "null"] {
            assert_eq!(parse_f64(s), None, "{s:?}");
        }
    }

    #[test]
    fn tall_parses() {
        assert_eq!(parse_f64("3.14"), Some(3.14));
        assert_eq!(parse_f64(" 42 "), Some(42.0));
        assert_eq!(parse_f64("rusk"), None);
        assert_eq!(parse_f64("inf"), None);
    }

    #[test]
    fn id_aksepterer_pandas_float() {
        assert_eq!(parse_i64("12345"), Some(12345));
        assert_eq!(parse_i64("12345.0"), Some(12345));
        assert_eq!(parse_i64("12345.5"), None);
    }

    #[test]
    fn lokal_tid_dropper_offset() {
        let dt = parse_local_timestamp("2025-06-01T10:00:00+02:00").unwrap();
        assert_eq!(dt.to_string(), "2025-06-01 10:00:00");
    }

    #[test]
    fn utc_tid_normaliseres() {
        let dt = parse_timestamp("2025-06-01T08:00:00Z").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-06-01T08:00:00+00:00");
    }

    #[test]
    fn ukjent_kolonne_er_float() {
        assert_eq!(column_kind("helt_ny_kolonne"), ColumnKind::Float);
        assert_eq!(column_kind("name"), ColumnKind::Text);
        assert_eq!(column_kind("distance"), ColumnKind::FloatZero);
        assert_eq!(column_kind("trainer"), ColumnKind::Flag);
    }
}
