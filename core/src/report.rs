//! JSON-grenseflaten mot presentasjonslaget: tar imot JSON-strenger,
//! returnerer JSON-strenger. All parsing går gjennom serde_path_to_error
//! slik at feilmeldinger peker på feltet som røk.

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde::Serialize;

use crate::analysis;
use crate::config::Settings;
use crate::errors::ViewerError;
use crate::fitness;
use crate::goals;
use crate::models::Activity;

/// Datointervall fra presentasjonslaget. Åpne ender er tillatt.
#[derive(Debug, Default, Deserialize)]
struct RangeIn {
    #[serde(default)]
    start: Option<NaiveDate>,
    #[serde(default)]
    end: Option<NaiveDate>,
}

fn parse_json<'a, T: Deserialize<'a>>(json: &'a str) -> Result<T, ViewerError> {
    let mut de = serde_json::Deserializer::from_str(json);
    serde_path_to_error::deserialize(&mut de).map_err(ViewerError::json_at)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ViewerError> {
    serde_json::to_string(value).map_err(|e| ViewerError::Json {
        path: "$".into(),
        detail: e.to_string(),
    })
}

/// Periodeanalyse over et datointervall, JSON inn og JSON ut.
pub fn period_report_json(activities_json: &str, range_json: &str) -> Result<String, ViewerError> {
    let activities: Vec<Activity> = parse_json(activities_json)?;
    let range: RangeIn = parse_json(range_json)?;

    let in_range: Vec<Activity> = activities
        .into_iter()
        .filter(|a| {
            let d = a.local_date();
            range.start.map_or(true, |s| d >= s) && range.end.map_or(true, |e| d <= e)
        })
        .collect();

    to_json(&analysis::analyze_period(&in_range))
}

/// Målrapport. FTP-en hentes fra historikken (rullerende estimat) med
/// konfigurert FTP som fallback. `as_of` lar kalleren fryse "i dag";
/// uten den brukes dagens dato.
pub fn goal_report_json(
    settings_json: &str,
    activities_json: &str,
    as_of: Option<NaiveDate>,
) -> Result<String, ViewerError> {
    let settings = Settings::from_json_str(settings_json)?;
    let activities: Vec<Activity> = parse_json(activities_json)?;

    let goal = settings.goal()?.ok_or_else(|| {
        ViewerError::InvalidGoal("ingen mål konfigurert (target_wkg/target_date mangler)".into())
    })?;

    let today = as_of.unwrap_or_else(|| Utc::now().date_naive());
    let current_ftp = fitness::current_ftp(&activities, settings.ftp);
    let report = goals::goal_report(current_ftp, settings.weight_kg, &goal, today)?;

    to_json(&report)
}
