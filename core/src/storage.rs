//! Fil-lastere: semikolonseparert CSV fra StravaAnalyzer pluss summary-JSON.
//!
//! Policy fra koerserings-tabellen i [`crate::coerce`]: enkeltverdier som ikke
//! lar seg parse blir manglende verdier, raden beholdes. Kun rader uten
//! brukbar id eller tidsstempel hoppes over (de kan ikke nøkles).

use std::path::Path;

use log::{info, warn};
use serde_json::{Map as JsonMap, Value};

use crate::coerce::{self, ColumnKind};
use crate::errors::ViewerError;
use crate::models::{Activity, Stream, StreamPoint, Summary};
use crate::telemetry::Metrics;

fn csv_reader(path: &Path) -> Result<csv::Reader<std::fs::File>, ViewerError> {
    csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_path(path)
        .map_err(|source| ViewerError::Csv {
            path: path.to_path_buf(),
            source,
        })
}

/// Les aktivitets-CSV og returnér radene sortert nyeste først
/// (synkende `start_date_local`). Manglende fil er fatal.
pub fn load_activities(path: &Path, metrics: &Metrics) -> Result<Vec<Activity>, ViewerError> {
    if !path.exists() {
        return Err(ViewerError::DataNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut reader = csv_reader(path)?;
    let headers = reader
        .headers()
        .map_err(|source| ViewerError::Csv {
            path: path.to_path_buf(),
            source,
        })?
        .clone();

    let mut activities = Vec::new();
    let mut skipped = 0usize;

    for (row_no, record) in reader.records().enumerate() {
        let record = record.map_err(|source| ViewerError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

        match coerce_row(&headers, &record) {
            Ok(map) => {
                let txt = Value::Object(map).to_string();
                let mut de = serde_json::Deserializer::from_str(&txt);
                match serde_path_to_error::deserialize::<_, Activity>(&mut de) {
                    Ok(activity) => activities.push(activity),
                    Err(e) => {
                        warn!("⚠️ Hopper over rad {}: {} ved {}", row_no + 2, e, e.path());
                        skipped += 1;
                    }
                }
            }
            Err(reason) => {
                warn!("⚠️ Hopper over rad {}: {}", row_no + 2, reason);
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        metrics.rows_skipped_total.inc_by(skipped as u64);
    }

    // Nyeste først, som resten av kjernen forventer
    activities.sort_by(|a, b| b.start_date_local.cmp(&a.start_date_local));

    info!(
        "📂 Lastet {} aktiviteter fra {} ({} rader hoppet over)",
        activities.len(),
        path.display(),
        skipped
    );
    Ok(activities)
}

/// Koersér én CSV-rad til et JSON-objekt etter kolonnetabellen.
/// Feil her betyr at raden ikke kan nøkles (id eller tidsstempel mangler).
fn coerce_row(
    headers: &csv::StringRecord,
    record: &csv::StringRecord,
) -> Result<JsonMap<String, Value>, String> {
    let mut map = JsonMap::new();

    for (name, raw) in headers.iter().zip(record.iter()) {
        match coerce::column_kind(name) {
            ColumnKind::Id => {
                let id = coerce::parse_i64(raw)
                    .ok_or_else(|| format!("uparserbar id {raw:?}"))?;
                map.insert(name.into(), Value::from(id));
            }
            ColumnKind::Timestamp => {
                let ts = coerce::parse_timestamp(raw)
                    .ok_or_else(|| format!("uparserbar {name} {raw:?}"))?;
                map.insert(name.into(), Value::from(ts.to_rfc3339()));
            }
            ColumnKind::LocalTimestamp => {
                let ts = coerce::parse_local_timestamp(raw)
                    .ok_or_else(|| format!("uparserbar {name} {raw:?}"))?;
                map.insert(
                    name.into(),
                    Value::from(ts.format("%Y-%m-%dT%H:%M:%S").to_string()),
                );
            }
            ColumnKind::Text => {
                let t = raw.trim();
                if !t.is_empty() && !t.eq_ignore_ascii_case("nan") {
                    map.insert(name.into(), Value::from(t));
                }
            }
            ColumnKind::Flag => {
                if let Some(b) = coerce::parse_bool(raw) {
                    map.insert(name.into(), Value::from(b));
                }
            }
            ColumnKind::FloatZero => {
                map.insert(
                    name.into(),
                    Value::from(coerce::parse_f64(raw).unwrap_or(0.0)),
                );
            }
            ColumnKind::Float => {
                if let Some(v) = coerce::parse_f64(raw) {
                    map.insert(name.into(), Value::from(v));
                }
            }
        }
    }

    if !map.contains_key("id") {
        return Err("mangler id-kolonne".into());
    }
    if !map.contains_key("start_date") || !map.contains_key("start_date_local") {
        return Err("mangler tidsstempel".into());
    }
    Ok(map)
}

/// Les activity_summary.json som en opak mapping.
pub fn load_summary(path: &Path) -> Result<Summary, ViewerError> {
    if !path.exists() {
        return Err(ViewerError::DataNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path)?;
    let mut de = serde_json::Deserializer::from_str(&contents);
    let summary: Summary =
        serde_path_to_error::deserialize(&mut de).map_err(ViewerError::json_at)?;
    info!("📂 Summary lastet fra {} ({} nøkler)", path.display(), summary.len());
    Ok(summary)
}

/// Les én aktivitetsstrøm (semikolon-CSV). Manglende fil gir tom strøm –
/// matcher oppstrøms-oppførselen med tom dataframe som fallback.
pub fn load_stream(path: &Path) -> Result<Stream, ViewerError> {
    if !path.exists() {
        warn!("⚠️ Streamfil ikke funnet: {}", path.display());
        return Ok(Stream::default());
    }

    let mut reader = csv_reader(path)?;
    let headers = reader
        .headers()
        .map_err(|source| ViewerError::Csv {
            path: path.to_path_buf(),
            source,
        })?
        .clone();

    let mut points = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| ViewerError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

        let mut map = JsonMap::new();
        for (name, raw) in headers.iter().zip(record.iter()) {
            if name == "moving" {
                if let Some(b) = coerce::parse_bool(raw) {
                    map.insert(name.into(), Value::from(b));
                }
            } else if let Some(v) = coerce::parse_f64(raw) {
                map.insert(name.into(), Value::from(v));
            }
        }

        let txt = Value::Object(map).to_string();
        let mut de = serde_json::Deserializer::from_str(&txt);
        let point: StreamPoint =
            serde_path_to_error::deserialize(&mut de).map_err(ViewerError::json_at)?;
        points.push(point);
    }

    Ok(Stream { points })
}
