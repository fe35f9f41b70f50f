// FTP-estimering fra 20-minuttersdata: punktestimater, rullerende trend
// og fallback til konfigurert verdi.

use activities_core::fitness::{
    current_ftp, ftp_estimates, max_hr_observations, rolling_ftp, weight_trend,
    FTP_ESTIMATE_FACTOR, ROLLING_FTP_WINDOW_DAYS,
};
use activities_core::models::Activity;
use serde_json::json;

fn økt(id: i64, dato: &str, ekstra: serde_json::Value) -> Activity {
    let mut base = json!({
        "id": id,
        "name": format!("Økt {id}"),
        "start_date": format!("{dato}T06:00:00Z"),
        "start_date_local": format!("{dato}T08:00:00"),
        "moving_time": 3600.0
    });
    base.as_object_mut()
        .unwrap()
        .extend(ekstra.as_object().unwrap().clone());
    serde_json::from_value(base).unwrap()
}

#[test]
fn estimat_er_95_prosent_av_beste_20min() {
    let økter = vec![økt(1, "2026-05-01", json!({"power_curve_20min": 300.0}))];
    let est = ftp_estimates(&økter, FTP_ESTIMATE_FACTOR);

    assert_eq!(est.len(), 1);
    assert_eq!(est[0].best_20min, 300.0);
    assert_eq!(est[0].estimated_ftp, 285.0);
}

#[test]
fn økter_uten_20min_data_gir_ingen_estimater() {
    let økter = vec![
        økt(1, "2026-05-01", json!({})),
        økt(2, "2026-05-02", json!({"power_curve_20min": 280.0})),
    ];
    let est = ftp_estimates(&økter, FTP_ESTIMATE_FACTOR);
    assert_eq!(est.len(), 1);
    assert_eq!(est[0].best_20min, 280.0);
}

#[test]
fn estimater_sorteres_nyeste_først() {
    let økter = vec![
        økt(1, "2026-03-01", json!({"power_curve_20min": 290.0})),
        økt(2, "2026-05-01", json!({"power_curve_20min": 300.0})),
    ];
    let est = ftp_estimates(&økter, FTP_ESTIMATE_FACTOR);
    assert_eq!(est[0].best_20min, 300.0);
    assert_eq!(est[1].best_20min, 290.0);
}

#[test]
fn rullerende_ftp_henger_igjen_innenfor_vinduet() {
    // Toppøkt i mars, svakere i april: april-punktet skal fortsatt bære
    // mars-toppen så lenge den er innenfor 42-dagersvinduet
    let økter = vec![
        økt(1, "2026-03-01", json!({"power_curve_20min": 316.0})), // → 300
        økt(2, "2026-04-01", json!({"power_curve_20min": 280.0})), // → 266
    ];
    let est = ftp_estimates(&økter, FTP_ESTIMATE_FACTOR);
    let trend = rolling_ftp(&est, ROLLING_FTP_WINDOW_DAYS);

    assert_eq!(trend.len(), 2);
    assert_eq!(trend[0].rolling_ftp, 300.0);
    assert_eq!(trend[1].rolling_ftp, 300.0); // mars-toppen er 31 dager gammel
}

#[test]
fn gamle_topper_faller_ut_av_vinduet() {
    let økter = vec![
        økt(1, "2026-01-01", json!({"power_curve_20min": 316.0})), // → 300
        økt(2, "2026-06-01", json!({"power_curve_20min": 280.0})), // → 266
    ];
    let est = ftp_estimates(&økter, FTP_ESTIMATE_FACTOR);
    let trend = rolling_ftp(&est, ROLLING_FTP_WINDOW_DAYS);

    // Juni-punktet ser ikke januar-toppen lenger
    assert_eq!(trend[1].rolling_ftp, 266.0);
}

#[test]
fn vinduet_er_venstre_åpent() {
    // Et estimat på nøyaktig 42 dagers alder er utenfor vinduet,
    // 41 dager er innenfor
    let økter = vec![
        økt(1, "2026-01-01", json!({"power_curve_20min": 316.0})), // → 300
        økt(2, "2026-02-11", json!({"power_curve_20min": 280.0})), // 41 dager → 266
        økt(3, "2026-02-12", json!({"power_curve_20min": 280.0})), // 42 dager
    ];
    let est = ftp_estimates(&økter, FTP_ESTIMATE_FACTOR);
    let trend = rolling_ftp(&est, ROLLING_FTP_WINDOW_DAYS);

    assert_eq!(trend.len(), 3);
    assert_eq!(trend[1].rolling_ftp, 300.0); // januar-toppen fortsatt med
    assert_eq!(trend[2].rolling_ftp, 266.0); // falt ut på dag 42
}

#[test]
fn current_ftp_faller_tilbake_uten_historikk() {
    assert_eq!(current_ftp(&[], 285.0), 285.0);

    let økter = vec![økt(1, "2026-05-01", json!({"power_curve_20min": 316.0}))];
    assert_eq!(current_ftp(&økter, 285.0), 300.0);
}

#[test]
fn makspuls_sorteres_synkende_og_foretrekker_beriket_felt() {
    let økter = vec![
        økt(1, "2026-05-01", json!({"max_heartrate": 182.0})),
        økt(2, "2026-05-02", json!({"max_hr": 188.0})),
        økt(3, "2026-05-03", json!({})),
    ];
    let obs = max_hr_observations(&økter);
    assert_eq!(obs.len(), 2);
    assert_eq!(obs[0].max_hr_recorded, 188);
    assert_eq!(obs[1].max_hr_recorded, 182);
}

#[test]
fn vekttrend_sorteres_stigende_på_dato() {
    let økter = vec![
        økt(2, "2026-05-02", json!({"rider_weight_kg": 76.5})),
        økt(1, "2026-05-01", json!({"rider_weight_kg": 77.0})),
        økt(3, "2026-05-03", json!({})),
    ];
    let trend = weight_trend(&økter);
    assert_eq!(trend.len(), 2);
    assert_eq!(trend[0].weight_kg, 77.0);
    assert_eq!(trend[1].weight_kg, 76.5);
}
