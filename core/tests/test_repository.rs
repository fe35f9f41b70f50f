// Repositoryet ende-til-ende: oppslag, datofiltrering, årssammendrag,
// moving-fallback og streams mot en ekte datakatalog.

use std::io::Write;
use std::path::{Path, PathBuf};

use activities_core::repository::CsvActivityRepository;
use activities_core::telemetry::{cache_hit_total, cache_miss_total, Metrics};

const HEADER: &str = "id;name;type;sport_type;start_date;start_date_local;distance;moving_time;elapsed_time;total_elevation_gain;average_watts;normalized_power;training_stress_score;power_tid_classification";

fn skriv_csv(path: &Path, rader: &[&str]) {
    let mut f = std::fs::File::create(path).unwrap();
    writeln!(f, "{HEADER}").unwrap();
    for r in rader {
        writeln!(f, "{r}").unwrap();
    }
}

fn standard_rader() -> Vec<&'static str> {
    vec![
        "1;Januar-tur;Ride;Ride;2025-01-10T09:00:00Z;2025-01-10T10:00:00;20000.0;3600.0;3700.0;100.0;190.0;200.0;80.0;",
        "2;Mai-tur;Ride;Ride;2026-05-01T06:00:00Z;2026-05-01T08:00:00;45000.0;7200.0;7500.0;350.0;180.0;195.0;120.0;",
        "3;Juni-intervaller;Ride;Ride;2026-06-15T06:00:00Z;2026-06-15T08:00:00;30000.0;3600.0;3700.0;200.0;240.0;265.0;95.0;",
    ]
}

fn repo_i(dir: &tempfile::TempDir) -> CsvActivityRepository {
    let raw = dir.path().join("activities_raw.csv");
    skriv_csv(&raw, &standard_rader());
    CsvActivityRepository::new(
        raw,
        dir.path().join("activities_moving.csv"),
        dir.path().join("Streams"),
        Metrics::new(),
    )
}

#[test]
fn oppslag_på_id() {
    let dir = tempfile::tempdir().unwrap();
    let repo = repo_i(&dir);

    let funnet = repo.get_activity(2).unwrap().expect("id 2 finnes");
    assert_eq!(funnet.name, "Mai-tur");
    assert!(repo.get_activity(999).unwrap().is_none());
}

#[test]
fn datofilter_er_inklusivt_med_åpne_ender() {
    let dir = tempfile::tempdir().unwrap();
    let repo = repo_i(&dir);

    let mai = repo
        .activities_between(Some("2026-05-01".parse().unwrap()), Some("2026-05-31".parse().unwrap()))
        .unwrap();
    assert_eq!(mai.len(), 1);
    assert_eq!(mai[0].id, 2);

    // Åpen start: alt til og med juni 2026
    let til_juni = repo
        .activities_between(None, Some("2026-06-30".parse().unwrap()))
        .unwrap();
    assert_eq!(til_juni.len(), 3);

    // Åpen slutt: fra 2026
    let fra_2026 = repo
        .activities_between(Some("2026-01-01".parse().unwrap()), None)
        .unwrap();
    assert_eq!(fra_2026.len(), 2);
}

#[test]
fn årssammendrag_og_tilgjengelige_år() {
    let dir = tempfile::tempdir().unwrap();
    let repo = repo_i(&dir);

    let s2026 = repo.year_summary(2026).unwrap();
    assert_eq!(s2026.activity_count, 2);
    assert_eq!(s2026.total_distance, 75000.0);
    assert_eq!(s2026.total_tss, Some(215.0));
    assert_eq!(s2026.avg_power, Some(230.0)); // snitt av NP 195 og 265

    let tomt = repo.year_summary(2019).unwrap();
    assert_eq!(tomt.activity_count, 0);
    assert_eq!(tomt.total_tss, None);

    assert_eq!(repo.available_years().unwrap(), vec![2026, 2025]);
}

#[test]
fn moving_faller_tilbake_til_raw() {
    let dir = tempfile::tempdir().unwrap();
    let repo = repo_i(&dir);

    // Ingen moving-fil skrevet: samme datasett for begge visninger
    let raw = repo.activities_raw().unwrap();
    let moving = repo.activities_moving().unwrap();
    assert_eq!(raw.len(), moving.len());
    assert_eq!(raw[0].id, moving[0].id);
}

#[test]
fn moving_brukes_når_filen_finnes() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("activities_raw.csv");
    let moving = dir.path().join("activities_moving.csv");
    skriv_csv(&raw, &standard_rader());
    skriv_csv(
        &moving,
        &["2;Mai-tur;Ride;Ride;2026-05-01T06:00:00Z;2026-05-01T08:00:00;44000.0;7000.0;7500.0;350.0;185.0;198.0;118.0;"],
    );

    let repo = CsvActivityRepository::new(
        raw,
        moving,
        dir.path().join("Streams"),
        Metrics::new(),
    );

    assert_eq!(repo.activities_raw().unwrap().len(), 3);
    let m = repo.activities_moving().unwrap();
    assert_eq!(m.len(), 1);
    assert_eq!(m[0].moving_time, 7000.0);
    assert_eq!(
        repo.get_activity_moving(2).unwrap().unwrap().average_watts,
        Some(185.0)
    );
}

#[test]
fn gjentatte_lesinger_treffer_cachen() {
    let dir = tempfile::tempdir().unwrap();
    let repo = repo_i(&dir);

    repo.activities_raw().unwrap();
    repo.activities_raw().unwrap();
    repo.activities_raw().unwrap();

    assert_eq!(cache_miss_total(repo.metrics()).get(), 1);
    assert_eq!(cache_hit_total(repo.metrics()).get(), 2);

    repo.invalidate();
    repo.activities_raw().unwrap();
    assert_eq!(cache_miss_total(repo.metrics()).get(), 2);
}

#[test]
fn stream_lastes_per_aktivitet() {
    let dir = tempfile::tempdir().unwrap();
    let streams: PathBuf = dir.path().join("Streams");
    std::fs::create_dir(&streams).unwrap();
    std::fs::write(
        streams.join("stream_2.csv"),
        "time;watts;moving\n0;180.0;True\n1;182.0;True\n",
    )
    .unwrap();

    let repo = repo_i(&dir);
    let stream = repo.activity_stream(2).unwrap();
    assert_eq!(stream.len(), 2);

    // Ukjent id gir tom strøm, ikke feil
    assert!(repo.activity_stream(999).unwrap().is_empty());
}
