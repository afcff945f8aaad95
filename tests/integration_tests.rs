use chrono::NaiveDate;
use flate2::Compression;
use flate2::write::GzEncoder;
use rental_price_stats::analyzers::analyzer::{AnalysisOutcome, analyze};
use rental_price_stats::config::{AnalysisConfig, SampleConfig};
use rental_price_stats::error::exit_code_for;
use rental_price_stats::output::{
    DAILY_FILE, LISTING_FILE, NEIGHBOURHOOD_FILE, ROOM_TYPE_FILE, SUMMARY_FILE,
};
use rental_price_stats::scrape::{ListingSource, SampleGenerator, save_harvest};
use rental_price_stats::window::DateWindow;
use std::fs;
use std::io::Write;
use std::path::Path;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn oct_nov_2025() -> DateWindow {
    DateWindow::new(date(2025, 10, 1), date(2025, 11, 30))
}

fn config(data: &Path, out: &Path, window: DateWindow) -> AnalysisConfig {
    AnalysisConfig {
        data_dir: data.to_path_buf(),
        output_dir: out.to_path_buf(),
        window,
        only_booked: false,
    }
}

fn read_rows(path: &Path) -> Vec<csv::StringRecord> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    reader.records().map(|r| r.unwrap()).collect()
}

const THREE_NIGHTS: &str = "listing_id,date,price,available\n\
    L1,2025-10-01,\"R$100,00\",t\n\
    L1,2025-10-02,\"R$200,00\",t\n\
    L1,2025-10-03,\"R$300,00\",t\n";

#[test]
fn test_full_pipeline() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    fs::write(data.path().join("calendar.csv"), THREE_NIGHTS).unwrap();

    let outcome = analyze(&config(data.path(), out.path(), oct_nov_2025())).unwrap();
    let AnalysisOutcome::Written(report) = outcome else {
        panic!("expected outputs to be written");
    };
    assert!(report.files.contains(&out.path().join(SUMMARY_FILE)));

    let summary = read_rows(&out.path().join(SUMMARY_FILE));
    assert_eq!(summary.len(), 1);
    assert_eq!(&summary[0][0], "2025-10-01");
    assert_eq!(&summary[0][1], "2025-11-30");
    assert_eq!(&summary[0][2], "1");
    assert_eq!(&summary[0][3], "3");
    assert_eq!(summary[0][4].parse::<f64>().unwrap(), 200.0);
    assert_eq!(summary[0][5].parse::<f64>().unwrap(), 200.0);
    assert_eq!(summary[0][6].parse::<f64>().unwrap(), 150.0);
    assert_eq!(summary[0][7].parse::<f64>().unwrap(), 250.0);

    let daily = read_rows(&out.path().join(DAILY_FILE));
    assert_eq!(daily.len(), 3);
    assert_eq!(&daily[0][0], "2025-10-01");
    assert_eq!(&daily[2][0], "2025-10-03");
    let averages: Vec<f64> = daily.iter().map(|r| r[1].parse().unwrap()).collect();
    assert_eq!(averages, vec![100.0, 200.0, 300.0]);

    let listings = read_rows(&out.path().join(LISTING_FILE));
    assert_eq!(listings.len(), 1);
    assert_eq!(&listings[0][0], "L1");
    assert_eq!(&listings[0][1], "3");

    // no listings file, no breakdowns
    assert!(!out.path().join(ROOM_TYPE_FILE).exists());
    assert!(!out.path().join(NEIGHBOURHOOD_FILE).exists());
    assert!(out.path().join("charts").join("daily_avg_price.png").exists());
}

#[test]
fn test_empty_window_writes_nothing() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let output_dir = out.path().join("output");
    fs::write(data.path().join("calendar.csv"), THREE_NIGHTS).unwrap();

    let window = DateWindow::new(date(2030, 1, 1), date(2030, 1, 31));
    let outcome = analyze(&config(data.path(), &output_dir, window)).unwrap();

    assert!(matches!(outcome, AnalysisOutcome::EmptyWindow));
    assert!(!output_dir.exists());
}

#[test]
fn test_missing_date_column_exit_code() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    fs::write(
        data.path().join("calendar.csv"),
        "listing_id,price,available\nL1,\"R$100,00\",t\n",
    )
    .unwrap();

    let err = analyze(&config(data.path(), out.path(), oct_nov_2025())).unwrap_err();
    assert_eq!(exit_code_for(&err), 2);
    assert!(format!("{err:#}").contains("'date'"));
}

#[test]
fn test_missing_calendar_exit_code() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    let err = analyze(&config(data.path(), out.path(), oct_nov_2025())).unwrap_err();
    assert_eq!(exit_code_for(&err), 1);
}

#[test]
fn test_gzipped_calendar_and_listing_breakdowns() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    let mut gz = GzEncoder::new(
        fs::File::create(data.path().join("calendar.csv.gz")).unwrap(),
        Compression::default(),
    );
    gz.write_all(
        b"listing_id,date,price,available\n\
          1,2025-10-01,\"R$1.200,00\",t\n\
          1,2025-10-02,,f\n\
          2,2025-10-01,80,f\n\
          3,2025-10-05,\"R$50,00\",t\n",
    )
    .unwrap();
    gz.finish().unwrap();

    fs::write(
        data.path().join("listings.csv"),
        "id,room_type,neighbourhood_cleansed\n\
         1,Entire home/apt,Nazaré\n\
         2,Private room,Umarizal\n",
    )
    .unwrap();

    analyze(&config(data.path(), out.path(), oct_nov_2025())).unwrap();

    let summary = read_rows(&out.path().join(SUMMARY_FILE));
    // the unpriced night still counts
    assert_eq!(&summary[0][2], "3");
    assert_eq!(&summary[0][3], "4");

    let room_types = read_rows(&out.path().join(ROOM_TYPE_FILE));
    let nights: usize = room_types.iter().map(|r| r[2].parse::<usize>().unwrap()).sum();
    assert_eq!(nights, 4);
    let entire = room_types.iter().find(|r| &r[0] == "Entire home/apt").unwrap();
    assert_eq!(&entire[2], "2");
    assert_eq!(entire[3].parse::<f64>().unwrap(), 1200.0);
    // listing 3 has no metadata and lands in the empty group
    assert!(room_types.iter().any(|r| r[0].is_empty() && &r[2] == "1"));

    let neighbourhoods = read_rows(&out.path().join(NEIGHBOURHOOD_FILE));
    assert_eq!(neighbourhoods.len(), 3);
}

#[tokio::test]
async fn test_sample_data_round_trip() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    let mut generator = SampleGenerator::new(SampleConfig {
        location: "Belém, PA".into(),
        pages: 2,
        seed: Some(2025),
        window: oct_nov_2025(),
    });
    let harvest = generator.collect().await.unwrap();
    save_harvest(&harvest, data.path()).unwrap();

    let cfg = config(data.path(), out.path(), oct_nov_2025());
    let AnalysisOutcome::Written(_) = analyze(&cfg).unwrap() else {
        panic!("expected outputs to be written");
    };

    let summary = read_rows(&out.path().join(SUMMARY_FILE));
    assert_eq!(&summary[0][2], "20");
    assert_eq!(&summary[0][3], (20 * 61).to_string().as_str());

    let daily = read_rows(&out.path().join(DAILY_FILE));
    assert_eq!(daily.len(), 61);

    let mean: f64 = summary[0][4].parse().unwrap();
    assert!((80.0..400.0).contains(&mean));

    assert!(out.path().join(ROOM_TYPE_FILE).exists());
    assert!(out.path().join(NEIGHBOURHOOD_FILE).exists());
}
