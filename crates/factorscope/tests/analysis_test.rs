//! Integration tests for the analysis pipeline

use approx::assert_relative_eq;
use chrono::NaiveDate;
use factorscope::data::{FactorStore, StoreConfig};
use factorscope::output::ExportFormat;
use factorscope::portfolio::MULTIFACTOR_NAME;
use factorscope::stats::StatsError;
use factorscope::{
    AnalysisError, AnalysisRequest, AnalysisWarning, FactorSelection, MARKET_NAME, analyze,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

const MARKET: &str = "\
year,month,rank_ME,ret_vw,nstocks
2020,1,1,1.0,3000
2020,2,1,-2.0,3000
2020,3,1,0.5,3000
2020,4,1,1.5,3000
2020,5,1,0.2,3000
2020,6,1,-0.3,3000
";

const BM: &str = "\
year,month,rank_ME,rank_bm,ret_vw,nstocks
2020,1,1,1,2.0,100
2020,2,1,1,-1.0,100
2020,3,1,1,3.0,100
2020,4,1,1,1.0,100
2020,5,1,1,0.5,100
2020,6,1,1,-0.5,100
2020,1,1,2,0.0,90
2020,2,1,2,1.0,90
2020,3,1,2,1.0,90
2020,4,1,2,1.0,90
2020,5,1,2,1.0,90
2020,6,1,2,1.0,90
";

const MOM: &str = "\
date,rank_ME,ret_vw
2020-02-01,1,4.0
2020-03-01,1,-4.0
2020-04-01,1,2.0
2020-05-01,1,1.0
";

const EP: &str = "\
year,month,rank_ME,ret_vw
2021,1,1,1.0
2021,2,1,2.0
2021,3,1,-1.0
";

fn month(m: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, m, 1).unwrap()
}

fn store(name: &str) -> (FactorStore, PathBuf) {
    let dir = std::env::temp_dir().join(format!("factorscope_analysis_{name}"));
    fs::remove_dir_all(&dir).ok();
    fs::create_dir_all(dir.join("value")).unwrap();
    fs::create_dir_all(dir.join("momentum")).unwrap();
    fs::write(dir.join("portf_me_monthly_2023.csv"), MARKET).unwrap();
    fs::write(dir.join("value").join("usa_portf_bm_monthly_2023.csv"), BM).unwrap();
    fs::write(dir.join("value").join("usa_portf_ep_monthly_2023.csv"), EP).unwrap();
    fs::write(dir.join("momentum").join("usa_portf_mom_monthly_2023.csv"), MOM).unwrap();
    let store = FactorStore::open(StoreConfig::with_base_path(&dir)).unwrap();
    (store, dir)
}

fn selections(specs: &[&str]) -> Vec<FactorSelection> {
    specs.iter().map(|s| s.parse().unwrap()).collect()
}

#[test]
fn test_full_analysis() {
    let (store, dir) = store("full");
    let request = AnalysisRequest::new(selections(&["value/bm:rank_bm=1", "momentum/mom"]))
        .with_market_cap(1)
        .with_window(3);
    let report = analyze(&store, &request).unwrap();

    assert!(report.warnings.is_empty());
    assert_eq!(report.start, Some(month(2)));
    assert_eq!(report.end, Some(month(5)));
    assert_eq!(report.series.len(), 3);
    assert_eq!(report.series[2].id, MULTIFACTOR_NAME);

    let bm = report.get("value/bm").unwrap();
    assert_eq!(bm.name, "Value-versus-Growth: Book-to-Market Equity");
    assert_eq!(bm.series.len(), 4);
    assert!(bm.statistics.beta.is_some());
    assert_relative_eq!(bm.statistics.average_n_stocks.unwrap(), 100.0);

    let blended = report.get(MULTIFACTOR_NAME).unwrap();
    let expected = [0.015, -0.005, 0.015, 0.0075];
    for (got, want) in blended.series.returns().iter().zip(expected) {
        assert_relative_eq!(*got, want, epsilon = 1e-12);
    }
    assert_relative_eq!(report.weights.get("value/bm").unwrap(), 0.5);

    assert_eq!(report.focus.name, MULTIFACTOR_NAME);
    assert_eq!(report.focus.rolling.len(), 4);
    assert!(report.focus.rolling.rolling_mean[1].is_none());
    assert!(report.focus.rolling.rolling_mean[2].is_some());
    assert!(report.focus.relative.has_market());
    assert!(report.focus.drawdown.drawdown.iter().flatten().all(|d| *d <= 0.0));

    let table = report.focus.statistics_table();
    assert_eq!(table.column_names().collect::<Vec<_>>(), [MULTIFACTOR_NAME, MARKET_NAME]);
    assert_eq!(report.statistics_table().len(), 4);

    let correlations = report.correlations.as_ref().unwrap();
    assert_eq!(correlations.len(), 3);
    assert_relative_eq!(correlations.values[[0, 0]].unwrap(), 1.0, epsilon = 1e-12);

    fs::remove_dir_all(dir).ok();
}

#[test]
fn test_without_market_rank() {
    let (store, dir) = store("no_market");
    let request = AnalysisRequest::new(selections(&["value/bm:rank_bm=2"])).with_window(2);
    let report = analyze(&store, &request).unwrap();

    assert_eq!(report.warnings, [AnalysisWarning::NoMarketRank]);
    assert!(!report.has_market());
    assert!(report.correlations.is_none());
    assert!(report.focus.market_summary.is_none());
    assert!(!report.focus.relative.has_market());
    assert!(report.focus.relative.rolling_beta.iter().all(Option::is_none));
    assert!(report.series[0].statistics.beta.is_none());
    assert!(report.series[0].statistics.mean_return.is_some());

    fs::remove_dir_all(dir).ok();
}

#[test]
fn test_missing_market_bucket() {
    let (store, dir) = store("market_bucket");
    let request = AnalysisRequest::new(selections(&["value/bm:rank_bm=1"]))
        .with_market_cap(1)
        .with_market_rank(7);
    let report = analyze(&store, &request).unwrap();

    assert_eq!(report.warnings, [AnalysisWarning::MissingMarket { rank: 7 }]);
    assert!(report.market.is_none());

    fs::remove_dir_all(dir).ok();
}

#[test]
fn test_weights_range_and_focus() {
    let (store, dir) = store("weights");
    let weights = BTreeMap::from([
        ("value/bm".to_string(), 3.0),
        ("momentum/mom".to_string(), 1.0),
    ]);
    let request = AnalysisRequest::new(selections(&["value/bm:rank_bm=1", "momentum/mom"]))
        .with_market_cap(1)
        .with_window(2)
        .with_weights(weights)
        .with_range(Some(month(3)), None)
        .with_focus("value/bm");
    let report = analyze(&store, &request).unwrap();

    assert_eq!(report.start, Some(month(3)));
    assert_relative_eq!(report.weights.get("value/bm").unwrap(), 0.75);
    let blended = report.get(MULTIFACTOR_NAME).unwrap();
    assert_relative_eq!(blended.series.returns()[0], 0.75 * 0.03 + 0.25 * -0.04, epsilon = 1e-12);

    assert_eq!(report.focus.name, "Value-versus-Growth: Book-to-Market Equity");
    assert_eq!(report.focus.rolling.dates.first(), Some(&month(3)));

    fs::remove_dir_all(dir).ok();
}

#[test]
fn test_blank_cells_only_drop_their_return_column() {
    let (_, dir) = store("blank_cells");
    fs::create_dir_all(dir.join("size")).unwrap();
    fs::write(
        dir.join("size").join("usa_portf_me_monthly_2023.csv"),
        "year,month,rank_ME,ret_vw,ret_ew\n\
         2020,1,1,1.0,2.0\n\
         2020,2,1,-1.0,1.0\n\
         2020,3,1,2.0,\n\
         2020,4,1,0.5,0.5\n",
    )
    .unwrap();
    let store = FactorStore::open(StoreConfig::with_base_path(&dir)).unwrap();

    let vw = AnalysisRequest::new(selections(&["size/me"])).with_market_cap(1);
    let report = analyze(&store, &vw).unwrap();
    assert_eq!(report.series[0].series.len(), 4);
    assert_relative_eq!(report.series[0].series.returns()[2], 0.02);

    let ew = AnalysisRequest {
        return_column: "ret_ew".to_string(),
        ..AnalysisRequest::new(selections(&["size/me"]))
    };
    let report = analyze(&store, &ew).unwrap();
    assert_eq!(report.series[0].series.dates(), &[month(1), month(2), month(4)]);

    fs::remove_dir_all(dir).ok();
}

#[test]
fn test_disjoint_factors_warn() {
    let (store, dir) = store("disjoint");
    let request = AnalysisRequest::new(selections(&["value/bm:rank_bm=1", "value/ep"]))
        .with_market_cap(1);
    let report = analyze(&store, &request).unwrap();

    assert!(report.warnings.contains(&AnalysisWarning::NoCommonRange));
    assert!(report.warnings.contains(&AnalysisWarning::NoCommonDates));
    assert!(report.blended.is_none());
    assert_eq!(report.series.len(), 2);
    assert!(report.series.iter().all(|r| r.series.is_empty()));

    fs::remove_dir_all(dir).ok();
}

#[test]
fn test_request_errors() {
    let (store, dir) = store("errors");

    assert!(matches!(
        analyze(&store, &AnalysisRequest::default()),
        Err(AnalysisError::NoFactors)
    ));

    let short = AnalysisRequest::new(selections(&["value/bm:rank_bm=1"])).with_window(1);
    assert!(matches!(
        analyze(&store, &short),
        Err(AnalysisError::Stats(StatsError::InvalidWindow { window: 1 }))
    ));

    let twice = AnalysisRequest::new(selections(&["value/bm", "value/bm"]));
    assert!(matches!(
        analyze(&store, &twice),
        Err(AnalysisError::InvalidSelection(_))
    ));

    let unknown = AnalysisRequest::new(selections(&["value/bm:rank_bm=1"])).with_focus("nope");
    assert!(matches!(
        analyze(&store, &unknown),
        Err(AnalysisError::UnknownFocus(_))
    ));

    let empty = AnalysisRequest::new(selections(&["value/bm:rank_bm=9"]));
    assert!(matches!(analyze(&store, &empty), Err(AnalysisError::NoData)));

    fs::remove_dir_all(dir).ok();
}

#[test]
fn test_export_report() {
    let (store, dir) = store("export");
    let mut request = AnalysisRequest::new(selections(&["value/bm:rank_bm=1", "momentum/mom"]))
        .with_market_cap(1)
        .with_window(2);
    request.quantiles = Some(2);
    let report = analyze(&store, &request).unwrap();

    let out = dir.join("out");
    let files = report.export_to_dir(&out, ExportFormat::Csv).unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();

    for expected in [
        "statistics.csv",
        "series_value_bm.csv",
        "series_momentum_mom.csv",
        "series_multifactor_portfolio.csv",
        "blend.csv",
        "rolling.csv",
        "drawdown.csv",
        "relative.csv",
        "focus_statistics.csv",
        "quantiles.csv",
        "correlations.csv",
    ] {
        assert!(names.iter().any(|n| n == expected), "missing {expected}");
    }
    let stats = fs::read_to_string(out.join("statistics.csv")).unwrap();
    assert!(stats.lines().next().unwrap().ends_with(MARKET_NAME));

    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"warnings\":[]"));

    fs::remove_dir_all(dir).ok();
}
