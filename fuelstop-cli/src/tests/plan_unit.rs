//! Focused unit tests covering plan configuration and report output.

use super::helpers::{StubTripServicesBuilder, utf8_tempdir, write_utf8};
use super::*;
use camino::Utf8PathBuf;
use crate::plan::{PlanReport, REPORT_GEOMETRY_POINTS, config_from_layers_for_test, run_plan_with};
use crate::trip::{TripConfig, plan_trip};
use fuelstop_core::{PlannerConfig, RouteProviderError};
use fuelstop_data::routing::DEFAULT_OSRM_BASE_URL;
use rstest::rstest;
use serde_json::Value;

fn plan_args(start: &str, finish: &str) -> PlanArgs {
    PlanArgs {
        start: Some(start.to_owned()),
        finish: Some(finish.to_owned()),
        ..PlanArgs::default()
    }
}

#[rstest]
#[case::absent(None)]
#[case::blank(Some("   "))]
fn converting_plan_without_start_errors(#[case] start: Option<&str>) {
    let args = PlanArgs {
        start: start.map(str::to_owned),
        finish: Some("Denver, CO".to_owned()),
        ..PlanArgs::default()
    };

    let err = TripConfig::try_from(args).expect_err("missing start should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_START);
            assert_eq!(env, ENV_PLAN_START);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn plan_config_applies_defaults() {
    let config =
        TripConfig::try_from(plan_args(" Chicago, IL ", "Denver, CO")).expect("config builds");

    assert_eq!(config.start, "Chicago, IL");
    assert_eq!(config.finish, "Denver, CO");
    assert_eq!(config.stations_db, Utf8PathBuf::from(DEFAULT_STATIONS_DB));
    assert_eq!(config.provider.osrm_base_url, DEFAULT_OSRM_BASE_URL);
    assert_eq!(config.planner, PlannerConfig::default());
}

#[rstest]
fn plan_config_overrides_vehicle() {
    let args = PlanArgs {
        max_range: Some(600.0),
        mpg: Some(6.5),
        ..plan_args("Chicago, IL", "Denver, CO")
    };

    let config = TripConfig::try_from(args).expect("config builds");
    assert_eq!(config.planner.max_range_miles, 600.0);
    assert_eq!(config.planner.mpg, 6.5);
}

#[rstest]
#[case::zero_mpg(None, Some(0.0), ARG_MPG)]
#[case::negative_range(Some(-5.0), None, ARG_MAX_RANGE)]
#[case::range_inside_safety_margin(Some(40.0), None, ARG_MAX_RANGE)]
fn plan_config_rejects_unusable_vehicle(
    #[case] max_range: Option<f64>,
    #[case] mpg: Option<f64>,
    #[case] expected_field: &'static str,
) {
    let args = PlanArgs {
        max_range,
        mpg,
        ..plan_args("Chicago, IL", "Denver, CO")
    };

    let err = TripConfig::try_from(args).expect_err("vehicle should be rejected");
    match err {
        CliError::InvalidArgument { field, .. } => assert_eq!(field, expected_field),
        other => panic!("expected InvalidArgument, found {other:?}"),
    }
}

#[rstest]
fn validate_sources_reports_missing_database() {
    let (_tmp, root) = utf8_tempdir();
    let args = PlanArgs {
        stations_db: Some(root.join("absent.db")),
        ..plan_args("Chicago, IL", "Denver, CO")
    };
    let config = TripConfig::try_from(args).expect("config builds");

    let err = config.validate_sources().expect_err("missing database");
    match err {
        CliError::MissingSourceFile { field, .. } => assert_eq!(field, ARG_STATIONS_DB),
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[rstest]
fn validate_sources_reports_not_file() {
    let (_tmp, root) = utf8_tempdir();
    let db_dir = root.join("stations.db");
    std::fs::create_dir(&db_dir).expect("database directory");
    let args = PlanArgs {
        stations_db: Some(db_dir.clone()),
        ..plan_args("Chicago, IL", "Denver, CO")
    };
    let config = TripConfig::try_from(args).expect("config builds");

    let err = config
        .validate_sources()
        .expect_err("expected directory path to fail validation");
    match err {
        CliError::SourcePathNotFile { field, path } => {
            assert_eq!(field, ARG_STATIONS_DB);
            assert_eq!(path, db_dir);
        }
        other => panic!("expected SourcePathNotFile, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "mpg": "thirsty" }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_honours_precedence() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "mpg": 8.0,
            "osrm_base_url": "http://from-file:5000",
            "stations_db": "from-file.db",
        }),
        None,
    );
    composer.push_environment(json!({
        "start": "Chicago, IL",
        "finish": "Denver, CO",
        "stations_db": "from-env.db",
    }));
    composer.push_cli(json!({ "mpg": 6.0 }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.start, "Chicago, IL");
    assert_eq!(config.finish, "Denver, CO");
    assert_eq!(config.stations_db, Utf8PathBuf::from("from-env.db"));
    assert_eq!(config.provider.osrm_base_url, "http://from-file:5000");
    assert_eq!(config.planner.mpg, 6.0);
}

#[rstest]
fn report_truncates_geometry_and_links_the_map() {
    let config = TripConfig::try_from(plan_args("West, EQ", "East, EQ")).expect("config builds");
    let trip =
        plan_trip(&config, &StubTripServicesBuilder::corridor()).expect("corridor plan succeeds");
    assert!(trip.route.coordinates().len() > REPORT_GEOMETRY_POINTS);

    let report = PlanReport::new(&config, trip).expect("report builds");
    assert_eq!(report.route.geometry.len(), REPORT_GEOMETRY_POINTS);
    assert_eq!(report.route.geometry[1], [0.1, 0.0]);
    assert_eq!(report.route.start_location, "West, EQ");
    assert_eq!(report.summary.stop_count, report.fuel_stops.len());
    assert!(
        report
            .map_url
            .starts_with("https://www.openstreetmap.org/?mlat=0&mlon=6")
    );
}

#[rstest]
fn run_plan_prints_json_report() {
    let (_tmp, root) = utf8_tempdir();
    let db_path = root.join("stations.db");
    write_utf8(&db_path, b"stub database");
    let args = PlanArgs {
        stations_db: Some(db_path),
        ..plan_args("West, EQ", "East, EQ")
    };

    let mut stdout = Vec::new();
    run_plan_with(args, &StubTripServicesBuilder::corridor(), &mut stdout)
        .expect("plan succeeds");

    let report: Value = serde_json::from_slice(&stdout).expect("output should be JSON");
    let stops = report["fuel_stops"].as_array().expect("fuel_stops array");
    assert_eq!(stops.len(), 1);
    assert_eq!(stops[0]["station"]["station_id"], "cheap-1");
    assert!(stops[0]["cost"].to_string().contains("155"));
    assert_eq!(report["stop_count"], 1);
    assert!(report["total_fuel_cost"].is_string() || report["total_fuel_cost"].is_number());
    assert!(report["response_time_ms"].is_u64());
}

#[rstest]
fn run_plan_surfaces_geocoding_failures() {
    let (_tmp, root) = utf8_tempdir();
    let db_path = root.join("stations.db");
    write_utf8(&db_path, b"stub database");
    let args = PlanArgs {
        stations_db: Some(db_path),
        ..plan_args("Atlantis, ZZ", "Denver, CO")
    };
    let builder = StubTripServicesBuilder::failing(RouteProviderError::Geocode {
        location: "Atlantis, ZZ".into(),
    });

    let mut stdout = Vec::new();
    let err = run_plan_with(args, &builder, &mut stdout).expect_err("geocoding should fail");
    match err {
        CliError::ResolveRoute(RouteProviderError::Geocode { location }) => {
            assert_eq!(location, "Atlantis, ZZ");
        }
        other => panic!("expected ResolveRoute, found {other:?}"),
    }
    assert!(stdout.is_empty());
}
