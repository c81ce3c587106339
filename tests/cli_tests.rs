use clap::Parser;
use relaypipe::Opts;
use relaypipe::engine::{
    Cli, StageSpec, build_opts, consume_output, parse_stage_specs, run_with_opts,
    spawn_range_source, spawn_reader_source,
};
use relaypipe::pipeline::Done;
use relaypipe::utils::{apply_file_to_opts, load_pipeline_toml, parse_pipeline_toml};
use std::io::Cursor;
use std::path::PathBuf;

fn opts_with(stages: &[&str], count: u64) -> Opts {
    Opts {
        stages: stages.iter().map(|s| s.to_string()).collect(),
        count: Some(count),
        ..Opts::default()
    }
}

fn lines(buf: &[u8]) -> Vec<String> {
    String::from_utf8(buf.to_vec())
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

// --- stage specs ---

#[test]
fn test_parse_stage_specs_valid() {
    let specs = parse_stage_specs(&[
        "mul:3".to_string(),
        " add:-2 ".to_string(),
        "SUB:1".to_string(),
        "div:2".to_string(),
        "neg".to_string(),
        "square".to_string(),
        "even".to_string(),
        "odd".to_string(),
        "delay:10".to_string(),
    ])
    .unwrap();
    assert_eq!(
        specs,
        vec![
            StageSpec::Mul(3),
            StageSpec::Add(-2),
            StageSpec::Sub(1),
            StageSpec::Div(2),
            StageSpec::Neg,
            StageSpec::Square,
            StageSpec::Even,
            StageSpec::Odd,
            StageSpec::Delay(10),
        ]
    );
}

#[test]
fn test_parse_stage_spec_errors() {
    assert!("mul".parse::<StageSpec>().is_err());
    assert!("mul:x".parse::<StageSpec>().is_err());
    assert!("div:0".parse::<StageSpec>().is_err());
    assert!("neg:1".parse::<StageSpec>().is_err());
    assert!("delay:-5".parse::<StageSpec>().is_err());
    assert!("delay:999999999".parse::<StageSpec>().is_err());
    assert!("bogus:1".parse::<StageSpec>().is_err());
    assert!("".parse::<StageSpec>().is_err());
}

#[test]
fn test_parse_stage_specs_reports_position() {
    let err = parse_stage_specs(&["mul:2".to_string(), "nope".to_string()]).unwrap_err();
    assert!(format!("{:#}", err).contains("stage #2"));
}

#[test]
fn test_stage_spec_display_round_trips() {
    for s in ["mul:2", "add:-7", "div:3", "square", "odd", "delay:5"] {
        assert_eq!(s.parse::<StageSpec>().unwrap().to_string(), s);
    }
}

#[test]
fn test_stage_spec_apply_value() {
    assert_eq!(StageSpec::Mul(3).apply_value(4), 12);
    assert_eq!(StageSpec::Sub(10).apply_value(4), -6);
    assert_eq!(StageSpec::Div(2).apply_value(-7), -3);
    assert_eq!(StageSpec::Neg.apply_value(i64::MIN), i64::MIN);
    assert_eq!(StageSpec::Square.apply_value(-9), 81);
    assert_eq!(StageSpec::Mul(2).apply_value(i64::MAX), -2);
    assert!(StageSpec::Odd.keeps(-3));
    assert!(!StageSpec::Even.keeps(-3));
    assert!(StageSpec::Even.keeps(0));
}

// --- config ---

#[test]
fn test_config_file_applies_settings() {
    let file = parse_pipeline_toml(
        r#"
[settings]
stages = ["mul:2", "even"]
from = -3
count = 7
timeout_ms = 250
relay_capacity = 4
json = true
"#,
    )
    .unwrap();
    let mut opts = Opts::default();
    apply_file_to_opts(&file, &mut opts);
    assert_eq!(opts.stages, vec!["mul:2", "even"]);
    assert_eq!(opts.from, -3);
    assert_eq!(opts.count, Some(7));
    assert_eq!(opts.timeout_ms, Some(250));
    assert_eq!(opts.relay_capacity, 4);
    assert!(opts.json);
    assert!(!opts.verbose);
}

#[test]
fn test_config_file_rejects_unknown_keys() {
    assert!(parse_pipeline_toml("[settings]\nstagez = []\n").is_err());
    assert!(parse_pipeline_toml("[setting]\nstages = [\"mul:2\"]\n").is_err());
    assert!(parse_pipeline_toml("count = 3\n").is_err());
}

#[test]
fn test_config_file_empty_keeps_defaults() {
    let file = parse_pipeline_toml("").unwrap();
    let mut opts = Opts::default();
    apply_file_to_opts(&file, &mut opts);
    assert!(opts.stages.is_empty());
    assert_eq!(opts.from, 1);
    assert_eq!(opts.count, None);
}

#[test]
fn test_load_missing_config_is_none() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/no-such-config.toml");
    assert!(load_pipeline_toml(&path).unwrap().is_none());
}

#[test]
fn test_cli_overrides_config_file() {
    let dir = std::env::temp_dir().join(format!("relaypipe-cli-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let config = dir.join("run.toml");
    std::fs::write(
        &config,
        "[settings]\nstages = [\"add:1\"]\ncount = 3\nfrom = 10\n",
    )
    .unwrap();

    let cli = Cli::parse_from([
        "relaypipe",
        "mul:2",
        "--config",
        config.to_str().unwrap(),
        "--count",
        "5",
        "--json",
    ]);
    let opts = build_opts(&cli).unwrap();
    assert_eq!(opts.stages, vec!["mul:2"]);
    assert_eq!(opts.count, Some(5));
    assert_eq!(opts.from, 10);
    assert!(opts.json);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_cli_missing_explicit_config_is_error() {
    let cli = Cli::parse_from(["relaypipe", "--config", "/definitely/not/here.toml"]);
    assert!(build_opts(&cli).is_err());
}

// --- sources ---

#[test]
fn test_range_source_counts() {
    let done = Done::new();
    let src = spawn_range_source(-2, Some(5), &done, 0);
    assert_eq!(src.values.iter().collect::<Vec<_>>(), vec![-2, -1, 0, 1, 2]);
    assert_eq!(src.handle.join().unwrap(), 5);
}

#[test]
fn test_range_source_stops_on_cancel() {
    let done = Done::new();
    let src = spawn_range_source(0, None, &done, 0);
    assert_eq!(src.values.recv().unwrap(), 0);
    done.fire();
    let rest = src.values.iter().count();
    assert!(rest <= 1);
    assert!(src.handle.join().unwrap() <= 2);
}

#[test]
fn test_reader_source_skips_bad_lines() {
    let done = Done::new();
    let input = Cursor::new("1\n\n  2 \nthree\n-4\n");
    let src = spawn_reader_source(input, &done, 0);
    assert_eq!(src.values.iter().collect::<Vec<_>>(), vec![1, 2, -4]);
    assert_eq!(src.handle.join().unwrap(), 3);
}

// --- end to end ---

#[test]
fn test_run_with_opts_plain_output() {
    let done = Done::new();
    let mut out = Vec::new();
    let opts = opts_with(&["mul:2", "add:1", "odd"], 5);
    let summary = run_with_opts(&opts, &done, &mut out).unwrap();
    assert_eq!(lines(&out), vec!["3", "5", "7", "9", "11"]);
    assert_eq!(summary.received, 5);
    assert_eq!(summary.produced, 5);
    assert!(!summary.cancelled);
    assert_eq!(summary.relays.len(), 3);
}

#[test]
fn test_run_with_opts_filter_then_json() {
    let done = Done::new();
    let mut opts = opts_with(&["even", "square"], 6);
    opts.json = true;
    let mut out = Vec::new();
    let summary = run_with_opts(&opts, &done, &mut out).unwrap();
    assert_eq!(
        lines(&out),
        vec![r#"{"value":4}"#, r#"{"value":16}"#, r#"{"value":36}"#]
    );
    assert_eq!(summary.received, 3);
    assert_eq!(summary.relays[1].forwarded, 3);
}

#[test]
fn test_run_with_opts_no_stages_is_identity() {
    let done = Done::new();
    let mut out = Vec::new();
    let summary = run_with_opts(&opts_with(&[], 3), &done, &mut out).unwrap();
    assert_eq!(lines(&out), vec!["1", "2", "3"]);
    assert_eq!(summary.relays.len(), 1);
}

#[test]
fn test_run_with_opts_timeout_cancels_endless_producer() {
    let done = Done::new();
    let opts = Opts {
        stages: vec!["delay:5".to_string(), "add:1".to_string()],
        count: None,
        timeout_ms: Some(60),
        ..Opts::default()
    };
    let mut out = Vec::new();
    let summary = run_with_opts(&opts, &done, &mut out).unwrap();
    assert!(summary.cancelled);
    assert!(summary.received < 60);
    assert!(summary.produced >= summary.received);
    assert!(
        summary
            .relays
            .iter()
            .all(|r| r.outcome == relaypipe::RelayOutcome::Cancelled)
    );
}

#[test]
fn test_run_with_opts_finished_before_deadline_is_not_cancelled() {
    let done = Done::new();
    let opts = Opts {
        stages: vec!["add:1".to_string()],
        count: Some(4),
        timeout_ms: Some(100),
        ..Opts::default()
    };
    let mut out = Vec::new();
    let summary = run_with_opts(&opts, &done, &mut out).unwrap();
    assert_eq!(lines(&out), vec!["2", "3", "4", "5"]);
    assert!(!summary.cancelled);
    assert!(
        summary
            .relays
            .iter()
            .all(|r| r.outcome == relaypipe::RelayOutcome::Exhausted)
    );
    // The deadline thread still fires the caller's signal later.
    assert!(done.wait_timeout(std::time::Duration::from_secs(5)));
}

#[test]
fn test_run_with_opts_rejects_bad_stage_before_start() {
    let done = Done::new();
    let mut out = Vec::new();
    assert!(run_with_opts(&opts_with(&["mul:2", "frobnicate"], 3), &done, &mut out).is_err());
    assert!(out.is_empty());
}

#[test]
fn test_consume_output_counts_values() {
    let (tx, rx) = crossbeam_channel::unbounded();
    for v in [5_i64, -1, 0] {
        tx.send(v).unwrap();
    }
    drop(tx);
    let mut out = Vec::new();
    assert_eq!(consume_output(&rx, false, None, &mut out).unwrap(), 3);
    assert_eq!(lines(&out), vec!["5", "-1", "0"]);
}

#[test]
fn test_summary_serializes() {
    let done = Done::fired();
    let mut out = Vec::new();
    let summary = run_with_opts(&opts_with(&["neg"], 3), &done, &mut out).unwrap();
    assert!(summary.cancelled);
    assert_eq!(summary.received, 0);
    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["relays"][0]["outcome"], "cancelled");
}
