use std::process::{Command, Output};

use indoc::indoc;
use splitmerge::ChainSummary;

const SPLITMERGE_CMD: &str = env!("CARGO_BIN_EXE_splitmerge");

fn run(args: &[&str]) -> Output {
    Command::new(SPLITMERGE_CMD)
        .arg("run")
        .arg("-q")
        .args(args)
        .output()
        .expect("failed to execute process")
}

#[test]
fn run_from_flags_prints_table() {
    let output = run(&[
        "--n-items", "8", "--n-iters", "20", "--n-chains", "2", "--seed", "7",
    ]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert!(lines[0].contains("Chain"));
    assert!(lines[0].contains("Accept"));
    // header, rule, two chains
    assert_eq!(lines.len(), 4);
}

#[test]
fn run_from_config_writes_summary() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("run.yaml");
    let output_path = dir.path().join("summary.yaml");
    std::fs::write(
        &config_path,
        indoc! {"
            n_iters: 30
            n_chains: 3
            seed: 1337
            n_items: 10
            n_slots: 12
            dim: 2
            operator:
              scale: 0.5
            target:
              kind: crp_location_prior
              alpha: 1.0
              location_sd: 2.0
        "},
    )
    .unwrap();

    let output = run(&[
        "--config",
        config_path.to_str().unwrap(),
        "--output",
        output_path.to_str().unwrap(),
    ]);
    assert!(output.status.success());

    let file = std::fs::File::open(&output_path).unwrap();
    let summaries: Vec<ChainSummary> = serde_yaml::from_reader(file).unwrap();
    assert_eq!(summaries.len(), 3);
    assert!(summaries.iter().all(|s| s.n_iters == 30));
}

#[test]
fn fewer_slots_than_items_fails() {
    let output = run(&["--n-items", "8", "--n-slots", "4", "--n-iters", "5"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("8 items"));
}

#[test]
fn missing_config_file_fails() {
    let output = run(&["--config", "does/not/exist.yaml"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn missing_required_flags_fail() {
    let output = run(&["--n-iters", "5"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn invalid_prior_settings_fail() {
    for alpha in ["--alpha=-2", "--alpha=0"] {
        let output = run(&["--n-items", "6", "--n-iters", "5", alpha]);
        assert_eq!(output.status.code(), Some(1));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("concentration"));
    }

    let output =
        run(&["--n-items", "6", "--n-iters", "5", "--location-sd=-1"]);
    assert_eq!(output.status.code(), Some(1));
}
