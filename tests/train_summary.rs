use clap::Parser;
use planewar::{
    adapters::MsgPackRepository,
    cli::commands::train::{TrainArgs, execute},
    ports::QTableRepository,
};
use tempfile::tempdir;

fn parse_args<I, T>(args: I) -> TrainArgs
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    TrainArgs::parse_from(args)
}

#[test]
fn summary_without_extension_appends_json() {
    let tmp = tempdir().unwrap();
    let q_table = tmp.path().join("q_table.msgpack");
    let summary_stem = tmp.path().join("run_overview");

    let args = parse_args([
        "planewar-train",
        "--q-table",
        q_table.to_str().unwrap(),
        "--seed",
        "9",
        "--episodes",
        "3",
        "--max-steps",
        "50",
        "--summary",
        summary_stem.to_str().unwrap(),
    ]);

    execute(args).expect("training with summary should succeed");

    let expected_path = summary_stem.with_extension("json");
    assert!(
        expected_path.exists(),
        "expected summary at {}",
        expected_path.display()
    );

    let contents = std::fs::read_to_string(&expected_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(parsed["training"]["episodes"], 3);
    assert_eq!(parsed["metadata"]["seed"], 9);
    assert_eq!(parsed["metadata"]["max_steps"], 50);
    assert_eq!(parsed["metadata"]["episodes_trained_total"], 3);
}

#[test]
fn summary_directory_argument_creates_default_file() {
    let tmp = tempdir().unwrap();
    let q_table = tmp.path().join("q_table.msgpack");
    let summary_dir = tmp.path().join("summaries");
    let summary_arg = format!("{}/", summary_dir.display());

    let args = parse_args([
        "planewar-train",
        "--q-table",
        q_table.to_str().unwrap(),
        "--episodes",
        "2",
        "--max-steps",
        "20",
        "--summary",
        &summary_arg,
    ]);

    execute(args).expect("training with directory summary should succeed");

    let expected_path = summary_dir.join("training_summary.json");
    assert!(
        expected_path.exists(),
        "expected summary at {}",
        expected_path.display()
    );
}

#[test]
fn second_run_continues_from_the_saved_table() {
    let tmp = tempdir().unwrap();
    let q_table = tmp.path().join("q_table.msgpack");
    let q_table_arg = q_table.to_str().unwrap();

    for _ in 0..2 {
        let args = parse_args([
            "planewar-train",
            "--q-table",
            q_table_arg,
            "--episodes",
            "2",
            "--max-steps",
            "25",
        ]);
        execute(args).expect("training should succeed");
    }

    let saved = MsgPackRepository::new()
        .load(&q_table)
        .unwrap()
        .expect("table saved");
    assert_eq!(saved.metadata.episodes_trained, 4);
    assert!(!saved.is_empty());
}
