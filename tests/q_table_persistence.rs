//! Q-table persistence through the MessagePack repository and CSV export.

use planewar::{
    Error,
    adapters::MsgPackRepository,
    app::{AgentConfig, App},
    export::QTableCsvExporter,
    ports::QTableRepository,
    q_learning::{QLearningAgent, SavedQTable, State},
    types::Action,
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use tempfile::tempdir;

fn trained_agent() -> QLearningAgent {
    let mut agent = QLearningAgent::new(0.1, 0.9, 0.1, 0.995, 0.01).with_seed(21);
    agent
        .learn(&State::new(2, 3, 0, 5), Action::Left, 46.0, &State::new(2, 2, 0, 5))
        .unwrap();
    agent
        .learn(&State::new(-1, 0, 4, 4), Action::Avoid, -100.0, &State::new(-1, 0, 4, 4))
        .unwrap();
    agent.record_training(2, 37);
    agent
}

#[test]
fn saved_table_reloads_identically() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("q_table.msgpack");
    let repository = MsgPackRepository::new();

    let agent = trained_agent();
    agent.save(&repository, &path).unwrap();

    let mut restored = QLearningAgent::new(0.1, 0.9, 0.1, 0.995, 0.01);
    assert!(restored.reload(&repository, &path).unwrap());

    assert_eq!(restored.q_table(), agent.q_table());
    assert_eq!(restored.metadata().episodes_trained, 2);
    assert_eq!(restored.metadata().ticks_trained, 37);
    assert_eq!(restored.metadata().seed, Some(21));
    assert!(
        (restored.q_table().get(&State::new(2, 3, 0, 5), Action::Left) - 4.6).abs() < 1e-12
    );
}

fn random_state(rng: &mut StdRng) -> State {
    State::new(
        rng.random_range(-8..8),
        rng.random_range(-8..8),
        rng.random_range(-8..8),
        rng.random_range(-8..8),
    )
}

#[test]
fn random_learning_histories_survive_save_and_reload() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("q_table.msgpack");
    let repository = MsgPackRepository::new();
    let mut rng = StdRng::seed_from_u64(29);

    for _ in 0..50 {
        let alpha: f64 = rng.random_range(0.0..=1.0);
        let gamma: f64 = rng.random_range(0.0..=1.0);
        let mut agent = QLearningAgent::new(alpha, gamma, 0.1, 0.995, 0.01);

        for _ in 0..rng.random_range(0..120) {
            let state = random_state(&mut rng);
            let action = Action::ALL[rng.random_range(0..Action::COUNT)];
            let reward = rng.random_range(-110.0..60.0);
            let next_state = random_state(&mut rng);
            agent.learn(&state, action, reward, &next_state).unwrap();
        }

        agent.save(&repository, &path).unwrap();
        let mut restored = QLearningAgent::default();
        restored.reload(&repository, &path).unwrap();
        assert_eq!(restored.q_table(), agent.q_table());
    }
}

#[test]
fn missing_file_starts_with_an_empty_table() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("never_written.msgpack");

    let app = App::new();
    let agent = app.create_agent(&AgentConfig::new(), &path).unwrap();

    assert_eq!(agent.q_table_size(), 0);
    assert_eq!(agent.metadata().episodes_trained, 0);
    assert!(!path.exists());
}

#[test]
fn garbage_bytes_are_reported_as_corrupt() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("q_table.msgpack");
    std::fs::write(&path, b"definitely not messagepack").unwrap();

    let err = App::new()
        .create_agent(&AgentConfig::new(), &path)
        .unwrap_err();
    match err {
        Error::CorruptState { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("expected CorruptState, got {other:?}"),
    }
}

#[test]
fn unknown_format_version_is_reported_as_corrupt() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("q_table.msgpack");
    let repository = MsgPackRepository::new();

    let mut snapshot = trained_agent().snapshot();
    snapshot.version = SavedQTable::VERSION + 1;
    repository.save(&snapshot, &path).unwrap();

    let mut agent = QLearningAgent::default();
    let err = agent.reload(&repository, &path).unwrap_err();
    assert!(matches!(err, Error::CorruptState { .. }));
}

#[test]
fn csv_export_writes_one_row_per_state() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("q_table.csv");
    let agent = trained_agent();

    let rows = QTableCsvExporter::export(agent.q_table(), &path).unwrap();
    assert_eq!(rows, agent.q_table_size());

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(&headers[0], "bullet_dx");
    assert_eq!(&headers[headers.len() - 1], "greedy");
    assert_eq!(reader.records().count(), rows);
}
