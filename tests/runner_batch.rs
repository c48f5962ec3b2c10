// tests/runner_batch.rs

use std::sync::Arc;

use tempfile::tempdir;
use uuid::Uuid;

use pgsh::errors::PgshError;
use pgsh::exec::{PersistingScanner, TempScriptStore};
use pgsh::model::ExecRequest;
use pgsh::runner::{OK_MESSAGE, ScriptRunner};
use pgsh::sink::MemoryStore;
use pgsh::types::ExecMode;
use pgsh_test_utils::fs::{FlakyDisk, entries};
use pgsh_test_utils::init_tracing;
use pgsh_test_utils::with_timeout;

fn runner(store: &Arc<MemoryStore>, tmp_dir: &std::path::Path) -> ScriptRunner {
    ScriptRunner::new(
        store.clone(),
        store.clone(),
        Arc::new(PersistingScanner::new(store.clone())),
        TempScriptStore::new(tmp_dir),
    )
}

fn dir_is_empty(path: &std::path::Path) -> bool {
    entries(path).is_empty()
}

#[tokio::test]
async fn successful_batch_records_tokens_and_cleans_up() {
    init_tracing();
    let tmp = tempdir().unwrap();
    let scripts_dir = tmp.path().join("tmp");
    let store = Arc::new(MemoryStore::new());
    let a = store.add_script("a", "echo hello world\n");
    let b = store.add_script("b", "echo bye\n");

    let report = with_timeout(runner(&store, &scripts_dir).execute_batch(
        &[ExecRequest::new(a.id, 0), ExecRequest::new(b.id, 0)],
        ExecMode::Sequential,
    ))
    .await
    .unwrap();

    assert!(report.is_ok());
    assert_eq!(report.message, OK_MESSAGE);
    let bodies: Vec<String> = store.logs_for(a.id).into_iter().map(|r| r.body).collect();
    assert_eq!(bodies, vec!["hello", "world"]);
    assert_eq!(store.logs_for(b.id).len(), 1);
    assert!(store.logs().iter().all(|r| !r.is_error));
    assert!(dir_is_empty(&scripts_dir), "transient scripts left behind");
}

#[tokio::test]
async fn failures_are_recorded_as_error_entries() {
    init_tracing();
    let tmp = tempdir().unwrap();
    let scripts_dir = tmp.path().join("tmp");
    let store = Arc::new(MemoryStore::new());
    let good = store.add_script("good", "echo fine\n");
    let bad = store.add_script("bad", "exit 2\n");

    let report = with_timeout(runner(&store, &scripts_dir).execute_batch(
        &[ExecRequest::new(good.id, 0), ExecRequest::new(bad.id, 0)],
        ExecMode::Concurrent,
    ))
    .await
    .unwrap();

    assert_eq!(report.errors.len(), 1);
    assert!(report.message.starts_with("Execute Error: "), "{}", report.message);

    let bad_logs = store.logs_for(bad.id);
    assert_eq!(bad_logs.len(), 1);
    assert!(bad_logs[0].is_error);
    assert!(bad_logs[0].body.starts_with("[wait execute] error:"), "{}", bad_logs[0].body);
    assert!(store.logs_for(good.id).iter().all(|r| !r.is_error));
    assert!(dir_is_empty(&scripts_dir));
}

#[tokio::test]
async fn request_timeout_kills_slow_script() {
    init_tracing();
    let tmp = tempdir().unwrap();
    let store = Arc::new(MemoryStore::new());
    let slow = store.add_script("slow", "sleep 5\n");

    let report = with_timeout(
        runner(&store, tmp.path()).execute_one(ExecRequest::new(slow.id, 1), ExecMode::Sequential),
    )
    .await
    .unwrap();

    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].detail.contains("deadline"), "{}", report.errors[0].detail);
    assert!(store.logs_for(slow.id)[0].is_error);
}

#[tokio::test]
async fn unknown_script_fails_before_anything_runs() {
    init_tracing();
    let tmp = tempdir().unwrap();
    let scripts_dir = tmp.path().join("tmp");
    let marker = tmp.path().join("ran");
    let store = Arc::new(MemoryStore::new());
    let known = store.add_script("known", &format!("touch '{}'\n", marker.display()));
    let missing = Uuid::new_v4();

    let err = with_timeout(runner(&store, &scripts_dir).execute_batch(
        &[ExecRequest::new(known.id, 0), ExecRequest::new(missing, 0)],
        ExecMode::Sequential,
    ))
    .await
    .unwrap_err();

    assert!(matches!(err, PgshError::ScriptNotFound(id) if id == missing));
    assert!(!marker.exists());
    assert!(store.logs().is_empty());
    assert!(dir_is_empty(&scripts_dir));
}

#[tokio::test]
async fn zero_request_timeout_lets_script_finish() {
    init_tracing();
    let tmp = tempdir().unwrap();
    let store = Arc::new(MemoryStore::new());
    let script = store.add_script("steady", "sleep 1\necho done\n");

    let report = with_timeout(
        runner(&store, tmp.path()).execute_one(ExecRequest::new(script.id, 0), ExecMode::Sequential),
    )
    .await
    .unwrap();

    assert!(report.is_ok(), "{}", report.message);
    assert_eq!(store.logs_for(script.id)[0].body, "done");
}

#[tokio::test]
async fn failed_cleanup_does_not_mask_batch_result() {
    init_tracing();
    let tmp = tempdir().unwrap();
    let scripts_dir = tmp.path().join("tmp");
    let store = Arc::new(MemoryStore::new());
    let good = store.add_script("good", "echo fine\n");
    let bad = store.add_script("bad", "exit 4\n");
    let disk = Arc::new(FlakyDisk::new().fail_removes(true));

    let report = with_timeout(
        runner(&store, &scripts_dir)
            .with_store(TempScriptStore::with_fs(&scripts_dir, disk))
            .execute_batch(
                &[ExecRequest::new(good.id, 0), ExecRequest::new(bad.id, 0)],
                ExecMode::Concurrent,
            ),
    )
    .await
    .unwrap();

    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].identity, bad.id.to_string());
    assert_eq!(store.logs_for(good.id)[0].body, "fine");
    assert!(store.logs_for(bad.id)[0].is_error);
    // Removal failed, so both transient files are still there.
    assert_eq!(entries(&scripts_dir).len(), 2);
}

#[tokio::test]
async fn failed_write_mid_batch_removes_every_file() {
    init_tracing();
    let tmp = tempdir().unwrap();
    let scripts_dir = tmp.path().join("tmp");
    let marker = tmp.path().join("ran");
    let store = Arc::new(MemoryStore::new());
    let ids: Vec<Uuid> = (0..3)
        .map(|i| {
            store
                .add_script(format!("s{i}"), format!("touch '{}'\n", marker.display()))
                .id
        })
        .collect();
    let disk = Arc::new(FlakyDisk::new().fail_writes_from(3));
    let requests: Vec<ExecRequest> = ids.iter().map(|id| ExecRequest::new(*id, 0)).collect();

    let err = with_timeout(
        runner(&store, &scripts_dir)
            .with_store(TempScriptStore::with_fs(&scripts_dir, disk.clone()))
            .execute_batch(&requests, ExecMode::Sequential),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, PgshError::IoError(ref e) if e.kind() == std::io::ErrorKind::StorageFull));
    assert_eq!(disk.writes(), 3);
    assert!(dir_is_empty(&scripts_dir), "left behind: {:?}", entries(&scripts_dir));
    assert!(!marker.exists());
    assert!(store.logs().is_empty());
}
