//! Unit tests for the source watcher
//!
//! These use the platform file watcher on a temp dir, so they run in real
//! time with generous timeouts.

use nodem_site::config::Config;
use nodem_site::pipeline::watch::SourceWatcher;
use nodem_site::pipeline::{AssetTask, ReloadEvent, TaskRunner};
use std::collections::BTreeSet;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

const WAIT: Duration = Duration::from_secs(10);

fn project() -> (TempDir, TaskRunner) {
    let dir = tempfile::tempdir().unwrap();
    for sub in ["src/scss", "src/js", "src/fonts", "src/templates"] {
        fs::create_dir_all(dir.path().join(sub)).unwrap();
    }
    let mut config = Config::default().rooted_at(dir.path());
    config.pipeline.debounce_ms = 300;
    let runner = TaskRunner::new(&config);
    (dir, runner)
}

#[tokio::test]
async fn test_burst_becomes_one_batch() {
    let (dir, runner) = project();
    let mut watcher = SourceWatcher::new(runner).unwrap();
    let src = dir.path().join("src");

    fs::write(src.join("scss/main.scss"), "a { color: red; }").unwrap();
    fs::write(src.join("scss/_vars.scss"), "$x: 1;").unwrap();
    fs::write(src.join("js/index.js"), "go();\n").unwrap();
    fs::write(src.join("js/index.js"), "go();\ngo();\n").unwrap();
    fs::write(src.join("fonts/mono.woff2"), "font").unwrap();

    let batch = tokio::time::timeout(WAIT, watcher.next_batch())
        .await
        .expect("no batch")
        .expect("watcher closed");
    assert_eq!(
        batch,
        BTreeSet::from([AssetTask::Styles, AssetTask::Scripts])
    );
}

#[tokio::test]
async fn test_failing_task_does_not_stop_watcher() {
    let (dir, runner) = project();
    let mut reloads = runner.subscribe();
    let watcher = SourceWatcher::new(runner).unwrap();
    let running = tokio::spawn(watcher.run());
    let src = dir.path().join("src");

    fs::write(src.join("scss/main.scss"), "a {").unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    fs::write(src.join("js/index.js"), "go();\n").unwrap();

    let event = tokio::time::timeout(WAIT, reloads.recv())
        .await
        .expect("no reload")
        .unwrap();
    // The broken stylesheet never announced a reload
    assert_eq!(
        event,
        ReloadEvent {
            task: AssetTask::Scripts
        }
    );
    assert!(!running.is_finished());
    assert!(dir.path().join("js/index.js").exists());

    running.abort();
}
