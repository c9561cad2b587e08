#![cfg(unix)]

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use benchrun::engine::{ShutdownOutcome, shutdown};
use benchrun::exec::ProcessSupervisor;
use benchrun::launch::CommandSpec;
use benchrun::types::{ProcessStatus, RunId};
use benchrun_test_utils::sink::MemorySink;
use benchrun_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn cooperative_runner_stops_gracefully() -> TestResult {
    init_tracing();
    let sup = ProcessSupervisor::new(Arc::new(MemorySink::new()));
    let handle = sup.launch(RunId::new("polite"), CommandSpec::new("sleep").arg("30"))?;

    let outcome = with_timeout(shutdown(&sup, &handle, Duration::from_secs(5))).await?;

    assert_eq!(outcome, ShutdownOutcome::Graceful);
    Ok(())
}

#[tokio::test]
async fn runner_ignoring_sigterm_is_killed() -> TestResult {
    init_tracing();
    let sink = MemorySink::new();
    let sup = ProcessSupervisor::new(Arc::new(sink.clone()));
    let run = RunId::new("stubborn");
    let script = "trap '' TERM; echo ready; while true; do sleep 0.1; done";
    let handle = sup.launch(run.clone(), CommandSpec::new("sh").arg("-c").arg(script))?;

    // Wait until the trap is installed.
    with_timeout(async {
        while sink.lines_for(&run).is_empty() {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;

    let outcome = with_timeout(shutdown(&sup, &handle, Duration::from_millis(300))).await?;

    assert_eq!(outcome, ShutdownOutcome::Forced);
    assert_eq!(with_timeout(handle.wait_terminal()).await, ProcessStatus::Exited);
    Ok(())
}

#[tokio::test]
async fn finished_runner_needs_no_shutdown() -> TestResult {
    init_tracing();
    let sup = ProcessSupervisor::new(Arc::new(MemorySink::new()));
    let handle = sup.launch(RunId::new("done"), CommandSpec::new("true"))?;
    with_timeout(handle.wait_terminal()).await;

    let outcome = shutdown(&sup, &handle, Duration::from_millis(100)).await?;

    assert_eq!(outcome, ShutdownOutcome::Graceful);
    Ok(())
}
