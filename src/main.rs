use std::process::ExitCode;
use std::time::Duration;

use nodem_site::errors::{get_exit_code, EXIT_ERROR};

/// How long the dev server and watcher get to wind down after ctrl-c.
const STOP_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> ExitCode {
    tokio::spawn(stop_on_signal());

    match nodem_site::cli::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:?}", e);
            ExitCode::from(get_exit_code(&e))
        }
    }
}

/// First signal: ask the server, watcher and terminal session to stop.
/// If they are still busy after [`STOP_TIMEOUT`] the process exits anyway.
async fn stop_on_signal() {
    wait_for_signal().await;
    eprintln!("\nStopping nodem-site...");
    nodem_site::request_shutdown();

    tokio::time::sleep(STOP_TIMEOUT).await;
    eprintln!("Tasks did not stop within {}s, exiting.", STOP_TIMEOUT.as_secs());
    std::process::exit(i32::from(EXIT_ERROR));
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let Ok(mut terminate) = signal(SignalKind::terminate()) else {
        let _ = tokio::signal::ctrl_c().await;
        return;
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = terminate.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
