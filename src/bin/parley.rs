/// Parley CLI
///
/// Operates the session lifecycle without a hosting service: initialize turns
/// offline against state files and inspect or reset persisted sessions.
use parley_core::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run_cli().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
