//! rgup - keep a local ripgrep checkout synced with upstream and rebuilt.
//!
//! This binary runs once per invocation: it verifies the environment, pulls
//! upstream changes and toolchain updates, and rebuilds/tests/strips the
//! release binary only when something actually changed.

use rgup::cli;
use rgup::cli::OutputManager;
use std::process;

#[tokio::main]
async fn main() {
    env_logger::init();

    match cli::run().await {
        Ok(exit_code) => {
            process::exit(exit_code);
        }
        Err(e) => {
            // Never quiet for fatal errors
            let output = OutputManager::new(1);
            output.error(&format!("Fatal error: {e}"));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() {
                let _ = output.println("\nRecovery suggestions:");
                for suggestion in suggestions {
                    let _ = output.indent(&suggestion);
                }
            }

            process::exit(e.exit_code());
        }
    }
}
