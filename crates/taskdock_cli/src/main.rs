//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `taskdock_core` wiring.
//! - Run the lifecycle verifier against a throwaway in-memory store.
//! - Keep output deterministic for quick local sanity checks.

use std::process::ExitCode;
use taskdock_core::db::{close_db, open_db_in_memory};
use taskdock_core::verify::verify_store;

fn main() -> ExitCode {
    println!("taskdock_core ping={}", taskdock_core::ping());
    println!("taskdock_core version={}", taskdock_core::core_version());

    let mut conn = match open_db_in_memory() {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("store open failed: {err}");
            return ExitCode::FAILURE;
        }
    };

    let verdict = verify_store(&mut conn);
    for outcome in &verdict.outcomes {
        let status = if outcome.result.is_ok() { "ok" } else { "failed" };
        println!("kind={} status={status}", outcome.kind);
    }

    if let Err(err) = close_db(conn) {
        eprintln!("store close failed: {err}");
        return ExitCode::FAILURE;
    }

    if verdict.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
