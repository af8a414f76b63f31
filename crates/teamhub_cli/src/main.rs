//! CLI status probe.
//!
//! # Responsibility
//! - Load `TEAMHUB_*` configuration, start logging and open the store.
//! - Print one line per table with its row count.

use log::error;
use std::process::ExitCode;
use teamhub_core::remote::{Query, Table};
use teamhub_core::{core_version, ClientConfig, RemoteStore};

fn main() -> ExitCode {
    let config = ClientConfig::from_env();
    match config.init_logging() {
        Ok(true) => {}
        Ok(false) => eprintln!("teamhub logging=off"),
        Err(err) => eprintln!("teamhub logging=error error={err}"),
    }

    println!("teamhub_core version={}", core_version());
    let backend = config
        .db_path
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| ":memory:".to_string());
    println!("teamhub store={backend}");

    let remote = match config.open_remote() {
        Ok(remote) => remote,
        Err(err) => {
            error!("event=cli_status module=cli status=error error={err}");
            eprintln!("teamhub store=error error={err}");
            return ExitCode::FAILURE;
        }
    };

    for table in Table::ALL {
        match remote.select(&Query::table(table)) {
            Ok(rows) => println!("teamhub table={table} rows={}", rows.len()),
            Err(err) => {
                error!("event=cli_status module=cli status=error table={table} error={err}");
                eprintln!("teamhub table={table} status=error error={err}");
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
