//! Command-line probe over the attendance core.
//!
//! # Responsibility
//! - Verify `kitias_core` linkage (`ping`, `version`).
//! - Run read-only provider queries and print their outcome as JSON.
//!
//! Configuration comes from `KITIAS_DB_PATH`, `KITIAS_LOG_LEVEL` and
//! `KITIAS_LOG_DIR`.

use kitias_core::db::open_db;
use kitias_core::{
    AttendanceProvider, CancellationToken, CoreConfig, ProviderResult, SqliteUnitOfWork,
};
use log::info;
use serde::Serialize;
use std::process::ExitCode;
use uuid::Uuid;

const USAGE: &str = "usage: kitias_cli <ping|version|schedulers EMAIL|attendances SCHEDULER_ID|student-attendances SCHEDULER_ID>";

fn main() -> ExitCode {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    match run(&args) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<String, String> {
    let command = args.first().map(String::as_str).unwrap_or("ping");
    match command {
        "ping" => return Ok(format!("kitias_core ping={}", kitias_core::ping())),
        "version" => return Ok(format!("kitias_core version={}", kitias_core::core_version())),
        "schedulers" | "attendances" | "student-attendances" => {}
        _ => return Err(USAGE.to_string()),
    }

    let argument = args.get(1).ok_or_else(|| USAGE.to_string())?;
    let config = CoreConfig::from_env();
    kitias_core::init_from_config(&config)?;
    info!("event=cli_command module=cli status=start command={command}");

    let conn = open_db(&config.db_path).map_err(|err| format!("database open failed: {err}"))?;
    let unit_of_work =
        SqliteUnitOfWork::try_new(&conn).map_err(|err| format!("repository init failed: {err}"))?;
    let mut provider = AttendanceProvider::new(unit_of_work);
    let cancel = CancellationToken::new();

    match command {
        "schedulers" => render(provider.list_teacher_schedulers(argument, &cancel)),
        "attendances" => {
            let scheduler_id = parse_id(argument)?;
            render(provider.list_scheduler_attendances(scheduler_id, &cancel))
        }
        "student-attendances" => {
            let scheduler_id = parse_id(argument)?;
            render(provider.list_scheduler_student_attendances(scheduler_id, &cancel))
        }
        _ => Err(USAGE.to_string()),
    }
}

fn parse_id(value: &str) -> Result<Uuid, String> {
    Uuid::parse_str(value.trim()).map_err(|err| format!("invalid scheduler id `{value}`: {err}"))
}

fn render<T: Serialize>(result: ProviderResult<T>) -> Result<String, String> {
    let outcome = result.map_err(|err| err.to_string())?;
    serde_json::to_string_pretty(&outcome).map_err(|err| format!("output encoding failed: {err}"))
}
