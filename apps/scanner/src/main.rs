//! # Greenbill Scanner Console
//!
//! Headless host for the scanner library: reads one command per line from
//! stdin, prints each response as JSON, and logs every bill view through
//! `LogPresenter`. A hardware barcode scanner in keyboard mode can feed it
//! directly (a bare barcode line is a scan).
//!
//! ## Usage
//! ```text
//! greenbill-scanner [--config <path>]
//!
//! start                 start a new bill
//! 5901234123457         scan a barcode (same as `scan <barcode>`)
//! qty <barcode> <delta> change a quantity (+1 / -1 / …)
//! rm <barcode>          remove an item
//! clear                 empty the bill
//! end                   end the bill and show results
//! save                  archive the ended bill
//! export                write the bill as JSON
//! history [limit]       list saved bills
//! show | config | help | quit
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

use greenbill_scanner::commands::{archive, bill, config, scan};
use greenbill_scanner::error::ApiError;
use greenbill_scanner::presenter::LogPresenter;
use greenbill_scanner::state::ConfigState;
use greenbill_scanner::{bootstrap, init_tracing, AppContext};

const HELP: &str = "commands: start | <barcode> | scan <barcode> | qty <barcode> <delta> | \
rm <barcode> | clear | end | save | export | history [limit] | show | config | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Start,
    Show,
    Scan(String),
    Quantity(String, i64),
    Remove(String),
    Clear,
    End,
    Save,
    Export,
    History(Option<u32>),
    Config,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Err("empty line".into());
        };
        let args: Vec<&str> = words.collect();

        let command = match (head, args.as_slice()) {
            ("start", []) => Command::Start,
            ("show", []) => Command::Show,
            ("scan", [barcode]) => Command::Scan(barcode.to_string()),
            ("qty", [barcode, delta]) => {
                let delta = delta
                    .parse()
                    .map_err(|_| format!("delta must be an integer, got '{}'", delta))?;
                Command::Quantity(barcode.to_string(), delta)
            }
            ("rm", [barcode]) => Command::Remove(barcode.to_string()),
            ("clear", []) => Command::Clear,
            ("end", []) => Command::End,
            ("save", []) => Command::Save,
            ("export", []) => Command::Export,
            ("history", []) => Command::History(None),
            ("history", [limit]) => Command::History(Some(
                limit
                    .parse()
                    .map_err(|_| format!("limit must be a positive integer, got '{}'", limit))?,
            )),
            ("config", []) => Command::Config,
            ("help", []) => Command::Help,
            ("quit" | "exit", []) => Command::Quit,
            (barcode, []) if barcode.chars().all(|c| c.is_ascii_alphanumeric()) => {
                Command::Scan(barcode.to_string())
            }
            _ => return Err(format!("unrecognised command: {}", line.trim())),
        };

        Ok(command)
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::internal(e.to_string()))
}

async fn dispatch(ctx: &AppContext, command: Command) -> Result<serde_json::Value, ApiError> {
    match command {
        Command::Start => to_json(&bill::start_bill(&ctx.bill)?),
        Command::Show => to_json(&bill::get_bill(&ctx.bill)?),
        Command::Scan(barcode) => {
            to_json(&scan::scan_barcode(&ctx.bill, ctx.catalog.as_ref(), barcode).await?)
        }
        Command::Quantity(barcode, delta) => {
            to_json(&bill::update_quantity(&ctx.bill, barcode, delta)?)
        }
        Command::Remove(barcode) => to_json(&bill::remove_item(&ctx.bill, barcode)?),
        Command::Clear => to_json(&bill::clear_bill(&ctx.bill)?),
        Command::End => to_json(&bill::end_bill(&ctx.bill)?),
        Command::Save => to_json(&archive::save_bill(&ctx.bill, &ctx.db).await?),
        Command::Export => to_json(&archive::export_bill(&ctx.bill, &ctx.config).await?),
        Command::History(limit) => {
            to_json(&archive::list_saved_bills(&ctx.db, &ctx.config, limit).await?)
        }
        Command::Config => to_json(&config::get_config(&ctx.config)),
        Command::Help => Ok(serde_json::Value::String(HELP.to_string())),
        Command::Quit => Ok(serde_json::Value::Null),
    }
}

fn config_path_arg() -> Result<Option<PathBuf>, String> {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        None => Ok(None),
        Some("--config") => args
            .next()
            .map(|p| Some(PathBuf::from(p)))
            .ok_or_else(|| "--config requires a path".to_string()),
        Some(other) => Err(format!("unknown argument: {}", other)),
    }
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => error!("Cannot print response: {}", e),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let config_path = match config_path_arg() {
        Ok(path) => path,
        Err(e) => {
            eprintln!("{}\nusage: greenbill-scanner [--config <path>]", e);
            return ExitCode::FAILURE;
        }
    };

    let config = ConfigState::load_or_default(config_path);
    let ctx = match bootstrap(config, Arc::new(LogPresenter)).await {
        Ok(ctx) => ctx,
        Err(e) => {
            error!(code = ?e.code, "Startup failed: {}", e.message);
            return ExitCode::FAILURE;
        }
    };

    info!("Greenbill scanner ready; type `help` for commands");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!("Failed to read stdin: {}", e);
                return ExitCode::FAILURE;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                print_json(&serde_json::json!({ "code": "VALIDATION_ERROR", "message": e }));
                continue;
            }
        };

        if command == Command::Quit {
            break;
        }

        match dispatch(&ctx, command).await {
            Ok(value) => print_json(&value),
            Err(e) => match to_json(&e) {
                Ok(value) => print_json(&value),
                Err(_) => error!("{}", e),
            },
        }
    }

    ctx.db.inner().close().await;
    info!("Scanner stopped");
    ExitCode::SUCCESS
}
