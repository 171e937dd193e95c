//! Lending Engine CLI
//!
//! Replays a CSV log of catalog, cart and checkout commands against a fresh
//! in-memory store and prints the resulting inventory.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- commands.csv > inventory.csv
//! ```
//!
//! # Input
//!
//! Header `type,person,material,quantity,start,end,description[,rename]`.
//! `material`, `edit`, `increase`, `decrease` and `delete` maintain the
//! catalog; `reserve`, `unreserve` and `clear` fill the cart, dated
//! `YYYY-MM-DD`; `checkout` commits the cart for `person`. Rows that fail
//! are logged and skipped.
//!
//! # Output
//!
//! `material,name,description,total,reserved`, one row per material in id
//! order, where `reserved` counts every unit held by a committed reservation.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: `info` shows each checkout status and its messages, `debug`
//!   every catalog change and item decision

use lending_engine::{EngineError, LendingEngine, Result};
use std::env;
use std::fs::File;
use std::io::{self, BufReader};
use std::process;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let input_path = env::args().nth(1).ok_or(EngineError::MissingArgument)?;
    let commands = BufReader::new(File::open(&input_path)?);

    let mut engine = LendingEngine::new();
    engine.process_csv(commands)?;
    engine.write_output(io::stdout().lock())?;

    Ok(())
}
