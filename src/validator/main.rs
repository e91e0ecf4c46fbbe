//! Standalone validator for connector configuration files.
//!
//! Checks that every configured room is a well-formed room id or alias and
//! reports whether an admin room is set.

use std::process::ExitCode;

use clap::Parser;

use invite_bot::config::{ADMIN_ROOM_KEY, ConnectorConfig};
use invite_bot::matrix::RoomRef;

/// Connector configuration validator.
#[derive(Parser, Debug)]
#[command(name = "validate_config")]
#[command(about = "Validates connector configuration files for the invite bot")]
#[command(version)]
struct Args {
    /// Path to the JSON configuration file to validate.
    #[arg(short, long, default_value = "connector.json")]
    file: String,

    /// Generate an example configuration file at the specified path.
    #[arg(long)]
    generate_example: Option<String>,

    /// Show every room entry, not only the failing ones.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Some(output_path) = args.generate_example {
        return generate_example(&output_path);
    }

    validate_config(&args.file, args.verbose)
}

fn generate_example(output_path: &str) -> ExitCode {
    let example = ConnectorConfig::example();

    match example.save_to_file(output_path) {
        Ok(()) => {
            println!("✓ Example configuration written to: {output_path}");
            println!("\nThe file contains {} example rooms.", example.len());
            println!("Set '{ADMIN_ROOM_KEY}' to the room that may send admin commands.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Failed to write example file: {e}");
            ExitCode::FAILURE
        }
    }
}

fn validate_config(path: &str, verbose: bool) -> ExitCode {
    println!("Validating: {path}\n");

    let config = match ConnectorConfig::load_from_file(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("✗ Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let results = config.validate_all();
    let mut errors = 0;

    for ((name, value), result) in config.rooms.iter().zip(&results) {
        if verbose {
            let kind = match RoomRef::parse(value) {
                RoomRef::Id(_) => "id",
                RoomRef::Alias(_) => "alias",
            };
            println!("[{name}] {value} ({kind})");
        }

        match result {
            Ok(()) => {
                if verbose {
                    println!("  ✓ OK");
                }
            }
            Err(e) => {
                errors += 1;
                println!("  ✗ Error: {e}");
            }
        }
    }

    println!();

    let total = config.len();

    if errors > 0 {
        println!("✗ Validation failed: {errors} error(s) in {total} rooms");
        println!("  Valid: {}/{total}", total - errors);
        return ExitCode::FAILURE;
    }

    println!("✓ All {total} rooms are valid!");
    match config.admin_room() {
        Some(room) => println!("  Admin room: {room}"),
        None => println!("  ⚠ Warning: no '{ADMIN_ROOM_KEY}' room, admin commands will be ignored"),
    }

    ExitCode::SUCCESS
}
