//! Output formatting utilities.

use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use crate::config::OutputFormat;

/// Prints a success message.
pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Prints an error message.
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Prints a warning message.
pub fn warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

/// Prints an info message.
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Outputs data in the specified format.
pub fn output<T: Tabled + serde::Serialize>(
    data: &[T],
    format: OutputFormat,
) -> crate::CliResult<()> {
    match format {
        OutputFormat::Table => {
            if data.is_empty() {
                info("No results found.");
            } else {
                let table = Table::new(data).with(Style::rounded()).to_string();
                println!("{table}");
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(data)?;
            println!("{json}");
        }
        OutputFormat::Quiet => {}
    }
    Ok(())
}

/// Outputs a single item.
pub fn output_single<T: serde::Serialize>(item: &T, format: OutputFormat) -> crate::CliResult<()> {
    match format {
        OutputFormat::Table => {
            let json = serde_json::to_value(item)?;
            print_fields(&json);
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(item)?;
            println!("{json}");
        }
        OutputFormat::Quiet => {}
    }
    Ok(())
}

/// Prints the top-level fields of a JSON object as `key: value` lines.
fn print_fields(value: &serde_json::Value) {
    let serde_json::Value::Object(map) = value else {
        println!("{value}");
        return;
    };

    for (key, val) in map {
        match val {
            serde_json::Value::String(s) => println!("{}: {s}", key.bold()),
            serde_json::Value::Null => println!("{}: -", key.bold()),
            other => println!("{}: {other}", key.bold()),
        }
    }
}

/// Prompts for password input (hidden).
pub fn prompt_password(prompt: &str) -> crate::CliResult<String> {
    rpassword::prompt_password(prompt).map_err(crate::CliError::Io)
}
