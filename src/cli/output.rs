//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.  Commands that write message
//! content to stdout report status on stderr (`notice`) so the content
//! stream stays clean for pipes.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::config::Settings;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a blue info message on stderr.
pub fn notice(msg: &str) {
    eprintln!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint on stderr: "arrow {msg}"
pub fn tip(msg: &str) {
    eprintln!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print the effective settings as a two-column table.
pub fn print_settings_table(settings: &Settings) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Setting", "Value"]);

    let default_ttl = settings
        .default_ttl_seconds
        .map_or_else(|| "none".to_string(), |s| format!("{s}s"));
    let sweep = settings
        .sweep_interval()
        .map_or_else(|| "disabled".to_string(), |d| format!("{}s", d.as_secs()));

    let rows = [
        ("bind_address", settings.bind_address.clone()),
        ("server_address", settings.server_address.clone()),
        ("max_payload_bytes", settings.max_payload_bytes.to_string()),
        ("max_ttl_seconds", settings.max_ttl_seconds.to_string()),
        ("default_ttl", default_ttl),
        ("sweep_interval", sweep),
        ("max_connections", settings.max_connections.to_string()),
        ("argon2_memory_kib", settings.argon2_memory_kib.to_string()),
        ("argon2_iterations", settings.argon2_iterations.to_string()),
        ("argon2_parallelism", settings.argon2_parallelism.to_string()),
        ("log_level", settings.log_level.clone()),
    ];
    for (name, value) in rows {
        table.add_row(vec![name.to_string(), value]);
    }

    println!("{table}");
}
