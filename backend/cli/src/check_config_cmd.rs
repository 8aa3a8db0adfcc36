//! CLI Check Config Command
//!
//! Config loading already failed hard on validation errors; this prints the
//! warnings and the effective config with secrets masked.

use anyhow::Result;
use statusgate_config::{collect_redacted_paths, redacted_view, validate, StatusGateConfig};
use statusgate_dashboard::terminal_output::{note_info, note_success, note_warn};

pub fn run(config: &StatusGateConfig) -> Result<()> {
    let report = validate(config);
    for warning in &report.warnings {
        note_warn(&format!("{}: {}", warning.path, warning.message));
    }

    let view = redacted_view(config);
    let masked = collect_redacted_paths(&serde_json::to_value(config)?);
    if !masked.is_empty() {
        note_info(&format!("Masked: {}", masked.join(", ")));
    }
    println!("{}", serde_json::to_string_pretty(&view)?);

    note_success(&format!(
        "Configuration is valid ({:?}, {} warning(s))",
        config.environment,
        report.warnings.len()
    ));
    Ok(())
}
