//! Executes a parsed [`CliAction`] against files on disk.
//!
//! Every command returns its exit code; anything that stops a command before
//! it can produce a result is an `Err` carrying the message to print.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use fieldsnap_core::SnapshotDocument;
use fieldsnap_engine::{
    export_filename, ExportSelection, Exporter, Hooks, Importer, SnapshotConfig,
};
use fieldsnap_storage::MemorySite;
use tracing::info;

use crate::format::{format_import_summary, format_log, OutputMode};
use crate::parse::CliAction;

/// Run `action`, writing user-facing output to `out`.
pub fn execute(action: CliAction, mode: OutputMode, out: &mut dyn Write) -> Result<i32, String> {
    match action {
        CliAction::Import {
            file,
            site,
            config,
            no_rollback,
        } => run_import(&file, &site, &config, no_rollback, mode, out),
        CliAction::Export {
            site,
            config,
            selection,
            output,
        } => run_export(&site, &config, &selection, output.as_deref(), out),
        CliAction::Validate { file } => run_validate(&file, out),
        CliAction::InitConfig { path } => run_init_config(&path, out),
    }
}

/// Read a snapshot file and check its structure.
fn read_snapshot(file: &Path) -> Result<SnapshotDocument, String> {
    let is_json = file
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));
    if !is_json {
        return Err("Please upload a JSON file".to_string());
    }

    let text = std::fs::read_to_string(file)
        .map_err(|e| format!("Failed to read '{}': {}", file.display(), e))?;
    serde_json::from_str::<serde_json::Value>(&text)
        .map_err(|_| "The uploaded file is not a valid JSON.".to_string())?;

    let document = SnapshotDocument::from_json(&text)
        .map_err(|_| "The uploaded file has an invalid JSON structure.".to_string())?;
    document
        .validate_structure()
        .map_err(|_| "The uploaded file has an invalid JSON structure.".to_string())?;
    Ok(document)
}

fn load_site(path: &Path) -> Result<MemorySite, String> {
    MemorySite::load(path).map_err(|e| format!("Failed to load site '{}': {}", path.display(), e))
}

fn load_config(path: &Path) -> Result<SnapshotConfig, String> {
    SnapshotConfig::load_or_default(path).map_err(|e| e.to_string())
}

fn write_line(out: &mut dyn Write, line: &str) -> Result<(), String> {
    writeln!(out, "{}", line).map_err(|e| format!("Failed to write output: {}", e))
}

fn run_import(
    file: &Path,
    site_path: &Path,
    config_path: &Path,
    no_rollback: bool,
    mode: OutputMode,
    out: &mut dyn Write,
) -> Result<i32, String> {
    let document = read_snapshot(file)?;
    let config = load_config(config_path)?;
    let site = load_site(site_path)?;

    let rollback = config.rollback_on_failure && !no_rollback;
    let hooks = Hooks::new();
    let outcome = Importer::for_site(&site, &hooks).import_document(&document, rollback);

    site.save(site_path)
        .map_err(|e| format!("Failed to save site '{}': {}", site_path.display(), e))?;
    info!(
        target: "fieldsnap::import",
        success = outcome.success,
        written = outcome.stats.written,
        site = %site_path.display(),
        "Saved site after import"
    );

    if config.event_logging {
        write_line(out, &format_log(&outcome.log, mode))?;
    }
    write_line(out, &format_import_summary(&outcome, config.event_logging))?;
    Ok(if outcome.success { 0 } else { 1 })
}

fn run_export(
    site_path: &Path,
    config_path: &Path,
    selection: &ExportSelection,
    output: Option<&Path>,
    out: &mut dyn Write,
) -> Result<i32, String> {
    selection.validate().map_err(|e| match e {
        fieldsnap_core::Error::InvalidInput(message) => message,
        other => other.to_string(),
    })?;
    let config = load_config(config_path)?;
    let site = load_site(site_path)?;

    let hooks = Hooks::new();
    let document = Exporter::for_site(&site, &hooks).export(selection);
    if document.is_empty() {
        return Err("No data to export for the selected field groups and post types, taxonomies, options, users, or comments.".to_string());
    }

    let json = if config.export.pretty {
        document.to_json_pretty()
    } else {
        document.to_json()
    }
    .map_err(|e| e.to_string())?;

    let path = match output {
        Some(path) => path.to_path_buf(),
        None => default_export_path(&config.export.filename_prefix),
    };
    std::fs::write(&path, json)
        .map_err(|e| format!("Failed to write '{}': {}", path.display(), e))?;

    write_line(
        out,
        &format!(
            "Exported {} group(s) to {}",
            document.len(),
            path.display()
        ),
    )?;
    Ok(0)
}

/// Export file name for today, dated in UTC.
fn default_export_path(prefix: &str) -> PathBuf {
    export_filename(prefix, Utc::now().date_naive()).into()
}

fn run_validate(file: &Path, out: &mut dyn Write) -> Result<i32, String> {
    let document = read_snapshot(file)?;
    write_line(
        out,
        &format!("Valid snapshot: {} group(s)", document.len()),
    )?;
    Ok(0)
}

fn run_init_config(path: &Path, out: &mut dyn Write) -> Result<i32, String> {
    let existed = path.exists();
    SnapshotConfig::write_default_if_missing(path).map_err(|e| e.to_string())?;
    let message = if existed {
        format!("Config already exists at {}", path.display())
    } else {
        format!("Wrote default config to {}", path.display())
    };
    write_line(out, &message)?;
    Ok(0)
}
