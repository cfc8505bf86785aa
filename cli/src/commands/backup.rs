use std::path::Path;

use anyhow::{Context, Result};

use vital_core::models::BackupData;
use vital_core::service::Tracker;

pub(crate) fn cmd_export(tracker: &Tracker, output: &str, json: bool) -> Result<()> {
    let backup = tracker.export_backup()?;
    let raw = serde_json::to_string_pretty(&backup)?;
    std::fs::write(Path::new(output), raw)
        .with_context(|| format!("Could not write backup to '{output}'"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&backup.metadata)?);
    } else {
        println!(
            "Exported {} entries across {} keys to {output}",
            backup.metadata.entry_count,
            backup.entries.len()
        );
    }
    Ok(())
}

pub(crate) fn cmd_import(tracker: &mut Tracker, input: &str, yes: bool, json: bool) -> Result<()> {
    let raw = std::fs::read_to_string(Path::new(input))
        .with_context(|| format!("Could not read backup from '{input}'"))?;
    let backup: BackupData =
        serde_json::from_str(&raw).with_context(|| format!("'{input}' is not a valid backup"))?;

    if !yes {
        anyhow::bail!(
            "Import replaces ALL existing data (backup from {}, {} entries). \
             Re-run with --yes to proceed",
            backup.metadata.timestamp,
            backup.metadata.entry_count
        );
    }

    let summary = tracker.import_backup(&backup)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else if summary.keys_restored == 0 {
        println!("Backup carried no data for this app; nothing changed.");
    } else {
        println!(
            "Restored {} entries across {} keys from {input}",
            summary.entries_restored, summary.keys_restored
        );
    }
    Ok(())
}
