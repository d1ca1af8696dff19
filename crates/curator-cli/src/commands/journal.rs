use super::prompts;
use super::AppContext;
use crate::output::{Output, OutputFormat};
use crate::JournalName;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use curator_core::{Journal, ACQUISITION_JOURNAL_KEY, CLEANUP_JOURNAL_KEY};
use curator_models::JournalEntry;
use owo_colors::OwoColorize;
use serde_json::json;

pub async fn run_journal(
    name: JournalName,
    limit: Option<usize>,
    clear: bool,
    yes: bool,
    ctx: &AppContext,
    output: &Output,
) -> Result<()> {
    let collaborators = ctx.collaborators()?;
    let (key, cap, detail_label) = match name {
        JournalName::Cleanup => (CLEANUP_JOURNAL_KEY, ctx.config.cleanup.journal_limit, "User"),
        JournalName::Acquisition => (ACQUISITION_JOURNAL_KEY, ctx.config.acquisition.journal_limit, "Year"),
    };
    let journal = Journal::new(collaborators.state.clone(), key, cap);

    if clear {
        if !yes && !prompts::prompt_yes_no_with_output(&format!("Clear the {} journal?", key), Some(false), Some(output))? {
            output.info("Journal left unchanged.");
            return Ok(());
        }
        journal
            .clear()
            .await
            .map_err(|e| color_eyre::eyre::eyre!("Failed to clear journal: {}", e))?;
        output.success(format!("Cleared {}", key));
        return Ok(());
    }

    let entries = journal
        .recent(limit.unwrap_or(cap))
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to read journal: {}", e))?;

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }
            if entries.is_empty() {
                println!("{}", format!("{} is empty", key).bright_black());
                return Ok(());
            }
            println!("{}", render_table(&entries, detail_label));
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({ "journal": key, "entries": entries }));
        }
    }
    Ok(())
}

fn render_table(entries: &[JournalEntry], detail_label: &str) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Time (UTC)").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Title").add_attribute(comfy_table::Attribute::Bold),
        Cell::new(detail_label).add_attribute(comfy_table::Attribute::Bold),
    ]);
    for entry in entries {
        table.add_row(vec![
            Cell::new(entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()),
            Cell::new(&entry.title),
            Cell::new(&entry.detail),
        ]);
    }
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}
