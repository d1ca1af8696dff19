use super::prompts;
use crate::output::{Output, OutputFormat};
use color_eyre::Result;
use comfy_table::{Cell, Table};
use curator_config::{Config, PathManager, TaskCommon};
use owo_colors::OwoColorize;
use serde_json::json;
use std::path::{Path, PathBuf};

pub async fn run_config(cmd: crate::ConfigCommands, paths: PathManager, config_path: PathBuf, output: &Output) -> Result<()> {
    match cmd {
        crate::ConfigCommands::Show { full } => show_config(&config_path, full, output),
        crate::ConfigCommands::Init => run_interactive_config(&paths, &config_path, output),
        crate::ConfigCommands::Validate => validate_config(&config_path, output),
    }
}

fn load(config_path: &Path) -> Result<Config> {
    Config::load_from_file(config_path)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_path.display(), e))
}

fn show_config(config_path: &Path, full: bool, output: &Output) -> Result<()> {
    if !config_path.exists() {
        output.warn(format!("Configuration file not found at: {}", config_path.display()));
        output.info("Run 'curator config init' to create one.");
        return Ok(());
    }
    let config = load(config_path)?;
    let secret = |s: &str| if full { s.to_string() } else { mask_string(s) };

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }

            let mut info_table = Table::new();
            info_table.set_header(vec![
                Cell::new("Config File").add_attribute(comfy_table::Attribute::Bold),
                Cell::new(config_path.display().to_string()),
            ]);
            styled(&mut info_table);
            println!("{}", info_table);
            println!();

            let mut host = section("Host");
            host.add_row(vec![Cell::new("Snapshot"), Cell::new(display_path(config.host.snapshot.as_deref()))]);
            host.add_row(vec![Cell::new("State"), Cell::new(display_path(config.host.state.as_deref()))]);
            host.add_row(vec![
                Cell::new("Webhook"),
                Cell::new(config.notify.webhook_url.as_deref().map(&secret).unwrap_or_else(|| "<log only>".to_string())),
            ]);
            host.add_row(vec![Cell::new("TMDB API Key"), Cell::new(secret(&config.tmdb.api_key))]);
            host.add_row(vec![Cell::new("TMDB Language"), Cell::new(&config.tmdb.language)]);
            println!("{}\n", host);

            let mut cleanup = section("Cleanup");
            add_common_rows(&mut cleanup, &config.cleanup.common, config.cleanup.effective_cron());
            cleanup.add_row(vec![
                Cell::new("Threshold (days)"),
                Cell::new(config.cleanup.threshold_days.map(|d| d.to_string()).unwrap_or_else(|| "<not set>".to_string())),
            ]);
            let users: Vec<String> = config
                .cleanup
                .allow_list_entries()
                .iter()
                .map(|entry| match entry.threshold_days {
                    Some(days) => format!("{} ({}d)", entry.user, days),
                    None => entry.user.clone(),
                })
                .collect();
            cleanup.add_row(vec![Cell::new("Allow-list"), Cell::new(if users.is_empty() { "<empty>".to_string() } else { users.join(", ") })]);
            cleanup.add_row(vec![
                Cell::new("Mode"),
                Cell::new(if config.cleanup.confirm_delete { "delete".red().to_string() } else { "preview".green().to_string() }),
            ]);
            cleanup.add_row(vec![Cell::new("Journal Limit"), Cell::new(config.cleanup.journal_limit)]);
            println!("{}\n", cleanup);

            let mut acquisition = section("Acquisition");
            add_common_rows(&mut acquisition, &config.acquisition.common, config.acquisition.effective_cron());
            acquisition.add_row(vec![Cell::new("API Key"), Cell::new(secret(&config.acquisition.api_key))]);
            acquisition.add_row(vec![Cell::new("Model"), Cell::new(&config.acquisition.model)]);
            acquisition.add_row(vec![
                Cell::new("Extra Prompt"),
                Cell::new(if config.acquisition.prompt.trim().is_empty() { "<none>" } else { config.acquisition.prompt.trim() }),
            ]);
            acquisition.add_row(vec![
                Cell::new("Save Path"),
                Cell::new(config.acquisition.save_path.as_deref().unwrap_or("<host default>")),
            ]);
            acquisition.add_row(vec![Cell::new("Sites"), Cell::new(format!("{:?}", config.acquisition.sites))]);
            acquisition.add_row(vec![Cell::new("Journal Limit"), Cell::new(config.acquisition.journal_limit)]);
            println!("{}\n", acquisition);

            let mut report = section("Report");
            add_common_rows(&mut report, &config.report.common, config.report.effective_cron());
            println!("{}", report);
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            let mut masked = config.clone();
            masked.tmdb.api_key = secret(&config.tmdb.api_key);
            masked.acquisition.api_key = secret(&config.acquisition.api_key);
            masked.notify.webhook_url = config.notify.webhook_url.as_deref().map(&secret);
            output.json(&json!({
                "config_file": config_path.display().to_string(),
                "config": masked,
            }));
        }
    }

    Ok(())
}

fn validate_config(config_path: &Path, output: &Output) -> Result<()> {
    let config = load(config_path)?;
    config
        .validate()
        .map_err(|e| color_eyre::eyre::eyre!("Configuration validation failed: {}", e))?;

    let schedules = [
        ("cleanup", config.cleanup.common.enabled, config.cleanup.effective_cron()),
        ("acquisition", config.acquisition.common.enabled, config.acquisition.effective_cron()),
        ("report", config.report.common.enabled, config.report.effective_cron()),
    ];
    for (task, enabled, (cron, is_default)) in schedules {
        output.info(format!(
            "{:<12} {:<8} {}{}",
            task,
            if enabled { "enabled" } else { "disabled" },
            cron,
            if is_default { " (default)" } else { "" }
        ));
    }
    output.success(format!("{} is valid", config_path.display()));
    Ok(())
}

fn run_interactive_config(paths: &PathManager, config_path: &Path, output: &Output) -> Result<()> {
    let mut config = if config_path.exists() {
        load(config_path)?
    } else {
        output.info("Starting interactive configuration wizard...");
        Config::default()
    };

    print_section_header("Host", output);
    let snapshot_default = config
        .host
        .snapshot
        .clone()
        .unwrap_or_else(|| paths.host_snapshot_file());
    let snapshot = prompts::prompt_string("Host snapshot file", Some(&snapshot_default.display().to_string()))?;
    config.host.snapshot = Some(PathBuf::from(snapshot.trim()));
    config.tmdb.api_key = prompts::prompt_secret("TMDB API key (leave empty to keep current)", &config.tmdb.api_key)?;
    let webhook = prompts::prompt_string(
        "Notification webhook URL (empty = log only)",
        config.notify.webhook_url.as_deref(),
    )?;
    config.notify.webhook_url = Some(webhook.trim().to_string()).filter(|url| !url.is_empty());

    print_section_header("Cleanup", output);
    config.cleanup.common.enabled = prompts::prompt_yes_no_with_output(
        "Enable history cleanup?",
        Some(config.cleanup.common.enabled),
        Some(output),
    )?;
    if config.cleanup.common.enabled {
        output.println("Allow-list: comma separated users, 'name:days' overrides the threshold for that user.");
        let current = config
            .cleanup
            .allow_list_entries()
            .iter()
            .map(|entry| match entry.threshold_days {
                Some(days) => format!("{}:{}", entry.user, days),
                None => entry.user.clone(),
            })
            .collect::<Vec<_>>()
            .join(",");
        let users = prompts::prompt_string("Allow-listed users", Some(&current))?;
        config.cleanup.allow_list = users
            .split(',')
            .map(str::trim)
            .filter(|user| !user.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        config.cleanup.threshold_days = prompts::prompt_optional_number(
            "Delete records older than (days, empty = per-user only)",
            config.cleanup.threshold_days,
            output,
        )?;
        config.cleanup.confirm_delete = prompts::prompt_yes_no_with_output(
            "Actually delete files and records? (no = preview only)",
            Some(config.cleanup.confirm_delete),
            Some(output),
        )?;
        config.cleanup.common.notify =
            prompts::prompt_yes_no_with_output("Notify after each run?", Some(config.cleanup.common.notify), Some(output))?;
    }

    print_section_header("Acquisition", output);
    config.acquisition.common.enabled = prompts::prompt_yes_no_with_output(
        "Enable recommendation-driven subscriptions?",
        Some(config.acquisition.common.enabled),
        Some(output),
    )?;
    if config.acquisition.common.enabled {
        config.acquisition.api_key =
            prompts::prompt_secret("Gemini API key (leave empty to keep current)", &config.acquisition.api_key)?;
        config.acquisition.model = prompts::prompt_string("Gemini model", Some(&config.acquisition.model))?
            .trim()
            .to_string();
        config.acquisition.prompt =
            prompts::prompt_string("Extra prompt requirements (optional)", Some(&config.acquisition.prompt))?;
        config.acquisition.common.notify = prompts::prompt_yes_no_with_output(
            "Notify when subscriptions are added?",
            Some(config.acquisition.common.notify),
            Some(output),
        )?;
    }

    config
        .validate()
        .map_err(|e| color_eyre::eyre::eyre!("Configuration validation failed: {}", e))?;
    paths
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create configuration directories: {}", e))?;
    config
        .save_to_file(config_path)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save config to {}: {}", config_path.display(), e))?;
    output.success(format!("Configuration saved to {}", config_path.display()));
    Ok(())
}

fn section(title: &str) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new(title).fg(comfy_table::Color::Cyan).add_attribute(comfy_table::Attribute::Bold),
    ]);
    styled(&mut table);
    table
}

fn styled(table: &mut Table) {
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
}

fn add_common_rows(table: &mut Table, common: &TaskCommon, (cron, is_default): (String, bool)) {
    table.add_row(vec![Cell::new("Enabled"), Cell::new(check(common.enabled))]);
    table.add_row(vec![Cell::new("Notify"), Cell::new(check(common.notify))]);
    table.add_row(vec![
        Cell::new("Schedule"),
        Cell::new(if is_default { format!("{} (default)", cron) } else { cron }),
    ]);
    if common.run_once {
        table.add_row(vec![Cell::new("Run Once"), Cell::new("pending".yellow().to_string())]);
    }
}

fn check(value: bool) -> String {
    if value {
        "✓".green().to_string()
    } else {
        "✗".red().to_string()
    }
}

fn display_path(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string()).unwrap_or_else(|| "<data dir default>".to_string())
}

fn print_section_header(title: &str, output: &Output) {
    output.println("");
    output.println(format!("{}", title.bold().bright_cyan()));
    output.println(format!("{}", "─".repeat(title.len()).bright_cyan()));
}

fn mask_string(s: &str) -> String {
    if s.is_empty() {
        return "<not set>".to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}
