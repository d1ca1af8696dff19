use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use curator_models::AllowListEntry;
use crate::allow_list::parse_allow_list;
use crate::schedule::{
    is_plausible_cron, normalize_cron, DEFAULT_ACQUISITION_CRON, DEFAULT_CLEANUP_CRON, DEFAULT_REPORT_CRON,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub host: HostConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub tmdb: TmdbConfig,
    #[serde(default)]
    pub cleanup: CleanupConfig,
    #[serde(default)]
    pub acquisition: AcquisitionConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Where the host's data lives on disk
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostConfig {
    /// JSON snapshot of the host database (history, downloads, transfers,
    /// subscriptions, library)
    #[serde(default)]
    pub snapshot: Option<PathBuf>,
    /// Key-value state file holding the journals
    #[serde(default)]
    pub state: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Summaries are POSTed here as JSON when set; otherwise they only go to the log
    #[serde(default)]
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_tmdb_language")]
    pub language: String,
    #[serde(default = "default_tmdb_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            language: default_tmdb_language(),
            request_timeout_secs: default_tmdb_timeout(),
        }
    }
}

/// Switches every task shares
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskCommon {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub notify: bool,
    /// Empty or absent means the task's built-in schedule
    #[serde(default)]
    pub cron: Option<String>,
    /// Run once at the next daemon start, then cleared
    #[serde(default)]
    pub run_once: bool,
}

impl TaskCommon {
    /// Seconds-first cron expression and whether it is the built-in default
    pub fn effective_cron(&self, default: &str) -> (String, bool) {
        match self.cron.as_deref().and_then(normalize_cron) {
            Some(expr) => (expr, false),
            None => (default.to_string(), true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupConfig {
    #[serde(flatten)]
    pub common: TaskCommon,
    /// Global age threshold in days
    #[serde(default)]
    pub threshold_days: Option<u32>,
    /// Newline-delimited user identifiers, `name:days` to override the threshold
    #[serde(default)]
    pub allow_list: String,
    /// Without this the task only previews what it would delete
    #[serde(default)]
    pub confirm_delete: bool,
    #[serde(default = "default_cleanup_journal_limit")]
    pub journal_limit: usize,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            common: TaskCommon::default(),
            threshold_days: None,
            allow_list: String::new(),
            confirm_delete: false,
            journal_limit: default_cleanup_journal_limit(),
        }
    }
}

impl CleanupConfig {
    pub fn allow_list_entries(&self) -> Vec<AllowListEntry> {
        parse_allow_list(&self.allow_list)
    }

    pub fn effective_cron(&self) -> (String, bool) {
        self.common.effective_cron(DEFAULT_CLEANUP_CRON)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcquisitionConfig {
    #[serde(flatten)]
    pub common: TaskCommon,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Extra requirements appended to the built-in prompt
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub save_path: Option<String>,
    #[serde(default)]
    pub sites: Vec<u32>,
    #[serde(default = "default_acquisition_journal_limit")]
    pub journal_limit: usize,
    #[serde(default = "default_recommender_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            common: TaskCommon::default(),
            api_key: String::new(),
            model: default_model(),
            prompt: String::new(),
            save_path: None,
            sites: Vec::new(),
            journal_limit: default_acquisition_journal_limit(),
            request_timeout_secs: default_recommender_timeout(),
        }
    }
}

impl AcquisitionConfig {
    pub fn effective_cron(&self) -> (String, bool) {
        self.common.effective_cron(DEFAULT_ACQUISITION_CRON)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(flatten)]
    pub common: TaskCommon,
}

impl ReportConfig {
    pub fn effective_cron(&self) -> (String, bool) {
        self.common.effective_cron(DEFAULT_REPORT_CRON)
    }
}

fn default_tmdb_language() -> String {
    "zh-CN".to_string()
}

fn default_tmdb_timeout() -> u64 {
    30
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_cleanup_journal_limit() -> usize {
    1000
}

fn default_acquisition_journal_limit() -> usize {
    200
}

fn default_recommender_timeout() -> u64 {
    60
}

impl Config {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Structural checks only; missing filter inputs are reported by the
    /// tasks themselves when they run
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.cleanup.journal_limit == 0 {
            return Err(anyhow::anyhow!("cleanup.journal_limit must be greater than zero"));
        }
        if self.acquisition.journal_limit == 0 {
            return Err(anyhow::anyhow!("acquisition.journal_limit must be greater than zero"));
        }

        let crons = [
            ("cleanup", &self.cleanup.common.cron),
            ("acquisition", &self.acquisition.common.cron),
            ("report", &self.report.common.cron),
        ];
        for (task, cron) in crons {
            if let Some(expr) = cron {
                if !is_plausible_cron(expr) {
                    return Err(anyhow::anyhow!("Invalid cron expression for {}: '{}'", task, expr));
                }
            }
        }

        if self.acquisition.request_timeout_secs == 0 || self.tmdb.request_timeout_secs == 0 {
            return Err(anyhow::anyhow!("request timeouts must be greater than zero"));
        }

        Ok(())
    }

    /// Clear the one-shot flag of a task; returns true when something changed
    pub fn clear_run_once(&mut self, task: &str) -> bool {
        let common = match task {
            "cleanup" => &mut self.cleanup.common,
            "acquisition" => &mut self.acquisition.common,
            "report" => &mut self.report.common,
            _ => return false,
        };
        let was_set = common.run_once;
        common.run_once = false;
        was_set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let mut config = Config::default();
        config.cleanup.common.enabled = true;
        config.cleanup.threshold_days = Some(30);
        config.cleanup.allow_list = "alice\nbob:7".to_string();
        config.acquisition.api_key = "secret".to_string();
        config.acquisition.sites = vec![1, 3];

        let path = file.path().to_path_buf();
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert!(loaded.cleanup.common.enabled);
        assert_eq!(loaded.cleanup.threshold_days, Some(30));
        assert_eq!(loaded.cleanup.allow_list_entries().len(), 2);
        assert_eq!(loaded.acquisition.api_key, "secret");
        assert_eq!(loaded.acquisition.sites, vec![1, 3]);
        assert!(!loaded.cleanup.confirm_delete);
    }

    #[test]
    fn test_defaults_from_minimal_toml() {
        let config: Config = toml::from_str("[cleanup]\nenabled = true\n").unwrap();
        assert!(config.cleanup.common.enabled);
        assert!(!config.cleanup.confirm_delete);
        assert_eq!(config.cleanup.journal_limit, 1000);
        assert_eq!(config.acquisition.journal_limit, 200);
        assert_eq!(config.acquisition.model, "gemini-1.5-flash");
        assert_eq!(config.acquisition.request_timeout_secs, 60);
        assert!(!config.acquisition.common.enabled);
    }

    #[test]
    fn test_effective_cron() {
        let mut config = Config::default();
        assert_eq!(config.cleanup.effective_cron(), (DEFAULT_CLEANUP_CRON.to_string(), true));

        config.cleanup.common.cron = Some("".to_string());
        assert_eq!(config.cleanup.effective_cron(), (DEFAULT_CLEANUP_CRON.to_string(), true));

        config.cleanup.common.cron = Some("15 4 * * *".to_string());
        assert_eq!(config.cleanup.effective_cron(), ("0 15 4 * * *".to_string(), false));
    }

    #[test]
    fn test_config_validate() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.report.common.cron = Some("whenever".to_string());
        assert!(config.validate().is_err());

        config.report.common.cron = None;
        config.cleanup.journal_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_clear_run_once() {
        let mut config = Config::default();
        config.acquisition.common.run_once = true;
        assert!(config.clear_run_once("acquisition"));
        assert!(!config.acquisition.common.run_once);
        assert!(!config.clear_run_once("acquisition"));
        assert!(!config.clear_run_once("unknown"));
    }
}
