pub mod config;
pub mod allow_list;
pub mod schedule;
pub mod state;
pub mod paths;

pub use config::{AcquisitionConfig, CleanupConfig, Config, HostConfig, NotifyConfig, ReportConfig, TaskCommon, TmdbConfig};
pub use allow_list::parse_allow_list;
pub use schedule::{normalize_cron, DEFAULT_ACQUISITION_CRON, DEFAULT_CLEANUP_CRON, DEFAULT_REPORT_CRON};
pub use state::StateStore;
pub use paths::{PathManager, container_base_path};
