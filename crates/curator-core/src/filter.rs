use chrono::{DateTime, Duration, Utc};
use curator_models::{AllowListEntry, HistoryRecord};
use std::collections::HashMap;
use tracing::warn;

pub use curator_models::parse_completed_at;

/// Records selected for cleanup plus the ones whose timestamp could not be read
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    pub eligible: Vec<HistoryRecord>,
    pub unparseable: usize,
}

/// True when the allow-list can select anything at all: it is non-empty and
/// at least one threshold (global or per-user) exists
pub fn has_filter_inputs(allow_list: &[AllowListEntry], global_threshold: Option<u32>) -> bool {
    !allow_list.is_empty()
        && (global_threshold.is_some() || allow_list.iter().any(|entry| entry.threshold_days.is_some()))
}

/// Select records owned by an allow-listed user and strictly older than that
/// user's effective threshold
///
/// Returns nothing when [`has_filter_inputs`] is false. A user with neither an
/// override nor a global threshold is never selected.
pub fn select_eligible(
    records: &[HistoryRecord],
    allow_list: &[AllowListEntry],
    global_threshold: Option<u32>,
    now: DateTime<Utc>,
) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();
    if !has_filter_inputs(allow_list, global_threshold) {
        return outcome;
    }

    let thresholds: HashMap<&str, Option<u32>> = allow_list
        .iter()
        .map(|entry| (entry.user.as_str(), entry.effective_threshold(global_threshold)))
        .collect();

    for record in records {
        let Some(threshold) = record.username.as_deref().and_then(|user| thresholds.get(user).copied().flatten())
        else {
            continue;
        };

        let Some(completed_at) = record.completed_at_utc() else {
            warn!(
                operation = "eligibility_filter",
                record_id = record.id,
                completed_at = %record.completed_at,
                "Unparseable completion time, skipping record"
            );
            outcome.unparseable += 1;
            continue;
        };

        if now - completed_at > Duration::days(i64::from(threshold)) {
            outcome.eligible.push(record.clone());
        }
    }

    outcome
}
