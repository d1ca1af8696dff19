/// Daily at 03:00
pub const DEFAULT_CLEANUP_CRON: &str = "0 0 3 * * *";
/// Fridays at 20:00
pub const DEFAULT_ACQUISITION_CRON: &str = "0 0 20 * * Fri";
/// Daily at 03:30
pub const DEFAULT_REPORT_CRON: &str = "0 30 3 * * *";

/// Normalise a cron expression to the seconds-first form used by the scheduler
///
/// Standard 5-field crontab gets a leading `0` seconds field; 6 and 7 field
/// expressions pass through. Returns None for an empty expression so callers
/// can fall back to their built-in default.
pub fn normalize_cron(expr: &str) -> Option<String> {
    let fields: Vec<&str> = expr.split_whitespace().collect();
    match fields.len() {
        0 => None,
        5 => Some(format!("0 {}", fields.join(" "))),
        _ => Some(fields.join(" ")),
    }
}

/// Field count check used by config validation
pub fn is_plausible_cron(expr: &str) -> bool {
    matches!(expr.split_whitespace().count(), 0 | 5 | 6 | 7)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_cron() {
        assert_eq!(normalize_cron("0 3 * * *").as_deref(), Some("0 0 3 * * *"));
        assert_eq!(normalize_cron("  0 0 3 * * * ").as_deref(), Some("0 0 3 * * *"));
        assert_eq!(normalize_cron(""), None);
        assert_eq!(normalize_cron("   "), None);
    }

    #[test]
    fn test_is_plausible_cron() {
        assert!(is_plausible_cron("*/30 3 * * *"));
        assert!(!is_plausible_cron("every day"));
    }
}
