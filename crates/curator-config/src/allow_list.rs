use curator_models::AllowListEntry;

/// Parse the newline-delimited allow-list text
///
/// Each line is a user identifier, optionally followed by `:days` to
/// override the global age threshold for that user. Blank lines and lines
/// starting with `#` are ignored. A suffix that is not a number is kept as
/// part of the name, so `team:media` is a plain identifier.
pub fn parse_allow_list(text: &str) -> Vec<AllowListEntry> {
    let mut entries: Vec<AllowListEntry> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let entry = match line.rsplit_once(':') {
            Some((name, days)) if !name.trim().is_empty() => match days.trim().parse::<u32>() {
                Ok(days) => AllowListEntry::with_threshold(name.trim(), days),
                Err(_) => AllowListEntry::new(line),
            },
            _ => AllowListEntry::new(line),
        };

        // Later lines win for the same user
        if let Some(existing) = entries.iter_mut().find(|e| e.user == entry.user) {
            *existing = entry;
        } else {
            entries.push(entry);
        }
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_override() {
        let entries = parse_allow_list("alice\nbob:7\n\n  carol : 14  \n");
        assert_eq!(
            entries,
            vec![
                AllowListEntry::new("alice"),
                AllowListEntry::with_threshold("bob", 7),
                AllowListEntry::with_threshold("carol", 14),
            ]
        );
    }

    #[test]
    fn test_parse_ignores_comments_and_non_numeric_suffix() {
        let entries = parse_allow_list("# owners\nteam:media\n:5\n");
        assert_eq!(
            entries,
            vec![AllowListEntry::new("team:media"), AllowListEntry::new(":5")]
        );
    }

    #[test]
    fn test_parse_duplicate_user_keeps_last() {
        let entries = parse_allow_list("alice:3\nalice:9");
        assert_eq!(entries, vec![AllowListEntry::with_threshold("alice", 9)]);
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_allow_list("").is_empty());
        assert!(parse_allow_list("\n  \n").is_empty());
    }
}
