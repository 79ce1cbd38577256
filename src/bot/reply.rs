//! Shaping outgoing replies into protocol-sized lines.

/// Lines kept when a reply is truncated.
pub const TRUNCATED_LINES: usize = 4;

/// Split `text` into the lines to send.
///
/// Empty lines are dropped. When more than `max_lines` remain, only the
/// first [`TRUNCATED_LINES`] are kept, followed by a summary line counting
/// the rest. Nothing is dropped if the reply fits in those lines anyway.
pub fn split_reply(text: &str, max_lines: usize) -> Vec<String> {
    let mut lines: Vec<String> = text
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    if lines.len() > max_lines && lines.len() > TRUNCATED_LINES {
        let omitted = lines.len() - TRUNCATED_LINES;
        lines.truncate(TRUNCATED_LINES);
        lines.push(format!("... and {omitted} more lines"));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> String {
        (1..=n).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn short_reply_is_unchanged() {
        assert_eq!(split_reply("a\r\nb\nc", 5), vec!["a", "b", "c"]);
    }

    #[test]
    fn empty_lines_are_dropped() {
        assert_eq!(split_reply("a\n\n  \nb\n", 5), vec!["a", "b"]);
        assert!(split_reply("", 5).is_empty());
    }

    #[test]
    fn reply_at_threshold_is_not_truncated() {
        assert_eq!(split_reply(&numbered(5), 5).len(), 5);
    }

    #[test]
    fn long_reply_keeps_four_lines_and_counts_the_rest() {
        let lines = split_reply(&numbered(9), 5);
        assert_eq!(
            lines,
            vec!["line 1", "line 2", "line 3", "line 4", "... and 5 more lines"]
        );
    }

    #[test]
    fn small_threshold_still_keeps_four() {
        assert_eq!(split_reply(&numbered(3), 2).len(), 3);
        assert_eq!(split_reply(&numbered(6), 2).last().unwrap(), "... and 2 more lines");
    }
}
