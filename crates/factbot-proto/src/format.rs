//! Character classification for IRC text.

/// Returns true if the character is an IRC formatting code (bold, color, ...).
pub fn is_irc_format_code(ch: char) -> bool {
    matches!(
        ch,
        '\x01' | '\x02' | '\x03' | '\x04' | '\x0F' | '\x11' | '\x16' | '\x1D' | '\x1E' | '\x1F'
    )
}

/// Returns true if a control character is illegal in IRC messages.
///
/// BEL is always rejected. Other control characters are rejected unless they
/// are CR, LF, NUL, or a formatting code.
pub fn is_illegal_control_char(ch: char) -> bool {
    if ch == '\x07' {
        return true;
    }
    ch.is_control() && ch != '\r' && ch != '\n' && ch != '\0' && !is_irc_format_code(ch)
}

/// Make text safe to encode: tabs become spaces and other illegal control
/// characters are dropped. Line breaks are kept.
pub fn scrub_control_chars(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\t' => Some(' '),
            c if is_illegal_control_char(c) => None,
            c => Some(c),
        })
        .collect()
}

/// Remove formatting codes from a string.
///
/// Color codes (`\x03`) also swallow their `fg[,bg]` digits.
pub fn strip_formatting(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x03' {
            for _ in 0..2 {
                if chars.peek().is_some_and(|c| c.is_ascii_digit()) {
                    chars.next();
                }
            }
            let mut lookahead = chars.clone();
            if lookahead.next() == Some(',') && lookahead.peek().is_some_and(|c| c.is_ascii_digit()) {
                chars.next();
                for _ in 0..2 {
                    if chars.peek().is_some_and(|c| c.is_ascii_digit()) {
                        chars.next();
                    }
                }
            }
            continue;
        }
        if is_irc_format_code(c) {
            continue;
        }
        out.push(c);
    }
    out
}
