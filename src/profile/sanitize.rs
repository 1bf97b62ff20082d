//! Free-text cleanup for character sheet fields

use once_cell::sync::Lazy;
use regex::Regex;

/// Inserted after `@` so mass mentions render as plain text
const ZERO_WIDTH_SPACE: char = '\u{200B}';

const ELLIPSIS: char = '…';

static MASS_MENTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@(everyone|here)").expect("mention pattern is valid"));

static INLINE_WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]+").expect("whitespace pattern is valid"));

/// Clean user-supplied text before it is stored or echoed back.
///
/// Control characters other than newline and tab are dropped, runs of
/// spaces and tabs collapse to one space, lines are trimmed, more than one
/// consecutive blank line collapses to one, `@everyone`/`@here` are
/// neutralized, and the result is cut to `max_chars` characters with a
/// trailing ellipsis when anything was cut.
pub fn sanitize_input(text: &str, max_chars: usize) -> String {
    let printable: String = text
        .replace("\r\n", "\n")
        .chars()
        .filter(|&c| !c.is_control() || c == '\n' || c == '\t')
        .collect();

    let mut lines: Vec<String> = Vec::new();
    let mut blank_run = 0;
    for line in printable.lines() {
        let line = INLINE_WHITESPACE.replace_all(line, " ");
        let line = line.trim();
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        lines.push(line.to_string());
    }

    let joined = lines.join("\n");
    let cleaned = MASS_MENTION
        .replace_all(joined.trim(), format!("@{}$1", ZERO_WIDTH_SPACE).as_str())
        .into_owned();

    truncate_chars(&cleaned, max_chars)
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((cut, _)) if max_chars > 0 => {
            let mut truncated = text[..cut].trim_end().to_string();
            truncated.push(ELLIPSIS);
            truncated
        }
        Some(_) => String::new(),
    }
}
