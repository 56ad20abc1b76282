use crate::error::PlannerError;
use regex::RegexBuilder;

/// SQL LIKE pattern matching with `\` as the escape character.
/// - `%` matches any sequence of characters (including empty)
/// - `_` matches exactly one character
pub(crate) fn like_match(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    like_match_recursive(&text, &pattern, 0, 0)
}

fn like_match_recursive(text: &[char], pattern: &[char], text_pos: usize, pattern_pos: usize) -> bool {
    if pattern_pos >= pattern.len() {
        return text_pos >= text.len();
    }

    match pattern[pattern_pos] {
        '%' => {
            // Collapse runs of '%' so long patterns stay linear per wildcard.
            let mut next = pattern_pos;
            while next < pattern.len() && pattern[next] == '%' {
                next += 1;
            }
            (text_pos..=text.len()).any(|skip| like_match_recursive(text, pattern, skip, next))
        }
        '_' => {
            text_pos < text.len() && like_match_recursive(text, pattern, text_pos + 1, pattern_pos + 1)
        }
        '\\' if pattern_pos + 1 < pattern.len() => {
            text_pos < text.len()
                && text[text_pos] == pattern[pattern_pos + 1]
                && like_match_recursive(text, pattern, text_pos + 1, pattern_pos + 2)
        }
        c => {
            text_pos < text.len()
                && text[text_pos] == c
                && like_match_recursive(text, pattern, text_pos + 1, pattern_pos + 1)
        }
    }
}

/// Case-insensitive POSIX-style match (`~*`). The word boundary escapes
/// `\m` and `\M` are mapped onto `\b`.
pub(crate) fn regex_match(text: &str, pattern: &str) -> Result<bool, PlannerError> {
    let translated = pattern.replace(r"\m", r"\b").replace(r"\M", r"\b");
    let regex = RegexBuilder::new(&translated)
        .case_insensitive(true)
        .build()
        .map_err(|e| PlannerError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
    Ok(regex.is_match(text))
}
