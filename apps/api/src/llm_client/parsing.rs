//! Turns raw completion text into a single usable question.
//!
//! Models like to number things, add headings, wrap output in code fences, or
//! ignore "one question only". Anything that does not reduce to exactly one
//! question-shaped line is rejected as `MalformedOutput` so the session can fall back.

use super::CompletionError;

const MIN_QUESTION_CHARS: usize = 10;
const MAX_QUESTION_CHARS: usize = 600;

/// First words that mark a line as a question even without a trailing `?`.
const LEAD_WORDS: &[&str] = &[
    "what", "how", "why", "when", "where", "which", "who", "explain", "describe", "give", "can",
    "could", "would", "should", "is", "are", "do", "does", "tell", "walk", "compare", "discuss",
    "imagine", "suppose", "design", "name",
];

/// Extracts one interview question from model output.
pub fn parse_question(raw: &str) -> Result<String, CompletionError> {
    let text = strip_fences(raw);
    if text.is_empty() {
        return Err(malformed("empty response"));
    }

    let mut lines: Vec<String> = Vec::new();
    let mut list_items = 0;

    for line in text.lines() {
        let line = line.trim().replace("**", "");
        let line = line.trim();
        if line.is_empty() || is_heading(line) {
            continue;
        }

        let (line, was_list_item) = strip_list_marker(line);
        if was_list_item {
            list_items += 1;
        }

        let line = strip_quotes(strip_label(line));
        if !line.is_empty() {
            lines.push(line.to_string());
        }
    }

    if lines.is_empty() {
        return Err(malformed("no question text"));
    }
    if list_items > 1 {
        return Err(malformed("multiple list items"));
    }
    let question_lines = lines
        .iter()
        .filter(|l| l.ends_with('?') || starts_with_lead_word(l))
        .count();
    if question_lines > 1 {
        return Err(malformed("multiple questions"));
    }

    let question = lines.join(" ");
    if question_marks(&question) > 1 {
        return Err(malformed("multiple questions"));
    }
    if !looks_like_question(&question) {
        return Err(malformed("does not look like a question"));
    }

    Ok(question)
}

/// Feedback is free text; only emptiness is rejected.
pub fn parse_feedback(raw: &str) -> Result<String, CompletionError> {
    let text = strip_fences(raw);
    if text.is_empty() {
        Err(malformed("empty feedback"))
    } else {
        Ok(text.to_string())
    }
}

/// Shape check: bounded length and either a trailing `?` or an interrogative lead word.
pub fn looks_like_question(text: &str) -> bool {
    let len = text.chars().count();
    if !(MIN_QUESTION_CHARS..=MAX_QUESTION_CHARS).contains(&len) {
        return false;
    }
    text.ends_with('?') || starts_with_lead_word(text)
}

fn starts_with_lead_word(text: &str) -> bool {
    let first = text
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();
    LEAD_WORDS.contains(&first.as_str())
}

/// Counts sentence-ending `?`s; a `?` inside code like `a?.b` does not count.
fn question_marks(text: &str) -> usize {
    let mut chars = text.chars().peekable();
    let mut count = 0;
    while let Some(c) = chars.next() {
        if c == '?' && chars.peek().map_or(true, |next| next.is_whitespace()) {
            count += 1;
        }
    }
    count
}

fn malformed(reason: &str) -> CompletionError {
    CompletionError::MalformedOutput(reason.to_string())
}

/// Strips ``` fences (with or without a language tag) and surrounding whitespace.
fn strip_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // drop the language tag line, if any
    let rest = match rest.find('\n') {
        Some(idx) if !rest[..idx].contains(' ') => &rest[idx + 1..],
        _ => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// `Python:` style headings. Short lines only, so "Consider this case:" style leads survive.
fn is_heading(line: &str) -> bool {
    line.ends_with(':') && !line.contains('?') && line.split_whitespace().count() <= 3
}

fn strip_list_marker(line: &str) -> (&str, bool) {
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(after) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            if after.starts_with(char::is_whitespace) {
                return (after.trim_start(), true);
            }
        }
    }
    for bullet in ["- ", "* ", "• "] {
        if let Some(after) = line.strip_prefix(bullet) {
            return (after.trim_start(), true);
        }
    }
    (line, false)
}

fn strip_label(line: &str) -> &str {
    for label in ["question:", "q:"] {
        if line.len() >= label.len()
            && line.is_char_boundary(label.len())
            && line[..label.len()].eq_ignore_ascii_case(label)
        {
            return line[label.len()..].trim_start();
        }
    }
    line
}

fn strip_quotes(line: &str) -> &str {
    line.trim_matches(|c| c == '"' || c == '\u{201c}' || c == '\u{201d}')
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_question_passes() {
        assert_eq!(
            parse_question("What is the difference between a process and a thread?").unwrap(),
            "What is the difference between a process and a thread?"
        );
    }

    #[test]
    fn test_numbered_single_question_is_unwrapped() {
        assert_eq!(
            parse_question("1. How would you index a large SQL table?").unwrap(),
            "How would you index a large SQL table?"
        );
    }

    #[test]
    fn test_heading_and_label_are_dropped() {
        let raw = "Python:\nQuestion: **How do generators differ from lists?**";
        assert_eq!(
            parse_question(raw).unwrap(),
            "How do generators differ from lists?"
        );
    }

    #[test]
    fn test_code_fences_and_quotes_are_stripped() {
        let raw = "```text\n\"Explain how React reconciles the virtual DOM.\"\n```";
        assert_eq!(
            parse_question(raw).unwrap(),
            "Explain how React reconciles the virtual DOM."
        );
    }

    #[test]
    fn test_multi_line_single_question_is_joined() {
        let raw = "Your service's p99 latency doubled after a deploy.\nHow would you investigate it?";
        assert_eq!(
            parse_question(raw).unwrap(),
            "Your service's p99 latency doubled after a deploy. How would you investigate it?"
        );
    }

    #[test]
    fn test_empty_is_malformed() {
        assert_eq!(
            parse_question("  \n "),
            Err(CompletionError::MalformedOutput("empty response".to_string()))
        );
    }

    #[test]
    fn test_numbered_list_is_malformed() {
        let raw = "1. What is a list?\n2. What is a tuple?";
        assert_eq!(
            parse_question(raw),
            Err(CompletionError::MalformedOutput(
                "multiple list items".to_string()
            ))
        );
    }

    #[test]
    fn test_two_questions_on_separate_lines_is_malformed() {
        let raw = "What is a mutex?\nWhen would you prefer a channel?";
        assert_eq!(
            parse_question(raw),
            Err(CompletionError::MalformedOutput("multiple questions".to_string()))
        );
    }

    #[test]
    fn test_two_instructions_on_separate_lines_is_malformed() {
        let raw = "Explain how Python manages memory.\nDescribe the GIL and its impact.";
        assert_eq!(
            parse_question(raw),
            Err(CompletionError::MalformedOutput("multiple questions".to_string()))
        );
    }

    #[test]
    fn test_several_questions_on_one_line_is_malformed() {
        let raw = "What is a list? How does it differ from a tuple? When would you use each?";
        assert_eq!(
            parse_question(raw),
            Err(CompletionError::MalformedOutput("multiple questions".to_string()))
        );
    }

    #[test]
    fn test_optional_chaining_is_one_question() {
        let raw = "What does `user?.profile` evaluate to when user is undefined?";
        assert_eq!(parse_question(raw).unwrap(), raw);
    }

    #[test]
    fn test_statement_is_malformed() {
        assert_eq!(
            parse_question("Sure! Here is a great interview question for you."),
            Err(CompletionError::MalformedOutput(
                "does not look like a question".to_string()
            ))
        );
    }

    #[test]
    fn test_too_short_is_malformed() {
        assert!(parse_question("Why?").is_err());
    }

    #[test]
    fn test_lead_word_without_question_mark_passes() {
        assert!(looks_like_question(
            "Describe a time you profiled a slow endpoint"
        ));
    }

    #[test]
    fn test_overlong_text_fails_shape_check() {
        let long = format!("What {}?", "very ".repeat(200));
        assert!(!looks_like_question(&long));
    }

    #[test]
    fn test_decimal_number_is_not_a_list_marker() {
        let (rest, was_list) = strip_list_marker("3.5 million rows: how would you paginate?");
        assert!(!was_list);
        assert_eq!(rest, "3.5 million rows: how would you paginate?");
    }

    #[test]
    fn test_strip_fences_without_tag() {
        assert_eq!(strip_fences("```\nWhat is Docker?\n```"), "What is Docker?");
    }

    #[test]
    fn test_strip_fences_no_fences() {
        assert_eq!(strip_fences("  What is Docker?  "), "What is Docker?");
    }

    #[test]
    fn test_feedback_empty_is_malformed() {
        assert!(matches!(
            parse_feedback("``` ```"),
            Err(CompletionError::MalformedOutput(_))
        ));
    }
}
