/// Replies that end the interview immediately, compared case-insensitively after trimming.
pub const EXIT_PHRASES: &[&str] = &["exit", "quit", "bye", "goodbye", "stop"];

/// True when the whole reply is an exit phrase. Answers that merely contain one are not.
pub fn is_exit_command(text: &str) -> bool {
    let text = text.trim();
    EXIT_PHRASES
        .iter()
        .any(|phrase| phrase.eq_ignore_ascii_case(text))
}
