//! Prompt Builder: pure functions that turn (technology, tier) into model prompts
//! and deterministic fallback questions.

use crate::interview::prompts::{
    AVOID_BLOCK_TEMPLATE, FEEDBACK_PROMPT_TEMPLATE, FRESHER_POOL, FRESHER_SPECIALISATIONS,
    JUNIOR_POOL, MID_LEVEL_POOL, QUESTION_PROMPT_TEMPLATE,
};
use crate::interview::tier::ExperienceTier;

/// Builds the question-generation prompt. `prior_questions` are listed only so the
/// model avoids repeating them.
pub fn build_question_prompt(
    technology: &str,
    tier: ExperienceTier,
    prior_questions: &[&str],
) -> String {
    let avoid_block = if prior_questions.is_empty() {
        String::new()
    } else {
        let listed = prior_questions
            .iter()
            .map(|q| format!("- {q}"))
            .collect::<Vec<_>>()
            .join("\n");
        fill_template(AVOID_BLOCK_TEMPLATE, &[("prior_questions", listed.as_str())])
    };

    fill_template(
        QUESTION_PROMPT_TEMPLATE,
        &[
            ("level", tier.label()),
            ("technology", technology),
            ("focus", tier.focus()),
            ("avoid_block", avoid_block.as_str()),
        ],
    )
}

/// Deterministic fallback: the tier's pool entry at `slot_index % pool.len()`.
pub fn build_fallback_question(technology: &str, tier: ExperienceTier, slot_index: usize) -> String {
    let pool = fallback_pool(technology, tier);
    pool[slot_index % pool.len()].replace("{tech}", technology)
}

/// Builds the answer-evaluation prompt.
pub fn build_feedback_prompt(
    technology: &str,
    tier: ExperienceTier,
    years_experience: f64,
    question: &str,
    answer: &str,
) -> String {
    fill_template(
        FEEDBACK_PROMPT_TEMPLATE,
        &[
            ("level", tier.label()),
            ("years", format!("{years_experience}").as_str()),
            ("technology", technology),
            ("question", question),
            ("answer", answer),
        ],
    )
}

/// Substitutes `{name}` placeholders in one pass over the template.
/// Substituted values are never scanned again; unknown `{...}` text is kept as is.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn fallback_pool(technology: &str, tier: ExperienceTier) -> Vec<&'static str> {
    match tier {
        ExperienceTier::Fresher => {
            let mut pool = FRESHER_POOL.to_vec();
            if let Some(special) = fresher_specialisation(technology) {
                pool[..2].copy_from_slice(&special);
            }
            pool
        }
        ExperienceTier::Junior => JUNIOR_POOL.to_vec(),
        ExperienceTier::MidLevel => MID_LEVEL_POOL.to_vec(),
    }
}

fn fresher_specialisation(technology: &str) -> Option<[&'static str; 2]> {
    let lower = technology.to_lowercase();
    let lower = if lower == "js" { "javascript".to_string() } else { lower };
    FRESHER_SPECIALISATIONS
        .iter()
        .find(|(keys, _)| keys.iter().any(|k| lower.contains(k)))
        .map(|(_, questions)| *questions)
}
