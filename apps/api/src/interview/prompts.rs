// All prompt templates and fallback question pools for the interview module.
// System prompts live in llm_client::prompts.

/// Question-generation prompt.
/// Replace: {level}, {technology}, {focus}, {avoid_block}
pub const QUESTION_PROMPT_TEMPLATE: &str = r#"You are interviewing a {level} candidate.

Write ONE open-ended, subjective technical interview question about: {technology}

Difficulty: aim at {focus}.
{avoid_block}
Rules:
1. Exactly one question, on a single line
2. The candidate must answer in their own words; no yes/no or multiple-choice questions
3. Do NOT include the answer, hints, numbering, or any commentary"#;

/// Inserted into `{avoid_block}` when earlier questions exist for the same technology.
/// Replace: {prior_questions}
pub const AVOID_BLOCK_TEMPLATE: &str = r#"
Questions already asked about this technology (do NOT repeat or paraphrase them):
{prior_questions}
"#;

/// Answer-evaluation prompt.
/// Replace: {level}, {years}, {technology}, {question}, {answer}
pub const FEEDBACK_PROMPT_TEMPLATE: &str = r#"The candidate is {level} with {years} years of experience.

Question (technology: {technology}): {question}
Candidate's answer: {answer}

Provide a short evaluation focusing on:
- Correctness (was the core idea addressed?)
- Clarity (is it explained clearly?)
- Depth (is it appropriate for the candidate's experience?)
Then give 2-3 concrete topics the candidate could study to improve.
Keep the feedback concise (2-4 sentences) and friendly."#;

/// Fresher fallbacks. `{tech}` is replaced with the technology name.
pub const FRESHER_POOL: &[&str] = &[
    "What is {tech} and where is it commonly used?",
    "Name one common task you would perform using {tech}. How would you start?",
    "Explain a basic concept or term related to {tech} that a beginner should know.",
    "Describe a simple example or use-case of {tech}.",
    "What are common tools or libraries used with {tech}?",
];

pub const JUNIOR_POOL: &[&str] = &[
    "Describe a small feature you built with {tech}. What problems did you run into and how did you solve them?",
    "How would you debug a piece of {tech} code that works locally but fails in a shared environment?",
    "Walk me through how you would structure a small project that uses {tech} so that others can maintain it.",
    "What practices do you follow to test code or configuration written with {tech}?",
    "Explain a mistake beginners often make with {tech} and how you avoid it in your own work.",
];

pub const MID_LEVEL_POOL: &[&str] = &[
    "Describe a design decision you made in a {tech} project. What alternatives did you consider and what trade-offs led to your choice?",
    "How would you evolve a {tech} codebase that has grown hard to change? What would you tackle first and why?",
    "What performance or scalability limits have you hit with {tech}, and how did you diagnose and address them?",
    "When would you advise a team NOT to use {tech}? What would you pick instead and why?",
    "How do you review {tech} code written by teammates? What do you look for beyond correctness?",
];

/// Fresher fundamentals for well-known technology families, replacing the first two generic entries.
/// Matched by case-insensitive substring, first match wins.
pub const FRESHER_SPECIALISATIONS: &[(&[&str], [&str; 2])] = &[
    (
        &["python"],
        [
            "How do you write a function in Python? Give a short example.",
            "What is a list in Python and how is it different from a tuple?",
        ],
    ),
    (
        &["react"],
        [
            "What is a component in React?",
            "How do you pass data from a parent to a child component in React?",
        ],
    ),
    (
        &["sql", "postgres", "mysql"],
        [
            "What is a database table and a row?",
            "What is a primary key and why is it important?",
        ],
    ),
    (
        &["django", "fastapi", "flask"],
        [
            "What is a web framework like {tech}, and when would you use it?",
            "How do you handle incoming HTTP requests in a simple route?",
        ],
    ),
    (
        &["javascript"],
        [
            "What is JavaScript and how is it used in web development?",
            "What's the difference between var, let and const in JavaScript?",
        ],
    ),
    (
        &["node"],
        [
            "What is Node.js used for?",
            "How would you create a simple HTTP server in Node?",
        ],
    ),
];
