//! Candidate profile: the form fields collected before any question is asked.
//!
//! The form may arrive in several partial submissions; `ProfileDraft` accumulates
//! them and `ProfileDraft::validate` produces a `CandidateProfile` only once every
//! field passes. The first failing field is reported so the UI can re-prompt it.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::interview::tier::ExperienceTier;

/// Used when the form leaves the per-technology count out.
pub const DEFAULT_QUESTIONS_PER_TECH: u32 = 3;

const MIN_PHONE_DIGITS: usize = 8;
const MAX_PHONE_DIGITS: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    FullName,
    Email,
    Phone,
    YearsExperience,
    DesiredPosition,
    Location,
    TechStack,
    QuestionsPerTech,
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProfileField::FullName => "full_name",
            ProfileField::Email => "email",
            ProfileField::Phone => "phone",
            ProfileField::YearsExperience => "years_experience",
            ProfileField::DesiredPosition => "desired_position",
            ProfileField::Location => "location",
            ProfileField::TechStack => "tech_stack",
            ProfileField::QuestionsPerTech => "questions_per_tech",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: ProfileField,
    pub reason: &'static str,
}

impl ValidationError {
    fn new(field: ProfileField, reason: &'static str) -> Self {
        Self { field, reason }
    }
}

/// Tech stack as typed by the candidate: a list, or one comma-separated string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TechStackInput {
    List(Vec<String>),
    Text(String),
}

impl TechStackInput {
    /// Trimmed, non-empty items in declared order; case-insensitive duplicates dropped.
    pub fn into_items(self) -> Vec<String> {
        let raw: Vec<String> = match self {
            TechStackInput::List(items) => items,
            TechStackInput::Text(text) => text.split(',').map(str::to_string).collect(),
        };

        let mut items: Vec<String> = Vec::new();
        for item in raw {
            let item = item.trim();
            if item.is_empty() || items.iter().any(|seen| seen.eq_ignore_ascii_case(item)) {
                continue;
            }
            items.push(item.to_string());
        }
        items
    }
}

/// One submission of the profile form. Omitted fields keep their previous value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileForm {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub years_experience: Option<f64>,
    pub desired_position: Option<String>,
    pub location: Option<String>,
    pub tech_stack: Option<TechStackInput>,
    pub questions_per_tech: Option<u32>,
}

/// Profile fields gathered so far.
#[derive(Debug, Clone, Default)]
pub struct ProfileDraft {
    full_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    years_experience: Option<f64>,
    desired_position: Option<String>,
    location: Option<String>,
    tech_stack: Option<Vec<String>>,
    questions_per_tech: Option<u32>,
}

impl ProfileDraft {
    pub fn merge(&mut self, form: ProfileForm) {
        if let Some(v) = form.full_name {
            self.full_name = Some(v.trim().to_string());
        }
        if let Some(v) = form.email {
            self.email = Some(v.trim().to_string());
        }
        if let Some(v) = form.phone {
            self.phone = Some(v.trim().to_string());
        }
        if let Some(v) = form.years_experience {
            self.years_experience = Some(v);
        }
        if let Some(v) = form.desired_position {
            self.desired_position = Some(v.trim().to_string());
        }
        if let Some(v) = form.location {
            self.location = Some(v.trim().to_string());
        }
        if let Some(v) = form.tech_stack {
            self.tech_stack = Some(v.into_items());
        }
        if let Some(v) = form.questions_per_tech {
            self.questions_per_tech = Some(v);
        }
    }

    /// Checks fields in form order and returns the first problem found.
    pub fn validate(&self) -> Result<CandidateProfile, ValidationError> {
        let full_name = required_text(&self.full_name, ProfileField::FullName)?;

        let email = required_text(&self.email, ProfileField::Email)?;
        if !is_valid_email(&email) {
            return Err(ValidationError::new(
                ProfileField::Email,
                "must look like name@domain.tld",
            ));
        }

        let phone = required_text(&self.phone, ProfileField::Phone)?;
        if !is_valid_phone(&phone) {
            return Err(ValidationError::new(
                ProfileField::Phone,
                "must contain 8 to 15 digits (spaces, +, -, parentheses allowed)",
            ));
        }

        let years_experience = self.years_experience.ok_or_else(|| {
            ValidationError::new(ProfileField::YearsExperience, "is required")
        })?;
        if !years_experience.is_finite() || years_experience < 0.0 {
            return Err(ValidationError::new(
                ProfileField::YearsExperience,
                "must be a non-negative number",
            ));
        }

        let desired_position = required_text(&self.desired_position, ProfileField::DesiredPosition)?;
        let location = required_text(&self.location, ProfileField::Location)?;

        let tech_stack = self.tech_stack.clone().unwrap_or_default();
        if tech_stack.is_empty() {
            return Err(ValidationError::new(
                ProfileField::TechStack,
                "must list at least one technology",
            ));
        }

        let questions_per_tech = self
            .questions_per_tech
            .unwrap_or(DEFAULT_QUESTIONS_PER_TECH);
        if questions_per_tech < 1 {
            return Err(ValidationError::new(
                ProfileField::QuestionsPerTech,
                "must be at least 1",
            ));
        }

        Ok(CandidateProfile {
            full_name,
            email,
            phone,
            years_experience,
            desired_position,
            location,
            tech_stack,
            questions_per_tech,
        })
    }
}

fn required_text(value: &Option<String>, field: ProfileField) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v.clone()),
        _ => Err(ValidationError::new(field, "is required")),
    }
}

/// Basic shape only: `local@domain.tld`, no whitespace, a single `@`.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Digits plus common separators, with a plausible digit count.
pub fn is_valid_phone(phone: &str) -> bool {
    let allowed = |c: char| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')' | '.');
    if !phone.chars().all(allowed) {
        return false;
    }
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    (MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits)
}

/// A fully validated candidate. Never written anywhere but process memory.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateProfile {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub years_experience: f64,
    pub desired_position: String,
    pub location: String,
    pub tech_stack: Vec<String>,
    pub questions_per_tech: u32,
}

impl CandidateProfile {
    pub fn tier(&self) -> ExperienceTier {
        ExperienceTier::from_years(self.years_experience)
    }
}
