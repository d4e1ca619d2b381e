//! Question Session: the conversation state machine.
//!
//! Flow: CollectingProfile → AskingQuestion → AwaitingAnswer → Advancing →
//!       (AskingQuestion | Completed), with Exited reachable from AwaitingAnswer.
//!
//! `SessionState` is an owned value: handlers take it out of the store, feed it one
//! event, and put it back. AskingQuestion and Advancing are transient; between events
//! a session is always in CollectingProfile, AwaitingAnswer, or a terminal phase.
//!
//! Remote failures never escape this module. Every `CompletionError` becomes a
//! deterministic fallback question (or fallback feedback) and the interview moves on.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::interview::commands::is_exit_command;
use crate::interview::profile::{CandidateProfile, ProfileDraft, ProfileForm, ValidationError};
use crate::interview::prompt_builder::{
    build_feedback_prompt, build_fallback_question, build_question_prompt,
};
use crate::interview::tier::ExperienceTier;
use crate::llm_client::{CompletionError, CompletionService};

pub const PROFILE_PROMPT: &str =
    "Please fill in your details and tech stack so we can tailor your interview.";
pub const EXIT_MESSAGE: &str =
    "Thanks! We've received your responses. We'll review and get back to you.";
pub const COMPLETED_MESSAGE: &str =
    "That's all the questions I had. Thank you! We've recorded your responses and will review them shortly.";
pub const FEEDBACK_UNAVAILABLE: &str = "Could not generate feedback at this time.";

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    CollectingProfile,
    AskingQuestion,
    AwaitingAnswer,
    Advancing,
    Completed,
    Exited,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Completed | Phase::Exited)
    }
}

/// Where a question came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionSource {
    Model,
    Fallback,
}

/// One asked question. Entries are appended in interview order and never removed.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptEntry {
    pub technology: String,
    pub slot: usize,
    pub tier: ExperienceTier,
    pub question: String,
    pub answer: Option<String>,
    pub source: QuestionSource,
    pub feedback: Option<String>,
    pub asked_at: DateTime<Utc>,
}

/// Position of the next question: technology index, then slot within that technology.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Cursor {
    pub tech_index: usize,
    pub slot_index: usize,
}

/// What the UI shows after an event.
#[derive(Debug, Clone, Serialize)]
pub struct Turn {
    pub phase: Phase,
    pub current_prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub candidate_name: Option<String>,
    pub desired_position: Option<String>,
    pub technologies_declared: usize,
    pub technologies_covered: usize,
    pub questions_asked: usize,
    pub answers_recorded: usize,
    pub fallback_questions: usize,
    pub outcome: Phase,
}

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("invalid profile field {0}")]
    Validation(#[from] ValidationError),

    #[error("cannot {action} while the interview is {phase:?}")]
    WrongPhase { action: &'static str, phase: Phase },

    #[error("answer cannot be empty")]
    EmptyAnswer,
}

#[derive(Debug, Clone)]
pub struct SessionState {
    id: Uuid,
    created_at: DateTime<Utc>,
    answer_feedback: bool,
    draft: ProfileDraft,
    profile: Option<CandidateProfile>,
    transcript: Vec<TranscriptEntry>,
    cursor: Cursor,
    phase: Phase,
    trail: Vec<Phase>,
}

// ────────────────────────────────────────────────────────────────────────────
// State machine
// ────────────────────────────────────────────────────────────────────────────

impl SessionState {
    pub fn new(answer_feedback: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            answer_feedback,
            draft: ProfileDraft::default(),
            profile: None,
            transcript: Vec::new(),
            cursor: Cursor::default(),
            phase: Phase::CollectingProfile,
            trail: vec![Phase::CollectingProfile],
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn profile(&self) -> Option<&CandidateProfile> {
        self.profile.as_ref()
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Every phase visited so far, in order.
    pub fn trail(&self) -> &[Phase] {
        &self.trail
    }

    /// Accepts a (possibly partial) profile form. On success asks the first question.
    /// On validation failure the session stays in CollectingProfile.
    pub async fn submit_profile(
        &mut self,
        form: ProfileForm,
        completions: &dyn CompletionService,
    ) -> Result<Turn, SessionError> {
        self.expect_phase(Phase::CollectingProfile, "submit a profile")?;

        self.draft.merge(form);
        let profile = self.draft.validate().map_err(|e| {
            debug!("Session {} profile rejected: {}", self.id, e);
            e
        })?;

        info!(
            "Session {} profile accepted: {} technologies x {} questions, tier={}",
            self.id,
            profile.tech_stack.len(),
            profile.questions_per_tech,
            profile.tier()
        );

        self.profile = Some(profile);
        self.transition(Phase::AskingQuestion);
        self.ask_current(completions).await;

        Ok(self.turn(None))
    }

    /// Handles one candidate reply. The exit check runs before anything else.
    pub async fn submit_answer(
        &mut self,
        text: &str,
        completions: &dyn CompletionService,
    ) -> Result<Turn, SessionError> {
        self.expect_phase(Phase::AwaitingAnswer, "answer")?;

        if is_exit_command(text) {
            info!(
                "Session {} exited by candidate after {} questions",
                self.id,
                self.transcript.len()
            );
            self.transition(Phase::Exited);
            return Ok(self.turn(None));
        }

        let answer = text.trim();
        if answer.is_empty() {
            return Err(SessionError::EmptyAnswer);
        }

        if let Some(entry) = self.transcript.last_mut() {
            entry.answer = Some(answer.to_string());
        }

        let feedback = if self.answer_feedback {
            Some(self.review_last_answer(completions).await)
        } else {
            None
        };

        self.transition(Phase::Advancing);
        self.advance();

        if self.phase == Phase::AskingQuestion {
            self.ask_current(completions).await;
        } else {
            info!(
                "Session {} completed with {} questions",
                self.id,
                self.transcript.len()
            );
        }

        Ok(self.turn(feedback))
    }

    /// Text the UI should show now: the profile request, the open question, or a closing message.
    pub fn current_prompt(&self) -> String {
        match self.phase {
            Phase::CollectingProfile => PROFILE_PROMPT.to_string(),
            Phase::AwaitingAnswer | Phase::AskingQuestion | Phase::Advancing => self
                .transcript
                .last()
                .map(|e| format!("({}) {}", e.technology, e.question))
                .unwrap_or_default(),
            Phase::Completed => COMPLETED_MESSAGE.to_string(),
            Phase::Exited => EXIT_MESSAGE.to_string(),
        }
    }

    pub fn greeting(&self) -> Option<String> {
        self.profile.as_ref().map(|p| {
            format!(
                "Welcome {}! I will ask you questions based on your tech stack: {}. Type 'exit' at any time to finish early.",
                p.full_name,
                p.tech_stack.join(", ")
            )
        })
    }

    pub fn summary(&self) -> SessionSummary {
        let mut covered: Vec<&str> = Vec::new();
        for entry in &self.transcript {
            if !covered.contains(&entry.technology.as_str()) {
                covered.push(&entry.technology);
            }
        }

        SessionSummary {
            candidate_name: self.profile.as_ref().map(|p| p.full_name.clone()),
            desired_position: self.profile.as_ref().map(|p| p.desired_position.clone()),
            technologies_declared: self.profile.as_ref().map_or(0, |p| p.tech_stack.len()),
            technologies_covered: covered.len(),
            questions_asked: self.transcript.len(),
            answers_recorded: self
                .transcript
                .iter()
                .filter(|e| e.answer.is_some())
                .count(),
            fallback_questions: self
                .transcript
                .iter()
                .filter(|e| e.source == QuestionSource::Fallback)
                .count(),
            outcome: self.phase,
        }
    }

    fn expect_phase(&self, expected: Phase, action: &'static str) -> Result<(), SessionError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(SessionError::WrongPhase {
                action,
                phase: self.phase,
            })
        }
    }

    fn transition(&mut self, next: Phase) {
        debug!("Session {}: {:?} -> {:?}", self.id, self.phase, next);
        self.phase = next;
        self.trail.push(next);
    }

    fn turn(&self, feedback: Option<String>) -> Turn {
        Turn {
            phase: self.phase,
            current_prompt: self.current_prompt(),
            feedback,
        }
    }

    /// Advancing: next slot, wrapping into the next technology; past the last one, Completed.
    fn advance(&mut self) {
        let (stack_len, per_tech) = match &self.profile {
            Some(p) => (p.tech_stack.len(), p.questions_per_tech as usize),
            None => (0, 0),
        };

        self.cursor.slot_index += 1;
        if self.cursor.slot_index >= per_tech {
            self.cursor.slot_index = 0;
            self.cursor.tech_index += 1;
        }

        if self.cursor.tech_index >= stack_len {
            self.transition(Phase::Completed);
        } else {
            self.transition(Phase::AskingQuestion);
        }
    }

    /// AskingQuestion: one completion attempt for the current slot, fallback on any error.
    async fn ask_current(&mut self, completions: &dyn CompletionService) {
        let Some(profile) = self.profile.as_ref() else {
            error!("Session {} asked for a question without a profile", self.id);
            return;
        };

        let Cursor {
            tech_index,
            slot_index,
        } = self.cursor;
        let technology = profile.tech_stack[tech_index].clone();
        let tier = profile.tier();

        let prior: Vec<String> = self
            .transcript
            .iter()
            .filter(|e| e.technology == technology)
            .map(|e| e.question.clone())
            .collect();
        let prior_refs: Vec<&str> = prior.iter().map(String::as_str).collect();
        let prompt = build_question_prompt(&technology, tier, &prior_refs);

        let outcome = match completions.generate_question(&prompt).await {
            Ok(question) if is_repeat(&question, &prior) => Err(CompletionError::MalformedOutput(
                "repeats an earlier question".to_string(),
            )),
            other => other,
        };

        let (question, source) = match outcome {
            Ok(question) => (question, QuestionSource::Model),
            Err(e) => {
                warn!(
                    "Session {}: question generation failed for {} slot {} ({}), using fallback",
                    self.id, technology, slot_index, e
                );
                (
                    build_fallback_question(&technology, tier, slot_index),
                    QuestionSource::Fallback,
                )
            }
        };

        self.transcript.push(TranscriptEntry {
            technology,
            slot: slot_index,
            tier,
            question,
            answer: None,
            source,
            feedback: None,
            asked_at: Utc::now(),
        });
        self.transition(Phase::AwaitingAnswer);
    }

    /// Asks the model to evaluate the answer just recorded. Always yields some text.
    async fn review_last_answer(&mut self, completions: &dyn CompletionService) -> String {
        let years = self.profile.as_ref().map_or(0.0, |p| p.years_experience);
        let Some(entry) = self.transcript.last() else {
            return FEEDBACK_UNAVAILABLE.to_string();
        };

        let prompt = build_feedback_prompt(
            &entry.technology,
            entry.tier,
            years,
            &entry.question,
            entry.answer.as_deref().unwrap_or_default(),
        );

        let feedback = match completions.generate_feedback(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Session {}: feedback generation failed ({})", self.id, e);
                FEEDBACK_UNAVAILABLE.to_string()
            }
        };

        if let Some(entry) = self.transcript.last_mut() {
            entry.feedback = Some(feedback.clone());
        }
        feedback
    }
}

fn is_repeat(question: &str, prior: &[String]) -> bool {
    let question = question.trim();
    prior.iter().any(|p| p.trim().eq_ignore_ascii_case(question))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
