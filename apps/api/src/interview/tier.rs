//! Experience tier: the difficulty bucket derived from years of experience.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Years below this are `Fresher`.
pub const JUNIOR_THRESHOLD_YEARS: f64 = 1.0;
/// Years at or above this are `MidLevel`.
pub const MID_LEVEL_THRESHOLD_YEARS: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExperienceTier {
    Fresher,
    Junior,
    MidLevel,
}

impl ExperienceTier {
    /// Maps years of experience to exactly one tier. Negative input is treated as zero.
    pub fn from_years(years: f64) -> Self {
        if years < JUNIOR_THRESHOLD_YEARS {
            ExperienceTier::Fresher
        } else if years < MID_LEVEL_THRESHOLD_YEARS {
            ExperienceTier::Junior
        } else {
            ExperienceTier::MidLevel
        }
    }

    /// Phrase used when describing the candidate to the model.
    pub fn label(&self) -> &'static str {
        match self {
            ExperienceTier::Fresher => "entry-level (fresher)",
            ExperienceTier::Junior => "junior-level",
            ExperienceTier::MidLevel => "mid-level",
        }
    }

    /// What the questions for this tier should probe.
    pub fn focus(&self) -> &'static str {
        match self {
            ExperienceTier::Fresher => {
                "core fundamentals: definitions, basic concepts, and simple usage a newcomer should know"
            }
            ExperienceTier::Junior => {
                "applied scenarios: how the candidate would use the technology to solve a concrete, everyday task"
            }
            ExperienceTier::MidLevel => {
                "design and trade-offs: choosing between approaches, structuring a solution, and explaining the costs of each choice"
            }
        }
    }
}

impl fmt::Display for ExperienceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExperienceTier::Fresher => "fresher",
            ExperienceTier::Junior => "junior",
            ExperienceTier::MidLevel => "mid-level",
        };
        f.write_str(s)
    }
}
