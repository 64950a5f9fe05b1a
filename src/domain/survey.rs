//! Health assessments produced by survey conversations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A 1-100 wellbeing score with an explanatory note, as judged by the
/// model from a survey conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthAssessment {
    /// Score between 1 and 100.
    pub score: i32,
    /// Reasoning behind the score.
    pub note: String,
}

/// Score outside the 1-100 range.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("health score {0} is outside the 1-100 range")]
pub struct InvalidHealthScore(pub i32);

impl HealthAssessment {
    /// Creates a validated assessment.
    pub fn new(score: i32, note: impl Into<String>) -> Result<Self, InvalidHealthScore> {
        if !(1..=100).contains(&score) {
            return Err(InvalidHealthScore(score));
        }
        Ok(Self {
            score,
            note: note.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_scores_in_range() {
        assert!(HealthAssessment::new(1, "low").is_ok());
        assert!(HealthAssessment::new(100, "high").is_ok());
        assert_eq!(HealthAssessment::new(72, "fine").unwrap().score, 72);
    }

    #[test]
    fn rejects_scores_out_of_range() {
        assert_eq!(
            HealthAssessment::new(0, "n"),
            Err(InvalidHealthScore(0))
        );
        assert_eq!(
            HealthAssessment::new(101, "n"),
            Err(InvalidHealthScore(101))
        );
    }
}
