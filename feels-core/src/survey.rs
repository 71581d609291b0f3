use std::fmt::Write;
use tracing::{info, warn};

use crate::{api::ApiClient, error::SurveyError, model::FeelingScore};

pub const SURVEY_PROMPT: &str = "How would you describe the current weather?";
pub const SUBMIT_FAILED: &str = "Failed to submit feeling score";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurveyState {
    Unanswered,
    Selected(FeelingScore),
    Submitted(FeelingScore),
}

/// Single-question survey: pick a feeling, then submit it once.
#[derive(Debug, Clone)]
pub struct Survey {
    state: SurveyState,
    error: Option<String>,
}

impl Default for Survey {
    fn default() -> Self {
        Self {
            state: SurveyState::Unanswered,
            error: None,
        }
    }
}

impl Survey {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn options() -> [FeelingScore; 5] {
        FeelingScore::all()
    }

    pub fn state(&self) -> SurveyState {
        self.state
    }

    /// Pick a feeling, replacing any earlier pick.
    pub fn select(&mut self, score: FeelingScore) -> Result<(), SurveyError> {
        match self.state {
            SurveyState::Submitted(_) => Err(SurveyError::AlreadySubmitted),
            SurveyState::Unanswered | SurveyState::Selected(_) => {
                self.state = SurveyState::Selected(score);
                Ok(())
            }
        }
    }

    pub fn selected(&self) -> Option<FeelingScore> {
        match self.state {
            SurveyState::Unanswered => None,
            SurveyState::Selected(score) | SurveyState::Submitted(score) => Some(score),
        }
    }

    pub fn can_submit(&self) -> bool {
        matches!(self.state, SurveyState::Selected(_))
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self.state, SurveyState::Submitted(_))
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Send the selection. On failure the selection is kept so it can be resubmitted.
    pub async fn submit(&mut self, api: &ApiClient) -> Result<FeelingScore, SurveyError> {
        let score = match self.state {
            SurveyState::Unanswered => return Err(SurveyError::NothingSelected),
            SurveyState::Submitted(_) => return Err(SurveyError::AlreadySubmitted),
            SurveyState::Selected(score) => score,
        };

        self.error = None;
        match api.update_feeling(score).await {
            Ok(()) => {
                info!(score = score.value(), "submitted feeling score");
                self.state = SurveyState::Submitted(score);
                Ok(score)
            }
            Err(err) => {
                warn!(error = %err, "failed to submit feeling score");
                self.error = Some(SUBMIT_FAILED.to_string());
                Err(SurveyError::Rejected(err))
            }
        }
    }

    pub fn render(&self) -> String {
        let mut out = format!("Weather Survey\n{SURVEY_PROMPT}\n");

        for option in Self::options() {
            let marker = if self.selected() == Some(option) { '>' } else { ' ' };
            let _ = writeln!(out, "{marker} [{}] {}", option.value(), option.label());
        }

        let submit = if self.can_submit() { "Submit" } else { "Submit (select a feeling first)" };
        let _ = writeln!(out, "{submit}");

        if let Some(message) = &self.error {
            let _ = writeln!(out, "{message}");
        }
        out
    }
}
