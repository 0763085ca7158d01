use serde::Serialize;
use thiserror::Error;

use crate::params::LearnerParams;
use crate::state_name::StateName;

/// One learner answer together with the feedback it earned.
///
/// The answer is recorded at submission time; feedback arrives later, once
/// evaluation completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerFeedbackPair {
    answer: String,
    feedback: Option<String>,
}

impl AnswerFeedbackPair {
    #[must_use]
    pub fn answer(&self) -> &str {
        &self.answer
    }

    #[must_use]
    pub fn feedback(&self) -> Option<&str> {
        self.feedback.as_deref()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CardError {
    #[error("card for state `{0}` is already sealed")]
    AlreadySealed(StateName),
    #[error("card for state `{0}` has no recorded answer to attach feedback to")]
    NoRecordedAnswer(StateName),
}

/// One entry of the lesson transcript.
///
/// A card holds the content the learner saw at one state, the interaction
/// they answered it with, and the full answer/feedback history accumulated
/// there. Recording a destination seals the card: sealed cards accept no
/// further answers and never change their interaction, though feedback for
/// the answer that caused the transition may still land afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Card {
    state_name: StateName,
    params: LearnerParams,
    content_html: String,
    interaction_html: String,
    answer_feedback_pairs: Vec<AnswerFeedbackPair>,
    dest_state_name: Option<StateName>,
}

impl Card {
    #[must_use]
    pub fn new(
        state_name: StateName,
        params: LearnerParams,
        content_html: impl Into<String>,
        interaction_html: impl Into<String>,
    ) -> Self {
        Self {
            state_name,
            params,
            content_html: content_html.into(),
            interaction_html: interaction_html.into(),
            answer_feedback_pairs: Vec::new(),
            dest_state_name: None,
        }
    }

    /// Records a freshly submitted answer, with feedback still pending.
    pub fn record_answer(&mut self, answer: impl Into<String>) -> Result<(), CardError> {
        if self.is_sealed() {
            return Err(CardError::AlreadySealed(self.state_name.clone()));
        }
        self.answer_feedback_pairs.push(AnswerFeedbackPair {
            answer: answer.into(),
            feedback: None,
        });
        Ok(())
    }

    /// Attaches feedback to the most recently recorded answer.
    ///
    /// Legal on a sealed card: a transition records the destination first and
    /// the feedback for the answer that caused it second.
    pub fn record_feedback(&mut self, feedback: impl Into<String>) -> Result<(), CardError> {
        let Some(pair) = self.answer_feedback_pairs.last_mut() else {
            return Err(CardError::NoRecordedAnswer(self.state_name.clone()));
        };
        pair.feedback = Some(feedback.into());
        Ok(())
    }

    /// Seals the card by recording where the learner went next.
    pub fn seal(&mut self, dest_state_name: StateName) -> Result<(), CardError> {
        if self.is_sealed() {
            return Err(CardError::AlreadySealed(self.state_name.clone()));
        }
        self.dest_state_name = Some(dest_state_name);
        Ok(())
    }

    /// Swaps in a re-rendered interaction after a same-state answer.
    pub fn replace_interaction(&mut self, interaction_html: impl Into<String>) -> Result<(), CardError> {
        if self.is_sealed() {
            return Err(CardError::AlreadySealed(self.state_name.clone()));
        }
        self.interaction_html = interaction_html.into();
        Ok(())
    }

    #[must_use]
    pub fn state_name(&self) -> &StateName {
        &self.state_name
    }

    #[must_use]
    pub fn params(&self) -> &LearnerParams {
        &self.params
    }

    #[must_use]
    pub fn content_html(&self) -> &str {
        &self.content_html
    }

    #[must_use]
    pub fn interaction_html(&self) -> &str {
        &self.interaction_html
    }

    #[must_use]
    pub fn answer_feedback_pairs(&self) -> &[AnswerFeedbackPair] {
        &self.answer_feedback_pairs
    }

    #[must_use]
    pub fn destination(&self) -> Option<&StateName> {
        self.dest_state_name.as_ref()
    }

    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.dest_state_name.is_some()
    }
}
