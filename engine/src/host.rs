//! Host adapter traits.
//!
//! The engine owns sequencing and state; everything that touches a rendered
//! page, a lesson definition, or an answer-checking backend comes in through
//! these traits. Hosts hand the player a [`HostAdapters`] bundle at
//! construction.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use colloquy_types::{EvaluatedAnswer, FocusLabel, LearnerParams, StateName};

/// A learner answer handed to the evaluator.
#[derive(Debug, Clone)]
pub struct EvaluationRequest {
    pub answer: String,
    /// State the answer was submitted from.
    pub state_name: StateName,
    /// Learner parameters in effect at submission time.
    pub params: LearnerParams,
}

/// Error surfaced by an [`AnswerEvaluator`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("answer evaluation failed: {0}")]
pub struct EvaluationError(String);

impl EvaluationError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Evaluates learner answers against the lesson's rules.
///
/// Evaluation runs on a spawned task, so implementations are free to call
/// out to a server or sleep; the player keeps accepting ticks meanwhile.
/// There is no timeout: an evaluation that never completes leaves the
/// player refusing new submissions for the rest of the session.
#[async_trait]
pub trait AnswerEvaluator: Send + Sync {
    async fn evaluate(
        &self,
        request: EvaluationRequest,
    ) -> Result<EvaluatedAnswer, EvaluationError>;
}

/// Renders interaction markup for lesson states.
pub trait InteractionRenderer: Send + Sync {
    /// Markup for `state_name`'s interaction, wired to `focus_label`.
    fn interaction_html(&self, state_name: &StateName, focus_label: &FocusLabel) -> String;

    /// Suffix appended to re-rendered markup so the host's view layer treats
    /// it as fresh content even when the markup itself is unchanged.
    fn render_suffix(&self) -> String;
}

/// Answers structural questions about the lesson graph.
pub trait LessonTopology: Send + Sync {
    /// Whether `state_name`'s interaction embeds inline in the tutor card.
    /// Anything else renders in the supplemental panel.
    fn is_interaction_inline(&self, state_name: &StateName) -> bool;

    /// Whether `state_name` ends the lesson.
    fn is_state_terminal(&self, state_name: &StateName) -> bool;
}

/// Measures rendered content so card swaps know the height to resize toward.
pub trait ContentMeasurer: Send + Sync {
    /// Natural height of `content_html` in pixels at the current viewport.
    fn natural_height(&self, content_html: &str) -> u32;
}

/// The host services a player needs, behind shared handles so evaluation
/// tasks can outlive a borrow of the player.
#[derive(Clone)]
pub struct HostAdapters {
    pub evaluator: Arc<dyn AnswerEvaluator>,
    pub renderer: Arc<dyn InteractionRenderer>,
    pub topology: Arc<dyn LessonTopology>,
    pub measurer: Arc<dyn ContentMeasurer>,
}
