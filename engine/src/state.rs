//! Player state machine types.

use std::time::Instant;

use tokio::task::JoinHandle;

use colloquy_types::{EvaluatedAnswer, FocusLabel, LearnerParams, StateName};

use crate::host::EvaluationError;
use crate::transition::{CardSwap, LayoutShift};

/// An answer evaluation running on the async runtime.
#[derive(Debug)]
pub(crate) struct ActiveEvaluation {
    pub(crate) handle: JoinHandle<Result<EvaluatedAnswer, EvaluationError>>,
    pub(crate) submitted_at: Instant,
    pub(crate) prior_state: StateName,
}

/// Submission half of the player state machine.
///
/// Transitions: Idle -> Evaluating -> AwaitingReveal -> Idle. The player
/// refuses new answers whenever this is not `Idle`.
#[derive(Debug)]
pub(crate) enum SubmissionState {
    Idle,
    /// Evaluator task still running.
    Evaluating(ActiveEvaluation),
    /// Result in hand, held back until `deadline` so fast evaluations do not
    /// flash feedback at the learner.
    AwaitingReveal {
        result: EvaluatedAnswer,
        prior_state: StateName,
        deadline: Instant,
    },
}

/// Transition half of the player state machine.
///
/// Transitions: Idle -> (AwaitingContinue ->) Swapping -> Settling | Shifting
/// -> Idle. The continue stop only appears when the transition carried
/// feedback for the learner to read.
#[derive(Debug)]
pub(crate) enum TransitionState {
    Idle,
    /// Feedback is on screen; the learner must press continue.
    AwaitingContinue { pending: PendingCard },
    /// Staged swap toward the pending card.
    Swapping { swap: CardSwap, pending: PendingCard },
    /// Card revealed; the swap's padding stage is still running.
    Settling { swap: CardSwap },
    /// Card revealed; a one-card/two-card shift is running, after which the
    /// revealed card becomes active.
    Shifting {
        shift: LayoutShift,
        reveal_index: usize,
    },
}

/// The card a transition will reveal once its swap completes.
///
/// Everything about the card is fixed when the transition begins; the swap
/// only decides when it becomes visible.
#[derive(Debug, Clone)]
pub struct PendingCard {
    pub(crate) state_name: StateName,
    pub(crate) params: Option<LearnerParams>,
    pub(crate) content_html: String,
    pub(crate) interaction_html: String,
    pub(crate) interaction_inline: bool,
    pub(crate) focus_label: FocusLabel,
}

impl PendingCard {
    #[must_use]
    pub fn state_name(&self) -> &StateName {
        &self.state_name
    }

    #[must_use]
    pub fn content_html(&self) -> &str {
        &self.content_html
    }

    /// Interaction markup to preview while the swap runs. Only inline
    /// interactions are previewed; supplemental ones wait for their panel.
    #[must_use]
    pub fn inline_interaction_html(&self) -> Option<&str> {
        self.interaction_inline
            .then_some(self.interaction_html.as_str())
    }

    #[must_use]
    pub fn focus_label(&self) -> &FocusLabel {
        &self.focus_label
    }
}

/// Feedback mirrored beside a supplemental interaction.
///
/// When the active interaction lives in the supplemental panel, feedback in
/// the tutor card could be off screen; the help card repeats it next to
/// where the learner is looking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpCard {
    html: String,
    has_continue_button: bool,
}

impl HelpCard {
    pub(crate) fn new(html: impl Into<String>, has_continue_button: bool) -> Self {
        Self {
            html: html.into(),
            has_continue_button,
        }
    }

    #[must_use]
    pub fn html(&self) -> &str {
        &self.html
    }

    #[must_use]
    pub fn has_continue_button(&self) -> bool {
        self.has_continue_button
    }
}

/// Result of an answer submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum SubmitOutcome {
    /// Answer recorded; evaluation started.
    Accepted,
    /// Refused; nothing was recorded.
    Rejected(SubmitRejection),
}

impl SubmitOutcome {
    #[must_use]
    pub fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Why an answer was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejection {
    /// A previous answer is still being evaluated or revealed.
    EvaluationInFlight,
    /// The learner is reviewing an earlier card.
    NotAtLatestCard,
    /// The active card is sealed; the lesson has already moved on.
    CardAlreadyClosed,
}
