use crate::params::LearnerParams;
use crate::state_name::StateName;

/// Outcome of evaluating one learner answer.
///
/// `new_state_name` equal to the answered card's state means the learner
/// stays put; any other value is a transition to that state, with
/// `content_html` becoming the next card's content.
#[derive(Debug, Clone)]
pub struct EvaluatedAnswer {
    pub new_state_name: StateName,
    /// Re-render the current card's interaction (same-state answers only).
    pub refresh_interaction: bool,
    /// Feedback earned by the answer; may be empty.
    pub feedback_html: String,
    /// Content of the destination state's card. Ignored for same-state answers.
    pub content_html: String,
    /// Replacement learner parameters, when the answer changed them.
    pub new_params: Option<LearnerParams>,
}
