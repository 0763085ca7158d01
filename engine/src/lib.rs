//! Conversation progression engine for card-based tutoring lessons.
//!
//! # Architecture
//!
//! The crate is organized around a single tick-driven state machine:
//!
//! - [`Player`] - Owns the lesson session: transcript, layout, submission
//!   and transition machinery
//! - [`Transcript`] - Append-only record of cards; only the newest card
//!   accepts answers
//! - [`HostAdapters`] - The four seams a host implements: answer
//!   evaluation, interaction rendering, lesson topology, content measuring
//! - [`Timings`] - Every duration the player uses, swappable as a set
//!
//! The player never sleeps and never reads a clock. Hosts call
//! [`Player::tick`] with the current time once per frame; timed behavior
//! (the reveal delay, card swap stages, layout shifts) is expressed as
//! deadlines checked against that time. Tests drive the whole engine with
//! fabricated instants.
//!
//! # Effects
//!
//! Side effects on the page are not performed, they are queued as
//! [`PlayerEffect`] values for the host to drain and apply:
//!
//! | Effect | Description |
//! |--------|-------------|
//! | `SetFocus` | Move keyboard focus to a labelled element |
//! | `ScrollToBottom` | Scroll the conversation to its newest content |
//! | `ScrollToTop` | Scroll back to the top of the page |
//! | `ShowInteraction` | Re-display the supplemental interaction panel |
//! | `LessonCompleted` | The learner reached a terminal card |
//! | `PageHeightChanged` | The embedding frame should resize |
//!
//! # Error Handling
//!
//! Learner-facing operations degrade instead of failing: refused
//! submissions come back as [`SubmitOutcome::Rejected`] with a reason, and
//! evaluator failures release the submission guard so the learner can try
//! again. Programming errors against the transcript surface as
//! [`TranscriptError`].

mod effects;
mod focus;
mod host;
mod layout;
mod player;
mod state;
mod transcript;
mod transition;

pub use colloquy_types as types;

pub use effects::PlayerEffect;
pub use host::{
    AnswerEvaluator, ContentMeasurer, EvaluationError, EvaluationRequest, HostAdapters,
    InteractionRenderer, LessonTopology,
};
pub use layout::{
    HeightRequest, HeightRequestTracker, PanelLayout, TWO_CARD_THRESHOLD_PX, can_fit_two_cards,
};
pub use player::{InitialCard, Player, TransitionAccess};
pub use state::{HelpCard, PendingCard, SubmitOutcome, SubmitRejection};
pub use transcript::{Transcript, TranscriptError};
pub use transition::{LayoutShiftKind, SwapStage, Timings};
