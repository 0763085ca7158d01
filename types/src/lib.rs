//! Core domain types for Colloquy.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

mod card;
mod evaluation;
mod focus;
mod panel;
mod params;
mod state_name;

pub use card::{AnswerFeedbackPair, Card, CardError};
pub use evaluation::EvaluatedAnswer;
pub use focus::FocusLabel;
pub use panel::PanelKind;
pub use params::LearnerParams;
pub use state_name::StateName;
