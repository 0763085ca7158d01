//! Side effects the player asks its host to perform.

use colloquy_types::FocusLabel;

/// One host-facing side effect.
///
/// The player never touches the page directly; it queues these and the host
/// drains them once per frame, applying each in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerEffect {
    /// Move accessibility focus to the labelled region.
    SetFocus(FocusLabel),
    /// Scroll the conversation to its newest entry.
    ScrollToBottom,
    /// Scroll the page to the top.
    ScrollToTop,
    /// Reveal the supplemental panel's interaction.
    ShowInteraction,
    /// The learner reached a terminal state.
    LessonCompleted,
    /// Ask the embedding frame to resize.
    PageHeightChanged { height: u32, scroll: bool },
}

/// FIFO queue of pending effects.
///
/// Duplicates are kept; two focus moves queued in one frame are two real
/// instructions.
#[derive(Debug, Default)]
pub struct EffectQueue {
    pending: Vec<PlayerEffect>,
}

impl EffectQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, effect: PlayerEffect) {
        self.pending.push(effect);
    }

    /// Takes all pending effects, in the order they were queued.
    pub fn drain(&mut self) -> Vec<PlayerEffect> {
        std::mem::take(&mut self.pending)
    }
}
