//! The conversation player.
//!
//! [`Player`] owns the transcript, the panel layout, and the two state
//! machines that drive a lesson: answer submission and card transitions.
//! Hosts feed learner input through the public methods, call
//! [`tick`](Player::tick) with the current time once per frame, and drain
//! [`PlayerEffect`]s to apply to the page. Nothing inside sleeps or reads a
//! clock of its own, so tests drive the player with fabricated instants.

mod submission;
mod transitions;


use std::time::Instant;

use tracing::debug;

use colloquy_types::{Card, FocusLabel, LearnerParams, PanelKind, StateName};

use crate::effects::{EffectQueue, PlayerEffect};
use crate::focus::FocusLabelGenerator;
use crate::host::HostAdapters;
use crate::layout::{HeightRequestTracker, PanelLayout};
use crate::state::{HelpCard, PendingCard, SubmissionState, TransitionState};
use crate::transcript::{Transcript, TranscriptError};
use crate::transition::{LayoutShiftKind, SwapStage, Timings};

/// Content of a lesson's first card.
#[derive(Debug, Clone)]
pub struct InitialCard {
    pub state_name: StateName,
    pub params: LearnerParams,
    pub content_html: String,
}

/// Host view of the transition machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionAccess {
    Inactive,
    /// Feedback is on screen; waiting for the learner to continue.
    AwaitingContinue,
    /// A card swap stage is running.
    Swapping { stage: SwapStage, target_height: u32 },
    /// A one-card/two-card layout shift is running.
    Shifting { kind: LayoutShiftKind },
}

pub struct Player {
    transcript: Transcript,
    active_card_index: usize,
    layout: PanelLayout,
    submission: SubmissionState,
    transition: TransitionState,
    help_card: Option<HelpCard>,
    effects: EffectQueue,
    params: LearnerParams,
    focus_labels: FocusLabelGenerator,
    next_focus_label: Option<FocusLabel>,
    show_previous_responses: bool,
    has_interacted: bool,
    height_tracker: HeightRequestTracker,
    timings: Timings,
    adapters: HostAdapters,
}

impl Player {
    #[must_use]
    pub fn new(adapters: HostAdapters, timings: Timings, viewport_width: u32) -> Self {
        Self {
            transcript: Transcript::new(),
            active_card_index: 0,
            layout: PanelLayout::new(viewport_width),
            submission: SubmissionState::Idle,
            transition: TransitionState::Idle,
            help_card: None,
            effects: EffectQueue::new(),
            params: LearnerParams::new(),
            focus_labels: FocusLabelGenerator::default(),
            next_focus_label: None,
            show_previous_responses: false,
            has_interacted: false,
            height_tracker: HeightRequestTracker::new(),
            timings,
            adapters,
        }
    }

    /// Appends the lesson's first card and points the learner at it.
    ///
    /// Unlike later cards, the first one appears without a swap and its
    /// interaction markup carries no re-render suffix.
    pub fn initialize_page(&mut self, initial: InitialCard) -> Result<(), TranscriptError> {
        let InitialCard {
            state_name,
            params,
            content_html,
        } = initial;

        let label = self.focus_labels.generate();
        let interaction_html = self.adapters.renderer.interaction_html(&state_name, &label);
        self.params = params;
        let card = Card::new(
            state_name.clone(),
            self.params.clone(),
            content_html,
            interaction_html,
        );
        let index = self.transcript.add_card(card)?;

        self.has_interacted = false;
        self.next_focus_label = Some(label);
        self.set_active_card(index);
        self.effects.push(PlayerEffect::ScrollToTop);
        if self.adapters.topology.is_state_terminal(&state_name) {
            self.effects.push(PlayerEffect::LessonCompleted);
        }
        Ok(())
    }

    /// Advances every running machine to `now`. Call once per frame.
    pub fn tick(&mut self, now: Instant) {
        self.poll_evaluation(now);
        self.advance_transition(now);
    }

    /// Moves the learner to an existing card for review.
    pub fn navigate_to_card(&mut self, index: usize) {
        if index >= self.transcript.len() {
            debug!(index, "cannot navigate to a card that does not exist");
            return;
        }
        if index == self.active_card_index {
            return;
        }
        self.set_active_card(index);
    }

    /// Makes `index` the active card and re-derives everything that hangs
    /// off the active card: panels, help card, review state, focus.
    fn set_active_card(&mut self, index: usize) {
        self.active_card_index = index;
        self.show_previous_responses = false;
        self.help_card = None;
        self.layout.recompute(self.active_interaction_inline());

        let label = if self.transcript.is_last_card(index) {
            self.next_focus_label
                .clone()
                .unwrap_or_else(|| FocusLabel::content(index))
        } else {
            FocusLabel::content(index)
        };
        self.effects.push(PlayerEffect::SetFocus(label));
    }

    fn active_interaction_inline(&self) -> bool {
        self.transcript
            .card(self.active_card_index)
            .is_none_or(|card| {
                self.adapters
                    .topology
                    .is_interaction_inline(card.state_name())
            })
    }

    /// Applies a viewport resize.
    pub fn set_viewport_width(&mut self, viewport_width: u32) {
        self.help_card = None;
        self.layout
            .resize(viewport_width, self.active_interaction_inline());
    }

    /// Switches the visible panel in narrow viewports.
    pub fn set_visible_panel(&mut self, panel: PanelKind) {
        if !self.layout.set_visible_panel(panel) {
            debug!(%panel, "panel is not part of the current layout");
            return;
        }
        match panel {
            PanelKind::Tutor => self.help_card = None,
            PanelKind::Supplemental => self.effects.push(PlayerEffect::ShowInteraction),
        }
    }

    /// Returns the panel switcher to its default selection.
    pub fn reset_visible_panel(&mut self) {
        self.layout.reset_visible_panel();
    }

    pub fn toggle_show_previous_responses(&mut self) {
        self.show_previous_responses = !self.show_previous_responses;
    }

    /// Feeds one measured page height; emits a resize effect when warranted.
    pub fn adjust_page_height(&mut self, measured_height: u32, scroll: bool) {
        if let Some(request) = self.height_tracker.observe(measured_height, scroll) {
            self.effects.push(PlayerEffect::PageHeightChanged {
                height: request.height,
                scroll: request.scroll,
            });
        }
    }

    /// Whether leaving the page now should prompt the learner first.
    #[must_use]
    pub fn should_confirm_leave(&self) -> bool {
        self.has_interacted
            && self.transcript.last_card().is_some_and(|card| {
                !self.adapters.topology.is_state_terminal(card.state_name())
            })
    }

    #[must_use]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Current learner parameters. Each revealed card snapshots these.
    #[must_use]
    pub fn params(&self) -> &LearnerParams {
        &self.params
    }

    #[must_use]
    pub fn active_card(&self) -> Option<&Card> {
        self.transcript.card(self.active_card_index)
    }

    #[must_use]
    pub fn active_card_index(&self) -> usize {
        self.active_card_index
    }

    #[must_use]
    pub fn is_at_latest_card(&self) -> bool {
        self.transcript.is_last_card(self.active_card_index)
    }

    /// Progress dots to draw, one per card seen.
    #[must_use]
    pub fn num_progress_dots(&self) -> usize {
        self.transcript.len()
    }

    #[must_use]
    pub fn panels(&self) -> &[PanelKind] {
        self.layout.panels()
    }

    #[must_use]
    pub fn is_panel_visible(&self, panel: PanelKind) -> bool {
        self.layout.is_panel_visible(panel)
    }

    #[must_use]
    pub fn current_visible_panel(&self) -> Option<PanelKind> {
        self.layout.current_visible_panel()
    }

    /// True from answer submission until its outcome is routed.
    #[must_use]
    pub fn is_awaiting_feedback(&self) -> bool {
        !matches!(self.submission, SubmissionState::Idle)
    }

    #[must_use]
    pub fn is_on_terminal_card(&self) -> bool {
        self.active_card()
            .is_some_and(|card| self.adapters.topology.is_state_terminal(card.state_name()))
    }

    #[must_use]
    pub fn show_previous_responses(&self) -> bool {
        self.show_previous_responses
    }

    #[must_use]
    pub fn help_card(&self) -> Option<&HelpCard> {
        self.help_card.as_ref()
    }

    /// The card a running transition will reveal, if any.
    #[must_use]
    pub fn pending_card(&self) -> Option<&PendingCard> {
        match &self.transition {
            TransitionState::AwaitingContinue { pending }
            | TransitionState::Swapping { pending, .. } => Some(pending),
            TransitionState::Idle
            | TransitionState::Settling { .. }
            | TransitionState::Shifting { .. } => None,
        }
    }

    #[must_use]
    pub fn transition_access(&self) -> TransitionAccess {
        match &self.transition {
            TransitionState::Idle => TransitionAccess::Inactive,
            TransitionState::AwaitingContinue { .. } => TransitionAccess::AwaitingContinue,
            TransitionState::Swapping { swap, .. } | TransitionState::Settling { swap } => {
                TransitionAccess::Swapping {
                    stage: swap.stage(),
                    target_height: swap.target_height(),
                }
            }
            TransitionState::Shifting { shift, .. } => TransitionAccess::Shifting {
                kind: shift.kind(),
            },
        }
    }

    /// Takes every queued effect, in order.
    pub fn drain_effects(&mut self) -> Vec<PlayerEffect> {
        self.effects.drain()
    }
}
