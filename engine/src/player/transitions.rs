//! Card swap and layout shift driving.

use std::time::Instant;

use tracing::{debug, error, trace};

use colloquy_types::Card;

use crate::effects::PlayerEffect;
use crate::state::{PendingCard, TransitionState};
use crate::transition::{CardSwap, LayoutShift, LayoutShiftKind, SwapAdvance};

impl super::Player {
    /// Confirms the feedback on screen and starts the card swap.
    ///
    /// Does nothing unless a pending card is waiting on a continue press.
    pub fn continue_to_next_card(&mut self, now: Instant) {
        match std::mem::replace(&mut self.transition, TransitionState::Idle) {
            TransitionState::AwaitingContinue { pending } => {
                self.help_card = None;
                self.start_card_swap(pending, now);
            }
            other => {
                debug!("continue pressed with no card waiting");
                self.transition = other;
            }
        }
    }

    pub(crate) fn start_card_swap(&mut self, pending: PendingCard, now: Instant) {
        let target_height = self.adapters.measurer.natural_height(pending.content_html());
        let swap = CardSwap::begin(now, &self.timings, target_height);
        self.transition = TransitionState::Swapping { swap, pending };
    }

    /// Advances whichever transition stage is running.
    pub(crate) fn advance_transition(&mut self, now: Instant) {
        match std::mem::replace(&mut self.transition, TransitionState::Idle) {
            TransitionState::Idle => {}
            state @ TransitionState::AwaitingContinue { .. } => {
                self.transition = state;
            }
            TransitionState::Swapping { mut swap, pending } => {
                match swap.advance(now, &self.timings) {
                    SwapAdvance::Waiting => {
                        self.transition = TransitionState::Swapping { swap, pending };
                    }
                    SwapAdvance::Entered(stage) => {
                        trace!(?stage, "card swap advanced");
                        self.transition = TransitionState::Swapping { swap, pending };
                    }
                    SwapAdvance::RevealCard | SwapAdvance::Finished => {
                        self.reveal_pending_card(pending, swap, now);
                    }
                }
            }
            TransitionState::Settling { mut swap } => {
                if swap.advance(now, &self.timings) != SwapAdvance::Finished {
                    self.transition = TransitionState::Settling { swap };
                }
            }
            TransitionState::Shifting {
                shift,
                reveal_index,
            } => {
                if shift.is_finished(now) {
                    self.set_active_card(reveal_index);
                } else {
                    self.transition = TransitionState::Shifting {
                        shift,
                        reveal_index,
                    };
                }
            }
        }
    }

    /// Appends the pending card to the transcript and decides how the reveal
    /// lands: straight into the settle stage, or behind a layout shift when
    /// the new card changes whether a supplemental panel exists.
    fn reveal_pending_card(&mut self, pending: PendingCard, swap: CardSwap, now: Instant) {
        let PendingCard {
            state_name,
            params,
            content_html,
            interaction_html,
            interaction_inline,
            focus_label: _,
        } = pending;

        if let Some(new_params) = params {
            self.params = new_params;
        }
        let card = Card::new(
            state_name.clone(),
            self.params.clone(),
            content_html,
            interaction_html,
        );
        let reveal_index = match self.transcript.add_card(card) {
            Ok(index) => index,
            Err(error) => {
                error!(%error, "failed to append the revealed card");
                return;
            }
        };

        if self.adapters.topology.is_state_terminal(&state_name) {
            self.effects.push(PlayerEffect::LessonCompleted);
        }
        self.effects.push(PlayerEffect::ScrollToTop);

        let previous_supplemental = reveal_index
            .checked_sub(1)
            .and_then(|index| self.transcript.card(index))
            .is_some_and(|card| {
                !self
                    .adapters
                    .topology
                    .is_interaction_inline(card.state_name())
            });
        let next_supplemental = !interaction_inline;

        // Gaining or losing the supplemental panel in a wide viewport moves
        // the tutor card sideways; the new card only becomes active once
        // that movement is over.
        if reveal_index > 0
            && self.layout.can_fit_two_cards()
            && previous_supplemental != next_supplemental
        {
            let kind = if next_supplemental {
                LayoutShiftKind::OneToTwo
            } else {
                LayoutShiftKind::TwoToOne
            };
            self.transition = TransitionState::Shifting {
                shift: LayoutShift::begin(kind, now, &self.timings),
                reveal_index,
            };
        } else {
            self.set_active_card(reveal_index);
            self.transition = TransitionState::Settling { swap };
        }
    }
}
