//! Answer submission and evaluation polling.

use std::sync::Arc;
use std::time::Instant;

use futures_util::FutureExt;
use tracing::{debug, error, warn};

use colloquy_types::{EvaluatedAnswer, FocusLabel, LearnerParams, StateName};

use crate::effects::PlayerEffect;
use crate::host::EvaluationRequest;
use crate::state::{
    ActiveEvaluation, HelpCard, PendingCard, SubmissionState, SubmitOutcome, SubmitRejection,
    TransitionState,
};

impl super::Player {
    /// Submits the learner's answer on the active card.
    ///
    /// The answer is recorded immediately and evaluation runs on a spawned
    /// task; keep calling [`tick`](super::Player::tick) until the outcome is
    /// routed back onto the transcript.
    pub fn submit_answer(&mut self, answer: impl Into<String>, now: Instant) -> SubmitOutcome {
        // Submit controls sometimes fire twice for one activation; the first
        // submission wins and the rest are refused.
        if !matches!(self.submission, SubmissionState::Idle) {
            debug!("answer refused: evaluation already in flight");
            return SubmitOutcome::Rejected(SubmitRejection::EvaluationInFlight);
        }
        if !self.is_at_latest_card() {
            debug!("answer refused: reviewing an earlier card");
            return SubmitOutcome::Rejected(SubmitRejection::NotAtLatestCard);
        }
        let Some(card) = self.transcript.last_card() else {
            return SubmitOutcome::Rejected(SubmitRejection::NotAtLatestCard);
        };
        if card.is_sealed() {
            debug!("answer refused: active card already closed");
            return SubmitOutcome::Rejected(SubmitRejection::CardAlreadyClosed);
        }
        let prior_state = card.state_name().clone();

        self.has_interacted = true;
        self.help_card = None;

        let answer = answer.into();
        if let Err(error) = self.transcript.record_answer(answer.clone()) {
            error!(%error, "failed to record submitted answer");
            return SubmitOutcome::Rejected(SubmitRejection::CardAlreadyClosed);
        }

        let request = EvaluationRequest {
            answer,
            state_name: prior_state.clone(),
            params: self.params.clone(),
        };
        let evaluator = Arc::clone(&self.adapters.evaluator);
        let handle = tokio::spawn(async move { evaluator.evaluate(request).await });

        debug!(state = %prior_state, "answer submitted");
        self.submission = SubmissionState::Evaluating(ActiveEvaluation {
            handle,
            submitted_at: now,
            prior_state,
        });
        SubmitOutcome::Accepted
    }

    /// Polls the evaluator task, then routes its outcome once the reveal
    /// deadline passes.
    pub(crate) fn poll_evaluation(&mut self, now: Instant) {
        let ready = match &self.submission {
            SubmissionState::Idle => return,
            SubmissionState::Evaluating(active) => active.handle.is_finished(),
            SubmissionState::AwaitingReveal { deadline, .. } => now >= *deadline,
        };
        if !ready {
            return;
        }

        match std::mem::replace(&mut self.submission, SubmissionState::Idle) {
            SubmissionState::Idle => {}
            SubmissionState::Evaluating(active) => self.finish_evaluation(active, now),
            SubmissionState::AwaitingReveal {
                result,
                prior_state,
                ..
            } => self.route_evaluation(result, &prior_state, now),
        }
    }

    fn finish_evaluation(&mut self, active: ActiveEvaluation, now: Instant) {
        let ActiveEvaluation {
            mut handle,
            submitted_at,
            prior_state,
        } = active;

        match (&mut handle).now_or_never() {
            Some(Ok(Ok(result))) => {
                debug!(state = %prior_state, "evaluation finished");
                let deadline = self.reveal_deadline(&prior_state, submitted_at, now);
                self.submission = SubmissionState::AwaitingReveal {
                    result,
                    prior_state,
                    deadline,
                };
            }
            Some(Ok(Err(error))) => {
                warn!(%error, state = %prior_state, "answer evaluation failed");
            }
            Some(Err(error)) => {
                error!(%error, state = %prior_state, "evaluator task panicked");
            }
            None => {
                // is_finished() raced the join handle; try again next tick.
                self.submission = SubmissionState::Evaluating(ActiveEvaluation {
                    handle,
                    submitted_at,
                    prior_state,
                });
            }
        }
    }

    /// When the outcome may land. Inline interactions wait out the minimum
    /// reveal delay so instant evaluations do not flash feedback at the
    /// learner; supplemental interactions only wait the floor.
    fn reveal_deadline(
        &self,
        prior_state: &StateName,
        submitted_at: Instant,
        now: Instant,
    ) -> Instant {
        let wait = if self.adapters.topology.is_interaction_inline(prior_state) {
            let elapsed = now.saturating_duration_since(submitted_at);
            self.timings
                .min_reveal_delay
                .saturating_sub(elapsed)
                .max(self.timings.reveal_floor)
        } else {
            self.timings.reveal_floor
        };
        now + wait
    }

    fn route_evaluation(&mut self, result: EvaluatedAnswer, prior_state: &StateName, now: Instant) {
        let EvaluatedAnswer {
            new_state_name,
            refresh_interaction,
            feedback_html,
            content_html,
            new_params,
        } = result;

        if new_state_name == *prior_state {
            self.apply_same_state_feedback(prior_state, refresh_interaction, feedback_html);
        } else {
            self.begin_transition(new_state_name, feedback_html, content_html, new_params, now);
        }
    }

    /// The answer keeps the learner on the current card: attach the feedback,
    /// optionally re-render the interaction, and point them back at it.
    fn apply_same_state_feedback(
        &mut self,
        state_name: &StateName,
        refresh_interaction: bool,
        feedback_html: String,
    ) {
        if let Err(error) = self.transcript.record_feedback(feedback_html.clone()) {
            error!(%error, "failed to record feedback");
        }
        if !feedback_html.is_empty() && !self.active_interaction_inline() {
            self.help_card = Some(HelpCard::new(feedback_html, false));
        }
        if refresh_interaction {
            // Same interaction, fresh markup. The suffix makes the new markup
            // compare unequal even when it renders identically.
            let label = self.focus_labels.generate();
            let interaction_html = format!(
                "{}{}",
                self.adapters.renderer.interaction_html(state_name, &label),
                self.adapters.renderer.render_suffix()
            );
            if let Err(error) = self.transcript.refresh_interaction(interaction_html) {
                error!(%error, "failed to refresh interaction");
            }
            self.next_focus_label = Some(label);
        }
        if let Some(label) = self.next_focus_label.clone() {
            self.effects.push(PlayerEffect::SetFocus(label));
        }
        self.effects.push(PlayerEffect::ScrollToBottom);
    }

    /// The answer moves the learner to a new state: seal the card, stage its
    /// successor, and either swap right away or hold the feedback on screen
    /// until the learner continues.
    fn begin_transition(
        &mut self,
        new_state_name: StateName,
        feedback_html: String,
        content_html: String,
        new_params: Option<LearnerParams>,
        now: Instant,
    ) {
        if let Err(error) = self.transcript.set_destination(new_state_name.clone()) {
            error!(%error, "failed to seal the answered card");
            return;
        }

        let label = self.focus_labels.generate();
        let interaction_inline = self
            .adapters
            .topology
            .is_interaction_inline(&new_state_name);
        let interaction_html = format!(
            "{}{}",
            self.adapters
                .renderer
                .interaction_html(&new_state_name, &label),
            self.adapters.renderer.render_suffix()
        );
        let pending = PendingCard {
            state_name: new_state_name,
            params: new_params,
            content_html: format!("{content_html}{}", self.adapters.renderer.render_suffix()),
            interaction_html,
            interaction_inline,
            focus_label: label.clone(),
        };
        self.next_focus_label = Some(label);

        // Even empty feedback is recorded, so every answer on a sealed card
        // carries a response.
        if let Err(error) = self.transcript.record_feedback(feedback_html.clone()) {
            error!(%error, "failed to record transition feedback");
        }

        if feedback_html.is_empty() {
            self.start_card_swap(pending, now);
        } else {
            if !self.active_interaction_inline() {
                self.help_card = Some(HelpCard::new(feedback_html, true));
            }
            self.transition = TransitionState::AwaitingContinue { pending };
            self.effects
                .push(PlayerEffect::SetFocus(FocusLabel::continue_button()));
            self.effects.push(PlayerEffect::ScrollToBottom);
        }
    }
}
