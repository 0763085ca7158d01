//! Timed stages of card-to-card transitions.
//!
//! Every duration lives in [`Timings`] and every running animation is an
//! explicit value with a deadline. The player advances them from `tick`, so
//! callers control the clock and tests never sleep.

use std::time::{Duration, Instant};

/// Durations of every animated stage the player runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Old card content fading out.
    pub fade_out: Duration,
    /// Card frame resizing toward the incoming content's height.
    pub height_change: Duration,
    /// New card content fading in.
    pub fade_in: Duration,
    /// One-card/two-card layout change.
    pub num_cards_change: Duration,
    /// Quiet period after the fade-in before the transition goes idle.
    pub padding: Duration,
    /// Minimum time between submitting an answer and revealing its outcome.
    pub min_reveal_delay: Duration,
    /// Smallest wait ever scheduled before a reveal.
    pub reveal_floor: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            fade_out: Duration::from_millis(100),
            height_change: Duration::from_millis(500),
            fade_in: Duration::from_millis(100),
            num_cards_change: Duration::from_millis(500),
            padding: Duration::from_millis(250),
            min_reveal_delay: Duration::from_millis(950),
            reveal_floor: Duration::from_millis(1),
        }
    }
}

impl Timings {
    /// Collapses every stage to a millisecond, for hosts that want answers
    /// and cards to land without ceremony.
    #[must_use]
    pub fn fast() -> Self {
        let blink = Duration::from_millis(1);
        Self {
            fade_out: blink,
            height_change: blink,
            fade_in: blink,
            num_cards_change: blink,
            padding: blink,
            min_reveal_delay: blink,
            reveal_floor: blink,
        }
    }

    /// How long a one-card/two-card layout shift runs before the revealed
    /// card becomes active.
    #[must_use]
    pub fn layout_shift_budget(&self) -> Duration {
        self.num_cards_change + self.fade_in + self.padding
    }
}

/// Stage of a card swap, in on-screen order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapStage {
    FadingOut,
    Resizing,
    FadingIn,
    Settling,
}

/// What [`CardSwap::advance`] observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum SwapAdvance {
    /// Current stage still running.
    Waiting,
    /// Moved into `stage`.
    Entered(SwapStage),
    /// Fade-in complete: append and reveal the new card now.
    RevealCard,
    /// Settling complete; the swap is over.
    Finished,
}

/// Staged swap of the old card for a new one.
///
/// Runs fade-out, resize, fade-in, settle. The new card joins the transcript
/// exactly once, when the fade-in completes.
#[derive(Debug)]
pub struct CardSwap {
    stage: SwapStage,
    stage_deadline: Instant,
    target_height: u32,
}

impl CardSwap {
    #[must_use]
    pub fn begin(now: Instant, timings: &Timings, target_height: u32) -> Self {
        Self {
            stage: SwapStage::FadingOut,
            stage_deadline: now + timings.fade_out,
            target_height,
        }
    }

    /// Advances at most one stage per call. Each deadline accumulates from
    /// the previous one, so late ticks do not stretch the swap.
    pub fn advance(&mut self, now: Instant, timings: &Timings) -> SwapAdvance {
        if now < self.stage_deadline {
            return SwapAdvance::Waiting;
        }
        match self.stage {
            SwapStage::FadingOut => {
                self.stage = SwapStage::Resizing;
                self.stage_deadline += timings.height_change;
                SwapAdvance::Entered(SwapStage::Resizing)
            }
            SwapStage::Resizing => {
                self.stage = SwapStage::FadingIn;
                self.stage_deadline += timings.fade_in;
                SwapAdvance::Entered(SwapStage::FadingIn)
            }
            SwapStage::FadingIn => {
                self.stage = SwapStage::Settling;
                self.stage_deadline += timings.padding;
                SwapAdvance::RevealCard
            }
            SwapStage::Settling => SwapAdvance::Finished,
        }
    }

    #[must_use]
    pub fn stage(&self) -> SwapStage {
        self.stage
    }

    /// Height the card frame is resizing toward, in pixels.
    #[must_use]
    pub fn target_height(&self) -> u32 {
        self.target_height
    }
}

/// Direction of a one-card/two-card layout change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutShiftKind {
    OneToTwo,
    TwoToOne,
}

/// A running layout shift.
#[derive(Debug)]
pub struct LayoutShift {
    kind: LayoutShiftKind,
    deadline: Instant,
}

impl LayoutShift {
    #[must_use]
    pub fn begin(kind: LayoutShiftKind, now: Instant, timings: &Timings) -> Self {
        Self {
            kind,
            deadline: now + timings.layout_shift_budget(),
        }
    }

    #[must_use]
    pub fn is_finished(&self, now: Instant) -> bool {
        now >= self.deadline
    }

    #[must_use]
    pub fn kind(&self) -> LayoutShiftKind {
        self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::{CardSwap, LayoutShift, LayoutShiftKind, SwapAdvance, SwapStage, Timings};
    use std::time::{Duration, Instant};

    fn at(t0: Instant, millis: u64) -> Instant {
        t0 + Duration::from_millis(millis)
    }

    #[test]
    fn stages_advance_in_order() {
        let timings = Timings::default();
        let t0 = Instant::now();
        let mut swap = CardSwap::begin(t0, &timings, 480);

        assert_eq!(swap.advance(at(t0, 50), &timings), SwapAdvance::Waiting);
        assert_eq!(
            swap.advance(at(t0, 100), &timings),
            SwapAdvance::Entered(SwapStage::Resizing)
        );
        assert_eq!(
            swap.advance(at(t0, 600), &timings),
            SwapAdvance::Entered(SwapStage::FadingIn)
        );
        assert_eq!(swap.advance(at(t0, 700), &timings), SwapAdvance::RevealCard);
        assert_eq!(swap.stage(), SwapStage::Settling);
        assert_eq!(swap.advance(at(t0, 949), &timings), SwapAdvance::Waiting);
        assert_eq!(swap.advance(at(t0, 950), &timings), SwapAdvance::Finished);
        assert_eq!(swap.target_height(), 480);
    }

    #[test]
    fn deadlines_accumulate_so_late_ticks_catch_up() {
        let timings = Timings::default();
        let t0 = Instant::now();
        let mut swap = CardSwap::begin(t0, &timings, 0);

        // First tick arrives well into the resize window.
        let late = at(t0, 640);
        assert_eq!(
            swap.advance(late, &timings),
            SwapAdvance::Entered(SwapStage::Resizing)
        );
        // The resize deadline was already past, so the next call advances too.
        assert_eq!(
            swap.advance(late, &timings),
            SwapAdvance::Entered(SwapStage::FadingIn)
        );
        // Fade-in deadline is t0+700ms; not there yet.
        assert_eq!(swap.advance(late, &timings), SwapAdvance::Waiting);
        assert_eq!(swap.advance(at(t0, 700), &timings), SwapAdvance::RevealCard);
    }

    #[test]
    fn reveal_fires_exactly_once() {
        let timings = Timings::default();
        let t0 = Instant::now();
        let mut swap = CardSwap::begin(t0, &timings, 0);

        let mut reveals = 0;
        for ms in [100, 600, 700, 700, 950] {
            if swap.advance(at(t0, ms), &timings) == SwapAdvance::RevealCard {
                reveals += 1;
            }
        }
        assert_eq!(reveals, 1);
    }

    #[test]
    fn layout_shift_finishes_after_its_budget() {
        let timings = Timings::default();
        let t0 = Instant::now();
        let shift = LayoutShift::begin(LayoutShiftKind::OneToTwo, t0, &timings);

        assert_eq!(shift.kind(), LayoutShiftKind::OneToTwo);
        assert!(!shift.is_finished(at(t0, 849)));
        assert!(shift.is_finished(at(t0, 850)));
    }
}
