//! Panel visibility and page geometry.
//!
//! Nothing here is stored in lesson data: which panels exist, which one is
//! showing, and how tall the embedding frame should be are all derived from
//! the viewport and the active card, and recomputed whenever either changes.

use colloquy_types::PanelKind;

/// Narrowest viewport that shows the tutor and supplemental cards side by side.
pub const TWO_CARD_THRESHOLD_PX: u32 = 1120;

/// Height drift tolerated before a new frame resize is requested.
const HEIGHT_CHANGE_SLACK_PX: u32 = 50;

/// Extra height added to each resize request so the frame never scrolls.
const HEIGHT_PADDING_PX: u32 = 50;

#[must_use]
pub fn can_fit_two_cards(viewport_width: u32) -> bool {
    viewport_width >= TWO_CARD_THRESHOLD_PX
}

/// Which panels exist and which one the learner is looking at.
///
/// In wide viewports the tutor panel is always on screen and only the
/// supplemental panel (when the active interaction needs one) joins it. In
/// narrow viewports the panels form a one-at-a-time switcher that defaults
/// to the tutor.
#[derive(Debug, Clone)]
pub struct PanelLayout {
    panels: Vec<PanelKind>,
    current: Option<PanelKind>,
    viewport_width: u32,
}

impl PanelLayout {
    #[must_use]
    pub fn new(viewport_width: u32) -> Self {
        Self {
            panels: Vec::new(),
            current: None,
            viewport_width,
        }
    }

    /// Rebuilds the panel list for the active card and resets the visible
    /// panel to the first entry.
    pub fn recompute(&mut self, active_interaction_inline: bool) {
        let mut panels = Vec::new();
        if !self.can_fit_two_cards() {
            panels.push(PanelKind::Tutor);
        }
        if !active_interaction_inline {
            panels.push(PanelKind::Supplemental);
        }
        self.panels = panels;
        self.reset_visible_panel();
    }

    /// Puts the first panel of the current list back on screen, or none when
    /// the list is empty.
    pub fn reset_visible_panel(&mut self) {
        self.current = self.panels.first().copied();
    }

    /// Applies a new viewport width and recomputes.
    pub fn resize(&mut self, viewport_width: u32, active_interaction_inline: bool) {
        self.viewport_width = viewport_width;
        self.recompute(active_interaction_inline);
    }

    /// Makes `panel` the visible one. Returns false when the panel is not in
    /// the current switcher.
    pub fn set_visible_panel(&mut self, panel: PanelKind) -> bool {
        if !self.panels.contains(&panel) {
            return false;
        }
        self.current = Some(panel);
        true
    }

    #[must_use]
    pub fn is_panel_visible(&self, panel: PanelKind) -> bool {
        if panel == PanelKind::Tutor && self.can_fit_two_cards() {
            // The tutor card never leaves the screen in wide viewports.
            return true;
        }
        self.current == Some(panel)
    }

    #[must_use]
    pub fn panels(&self) -> &[PanelKind] {
        &self.panels
    }

    #[must_use]
    pub fn current_visible_panel(&self) -> Option<PanelKind> {
        self.current
    }

    #[must_use]
    pub fn viewport_width(&self) -> u32 {
        self.viewport_width
    }

    #[must_use]
    pub fn can_fit_two_cards(&self) -> bool {
        can_fit_two_cards(self.viewport_width)
    }
}

/// A request for the embedding frame to change size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeightRequest {
    pub height: u32,
    pub scroll: bool,
}

/// Deduplicates frame resize requests.
///
/// Embedders are only asked to resize when the measured page height drifts
/// past the slack window, or when scrolling is requested for the first time.
#[derive(Debug, Default)]
pub struct HeightRequestTracker {
    last_requested_height: u32,
    last_requested_scroll: bool,
}

impl HeightRequestTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one page height measurement; returns the resize request to send,
    /// if any.
    pub fn observe(&mut self, measured_height: u32, scroll: bool) -> Option<HeightRequest> {
        let drifted =
            self.last_requested_height.abs_diff(measured_height) > HEIGHT_CHANGE_SLACK_PX;
        let newly_scrolling = scroll && !self.last_requested_scroll;
        if !drifted && !newly_scrolling {
            return None;
        }

        // The exact content height can still produce a scrollbar, so pad it.
        let height = measured_height + HEIGHT_PADDING_PX;
        self.last_requested_height = height;
        self.last_requested_scroll = scroll;
        Some(HeightRequest { height, scroll })
    }
}

#[cfg(test)]
mod tests {
    use super::{HeightRequest, HeightRequestTracker, PanelLayout, can_fit_two_cards};
    use colloquy_types::PanelKind;

    #[test]
    fn threshold_is_inclusive() {
        assert!(can_fit_two_cards(1120));
        assert!(can_fit_two_cards(1200));
        assert!(!can_fit_two_cards(1119));
    }

    #[test]
    fn wide_viewport_shows_both_cards() {
        let mut layout = PanelLayout::new(1200);
        layout.recompute(false);

        assert_eq!(layout.panels(), &[PanelKind::Supplemental]);
        assert!(layout.is_panel_visible(PanelKind::Tutor));
        assert!(layout.is_panel_visible(PanelKind::Supplemental));
    }

    #[test]
    fn narrow_viewport_switches_one_panel_at_a_time() {
        let mut layout = PanelLayout::new(800);
        layout.recompute(false);

        assert_eq!(layout.panels(), &[PanelKind::Tutor, PanelKind::Supplemental]);
        assert!(layout.is_panel_visible(PanelKind::Tutor));
        assert!(!layout.is_panel_visible(PanelKind::Supplemental));

        assert!(layout.set_visible_panel(PanelKind::Supplemental));
        assert!(!layout.is_panel_visible(PanelKind::Tutor));
        assert!(layout.is_panel_visible(PanelKind::Supplemental));
    }

    #[test]
    fn inline_interaction_never_offers_a_supplemental_panel() {
        let mut layout = PanelLayout::new(1200);
        layout.recompute(true);
        assert!(layout.panels().is_empty());
        assert!(layout.is_panel_visible(PanelKind::Tutor));
        assert!(!layout.is_panel_visible(PanelKind::Supplemental));
        assert!(!layout.set_visible_panel(PanelKind::Supplemental));

        let mut layout = PanelLayout::new(800);
        layout.recompute(true);
        assert_eq!(layout.panels(), &[PanelKind::Tutor]);
        assert_eq!(layout.current_visible_panel(), Some(PanelKind::Tutor));
    }

    #[test]
    fn reset_returns_to_the_first_panel() {
        let mut layout = PanelLayout::new(800);
        layout.recompute(false);
        layout.set_visible_panel(PanelKind::Supplemental);

        layout.reset_visible_panel();
        assert_eq!(layout.current_visible_panel(), Some(PanelKind::Tutor));

        layout.recompute(true);
        layout.reset_visible_panel();
        assert_eq!(layout.current_visible_panel(), Some(PanelKind::Tutor));
    }

    #[test]
    fn resize_resets_the_visible_panel() {
        let mut layout = PanelLayout::new(800);
        layout.recompute(false);
        layout.set_visible_panel(PanelKind::Supplemental);

        layout.resize(1200, false);
        assert_eq!(layout.current_visible_panel(), Some(PanelKind::Supplemental));
        assert!(layout.is_panel_visible(PanelKind::Tutor));
    }

    #[test]
    fn height_requests_are_padded_and_deduplicated() {
        let mut tracker = HeightRequestTracker::new();

        assert_eq!(
            tracker.observe(600, false),
            Some(HeightRequest { height: 650, scroll: false })
        );
        // Within the slack window: no new request.
        assert_eq!(tracker.observe(620, false), None);
        // Past the slack window.
        assert_eq!(
            tracker.observe(701, false),
            Some(HeightRequest { height: 751, scroll: false })
        );
    }

    #[test]
    fn first_scroll_request_fires_even_within_slack() {
        let mut tracker = HeightRequestTracker::new();
        tracker.observe(600, false);

        assert_eq!(
            tracker.observe(620, true),
            Some(HeightRequest { height: 670, scroll: true })
        );
        // Scroll already requested and height within slack.
        assert_eq!(tracker.observe(640, true), None);
    }
}
