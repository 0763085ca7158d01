use std::fmt;

/// Prefix for the focus label attached to each card's content region.
pub const CONTENT_FOCUS_LABEL_PREFIX: &str = "content-focus-label-";

/// Focus label of the continue button shown under transition feedback.
pub const CONTINUE_BUTTON_FOCUS_LABEL: &str = "continueButton";

/// An accessibility focus target in the rendered page.
///
/// Labels are opaque to the engine; the host maps them back to DOM regions
/// (or their equivalent) when a `SetFocus` effect is drained.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct FocusLabel(String);

impl FocusLabel {
    /// Label of the content region of the card at `card_index`.
    #[must_use]
    pub fn content(card_index: usize) -> Self {
        Self(format!("{CONTENT_FOCUS_LABEL_PREFIX}{card_index}"))
    }

    /// Label of the continue button.
    #[must_use]
    pub fn continue_button() -> Self {
        Self(CONTINUE_BUTTON_FOCUS_LABEL.to_owned())
    }

    /// A generated label for a freshly rendered interaction.
    #[must_use]
    pub fn generated(sequence: u64) -> Self {
        Self(format!("focus-label-{sequence}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FocusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::FocusLabel;

    #[test]
    fn content_labels_embed_card_index() {
        assert_eq!(FocusLabel::content(0).as_str(), "content-focus-label-0");
        assert_eq!(FocusLabel::content(7).as_str(), "content-focus-label-7");
    }

    #[test]
    fn generated_labels_are_distinct() {
        assert_ne!(FocusLabel::generated(1), FocusLabel::generated(2));
        assert_ne!(FocusLabel::generated(1), FocusLabel::continue_button());
    }
}
