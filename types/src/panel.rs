use std::fmt;

/// A panel of the player view.
///
/// The tutor panel holds the conversation transcript; the supplemental panel
/// holds interactions too large to embed inline in a card. There is no third
/// panel, and which of these are shown is derived from viewport width and the
/// active card (never stored in lesson data).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelKind {
    Tutor,
    Supplemental,
}

impl PanelKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tutor => "tutor",
            Self::Supplemental => "supplemental",
        }
    }
}

impl fmt::Display for PanelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
