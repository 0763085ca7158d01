//! Focus label generation.

use colloquy_types::FocusLabel;

/// Hands out fresh labels for newly rendered interactions.
///
/// Every render gets its own label so a focus request can never land on a
/// stale copy of an interaction that has since been replaced.
#[derive(Debug, Default)]
pub(crate) struct FocusLabelGenerator {
    next: u64,
}

impl FocusLabelGenerator {
    pub(crate) fn generate(&mut self) -> FocusLabel {
        let label = FocusLabel::generated(self.next);
        self.next += 1;
        label
    }
}
