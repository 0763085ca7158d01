//! Append-only transcript of the learner's path through a lesson.

use serde::Serialize;
use thiserror::Error;

use colloquy_types::{Card, CardError, StateName};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TranscriptError {
    #[error("cannot append a card while the card for `{0}` is still open")]
    PreviousCardStillOpen(StateName),
    #[error("transcript has no active card")]
    NoActiveCard,
    #[error(transparent)]
    Card(#[from] CardError),
}

/// Every card the learner has seen, in order.
///
/// Cards are appended and never removed or reordered. A new card may only be
/// appended once the current tail is sealed, so at any moment there is at most
/// one card whose answer history can still grow.
#[derive(Debug, Default, Serialize)]
#[serde(transparent)]
pub struct Transcript {
    cards: Vec<Card>,
}

impl Transcript {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a card and returns its index. The previous tail must already
    /// be sealed.
    pub fn add_card(&mut self, card: Card) -> Result<usize, TranscriptError> {
        if let Some(tail) = self.cards.last()
            && !tail.is_sealed()
        {
            return Err(TranscriptError::PreviousCardStillOpen(
                tail.state_name().clone(),
            ));
        }
        self.cards.push(card);
        Ok(self.cards.len() - 1)
    }

    /// Records a submitted answer on the tail card.
    pub fn record_answer(&mut self, answer: impl Into<String>) -> Result<(), TranscriptError> {
        self.tail_mut()?.record_answer(answer)?;
        Ok(())
    }

    /// Attaches feedback to the tail card's most recent answer.
    pub fn record_feedback(&mut self, feedback: impl Into<String>) -> Result<(), TranscriptError> {
        self.tail_mut()?.record_feedback(feedback)?;
        Ok(())
    }

    /// Seals the tail card with the state the learner is moving to.
    pub fn set_destination(&mut self, dest_state_name: StateName) -> Result<(), TranscriptError> {
        self.tail_mut()?.seal(dest_state_name)?;
        Ok(())
    }

    /// Replaces the tail card's interaction markup.
    pub fn refresh_interaction(&mut self, interaction_html: impl Into<String>) -> Result<(), TranscriptError> {
        self.tail_mut()?.replace_interaction(interaction_html)?;
        Ok(())
    }

    fn tail_mut(&mut self) -> Result<&mut Card, TranscriptError> {
        self.cards.last_mut().ok_or(TranscriptError::NoActiveCard)
    }

    #[must_use]
    pub fn card(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }

    #[must_use]
    pub fn last_card(&self) -> Option<&Card> {
        self.cards.last()
    }

    #[must_use]
    pub fn is_last_card(&self, index: usize) -> bool {
        !self.cards.is_empty() && index == self.cards.len() - 1
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{Transcript, TranscriptError};
    use colloquy_types::{Card, LearnerParams, StateName};

    fn card(state: &str) -> Card {
        Card::new(
            StateName::from(state),
            LearnerParams::new(),
            format!("<p>{state}</p>"),
            "<input/>",
        )
    }

    #[test]
    fn append_requires_sealed_tail() {
        let mut transcript = Transcript::new();
        assert_eq!(transcript.add_card(card("intro")), Ok(0));

        assert_eq!(
            transcript.add_card(card("middle")),
            Err(TranscriptError::PreviousCardStillOpen(StateName::from(
                "intro"
            )))
        );

        transcript.set_destination(StateName::from("middle")).unwrap();
        assert_eq!(transcript.add_card(card("middle")), Ok(1));
        assert_eq!(transcript.len(), 2);
    }

    #[test]
    fn tail_operations_need_a_card() {
        let mut transcript = Transcript::new();
        assert_eq!(
            transcript.record_answer("5"),
            Err(TranscriptError::NoActiveCard)
        );
        assert_eq!(
            transcript.record_feedback("nope"),
            Err(TranscriptError::NoActiveCard)
        );
    }

    #[test]
    fn answers_and_feedback_land_on_the_tail() {
        let mut transcript = Transcript::new();
        transcript.add_card(card("intro")).unwrap();
        transcript.set_destination(StateName::from("middle")).unwrap();
        transcript.add_card(card("middle")).unwrap();

        transcript.record_answer("5").unwrap();
        transcript.record_feedback("Try again").unwrap();

        assert!(transcript.card(0).unwrap().answer_feedback_pairs().is_empty());
        let pairs = transcript.card(1).unwrap().answer_feedback_pairs();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].answer(), "5");
        assert_eq!(pairs[0].feedback(), Some("Try again"));
    }

    #[test]
    fn last_card_index_tracks_growth() {
        let mut transcript = Transcript::new();
        assert!(!transcript.is_last_card(0));

        transcript.add_card(card("intro")).unwrap();
        assert!(transcript.is_last_card(0));

        transcript.set_destination(StateName::from("end")).unwrap();
        transcript.add_card(card("end")).unwrap();
        assert!(!transcript.is_last_card(0));
        assert!(transcript.is_last_card(1));
    }

    #[test]
    fn serializes_as_a_card_list() {
        let mut transcript = Transcript::new();
        transcript.add_card(card("intro")).unwrap();
        transcript.record_answer("5").unwrap();

        let json = serde_json::to_value(&transcript).unwrap();
        assert_eq!(json[0]["state_name"], "intro");
        assert_eq!(json[0]["answer_feedback_pairs"][0]["answer"], "5");
    }
}
