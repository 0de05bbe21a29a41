//! Power cards: one card of each kind per session, one use each.

use rand::Rng;

use super::GameEngine;
use crate::types::{OptionId, PowerCardType, SessionStatus};

impl GameEngine {
    /// Play a power card against the current question. Returns true when the
    /// card took effect. A spent card, a missing question, or (for
    /// swap-question) a fetch already in flight are silent no-ops: the swap
    /// is dropped rather than queued, and the card is not consumed.
    pub async fn use_power_card(&self, kind: PowerCardType) -> bool {
        let swap_fetch = {
            let mut guard = self.session.write().await;
            let Some(session) = guard.as_mut() else {
                return false;
            };
            if session.status != SessionStatus::Running || session.current_question.is_none() {
                return false;
            }
            match session.card(kind) {
                Some(card) if card.remaining > 0 => {}
                _ => return false,
            }

            match kind {
                PowerCardType::SwapQuestion => {
                    if session.fetching {
                        return false;
                    }
                    if let Some(card) = session.card_mut(kind) {
                        card.remaining -= 1;
                    }
                    tracing::info!("session {} swaps its question", session.id);
                    Some(session.id.clone())
                }
                PowerCardType::RemoveWrongOption => {
                    let Some(question) = session.current_question.as_mut() else {
                        return false;
                    };
                    // Never shrink a question below three visible options
                    if question.options.len() <= 3 {
                        return false;
                    }
                    let wrong_ids: Vec<OptionId> = question
                        .options
                        .iter()
                        .filter(|o| !o.is_odd_one_out)
                        .map(|o| o.id.clone())
                        .collect();
                    if wrong_ids.is_empty() {
                        return false;
                    }
                    let target = {
                        let mut rng = rand::rng();
                        wrong_ids[rng.random_range(0..wrong_ids.len())].clone()
                    };
                    question.options.retain(|o| o.id != target);

                    if let Some(card) = session.card_mut(kind) {
                        card.remaining -= 1;
                        card.is_active = true;
                    }
                    session.cards_used.insert(kind);
                    None
                }
                PowerCardType::DoubleScore => {
                    if let Some(card) = session.card_mut(kind) {
                        card.remaining -= 1;
                        card.is_active = true;
                    }
                    session.modifiers.double_score = true;
                    session.cards_used.insert(kind);
                    None
                }
                PowerCardType::KeepTime => {
                    if let Some(card) = session.card_mut(kind) {
                        card.remaining -= 1;
                        card.is_active = true;
                    }
                    session.modifiers.keep_time = true;
                    session.cards_used.insert(kind);
                    None
                }
            }
        };

        if let Some(session_id) = swap_fetch {
            let _ = self.fetch_next_question(&session_id).await;
        }
        true
    }
}
