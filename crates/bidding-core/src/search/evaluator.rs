use super::cache::{CacheStats, TranspositionCache};
use crate::model::{GameState, Points, StateError, Transition};
use serde::Serialize;
use std::cmp::Ordering;
use tracing::debug;

/// A move together with the value it concedes to the other player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredTransition {
    pub transition: Transition,
    /// Points the opponent can guarantee after this move: the immediate
    /// credit plus the value of the resulting position.
    pub reply: Points,
}

impl ScoredTransition {
    /// Value of the move for the player making it.
    pub fn value_for_mover(&self, pot: Points) -> Points {
        pot - self.reply
    }

    fn rank(&self, other: &Self) -> Ordering {
        self.reply
            .cmp(&other.reply)
            .then_with(|| self.transition.next.cmp(&other.transition.next))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    pub value: Points,
    pub pot: Points,
    pub cache: CacheStats,
}

/// Solves positions by exhaustive minimax over an owned cache.
///
/// The value of a state is the pot still in play minus the best the opponent
/// can guarantee after any of the mover's moves. Both players' optimal shares
/// of the same pot add up to the pot, which is what lets a single
/// minimisation stand in for alternating max/min levels.
#[derive(Debug, Default)]
pub struct Evaluator {
    cache: TranspositionCache,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache(cache: TranspositionCache) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &TranspositionCache {
        &self.cache
    }

    pub fn into_cache(self) -> TranspositionCache {
        self.cache
    }

    /// Points the mover of `state` can guarantee against optimal play.
    pub fn evaluate(&mut self, state: &GameState) -> Result<Points, StateError> {
        state.validate()?;
        let value = self.solve(state)?;
        debug!(
            target: "bidding_core::evaluate",
            state = %state,
            value,
            cached = self.cache.len(),
            "evaluated state"
        );
        Ok(value)
    }

    /// Like [`Evaluator::evaluate`], bundled with the pot and cache counters.
    pub fn evaluation(&mut self, state: &GameState) -> Result<Evaluation, StateError> {
        let value = self.evaluate(state)?;
        Ok(Evaluation {
            value,
            pot: state.cards().total(),
            cache: self.cache.stats(),
        })
    }

    /// All legal moves, best first for the mover.
    ///
    /// Ordered by the opponent's guaranteed reply, then by the resulting
    /// state, so the first entry is a deterministic optimal choice.
    pub fn scored_transitions(
        &mut self,
        state: &GameState,
    ) -> Result<Vec<ScoredTransition>, StateError> {
        state.validate()?;
        self.score(state)
    }

    /// The mover's optimal move, or `None` once the cards are exhausted.
    pub fn best_transition(
        &mut self,
        state: &GameState,
    ) -> Result<Option<ScoredTransition>, StateError> {
        Ok(self.scored_transitions(state)?.into_iter().next())
    }

    pub(crate) fn score(
        &mut self,
        state: &GameState,
    ) -> Result<Vec<ScoredTransition>, StateError> {
        let mut scored = state
            .transitions()?
            .into_iter()
            .map(|transition| -> Result<ScoredTransition, StateError> {
                let reply = transition.delta + self.solve(&transition.next)?;
                Ok(ScoredTransition { transition, reply })
            })
            .collect::<Result<Vec<_>, _>>()?;
        scored.sort_by(ScoredTransition::rank);
        Ok(scored)
    }

    fn solve(&mut self, state: &GameState) -> Result<Points, StateError> {
        if state.is_terminal() {
            return Ok(0);
        }
        if let Some(value) = self.cache.get(state) {
            return Ok(value);
        }

        let mut best_reply: Option<Points> = None;
        for transition in state.transitions()? {
            let reply = transition.delta + self.solve(&transition.next)?;
            best_reply = Some(best_reply.map_or(reply, |best| best.min(reply)));
        }
        let Some(best_reply) = best_reply else {
            unreachable!("non-terminal state {state} offers no forfeit");
        };

        let value = state.cards().total() - best_reply;
        self.cache.insert(state.clone(), value);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BidLevel, CardSequence, Move};

    #[test]
    fn terminal_state_is_worth_nothing() {
        let mut evaluator = Evaluator::new();
        let state = GameState::opening(8, CardSequence::empty());
        assert_eq!(evaluator.evaluate(&state), Ok(0));
        assert!(evaluator.cache().is_empty());
    }

    #[test]
    fn penniless_players_trade_cards_by_forfeit() {
        let mut evaluator = Evaluator::new();
        // A zero bid is free, so the mover can push the forfeit onto the opponent.
        assert_eq!(evaluator.evaluate(&GameState::opening(0, [3])), Ok(3));
        assert_eq!(evaluator.evaluate(&GameState::opening(0, [3, 1])), Ok(4));
    }

    #[test]
    fn small_positions_match_hand_analysis() {
        let mut evaluator = Evaluator::new();
        assert_eq!(evaluator.evaluate(&GameState::opening(1, [2, 1])), Ok(2));
        assert_eq!(evaluator.evaluate(&GameState::opening(2, [1, 2])), Ok(2));
        assert_eq!(evaluator.evaluate(&GameState::opening(3, [3, 2, 1])), Ok(3));
        let cornered = GameState::new(0, 5, [4], BidLevel::Standing(3));
        assert_eq!(evaluator.evaluate(&cornered), Ok(0));
    }

    #[test]
    fn invalid_state_is_rejected_before_search() {
        let mut evaluator = Evaluator::new();
        let state = GameState::new(4, 1, [3], BidLevel::Standing(2));
        assert!(matches!(
            evaluator.evaluate(&state),
            Err(StateError::StakeExceedsOpponentMoney { .. })
        ));
        assert!(evaluator.cache().is_empty());
    }

    #[test]
    fn scored_transitions_rank_by_reply_then_state() {
        let mut evaluator = Evaluator::new();
        let state = GameState::opening(1, [2, 1]);
        let scored = evaluator.scored_transitions(&state).unwrap();
        let replies: Vec<_> = scored.iter().map(|s| s.reply).collect();
        assert_eq!(replies, vec![1, 2, 3]);
        assert_eq!(scored[0].transition.action, Move::Raise(1));
        assert_eq!(scored[0].value_for_mover(state.cards().total()), 2);
    }

    #[test]
    fn best_transition_is_none_when_finished() {
        let mut evaluator = Evaluator::new();
        let state = GameState::opening(5, CardSequence::empty());
        assert_eq!(evaluator.best_transition(&state), Ok(None));
    }

    #[test]
    fn evaluation_reports_pot_and_cache() {
        let mut evaluator = Evaluator::new();
        let summary = evaluator
            .evaluation(&GameState::opening(3, [3, 2, 1]))
            .unwrap();
        assert_eq!(summary.value, 3);
        assert_eq!(summary.pot, 6);
        assert!(summary.cache.entries > 0);
        assert_eq!(summary.cache.entries, evaluator.cache().len());
    }
}
