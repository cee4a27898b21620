use super::evaluator::Evaluator;
use crate::model::{GameState, Move, Points, StateError};
use serde::Serialize;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineStep {
    pub state: GameState,
    /// Value of `state` for its mover.
    pub value: Points,
    /// Move played from `state`; `None` on the final, card-less step.
    pub action: Option<Move>,
    /// Points credited to the next mover by `action`.
    pub credited: Points,
}

/// One concrete line of optimal play from a starting position to the end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptimalLine {
    steps: Vec<LineStep>,
}

impl OptimalLine {
    pub fn steps(&self) -> &[LineStep] {
        &self.steps
    }

    pub fn start(&self) -> Option<&LineStep> {
        self.steps.first()
    }

    pub fn moves(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    /// Points collected along the line by the starting mover and by the
    /// other player, in that order.
    pub fn tally(&self) -> (Points, Points) {
        let mut totals = [0, 0];
        for (idx, step) in self.steps.iter().enumerate() {
            // Step `idx` is moved by player `idx % 2`; its credit goes to the other one.
            totals[(idx + 1) % 2] += step.credited;
        }
        (totals[0], totals[1])
    }
}

impl Evaluator {
    /// Follows the best move for whoever is to act until the cards run out.
    pub fn optimal_line(&mut self, state: &GameState) -> Result<OptimalLine, StateError> {
        state.validate()?;
        let mut steps = Vec::new();
        let mut current = state.clone();
        loop {
            let value = self.evaluate(&current)?;
            let Some(best) = self.score(&current)?.into_iter().next() else {
                steps.push(LineStep {
                    state: current,
                    value,
                    action: None,
                    credited: 0,
                });
                break;
            };
            trace!(
                target: "bidding_core::line",
                state = %current,
                value,
                action = %best.transition.action,
                "line step"
            );
            steps.push(LineStep {
                state: current,
                value,
                action: Some(best.transition.action),
                credited: best.transition.delta,
            });
            current = best.transition.next;
        }
        Ok(OptimalLine { steps })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BidLevel, CardSequence};

    #[test]
    fn single_card_line_forfeits_or_bids() {
        let mut evaluator = Evaluator::new();
        let line = evaluator.optimal_line(&GameState::opening(0, [3])).unwrap();
        // Bidding zero forces the opponent to forfeit the only card.
        assert_eq!(line.steps()[0].action, Some(Move::Raise(0)));
        assert_eq!(line.steps()[1].action, Some(Move::Forfeit));
        assert_eq!(line.moves(), 2);
        assert_eq!(line.tally(), (3, 0));
    }

    #[test]
    fn line_ends_on_terminal_step() {
        let mut evaluator = Evaluator::new();
        let line = evaluator
            .optimal_line(&GameState::opening(2, [1, 2]))
            .unwrap();
        let last = line.steps().last().unwrap();
        assert!(last.state.is_terminal());
        assert_eq!(last.action, None);
        assert_eq!(last.value, 0);
        let (first, second) = line.tally();
        assert_eq!(first, 2);
        assert_eq!(first + second, 3);
    }

    #[test]
    fn terminal_start_yields_single_step() {
        let mut evaluator = Evaluator::new();
        let state = GameState::new(1, 4, CardSequence::empty(), BidLevel::Open);
        let line = evaluator.optimal_line(&state).unwrap();
        assert_eq!(line.moves(), 0);
        assert_eq!(line.tally(), (0, 0));
        assert_eq!(line.start().map(|s| &s.state), Some(&state));
    }
}
