use std::fmt::Write as _;

use bidding_core::model::StateSnapshot;
use bidding_core::search::CacheStats;
use bidding_core::{Evaluator, GameState, LineStep, Move, Points, StateError};
use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize)]
pub struct MoveReport {
    pub action: Move,
    /// What the opponent can guarantee after this move.
    pub reply: Points,
    /// What the mover keeps if the move is played.
    pub value: Points,
}

/// Value of a position with every candidate move scored.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub state: StateSnapshot,
    pub pot: Points,
    pub value: Points,
    pub opponent_value: Points,
    pub best_move: Option<Move>,
    pub moves: Vec<MoveReport>,
    pub cache: CacheStats,
}

impl EvaluationReport {
    pub fn build(evaluator: &mut Evaluator, state: &GameState) -> Result<Self, StateError> {
        let value = evaluator.evaluate(state)?;
        let pot = state.cards().total();
        let moves: Vec<MoveReport> = evaluator
            .scored_transitions(state)?
            .into_iter()
            .map(|scored| MoveReport {
                action: scored.transition.action,
                reply: scored.reply,
                value: scored.value_for_mover(pot),
            })
            .collect();

        Ok(Self {
            state: StateSnapshot::capture(state),
            pot,
            value,
            opponent_value: pot - value,
            best_move: moves.first().map(|m| m.action),
            moves,
            cache: evaluator.cache().stats(),
        })
    }

    pub fn render_text(&self, state: &GameState) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{state} is worth {} to the current player", self.value);
        let _ = writeln!(
            out,
            "pot {}, opponent keeps {}",
            self.pot, self.opponent_value
        );
        if let Some(best) = self.best_move {
            let _ = writeln!(out, "best move: {best}");
        }
        for candidate in &self.moves {
            let _ = writeln!(
                out,
                "  {:<14} keeps {:>3} (opponent {:>3})",
                candidate.action.to_string(),
                candidate.value,
                candidate.reply
            );
        }
        let _ = writeln!(
            out,
            "cache: {} states, {} hits, {} misses",
            self.cache.entries, self.cache.hits, self.cache.misses
        );
        out
    }
}

/// An optimal line of play with the points each side collects.
#[derive(Debug, Clone, Serialize)]
pub struct LineReport {
    pub value: Points,
    pub first_player: Points,
    pub second_player: Points,
    pub moves: usize,
    pub steps: Vec<LineStep>,
}

impl LineReport {
    pub fn build(evaluator: &mut Evaluator, state: &GameState) -> Result<Self, StateError> {
        let line = evaluator.optimal_line(state)?;
        let (first_player, second_player) = line.tally();
        Ok(Self {
            value: line.start().map(|step| step.value).unwrap_or_default(),
            first_player,
            second_player,
            moves: line.moves(),
            steps: line.steps().to_vec(),
        })
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        if let Some(start) = self.steps.first() {
            let _ = writeln!(
                out,
                "{} is worth {} to the current player",
                start.state, self.value
            );
        }
        for (idx, step) in self.steps.iter().enumerate() {
            let mover = if idx % 2 == 0 { "first" } else { "second" };
            match step.action {
                Some(action) => {
                    let _ = writeln!(
                        out,
                        "{idx:>3}. {mover:<6} {} -> {action} (value {})",
                        step.state, step.value
                    );
                }
                None => {
                    let _ = writeln!(out, "{idx:>3}. {mover:<6} {} -> done", step.state);
                }
            }
        }
        let _ = writeln!(
            out,
            "{} moves; first player {} points, second player {} points",
            self.moves, self.first_player, self.second_player
        );
        out
    }
}

pub fn to_json<T: Serialize>(report: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluation_report_lists_best_move_first() {
        let mut evaluator = Evaluator::new();
        let state = GameState::opening(8, [5, 4, 3, 2, 1]);
        let report = EvaluationReport::build(&mut evaluator, &state).unwrap();
        assert_eq!(report.value, 8);
        assert_eq!(report.opponent_value, 7);
        assert_eq!(report.best_move, Some(Move::Raise(5)));
        assert_eq!(report.moves.len(), 1 + 9);
        assert_eq!(report.moves[0].value, 8);

        let text = report.render_text(&state);
        assert!(text.contains("is worth 8 to the current player"));
        assert!(text.contains("best move: raise to 5"));
    }

    #[test]
    fn line_report_tallies_both_players() {
        let mut evaluator = Evaluator::new();
        let state = GameState::opening(8, [5, 2, 4, 3, 1]);
        let report = LineReport::build(&mut evaluator, &state).unwrap();
        assert_eq!(report.value, 8);
        assert_eq!((report.first_player, report.second_player), (8, 7));
        assert_eq!(report.moves, 17);
        assert!(report.render_text().contains("17 moves; first player 8 points"));
    }

    #[test]
    fn json_report_uses_raw_bid_encoding() {
        let mut evaluator = Evaluator::new();
        let state = GameState::opening(1, [2, 1]);
        let report = EvaluationReport::build(&mut evaluator, &state).unwrap();
        let json = to_json(&report).unwrap();
        assert!(json.contains("\"bid\": -1"));
        assert!(json.contains("\"best_move\": {\n    \"raise\": 1\n  }"));
    }
}
