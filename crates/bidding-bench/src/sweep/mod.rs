mod orderings;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use bidding_core::{CardSequence, Evaluator, GameState, Points, StateError, TranspositionCache};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{Level, event};

use crate::analytics::{AnalyticsError, AnalyticsSummary, SweepAnalytics};
use crate::config::{ResolvedOutputs, SweepConfig};

pub use orderings::CardOrderings;

type WorkerOutput = (Vec<OrderingRow>, TranspositionCache);

/// Evaluates the opening position of many card orderings and records which
/// ones leave the opening bidder short of a winning share.
pub struct SweepRunner {
    config: SweepConfig,
    outputs: ResolvedOutputs,
    orderings: CardOrderings,
}

/// Summary details returned after a run.
pub struct SweepSummary {
    pub orderings: usize,
    pub shortfalls: usize,
    pub distinct_states: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub plot_path: Option<PathBuf>,
    pub analytics: AnalyticsSummary,
}

/// One JSONL row per evaluated ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderingRow {
    pub run_id: String,
    pub index: usize,
    pub cards: Vec<u32>,
    pub money: u32,
    pub value: Points,
    pub target: Points,
    pub shortfall: bool,
    pub opening_move: String,
    pub opening_bid: Option<u32>,
}

impl SweepRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: SweepConfig, outputs: ResolvedOutputs) -> Result<Self, SweepError> {
        let search = &config.search;
        let orderings = match search.sample {
            Some(count) => {
                CardOrderings::sampled(search.highest_card, count, search.seed.unwrap_or(0))
            }
            None => CardOrderings::enumerate(search.highest_card, search.limit),
        };
        if orderings.is_empty() {
            return Err(SweepError::NoOrderings);
        }

        Ok(Self {
            config,
            outputs,
            orderings,
        })
    }

    pub fn orderings(&self) -> &CardOrderings {
        &self.orderings
    }

    /// Evaluate every ordering, streaming JSONL rows to disk.
    pub fn run(&self) -> Result<SweepSummary, SweepError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let money = self.config.search.money_per_player();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.search.threads.unwrap_or(0))
            .build()?;
        let workers = pool.current_num_threads().max(1);
        let orderings = self.orderings.as_slice();
        let chunk_size = orderings.len().div_ceil(workers).max(1);

        event!(
            Level::INFO,
            run_id = %self.config.run_id,
            orderings = orderings.len(),
            workers,
            money,
            "starting ordering sweep"
        );

        let run_id = self.config.run_id.as_str();
        // Each worker owns a private cache; they are merged once all are done.
        let chunks: Vec<WorkerOutput> = pool.install(|| {
            orderings
                .par_chunks(chunk_size)
                .enumerate()
                .map(|(chunk_index, chunk)| -> Result<WorkerOutput, SweepError> {
                    let mut evaluator = Evaluator::new();
                    let rows = chunk
                        .iter()
                        .enumerate()
                        .map(|(offset, cards)| {
                            evaluate_ordering(
                                &mut evaluator,
                                run_id,
                                chunk_index * chunk_size + offset,
                                cards,
                                money,
                            )
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    event!(
                        Level::DEBUG,
                        chunk_index,
                        rows = rows.len(),
                        cached = evaluator.cache().len(),
                        "worker finished"
                    );
                    Ok((rows, evaluator.into_cache()))
                })
                .collect::<Result<Vec<_>, SweepError>>()
        })?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut analytics = SweepAnalytics::new(money);
        let mut merged = TranspositionCache::new();
        let mut rows_written = 0usize;

        for (rows, cache) in chunks {
            merged.merge(cache);
            for row in rows {
                if row.shortfall {
                    event!(
                        Level::INFO,
                        index = row.index,
                        cards = ?row.cards,
                        value = row.value,
                        target = row.target,
                        "ordering leaves the opening bidder short"
                    );
                }
                serde_json::to_writer(&mut writer, &row)?;
                writer.write_all(b"\n")?;
                analytics.record(&row);
                rows_written += 1;
            }
        }
        writer.flush()?;

        let summary = analytics.finalize();
        summary.write_markdown(&self.outputs.summary_md)?;
        let plot_path = match summary.render_plot(&self.outputs.plots_dir) {
            Ok(path) => Some(path),
            Err(err) => {
                eprintln!("WARN: {}", err);
                None
            }
        };

        event!(
            Level::INFO,
            run_id = %self.config.run_id,
            rows_written,
            shortfalls = summary.shortfalls.len(),
            distinct_states = merged.len(),
            "ordering sweep complete"
        );

        Ok(SweepSummary {
            orderings: rows_written,
            shortfalls: summary.shortfalls.len(),
            distinct_states: merged.len(),
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            plot_path,
            analytics: summary,
        })
    }
}

/// Opening value and opening move for one card ordering.
pub fn evaluate_ordering(
    evaluator: &mut Evaluator,
    run_id: &str,
    index: usize,
    cards: &CardSequence,
    money: u32,
) -> Result<OrderingRow, StateError> {
    let state = GameState::opening(money, cards.clone());
    let value = evaluator.evaluate(&state)?;
    let opening = evaluator
        .best_transition(&state)?
        .map(|best| best.transition.action);
    let target = cards.fair_share();

    Ok(OrderingRow {
        run_id: run_id.to_string(),
        index,
        cards: cards.as_slice().to_vec(),
        money,
        value,
        target,
        shortfall: value < target,
        opening_move: opening
            .map(|action| action.to_string())
            .unwrap_or_else(|| "none".to_string()),
        opening_bid: opening.and_then(|action| action.raised_to()),
    })
}

fn ensure_parent(path: Option<&Path>) -> Result<(), SweepError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("configuration produced no card orderings")]
    NoOrderings,
    #[error("failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("invalid opening state: {0}")]
    State(#[from] StateError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize row: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),
}
