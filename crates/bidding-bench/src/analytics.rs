use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use bidding_core::Points;
use plotters::prelude::*;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

use crate::sweep::OrderingRow;

const CONFIDENCE_LEVEL: f64 = 0.95;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to render plot: {0}")]
    Plot(String),
}

/// Accumulates sweep rows into distribution statistics.
pub struct SweepAnalytics {
    money: u32,
    values: Vec<Points>,
    value_counts: BTreeMap<Points, usize>,
    opening_counts: BTreeMap<String, usize>,
    shortfalls: Vec<ShortfallEntry>,
    target: Option<Points>,
}

impl SweepAnalytics {
    pub fn new(money: u32) -> Self {
        Self {
            money,
            values: Vec::new(),
            value_counts: BTreeMap::new(),
            opening_counts: BTreeMap::new(),
            shortfalls: Vec::new(),
            target: None,
        }
    }

    pub fn record(&mut self, row: &OrderingRow) {
        self.values.push(row.value);
        *self.value_counts.entry(row.value).or_insert(0) += 1;
        *self
            .opening_counts
            .entry(row.opening_move.clone())
            .or_insert(0) += 1;
        self.target.get_or_insert(row.target);
        if row.shortfall {
            self.shortfalls.push(ShortfallEntry {
                index: row.index,
                cards: row.cards.clone(),
                value: row.value,
                opening_move: row.opening_move.clone(),
            });
        }
    }

    pub fn finalize(self) -> AnalyticsSummary {
        let as_f64: Vec<f64> = self.values.iter().map(|&v| v as f64).collect();
        let mean = if as_f64.is_empty() {
            0.0
        } else {
            as_f64.iter().sum::<f64>() / as_f64.len() as f64
        };

        AnalyticsSummary {
            money: self.money,
            target: self.target.unwrap_or_default(),
            orderings: self.values.len(),
            min_value: self.values.iter().copied().min(),
            max_value: self.values.iter().copied().max(),
            mean_value: mean,
            ci95: confidence_interval(&as_f64),
            value_counts: self.value_counts,
            opening_counts: self.opening_counts,
            shortfalls: self.shortfalls,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortfallEntry {
    pub index: usize,
    pub cards: Vec<u32>,
    pub value: Points,
    pub opening_move: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSummary {
    pub money: u32,
    pub target: Points,
    pub orderings: usize,
    pub min_value: Option<Points>,
    pub max_value: Option<Points>,
    pub mean_value: f64,
    pub ci95: (f64, f64),
    pub value_counts: BTreeMap<Points, usize>,
    pub opening_counts: BTreeMap<String, usize>,
    pub shortfalls: Vec<ShortfallEntry>,
}

impl AnalyticsSummary {
    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        let mut rows = String::new();
        rows.push_str("# Ordering Sweep Summary\n\n");
        rows.push_str(&format!(
            "Money per player: {}, winning share: {}, orderings evaluated: {}\n\n",
            self.money, self.target, self.orderings
        ));
        rows.push_str(&format!(
            "Mean opening value {:.3} (95% CI [{:.3}, {:.3}]), range {}..={}\n\n",
            self.mean_value,
            self.ci95.0,
            self.ci95.1,
            display_opt(self.min_value),
            display_opt(self.max_value),
        ));

        rows.push_str("| Opening value | Orderings |\n");
        rows.push_str("|---------------|-----------|\n");
        for (value, count) in &self.value_counts {
            rows.push_str(&format!("| {value} | {count} |\n"));
        }

        rows.push_str("\n| Opening move | Orderings |\n");
        rows.push_str("|--------------|-----------|\n");
        for (action, count) in &self.opening_counts {
            rows.push_str(&format!("| {action} | {count} |\n"));
        }

        rows.push_str(&format!("\n## Shortfalls ({})\n\n", self.shortfalls.len()));
        if self.shortfalls.is_empty() {
            rows.push_str("No ordering keeps the opening bidder below the winning share.\n");
        } else {
            rows.push_str("| Index | Cards | Value | Opening move |\n");
            rows.push_str("|-------|-------|-------|--------------|\n");
            for entry in &self.shortfalls {
                rows.push_str(&format!(
                    "| {} | {:?} | {} | {} |\n",
                    entry.index, entry.cards, entry.value, entry.opening_move
                ));
            }
        }

        fs::write(path.as_ref(), rows).map_err(|e| AnalyticsError::Io {
            context: "writing summary markdown",
            source: e,
        })?;
        Ok(())
    }

    pub fn render_plot(&self, dir: impl AsRef<Path>) -> Result<PathBuf, AnalyticsError> {
        let dir = dir.as_ref();
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir).map_err(|e| AnalyticsError::Io {
                context: "creating plots directory",
                source: e,
            })?;
        }

        let output_path = dir.join("opening_values.png");
        let bars: Vec<(Points, usize)> = self
            .value_counts
            .iter()
            .map(|(&value, &count)| (value, count))
            .collect();
        let target = self.target;

        let prev_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(|_| {}));

        let plot_attempt = std::panic::catch_unwind(move || {
            let root = BitMapBackend::new(&output_path, (800, 480)).into_drawing_area();
            root.fill(&WHITE)
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            let max_count = bars.iter().map(|(_, count)| *count).max().unwrap_or(1);

            let mut chart = ChartBuilder::on(&root)
                .margin(20)
                .caption("Opening value per card ordering", ("sans-serif", 22))
                .set_label_area_size(LabelAreaPosition::Left, 50)
                .set_label_area_size(LabelAreaPosition::Bottom, 60)
                .build_cartesian_2d(0..bars.len(), 0..(max_count + max_count / 10 + 1))
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            chart
                .configure_mesh()
                .disable_mesh()
                .y_desc("Orderings")
                .x_desc("Opening value")
                .x_label_formatter(&|idx| {
                    bars.get(*idx)
                        .map(|(value, _)| value.to_string())
                        .unwrap_or_default()
                })
                .draw()
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            chart
                .draw_series(bars.iter().enumerate().map(|(idx, (value, count))| {
                    let color = if *value < target { &RED } else { &GREEN };
                    Rectangle::new([(idx, 0), (idx + 1, *count)], color.filled())
                }))
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            drop(chart);

            root.present()
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            drop(root);

            Ok(output_path)
        });

        std::panic::set_hook(prev_hook);

        match plot_attempt {
            Ok(result) => result,
            Err(_) => Err(AnalyticsError::Plot(
                "plotters panicked while rendering (missing font support?)".into(),
            )),
        }
    }
}

fn display_opt(value: Option<Points>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn confidence_interval(points: &[f64]) -> (f64, f64) {
    if points.is_empty() {
        return (0.0, 0.0);
    }
    let mean = points.iter().sum::<f64>() / points.len() as f64;
    if points.len() == 1 {
        return (mean, mean);
    }
    let variance = points
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / (points.len() as f64 - 1.0);
    let std_error = (variance / points.len() as f64).sqrt();
    let z = Normal::new(0.0, 1.0)
        .map(|normal| normal.inverse_cdf(0.5 + CONFIDENCE_LEVEL / 2.0))
        .unwrap_or(1.96);
    let margin = z * std_error;
    (mean - margin, mean + margin)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(index: usize, value: Points, opening: &str) -> OrderingRow {
        OrderingRow {
            run_id: "unit".to_string(),
            index,
            cards: vec![5, 4, 3, 2, 1],
            money: 8,
            value,
            target: 8,
            shortfall: value < 8,
            opening_move: opening.to_string(),
            opening_bid: None,
        }
    }

    #[test]
    fn summary_counts_values_and_shortfalls() {
        let mut analytics = SweepAnalytics::new(8);
        analytics.record(&row(0, 8, "raise to 4"));
        analytics.record(&row(1, 9, "raise to 4"));
        analytics.record(&row(2, 7, "raise to 5"));
        let summary = analytics.finalize();

        assert_eq!(summary.orderings, 3);
        assert_eq!(summary.target, 8);
        assert_eq!(summary.min_value, Some(7));
        assert_eq!(summary.max_value, Some(9));
        assert!((summary.mean_value - 8.0).abs() < 1e-9);
        assert!(summary.ci95.0 < 8.0 && summary.ci95.1 > 8.0);
        assert_eq!(summary.opening_counts.get("raise to 4"), Some(&2));
        assert_eq!(summary.shortfalls.len(), 1);
        assert_eq!(summary.shortfalls[0].index, 2);
    }

    #[test]
    fn interval_collapses_for_constant_values() {
        let (low, high) = confidence_interval(&[8.0, 8.0, 8.0]);
        assert_eq!(low, 8.0);
        assert_eq!(high, 8.0);
        assert_eq!(confidence_interval(&[]), (0.0, 0.0));
    }

    #[test]
    fn markdown_lists_distribution() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut analytics = SweepAnalytics::new(8);
        analytics.record(&row(0, 8, "raise to 4"));
        analytics.record(&row(1, 7, "forfeit"));
        let path = dir.path().join("summary.md");
        analytics.finalize().write_markdown(&path).expect("written");

        let text = fs::read_to_string(&path).expect("readable");
        assert!(text.contains("# Ordering Sweep Summary"));
        assert!(text.contains("| 8 | 1 |"));
        assert!(text.contains("| forfeit | 1 |"));
        assert!(text.contains("## Shortfalls (1)"));
    }
}
