use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const MAX_ENUMERATED_HIGH_CARD: u32 = 12;
const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root sweep configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SweepConfig {
    pub run_id: String,
    pub search: SearchConfig,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SweepConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: SweepConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        self.search.validate()?;
        self.outputs.validate(&self.run_id)?;
        self.logging.normalize();
        Ok(())
    }

    /// Resolve output templates (e.g., `{run_id}` placeholders) into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            jsonl: resolve_template(&self.run_id, &self.outputs.jsonl),
            summary_md: resolve_template(&self.run_id, &self.outputs.summary_md),
            plots_dir: resolve_template(&self.run_id, &self.outputs.plots_dir),
        }
    }
}

/// Which card orderings to evaluate and with how much money.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SearchConfig {
    /// Cards run from 1 to this value; the highest card always leads.
    pub highest_card: u32,
    /// Money per player; defaults to the fair share of the pot.
    #[serde(default)]
    pub money: Option<u32>,
    /// Evaluate this many random orderings instead of all of them.
    #[serde(default)]
    pub sample: Option<usize>,
    #[serde(default)]
    pub seed: Option<u64>,
    /// Stop enumerating after this many orderings.
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub threads: Option<usize>,
}

impl SearchConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.highest_card < 2 {
            return Err(ValidationError::InvalidField {
                field: "search.highest_card".to_string(),
                message: "at least two cards are required".to_string(),
            });
        }

        if self.pot() % 2 == 0 {
            return Err(ValidationError::InvalidField {
                field: "search.highest_card".to_string(),
                message: format!(
                    "cards 1..={} sum to {}; the pot must be odd so a fair split has a winner",
                    self.highest_card,
                    self.pot()
                ),
            });
        }

        if self.sample.is_none() && self.highest_card > MAX_ENUMERATED_HIGH_CARD {
            return Err(ValidationError::InvalidField {
                field: "search.highest_card".to_string(),
                message: format!(
                    "enumerating orderings is limited to cards up to {MAX_ENUMERATED_HIGH_CARD}; set search.sample"
                ),
            });
        }

        for (label, value) in [
            ("search.sample", self.sample),
            ("search.limit", self.limit),
            ("search.threads", self.threads),
        ] {
            if value == Some(0) {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "must be greater than zero when present".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Total points in play, `1 + 2 + ... + highest_card`.
    pub fn pot(&self) -> u64 {
        let n = u64::from(self.highest_card);
        n * (n + 1) / 2
    }

    /// Score needed to beat the other player.
    pub fn target(&self) -> u64 {
        let pot = self.pot();
        pot - pot / 2
    }

    pub fn money_per_player(&self) -> u32 {
        self.money
            .unwrap_or_else(|| u32::try_from(self.target()).unwrap_or(u32::MAX))
    }
}

/// Output artifact configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub jsonl: String,
    pub summary_md: String,
    pub plots_dir: String,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        for (label, value) in [
            ("outputs.jsonl", &self.jsonl),
            ("outputs.summary_md", &self.summary_md),
            ("outputs.plots_dir", &self.plots_dir),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "path must not be empty".to_string(),
                });
            }

            let resolved = resolve_template(run_id, value);
            if resolved.components().count() == 0 {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "resolved path is invalid".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Logging configuration defaults to disabled structured logs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id must not be empty".to_string(),
        });
    }

    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id may only contain alphanumeric characters, '.', '_' or '-'".to_string(),
        });
    }

    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    let replaced = template.replace("{run_id}", run_id);
    PathBuf::from(replaced)
}

/// Fully resolved output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
    pub plots_dir: PathBuf,
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}
