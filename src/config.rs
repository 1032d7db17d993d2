//! Application-level configuration loading, including the runtime cup format presets.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::engine::{
    BracketStrategy, SeedingPolicy, resolver::PercentAggregation, standings::RankingRule,
};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/formats.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "CLASH_CUP_BACK_CONFIG_PATH";

/// Complete description of a cup format: roster shape, scoring conventions
/// and the ordered bracket stages. Selected once per cup at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct FormatSpec {
    /// Players per team; every stat submission must carry exactly this many lines.
    pub roster_size: usize,
    /// How per-player percentages fold into the match aggregate.
    pub percent_aggregation: PercentAggregation,
    /// Ranking key for standings.
    pub ranking: RankingRule,
    /// Whether registrations wait in `pending` until staff approval.
    pub approval_gate: bool,
    /// Bracket stages in play order; stage n+1 opens once stage n is exhausted.
    pub stages: Vec<BracketStrategy>,
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    formats: IndexMap<String, FormatSpec>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to the
    /// baked-in format presets.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        count = app_config.formats.len(),
                        "loaded cup format presets from config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Look up a format preset by name.
    pub fn format(&self, name: &str) -> Option<&FormatSpec> {
        self.formats.get(name)
    }

    /// Names of the available presets, in configuration order.
    pub fn format_names(&self) -> impl Iterator<Item = &str> {
        self.formats.keys().map(String::as_str)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            formats: default_formats(),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    formats: IndexMap<String, FormatSpec>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            formats: value.formats,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Built-in format presets shipped with the binary.
///
/// Percent conventions are deliberate per roster size: 5-player wars store
/// the per-player average, 3-player wars the sum.
fn default_formats() -> IndexMap<String, FormatSpec> {
    IndexMap::from([
        (
            "war5v5_league".to_owned(),
            FormatSpec {
                roster_size: 5,
                percent_aggregation: PercentAggregation::Average,
                ranking: RankingRule::PointsPercent,
                approval_gate: false,
                stages: vec![
                    BracketStrategy::RoundRobin { legs: 1 },
                    BracketStrategy::PagePlayoff,
                ],
            },
        ),
        (
            "war3v3_knockout".to_owned(),
            FormatSpec {
                roster_size: 3,
                percent_aggregation: PercentAggregation::Sum,
                ranking: RankingRule::WinsStarsPercent,
                approval_gate: true,
                stages: vec![
                    BracketStrategy::SingleElimination {
                        seeding: SeedingPolicy::Random,
                    },
                    BracketStrategy::PagePlayoff,
                ],
            },
        ),
        (
            "war3v3_double_elim".to_owned(),
            FormatSpec {
                roster_size: 3,
                percent_aggregation: PercentAggregation::Sum,
                ranking: RankingRule::WinsStarsPercent,
                approval_gate: true,
                stages: vec![
                    BracketStrategy::SingleElimination {
                        seeding: SeedingPolicy::Sequential,
                    },
                    BracketStrategy::DoubleElimination,
                ],
            },
        ),
    ])
}
