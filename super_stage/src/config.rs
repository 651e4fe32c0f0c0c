//! Stage configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    bracket::strategy::SeedingStrategy,
    ledger::models::{ScoringRules, StageId},
    schedule::{models::EntrantId, round_robin::GROUP_SIZE},
};

/// How a stage is played
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageFormat {
    /// Fixed 8-entrant table, 7 rounds
    #[default]
    SuperEight,
    /// Fixed 12-entrant table, 11 rounds
    SuperTwelve,
    /// Groups of four, then an elimination bracket
    Grouped,
}

impl StageFormat {
    /// Cohort size imposed by the format, if any
    pub fn fixed_cohort(self) -> Option<usize> {
        match self {
            Self::SuperEight => Some(8),
            Self::SuperTwelve => Some(12),
            Self::Grouped => None,
        }
    }
}

impl fmt::Display for StageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::SuperEight => "super-8",
            Self::SuperTwelve => "super-12",
            Self::Grouped => "grouped",
        };
        write!(f, "{repr}")
    }
}

impl FromStr for StageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "super-8" | "super8" | "super-eight" => Ok(Self::SuperEight),
            "super-12" | "super12" | "super-twelve" => Ok(Self::SuperTwelve),
            "grouped" | "groups" => Ok(Self::Grouped),
            other => Err(format!(
                "unknown stage format '{other}' (expected super-8, super-12 or grouped)"
            )),
        }
    }
}

/// Complete stage configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageConfig {
    /// Stage identifier used for ledger scopes
    pub stage_id: StageId,
    pub format: StageFormat,
    /// Number of confirmed entrants
    pub cohort_size: usize,
    /// Members per group (fixed at 4)
    pub group_size: usize,
    /// Entrants per group that reach the bracket
    pub qualifiers_per_group: usize,
    pub seeding_strategy: SeedingStrategy,
    /// `None` counts, matching stages created before the flag existed
    pub counts_toward_ranking: Option<bool>,
    /// At most one per group
    pub seeded_ids: Vec<EntrantId>,
    pub scoring: ScoringRules,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            stage_id: "stage-1".to_string(),
            format: StageFormat::default(),
            cohort_size: 8,
            group_size: GROUP_SIZE,
            qualifiers_per_group: 2,
            seeding_strategy: SeedingStrategy::default(),
            counts_toward_ranking: None,
            seeded_ids: Vec::new(),
            scoring: ScoringRules::default(),
        }
    }
}

impl StageConfig {
    /// Load configuration from environment variables
    ///
    /// Numeric variables fall back to their defaults when missing or
    /// unparsable. Named variables (format, strategy) must parse when set.
    ///
    /// # Errors
    ///
    /// * `ConfigError::Invalid` - `STAGE_FORMAT`, `STAGE_SEEDING_STRATEGY` or
    ///   `STAGE_COUNTS_TOWARD_RANKING` holds an unknown value
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let format = parse_env_named::<StageFormat>("STAGE_FORMAT")?.unwrap_or(defaults.format);
        let seeding_strategy = parse_env_named::<SeedingStrategy>("STAGE_SEEDING_STRATEGY")?
            .unwrap_or(defaults.seeding_strategy);

        let counts_toward_ranking = match std::env::var("STAGE_COUNTS_TOWARD_RANKING") {
            Ok(raw) => Some(parse_flag(&raw).ok_or_else(|| ConfigError::Invalid {
                var: "STAGE_COUNTS_TOWARD_RANKING".to_string(),
                reason: format!("'{raw}' is not a boolean"),
            })?),
            Err(_) => None,
        };

        // Super-X formats default to their table size
        let default_cohort = format.fixed_cohort().unwrap_or(16);

        let seeded_ids = std::env::var("STAGE_SEEDED_IDS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let scoring = ScoringRules {
            group_win_points: parse_env_or("GROUP_WIN_POINTS", defaults.scoring.group_win_points),
            stage_win_points: parse_env_or("STAGE_WIN_POINTS", defaults.scoring.stage_win_points),
        };

        Ok(Self {
            stage_id: std::env::var("STAGE_ID").unwrap_or(defaults.stage_id),
            format,
            cohort_size: parse_env_or("STAGE_COHORT_SIZE", default_cohort),
            group_size: defaults.group_size,
            qualifiers_per_group: parse_env_or("STAGE_QUALIFIERS_PER_GROUP", defaults.qualifiers_per_group),
            seeding_strategy,
            counts_toward_ranking,
            seeded_ids,
            scoring,
        })
    }

    /// Number of groups a grouped stage forms
    pub fn group_count(&self) -> usize {
        self.cohort_size / self.group_size.max(1)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stage_id.trim().is_empty() {
            return Err(ConfigError::Invalid {
                var: "STAGE_ID".to_string(),
                reason: "Must not be empty".to_string(),
            });
        }

        if self.group_size != GROUP_SIZE {
            return Err(ConfigError::Invalid {
                var: "group_size".to_string(),
                reason: format!("Groups are fixed at {GROUP_SIZE} members"),
            });
        }

        match self.format.fixed_cohort() {
            Some(required) if self.cohort_size != required => {
                return Err(ConfigError::Invalid {
                    var: "STAGE_COHORT_SIZE".to_string(),
                    reason: format!("{} requires exactly {required} entrants", self.format),
                });
            }
            Some(_) => {}
            None => {
                if self.cohort_size < 2 * GROUP_SIZE || self.cohort_size % GROUP_SIZE != 0 {
                    return Err(ConfigError::Invalid {
                        var: "STAGE_COHORT_SIZE".to_string(),
                        reason: format!(
                            "Grouped stages need a multiple of {GROUP_SIZE}, at least {}",
                            2 * GROUP_SIZE
                        ),
                    });
                }
            }
        }

        if self.qualifiers_per_group == 0 || self.qualifiers_per_group > self.group_size {
            return Err(ConfigError::Invalid {
                var: "STAGE_QUALIFIERS_PER_GROUP".to_string(),
                reason: format!("Must be between 1 and {}", self.group_size),
            });
        }

        if self.format == StageFormat::Grouped && self.seeded_ids.len() > self.group_count() {
            return Err(ConfigError::Invalid {
                var: "STAGE_SEEDED_IDS".to_string(),
                reason: format!("At most one seed per group ({} groups)", self.group_count()),
            });
        }

        if self.scoring.group_win_points <= 0 {
            return Err(ConfigError::Invalid {
                var: "GROUP_WIN_POINTS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.scoring.stage_win_points <= 0 {
            return Err(ConfigError::Invalid {
                var: "STAGE_WIN_POINTS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parse a named variable; unknown names are an error rather than a default
fn parse_env_named<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr<Err = String>,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|reason| ConfigError::Invalid {
                var: key.to_string(),
                reason,
            }),
        Err(_) => Ok(None),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
