// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Tunable scheduling constants.
//!
//! Every threshold the engine uses lives here as a named default, and can be
//! overridden from a `revise.toml` file. The easiness bounds are not
//! configurable: `MIN_EASINESS` is an invariant of the SM-2 formula, not a
//! policy choice.

use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::Fallible;

/// Easiness factor of an item that has never been reviewed.
pub const DEFAULT_EASINESS: f64 = 2.5;

/// Lower bound of the easiness factor.
pub const MIN_EASINESS: f64 = 1.3;

/// An adaptive item graduates once it has this many consecutive passes...
pub const GRADUATION_REPETITIONS: u32 = 5;

/// ...or once its interval reaches this many days.
pub const GRADUATION_INTERVAL_DAYS: u32 = 21;

/// Days a completed item waits before it is archived.
pub const ARCHIVE_GRACE_DAYS: u32 = 30;

/// Days an archived item waits before it is deleted.
pub const DELETE_GRACE_DAYS: u32 = 60;

/// Items with at least this many lapses are leeches.
pub const LEECH_LAPSES: u32 = 4;

/// Upper bound on any interval, roughly a century.
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

/// Upper bound on every day count a config may set, a little over 2700
/// years. Keeps all date arithmetic inside the calendar.
pub const MAX_CONFIG_DAYS: u32 = 1_000_000;

/// The fixed-interval table of the legacy scheme, in days.
pub const LEGACY_STAGES: [u32; 5] = [1, 4, 7, 30, 90];

pub const OVERDUE_WEIGHT: f64 = 10.0;
pub const LAPSE_WEIGHT: f64 = 5.0;
pub const FORGETTING_WEIGHT: f64 = 0.1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerConfig {
    pub graduation_repetitions: u32,
    pub graduation_interval_days: u32,
    pub archive_grace_days: u32,
    pub delete_grace_days: u32,
    pub leech_lapses: u32,
    pub max_interval_days: u32,
    pub legacy_stages: Vec<u32>,
    pub priority: PriorityWeights,
}

/// Weights of the three terms of an item's review priority.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PriorityWeights {
    /// Per day past the due date.
    pub overdue: f64,
    /// Per lapse.
    pub lapses: f64,
    /// Per percentage point of estimated forgetting.
    pub forgetting: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            graduation_repetitions: GRADUATION_REPETITIONS,
            graduation_interval_days: GRADUATION_INTERVAL_DAYS,
            archive_grace_days: ARCHIVE_GRACE_DAYS,
            delete_grace_days: DELETE_GRACE_DAYS,
            leech_lapses: LEECH_LAPSES,
            max_interval_days: MAX_INTERVAL_DAYS,
            legacy_stages: LEGACY_STAGES.to_vec(),
            priority: PriorityWeights::default(),
        }
    }
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            overdue: OVERDUE_WEIGHT,
            lapses: LAPSE_WEIGHT,
            forgetting: FORGETTING_WEIGHT,
        }
    }
}

impl SchedulerConfig {
    /// Parse and validate a TOML config. Missing keys take their defaults.
    pub fn from_toml(source: &str) -> Fallible<Self> {
        let config: SchedulerConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Fallible<()> {
        if self.legacy_stages.is_empty() {
            return Err(invalid("legacy_stages must not be empty"));
        }
        if self.legacy_stages.contains(&0) {
            return Err(invalid("legacy_stages must all be at least one day"));
        }
        if self.legacy_stages.windows(2).any(|w| w[0] > w[1]) {
            return Err(invalid("legacy_stages must be in ascending order"));
        }
        let day_counts = [
            ("archive_grace_days", self.archive_grace_days),
            ("delete_grace_days", self.delete_grace_days),
            ("max_interval_days", self.max_interval_days),
            ("graduation_interval_days", self.graduation_interval_days),
        ];
        let stages = self.legacy_stages.iter().map(|&days| ("legacy_stages", days));
        for (name, days) in day_counts.into_iter().chain(stages) {
            if days > MAX_CONFIG_DAYS {
                return Err(invalid(format!(
                    "{name} must be at most {MAX_CONFIG_DAYS} days"
                )));
            }
        }
        if self.archive_grace_days == 0 || self.delete_grace_days == 0 {
            return Err(invalid("grace periods must be at least one day"));
        }
        if self.max_interval_days == 0 {
            return Err(invalid("max_interval_days must be at least one day"));
        }
        if self.graduation_repetitions == 0 || self.graduation_interval_days == 0 {
            return Err(invalid("graduation thresholds must be positive"));
        }
        let PriorityWeights {
            overdue,
            lapses,
            forgetting,
        } = self.priority;
        for (name, weight) in [
            ("overdue", overdue),
            ("lapses", lapses),
            ("forgetting", forgetting),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(invalid(format!(
                    "priority weight '{name}' must be a non-negative number"
                )));
            }
        }
        Ok(())
    }

    /// Index of the final legacy stage, the one that graduates an item.
    pub fn final_legacy_stage(&self) -> usize {
        self.legacy_stages.len() - 1
    }
}

fn invalid(msg: impl Into<String>) -> ErrorReport {
    ErrorReport::invalid_input(format!("invalid config: {}", msg.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_defaults_are_valid() -> Fallible<()> {
        SchedulerConfig::default().validate()
    }

    #[test]
    fn test_empty_toml_is_default() -> Fallible<()> {
        assert_eq!(SchedulerConfig::from_toml("")?, SchedulerConfig::default());
        Ok(())
    }

    #[test]
    fn test_partial_override() -> Fallible<()> {
        let config = SchedulerConfig::from_toml(
            r#"
            archive_grace_days = 7

            [priority]
            lapses = 2.5
            "#,
        )?;
        assert_eq!(config.archive_grace_days, 7);
        assert_eq!(config.delete_grace_days, DELETE_GRACE_DAYS);
        assert_eq!(config.priority.lapses, 2.5);
        assert_eq!(config.priority.overdue, OVERDUE_WEIGHT);
        Ok(())
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = SchedulerConfig::from_toml("archive_grace = 7").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_huge_grace_period_rejected() {
        let err = SchedulerConfig::from_toml("archive_grace_days = 4000000000").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        let err = SchedulerConfig::from_toml("delete_grace_days = 1000001").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_huge_max_interval_rejected() -> Fallible<()> {
        let err = SchedulerConfig::from_toml("max_interval_days = 4000000000").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        let config = SchedulerConfig::from_toml(&format!("max_interval_days = {MAX_CONFIG_DAYS}"))?;
        assert_eq!(config.max_interval_days, MAX_CONFIG_DAYS);
        Ok(())
    }

    #[test]
    fn test_invalid_values_rejected() {
        let cases = [
            "legacy_stages = []",
            "legacy_stages = [1, 0, 7]",
            "legacy_stages = [7, 4, 1]",
            "archive_grace_days = 0",
            "max_interval_days = 0",
            "[priority]\noverdue = -1.0",
            "[priority]\nforgetting = nan",
            "legacy_stages = [1, 4, 4000000000]",
            "graduation_interval_days = 1000001",
        ];
        for source in cases {
            let err = SchedulerConfig::from_toml(source).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput, "{source}");
        }
    }
}
