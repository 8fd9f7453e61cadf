use serde::{Deserialize, Serialize};
use splitmerge_consts::{DEFAULT_SCALE, DEFAULT_WEIGHT, MAX_DRAW_ATTEMPTS};

use crate::error::ConfigError;

/// Which Hastings-ratio computation the operator reports
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HastingsKind {
    /// Full reversible-jump correction: move-type and cluster-selection
    /// probabilities, coin flips, jitter density, and the Jacobian of the
    /// location transform.
    #[default]
    ReversibleJump,
    /// Always report a log ratio of zero. Only valid for symmetric,
    /// volume-preserving proposals, which this move is not. Useful for
    /// comparison runs.
    Neutral,
}

fn default_weight() -> f64 {
    DEFAULT_WEIGHT
}

fn default_scale() -> f64 {
    DEFAULT_SCALE
}

fn default_max_draw_attempts() -> usize {
    MAX_DRAW_ATTEMPTS
}

/// Configuration for `ClusterSplitMerge`
///
/// # Example
///
/// ```rust
/// # use splitmerge_kernel::{HastingsKind, SplitMergeConfig};
/// let config: SplitMergeConfig = serde_yaml::from_str("scale: 0.5").unwrap();
///
/// assert_eq!(config.scale, 0.5);
/// assert_eq!(config.weight, 1.0);
/// assert_eq!(config.hastings, HastingsKind::ReversibleJump);
/// ```
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SplitMergeConfig {
    /// Relative frequency with which the host selects this operator
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Scale, σ, of the split jitter
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Cap on the rejection-sampling loops
    #[serde(default = "default_max_draw_attempts")]
    pub max_draw_attempts: usize,
    #[serde(default)]
    pub hastings: HastingsKind,
}

impl SplitMergeConfig {
    pub fn new() -> Self {
        Self {
            weight: DEFAULT_WEIGHT,
            scale: DEFAULT_SCALE,
            max_draw_attempts: MAX_DRAW_ATTEMPTS,
            hastings: HastingsKind::default(),
        }
    }

    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn max_draw_attempts(mut self, max_draw_attempts: usize) -> Self {
        self.max_draw_attempts = max_draw_attempts;
        self
    }

    pub fn hastings(mut self, hastings: HastingsKind) -> Self {
        self.hastings = hastings;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.weight.is_finite() && self.weight > 0.0) {
            Err(ConfigError::InvalidWeight(self.weight))
        } else if !(self.scale.is_finite() && self.scale > 0.0) {
            Err(ConfigError::InvalidScale(self.scale))
        } else if self.max_draw_attempts == 0 {
            Err(ConfigError::ZeroDrawAttempts)
        } else {
            Ok(())
        }
    }
}

impl Default for SplitMergeConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_gives_defaults() {
        let config: SplitMergeConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, SplitMergeConfig::default());
    }

    #[test]
    fn neutral_hastings_from_yaml() {
        let config: SplitMergeConfig =
            serde_yaml::from_str("hastings: neutral\nweight: 3.0").unwrap();
        assert_eq!(config.hastings, HastingsKind::Neutral);
        assert_eq!(config.weight, 3.0);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let res: Result<SplitMergeConfig, _> =
            serde_yaml::from_str("sigma: 2.0");
        assert!(res.is_err());
    }

    #[test]
    fn validate_catches_bad_values() {
        assert_eq!(
            SplitMergeConfig::new().weight(0.0).validate(),
            Err(ConfigError::InvalidWeight(0.0))
        );
        assert_eq!(
            SplitMergeConfig::new().scale(-1.0).validate(),
            Err(ConfigError::InvalidScale(-1.0))
        );
        assert_eq!(
            SplitMergeConfig::new().max_draw_attempts(0).validate(),
            Err(ConfigError::ZeroDrawAttempts)
        );
        assert!(SplitMergeConfig::new().validate().is_ok());
    }

    #[test]
    fn nan_scale_is_invalid() {
        assert!(SplitMergeConfig::new().scale(f64::NAN).validate().is_err());
    }
}
