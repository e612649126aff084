//! Sync configuration contracts that can be shared across crates.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::{ContractError, MICROS_PER_SECOND};

pub const DEFAULT_GRID_INTERVAL_MS: u64 = 10;
pub const DEFAULT_MIN_OVERLAP_S: f64 = 1.0;
pub const DEFAULT_OUTLIER_SIGMA: f64 = 3.0;
pub const DEFAULT_DRIFT_SIGMA: f64 = 3.0;
pub const DEFAULT_DRIFT_WINDOW: usize = 50;
pub const DEFAULT_INTERPOLATION_WINDOW: usize = 5;
pub const DEFAULT_WEIGHT_EPSILON: f64 = 1e-6;
pub const DEFAULT_SPLINE_MIN_POINTS: usize = 4;
pub const DEFAULT_MEDIAN_KERNEL: usize = 3;
pub const DEFAULT_QUALITY_WINDOW: usize = 100;

/// Synchronization configuration
///
/// Every field has a named default; a partial file only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SyncConfig {
    /// Grid spacing in milliseconds
    #[validate(range(min = 1))]
    pub grid_interval_ms: u64,

    /// Minimum accepted overlap of the two streams (seconds)
    #[validate(range(exclusive_min = 0.0))]
    pub min_overlap_s: f64,

    /// Outlier band half-width for angular-rate cleaning (in σ)
    #[validate(range(exclusive_min = 0.0))]
    pub outlier_sigma: f64,

    /// Drift band half-width (in σ)
    #[validate(range(exclusive_min = 0.0))]
    pub drift_sigma: f64,

    /// Rolling window for drift detection (intervals)
    #[validate(range(min = 2))]
    pub drift_window: usize,

    /// Half-width of the weighting window (grid steps)
    pub interpolation_window: usize,

    /// Weight regularizer added to |Δt| (seconds)
    #[validate(range(exclusive_min = 0.0))]
    pub weight_epsilon: f64,

    /// Fewer valid points than this skip the spline
    #[validate(range(min = 2))]
    pub spline_min_points: usize,

    /// Median filter kernel (odd)
    #[validate(custom(function = "validate_odd_kernel"))]
    pub median_kernel: usize,

    /// Rows per quality window
    #[validate(range(min = 2))]
    pub quality_window: usize,

    /// Drop every row that still has a missing cell after trimming
    pub drop_incomplete_rows: bool,

    /// Merge densely spaced magnetometer rows before synchronizing
    pub coalesce_magnetometer: bool,

    /// Dense-sample coalescing parameters
    #[validate(nested)]
    pub coalesce: CoalesceConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            grid_interval_ms: DEFAULT_GRID_INTERVAL_MS,
            min_overlap_s: DEFAULT_MIN_OVERLAP_S,
            outlier_sigma: DEFAULT_OUTLIER_SIGMA,
            drift_sigma: DEFAULT_DRIFT_SIGMA,
            drift_window: DEFAULT_DRIFT_WINDOW,
            interpolation_window: DEFAULT_INTERPOLATION_WINDOW,
            weight_epsilon: DEFAULT_WEIGHT_EPSILON,
            spline_min_points: DEFAULT_SPLINE_MIN_POINTS,
            median_kernel: DEFAULT_MEDIAN_KERNEL,
            quality_window: DEFAULT_QUALITY_WINDOW,
            drop_incomplete_rows: false,
            coalesce_magnetometer: false,
            coalesce: CoalesceConfig::default(),
        }
    }
}

impl SyncConfig {
    /// Grid spacing in microseconds
    pub fn grid_step_us(&self) -> i64 {
        self.grid_interval_ms as i64 * MICROS_PER_SECOND / 1000
    }

    /// Grid spacing in seconds
    pub fn grid_step_secs(&self) -> f64 {
        self.grid_interval_ms as f64 / 1000.0
    }

    /// Check the declared field ranges, reporting the first failing field
    pub fn check_ranges(&self) -> Result<(), ContractError> {
        self.validate().map_err(|errors| first_error(&errors, ""))
    }
}

/// Flatten `ValidationErrors` into the first error by field name
fn first_error(errors: &ValidationErrors, prefix: &str) -> ContractError {
    let mut fields: Vec<_> = errors.errors().iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    for (field, kind) in fields {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                if let Some(err) = list.first() {
                    let message = match &err.message {
                        Some(message) => message.to_string(),
                        None => format!("failed '{}' check", err.code),
                    };
                    return ContractError::config_validation(path, message);
                }
            }
            ValidationErrorsKind::Struct(nested) => return first_error(nested, &path),
            ValidationErrorsKind::List(items) => {
                if let Some((idx, nested)) = items.iter().next() {
                    return first_error(nested, &format!("{path}[{idx}]"));
                }
            }
        }
    }
    ContractError::config_validation(prefix, "invalid value")
}

/// Dense-sample coalescer parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CoalesceConfig {
    /// Expected device interval (seconds)
    #[validate(range(exclusive_min = 0.0))]
    pub nominal_interval_s: f64,

    /// Accumulated early-arrival error that triggers a merge (seconds)
    #[validate(range(exclusive_min = 0.0))]
    pub error_budget_s: f64,

    /// Device-local time column (seconds)
    #[validate(length(min = 1))]
    pub time_column: String,
}

impl Default for CoalesceConfig {
    fn default() -> Self {
        Self {
            nominal_interval_s: 0.01,
            error_budget_s: 0.003,
            time_column: "time".into(),
        }
    }
}

fn validate_odd_kernel(kernel: usize) -> Result<(), ValidationError> {
    if kernel == 0 || kernel % 2 == 0 {
        let mut err = ValidationError::new("odd_kernel");
        err.message = Some(format!("median kernel must be odd and positive, got {kernel}").into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = SyncConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.grid_step_us(), 10_000);
        assert!((config.grid_step_secs() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_even_kernel_rejected() {
        let config = SyncConfig {
            median_kernel: 4,
            ..Default::default()
        };
        let errors = config.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("median_kernel"));
    }

    #[test]
    fn test_check_ranges_names_field() {
        let mut config = SyncConfig {
            grid_interval_ms: 0,
            ..Default::default()
        };
        match config.check_ranges() {
            Err(ContractError::ConfigValidation { field, .. }) => {
                assert_eq!(field, "grid_interval_ms")
            }
            other => panic!("expected validation error, got {other:?}"),
        }

        config.grid_interval_ms = 10;
        config.coalesce.error_budget_s = 0.0;
        match config.check_ranges() {
            Err(ContractError::ConfigValidation { field, .. }) => {
                assert_eq!(field, "coalesce.error_budget_s")
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: SyncConfig = serde_json::from_str(r#"{"grid_interval_ms": 20}"#).unwrap();
        assert_eq!(config.grid_interval_ms, 20);
        assert_eq!(config.drift_window, DEFAULT_DRIFT_WINDOW);
        assert_eq!(config.coalesce.time_column, "time");
    }
}
