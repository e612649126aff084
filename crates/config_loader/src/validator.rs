//! Config validation
//!
//! Rules:
//! - field ranges declared on `SyncConfig` (validator derive)
//! - coalescing budget below the nominal interval
//! - overlap requirement of at least one grid step
//! - median kernel no wider than the spline minimum

use contracts::{ContractError, SyncConfig};

/// Validate a `SyncConfig`
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &SyncConfig) -> Result<(), ContractError> {
    validate_ranges(config)?;
    validate_coalesce_budget(config)?;
    validate_overlap(config)?;
    validate_median_kernel(config)?;
    Ok(())
}

fn validate_ranges(config: &SyncConfig) -> Result<(), ContractError> {
    config.check_ranges()
}

fn validate_coalesce_budget(config: &SyncConfig) -> Result<(), ContractError> {
    let c = &config.coalesce;
    if c.error_budget_s >= c.nominal_interval_s {
        return Err(ContractError::config_validation(
            "coalesce.error_budget_s / coalesce.nominal_interval_s",
            format!(
                "error_budget_s ({}) must be < nominal_interval_s ({})",
                c.error_budget_s, c.nominal_interval_s
            ),
        ));
    }
    Ok(())
}

fn validate_overlap(config: &SyncConfig) -> Result<(), ContractError> {
    if config.min_overlap_s < config.grid_step_secs() {
        return Err(ContractError::config_validation(
            "min_overlap_s",
            format!(
                "min_overlap_s ({}) must cover at least one grid step ({} ms)",
                config.min_overlap_s, config.grid_interval_ms
            ),
        ));
    }
    Ok(())
}

fn validate_median_kernel(config: &SyncConfig) -> Result<(), ContractError> {
    if config.median_kernel > config.spline_min_points {
        return Err(ContractError::config_validation(
            "median_kernel / spline_min_points",
            format!(
                "median_kernel ({}) must be <= spline_min_points ({})",
                config.median_kernel, config.spline_min_points
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&SyncConfig::default()).is_ok());
    }

    #[test]
    fn test_zero_grid_interval() {
        let config = SyncConfig {
            grid_interval_ms: 0,
            ..Default::default()
        };
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("grid_interval_ms"), "got: {err}");
    }

    #[test]
    fn test_nested_field_path() {
        let mut config = SyncConfig::default();
        config.coalesce.time_column = String::new();
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("coalesce.time_column"), "got: {err}");
    }

    #[test]
    fn test_budget_must_be_below_interval() {
        let mut config = SyncConfig::default();
        config.coalesce.error_budget_s = 0.02;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("error_budget_s"), "got: {err}");
    }

    #[test]
    fn test_overlap_below_one_step() {
        let config = SyncConfig {
            grid_interval_ms: 100,
            min_overlap_s: 0.05,
            ..Default::default()
        };
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("at least one grid step"), "got: {err}");
    }

    #[test]
    fn test_kernel_wider_than_spline_minimum() {
        let config = SyncConfig {
            median_kernel: 5,
            ..Default::default()
        };
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("median_kernel"), "got: {err}");
    }

    #[test]
    fn test_even_kernel_message() {
        let config = SyncConfig {
            median_kernel: 2,
            ..Default::default()
        };
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("must be odd"), "got: {err}");
    }
}
