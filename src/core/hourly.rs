use crate::errors::{PipelineError, SeriesName};
use crate::input::VariableType;
use crate::statistics::round_to_significant_figures;

/// Significant figures kept from values read straight out of the result store.
pub(crate) const STORED_SIGNIFICANT_FIGURES: usize = 5;

pub fn timesteps_per_hour(timestep_hours: f64) -> Result<usize, PipelineError> {
    let steps = (1. / timestep_hours).round();
    if !steps.is_finite() || steps < 1. {
        return Err(PipelineError::InvalidTimestep { timestep_hours });
    }

    Ok(steps as usize)
}

/// Collapse uniform sub-hourly samples into one value per simulated hour. Summed variables add
/// up each hour's samples; averaged variables accumulate `sample / timesteps_per_hour`, so a
/// missing sample lowers the hour's average instead of failing.
pub fn reduce_to_hourly(
    series: &SeriesName,
    samples: &[Option<f64>],
    variable_type: VariableType,
    timesteps_per_hour: usize,
    hours_simulated: u32,
) -> Result<Vec<f64>, PipelineError> {
    let expected = hours_simulated as usize * timesteps_per_hour;
    if samples.len() != expected {
        return Err(PipelineError::SubhourlyLengthMismatch {
            series: series.clone(),
            actual: samples.len(),
            expected,
            timesteps_per_hour,
        });
    }

    let hourly = samples
        .chunks(timesteps_per_hour)
        .map(|hour| match variable_type {
            VariableType::Sum => hour.iter().flatten().sum(),
            VariableType::Average => hour
                .iter()
                .flatten()
                .map(|sample| sample / timesteps_per_hour as f64)
                .sum(),
        })
        .collect::<Vec<f64>>();

    check_hourly_length(series, &hourly, hours_simulated)?;

    Ok(hourly)
}

/// Use a series the engine already reported hourly. Missing hours stay undefined (`NaN`).
pub fn native_hourly(
    series: &SeriesName,
    values: &[Option<f64>],
    hours_simulated: u32,
) -> Result<Vec<f64>, PipelineError> {
    let hourly = values
        .iter()
        .map(|value| {
            value.map_or(f64::NAN, |value| {
                round_to_significant_figures(value, STORED_SIGNIFICANT_FIGURES)
            })
        })
        .collect::<Vec<f64>>();

    check_hourly_length(series, &hourly, hours_simulated)?;

    Ok(hourly)
}

pub(crate) fn check_hourly_length(
    series: &SeriesName,
    hourly: &[f64],
    hours_simulated: u32,
) -> Result<(), PipelineError> {
    if hourly.len() != hours_simulated as usize {
        return Err(PipelineError::HourlyLengthMismatch {
            series: series.clone(),
            actual: hourly.len(),
            expected: hours_simulated as usize,
        });
    }

    Ok(())
}
