//! Conversion of EnergyPlus "HVAC System Timestep" output, which is reported at irregular
//! minute boundaries, onto a uniform one-value-per-minute grid.

use crate::core::units::{MINUTES_PER_HOUR, SECONDS_PER_MINUTE};
use crate::errors::{PipelineError, SeriesName};
use crate::input::{ReportingFrequency, TimeSeries};
use chrono::{NaiveDateTime, NaiveTime};
use itertools::{repeat_n, Itertools};

/// Resample non-uniform timestep data to one value per minute, linearly interpolating between
/// reported samples. Each output value stands for the minute ending at its position, so a
/// reported sample is kept verbatim at its own minute and interpolation only fills the minutes
/// leading up to it.
///
/// The resampled period starts at midnight of the first reported timestamp's date, as the
/// simulation calendar does. Minutes between midnight and the first sample take the first
/// sample's value; a first sample stamped at midnight is only the interpolation origin.
pub fn resample_to_minutely(
    series: &SeriesName,
    time_series: &TimeSeries,
    hours_simulated: u32,
) -> Result<Vec<Option<f64>>, PipelineError> {
    let expected = (hours_simulated * MINUTES_PER_HOUR) as usize;
    let (first_time, first_value) = time_series
        .iter()
        .next()
        .ok_or_else(|| PipelineError::MissingTimeSeries {
            series: series.clone(),
            frequency: ReportingFrequency::HvacSystemTimestep,
        })?;

    let mut minutely = Vec::with_capacity(expected);
    let midnight = first_time.date().and_time(NaiveTime::MIN);
    let leading_minutes = minutes_between(midnight, first_time);
    minutely.extend(repeat_n(first_value, leading_minutes.max(0) as usize));

    for (index, ((previous_time, previous_value), (time, value))) in
        time_series.iter().tuple_windows().enumerate()
    {
        let minutes_elapsed = minutes_between(previous_time, time);
        if minutes_elapsed <= 0 {
            return Err(PipelineError::NonIncreasingTimestamp {
                series: series.clone(),
                index: index + 1,
                previous: previous_time,
                current: time,
            });
        }

        match (previous_value, value) {
            (Some(previous_value), Some(value)) => {
                let per_minute_delta = (value - previous_value) / minutes_elapsed as f64;
                minutely.extend(
                    (1..minutes_elapsed)
                        .map(|minute| Some(previous_value + per_minute_delta * minute as f64)),
                );
            }
            _ => minutely.extend(repeat_n(None, (minutes_elapsed - 1) as usize)),
        }
        minutely.push(value);
    }

    if minutely.len() != expected {
        return Err(PipelineError::ResampledLengthMismatch {
            series: series.clone(),
            actual: minutely.len(),
            expected,
        });
    }

    Ok(minutely)
}

fn minutes_between(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    ((end - start).num_seconds() as f64 / SECONDS_PER_MINUTE as f64).round() as i64
}
