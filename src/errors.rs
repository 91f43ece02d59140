use crate::input::ReportingFrequency;
use chrono::NaiveDateTime;
use std::fmt::{Display, Formatter};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Run dump was considered invalid due to error: {0:#}")]
    InvalidInput(anyhow::Error),
    #[error("Error identified during report calculation: {0:#}")]
    FailureInCalculation(#[from] CalculationError),
    #[error("Error while writing report files: {0:#}")]
    FailureInOutput(anyhow::Error),
}

#[derive(Debug, Error)]
#[error(transparent)]
pub struct CalculationError {
    error: anyhow::Error,
}

impl CalculationError {
    pub(crate) fn new(error: anyhow::Error) -> Self {
        Self { error }
    }
}

/// Identifies one monitored variable for one key object, for use in error messages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeriesName {
    pub variable_name: String,
    pub key_value: String,
}

impl SeriesName {
    pub fn new(variable_name: &str, key_value: &str) -> Self {
        Self {
            variable_name: variable_name.to_string(),
            key_value: key_value.to_string(),
        }
    }
}

impl Display for SeriesName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "variable {} key {}",
            self.variable_name,
            if self.key_value.is_empty() {
                "(blank)"
            } else {
                self.key_value.as_str()
            }
        )
    }
}

/// Invariant violations in the aggregation pipeline. All of these abort report generation for
/// the run.
#[derive(Debug, Error, PartialEq)]
pub enum PipelineError {
    #[error("{timestamps} timestamps were provided alongside {values} values for {series}")]
    SampleCountMismatch {
        series: SeriesName,
        timestamps: usize,
        values: usize,
    },
    #[error("no {frequency} data found for {series}")]
    MissingTimeSeries {
        series: SeriesName,
        frequency: ReportingFrequency,
    },
    #[error("timestamp {current} at position {index} does not follow {previous} for {series}")]
    NonIncreasingTimestamp {
        series: SeriesName,
        index: usize,
        previous: NaiveDateTime,
        current: NaiveDateTime,
    },
    #[error("resampled minutely data length {actual} does not match the {expected} minutes simulated for {series}")]
    ResampledLengthMismatch {
        series: SeriesName,
        actual: usize,
        expected: usize,
    },
    #[error("sub-hourly data length {actual} does not match the {expected} samples expected at {timesteps_per_hour} per hour for {series}")]
    SubhourlyLengthMismatch {
        series: SeriesName,
        actual: usize,
        expected: usize,
        timesteps_per_hour: usize,
    },
    #[error("hourly data length {actual} does not match hours simulated {expected} for {series}")]
    HourlyLengthMismatch {
        series: SeriesName,
        actual: usize,
        expected: usize,
    },
    #[error("{frequency} data is not aggregated to hourly values ({series})")]
    UnprocessedFrequency {
        series: SeriesName,
        frequency: ReportingFrequency,
    },
    #[error("a timestep of {timestep_hours} hours cannot be divided evenly into an hour")]
    InvalidTimestep { timestep_hours: f64 },
    #[error("end use '{end_use}' expected {expected} hourly values but {series} has {actual}")]
    CompositeLengthMismatch {
        end_use: String,
        series: SeriesName,
        actual: usize,
        expected: usize,
    },
    #[error("end use '{end_use}' cannot add the mean profiles of {series}: {detail}")]
    CompositeProfileMismatch {
        end_use: String,
        series: SeriesName,
        detail: String,
    },
}
