use crate::errors::{PipelineError, SeriesName};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::io::{BufReader, Read};
use strum::Display;

pub fn ingest_run_dump(json: impl Read) -> Result<RunDump, anyhow::Error> {
    let run_dump: RunDump = serde_json::from_reader(BufReader::new(json))?;
    run_dump.validate()?;

    Ok(run_dump)
}

/// Cadence at which the simulation engine reported a variable.
#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub enum ReportingFrequency {
    #[serde(rename = "HVAC System Timestep")]
    #[strum(serialize = "HVAC System Timestep")]
    HvacSystemTimestep,
    #[serde(rename = "Zone Timestep", alias = "Timestep")]
    #[strum(serialize = "Zone Timestep")]
    ZoneTimestep,
    Hourly,
    Daily,
    Monthly,
    #[serde(rename = "Run Period", alias = "RunPeriod", alias = "Runperiod")]
    #[strum(serialize = "Run Period")]
    RunPeriod,
    Annual,
}

impl ReportingFrequency {
    /// Only hourly and sub-hourly series are aggregated.
    pub fn is_processed(&self) -> bool {
        matches!(self, Self::HvacSystemTimestep | Self::ZoneTimestep | Self::Hourly)
    }

    /// Length in hours of one sample once the series is on a uniform grid.
    /// HVAC system timestep data is resampled to one value per minute.
    pub fn uniform_timestep_hours(&self, zone_timestep_fraction: f64) -> Option<f64> {
        match self {
            Self::HvacSystemTimestep => Some(1. / 60.),
            Self::ZoneTimestep => Some(zone_timestep_fraction),
            Self::Hourly => Some(1.),
            Self::Daily | Self::Monthly | Self::RunPeriod | Self::Annual => None,
        }
    }
}

/// How sub-interval values combine into a coarser interval.
#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub enum VariableType {
    Sum,
    #[serde(rename = "Avg", alias = "Average")]
    #[strum(serialize = "Avg")]
    Average,
}

/// One row of the engine's report data dictionary.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct DictionaryEntry {
    #[serde(default)]
    pub report_data_dictionary_index: Option<u32>,
    #[serde(default)]
    pub key_value: String,
    pub variable_name: String,
    pub reporting_frequency: ReportingFrequency,
    #[serde(default)]
    pub units: String,
    pub variable_type: VariableType,
    #[serde(default)]
    pub index_group: String,
    #[serde(default)]
    pub is_meter: bool,
}

impl DictionaryEntry {
    pub fn name(&self) -> SeriesName {
        SeriesName::new(&self.variable_name, &self.key_value)
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct TimeSeries {
    pub timestamps: Vec<NaiveDateTime>,
    /// A `null` marks a sample the engine did not report.
    pub values: Vec<Option<f64>>,
}

impl TimeSeries {
    pub fn new(timestamps: Vec<NaiveDateTime>, values: Vec<Option<f64>>) -> Self {
        Self { timestamps, values }
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn first_timestamp(&self) -> Option<NaiveDateTime> {
        self.timestamps.first().copied()
    }

    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.timestamps.last().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDateTime, Option<f64>)> + Clone + '_ {
        self.timestamps
            .iter()
            .copied()
            .zip(self.values.iter().copied())
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct SeriesRecord {
    #[serde(flatten)]
    pub entry: DictionaryEntry,
    #[serde(flatten)]
    pub time_series: TimeSeries,
}

/// Read access to a simulation run's stored results.
pub trait ResultStore {
    fn hours_simulated(&self) -> Option<u32>;
    /// Length of one zone timestep as a fraction of an hour.
    fn timestep_fraction(&self) -> Option<f64>;
    fn dictionary(&self) -> impl Iterator<Item = &DictionaryEntry>;
    fn time_series(
        &self,
        frequency: ReportingFrequency,
        variable_name: &str,
        key_value: &str,
    ) -> Option<&TimeSeries>;
}

/// The results of one simulation run, as exported from the engine's result database.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct RunDump {
    #[serde(default)]
    pub hours_simulated: Option<u32>,
    #[serde(default)]
    pub timesteps_per_hour: Option<u32>,
    pub series: Vec<SeriesRecord>,
}

impl RunDump {
    fn validate(&self) -> Result<(), PipelineError> {
        for SeriesRecord { entry, time_series } in &self.series {
            if time_series.timestamps.len() != time_series.values.len() {
                return Err(PipelineError::SampleCountMismatch {
                    series: entry.name(),
                    timestamps: time_series.timestamps.len(),
                    values: time_series.values.len(),
                });
            }
        }

        Ok(())
    }
}

impl ResultStore for RunDump {
    fn hours_simulated(&self) -> Option<u32> {
        self.hours_simulated
    }

    fn timestep_fraction(&self) -> Option<f64> {
        self.timesteps_per_hour
            .filter(|steps| *steps > 0)
            .map(|steps| 1. / steps as f64)
    }

    fn dictionary(&self) -> impl Iterator<Item = &DictionaryEntry> {
        self.series.iter().map(|record| &record.entry)
    }

    fn time_series(
        &self,
        frequency: ReportingFrequency,
        variable_name: &str,
        key_value: &str,
    ) -> Option<&TimeSeries> {
        self.series
            .iter()
            .find(|SeriesRecord { entry, .. }| {
                entry.reporting_frequency == frequency
                    && entry.variable_name == variable_name
                    && entry.key_value == key_value
            })
            .map(|record| &record.time_series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::io::Cursor;

    #[fixture]
    fn run_dump_json() -> &'static str {
        r#"{
            "hours_simulated": 2,
            "timesteps_per_hour": 6,
            "series": [
                {
                    "report_data_dictionary_index": 12,
                    "key_value": "",
                    "variable_name": "Gas:Facility",
                    "reporting_frequency": "Hourly",
                    "units": "J",
                    "variable_type": "Sum",
                    "index_group": "Facility:Whole Building",
                    "is_meter": true,
                    "timestamps": ["2006-01-01T01:00:00", "2006-01-01T02:00:00"],
                    "values": [3600.0, null]
                },
                {
                    "key_value": "SPACE1-1",
                    "variable_name": "Zone Air Temperature",
                    "reporting_frequency": "Timestep",
                    "variable_type": "Average",
                    "timestamps": ["2006-01-01T00:10:00"],
                    "values": [21.5]
                }
            ]
        }"#
    }

    #[rstest]
    fn should_ingest_run_dump(run_dump_json: &str) {
        let run_dump = ingest_run_dump(Cursor::new(run_dump_json)).unwrap();

        assert_eq!(run_dump.hours_simulated(), Some(2));
        assert_eq!(run_dump.timestep_fraction(), Some(1. / 6.));
        assert_eq!(run_dump.dictionary().count(), 2);

        let gas = &run_dump.series[0];
        assert_eq!(gas.entry.reporting_frequency, ReportingFrequency::Hourly);
        assert_eq!(gas.entry.variable_type, VariableType::Sum);
        assert!(gas.entry.is_meter);
        assert_eq!(gas.time_series.values, vec![Some(3600.), None]);

        let zone = &run_dump.series[1];
        assert_eq!(zone.entry.reporting_frequency, ReportingFrequency::ZoneTimestep);
        assert_eq!(zone.entry.variable_type, VariableType::Average);
        assert_eq!(zone.entry.units, "");
    }

    #[rstest]
    fn should_find_time_series_by_frequency_variable_and_key(run_dump_json: &str) {
        let run_dump = ingest_run_dump(Cursor::new(run_dump_json)).unwrap();

        assert!(run_dump
            .time_series(ReportingFrequency::Hourly, "Gas:Facility", "")
            .is_some());
        assert!(run_dump
            .time_series(ReportingFrequency::ZoneTimestep, "Gas:Facility", "")
            .is_none());
        assert!(run_dump
            .time_series(
                ReportingFrequency::ZoneTimestep,
                "Zone Air Temperature",
                "SPACE1-1"
            )
            .is_some());
    }

    #[rstest]
    fn should_reject_mismatched_timestamps_and_values() {
        let json = r#"{
            "series": [{
                "variable_name": "Boiler Heating Rate",
                "key_value": "BOILER 1",
                "reporting_frequency": "Hourly",
                "variable_type": "Avg",
                "timestamps": ["2006-01-01T01:00:00", "2006-01-01T02:00:00"],
                "values": [1.0]
            }]
        }"#;
        let error = ingest_run_dump(Cursor::new(json)).unwrap_err();

        assert_eq!(
            error.downcast_ref::<PipelineError>(),
            Some(&PipelineError::SampleCountMismatch {
                series: SeriesName::new("Boiler Heating Rate", "BOILER 1"),
                timestamps: 2,
                values: 1,
            })
        );
    }

    #[rstest]
    fn should_ingest_annual_meters() {
        let json = r#"{
            "series": [{
                "variable_name": "Electricity:Facility",
                "key_value": "",
                "reporting_frequency": "Annual",
                "units": "J",
                "variable_type": "Sum",
                "is_meter": true,
                "timestamps": ["2007-01-01T00:00:00"],
                "values": [1.0e9]
            }]
        }"#;
        let run_dump = ingest_run_dump(Cursor::new(json)).unwrap();

        let annual = &run_dump.series[0].entry;
        assert_eq!(annual.reporting_frequency, ReportingFrequency::Annual);
        assert!(!annual.reporting_frequency.is_processed());
    }

    #[rstest]
    fn should_default_missing_run_settings() {
        let run_dump = ingest_run_dump(Cursor::new(r#"{"series": []}"#)).unwrap();

        assert_eq!(run_dump.hours_simulated(), None);
        assert_eq!(run_dump.timestep_fraction(), None);
    }

    #[rstest]
    #[case(ReportingFrequency::HvacSystemTimestep, Some(1. / 60.))]
    #[case(ReportingFrequency::ZoneTimestep, Some(0.25))]
    #[case(ReportingFrequency::Hourly, Some(1.))]
    #[case(ReportingFrequency::Daily, None)]
    #[case(ReportingFrequency::RunPeriod, None)]
    #[case(ReportingFrequency::Annual, None)]
    fn test_uniform_timestep_hours(
        #[case] frequency: ReportingFrequency,
        #[case] expected: Option<f64>,
    ) {
        assert_eq!(frequency.uniform_timestep_hours(0.25), expected);
    }

    #[rstest]
    fn should_display_engine_frequency_names() {
        assert_eq!(
            ReportingFrequency::HvacSystemTimestep.to_string(),
            "HVAC System Timestep"
        );
        assert_eq!(ReportingFrequency::Hourly.to_string(), "Hourly");
        assert_eq!(VariableType::Average.to_string(), "Avg");
    }
}
