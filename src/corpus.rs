use crate::config::ReportConfig;
use crate::core::end_use::{build_end_use_composites, CompositeSeries};
use crate::core::series::{process_series, DerivedSeries};
use crate::core::units::{DEFAULT_HOURS_SIMULATED, DEFAULT_TIMESTEPS_PER_HOUR};
use crate::errors::PipelineError;
use crate::input::{ReportingFrequency, ResultStore};
use anyhow::Context;
use tracing::{debug, info, instrument, warn};

/// Every series derived from one run, plus the end-use composites built from them.
#[derive(Clone, Debug)]
pub struct Corpus {
    pub hours_simulated: u32,
    pub derived: Vec<DerivedSeries>,
    pub composites: Vec<CompositeSeries>,
}

impl Corpus {
    #[instrument(skip_all)]
    pub fn from_store(store: &impl ResultStore, config: &ReportConfig) -> anyhow::Result<Self> {
        let hours_simulated = store.hours_simulated().unwrap_or_else(|| {
            warn!("Hours simulated not given for run, assuming {DEFAULT_HOURS_SIMULATED}");
            DEFAULT_HOURS_SIMULATED
        });
        let timestep_fraction = store.timestep_fraction().unwrap_or_else(|| {
            warn!("Timesteps per hour not given for run, assuming {DEFAULT_TIMESTEPS_PER_HOUR}");
            1. / DEFAULT_TIMESTEPS_PER_HOUR as f64
        });

        let mut derived = vec![];
        for entry in store.dictionary() {
            let frequency = entry.reporting_frequency;
            if !frequency.is_processed() {
                debug!("Skipping {} reported at {frequency} frequency", entry.name());
                continue;
            }

            let time_series = store
                .time_series(frequency, &entry.variable_name, &entry.key_value)
                .ok_or_else(|| PipelineError::MissingTimeSeries {
                    series: entry.name(),
                    frequency,
                })?;
            let native_hourly = store.time_series(
                ReportingFrequency::Hourly,
                &entry.variable_name,
                &entry.key_value,
            );

            derived.push(
                process_series(
                    entry,
                    time_series,
                    native_hourly,
                    hours_simulated,
                    timestep_fraction,
                )
                .with_context(|| {
                    format!("Failed to aggregate {} data for {}", frequency, entry.name())
                })?,
            );
            info!("Aggregated {frequency} data for {}", entry.name());
        }

        let composites = build_end_use_composites(&config.end_uses, &derived)
            .context("Failed to build end use totals")?;

        Ok(Self {
            hours_simulated,
            derived,
            composites,
        })
    }

    /// Derived series whose variable is one of `variable_names`, in the order they were read.
    pub fn selected<'a>(
        &'a self,
        variable_names: &'a [String],
    ) -> impl Iterator<Item = &'a DerivedSeries> + 'a {
        self.derived
            .iter()
            .filter(|series| variable_names.contains(&series.entry.variable_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{DictionaryEntry, RunDump, SeriesRecord, TimeSeries, VariableType};
    use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn midnight() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2006, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn record(
        variable_name: &str,
        reporting_frequency: ReportingFrequency,
        interval_minutes: i64,
        values: Vec<f64>,
    ) -> SeriesRecord {
        SeriesRecord {
            entry: DictionaryEntry {
                report_data_dictionary_index: None,
                key_value: "BOILER 1".to_string(),
                variable_name: variable_name.to_string(),
                reporting_frequency,
                units: "W".to_string(),
                variable_type: VariableType::Average,
                index_group: "System".to_string(),
                is_meter: false,
            },
            time_series: TimeSeries::new(
                (1..=values.len() as i64)
                    .map(|step| midnight() + TimeDelta::minutes(step * interval_minutes))
                    .collect(),
                values.into_iter().map(Some).collect(),
            ),
        }
    }

    #[fixture]
    fn run_dump() -> RunDump {
        RunDump {
            hours_simulated: Some(24),
            timesteps_per_hour: Some(6),
            series: vec![
                record(
                    "Boiler Heating Rate",
                    ReportingFrequency::ZoneTimestep,
                    10,
                    vec![6.; 144],
                ),
                record(
                    "Boiler Heating Rate",
                    ReportingFrequency::Hourly,
                    60,
                    vec![5.; 24],
                ),
                record("Boiler Heating Rate", ReportingFrequency::Daily, 1440, vec![5.]),
            ],
        }
    }

    #[rstest]
    fn should_derive_processed_series_only(run_dump: RunDump) {
        let corpus = Corpus::from_store(&run_dump, &ReportConfig::default()).unwrap();

        assert_eq!(corpus.hours_simulated, 24);
        assert_eq!(
            corpus
                .derived
                .iter()
                .map(|series| series.entry.reporting_frequency)
                .collect::<Vec<_>>(),
            vec![ReportingFrequency::ZoneTimestep, ReportingFrequency::Hourly]
        );
        // the engine's own hourly series wins over the reduced zone timestep data
        assert_eq!(corpus.derived[0].hourly_values, vec![5.; 24]);
        assert_eq!(corpus.derived[0].data_points_per_hour, 6);
    }

    #[rstest]
    fn should_build_end_uses_from_hourly_series(run_dump: RunDump) {
        let corpus = Corpus::from_store(&run_dump, &ReportConfig::default()).unwrap();

        assert_eq!(
            corpus
                .composites
                .iter()
                .map(|composite| composite.variable_name.as_str())
                .collect::<Vec<_>>(),
            vec!["Space Heating", "Total Heating"]
        );
        assert_eq!(corpus.composites[0].hourly_values, vec![5.; 24]);
        assert_eq!(corpus.composites[0].constituents.len(), 1);
    }

    #[rstest]
    fn should_select_series_by_variable_name(run_dump: RunDump) {
        let corpus = Corpus::from_store(&run_dump, &ReportConfig::default()).unwrap();

        assert_eq!(
            corpus
                .selected(&["Boiler Heating Rate".to_string()])
                .count(),
            2
        );
        assert_eq!(corpus.selected(&[]).count(), 0);
    }

    #[rstest]
    fn should_assume_engine_default_timestep_when_not_given() {
        let run_dump = RunDump {
            hours_simulated: Some(24),
            timesteps_per_hour: Some(0),
            series: vec![record(
                "Zone Air System Sensible Heating Rate",
                ReportingFrequency::ZoneTimestep,
                15,
                vec![2.; 96],
            )],
        };

        let corpus = Corpus::from_store(&run_dump, &ReportConfig::default()).unwrap();

        assert_eq!(corpus.derived[0].data_points_per_hour, 4);
        assert_eq!(corpus.derived[0].hourly_values, vec![2.; 24]);
    }

    #[rstest]
    fn should_name_failing_series_in_error(mut run_dump: RunDump) {
        run_dump.series[1].time_series.values.pop();
        run_dump.series[1].time_series.timestamps.pop();

        let error = Corpus::from_store(&run_dump, &ReportConfig::default()).unwrap_err();

        assert_eq!(
            error.to_string(),
            "Failed to aggregate Zone Timestep data for variable Boiler Heating Rate key BOILER 1"
        );
        assert!(matches!(
            error.downcast_ref::<PipelineError>(),
            Some(PipelineError::HourlyLengthMismatch {
                actual: 23,
                expected: 24,
                ..
            })
        ));
    }
}
