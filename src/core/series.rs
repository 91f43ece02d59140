use crate::compare_floats::{max_of_defined, min_of_defined};
use crate::core::calendar_profile::{profile_hourly_series, ProfileCell};
use crate::core::hourly::{
    native_hourly, reduce_to_hourly, timesteps_per_hour, STORED_SIGNIFICANT_FIGURES,
};
use crate::core::load_distribution::LoadDistributionBins;
use crate::core::resample::resample_to_minutely;
use crate::errors::{PipelineError, SeriesName};
use crate::input::{DictionaryEntry, ReportingFrequency, TimeSeries};
use crate::simulation_time::SimulationCalendar;
use crate::statistics::round_to_significant_figures;
use chrono::NaiveDateTime;
use serde::Serialize;

/// Key value given to whole-site variables, which the engine reports with a blank key.
pub const SITE_KEY_VALUE: &str = "site";

/// Everything derived from one monitored variable for one key object.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DerivedSeries {
    #[serde(flatten)]
    pub entry: DictionaryEntry,
    pub hours_simulated: u32,
    pub data_points_per_hour: usize,
    pub total_num_data_points: usize,
    pub total_num_actual_data_points: usize,
    pub start_date_time: NaiveDateTime,
    pub end_date_time: NaiveDateTime,
    pub min_hourly_value: Option<f64>,
    pub max_hourly_value: Option<f64>,
    pub load_distribution: LoadDistributionBins,
    pub seven_day_profiles: Vec<ProfileCell>,
    pub weekday_weekend_profiles: Vec<ProfileCell>,
    pub hourly_values: Vec<f64>,
}

impl DerivedSeries {
    pub fn name(&self) -> SeriesName {
        self.entry.name()
    }

    pub fn variable_name(&self) -> &str {
        &self.entry.variable_name
    }

    pub fn key_value(&self) -> &str {
        &self.entry.key_value
    }

    pub fn units(&self) -> &str {
        &self.entry.units
    }
}

/// Run one raw series through the pipeline: put it on a uniform grid, reduce it to hourly
/// values (or take the engine's own hourly series when there is one), then bin and profile
/// the hourly values.
pub fn process_series(
    entry: &DictionaryEntry,
    time_series: &TimeSeries,
    native_hourly_series: Option<&TimeSeries>,
    hours_simulated: u32,
    zone_timestep_fraction: f64,
) -> Result<DerivedSeries, PipelineError> {
    let name = entry.name();
    let frequency = entry.reporting_frequency;
    let timestep_hours = frequency
        .uniform_timestep_hours(zone_timestep_fraction)
        .ok_or_else(|| PipelineError::UnprocessedFrequency {
            series: name.clone(),
            frequency,
        })?;
    let (Some(start_date_time), Some(end_date_time)) =
        (time_series.first_timestamp(), time_series.last_timestamp())
    else {
        return Err(PipelineError::MissingTimeSeries {
            series: name,
            frequency,
        });
    };

    let uniform = match frequency {
        ReportingFrequency::HvacSystemTimestep => {
            resample_to_minutely(&name, time_series, hours_simulated)?
        }
        _ => time_series
            .values
            .iter()
            .map(|value| {
                value.map(|value| round_to_significant_figures(value, STORED_SIGNIFICANT_FIGURES))
            })
            .collect(),
    };
    let data_points_per_hour = timesteps_per_hour(timestep_hours)?;

    let hourly_values = match native_hourly_series {
        Some(native) => native_hourly(&name, &native.values, hours_simulated)?,
        None => reduce_to_hourly(
            &name,
            &uniform,
            entry.variable_type,
            data_points_per_hour,
            hours_simulated,
        )?,
    };

    let calendar = SimulationCalendar::from_timestamps(start_date_time, end_date_time);
    let profile = profile_hourly_series(&hourly_values, &calendar);

    let mut entry = entry.clone();
    if entry.key_value.is_empty() {
        entry.key_value = SITE_KEY_VALUE.to_string();
    }

    Ok(DerivedSeries {
        entry,
        hours_simulated,
        data_points_per_hour,
        total_num_data_points: hours_simulated as usize * data_points_per_hour,
        total_num_actual_data_points: uniform.len(),
        start_date_time,
        end_date_time,
        min_hourly_value: min_of_defined(&hourly_values),
        max_hourly_value: max_of_defined(&hourly_values),
        load_distribution: LoadDistributionBins::from_hourly(&hourly_values),
        seven_day_profiles: profile.seven_day,
        weekday_weekend_profiles: profile.weekday_weekend,
        hourly_values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::calendar_profile::DayBucket;
    use crate::input::VariableType;
    use approx::assert_relative_eq;
    use chrono::{NaiveDate, TimeDelta};
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn entry(
        variable_name: &str,
        key_value: &str,
        reporting_frequency: ReportingFrequency,
        variable_type: VariableType,
    ) -> DictionaryEntry {
        DictionaryEntry {
            report_data_dictionary_index: None,
            key_value: key_value.to_string(),
            variable_name: variable_name.to_string(),
            reporting_frequency,
            units: "W".to_string(),
            variable_type,
            index_group: "System".to_string(),
            is_meter: false,
        }
    }

    /// Monday 2nd January 2006
    fn monday_midnight() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2006, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    /// Samples stamped at the end of each interval, starting one interval after midnight.
    fn regular_series(interval_minutes: i64, values: Vec<Option<f64>>) -> TimeSeries {
        TimeSeries::new(
            (1..=values.len() as i64)
                .map(|step| monday_midnight() + TimeDelta::minutes(step * interval_minutes))
                .collect(),
            values,
        )
    }

    #[rstest]
    fn should_reduce_zone_timestep_series_for_one_day() {
        let entry = entry(
            "Zone Air System Sensible Heating Rate",
            "SPACE1-1",
            ReportingFrequency::ZoneTimestep,
            VariableType::Average,
        );
        let time_series = regular_series(15, vec![Some(2.); 96]);

        let derived = process_series(&entry, &time_series, None, 24, 0.25).unwrap();

        assert_eq!(derived.hourly_values, vec![2.; 24]);
        assert_eq!(derived.data_points_per_hour, 4);
        assert_eq!(derived.total_num_data_points, 96);
        assert_eq!(derived.total_num_actual_data_points, 96);
        assert_eq!(derived.min_hourly_value, Some(2.));
        assert_eq!(derived.max_hourly_value, Some(2.));
        assert_eq!(derived.load_distribution.count("90-100%"), Some(24));

        assert_eq!(derived.seven_day_profiles.len(), 1);
        assert_eq!(derived.seven_day_profiles[0].day_bucket, DayBucket::DayOfWeek(1));
        assert_eq!(derived.weekday_weekend_profiles.len(), 1);
        assert_eq!(derived.weekday_weekend_profiles[0].day_bucket, DayBucket::Weekday);
    }

    #[rstest]
    fn should_prefer_native_hourly_series() {
        let entry = entry(
            "Boiler Heating Rate",
            "BOILER 1",
            ReportingFrequency::ZoneTimestep,
            VariableType::Average,
        );
        let time_series = regular_series(15, vec![Some(2.); 96]);
        let native = regular_series(60, (0..24).map(|hour| Some(hour as f64)).collect());

        let derived = process_series(&entry, &time_series, Some(&native), 24, 0.25).unwrap();

        assert_eq!(
            derived.hourly_values,
            (0..24).map(|hour| hour as f64).collect::<Vec<_>>()
        );
        assert_eq!(derived.max_hourly_value, Some(23.));
    }

    #[rstest]
    fn should_round_stored_samples_before_reducing() {
        let entry = entry(
            "Boiler Heating Rate",
            "BOILER 1",
            ReportingFrequency::Hourly,
            VariableType::Sum,
        );
        let time_series = regular_series(60, vec![Some(1234.5678); 24]);

        let derived = process_series(&entry, &time_series, None, 24, 0.25).unwrap();

        assert_eq!(derived.hourly_values, vec![1234.6; 24]);
    }

    #[rstest]
    fn should_resample_hvac_timestep_series() {
        let entry = entry(
            "Heating Coil Air Heating Rate",
            "MAIN COIL",
            ReportingFrequency::HvacSystemTimestep,
            VariableType::Average,
        );
        let time_series = TimeSeries::new(
            vec![
                monday_midnight(),
                monday_midnight() + TimeDelta::minutes(60),
                monday_midnight() + TimeDelta::minutes(120),
            ],
            vec![Some(0.), Some(60.), Some(0.)],
        );

        let derived = process_series(&entry, &time_series, None, 2, 0.25).unwrap();

        assert_eq!(derived.data_points_per_hour, 60);
        assert_eq!(derived.total_num_actual_data_points, 120);
        assert_relative_eq!(derived.hourly_values[0], 30.5, max_relative = 1e-9);
        assert_relative_eq!(derived.hourly_values[1], 29.5, max_relative = 1e-9);
    }

    #[rstest]
    fn should_resample_hvac_series_first_reported_at_end_of_first_hour() {
        let entry = entry(
            "Heating Coil Air Heating Rate",
            "MAIN COIL",
            ReportingFrequency::HvacSystemTimestep,
            VariableType::Average,
        );
        let time_series = regular_series(60, vec![Some(1.), Some(1.)]);

        let derived = process_series(&entry, &time_series, None, 2, 1.).unwrap();

        assert_eq!(derived.hourly_values.len(), 2);
        for value in derived.hourly_values {
            assert_relative_eq!(value, 1., max_relative = 1e-9);
        }
    }

    #[rstest]
    fn should_name_blank_keys_site() {
        let entry = entry(
            "Facility Total Electric Demand Power",
            "",
            ReportingFrequency::Hourly,
            VariableType::Average,
        );
        let time_series = regular_series(60, vec![Some(1.); 24]);

        let derived = process_series(&entry, &time_series, None, 24, 0.25).unwrap();

        assert_eq!(derived.key_value(), SITE_KEY_VALUE);
    }

    #[rstest]
    fn should_reject_hourly_series_of_wrong_length() {
        let entry = entry(
            "Boiler Heating Rate",
            "BOILER 1",
            ReportingFrequency::Hourly,
            VariableType::Average,
        );
        let time_series = regular_series(60, vec![Some(1.); 25]);

        assert_eq!(
            process_series(&entry, &time_series, Some(&time_series), 24, 0.25).unwrap_err(),
            PipelineError::HourlyLengthMismatch {
                series: SeriesName::new("Boiler Heating Rate", "BOILER 1"),
                actual: 25,
                expected: 24,
            }
        );
    }

    #[rstest]
    fn should_reject_daily_series() {
        let entry = entry(
            "Boiler Heating Rate",
            "BOILER 1",
            ReportingFrequency::Daily,
            VariableType::Average,
        );
        let time_series = regular_series(1440, vec![Some(1.)]);

        assert!(matches!(
            process_series(&entry, &time_series, None, 24, 0.25),
            Err(PipelineError::UnprocessedFrequency { .. })
        ));
    }

    #[rstest]
    fn should_reject_empty_series() {
        let entry = entry(
            "Boiler Heating Rate",
            "BOILER 1",
            ReportingFrequency::ZoneTimestep,
            VariableType::Average,
        );

        assert!(matches!(
            process_series(&entry, &TimeSeries::default(), None, 24, 0.25),
            Err(PipelineError::MissingTimeSeries { .. })
        ));
    }
}
