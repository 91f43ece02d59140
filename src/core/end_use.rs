//! Whole-building end-use totals, built by adding up the hourly series and weekday/weekend mean
//! profiles of the variables that make up each end use.

use crate::core::calendar_profile::{DayBucket, ProfileCell};
use crate::core::load_distribution::LoadDistributionBins;
use crate::core::series::DerivedSeries;
use crate::core::units::{joules_per_hour_to_watts, JOULES, WATTS};
use crate::errors::{PipelineError, SeriesName};
use crate::input::ReportingFrequency;
use indexmap::IndexMap;
use itertools::Itertools;
use serde::Serialize;
use tracing::warn;

pub const COMPOSITE_KEY_VALUE: &str = "TOTAL";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompositeSeries {
    pub variable_name: String,
    pub key_value: String,
    pub units: String,
    pub constituents: Vec<Constituent>,
    pub load_distribution: LoadDistributionBins,
    pub weekday_weekend_profiles: Vec<MeanProfileCell>,
    pub monthly_summaries: Vec<MonthlySummary>,
    pub hourly_values: Vec<f64>,
}

/// A series that contributed to a composite, with the units it was added up in.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Constituent {
    pub variable_name: String,
    pub key_value: String,
    pub units: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MeanProfileCell {
    pub month: u32,
    #[serde(rename = "wday")]
    pub day_bucket: DayBucket,
    pub hours: Vec<u32>,
    pub mean_profile: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MonthlySummary {
    pub month: u32,
    pub total: f64,
    pub maximum: Option<f64>,
    pub maximum_hour: Option<u32>,
}

/// Build one composite per end use, in the order the end uses are listed. Only series the
/// engine reported hourly take part, so a variable also reported at a finer timestep is not
/// counted twice.
pub fn build_end_use_composites(
    end_uses: &IndexMap<String, Vec<String>>,
    derived: &[DerivedSeries],
) -> Result<Vec<CompositeSeries>, PipelineError> {
    let mut composites = Vec::with_capacity(end_uses.len());

    for (end_use, variable_names) in end_uses {
        let members = derived
            .iter()
            .filter(|series| {
                series.entry.reporting_frequency == ReportingFrequency::Hourly
                    && variable_names.contains(&series.entry.variable_name)
            })
            .map(HarmonizedSeries::from)
            .collect_vec();

        for variable_name in variable_names {
            if !members
                .iter()
                .any(|member| member.series.variable_name() == variable_name)
            {
                warn!("No hourly series of {variable_name} found for end use {end_use}");
            }
        }

        let Some((first, rest)) = members.split_first() else {
            warn!("Skipping end use {end_use} as none of its variables have hourly series");
            continue;
        };

        composites.push(merge_members(end_use, first, rest)?);
    }

    Ok(composites)
}

/// A constituent series with Joule meters brought into Watts.
struct HarmonizedSeries<'a> {
    series: &'a DerivedSeries,
    is_joule_meter: bool,
    units: &'a str,
}

impl<'a> From<&'a DerivedSeries> for HarmonizedSeries<'a> {
    fn from(series: &'a DerivedSeries) -> Self {
        let is_joule_meter = series.entry.is_meter && series.units() == JOULES;
        Self {
            series,
            is_joule_meter,
            units: if is_joule_meter {
                WATTS
            } else {
                series.units()
            },
        }
    }
}

impl HarmonizedSeries<'_> {
    fn harmonize(&self, value: f64) -> f64 {
        if self.is_joule_meter {
            joules_per_hour_to_watts(value)
        } else {
            value
        }
    }

    fn hourly_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.series
            .hourly_values
            .iter()
            .map(move |value| self.harmonize(*value))
    }

    fn mean_profile_cell(&self, cell: &ProfileCell) -> MeanProfileCell {
        MeanProfileCell {
            month: cell.month,
            day_bucket: cell.day_bucket,
            hours: cell.hours.clone(),
            mean_profile: cell
                .mean_profile
                .iter()
                .map(|value| self.harmonize(*value))
                .collect(),
        }
    }

    fn name(&self) -> SeriesName {
        self.series.name()
    }
}

fn merge_members(
    end_use: &str,
    first: &HarmonizedSeries,
    rest: &[HarmonizedSeries],
) -> Result<CompositeSeries, PipelineError> {
    let mut hourly_values = first.hourly_values().collect_vec();
    let mut profiles = first
        .series
        .weekday_weekend_profiles
        .iter()
        .map(|cell| first.mean_profile_cell(cell))
        .collect_vec();

    for member in rest {
        if member.series.hourly_values.len() != hourly_values.len() {
            return Err(PipelineError::CompositeLengthMismatch {
                end_use: end_use.to_string(),
                series: member.name(),
                actual: member.series.hourly_values.len(),
                expected: hourly_values.len(),
            });
        }
        for (total, value) in hourly_values.iter_mut().zip(member.hourly_values()) {
            *total += value;
        }

        add_mean_profiles(end_use, &mut profiles, member)?;
    }

    Ok(CompositeSeries {
        variable_name: end_use.to_string(),
        key_value: COMPOSITE_KEY_VALUE.to_string(),
        units: first.units.to_string(),
        constituents: std::iter::once(first)
            .chain(rest)
            .map(|member| Constituent {
                variable_name: member.series.variable_name().to_string(),
                key_value: member.series.key_value().to_string(),
                units: member.units.to_string(),
            })
            .collect(),
        load_distribution: LoadDistributionBins::from_hourly(&hourly_values),
        monthly_summaries: summarize_months(&profiles),
        weekday_weekend_profiles: profiles,
        hourly_values,
    })
}

fn add_mean_profiles(
    end_use: &str,
    totals: &mut [MeanProfileCell],
    member: &HarmonizedSeries,
) -> Result<(), PipelineError> {
    let mismatch = |detail: String| PipelineError::CompositeProfileMismatch {
        end_use: end_use.to_string(),
        series: member.name(),
        detail,
    };

    let cells = &member.series.weekday_weekend_profiles;
    if cells.len() != totals.len() {
        return Err(mismatch(format!(
            "{} profile cells where {} were expected",
            cells.len(),
            totals.len()
        )));
    }

    for (total, cell) in totals.iter_mut().zip(cells) {
        if (total.month, total.day_bucket) != (cell.month, cell.day_bucket) {
            return Err(mismatch(format!(
                "month {} {} cell found where month {} {} was expected",
                cell.month, cell.day_bucket, total.month, total.day_bucket
            )));
        }
        if total.hours != cell.hours {
            return Err(mismatch(format!(
                "hours of month {} {} do not match",
                cell.month, cell.day_bucket
            )));
        }
        for (total_value, value) in total.mean_profile.iter_mut().zip(&cell.mean_profile) {
            *total_value += member.harmonize(*value);
        }
    }

    Ok(())
}

fn summarize_months(profiles: &[MeanProfileCell]) -> Vec<MonthlySummary> {
    profiles
        .iter()
        .chunk_by(|cell| cell.month)
        .into_iter()
        .map(|(month, cells)| {
            let mut summary = MonthlySummary {
                month,
                total: 0.,
                maximum: None,
                maximum_hour: None,
            };
            for cell in cells {
                // the latest hour wins a tie within a cell, a later cell only wins outright
                let mut cell_peak: Option<(f64, u32)> = None;
                for (hour, value) in cell.hours.iter().zip(&cell.mean_profile) {
                    if !value.is_finite() {
                        continue;
                    }
                    summary.total += value;
                    if cell_peak.map_or(true, |(peak, _)| *value >= peak) {
                        cell_peak = Some((*value, *hour));
                    }
                }
                if let Some((peak, hour)) = cell_peak {
                    if summary.maximum.map_or(true, |maximum| peak > maximum) {
                        summary.maximum = Some(peak);
                        summary.maximum_hour = Some(hour);
                    }
                }
            }
            summary
        })
        .collect()
}
