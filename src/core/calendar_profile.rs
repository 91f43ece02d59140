//! Diurnal mean and standard deviation profiles, sliced by month and by day of week or by
//! weekday/weekend.

use crate::simulation_time::{CalendarHour, SimulationCalendar};
use crate::statistics::{mean, round_to_significant_figures, sample_standard_deviation};
use itertools::Itertools;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

const PROFILE_SIGNIFICANT_FIGURES: usize = 6;

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum DayBucket {
    /// 0 is Sunday, 6 is Saturday
    DayOfWeek(u32),
    Weekday,
    Weekend,
}

impl Display for DayBucket {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DayBucket::DayOfWeek(day) => write!(f, "{day}"),
            DayBucket::Weekday => write!(f, "weekday"),
            DayBucket::Weekend => write!(f, "weekend"),
        }
    }
}

impl Serialize for DayBucket {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            DayBucket::DayOfWeek(day) => serializer.serialize_u32(*day),
            DayBucket::Weekday => serializer.serialize_str("weekday"),
            DayBucket::Weekend => serializer.serialize_str("weekend"),
        }
    }
}

/// The 24-hour profile for one month and day bucket. Hours of the day with no samples are left
/// out, so `hours` lists which hour each profile position belongs to.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProfileCell {
    pub month: u32,
    #[serde(rename = "wday")]
    pub day_bucket: DayBucket,
    pub hours: Vec<u32>,
    pub mean_profile: Vec<f64>,
    pub std_dev_profile: Vec<f64>,
}

impl ProfileCell {
    pub fn mean_at(&self, hour_of_day: u32) -> Option<f64> {
        self.hours
            .iter()
            .position(|hour| *hour == hour_of_day)
            .map(|position| self.mean_profile[position])
    }

    pub fn std_dev_at(&self, hour_of_day: u32) -> Option<f64> {
        self.hours
            .iter()
            .position(|hour| *hour == hour_of_day)
            .map(|position| self.std_dev_profile[position])
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CalendarProfile {
    /// Month-major, then Sunday through Saturday.
    pub seven_day: Vec<ProfileCell>,
    /// Month-major, then weekday before weekend.
    pub weekday_weekend: Vec<ProfileCell>,
}

impl CalendarProfile {
    pub fn seven_day_cell(&self, month: u32, day_of_week: u32) -> Option<&ProfileCell> {
        self.seven_day.iter().find(|cell| {
            cell.month == month && cell.day_bucket == DayBucket::DayOfWeek(day_of_week)
        })
    }

    pub fn weekday_weekend_cell(&self, month: u32, day_bucket: DayBucket) -> Option<&ProfileCell> {
        self.weekday_weekend
            .iter()
            .find(|cell| cell.month == month && cell.day_bucket == day_bucket)
    }
}

/// Profile an hourly series against the calendar of the run. The walk stops at whichever ends
/// first, the calendar or the series; undefined hours are not sampled.
pub fn profile_hourly_series(hourly: &[f64], calendar: &SimulationCalendar) -> CalendarProfile {
    calendar
        .iter()
        .zip(hourly)
        .filter(|(_, value)| value.is_finite())
        .fold(ProfileBuilder::default(), |builder, (hour, value)| {
            builder.with_sample(
                &hour,
                round_to_significant_figures(*value, PROFILE_SIGNIFICANT_FIGURES),
            )
        })
        .build()
}

#[derive(Debug, Default)]
struct ProfileBuilder {
    samples: BTreeMap<(u32, DayBucket, u32), Vec<f64>>,
}

impl ProfileBuilder {
    fn with_sample(mut self, hour: &CalendarHour, value: f64) -> Self {
        let day_type = if hour.is_weekend() {
            DayBucket::Weekend
        } else {
            DayBucket::Weekday
        };
        for day_bucket in [DayBucket::DayOfWeek(hour.weekday_number()), day_type] {
            self.samples
                .entry((hour.month(), day_bucket, hour.hour_of_day()))
                .or_default()
                .push(value);
        }

        self
    }

    fn build(self) -> CalendarProfile {
        let (seven_day, weekday_weekend): (Vec<_>, Vec<_>) = self
            .samples
            .into_iter()
            .chunk_by(|((month, day_bucket, _), _)| (*month, *day_bucket))
            .into_iter()
            .map(|((month, day_bucket), hours)| {
                let (hours, samples): (Vec<u32>, Vec<Vec<f64>>) = hours
                    .map(|((_, _, hour_of_day), samples)| (hour_of_day, samples))
                    .unzip();
                ProfileCell {
                    month,
                    day_bucket,
                    hours,
                    mean_profile: samples.iter().map(|samples| mean(samples)).collect(),
                    std_dev_profile: samples
                        .iter()
                        .map(|samples| sample_standard_deviation(samples))
                        .collect(),
                }
            })
            .partition(|cell| matches!(cell.day_bucket, DayBucket::DayOfWeek(_)));

        CalendarProfile {
            seven_day,
            weekday_weekend,
        }
    }
}
