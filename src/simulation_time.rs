use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};

pub const HOURS_IN_DAY: u32 = 24;

/// The calendar days a run covers, walked one hour at a time from midnight of the first day up
/// to (but not including) midnight of the last day.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationCalendar {
    start_date: NaiveDate,
    end_date: NaiveDate,
}

impl SimulationCalendar {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
        }
    }

    /// EnergyPlus stamps each value at the end of its interval, so a full year runs from
    /// Jan 1 01:00 to midnight at the start of the next year.
    pub fn from_timestamps(first: NaiveDateTime, last: NaiveDateTime) -> Self {
        Self::new(first.date(), last.date())
    }

    pub fn total_hours(&self) -> usize {
        ((self.end_date - self.start_date).num_days().max(0) as u32 * HOURS_IN_DAY) as usize
    }

    pub fn iter(&self) -> SimulationCalendarIterator {
        SimulationCalendarIterator {
            current_index: 0,
            current: self.start_date.and_time(NaiveTime::MIN),
            end: self.end_date.and_time(NaiveTime::MIN),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SimulationCalendarIterator {
    current_index: usize,
    current: NaiveDateTime,
    end: NaiveDateTime,
}

impl Iterator for SimulationCalendarIterator {
    type Item = CalendarHour;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.end {
            return None;
        }

        let hour = CalendarHour {
            index: self.current_index,
            date_time: self.current,
        };
        self.current_index += 1;
        self.current += TimeDelta::hours(1);

        Some(hour)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CalendarHour {
    pub index: usize,
    pub date_time: NaiveDateTime,
}

impl CalendarHour {
    /// 1 to 12
    pub fn month(&self) -> u32 {
        self.date_time.month()
    }

    /// 0 is Sunday, 6 is Saturday
    pub fn weekday_number(&self) -> u32 {
        self.date_time.weekday().num_days_from_sunday()
    }

    pub fn hour_of_day(&self) -> u32 {
        self.date_time.hour()
    }

    pub fn is_weekend(&self) -> bool {
        matches!(self.weekday_number(), 0 | 6)
    }

    /// Week of the year counting from the first Sunday, 00 to 53.
    pub fn week_of_year(&self) -> String {
        self.date_time.format("%U").to_string()
    }

    pub fn month_abbreviation(&self) -> String {
        self.date_time.format("%b").to_string()
    }
}
