pub mod calendar_profile;
pub mod end_use;
pub mod hourly;
pub mod load_distribution;
pub mod resample;
pub mod series;
pub mod units;
