pub const MINUTES_PER_HOUR: u32 = 60;
pub const SECONDS_PER_MINUTE: u32 = 60;
pub const SECONDS_PER_HOUR: u32 = 3_600;

/// Assumed when the result store cannot say how long the run was.
pub const DEFAULT_HOURS_SIMULATED: u32 = 8_760;
/// EnergyPlus default zone timestep.
pub const DEFAULT_TIMESTEPS_PER_HOUR: u32 = 4;

pub const JOULES: &str = "J";
pub const WATTS: &str = "W";

/// An energy total over one hour, in joules, as the average power over that hour in watts.
pub fn joules_per_hour_to_watts(energy_j: f64) -> f64 {
    energy_j / SECONDS_PER_HOUR as f64
}
