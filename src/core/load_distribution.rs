use crate::compare_floats::max_of_defined;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

pub const BIN_LABELS: [&str; 10] = [
    "0-10%", "10-20%", "20-30%", "30-40%", "40-50%", "50-60%", "60-70%", "70-80%", "80-90%",
    "90-100%",
];

/// How many hours of the year a load spends in each tenth of its own annual peak.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoadDistributionBins {
    counts: [usize; 10],
    /// Hours whose percentage of peak fell outside 0-100%, e.g. negative loads. These are in no
    /// bin.
    out_of_range_hours: usize,
}

impl LoadDistributionBins {
    /// Bin each defined hour by `round(100 * value / annual_max)`, where the annual max is that
    /// of this same series. An all-zero series puts every hour in the first bin.
    pub fn from_hourly(hourly: &[f64]) -> Self {
        let annual_max = max_of_defined(hourly).unwrap_or(0.);
        let mut bins = Self::default();

        for value in hourly.iter().filter(|value| value.is_finite()) {
            let percentage = if annual_max != 0. {
                (100. * value / annual_max).round() as i64
            } else {
                0
            };

            match bin_index(percentage) {
                Some(index) => bins.counts[index] += 1,
                None => bins.out_of_range_hours += 1,
            }
        }

        bins
    }

    pub fn count(&self, label: &str) -> Option<usize> {
        BIN_LABELS
            .iter()
            .position(|bin_label| *bin_label == label)
            .map(|index| self.counts[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        BIN_LABELS.into_iter().zip(self.counts.iter().copied())
    }

    pub fn binned_hours(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn out_of_range_hours(&self) -> usize {
        self.out_of_range_hours
    }
}

/// Bins are `[0,10]`, then `[11,20]` through `[91,100]`.
fn bin_index(percentage: i64) -> Option<usize> {
    match percentage {
        0..=10 => Some(0),
        11..=100 => Some(((percentage - 1) / 10) as usize),
        _ => None,
    }
}

impl Serialize for LoadDistributionBins {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(BIN_LABELS.len() + 1))?;
        for (label, count) in self.iter() {
            map.serialize_entry(label, &count)?;
        }
        map.serialize_entry("out_of_range", &self.out_of_range_hours)?;
        map.end()
    }
}
