use bitflags::bitflags;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::io::{BufReader, Read};

/// What to aggregate into end-use totals and which variables go into the selective reports.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// End use name mapped to the variable names summed into it.
    pub end_uses: IndexMap<String, Vec<String>>,
    /// Variables written to the 8760 hourly and monthly profile reports.
    pub hourly_selection: Vec<String>,
    /// Variables written to the custom 8760 hour report with calendar header rows.
    pub custom_selection: Vec<String>,
}

const HEATING_COIL: &str = "Heating Coil Air Heating Rate";
const BOILER: &str = "Boiler Heating Rate";
const WATER_HEATER: &str = "Water Heater Heating Rate";
const COOLING_COIL: &str = "Cooling Coil Total Cooling Rate";
const FACILITY_ELECTRIC: &str = "Facility Total Electric Demand Power";
const FACILITY_GAS: &str = "Gas:Facility";

impl Default for ReportConfig {
    fn default() -> Self {
        let end_uses = [
            ("SHW", vec![WATER_HEATER]),
            ("Space Heating", vec![HEATING_COIL, BOILER]),
            ("Total Heating", vec![HEATING_COIL, BOILER, WATER_HEATER]),
            ("Space Cooling", vec![COOLING_COIL]),
            ("Total Electricity", vec![FACILITY_ELECTRIC]),
            ("Gas", vec![FACILITY_GAS]),
            ("Total Site Energy", vec![FACILITY_ELECTRIC, FACILITY_GAS]),
        ]
        .into_iter()
        .map(|(end_use, variables)| (end_use.to_string(), to_strings(&variables)))
        .collect();

        Self {
            end_uses,
            hourly_selection: to_strings(&[
                HEATING_COIL,
                COOLING_COIL,
                BOILER,
                "Chiller Condenser Heat Transfer Rate",
                WATER_HEATER,
                FACILITY_ELECTRIC,
                FACILITY_GAS,
                "Water Heater Gas Rate",
            ]),
            custom_selection: to_strings(&[
                "Total Internal Radiant Heating Rate",
                "Total Internal Convective Heating Rate",
                "Zone Air Heat Balance Outdoor Air Transfer Rate",
                "Zone Total Internal Latent Gain Rate",
                "Zone Total Internal Total Heating Rate",
                "Zone Air System Sensible Heating Rate",
                "Zone Air System Sensible Cooling Rate",
            ]),
        }
    }
}

fn to_strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

pub fn load_config(json: impl Read) -> anyhow::Result<ReportConfig> {
    Ok(serde_json::from_reader(BufReader::new(json))?)
}

bitflags! {
    /// Which report files a run writes.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct ReportFlags: u32 {
        const HOURLY_DATA = 0b1;
        const CUSTOM_HOURLY_DATA = 0b10;
        const SEVEN_DAY_PROFILES = 0b100;
        const WEEKDAY_WEEKEND_PROFILES = 0b1000;
        const END_USE_TOTALS = 0b10000;
        const JSON = 0b100000;
    }
}

impl Default for ReportFlags {
    fn default() -> Self {
        Self::all()
    }
}
