use hourly_profiles::input::RunDump;
use hourly_profiles::ReportConfig;
use schemars::schema_for;
use std::env;

/// Prints the JSON schema of the run dump, or of the report configuration when passed `config`.
fn main() {
    let schema = match env::args().nth(1).as_deref() {
        Some("config") => schema_for!(ReportConfig),
        _ => schema_for!(RunDump),
    };
    println!("{}", serde_json::to_string_pretty(&schema).unwrap());
}
