#![no_main]

use hourly_profiles::output::Output;
use hourly_profiles::{run_report, ReportConfig, ReportFlags};
use libfuzzer_sys::fuzz_target;
use std::io;
use std::io::{BufReader, Cursor, Write};

fuzz_target!(|data: &[u8]| {
    let _run = run_report(
        BufReader::new(Cursor::new(data)),
        &ReportConfig::default(),
        SinkOutput::default(),
        &ReportFlags::all(),
    );
});

/// An output that goes to nowhere/ a "sink"/ /dev/null.
#[derive(Debug, Default)]
pub struct SinkOutput;

impl Output for SinkOutput {
    fn writer_for_location_key(
        &self,
        _location_key: &str,
        _file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        Ok(io::sink())
    }

    fn is_noop(&self) -> bool {
        // report as a real output so fuzzing exercises the report writers
        false
    }
}
