use clap::{Parser, ValueEnum};
use hourly_profiles::output::FileOutput;
use hourly_profiles::{load_config, run_report, ReportConfig, ReportFlags};
use std::ffi::OsStr;
use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser, Default, Debug)]
#[clap(author, version, about, long_about = None)]
struct ReportArgs {
    #[arg(help = "Path to run dump exported from the simulation result database, in .json format")]
    input_file: String,
    #[arg(long, short, help = "Path to report configuration file in .json format")]
    config: Option<String>,
    #[arg(
        long,
        short,
        help = "Directory to write reports to (defaults to <input file stem>__results)"
    )]
    output_dir: Option<String>,
    #[arg(long, value_enum, help = "Only write the given reports (may be repeated)")]
    only: Vec<ReportChoice>,
    #[clap(long, default_value_t = false, help = "Whether to log out spans")]
    log_spans: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
enum ReportChoice {
    HourlyData,
    CustomHourlyData,
    SevenDayProfiles,
    WeekdayWeekendProfiles,
    EndUseTotals,
    Json,
}

fn main() -> anyhow::Result<()> {
    let args = ReportArgs::parse();

    // set up basic tracing
    let tracing_subscriber = {
        let mut builder = tracing_subscriber::fmt::fmt().with_max_level(tracing::Level::DEBUG);

        if args.log_spans {
            builder = builder.with_span_events(FmtSpan::CLOSE);
        }

        builder.finish()
    };
    tracing::subscriber::set_global_default(tracing_subscriber)
        .expect("setting tracing subscriber failed");

    let input_file = args.input_file.as_str();
    let input_file_ext = Path::new(input_file).extension().and_then(OsStr::to_str);
    let input_file_stem = match input_file_ext {
        Some(ext) => &input_file[..(input_file.len() - ext.len() - 1)],
        None => input_file,
    };

    let output_path = match &args.output_dir {
        Some(output_dir) => PathBuf::from(output_dir),
        None => PathBuf::from(format!("{input_file_stem}__results")),
    };
    fs::create_dir_all(&output_path)?;
    let file_output = FileOutput::new(output_path.clone(), "{}.{}".to_string());

    let config = match &args.config {
        Some(config_file) => load_config(BufReader::new(File::open(config_file)?))?,
        None => ReportConfig::default(),
    };

    let flags = (&args).into();

    let corpus = run_report(
        BufReader::new(File::open(Path::new(input_file))?),
        &config,
        &file_output,
        &flags,
    )?;

    info!(
        "Wrote reports for {} series and {} end uses to {}",
        corpus.derived.len(),
        corpus.composites.len(),
        output_path.display()
    );

    Ok(())
}

impl From<&ReportArgs> for ReportFlags {
    fn from(args: &ReportArgs) -> Self {
        if args.only.is_empty() {
            return ReportFlags::all();
        }

        let mut flags = ReportFlags::empty();
        for choice in &args.only {
            flags.insert(match choice {
                ReportChoice::HourlyData => ReportFlags::HOURLY_DATA,
                ReportChoice::CustomHourlyData => ReportFlags::CUSTOM_HOURLY_DATA,
                ReportChoice::SevenDayProfiles => ReportFlags::SEVEN_DAY_PROFILES,
                ReportChoice::WeekdayWeekendProfiles => ReportFlags::WEEKDAY_WEEKEND_PROFILES,
                ReportChoice::EndUseTotals => ReportFlags::END_USE_TOTALS,
                ReportChoice::Json => ReportFlags::JSON,
            });
        }

        flags
    }
}
