use crate::config::{ReportConfig, ReportFlags};
use crate::core::calendar_profile::ProfileCell;
use crate::core::load_distribution::{LoadDistributionBins, BIN_LABELS};
use crate::core::series::DerivedSeries;
use crate::corpus::Corpus;
use crate::output::Output;
use crate::simulation_time::{CalendarHour, SimulationCalendar, HOURS_IN_DAY};
use csv::{Writer, WriterBuilder};
use serde::Serialize;
use std::io::Write;
use tracing::instrument;

const HOURLY_DATA_KEY: &str = "8760_hourly_data";
const CUSTOM_HOURLY_DATA_KEY: &str = "8760_hour_custom";
const SEVEN_DAY_PROFILES_KEY: &str = "monthly_7_day_24_hour_averages";
const WEEKDAY_WEEKEND_PROFILES_KEY: &str = "monthly_24_hour_weekend_weekday_averages";
const END_USE_TOTALS_KEY: &str = "enduse_total_24_hour_weekend_weekday_averages";
const HOURLY_DATA_JSON_KEY: &str = "hourly_data";

const MEAN_DATA_TYPE: &str = "MEAN";
const STD_DEV_DATA_TYPE: &str = "STD_DEV";

#[instrument(skip_all)]
pub(crate) fn write_reports(
    output: &impl Output,
    corpus: &Corpus,
    config: &ReportConfig,
    flags: &ReportFlags,
) -> anyhow::Result<()> {
    if flags.contains(ReportFlags::HOURLY_DATA) {
        write_hourly_data_file(output, corpus, &config.hourly_selection)?;
    }
    if flags.contains(ReportFlags::CUSTOM_HOURLY_DATA) {
        write_custom_hourly_data_file(output, corpus, &config.custom_selection)?;
    }
    if flags.contains(ReportFlags::SEVEN_DAY_PROFILES) {
        write_profiles_file(
            output,
            SEVEN_DAY_PROFILES_KEY,
            corpus.selected(&config.hourly_selection),
            |series| &series.seven_day_profiles,
        )?;
    }
    if flags.contains(ReportFlags::WEEKDAY_WEEKEND_PROFILES) {
        write_profiles_file(
            output,
            WEEKDAY_WEEKEND_PROFILES_KEY,
            corpus.selected(&config.hourly_selection),
            |series| &series.weekday_weekend_profiles,
        )?;
    }
    if flags.contains(ReportFlags::END_USE_TOTALS) {
        write_end_use_totals_file(output, corpus)?;
    }
    if flags.contains(ReportFlags::JSON) {
        write_json_files(output, corpus)?;
    }

    Ok(())
}

fn csv_writer<'a>(
    output: &'a impl Output,
    location_key: &'a str,
) -> anyhow::Result<Writer<impl Write + 'a>> {
    let writer = output.writer_for_location_key(location_key, "csv")?;
    Ok(WriterBuilder::new().flexible(true).from_writer(writer))
}

/// Undefined values are written as empty cells.
fn format_value(value: f64) -> String {
    if value.is_finite() {
        value.to_string()
    } else {
        String::new()
    }
}

fn series_prefix(series: &DerivedSeries) -> Vec<String> {
    vec![
        series.variable_name().to_string(),
        series.key_value().to_string(),
        series.units().to_string(),
        series.hours_simulated.to_string(),
    ]
}

fn hourly_header(hours_simulated: u32) -> Vec<String> {
    ["var_name", "key_variable", "units", "hours_simulated"]
        .into_iter()
        .map(String::from)
        .chain((0..hours_simulated).map(|hour| hour.to_string()))
        .collect()
}

fn hourly_row(series: &DerivedSeries) -> Vec<String> {
    let mut row = series_prefix(series);
    row.extend(series.hourly_values.iter().copied().map(format_value));
    row
}

fn write_hourly_data_file(
    output: &impl Output,
    corpus: &Corpus,
    selection: &[String],
) -> anyhow::Result<()> {
    let mut writer = csv_writer(output, HOURLY_DATA_KEY)?;

    writer.write_record(hourly_header(corpus.hours_simulated))?;
    for series in corpus.selected(selection) {
        writer.write_record(hourly_row(series))?;
    }

    writer.flush()?;
    Ok(())
}

/// As the hourly data file, with rows under the header giving the date, month, week of year,
/// day of week and hour of each column.
fn write_custom_hourly_data_file(
    output: &impl Output,
    corpus: &Corpus,
    selection: &[String],
) -> anyhow::Result<()> {
    let mut writer = csv_writer(output, CUSTOM_HOURLY_DATA_KEY)?;
    writer.write_record(hourly_header(corpus.hours_simulated))?;

    let selected = corpus.selected(selection).collect::<Vec<_>>();
    if let Some(first) = selected.first() {
        let calendar =
            SimulationCalendar::from_timestamps(first.start_date_time, first.end_date_time);
        let calendar_row = |label: &str, cell: &dyn Fn(&CalendarHour) -> String| {
            [label.to_string(), String::new(), String::new(), String::new()]
                .into_iter()
                .chain(calendar.iter().map(|hour| cell(&hour)))
                .collect::<Vec<_>>()
        };

        writer.write_record(calendar_row("Full Date:", &|hour| {
            hour.date_time.format("%Y-%m-%d %H:%M:%S").to_string()
        }))?;
        writer.write_record(calendar_row("Month:", &|hour| {
            hour.month_abbreviation().to_uppercase()
        }))?;
        writer.write_record(calendar_row("Week #:", &|hour| hour.week_of_year()))?;
        writer.write_record(calendar_row("Day of week:", &|hour| {
            hour.weekday_number().to_string()
        }))?;
        writer.write_record(calendar_row("hour:", &|hour| {
            format!("{:02}", hour.hour_of_day())
        }))?;
    }

    for series in selected {
        writer.write_record(hourly_row(series))?;
    }

    writer.flush()?;
    Ok(())
}

fn profile_header() -> Vec<String> {
    [
        "var_name",
        "key_variable",
        "units",
        "month",
        "day_of_week",
        "Data Type",
    ]
    .into_iter()
    .map(String::from)
    .chain((0..HOURS_IN_DAY).map(|hour| hour.to_string()))
    .collect()
}

/// A profile row has one column per hour of the day, left blank for hours without data.
fn profile_row(
    variable_name: &str,
    key_value: &str,
    units: &str,
    month: u32,
    day_bucket: String,
    data_type: &str,
    hours: &[u32],
    values: &[f64],
) -> Vec<String> {
    let mut hour_columns = vec![String::new(); HOURS_IN_DAY as usize];
    for (hour, value) in hours.iter().zip(values) {
        if let Some(column) = hour_columns.get_mut(*hour as usize) {
            *column = format_value(*value);
        }
    }

    [
        variable_name.to_string(),
        key_value.to_string(),
        units.to_string(),
        month.to_string(),
        day_bucket,
        data_type.to_string(),
    ]
    .into_iter()
    .chain(hour_columns)
    .collect()
}

fn write_profiles_file<'a>(
    output: &impl Output,
    location_key: &str,
    selected: impl Iterator<Item = &'a DerivedSeries>,
    cells: impl Fn(&'a DerivedSeries) -> &'a Vec<ProfileCell>,
) -> anyhow::Result<()> {
    let mut writer = csv_writer(output, location_key)?;
    writer.write_record(profile_header())?;

    for series in selected {
        for cell in cells(series) {
            for (data_type, values) in [
                (MEAN_DATA_TYPE, &cell.mean_profile),
                (STD_DEV_DATA_TYPE, &cell.std_dev_profile),
            ] {
                writer.write_record(profile_row(
                    series.variable_name(),
                    series.key_value(),
                    series.units(),
                    cell.month,
                    cell.day_bucket.to_string(),
                    data_type,
                    &cell.hours,
                    values,
                ))?;
            }
        }
    }

    writer.flush()?;
    Ok(())
}

fn bins_row(variable_name: &str, key_value: &str, bins: &LoadDistributionBins) -> Vec<String> {
    [variable_name.to_string(), key_value.to_string()]
        .into_iter()
        .chain(bins.iter().map(|(_, count)| count.to_string()))
        .collect()
}

fn write_end_use_totals_file(output: &impl Output, corpus: &Corpus) -> anyhow::Result<()> {
    let mut writer = csv_writer(output, END_USE_TOTALS_KEY)?;
    writer.write_record(profile_header())?;

    for composite in &corpus.composites {
        for cell in &composite.weekday_weekend_profiles {
            writer.write_record(profile_row(
                &composite.variable_name,
                &composite.key_value,
                &composite.units,
                cell.month,
                cell.day_bucket.to_string(),
                MEAN_DATA_TYPE,
                &cell.hours,
                &cell.mean_profile,
            ))?;
        }
    }

    writer.write_record([""])?;
    writer.write_record([
        "End Use Variable",
        "Month",
        "Total",
        "Maximum",
        "Maximum's Hour",
    ])?;
    for composite in &corpus.composites {
        for summary in &composite.monthly_summaries {
            writer.write_record([
                composite.variable_name.clone(),
                summary.month.to_string(),
                format_value(summary.total),
                summary.maximum.map(format_value).unwrap_or_default(),
                summary
                    .maximum_hour
                    .map(|hour| hour.to_string())
                    .unwrap_or_default(),
            ])?;
        }
    }

    writer.write_record([""])?;
    writer.write_record(
        ["Bin Distribution", "Key Value"]
            .into_iter()
            .chain(BIN_LABELS),
    )?;
    for composite in &corpus.composites {
        writer.write_record(bins_row(
            &composite.variable_name,
            &composite.key_value,
            &composite.load_distribution,
        ))?;
    }

    writer.write_record([""])?;
    for series in &corpus.derived {
        writer.write_record(bins_row(
            series.variable_name(),
            series.key_value(),
            &series.load_distribution,
        ))?;
    }

    writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct HourlyDataFile<'a> {
    simulated_hours: u32,
    hourly_data: &'a [DerivedSeries],
}

/// File names cannot carry the separators some variable names contain, e.g. `Gas:Facility`.
fn sanitize_location_key(name: &str) -> String {
    name.replace([':', '/', '\\'], "_")
}

fn write_json_files(output: &impl Output, corpus: &Corpus) -> anyhow::Result<()> {
    let mut writer = output.writer_for_location_key(HOURLY_DATA_JSON_KEY, "json")?;
    serde_json::to_writer_pretty(
        &mut writer,
        &HourlyDataFile {
            simulated_hours: corpus.hours_simulated,
            hourly_data: &corpus.derived,
        },
    )?;
    writer.flush()?;

    for composite in &corpus.composites {
        let location_key = sanitize_location_key(&composite.variable_name);
        let mut writer = output.writer_for_location_key(&location_key, "json")?;
        serde_json::to_writer_pretty(&mut writer, composite)?;
        writer.flush()?;
    }

    Ok(())
}
