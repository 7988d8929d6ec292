use crate::analyzers::WeatherAnalyzer;
use crate::cli::args::{Cli, Commands};
use crate::config::AppConfig;
use crate::error::{ProcessingError, Result};
use crate::models::{DailyRecord, StationCatalog, StationMetadata, YearMonth};
use crate::processors::{IntegrityChecker, MonthlyProcessor};
use crate::readers::{DailyTableReader, PageFetcher};
use crate::utils::filename::{generate_default_month_filename, generate_default_range_filename};
use crate::utils::logging::init_logging;
use crate::utils::progress::ProgressReporter;
use crate::writers::{write_json, CsvWriter, OutputFormat, ParquetWriter, StationColumns};
use std::path::{Path, PathBuf};
use tracing::info;

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    let config = AppConfig::load(cli.config.as_deref())?;
    let catalog = StationCatalog::new().with_stations(&config.stations)?;

    match cli.command {
        Commands::Fetch {
            station,
            year,
            month,
            precipitation,
            output_file,
            format,
            compression,
            validate_only,
        } => {
            let station = catalog.find(&station)?;
            let query = station.query(year, month)?;
            let format: OutputFormat = format.parse()?;
            let period = YearMonth::new(year, month)?;

            println!("Fetching {} ({}) for {}...", station.name, station.label, period);

            let fetcher = PageFetcher::new(&config.fetch)?;
            let progress = ProgressReporter::new_spinner("Downloading daily table...", false);
            let records = fetcher.fetch_month(&query, precipitation).await;
            progress.finish_with_message("Download finished");
            let records = records?;

            println!("Extracted {} daily records", records.len());
            print_reports(&records)?;

            if validate_only {
                println!("Validation complete - no output file written");
                return Ok(());
            }

            let output_file = output_file.unwrap_or_else(|| {
                generate_default_month_filename(
                    &config.output.directory,
                    &station.key,
                    period,
                    format.extension(),
                )
            });
            let compression = compression.unwrap_or_else(|| config.output.compression.clone());

            write_output(format, station, &records, &output_file, &compression)?;
            println!("Processing complete!");
        }

        Commands::Range {
            station,
            from,
            to,
            precipitation,
            max_concurrent,
            output_file,
            format,
            compression,
            validate_only,
        } => {
            let station = catalog.find(&station)?;
            let start: YearMonth = from.parse()?;
            let end: YearMonth = to.parse()?;
            if start > end {
                return Err(ProcessingError::InvalidFormat(format!(
                    "Range start {} is after end {}",
                    start, end
                )));
            }
            let format: OutputFormat = format.parse()?;
            let months = start.through(end).len();
            let max_concurrent = max_concurrent.unwrap_or(config.fetch.max_concurrent);

            println!(
                "Fetching {} ({}) from {} to {} ({} months)...",
                station.name, station.label, start, end, months
            );
            println!("Concurrent requests: {}", max_concurrent);

            let progress = ProgressReporter::new(months as u64, "Fetching daily tables...", false);
            let processor = MonthlyProcessor::new(PageFetcher::new(&config.fetch)?)
                .with_max_concurrent(max_concurrent)
                .with_precipitation(precipitation);

            let report = processor
                .process_range(station, start, end, Some(&progress))
                .await?;

            println!("\n{}", report.summary());

            if report.records.is_empty() {
                return Err(ProcessingError::MissingData(format!(
                    "No daily records for {} between {} and {}",
                    station.name, start, end
                )));
            }

            print_reports(&report.records)?;

            if validate_only {
                println!("Validation complete - no output file written");
                return Ok(());
            }

            let output_file = output_file.unwrap_or_else(|| {
                generate_default_range_filename(
                    &config.output.directory,
                    &station.key,
                    start,
                    end,
                    format.extension(),
                )
            });
            let compression = compression.unwrap_or_else(|| config.output.compression.clone());

            write_output(format, station, &report.records, &output_file, &compression)?;
            println!("Processing complete!");
        }

        Commands::Extract {
            input_html,
            station,
            year,
            month,
            precipitation,
            output_file,
            format,
        } => {
            let station = catalog.find(&station)?;
            let query = station.query(year, month)?;
            let format: OutputFormat = format.parse()?;

            info!(input = %input_html.display(), "extracting saved page");
            let records = DailyTableReader::new().read_file(&input_html, &query, precipitation)?;

            match output_file {
                Some(path) => {
                    println!("Extracted {} daily records", records.len());
                    print_reports(&records)?;
                    write_output(
                        format,
                        station,
                        &records,
                        &path,
                        &config.output.compression,
                    )?;
                }
                None => print!("{}", CsvWriter::new().render(&records)?),
            }
        }

        Commands::Stations => {
            println!("{:<10} {:<14} {:<10} {:>7} {:>8}", "KEY", "LABEL", "NAME", "PREC", "BLOCK");
            for station in catalog.stations() {
                println!(
                    "{:<10} {:<14} {:<10} {:>7} {:>8}",
                    station.key, station.label, station.name, station.prec_no, station.block_no
                );
            }
        }

        Commands::Info { file, sample } => {
            println!("Analyzing Parquet file: {}", file.display());

            let writer = ParquetWriter::new();
            let file_info = writer.get_file_info(&file)?;
            let rows = writer.read_records(&file, 0)?;
            let records: Vec<DailyRecord> = rows.iter().map(|(_, r)| r.clone()).collect();

            let stats = WeatherAnalyzer::new().analyze(&records)?;
            println!("\n{}", stats.detailed_summary());

            println!("\nFile Details:");
            println!("{}", file_info.summary());

            if sample > 0 {
                println!("\nSample Records (showing {} records):", sample.min(rows.len()));
                for (i, (station, record)) in rows.iter().take(sample).enumerate() {
                    println!(
                        "{}. {} on {}: max={}, min={}{}",
                        i + 1,
                        station.station_name,
                        record.date,
                        format_temp(record.max_temp),
                        format_temp(record.min_temp),
                        record
                            .precipitation
                            .map(|p| format!(" ({})", p.as_str()))
                            .unwrap_or_default()
                    );
                }
            }
        }
    }

    Ok(())
}

fn print_reports(records: &[DailyRecord]) -> Result<()> {
    let checker = IntegrityChecker::new();
    let integrity = checker.check_integrity(records);
    println!("\n{}", checker.generate_summary(&integrity));

    let stats = WeatherAnalyzer::new().analyze(records)?;
    println!("{}", stats.detailed_summary());
    Ok(())
}

fn write_output(
    format: OutputFormat,
    station: &StationMetadata,
    records: &[DailyRecord],
    path: &Path,
    compression: &str,
) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    println!("Writing {} records to {}...", records.len(), path.display());

    match format {
        OutputFormat::Csv => CsvWriter::new().write_records(records, path)?,
        OutputFormat::Json => write_json(records, path)?,
        OutputFormat::Parquet => {
            let writer = ParquetWriter::new().with_compression(compression)?;
            writer.write_records(&StationColumns::from(station), records, path)?;
            println!("\n{}", writer.get_file_info(path)?.summary());
        }
    }

    info!(path = %path.display(), records = records.len(), "wrote output");
    Ok(path.to_path_buf())
}

fn format_temp(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.1}°C", v))
        .unwrap_or_else(|| "--".to_string())
}
