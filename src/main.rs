use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use fava_catalog::config::{DEFAULT_END_WEEK, DEFAULT_START_WEEK};
use fava_catalog::data::fetcher::check_week_range;
use fava_catalog::{Catalog, FavaConfig, Fetcher, Field, GalacticSelector, Selection};

#[derive(Parser, Debug)]
#[command(
    name = "fava-catalog",
    about = "Download the Fermi LAT FAVA flare catalog and select galactic-plane sources",
    long_about = None
)]
struct Args {
    /// First week to download
    #[arg(long, default_value_t = DEFAULT_START_WEEK)]
    start_week: u32,

    /// Last week to download (inclusive)
    #[arg(long, default_value_t = DEFAULT_END_WEEK)]
    end_week: u32,

    /// Minimum detection significance in sigma (overrides config)
    #[arg(long)]
    threshold: Option<f64>,

    /// Concurrent week downloads (overrides config)
    #[arg(long)]
    workers: Option<usize>,

    /// Keep only sources within +/- this galactic latitude in degrees
    #[arg(long)]
    galactic_band: Option<f64>,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the query URLs without downloading
    #[arg(long)]
    dry_run: bool,

    /// Number of rows to print
    #[arg(long, default_value_t = 10)]
    show: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => FavaConfig::from_json_file(path)?,
        None => FavaConfig::default(),
    }
    .with_env()?;
    if let Some(threshold) = args.threshold {
        config.threshold = threshold;
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    config.validate()?;

    let fetcher = Fetcher::from_config(&config);

    check_week_range(args.start_week, args.end_week)?;

    if args.dry_run {
        for week in args.start_week..=args.end_week {
            println!("{}", fetcher.query_url(week, config.threshold));
        }
        return Ok(());
    }

    let catalog = if config.workers > 1 {
        fetcher.download_range_parallel(
            args.start_week,
            args.end_week,
            config.threshold,
            config.workers,
        )
    } else {
        fetcher.download_range(args.start_week, args.end_week, config.threshold)
    }
    .with_context(|| {
        format!(
            "downloading FAVA weeks {}..={}",
            args.start_week, args.end_week
        )
    })?;

    let catalog = match args.galactic_band {
        Some(half_width) => {
            match GalacticSelector::new()
                .select_galactic_band(&catalog, half_width, false)
                .context("selecting galactic sources")?
            {
                Selection::Catalog(selected) => selected,
                Selection::Mask(mask) => catalog.take(&mask)?,
            }
        }
        None => catalog,
    };

    print_rows(&catalog, args.show);
    println!("{} sources", catalog.len());
    Ok(())
}

fn print_rows(catalog: &Catalog, limit: usize) {
    const SHOWN: [Field; 6] = [
        Field::FlareId,
        Field::Week,
        Field::BestRa,
        Field::BestDec,
        Field::Sigma,
        Field::Assoc,
    ];
    if limit == 0 || catalog.is_empty() {
        return;
    }

    let header: Vec<_> = SHOWN.iter().map(|f| format!("{:>12}", f.name())).collect();
    println!("{}", header.join(" "));
    for row in 0..catalog.len().min(limit) {
        let cells: Vec<_> = SHOWN
            .iter()
            .map(|&f| format!("{:>12}", catalog.column(f)[row].to_string()))
            .collect();
        println!("{}", cells.join(" "));
    }
}
