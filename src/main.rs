use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use forel::clustering::{Config, Forel, Metric, RadiusSweep};
use forel::dataset::{Dataset, Table};
use forel::matrices::{DensityMatrix, DistanceMatrix};
use forel::report;
use log::info;

#[derive(Parser)]
#[clap(version, about = "FOREL radius clustering")]
struct Opts {
    /// Delimited input file with a header row.
    file: PathBuf,

    /// Cluster radius; a negative value sweeps a range of radii instead.
    #[clap(allow_hyphen_values = true)]
    radius: f64,

    /// Weight distances by the local-density matrix.
    #[clap(short, long)]
    density: bool,

    /// YAML configuration file.
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Identity used to pick normalization constants (defaults to the file name).
    #[clap(long)]
    dataset_id: Option<String>,

    /// Fail on non-numeric feature values instead of reading them as 0.
    #[clap(long)]
    strict: bool,

    /// Feature fields to print after each record's cluster id.
    #[clap(long, value_delimiter = ',')]
    show_fields: Vec<String>,

    /// Log level override (error, warn, info, debug, trace).
    #[clap(long)]
    log_level: Option<String>,
}

fn dataset_identity(opts: &Opts, config: &Config) -> String {
    opts.dataset_id
        .clone()
        .or_else(|| config.dataset.id.clone())
        .or_else(|| {
            opts.file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| opts.file.display().to_string())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("failed to load configuration {}", path.display())),
        None => Ok(Config::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();

    let mut config = load_config(opts.config.as_deref())?;
    if let Some(level) = &opts.log_level {
        config.logging.level = level.clone();
    }
    if opts.density {
        config.clustering.density_weighting = true;
    }
    if opts.strict {
        config.dataset.strict_parsing = true;
    }
    config.validate()?;
    config.setup_logging();
    info!("{}", config);

    let table = Table::from_path(&opts.file, config.delimiter())
        .with_context(|| format!("failed to read {}", opts.file.display()))?;
    let dataset: Dataset<f64> = Dataset::from_table(
        &table,
        &config.dataset.features,
        config.dataset.identifier_column.as_deref(),
        config.parse_policy(),
    )?;
    info!(
        "Dataset: {} records, {} feature fields",
        dataset.len(),
        dataset.fields().len()
    );

    let distances = DistanceMatrix::build(&dataset)?;
    let density = if config.clustering.density_weighting {
        Some(DensityMatrix::build(&distances)?)
    } else {
        None
    };
    let metric = Metric::select(
        &distances,
        density.as_ref(),
        config.clustering.density_weighting,
    )?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if opts.radius < 0.0 {
        let dataset_id = dataset_identity(&opts, &config);
        let params = config.sweep_params(&dataset_id, config.clustering.density_weighting)?;
        info!("Sweep profile for {}: {:?}", dataset_id, params);

        let forel = Forel::new(metric).with_seed(config.seed_policy());
        let sweep = RadiusSweep::new(forel, params).run()?;
        report::write_sweep(&mut out, &sweep)?;
        report::write_sweep_summary(&mut out, &sweep)?;
    } else {
        let partition = Forel::new(metric)
            .with_seed(config.seed_policy())
            .with_salience(&dataset)
            .run(opts.radius)?;
        info!(
            "Radius {}: {} clusters, total weight {}",
            opts.radius,
            partition.cluster_count(),
            partition.total_weight
        );
        report::write_cluster_analysis(&mut out, &dataset, &partition)?;
        writeln!(out, "\n{}", "=== Partition ===".bold())?;
        report::write_partition(&mut out, &dataset, &partition, &opts.show_fields)?;
    }

    out.flush()?;
    Ok(())
}
