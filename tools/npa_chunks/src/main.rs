use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

use chunker::{lookup::lookup, source, write_manifest, ChunkerConfig, IngestStats, JsonDirStore, ShardAccumulator};

/// Splits the NPA account sheet into prefix-keyed JSON chunks for the web client.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build or update chunk files from a workbook or CSV export
    Build {
        /// Path to the .xlsb/.xlsx/.csv input
        #[arg(short, long)]
        input: PathBuf,

        /// Output folder for chunks
        #[arg(short, long)]
        out: PathBuf,

        /// YAML file with defaults for the options below
        #[arg(long)]
        config: Option<PathBuf>,

        /// Sheet name [default: All NPA]
        #[arg(long)]
        sheet: Option<String>,

        /// Leading account digits used as the chunk key [default: 3]
        #[arg(long)]
        prefix_len: Option<usize>,

        /// Write a chunk to disk after this many accounts [default: 5000]
        #[arg(long)]
        flush: Option<usize>,

        /// Log progress every N rows [default: 50000]
        #[arg(long)]
        progress_every: Option<usize>,

        /// Skip writing manifest.json
        #[arg(long)]
        no_manifest: bool,
    },
    /// Print the record stored for one account
    Lookup {
        /// Chunk folder written by `build`
        #[arg(short, long)]
        out: PathBuf,

        /// Account number
        #[arg(short, long)]
        account: String,

        #[arg(long, default_value_t = 3)]
        prefix_len: usize,
    },
}

fn summary(stats: &IngestStats) -> String {
    format!(
        "Processed {} rows: {} rows accepted into {} chunks, {} rows skipped.",
        stats.rows_seen,
        stats.rows_accepted,
        stats.shards_touched.len(),
        stats.rows_skipped
    )
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            input,
            out,
            config,
            sheet,
            prefix_len,
            flush,
            progress_every,
            no_manifest,
        } => {
            let mut cfg = match config {
                Some(path) => ChunkerConfig::from_yaml_file(&path)
                    .with_context(|| format!("Failed to load config {:?}", path))?,
                None => ChunkerConfig::default(),
            };
            if let Some(s) = sheet {
                cfg.sheet = s;
            }
            if let Some(n) = prefix_len {
                cfg.prefix_len = n;
            }
            if let Some(n) = flush {
                cfg.flush_threshold = n;
            }
            if let Some(n) = progress_every {
                cfg.progress_every = n;
            }

            let store = JsonDirStore::open(&out)
                .with_context(|| format!("Failed to create output folder {:?}", out))?;
            let mut accumulator = ShardAccumulator::new(store, &cfg)?;

            info!("Reading sheet {:?} from {:?}", cfg.sheet, input);
            let (header, rows) = source::open_path(&input, &cfg.sheet)
                .with_context(|| format!("Failed to read {:?}", input))?
                .into_parts();

            let stats = accumulator.ingest(&header, rows).context("Failed to write chunks")?;
            println!("{}", summary(&stats));

            if !no_manifest {
                let manifest = write_manifest(&out).context("Failed to write manifest.json")?;
                println!("Manifest lists {} chunk files.", manifest.files.len());
            }

            println!("Done. Upload the generated {:?}/*.json to your site.", out);
        }
        Commands::Lookup {
            out,
            account,
            prefix_len,
        } => {
            let store = JsonDirStore::existing(&out)
                .with_context(|| format!("No chunk folder at {:?}", out))?;
            match lookup(&store, &account, prefix_len.max(1))? {
                Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
                None => {
                    eprintln!("Account not found: {}", account);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
