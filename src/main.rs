use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use signkit::export::{ExportFormat, Exporter};
use signkit::lookup::{match_ppe, match_ppe_list, ppe_info};
use signkit::model::{BrandingConfig, Orientation, PaperSize, SignageData};
use signkit::notify::LogNotifier;
use signkit::storage::{FileStore, PersistenceService};
use signkit::{AppConfig, ExportConfig};

#[derive(Parser)]
#[command(name = "signkit", version, about = "Safety signage renderer and exporter")]
struct Cli {
    /// JSON config file (render metrics, export defaults, storage directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Export a sign
    Render {
        /// Sign data (JSON)
        data: PathBuf,
        /// Branding (JSON); falls back to the stored company branding
        #[arg(long)]
        branding: Option<PathBuf>,
        #[arg(long)]
        format: Option<ExportFormat>,
        #[arg(long)]
        dpi: Option<u32>,
        #[arg(long)]
        paper: Option<PaperSize>,
        #[arg(long)]
        orientation: Option<Orientation>,
        /// Output file; defaults to the artifact name in the current directory
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Write the on-screen preview markup
    Preview {
        data: PathBuf,
        #[arg(long)]
        branding: Option<PathBuf>,
        #[arg(long, default_value = "preview.html")]
        out: PathBuf,
    },
    /// Map free-text PPE descriptions to PPE tags
    MatchPpe {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Inspect or edit persisted values
    Store {
        #[command(subcommand)]
        action: StoreAction,
    },
}

#[derive(Subcommand)]
enum StoreAction {
    Get { key: String },
    /// Store a JSON value
    Set { key: String, value: String },
    List,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "signkit=info",
        1 => "signkit=debug",
        _ => "signkit=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn load_branding(path: Option<&Path>, store: &PersistenceService) -> anyhow::Result<BrandingConfig> {
    match path {
        Some(p) => read_json(p),
        None => Ok(store.branding()?),
    }
}

fn open_store(cfg: &AppConfig) -> anyhow::Result<PersistenceService> {
    let store = FileStore::open(&cfg.storage_dir)
        .with_context(|| format!("opening store at {}", cfg.storage_dir.display()))?;
    Ok(PersistenceService::new(Arc::new(store)))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cfg = match &cli.config {
        Some(path) => AppConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => AppConfig::default(),
    };

    match cli.command {
        Command::Render { data, branding, format, dpi, paper, orientation, out } => {
            let sign: SignageData = read_json(&data)?;
            let store = open_store(&cfg)?;
            let branding = load_branding(branding.as_deref(), &store)?;

            // the sign's own paper and resolution, then CLI flags on top
            let mut export = ExportConfig {
                format: cfg.export.format,
                jpeg_quality: cfg.export.jpeg_quality,
                file_stem: cfg.export.file_stem.clone(),
                ..ExportConfig::for_sign(&sign)
            };
            if let Some(f) = format {
                export.format = f;
            }
            if let Some(d) = dpi {
                export.dpi = d;
            }
            if let Some(p) = paper {
                export.paper = p;
            }
            if let Some(o) = orientation {
                export.orientation = o;
            }
            let format = export.format;

            let exporter = Exporter::new(export, Arc::new(LogNotifier)).with_render_config(cfg.render.clone());
            let artifact = exporter.export_blocking(&sign, &branding, format)?;
            let out = out.unwrap_or_else(|| PathBuf::from(&artifact.file_name));
            std::fs::write(&out, &artifact.bytes).with_context(|| format!("writing {}", out.display()))?;

            let today = chrono::Local::now().date_naive();
            let count = store.record_export(today)?;
            log::info!("{} written ({} exports today)", out.display(), count);
        }
        Command::Preview { data, branding, out } => {
            let sign: SignageData = read_json(&data)?;
            let store = open_store(&cfg)?;
            let branding = load_branding(branding.as_deref(), &store)?;
            let exporter = Exporter::new(ExportConfig::for_sign(&sign), Arc::new(LogNotifier))
                .with_render_config(cfg.render.clone());
            let html = exporter.preview_html(&sign, &branding)?;
            std::fs::write(&out, html).with_context(|| format!("writing {}", out.display()))?;
            log::info!("preview written to {}", out.display());
        }
        Command::MatchPpe { text } => {
            for line in &text {
                match match_ppe(line) {
                    Some(ppe) => println!("{}\t{}", line, ppe_info(ppe).label),
                    None => println!("{}\t-", line),
                }
            }
            let tags = match_ppe_list(text.iter().map(String::as_str));
            println!("{}", serde_json::to_string(&tags)?);
        }
        Command::Store { action } => {
            let store = open_store(&cfg)?;
            match action {
                StoreAction::Get { key } => match store.get_raw(&key)? {
                    Some(v) => println!("{}", serde_json::to_string_pretty(&v)?),
                    None => bail!("no value stored under `{}`", key),
                },
                StoreAction::Set { key, value } => {
                    let value: serde_json::Value =
                        serde_json::from_str(&value).context("value must be valid JSON")?;
                    store.set_raw(&key, value)?;
                }
                StoreAction::List => {
                    for key in store.keys()? {
                        println!("{}", key);
                    }
                }
            }
        }
    }

    Ok(())
}
