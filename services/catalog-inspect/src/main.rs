//! Catalog inspection tool.
//!
//! Resolves the product catalog the same way the tile server does (live
//! document, then the bundled snapshot) and prints it.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use slider_catalog::{Catalog, CatalogConfig, CatalogStore};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Summary,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "catalog-inspect")]
#[command(about = "Resolve and print the normalized satellite product catalog")]
struct Args {
    /// Skip the network and use the bundled snapshot
    #[arg(long)]
    offline: bool,

    /// Catalog script URL (overrides SLIDER_CATALOG_URL)
    #[arg(long)]
    url: Option<String>,

    /// Crop table YAML file (overrides SLIDER_CROP_TABLE)
    #[arg(long)]
    crop_table: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Output format
    #[arg(long, value_enum, default_value = "summary")]
    format: OutputFormat,

    /// Only print this satellite (slug or identifier)
    #[arg(short, long)]
    satellite: Option<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

impl Args {
    fn apply_to(&self, config: &mut CatalogConfig) {
        if self.offline {
            config.disable_downloads = true;
        }
        if let Some(url) = &self.url {
            config.source_url = url.clone();
        }
        if let Some(path) = &self.crop_table {
            config.crop_table = Some(path.clone());
        }
        if let Some(secs) = self.timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.log_json)?;

    let mut config = CatalogConfig::from_env();
    args.apply_to(&mut config);

    info!(
        url = %config.source_url,
        offline = config.disable_downloads,
        "Resolving catalog"
    );

    let store = CatalogStore::from_config(&config).context("Failed to build catalog store")?;
    let catalog = store.get().await.context("Failed to resolve catalog")?;

    if let Some(origin) = store.origin().await {
        info!(origin = %origin, "Catalog resolved");
    }

    let output = match args.format {
        OutputFormat::Json => render_json(&catalog, args.satellite.as_deref())?,
        OutputFormat::Summary => render_summary(&catalog, args.satellite.as_deref())?,
    };
    println!("{output}");

    Ok(())
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn render_json(catalog: &Catalog, satellite: Option<&str>) -> Result<String> {
    let json = match satellite {
        Some(id) => match catalog.satellite(id) {
            Some(sat) => serde_json::to_string_pretty(sat)?,
            None => bail!("Satellite not found: {id}"),
        },
        None => serde_json::to_string_pretty(catalog)?,
    };
    Ok(json)
}

fn render_summary(catalog: &Catalog, satellite: Option<&str>) -> Result<String> {
    let satellites: Vec<_> = match satellite {
        Some(id) => match catalog.satellite(id) {
            Some(sat) => vec![sat],
            None => bail!("Satellite not found: {id}"),
        },
        None => catalog.satellites.values().collect(),
    };

    let mut out = String::new();
    writeln!(
        out,
        "{} satellite(s), default: {}",
        catalog.satellites.len(),
        catalog.default_satellite
    )?;

    for sat in satellites {
        writeln!(out)?;
        writeln!(out, "{}  {}", sat.id(), sat.satellite_title)?;
        if let Some(message) = sat.deprecation_message.as_deref().filter(|_| sat.is_deprecated()) {
            writeln!(out, "  deprecated: {message}")?;
        }
        for (sector_id, sector) in &sat.sectors {
            let visible = sat.visible_products(sector).count();
            write!(
                out,
                "  {sector_id}  {}  zoom<={} tile={}px products={visible}",
                sector.sector_title, sector.max_zoom_level, sector.tile_size
            )?;
            if let Some(crop) = sector.crop_ratios {
                write!(out, " crop={}x{}", crop.x, crop.y)?;
            }
            writeln!(out)?;
        }
    }

    Ok(out.trim_end().to_string())
}
