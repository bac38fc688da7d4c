use std::path::PathBuf;

use clap::Parser;
use coni_scraping::config::{read_toml, Registry};
use coni_scraping::crawler::crawl;
use coni_scraping::fetcher::HttpPageSource;
use coni_scraping::logging;
use coni_scraping::xlsx_writer::XlsxWriter;
use log::{error, info};

#[derive(Parser)]
struct Opts {
    /// Registry to crawl with its built-in settings.
    #[arg(value_enum, default_value = "bas")]
    registry: Registry,
    /// TOML file replacing the built-in settings of the registry.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory receiving the log, the snapshots and the final spreadsheet.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();
    let config = match &opts.config {
        Some(path) => read_toml(path)?,
        None => opts.registry.config(),
    };
    fs_err::create_dir_all(&opts.out_dir)?;
    logging::init(&opts.out_dir.join(&config.log_file))?;
    info!("Crawling {}", config.base_url);

    let mut source = HttpPageSource::new(&config)?;
    match crawl(&config, &mut source, XlsxWriter, &opts.out_dir).await {
        Ok(summary) => {
            info!(
                "{} records in {} pages, {} snapshots",
                summary.records,
                summary.fetches,
                summary.snapshots.len()
            );
            Ok(())
        }
        Err(e) => {
            error!("Crawl aborted: {e:?}");
            Err(e)
        }
    }
}
