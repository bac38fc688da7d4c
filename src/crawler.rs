use std::path::{Path, PathBuf};

use anyhow::Context;
use itertools::Itertools;
use log::{debug, info, warn};
use scraper::Html;
use tokio::time::sleep;

use crate::{
    checkpoint::Checkpointer,
    config::RegistryConfig,
    fetcher::{PageSource, TransportError},
    parser::{extract_records, parse_record},
    record::Record,
    xlsx_writer::DatasetWriter,
};

#[derive(Debug)]
pub struct CrawlSummary {
    pub records: usize,
    /// Number of pages requested, including the final empty one.
    pub fetches: usize,
    pub snapshots: Vec<PathBuf>,
    pub output: PathBuf,
    /// The very first page had no records, which usually means the markup changed.
    pub suspected_markup_drift: bool,
}

/// Crawls the whole registry from offset 0 until a page yields no records,
/// then writes the final spreadsheet.
pub async fn crawl<S, W>(
    config: &RegistryConfig,
    source: &mut S,
    writer: W,
    out_dir: &Path,
) -> anyhow::Result<CrawlSummary>
where
    S: PageSource,
    W: DatasetWriter,
{
    let mut checkpointer = Checkpointer::new(
        writer,
        out_dir,
        &config.backup_prefix,
        config.checkpoint_interval,
    );
    let mut offset = 0;
    let mut fetches = 0;
    let mut suspected_markup_drift = false;
    loop {
        let body = fetch_with_retry(source, offset, config)
            .await
            .with_context(|| format!("While fetching the page at offset {offset}"))?;
        fetches += 1;
        let records = parse_page(&body, config);
        debug!("start={offset} -> {} records", records.len());
        if records.is_empty() {
            if offset == 0 {
                warn!(
                    "No records on the first page.  The markup has probably changed (expected {:?}).",
                    config.markers.container
                );
                suspected_markup_drift = true;
            }
            break;
        }
        for record in records {
            checkpointer
                .push(record)
                .context("While writing a snapshot")?;
        }
        offset += config.page_size.get();
        sleep(config.page_delay).await;
    }

    let finished = checkpointer
        .finish(&config.output_file)
        .context("While writing the final spreadsheet")?;
    info!(
        "Completed: {} rows in {:?}",
        finished.records.len(),
        finished.output
    );
    Ok(CrawlSummary {
        records: finished.records.len(),
        fetches,
        snapshots: finished.snapshots,
        output: finished.output,
        suspected_markup_drift,
    })
}

fn parse_page(body: &str, config: &RegistryConfig) -> Vec<Record> {
    let html = Html::parse_document(body);
    extract_records(&html, &config.markers)
        .into_iter()
        .map(|element| parse_record(element, &config.markers, &config.name_label))
        .collect_vec()
}

async fn fetch_with_retry<S: PageSource>(
    source: &mut S,
    offset: usize,
    config: &RegistryConfig,
) -> Result<String, TransportError> {
    let mut attempt = 0;
    loop {
        match source.fetch(offset).await {
            Ok(body) => return Ok(body),
            Err(e) if attempt < config.retries => {
                attempt += 1;
                warn!(
                    "Fetching start={offset} failed ({e}).  Retrying in {:?} ({attempt}/{}).",
                    config.retry_delay, config.retries
                );
                sleep(config.retry_delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
