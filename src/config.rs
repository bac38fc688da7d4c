use std::{fmt::Debug, num::NonZeroUsize, path::PathBuf, time::Duration};

use anyhow::Context;
use clap::ValueEnum;
use serde::Deserialize;
use serde_with::{serde_as, DurationSecondsWithFrac};
use typed_builder::TypedBuilder;
use url::Url;

use crate::marker::Marker;

/// Everything that distinguishes one registry crawl from another.
#[serde_as]
#[derive(Clone, Debug, TypedBuilder, Deserialize)]
pub struct RegistryConfig {
    pub base_url: Url,
    #[builder(setter(into))]
    pub user_agent: String,
    #[builder(setter(into))]
    pub output_file: PathBuf,
    /// Snapshots are named `<backup_prefix>_backup_<count:04>.xlsx`.
    #[builder(setter(into))]
    pub backup_prefix: String,
    #[builder(setter(into))]
    pub log_file: PathBuf,
    /// Column holding the text of the entity-name marker.
    #[builder(setter(into))]
    pub name_label: String,
    pub markers: Markers,
    #[serde(default = "default_page_size")]
    #[builder(default = default_page_size())]
    pub page_size: NonZeroUsize,
    #[serde(default = "default_checkpoint_interval")]
    #[builder(default = default_checkpoint_interval())]
    pub checkpoint_interval: NonZeroUsize,
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    #[serde(default = "default_request_timeout")]
    #[builder(default = default_request_timeout())]
    pub request_timeout: Duration,
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    #[serde(default = "default_page_delay")]
    #[builder(default = default_page_delay())]
    pub page_delay: Duration,
    /// Extra attempts per page after a transport failure.
    #[serde(default = "default_retries")]
    #[builder(default = default_retries())]
    pub retries: u32,
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    #[serde(default = "default_retry_delay")]
    #[builder(default = default_retry_delay())]
    pub retry_delay: Duration,
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct Markers {
    pub container: Marker,
    #[serde(default)]
    pub fallback_container: Option<Marker>,
    pub name: Marker,
    pub row: Marker,
    pub label: Marker,
    pub value: Marker,
}

fn default_page_size() -> NonZeroUsize {
    NonZeroUsize::new(30).unwrap_or(NonZeroUsize::MIN)
}
fn default_checkpoint_interval() -> NonZeroUsize {
    NonZeroUsize::new(300).unwrap_or(NonZeroUsize::MIN)
}
fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}
fn default_page_delay() -> Duration {
    Duration::from_secs(1)
}
fn default_retries() -> u32 {
    1
}
fn default_retry_delay() -> Duration {
    Duration::from_secs(5)
}

/// Built-in registries of the CONI sports-club register.
#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
pub enum Registry {
    /// Registro BAS 2.0
    Bas,
    /// Registro CIP 2.0
    Cip,
}

impl Registry {
    pub fn config(self) -> RegistryConfig {
        match self {
            Registry::Bas => RegistryConfig::builder()
                .base_url(static_url(
                    "https://www.coni.it/it/registro-societa-sportive/home/registro-bas-2-0/RegistroBas.html",
                ))
                .user_agent("Mozilla/5.0 (BAS-Scraper)")
                .output_file("coni_bas.xlsx")
                .backup_prefix("coni_bas")
                .log_file("scrape_coni_bas.log")
                .name_label("Nome associazione")
                .markers(Markers::standard(Some(static_marker(Some("div"), "societa_elem"))))
                .build(),
            Registry::Cip => RegistryConfig::builder()
                .base_url(static_url(
                    "https://www.coni.it/it/registro-societa-sportive/home/registro-cip-2-0/RegistroCip.html",
                ))
                .user_agent("Mozilla/5.0 (compatible; CIP-Scraper/1.0)")
                .output_file("coni.xlsx")
                .backup_prefix("coni")
                .log_file("scrape_coni.log")
                .name_label("Nome società")
                .markers(Markers::standard(None))
                .build(),
        }
    }
}

impl Markers {
    fn standard(fallback_container: Option<Marker>) -> Self {
        Self {
            container: static_marker(Some("div"), "societa_elem_int"),
            fallback_container,
            name: static_marker(Some("div"), "nome-soc"),
            row: static_marker(Some("p"), "riga"),
            label: static_marker(Some("span"), "label"),
            value: static_marker(Some("span"), "value"),
        }
    }
}

fn static_url(url: &'static str) -> Url {
    Url::parse(url).unwrap()
}

fn static_marker(tag: Option<&'static str>, class: &'static str) -> Marker {
    Marker::new(tag, class).unwrap()
}

pub fn read_toml<P: Into<PathBuf> + Debug>(path: P) -> anyhow::Result<RegistryConfig> {
    let path = path.into();
    (|| toml::from_str(&fs_err::read_to_string(&path)?).map_err(anyhow::Error::new))()
        .with_context(|| format!("While trying to parse {path:?} as a registry config"))
}
