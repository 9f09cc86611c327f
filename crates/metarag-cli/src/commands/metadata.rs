//! Metadata command

use super::{build_corpus, Services};
use crate::app::{MetadataArgs, OutputFormat};
use crate::output::format_metadata;
use anyhow::Result;
use metarag_core::Config;

pub async fn run(args: MetadataArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let services = Services::from_config(config)?;
    let (corpus, report) = build_corpus(config, &services, args.docs.as_deref()).await?;
    print!("{}", format_metadata(&corpus, &report, format));
    Ok(())
}
