//! Filters command

use crate::app::{FiltersArgs, OutputFormat};
use crate::output::format_criteria;
use anyhow::Result;
use metarag_core::{Config, QueryFilterExtractor};

pub fn run(args: FiltersArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let query = args.query.join(" ");
    let criteria = QueryFilterExtractor::new(config.filter_rules.clone()).extract(&query);
    print!("{}", format_criteria(&query, &criteria, format));
    Ok(())
}
