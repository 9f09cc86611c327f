//! Query command

use super::{build_corpus, Services};
use crate::app::{OutputFormat, QueryArgs};
use crate::output::format_outcome;
use anyhow::Result;
use metarag_core::{Config, MetaragError, Pipeline, QueryFilterExtractor, QueryOutcome};

pub async fn run(args: QueryArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let query = args.query.join(" ");

    let mut pipeline_config = config.pipeline.clone();
    if let Some(limit) = args.limit {
        pipeline_config.limit = limit.max(1);
    }
    if let Some(min_score) = args.min_score {
        pipeline_config.min_score = min_score;
    }
    pipeline_config.broaden_on_empty |= args.broaden;

    let services = Services::from_config(config)?;
    let (corpus, _report) = build_corpus(config, &services, args.docs.as_deref()).await?;
    let pipeline = Pipeline::new(
        QueryFilterExtractor::new(config.filter_rules.clone()),
        services.searcher.clone(),
        pipeline_config,
    );

    let outcome = if args.no_filter {
        pipeline.run_unfiltered(&query, &corpus).await
    } else {
        pipeline.run(&query, &corpus).await
    };

    if format == OutputFormat::Cli {
        println!("Query: {}", query);
    }
    print!("{}", format_outcome(&outcome, format));

    match outcome {
        QueryOutcome::NoMatch { criteria, .. } => {
            Err(MetaragError::EmptyFilterResult(criteria.to_string()).into())
        }
        QueryOutcome::Failed { error, .. } => Err(error.into()),
        QueryOutcome::Ranked(_) | QueryOutcome::Cancelled { .. } => Ok(()),
    }
}
