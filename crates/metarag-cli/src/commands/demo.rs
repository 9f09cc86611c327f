//! Demo command
//!
//! Ingests the built-in samples, prints their metadata, then runs each sample
//! query with and without metadata filtering.

use super::{build_corpus, Services};
use crate::app::{DemoArgs, OutputFormat};
use crate::output::{format_metadata, json, terminal};
use anyhow::Result;
use metarag_core::{Config, CorpusStore, Pipeline, QueryFilterExtractor, SAMPLE_QUERIES};

pub async fn run(args: DemoArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let services = Services::from_config(config)?;
    let (corpus, report) = build_corpus(config, &services, None).await?;

    let mut pipeline_config = config.pipeline.clone();
    pipeline_config.limit = args.limit.max(1);
    let pipeline = Pipeline::new(
        QueryFilterExtractor::new(config.filter_rules.clone()),
        services.searcher.clone(),
        pipeline_config,
    );

    let mut runs = Vec::with_capacity(SAMPLE_QUERIES.len());
    for query in SAMPLE_QUERIES {
        let filtered = pipeline.run(query, &corpus).await;
        let unfiltered = pipeline.run_unfiltered(query, &corpus).await;
        runs.push((*query, filtered, unfiltered));
    }

    match format {
        OutputFormat::Json => {
            let queries: Vec<serde_json::Value> = runs
                .iter()
                .map(|(query, filtered, unfiltered)| {
                    serde_json::json!({
                        "query": query,
                        "with_filtering": json::outcome_value(filtered),
                        "without_filtering": json::outcome_value(unfiltered),
                    })
                })
                .collect();
            let value = serde_json::json!({
                "corpus": json::metadata_value(&corpus, &report),
                "search": pipeline.searcher_name(),
                "queries": queries,
            });
            print!("{}", json::to_pretty(&value));
        }
        OutputFormat::Cli => {
            println!("Indexed {} documents\n", corpus.len());
            print!("{}", format_metadata(&corpus, &report, format));
            println!("\nSearch: {}", pipeline.searcher_name());

            for (query, filtered, unfiltered) in &runs {
                println!("\nQuery: {}", query);
                println!(" With metadata filtering:");
                print!("{}", terminal::format_outcome(filtered));
                println!(" Without filtering:");
                print!("{}", terminal::format_outcome(unfiltered));
            }
        }
    }

    Ok(())
}
