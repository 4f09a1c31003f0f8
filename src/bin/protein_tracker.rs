// ABOUTME: Command-line tool for estimating meal macros from a photo or a food list
// ABOUTME: Loads configuration from the environment and prints items with totals
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Estimate a meal photo
//! protein-tracker analyze --image lunch.jpg
//!
//! # Add context the photo cannot show
//! protein-tracker analyze --image lunch.jpg --context "2 rotis, dal with ghee"
//!
//! # Re-estimate a corrected list of items
//! protein-tracker recalc "2x boiled egg" "1.5x cooked rice"
//!
//! # Machine-readable output
//! protein-tracker recalc "1x banana" --json
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::info;

use protein_tracker::config::{AppConfig, EstimatorConfig, LogLevel};
use protein_tracker::estimator::{AnalysisRequest, EstimatorClient, ImageUpload, MealEstimator};
use protein_tracker::ledger::{ItemLedger, ItemView, MealTotals};
use protein_tracker::logging::LoggingConfig;
use protein_tracker::session::MealSession;

#[derive(Parser)]
#[command(
    name = "protein-tracker",
    about = "Estimate protein and calories of a meal",
    long_about = "Estimates the protein and calories of a photographed meal, or of a corrected list of food items, with Google Gemini."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Estimate the items in a meal photo
    Analyze {
        /// Path to the meal photo (jpg, png, webp, heic, gif)
        #[arg(long)]
        image: PathBuf,

        /// Free-text hints about the meal
        #[arg(long)]
        context: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Re-estimate a list of "<quantity>x <name>" items
    Recalc {
        /// Items such as "2x boiled egg"
        #[arg(required = true)]
        queries: Vec<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let logging = LoggingConfig::from_env();
    let logging = if cli.verbose {
        logging.with_level(LogLevel::Debug)
    } else {
        logging
    };
    logging.init()?;

    let config = AppConfig {
        estimator: EstimatorConfig::from_env()?,
        logging,
    };
    let client = Arc::new(EstimatorClient::from_config(&config.estimator));
    info!(provider = client.provider_name(), model = %config.estimator.model, "Estimator ready");

    match cli.command {
        Command::Analyze {
            image,
            context,
            json,
        } => {
            let upload = ImageUpload::from_path(&image).await?;
            let request = AnalysisRequest {
                image: Some(upload),
                context,
            };

            let session = MealSession::new(client);
            let summary = session.analyze_image(&request).await?;
            let views = session.views().await;
            let totals = session.totals().await;

            if json {
                let output = json!({ "summary": summary, "items": views, "totals": totals });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                let confidence = summary
                    .confidence
                    .map_or_else(|| "unknown".to_owned(), |c| c.to_string());
                println!("{} (confidence: {confidence})", summary.meal_name);
                print_table(&views, totals);
            }
        }
        Command::Recalc { queries, json } => {
            let analysis = client
                .recalculate(&queries)
                .await
                .context("Recalculation failed")?;

            let mut ledger = ItemLedger::new();
            ledger.replace_all(analysis.items);
            let views = ledger.views();
            let totals = ledger.totals();

            if json {
                let output = json!({ "items": views, "totals": totals });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print_table(&views, totals);
            }
        }
    }

    Ok(())
}

fn print_table(views: &[ItemView], totals: MealTotals) {
    for view in views {
        println!(
            "{:<28} {:>8} {:<14} {:>8} {:>9}   {}",
            view.name,
            view.display_text,
            view.suffix,
            view.protein_label(),
            view.calories_label(),
            view.base_label()
        );
    }
    println!();
    println!("Total Calories: {}", totals.calories_label());
    println!("Total Protein:  {}g", totals.protein_label());
}
