mod classifier;
mod corpus;
mod db;
mod fetcher;
mod ingest;
mod metrics;
mod parser;
mod pipeline;
mod similarity;
mod sitemap;
mod text;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use regex::Regex;
use tracing::warn;

use classifier::LinearModel;
use fetcher::Fetcher;
use similarity::VectorSpace;

#[derive(Parser)]
#[command(name = "seo_audit", about = "Content quality and duplicate detection for webpages")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the local database schema
    Init,
    /// Queue page URLs from a sitemap urlset
    Seed {
        sitemap_url: String,
        /// Keep only URLs matching this regex
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Fetch queued pages into the reference corpus
    Ingest {
        /// Max pages to ingest (default: all unvisited)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Analyze one URL for quality and near-duplicates
    Analyze {
        url: String,
        /// Cosine similarity threshold for duplicate matches, in [0, 1]
        #[arg(short, long, default_value_t = 0.5, value_parser = parse_threshold)]
        threshold: f64,
        /// Path to the trained quality model export
        #[arg(short, long, default_value = "models/quality_model.json")]
        model: PathBuf,
    },
    /// Show queue and corpus statistics
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            println!("Database ready at data/seo_audit.sqlite");
            Ok(())
        }
        Commands::Seed { sitemap_url, filter } => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let filter = filter.as_deref().map(Regex::new).transpose()?;
            let urls = sitemap::fetch_page_urls(&sitemap_url, filter.as_ref()).await?;
            let inserted = db::insert_pages(&conn, &urls)?;
            println!("Queued {} new URLs ({} total found)", inserted, urls.len());
            Ok(())
        }
        Commands::Ingest { limit } => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let pages = db::fetch_unvisited(&conn, limit)?;
            if pages.is_empty() {
                println!("No unvisited pages. Run 'seed' first or all pages are ingested.");
                return Ok(());
            }
            println!("Ingesting {} pages (streaming to DB)...", pages.len());
            let fetcher = Arc::new(Fetcher::new()?);
            let stats = ingest::ingest_streaming(&conn, fetcher, pages).await?;
            println!(
                "Done: {} ingested ({} ok, {} errors).",
                stats.total, stats.ok, stats.errors
            );
            Ok(())
        }
        Commands::Analyze { url, threshold, model } => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;

            // Classifier availability is a precondition; no silent default label.
            let model = LinearModel::from_path(&model)?;

            let corpus = corpus::load(&conn)?;
            let space = if corpus.is_empty() {
                warn!("reference corpus is empty; duplicate detection disabled");
                None
            } else {
                Some(VectorSpace::fit(&corpus))
            };
            let fetcher = Fetcher::new()?;

            let result =
                pipeline::analyze(&url, &fetcher, &corpus, space.as_ref(), &model, threshold)
                    .await?;
            println!("{}", serde_json::to_string_pretty(&result)?);

            if result.similar_to.is_empty() {
                println!("\nNo similar pages at threshold {:.2}.", threshold);
            } else {
                println!("\n{:>3} | {:<60} | {:>10}", "#", "Similar URL", "Similarity");
                println!("{}", "-".repeat(79));
                for (i, m) in result.similar_to.iter().enumerate() {
                    println!(
                        "{:>3} | {:<60} | {:>10.4}",
                        i + 1,
                        truncate(&m.url, 60),
                        m.similarity
                    );
                }
            }
            Ok(())
        }
        Commands::Stats => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let s = db::get_stats(&conn)?;
            println!("Queued:    {}", s.total);
            println!("Visited:   {}", s.visited);
            println!("Unvisited: {}", s.unvisited);
            println!("Reference: {}", s.referenced);
            println!("Errors:    {}", s.errors);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }

    result
}

fn parse_threshold(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("`{raw}` is not a number"))?;
    if !(0.0..=1.0).contains(&value) {
        return Err(format!("threshold must be in [0, 1], got {value}"));
    }
    Ok(value)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_accepts_unit_interval() {
        assert_eq!(parse_threshold("0"), Ok(0.0));
        assert_eq!(parse_threshold("0.5"), Ok(0.5));
        assert_eq!(parse_threshold("1"), Ok(1.0));
    }

    #[test]
    fn threshold_rejects_out_of_range_and_junk() {
        assert!(parse_threshold("1.1").is_err());
        assert!(parse_threshold("-0.2").is_err());
        assert!(parse_threshold("half").is_err());
    }

    #[test]
    fn truncate_appends_ellipsis_only_when_needed() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("much longer than that", 10), "much longe...");
    }
}
