use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use rusqlite::Connection;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::db::ReferenceRow;
use crate::fetcher::Fetcher;
use crate::parser;

const CONCURRENCY: usize = 10;

/// Ingest stats returned after completion.
pub struct IngestStats {
    pub total: usize,
    pub ok: usize,
    pub errors: usize,
}

/// Fetch and parse queued pages concurrently, saving each reference row to
/// the DB as it arrives. Failed fetches are recorded with their error and
/// still marked visited; there are no retries.
pub async fn ingest_streaming(
    conn: &Connection,
    fetcher: Arc<Fetcher>,
    pages: Vec<(i64, String)>,
) -> Result<IngestStats> {
    let semaphore = Arc::new(Semaphore::new(CONCURRENCY));
    let total = pages.len();

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    // Channel: workers send rows, main loop saves to DB
    let (tx, mut rx) = tokio::sync::mpsc::channel::<ReferenceRow>(CONCURRENCY * 2);

    for (page_id, url) in pages {
        let fetcher = Arc::clone(&fetcher);
        let sem = Arc::clone(&semaphore);
        let tx = tx.clone();

        tokio::spawn(async move {
            let _permit = sem.acquire().await.unwrap();
            let row = ingest_one(&fetcher, page_id, &url).await;
            let _ = tx.send(row).await;
        });
    }

    // Drop our copy of tx so rx closes when all spawned tasks finish
    drop(tx);

    let mut ok = 0usize;
    let mut errors = 0usize;

    // Prepare statements once, reuse for each row
    let mut insert_stmt = conn.prepare(
        "INSERT INTO reference_pages (page_id, url, title, body_text, error, latency_ms, fetched_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;
    let mut update_stmt = conn.prepare(
        "UPDATE pages SET visited = 1, visited_at = datetime('now') WHERE id = ?1",
    )?;

    while let Some(row) = rx.recv().await {
        if row.error.is_some() {
            errors += 1;
        } else {
            ok += 1;
        }

        let fetched_at = chrono::Utc::now().to_rfc3339();
        insert_stmt.execute(rusqlite::params![
            row.page_id,
            row.url,
            row.title,
            row.body_text,
            row.error,
            row.latency_ms,
            fetched_at,
        ])?;
        update_stmt.execute(rusqlite::params![row.page_id])?;
        pb.inc(1);
    }

    pb.finish_and_clear();
    info!("Ingested {} pages ({} ok, {} errors)", total, ok, errors);

    Ok(IngestStats { total, ok, errors })
}

async fn ingest_one(fetcher: &Fetcher, page_id: i64, url: &str) -> ReferenceRow {
    let start = Instant::now();
    let result = fetcher.try_fetch(url).await;
    let elapsed = start.elapsed().as_millis() as i64;

    match result {
        Ok(markup) => {
            let (title, body) = parser::parse(&markup);
            ReferenceRow {
                page_id,
                url: url.to_string(),
                title: Some(title),
                body_text: Some(body),
                error: None,
                latency_ms: Some(elapsed),
            }
        }
        Err(e) => {
            warn!("ingest failed for {}: {}", url, e);
            ReferenceRow {
                page_id,
                url: url.to_string(),
                title: None,
                body_text: None,
                error: Some(e.to_string()),
                latency_ms: Some(elapsed),
            }
        }
    }
}
