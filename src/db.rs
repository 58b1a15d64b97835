use anyhow::Result;
use rusqlite::Connection;

const DB_PATH: &str = "data/seo_audit.sqlite";

pub fn connect() -> Result<Connection> {
    std::fs::create_dir_all("data")?;
    let conn = Connection::open(DB_PATH)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS pages (
            id         INTEGER PRIMARY KEY,
            url        TEXT UNIQUE NOT NULL,
            visited    BOOLEAN NOT NULL DEFAULT 0,
            visited_at TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_pages_visited ON pages(visited);

        CREATE TABLE IF NOT EXISTS reference_pages (
            id         INTEGER PRIMARY KEY,
            page_id    INTEGER NOT NULL,
            url        TEXT NOT NULL,
            title      TEXT,
            body_text  TEXT,
            error      TEXT,
            latency_ms INTEGER,
            fetched_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_reference_pages_url ON reference_pages(url);
        ",
    )?;
    Ok(())
}

// ── Seed queue ──

pub fn insert_pages(conn: &Connection, urls: &[String]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        let mut stmt = tx.prepare("INSERT OR IGNORE INTO pages (url) VALUES (?1)")?;
        for url in urls {
            count += stmt.execute(rusqlite::params![url])?;
        }
    }
    tx.commit()?;
    Ok(count)
}

pub fn fetch_unvisited(conn: &Connection, limit: Option<usize>) -> Result<Vec<(i64, String)>> {
    let sql = match limit {
        Some(n) => format!(
            "SELECT id, url FROM pages WHERE visited = 0 ORDER BY id LIMIT {}",
            n
        ),
        None => "SELECT id, url FROM pages WHERE visited = 0 ORDER BY id".to_string(),
    };
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// One fetched reference page, streamed from the ingest workers into the DB.
pub struct ReferenceRow {
    pub page_id: i64,
    pub url: String,
    pub title: Option<String>,
    pub body_text: Option<String>,
    pub error: Option<String>,
    pub latency_ms: Option<i64>,
}

// ── Stats ──

pub struct Stats {
    pub total: usize,
    pub visited: usize,
    pub unvisited: usize,
    pub referenced: usize,
    pub errors: usize,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let count = |sql: &str| -> Result<usize> {
        Ok(conn.query_row(sql, [], |row| row.get::<_, i64>(0))? as usize)
    };
    Ok(Stats {
        total: count("SELECT COUNT(*) FROM pages")?,
        visited: count("SELECT COUNT(*) FROM pages WHERE visited = 1")?,
        unvisited: count("SELECT COUNT(*) FROM pages WHERE visited = 0")?,
        referenced: count(
            "SELECT COUNT(*) FROM reference_pages
             WHERE error IS NULL AND body_text IS NOT NULL AND body_text <> ''",
        )?,
        errors: count("SELECT COUNT(*) FROM reference_pages WHERE error IS NOT NULL")?,
    })
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn insert_pages_ignores_duplicates() {
        let conn = test_conn();
        let urls = vec![
            "https://a.example/".to_string(),
            "https://b.example/".to_string(),
        ];
        assert_eq!(insert_pages(&conn, &urls).unwrap(), 2);
        assert_eq!(insert_pages(&conn, &urls).unwrap(), 0);
    }

    #[test]
    fn fetch_unvisited_respects_limit_and_order() {
        let conn = test_conn();
        let urls: Vec<String> = (0..5).map(|i| format!("https://x.example/{}", i)).collect();
        insert_pages(&conn, &urls).unwrap();

        let two = fetch_unvisited(&conn, Some(2)).unwrap();
        assert_eq!(two.len(), 2);
        assert_eq!(two[0].1, "https://x.example/0");

        conn.execute("UPDATE pages SET visited = 1 WHERE url = ?1", [&urls[0]])
            .unwrap();
        let rest = fetch_unvisited(&conn, None).unwrap();
        assert_eq!(rest.len(), 4);
    }

    #[test]
    fn stats_count_queue_and_references() {
        let conn = test_conn();
        insert_pages(&conn, &["https://a.example/".to_string()]).unwrap();
        conn.execute(
            "INSERT INTO reference_pages (page_id, url, title, body_text, error, fetched_at)
             VALUES (1, 'https://a.example/', 't', 'body', NULL, '2026-01-01T00:00:00Z')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO reference_pages (page_id, url, title, body_text, error, fetched_at)
             VALUES (1, 'https://b.example/', NULL, NULL, 'timeout', '2026-01-01T00:00:00Z')",
            [],
        )
        .unwrap();

        let s = get_stats(&conn).unwrap();
        assert_eq!(s.total, 1);
        assert_eq!(s.unvisited, 1);
        assert_eq!(s.referenced, 1);
        assert_eq!(s.errors, 1);
    }
}
