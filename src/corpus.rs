use anyhow::Result;
use rusqlite::Connection;

/// One reference page against which new pages are compared.
#[derive(Debug, Clone)]
pub struct CorpusEntry {
    pub url: String,
    pub body_text: String,
}

/// The reference set of previously ingested pages, in stable row order.
///
/// Loaded once at startup and read-only afterwards; a corpus change means
/// building a whole replacement and swapping it in, never mutating in place.
#[derive(Debug, Default)]
pub struct Corpus {
    pub entries: Vec<CorpusEntry>,
}

impl Corpus {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Load reference pages with usable bodies, in insertion order.
pub fn load(conn: &Connection) -> Result<Corpus> {
    let mut stmt = conn.prepare(
        "SELECT url, body_text FROM reference_pages
         WHERE error IS NULL AND body_text IS NOT NULL AND body_text <> ''
         ORDER BY id",
    )?;
    let entries = stmt
        .query_map([], |row| {
            Ok(CorpusEntry {
                url: row.get(0)?,
                body_text: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Corpus { entries })
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        db::init_schema(&conn).unwrap();
        conn
    }

    fn insert_reference(conn: &Connection, url: &str, body: Option<&str>, error: Option<&str>) {
        conn.execute(
            "INSERT INTO reference_pages (page_id, url, title, body_text, error, fetched_at)
             VALUES (0, ?1, '', ?2, ?3, '2026-01-01T00:00:00Z')",
            rusqlite::params![url, body, error],
        )
        .unwrap();
    }

    #[test]
    fn loads_entries_in_insertion_order() {
        let conn = test_conn();
        insert_reference(&conn, "https://a.example/", Some("first page body"), None);
        insert_reference(&conn, "https://b.example/", Some("second page body"), None);

        let corpus = load(&conn).unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.entries[0].url, "https://a.example/");
        assert_eq!(corpus.entries[1].url, "https://b.example/");
    }

    #[test]
    fn skips_error_and_empty_rows() {
        let conn = test_conn();
        insert_reference(&conn, "https://ok.example/", Some("usable body"), None);
        insert_reference(&conn, "https://err.example/", None, Some("timeout"));
        insert_reference(&conn, "https://empty.example/", Some(""), None);

        let corpus = load(&conn).unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.entries[0].url, "https://ok.example/");
    }

    #[test]
    fn empty_table_loads_empty_corpus() {
        let conn = test_conn();
        assert!(load(&conn).unwrap().is_empty());
    }
}
