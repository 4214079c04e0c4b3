use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

pub const MAX_RECENT_SEARCHES: usize = 5;

/// Seeded into a new database, most recent first.
pub const DEFAULT_RECENT_SEARCHES: &[&str] = &[
    "Software Engineer",
    "Product Manager",
    "Google",
    "Remote",
    "Data Scientist",
];

pub struct Database {
    conn: Connection,
    path: PathBuf,
}

impl Database {
    pub fn open() -> Result<Self> {
        Self::open_at(&Self::default_path())
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data directory: {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Self {
            conn,
            path: path.to_path_buf(),
        };
        db.init()?;
        Ok(db)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn default_path() -> PathBuf {
        match directories::ProjectDirs::from("", "", "scout") {
            Some(proj_dirs) => proj_dirs.data_dir().join("scout.db"),
            None => PathBuf::from("scout.db"),
        }
    }

    /// Creates the schema. A brand-new store starts out with the default
    /// recent searches; once seeded, an emptied list stays empty.
    pub fn init(&self) -> Result<()> {
        let existed: Option<String> = self
            .conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type='table' AND name='recent_searches'",
                [],
                |row| row.get(0),
            )
            .optional()?;

        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS recent_searches (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                query TEXT NOT NULL UNIQUE,
                searched_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )?;

        if existed.is_none() {
            let tx = self.conn.unchecked_transaction()?;
            for query in DEFAULT_RECENT_SEARCHES.iter().rev() {
                tx.execute("INSERT INTO recent_searches (query) VALUES (?1)", [query])?;
            }
            tx.commit()?;
        }
        Ok(())
    }

    // --- Recent searches ---

    /// Most recent first.
    pub fn recent_searches(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT query FROM recent_searches ORDER BY id DESC LIMIT ?1")?;
        let rows = stmt.query_map([MAX_RECENT_SEARCHES as i64], |row| row.get(0))?;
        rows.collect::<Result<Vec<String>, _>>()
            .context("Failed to list recent searches")
    }

    /// Moves `query` to the front, keeping at most five entries.
    pub fn save_recent_search(&self, query: &str) -> Result<Vec<String>> {
        let query = query.trim();
        if query.is_empty() {
            return self.recent_searches();
        }

        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM recent_searches WHERE query = ?1", [query])?;
        tx.execute("INSERT INTO recent_searches (query) VALUES (?1)", [query])?;
        tx.execute(
            "DELETE FROM recent_searches WHERE id NOT IN
                (SELECT id FROM recent_searches ORDER BY id DESC LIMIT ?1)",
            params![MAX_RECENT_SEARCHES as i64],
        )?;
        tx.commit().context("Failed to save recent search")?;

        self.recent_searches()
    }

    pub fn remove_recent_search(&self, query: &str) -> Result<Vec<String>> {
        self.conn
            .execute("DELETE FROM recent_searches WHERE query = ?1", [query.trim()])
            .context("Failed to remove recent search")?;
        self.recent_searches()
    }
}
