//! 事实 / 代码示例持久库（SQLite）
//!
//! 两张表：facts(key, value) 与 code_examples(language, snippet, explanation)。
//! LIKE 子串匹配，取第一行。目录与命令规则都未命中后才会查询（优先级见 router）。

use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS facts (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS code_examples (
    id INTEGER PRIMARY KEY,
    language TEXT NOT NULL,
    snippet TEXT NOT NULL,
    explanation TEXT NOT NULL,
    created_at TEXT NOT NULL
);
";

/// 代码示例行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeExample {
    pub snippet: String,
    pub explanation: String,
}

/// 线程安全的库句柄
#[derive(Clone)]
pub struct FactStore {
    conn: Arc<Mutex<Connection>>,
}

impl FactStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::from_conn(Connection::open(path)?)
    }

    /// 内存库（测试用）
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_conn(Connection::open_in_memory()?)
    }

    fn from_conn(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn insert_fact(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO facts (key, value, created_at) VALUES (?1, ?2, ?3)",
            params![key, value, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn insert_code_example(
        &self,
        language: &str,
        snippet: &str,
        explanation: &str,
    ) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO code_examples (language, snippet, explanation, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![language, snippet, explanation, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// key 的 LIKE 子串匹配，第一行的 value
    pub fn lookup_fact(&self, pattern: &str) -> Result<Option<String>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let value = conn
            .query_row(
                "SELECT value FROM facts WHERE key LIKE ?1 LIMIT 1",
                params![format!("%{}%", pattern)],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// language 或 explanation 的 LIKE 子串匹配，第一行
    pub fn lookup_code_example(&self, pattern: &str) -> Result<Option<CodeExample>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let like = format!("%{}%", pattern);
        let row = conn
            .query_row(
                "SELECT snippet, explanation FROM code_examples
                 WHERE language LIKE ?1 OR explanation LIKE ?1 LIMIT 1",
                params![like],
                |row| {
                    Ok(CodeExample {
                        snippet: row.get(0)?,
                        explanation: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }
}
