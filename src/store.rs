// src/store.rs
//! Files the batch driver reads and writes: the pending-work queue, the
//! output table and the error log.

use anyhow::{Context, Result};
use chrono::Utc;
use csv::StringRecord;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::types::{OutputRecord, PersonRecord};

const FULLNAME_COLUMN: &str = "fullname";
const EMAIL_COLUMN: &str = "email";
const USERNAME_COLUMN: &str = "username";

/// People still to process, with the roster's header kept verbatim.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingQueue {
    pub headers: StringRecord,
    pub rows: Vec<StringRecord>,
}

impl PendingQueue {
    pub fn from_csv(content: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = reader.headers().context("Failed to read CSV header")?.clone();
        let rows = reader
            .records()
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to parse CSV rows")?;

        Ok(Self { headers, rows })
    }

    pub fn to_csv(&self) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush CSV buffer: {}", e.error()))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    fn field<'a>(&self, row: &'a StringRecord, column: Option<usize>) -> &'a str {
        column.and_then(|i| row.get(i)).unwrap_or("").trim()
    }

    pub fn person(&self, row: &StringRecord) -> PersonRecord {
        let fullname = self.field(row, self.column(FULLNAME_COLUMN));
        let email = self.field(row, self.column(EMAIL_COLUMN));
        let username = self.field(row, self.column(USERNAME_COLUMN));
        PersonRecord::new(fullname, email).with_username(username)
    }

    pub fn people(&self, limit: usize) -> Vec<PersonRecord> {
        self.rows.iter().take(limit).map(|r| self.person(r)).collect()
    }

    /// Drop rows with a blank name; they can never be searched.
    pub fn without_blank_names(mut self) -> Self {
        let column = self.column(FULLNAME_COLUMN);
        self.rows
            .retain(|row| !column.and_then(|i| row.get(i)).unwrap_or("").trim().is_empty());
        self
    }

    /// Remove the first `count` rows (fewer if the queue is shorter).
    pub fn drain_front(&mut self, count: usize) {
        let count = count.min(self.rows.len());
        self.rows.drain(..count);
    }
}

pub struct PendingStore {
    path: PathBuf,
}

impl PendingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub async fn load(&self) -> Result<PendingQueue> {
        let content = fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read pending file: {}", self.path.display()))?;
        PendingQueue::from_csv(&content)
            .with_context(|| format!("Failed to parse pending file: {}", self.path.display()))
    }

    /// Rewrite the whole file: header plus remaining rows.
    pub async fn save(&self, queue: &PendingQueue) -> Result<()> {
        let bytes = queue.to_csv()?;
        if let Some(parent) = self.path.parent() {
            ensure_dir_exists(parent).await?;
        }
        fs::write(&self.path, bytes)
            .await
            .with_context(|| format!("Failed to write pending file: {}", self.path.display()))
    }

    /// Seed the queue from the input roster.
    pub async fn init_from_roster(&self, roster: &Path) -> Result<PendingQueue> {
        let content = fs::read_to_string(roster)
            .await
            .with_context(|| format!("Failed to read input roster: {}", roster.display()))?;
        let queue = PendingQueue::from_csv(&content)
            .with_context(|| format!("Failed to parse input roster: {}", roster.display()))?
            .without_blank_names();
        self.save(&queue).await?;
        info!(
            "Created {} with {} people (filtered empty names)",
            self.path.display(),
            queue.len()
        );
        Ok(queue)
    }

    /// Existing queue, or a fresh one from the roster on first run.
    pub async fn load_or_init(&self, roster: &Path) -> Result<PendingQueue> {
        if self.exists() {
            self.load().await
        } else {
            self.init_from_roster(roster).await
        }
    }
}

/// Append-only output table.
pub struct OutputStore {
    path: PathBuf,
    headers: Vec<String>,
}

impl OutputStore {
    pub fn new(path: impl Into<PathBuf>, org_column_prefix: &str) -> Self {
        Self {
            path: path.into(),
            headers: OutputRecord::headers(org_column_prefix),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the header if the file does not exist yet.
    pub async fn ensure_header(&self) -> Result<()> {
        if self.path.exists() {
            return Ok(());
        }
        let bytes = encode_row(&self.headers)?;
        if let Some(parent) = self.path.parent() {
            ensure_dir_exists(parent).await?;
        }
        fs::write(&self.path, bytes)
            .await
            .with_context(|| format!("Failed to create output file: {}", self.path.display()))
    }

    pub async fn append(&self, record: &OutputRecord) -> Result<()> {
        let bytes = encode_row(record.values())?;
        append_bytes(&self.path, &bytes)
            .await
            .with_context(|| format!("Failed to append to output file: {}", self.path.display()))
    }

    /// Data rows written so far (header excluded); 0 when the file is missing.
    pub async fn count_rows(&self) -> Result<usize> {
        if !self.path.exists() {
            return Ok(0);
        }
        let content = fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read output file: {}", self.path.display()))?;
        Ok(PendingQueue::from_csv(&content)?.len())
    }
}

/// Append-only log of per-person failures.
pub struct ErrorLog {
    path: PathBuf,
}

impl ErrorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn record(&self, person: &PersonRecord, message: &str) -> Result<()> {
        let line = format_error_line(person, message, &Utc::now().to_rfc3339());
        append_bytes(&self.path, line.as_bytes())
            .await
            .with_context(|| format!("Failed to write error log: {}", self.path.display()))
    }
}

pub fn format_error_line(person: &PersonRecord, message: &str, timestamp: &str) -> String {
    // One entry per line, whatever the message contains.
    let message = message.replace(['\r', '\n'], " ");
    format!(
        "[{}] {} ({}): {}\n",
        timestamp, person.fullname, person.email, message
    )
}

fn encode_row<I, T>(values: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(values)?;
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV buffer: {}", e.error()))
}

async fn append_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir_exists(parent).await?;
    }
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    Ok(())
}

async fn ensure_dir_exists(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() || path.exists() {
        return Ok(());
    }
    fs::create_dir_all(path)
        .await
        .with_context(|| format!("Failed to create directory: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ROSTER: &str = "fullname,email,username,title\n\
        Jane Doe,jane@x.io,jdoe,Engineer\n\
        ,ghost@x.io,ghost,\n\
        Ashvin,anihalani5@gmail.com,nihalani,\n\
        \"Lee, Leland\",leland@x.io,,\"PM, Growth\"\n";

    #[test]
    fn test_person_from_row() {
        let queue = PendingQueue::from_csv(ROSTER).unwrap();
        let people = queue.people(10);
        assert_eq!(people.len(), 4);
        assert_eq!(people[0].fullname, "Jane Doe");
        assert_eq!(people[0].username.as_deref(), Some("jdoe"));
        assert_eq!(people[3].fullname, "Lee, Leland");
        assert_eq!(people[3].username, None);
    }

    #[test]
    fn test_blank_names_filtered() {
        let queue = PendingQueue::from_csv(ROSTER).unwrap().without_blank_names();
        assert_eq!(queue.len(), 3);
        assert!(queue.people(10).iter().all(|p| !p.fullname.is_empty()));
    }

    #[test]
    fn test_missing_columns_read_as_empty() {
        let queue = PendingQueue::from_csv("fullname\nKai\n").unwrap();
        let person = &queue.people(1)[0];
        assert_eq!(person.fullname, "Kai");
        assert_eq!(person.email, "");
        assert_eq!(person.username, None);
    }

    #[test]
    fn test_drain_front_saturates() {
        let mut queue = PendingQueue::from_csv(ROSTER).unwrap();
        queue.drain_front(3);
        assert_eq!(queue.len(), 1);
        queue.drain_front(10);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_error_line_format() {
        let person = PersonRecord::new("Jane Doe", "jane@x.io");
        let line = format_error_line(&person, "timeout\nretry", "2026-01-01T00:00:00+00:00");
        assert_eq!(
            line,
            "[2026-01-01T00:00:00+00:00] Jane Doe (jane@x.io): timeout retry\n"
        );
    }

    #[tokio::test]
    async fn test_pending_roundtrip_keeps_header_verbatim() {
        let dir = TempDir::new().unwrap();
        let roster = dir.path().join("slack.csv");
        std::fs::write(&roster, ROSTER).unwrap();

        let store = PendingStore::new(dir.path().join("remaining.csv"));
        assert!(!store.exists());
        let mut queue = store.load_or_init(&roster).await.unwrap();
        assert_eq!(queue.len(), 3);

        queue.drain_front(1);
        store.save(&queue).await.unwrap();

        let reloaded = store.load().await.unwrap();
        assert_eq!(reloaded.len(), 2);
        let written = std::fs::read_to_string(store.path()).unwrap();
        assert!(written.starts_with("fullname,email,username,title\n"));
        assert!(written.contains("\"PM, Growth\""));
    }

    #[tokio::test]
    async fn test_output_header_written_once() {
        let dir = TempDir::new().unwrap();
        let store = OutputStore::new(dir.path().join("out.csv"), "bab");
        store.ensure_header().await.unwrap();
        store.ensure_header().await.unwrap();

        let person = PersonRecord::new("Jane Doe", "jane@x.io");
        store.append(&OutputRecord::empty(&person)).await.unwrap();
        store.append(&OutputRecord::empty(&person)).await.unwrap();

        let content = std::fs::read_to_string(store.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("bab_role,bab_years"));
        assert_eq!(lines[1], "Jane Doe,jane@x.io,,,,,,,,");
        assert_eq!(store.count_rows().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_error_log_appends() {
        let dir = TempDir::new().unwrap();
        let log = ErrorLog::new(dir.path().join("errors.log"));
        let person = PersonRecord::new("Jane Doe", "jane@x.io");
        log.record(&person, "first").await.unwrap();
        log.record(&person, "second").await.unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.lines().nth(1).unwrap().ends_with("Jane Doe (jane@x.io): second"));
    }
}
