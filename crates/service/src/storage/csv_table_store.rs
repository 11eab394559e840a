use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use models::layout::{self, COLUMN_COUNT, MAX_OPTION_SLOTS};
use models::{Poll, PollOption};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tracing::{debug, info};

use super::PollStore;
use crate::errors::ServiceError;

/// Flat CSV file holding the whole poll table.
///
/// The header is always `id,poll,option1..option100,votes1..votes100`; unused
/// slots are written as empty cells.
#[derive(Clone, Debug)]
pub struct CsvPollStore {
    file_path: PathBuf,
}

impl CsvPollStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { file_path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    async fn is_missing_or_empty(&self) -> bool {
        match fs::metadata(&self.file_path).await {
            Ok(meta) => meta.len() == 0,
            Err(_) => true,
        }
    }

    async fn ends_with_newline(&self) -> Result<bool, ServiceError> {
        let mut file = fs::File::open(&self.file_path).await.map_err(ServiceError::write)?;
        let len = file.metadata().await.map_err(ServiceError::write)?.len();
        if len == 0 {
            return Ok(true);
        }
        file.seek(SeekFrom::End(-1)).await.map_err(ServiceError::write)?;
        let mut last = [0u8; 1];
        file.read_exact(&mut last).await.map_err(ServiceError::write)?;
        Ok(last[0] == b'\n')
    }
}

#[async_trait]
impl PollStore for CsvPollStore {
    async fn initialize(&self) -> Result<(), ServiceError> {
        if !self.is_missing_or_empty().await {
            return Ok(());
        }
        if let Some(parent) = self.file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(ServiceError::write)?;
        }
        let bytes = encode(&[])?;
        fs::write(&self.file_path, bytes).await.map_err(ServiceError::write)?;
        info!(path = %self.file_path.display(), "created empty poll table");
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<Poll>, ServiceError> {
        let bytes = fs::read(&self.file_path)
            .await
            .map_err(|e| ServiceError::StoreRead(format!("{}: {e}", self.file_path.display())))?;
        let polls = decode(&bytes)?;
        debug!(rows = polls.len(), "loaded poll table");
        Ok(polls)
    }

    async fn save_all(&self, polls: &[Poll]) -> Result<(), ServiceError> {
        let bytes = encode(polls)?;
        fs::write(&self.file_path, bytes).await.map_err(ServiceError::write)?;
        debug!(rows = polls.len(), "rewrote poll table");
        Ok(())
    }

    async fn append_one(&self, poll: &Poll) -> Result<(), ServiceError> {
        self.initialize().await?;
        let mut bytes = Vec::new();
        // Files edited by hand may lack the final newline.
        if !self.ends_with_newline().await? {
            bytes.push(b'\n');
        }
        let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(bytes);
        wtr.write_record(row_for(poll)).map_err(ServiceError::write)?;
        let bytes = wtr.into_inner().map_err(ServiceError::write)?;

        let mut file = fs::OpenOptions::new()
            .append(true)
            .open(&self.file_path)
            .await
            .map_err(ServiceError::write)?;
        file.write_all(&bytes).await.map_err(ServiceError::write)?;
        file.flush().await.map_err(ServiceError::write)?;
        debug!(poll_id = poll.id, "appended poll row");
        Ok(())
    }
}

fn row_for(poll: &Poll) -> Vec<String> {
    let mut row = vec![String::new(); COLUMN_COUNT];
    row[0] = poll.id.to_string();
    row[1] = poll.question.clone();
    for opt in &poll.options {
        row[layout::option_index(opt.slot)] = opt.text.clone();
        row[layout::votes_index(opt.slot)] = opt.votes.to_string();
    }
    row
}

fn encode(polls: &[Poll]) -> Result<Vec<u8>, ServiceError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(layout::header()).map_err(ServiceError::write)?;
    for poll in polls {
        wtr.write_record(row_for(poll)).map_err(ServiceError::write)?;
    }
    wtr.into_inner().map_err(ServiceError::write)
}

fn decode(bytes: &[u8]) -> Result<Vec<Poll>, ServiceError> {
    if bytes.is_empty() {
        return Ok(Vec::new());
    }
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(bytes);
    let headers = rdr.headers().map_err(ServiceError::read)?.clone();
    if headers.len() != COLUMN_COUNT {
        return Err(ServiceError::StoreRead(format!(
            "header has {} columns, expected {COLUMN_COUNT}",
            headers.len()
        )));
    }
    if headers.iter().zip(layout::header()).any(|(got, want)| got != want) {
        return Err(ServiceError::StoreRead("header does not match poll table layout".into()));
    }

    let mut polls: Vec<Poll> = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record.map_err(ServiceError::read)?;
        let line = i + 2;
        let poll = decode_row(&record, line)?;
        if polls.iter().any(|p| p.id == poll.id) {
            return Err(ServiceError::StoreRead(format!("line {line}: duplicate id {}", poll.id)));
        }
        polls.push(poll);
    }
    Ok(polls)
}

fn decode_row(record: &csv::StringRecord, line: usize) -> Result<Poll, ServiceError> {
    let cell = |idx: usize| record.get(idx).unwrap_or("");
    let id = parse_count(cell(0))
        .ok_or_else(|| ServiceError::StoreRead(format!("line {line}: bad id {:?}", cell(0))))?;

    let mut options = Vec::new();
    for slot in 1..=MAX_OPTION_SLOTS {
        let text = cell(layout::option_index(slot));
        let votes = cell(layout::votes_index(slot)).trim();
        match (text.is_empty(), votes.is_empty()) {
            (true, true) => continue,
            (false, false) => {
                let votes = parse_count(votes).ok_or_else(|| {
                    ServiceError::StoreRead(format!("line {line}: bad counter {votes:?} in votes{slot}"))
                })?;
                options.push(PollOption { slot, text: text.to_string(), votes });
            }
            _ => {
                return Err(ServiceError::StoreRead(format!(
                    "line {line}: option{slot} and votes{slot} must both be set or both be empty"
                )))
            }
        }
    }
    if options.is_empty() {
        return Err(ServiceError::StoreRead(format!("line {line}: poll {id} has no options")));
    }
    Ok(Poll { id, question: cell(1).to_string(), options })
}

/// Non-negative integer, also accepting integral floats such as `3.0`.
fn parse_count(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<u64>() {
        return Some(n);
    }
    let f = raw.parse::<f64>().ok()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 {
        Some(f as u64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn tmp_path() -> PathBuf {
        std::env::temp_dir().join(format!("poll_table_{}", Uuid::new_v4())).join("polls.csv")
    }

    fn poll(id: u64, question: &str, options: &[&str]) -> Poll {
        let opts = options.iter().map(|s| s.to_string()).collect();
        Poll::new(id, question, opts, MAX_OPTION_SLOTS).unwrap()
    }

    async fn cleanup(store: &CsvPollStore) {
        if let Some(dir) = store.path().parent() {
            let _ = fs::remove_dir_all(dir).await;
        }
    }

    #[tokio::test]
    async fn initialize_writes_header_once() -> Result<(), anyhow::Error> {
        let store = CsvPollStore::new(tmp_path());
        store.initialize().await?;
        let first = fs::read_to_string(store.path()).await?;
        assert!(first.starts_with("id,poll,option1,"));
        assert!(first.trim_end().ends_with("votes100"));
        assert_eq!(first.lines().count(), 1);

        store.append_one(&poll(1, "q", &["a"])).await?;
        store.initialize().await?;
        assert_eq!(store.load_all().await?.len(), 1);

        cleanup(&store).await;
        Ok(())
    }

    #[tokio::test]
    async fn missing_file_is_a_read_error() {
        let store = CsvPollStore::new(tmp_path());
        assert!(matches!(store.load_all().await, Err(ServiceError::StoreRead(_))));
    }

    #[tokio::test]
    async fn save_then_load_preserves_rows() -> Result<(), anyhow::Error> {
        let store = CsvPollStore::new(tmp_path());
        store.initialize().await?;
        let mut a = poll(1, "Favorite color?", &["Red", "Blue"]);
        a.record_vote(2)?;
        let b = poll(7, "Tabs, or \"spaces\"?", &["tabs", "spaces", "both, sadly"]);
        store.save_all(&[a.clone(), b.clone()]).await?;

        let loaded = store.load_all().await?;
        assert_eq!(loaded, vec![a, b]);

        store.save_all(&loaded).await?;
        assert_eq!(store.load_all().await?, loaded);

        cleanup(&store).await;
        Ok(())
    }

    #[tokio::test]
    async fn unused_slots_are_empty_cells() -> Result<(), anyhow::Error> {
        let store = CsvPollStore::new(tmp_path());
        store.initialize().await?;
        store.append_one(&poll(1, "q", &["a", "b"])).await?;
        let text = fs::read_to_string(store.path()).await?;
        let row = text.lines().nth(1).unwrap_or_default();
        let cells: Vec<&str> = row.split(',').collect();
        assert_eq!(cells.len(), COLUMN_COUNT);
        assert_eq!(cells[layout::option_index(1)], "a");
        assert_eq!(cells[layout::option_index(3)], "");
        assert_eq!(cells[layout::votes_index(2)], "0");
        assert_eq!(cells[layout::votes_index(3)], "");
        cleanup(&store).await;
        Ok(())
    }

    #[tokio::test]
    async fn append_handles_missing_trailing_newline() -> Result<(), anyhow::Error> {
        let store = CsvPollStore::new(tmp_path());
        store.initialize().await?;
        let header = fs::read_to_string(store.path()).await?;
        fs::write(store.path(), header.trim_end()).await?;
        store.append_one(&poll(3, "q", &["x"])).await?;
        let loaded = store.load_all().await?;
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, 3);
        cleanup(&store).await;
        Ok(())
    }

    #[test]
    fn decode_accepts_float_counters() {
        let mut row = vec![String::new(); COLUMN_COUNT];
        row[0] = "4".into();
        row[1] = "q".into();
        row[layout::option_index(1)] = "a".into();
        row[layout::votes_index(1)] = "3.0".into();
        let csv_text = format!("{}\n{}\n", layout::header().join(","), row.join(","));
        let polls = decode(csv_text.as_bytes()).unwrap();
        assert_eq!(polls[0].options[0].votes, 3);
    }

    #[test]
    fn decode_rejects_corrupt_tables() {
        let header = layout::header().join(",");
        // short row
        let short = format!("{header}\n1,q,a\n");
        assert!(matches!(decode(short.as_bytes()), Err(ServiceError::StoreRead(_))));

        // wrong header
        assert!(matches!(decode(b"id,poll\n1,q\n"), Err(ServiceError::StoreRead(_))));

        // option without counter
        let mut row = vec![String::new(); COLUMN_COUNT];
        row[0] = "1".into();
        row[layout::option_index(1)] = "a".into();
        let orphan = format!("{header}\n{}\n", row.join(","));
        assert!(matches!(decode(orphan.as_bytes()), Err(ServiceError::StoreRead(_))));

        // bad id
        row[0] = "one".into();
        row[layout::votes_index(1)] = "0".into();
        let bad_id = format!("{header}\n{}\n", row.join(","));
        assert!(matches!(decode(bad_id.as_bytes()), Err(ServiceError::StoreRead(_))));

        // duplicate id
        row[0] = "1".into();
        let dup = format!("{header}\n{r}\n{r}\n", r = row.join(","));
        assert!(matches!(decode(dup.as_bytes()), Err(ServiceError::StoreRead(_))));

        // no options at all
        let mut bare = vec![String::new(); COLUMN_COUNT];
        bare[0] = "2".into();
        bare[1] = "q".into();
        let empty_poll = format!("{header}\n{}\n", bare.join(","));
        assert!(matches!(decode(empty_poll.as_bytes()), Err(ServiceError::StoreRead(_))));
    }

    #[test]
    fn parse_count_rules() {
        assert_eq!(parse_count("0"), Some(0));
        assert_eq!(parse_count(" 12 "), Some(12));
        assert_eq!(parse_count("2.0"), Some(2));
        assert_eq!(parse_count("2.5"), None);
        assert_eq!(parse_count("-1"), None);
        assert_eq!(parse_count(""), None);
    }
}
