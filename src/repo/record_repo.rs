use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, anyhow};
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Records of one resource, keyed by big-endian integer ids so that
/// iteration follows id order.
#[derive(Clone)]
pub(crate) struct RecordRepo {
    name: &'static str,
    records: PartitionHandle,
    next_id: Arc<Mutex<()>>,
}

impl RecordRepo {
    pub(crate) fn new(keyspace: &Keyspace, name: &'static str) -> Result<RecordRepo> {
        let records = keyspace.open_partition(name, PartitionCreateOptions::default())?;
        Ok(RecordRepo {
            name,
            records,
            next_id: Arc::new(Mutex::new(())),
        })
    }
    /// Store a new record under the next free id.
    pub(crate) fn insert<T: Serialize>(&self, record: &T) -> Result<u64> {
        let bytes = serde_json::to_vec(record).context("unable to serialize record")?;
        let _guard = self
            .next_id
            .lock()
            .map_err(|_| anyhow!("id allocation lock poisoned"))?;
        let id = match self.records.last_key_value()? {
            Some((key, _)) => decode_key(&key)? + 1,
            None => 1,
        };
        self.records.insert(&id.to_be_bytes()[..], bytes)?;
        debug!(target: "repo", partition = self.name, id, "inserted record");
        Ok(id)
    }
    pub(crate) fn find_one<T: DeserializeOwned>(&self, id: u64) -> Result<Option<T>> {
        if let Some(bytes) = self.records.get(id.to_be_bytes())? {
            let record = serde_json::from_slice(&bytes)
                .with_context(|| format!("unable to deserialize {} {id}", self.name))?;
            return Ok(Some(record));
        }
        Ok(None)
    }
    pub(crate) fn contains(&self, id: u64) -> Result<bool> {
        Ok(self.records.contains_key(id.to_be_bytes())?)
    }
    /// All records in id order.
    pub(crate) fn scan<T: DeserializeOwned>(&self) -> impl Iterator<Item = Result<(u64, T)>> + '_ {
        self.records.iter().map(|kv| {
            let (key, bytes) = kv?;
            let id = decode_key(&key)?;
            let record = serde_json::from_slice(&bytes)
                .with_context(|| format!("unable to deserialize {} {id}", self.name))?;
            Ok((id, record))
        })
    }
}

fn decode_key(key: &[u8]) -> Result<u64> {
    let bytes: [u8; 8] = key.try_into().context("record key should be 8 bytes")?;
    Ok(u64::from_be_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use fjall::{Config, Keyspace};
    use serde::{Deserialize, Serialize};
    use tempfile::tempdir;

    use super::RecordRepo;

    #[derive(Debug, PartialEq, Deserialize, Serialize)]
    struct Note {
        content: String,
    }

    fn note(content: &str) -> Note {
        Note {
            content: content.to_owned(),
        }
    }

    #[test]
    fn insert_then_find() -> Result<()> {
        let tmp_dir = tempdir()?;
        let keyspace = Keyspace::open(Config::new(tmp_dir.path()).temporary(true))?;
        let repo = RecordRepo::new(&keyspace, "notes")?;
        let id = repo.insert(&note("This is a note"))?;
        assert_eq!(id, 1);
        assert_eq!(Some(note("This is a note")), repo.find_one(id)?);
        assert!(repo.contains(id)?);
        assert_eq!(None, repo.find_one::<Note>(2)?);
        Ok(())
    }

    #[test]
    fn ids_increase_in_scan_order() -> Result<()> {
        let tmp_dir = tempdir()?;
        let keyspace = Keyspace::open(Config::new(tmp_dir.path()).temporary(true))?;
        let repo = RecordRepo::new(&keyspace, "notes")?;
        for i in 0..300 {
            repo.insert(&note(&format!("note {i}")))?;
        }
        let ids: Vec<u64> = repo
            .scan::<Note>()
            .map(|entry| entry.map(|(id, _)| id))
            .collect::<Result<_>>()?;
        assert_eq!(ids, (1..=300).collect::<Vec<_>>());
        Ok(())
    }

    #[test]
    fn partitions_are_separate() -> Result<()> {
        let tmp_dir = tempdir()?;
        let keyspace = Keyspace::open(Config::new(tmp_dir.path()).temporary(true))?;
        let notes = RecordRepo::new(&keyspace, "notes")?;
        let drafts = RecordRepo::new(&keyspace, "drafts")?;
        notes.insert(&note("a"))?;
        assert_eq!(drafts.insert(&note("b"))?, 1);
        assert_eq!(Some(note("a")), notes.find_one(1)?);
        assert_eq!(Some(note("b")), drafts.find_one(1)?);
        Ok(())
    }
}
