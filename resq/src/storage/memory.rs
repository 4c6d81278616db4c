//! In-process store
//!
//! Mirrors the Redis semantics the engine relies on (empty lists and sets
//! disappear, `LRANGE` index rules, atomic head pop) behind a single lock.

use super::Store;
use crate::{Error, Result};
use async_trait::async_trait;
use fred::error::{RedisError, RedisErrorKind};
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Entry {
    List(VecDeque<String>),
    Set(BTreeSet<String>),
    Scalar(String),
}

fn wrong_type() -> Error {
    Error::Redis(RedisError::new(
        RedisErrorKind::InvalidArgument,
        "WRONGTYPE Operation against a key holding the wrong kind of value",
    ))
}

/// In-memory store for tests and single-process embedding
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<Mutex<HashMap<String, Entry>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn push(&self, key: &str, value: String) -> Result<u64> {
        let mut data = self.data.lock();
        match data
            .entry(key.to_string())
            .or_insert_with(|| Entry::List(VecDeque::new()))
        {
            Entry::List(list) => {
                list.push_back(value);
                Ok(list.len() as u64)
            }
            _ => Err(wrong_type()),
        }
    }

    async fn pop_head(&self, key: &str) -> Result<Option<String>> {
        let mut data = self.data.lock();
        let (value, now_empty) = match data.get_mut(key) {
            None => return Ok(None),
            Some(Entry::List(list)) => {
                let value = list.pop_front();
                (value, list.is_empty())
            }
            Some(_) => return Err(wrong_type()),
        };

        if now_empty {
            data.remove(key);
        }
        Ok(value)
    }

    async fn range(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>> {
        let data = self.data.lock();
        let list = match data.get(key) {
            None => return Ok(Vec::new()),
            Some(Entry::List(list)) => list,
            Some(_) => return Err(wrong_type()),
        };

        let len = list.len() as i64;
        let start = if start < 0 { (start + len).max(0) } else { start };
        let stop = if stop < 0 { stop + len } else { stop.min(len - 1) };

        if start >= len || start > stop {
            return Ok(Vec::new());
        }

        Ok(list
            .iter()
            .skip(start as usize)
            .take((stop - start + 1) as usize)
            .cloned()
            .collect())
    }

    async fn length(&self, key: &str) -> Result<u64> {
        match self.data.lock().get(key) {
            None => Ok(0),
            Some(Entry::List(list)) => Ok(list.len() as u64),
            Some(_) => Err(wrong_type()),
        }
    }

    async fn add_to_set(&self, key: &str, member: &str) -> Result<bool> {
        let mut data = self.data.lock();
        match data
            .entry(key.to_string())
            .or_insert_with(|| Entry::Set(BTreeSet::new()))
        {
            Entry::Set(set) => Ok(set.insert(member.to_string())),
            _ => Err(wrong_type()),
        }
    }

    async fn remove_from_set(&self, key: &str, member: &str) -> Result<bool> {
        let mut data = self.data.lock();
        let (removed, now_empty) = match data.get_mut(key) {
            None => return Ok(false),
            Some(Entry::Set(set)) => {
                let removed = set.remove(member);
                (removed, set.is_empty())
            }
            Some(_) => return Err(wrong_type()),
        };

        if now_empty {
            data.remove(key);
        }
        Ok(removed)
    }

    async fn list_set(&self, key: &str) -> Result<Vec<String>> {
        match self.data.lock().get(key) {
            None => Ok(Vec::new()),
            Some(Entry::Set(set)) => Ok(set.iter().cloned().collect()),
            Some(_) => Err(wrong_type()),
        }
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        match self.data.lock().get(key) {
            None => Ok(None),
            Some(Entry::Scalar(value)) => Ok(Some(value.clone())),
            Some(_) => Err(wrong_type()),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.data.lock().insert(key.to_string(), Entry::Scalar(value));
        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        let mut data = self.data.lock();
        let entry = data
            .entry(key.to_string())
            .or_insert_with(|| Entry::Scalar("0".to_string()));

        match entry {
            Entry::Scalar(value) => {
                let next = value
                    .parse::<i64>()
                    .map_err(|_| {
                        Error::Redis(RedisError::new(
                            RedisErrorKind::InvalidArgument,
                            "ERR value is not an integer or out of range",
                        ))
                    })?
                    + 1;
                *value = next.to_string();
                Ok(next)
            }
            _ => Err(wrong_type()),
        }
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.data.lock().remove(key).is_some())
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self
            .data
            .lock()
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn flush_all(&self) -> Result<()> {
        self.data.lock().clear();
        Ok(())
    }

    fn servers(&self) -> Vec<String> {
        vec!["memory".to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_is_fifo_and_disappears_when_drained() {
        let store = MemoryStore::new();
        store.push("q", "a".into()).await.unwrap();
        store.push("q", "b".into()).await.unwrap();

        assert_eq!(store.length("q").await.unwrap(), 2);
        assert_eq!(store.pop_head("q").await.unwrap(), Some("a".into()));
        assert_eq!(store.pop_head("q").await.unwrap(), Some("b".into()));
        assert_eq!(store.pop_head("q").await.unwrap(), None);
        assert!(store.keys("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_range_follows_lrange_rules() {
        let store = MemoryStore::new();
        for v in ["a", "b", "c"] {
            store.push("q", v.into()).await.unwrap();
        }

        assert_eq!(store.range("q", 0, -1).await.unwrap(), vec!["a", "b", "c"]);
        assert_eq!(store.range("q", 1, 1).await.unwrap(), vec!["b"]);
        assert_eq!(store.range("q", 1, 10).await.unwrap(), vec!["b", "c"]);
        assert_eq!(store.range("q", -2, -1).await.unwrap(), vec!["b", "c"]);
        assert!(store.range("q", 3, 4).await.unwrap().is_empty());
        assert!(store.range("q", 2, 1).await.unwrap().is_empty());
        assert!(store.range("missing", 0, -1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sets_are_sorted_and_idempotent() {
        let store = MemoryStore::new();
        assert!(store.add_to_set("s", "people").await.unwrap());
        assert!(store.add_to_set("s", "cars").await.unwrap());
        assert!(!store.add_to_set("s", "cars").await.unwrap());

        assert_eq!(store.list_set("s").await.unwrap(), vec!["cars", "people"]);

        assert!(store.remove_from_set("s", "cars").await.unwrap());
        assert!(!store.remove_from_set("s", "cars").await.unwrap());
        assert!(store.remove_from_set("s", "people").await.unwrap());
        assert!(store.list_set("s").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_counters_and_scalars() {
        let store = MemoryStore::new();
        assert_eq!(store.incr("n").await.unwrap(), 1);
        assert_eq!(store.incr("n").await.unwrap(), 2);
        assert_eq!(store.get("n").await.unwrap(), Some("2".into()));

        store.set("s", "text".into()).await.unwrap();
        assert!(store.incr("s").await.is_err());
        assert!(store.push("s", "x".into()).await.is_err());
    }
}
