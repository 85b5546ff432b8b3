use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::sync::Arc;

/// Entries per shared chunk.
const CHUNK_LEN: usize = 256;

/// Append-only buffer; the only removal is clearing everything.
///
/// Entries live in fixed-size chunks behind `Arc`. Cloning a log copies one
/// pointer per chunk, and appending to a clone copies at most the last chunk,
/// so snapshots of a long terminal stay cheap.
#[derive(Debug, Clone)]
pub struct AppendLog<T> {
    chunks: Vec<Arc<Vec<T>>>,
    len: usize,
}

impl<T> Default for AppendLog<T> {
    fn default() -> Self {
        Self {
            chunks: Vec::new(),
            len: 0,
        }
    }
}

impl<T> AppendLog<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn last(&self) -> Option<&T> {
        self.chunks.last().and_then(|chunk| chunk.last())
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.chunks.iter().flat_map(|chunk| chunk.iter())
    }

    /// Entries appended after the first `offset` ones.
    pub fn since(&self, offset: usize) -> impl Iterator<Item = &T> + '_ {
        // every chunk but the last is full
        let chunks = self.chunks.get(offset / CHUNK_LEN..).unwrap_or(&[]);
        chunks
            .iter()
            .flat_map(|chunk| chunk.iter())
            .skip(offset % CHUNK_LEN)
    }
}

impl<T: Clone> AppendLog<T> {
    pub fn append(&mut self, entry: T) {
        if self.chunks.last().map_or(true, |chunk| chunk.len() >= CHUNK_LEN) {
            self.chunks.push(Arc::new(Vec::with_capacity(CHUNK_LEN)));
        }
        if let Some(chunk) = self.chunks.last_mut() {
            Arc::make_mut(chunk).push(entry);
            self.len += 1;
        }
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = T>) {
        for entry in entries {
            self.append(entry);
        }
    }
}

impl<T> From<Vec<T>> for AppendLog<T> {
    fn from(entries: Vec<T>) -> Self {
        let len = entries.len();
        let mut chunks = Vec::with_capacity(len.div_ceil(CHUNK_LEN));
        let mut rest = entries.into_iter().peekable();
        while rest.peek().is_some() {
            chunks.push(Arc::new(rest.by_ref().take(CHUNK_LEN).collect()));
        }
        Self { chunks, len }
    }
}

impl<T: PartialEq> PartialEq for AppendLog<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for AppendLog<T> {}

impl<T: Serialize> Serialize for AppendLog<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for AppendLog<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<T>::deserialize(deserializer).map(Self::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_clear() {
        let mut log = AppendLog::new();
        log.append("a");
        log.extend(["b", "c"]);
        assert_eq!(log.len(), 3);
        assert_eq!(log.last(), Some(&"c"));
        assert_eq!(log.since(1).copied().collect::<Vec<_>>(), vec!["b", "c"]);
        assert_eq!(log.since(10).count(), 0);
        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.last(), None);
    }

    #[test]
    fn test_since_across_chunks() {
        let log = AppendLog::from((0..CHUNK_LEN * 2 + 5).collect::<Vec<_>>());
        assert_eq!(log.len(), CHUNK_LEN * 2 + 5);
        let tail: Vec<_> = log.since(CHUNK_LEN + 3).copied().collect();
        assert_eq!(tail.len(), CHUNK_LEN + 2);
        assert_eq!(tail[0], CHUNK_LEN + 3);
        assert_eq!(log.last(), Some(&(CHUNK_LEN * 2 + 4)));
    }

    #[test]
    fn test_clone_shares_full_chunks() {
        let mut log = AppendLog::from((0..CHUNK_LEN + 1).collect::<Vec<_>>());
        let snapshot = log.clone();
        log.append(99);

        assert!(Arc::ptr_eq(&log.chunks[0], &snapshot.chunks[0]));
        assert!(!Arc::ptr_eq(&log.chunks[1], &snapshot.chunks[1]));
        assert_eq!(snapshot.len(), CHUNK_LEN + 1);
        assert_eq!(log.last(), Some(&99));
    }

    #[test]
    fn test_serializes_as_flat_array() {
        let mut log = AppendLog::new();
        log.extend(["x".to_string(), "y".to_string()]);
        let json = serde_json::to_string(&log).unwrap();
        assert_eq!(json, r#"["x","y"]"#);

        let back: AppendLog<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, log);
    }
}
