//! Bounded live feed

use std::collections::VecDeque;

use serde::Serialize;

use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    Info,
    Success,
    Warning,
}

/// One trace line of the live feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanLog {
    pub id: u64,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: LogKind,
}

/// FIFO history capped at a fixed number of entries, oldest first
#[derive(Debug, Clone)]
pub struct LogBuffer {
    entries: VecDeque<ScanLog>,
    capacity: usize,
}

impl LogBuffer {
    /// Create an empty buffer; a zero capacity is a configuration error
    pub fn new(capacity: usize) -> Result<Self, EngineError> {
        if capacity == 0 {
            return Err(EngineError::Configuration(
                "log capacity must be at least 1".into(),
            ));
        }
        Ok(Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /// Drop the oldest entries down to `capacity - 1`, then push `entry`
    pub fn append(&mut self, entry: ScanLog) {
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &ScanLog> {
        self.entries.iter()
    }

    /// Most recent entry, if any
    pub fn latest(&self) -> Option<&ScanLog> {
        self.entries.back()
    }

    pub fn to_vec(&self) -> Vec<ScanLog> {
        self.entries.iter().cloned().collect()
    }
}
