//! Ordered cache of the sessions known to the metadata store

use tracing::{debug, warn};

use crate::remote::SessionRecord;

/// Sessions in server order (creation order as observed so far)
#[derive(Debug, Clone, Default)]
pub struct SessionDirectory {
    records: Vec<SessionRecord>,
}

impl SessionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole directory with a fresh listing. Duplicate ids keep
    /// their first occurrence.
    pub fn replace(&mut self, records: Vec<SessionRecord>) {
        let mut unique: Vec<SessionRecord> = Vec::with_capacity(records.len());
        for record in records {
            if unique.iter().any(|r| r.id == record.id) {
                warn!("Duplicate session id {} in listing, ignoring", record.id);
                continue;
            }
            unique.push(record);
        }
        self.records = unique;
    }

    /// Append a newly created record; an id already present only updates the name
    pub fn append(&mut self, record: SessionRecord) {
        match self.records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => {
                debug!("Session {} already listed, refreshing name", record.id);
                existing.name = record.name;
            }
            None => self.records.push(record),
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<SessionRecord> {
        let index = self.position(id)?;
        Some(self.records.remove(index))
    }

    /// Update the display name; returns false for unknown ids
    pub fn rename(&mut self, id: &str, name: impl Into<String>) -> bool {
        match self.records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.name = name.into();
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: &str) -> Option<&SessionRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }

    pub fn records(&self) -> &[SessionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Successor of `current` with wrap-around. With no current session the
    /// first record is returned.
    pub fn next_after(&self, current: Option<&str>) -> Option<&SessionRecord> {
        if self.records.is_empty() {
            return None;
        }
        let index = match current.and_then(|id| self.position(id)) {
            Some(index) => (index + 1) % self.records.len(),
            None => 0,
        };
        self.records.get(index)
    }

    /// Predecessor of `current` with wrap-around. With no current session the
    /// last record is returned.
    pub fn previous_before(&self, current: Option<&str>) -> Option<&SessionRecord> {
        if self.records.is_empty() {
            return None;
        }
        let len = self.records.len();
        let index = match current.and_then(|id| self.position(id)) {
            Some(index) => (index + len - 1) % len,
            None => len - 1,
        };
        self.records.get(index)
    }
}
