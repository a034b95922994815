//! Job form: the editable list of job slots composed before submission.
//!
//! URL imports run per entry. Each entry tracks its own fetching/error flags,
//! and a fetch that lands after its entry was re-fetched, removed or cleared is dropped.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::models::analysis::FetchedJob;
use crate::submission::assembler::{is_valid_description, RawEntry};

pub const MAX_ENTRIES: usize = 10;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    #[error("At most {MAX_ENTRIES} jobs can be compared at once")]
    TooManyEntries,

    #[error("At least one job entry is required")]
    LastEntry,

    #[error("Job entry {0} not found")]
    UnknownEntry(u32),

    #[error("Enter a job posting URL")]
    BlankUrl,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FormEntry {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub fetching: bool,
    pub fetch_error: Option<String>,
    #[serde(skip)]
    fetch_token: Option<u64>,
}

impl FormEntry {
    fn empty(id: u32) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
}

/// Identifies one in-flight URL import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub entry_id: u32,
    token: u64,
}

#[derive(Debug, Clone)]
pub struct JobForm {
    entries: Vec<FormEntry>,
    fetch_counter: u64,
}

impl Default for JobForm {
    fn default() -> Self {
        Self {
            entries: vec![FormEntry::empty(1)],
            fetch_counter: 0,
        }
    }
}

impl JobForm {
    pub fn entries(&self) -> &[FormEntry] {
        &self.entries
    }

    fn entry_mut(&mut self, id: u32) -> Result<&mut FormEntry, FormError> {
        self.entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(FormError::UnknownEntry(id))
    }

    pub fn add(&mut self) -> Result<&FormEntry, FormError> {
        if self.entries.len() >= MAX_ENTRIES {
            return Err(FormError::TooManyEntries);
        }
        let id = self.entries.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        self.entries.push(FormEntry::empty(id));
        Ok(&self.entries[self.entries.len() - 1])
    }

    pub fn remove(&mut self, id: u32) -> Result<(), FormError> {
        if !self.entries.iter().any(|e| e.id == id) {
            return Err(FormError::UnknownEntry(id));
        }
        if self.entries.len() == 1 {
            return Err(FormError::LastEntry);
        }
        self.entries.retain(|e| e.id != id);
        Ok(())
    }

    pub fn update(
        &mut self,
        id: u32,
        title: Option<String>,
        description: Option<String>,
    ) -> Result<&FormEntry, FormError> {
        let entry = self.entry_mut(id)?;
        if let Some(title) = title {
            entry.title = title;
        }
        if let Some(description) = description {
            entry.description = description;
        }
        Ok(entry)
    }

    /// Back to a single empty entry. Pending imports become stale.
    pub fn clear(&mut self) {
        self.entries = vec![FormEntry::empty(1)];
    }

    pub fn raw_entries(&self) -> Vec<RawEntry> {
        self.entries
            .iter()
            .map(|e| RawEntry {
                title: Some(e.title.clone()),
                description: e.description.clone(),
            })
            .collect()
    }

    pub fn valid_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| is_valid_description(&e.description))
            .count()
    }

    pub fn submit_label(&self) -> String {
        match self.valid_count() {
            1 => "Analyze Job".to_string(),
            n => format!("Analyze {n} Jobs"),
        }
    }

    /// Marks an entry as fetching and hands out the ticket its response must present.
    pub fn begin_fetch(&mut self, id: u32, url: &str) -> Result<FetchTicket, FormError> {
        if url.trim().is_empty() {
            return Err(FormError::BlankUrl);
        }
        self.fetch_counter += 1;
        let token = self.fetch_counter;

        let entry = self.entry_mut(id)?;
        entry.fetching = true;
        entry.fetch_error = None;
        entry.fetch_token = Some(token);

        Ok(FetchTicket {
            entry_id: id,
            token,
        })
    }

    /// Returns `false` when the ticket no longer matches its entry.
    pub fn finish_fetch(&mut self, ticket: FetchTicket, response: Result<FetchedJob, String>) -> bool {
        let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| e.id == ticket.entry_id && e.fetch_token == Some(ticket.token))
        else {
            debug!("Dropping stale fetch for entry {}", ticket.entry_id);
            return false;
        };

        entry.fetching = false;
        entry.fetch_token = None;
        match response {
            Ok(job) => {
                entry.title = job.title;
                entry.description = job.description;
                entry.fetch_error = None;
            }
            Err(message) => entry.fetch_error = Some(message),
        }
        true
    }
}

/// Form state as sent to the renderer.
#[derive(Debug, Clone, Serialize)]
pub struct FormView {
    pub entries: Vec<FormEntryView>,
    pub valid_count: usize,
    pub submit_label: String,
    pub can_add: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormEntryView {
    #[serde(flatten)]
    pub entry: FormEntry,
    pub character_count: usize,
    pub meets_minimum: bool,
}

impl From<&JobForm> for FormView {
    fn from(form: &JobForm) -> Self {
        Self {
            entries: form
                .entries()
                .iter()
                .map(|e| FormEntryView {
                    character_count: e.description.chars().count(),
                    meets_minimum: is_valid_description(&e.description),
                    entry: e.clone(),
                })
                .collect(),
            valid_count: form.valid_count(),
            submit_label: form.submit_label(),
            can_add: form.entries().len() < MAX_ENTRIES,
        }
    }
}
