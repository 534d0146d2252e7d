//! The create/edit form for a single entry.
//!
//! The form either edits an existing entry, which has to be loaded first, or
//! creates a new one. Saving and deleting report where the user should go next
//! through [`Navigation`]. A failed save or delete keeps the user on the form
//! and records the reason instead of leaving silently.

use log::{debug, warn};

use crate::client::EntryApi;
use crate::error::{Error, Result};
use crate::model::http::{Entry, EntryRequest};

#[derive(Debug, Clone, PartialEq)]
pub enum FormState {
    Loading,
    Loaded,
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Navigation {
    Stay,
    List,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryFields {
    pub title: String,
    pub notes: String,
    pub photo_url: String,
}

impl EntryFields {
    fn is_complete(&self) -> bool {
        !self.title.is_empty() && !self.notes.is_empty() && !self.photo_url.is_empty()
    }
}

impl From<Entry> for EntryFields {
    fn from(entry: Entry) -> Self {
        EntryFields {
            title: entry.title,
            notes: entry.notes,
            photo_url: entry.photo_url,
        }
    }
}

impl From<&EntryFields> for EntryRequest {
    fn from(fields: &EntryFields) -> Self {
        EntryRequest {
            title: Some(fields.title.clone()),
            notes: Some(fields.notes.clone()),
            photo_url: Some(fields.photo_url.clone()),
        }
    }
}

pub struct EntryForm<'a, A: EntryApi> {
    api: &'a A,
    entry_id: Option<i64>,
    fields: EntryFields,
    state: FormState,
    confirming_delete: bool,
    save_error: Option<String>,
}

impl<'a, A: EntryApi> EntryForm<'a, A> {
    /// A blank form for a new entry.
    pub fn new(api: &'a A) -> Self {
        EntryForm {
            api,
            entry_id: None,
            fields: EntryFields::default(),
            state: FormState::Loaded,
            confirming_delete: false,
            save_error: None,
        }
    }

    /// A form for an existing entry, in the loading state until [`EntryForm::load`] runs.
    pub fn editing(api: &'a A, entry_id: i64) -> Self {
        EntryForm {
            entry_id: Some(entry_id),
            state: FormState::Loading,
            ..EntryForm::new(api)
        }
    }

    pub async fn open(api: &'a A, entry_id: i64) -> Self {
        let mut form = EntryForm::editing(api, entry_id);
        form.load().await;
        form
    }

    pub async fn load(&mut self) {
        let entry_id = match self.entry_id {
            Some(entry_id) => entry_id,
            None => return,
        };

        self.state = FormState::Loading;
        match self.api.get(entry_id).await {
            Ok(entry) => {
                self.fields = EntryFields::from(entry);
                self.state = FormState::Loaded;
            }
            Err(e) => {
                warn!("failed to load entry {}: {}", entry_id, e);
                self.state = FormState::Error(describe(&e));
            }
        }
    }

    pub fn entry_id(&self) -> Option<i64> {
        self.entry_id
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn fields(&self) -> &EntryFields {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut EntryFields {
        &mut self.fields
    }

    pub fn save_error(&self) -> Option<&str> {
        self.save_error.as_deref()
    }

    pub fn is_confirming_delete(&self) -> bool {
        self.confirming_delete
    }

    /// Creates or updates the entry from the current field values.
    pub async fn submit(&mut self) -> Navigation {
        if self.state != FormState::Loaded {
            return Navigation::Stay;
        }

        if !self.fields.is_complete() {
            self.save_error = Some(Error::MissingFields.to_string());
            return Navigation::Stay;
        }

        let request = EntryRequest::from(&self.fields);
        let result = match self.entry_id {
            Some(entry_id) => self.api.update(entry_id, &request).await,
            None => self.api.create(&request).await,
        };

        self.settle(result)
    }

    pub fn request_delete(&mut self) {
        if self.entry_id.is_some() && self.state == FormState::Loaded {
            self.confirming_delete = true;
        }
    }

    pub fn cancel_delete(&mut self) {
        self.confirming_delete = false;
    }

    /// Deletes the entry. Does nothing unless a delete was requested first.
    pub async fn confirm_delete(&mut self) -> Navigation {
        let entry_id = match (self.confirming_delete, self.entry_id) {
            (true, Some(entry_id)) => entry_id,
            _ => return Navigation::Stay,
        };

        self.confirming_delete = false;
        let result = self.api.delete(entry_id).await;
        self.settle(result)
    }

    fn settle(&mut self, result: Result<Entry>) -> Navigation {
        match result {
            Ok(entry) => {
                debug!("entry {} saved", entry.entry_id);
                self.save_error = None;
                Navigation::List
            }
            Err(e) => {
                warn!("request failed: {}", e);
                self.save_error = Some(describe(&e));
                Navigation::Stay
            }
        }
    }
}

fn describe(e: &Error) -> String {
    match e {
        Error::Api { message, .. } => message.clone(),
        e => e.to_string(),
    }
}
