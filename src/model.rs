use crate::error::{Error, Result};

/// Parses an `entryId` path value. Only plain decimal digits with a value of
/// at least 1 are accepted, so `0`, `-1`, `+1`, `1.5` and `" 1"` are rejected.
pub fn parse_entry_id(raw: &str) -> Result<i64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidEntryId);
    }

    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(Error::InvalidEntryId),
    }
}

pub mod db {
    use sqlx::FromRow;

    #[derive(Debug, Clone, PartialEq, FromRow)]
    pub struct Entry {
        pub entry_id: i64,
        pub title: String,
        pub notes: String,
        pub photo_url: String,
    }

    /// A validated set of fields, ready to be written.
    #[derive(Debug, Clone, PartialEq)]
    pub struct NewEntry {
        pub title: String,
        pub notes: String,
        pub photo_url: String,
    }
}

pub mod http {
    use serde::{Deserialize, Serialize};

    use crate::error::{Error, Result};

    /// Body of a create or update request. Fields stay optional here so that a
    /// missing field is reported as a validation error instead of a decode error.
    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct EntryRequest {
        pub title: Option<String>,
        pub notes: Option<String>,
        pub photo_url: Option<String>,
    }

    impl EntryRequest {
        pub fn validate(self) -> Result<super::db::NewEntry> {
            match (
                non_empty(self.title),
                non_empty(self.notes),
                non_empty(self.photo_url),
            ) {
                (Some(title), Some(notes), Some(photo_url)) => Ok(super::db::NewEntry {
                    title,
                    notes,
                    photo_url,
                }),
                _ => Err(Error::MissingFields),
            }
        }
    }

    fn non_empty(field: Option<String>) -> Option<String> {
        field.filter(|s| !s.is_empty())
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Entry {
        pub entry_id: i64,
        pub title: String,
        pub notes: String,
        pub photo_url: String,
    }

    impl From<super::db::Entry> for Entry {
        fn from(entry: super::db::Entry) -> Self {
            Entry {
                entry_id: entry.entry_id,
                title: entry.title,
                notes: entry.notes,
                photo_url: entry.photo_url,
            }
        }
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ErrorResponse {
        pub error: String,
    }
}
