//! Book model and request/response payloads

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Number;
use utoipa::{IntoParams, ToSchema};

/// Length of generated book identifiers
pub const ID_LENGTH: usize = 16;

/// Alphabet used for generated book identifiers (URL-safe)
const ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Full book record as stored and returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Generated identifier, immutable
    pub id: String,
    pub name: String,
    /// Any JSON number, echoed back as given
    #[schema(value_type = Option<f64>)]
    pub year: Option<Number>,
    pub author: Option<String>,
    pub summary: Option<String>,
    pub publisher: Option<String>,
    pub page_count: u32,
    pub read_page: u32,
    /// True when every page has been read
    pub finished: bool,
    pub reading: bool,
    #[serde(with = "iso_millis")]
    pub inserted_at: DateTime<Utc>,
    #[serde(with = "iso_millis")]
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Build a new record from a validated payload
    pub fn new(id: String, data: &BookPayload, now: DateTime<Utc>) -> Self {
        let mut book = Self {
            id,
            name: String::new(),
            year: None,
            author: None,
            summary: None,
            publisher: None,
            page_count: 0,
            read_page: 0,
            finished: false,
            reading: false,
            inserted_at: now,
            updated_at: now,
        };
        book.apply(data, now);
        book
    }

    /// Overwrite every mutable field from the payload.
    /// `id` and `inserted_at` are left untouched.
    pub fn apply(&mut self, data: &BookPayload, now: DateTime<Utc>) {
        self.name = data.name.clone().unwrap_or_default();
        self.year = data.year.clone();
        self.author = data.author.clone();
        self.summary = data.summary.clone();
        self.publisher = data.publisher.clone();
        self.page_count = data.page_count();
        self.read_page = data.read_page();
        self.finished = self.read_page == self.page_count;
        self.reading = data.reading.unwrap_or(false);
        self.updated_at = now;
    }
}

/// Short representation used in listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookSummary {
    pub id: String,
    pub name: String,
    pub publisher: Option<String>,
}

impl From<&Book> for BookSummary {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id.clone(),
            name: book.name.clone(),
            publisher: book.publisher.clone(),
        }
    }
}

/// Create / update book request
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookPayload {
    pub name: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub year: Option<Number>,
    pub author: Option<String>,
    pub summary: Option<String>,
    pub publisher: Option<String>,
    pub page_count: Option<u32>,
    pub read_page: Option<u32>,
    pub reading: Option<bool>,
}

impl BookPayload {
    pub fn page_count(&self) -> u32 {
        self.page_count.unwrap_or(0)
    }

    pub fn read_page(&self) -> u32 {
        self.read_page.unwrap_or(0)
    }

    /// Name if present and not blank
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.trim().is_empty())
    }
}

/// Query parameters for listing books.
///
/// Every occurrence of a key is kept, so repeated keys never fail the
/// request. Flags are raw strings: only a single "0" or "1" selects a
/// filter, anything else is ignored.
#[derive(Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Exact book name
    #[param(value_type = Option<String>)]
    pub name: Vec<String>,
    /// 1 = currently reading, 0 = not reading
    #[param(value_type = Option<String>)]
    pub reading: Vec<String>,
    /// 1 = finished, 0 = unfinished
    #[param(value_type = Option<String>)]
    pub finished: Vec<String>,
}

/// Filter selected from a [`BookQuery`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookFilter {
    Name(String),
    Reading(bool),
    Finished(bool),
    /// Several names were given; a book has only one
    NoMatch,
    All,
}

impl BookQuery {
    /// Collect the known keys from decoded query pairs, ignoring others
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "name" => query.name.push(value),
                "reading" => query.reading.push(value),
                "finished" => query.finished.push(value),
                _ => {}
            }
        }
        query
    }

    /// Pick the single filter to apply. Name wins over reading, reading
    /// over finished; the filters are never combined.
    pub fn filter(&self) -> BookFilter {
        match self.name.as_slice() {
            [] => {}
            [name] => return BookFilter::Name(name.clone()),
            _ => return BookFilter::NoMatch,
        }
        if let Some(reading) = single_flag(&self.reading) {
            return BookFilter::Reading(reading);
        }
        if let Some(finished) = single_flag(&self.finished) {
            return BookFilter::Finished(finished);
        }
        BookFilter::All
    }
}

impl BookFilter {
    pub fn matches(&self, book: &Book) -> bool {
        match self {
            BookFilter::Name(name) => book.name == *name,
            BookFilter::Reading(reading) => book.reading == *reading,
            BookFilter::Finished(finished) => book.finished == *finished,
            BookFilter::NoMatch => false,
            BookFilter::All => true,
        }
    }
}

fn single_flag(values: &[String]) -> Option<bool> {
    match values {
        [value] if value == "1" => Some(true),
        [value] if value == "0" => Some(false),
        _ => None,
    }
}

/// Generate a random identifier of [`ID_LENGTH`] characters
pub fn generate_book_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LENGTH)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

/// ISO-8601 timestamps with millisecond precision, e.g. `2024-01-02T03:04:05.678Z`
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
