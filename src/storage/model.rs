use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::time::timestamp_millis;

/// Opaque identifier assigned by a store when a document is inserted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(String);

impl RecordId {
    pub fn generate() -> Self {
        Self(nanoid::nanoid!())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for RecordId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored item together with the id its store assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document<T> {
    pub id: RecordId,
    pub body: T,
}

/// A unit of work submitted upstream.
///
/// Ownership moves into the store on insert; what happens to it afterwards is
/// up to the processing stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputRecord {
    pub text: String,
    pub title: Option<String>,
    pub author: Option<String>,
    /// Lets a processing stage echo which submission a result belongs to
    pub correlation_id: Option<String>,
    /// Position inside the submitted batch, 1-based
    pub sequence: Option<u32>,
    pub submitted_at_ms: u64,
}

impl InputRecord {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            title: None,
            author: None,
            correlation_id: None,
            sequence: None,
            submitted_at_ms: timestamp_millis(),
        }
    }

    pub fn with_title(
        mut self,
        title: impl Into<String>,
    ) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_author(
        mut self,
        author: impl Into<String>,
    ) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_correlation_id(
        mut self,
        correlation_id: impl Into<String>,
    ) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    pub fn with_sequence(
        mut self,
        sequence: u32,
    ) -> Self {
        self.sequence = Some(sequence);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sentiment {
    Positive,
    Negative,
    Unknown,
}

impl fmt::Display for Sentiment {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let s = match self {
            Sentiment::Positive => "POSITIVE",
            Sentiment::Negative => "NEGATIVE",
            Sentiment::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// A unit of completed work written by the processing stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Input document this result classifies
    pub source_id: RecordId,
    pub label: Sentiment,
    /// Always within `[0, 1]`
    pub confidence: f64,
    pub processed_at_ms: u64,
    pub model_version: String,
    pub text: String,
    pub title: Option<String>,
    pub author: Option<String>,
    pub correlation_id: Option<String>,
}

impl ResultRecord {
    pub fn new(
        source: &Document<InputRecord>,
        label: Sentiment,
        confidence: f64,
        model_version: impl Into<String>,
    ) -> Self {
        Self {
            source_id: source.id.clone(),
            label,
            confidence: clamp_confidence(confidence),
            processed_at_ms: timestamp_millis(),
            model_version: model_version.into(),
            text: source.body.text.clone(),
            title: source.body.title.clone(),
            author: source.body.author.clone(),
            correlation_id: source.body.correlation_id.clone(),
        }
    }
}

fn clamp_confidence(c: f64) -> f64 {
    if c.is_nan() {
        0.0
    } else {
        c.clamp(0.0, 1.0)
    }
}

/// An input waiting in the ingest queue, with its position in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedInput {
    pub seq: u64,
    pub doc: Document<InputRecord>,
}
