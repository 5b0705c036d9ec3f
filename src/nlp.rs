//! Placeholder NLP engine — keyword matching for intent and sentiment.
//!
//! There is no model behind this. Intents and sentiment are assigned by
//! case-insensitive substring matching, so short keywords match inside
//! longer words (`"hi"` matches `"this"`). Confidence is a fixed constant.

use std::fmt;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::Config;

/// Confidence reported for every classification.
pub const FIXED_CONFIDENCE: f32 = 0.85;

const GREETING_WORDS: &[&str] = &["hello", "hi", "hey"];
const FAREWELL_WORDS: &[&str] = &["bye", "goodbye", "see you"];
const HELP_WORDS: &[&str] = &["help", "assist", "support"];

const POSITIVE_WORDS: &[&str] = &["good", "great", "excellent", "happy", "love"];
const NEGATIVE_WORDS: &[&str] = &["bad", "terrible", "awful", "sad", "hate"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    Farewell,
    HelpRequest,
    Question,
    Statement,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Greeting => "greeting",
            Intent::Farewell => "farewell",
            Intent::HelpRequest => "help_request",
            Intent::Question => "question",
            Intent::Statement => "statement",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named entities by category. Always empty until a real extractor exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Entities {
    pub persons: Vec<String>,
    pub organizations: Vec<String>,
    pub locations: Vec<String>,
    pub dates: Vec<String>,
    pub custom: Vec<String>,
}

impl Entities {
    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
            && self.organizations.is_empty()
            && self.locations.is_empty()
            && self.dates.is_empty()
            && self.custom.is_empty()
    }
}

/// Output of [`NlpEngine::process`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NlpResult {
    pub intent: Intent,
    pub entities: Entities,
    pub sentiment: Sentiment,
    /// ISO 639-1 code.
    pub language: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, Default)]
pub struct NlpEngine;

impl NlpEngine {
    pub fn new(_config: &Config) -> Self {
        info!("nlp engine initialised");
        Self
    }

    /// Run the whole pipeline over `text`.
    pub fn process(&self, text: &str) -> NlpResult {
        let result = NlpResult {
            intent: detect_intent(text),
            entities: Entities::default(),
            sentiment: analyze_sentiment(text),
            language: "en".to_string(),
            confidence: FIXED_CONFIDENCE,
        };
        debug!(intent = %result.intent, sentiment = %result.sentiment, "text classified");
        result
    }
}

/// First matching rule wins: greeting, farewell, help, `?`, else statement.
pub fn detect_intent(text: &str) -> Intent {
    let lower = text.to_lowercase();
    let has_any = |words: &[&str]| words.iter().any(|w| lower.contains(w));

    if has_any(GREETING_WORDS) {
        Intent::Greeting
    } else if has_any(FAREWELL_WORDS) {
        Intent::Farewell
    } else if has_any(HELP_WORDS) {
        Intent::HelpRequest
    } else if text.contains('?') {
        Intent::Question
    } else {
        Intent::Statement
    }
}

/// Counts distinct positive vs negative keywords present in `text`.
pub fn analyze_sentiment(text: &str) -> Sentiment {
    let lower = text.to_lowercase();
    let count = |words: &[&str]| words.iter().filter(|w| lower.contains(*w)).count();

    let pos = count(POSITIVE_WORDS);
    let neg = count(NEGATIVE_WORDS);

    match pos.cmp(&neg) {
        std::cmp::Ordering::Greater => Sentiment::Positive,
        std::cmp::Ordering::Less => Sentiment::Negative,
        std::cmp::Ordering::Equal => Sentiment::Neutral,
    }
}
