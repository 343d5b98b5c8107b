//! English-to-Japanese translation of article titles and snippets.
//!
//! Candidates are picked by [`classifier`], sent through a [`client::TranslationBackend`]
//! and remembered per link in the translation cache.

pub mod classifier;
pub mod client;
pub mod response;
pub mod translator;

pub use classifier::{is_translation_candidate, Classifier};
pub use client::{ChatCompletionBackend, TranslationBackend};
pub use response::{ResponseParser, TranslatedText};
pub use translator::{TranslationOutcome, TranslationReport, Translator};
