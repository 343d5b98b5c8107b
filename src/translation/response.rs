use regex::Regex;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Fields the model is asked to return. Either may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TranslatedText {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl TranslatedText {
    /// Resolve against the original text; missing or empty fields keep the original.
    pub fn or_original(self, title: &str, content: &str) -> (String, String) {
        let title = self.title.filter(|t| !t.is_empty()).unwrap_or_else(|| title.to_string());
        let content = self.content.filter(|c| !c.is_empty()).unwrap_or_else(|| content.to_string());
        (title, content)
    }
}

/// Turns a free-form model reply into [`TranslatedText`].
#[derive(Debug, Clone)]
pub struct ResponseParser {
    opening_fence: Regex,
    closing_fence: Regex,
}

impl ResponseParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            opening_fence: Regex::new(r"(?i)^```(?:json)?\s*\n?").map_err(|e| Error::Translation(e.to_string()))?,
            closing_fence: Regex::new(r"\n?```\s*$").map_err(|e| Error::Translation(e.to_string()))?,
        })
    }

    /// Remove a Markdown code fence wrapped around the whole reply.
    pub fn strip_code_fence(&self, text: &str) -> String {
        let text = self.opening_fence.replace(text, "");
        self.closing_fence.replace(&text, "").trim().to_string()
    }

    pub fn parse(&self, reply: &str) -> Result<TranslatedText> {
        let stripped = self.strip_code_fence(reply);
        let object = extract_json_object(&stripped)
            .ok_or_else(|| Error::Translation("No JSON object found in response".to_string()))?;

        serde_json::from_str(object)
            .map_err(|e| Error::Translation(format!("Malformed JSON in response: {}", e)))
    }
}

/// First balanced `{ ... }` in `text`. Braces inside JSON strings are ignored.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}
