use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::types::{ParsedFields, ResponseParser, PARSE_ERROR};

pub const NO_TEXT_IN_RESPONSE: &str = "Error: Could not extract text from response";
pub const MALFORMED_RESPONSE: &str = "Error: Failed parsing response structure";

// Each value starts at the first non-blank after its label (possibly on the
// next line) and runs to the next label or the end of that line.
static MEDICATION_RE: LazyLock<Regex> = LazyLock::new(|| field_pattern("Medication"));
static DOSAGE_RE: LazyLock<Regex> = LazyLock::new(|| field_pattern("Dosage"));
static FREQUENCY_RE: LazyLock<Regex> = LazyLock::new(|| field_pattern("Frequency"));

fn field_pattern(label: &str) -> Regex {
    Regex::new(&format!(
        r"(?im)\b{label}:\**\s*([^\r\n]*?)[ \t]*(?:\**\b(?:Medication|Dosage|Frequency):|\r?$)"
    ))
    .unwrap()
}

/// Parser for the `Medication: X, Dosage: Y, Frequency: Z` reply format
/// requested by the drafting prompt, reading Gemini's response envelope.
#[derive(Debug, Default, Clone, Copy)]
pub struct LabelledFieldParser;

impl ResponseParser for LabelledFieldParser {
    fn extract_text(&self, raw: &str) -> String {
        let value: Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(error = %e, "LLM response is not valid JSON");
                return MALFORMED_RESPONSE.to_string();
            }
        };
        if !value.is_object() {
            tracing::error!("LLM response is not a JSON object");
            return MALFORMED_RESPONSE.to_string();
        }

        match value
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
        {
            Some(text) => text.to_string(),
            None => {
                tracing::warn!("No text at candidates[0].content.parts[0] in LLM response");
                NO_TEXT_IN_RESPONSE.to_string()
            }
        }
    }

    fn parse_fields(&self, text: &str) -> ParsedFields {
        ParsedFields {
            medication: capture(&MEDICATION_RE, text),
            dosage: capture(&DOSAGE_RE, text),
            frequency: capture(&FREQUENCY_RE, text),
        }
    }
}

fn capture(re: &Regex, text: &str) -> String {
    let Some(value) = re
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
    else {
        return PARSE_ERROR.to_string();
    };

    let trimmed = value.trim();
    let cleaned = trimmed
        .strip_suffix([',', '.'])
        .unwrap_or(trimmed)
        .trim();
    if cleaned.is_empty() {
        PARSE_ERROR.to_string()
    } else {
        cleaned.to_string()
    }
}
