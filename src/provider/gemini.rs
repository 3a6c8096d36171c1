use serde::Deserialize;
use serde_json::{Value, json};

use crate::provider::http::{Auth, WireFormat};

const ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";
const TEMPERATURE: f64 = 0.1;
const MAX_OUTPUT_TOKENS: u32 = 850;

/// Google Gemini `generateContent`, keyed through the `key` query parameter.
pub struct Gemini;

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl WireFormat for Gemini {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn endpoint(&self) -> &str {
        ENDPOINT
    }

    fn auth(&self) -> Auth {
        Auth::QueryParam("key")
    }

    fn encode(&self, prompt: &str) -> Value {
        json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": TEMPERATURE,
                "maxOutputTokens": MAX_OUTPUT_TOKENS,
            },
        })
    }

    /// `candidates[0].content.parts[0].text`
    fn decode(&self, body: &str) -> Option<String> {
        let response: GenerateContentResponse = serde_json::from_str(body).ok()?;
        let candidate = response.candidates.into_iter().next()?;
        candidate.content.parts.into_iter().next()?.text
    }
}
