use serde_json::{Value, json};

use crate::provider::http::{Auth, WireFormat, chat_completion_text};

const ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
const MODEL: &str = "llama-3.1-8b-instant";
const MAX_TOKENS: u32 = 500;

/// Groq-hosted Llama, last in line.
pub struct Groq;

impl WireFormat for Groq {
    fn name(&self) -> &'static str {
        "groq"
    }

    fn endpoint(&self) -> &str {
        ENDPOINT
    }

    fn auth(&self) -> Auth {
        Auth::Bearer
    }

    fn encode(&self, prompt: &str) -> Value {
        json!({
            "model": MODEL,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": 0.1,
            "max_tokens": MAX_TOKENS,
        })
    }

    fn decode(&self, body: &str) -> Option<String> {
        chat_completion_text(body)
    }
}
