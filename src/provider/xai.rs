use serde_json::{Value, json};

use crate::provider::http::{Auth, WireFormat, chat_completion_text};

const ENDPOINT: &str = "https://api.x.ai/v1/chat/completions";
const MODEL: &str = "grok-3-latest";
const SYSTEM_PROMPT: &str =
    "Sen Borsa İstanbul hisseleri için teknik analiz yapan bir uzmansın. Yanıtını Türkçe ver.";

/// xAI Grok chat completions.
pub struct Xai;

impl WireFormat for Xai {
    fn name(&self) -> &'static str {
        "xai"
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
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt },
            ],
            "temperature": 0.1,
            "stream": false,
        })
    }

    fn decode(&self, body: &str) -> Option<String> {
        chat_completion_text(body)
    }
}
