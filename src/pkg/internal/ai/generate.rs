use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{
    conf::settings,
    prelude::{Error, Result},
};

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Client for the configured OpenAI-compatible chat endpoint (ollama,
/// openai or gemini, see `conf::Settings`). All generation in the service
/// goes through `direct_query`.
#[derive(Debug, Clone)]
pub struct AiClient {
    http: Client,
}

impl AiClient {
    pub fn new() -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;
        Ok(AiClient { http })
    }

    pub async fn direct_query(&self, query: &str, context: Option<&str>) -> Result<String> {
        let prompt = format!(
            "Context:\n{}\n\nQuestion: {}\n\nAnswer based on the context above:",
            context.unwrap_or(""),
            query
        );
        let request = ChatRequest {
            model: &settings.ai_model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
        };
        let response = self
            .http
            .post(format!("{}/chat/completions", &settings.ai_endpoint))
            .bearer_auth(&settings.ai_key)
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Ai(format!(
                "chat completion returned {status}: {body}"
            )));
        }
        let completion: ChatResponse = response.json().await?;
        let answer = completion
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| Error::Ai("empty completion".into()))?;
        Ok(answer)
    }
}
