use crate::genai::GenAiClient;
use crate::prompts::{
    compose_flirty_texts, compose_future_us, compose_love_letter, FlirtyRequest, FutureRequest,
    LetterRequest,
};

/// The quick tools never fail the flow: a generation error is returned as
/// the output text itself and shown to the user in place of a result.
async fn generate_or_error(client: &dyn GenAiClient, what: &str, prompt: &str) -> String {
    match client.generate_text(prompt).await {
        Ok(text) => text,
        Err(e) => {
            log::warn!("Error generating {}: {:#}", what, e);
            format!("Error: {}. Please check your API key and try again.", e)
        }
    }
}

pub async fn write_love_letter(client: &dyn GenAiClient, req: &LetterRequest) -> String {
    generate_or_error(client, "love letter", &compose_love_letter(req)).await
}

pub async fn write_flirty_texts(client: &dyn GenAiClient, req: &FlirtyRequest) -> String {
    generate_or_error(client, "flirty texts", &compose_flirty_texts(req)).await
}

pub async fn write_future_us(client: &dyn GenAiClient, req: &FutureRequest) -> String {
    generate_or_error(client, "future scenario", &compose_future_us(req)).await
}
