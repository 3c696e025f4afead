//! AI exegesis of a selection and follow-up chat.
use actix_web::web;
use serde::{Deserialize, Serialize};

use crate::ai::{AnalysisLevel, Exegete, Message};
use crate::controllers::{present, JsonResult};
use crate::error::Error;
use crate::ServerData;

const NOT_CONFIGURED: &str =
    "No AI API key is configured. Set DEEPSEEK_API_KEY, OPENROUTER_API_KEY or GEMINI_API_KEY.";

#[derive(Deserialize, Debug)]
pub struct AnalyzeForm {
    pub text: Option<String>,
    pub level: Option<String>,
    pub context: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AnalyzeResponse {
    pub analysis: String,
}

#[derive(Deserialize, Debug)]
pub struct ChatForm {
    pub messages: Option<Vec<Message>>,
    pub context: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ChatResponse {
    pub reply: String,
}

pub(crate) fn exegete(data: &ServerData) -> Result<Exegete<'_>, Error> {
    data.config
        .ai
        .provider()
        .map(|provider| Exegete::new(&data.http, provider))
        .ok_or_else(|| Error::NotConfigured(NOT_CONFIGURED.to_string()))
}

fn parse_level(level: &str) -> Option<AnalysisLevel> {
    [AnalysisLevel::Word, AnalysisLevel::Phrase, AnalysisLevel::Verse]
        .into_iter()
        .find(|l| l.as_str() == level)
}

/// Explains the selected word, phrase or verse.
pub async fn analyze(
    data: web::Data<ServerData>,
    form: web::Json<AnalyzeForm>,
) -> JsonResult<AnalyzeResponse> {
    let exegete = exegete(&data)?;
    let form = form.into_inner();

    let (text, level) = match (present(&form.text), present(&form.level)) {
        (Some(text), Some(level)) => (text, level),
        _ => return Err(Error::BadRequest("text and level are required".to_string()).into()),
    };
    let level = parse_level(level)
        .ok_or_else(|| Error::BadRequest(format!("'{}' is not an analysis level", level)))?;
    let context = form.context.as_deref().unwrap_or_default();

    let analysis = exegete.analyze(text, level, context).await?;

    Ok(web::Json(AnalyzeResponse { analysis }))
}

/// Continues a conversation about a passage.
pub async fn chat(data: web::Data<ServerData>, form: web::Json<ChatForm>) -> JsonResult<ChatResponse> {
    let exegete = exegete(&data)?;
    let form = form.into_inner();

    let messages = form
        .messages
        .ok_or_else(|| Error::BadRequest("messages are required".to_string()))?;
    let context = form.context.as_deref().unwrap_or_default();

    let reply = exegete.chat(context, &messages).await?;

    Ok(web::Json(ChatResponse { reply }))
}
