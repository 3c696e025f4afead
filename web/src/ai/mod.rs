//! AI exegesis: provider selection, prompt templates and the chat
//! completion calls.
use serde::{Deserialize, Serialize};

pub use self::provider::{AiConfig, Exegete, Provider};

/// How much of a verse the reader selected for analysis.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisLevel {
    Word,
    Phrase,
    Verse,
}

impl AnalysisLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisLevel::Word => "word",
            AnalysisLevel::Phrase => "phrase",
            AnalysisLevel::Verse => "verse",
        }
    }
}

/// Who said a chat message.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message of a chat completion conversation.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Message {
            role,
            content: content.into(),
        }
    }
}

pub mod prompt;
mod provider;
