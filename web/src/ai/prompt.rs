//! Prompt templates. The app serves Portuguese translations, so the
//! prompts ask for answers in Brazilian Portuguese.
use super::{AnalysisLevel, Message, Role};

const GUIDELINES: &str = "Você é um assistente sábio e didático de estudo bíblico.
Sua missão é explicar o SENTIDO PROFUNDO do texto de forma EXTREMAMENTE RESUMIDA e DIRETA.

DIRETRIZES:
1. SEJA EXTREMAMENTE BREVE. MÁXIMO 3-4 LINHAS TOTAIS.
2. Foque APENAS no essencial: O que Deus está comunicando?
3. Use linguagem técnica (grego/hebraico) APENAS se for CRUCIAL.
4. Use Português do Brasil claro.
5. Formate usando HTML simples (tags <p>, <strong>, <em>). SEM LISTAS <ul>.";

/// Builds the single-turn prompt asking for an explanation of the
/// selected text. `context` is the full verse the selection came from.
pub fn analysis(text: &str, level: AnalysisLevel, context: &str) -> String {
    let task = match level {
        AnalysisLevel::Word => format!(
            "EXPLIQUE A PALAVRA: \"{}\"\n\
             NO CONTEXTO DO VERSÍCULO: \"{}\"\n\n\
             Responda em UM PARÁGRAFO ÚNICO e CURTO:\n\
             Diga a palavra original, seu significado literal e o impacto dela neste versículo. \
             Tudo em no máximo 3 frases.",
            text, context
        ),
        AnalysisLevel::Phrase => format!(
            "EXPLIQUE A EXPRESSÃO: \"{}\"\n\
             CONTEXTO: \"{}\"\n\n\
             Responda em UM PARÁGRAFO ÚNICO e CURTO:\n\
             Explique a ideia central e qualquer nuance importante de forma direta e inspiradora. \
             Máximo 3 frases.",
            text, context
        ),
        AnalysisLevel::Verse => format!(
            "EXPLIQUE O VERSÍCULO: \"{}\"\n\n\
             Responda em UM PARÁGRAFO ÚNICO:\n\
             Qual a mensagem central de Deus aqui? Vá direto ao ponto. Máximo 4 frases.",
            text
        ),
    };

    format!("{}\n\n{}", GUIDELINES, task)
}

/// System prompt for a follow-up conversation about a passage.
pub fn chat_system(context: &str) -> String {
    format!(
        "Você é um assistente sábio e didático de estudo bíblico.
Você está conversando sobre o seguinte texto bíblico:
\"{}\"

DIRETRIZES:
1. Seja direto, amável e teologicamente profundo.
2. Responda à dúvida do usuário com clareza.
3. Use formatação HTML simples (<p>, <strong>, <em>) se necessário para clareza.
4. Mantenha as respostas concisas (máximo 1-2 parágrafos), a menos que o usuário peça detalhes.",
        context
    )
}

/// Prepends the system prompt to the user's conversation.
pub fn chat_messages(context: &str, history: &[Message]) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.push(Message::new(Role::System, chat_system(context)));
    messages.extend(history.iter().filter(|m| m.role != Role::System).cloned());
    messages
}

/// Flattens a conversation into one text block, for providers that only
/// take a single prompt.
pub fn transcript(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| match m.role {
            Role::System => m.content.to_owned(),
            Role::User => format!("User: {}", m.content),
            Role::Assistant => format!("Assistant: {}", m.content),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
