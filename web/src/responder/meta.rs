use serde::{Deserialize, Serialize};

use db::models::{Book, Verse};

use crate::responder::link::{ChapterLinks, NAME};

/// Maximum number of characters of verse text used as a page description.
const DESCRIPTION_LENGTH: usize = 150;

fn title(page: &str) -> String {
    format!("{} | {}", page, NAME)
}

#[derive(Clone, Deserialize, Serialize, Debug)]
pub struct Meta {
    description: String,
    title: String,
    url: String,
}

impl Meta {
    pub fn for_index() -> Self {
        Self {
            description: "Leia e estude a Bíblia em várias traduções, com explicações de palavras e versículos.".to_string(),
            title: title("Bíblia"),
            url: "/".to_string(),
        }
    }

    pub fn for_chapter(book: &Book, chapter: i32, verses: &[Verse], links: &ChapterLinks) -> Self {
        let heading = format!("{} {}", book.name, chapter);
        Self {
            description: match verses.first() {
                None => heading.to_owned(),
                Some(v) if v.text.chars().count() > DESCRIPTION_LENGTH => format!(
                    "{}...",
                    v.text.chars().take(DESCRIPTION_LENGTH).collect::<String>()
                ),
                Some(v) => v.text.to_owned(),
            },
            title: title(&heading),
            url: links.current.url.to_owned(),
        }
    }

    pub fn for_search(query: &str) -> Self {
        Self {
            description: "Busque palavras e expressões no texto da Bíblia.".to_string(),
            title: if query.is_empty() {
                title("Busca")
            } else {
                title(&format!("Busca: {}", query))
            },
            url: "/search".to_string(),
        }
    }

    pub fn for_error() -> Self {
        Self {
            description: "Error page".to_string(),
            title: title("Erro"),
            url: "/".to_string(),
        }
    }
}
