use actix_web::HttpRequest;
use handlebars::Handlebars;
use log::error;
use serde::{Deserialize, Serialize};

use db::models::{BibleVersion, Book, Testament, Verse, VerseInContext};

use crate::ai::AnalysisLevel;
use crate::error::Error;
use crate::responder::link::{
    analysis_url, chapter_url, search_url, selection_url, verse_url, BookLink, ChapterLinks, Link,
};
use crate::responder::meta::Meta;
use crate::selection::{Selection, SelectionState};

/// Error data for a view (HTML or JSON)
#[derive(Clone, Deserialize, Serialize, Debug)]
pub struct ErrorData {
    pub error: String,
}

impl ErrorData {
    pub fn from_error(e: &Error) -> Self {
        Self {
            error: e.to_string(),
        }
    }
}

/// A version in the version picker.
#[derive(Clone, Deserialize, Serialize, Debug)]
pub struct VersionOption {
    pub id: String,
    pub abbreviation: String,
    pub name: String,
    pub url: String,
    pub selected: bool,
}

fn version_options(
    versions: &[BibleVersion],
    current: &str,
    url: impl Fn(&str) -> String,
) -> Vec<VersionOption> {
    versions
        .iter()
        .map(|v| VersionOption {
            id: v.id.to_owned(),
            abbreviation: v.abbreviation.to_owned(),
            name: v.name.to_owned(),
            url: url(&v.id),
            selected: v.id == current,
        })
        .collect()
}

/// Data for the home page: the version picker and every book by testament.
#[derive(Clone, Deserialize, Serialize, Debug)]
pub struct IndexData {
    pub versions: Vec<VersionOption>,
    pub old_testament: Vec<BookLink>,
    pub new_testament: Vec<BookLink>,
}

impl IndexData {
    pub fn new(versions: Vec<BibleVersion>, books: Vec<Book>, version: &str, req: &HttpRequest) -> Self {
        let (old, new): (Vec<Book>, Vec<Book>) =
            books.into_iter().partition(|b| b.testament == Testament::Old);

        Self {
            versions: version_options(&versions, version, |id| format!("/?version={}", id)),
            old_testament: old.iter().map(|b| BookLink::new(b, version, req)).collect(),
            new_testament: new.iter().map(|b| BookLink::new(b, version, req)).collect(),
        }
    }
}

/// A word of a verse. Following its link applies a click on the word.
#[derive(Clone, Deserialize, Serialize, Debug)]
pub struct WordData {
    pub text: String,
    pub url: String,
    pub selected: bool,
}

#[derive(Clone, Deserialize, Serialize, Debug)]
pub struct VerseData {
    pub id: i32,
    pub number: i32,
    pub words: Vec<WordData>,
}

/// The highlighted text and what is sent for analysis.
///
/// `analysis` and `analysis_error` stay empty until the reader asks for the
/// exegesis through `analyze_url`.
#[derive(Clone, Deserialize, Serialize, Debug)]
pub struct SelectionData {
    pub verse_number: i32,
    pub level: AnalysisLevel,
    pub text: String,
    pub context: String,
    pub clear_url: String,
    pub analyze_url: String,
    pub analysis: Option<String>,
    pub analysis_error: Option<String>,
}

impl SelectionData {
    /// Records the outcome of the exegesis of this selection.
    pub fn set_analysis(&mut self, result: Result<String, Error>) {
        match result {
            Ok(analysis) => self.analysis = Some(analysis),
            Err(e) => self.analysis_error = Some(e.to_string()),
        }
    }
}

/// Data for the chapter reader.
#[derive(Clone, Deserialize, Serialize, Debug)]
pub struct ChapterData {
    pub book: Book,
    pub chapter: i32,
    pub version: String,
    pub versions: Vec<VersionOption>,
    pub verses: Vec<VerseData>,
    pub selection: Option<SelectionData>,
    pub links: ChapterLinks,
}

impl ChapterData {
    pub fn new(
        (book, chapter): (Book, i32),
        verses: &[Verse],
        versions: Vec<BibleVersion>,
        version: &str,
        state: SelectionState,
        req: &HttpRequest,
    ) -> Self {
        let mut state = state;
        // A selection carried over from another chapter or version.
        if state
            .current()
            .map_or(false, |sel| !verses.iter().any(|v| v.id == sel.verse_id))
        {
            state.clear();
        }

        let links = ChapterLinks::new(&book, chapter, version, req);
        let versions = version_options(&versions, version, |id| {
            chapter_url(&book.id, &book.name, chapter, id, req).url
        });

        let verse_data = verses
            .iter()
            .map(|verse| VerseData {
                id: verse.id,
                number: verse.number,
                words: verse
                    .text
                    .split_whitespace()
                    .enumerate()
                    .map(|(index, text)| {
                        let mut next = state;
                        let click = next.click(verse.id, index);
                        WordData {
                            text: text.to_string(),
                            url: selection_url(&book.id, chapter, version, verse.number, &click, req),
                            selected: state
                                .current()
                                .map_or(false, |sel| sel.contains(verse.id, index)),
                        }
                    })
                    .collect(),
            })
            .collect();

        let selection = state.current().and_then(|sel: &Selection| {
            let verse = verses.iter().find(|v| v.id == sel.verse_id)?;
            Some(SelectionData {
                verse_number: verse.number,
                level: sel.level,
                text: state.text_for_analysis(&verse.text)?,
                context: verse.text.to_owned(),
                clear_url: links.current.url.to_owned(),
                analyze_url: analysis_url(&book.id, chapter, version, verse.number, sel, req),
                analysis: None,
                analysis_error: None,
            })
        });

        Self {
            book,
            chapter,
            version: version.to_string(),
            versions,
            verses: verse_data,
            selection,
            links,
        }
    }
}

/// A verse found by the search page.
#[derive(Clone, Deserialize, Serialize, Debug)]
pub struct SearchResultData {
    pub reference: Link,
    pub version: String,
    pub text: String,
}

/// Data for the search page. `searched` is false until a query is given.
#[derive(Clone, Deserialize, Serialize, Debug)]
pub struct SearchData {
    pub query: String,
    pub version: String,
    pub versions: Vec<VersionOption>,
    pub searched: bool,
    pub results: Vec<SearchResultData>,
}

impl SearchData {
    pub fn new(
        query: &str,
        results: Vec<VerseInContext>,
        versions: Vec<BibleVersion>,
        version: &str,
        req: &HttpRequest,
    ) -> Self {
        Self {
            query: query.to_string(),
            version: version.to_string(),
            versions: version_options(&versions, version, |id| search_url(query, id, req)),
            searched: !query.is_empty(),
            results: results
                .into_iter()
                .map(|r| SearchResultData {
                    reference: verse_url(
                        &r.chapter.book.id,
                        &r.chapter.book.name,
                        (r.chapter.chapter.number, r.verse.number),
                        &r.verse.bible_version_id,
                        req,
                    ),
                    version: r.verse.bible_version_id.to_uppercase(),
                    text: r.verse.text,
                })
                .collect(),
        }
    }
}

#[derive(Clone, Deserialize, Serialize, Debug)]
pub struct TemplateData<T: Serialize> {
    data: T,
    meta: Meta,
}

impl<T: Serialize> TemplateData<T> {
    /// Create new HTML template Data.
    pub fn new(data: T, meta: Meta) -> Self {
        Self { data, meta }
    }

    /// Convert the template data to HTML
    pub fn to_html(&self, tpl_name: &str, renderer: &Handlebars) -> Result<String, Error> {
        renderer.render(tpl_name, &self).map_err(|e| {
            error!("{}", e);
            Error::Template
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handlebars::Handlebars;

    use crate::test::with_service;

    fn versions() -> Vec<BibleVersion> {
        vec![
            BibleVersion {
                id: "acf".to_string(),
                name: "Almeida Corrigida Fiel".to_string(),
                abbreviation: "ACF".to_string(),
                language: "pt-BR".to_string(),
                description: None,
            },
            BibleVersion {
                id: "nvi".to_string(),
                name: "Nova Versão Internacional".to_string(),
                abbreviation: "NVI".to_string(),
                language: "pt-BR".to_string(),
                description: None,
            },
        ]
    }

    fn john_3_16() -> Verse {
        Verse {
            id: 900,
            chapter_id: 43,
            number: 16,
            text: "Porque Deus tanto amou o mundo".to_string(),
            bible_version_id: "nvi".to_string(),
        }
    }

    #[actix_rt::test]
    async fn index_data() {
        with_service(|req| {
            let data = IndexData::new(versions(), db::canon::books(), "nvi", &req);

            assert_eq!(data.old_testament.len(), 39);
            assert_eq!(data.new_testament.len(), 27);
            assert_eq!(data.new_testament[0].url, "/read/mt/1?version=nvi");
            assert!(data.versions[1].selected);
            assert!(!data.versions[0].selected);
        })
        .await;
    }

    #[actix_rt::test]
    async fn chapter_data_without_selection() {
        with_service(|req| {
            let book = db::canon::books().remove(42);
            let data = ChapterData::new(
                (book, 3),
                &[john_3_16()],
                versions(),
                "nvi",
                SelectionState::new(),
                &req,
            );

            assert!(data.selection.is_none());
            assert_eq!(data.verses[0].words.len(), 6);
            assert!(data.verses[0].words.iter().all(|w| !w.selected));
            assert_eq!(
                data.verses[0].words[1].url,
                "/read/jo/3?version=nvi&verse=900&start=1&end=1&level=word#v16"
            );
            assert_eq!(data.versions[0].url, "/read/jo/3?version=acf");
        })
        .await;
    }

    #[actix_rt::test]
    async fn chapter_data_with_selection() {
        with_service(|req| {
            let book = db::canon::books().remove(42);
            let mut state = SelectionState::new();
            state.click(900, 1);
            let data = ChapterData::new((book, 3), &[john_3_16()], versions(), "nvi", state, &req);

            let selection = data.selection.unwrap();
            assert_eq!(selection.text, "Deus");
            assert_eq!(selection.level, AnalysisLevel::Word);
            assert_eq!(selection.clear_url, "/read/jo/3?version=nvi");
            assert_eq!(
                selection.analyze_url,
                "/read/jo/3?version=nvi&verse=900&start=1&end=1&level=word&analyze=1#v16"
            );
            assert!(selection.analysis.is_none());

            let words = &data.verses[0].words;
            assert!(words[1].selected);
            // Clicking the selected word again widens it to the verse.
            assert!(words[1].url.contains("level=verse"));
            // Clicking another word makes a phrase.
            assert!(words[4].url.contains("start=1&end=4&level=phrase"));
        })
        .await;
    }

    #[actix_rt::test]
    async fn stale_selection_is_dropped() {
        with_service(|req| {
            let book = db::canon::books().remove(42);
            let mut state = SelectionState::new();
            state.click(12, 0);
            let data = ChapterData::new((book, 3), &[john_3_16()], versions(), "nvi", state, &req);

            assert!(data.selection.is_none());
            assert!(data.verses[0].words[0].url.contains("level=word"));
        })
        .await;
    }

    #[actix_rt::test]
    async fn analysis_outcome() {
        with_service(|req| {
            let book = db::canon::books().remove(42);
            let mut state = SelectionState::new();
            state.click(900, 1);
            let data = ChapterData::new((book, 3), &[john_3_16()], versions(), "nvi", state, &req);
            let mut selection = data.selection.unwrap();

            selection.set_analysis(Err(Error::NotConfigured("sem chave".to_string())));
            assert_eq!(selection.analysis_error.as_deref(), Some("sem chave"));
            assert!(selection.analysis.is_none());

            selection.set_analysis(Ok("Deus, o Criador".to_string()));
            assert_eq!(selection.analysis.as_deref(), Some("Deus, o Criador"));
        })
        .await;
    }

    #[actix_rt::test]
    async fn search_data() {
        with_service(|req| {
            let book = db::canon::books().remove(42);
            let chapter = db::models::Chapter {
                id: 43,
                book_id: "jo".to_string(),
                number: 3,
            };
            let found = VerseInContext::from((john_3_16(), (chapter, book)));
            let data = SearchData::new("amou", vec![found], versions(), "nvi", &req);

            assert!(data.searched);
            assert_eq!(data.results[0].reference.label, "João 3:16");
            assert_eq!(data.results[0].reference.url, "/read/jo/3?version=nvi#v16");
            assert_eq!(data.results[0].version, "NVI");
            assert_eq!(data.versions[0].url, "/search?q=amou&version=acf");

            let empty = SearchData::new("", Vec::new(), versions(), "nvi", &req);
            assert!(!empty.searched);
        })
        .await;
    }

    #[test]
    fn template_data() {
        let mut tpl = Handlebars::new();
        tpl.register_template_string("test", "<html>{{data.error}}</html>")
            .unwrap();
        let data = TemplateData::new(
            ErrorData {
                error: "oops".to_string(),
            },
            Meta::for_error(),
        );
        let html = data.to_html("test", &tpl).unwrap();
        assert_eq!(html, "<html>oops</html>");
    }
}
