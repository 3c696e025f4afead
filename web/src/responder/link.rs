use actix_web::error::UrlGenerationError;
use actix_web::HttpRequest;
use log::error;
use serde::{Deserialize, Serialize};
use url::Url;

use db::canon::BOOKS;
use db::models::Book;

use crate::selection::Selection;

/// Name used in the HTML title generator
pub const NAME: &str = "Lamp";

fn invalid_url(e: UrlGenerationError) -> Url {
    error!("{:?}", e);
    Url::parse("http://localhost/").unwrap()
}

/// Link representing a URL and label
#[derive(Clone, Deserialize, Serialize, Debug, PartialEq)]
pub struct Link {
    pub label: String,
    pub url: String,
}

impl Link {
    fn new(url: &Url, label: String) -> Self {
        let mut url_string = url.path().to_string();
        if let Some(query) = url.query() {
            url_string.push('?');
            url_string.push_str(query);
        }
        if let Some(fragment) = url.fragment() {
            url_string.push('#');
            url_string.push_str(fragment);
        }

        Self {
            label,
            url: url_string,
        }
    }
}

/// Link to the home page.
pub fn index_url(req: &HttpRequest) -> Link {
    Link::new(
        &req.url_for_static("index").unwrap_or_else(invalid_url),
        NAME.to_string(),
    )
}

fn chapter_base(book_id: &str, chapter: i32, req: &HttpRequest) -> Url {
    let chapter = chapter.to_string();
    req.url_for("chapter", [book_id, chapter.as_str()])
        .unwrap_or_else(invalid_url)
}

/// Generates a chapter URL for the given book and chapter, in a version.
pub fn chapter_url(book_id: &str, name: &str, chapter: i32, version: &str, req: &HttpRequest) -> Link {
    let mut url = chapter_base(book_id, chapter, req);
    url.query_pairs_mut().append_pair("version", version);
    Link::new(&url, format!("{} {}", name, chapter))
}

fn selection_base(
    book_id: &str,
    chapter: i32,
    version: &str,
    selection: &Selection,
    req: &HttpRequest,
) -> Url {
    let mut url = chapter_base(book_id, chapter, req);
    url.query_pairs_mut()
        .append_pair("version", version)
        .append_pair("verse", &selection.verse_id.to_string())
        .append_pair("start", &selection.range.start.to_string())
        .append_pair("end", &selection.range.end.to_string())
        .append_pair("level", selection.level.as_str());
    url
}

/// URL applying `selection` to the chapter page, jumping back to the verse.
pub fn selection_url(
    book_id: &str,
    chapter: i32,
    version: &str,
    verse_number: i32,
    selection: &Selection,
    req: &HttpRequest,
) -> String {
    let mut url = selection_base(book_id, chapter, version, selection, req);
    url.set_fragment(Some(&format!("v{}", verse_number)));
    Link::new(&url, String::new()).url
}

/// Like [selection_url], also asking for the exegesis of the selection.
pub fn analysis_url(
    book_id: &str,
    chapter: i32,
    version: &str,
    verse_number: i32,
    selection: &Selection,
    req: &HttpRequest,
) -> String {
    let mut url = selection_base(book_id, chapter, version, selection, req);
    url.query_pairs_mut().append_pair("analyze", "1");
    url.set_fragment(Some(&format!("v{}", verse_number)));
    Link::new(&url, String::new()).url
}

/// URL of the search page for `query` in a version.
pub fn search_url(query: &str, version: &str, req: &HttpRequest) -> String {
    let mut url = req.url_for_static("search").unwrap_or_else(invalid_url);
    url.query_pairs_mut()
        .append_pair("q", query)
        .append_pair("version", version);
    Link::new(&url, String::new()).url
}

/// Link to a verse on its chapter page, labelled like `João 3:16`.
pub fn verse_url(
    book_id: &str,
    name: &str,
    (chapter, verse_number): (i32, i32),
    version: &str,
    req: &HttpRequest,
) -> Link {
    let chapter_link = chapter_url(book_id, name, chapter, version, req);
    Link {
        label: format!("{}:{}", chapter_link.label, verse_number),
        url: format!("{}#v{}", chapter_link.url, verse_number),
    }
}

/// The chapter before and after `chapter` of the book, crossing into the
/// neighbouring books at either end. Genesis 1 has no previous chapter and
/// Revelation 22 has no next one.
pub fn neighbours(book_id: &str, chapter: i32) -> (Option<(usize, i32)>, Option<(usize, i32)>) {
    let idx = match BOOKS.iter().position(|(id, ..)| *id == book_id) {
        Some(idx) => idx,
        None => return (None, None),
    };
    let chapters = BOOKS[idx].3;

    let previous = if chapter > 1 {
        Some((idx, chapter - 1))
    } else if idx > 0 {
        Some((idx - 1, BOOKS[idx - 1].3))
    } else {
        None
    };
    let next = if chapter < chapters {
        Some((idx, chapter + 1))
    } else if idx + 1 < BOOKS.len() {
        Some((idx + 1, 1))
    } else {
        None
    };

    (previous, next)
}

/// Links for the chapter page.
#[derive(Clone, Deserialize, Serialize, Debug)]
pub struct ChapterLinks {
    pub books: Link,
    pub previous: Option<Link>,
    pub next: Option<Link>,
    pub current: Link,
}

impl ChapterLinks {
    pub fn new(book: &Book, chapter: i32, version: &str, req: &HttpRequest) -> Self {
        let link = |(idx, c): (usize, i32)| {
            let (id, name, ..) = BOOKS[idx];
            chapter_url(id, name, c, version, req)
        };
        let (previous, next) = neighbours(&book.id, chapter);

        Self {
            books: index_url(req),
            previous: previous.map(link),
            next: next.map(link),
            current: chapter_url(&book.id, &book.name, chapter, version, req),
        }
    }
}

/// A book on the home page, linking to its first chapter.
#[derive(Clone, Deserialize, Serialize, Debug)]
pub struct BookLink {
    pub id: String,
    pub name: String,
    pub chapters: i32,
    pub url: String,
}

impl BookLink {
    pub fn new(book: &Book, version: &str, req: &HttpRequest) -> Self {
        Self {
            id: book.id.to_owned(),
            name: book.name.to_owned(),
            chapters: book.chapters,
            url: chapter_url(&book.id, &book.name, 1, version, req).url,
        }
    }
}
