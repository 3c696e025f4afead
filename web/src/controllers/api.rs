use actix_web::web;
use serde::{Deserialize, Serialize};

use db::models::{BibleVersion, Book, Chapter, Verse, VerseInContext};
use db::study::settings::DEFAULT_VERSION;
use db::{Catalog, DbError};

use crate::controllers::{present, JsonResult};
use crate::error::Error;
use crate::ServerData;

#[derive(Serialize, Deserialize, Debug)]
pub struct BooksResponse {
    pub books: Vec<Book>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct VersionsResponse {
    pub versions: Vec<BibleVersion>,
}

/// Query string of the verses endpoint.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct VersesParams {
    pub book_id: Option<String>,
    pub chapter: Option<String>,
    pub version_id: Option<String>,
    pub query: Option<String>,
}

/// A chapter with the verses of the requested version.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct ChapterPayload {
    #[serde(flatten)]
    pub chapter: Chapter,
    pub verses: Vec<Verse>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(untagged)]
pub enum VersesResponse {
    Chapter {
        chapter: ChapterPayload,
        verses: Vec<Verse>,
    },
    Search {
        verses: Vec<VerseInContext>,
    },
}

/// Handles HTTP requests for the list of books, in canonical order.
pub async fn books<C>(data: web::Data<ServerData>) -> JsonResult<BooksResponse>
where
    C: Catalog,
{
    let db = data.db.to_owned();
    let books = web::block(move || -> Result<_, DbError> { C::books(&mut *db.get()?) }).await??;

    Ok(web::Json(BooksResponse { books }))
}

/// Handles HTTP requests for the list of imported versions.
pub async fn versions<C>(data: web::Data<ServerData>) -> JsonResult<VersionsResponse>
where
    C: Catalog,
{
    let db = data.db.to_owned();
    let versions =
        web::block(move || -> Result<_, DbError> { C::versions(&mut *db.get()?) }).await??;

    Ok(web::Json(VersionsResponse { versions }))
}

/// Handles HTTP requests for verses.
///
/// A non-blank `query` searches the version's text. Otherwise `bookId`
/// and `chapter` pick the chapter to read. The version defaults to NVI.
pub async fn verses<C>(
    data: web::Data<ServerData>,
    params: web::Query<VersesParams>,
) -> JsonResult<VersesResponse>
where
    C: Catalog,
{
    let params = params.into_inner();
    let version_id = present(&params.version_id)
        .unwrap_or(DEFAULT_VERSION)
        .to_string();
    let db = data.db.to_owned();

    if let Some(query) = present(&params.query) {
        let query = query.to_string();
        let verses = web::block(move || -> Result<_, DbError> {
            C::search(&query, &version_id, &mut *db.get()?)
        })
        .await??;
        return Ok(web::Json(VersesResponse::Search { verses }));
    }

    let (book_id, chapter) = match (present(&params.book_id), present(&params.chapter)) {
        (Some(book_id), Some(chapter)) => (book_id.to_string(), chapter),
        _ => return Err(Error::BadRequest("bookId and chapter are required".to_string()).into()),
    };
    let number = chapter
        .parse::<i32>()
        .map_err(|_| Error::BadRequest(format!("'{}' is not a chapter number", chapter)))?;

    let (chapter, verses) = web::block(move || -> Result<_, DbError> {
        C::chapter(&book_id, number, &version_id, &mut *db.get()?)
    })
    .await??;

    Ok(web::Json(VersesResponse::Chapter {
        chapter: ChapterPayload {
            chapter,
            verses: verses.clone(),
        },
        verses,
    }))
}

#[derive(Serialize, Deserialize, Debug)]
pub struct HealthResponse {
    pub status: String,
}

/// Liveness check.
pub async fn health() -> web::Json<HealthResponse> {
    web::Json(HealthResponse {
        status: "ok".to_string(),
    })
}
