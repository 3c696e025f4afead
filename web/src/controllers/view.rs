use actix_web::web;
use actix_web::{HttpRequest, HttpResponse};
use log::warn;
use serde::Deserialize;

use db::study::settings::DEFAULT_VERSION;
use db::{Catalog, DbError};

use crate::ai::AnalysisLevel;
use crate::controllers::{ai, present};
use crate::error::HtmlError;
use crate::responder::*;
use crate::selection::SelectionState;
use crate::ServerData;

/// Result for HTML response handlers
type ViewResult = Result<HttpResponse, HtmlError>;

#[derive(Deserialize, Debug, Default)]
pub struct VersionParams {
    pub version: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct SearchParams {
    pub q: Option<String>,
    pub version: Option<String>,
}

/// Query string of the chapter page: the version, plus the current word
/// selection when the reader has clicked a word. `analyze` asks for the
/// exegesis of that selection.
#[derive(Deserialize, Debug, Default)]
pub struct ChapterParams {
    pub version: Option<String>,
    pub verse: Option<i32>,
    pub start: Option<usize>,
    pub end: Option<usize>,
    pub level: Option<AnalysisLevel>,
    pub analyze: Option<u8>,
}

impl ChapterParams {
    fn selection(&self) -> SelectionState {
        let mut state = SelectionState::new();
        if let (Some(verse), Some(start)) = (self.verse, self.start) {
            state.set_manual(
                verse,
                start,
                self.end.unwrap_or(start),
                self.level.unwrap_or(AnalysisLevel::Word),
            );
        }
        state
    }
}

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

/// Handles HTTP requests for the home page.
///
/// Lists the imported versions and every book, linking to chapter 1.
pub async fn index<C>(
    data: web::Data<ServerData>,
    params: web::Query<VersionParams>,
    req: HttpRequest,
) -> ViewResult
where
    C: Catalog,
{
    let version = present(&params.version).unwrap_or(DEFAULT_VERSION).to_string();
    let db = data.db.to_owned();
    let (versions, books) = web::block(move || -> Result<_, DbError> {
        let mut conn = db.get()?;
        Ok((C::versions(&mut conn)?, C::books(&mut conn)?))
    })
    .await??;

    let body = TemplateData::new(IndexData::new(versions, books, &version, &req), Meta::for_index())
        .to_html("index", &data.template)?;

    Ok(html(body))
}

/// Handles HTTP requests for a chapter (e.g. /read/jo/3?version=acf).
pub async fn chapter<C>(
    data: web::Data<ServerData>,
    path: web::Path<(String, i32)>,
    params: web::Query<ChapterParams>,
    req: HttpRequest,
) -> ViewResult
where
    C: Catalog,
{
    let (book_id, number) = path.into_inner();
    let version = present(&params.version).unwrap_or(DEFAULT_VERSION).to_string();
    let db = data.db.to_owned();
    let (block_book, block_version) = (book_id.to_owned(), version.to_owned());
    let (books, versions, (_, verses)) = web::block(move || -> Result<_, DbError> {
        let mut conn = db.get()?;
        let chapter = C::chapter(&block_book, number, &block_version, &mut conn)?;
        Ok((C::books(&mut conn)?, C::versions(&mut conn)?, chapter))
    })
    .await??;

    let book = books
        .into_iter()
        .find(|b| b.id == book_id)
        .ok_or(DbError::NotFound {
            kind: "book",
            id: book_id,
        })?;

    let mut chapter_data = ChapterData::new(
        (book, number),
        &verses,
        versions,
        &version,
        params.selection(),
        &req,
    );
    if params.analyze.unwrap_or(0) != 0 {
        if let Some(selection) = chapter_data.selection.as_mut() {
            let result = match ai::exegete(&data) {
                Ok(exegete) => {
                    exegete
                        .analyze(&selection.text, selection.level, &selection.context)
                        .await
                }
                Err(e) => Err(e),
            };
            if let Err(e) = &result {
                warn!("Analysis of verse {} failed: {}", selection.verse_number, e);
            }
            selection.set_analysis(result);
        }
    }
    let body = TemplateData::new(
        &chapter_data,
        Meta::for_chapter(&chapter_data.book, number, &verses, &chapter_data.links),
    )
    .to_html("chapter", &data.template)?;

    Ok(html(body))
}

/// Handles HTTP requests for the search page (e.g. /search?q=amor&version=acf).
pub async fn search<C>(
    data: web::Data<ServerData>,
    params: web::Query<SearchParams>,
    req: HttpRequest,
) -> ViewResult
where
    C: Catalog,
{
    let version = present(&params.version).unwrap_or(DEFAULT_VERSION).to_string();
    let query = present(&params.q).unwrap_or_default().to_string();
    let db = data.db.to_owned();
    let (block_query, block_version) = (query.to_owned(), version.to_owned());
    let (versions, results) = web::block(move || -> Result<_, DbError> {
        let mut conn = db.get()?;
        let results = if block_query.is_empty() {
            Vec::new()
        } else {
            C::search(&block_query, &block_version, &mut conn)?
        };
        Ok((C::versions(&mut conn)?, results))
    })
    .await??;

    let body = TemplateData::new(
        SearchData::new(&query, results, versions, &version, &req),
        Meta::for_search(&query),
    )
    .to_html("search", &data.template)?;

    Ok(html(body))
}
