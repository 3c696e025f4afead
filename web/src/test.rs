use std::str;

use actix_http::Request;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{test, web, App, HttpRequest, HttpResponse};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use db::import::{import_version, SourceBook, VersionSource};
use db::models::*;
use db::*;

use crate::ai::{AiConfig, Exegete};
use crate::config::Config;
use crate::{register_templates, routes, ServerData};

pub const TEST_SECRET: &[u8] = b"test-secret";

pub async fn with_service<F>(f: F)
where
    F: Fn(HttpRequest) + Clone + 'static,
{
    let srv = test::init_service(
        App::new()
            .service(web::resource("/test").to(move |req: HttpRequest| {
                f(req);
                HttpResponse::Ok()
            }))
            .service(web::resource("/").name("index"))
            .service(web::resource("/search").name("search"))
            .service(web::resource("/read/{book_id}/{chapter}").name("chapter")),
    );

    test::call_service(
        &srv.await,
        test::TestRequest::with_uri("/test").to_request(),
    )
    .await;
}

fn test_book() -> Book {
    db::canon::books().remove(42)
}

fn test_version(id: &str, name: &str) -> BibleVersion {
    BibleVersion {
        id: id.to_string(),
        name: name.to_string(),
        abbreviation: id.to_uppercase(),
        language: "pt-BR".to_string(),
        description: None,
    }
}

fn test_chapter() -> Chapter {
    Chapter {
        id: 43,
        book_id: "jo".to_string(),
        number: 3,
    }
}

fn test_verse(version_id: &str) -> Verse {
    Verse {
        id: 316,
        chapter_id: 43,
        number: 16,
        text: "Porque Deus tanto amou o mundo que deu o seu Filho Unigênito".to_string(),
        bible_version_id: version_id.to_string(),
    }
}

pub struct TestCatalog;

impl Catalog for TestCatalog {
    fn versions(_: &mut DbConnection) -> Result<Vec<BibleVersion>, DbError> {
        Ok(vec![
            test_version("nvi", "Nova Versão Internacional"),
            test_version("acf", "Almeida Corrigida Fiel"),
        ])
    }

    fn books(_: &mut DbConnection) -> Result<Vec<Book>, DbError> {
        Ok(vec![test_book()])
    }

    fn chapter(
        book_id: &str,
        number: i32,
        version_id: &str,
        _: &mut DbConnection,
    ) -> Result<(Chapter, Vec<Verse>), DbError> {
        if book_id == "jo" && number == 3 {
            Ok((test_chapter(), vec![test_verse(version_id)]))
        } else {
            Err(DbError::ChapterNotFound {
                book: book_id.to_string(),
                chapter: number,
            })
        }
    }

    fn search(
        _: &str,
        version_id: &str,
        _: &mut DbConnection,
    ) -> Result<Vec<VerseInContext>, DbError> {
        Ok(vec![VerseInContext::from((
            test_verse(version_id),
            (test_chapter(), test_book()),
        ))])
    }
}

/// Server data over a migrated in-memory database.
pub fn server_data(ai: AiConfig, admin_seed_key: Option<&str>) -> web::Data<ServerData> {
    let db = build_pool(":memory:").expect("Could not build the test pool");
    run_migrations(&mut db.get().expect("Could not get a test connection"))
        .expect("Could not migrate the test database");

    web::Data::new(ServerData {
        db,
        template: register_templates("./templates/").expect("Could not register template files"),
        config: Config {
            database_url: ":memory:".to_string(),
            bind_address: "127.0.0.1:0".to_string(),
            sentry_dsn: None,
            auth_secret: TEST_SECRET.to_vec(),
            admin_seed_key: admin_seed_key.map(str::to_string),
            ai,
        },
        http: Exegete::http_client(),
    })
}

async fn test_catalog_service(
    ai: AiConfig,
) -> impl Service<Request, Response = ServiceResponse, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(server_data(ai, None))
            .configure(routes::<TestCatalog>),
    )
    .await
}

pub async fn json_response<T>(uri: &str) -> T
where
    T: DeserializeOwned,
{
    let srv = test_catalog_service(AiConfig::default()).await;
    let req = test::TestRequest::with_uri(uri).to_request();
    test::call_and_read_body_json(&srv, req).await
}

pub async fn status_of(uri: &str) -> StatusCode {
    let srv = test_catalog_service(AiConfig::default()).await;
    let req = test::TestRequest::with_uri(uri).to_request();
    test::call_service(&srv, req).await.status()
}

pub async fn html_response(uri: &str) -> String {
    html_response_with(AiConfig::default(), uri).await
}

/// Like [html_response], with an AI provider configured.
pub async fn html_response_with(ai: AiConfig, uri: &str) -> String {
    let srv = test_catalog_service(ai).await;
    let req = test::TestRequest::with_uri(uri).to_request();

    str::from_utf8(&test::call_and_read_body(&srv, req).await)
        .expect("Could not convert response to UTF8")
        .to_string()
}

fn source_book(abbrev: &str, chapters: &[&[&str]]) -> SourceBook {
    SourceBook {
        abbrev: abbrev.to_string(),
        chapters: chapters
            .iter()
            .map(|verses| verses.iter().map(|v| v.to_string()).collect())
            .collect(),
    }
}

/// The real catalog over an NVI fixture with John 1 to 3.
pub async fn study_service() -> (
    impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    SqliteConnectionPool,
) {
    let data = server_data(AiConfig::default(), None);
    let john = source_book(
        "jo",
        &[
            &["No princípio era aquele que é a Palavra."],
            &["Três dias depois, houve um casamento em Caná da Galileia."],
            &[
                "Havia um fariseu chamado Nicodemos.",
                "Ele veio a Jesus, à noite.",
                "Em resposta, Jesus declarou.",
            ],
        ],
    );
    let nvi = VersionSource::find("nvi").expect("NVI is a known version");
    import_version(nvi, &[john], &mut data.db.get().expect("Could not get a test connection"))
        .expect("Could not import the fixture");

    let pool = data.db.to_owned();
    let srv = test::init_service(
        App::new()
            .app_data(data)
            .configure(routes::<DbCatalog>),
    )
    .await;

    (srv, pool)
}

/// Signs in and returns the bearer token.
pub async fn login<S>(srv: &S, email: &str) -> String
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": email }))
        .to_request();
    let body: Value = test::call_and_read_body_json(srv, req).await;
    body["token"]
        .as_str()
        .expect("Login did not return a token")
        .to_string()
}

/// Id of a verse of John in the NVI fixture.
pub fn verse_id(pool: &SqliteConnectionPool, chapter: i32, number: i32) -> i32 {
    let mut conn = pool.get().expect("Could not get a test connection");
    let (_, verses) =
        DbCatalog::chapter("jo", chapter, "nvi", &mut conn).expect("Chapter is in the fixture");
    verses
        .into_iter()
        .find(|v| v.number == number)
        .map(|v| v.id)
        .expect("Verse is in the fixture")
}

pub async fn ai_service(
    ai: AiConfig,
) -> impl Service<Request, Response = ServiceResponse, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(server_data(ai, None))
            .configure(routes::<DbCatalog>),
    )
    .await
}

pub async fn admin_service(
    admin_seed_key: Option<&str>,
) -> impl Service<Request, Response = ServiceResponse, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(server_data(AiConfig::default(), admin_seed_key))
            .configure(routes::<DbCatalog>),
    )
    .await
}

/// A stand-in chat completion API that echoes how it was called.
pub fn fake_provider(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/chat/completions",
        web::post().to(|body: web::Json<Value>| async move {
            let model = body["model"].as_str().unwrap_or_default().to_string();
            if model.ends_with(":free") {
                return HttpResponse::TooManyRequests().finish();
            }
            let last = body["messages"]
                .as_array()
                .and_then(|m| m.last())
                .map(|m| m["content"].as_str().unwrap_or_default().to_string())
                .unwrap_or_default();
            let content = format!("{} | {}", model, last.lines().next().unwrap_or_default());
            HttpResponse::Ok().json(json!({
                "choices": [{ "message": { "role": "assistant", "content": content } }]
            }))
        }),
    );
}

/// DeepSeek pointed at a stand-in provider.
pub fn deepseek(base_url: String) -> AiConfig {
    AiConfig {
        deepseek_key: Some("ds-test".to_string()),
        deepseek_base_url: Some(base_url),
        ..AiConfig::default()
    }
}
