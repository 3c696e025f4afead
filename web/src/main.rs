#![warn(clippy::all)]

use std::io;

use actix_web::{middleware, web, App, HttpResponse, HttpServer};
use dotenv::dotenv;
use env_logger::Env;
use handlebars::Handlebars;
use log::info;

use db::{build_pool, establish_connection, run_migrations, Catalog, DbCatalog, SqliteConnectionPool};

use crate::ai::Exegete;
use crate::config::Config;
use crate::controllers::{admin, ai as exegesis, api, session, study, view};

/// Represents the [server data](actix_web.web.Data.html) for the application.
pub struct ServerData {
    pub db: SqliteConnectionPool,
    pub template: Handlebars<'static>,
    pub config: Config,
    pub http: reqwest::Client,
}

/// Registers the [Handlebars](handlebars.handlebars.html) templates for the application.
fn register_templates(dir: &str) -> Result<Handlebars<'static>, handlebars::TemplateError> {
    let mut tpl = Handlebars::new();
    tpl.set_strict_mode(true);
    tpl.register_templates_directory(".hbs", dir)?;

    Ok(tpl)
}

/// Wires up every route of the application against a catalog.
pub fn routes<C>(cfg: &mut web::ServiceConfig)
where
    C: Catalog + 'static,
{
    cfg.service(web::resource("/health").route(web::get().to(api::health)))
        .service(
            web::scope("/api/bible")
                .route("/books", web::get().to(api::books::<C>))
                .route("/versions", web::get().to(api::versions::<C>))
                .route("/verses", web::get().to(api::verses::<C>))
                .service(
                    web::resource("/bookmarks")
                        .route(web::get().to(study::list_bookmarks))
                        .route(web::post().to(study::create_bookmark)),
                )
                .route("/bookmarks/{id}", web::delete().to(study::delete_bookmark))
                .service(
                    web::resource("/outlines")
                        .route(web::get().to(study::list_outlines))
                        .route(web::post().to(study::create_outline)),
                )
                .route("/outlines/{id}", web::delete().to(study::delete_outline))
                .service(
                    web::resource("/settings")
                        .route(web::get().to(study::get_settings))
                        .route(web::post().to(study::update_settings)),
                ),
        )
        .service(
            web::scope("/api/auth")
                .route("/login", web::post().to(session::login))
                .route("/session", web::get().to(session::session)),
        )
        .service(
            web::scope("/api/ai")
                .route("/analyze", web::post().to(exegesis::analyze))
                .route("/chat", web::post().to(exegesis::chat)),
        )
        .route("/api/admin/seed", web::get().to(admin::seed))
        .service(
            web::resource("/")
                .name("index")
                .route(web::get().to(view::index::<C>)),
        )
        .service(
            web::resource("/search")
                .name("search")
                .route(web::get().to(view::search::<C>)),
        )
        .service(
            web::resource("/read/{book_id}/{chapter}")
                .name("chapter")
                .route(web::get().to(view::chapter::<C>)),
        );
}

fn other_error<E: std::fmt::Display>(e: E) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e.to_string())
}

#[actix_rt::main]
async fn main() -> io::Result<()> {
    dotenv().ok();

    // Set up logging
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::from_env();

    // Set up sentry
    let capture_errors = config.sentry_dsn.is_some();
    let _guard = sentry::init((
        config.sentry_dsn.to_owned(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    ));

    // Run DB migrations for a new SQLite database
    run_migrations(&mut establish_connection(&config.database_url).map_err(other_error)?)
        .map_err(other_error)?;

    let pool = build_pool(&config.database_url).map_err(other_error)?;
    let template = register_templates("./web/templates/").map_err(other_error)?;
    match config.ai.provider() {
        Some(provider) => info!("AI exegesis through {}", provider.name()),
        None => info!("No AI provider configured"),
    }

    let bind_address = config.bind_address.to_owned();
    let data = web::Data::new(ServerData {
        db: pool,
        template,
        config,
        http: Exegete::http_client(),
    });

    info!("Listening on {}", bind_address);
    HttpServer::new(move || {
        // Wire up the application
        App::new()
            .wrap(middleware::Compress::default())
            .wrap(
                sentry_actix::Sentry::builder()
                    .capture_server_errors(capture_errors)
                    .finish(),
            )
            .wrap(middleware::Logger::default())
            .app_data(data.clone())
            .service(actix_files::Files::new("/static", "./web/dist").use_etag(true))
            .configure(routes::<DbCatalog>)
            .default_service(web::to(|| async { HttpResponse::NotFound().finish() }))
    })
    .bind(bind_address)?
    .run()
    .await
}

mod ai;
mod auth;
mod config;
mod controllers;
mod error;
mod responder;
mod selection;
#[cfg(test)]
mod test;
