//! Shared-secret protected catalog seeding.
use actix_web::web;
use log::info;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use db::import::{self, ImportReport, VersionSource, VERSIONS};
use db::DbError;

use crate::controllers::{present, JsonResult};
use crate::error::Error;
use crate::ServerData;

#[derive(Deserialize, Debug, Default)]
pub struct SeedParams {
    pub key: Option<String>,
    pub action: Option<String>,
    pub id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(untagged)]
pub enum SeedResponse {
    Structure {
        message: String,
        inserted: usize,
    },
    #[serde(rename_all = "camelCase")]
    Version {
        message: String,
        total_verses: usize,
        unmapped: Vec<String>,
    },
    Usage {
        message: String,
        usage: Vec<String>,
    },
}

fn usage() -> SeedResponse {
    let mut usage = vec!["?key=<key>&action=structure".to_string()];
    usage.extend(
        VERSIONS
            .iter()
            .map(|v| format!("?key=<key>&action=version&id={}", v.id)),
    );
    SeedResponse::Usage {
        message: "Seeding API".to_string(),
        usage,
    }
}

/// Compares the shared secret in constant time. An unset secret matches
/// nothing.
fn key_matches(expected: Option<&str>, given: Option<&str>) -> bool {
    match (expected, given) {
        (Some(expected), Some(given)) => expected.as_bytes().ct_eq(given.as_bytes()).into(),
        _ => false,
    }
}

async fn download(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, Error> {
    let failed = |cause: String| Error::Download {
        url: url.to_string(),
        cause,
    };
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| failed(e.to_string()))?;
    if !response.status().is_success() {
        return Err(failed(response.status().to_string()));
    }
    let bytes = response.bytes().await.map_err(|e| failed(e.to_string()))?;
    Ok(bytes.to_vec())
}

/// Seeds the book structure or imports one version, downloading its
/// dataset. Without a recognised action it describes how to call it.
pub async fn seed(
    data: web::Data<ServerData>,
    params: web::Query<SeedParams>,
) -> JsonResult<SeedResponse> {
    let params = params.into_inner();
    if !key_matches(data.config.admin_seed_key.as_deref(), present(&params.key)) {
        return Err(Error::Unauthorized.into());
    }

    let db = data.db.to_owned();
    match (present(&params.action), present(&params.id)) {
        (Some("structure"), _) => {
            let inserted = web::block(move || -> Result<_, DbError> {
                import::seed_structure(&mut *db.get()?)
            })
            .await??;

            Ok(web::Json(SeedResponse::Structure {
                message: "Structure (books) created successfully".to_string(),
                inserted,
            }))
        }
        (Some("version"), Some(id)) => {
            let source = VersionSource::find(id)
                .ok_or_else(|| Error::NotFound(format!("Version '{}' not found", id)))?;
            info!("Downloading {} from {}", source.id, source.url);
            let bytes = download(&data.http, source.url).await?;

            let report: ImportReport = web::block(move || -> Result<_, DbError> {
                let books = import::parse_dataset(&bytes)?;
                import::import_version(source, &books, &mut *db.get()?)
            })
            .await??;

            Ok(web::Json(SeedResponse::Version {
                message: format!("Version {} imported", report.version),
                total_verses: report.verses,
                unmapped: report.unmapped,
            }))
        }
        _ => Ok(web::Json(usage())),
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::Value;

    use super::key_matches;
    use crate::test::admin_service;

    #[actix_rt::test]
    async fn shared_secret_comparison() {
        assert!(key_matches(Some("s3cret"), Some("s3cret")));
        assert!(!key_matches(Some("s3cret"), Some("s3cre")));
        assert!(!key_matches(Some("s3cret"), Some("s3creT")));
        assert!(!key_matches(Some("s3cret"), None));
        assert!(!key_matches(None, Some("")));
    }

    #[actix_rt::test]
    async fn rejects_wrong_or_missing_key() {
        for (configured, uri) in [
            (Some("s3cret"), "/api/admin/seed?action=structure"),
            (Some("s3cret"), "/api/admin/seed?key=guess&action=structure"),
            (None, "/api/admin/seed?key=&action=structure"),
        ] {
            let srv = admin_service(configured).await;
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&srv, req).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{}", uri);
        }
    }

    #[actix_rt::test]
    async fn seeds_structure_once() {
        let srv = admin_service(Some("s3cret")).await;

        let req = test::TestRequest::get()
            .uri("/api/admin/seed?key=s3cret&action=structure")
            .to_request();
        let first: Value = test::call_and_read_body_json(&srv, req).await;
        assert_eq!(first["inserted"], 66);

        let req = test::TestRequest::get()
            .uri("/api/admin/seed?key=s3cret&action=structure")
            .to_request();
        let second: Value = test::call_and_read_body_json(&srv, req).await;
        assert_eq!(second["inserted"], 0);
    }

    #[actix_rt::test]
    async fn unknown_version_is_404() {
        let srv = admin_service(Some("s3cret")).await;
        let req = test::TestRequest::get()
            .uri("/api/admin/seed?key=s3cret&action=version&id=kjv")
            .to_request();
        let resp = test::call_service(&srv, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_rt::test]
    async fn usage_without_action() {
        let srv = admin_service(Some("s3cret")).await;
        let req = test::TestRequest::get()
            .uri("/api/admin/seed?key=s3cret&action=version")
            .to_request();
        let body: Value = test::call_and_read_body_json(&srv, req).await;
        assert_eq!(body["message"], "Seeding API");
        assert_eq!(body["usage"].as_array().unwrap().len(), 5);
    }
}
