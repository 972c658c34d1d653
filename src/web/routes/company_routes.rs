use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    routing::{delete, get, post},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::db::models::{
    CompanySchema, DEFAULT_LIMIT, PageWindow, PaginatedAutocompleteResponse,
    PaginatedCompanyResponse, TagUpdateResponse,
};
use crate::db::services;
use crate::web::error::COMPANY_NAME_NOT_FOUND;
use crate::web::{AppError, AppState};

// --- Request Structs ---

fn default_limit() -> u64 {
    DEFAULT_LIMIT
}

#[derive(Deserialize, Debug)]
pub struct AutocompleteQuery {
    company_name: String,
    #[serde(default)]
    offset: u64,
    #[serde(default = "default_limit")]
    limit: u64,
}

#[derive(Deserialize, Debug)]
pub struct SearchByNameQuery {
    name: String,
}

#[derive(Deserialize, Debug)]
pub struct PageQuery {
    #[serde(default)]
    offset: u64,
    #[serde(default = "default_limit")]
    limit: u64,
}

// --- Route Handlers ---

async fn list_companies_autocomplete_handler(
    State(app_state): State<Arc<AppState>>,
    query: Result<Query<AutocompleteQuery>, QueryRejection>,
) -> Result<Json<PaginatedAutocompleteResponse>, AppError> {
    let Query(query) = query?;
    let window = PageWindow::new(query.offset, query.limit)?;
    let page =
        services::list_companies_autocomplete(&app_state.db_pool, &query.company_name, window)
            .await?;
    Ok(Json(page))
}

async fn search_company_by_name_handler(
    State(app_state): State<Arc<AppState>>,
    query: Result<Query<SearchByNameQuery>, QueryRejection>,
) -> Result<Json<CompanySchema>, AppError> {
    let Query(query) = query?;
    if query.name.is_empty() {
        return Err(AppError::Validation("name must not be empty".to_string()));
    }
    services::get_company_by_name(&app_state.db_pool, &query.name)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(COMPANY_NAME_NOT_FOUND.to_string()))
}

async fn list_companies_by_tag_handler(
    State(app_state): State<Arc<AppState>>,
    Path(tag): Path<String>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<PaginatedCompanyResponse>, AppError> {
    let Query(query) = query?;
    let window = PageWindow::new(query.offset, query.limit)?;
    let page = services::list_companies_by_tag(&app_state.db_pool, &tag, window).await?;
    Ok(Json(page))
}

/// The body is the bare tag id, e.g. `1`.
async fn add_tag_to_company_handler(
    State(app_state): State<Arc<AppState>>,
    company_id: Result<Path<i32>, PathRejection>,
    tag_id: Result<Json<i32>, JsonRejection>,
) -> Result<Json<TagUpdateResponse>, AppError> {
    let Path(company_id) = company_id?;
    let Json(tag_id) = tag_id?;
    let response = services::add_tag_to_company(&app_state.db_pool, company_id, tag_id).await?;
    Ok(Json(response))
}

async fn remove_tag_from_company_handler(
    State(app_state): State<Arc<AppState>>,
    ids: Result<Path<(i32, i32)>, PathRejection>,
) -> Result<Json<TagUpdateResponse>, AppError> {
    let Path((company_id, tag_id)) = ids?;
    let response =
        services::remove_tag_from_company(&app_state.db_pool, company_id, tag_id).await?;
    Ok(Json(response))
}

// --- Router ---

pub fn create_companies_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/search/keyword", get(list_companies_autocomplete_handler))
        .route("/search", get(search_company_by_name_handler))
        .route("/tag/{tag}", get(list_companies_by_tag_handler))
        .route("/{company_id}/tags", post(add_tag_to_company_handler))
        .route(
            "/{company_id}/tags/{tag_id}",
            delete(remove_tag_from_company_handler),
        )
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use sea_orm::DatabaseConnection;
    use serde_json::{Value, json};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::db::services::{add_tag_to_company, create_company, create_tag};
    use crate::db::test_support::test_db;
    use crate::web::create_axum_router;

    struct Fixture {
        app: axum::Router,
        db: DatabaseConnection,
        company_id: i32,
        tag_id: i32,
        _dir: TempDir,
    }

    async fn fixture() -> Fixture {
        let (db, dir) = test_db().await;
        let company = create_company(
            &db,
            Some("원티드랩"),
            Some("Wantedlab"),
            Some("ウォンテッドラボ"),
        )
        .await
        .unwrap();
        let tag = create_tag(&db, Some("개발"), 1).await.unwrap();
        add_tag_to_company(&db, company.id, tag.id).await.unwrap();

        Fixture {
            app: create_axum_router(db.clone()),
            db,
            company_id: company.id,
            tag_id: tag.id,
            _dir: dir,
        }
    }

    async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_list_companies_autocomplete() {
        let fx = fixture().await;

        let (status, json) = send(
            &fx.app,
            get("/api/v1/companies/search/keyword?company_name=%EC%9B%90%ED%8B%B0%EB%93%9C"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            json!({
                "items": [{
                    "id": fx.company_id,
                    "name_ko": "원티드랩",
                    "name_en": "Wantedlab",
                    "name_ja": "ウォンテッドラボ",
                }],
                "total": 1,
                "offset": 0,
                "limit": 10,
            })
        );
    }

    #[tokio::test]
    async fn test_autocomplete_validates_window() {
        let fx = fixture().await;

        for uri in [
            "/api/v1/companies/search/keyword?company_name=a&limit=0",
            "/api/v1/companies/search/keyword?company_name=a&limit=101",
            "/api/v1/companies/search/keyword?company_name=a&offset=-1",
            "/api/v1/companies/search/keyword?company_name=a&offset=9223372036854775808",
            "/api/v1/companies/search/keyword?company_name=a&offset=18446744073709551615",
            "/api/v1/companies/search/keyword?offset=0",
        ] {
            let (status, json) = send(&fx.app, get(uri)).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "uri {uri}");
            assert!(json["detail"].is_string());
        }

        let (status, json) = send(
            &fx.app,
            get("/api/v1/companies/search/keyword?company_name=wanted&offset=1&limit=100"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total"], 1);
        assert_eq!(json["items"], json!([]));
    }

    #[tokio::test]
    async fn test_search_company_by_name() {
        let fx = fixture().await;

        let (status, json) =
            send(&fx.app, get("/api/v1/companies/search?name=Wantedlab")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            json!({
                "id": fx.company_id,
                "name_ko": "원티드랩",
                "name_en": "Wantedlab",
                "name_ja": "ウォンテッドラボ",
                "tags": [{"id": fx.tag_id, "name": "개발", "number": 1}],
            })
        );
    }

    #[tokio::test]
    async fn test_search_company_by_name_not_found() {
        let fx = fixture().await;

        let (status, json) = send(&fx.app, get("/api/v1/companies/search?name=Kakao")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json, json!({"detail": "Company not found"}));

        let (status, _) = send(&fx.app, get("/api/v1/companies/search?name=")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_search_company_by_ambiguous_name() {
        let fx = fixture().await;
        create_company(&fx.db, Some("X"), None, None).await.unwrap();
        create_company(&fx.db, None, None, Some("X")).await.unwrap();

        let (status, json) = send(&fx.app, get("/api/v1/companies/search?name=X")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["detail"].is_string());
    }

    #[tokio::test]
    async fn test_list_companies_by_tag() {
        let fx = fixture().await;

        let (status, json) = send(&fx.app, get("/api/v1/companies/tag/tag_1")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            json!({
                "items": [{
                    "id": fx.company_id,
                    "name_ko": "원티드랩",
                    "name_en": "Wantedlab",
                    "name_ja": "ウォンテッドラボ",
                    "tags": [{"id": fx.tag_id, "name": "개발", "number": 1}],
                }],
                "total": 1,
                "offset": 0,
                "limit": 10,
            })
        );
    }

    #[tokio::test]
    async fn test_list_companies_by_unknown_or_malformed_tag() {
        let fx = fixture().await;

        let (status, json) = send(&fx.app, get("/api/v1/companies/tag/tag_999")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json, json!({"detail": "태그를 찾을 수 없습니다."}));

        for token in ["tag1", "tag_x", "label_1"] {
            let uri = format!("/api/v1/companies/tag/{token}");
            let (status, _) = send(&fx.app, get(&uri)).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "token {token}");
        }

        let (status, json) = send(
            &fx.app,
            get("/api/v1/companies/tag/tag_1?offset=18446744073709551615"),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(json["detail"].as_str().unwrap().contains("offset"));
    }

    #[tokio::test]
    async fn test_add_tag_to_company() {
        let fx = fixture().await;
        let second = create_tag(&fx.db, Some("채용"), 2).await.unwrap();

        let request = Request::builder()
            .method("POST")
            .uri(format!("/api/v1/companies/{}/tags", fx.company_id))
            .header("content-type", "application/json")
            .body(Body::from(second.id.to_string()))
            .unwrap();
        let (status, json) = send(&fx.app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            json!({
                "company_id": fx.company_id,
                "tags": [
                    {"id": fx.tag_id, "name": "개발", "number": 1},
                    {"id": second.id, "name": "채용", "number": 2},
                ],
            })
        );
    }

    fn post_tag(company_id: i32, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/api/v1/companies/{company_id}/tags"))
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_add_tag_errors() {
        let fx = fixture().await;

        let (status, json) = send(&fx.app, post_tag(fx.company_id, "9999")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json, json!({"detail": "태그를 찾을 수 없습니다."}));

        let (status, json) = send(&fx.app, post_tag(fx.company_id + 100, &fx.tag_id.to_string())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json, json!({"detail": "회사를 찾을 수 없습니다."}));

        let (status, json) = send(&fx.app, post_tag(fx.company_id, &fx.tag_id.to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, json!({"detail": "이미 회사에 등록된 태그입니다."}));

        let (status, _) = send(&fx.app, post_tag(fx.company_id, "\"one\"")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_remove_tag_from_company() {
        let fx = fixture().await;
        let uri = format!("/api/v1/companies/{}/tags/{}", fx.company_id, fx.tag_id);
        let delete = || {
            Request::builder()
                .method("DELETE")
                .uri(&uri)
                .body(Body::empty())
                .unwrap()
        };

        let (status, json) = send(&fx.app, delete()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({"company_id": fx.company_id, "tags": []}));

        // Removing again leaves the set unchanged.
        let (status, json) = send(&fx.app, delete()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({"company_id": fx.company_id, "tags": []}));

        let missing = Request::builder()
            .method("DELETE")
            .uri(format!("/api/v1/companies/{}/tags/9999", fx.company_id))
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(&fx.app, missing).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json, json!({"detail": "태그를 찾을 수 없습니다."}));
    }
}
