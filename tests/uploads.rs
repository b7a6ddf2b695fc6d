// tests/uploads.rs
//
// Uploads multipart pelo router completo (sessão no Postgres, como no main).
// Rodar com: DATABASE_URL=postgres://... cargo test -- --ignored

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;
use tower_sessions_sqlx_store::PostgresStore;

use hub_backend::{
    common::uploads::UploadStore,
    config::AppState,
    middleware::session::create_session_layer,
    models::{promoter::PromoterPayload, store::StorePayload},
};

const BOUNDARY: &str = "hub-backend-boundary";

/// Foto de celular típica, acima dos 2 MiB padrão do axum.
const PHOTO_BYTES: usize = 3 * 1024 * 1024;

async fn app(pool: PgPool, max_upload_bytes: Option<usize>) -> (Router, AppState) {
    let dir = std::env::temp_dir().join(format!("hub-uploads-route-{}", std::process::id()));
    let mut state = AppState::with_pool(pool.clone(), UploadStore::new(dir));
    if let Some(limit) = max_upload_bytes {
        state.max_upload_bytes = limit;
    }
    state.uploads.ensure_dir().await.unwrap();

    let session_store = PostgresStore::new(pool);
    session_store.migrate().await.unwrap();

    let router = hub_backend::router(state.clone()).layer(create_session_layer(session_store, false));
    (router, state)
}

/// Cadastra loja + promotora e devolve o cookie de sessão dela e o id da loja.
async fn promoter_session(app: &Router, state: &AppState) -> (String, i32) {
    let store = state
        .store_service
        .create(StorePayload {
            company_name: "Mercado Bom Preço".into(),
            brand: None,
            cnpj: Some("12345678000190".into()),
            address: None,
            city: None,
            state: None,
            group_id: None,
        })
        .await
        .unwrap();
    state
        .promoter_service
        .create(PromoterPayload {
            full_name: "Ana Souza".into(),
            cpf: None,
            phone: "11999998888".into(),
            city: None,
            state: None,
            store_ids: vec![store.id],
        })
        .await
        .unwrap();

    let body = json!({ "login": "11999998888", "password": "hub@11999998888" });
    let response = app
        .clone()
        .oneshot(
            Request::post("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .unwrap()
        .to_string();
    (cookie, store.id)
}

fn invoice_body(store_id: i32, photo: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(photo.len() + 512);
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"storeId\"\r\n\r\n{store_id}\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"nota.jpg\"\r\n\
             Content-Type: image/jpeg\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(photo);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn post_invoice(app: &Router, cookie: &str, store_id: i32) -> (StatusCode, Vec<u8>) {
    let photo = vec![0xFF_u8; PHOTO_BYTES];
    let response = app
        .clone()
        .oneshot(
            Request::post("/api/promoter/invoices")
                .header(header::COOKIE, cookie)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(invoice_body(store_id, &photo)))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

#[sqlx::test]
#[ignore = "requer DATABASE_URL"]
async fn invoice_photo_larger_than_two_mib_is_accepted(pool: PgPool) {
    let (app, state) = app(pool.clone(), None).await;
    let (cookie, store_id) = promoter_session(&app, &state).await;

    let (status, body) = post_invoice(&app, &cookie, store_id).await;
    assert_eq!(status, StatusCode::CREATED, "{}", String::from_utf8_lossy(&body));

    let invoices: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM invoices")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(invoices, 1);
}

#[sqlx::test]
#[ignore = "requer DATABASE_URL"]
async fn configured_upload_limit_is_enforced(pool: PgPool) {
    let (app, state) = app(pool.clone(), Some(1024 * 1024)).await;
    let (cookie, store_id) = promoter_session(&app, &state).await;

    let (status, _) = post_invoice(&app, &cookie, store_id).await;
    assert!(!status.is_success(), "{status}");

    let invoices: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM invoices")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(invoices, 0);
}
