mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::post;
use axum::{Json, Router, middleware};
use serde_json::{Value, json};
use tower::ServiceExt;

use cuidame::cuidame_config::JwtConfig;
use cuidame::middleware::auth::require_auth;
use cuidame::middleware::context::{AccountStatus, AuthContext, UserRole};
use cuidame::middleware::identity::PrincipalRecord;
use cuidame::router::init_router;
use cuidame::state::AppState;
use common::{
    FakeStore, body_json, claims, cors_config, fake_app, fake_state, lazy_pool, principal,
    record_in_group, send, token_for, token_with_claims,
};

fn groupless(id: i64) -> PrincipalRecord {
    PrincipalRecord::without_group(principal(id))
}

fn assert_error(body: &Value, codigo: &str) {
    assert_eq!(body["exito"], false);
    assert_eq!(body["codigo"], codigo);
    assert!(body["error"].is_string());
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_no_credential_never_queries_storage() {
    let store = Arc::new(FakeStore::with(vec![groupless(1)]));
    let app = fake_app(store.clone());

    let (status, body) = send(&app, "GET", "/api/auth/verificar", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error(&body, "TOKEN_NO_ENCONTRADO");
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn test_empty_bearer_counts_as_missing() {
    let store = Arc::new(FakeStore::default());
    let app = fake_app(store.clone());

    let request = Request::builder()
        .uri("/api/auth/verificar")
        .header("authorization", "Bearer ")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_error(&body_json(response).await, "TOKEN_NO_ENCONTRADO");
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn test_malformed_token_is_invalid() {
    let store = Arc::new(FakeStore::with(vec![groupless(1)]));
    let app = fake_app(store.clone());

    let (status, body) = send(&app, "GET", "/api/auth/verificar", Some("not-a-jwt"), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error(&body, "TOKEN_INVALIDO");
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn test_foreign_signature_is_invalid() {
    let app = fake_app(Arc::new(FakeStore::with(vec![groupless(1)])));
    let foreign = cuidame::cuidame_auth::create_access_token(
        1,
        "usuario1@example.com",
        "Usuario",
        "usuario",
        &JwtConfig::new("another-secret-that-is-also-long-enough", 3600),
    )
    .unwrap();

    let (status, body) = send(&app, "GET", "/api/auth/verificar", Some(&foreign), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error(&body, "TOKEN_INVALIDO");
}

#[tokio::test]
async fn test_expired_token() {
    let store = Arc::new(FakeStore::with(vec![groupless(1)]));
    let app = fake_app(store.clone());
    let token = token_with_claims(&claims(Some(1), -60));

    let (status, body) = send(&app, "GET", "/api/auth/verificar", Some(&token), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error(&body, "TOKEN_EXPIRADO");
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn test_token_without_principal_id_is_invalid() {
    let store = Arc::new(FakeStore::with(vec![groupless(1)]));
    let app = fake_app(store.clone());
    let token = token_with_claims(&claims(None, 600));

    let (status, body) = send(&app, "GET", "/api/auth/verificar", Some(&token), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error(&body, "TOKEN_INVALIDO");
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn test_token_with_only_principal_id_authenticates() {
    let store = Arc::new(FakeStore::with(vec![groupless(42)]));
    let app = fake_app(store.clone());
    let mut id_only = claims(Some(42), 0);
    id_only.iat = None;
    id_only.exp = None;
    let token = token_with_claims(&id_only);

    let (status, body) = send(&app, "GET", "/api/auth/verificar", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["datos"]["id"], 42);
    assert_eq!(store.calls(), 1);
}

#[tokio::test]
async fn test_unknown_principal() {
    let app = fake_app(Arc::new(FakeStore::default()));

    let (status, body) = send(&app, "GET", "/api/auth/verificar", Some(&token_for(99)), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error(&body, "USUARIO_NO_ENCONTRADO");
}

#[tokio::test]
async fn test_inactive_account_is_rejected() {
    let mut record = groupless(7);
    record.principal.estado = AccountStatus::Inactivo;
    let app = fake_app(Arc::new(FakeStore::with(vec![record])));

    let (status, body) = send(&app, "GET", "/api/auth/verificar", Some(&token_for(7)), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error(&body, "USUARIO_NO_ENCONTRADO");
}

#[tokio::test]
async fn test_inactive_group_authenticates_without_group() {
    let record = record_in_group(principal(8), 3, "FAM-OLD", false);
    let app = fake_app(Arc::new(FakeStore::with(vec![record])));

    let (status, body) = send(&app, "GET", "/api/auth/verificar", Some(&token_for(8)), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["datos"]["id"], 8);
    assert!(body["datos"]["grupo_familiar"].is_null());
}

#[tokio::test]
async fn test_storage_fault_is_internal() {
    let app = fake_app(Arc::new(FakeStore::failing()));

    let (status, body) = send(&app, "GET", "/api/auth/verificar", Some(&token_for(1)), None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_error(&body, "ERROR_AUTENTICACION");
    assert!(!body["error"].as_str().unwrap().contains("pool"));
}

#[tokio::test]
async fn test_missing_signing_secret_is_internal() {
    let store = Arc::new(FakeStore::with(vec![groupless(1)]));
    let state = AppState::new(
        lazy_pool(),
        JwtConfig {
            secret: None,
            expires_in: 3600,
        },
        cors_config(),
    )
    .with_principal_store(store.clone());
    let app = init_router(state);

    let (status, body) = send(&app, "GET", "/api/auth/verificar", Some(&token_for(1)), None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_error(&body, "ERROR_AUTENTICACION");
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn test_binds_principal_and_family_group() {
    let record = record_in_group(principal(42), 5, "FAM1", true);
    let store = Arc::new(FakeStore::with(vec![record]));
    let app = fake_app(store.clone());

    let (status, body) = send(&app, "GET", "/api/auth/verificar", Some(&token_for(42)), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exito"], true);
    assert_eq!(body["datos"]["id"], 42);
    assert_eq!(body["datos"]["grupo_familiar"]["codigo_familia"], "FAM1");
    assert_eq!(body["datos"]["grupo_familiar"]["grupo_id"], 5);
    assert_eq!(body["datos"]["grupo_familiar"]["estado"], "activo");
    assert_eq!(store.calls(), 1);
}

#[tokio::test]
async fn test_repeated_requests_bind_the_same_context() {
    let record = record_in_group(principal(42), 5, "FAM1", true);
    let app = fake_app(Arc::new(FakeStore::with(vec![record])));
    let token = token_for(42);

    let (_, first) = send(&app, "GET", "/api/auth/verificar", Some(&token), None).await;
    let (_, second) = send(&app, "GET", "/api/auth/verificar", Some(&token), None).await;

    assert_eq!(first["datos"], second["datos"]);
}

#[tokio::test]
async fn test_authorization_header_wins_over_other_sources() {
    let app = fake_app(Arc::new(FakeStore::with(vec![groupless(1), groupless(2), groupless(3)])));

    let request = Request::builder()
        .uri(format!("/api/auth/verificar?token={}", token_for(3)))
        .header("authorization", format!("Bearer {}", token_for(1)))
        .header("x-access-token", token_for(2))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["datos"]["id"], 1);
}

#[tokio::test]
async fn test_custom_header_wins_over_query_and_cookie() {
    let app = fake_app(Arc::new(FakeStore::with(vec![groupless(2), groupless(3), groupless(4)])));

    let request = Request::builder()
        .uri(format!("/api/auth/verificar?token={}", token_for(3)))
        .header("x-access-token", token_for(2))
        .header("cookie", format!("token={}", token_for(4)))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(body_json(response).await["datos"]["id"], 2);
}

#[tokio::test]
async fn test_cookie_credential() {
    let app = fake_app(Arc::new(FakeStore::with(vec![groupless(4)])));

    let request = Request::builder()
        .uri("/api/auth/verificar")
        .header("cookie", format!("tema=oscuro; token={}", token_for(4)))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["datos"]["id"], 4);
}

async fn echo(auth: AuthContext, Json(body): Json<Value>) -> Json<Value> {
    Json(json!({ "id": auth.user_id(), "body": body }))
}

#[tokio::test]
async fn test_body_credential_leaves_body_readable() {
    let state = fake_state(Arc::new(FakeStore::with(vec![groupless(6)])));
    let app = Router::new()
        .route("/eco", post(echo))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    let payload = json!({ "token": token_for(6), "nota": "hola" });
    let request = Request::builder()
        .method("POST")
        .uri("/eco")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["id"], 6);
    assert_eq!(body["body"]["nota"], "hola");
}

#[tokio::test]
async fn test_non_json_body_is_not_searched() {
    let store = Arc::new(FakeStore::with(vec![groupless(6)]));
    let state = fake_state(store.clone());
    let app = Router::new()
        .route("/eco", post(echo))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    let request = Request::builder()
        .method("POST")
        .uri("/eco")
        .header("content-type", "text/plain")
        .body(Body::from(format!(r#"{{"token":"{}"}}"#, token_for(6))))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_error(&body_json(response).await, "TOKEN_NO_ENCONTRADO");
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn test_admin_routes_use_stored_role() {
    let app = fake_app(Arc::new(FakeStore::with(vec![groupless(10)])));
    // The token claims administrator; storage says otherwise.
    let token = cuidame::cuidame_auth::create_access_token(
        10,
        "usuario10@example.com",
        "Usuario",
        UserRole::Administrador.as_str(),
        &common::jwt_config(),
    )
    .unwrap();

    let (status, body) = send(&app, "GET", "/api/usuarios", Some(&token), None).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_error(&body, "ACCESO_DENEGADO");
}

#[tokio::test]
async fn test_group_routes_require_a_group() {
    let app = fake_app(Arc::new(FakeStore::with(vec![groupless(11)])));
    let token = token_for(11);

    for uri in ["/api/horarios", "/api/medicamentos", "/api/gastos", "/api/eventos"] {
        let (status, body) = send(&app, "GET", uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
        assert_error(&body, "SIN_GRUPO_FAMILIAR");
    }
}

#[tokio::test]
async fn test_protected_modules_reject_anonymous_callers() {
    let app = fake_app(Arc::new(FakeStore::default()));

    for uri in [
        "/api/usuarios/perfil",
        "/api/familias/mi-familia",
        "/api/horarios",
        "/api/gastos/resumen",
        "/api/eventos/1",
    ] {
        let (status, body) = send(&app, "GET", uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_error(&body, "TOKEN_NO_ENCONTRADO");
    }
}

#[tokio::test]
async fn test_profile_returns_bound_context() {
    let record = record_in_group(principal(12), 2, "FAM-ABC123", true);
    let app = fake_app(Arc::new(FakeStore::with(vec![record])));

    let (status, body) =
        send(&app, "GET", "/api/usuarios/perfil", Some(&token_for(12)), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["datos"]["email"], "usuario12@example.com");
    assert_eq!(body["datos"]["grupo_familiar"]["codigo_familia"], "FAM-ABC123");
}
