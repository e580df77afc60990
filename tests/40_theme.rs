mod common;

use axum::http::StatusCode;
use common::{app, build_state, send, test_config, token_for, RequestSpec};
use serde_json::json;

#[tokio::test]
async fn theme_read_returns_seeded_default() {
    let state = build_state(test_config()).await;
    let app = app(&state);

    let token = token_for(&state, "acme", &[]);
    let request = RequestSpec::get("/api/theme")
        .token(&token)
        .tenant_header("acme")
        .build();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["version"], 0);
    assert_eq!(body["data"]["typography"]["base_size_px"], 16);
}

#[tokio::test]
async fn theme_update_is_visible_immediately() {
    let state = build_state(test_config()).await;
    let app = app(&state);

    let admin = token_for(&state, "acme", &["admin"]);

    // Warm the cache first so the update actually has to invalidate it
    let request = RequestSpec::get("/api/theme")
        .token(&admin)
        .tenant_header("acme")
        .build();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["version"], 0);

    let request = RequestSpec::get("/api/admin/tenant")
        .token(&admin)
        .tenant_header("acme")
        .build_put_json(&json!({
            "theme": {
                "colors": { "primary": "#00ff00", "accent": "#ff00ff" }
            }
        }));
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["theme"]["version"], 1);

    // Save theme, see new theme: the very next read observes the new version
    let request = RequestSpec::get("/api/theme")
        .token(&admin)
        .tenant_header("acme")
        .build();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["version"], 1);
    assert_eq!(body["data"]["colors"]["primary"], "#00ff00");
}

#[tokio::test]
async fn theme_update_does_not_leak_to_other_tenant() {
    let state = build_state(test_config()).await;
    let app = app(&state);

    let admin = token_for(&state, "acme", &["admin"]);
    let request = RequestSpec::get("/api/admin/tenant")
        .token(&admin)
        .tenant_header("acme")
        .build_put_json(&json!({
            "theme": { "colors": { "primary": "#00ff00", "accent": "#ff00ff" } }
        }));
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);

    let globex = token_for(&state, "globex", &[]);
    let request = RequestSpec::get("/api/theme")
        .token(&globex)
        .tenant_header("globex")
        .build();
    let (_, body) = send(&app, request).await;
    assert_eq!(body["data"]["version"], 0);
    assert_ne!(body["data"]["colors"]["primary"], "#00ff00");
}

#[tokio::test]
async fn unknown_setting_key_is_rejected() {
    let state = build_state(test_config()).await;
    let app = app(&state);

    let admin = token_for(&state, "acme", &["admin"]);
    let request = RequestSpec::get("/api/admin/tenant")
        .token(&admin)
        .tenant_header("acme")
        .build_put_json(&json!({ "settings": { "dark_mode": true } }));
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["dark_mode"].is_string());

    // Nothing was applied
    let tenant = state.registry.get("acme").await.unwrap();
    assert!(tenant.settings.is_empty());
    assert_eq!(tenant.revision, 0);
}

#[tokio::test]
async fn settings_update_round_trips() {
    let state = build_state(test_config()).await;
    let app = app(&state);

    let admin = token_for(&state, "acme", &["admin"]);
    let request = RequestSpec::get("/api/admin/tenant")
        .token(&admin)
        .tenant_header("acme")
        .build_put_json(&json!({ "settings": { "beta_features": true, "api_access": false } }));
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);

    let request = RequestSpec::get("/api/settings")
        .token(&admin)
        .tenant_header("acme")
        .build();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["beta_features"], true);
    assert_eq!(body["data"]["api_access"], false);
}

#[tokio::test]
async fn non_admin_cannot_update() {
    let state = build_state(test_config()).await;
    let app = app(&state);

    let token = token_for(&state, "acme", &["viewer"]);
    let request = RequestSpec::get("/api/admin/tenant")
        .token(&token)
        .tenant_header("acme")
        .build_put_json(&json!({ "display_name": "Acme Renamed" }));
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let tenant = state.registry.get("acme").await.unwrap();
    assert_eq!(tenant.display_name, "Acme Corp");
}

#[tokio::test]
async fn admin_show_returns_record() {
    let state = build_state(test_config()).await;
    let app = app(&state);

    let admin = token_for(&state, "globex", &["admin"]);
    let request = RequestSpec::get("/api/admin/tenant")
        .token(&admin)
        .tenant_header("globex")
        .build();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["tenant_id"], "globex");
    assert_eq!(body["data"]["display_name"], "Globex Inc");
    assert_eq!(body["data"]["revision"], 0);
}
