mod common;

use axum::http::StatusCode;
use common::{app, build_state, send, test_config, token_for, RequestSpec};

fn rate_limited_config(ceiling: u32) -> tenant_gate::config::AppConfig {
    let mut config = test_config();
    config.rate.enabled = true;
    config.rate.requests_per_window = ceiling;
    config.rate.window_secs = 60;
    config
}

#[tokio::test]
async fn ceiling_rejects_with_retry_hint() {
    let state = build_state(rate_limited_config(3)).await;
    let app = app(&state);
    let token = token_for(&state, "acme", &[]);

    for _ in 0..3 {
        let request = RequestSpec::get("/api/whoami")
            .token(&token)
            .tenant_header("acme")
            .build();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
    }

    let request = RequestSpec::get("/api/whoami")
        .token(&token)
        .tenant_header("acme")
        .build();
    let response = tower::ServiceExt::oneshot(app.clone(), request).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let retry_after = response
        .headers()
        .get("retry-after")
        .expect("Retry-After header")
        .to_str()
        .unwrap()
        .parse::<u64>()
        .unwrap();
    assert!(retry_after >= 1 && retry_after <= 60);

    let bytes = http_body_util::BodyExt::collect(response.into_body())
        .await
        .unwrap()
        .to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "RATE_LIMIT_EXCEEDED");
}

#[tokio::test]
async fn one_tenant_burst_leaves_another_untouched() {
    let state = build_state(rate_limited_config(2)).await;
    let app = app(&state);

    let acme = token_for(&state, "acme", &[]);
    for _ in 0..3 {
        let request = RequestSpec::get("/api/whoami")
            .token(&acme)
            .tenant_header("acme")
            .build();
        let _ = send(&app, request).await;
    }

    // Acme's window is exhausted; globex still gets through
    let globex = token_for(&state, "globex", &[]);
    let request = RequestSpec::get("/api/whoami")
        .token(&globex)
        .tenant_header("globex")
        .build();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn exactly_k_of_k_plus_one_concurrent_checks_pass() {
    let ceiling = 5u32;
    let state = build_state(rate_limited_config(ceiling)).await;
    let app = app(&state);
    let token = token_for(&state, "acme", &[]);

    let mut handles = Vec::new();
    for _ in 0..(ceiling + 1) {
        let app = app.clone();
        let token = token.clone();
        handles.push(tokio::spawn(async move {
            let request = RequestSpec::get("/api/whoami")
                .token(&token)
                .tenant_header("acme")
                .build();
            let (status, _) = send(&app, request).await;
            status
        }));
    }

    let mut allowed = 0u32;
    let mut rejected = 0u32;
    for handle in handles {
        match handle.await.unwrap() {
            StatusCode::OK => allowed += 1,
            StatusCode::TOO_MANY_REQUESTS => rejected += 1,
            other => panic!("unexpected status {}", other),
        }
    }
    assert_eq!(allowed, ceiling);
    assert_eq!(rejected, 1);
}

#[tokio::test]
async fn disabled_limiter_admits_everything() {
    let state = build_state(test_config()).await;
    let app = app(&state);
    let token = token_for(&state, "acme", &[]);

    for _ in 0..50 {
        let request = RequestSpec::get("/api/whoami")
            .token(&token)
            .tenant_header("acme")
            .build();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
    }
}
