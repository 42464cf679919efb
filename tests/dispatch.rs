//! Request handling against a running server.

use axum::http::StatusCode;

mod common;

use common::{client, Fixture, PING_DECLARATION};

#[tokio::test]
async fn test_ping_is_served() {
    let fixture = Fixture::new();
    fixture.write("config.yaml", PING_DECLARATION);
    fixture.write("ping.json", r#"{"ok":true}"#);
    let (running, shutdown) = fixture.start(50).await;

    let res = client()
        .get(format!("http://{}/api/ping", running.http_addr))
        .send()
        .await
        .expect("Server unreachable");

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "application/json");
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(res.text().await.unwrap(), r#"{"ok":true}"#);

    shutdown.trigger();
    running.wait().await;
}

#[tokio::test]
async fn test_unmatched_path_is_404() {
    let fixture = Fixture::new();
    fixture.write("config.yaml", PING_DECLARATION);
    fixture.write("ping.json", r#"{"ok":true}"#);
    let (running, shutdown) = fixture.start(50).await;

    let res = client()
        .get(format!("http://{}/api/missing", running.http_addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    shutdown.trigger();
    running.wait().await;
}

#[tokio::test]
async fn test_method_mismatch_is_404() {
    let fixture = Fixture::new();
    fixture.write("config.yaml", PING_DECLARATION);
    fixture.write("ping.json", r#"{"ok":true}"#);
    let (running, shutdown) = fixture.start(50).await;

    let res = client()
        .post(format!("http://{}/api/ping", running.http_addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    shutdown.trigger();
    running.wait().await;
}

#[tokio::test]
async fn test_deleted_response_file_is_500() {
    let fixture = Fixture::new();
    fixture.write("config.yaml", PING_DECLARATION);
    fixture.write("ping.json", r#"{"ok":true}"#);
    let (running, shutdown) = fixture.start(50).await;

    fixture.remove("ping.json");

    let res = client()
        .get(format!("http://{}/api/ping", running.http_addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("ping.json"));

    // Still published; the server keeps running.
    let table = running.reloader.live().read();
    assert_eq!(table.len(), 1);
    let res = client()
        .get(format!("http://{}/api/missing", running.http_addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    shutdown.trigger();
    running.wait().await;
}

#[tokio::test]
async fn test_parameterised_routes_and_post() {
    let fixture = Fixture::new();
    fixture.write(
        "config.yaml",
        r#"
services:
  - name: users
    basePath: /users
    endpoints:
      - {path: /me, method: GET, responseFile: me.json}
      - {path: "/{id}", method: GET, responseFile: user.json}
      - {path: "", method: post, responseFile: created.json}
"#,
    );
    fixture.write("me.json", r#"{"id":"me"}"#);
    fixture.write("user.json", r#"{"id":"any"}"#);
    fixture.write("created.json", r#"{"created":true}"#);
    let (running, shutdown) = fixture.start(50).await;
    let base = format!("http://{}", running.http_addr);

    let me = client().get(format!("{base}/users/me")).send().await.unwrap();
    assert_eq!(me.text().await.unwrap(), r#"{"id":"me"}"#);

    let other = client().get(format!("{base}/users/42")).send().await.unwrap();
    assert_eq!(other.text().await.unwrap(), r#"{"id":"any"}"#);

    let created = client().post(format!("{base}/users")).send().await.unwrap();
    assert_eq!(created.status(), StatusCode::OK);
    assert_eq!(created.text().await.unwrap(), r#"{"created":true}"#);

    shutdown.trigger();
    running.wait().await;
}

#[tokio::test]
async fn test_admin_reports_routes() {
    let fixture = Fixture::new();
    fixture.write("config.yaml", PING_DECLARATION);
    fixture.write("ping.json", r#"{"ok":true}"#);
    let (running, shutdown) = fixture.start(50).await;
    let admin = running.admin_addr.unwrap();

    let status: serde_json::Value = client()
        .get(format!("http://{admin}/admin/status"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["status"], "operational");
    assert_eq!(status["table_version"], 1);

    let routes: serde_json::Value = client()
        .get(format!("http://{admin}/admin/routes"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(routes[0]["path"], "/api/ping");
    assert_eq!(routes[0]["method"], "GET");

    // Admin paths are not mock routes.
    let res = client()
        .get(format!("http://{}/admin/status", running.http_addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    shutdown.trigger();
    running.wait().await;
}
