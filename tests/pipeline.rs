//! The full data path: domain documents compiled into a manifest on disk,
//! loaded back, and served through the engine.

use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;

use axum::http::StatusCode;

use torii::config::Compiler;
use torii::dispatch::Loader;
use torii::engine::AxumEngine;
use torii::middleware::{builtin, Manager, Registry};

mod common;

#[tokio::test]
async fn test_compile_load_serve_roundtrip() {
    let root = std::env::temp_dir().join(format!("torii-pipeline-{}", std::process::id()));
    let _ = fs::remove_dir_all(&root);
    let domains = root.join("routes");
    fs::create_dir_all(&domains).unwrap();

    fs::write(
        domains.join("api.json"),
        r#"{
            "domain": "api.example.com",
            "basePath": "/api",
            "middlewares": { "onRequest": ["cors"] },
            "headers": { "X-Gw": "pipeline" },
            "routes": [
                { "path": "/echo", "method": "GET", "target": "http://127.0.0.1:28691/echo" }
            ]
        }"#,
    )
    .unwrap();
    fs::write(
        root.join("global.json"),
        r#"{ "middlewares": { "onResponse": ["timer"] } }"#,
    )
    .unwrap();

    let compiler = Compiler::new(&domains, root.join("build"), Some(root.join("global.json")));
    let manifest_path = compiler.compile().unwrap();

    let backend_addr: SocketAddr = "127.0.0.1:28691".parse().unwrap();
    let captured = common::start_recording_backend(backend_addr, "200 OK", "echoed").await;

    let mut registry = Registry::new();
    builtin::register_defaults(&mut registry);
    let manager = Manager::from_registry(&registry);

    let mut engine = AxumEngine::new();
    Loader::new(&mut engine, &manager)
        .load_from_file(&manifest_path)
        .unwrap();
    tokio::spawn(async move {
        engine.serve("127.0.0.1:28692").await.unwrap();
    });
    common::wait_until_listening("127.0.0.1:28692").await;

    let response = common::client()
        .get("http://127.0.0.1:28692/api/echo")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    // Route inherited the domain selector through compilation.
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert_eq!(response.text().await.unwrap(), "echoed");

    let captured = captured.lock().unwrap();
    let seen = &captured[0];
    assert_eq!(seen.target, "/echo");
    assert_eq!(seen.header("x-gw"), Some("pipeline"));
}

#[test]
fn test_shipped_sample_config_compiles() {
    let repo = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let out = std::env::temp_dir().join(format!("torii-samples-{}", std::process::id()));
    let _ = fs::remove_dir_all(&out);

    let compiler = Compiler::new(
        repo.join("config/routes"),
        &out,
        Some(repo.join("config/global.json")),
    );
    let manifest_path = compiler.compile().unwrap();

    let manifest: torii::config::CompiledManifest =
        serde_json::from_slice(&fs::read(manifest_path).unwrap()).unwrap();
    assert!(!manifest.routes.is_empty());
    // Sorted file order: billing.json merges ahead of users.json.
    assert!(manifest.routes[0].path.starts_with("/billing"));
    assert_eq!(
        manifest.middlewares.on_request,
        vec!["logger".to_string()]
    );
}
