use portfolio_admin::{
    app::{App, AppServices},
    content::ContentClient,
    editor::EntityEdit,
    models::{EntityKind, DEFAULT_MAX_UPLOAD_BYTES},
    orchestrator::{Slot, UploadState},
    session::{FileSessionStore, MemorySessionStore, SessionStore, TOKEN_SENTINEL},
    upload::{SignedUploadClient, UploadFile},
    Error,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LOCATOR: &str = "https://res.cloudinary.com/demo/image/upload/v1/portfolio/x.jpg";

fn build_app(server: &MockServer, store: Arc<dyn SessionStore>) -> App {
    let http = reqwest::Client::new();
    App::with_services(
        AppServices {
            content: Arc::new(ContentClient::new_with_client(
                format!("{}/api", server.uri()),
                http.clone(),
            )),
            uploader: Arc::new(SignedUploadClient::new_with_client(
                format!("{}/api/cloudinary/get-signature", server.uri()),
                server.uri(),
                http,
            )),
            session_store: store,
        },
        format!("{}/api/admin/login", server.uri()),
        DEFAULT_MAX_UPLOAD_BYTES,
    )
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/admin/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "token": TOKEN_SENTINEL
        })))
        .mount(server)
        .await;
}

async fn mount_signature(server: &MockServer, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/api/cloudinary/get-signature"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "timestamp": 1700000000,
            "signature": "abc123",
            "cloudName": "demo",
            "uploadPreset": "portfolio_signed",
            "apiKey": "key",
            "folder": "portfolio"
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_host_upload(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/v1_1/demo/image/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "secure_url": LOCATOR,
            "public_id": "portfolio/x"
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// The five reads of a full refresh, each expected `times` times.
async fn mount_refresh(server: &MockServer, times: u64) {
    for (route, body) in [
        ("/api/hero", json!({"title": "Welcome", "image": LOCATOR})),
        ("/api/about", json!({"title": "About Me"})),
        ("/api/services", json!([])),
        ("/api/awards", json!([])),
    ] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(times)
            .mount(server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path("/api/gallery"))
        .and(query_param("limit", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"_id": "g1", "title": "Camp Day", "image": LOCATOR, "category": "events"}
        ])))
        .expect(times)
        .mount(server)
        .await;
}

async fn logged_in_app(server: &MockServer) -> App {
    mount_login(server).await;
    let app = build_app(server, Arc::new(MemorySessionStore::new()));
    app.gate().login("admin", "secret").await.unwrap();
    app
}

#[tokio::test]
async fn test_gallery_upload_end_to_end() {
    let server = MockServer::start().await;
    mount_signature(&server, 1).await;
    mount_host_upload(&server, 1).await;
    mount_refresh(&server, 1).await;

    Mock::given(method("POST"))
        .and(path("/api/gallery"))
        .and(body_partial_json(json!({
            "title": "Camp Day",
            "image": LOCATOR,
            "category": "events"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "_id": "g1", "title": "Camp Day", "image": LOCATOR, "category": "events"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = logged_in_app(&server).await;
    let session = app.admit().unwrap();
    let mut orchestrator = app.orchestrator(&session);
    let progress = orchestrator.progress();

    let file = UploadFile::new("camp.jpg", vec![0xFFu8; 2 * 1024 * 1024]);
    let locator = orchestrator
        .submit(
            &file,
            Slot::gallery(Some("events".to_string()), Some("Camp Day".to_string())),
        )
        .await
        .unwrap();

    assert_eq!(locator, LOCATOR);
    assert_eq!(*progress.borrow(), 100);
    assert_eq!(orchestrator.state(), UploadState::Done);
    assert_eq!(orchestrator.snapshot().gallery.len(), 1);
    assert_eq!(orchestrator.snapshot().hero.title.as_deref(), Some("Welcome"));
}

#[tokio::test]
async fn test_hero_upload_merges_current_record() {
    let server = MockServer::start().await;
    mount_signature(&server, 1).await;
    mount_host_upload(&server, 1).await;
    mount_refresh(&server, 1).await;

    Mock::given(method("PUT"))
        .and(path("/api/hero"))
        .and(body_partial_json(json!({
            "title": "Welcome",
            "image": LOCATOR
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "title": "Welcome", "image": LOCATOR
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = logged_in_app(&server).await;
    let session = app.admit().unwrap();
    let mut orchestrator = app.orchestrator(&session);

    // Served to the merge read; the refresh read falls through to mount_refresh.
    Mock::given(method("GET"))
        .and(path("/api/hero"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"title": "Welcome"})))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;

    orchestrator
        .submit(&UploadFile::new("hero.jpg", vec![1u8; 1024]), Slot::Hero)
        .await
        .unwrap();

    assert_eq!(
        orchestrator.snapshot().hero.image.as_deref(),
        Some(LOCATOR)
    );
}

#[tokio::test]
async fn test_failed_metadata_write_skips_refresh() {
    let server = MockServer::start().await;
    mount_signature(&server, 1).await;
    mount_host_upload(&server, 1).await;
    mount_refresh(&server, 0).await;

    Mock::given(method("POST"))
        .and(path("/api/gallery"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database down"))
        .expect(1)
        .mount(&server)
        .await;

    let app = logged_in_app(&server).await;
    let session = app.admit().unwrap();
    let mut orchestrator = app.orchestrator(&session);

    let err = orchestrator
        .submit(&UploadFile::new("p.jpg", vec![1u8; 512]), Slot::Profile)
        .await
        .unwrap_err();

    match err {
        Error::MetadataWriteFailed {
            slot,
            locator,
            reason,
        } => {
            assert_eq!(slot, "profile");
            assert_eq!(locator, LOCATOR);
            assert!(reason.contains("database down"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(orchestrator.state(), UploadState::Failed);
}

#[tokio::test]
async fn test_authorization_failure_never_reaches_host() {
    let server = MockServer::start().await;
    mount_host_upload(&server, 0).await;

    Mock::given(method("GET"))
        .and(path("/api/cloudinary/get-signature"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let app = logged_in_app(&server).await;
    let session = app.admit().unwrap();

    let err = app
        .orchestrator(&session)
        .submit(&UploadFile::new("p.jpg", vec![1u8; 512]), Slot::About)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::AuthorizationFetchFailed(_)));
}

#[tokio::test]
async fn test_service_image_keeps_unknown_fields() {
    let server = MockServer::start().await;
    mount_signature(&server, 1).await;
    mount_host_upload(&server, 1).await;
    mount_refresh(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/api/services/s1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "s1",
            "title": "Medical Camps",
            "images": [],
            "mainImage": "",
            "order": 3
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/services/s1"))
        .and(body_partial_json(json!({
            "title": "Medical Camps",
            "images": [{"url": LOCATOR, "title": "Service Image"}],
            "mainImage": LOCATOR,
            "order": 3
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"_id": "s1"})))
        .expect(1)
        .mount(&server)
        .await;

    let app = logged_in_app(&server).await;
    let session = app.admit().unwrap();

    app.orchestrator(&session)
        .submit(
            &UploadFile::new("camp.jpg", vec![1u8; 2048]),
            Slot::ServiceImage {
                service_id: "s1".to_string(),
                title: None,
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_session_survives_restart_and_logout() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    let dir = tempfile::tempdir().unwrap();
    let session_file = dir.path().join("session.json");

    let first = build_app(&server, Arc::new(FileSessionStore::new(session_file.clone())));
    assert!(matches!(first.admit(), Err(Error::NotAuthenticated)));
    first.gate().login("admin", "secret").await.unwrap();

    let second = build_app(&server, Arc::new(FileSessionStore::new(session_file.clone())));
    assert!(second.gate().check_authentication());

    second.gate().logout().unwrap();
    let third = build_app(&server, Arc::new(FileSessionStore::new(session_file)));
    assert!(!third.gate().check_authentication());
}

#[tokio::test]
async fn test_rejected_login_leaves_gate_closed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/admin/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"success": false, "message": "Invalid credentials"})),
        )
        .mount(&server)
        .await;

    let app = build_app(&server, Arc::new(MemorySessionStore::new()));
    let err = app.gate().login("admin", "nope").await.unwrap_err();

    assert_eq!(err.to_string(), "Invalid credentials");
    assert!(matches!(app.admit(), Err(Error::NotAuthenticated)));
}

#[tokio::test]
async fn test_service_text_update_keeps_images_and_unknown_fields() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/services/s1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "s1",
            "title": "Medical Camps",
            "description": "Old",
            "images": [{"url": LOCATOR, "title": "Camp"}],
            "mainImage": LOCATOR,
            "order": 3
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/services/s1"))
        .and(body_partial_json(json!({
            "title": "Medical Camps",
            "description": "Free eye checkups",
            "images": [{"url": LOCATOR, "title": "Camp"}],
            "mainImage": LOCATOR,
            "order": 3
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"_id": "s1"})))
        .expect(1)
        .mount(&server)
        .await;

    let app = logged_in_app(&server).await;
    let session = app.admit().unwrap();

    app.editor(&session)
        .update_entity(
            EntityKind::Service,
            "s1",
            EntityEdit {
                description: Some("Free eye checkups".to_string()),
                ..EntityEdit::default()
            },
        )
        .await
        .unwrap();
}
