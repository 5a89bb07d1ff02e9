use axum::http::StatusCode;
use axum_test::TestServer;
use bookvault::api::create_router;
use bookvault::store::Store;
use serde_json::{json, Value};
use tempfile::TempDir;

fn setup() -> (TestServer, TempDir) {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let store = Store::open(tmp.path().join("data"), tmp.path().join("backups"))
        .expect("Failed to open store");
    let server = TestServer::new(create_router(store)).expect("Failed to create test server");
    (server, tmp)
}

async fn save_books(server: &TestServer, books: Value) {
    server
        .post("/api/save")
        .json(&json!({ "books": books }))
        .await
        .assert_status_ok();
}

mod connectivity {
    use super::*;

    #[tokio::test]
    async fn reports_success_and_writable_directories() {
        let (server, _tmp) = setup();

        let response = server.get("/api/test").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "success");
        assert_eq!(body["data_dir_writable"], true);
        assert_eq!(body["backup_dir_writable"], true);
    }
}

mod load {
    use super::*;

    #[tokio::test]
    async fn returns_a_default_document_on_first_access() {
        let (server, _tmp) = setup();

        let response = server.get("/api/load").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"]["books"], json!([]));
        assert_eq!(body["data"]["settings"]["theme"], "default");
        assert_eq!(body["data"]["settings"]["autoBackup"], true);
        assert_eq!(body["data"]["version"], "1.0");
    }

    #[tokio::test]
    async fn rejects_post() {
        let (server, _tmp) = setup();

        let response = server.post("/api/load").await;

        response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
    }
}

mod save {
    use super::*;

    #[tokio::test]
    async fn merges_books_and_reports_the_count() {
        let (server, _tmp) = setup();

        let response = server
            .post("/api/save")
            .json(&json!({
                "books": [
                    {"title": "Dune", "author": "Frank Herbert"},
                    {"title": "Solaris", "author": "Stanisław Lem"},
                    {"title": "Ubik", "author": "Philip K. Dick"},
                ]
            }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["books_count"], 3);

        let loaded: Value = server.get("/api/load").await.json();
        assert_eq!(loaded["data"]["books"].as_array().expect("books").len(), 3);
    }

    #[tokio::test]
    async fn settings_only_patch_preserves_the_books() {
        let (server, _tmp) = setup();
        save_books(
            &server,
            json!([{"title": "Dune"}, {"title": "Solaris"}, {"title": "Ubik"}]),
        )
        .await;

        let response = server
            .post("/api/save")
            .json(&json!({"settings": {"theme": "dark"}}))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["books_count"], 3);

        let loaded: Value = server.get("/api/load").await.json();
        assert_eq!(loaded["data"]["books"].as_array().expect("books").len(), 3);
        assert_eq!(loaded["data"]["settings"]["theme"], "dark");
        assert_eq!(loaded["data"]["settings"]["autoBackup"], true);
    }

    #[tokio::test]
    async fn rejects_a_patch_with_the_wrong_shape() {
        let (server, _tmp) = setup();

        let response = server.post("/api/save").json(&json!({"books": 42})).await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn rejects_get() {
        let (server, _tmp) = setup();

        let response = server.get("/api/save").await;

        response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
    }
}

mod backups {
    use super::*;

    #[tokio::test]
    async fn backup_without_a_document_returns_not_found() {
        let (server, _tmp) = setup();

        let response = server.post("/api/backup").await;

        response.assert_status_not_found();
        let body: Value = response.json();
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn created_backup_shows_up_in_the_list() {
        let (server, _tmp) = setup();
        save_books(&server, json!([{"title": "Dune"}])).await;

        let response = server.post("/api/backup").await;
        response.assert_status_ok();
        let created: Value = response.json();
        let filename = created["filename"].as_str().expect("filename");
        assert!(filename.starts_with("backup_"));
        assert!(created["size"].as_u64().expect("size") > 0);

        let list: Value = server.get("/api/backups").await.json();
        assert_eq!(list["count"], 1);
        assert_eq!(list["backups"][0]["filename"], filename);
    }

    #[tokio::test]
    async fn empty_backup_list_is_not_an_error() {
        let (server, _tmp) = setup();

        let response = server.get("/api/backups").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["count"], 0);
        assert_eq!(body["backups"], json!([]));
    }
}

mod restore {
    use super::*;

    #[tokio::test]
    async fn missing_snapshot_returns_not_found() {
        let (server, _tmp) = setup();
        save_books(&server, json!([{"title": "Dune"}])).await;

        let response = server
            .post("/api/restore")
            .json(&json!({"filename": "backup_2020-01-01_00-00-00.json"}))
            .await;

        response.assert_status_not_found();
        let body: Value = response.json();
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn restores_an_earlier_snapshot() {
        let (server, _tmp) = setup();
        save_books(&server, json!([{"title": "Dune"}])).await;

        let created: Value = server.post("/api/backup").await.json();
        let filename = created["filename"].as_str().expect("filename");

        save_books(&server, json!([{"title": "Solaris"}, {"title": "Ubik"}])).await;

        let response = server
            .post("/api/restore")
            .json(&json!({ "filename": filename }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["books_count"], 1);

        let loaded: Value = server.get("/api/load").await.json();
        assert_eq!(loaded["data"]["books"][0]["title"], "Dune");
    }
}

mod export {
    use super::*;

    #[tokio::test]
    async fn defaults_to_a_json_attachment() {
        let (server, _tmp) = setup();
        save_books(&server, json!([{"title": "Dune"}])).await;

        let response = server.get("/api/export").await;

        response.assert_status_ok();
        let disposition = response
            .headers()
            .get("content-disposition")
            .expect("content-disposition header")
            .to_str()
            .expect("header value");
        assert!(disposition.starts_with("attachment"));

        let body: Value = serde_json::from_str(&response.text()).expect("valid JSON export");
        assert_eq!(body["books"][0]["title"], "Dune");
    }

    #[tokio::test]
    async fn csv_export_carries_bom_header_and_rows() {
        let (server, _tmp) = setup();
        save_books(
            &server,
            json!([{"title": "Dune", "author": "Frank Herbert", "progress": 100}]),
        )
        .await;

        let response = server.get("/api/export?format=csv").await;

        response.assert_status_ok();
        let text = response.text();
        assert!(text.starts_with("\u{feff}Title,Author,Genre,Progress,Rating,Date finished,Comments"));
        assert!(text.contains("\"Dune\",\"Frank Herbert\",\"\",\"100%\""));
    }

    #[tokio::test]
    async fn unknown_format_is_rejected() {
        let (server, _tmp) = setup();

        let response = server.get("/api/export?format=xml").await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["error"], "unknown_format");
    }
}
