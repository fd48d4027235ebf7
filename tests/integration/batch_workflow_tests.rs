/*!
 * Batch translation jobs through the API
 */

use axum::http::StatusCode;
use serde_json::json;

use vidscribe::jobs::JobStatus;
use vidscribe::providers::mock::MockTranslator;

use crate::common::{wait_for_job, TestApp};

const ALICE: Option<&str> = Some("alice");
const BOB: Option<&str> = Some("bob");

#[tokio::test]
async fn test_batch_shouldCompleteEveryLanguage() {
    let app = TestApp::working();
    app.register_sample("vid-1");

    let (status, body) = app
        .post(
            "/api/v1/video/subtitles/batch",
            json!({ "video_id": "vid-1", "languages": ["es", "FR", "es", "de"], "format": "ass" }),
            ALICE,
        )
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["languages"], json!(["es", "fr", "de"]));
    assert_eq!(body["format"], "ass");
    let job_id = body["job_id"].as_str().unwrap().to_string();
    assert_eq!(body["status_url"], format!("/api/v1/video/subtitles/jobs/{}", job_id));

    let job = wait_for_job(&app, &job_id).await;
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.progress, 1.0);
    assert_eq!(job.results.len(), 3);
    assert!(job.results.iter().all(|r| r.is_success()));
    assert_eq!(app.state.storage.list("vid-1").len(), 3);

    let (status, fetched) = app.get(&format!("/api/v1/video/subtitles/jobs/{}", job_id), ALICE).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["status"], "completed");
    assert_eq!(fetched["results"][0]["language"], "es");
    assert!(fetched["results"][0]["file"]["download_url"].is_string());
    assert!(fetched.get("owner").is_none());
}

#[tokio::test]
async fn test_batch_withPartialFailure_shouldCompleteAndRecordErrors() {
    // English is copied from the transcript; French hits the failing line
    let app = TestApp::new(MockTranslator::fail_on("Let's get started"));
    app.register_sample("vid-1");

    let (status, body) = app
        .post(
            "/api/v1/video/subtitles/batch",
            json!({ "video_id": "vid-1", "languages": ["en", "fr"] }),
            ALICE,
        )
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let job = wait_for_job(&app, body["job_id"].as_str().unwrap()).await;
    assert_eq!(job.status, JobStatus::Completed);
    assert!(job.results[0].is_success());
    assert_eq!(job.results[1].language, "fr");
    assert!(job.results[1].error.as_deref().unwrap().contains("Segment 3"));
}

#[tokio::test]
async fn test_batch_withEveryLanguageFailing_shouldFailJob() {
    let app = TestApp::new(MockTranslator::failing());
    app.register_sample("vid-1");

    let (_, body) = app
        .post(
            "/api/v1/video/subtitles/batch",
            json!({ "video_id": "vid-1", "languages": ["es", "de"] }),
            ALICE,
        )
        .await;

    let job = wait_for_job(&app, body["job_id"].as_str().unwrap()).await;
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.error.is_some());
    assert_eq!(job.results.len(), 2);
    assert!(app.state.storage.list("vid-1").is_empty());
}

#[tokio::test]
async fn test_getJob_byAnotherUser_shouldBeForbidden() {
    let app = TestApp::working();
    app.register_sample("vid-1");
    let (_, body) = app
        .post("/api/v1/video/subtitles/batch", json!({ "video_id": "vid-1", "languages": ["es"] }), ALICE)
        .await;
    let path = format!("/api/v1/video/subtitles/jobs/{}", body["job_id"].as_str().unwrap());

    let (status, error) = app.get(&path, BOB).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error["error"]["type"], "forbidden");

    let (status, _) = app.get(&path, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_getJob_unknownId_shouldBeNotFound() {
    let app = TestApp::working();
    let (status, error) = app.get("/api/v1/video/subtitles/jobs/not-a-job", ALICE).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["error"]["type"], "not_found");
}

#[tokio::test]
async fn test_listJobs_shouldOnlyShowOwnJobs() {
    let app = TestApp::working();
    app.register_sample("vid-1");
    for user in [ALICE, ALICE, BOB] {
        let (status, _) = app
            .post("/api/v1/video/subtitles/batch", json!({ "video_id": "vid-1", "languages": ["es"] }), user)
            .await;
        assert_eq!(status, StatusCode::ACCEPTED);
    }

    let (status, body) = app.get("/api/v1/video/subtitles/jobs", ALICE).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);

    let (_, body) = app.get("/api/v1/video/subtitles/jobs", BOB).await;
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn test_batch_invalidRequests_shouldBeRejectedBeforeQueueing() {
    let app = TestApp::with_env(&[("MAX_BATCH_LANGUAGES", "2")], MockTranslator::working());
    app.register_sample("vid-1");

    let cases = [
        (json!({ "video_id": "vid-1", "languages": [] }), StatusCode::BAD_REQUEST),
        (json!({ "video_id": "vid-1", "languages": ["es", "fr", "de"] }), StatusCode::BAD_REQUEST),
        (json!({ "video_id": "vid-1", "languages": ["es", "ja"] }), StatusCode::BAD_REQUEST),
        (json!({ "video_id": "vid-1", "languages": ["es"], "format": "pdf" }), StatusCode::BAD_REQUEST),
        (json!({ "video_id": "missing", "languages": ["es"] }), StatusCode::NOT_FOUND),
    ];
    for (body, expected) in cases {
        let (status, _) = app.post("/api/v1/video/subtitles/batch", body.clone(), ALICE).await;
        assert_eq!(status, expected, "request {}", body);
    }
    assert!(app.state.jobs.is_empty());
}

#[tokio::test]
async fn test_batch_whenFeatureDisabled_shouldBeRejected() {
    let app = TestApp::with_env(&[("ENABLE_BATCH_TRANSLATION", "false")], MockTranslator::working());
    app.register_sample("vid-1");

    let (status, _) = app
        .post("/api/v1/video/subtitles/batch", json!({ "video_id": "vid-1", "languages": ["es"] }), ALICE)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_batch_byGuest_shouldCountOneRequest() {
    let app = TestApp::with_env(&[("GUEST_USAGE_LIMIT", "1")], MockTranslator::working());
    app.register_sample("vid-1");
    let body = json!({ "video_id": "vid-1", "languages": ["es", "fr"] });

    let (status, created) = app.post("/api/v1/video/subtitles/batch", body.clone(), None).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let (status, _) = app.post("/api/v1/video/subtitles/batch", body, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // The guest can still follow its own job
    let path = format!("/api/v1/video/subtitles/jobs/{}", created["job_id"].as_str().unwrap());
    let (status, _) = app.get(&path, None).await;
    assert_eq!(status, StatusCode::OK);
}
