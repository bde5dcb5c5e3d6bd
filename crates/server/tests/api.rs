//! End-to-end tests for the HTTP surface.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};

fn get(id: &str) -> Request<Body> {
    Request::builder()
        .uri(format!("/{}", id))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_raw_round_trip() {
    let (router, _temp) = common::setup().await;

    let payload = b"hello drop service";
    let response = common::send(
        &router,
        Request::builder()
            .method("POST")
            .uri("/_/raw?name=hello.txt")
            .header(header::AUTHORIZATION, common::bearer())
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from(payload.as_slice()))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let url = common::body_string(response).await;
    let id = common::id_from_url(&url);
    assert_eq!(id.len(), 6);

    let response = common::send(&router, get(&id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/plain"
    );
    assert_eq!(
        response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "inline; filename=\"hello.txt\""
    );
    assert_eq!(
        response.headers().get(header::CONTENT_LENGTH).unwrap(),
        &payload.len().to_string()
    );
    assert_eq!(common::body_bytes(response).await, payload);
}

#[tokio::test]
async fn test_raw_defaults_content_type() {
    let (router, _temp) = common::setup().await;

    let response = common::send(
        &router,
        Request::builder()
            .method("POST")
            .uri("/_/raw?name=blob")
            .header(header::AUTHORIZATION, common::bearer())
            .body(Body::from("opaque"))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let id = common::id_from_url(&common::body_string(response).await);

    let response = common::send(&router, get(&id)).await;
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/octet-stream"
    );
}

#[tokio::test]
async fn test_link_alias_redirects() {
    let (router, _temp) = common::setup().await;

    let response = common::send(
        &router,
        Request::builder()
            .method("POST")
            .uri("/_/link?path=https://example.com/x")
            .header(header::AUTHORIZATION, common::bearer())
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let id = common::id_from_url(&common::body_string(response).await);

    let response = common::send(&router, get(&id)).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "https://example.com/x"
    );
}

#[tokio::test]
async fn test_invalid_link_rejected() {
    let (router, _temp) = common::setup().await;

    let response = common::send(
        &router,
        Request::builder()
            .method("POST")
            .uri("/_/link?id=ftpxyz&path=ftp://x")
            .header(header::AUTHORIZATION, common::bearer())
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // No resource was created under the supplied id.
    let response = common::send(&router, get("ftpxyz")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_mutations_require_auth() {
    let (router, _temp) = common::setup().await;

    let requests: Vec<Request<Body>> = vec![
        Request::builder()
            .method("POST")
            .uri("/_/link?id=noauth&path=https://example.com")
            .body(Body::empty())
            .unwrap(),
        Request::builder()
            .method("POST")
            .uri("/_/raw?id=noauth&name=x")
            .header(header::AUTHORIZATION, "Bearer wrong-key")
            .body(Body::from("data"))
            .unwrap(),
        Request::builder()
            .method("POST")
            .uri("/_/file?id=noauth")
            .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
            .header(
                header::CONTENT_TYPE,
                "multipart/form-data; boundary=BOUNDARY",
            )
            .body(Body::from("--BOUNDARY--\r\n"))
            .unwrap(),
    ];

    for request in requests {
        let response = common::send(&router, request).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    // None of the rejected calls left an index entry behind.
    let response = common::send(&router, get("noauth")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_id_not_found() {
    let (router, _temp) = common::setup().await;

    let response = common::send(&router, get("zZzZzZ")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_id_conflict() {
    let (router, _temp) = common::setup().await;

    let upload = || {
        Request::builder()
            .method("POST")
            .uri("/_/raw?id=dupdup&name=x")
            .header(header::AUTHORIZATION, common::bearer())
            .body(Body::from("payload"))
            .unwrap()
    };

    let (first, second) = tokio::join!(
        common::send(&router, upload()),
        common::send(&router, upload())
    );

    let mut statuses = [first.status(), second.status()];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::CONFLICT]);
}

#[tokio::test]
async fn test_traversal_id_rejected() {
    let (router, _temp) = common::setup().await;

    let response = common::send(
        &router,
        Request::builder()
            .method("POST")
            .uri("/_/raw?id=../evil&name=x")
            .header(header::AUTHORIZATION, common::bearer())
            .body(Body::from("data"))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_multipart_upload_round_trip() {
    let (router, _temp) = common::setup().await;

    let boundary = "X-SHELF-BOUNDARY";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"id\"\r\n\r\n\
         mpart1\r\n\
         --{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"notes.md\"\r\n\
         Content-Type: text/markdown\r\n\r\n\
         # notes\r\n\
         --{boundary}--\r\n"
    );

    let response = common::send(
        &router,
        Request::builder()
            .method("POST")
            .uri("/_/file")
            .header(header::AUTHORIZATION, common::bearer())
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let url = common::body_string(response).await;
    assert_eq!(common::id_from_url(&url), "mpart1");

    let response = common::send(&router, get("mpart1")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/markdown"
    );
    // The part's filename becomes the download hint.
    assert_eq!(
        response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "inline; filename=\"notes.md\""
    );
    assert_eq!(common::body_bytes(response).await, b"# notes");
}

#[tokio::test]
async fn test_multipart_without_file_part_rejected() {
    let (router, _temp) = common::setup().await;

    let boundary = "X-SHELF-BOUNDARY";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"name\"\r\n\r\n\
         nothing\r\n\
         --{boundary}--\r\n"
    );

    let response = common::send(
        &router,
        Request::builder()
            .method("POST")
            .uri("/_/file")
            .header(header::AUTHORIZATION, common::bearer())
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_failed_multipart_frees_identifier() {
    let (router, temp) = common::setup().await;

    // Complete file part, then a follow-up part cut off before the closing
    // boundary. Parsing fails only after the blob has been written.
    let boundary = "X-SHELF-BOUNDARY";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"a.bin\"\r\n\r\n\
         payload\r\n\
         --{boundary}\r\n\
         Content-Disposition: form-data; name=\"name\"\r\n\r\n\
         trunc"
    );

    let response = common::send(
        &router,
        Request::builder()
            .method("POST")
            .uri("/_/file?id=retry1")
            .header(header::AUTHORIZATION, common::bearer())
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // No index entry, no leftover blob on disk.
    let response = common::send(&router, get("retry1")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(!temp.path().join("uploads").join("retry1").exists());

    // The identifier is free for another upload.
    let response = common::send(
        &router,
        Request::builder()
            .method("POST")
            .uri("/_/raw?id=retry1&name=a.bin")
            .header(header::AUTHORIZATION, common::bearer())
            .body(Body::from("payload"))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_multipart_id_after_file_is_ignored() {
    let (router, _temp) = common::setup().await;

    let boundary = "X-SHELF-BOUNDARY";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"a.txt\"\r\n\
         Content-Type: text/plain\r\n\r\n\
         alpha\r\n\
         --{boundary}\r\n\
         Content-Disposition: form-data; name=\"id\"\r\n\r\n\
         lateid\r\n\
         --{boundary}--\r\n"
    );

    let response = common::send(
        &router,
        Request::builder()
            .method("POST")
            .uri("/_/file")
            .header(header::AUTHORIZATION, common::bearer())
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // The blob stays under the identifier fixed when the file was stored.
    let id = common::id_from_url(&common::body_string(response).await);
    assert_ne!(id, "lateid");
    assert_eq!(id.len(), 6);

    let response = common::send(&router, get("lateid")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = common::send(&router, get(&id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(common::body_bytes(response).await, b"alpha");
}

#[tokio::test]
async fn test_multipart_extra_file_parts_ignored() {
    let (router, _temp) = common::setup().await;

    let boundary = "X-SHELF-BOUNDARY";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"one.txt\"\r\n\
         Content-Type: text/plain\r\n\r\n\
         alpha\r\n\
         --{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"two.txt\"\r\n\
         Content-Type: text/csv\r\n\r\n\
         beta\r\n\
         --{boundary}--\r\n"
    );

    let response = common::send(
        &router,
        Request::builder()
            .method("POST")
            .uri("/_/file")
            .header(header::AUTHORIZATION, common::bearer())
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let id = common::id_from_url(&common::body_string(response).await);

    // Only the first file part counts.
    let response = common::send(&router, get(&id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/plain"
    );
    assert_eq!(
        response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "inline; filename=\"one.txt\""
    );
    assert_eq!(common::body_bytes(response).await, b"alpha");
}

#[tokio::test]
async fn test_missing_params_still_forbidden_without_auth() {
    let (router, _temp) = common::setup().await;

    // Missing required parameters must not leak past the access check.
    let response = common::send(
        &router,
        Request::builder()
            .method("POST")
            .uri("/_/raw")
            .body(Body::from("data"))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = common::send(
        &router,
        Request::builder()
            .method("POST")
            .uri("/_/link")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // With credentials the same requests fail validation instead.
    let response = common::send(
        &router,
        Request::builder()
            .method("POST")
            .uri("/_/raw")
            .header(header::AUTHORIZATION, common::bearer())
            .body(Body::from("data"))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = common::send(
        &router,
        Request::builder()
            .method("POST")
            .uri("/_/link")
            .header(header::AUTHORIZATION, common::bearer())
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_disposition_filename_sanitized() {
    let (router, _temp) = common::setup().await;

    let response = common::send(
        &router,
        Request::builder()
            .method("POST")
            .uri("/_/raw?name=we%22ird.txt")
            .header(header::AUTHORIZATION, common::bearer())
            .body(Body::from("data"))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let id = common::id_from_url(&common::body_string(response).await);

    let response = common::send(&router, get(&id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "inline; filename=\"we_ird.txt\""
    );
}

#[tokio::test]
async fn test_resource_url_uses_host_header() {
    let (router, _temp) = common::setup().await;

    let response = common::send(
        &router,
        Request::builder()
            .method("POST")
            .uri("/_/link?id=hosted&path=https://example.com")
            .header(header::AUTHORIZATION, common::bearer())
            .header(header::HOST, "drop.example.net")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        common::body_string(response).await,
        "http://drop.example.net/hosted"
    );
}

#[tokio::test]
async fn test_healthz() {
    let (router, _temp) = common::setup().await;

    let response = common::send(
        &router,
        Request::builder()
            .uri("/_status/healthz")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(common::body_string(response).await, r#"{"status":"ok"}"#);
}
