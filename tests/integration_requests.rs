mod common;

use axum::http::StatusCode;
use common::setup_test_app;
use serde_json::json;

const REQUEST_DENIAL: &str =
    "Access denied. User does not have the necessary administrative or managerial rights for the request.";

#[tokio::test]
async fn test_create_request_ignores_caller_approval() {
    let app = setup_test_app();
    let author = app.create_user("author", false).await;
    app.create_user("guest", false).await;
    let classroom = app.create_classroom("101", None, None).await;
    let token = app.token_for("author");

    let (status, body) = app
        .send(
            "POST",
            "/api/requests",
            Some(&token),
            Some(json!({
                "start_date": "2024-03-10T09:00:00",
                "end_date": "2024-03-10T11:00:00",
                "author_id": author.get(),
                "classroom_id": classroom.get(),
                "requesting_user_logins": ["guest"],
                "is_approved": true,
                "registration_date": "2000-01-01T00:00:00"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["is_approved"], false);
    assert_ne!(body["registration_date"], "2000-01-01T00:00:00");
    assert_eq!(body["author"], author.get());
    assert_eq!(body["classroom"], classroom.get());
    assert_eq!(body["requesting_users"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_request_rejects_reversed_dates() {
    let app = setup_test_app();
    let author = app.create_user("author", false).await;
    let classroom = app.create_classroom("101", None, None).await;

    let (status, body) = app
        .send(
            "POST",
            "/api/requests",
            Some(&app.token_for("author")),
            Some(json!({
                "start_date": "2024-03-10T11:00:00",
                "end_date": "2024-03-10T11:00:00",
                "author_id": author.get(),
                "classroom_id": classroom.get()
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Invalid dates. The end date must be after the start date."
    );
}

#[tokio::test]
async fn test_approval_gate() {
    let app = setup_test_app();
    app.create_user("admin", true).await;
    let author = app.create_user("author", false).await;
    let room_manager = app.create_user("room_manager", false).await;
    let head = app.create_user("head", false).await;
    app.create_user("stranger", false).await;
    let department = app.create_department("CS", Some(head)).await;
    let classroom = app
        .create_classroom("101", Some(department), Some(room_manager))
        .await;
    let first = app.create_request(author, classroom).await;
    let second = app.create_request(author, classroom).await;
    let third = app.create_request(author, classroom).await;
    let body = json!({ "manager_id": head.get() });

    let (status, response) = app
        .send(
            "PUT",
            &format!("/api/requests/{}/approve", first),
            Some(&app.token_for("stranger")),
            Some(body.clone()),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], REQUEST_DENIAL);

    for (login, request) in [("room_manager", first), ("head", second), ("admin", third)] {
        let (status, response) = app
            .send(
                "PUT",
                &format!("/api/requests/{}/approve", request),
                Some(&app.token_for(login)),
                Some(body.clone()),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{} should approve", login);
        assert_eq!(response["is_approved"], true);
    }
}

#[tokio::test]
async fn test_approve_with_unknown_manager() {
    let app = setup_test_app();
    app.create_user("admin", true).await;
    let author = app.create_user("author", false).await;
    let classroom = app.create_classroom("101", None, None).await;
    let request = app.create_request(author, classroom).await;

    let (status, body) = app
        .send(
            "PUT",
            &format!("/api/requests/{}/approve", request),
            Some(&app.token_for("admin")),
            Some(json!({ "manager_id": 999 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No manager found with ID: 999");
}

#[tokio::test]
async fn test_update_request_participants() {
    let app = setup_test_app();
    app.create_user("admin", true).await;
    let author = app.create_user("author", false).await;
    let guest = app.create_user("guest", false).await;
    let classroom = app.create_classroom("101", None, None).await;
    let request = app.create_request(author, classroom).await;
    let token = app.token_for("admin");

    let (status, body) = app
        .send(
            "PUT",
            &format!("/api/requests/{}", request),
            Some(&token),
            Some(json!({ "new_requesting_user_logins": ["guest"] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["requesting_users"], json!([guest.get()]));

    let (_, user) = app
        .send("GET", &format!("/api/users/{}", guest), Some(&token), None)
        .await;
    assert_eq!(user["requests"], json!([request.get()]));

    let (status, body) = app
        .send(
            "PUT",
            &format!("/api/requests/{}", request),
            Some(&token),
            Some(json!({ "new_requesting_user_logins": ["nobody"] })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No user found with login: nobody");
}

#[tokio::test]
async fn test_list_requests_when_empty() {
    let app = setup_test_app();

    let (status, body) = app.send("GET", "/api/requests/all", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No requests found in the database.");
}

#[tokio::test]
async fn test_filter_requests() {
    let app = setup_test_app();
    let alice = app.create_user("alice", false).await;
    let bob = app.create_user("bob", false).await;
    let room = app.create_classroom("101", None, None).await;
    let other_room = app.create_classroom("102", None, None).await;
    let mine = app.create_request(alice, room).await;
    app.create_request(bob, room).await;
    app.create_request(bob, other_room).await;
    let token = app.token_for("alice");

    let (status, body) = app
        .send(
            "GET",
            &format!("/api/requests?author_id={}", alice),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let requests = body["requests"].as_array().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["id"], mine.get());

    let (_, body) = app
        .send(
            "GET",
            &format!("/api/requests?classroom_id={}", room),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(body["requests"].as_array().unwrap().len(), 2);

    let (_, body) = app
        .send(
            "GET",
            &format!("/api/requests?author_id={}&classroom_id={}", alice, other_room),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(body["requests"], json!([]));

    let (_, body) = app
        .send(
            "GET",
            "/api/requests?from=2000-01-01T00:00:00&to=2000-01-02T00:00:00",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(body["requests"], json!([]));
}

#[tokio::test]
async fn test_request_reads_back_as_written() {
    let app = setup_test_app();
    app.create_user("admin", true).await;
    let author = app.create_user("author", false).await;
    let guest = app.create_user("guest", false).await;
    let classroom = app.create_classroom("101", None, None).await;
    let token = app.token_for("admin");

    let (status, created) = app
        .send(
            "POST",
            "/api/requests",
            Some(&app.token_for("author")),
            Some(json!({
                "start_date": "2024-03-10T09:00:00",
                "end_date": "2024-03-10T11:00:00",
                "author_id": author.get(),
                "classroom_id": classroom.get(),
                "requesting_user_logins": ["guest", "author"]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        created["requesting_users"],
        json!([author.get(), guest.get()])
    );
    let id = created["id"].as_i64().unwrap();
    let (_, found) = app
        .send("GET", &format!("/api/requests/{}", id), Some(&token), None)
        .await;
    assert_eq!(found, created);

    let (status, approved) = app
        .send(
            "PUT",
            &format!("/api/requests/{}/approve", id),
            Some(&token),
            Some(json!({ "manager_id": author.get() })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let mut expected = created;
    expected["is_approved"] = json!(true);
    assert_eq!(approved, expected);

    let (_, found) = app
        .send("GET", &format!("/api/requests/{}", id), Some(&token), None)
        .await;
    assert_eq!(found, approved);
}

#[tokio::test]
async fn test_update_after_approval_keeps_it() {
    let app = setup_test_app();
    app.create_user("admin", true).await;
    let author = app.create_user("author", false).await;
    let successor = app.create_user("successor", false).await;
    let classroom = app.create_classroom("101", None, None).await;
    let request = app.create_request(author, classroom).await;
    let token = app.token_for("admin");

    app.send(
        "PUT",
        &format!("/api/requests/{}/approve", request),
        Some(&token),
        Some(json!({ "manager_id": author.get() })),
    )
    .await;
    let (status, body) = app
        .send(
            "PUT",
            &format!("/api/requests/{}", request),
            Some(&token),
            Some(json!({ "new_author_id": successor.get() })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["author"], successor.get());
    assert_eq!(body["is_approved"], true);
}
