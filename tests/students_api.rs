//! Drives the real router against the in-memory store.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use rollcall::{data::memory::MemoryStudentStore, routes::router, state::RollcallState};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app() -> Router {
    router(RollcallState::with_store(MemoryStudentStore::new()))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn student(student_id: &str, email: &str) -> Value {
    json!({
        "studentId": student_id,
        "name": {"firstName": "Alan", "middleName": "Mathison", "lastName": "Turing"},
        "gender": "male",
        "dateOfBirth": "1912-06-23",
        "email": email,
        "contactNo": "01234",
        "emergencyContactNo": "05678",
        "bloodGroup": "O+",
        "presentAddress": "Bletchley Park",
        "permanentAddress": "Wilmslow",
        "guardian": {
            "fatherName": "Julius",
            "fatherOccupation": "Civil servant",
            "fatherContactNo": "0001",
            "motherName": "Ethel",
            "motherOccupation": "Homemaker",
            "motherContactNo": "0002"
        },
        "localGuardian": {
            "name": "Colonel Ward",
            "occupation": "Retired",
            "contactNo": "0003",
            "address": "St Leonards"
        },
        "isActive": "active"
    })
}

async fn create(app: &Router, student_id: &str, email: &str) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/students",
        Some(json!({"student": student(student_id, email)})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"].clone()
}

#[tokio::test]
async fn root_reports_health() {
    let (status, body) = send(&app(), "GET", "/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn create_echoes_the_stored_student() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/students",
        Some(json!({"student": student("CS-1", " Alan@Example.com ")})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Student created successfully");
    assert_eq!(body["data"]["studentId"], "CS-1");
    assert_eq!(body["data"]["email"], "alan@example.com");
    assert_eq!(body["data"]["name"]["middleName"], "Mathison");
    assert_eq!(body["data"]["guardian"]["motherName"], "Ethel");
    assert!(body["data"]["id"].is_string());
    assert!(body["data"]["createdAt"].is_string());
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn invalid_create_lists_field_errors() {
    let mut invalid = student("CS-1", "not-an-email");
    invalid["name"]["firstName"] = json!("");
    invalid["gender"] = json!("robot");
    invalid.as_object_mut().unwrap().remove("contactNo");

    let (status, body) = send(
        &app(),
        "POST",
        "/api/v1/students",
        Some(json!({"student": invalid})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Validation failed");
    let paths: Vec<&str> = body["error"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["path"].as_str().unwrap())
        .collect();
    assert_eq!(paths, vec!["contactNo", "email", "gender", "name.firstName"]);
}

#[tokio::test]
async fn wrongly_typed_fields_are_listed_by_path() {
    let mut invalid = student("CS-1", "alan@example.com");
    invalid["contactNo"] = json!(123);
    invalid["gender"] = json!(7);

    let (status, body) = send(
        &app(),
        "POST",
        "/api/v1/students",
        Some(json!({"student": invalid})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation failed");
    assert_eq!(
        body["error"],
        json!([
            {"path": "contactNo", "message": "Expected string, received number"},
            {"path": "gender", "message": "Expected string, received number"}
        ])
    );
}

#[tokio::test]
async fn create_requires_a_status() {
    let app = app();
    let mut incomplete = student("CS-1", "alan@example.com");
    incomplete.as_object_mut().unwrap().remove("isActive");

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/students",
        Some(json!({"student": incomplete})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!([{"path": "isActive", "message": "Required"}]));

    let (_, listed) = send(&app, "GET", "/api/v1/students", None).await;
    assert_eq!(listed["data"], json!([]));
}

#[tokio::test]
async fn body_without_a_student_is_rejected() {
    let (status, body) = send(
        &app(),
        "POST",
        "/api/v1/students",
        Some(student("CS-1", "alan@example.com")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"][0]["path"], "student");
}

#[tokio::test]
async fn malformed_json_is_a_validation_failure() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/students")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"student\": "))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["message"], "Validation failed");
    assert_eq!(body["error"][0]["path"], "body");
}

#[tokio::test]
async fn lists_students_in_creation_order() {
    let app = app();
    create(&app, "CS-1", "one@example.com").await;
    create(&app, "CS-2", "two@example.com").await;

    let (status, body) = send(&app, "GET", "/api/v1/students", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Students retrieved successfully");
    let ids: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["studentId"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["CS-1", "CS-2"]);
}

#[tokio::test]
async fn fetches_by_student_id() {
    let app = app();
    let created = create(&app, "CS-1", "alan@example.com").await;

    let (status, body) = send(&app, "GET", "/api/v1/students/CS-1", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], created);
}

#[tokio::test]
async fn unknown_student_is_not_found() {
    let app = app();

    for method in ["GET", "DELETE"] {
        let (status, body) = send(&app, method, "/api/v1/students/CS-404", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method}");
        assert_eq!(
            body,
            json!({"success": false, "message": "Student with id CS-404 not found"})
        );
    }

    let (status, _) = send(
        &app,
        "PUT",
        "/api/v1/students/CS-404",
        Some(json!({"student": {"contactNo": "0999"}})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_returns_the_new_state() {
    let app = app();
    let created = create(&app, "CS-1", "alan@example.com").await;

    let (status, body) = send(
        &app,
        "PUT",
        "/api/v1/students/CS-1",
        Some(json!({"student": {
            "contactNo": "0999",
            "isActive": "blocked",
            "name": {"firstName": "Alan", "lastName": "Turing"}
        }})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Student updated successfully");
    let updated = &body["data"];
    assert_eq!(updated["contactNo"], "0999");
    assert_eq!(updated["isActive"], "blocked");
    assert!(updated["name"].get("middleName").is_none());
    assert_eq!(updated["email"], created["email"]);
    assert_eq!(updated["createdAt"], created["createdAt"]);

    let (_, fetched) = send(&app, "GET", "/api/v1/students/CS-1", None).await;
    assert_eq!(&fetched["data"], updated);
}

#[tokio::test]
async fn invalid_update_is_rejected_before_lookup() {
    let app = app();
    create(&app, "CS-1", "alan@example.com").await;

    let (status, body) = send(
        &app,
        "PUT",
        "/api/v1/students/CS-1",
        Some(json!({"student": {"bloodGroup": "Z", "guardian": {"fatherName": "Julius"}}})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"][0]["path"], "bloodGroup");
    assert!(body["error"].as_array().unwrap().len() > 1);

    let (_, fetched) = send(&app, "GET", "/api/v1/students/CS-1", None).await;
    assert_eq!(fetched["data"]["bloodGroup"], "O+");
}

#[tokio::test]
async fn delete_returns_the_removed_student() {
    let app = app();
    let created = create(&app, "CS-1", "alan@example.com").await;

    let (status, body) = send(&app, "DELETE", "/api/v1/students/CS-1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Student deleted successfully");
    assert_eq!(body["data"], created);

    let (status, _) = send(&app, "GET", "/api/v1/students/CS-1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicates_surface_as_storage_failures() {
    let app = app();
    create(&app, "CS-1", "alan@example.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/students",
        Some(json!({"student": student("CS-2", "ALAN@example.com")})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Failed to create student");
    assert!(body["error"].as_str().unwrap().contains("email"));
}

#[tokio::test]
async fn unknown_routes_get_an_envelope() {
    let (status, body) = send(&app(), "GET", "/api/v2/nothing", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"success": false, "message": "Route not found"}));
}
