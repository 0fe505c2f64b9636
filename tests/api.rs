use actix_web::{
    http::StatusCode,
    test::{self, TestRequest},
    web::Data,
    App,
};
use rowmq::{
    api::ListResponse,
    config::Config,
    error::ErrorResponse,
    message::Message,
    queue::{Queue, QueueStats},
    service::Service,
};
use serde_json::{json, Value};
use tempfile::TempDir;

async fn setup() -> (Data<Service>, TempDir) {
    setup_with_max_lease(2).await
}

async fn setup_with_max_lease(max: u32) -> (Data<Service>, TempDir) {
    let tmpdir = tempfile::tempdir().unwrap();

    let service = Service::connect_with()
        .config(Config {
            db_path: Some(tmpdir.path().join("rowmq.db").to_string_lossy().to_string()),
            queue_max_number_of_messages: Some(max),
            ..Default::default()
        })
        .call()
        .await
        .unwrap();

    (Data::new(service), tmpdir)
}

macro_rules! app {
    ($data:expr) => {
        test::init_service(App::new().app_data($data.clone()).configure(rowmq::routes)).await
    };
}

fn queue_body(id: &str) -> Value {
    json!({
        "id": id,
        "ack_deadline_seconds": 30,
        "message_retention_seconds": 600,
    })
}

#[actix_web::test]
async fn test_queue_lifecycle() {
    let (data, _tmpdir) = setup().await;
    let app = app!(data);

    let req = TestRequest::post()
        .uri("/v1/queues")
        .set_json(queue_body("orders"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["id"], "orders");
    assert_eq!(created["delivery_delay_seconds"], 0);

    let req = TestRequest::post()
        .uri("/v1/queues")
        .set_json(queue_body("orders"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let err: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(err.code, 4);

    let req = TestRequest::put()
        .uri("/v1/queues/orders")
        .set_json(json!({"ack_deadline_seconds": 10, "message_retention_seconds": 20}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = TestRequest::get().uri("/v1/queues/orders").to_request();
    let queue: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(queue["ack_deadline_seconds"], 10);
    assert_eq!(queue["created_at"], created["created_at"]);

    let req = TestRequest::get().uri("/v1/queues").to_request();
    let page: ListResponse<Value> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page.offset, 0);
    assert_eq!(page.limit, 1);
    assert_eq!(page.data.len(), 1);

    let req = TestRequest::get()
        .uri("/v1/queues/orders/stats")
        .to_request();
    let stats: QueueStats = test::call_and_read_body_json(&app, req).await;
    assert_eq!(stats, QueueStats::default());

    for action in ["purge", "cleanup"] {
        let req = TestRequest::put()
            .uri(&format!("/v1/queues/orders/{action}"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }

    let req = TestRequest::delete().uri("/v1/queues/orders").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = TestRequest::get().uri("/v1/queues/orders").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let err: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(err.code, 5);
}

#[actix_web::test]
async fn test_validation_errors_carry_details() {
    let (data, _tmpdir) = setup().await;
    let app = app!(data);

    let req = TestRequest::post()
        .uri("/v1/queues")
        .set_json(json!({"id": "bad id!"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let err: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(err.code, 3);
    assert_eq!(
        err.details,
        Some(json!({
            "ack_deadline_seconds": "cannot be blank",
            "id": "must be in a valid format",
            "message_retention_seconds": "cannot be blank",
        }))
    );
}

#[actix_web::test]
async fn test_malformed_body() {
    let (data, _tmpdir) = setup().await;
    let app = app!(data);

    let req = TestRequest::post()
        .uri("/v1/queues")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let err: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(err.code, 2);
}

#[actix_web::test]
async fn test_message_lifecycle() {
    let (data, _tmpdir) = setup().await;
    data.queues()
        .create(
            Queue::builder()
                .id("orders")
                .ack_deadline_seconds(30)
                .message_retention_seconds(600)
                .build(),
        )
        .await
        .unwrap();
    let app = app!(data);

    for body in ["a", "b", "c"] {
        let req = TestRequest::post()
            .uri("/v1/queues/orders/messages")
            .set_json(json!({"body": body, "label": "work"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    // The configured maximum of two caps the lease.
    let req = TestRequest::get()
        .uri("/v1/queues/orders/messages?label=work&limit=50")
        .to_request();
    let page: ListResponse<Value> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page.offset, 0);
    assert_eq!(page.limit, 2);
    let leased = page.data;
    assert_eq!(leased.len(), 2);
    assert_eq!(leased[0]["body"], "a");
    assert_eq!(leased[0]["delivery_attempts"], 1);
    assert!(leased[0].get("scheduled_at").is_none());

    let id = leased[0]["id"].as_str().unwrap();
    let req = TestRequest::put()
        .uri(&format!("/v1/queues/orders/messages/{id}/ack"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    let id = leased[1]["id"].as_str().unwrap();
    let req = TestRequest::put()
        .uri(&format!(
            "/v1/queues/orders/messages/{id}/nack?visibility_timeout_seconds=0"
        ))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    let req = TestRequest::get()
        .uri("/v1/queues/orders/messages")
        .to_request();
    let page: ListResponse<Value> = test::call_and_read_body_json(&app, req).await;
    let leased = page.data;
    let bodies: Vec<_> = leased.iter().map(|m| m["body"].as_str().unwrap()).collect();
    // The nacked message was rescheduled after "c" became visible.
    assert_eq!(bodies, vec!["c", "b"]);

    let req = TestRequest::put()
        .uri("/v1/queues/orders/messages/missing/ack")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let err: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(err.code, 6);
}

#[actix_web::test]
async fn test_lease_defaults_to_ten() {
    let (data, _tmpdir) = setup_with_max_lease(25).await;
    data.queues()
        .create(
            Queue::builder()
                .id("bulk")
                .ack_deadline_seconds(30)
                .message_retention_seconds(600)
                .build(),
        )
        .await
        .unwrap();
    for i in 0..12 {
        data.messages()
            .create("bulk", Message::builder().body(format!("m{i}")).build())
            .await
            .unwrap();
    }
    let app = app!(data);

    let req = TestRequest::get().uri("/v1/queues/bulk/messages").to_request();
    let page: ListResponse<Value> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page.limit, 10);
    assert_eq!(page.data.len(), 10);

    let req = TestRequest::get()
        .uri("/v1/queues/bulk/messages?limit=50")
        .to_request();
    let page: ListResponse<Value> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page.limit, 25);
    assert_eq!(page.data.len(), 2);
}

#[actix_web::test]
async fn test_publish() {
    let (data, _tmpdir) = setup().await;
    data.queues()
        .create(
            Queue::builder()
                .id("inbox")
                .ack_deadline_seconds(30)
                .message_retention_seconds(600)
                .build(),
        )
        .await
        .unwrap();
    let app = app!(data);

    let req = TestRequest::post()
        .uri("/v1/topics")
        .set_json(json!({"id": "events"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = TestRequest::post()
        .uri("/v1/subscriptions")
        .set_json(json!({
            "id": "inbox-events",
            "topic_id": "events",
            "queue_id": "inbox",
            "message_filters": {"kind": ["signup", "login"]},
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = TestRequest::post()
        .uri("/v1/topics/events/messages")
        .set_json(json!({"body": "welcome", "attributes": {"kind": "signup"}}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let published: Vec<Value> = test::read_body_json(resp).await;
    assert_eq!(published.len(), 1);
    assert_eq!(published[0]["queue_id"], "inbox");

    let req = TestRequest::post()
        .uri("/v1/topics/events/messages")
        .set_json(json!({"body": "bye", "attributes": {"kind": "logout"}}))
        .to_request();
    let published: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    assert!(published.is_empty());

    let req = TestRequest::get().uri("/v1/topics/nope").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let err: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(err.code, 8);

    let req = TestRequest::get()
        .uri("/v1/subscriptions?limit=10")
        .to_request();
    let page: ListResponse<Value> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page.limit, 10);
    assert_eq!(page.data[0]["message_filters"]["kind"], json!(["signup", "login"]));

    let req = TestRequest::delete()
        .uri("/v1/subscriptions/inbox-events")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
    let req = TestRequest::delete().uri("/v1/topics/events").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn test_healthz() {
    let (data, _tmpdir) = setup().await;
    let app = app!(data);

    let req = TestRequest::get().uri("/healthz").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body, json!({"success": true}));
}
