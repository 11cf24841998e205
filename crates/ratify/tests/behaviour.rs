//! End-to-end behaviour through the public facade.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use http::StatusCode;
use ratify::prelude::*;
use ratify::router::NoMatch;
use ratify::server::Disposition;
use ratify_test::TestClient;
use serde_json::{json, Value};

fn item_chain() -> SegmentChain {
    SegmentChain::root().literal("/items/").capture("id", Field::number())
}

#[test]
fn int_and_float_numbers() {
    let int = Field::number();
    for ok in [json!(12), json!(0), json!(-1)] {
        assert_eq!(int.validate(&ok).unwrap(), ok);
    }
    for bad in [json!(1.2), json!(-1.2)] {
        assert_eq!(int.validate(&bad).unwrap_err().message, "Not an int");
    }
    assert_eq!(int.validate(&json!("1")).unwrap_err().message, "Not a number");

    let float = Field::number_with(ratify::core::NumberOptions::float());
    assert_eq!(float.validate(&json!(1.2)).unwrap(), json!(1.2));
    assert_eq!(float.validate(&json!(-1.2)).unwrap(), json!(-1.2));
}

#[test]
fn object_required_and_optional_keys() {
    let field = Field::object([("name", Field::string()), ("nick", Field::string().optional())]);

    assert_eq!(field.validate(&json!({"name": "Ada"})).unwrap(), json!({"name": "Ada"}));
    assert_eq!(
        field.validate(&json!({"name": "Ada", "nick": "ada"})).unwrap(),
        json!({"name": "Ada", "nick": "ada"})
    );

    let err = field.validate(&json!({"nick": "ada"})).unwrap_err();
    assert_eq!(err.path, "$.name");
    assert_eq!(err.message, ratify::core::MISSING_KEY);
}

#[test]
fn path_capture_round_trip() {
    let chain = item_chain();

    let params = chain.match_path("/items/42").unwrap();
    assert_eq!(params.to_value(), json!({"id": 42}));
    assert!(matches!(chain.match_path("/items/abc"), Err(NoMatch::Rejected { .. })));
    assert_eq!(chain.project(&json!({"id": 42})).unwrap(), "/items/42");
}

#[test]
fn text_capture_projection_is_encoded() {
    let chain = SegmentChain::root().literal("/tags/").capture("name", Field::string());
    let path = chain.project(&json!({"name": "a b/c"})).unwrap();
    assert_eq!(path, "/tags/a%20b%2Fc");
    assert_eq!(chain.match_path(&path).unwrap().to_value(), json!({"name": "a b/c"}));
}

fn counted_route(calls: &Arc<AtomicUsize>) -> Route {
    let calls = Arc::clone(calls);
    Route::get(item_chain())
        .response(ResponseSpec::data(Field::object([("id", Field::number())])))
        .handler(move |req: Request<Value>| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<_, AppError>(Reply::new(json!({"id": req.path_params["id"]}))) }
        })
}

#[tokio::test]
async fn dispatch_not_found_runs_no_handler() {
    let calls = Arc::new(AtomicUsize::new(0));
    let client = TestClient::new(ServerConfig::default(), [counted_route(&calls)]);

    client.get("/elsewhere").send().await.assert_status(404).assert_no_body();
    client.post("/items/1").send().await.assert_status(404);
    client.get("/items/abc").send().await.assert_status(404);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    client
        .get("/items/7")
        .send()
        .await
        .assert_status(200)
        .assert_json(&json!({"id": 7}));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

fn failing_routes() -> Vec<Route> {
    vec![
        Route::get(SegmentChain::root().literal("/expected"))
            .handler(|_: Request| async {
                Err::<Reply, _>(AppError::public(
                    StatusCode::from_u16(442).unwrap_or(StatusCode::BAD_REQUEST),
                    "Item is locked",
                ))
            }),
        Route::get(SegmentChain::root().literal("/unexpected"))
            .handler(|_: Request| async { Err::<Reply, _>(AppError::internal("database unreachable")) }),
    ]
}

#[tokio::test]
async fn application_error_classification() {
    let reports = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&reports);
    let config = ServerConfig::builder()
        .error_reporter(move |err: ReportedError| {
            let seen = Arc::clone(&seen);
            async move {
                assert_eq!(err.kind(), "app");
                seen.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        })
        .build();
    let client = TestClient::new(config, failing_routes());

    let expected = client.get("/expected").send().await;
    expected
        .assert_status(442)
        .assert_disposition(Disposition::HandlerFailed)
        .assert_json(&json!({"reason": "Item is locked"}));
    assert_eq!(reports.load(Ordering::SeqCst), 0);

    let unexpected = client.get("/unexpected").send().await;
    unexpected.assert_status(500).assert_no_body();
    assert_eq!(reports.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn settings_drive_the_dispatcher() {
    let settings = ConfigLoader::new()
        .with_string("[server]\napp_error_status = 503", "toml")
        .unwrap()
        .load()
        .unwrap();
    let client = TestClient::new(settings.server_config().unwrap(), failing_routes());

    client.get("/unexpected").send().await.assert_status(503);
}
