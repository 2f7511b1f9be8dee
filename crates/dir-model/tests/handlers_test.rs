//! Request adapters: parameter/body merging, caller stamping and response
//! shapes.

mod common;

use common::{widget_dn, Harness, Widget};
use dir_model::handlers::{request_create, request_delete, request_get, request_list, request_put};
use dir_model::mock::Op;
use dir_model::{Caller, ModelError, Request, Response};
use serde_json::json;

const OWNER: &str = "930896af-bf8c-48d4-885c-6573a94b1853";

#[tokio::test]
async fn test_create_merges_params_and_body() {
    let h = Harness::new();
    let req = Request::new()
        .param("id", "W1")
        .body(json!({"color": "red"}));

    let resp = request_create::<Widget>(&h.ctx, &req).await.unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body.unwrap()["color"], "red");

    let stored = h.directory.entry(&widget_dn("W1")).unwrap();
    assert_eq!(stored.first("color"), Some("red"));
}

#[tokio::test]
async fn test_body_overrides_route_params() {
    let h = Harness::new();
    let req = Request::new()
        .param("id", "W1")
        .param("color", "red")
        .body(json!({"color": "blue"}));

    request_create::<Widget>(&h.ctx, &req).await.unwrap();
    let stored = h.directory.entry(&widget_dn("W1")).unwrap();
    assert_eq!(stored.first("color"), Some("blue"));
}

#[tokio::test]
async fn test_get_and_list_round_trip() {
    let h = Harness::new();
    request_create::<Widget>(&h.ctx, &Request::new().param("id", "W1"))
        .await
        .unwrap();
    request_create::<Widget>(
        &h.ctx,
        &Request::new().param("id", "W2").body(json!({"color": "green"})),
    )
    .await
    .unwrap();

    let got = request_get::<Widget>(&h.ctx, &Request::new().param("id", "W2"))
        .await
        .unwrap();
    assert_eq!(got.body.unwrap()["color"], "green");

    let listed = request_list::<Widget>(&h.ctx, &Request::new()).await.unwrap();
    let body = listed.body.unwrap();
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|w| w["id"].as_str())
        .collect();
    assert_eq!(ids, vec!["W1", "W2"]);
}

#[tokio::test]
async fn test_get_without_id_is_invalid_parameter() {
    let h = Harness::new();
    let err = request_get::<Widget>(&h.ctx, &Request::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ModelError::InvalidParameter { .. }));
    assert_eq!(Response::from(&err).status, 422);
    assert_eq!(h.directory.calls(Op::Search), 0);
}

#[tokio::test]
async fn test_put_stamps_caller() {
    let h = Harness::new();
    let req = Request::new()
        .param("id", "W1")
        .body(json!({"color": "red", "owner": "someone-else"}))
        .caller(Caller::new(OWNER, "alice"));

    let resp = request_put::<Widget>(&h.ctx, &req).await.unwrap();
    assert_eq!(resp.body.unwrap()["owner"], OWNER);
    let stored = h.directory.entry(&widget_dn("W1")).unwrap();
    assert_eq!(stored.first("owner"), Some(OWNER));
}

#[tokio::test]
async fn test_put_requires_caller() {
    let h = Harness::new();
    let req = Request::new().param("id", "W1");
    let err = request_put::<Widget>(&h.ctx, &req).await.unwrap_err();
    assert!(matches!(err, ModelError::Unauthorized(_)));
    assert_eq!(h.directory.calls(Op::Add), 0);
}

#[tokio::test]
async fn test_delete_uses_request_caller() {
    let h = Harness::new();
    request_create::<Widget>(&h.ctx, &Request::new().param("id", "W1"))
        .await
        .unwrap();

    // Widgets refuse anonymous deletes.
    let anonymous = Request::new().param("id", "W1");
    let err = request_delete::<Widget>(&h.ctx, &anonymous)
        .await
        .unwrap_err();
    assert_eq!(Response::from(&err).status, 403);

    let authed = Request::new()
        .param("id", "W1")
        .caller(Caller::new(OWNER, "alice"));
    let resp = request_delete::<Widget>(&h.ctx, &authed).await.unwrap();
    assert_eq!(resp, Response::no_content());
    assert!(h.directory.entry(&widget_dn("W1")).is_none());

    let err = request_get::<Widget>(&h.ctx, &Request::new().param("id", "W1"))
        .await
        .unwrap_err();
    assert_eq!(Response::from(&err).status, 404);
}
