//! Concurrent access to the per-origin proxy cache.

use std::time::Duration;

use futures_util::future::join_all;
use serde_json::{json, Value};

mod common;

use common::MockResponse;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_requests_create_one_handle() {
    let (backend, recorded) = common::start_programmable_backend(|| async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        MockResponse::json(r#"{"success":true,"message":"ok","data":["k:v","n:1"]}"#)
    })
    .await;
    let proxy = common::start_proxy(&[("/items/{id}", format!("http://{}/items", backend))]).await;
    assert!(proxy.cache.is_empty());

    let client = common::client();
    let (a, b) = tokio::join!(
        client.get(proxy.url("/items/1")).send(),
        client.get(proxy.url("/items/2")).send(),
    );

    for res in [a.unwrap(), b.unwrap()] {
        assert_eq!(res.status(), 200);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["data"], json!({"k": "v", "n": "1"}));
    }

    assert_eq!(proxy.cache.len(), 1);
    assert!(proxy.cache.contains(&format!("http://{}", backend)));
    assert_eq!(recorded.lock().unwrap().len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_one_handle_per_origin_under_load() {
    let (users, _) = common::start_mock_backend(r#"{"success":true,"message":"users"}"#).await;
    let (orders, _) = common::start_mock_backend(r#"{"success":true,"message":"orders"}"#).await;
    let proxy = common::start_proxy(&[
        ("/users/{id}", format!("http://{}/users", users)),
        ("/users", format!("http://{}/users/list", users)),
        ("/orders/{id}", format!("http://{}/orders", orders)),
    ])
    .await;

    let client = common::client();
    let requests = (0..40).map(|i| {
        let path = match i % 3 {
            0 => format!("/users/{}", i),
            1 => "/users".to_string(),
            _ => format!("/orders/{}", i),
        };
        let client = client.clone();
        let url = proxy.url(&path);
        async move {
            let res = client.get(url).send().await.unwrap();
            let body: Value = res.json().await.unwrap();
            (i, body)
        }
    });

    for (i, body) in join_all(requests).await {
        let expected = if i % 3 == 2 { "orders" } else { "users" };
        assert_eq!(body["message"], json!(expected));
    }

    assert_eq!(proxy.cache.len(), 2);
}
