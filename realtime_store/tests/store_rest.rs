mod support;

use serde_json::{Value, json};

#[tokio::test]
async fn when_enemies_are_seeded_over_http_then_they_can_be_read_back() {
    let root = support::unique_segment("rest-enemies");
    let client = reqwest::Client::new();

    let res = client
        .post(support::http_url(&format!("/data/{root}/enemies")))
        .json(&json!({"x": 100.0, "y": 80.0, "velocityX": 20.0, "velocityY": 60.0}))
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(res.status(), reqwest::StatusCode::CREATED);
    let created: Value = res.json().await.expect("push response should be json");
    let key = created["key"].as_str().expect("key should be a string").to_string();

    let res = client
        .get(support::http_url(&format!("/data/{root}/enemies/{key}/velocityY")))
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    assert_eq!(res.json::<Value>().await.expect("json body"), json!(60.0));
}

#[tokio::test]
async fn when_value_is_put_and_deleted_then_reads_reflect_it() {
    let root = support::unique_segment("rest-put");
    let client = reqwest::Client::new();
    let url = support::http_url(&format!("/data/{root}/players/AB"));

    let res = client
        .put(&url)
        .json(&json!({"x": 12.0, "score": 30}))
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(res.status(), reqwest::StatusCode::NO_CONTENT);

    let body: Value = client
        .get(&url)
        .send()
        .await
        .expect("request should succeed")
        .json()
        .await
        .expect("json body");
    assert_eq!(body, json!({"x": 12.0, "score": 30}));

    let res = client
        .delete(&url)
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(res.status(), reqwest::StatusCode::NO_CONTENT);

    let body: Value = client
        .get(&url)
        .send()
        .await
        .expect("request should succeed")
        .json()
        .await
        .expect("json body");
    assert!(body.is_null());
}

#[tokio::test]
async fn when_path_is_invalid_then_bad_request_is_returned() {
    let res = reqwest::Client::new()
        .get(support::http_url("/data/players/a$b"))
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);
}
