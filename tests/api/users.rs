use reqwest::Method;

use serde_json::{json, Value};

use crate::helpers::TestApp;

#[tokio::test]
async fn register_applies_default_preferences() {
    let app = TestApp::spawn().await;

    let user = app.given_user("ursula@test.com").await;

    assert_eq!("ursula@test.com", user["email"]);
    assert_eq!(
        json!({
            "emailNotifications": true,
            "digestTime": "09:00",
            "advanceNotification": true,
            "advanceMinutes": 15,
        }),
        user["preferences"]
    );
}

#[tokio::test]
async fn registering_an_existing_address_signs_in() {
    let app = TestApp::spawn().await;

    let first = app
        .user_create("laptop", &json!({ "email": "ursula@test.com" }))
        .await
        .unwrap();
    let second = app
        .user_create("phone", &json!({ "email": "URSULA@test.com" }))
        .await
        .unwrap();

    assert_eq!(201, first.status().as_u16());
    assert_eq!(200, second.status().as_u16());
    let first: Value = first.json().await.unwrap();
    let second: Value = second.json().await.unwrap();
    assert_eq!(first["id"], second["id"]);

    let all: Value = app.request(Method::GET, "users").send().await.unwrap().json().await.unwrap();
    assert_eq!(1, all.as_array().unwrap().len());
}

#[tokio::test]
async fn register_rejects_invalid_input() {
    let app = TestApp::spawn().await;

    let test_cases = vec![
        ("missing email", json!({ "name": "Ursula" })),
        ("malformed email", json!({ "email": "ursula" })),
        (
            "malformed digest time",
            json!({ "email": "ursula@test.com", "preferences": { "digestTime": "9am" } }),
        ),
        (
            "advance window over a day",
            json!({ "email": "ursula@test.com", "preferences": { "advanceMinutes": 2000 } }),
        ),
    ];

    for (desc, body) in test_cases {
        let res = app.user_create("laptop", &body).await.unwrap();
        assert_eq!(400, res.status().as_u16(), "Did not reject {}", desc);
    }
}

#[tokio::test]
async fn lookup_by_email() {
    let app = TestApp::spawn().await;
    let user = app.given_user("ursula@test.com").await;

    let found = app
        .request(Method::GET, "users?email=Ursula@Test.com")
        .send()
        .await
        .unwrap();
    let missing = app
        .request(Method::GET, "users?email=nobody@test.com")
        .send()
        .await
        .unwrap();

    assert_eq!(200, found.status().as_u16());
    let found: Value = found.json().await.unwrap();
    assert_eq!(user["id"], found["id"]);
    assert_eq!(404, missing.status().as_u16());
}

#[tokio::test]
async fn current_user_is_tracked_per_client() {
    let app = TestApp::spawn().await;
    let ursula: Value = app
        .user_create("laptop", &json!({ "email": "ursula@test.com" }))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let victor: Value = app
        .user_create("phone", &json!({ "email": "victor@test.com" }))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let current = |client: &'static str| {
        app.request(Method::GET, "users/current")
            .header("X-Client-Id", client)
            .send()
    };

    let laptop: Value = current("laptop").await.unwrap().json().await.unwrap();
    let phone: Value = current("phone").await.unwrap().json().await.unwrap();
    assert_eq!(ursula["id"], laptop["user"]["id"]);
    assert_eq!(victor["id"], phone["user"]["id"]);

    let switched = app
        .request(Method::PUT, "users/current")
        .header("X-Client-Id", "laptop")
        .json(&json!({ "userId": victor["id"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(200, switched.status().as_u16());
    let laptop: Value = current("laptop").await.unwrap().json().await.unwrap();
    assert_eq!(victor["id"], laptop["user"]["id"]);

    app.request(Method::DELETE, "users/current")
        .header("X-Client-Id", "laptop")
        .send()
        .await
        .unwrap();
    let laptop: Value = current("laptop").await.unwrap().json().await.unwrap();
    assert!(laptop["user"].is_null());
}

#[tokio::test]
async fn switching_to_an_unknown_user_is_not_found() {
    let app = TestApp::spawn().await;

    let res = app
        .request(Method::PUT, "users/current")
        .json(&json!({ "userId": uuid::Uuid::new_v4() }))
        .send()
        .await
        .unwrap();

    assert_eq!(404, res.status().as_u16());
}

#[tokio::test]
async fn patch_merges_preferences() {
    let app = TestApp::spawn().await;
    let user = app.given_user("ursula@test.com").await;
    let url = format!("users/{}", user["id"].as_str().unwrap());

    let updated: Value = app
        .request(Method::PATCH, &url)
        .json(&json!({ "name": "Ursula", "preferences": { "digestTime": "07:30" } }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!("Ursula", updated["name"]);
    assert_eq!("07:30", updated["preferences"]["digestTime"]);
    assert_eq!(15, updated["preferences"]["advanceMinutes"]);
}

#[tokio::test]
async fn patch_refuses_a_taken_address() {
    let app = TestApp::spawn().await;
    app.given_user("ursula@test.com").await;
    let victor = app.given_user("victor@test.com").await;
    let url = format!("users/{}", victor["id"].as_str().unwrap());

    let res = app
        .request(Method::PATCH, &url)
        .json(&json!({ "email": "ursula@test.com" }))
        .send()
        .await
        .unwrap();

    assert_eq!(400, res.status().as_u16());
}

#[tokio::test]
async fn deleted_users_are_signed_out() {
    let app = TestApp::spawn().await;
    let user = app.given_user("ursula@test.com").await;
    let url = format!("users/{}", user["id"].as_str().unwrap());

    assert_eq!(200, app.request(Method::DELETE, &url).send().await.unwrap().status().as_u16());

    let current: Value = app
        .request(Method::GET, "users/current")
        .header("X-Client-Id", "test-client")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(current["user"].is_null());
    assert_eq!(404, app.request(Method::GET, &url).send().await.unwrap().status().as_u16());
}
