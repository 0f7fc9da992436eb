use serde_json::Value;

use wiremock::matchers::*;
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{at, NewReminder, TestApp};

#[tokio::test]
async fn cron_sends_the_daily_digest_once() {
    let app = TestApp::spawn().await;
    let user = app.given_user("digest@test.com").await;
    for title in ["Gym", "Groceries"] {
        app.given_reminder(&NewReminder {
            email: "digest@test.com",
            title,
            date: "2024-06-01",
            time: None,
            description: None,
        })
        .await;
    }

    Mock::given(path("/email"))
        .and(method("POST"))
        .and(body_partial_json(serde_json::json!({
            "To": "digest@test.com",
            "Tag": "daily",
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let first: Value = app.cron().await.unwrap().json().await.unwrap();
    let second: Value = app.cron().await.unwrap().json().await.unwrap();

    assert_eq!(true, first["success"]);
    assert_eq!(1, first["summary"]["sent"]);
    assert_eq!("09:00", first["summary"]["time"]);
    assert_eq!(1, second["summary"]["alreadySent"]);
    assert_eq!(
        vec![format!("daily:{}:2024-06-01", user["id"].as_str().unwrap())],
        app.engine.sent_notifications()
    );
}

#[tokio::test]
async fn cron_accepts_get_requests() {
    let app = TestApp::spawn().await;

    let res = app
        .request(reqwest::Method::GET, "cron")
        .send()
        .await
        .unwrap();

    assert_eq!(200, res.status().as_u16());
}

#[tokio::test]
async fn advance_then_exact_notices_follow_the_clock() {
    let app = TestApp::spawn().await;
    app.given_user("owner@test.com").await;
    app.given_reminder(&NewReminder {
        email: "owner@test.com",
        title: "Dentist",
        date: "2024-06-01",
        time: Some("15:00"),
        description: Some("Bring X-rays"),
    })
    .await;

    Mock::given(body_partial_json(serde_json::json!({ "Tag": "advance" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_server)
        .await;
    Mock::given(body_partial_json(serde_json::json!({ "Tag": "exact" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_server)
        .await;

    for now in ["2024-06-01 14:44", "2024-06-01 14:45", "2024-06-01 15:00", "2024-06-01 15:01"] {
        app.clock.set(at(now));
        let res = app.cron().await.unwrap();
        assert_eq!(200, res.status().as_u16());
    }

    assert_eq!(2, app.engine.sent_notifications().len());
}

#[tokio::test]
async fn failed_delivery_is_retried_on_the_next_check() {
    let app = TestApp::spawn().await;
    app.given_user("owner@test.com").await;
    app.given_reminder(&NewReminder {
        email: "owner@test.com",
        title: "Dentist",
        date: "2024-06-01",
        time: Some("09:30"),
        description: None,
    })
    .await;
    app.clock.set(at("2024-06-01 09:30"));

    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .expect(1)
        .mount(&app.email_server)
        .await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let first: Value = app.cron().await.unwrap().json().await.unwrap();
    let second: Value = app.cron().await.unwrap().json().await.unwrap();

    assert_eq!(1, first["summary"]["failed"]);
    assert_eq!(1, second["summary"]["sent"]);
}

#[tokio::test]
async fn status_reports_the_timer_and_ledger() {
    let app = TestApp::spawn().await;

    let status: Value = app.notifications_status().await.unwrap().json().await.unwrap();

    assert_eq!(true, status["success"]);
    assert_eq!(false, status["isRunning"]);
    assert_eq!(serde_json::json!([]), status["sentNotifications"]);
}

#[tokio::test]
async fn control_actions_start_and_stop_the_timer() {
    let app = TestApp::spawn().await;

    let started: Value = app.notifications_control("start").await.unwrap().json().await.unwrap();
    assert_eq!(true, started["isRunning"]);

    let again: Value = app.notifications_control("start").await.unwrap().json().await.unwrap();
    assert_eq!("Notification engine is already running", again["message"]);

    let stopped: Value = app.notifications_control("stop").await.unwrap().json().await.unwrap();
    assert_eq!(false, stopped["isRunning"]);
    assert!(!app.engine.is_running());
}

#[tokio::test]
async fn check_and_reset_actions_drive_the_ledger() {
    let app = TestApp::spawn().await;
    app.given_user("owner@test.com").await;
    app.given_reminder(&NewReminder {
        email: "owner@test.com",
        title: "Gym",
        date: "2024-06-01",
        time: None,
        description: None,
    })
    .await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&app.email_server)
        .await;

    let checked: Value = app.notifications_control("check").await.unwrap().json().await.unwrap();
    assert_eq!(1, checked["summary"]["sent"]);

    app.notifications_control("reset").await.unwrap();
    assert!(app.engine.sent_notifications().is_empty());

    // With the ledger cleared the digest goes out again
    app.notifications_control("check").await.unwrap();
    assert_eq!(1, app.engine.sent_notifications().len());
}

#[tokio::test]
async fn unknown_control_action_is_a_bad_request() {
    let app = TestApp::spawn().await;

    let res = app.notifications_control("explode").await.unwrap();

    assert_eq!(400, res.status().as_u16());
    let body: Value = res.json().await.unwrap();
    assert_eq!(false, body["success"]);
    assert!(body["details"].as_str().unwrap().contains("explode"));
}

#[tokio::test]
async fn test_endpoint_reports_recent_notifications() {
    let app = TestApp::spawn().await;
    app.given_user("owner@test.com").await;
    app.given_reminder(&NewReminder {
        email: "owner@test.com",
        title: "Gym",
        date: "2024-06-01",
        time: Some("09:00"),
        description: None,
    })
    .await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.email_server)
        .await;

    // The ledger is reported as it stood before the check ran
    let first: Value = app.notifications_test().await.unwrap().json().await.unwrap();
    assert_eq!(true, first["success"]);
    assert_eq!(0, first["sentNotificationsCount"]);
    assert_eq!(false, first["isRunning"]);
    // Digest and exact notice coincide at 09:00
    assert_eq!(2, first["summary"]["sent"]);

    let second: Value = app.notifications_test().await.unwrap().json().await.unwrap();
    assert_eq!(2, second["sentNotificationsCount"]);
    assert_eq!(2, second["sentNotifications"].as_array().unwrap().len());
    assert_eq!(2, second["summary"]["alreadySent"]);
}

#[tokio::test]
async fn checks_fail_with_500_when_reminders_cannot_be_read() {
    let app = TestApp::spawn_with_unavailable_reminders().await;
    app.given_user("owner@test.com").await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let cron = app.cron().await.unwrap();
    let check = app.notifications_control("check").await.unwrap();
    let test_check = app.notifications_test().await.unwrap();

    for res in [cron, check, test_check] {
        assert_eq!(500, res.status().as_u16());
        let body: Value = res.json().await.unwrap();
        assert_eq!(false, body["success"]);
        assert_eq!("Internal server error", body["error"]);
        assert!(body["details"]
            .as_str()
            .unwrap()
            .starts_with("Internal Server Error: Notification check failed"));
    }
    assert!(app.engine.sent_notifications().is_empty());
}

#[tokio::test]
async fn email_status_reports_configured_delivery() {
    let app = TestApp::spawn().await;

    let res = app
        .request(reqwest::Method::GET, "notifications/email")
        .send()
        .await
        .unwrap();

    assert_eq!(200, res.status().as_u16());
    let body: Value = res.json().await.unwrap();
    assert_eq!(true, body["success"]);
}

#[tokio::test]
async fn email_status_fails_without_credentials() {
    let app = TestApp::spawn_without_email().await;

    let res = app
        .request(reqwest::Method::GET, "notifications/email")
        .send()
        .await
        .unwrap();

    assert_eq!(500, res.status().as_u16());
    let body: Value = res.json().await.unwrap();
    assert_eq!(false, body["success"]);
    assert_eq!(
        "Internal Server Error: Email delivery is not configured",
        body["details"]
    );
}

#[tokio::test]
async fn test_email_is_delivered_through_the_api() {
    let app = TestApp::spawn().await;

    Mock::given(path("/email"))
        .and(method("POST"))
        .and(body_partial_json(serde_json::json!({
            "From": "reminders@test.com",
            "To": "ops@test.com",
            "Subject": "Delivery check",
            "TextBody": "It works",
            "Tag": "test",
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let res = app
        .send_test_email(&serde_json::json!({
            "to": "ops@test.com",
            "subject": "Delivery check",
            "text": "It works",
        }))
        .await
        .unwrap();

    assert_eq!(200, res.status().as_u16());
    let body: Value = res.json().await.unwrap();
    assert_eq!(true, body["success"]);
    assert_eq!("ops@test.com", body["to"]);
}

#[tokio::test]
async fn test_email_failures_are_reported() {
    let app = TestApp::spawn().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let res = app
        .send_test_email(&serde_json::json!({
            "to": "ops@test.com",
            "subject": "Delivery check",
            "html": "<p>It works</p>",
        }))
        .await
        .unwrap();

    assert_eq!(500, res.status().as_u16());
    let body: Value = res.json().await.unwrap();
    assert_eq!(false, body["success"]);
    assert_eq!("Internal Server Error: Failed to send email", body["details"]);
}

#[tokio::test]
async fn test_email_rejects_invalid_bodies() {
    let app = TestApp::spawn().await;
    let cases = vec![
        (
            serde_json::json!({ "to": "ops", "subject": "Hi", "text": "x" }),
            "invalid recipient",
        ),
        (
            serde_json::json!({ "to": "ops@test.com", "subject": " ", "text": "x" }),
            "blank subject",
        ),
        (
            serde_json::json!({ "to": "ops@test.com", "subject": "Hi" }),
            "no body",
        ),
        (serde_json::json!({ "subject": "Hi", "text": "x" }), "missing recipient"),
    ];

    for (body, reason) in cases {
        let res = app.send_test_email(&body).await.unwrap();

        assert_eq!(
            400,
            res.status().as_u16(),
            "The API did not fail with 400 when the body had {}",
            reason
        );
    }
}
