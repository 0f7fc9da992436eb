use reqwest::Method;

use serde_json::Value;

use crate::helpers::{NewReminder, TestApp};

fn dentist<'a>(date: &'a str, time: Option<&'a str>) -> NewReminder<'a> {
    NewReminder {
        email: "owner@test.com",
        title: "Dentist",
        date,
        time,
        description: None,
    }
}

#[tokio::test]
async fn create_returns_the_stored_reminder() {
    let app = TestApp::spawn().await;

    let reminder = app.given_reminder(&dentist("2024-06-01", Some("15:00"))).await;

    assert_eq!("owner@test.com", reminder["email"]);
    assert_eq!("2024-06-01", reminder["date"]);
    assert_eq!("15:00", reminder["time"]);
    assert_eq!(false, reminder["isCompleted"]);
    assert!(reminder["id"].is_string());
}

#[tokio::test]
async fn create_rejects_invalid_input() {
    let app = TestApp::spawn().await;

    let test_cases = vec![
        ("impossible date", dentist("2024-02-30", None)),
        ("malformed date", dentist("June 1st", None)),
        ("impossible time", dentist("2024-06-01", Some("25:00"))),
        (
            "blank title",
            NewReminder {
                title: "   ",
                ..dentist("2024-06-01", None)
            },
        ),
        (
            "malformed email",
            NewReminder {
                email: "owner",
                ..dentist("2024-06-01", None)
            },
        ),
    ];

    for (desc, reminder) in test_cases {
        let res = app
            .reminder_create(&reminder)
            .await
            .expect("Failed to execute request");

        assert_eq!(400, res.status().as_u16(), "Did not reject {}", desc);
        let body: Value = res.json().await.unwrap();
        assert_eq!(false, body["success"], "Unexpected body for {}", desc);
    }

    let all: Value = app.request(Method::GET, "reminders").send().await.unwrap().json().await.unwrap();
    assert_eq!(serde_json::json!([]), all);
}

#[tokio::test]
async fn malformed_json_is_a_structured_bad_request() {
    let app = TestApp::spawn().await;

    let res = app
        .request(Method::POST, "reminders")
        .header("Content-Type", "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();

    assert_eq!(400, res.status().as_u16());
    let body: Value = res.json().await.unwrap();
    assert_eq!("Invalid request", body["error"]);
}

#[tokio::test]
async fn list_filters_by_owner_and_date() {
    let app = TestApp::spawn().await;
    app.given_reminder(&dentist("2024-06-01", None)).await;
    app.given_reminder(&dentist("2024-06-02", None)).await;
    app.given_reminder(&NewReminder {
        email: "other@test.com",
        ..dentist("2024-06-01", None)
    })
    .await;

    let by_owner: Value = app
        .request(Method::GET, "reminders?email=owner@test.com")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let by_date: Value = app
        .request(Method::GET, "reminders?date=2024-06-01")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let by_both: Value = app
        .request(Method::GET, "reminders?email=owner@test.com&date=2024-06-02")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(2, by_owner.as_array().unwrap().len());
    assert_eq!(2, by_date.as_array().unwrap().len());
    assert_eq!(1, by_both.as_array().unwrap().len());
}

#[tokio::test]
async fn upcoming_lists_open_reminders_in_order() {
    let app = TestApp::spawn().await;
    // The test clock reads 2024-06-01
    app.given_reminder(&dentist("2024-06-03", Some("10:00"))).await;
    app.given_reminder(&dentist("2024-06-01", Some("18:00"))).await;
    app.given_reminder(&dentist("2024-06-01", None)).await;
    app.given_reminder(&dentist("2024-05-31", None)).await;
    app.given_reminder(&dentist("2024-06-20", None)).await;
    let done = app.given_reminder(&dentist("2024-06-02", None)).await;
    app.request(Method::POST, &format!("reminders/{}/toggle", done["id"].as_str().unwrap()))
        .send()
        .await
        .unwrap();

    let upcoming: Value = app
        .request(Method::GET, "reminders/upcoming?email=owner@test.com")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let schedule: Vec<(String, Value)> = upcoming
        .as_array()
        .unwrap()
        .iter()
        .map(|r| (r["date"].as_str().unwrap().to_string(), r["time"].clone()))
        .collect();
    assert_eq!(
        vec![
            ("2024-06-01".to_string(), Value::Null),
            ("2024-06-01".to_string(), Value::from("18:00")),
            ("2024-06-03".to_string(), Value::from("10:00")),
        ],
        schedule
    );
}

#[tokio::test]
async fn patch_updates_and_clears_fields() {
    let app = TestApp::spawn().await;
    let created = app
        .given_reminder(&NewReminder {
            description: Some("Bring X-rays"),
            ..dentist("2024-06-01", Some("15:00"))
        })
        .await;
    let url = format!("reminders/{}", created["id"].as_str().unwrap());

    let res = app
        .request(Method::PATCH, &url)
        .json(&serde_json::json!({ "title": "Orthodontist", "time": null }))
        .send()
        .await
        .unwrap();
    assert_eq!(200, res.status().as_u16());

    let updated: Value = app.request(Method::GET, &url).send().await.unwrap().json().await.unwrap();
    assert_eq!("Orthodontist", updated["title"]);
    assert!(updated["time"].is_null());
    assert_eq!("Bring X-rays", updated["description"]);
}

#[tokio::test]
async fn toggle_flips_completion() {
    let app = TestApp::spawn().await;
    let created = app.given_reminder(&dentist("2024-06-01", None)).await;
    let url = format!("reminders/{}/toggle", created["id"].as_str().unwrap());

    let once: Value = app.request(Method::POST, &url).send().await.unwrap().json().await.unwrap();
    let twice: Value = app.request(Method::POST, &url).send().await.unwrap().json().await.unwrap();

    assert_eq!(true, once["isCompleted"]);
    assert_eq!(false, twice["isCompleted"]);
}

#[tokio::test]
async fn missing_reminders_are_not_found() {
    let app = TestApp::spawn().await;
    let created = app.given_reminder(&dentist("2024-06-01", None)).await;
    let url = format!("reminders/{}", created["id"].as_str().unwrap());

    assert_eq!(200, app.request(Method::DELETE, &url).send().await.unwrap().status().as_u16());
    assert_eq!(404, app.request(Method::DELETE, &url).send().await.unwrap().status().as_u16());
    assert_eq!(404, app.request(Method::GET, &url).send().await.unwrap().status().as_u16());
}

#[tokio::test]
async fn malformed_ids_are_bad_requests() {
    let app = TestApp::spawn().await;

    let res = app.request(Method::GET, "reminders/not-a-uuid").send().await.unwrap();

    assert_eq!(400, res.status().as_u16());
}
