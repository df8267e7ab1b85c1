mod support;

use reqwest::StatusCode;
use serde_json::json;
use support::{spawn_app, titles, User};

#[tokio::test]
async fn private_event_visibility() {
    let base = spawn_app().await;
    let u1 = User::with_profile(&base, "u1").await;
    let u2 = User::with_profile(&base, "u2").await;
    let anonymous = User::anonymous(&base);

    let id = u1.create_event("Secret dinner", true).await;

    let (_, list) = u1.get("/e").await;
    assert_eq!(titles(&list), vec!["Secret dinner"]);
    let (_, list) = u2.get("/e").await;
    assert!(titles(&list).is_empty());
    let (status, list) = anonymous.get("/e").await;
    assert_eq!(status, StatusCode::OK);
    assert!(titles(&list).is_empty());

    let (status, _) = u2.get(&format!("/e/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = anonymous.get(&format!("/e/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // the id works as an invitation
    let (status, event) = u2.post(&format!("/e/{id}/join"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(event["attendees"], json!(["u1", "u2"]));

    let (_, list) = u2.get("/e").await;
    assert_eq!(titles(&list), vec!["Secret dinner"]);
    let (status, detail) = u2.get(&format!("/e/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["joined"], true);
    assert_eq!(detail["going"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn joining_is_idempotent_and_leaving_works() {
    let base = spawn_app().await;
    let u1 = User::with_profile(&base, "u1").await;
    let u2 = User::with_profile(&base, "u2").await;
    let id = u1.create_event("Hike", false).await;

    u2.post(&format!("/e/{id}/join"), json!({})).await;
    let (_, event) = u2.post(&format!("/e/{id}/join"), json!({})).await;
    assert_eq!(event["attendees"], json!(["u1", "u2"]));

    let (_, event) = u2.post(&format!("/e/{id}/leave"), json!({})).await;
    assert_eq!(event["attendees"], json!(["u1"]));

    let (status, _) = u2.post("/e/missing/join", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn joined_events_come_first() {
    let base = spawn_app().await;
    let u1 = User::with_profile(&base, "u1").await;
    let u2 = User::with_profile(&base, "u2").await;
    let anonymous = User::anonymous(&base);

    let older = u1.create_event("Older", false).await;
    u1.create_event("Middle", false).await;
    u1.create_event("Newest", false).await;

    let (_, list) = anonymous.get("/e").await;
    assert_eq!(titles(&list), vec!["Newest", "Middle", "Older"]);

    u2.post(&format!("/e/{older}/join"), json!({})).await;
    let (_, list) = u2.get("/e").await;
    assert_eq!(titles(&list), vec!["Older", "Newest", "Middle"]);
    assert_eq!(list[0]["joined"], true);
    assert_eq!(list[1]["joined"], false);
}

#[tokio::test]
async fn category_filter() {
    let base = spawn_app().await;
    let u1 = User::with_profile(&base, "u1").await;
    u1.create_event("Coffee", false).await;
    let (status, _) = u1
        .post("/e", json!({ "title": "Trail", "category": "hiking" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, list) = u1.get("/e?category=hiking").await;
    assert_eq!(titles(&list), vec!["Trail"]);
    let (_, list) = u1.get("/e?category=All").await;
    assert_eq!(list.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn only_the_creator_edits_and_deletes() {
    let base = spawn_app().await;
    let u1 = User::with_profile(&base, "u1").await;
    let u2 = User::with_profile(&base, "u2").await;
    let id = u1.create_event("Picnic", false).await;

    let (status, _) = u2.put(&format!("/e/{id}"), json!({ "title": "Mine now" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = u2.delete(&format!("/e/{id}")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, edited) = u1
        .put(&format!("/e/{id}"), json!({ "title": "Picnic v2", "category": "food" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited["title"], "Picnic v2");
    assert_eq!(edited["attendees"], json!(["u1"]));

    let (status, _) = u1.put(&format!("/e/{id}"), json!({ "title": "  " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = u1.delete(&format!("/e/{id}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = u1.get(&format!("/e/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
