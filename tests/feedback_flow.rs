//! End-to-end feedback intake flows over mock gateways.
//!
//! Drives the full extraction engine: progressive completion across
//! turns, commit-once behavior, contract-violation recovery and failure
//! isolation on the commit path.

use std::sync::Arc;

use serde_json::json;

use civic_scribe::adapters::ai::MockChatModel;
use civic_scribe::adapters::geocoding::StaticGeocoder;
use civic_scribe::adapters::store::InMemoryOpinionStore;
use civic_scribe::application::{FeedbackService, TurnError};
use civic_scribe::domain::feedback::{Category, ExtractionPolicy, FeedbackForm, Message};
use civic_scribe::domain::opinion::Coordinates;
use civic_scribe::ports::ModelReply;

const CONTACT: &str = "resident@example.com";

fn service(
    model: &MockChatModel,
    geocoder: StaticGeocoder,
    store: &InMemoryOpinionStore,
) -> FeedbackService {
    FeedbackService::new(
        Arc::new(model.clone()),
        Arc::new(geocoder),
        Arc::new(store.clone()),
        ExtractionPolicy::new("Collect the resident's feedback fields."),
    )
}

fn reply(answer: &str, form: serde_json::Value, complete: bool) -> ModelReply {
    ModelReply::Structured(json!({
        "answer": answer,
        "form": form,
        "formComplete": complete
    }))
}

#[tokio::test]
async fn progressive_completion_commits_exactly_once() {
    let model = MockChatModel::new()
        .with_reply(reply(
            "Thanks - what should I call this?",
            json!({
                "category": "request",
                "description": "street light is out",
                "place": "Chuo, Tokyo"
            }),
            false,
        ))
        .with_reply(reply(
            "All set, your feedback is registered.",
            json!({"title": "broken street light"}),
            true,
        ))
        .with_reply(reply("Happy to help!", json!({}), true));
    let store = InMemoryOpinionStore::new();
    let svc = service(
        &model,
        StaticGeocoder::at(Coordinates::new(35.6717, 139.7722)),
        &store,
    );

    // Turn 1: three fields arrive, title still missing.
    let mut history = vec![Message::user(
        "The street light near my flat in Chuo, Tokyo is out.",
    )];
    let turn_one = svc.invoke(CONTACT, &history, None).await.unwrap();

    assert!(!turn_one.form_complete);
    assert_eq!(turn_one.form.category, Some(Category::Request));
    assert_eq!(turn_one.form.title, None);
    assert!(store.records().is_empty());

    // Turn 2: the title arrives and the form completes; one record lands.
    history.push(Message::assistant(turn_one.answer.clone()));
    history.push(Message::user("Call it broken street light."));
    let turn_two = svc
        .invoke(CONTACT, &history, Some(turn_one.form))
        .await
        .unwrap();

    assert!(turn_two.form_complete);
    assert!(turn_two.form.is_complete());
    let records = store.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].contact, CONTACT);
    assert_eq!(records[0].description, "street light is out");
    assert_eq!(records[0].latitude, 35.6717);
    assert_eq!(records[0].longitude, 139.7722);

    // Turn 3: the resident keeps chatting; the form stays complete but no
    // second record is created.
    history.push(Message::assistant(turn_two.answer.clone()));
    history.push(Message::user("Thanks a lot!"));
    let turn_three = svc
        .invoke(CONTACT, &history, Some(turn_two.form))
        .await
        .unwrap();

    assert!(turn_three.form_complete);
    assert_eq!(store.records().len(), 1);
}

#[tokio::test]
async fn empty_history_never_reaches_the_gateway() {
    let model = MockChatModel::new();
    let store = InMemoryOpinionStore::new();
    let svc = service(&model, StaticGeocoder::not_found(), &store);

    let err = svc
        .invoke(CONTACT, &[], Some(FeedbackForm::empty()))
        .await
        .unwrap_err();

    assert!(matches!(err, TurnError::EmptyConversation));
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn contract_violation_neither_regresses_nor_advances_the_form() {
    let model = MockChatModel::new()
        .with_reply(ModelReply::Text("sorry, I lost the plot".to_string()));
    let store = InMemoryOpinionStore::new();
    let svc = service(&model, StaticGeocoder::not_found(), &store);

    let prior = FeedbackForm {
        title: Some("broken street light".to_string()),
        category: Some(Category::Request),
        description: Some("street light is out".to_string()),
        place: None,
    };
    let turn = svc
        .invoke(CONTACT, &[Message::user("hm?")], Some(prior.clone()))
        .await
        .unwrap();

    assert_eq!(turn.answer, "sorry, I lost the plot");
    assert_eq!(turn.form, prior);
    assert!(!turn.form_complete);
    assert!(store.records().is_empty());
}

#[tokio::test]
async fn violation_on_a_complete_form_keeps_reporting_complete() {
    let model = MockChatModel::new().with_reply(ModelReply::Structured(json!({
        "answer": "ok",
        "form": {"bogus": "keys"},
        "formComplete": false
    })));
    let store = InMemoryOpinionStore::new();
    let svc = service(
        &model,
        StaticGeocoder::at(Coordinates::new(1.0, 2.0)),
        &store,
    );

    let complete = FeedbackForm {
        title: Some("t".to_string()),
        category: Some(Category::Praise),
        description: Some("d".to_string()),
        place: Some("p".to_string()),
    };
    let turn = svc
        .invoke(CONTACT, &[Message::user("more chat")], Some(complete.clone()))
        .await
        .unwrap();

    // Completeness is not regressed by the violation, and the already
    // complete form does not trigger another commit.
    assert!(turn.form_complete);
    assert_eq!(turn.form, complete);
    assert!(store.records().is_empty());
}

#[tokio::test]
async fn string_encoded_patch_completes_the_form() {
    let model = MockChatModel::new().with_reply(ModelReply::Structured(json!({
        "answer": "Registered!",
        "form": "{\"title\":\"broken street light\"}",
        "formComplete": true
    })));
    let store = InMemoryOpinionStore::new();
    let svc = service(
        &model,
        StaticGeocoder::at(Coordinates::new(35.0, 139.0)),
        &store,
    );

    let prior = FeedbackForm {
        category: Some(Category::Request),
        description: Some("street light is out".to_string()),
        place: Some("Chuo, Tokyo".to_string()),
        ..Default::default()
    };
    let turn = svc
        .invoke(CONTACT, &[Message::user("title it please")], Some(prior))
        .await
        .unwrap();

    assert!(turn.form_complete);
    assert_eq!(store.records().len(), 1);
}

#[tokio::test]
async fn geocode_miss_completes_the_turn_without_a_record() {
    let model = MockChatModel::new().with_reply(reply(
        "Registered!",
        json!({
            "title": "broken street light",
            "category": "request",
            "description": "street light is out",
            "place": "somewhere unresolvable"
        }),
        true,
    ));
    let store = InMemoryOpinionStore::new();
    let svc = service(&model, StaticGeocoder::not_found(), &store);

    let turn = svc
        .invoke(CONTACT, &[Message::user("all the details at once")], None)
        .await
        .unwrap();

    assert!(turn.form_complete);
    assert!(store.records().is_empty());
}

#[tokio::test]
async fn gateway_failure_leaves_the_caller_form_retryable() {
    let model = MockChatModel::new()
        .with_error(civic_scribe::ports::ModelError::unavailable("down"))
        .with_reply(reply("back now", json!({"title": "t"}), false));
    let store = InMemoryOpinionStore::new();
    let svc = service(&model, StaticGeocoder::not_found(), &store);

    let history = vec![Message::user("hello")];
    let prior = FeedbackForm {
        description: Some("street light is out".to_string()),
        ..Default::default()
    };

    let err = svc
        .invoke(CONTACT, &history, Some(prior.clone()))
        .await
        .unwrap_err();
    assert!(matches!(err, TurnError::Gateway(_)));

    // The caller retries with the same prior form and the turn succeeds.
    let retried = svc.invoke(CONTACT, &history, Some(prior)).await.unwrap();
    assert_eq!(retried.form.title.as_deref(), Some("t"));
    assert_eq!(
        retried.form.description.as_deref(),
        Some("street light is out")
    );
}
