mod common;

use std::sync::Arc;
use std::time::Duration;

use brain_core::{AudioClip, BrainError, InboundMessage, MessageKind, ModelResponse};
use common::{engine, test_db, RecordingSender, Sent};
use database::{device_mapping, keyword, turns, Database, KeywordKind, NewDeviceMapping, NewKeywordRule};
use mock_brain::{DelayedBrain, ScriptedBrain};
use orchestrator::{
    FailureKind, RouteOutcome, Router, RouterConfig, GENERIC_ERROR_MESSAGE, HELP_TEXT,
    QUOTA_EXCEEDED_MESSAGE, RESET_CONFIRMATION,
};

const ALICE: &str = "+972500000001";
const BOB: &str = "+972500000002";

struct Fixture {
    db: Database,
    brain: Arc<ScriptedBrain>,
    sender: Arc<RecordingSender>,
    router: Router,
}

async fn fixture(config: RouterConfig) -> Fixture {
    let db = test_db().await;
    let brain = Arc::new(ScriptedBrain::new());
    let sender = Arc::new(RecordingSender::default());
    let router = Router::new(engine(brain.clone(), &db), sender.clone(), config);
    Fixture {
        db,
        brain,
        sender,
        router,
    }
}

fn no_ack() -> RouterConfig {
    RouterConfig {
        ack_reaction: None,
        ..RouterConfig::default()
    }
}

async fn add_keyword(db: &Database, pattern: &str, kind: KeywordKind, payload: &str) {
    keyword::create(
        db.pool(),
        &NewKeywordRule {
            pattern: pattern.to_string(),
            kind,
            payload: payload.to_string(),
            enabled: true,
        },
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn test_static_keyword_bypasses_engine() {
    let f = fixture(no_ack()).await;
    add_keyword(&f.db, "status,סטטוס", KeywordKind::Static, "ok").await;

    for input in ["status", "סטטוס"] {
        let outcome = f.router.route(InboundMessage::text(ALICE, input)).await;
        assert_eq!(outcome, RouteOutcome::Replied("ok".to_string()));
    }

    assert_eq!(f.brain.call_count(), 0);
    assert_eq!(
        f.sender.messages(),
        vec![
            (ALICE.to_string(), "ok".to_string()),
            (ALICE.to_string(), "ok".to_string())
        ]
    );
}

#[tokio::test]
async fn test_ai_keyword_forwards_with_instructions() {
    let f = fixture(no_ack()).await;
    add_keyword(&f.db, "good night", KeywordKind::Ai, "Wish the family good night").await;
    f.brain.push_text("Good night everyone!");

    let outcome = f.router.route(InboundMessage::text(ALICE, "Good Night")).await;
    assert_eq!(outcome, RouteOutcome::Replied("Good night everyone!".to_string()));

    let request = &f.brain.requests()[0];
    assert_eq!(
        request.messages.last().unwrap().content,
        "Wish the family good night\n\nGood Night"
    );
}

#[tokio::test]
async fn test_text_goes_to_engine_and_reply_to_destination() {
    let f = fixture(no_ack()).await;
    f.brain.push_text("Pasta!");

    let message = InboundMessage::text(ALICE, "what's for dinner?").with_destination("family-group");
    let outcome = f.router.route(message).await;

    assert_eq!(outcome, RouteOutcome::Replied("Pasta!".to_string()));
    assert_eq!(
        f.sender.messages(),
        vec![("family-group".to_string(), "Pasta!".to_string())]
    );
}

#[tokio::test]
async fn test_voice_goes_to_audio_path() {
    let f = fixture(no_ack()).await;
    f.brain.push_text("Turned it on.");

    let clip = AudioClip::new(vec![0, 1, 2], "audio/ogg");
    let outcome = f.router.route(InboundMessage::voice(ALICE, clip.clone())).await;

    assert_eq!(outcome, RouteOutcome::Replied("Turned it on.".to_string()));
    assert_eq!(f.brain.requests()[0].messages[0].audio.as_ref(), Some(&clip));
}

#[tokio::test]
async fn test_ignored_inputs() {
    let f = fixture(RouterConfig::default()).await;

    let empty = InboundMessage::text(ALICE, "   ").with_id("m1");
    assert_eq!(f.router.route(empty).await, RouteOutcome::Ignored);

    let mut sticker = InboundMessage::text(ALICE, "").with_id("m2");
    sticker.kind = MessageKind::Other;
    assert_eq!(f.router.route(sticker).await, RouteOutcome::Ignored);

    assert!(f.sender.sent().is_empty());
    assert_eq!(f.brain.call_count(), 0);
}

#[tokio::test]
async fn test_ack_reaction_precedes_reply() {
    let f = fixture(RouterConfig::default()).await;
    f.brain.push_text("Hi!");

    f.router
        .route(InboundMessage::text(ALICE, "hello").with_id("msg-7"))
        .await;

    assert_eq!(
        f.sender.sent(),
        vec![
            Sent::Reaction {
                to: ALICE.to_string(),
                message_id: "msg-7".to_string(),
                emoji: "👀".to_string(),
            },
            Sent::Message {
                to: ALICE.to_string(),
                text: "Hi!".to_string(),
            },
        ]
    );
}

#[tokio::test]
async fn test_failures_map_to_fixed_messages() {
    let f = fixture(no_ack()).await;
    f.brain.push_error(BrainError::QuotaExceeded("rate limit".to_string()));
    f.brain.push_error(BrainError::Network("connection reset".to_string()));
    f.brain.push_text("Back to normal.");

    let first = f.router.route(InboundMessage::text(ALICE, "hello")).await;
    let second = f.router.route(InboundMessage::text(ALICE, "hello?")).await;
    let third = f.router.route(InboundMessage::text(ALICE, "hello??")).await;

    assert_eq!(first, RouteOutcome::Failed(FailureKind::Quota));
    assert_eq!(second, RouteOutcome::Failed(FailureKind::Generic));
    assert_eq!(third, RouteOutcome::Replied("Back to normal.".to_string()));

    let texts: Vec<String> = f.sender.messages().into_iter().map(|(_, t)| t).collect();
    assert_eq!(
        texts,
        vec![
            QUOTA_EXCEEDED_MESSAGE.to_string(),
            GENERIC_ERROR_MESSAGE.to_string(),
            "Back to normal.".to_string()
        ]
    );
    assert_eq!(f.brain.call_count(), 3);
}

#[tokio::test]
async fn test_empty_answer_is_silent() {
    let f = fixture(no_ack()).await;
    f.brain.push(Ok(ModelResponse::default()));

    let outcome = f.router.route(InboundMessage::text(ALICE, "hmm")).await;
    assert_eq!(outcome, RouteOutcome::Silent);
    assert!(f.sender.sent().is_empty());
}

#[tokio::test]
async fn test_commands() {
    let f = fixture(no_ack()).await;
    turns::insert_turn(f.db.pool(), ALICE, "user", "old").await.unwrap();
    device_mapping::create(
        f.db.pool(),
        &NewDeviceMapping {
            entity_id: "light.salon".to_string(),
            nickname: "מנורה".to_string(),
            location: "סלון".to_string(),
            category: "light".to_string(),
        },
    )
    .await
    .unwrap();

    let help = f.router.route(InboundMessage::text(ALICE, "/help")).await;
    assert_eq!(help, RouteOutcome::Replied(HELP_TEXT.to_string()));

    for _ in 0..2 {
        let reset = f.router.route(InboundMessage::text(ALICE, "/reset")).await;
        assert_eq!(reset, RouteOutcome::Replied(RESET_CONFIRMATION.to_string()));
        assert_eq!(turns::count_turns(f.db.pool(), ALICE).await.unwrap(), 0);
    }

    let RouteOutcome::Replied(devices) = f.router.route(InboundMessage::text(ALICE, "/devices")).await
    else {
        panic!("expected a device listing");
    };
    assert!(devices.contains("מנורה"));
    assert!(devices.contains("light.salon"));

    let RouteOutcome::Replied(unknown) = f.router.route(InboundMessage::text(ALICE, "/weather")).await
    else {
        panic!("expected an unknown command reply");
    };
    assert!(unknown.contains("/help"));

    assert_eq!(f.brain.call_count(), 0);
}

#[tokio::test]
async fn test_single_flight_per_sender() {
    let db = test_db().await;
    let scripted = ScriptedBrain::new();
    scripted.set_fallback(ModelResponse::text("done"));
    let brain = Arc::new(DelayedBrain::new(scripted, Duration::from_millis(300)));
    let sender = Arc::new(RecordingSender::default());
    let router = Router::new(engine(brain.clone(), &db), sender.clone(), no_ack());

    let (first, second, other) = tokio::join!(
        router.route(InboundMessage::text(ALICE, "tell me a story")),
        async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            assert!(router.is_in_flight(ALICE));
            router.route(InboundMessage::text(ALICE, "are you there?")).await
        },
        async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            router.route(InboundMessage::text(BOB, "hi")).await
        },
    );

    assert_eq!(first, RouteOutcome::Replied("done".to_string()));
    assert_eq!(second, RouteOutcome::Dropped);
    assert_eq!(other, RouteOutcome::Replied("done".to_string()));
    assert_eq!(brain.inner().call_count(), 2);

    // The dropped message left nothing behind.
    let stored = turns::recent_turns(db.pool(), ALICE, 10).await.unwrap();
    assert!(stored.iter().all(|t| t.content != "are you there?"));

    // The slot is released afterwards.
    assert!(!router.is_in_flight(ALICE));
    let again = router.route(InboundMessage::text(ALICE, "another one")).await;
    assert_eq!(again, RouteOutcome::Replied("done".to_string()));
}

#[tokio::test]
async fn test_session_timeout_clears_history() {
    let f = fixture(RouterConfig {
        session_timeout: Duration::from_millis(100),
        ack_reaction: None,
        ..RouterConfig::default()
    })
    .await;
    f.brain.set_fallback(ModelResponse::text("sure"));

    f.router.route(InboundMessage::text(ALICE, "let's plan dinner")).await;
    f.router.route(InboundMessage::text(ALICE, "pasta or rice?")).await;
    tokio::time::sleep(Duration::from_millis(250)).await;
    f.router.route(InboundMessage::text(ALICE, "new topic")).await;

    let requests = f.brain.requests();
    // Within the timeout the previous exchange is replayed.
    assert_eq!(requests[1].messages.len(), 3);
    // After the timeout the history is gone.
    assert_eq!(requests[2].messages.len(), 1);
    assert_eq!(turns::count_turns(f.db.pool(), ALICE).await.unwrap(), 2);
}
