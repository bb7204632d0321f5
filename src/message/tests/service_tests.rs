//! Tests for the create, update and group create flows.

use super::fixtures::{FixedClock, clock, create_ok, created_message, ready_message, update_ok};
use crate::message::{
    adapters::{InMemoryMessageTransport, RecordedRequest},
    domain::{Message, MessageDefaults, MessageGroup, ServiceResponse, UpdateBlock},
    error::{ErrorKind, MessageError, ValidationError},
    ports::{MockMessageTransport, TransportError},
    services::MessageService,
};
use rstest::{fixture, rstest};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

#[fixture]
fn memory() -> Arc<InMemoryMessageTransport> {
    Arc::new(InMemoryMessageTransport::new())
}

fn service(transport: &Arc<InMemoryMessageTransport>) -> MessageService<InMemoryMessageTransport> {
    MessageService::new(Arc::clone(transport))
}

fn untouched_mock() -> MessageService<MockMessageTransport> {
    let mut mock = MockMessageTransport::new();
    mock.expect_create_message().never();
    mock.expect_update_message().never();
    mock.expect_create_message_group().never();
    MessageService::new(Arc::new(mock))
}

// ============================================================================
// send
// ============================================================================

#[rstest]
#[tokio::test]
async fn send_assigns_message_id_and_completes(ready_message: Message) -> eyre::Result<()> {
    let mut mock = MockMessageTransport::new();
    mock.expect_create_message()
        .withf(|payload, timeout| {
            payload.platform == "slack" && *timeout == Duration::from_millis(5000)
        })
        .times(1)
        .returning(|_, _| Ok(create_ok("abc")));
    let service = MessageService::new(Arc::new(mock));

    let mut message = ready_message;
    let sent = service.send(&mut message).await?;
    eyre::ensure!(sent.message_id() == Some("abc"));
    eyre::ensure!(message.create_entry_started());
    eyre::ensure!(message.create_entry_completed());
    eyre::ensure!(message.create_response() == Some(&json!({"status": 200, "message_id": "abc"})));
    eyre::ensure!(!message.cannot_be_updated().is_blocked());
    Ok(())
}

#[rstest]
#[tokio::test]
async fn send_twice_fails_without_second_request(ready_message: Message) -> eyre::Result<()> {
    let mut mock = MockMessageTransport::new();
    mock.expect_create_message()
        .times(1)
        .returning(|_, _| Ok(create_ok("abc")));
    let service = MessageService::new(Arc::new(mock));

    let mut message = ready_message;
    service.send(&mut message).await?;
    let second = service.send(&mut message).await;
    eyre::ensure!(matches!(second, Err(MessageError::AlreadySent)));
    Ok(())
}

#[rstest]
#[tokio::test]
async fn send_rejects_invalid_payload_without_state_change(clock: FixedClock) {
    let service = untouched_mock();
    let mut message = Message::with_credentials("k", "u", &clock);

    let result = service.send(&mut message).await;
    assert!(matches!(
        result,
        Err(MessageError::Validation(ValidationError::RequiredKeysNotSet(_)))
    ));
    assert!(!message.create_entry_started());
    assert!(matches!(message.cannot_be_updated(), UpdateBlock::Clear));
}

#[rstest]
#[tokio::test]
async fn send_rejects_not_handled_agent_message(ready_message: Message) {
    let service = untouched_mock();
    let mut message = ready_message;
    message.set_as_type_agent().set_as_not_handled();

    let error = service.send(&mut message).await.err();
    assert!(matches!(
        error,
        Some(MessageError::Validation(ValidationError::NotHandledValidation))
    ));
    assert!(error.is_some_and(|err| err.is_local()));
}

#[rstest]
#[case::empty(ServiceResponse::empty(200), "EmptyCreateResponse")]
#[case::bad_status(ServiceResponse::ok(json!({"status": 400})), "BadStatusCreateResponse")]
#[case::no_id(ServiceResponse::ok(json!({"status": 200})), "BadMessageIdCreateResponse")]
#[tokio::test]
async fn send_records_response_failures(
    ready_message: Message,
    memory: Arc<InMemoryMessageTransport>,
    #[case] response: ServiceResponse,
    #[case] expected: &str,
) -> eyre::Result<()> {
    memory.push_create_response(Ok(response.clone()))?;
    let mut message = ready_message;

    let error = service(&memory)
        .send(&mut message)
        .await
        .err()
        .ok_or_else(|| eyre::eyre!("send should fail"))?;
    eyre::ensure!(format!("{error:?}").starts_with(expected), "got {error:?}");
    eyre::ensure!(error.kind() == ErrorKind::ResponseShape);

    eyre::ensure!(message.create_entry_started());
    eyre::ensure!(!message.create_entry_completed());
    let UpdateBlock::CreateErrored(failure) = message.cannot_be_updated() else {
        eyre::bail!("create failure should block updates");
    };
    eyre::ensure!(failure.response() == Some(&response));
    Ok(())
}

#[rstest]
#[tokio::test]
async fn send_records_transport_failures(ready_message: Message) -> eyre::Result<()> {
    let mut mock = MockMessageTransport::new();
    mock.expect_create_message().times(1).returning(|_, _| {
        Err(TransportError::HttpStatus {
            status: 503,
            body: None,
        })
    });
    let service = MessageService::new(Arc::new(mock));
    let mut message = ready_message;

    let result = service.send(&mut message).await;
    let Err(MessageError::Transport(TransportError::HttpStatus { status, .. })) = result else {
        eyre::bail!("expected transport error, got {result:?}");
    };
    eyre::ensure!(status == 503);
    let failure = message
        .cannot_be_updated()
        .failure()
        .ok_or_else(|| eyre::eyre!("failure recorded"))?;
    eyre::ensure!(failure.response().is_none());
    eyre::ensure!(failure.error().is_transport());
    Ok(())
}

#[rstest]
#[tokio::test]
async fn send_keeps_non_string_message_id_unset(
    ready_message: Message,
    memory: Arc<InMemoryMessageTransport>,
) -> eyre::Result<()> {
    memory.push_create_response(Ok(ServiceResponse::ok(json!({"status": 200, "message_id": 77}))))?;
    let mut message = ready_message;
    service(&memory).send(&mut message).await?;
    eyre::ensure!(message.create_entry_completed());
    eyre::ensure!(message.message_id().is_none());
    Ok(())
}

#[rstest]
#[tokio::test]
async fn send_honours_message_timeout(
    ready_message: Message,
    memory: Arc<InMemoryMessageTransport>,
) -> eyre::Result<()> {
    memory.push_create_response(Ok(create_ok("late")))?;
    memory.set_latency(Duration::from_millis(200))?;
    let mut message = ready_message;
    message.set_client_timeout(Duration::from_millis(10));

    let result = service(&memory).send(&mut message).await;
    eyre::ensure!(matches!(
        result,
        Err(MessageError::Transport(TransportError::Timeout(timeout))) if timeout == Duration::from_millis(10)
    ));
    eyre::ensure!(message.cannot_be_updated().is_blocked());
    Ok(())
}

// ============================================================================
// update
// ============================================================================

#[rstest]
#[tokio::test]
async fn update_sends_only_flagged_fields(
    created_message: Message,
    memory: Arc<InMemoryMessageTransport>,
) -> eyre::Result<()> {
    memory.push_update_response(Ok(update_ok()))?;
    let mut message = created_message;
    message.set_intent("refund").set_as_not_handled();

    service(&memory).update(&mut message).await?;
    eyre::ensure!(message.update_entry_started());
    eyre::ensure!(message.update_entry_completed());
    eyre::ensure!(message.update_response() == update_ok().body());

    let requests = memory.requests()?;
    let [RecordedRequest::Update { query, body }] = requests.as_slice() else {
        eyre::bail!("expected a single update request, got {requests:?}");
    };
    eyre::ensure!(query.api_key == "test-key" && query.message_id == "abc");
    eyre::ensure!(serde_json::to_value(body)? == json!({"intent": "refund", "not_handled": true}));
    Ok(())
}

#[rstest]
#[tokio::test]
async fn update_before_create_fails(ready_message: Message) {
    let service = untouched_mock();
    let mut message = ready_message;
    assert!(matches!(
        service.update(&mut message).await,
        Err(MessageError::MustBeSentFirst)
    ));
}

#[rstest]
#[tokio::test]
async fn update_after_failed_create_is_blocked(
    ready_message: Message,
    memory: Arc<InMemoryMessageTransport>,
) -> eyre::Result<()> {
    memory.push_create_response(Ok(ServiceResponse::empty(200)))?;
    let service = service(&memory);
    let mut message = ready_message;
    eyre::ensure!(service.send(&mut message).await.is_err());

    let result = service.update(&mut message).await;
    eyre::ensure!(matches!(result, Err(MessageError::CannotBeUpdated)));
    eyre::ensure!(memory.requests()?.len() == 1);
    Ok(())
}

#[rstest]
#[tokio::test]
async fn update_twice_fails(
    created_message: Message,
    memory: Arc<InMemoryMessageTransport>,
) -> eyre::Result<()> {
    memory.push_update_response(Ok(update_ok()))?;
    let service = service(&memory);
    let mut message = created_message;
    message.set_version("2");
    service.update(&mut message).await?;

    let result = service.update(&mut message).await;
    eyre::ensure!(matches!(result, Err(MessageError::AlreadyUpdated)));
    Ok(())
}

#[rstest]
#[tokio::test]
async fn update_failure_blocks_further_updates(
    created_message: Message,
    memory: Arc<InMemoryMessageTransport>,
) -> eyre::Result<()> {
    memory.push_update_response(Ok(ServiceResponse::ok(
        json!({"status": 400, "error": ["intent"]}),
    )))?;
    let service = service(&memory);
    let mut message = created_message;
    message.set_intent("x");

    let result = service.update(&mut message).await;
    eyre::ensure!(matches!(result, Err(MessageError::FieldsFailedToUpdate(ref fields)) if fields == &["intent"]));
    eyre::ensure!(matches!(message.cannot_be_updated(), UpdateBlock::UpdateErrored(_)));
    eyre::ensure!(!message.update_entry_completed());

    message.set_version("ignored");
    eyre::ensure!(!message.lifecycle().options_manifest().version);
    eyre::ensure!(matches!(
        service.update(&mut message).await,
        Err(MessageError::CannotBeUpdated)
    ));
    Ok(())
}

#[rstest]
#[tokio::test]
async fn update_records_transport_failures(
    created_message: Message,
    memory: Arc<InMemoryMessageTransport>,
) -> eyre::Result<()> {
    memory.push_update_response(Err(TransportError::Unavailable("offline".to_owned())))?;
    let service = service(&memory);
    let mut message = created_message;
    message.set_intent("x");

    let result = service.update(&mut message).await;
    eyre::ensure!(
        matches!(result, Err(MessageError::Transport(TransportError::Unavailable(_)))),
        "expected transport error, got {result:?}"
    );
    eyre::ensure!(message.update_entry_started());
    eyre::ensure!(!message.update_entry_completed());
    let UpdateBlock::UpdateErrored(failure) = message.cannot_be_updated() else {
        eyre::bail!("update failure should block further updates");
    };
    eyre::ensure!(failure.response().is_none());
    eyre::ensure!(failure.error().is_transport());

    eyre::ensure!(matches!(
        service.update(&mut message).await,
        Err(MessageError::CannotBeUpdated)
    ));
    eyre::ensure!(memory.requests()?.len() == 1);
    Ok(())
}

#[rstest]
#[tokio::test]
async fn update_validation_precedes_request(created_message: Message) {
    let service = untouched_mock();
    let mut message = created_message;
    message.set_as_type_agent().set_as_feedback();
    assert!(matches!(
        service.update(&mut message).await,
        Err(MessageError::Validation(ValidationError::FeedbackValidation))
    ));
    assert!(!message.update_entry_started());
}

#[rstest]
#[tokio::test]
async fn update_passes_timeout_to_transport(created_message: Message) -> eyre::Result<()> {
    let mut mock = MockMessageTransport::new();
    mock.expect_update_message()
        .withf(|query, _, timeout| query.message_id == "abc" && *timeout == Duration::from_secs(1))
        .times(1)
        .returning(|_, _, _| Ok(update_ok()));
    let service = MessageService::new(Arc::new(mock));
    let mut message = created_message;
    message.set_client_timeout(Duration::from_secs(1));
    service.update(&mut message).await?;
    Ok(())
}

// ============================================================================
// grouped messages
// ============================================================================

#[rstest]
#[tokio::test]
async fn grouped_members_cannot_be_sent_or_updated(clock: FixedClock) {
    let service = untouched_mock();
    let mut group = MessageGroup::new(MessageDefaults::new().with_api_key("k").with_user_id("u"));
    let member = group.add_message(&clock);
    member.set_platform("web").set_message("hi");

    assert!(matches!(
        service.send(member).await,
        Err(MessageError::CannotSendIndividualMessage)
    ));
    assert!(matches!(
        service.update(member).await,
        Err(MessageError::CannotUpdateIndividualMessage)
    ));
    assert!(!member.create_entry_started());
}

#[rstest]
#[tokio::test]
async fn send_group_posts_every_member(
    clock: FixedClock,
    memory: Arc<InMemoryMessageTransport>,
) -> eyre::Result<()> {
    let body = json!({
        "status": 200,
        "all_succeeded": true,
        "responses": [
            {"status": "success", "message_id": "1"},
            {"status": "success", "message_id": "2"},
        ],
    });
    memory.push_group_response(Ok(ServiceResponse::ok(body.clone())))?;
    let mut group = MessageGroup::new(
        MessageDefaults::new()
            .with_api_key("k")
            .with_user_id("u")
            .with_platform("web"),
    );
    group.add_message(&clock).set_message("first");
    group.add_message(&clock).set_message("second").set_as_type_agent();

    let sent = service(&memory).send_group(&mut group).await?;
    eyre::ensure!(sent.create_entry_completed());
    eyre::ensure!(group.create_response() == Some(&body));

    let requests = memory.requests()?;
    let [RecordedRequest::CreateGroup(payload)] = requests.as_slice() else {
        eyre::bail!("expected one group request, got {requests:?}");
    };
    let texts: Vec<_> = payload.messages.iter().map(|m| m.message.as_str()).collect();
    eyre::ensure!(texts == ["first", "second"]);
    Ok(())
}

#[rstest]
#[tokio::test]
async fn send_group_stops_at_first_invalid_member(clock: FixedClock) {
    let service = untouched_mock();
    let mut group = MessageGroup::new(MessageDefaults::new().with_api_key("k").with_user_id("u"));
    group.add_message(&clock).set_platform("web").set_message("ok");
    group
        .add_message(&clock)
        .set_platform("web")
        .set_message("bad")
        .set_as_type_agent()
        .set_as_feedback();
    group.add_message(&clock);

    assert!(matches!(
        service.send_group(&mut group).await,
        Err(MessageError::Validation(ValidationError::FeedbackValidation))
    ));
    assert!(!group.create_entry_started());
}

#[rstest]
#[tokio::test]
async fn send_group_reports_partial_failure(
    clock: FixedClock,
    memory: Arc<InMemoryMessageTransport>,
) -> eyre::Result<()> {
    memory.push_group_response(Ok(ServiceResponse::ok(json!({
        "status": 200,
        "all_succeeded": false,
        "responses": [
            {"status": "success", "message_id": "1"},
            {"status": "failure", "error": "bad platform"},
        ],
    }))))?;
    let service = service(&memory);
    let mut group = MessageGroup::new(
        MessageDefaults::new()
            .with_api_key("k")
            .with_user_id("u")
            .with_platform("web"),
    );
    group.add_message(&clock).set_message("a");
    group.add_message(&clock).set_message("b");

    let error = service
        .send_group(&mut group)
        .await
        .err()
        .ok_or_else(|| eyre::eyre!("partial failure expected"))?;
    let partitioned = error
        .partitioned_responses()
        .ok_or_else(|| eyre::eyre!("partition attached"))?;
    eyre::ensure!(partitioned.succeeded().len() == 1);
    eyre::ensure!(partitioned.failed().len() == 1);
    eyre::ensure!(group.create_entry_started());
    eyre::ensure!(!group.create_entry_completed());
    eyre::ensure!(group.lifecycle().create_error().is_some());

    eyre::ensure!(matches!(
        service.send_group(&mut group).await,
        Err(MessageError::GroupAlreadySent)
    ));
    Ok(())
}

#[rstest]
#[tokio::test]
async fn send_group_records_transport_failures(
    clock: FixedClock,
    memory: Arc<InMemoryMessageTransport>,
) -> eyre::Result<()> {
    memory.push_group_response(Err(TransportError::Timeout(Duration::from_millis(5000))))?;
    let service = service(&memory);
    let mut group = MessageGroup::new(
        MessageDefaults::new()
            .with_api_key("k")
            .with_user_id("u")
            .with_platform("web"),
    );
    group.add_message(&clock).set_message("a");

    let result = service.send_group(&mut group).await;
    eyre::ensure!(
        matches!(result, Err(MessageError::Transport(TransportError::Timeout(_)))),
        "expected transport error, got {result:?}"
    );
    eyre::ensure!(group.create_entry_started());
    eyre::ensure!(!group.create_entry_completed());
    let failure = group
        .lifecycle()
        .create_error()
        .ok_or_else(|| eyre::eyre!("group create failure recorded"))?;
    eyre::ensure!(failure.response().is_none());
    eyre::ensure!(failure.error().is_transport());
    eyre::ensure!(matches!(
        service.send_group(&mut group).await,
        Err(MessageError::GroupAlreadySent)
    ));
    Ok(())
}

#[rstest]
#[tokio::test]
async fn send_group_uses_group_timeout(clock: FixedClock) -> eyre::Result<()> {
    let mut mock = MockMessageTransport::new();
    mock.expect_create_message_group()
        .withf(|payload, timeout| {
            payload.messages.len() == 1 && *timeout == Duration::from_millis(750)
        })
        .times(1)
        .returning(|_, _| Ok(ServiceResponse::ok(json!({"status": 200, "all_succeeded": true}))));
    let service = MessageService::new(Arc::new(mock));
    let mut group = MessageGroup::new(
        MessageDefaults::new()
            .with_api_key("k")
            .with_user_id("u")
            .with_platform("web"),
    );
    group.set_client_timeout(Duration::from_millis(750));
    group.add_message(&clock).set_message("only");

    service.send_group(&mut group).await?;
    eyre::ensure!(group.create_entry_completed());
    Ok(())
}
