//! Tests for message groups.

use super::fixtures::{FixedClock, clock};
use crate::message::{
    domain::{MessageBinding, MessageDefaults, MessageGroup, MessageType},
    error::{CREATE_REQUIRED_KEYS, ValidationError},
};
use rstest::{fixture, rstest};
use std::time::Duration;

#[fixture]
fn group() -> MessageGroup {
    MessageGroup::new(
        MessageDefaults::new()
            .with_api_key("group-key")
            .with_user_id("group-user")
            .with_platform("web")
            .with_message_type(MessageType::Agent)
            .with_version("1.0")
            .with_client_timeout(Duration::from_millis(900)),
    )
}

#[rstest]
fn new_group_is_empty(group: MessageGroup) {
    assert!(group.is_empty());
    assert_eq!(group.len(), 0);
    assert!(!group.create_entry_started());
    assert!(group.create_response().is_none());
    assert_eq!(group.client_timeout(), Duration::from_millis(900));
}

#[rstest]
fn members_inherit_defaults_and_are_grouped(group: MessageGroup, clock: FixedClock) {
    let mut group = group;
    let member = group.add_message(&clock);
    assert_eq!(member.binding(), MessageBinding::Grouped);
    assert_eq!(member.api_key(), Some("group-key"));
    assert_eq!(member.user_id(), Some("group-user"));
    assert_eq!(member.platform(), Some("web"));
    assert_eq!(member.message_type(), MessageType::Agent);
    assert_eq!(member.version(), Some("1.0"));
    assert_eq!(member.client_timeout(), Duration::from_millis(900));
    assert_eq!(
        member.lifecycle().options_manifest(),
        crate::message::domain::OptionsManifest::default()
    );
}

#[rstest]
#[case("other-key", "other-user", "other-key", "other-user")]
#[case("", "other-user", "group-key", "other-user")]
#[case("other-key", "", "other-key", "group-user")]
fn member_credentials_override_defaults(
    group: MessageGroup,
    clock: FixedClock,
    #[case] api_key: &str,
    #[case] user_id: &str,
    #[case] expected_key: &str,
    #[case] expected_user: &str,
) {
    let mut group = group;
    let member = group.add_message_for(api_key, user_id, &clock);
    assert_eq!(member.api_key(), Some(expected_key));
    assert_eq!(member.user_id(), Some(expected_user));
}

#[rstest]
fn export_keeps_insertion_order(group: MessageGroup, clock: FixedClock) -> eyre::Result<()> {
    let mut group = group;
    group.add_message(&clock).set_message("one");
    group.add_message(&clock).set_message("two");
    group.add_message(&clock).set_message("three");

    let payload = group.export_create_payload()?;
    let texts: Vec<_> = payload.messages.iter().map(|m| m.message.as_str()).collect();
    eyre::ensure!(texts == ["one", "two", "three"]);
    Ok(())
}

#[rstest]
fn export_reports_first_member_error(group: MessageGroup, clock: FixedClock) {
    let mut group = group;
    group.add_message(&clock).set_message("fine");
    group.add_message(&clock);
    group.add_message(&clock).set_message("flagged").set_as_not_handled();

    assert_eq!(
        group.export_create_payload(),
        Err(ValidationError::RequiredKeysNotSet(CREATE_REQUIRED_KEYS))
    );
}

#[rstest]
fn members_can_be_edited_in_place(group: MessageGroup, clock: FixedClock) {
    let mut group = group;
    group.add_message(&clock);
    for member in group.messages_mut() {
        member.set_message("bulk");
    }
    assert_eq!(group.messages()[0].message(), Some("bulk"));
}

#[rstest]
fn empty_group_exports_empty_list(group: MessageGroup) -> eyre::Result<()> {
    let payload = group.export_create_payload()?;
    eyre::ensure!(payload.messages.is_empty());
    Ok(())
}

#[rstest]
fn defaults_snapshot_is_kept(group: MessageGroup) {
    assert_eq!(group.defaults().api_key(), Some("group-key"));
    assert_eq!(group.defaults().message_type(), Some(MessageType::Agent));
}
