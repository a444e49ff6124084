use super::chat::{self, ChatMessage, ChatRoom, MessageType};
use super::counter::{Counter, CounterCommand};
use crate::broker::{Broker, KeyDeriver};
use crate::client::PubSub;
use crate::utils::error::ResolverError;
use futures::FutureExt;
use futures_util::StreamExt;

fn message(room: u32, contents: &str, message_type: MessageType) -> ChatMessage {
    ChatMessage {
        chat_room_number: room,
        contents: contents.to_string(),
        message_type,
    }
}

#[test]
fn test_chat_topic_strings() {
    let deriver = KeyDeriver::default();
    assert_eq!(
        chat::topic_for(&deriver, 1, MessageType::Chat).unwrap().as_str(),
        "1-chat"
    );
    assert_eq!(
        chat::topic_for(&deriver, 12, MessageType::Notice)
            .unwrap()
            .as_str(),
        "12-notice"
    );
}

#[test]
fn test_message_type_parsing() {
    assert_eq!("chat".parse::<MessageType>().unwrap(), MessageType::Chat);
    assert_eq!("NOTICE".parse::<MessageType>().unwrap(), MessageType::Notice);
    assert!(matches!(
        "shout".parse::<MessageType>(),
        Err(ResolverError::UnknownMessageType(s)) if s == "shout"
    ));
}

#[test]
fn test_chat_message_json_shape() {
    let msg = message(1, "hey", MessageType::Chat);
    let json = serde_json::to_value(&msg).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "chatRoomNumber": 1, "contents": "hey", "type": "chat" })
    );
    let back: ChatMessage = serde_json::from_value(json).unwrap();
    assert_eq!(back, msg);
}

#[test]
fn test_subscriber_on_exact_topic_receives_message() {
    let pubsub: PubSub<ChatMessage> = PubSub::default();
    let topic = pubsub.topic([1u32.to_string(), "chat".to_string()]).unwrap();
    let mut s1 = pubsub.subscribe([topic], None).unwrap();
    let room = ChatRoom::new(pubsub.clone());

    let sent = room
        .new_message(message(1, "hey", MessageType::Chat))
        .unwrap();

    let delivery = s1.try_recv().expect("S1 should receive the message");
    assert_eq!(delivery.topic.as_str(), "1-chat");
    assert_eq!(delivery.payload, sent);
}

#[tokio::test]
async fn test_room_subscription_filters_odd_lengths() {
    let pubsub: PubSub<ChatMessage> = PubSub::default();
    let room = ChatRoom::new(pubsub);
    let mut inbox = room.enter_chat_room(1).unwrap();

    room.new_message(message(1, "hi!", MessageType::Chat)).unwrap();
    assert!(inbox.next().now_or_never().is_none());

    room.new_message(message(1, "hi", MessageType::Chat)).unwrap();
    assert_eq!(
        inbox.next().await,
        Some(message(1, "hi", MessageType::Chat))
    );
}

#[tokio::test]
async fn test_room_subscription_hears_chat_and_notice_of_its_room_only() {
    let pubsub: PubSub<ChatMessage> = PubSub::default();
    let room = ChatRoom::new(pubsub.clone());
    let mut inbox = room.enter_chat_room(3).unwrap();

    room.new_message(message(3, "ok", MessageType::Notice)).unwrap();
    room.new_message(message(4, "no", MessageType::Chat)).unwrap();
    room.new_message(message(3, "yo", MessageType::Chat)).unwrap();

    assert_eq!(inbox.next().await.unwrap().contents, "ok");
    assert_eq!(inbox.next().await.unwrap().contents, "yo");
    assert!(inbox.next().now_or_never().is_none());

    // a message is published on its own topic only
    assert_eq!(pubsub.broker().topic_count(), 2);
}

#[test]
fn test_leaving_room_deregisters() {
    let pubsub: PubSub<ChatMessage> = PubSub::default();
    let room = ChatRoom::new(pubsub.clone());
    let inbox = room.enter_chat_room(1).unwrap();
    assert_eq!(pubsub.broker().subscription_count(), 1);

    drop(inbox);
    assert_eq!(pubsub.broker().subscription_count(), 0);
    room.new_message(message(1, "hi", MessageType::Chat)).unwrap();
}

#[test]
fn test_counter_command_parsing() {
    assert_eq!("up".parse::<CounterCommand>().unwrap(), CounterCommand::Up);
    assert_eq!("DOWN".parse::<CounterCommand>().unwrap(), CounterCommand::Down);
    assert!(matches!(
        "sideways".parse::<CounterCommand>(),
        Err(ResolverError::UnknownCommand(s)) if s == "sideways"
    ));
}

#[test]
fn test_counter_counts_both_ways() {
    let counter = Counter::new(PubSub::default()).unwrap();
    assert_eq!(counter.hello(), "world!");
    assert_eq!(counter.count(CounterCommand::Up), 1);
    assert_eq!(counter.count(CounterCommand::Up), 2);
    assert_eq!(counter.count(CounterCommand::Down), 1);
    assert_eq!(counter.value(), 1);
}

#[tokio::test]
async fn test_counter_notifies_even_values_not_divisible_by_four() {
    let counter = Counter::new(PubSub::default()).unwrap();
    let mut evens = counter.subscribe_even().unwrap();

    let values: Vec<i64> = (0..4).map(|_| counter.count(CounterCommand::Up)).collect();
    assert_eq!(values, vec![1, 2, 3, 4]);

    // 2 passes the filter, 4 is a multiple of four
    assert_eq!(evens.next().await, Some(2));
    assert!(evens.next().now_or_never().is_none());

    for _ in 0..2 {
        counter.count(CounterCommand::Up);
    }
    assert_eq!(evens.next().await, Some(6));
}

#[tokio::test]
async fn test_counter_negative_values() {
    let counter = Counter::new(PubSub::default()).unwrap();
    let mut evens = counter.subscribe_even().unwrap();

    counter.count(CounterCommand::Down);
    counter.count(CounterCommand::Down);
    assert_eq!(evens.next().await, Some(-2));
}

#[test]
fn test_counter_uses_configured_separator_for_single_part_topic() {
    let pubsub: PubSub<i64> = PubSub::new(Broker::new(), KeyDeriver::new(':').unwrap());
    let counter = Counter::new(pubsub.clone()).unwrap();
    let _evens = counter.subscribe_even().unwrap();

    let even = pubsub.topic(["even"]).unwrap();
    assert_eq!(pubsub.broker().subscribers_of(&even), 1);
}

#[test]
fn test_chat_room_hello() {
    let room = ChatRoom::new(PubSub::default());
    assert_eq!(room.hello(), "world!");
}

#[tokio::test]
async fn test_room_filter_counts_utf16_units() {
    let pubsub: PubSub<ChatMessage> = PubSub::default();
    let room = ChatRoom::new(pubsub);
    let mut inbox = room.enter_chat_room(1).unwrap();

    // one emoji is a surrogate pair, length 2
    room.new_message(message(1, "😀", MessageType::Chat)).unwrap();
    assert_eq!(
        inbox.next().await,
        Some(message(1, "😀", MessageType::Chat))
    );

    // "a😀" is 3 units long
    room.new_message(message(1, "a😀", MessageType::Chat)).unwrap();
    assert!(inbox.next().now_or_never().is_none());
}

#[test]
fn test_counter_saturates_at_bounds() {
    let top = Counter::starting_at(PubSub::default(), i64::MAX).unwrap();
    assert_eq!(top.count(CounterCommand::Up), i64::MAX);
    assert_eq!(top.value(), i64::MAX);

    let bottom = Counter::starting_at(PubSub::default(), i64::MIN).unwrap();
    assert_eq!(bottom.count(CounterCommand::Down), i64::MIN);
    assert_eq!(bottom.count(CounterCommand::Up), i64::MIN + 1);
}
