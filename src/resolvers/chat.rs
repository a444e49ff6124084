//! Chat rooms
//!
//! Every message belongs to a room and has a kind. A message is published on
//! exactly one topic, `<room>-<kind>`; someone who entered the room listens
//! on both `<room>-chat` and `<room>-notice` and only sees messages whose
//! contents have an even number of characters.

use std::fmt;
use std::str::FromStr;

use futures::Stream;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::broker::{Filter, KeyDeriver, KeyPart, TopicKey};
use crate::client::PubSub;
use crate::utils::error::{ResolverError, TopicError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Chat,
    Notice,
}

impl MessageType {
    pub const ALL: [MessageType; 2] = [MessageType::Chat, MessageType::Notice];

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Chat => "chat",
            MessageType::Notice => "notice",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = ResolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chat" => Ok(MessageType::Chat),
            "notice" => Ok(MessageType::Notice),
            _ => Err(ResolverError::UnknownMessageType(s.to_string())),
        }
    }
}

impl From<MessageType> for KeyPart {
    fn from(value: MessageType) -> Self {
        KeyPart::from(value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub chat_room_number: u32,
    pub contents: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
}

/// `<room><separator><kind>`, e.g. `1-chat`.
pub fn topic_for(
    deriver: &KeyDeriver,
    chat_room_number: u32,
    message_type: MessageType,
) -> Result<TopicKey, TopicError> {
    deriver.derive([KeyPart::from(chat_room_number), KeyPart::from(message_type)])
}

/// Delivery gate of a room subscription. Length is counted in UTF-16 code
/// units, so a single emoji counts as two.
pub fn has_even_length(message: &ChatMessage) -> bool {
    message.contents.encode_utf16().count() % 2 == 0
}

#[derive(Debug, Clone)]
pub struct ChatRoom {
    pubsub: PubSub<ChatMessage>,
}

impl ChatRoom {
    pub fn new(pubsub: PubSub<ChatMessage>) -> Self {
        Self { pubsub }
    }

    pub fn hello(&self) -> &'static str {
        "world!"
    }

    /// Publish `message` on the topic of its own room and kind, and return it.
    pub fn new_message(&self, message: ChatMessage) -> Result<ChatMessage, ResolverError> {
        let topic = topic_for(
            &self.pubsub.deriver(),
            message.chat_room_number,
            message.message_type,
        )?;
        let delivered = self.pubsub.publish(&topic, message.clone());
        debug!("Message for '{topic}' delivered to {delivered} subscriber(s)");
        Ok(message)
    }

    /// Listen to every kind of message of one room.
    pub fn enter_chat_room(
        &self,
        chat_room_number: u32,
    ) -> Result<impl Stream<Item = ChatMessage> + Send + Unpin + use<>, ResolverError> {
        let deriver = self.pubsub.deriver();
        let topics = MessageType::ALL
            .iter()
            .map(|kind| topic_for(&deriver, chat_room_number, *kind))
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Entering chat room {chat_room_number} on {topics:?}");

        let subscription = self
            .pubsub
            .subscribe(topics, Some(Filter::new(has_even_length)))?;
        Ok(subscription.into_payloads())
    }
}
