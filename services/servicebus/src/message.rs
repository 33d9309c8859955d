use bytes::Bytes;
use sbqueue_core::time::DateTime;
use std::collections::HashMap;

/// Queue message.
///
/// Protocol fields mirror the [broker properties] of Service Bus. Fields the service
/// fills in on receive (`lock_token`, `sequence_number`, `delivery_count`,
/// `enqueued_time_utc`, `locked_until_utc`) stay `None` on messages built with
/// [`Message::new`].
///
/// [broker properties]: https://learn.microsoft.com/en-us/rest/api/servicebus/message-headers-and-properties
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    /// MessageId, assigned by the sender or by the service.
    pub id: Option<String>,
    /// Application specific label.
    pub label: Option<String>,
    /// Correlation identifier.
    pub correlation_id: Option<String>,
    /// Session identifier for session-aware queues.
    pub session_id: Option<String>,
    /// Address to send replies to.
    pub reply_to: Option<String>,
    /// Session identifier to send replies to.
    pub reply_to_session_id: Option<String>,
    /// Destination address.
    pub to: Option<String>,
    /// Partition key for partitioned queues.
    pub partition_key: Option<String>,
    /// Content type of the body, sent as the `Content-Type` header.
    pub content_type: Option<String>,
    /// Time to live in seconds.
    pub time_to_live: Option<u64>,
    /// Time at which the service makes the message available.
    pub scheduled_enqueue_time_utc: Option<DateTime>,

    /// Lock token of a peek-locked message.
    pub lock_token: Option<String>,
    /// Sequence number assigned by the service.
    pub sequence_number: Option<i64>,
    /// Number of times the message has been delivered.
    pub delivery_count: Option<u32>,
    /// Time at which the message was enqueued.
    pub enqueued_time_utc: Option<DateTime>,
    /// Time until which the message stays locked.
    pub locked_until_utc: Option<DateTime>,

    /// User defined properties, sent as one header each.
    pub properties: HashMap<String, String>,

    /// Raw message body.
    pub body: Bytes,
}

impl Message {
    /// Create an outbound message with the given body.
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self {
            body: body.into(),
            ..Default::default()
        }
    }

    /// Set a user defined property, replacing any previous value.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Set the content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Set the message id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the correlation id.
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Set the session id.
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Set the time to live in seconds.
    pub fn with_time_to_live(mut self, seconds: u64) -> Self {
        self.time_to_live = Some(seconds);
        self
    }

    /// Schedule the message for later delivery.
    pub fn with_scheduled_enqueue_time(mut self, time: DateTime) -> Self {
        self.scheduled_enqueue_time_utc = Some(time);
        self
    }
}
