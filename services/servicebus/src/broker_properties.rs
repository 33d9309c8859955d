use crate::Message;
use sbqueue_core::time::{format_rfc2616, parse_rfc2616};
use sbqueue_core::{Error, Result};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Broker properties as carried by the `BrokerProperties` header.
///
/// Empty strings and zero numbers are omitted when serialized. Fields marked
/// response-only are filled in by the service and never sent.
///
/// - [Message headers and properties](https://learn.microsoft.com/en-us/rest/api/servicebus/message-headers-and-properties)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BrokerProperties {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub correlation_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub session_id: String,
    #[serde(
        default,
        skip_serializing_if = "is_zero",
        deserialize_with = "deserialize_seconds"
    )]
    pub time_to_live: u64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub to: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reply_to: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub scheduled_enqueue_time_utc: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reply_to_session_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub partition_key: String,

    // Response only.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub delivery_count: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub lock_token: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub locked_until_utc: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub sequence_number: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub enqueued_time_utc: String,
}

fn is_zero<T: Default + PartialEq>(v: &T) -> bool {
    *v == T::default()
}

/// The service reports TimeToLive as a fractional number of seconds.
fn deserialize_seconds<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<u64, D::Error> {
    let v = f64::deserialize(d)?;
    if !v.is_finite() || v < 0.0 {
        return Err(D::Error::custom(format!("invalid TimeToLive: {v}")));
    }
    Ok(v as u64)
}

impl From<&Message> for BrokerProperties {
    fn from(msg: &Message) -> Self {
        Self {
            message_id: msg.id.clone().unwrap_or_default(),
            label: msg.label.clone().unwrap_or_default(),
            correlation_id: msg.correlation_id.clone().unwrap_or_default(),
            session_id: msg.session_id.clone().unwrap_or_default(),
            time_to_live: msg.time_to_live.unwrap_or_default(),
            to: msg.to.clone().unwrap_or_default(),
            reply_to: msg.reply_to.clone().unwrap_or_default(),
            scheduled_enqueue_time_utc: msg
                .scheduled_enqueue_time_utc
                .map(format_rfc2616)
                .unwrap_or_default(),
            reply_to_session_id: msg.reply_to_session_id.clone().unwrap_or_default(),
            partition_key: msg.partition_key.clone().unwrap_or_default(),
            delivery_count: msg.delivery_count.unwrap_or_default(),
            lock_token: msg.lock_token.clone().unwrap_or_default(),
            locked_until_utc: msg
                .locked_until_utc
                .map(format_rfc2616)
                .unwrap_or_default(),
            sequence_number: msg.sequence_number.unwrap_or_default(),
            enqueued_time_utc: msg
                .enqueued_time_utc
                .map(format_rfc2616)
                .unwrap_or_default(),
        }
    }
}

impl BrokerProperties {
    /// Drop the fields only the service is allowed to set.
    pub fn into_request(self) -> Self {
        Self {
            delivery_count: 0,
            lock_token: String::new(),
            locked_until_utc: String::new(),
            sequence_number: 0,
            enqueued_time_utc: String::new(),
            ..self
        }
    }

    /// Serialize into the JSON carried by the `BrokerProperties` header.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| Error::unexpected("failed to serialize broker properties").with_source(e))
    }

    /// Parse the JSON carried by the `BrokerProperties` header.
    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s)
            .map_err(|e| Error::unexpected("failed to parse broker properties").with_source(e))
    }

    /// Overwrite the protocol fields of `msg` with the non-empty fields of self.
    ///
    /// Timestamps that do not parse as RFC 2616 dates leave the message untouched.
    pub fn apply(self, msg: &mut Message) {
        set_if_not_empty(&mut msg.id, self.message_id);
        set_if_not_empty(&mut msg.label, self.label);
        set_if_not_empty(&mut msg.correlation_id, self.correlation_id);
        set_if_not_empty(&mut msg.session_id, self.session_id);
        set_if_not_empty(&mut msg.to, self.to);
        set_if_not_empty(&mut msg.reply_to, self.reply_to);
        set_if_not_empty(&mut msg.reply_to_session_id, self.reply_to_session_id);
        set_if_not_empty(&mut msg.partition_key, self.partition_key);
        set_if_not_empty(&mut msg.lock_token, self.lock_token);

        if self.time_to_live != 0 {
            msg.time_to_live = Some(self.time_to_live);
        }
        if self.delivery_count != 0 {
            msg.delivery_count = Some(self.delivery_count);
        }
        if self.sequence_number != 0 {
            msg.sequence_number = Some(self.sequence_number);
        }

        if let Some(t) = parse_rfc2616(&self.locked_until_utc) {
            msg.locked_until_utc = Some(t);
        }
        if let Some(t) = parse_rfc2616(&self.scheduled_enqueue_time_utc) {
            msg.scheduled_enqueue_time_utc = Some(t);
        }
        if let Some(t) = parse_rfc2616(&self.enqueued_time_utc) {
            msg.enqueued_time_utc = Some(t);
        }
    }
}

fn set_if_not_empty(field: &mut Option<String>, value: String) {
    if !value.is_empty() {
        *field = Some(value);
    }
}
