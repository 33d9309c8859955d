use crate::constants::SAS_EXPIRY_SECONDS;
use sbqueue_core::hash::{base64_hmac_sha256, query_encode};
use sbqueue_core::time::{now, round_to_second, DateTime};
use sbqueue_core::utils::Redact;
use std::fmt::{Debug, Formatter};

/// Signer that builds Service Bus Shared Access Signature authorization headers.
///
/// - [Service Bus access control with Shared Access Signatures](https://learn.microsoft.com/en-us/azure/service-bus-messaging/service-bus-sas)
pub struct SasSigner {
    key_name: String,
    key_value: String,
    time: Option<DateTime>,
}

impl Debug for SasSigner {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SasSigner")
            .field("key_name", &self.key_name)
            .field("key_value", &Redact::from(&self.key_value))
            .field("time", &self.time)
            .finish()
    }
}

impl SasSigner {
    /// Create a signer for the given shared access policy.
    pub fn new(key_name: impl Into<String>, key_value: impl Into<String>) -> Self {
        Self {
            key_name: key_name.into(),
            key_value: key_value.into(),
            time: None,
        }
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    #[cfg(test)]
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Build the authorization header value for `resource_uri`, valid for five minutes.
    pub fn authorization(&self, resource_uri: &str) -> String {
        self.authorization_at(resource_uri, self.time.unwrap_or_else(now))
    }

    /// Build the authorization header value for `resource_uri` as if signed at `now`.
    ///
    /// ## Format
    ///
    /// ```text
    /// SharedAccessSignature sig=<signature>&se=<expiry>&skn=<key name>&sr=<encoded uri>
    /// ```
    ///
    /// `expiry` is `now` plus five minutes in epoch seconds and `encoded uri` is the
    /// percent encoded resource uri in lower case.
    pub fn authorization_at(&self, resource_uri: &str, now: DateTime) -> String {
        let expiry = round_to_second(now + chrono::Duration::seconds(SAS_EXPIRY_SECONDS));
        let encoded_uri = query_encode(resource_uri).to_lowercase();
        let sig = signature(&self.key_value, &format!("{encoded_uri}\n{expiry}"));

        format!(
            "SharedAccessSignature sig={sig}&se={expiry}&skn={}&sr={encoded_uri}",
            self.key_name
        )
    }
}

/// Percent encoded base64 HMAC-SHA256 of `string_to_sign` under `key`.
pub fn signature(key: &str, string_to_sign: &str) -> String {
    query_encode(&base64_hmac_sha256(
        key.as_bytes(),
        string_to_sign.as_bytes(),
    ))
}
