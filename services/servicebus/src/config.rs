use crate::connection_string;
use crate::constants::*;
use sbqueue_core::utils::Redact;
use sbqueue_core::{Context, Error, Result};
use std::fmt::{Debug, Formatter};

/// Config carries everything a [`QueueClient`](crate::QueueClient) needs to reach a queue.
///
/// The client takes ownership of the config when it is built, so it can't change afterwards.
#[derive(Clone, Default)]
#[cfg_attr(test, derive(PartialEq))]
pub struct Config {
    /// Service Bus namespace, the `<namespace>` in `<namespace>.servicebus.windows.net`.
    ///
    /// - env value: [`AZURE_SERVICEBUS_NAMESPACE`]
    pub namespace: String,
    /// Name of the shared access policy, e.g. `RootManageSharedAccessKey`.
    ///
    /// - env value: [`AZURE_SERVICEBUS_KEY_NAME`]
    pub key_name: String,
    /// Key of the shared access policy.
    ///
    /// - env value: [`AZURE_SERVICEBUS_KEY`]
    pub key_value: String,
    /// Name of the queue.
    ///
    /// - env value: [`AZURE_SERVICEBUS_QUEUE`]
    pub queue_name: String,
    /// Receive timeout in seconds, passed to the service on every receive.
    ///
    /// - env value: [`AZURE_SERVICEBUS_TIMEOUT`]
    pub timeout: u64,
    /// DNS suffix of the cloud, `windows.net` if unset.
    ///
    /// - env value: [`AZURE_SERVICEBUS_ENDPOINT_SUFFIX`]
    pub endpoint_suffix: Option<String>,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("namespace", &self.namespace)
            .field("key_name", &self.key_name)
            .field("key_value", &Redact::from(&self.key_value))
            .field("queue_name", &self.queue_name)
            .field("timeout", &self.timeout)
            .field("endpoint_suffix", &self.endpoint_suffix)
            .finish()
    }
}

impl Config {
    /// Create a config from its required parts.
    pub fn new(
        namespace: impl Into<String>,
        key_name: impl Into<String>,
        key_value: impl Into<String>,
        queue_name: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            key_name: key_name.into(),
            key_value: key_value.into(),
            queue_name: queue_name.into(),
            ..Default::default()
        }
    }

    /// Set the receive timeout in seconds.
    pub fn with_timeout(mut self, timeout: u64) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the DNS suffix of the cloud, e.g. `chinacloudapi.cn`.
    pub fn with_endpoint_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.endpoint_suffix = Some(suffix.into());
        self
    }

    /// Parse a Service Bus connection string.
    ///
    /// ```text
    /// Endpoint=sb://<namespace>.servicebus.windows.net/;SharedAccessKeyName=<name>;SharedAccessKey=<key>;EntityPath=<queue>
    /// ```
    ///
    /// `EntityPath` is optional, the queue name can be set afterwards.
    pub fn from_connection_string(conn_str: &str) -> Result<Self> {
        connection_string::parse(conn_str)
    }

    /// Load config from env values.
    ///
    /// [`AZURE_SERVICEBUS_CONNECTION_STRING`] is read first, the individual env values
    /// override what it provides. Fields without env value keep their current value.
    pub fn from_env(mut self, ctx: &Context) -> Result<Self> {
        if let Some(v) = ctx.env_var(AZURE_SERVICEBUS_CONNECTION_STRING) {
            self.merge(connection_string::parse(&v)?);
        }

        if let Some(v) = ctx.env_var(AZURE_SERVICEBUS_NAMESPACE) {
            self.namespace = v;
        }

        if let Some(v) = ctx.env_var(AZURE_SERVICEBUS_KEY_NAME) {
            self.key_name = v;
        }

        if let Some(v) = ctx.env_var(AZURE_SERVICEBUS_KEY) {
            self.key_value = v;
        }

        if let Some(v) = ctx.env_var(AZURE_SERVICEBUS_QUEUE) {
            self.queue_name = v;
        }

        if let Some(v) = ctx.env_var(AZURE_SERVICEBUS_TIMEOUT) {
            self.timeout = v.parse().map_err(|e| {
                Error::config_invalid(format!("invalid {AZURE_SERVICEBUS_TIMEOUT}: {v}"))
                    .with_source(e)
            })?;
        }

        if let Some(v) = ctx.env_var(AZURE_SERVICEBUS_ENDPOINT_SUFFIX) {
            self.endpoint_suffix = Some(v);
        }

        Ok(self)
    }

    fn merge(&mut self, other: Config) {
        let take = |field: &mut String, value: String| {
            if !value.is_empty() {
                *field = value;
            }
        };

        take(&mut self.namespace, other.namespace);
        take(&mut self.key_name, other.key_name);
        take(&mut self.key_value, other.key_value);
        take(&mut self.queue_name, other.queue_name);
        if other.endpoint_suffix.is_some() {
            self.endpoint_suffix = other.endpoint_suffix;
        }
    }

    /// Check that every field required to sign and route a request is set.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("namespace", &self.namespace),
            ("key_name", &self.key_name),
            ("key_value", &self.key_value),
            ("queue_name", &self.queue_name),
        ] {
            if value.is_empty() {
                return Err(Error::config_invalid(format!("{name} is required")));
            }
        }

        Ok(())
    }

    /// DNS suffix of the cloud.
    pub fn endpoint_suffix(&self) -> &str {
        self.endpoint_suffix
            .as_deref()
            .unwrap_or(DEFAULT_ENDPOINT_SUFFIX)
    }

    /// Base url of the queue: `https://<namespace>.servicebus.<suffix>:443/<queue>/`.
    pub fn queue_url(&self) -> String {
        format!(
            "{SERVICEBUS_SCHEME}://{}.servicebus.{}:{SERVICEBUS_PORT}/{}/",
            self.namespace,
            self.endpoint_suffix(),
            self.queue_name
        )
    }
}
