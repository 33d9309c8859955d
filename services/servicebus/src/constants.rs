//! Env value names and protocol constants.

// Env values used in azure service bus.
pub const AZURE_SERVICEBUS_CONNECTION_STRING: &str = "AZURE_SERVICEBUS_CONNECTION_STRING";
pub const AZURE_SERVICEBUS_NAMESPACE: &str = "AZURE_SERVICEBUS_NAMESPACE";
pub const AZURE_SERVICEBUS_KEY_NAME: &str = "AZURE_SERVICEBUS_KEY_NAME";
pub const AZURE_SERVICEBUS_KEY: &str = "AZURE_SERVICEBUS_KEY";
pub const AZURE_SERVICEBUS_QUEUE: &str = "AZURE_SERVICEBUS_QUEUE";
pub const AZURE_SERVICEBUS_TIMEOUT: &str = "AZURE_SERVICEBUS_TIMEOUT";
pub const AZURE_SERVICEBUS_ENDPOINT_SUFFIX: &str = "AZURE_SERVICEBUS_ENDPOINT_SUFFIX";

// Endpoint.
pub const DEFAULT_ENDPOINT_SUFFIX: &str = "windows.net";
pub const SERVICEBUS_SCHEME: &str = "https";
pub const SERVICEBUS_PORT: u16 = 443;

/// Lifetime of a shared access signature, in seconds.
pub const SAS_EXPIRY_SECONDS: i64 = 300;

// Headers used in azure service bus (header names are lower case on the wire).
pub const BROKER_PROPERTIES: &str = "brokerproperties";
