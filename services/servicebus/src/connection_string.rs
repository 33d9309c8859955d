use std::collections::HashMap;

use sbqueue_core::{Error, Result};

use crate::Config;

/// Parses a [Service Bus connection string][1].
///
/// [1]: https://learn.microsoft.com/en-us/azure/service-bus-messaging/service-bus-dotnet-get-started-with-queues#get-the-connection-string
pub(crate) fn parse(conn_str: &str) -> Result<Config> {
    let key_values = parse_into_key_values(conn_str)?;

    if key_values.contains_key("SharedAccessSignature") {
        return Err(Error::config_invalid(
            "connection strings with SharedAccessSignature are not supported, use SharedAccessKeyName and SharedAccessKey",
        ));
    }

    let endpoint = key_values
        .get("Endpoint")
        .ok_or_else(|| Error::config_invalid("connection string has no Endpoint"))?;
    let (namespace, endpoint_suffix) = parse_endpoint(endpoint)?;

    Ok(Config {
        namespace,
        key_name: key_values
            .get("SharedAccessKeyName")
            .cloned()
            .unwrap_or_default(),
        key_value: key_values
            .get("SharedAccessKey")
            .cloned()
            .unwrap_or_default(),
        queue_name: key_values.get("EntityPath").cloned().unwrap_or_default(),
        endpoint_suffix: Some(endpoint_suffix),
        ..Default::default()
    })
}

fn parse_into_key_values(conn_str: &str) -> Result<HashMap<String, String>> {
    conn_str
        .trim()
        .replace('\n', "")
        .split(';')
        .filter(|&field| !field.trim().is_empty())
        .map(|field| {
            let (key, value) = field.trim().split_once('=').ok_or_else(|| {
                Error::config_invalid(format!(
                    "invalid connection string, expected '=' in field: {field}"
                ))
            })?;
            Ok((key.to_string(), value.to_string()))
        })
        .collect()
}

/// Splits `sb://<namespace>.servicebus.<suffix>/` into namespace and suffix.
fn parse_endpoint(endpoint: &str) -> Result<(String, String)> {
    let host = endpoint
        .split_once("://")
        .map_or(endpoint, |(_, rest)| rest)
        .trim_end_matches('/');

    match host.split_once(".servicebus.") {
        Some((namespace, suffix)) if !namespace.is_empty() && !suffix.is_empty() => {
            Ok((namespace.to_string(), suffix.to_string()))
        }
        _ => Err(Error::config_invalid(format!(
            "invalid Endpoint in connection string: {endpoint}"
        ))),
    }
}
