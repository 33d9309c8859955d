use crate::constants::*;
use crate::{BrokerProperties, Message};
use bytes::Bytes;
use http::{header, Response, StatusCode};
use sbqueue_core::time::parse_rfc2616;
use sbqueue_core::{Context, Error, Result};

/// Map a response status to the matching error, 200 and 201 are success.
pub(crate) fn check_status(resp: &Response<Bytes>) -> Result<()> {
    match resp.status() {
        StatusCode::OK | StatusCode::CREATED => Ok(()),
        status => Err(Error::from_status(
            status,
            String::from_utf8_lossy(resp.body()),
        )),
    }
}

/// Build a received message from a successful response.
///
/// Headers are read first and broker properties are applied on top of them, so a
/// timestamp carried by both ends up with the broker value. A malformed
/// `BrokerProperties` header is logged and skipped, the rest of the message is kept.
pub(crate) fn parse_message(ctx: &Context, resp: Response<Bytes>) -> Message {
    let (parts, body) = resp.into_parts();

    ctx.debug(format_args!("response status: {}", parts.status));
    ctx.debug(format_args!("response headers: {:?}", parts.headers));
    ctx.debug(format_args!("response content length: {}", body.len()));

    let mut msg = Message {
        body,
        ..Default::default()
    };

    // Repeated headers keep their first value.
    for name in parts.headers.keys() {
        let Some(value) = parts.headers.get(name) else {
            continue;
        };
        let value = String::from_utf8_lossy(value.as_bytes());

        match name.as_str() {
            BROKER_PROPERTIES => continue,
            n if n == header::CONTENT_TYPE => msg.content_type = Some(value.into_owned()),
            n if n == header::DATE => {
                if let Some(t) = parse_rfc2616(&value) {
                    msg.enqueued_time_utc = Some(t);
                }
            }
            // Custom properties come back quoted.
            n => {
                msg.properties
                    .insert(canonical_header_key(n), value.trim_matches('"').to_string());
            }
        }
    }

    if let Some(value) = parts.headers.get(BROKER_PROPERTIES) {
        parse_broker_properties(ctx, &mut msg, value.as_bytes());
    }

    msg
}

fn parse_broker_properties(ctx: &Context, msg: &mut Message, value: &[u8]) {
    let value = String::from_utf8_lossy(value);
    ctx.debug(format_args!("response broker properties: {value}"));

    match BrokerProperties::from_json(&value) {
        Ok(props) => props.apply(msg),
        Err(err) => ctx.error(format_args!("broker properties header parse failed: {err:?}")),
    }
}

/// Canonical MIME form of a header name: `x-custom-prop` becomes `X-Custom-Prop`.
fn canonical_header_key(name: &str) -> String {
    let mut upper = true;
    name.chars()
        .map(|c| {
            let c = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            c
        })
        .collect()
}
