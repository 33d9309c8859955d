use crate::constants::*;
use crate::{BrokerProperties, Config, Message, SasSigner};
use bytes::Bytes;
use http::{header, HeaderMap, HeaderName, HeaderValue, Method, Request};
use percent_encoding::utf8_percent_encode;
use sbqueue_core::hash::QUERY_ENCODE_SET;
use sbqueue_core::Result;

/// Path of the receive endpoint: the head of the queue, waiting up to `timeout` seconds.
pub(crate) fn receive_path(timeout: u64) -> String {
    format!("messages/head?timeout={timeout}")
}

/// Path of a locked message: `messages/{id}/{lock token}`.
///
/// Missing ids stay empty, the service answers those with not found.
pub(crate) fn message_path(msg: &Message) -> String {
    let id = msg.id.as_deref().unwrap_or_default();
    let lock_token = msg.lock_token.as_deref().unwrap_or_default();

    format!(
        "messages/{}/{}",
        utf8_percent_encode(id, QUERY_ENCODE_SET),
        utf8_percent_encode(lock_token, QUERY_ENCODE_SET)
    )
}

/// Build a signed request without body.
pub(crate) fn new_request(
    config: &Config,
    signer: &SasSigner,
    method: Method,
    sub_path: &str,
) -> Result<Request<Bytes>> {
    build(config, signer, method, sub_path, HeaderMap::new(), Bytes::new())
        .map_err(|e| e.with_context("failed to build request"))
}

/// Build the signed `POST messages/` request that enqueues `msg`.
///
/// User properties go first, so a property can't shadow the broker properties,
/// the content type or the authorization.
pub(crate) fn new_message_request(
    config: &Config,
    signer: &SasSigner,
    msg: &Message,
) -> Result<Request<Bytes>> {
    message_headers(msg)
        .and_then(|headers| {
            build(
                config,
                signer,
                Method::POST,
                "messages/",
                headers,
                msg.body.clone(),
            )
        })
        .map_err(|e| e.with_context("failed to build request"))
}

fn message_headers(msg: &Message) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    for (k, v) in &msg.properties {
        headers.insert(HeaderName::from_bytes(k.as_bytes())?, HeaderValue::from_str(v)?);
    }

    let props = BrokerProperties::from(msg).into_request().to_json()?;
    headers.insert(
        HeaderName::from_static(BROKER_PROPERTIES),
        HeaderValue::from_str(&props)?,
    );

    if let Some(content_type) = &msg.content_type {
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_str(content_type)?);
    }

    Ok(headers)
}

fn build(
    config: &Config,
    signer: &SasSigner,
    method: Method,
    sub_path: &str,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Request<Bytes>> {
    let uri = format!("{}{sub_path}", config.queue_url());

    let mut req = Request::builder().method(method).uri(&uri).body(body)?;
    req.headers_mut().extend(headers);

    let mut authorization = HeaderValue::from_str(&signer.authorization(&uri))?;
    authorization.set_sensitive(true);
    req.headers_mut()
        .insert(header::AUTHORIZATION, authorization);

    Ok(req)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use sbqueue_core::ErrorKind;

    fn test_config() -> Config {
        Config::new("test", "key", "keyvalue", "test").with_timeout(60)
    }

    fn test_signer() -> SasSigner {
        SasSigner::new("key", "keyvalue").with_time(Utc.with_ymd_and_hms(2018, 1, 1, 1, 1, 1).unwrap())
    }

    #[test]
    fn test_receive_request() {
        let req = new_request(
            &test_config(),
            &test_signer(),
            Method::POST,
            &receive_path(60),
        )
        .unwrap();

        assert_eq!(req.method(), Method::POST);
        assert_eq!(
            req.uri().to_string(),
            "https://test.servicebus.windows.net:443/test/messages/head?timeout=60"
        );
        assert_eq!(
            req.headers()[header::AUTHORIZATION],
            "SharedAccessSignature sig=rx9tdx29ECEU2qGqB5HqCmuu%2F13qcpTH%2F7KssPVeZi8%3D&se=1514768761&skn=key&sr=https%3a%2f%2ftest.servicebus.windows.net%3a443%2ftest%2fmessages%2fhead%3ftimeout%3d60"
        );
        assert!(req.headers()[header::AUTHORIZATION].is_sensitive());
        assert!(req.body().is_empty());
    }

    #[test]
    fn test_message_path() {
        let mut msg = Message::default();
        assert_eq!(message_path(&msg), "messages//");

        msg.id = Some("31907572164743c38741631acd554d6f".to_string());
        msg.lock_token = Some("7da9cfd5-40d5-4bb1-8d64-ec5a52e1c547".to_string());
        assert_eq!(
            message_path(&msg),
            "messages/31907572164743c38741631acd554d6f/7da9cfd5-40d5-4bb1-8d64-ec5a52e1c547"
        );

        msg.id = Some("{a b}".to_string());
        assert_eq!(
            message_path(&msg),
            "messages/%7Ba%20b%7D/7da9cfd5-40d5-4bb1-8d64-ec5a52e1c547"
        );
    }

    #[test]
    fn test_message_request() {
        let msg = Message::new("Hello!")
            .with_id("id-1")
            .with_content_type("text/plain")
            .with_property("Prop1", "Value1")
            .with_property("Content-Type", "application/json");

        let req = new_message_request(&test_config(), &test_signer(), &msg).unwrap();

        assert_eq!(req.method(), Method::POST);
        assert_eq!(
            req.uri().to_string(),
            "https://test.servicebus.windows.net:443/test/messages/"
        );
        assert_eq!(req.headers()["prop1"], "Value1");
        assert_eq!(req.headers()[header::CONTENT_TYPE], "text/plain");
        assert_eq!(req.headers()[BROKER_PROPERTIES], r#"{"MessageId":"id-1"}"#);
        assert_eq!(
            req.headers()[header::AUTHORIZATION],
            test_signer().authorization("https://test.servicebus.windows.net:443/test/messages/")
        );
        assert_eq!(req.body(), &Bytes::from_static(b"Hello!"));
    }

    #[test]
    fn test_message_request_without_fields() {
        let req =
            new_message_request(&test_config(), &test_signer(), &Message::new("")).unwrap();

        assert_eq!(req.headers()[BROKER_PROPERTIES], "{}");
        assert!(req.headers().get(header::CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_invalid_request() {
        let config = Config::new("bad namespace", "key", "keyvalue", "test");
        let err = new_request(&config, &test_signer(), Method::PUT, "messages/a/b").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);
        assert!(err.to_string().starts_with("failed to build request: "), "{err}");

        let msg = Message::new("").with_property("bad header", "v");
        let err = new_message_request(&test_config(), &test_signer(), &msg).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);
    }
}
