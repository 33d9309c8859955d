use crate::request::{message_path, new_message_request, new_request, receive_path};
use crate::response::{check_status, parse_message};
use crate::{Config, Message, SasSigner};
use bytes::Bytes;
use http::{Method, Request, Response};
use once_cell::sync::OnceCell;
use sbqueue_core::{Context, Error, HttpSend, Result};
use sbqueue_http_send_reqwest::ReqwestHttpSend;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

type HttpConnector = dyn Fn() -> Result<Arc<dyn HttpSend>> + Send + Sync;

/// QueueClient talks to a single Service Bus queue over REST.
///
/// Every operation signs its own request, so a client can be shared across tasks
/// (e.g. behind an `Arc`) for as long as the shared access key stays valid.
///
/// ## Transport
///
/// Requests go through the transport set with [`Context::with_http_send`] when there
/// is one. Otherwise the client builds a [`ReqwestHttpSend`] on first use and keeps it
/// for its whole lifetime.
pub struct QueueClient {
    ctx: Context,
    config: Config,
    signer: SasSigner,

    http: OnceCell<Arc<dyn HttpSend>>,
    connector: Arc<HttpConnector>,
}

impl Debug for QueueClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueClient")
            .field("ctx", &self.ctx)
            .field("config", &self.config)
            .field("signer", &self.signer)
            .field("http", &self.http)
            .finish_non_exhaustive()
    }
}

impl QueueClient {
    /// Create a client for the queue described by `config`.
    ///
    /// Returns a [`ConfigInvalid`](sbqueue_core::ErrorKind::ConfigInvalid) error if a
    /// required field is empty.
    pub fn new(ctx: Context, config: Config) -> Result<Self> {
        config.validate()?;

        let signer = SasSigner::new(&config.key_name, &config.key_value);
        Ok(Self {
            ctx,
            config,
            signer,
            http: OnceCell::new(),
            connector: Arc::new(default_http_send),
        })
    }

    /// Replace the factory that builds the default transport.
    ///
    /// The factory runs at most once, on the first request that needs it.
    /// A transport set on the context still takes priority.
    pub fn with_http_connector(
        mut self,
        connector: impl Fn() -> Result<Arc<dyn HttpSend>> + Send + Sync + 'static,
    ) -> Self {
        self.connector = Arc::new(connector);
        self
    }

    /// Config of this client.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Receive the message at the head of the queue and lock it.
    ///
    /// Waits up to [`Config::timeout`] seconds on the service side. An empty queue
    /// surfaces as a [`NoMessagesAvailable`](sbqueue_core::ErrorKind::NoMessagesAvailable) error.
    pub async fn receive(&self) -> Result<Message> {
        let req = new_request(
            &self.config,
            &self.signer,
            Method::POST,
            &receive_path(self.config.timeout),
        )?;
        let resp = self.execute(req).await?;

        Ok(parse_message(&self.ctx, resp))
    }

    /// Send a message to the queue.
    pub async fn send(&self, msg: &Message) -> Result<()> {
        let req = new_message_request(&self.config, &self.signer, msg)?;
        self.execute(req).await?;
        Ok(())
    }

    /// Release the lock of a received message so it can be received again.
    pub async fn unlock(&self, msg: &Message) -> Result<()> {
        let req = new_request(&self.config, &self.signer, Method::PUT, &message_path(msg))?;
        self.execute(req).await?;
        Ok(())
    }

    /// Delete a received message from the queue.
    pub async fn delete(&self, msg: &Message) -> Result<()> {
        let req = new_request(
            &self.config,
            &self.signer,
            Method::DELETE,
            &message_path(msg),
        )?;
        self.execute(req).await?;
        Ok(())
    }

    fn http_send(&self) -> Result<Arc<dyn HttpSend>> {
        if let Some(http) = self.ctx.http_send_override() {
            return Ok(http);
        }

        self.http
            .get_or_try_init(|| (self.connector)())
            .map(Arc::clone)
    }

    async fn execute(&self, req: Request<Bytes>) -> Result<Response<Bytes>> {
        let method = req.method().clone();
        self.ctx
            .debug(format_args!("sending {method} request to {}", req.uri()));

        let http = self.http_send()?;
        let resp = http.http_send(req).await.map_err(|e| {
            self.ctx
                .debug(format_args!("sending {method} request failed: {e:?}"));
            e.with_context(format!("sending {method} request failed"))
        })?;

        self.ctx
            .debug(format_args!("{method} request got status {}", resp.status()));
        check_status(&resp)?;
        Ok(resp)
    }
}

fn default_http_send() -> Result<Arc<dyn HttpSend>> {
    let client = reqwest::Client::builder()
        .build()
        .map_err(|e| Error::unexpected("failed to build http client").with_source(e))?;

    Ok(Arc::new(ReqwestHttpSend::new(client)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::BROKER_PROPERTIES;
    use async_trait::async_trait;
    use http::header;
    use pretty_assertions::assert_eq;
    use sbqueue_core::ErrorKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Mutex, MutexGuard};

    #[derive(Debug, Clone)]
    struct MockHttpSend {
        status: u16,
        headers: Vec<(&'static str, &'static str)>,
        body: &'static str,
        requests: Arc<Mutex<Vec<Request<Bytes>>>>,
    }

    impl MockHttpSend {
        fn new(status: u16) -> Self {
            Self {
                status,
                headers: Vec::new(),
                body: "",
                requests: Arc::default(),
            }
        }

        fn with_header(mut self, key: &'static str, value: &'static str) -> Self {
            self.headers.push((key, value));
            self
        }

        fn with_body(mut self, body: &'static str) -> Self {
            self.body = body;
            self
        }

        fn requests(&self) -> MutexGuard<'_, Vec<Request<Bytes>>> {
            self.requests.lock().unwrap()
        }
    }

    #[async_trait]
    impl HttpSend for MockHttpSend {
        async fn http_send(&self, req: Request<Bytes>) -> Result<Response<Bytes>> {
            self.requests.lock().unwrap().push(req);

            let mut builder = Response::builder().status(self.status);
            for (k, v) in &self.headers {
                builder = builder.header(*k, *v);
            }
            Ok(builder.body(Bytes::from_static(self.body.as_bytes()))?)
        }
    }

    #[derive(Debug)]
    struct FailingHttpSend;

    #[async_trait]
    impl HttpSend for FailingHttpSend {
        async fn http_send(&self, _: Request<Bytes>) -> Result<Response<Bytes>> {
            Err(Error::unexpected("connection refused"))
        }
    }

    fn test_config() -> Config {
        Config::new("test", "key", "keyvalue", "test").with_timeout(60)
    }

    fn test_client(http: MockHttpSend) -> QueueClient {
        QueueClient::new(Context::new().with_http_send(http), test_config()).unwrap()
    }

    fn received_message() -> Message {
        Message {
            id: Some("31907572164743c38741631acd554d6f".to_string()),
            lock_token: Some("7da9cfd5-40d5-4bb1-8d64-ec5a52e1c547".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_invalid_config() {
        let err = QueueClient::new(Context::new(), Config::new("test", "", "keyvalue", "test"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }

    #[tokio::test]
    async fn test_receive() {
        let http = MockHttpSend::new(201)
            .with_header(
                BROKER_PROPERTIES,
                r#"{"DeliveryCount":1,"LockToken":"7da9cfd5-40d5-4bb1-8d64-ec5a52e1c547","MessageId":"31907572164743c38741631acd554d6f","SequenceNumber":2}"#,
            )
            .with_header("Prop1", "\"Value1\"")
            .with_body("Hello World");
        let client = test_client(http.clone());

        let msg = client.receive().await.unwrap();
        assert_eq!(msg.body, Bytes::from_static(b"Hello World"));
        assert_eq!(msg.properties["Prop1"], "Value1");
        assert_eq!(msg.id.as_deref(), Some("31907572164743c38741631acd554d6f"));
        assert_eq!(
            msg.lock_token.as_deref(),
            Some("7da9cfd5-40d5-4bb1-8d64-ec5a52e1c547")
        );
        assert_eq!(msg.delivery_count, Some(1));
        assert_eq!(msg.sequence_number, Some(2));

        let requests = http.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method(), Method::POST);
        assert_eq!(
            requests[0].uri().to_string(),
            "https://test.servicebus.windows.net:443/test/messages/head?timeout=60"
        );
        let authorization = requests[0].headers()[header::AUTHORIZATION]
            .to_str()
            .unwrap();
        assert!(
            authorization.starts_with("SharedAccessSignature sig="),
            "{authorization}"
        );
        assert!(
            authorization.ends_with("&skn=key&sr=https%3a%2f%2ftest.servicebus.windows.net%3a443%2ftest%2fmessages%2fhead%3ftimeout%3d60"),
            "{authorization}"
        );
    }

    #[tokio::test]
    async fn test_receive_empty_queue() {
        let client = test_client(MockHttpSend::new(204));

        let err = client.receive().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoMessagesAvailable);
        assert_eq!(err.status(), Some(http::StatusCode::NO_CONTENT));
    }

    #[tokio::test]
    async fn test_send() {
        let http = MockHttpSend::new(201);
        let client = test_client(http.clone());

        let msg = Message::new("Hello!")
            .with_label("M1")
            .with_content_type("text/plain")
            .with_property("Prop1", "Value1");
        client.send(&msg).await.unwrap();

        let requests = http.requests();
        assert_eq!(requests.len(), 1);
        let req = &requests[0];
        assert_eq!(req.method(), Method::POST);
        assert_eq!(
            req.uri().to_string(),
            "https://test.servicebus.windows.net:443/test/messages/"
        );
        assert_eq!(req.headers()["prop1"], "Value1");
        assert_eq!(req.headers()[BROKER_PROPERTIES], r#"{"Label":"M1"}"#);
        assert_eq!(req.headers()[header::CONTENT_TYPE], "text/plain");
        assert_eq!(req.body(), &Bytes::from_static(b"Hello!"));
    }

    #[tokio::test]
    async fn test_send_rejected() {
        let client = test_client(MockHttpSend::new(401).with_body("invalid signature"));

        let err = client.send(&Message::new("Hello!")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotAuthorized);
        assert_eq!(err.body(), Some("invalid signature"));
    }

    #[tokio::test]
    async fn test_unlock() {
        let http = MockHttpSend::new(200);
        let client = test_client(http.clone());

        client.unlock(&received_message()).await.unwrap();

        let requests = http.requests();
        assert_eq!(requests[0].method(), Method::PUT);
        assert_eq!(
            requests[0].uri().to_string(),
            "https://test.servicebus.windows.net:443/test/messages/31907572164743c38741631acd554d6f/7da9cfd5-40d5-4bb1-8d64-ec5a52e1c547"
        );
        assert!(requests[0].body().is_empty());
    }

    #[tokio::test]
    async fn test_delete() {
        let http = MockHttpSend::new(200);
        let client = test_client(http.clone());

        client.delete(&received_message()).await.unwrap();

        let requests = http.requests();
        assert_eq!(requests[0].method(), Method::DELETE);
        assert_eq!(
            requests[0].uri().to_string(),
            "https://test.servicebus.windows.net:443/test/messages/31907572164743c38741631acd554d6f/7da9cfd5-40d5-4bb1-8d64-ec5a52e1c547"
        );
    }

    #[tokio::test]
    async fn test_delete_unknown_message() {
        let client = test_client(MockHttpSend::new(404));

        let err = client.delete(&Message::default()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MessageNotFound);
    }

    #[tokio::test]
    async fn test_transport_error() {
        let client =
            QueueClient::new(Context::new().with_http_send(FailingHttpSend), test_config())
                .unwrap();

        let err = client.unlock(&received_message()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unexpected);
        assert_eq!(
            err.to_string(),
            "sending PUT request failed: connection refused"
        );
        assert_eq!(err.status(), None);
    }

    #[tokio::test]
    async fn test_context_transport_wins() {
        let built = Arc::new(AtomicUsize::new(0));
        let http = MockHttpSend::new(201);

        let counter = built.clone();
        let client = test_client(http.clone()).with_http_connector(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(MockHttpSend::new(500)))
        });

        client.send(&Message::new("Hello!")).await.unwrap();
        assert_eq!(built.load(Ordering::SeqCst), 0);
        assert_eq!(http.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_default_transport_is_reused() {
        let built = Arc::new(AtomicUsize::new(0));
        let http = MockHttpSend::new(201);

        let counter = built.clone();
        let connected = http.clone();
        let client = QueueClient::new(Context::new(), test_config())
            .unwrap()
            .with_http_connector(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Arc::new(connected.clone()))
            });

        client.send(&Message::new("a")).await.unwrap();
        client.send(&Message::new("b")).await.unwrap();
        assert_eq!(built.load(Ordering::SeqCst), 1);
        assert_eq!(http.requests().len(), 2);
    }

    #[test]
    fn test_default_transport_concurrent_first_use() {
        let built = Arc::new(AtomicUsize::new(0));

        let counter = built.clone();
        let client = QueueClient::new(Context::new(), test_config())
            .unwrap()
            .with_http_connector(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                std::thread::sleep(std::time::Duration::from_millis(20));
                Ok(Arc::new(MockHttpSend::new(201)))
            });

        let transports: Vec<_> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8).map(|_| s.spawn(|| client.http_send())).collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap().unwrap())
                .collect()
        });

        assert_eq!(built.load(Ordering::SeqCst), 1);
        for transport in &transports[1..] {
            assert!(Arc::ptr_eq(&transports[0], transport));
        }
    }

    #[test]
    fn test_connector_error_is_not_cached() {
        let built = Arc::new(AtomicUsize::new(0));

        let counter = built.clone();
        let client = QueueClient::new(Context::new(), test_config())
            .unwrap()
            .with_http_connector(move || {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    return Err(Error::unexpected("no tls backend"));
                }
                Ok(Arc::new(MockHttpSend::new(201)))
            });

        assert_eq!(
            client.http_send().unwrap_err().kind(),
            ErrorKind::Unexpected
        );
        assert!(client.http_send().is_ok());
        assert!(client.http_send().is_ok());
        assert_eq!(built.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_client_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<QueueClient>();
    }
}
