use crate::Result;
use bytes::Bytes;
use std::fmt::Debug;

/// HttpSend is used to send the http requests built by a client.
///
/// The default implementation lives in `sbqueue-http-send-reqwest`. Tests and
/// applications with their own HTTP stack can provide another one through
/// [`Context::with_http_send`](crate::Context::with_http_send).
#[async_trait::async_trait]
pub trait HttpSend: Debug + Send + Sync + 'static {
    /// Send http request and return the response with its body fully read.
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>>;
}
