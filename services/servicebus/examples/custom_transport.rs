use async_trait::async_trait;
use bytes::Bytes;
use log::{Level, Log, Metadata, Record};
use sbqueue_core::{Context, HttpSend, Result};
use sbqueue_servicebus::{Config, Message, QueueClient};

/// Transport that answers every request locally, handy to run a client without a queue.
#[derive(Debug)]
struct LoopbackHttpSend;

#[async_trait]
impl HttpSend for LoopbackHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        println!("{} {}", req.method(), req.uri());

        let resp = if req.uri().path().ends_with("/messages/head") {
            http::Response::builder()
                .status(201)
                .header(
                    "brokerproperties",
                    r#"{"DeliveryCount":1,"LockToken":"7da9cfd5-40d5-4bb1-8d64-ec5a52e1c547","MessageId":"31907572164743c38741631acd554d6f"}"#,
                )
                .header("prop1", "\"Value1\"")
                .body(Bytes::from_static(b"Hello World"))?
        } else {
            http::Response::builder().status(201).body(Bytes::new())?
        };
        Ok(resp)
    }
}

/// Logger that prints the client records with their level.
struct StdoutLogger;

impl Log for StdoutLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Debug
    }

    fn log(&self, record: &Record) {
        println!("[{}] {}", record.level(), record.args());
    }

    fn flush(&self) {}
}

#[tokio::main]
async fn main() -> Result<()> {
    let ctx = Context::new()
        .with_http_send(LoopbackHttpSend)
        .with_logger(StdoutLogger);

    let config = Config::new("mynamespace", "RootManageSharedAccessKey", "c2VjcmV0", "orders")
        .with_timeout(5);
    let client = QueueClient::new(ctx, config)?;

    client.send(&Message::new("Hello World")).await?;

    let msg = client.receive().await?;
    println!("Received {:?} with properties {:?}", msg.id, msg.properties);

    client.delete(&msg).await?;
    Ok(())
}
