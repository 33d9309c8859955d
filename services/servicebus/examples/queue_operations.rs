use sbqueue_core::{Context, ErrorKind, OsEnv, Result};
use sbqueue_servicebus::constants::*;
use sbqueue_servicebus::{Config, Message, QueueClient, SasSigner};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging, run with RUST_LOG=sbqueue=debug to see every request.
    let _ = env_logger::builder().try_init();

    let ctx = Context::new().with_env(OsEnv);

    let has_real_creds = ctx.env_var(AZURE_SERVICEBUS_CONNECTION_STRING).is_some()
        || ctx.env_var(AZURE_SERVICEBUS_KEY).is_some();

    if !has_real_creds {
        println!("No Service Bus credentials found, using demo mode");
        println!(
            "To use a real queue, set {AZURE_SERVICEBUS_CONNECTION_STRING} or {AZURE_SERVICEBUS_NAMESPACE}, {AZURE_SERVICEBUS_KEY_NAME}, {AZURE_SERVICEBUS_KEY} and {AZURE_SERVICEBUS_QUEUE}"
        );
        println!();

        let config = Config::new("mynamespace", "RootManageSharedAccessKey", "c2VjcmV0", "orders");
        let signer = SasSigner::new(&config.key_name, &config.key_value);
        println!("Queue url: {}", config.queue_url());
        println!("Authorization: {}", signer.authorization(&config.queue_url()));
        return Ok(());
    }

    let config = Config::default().with_timeout(5).from_env(&ctx)?;
    let client = QueueClient::new(ctx, config)?;

    // Example 1: Send a message
    println!("Example 1: Send a message");
    let msg = Message::new("Hello World")
        .with_label("greeting")
        .with_content_type("text/plain")
        .with_property("Prop1", "Value1");
    client.send(&msg).await?;
    println!("Sent");

    // Example 2: Receive it in peek-lock mode
    println!("\nExample 2: Receive a message");
    let received = match client.receive().await {
        Ok(msg) => msg,
        Err(err) if err.kind() == ErrorKind::NoMessagesAvailable => {
            println!("Queue is empty");
            return Ok(());
        }
        Err(err) => return Err(err),
    };
    println!("Id: {:?}", received.id);
    println!("Lock token: {:?}", received.lock_token);
    println!("Delivery count: {:?}", received.delivery_count);
    println!("Properties: {:?}", received.properties);
    println!("Body: {}", String::from_utf8_lossy(&received.body));

    // Example 3: Release the lock, then take it again and delete
    println!("\nExample 3: Unlock and delete");
    client.unlock(&received).await?;
    let received = client.receive().await?;
    client.delete(&received).await?;
    println!("Deleted {:?}", received.id);

    Ok(())
}
