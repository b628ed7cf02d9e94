//! Basic example: Run a batch of raw messages through the lead pipeline.
//!
//! This example demonstrates the most common use case - decoding RFC 822
//! payloads, classifying them by subject, and persisting the accepted leads
//! with duplicate suppression.
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=lead_intake=debug cargo run --example process_inbox
//! ```

use lead_intake::{LeadPipeline, MemoryLeadStore, Outcome, PipelineConfig, RawMessage};
use std::sync::Arc;

#[tokio::main]
async fn main() -> lead_intake::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let store = Arc::new(MemoryLeadStore::new());
    let config = PipelineConfig::builder().build()?;
    let pipeline = LeadPipeline::new(config, store.clone());

    // A structured lead, a redelivery of it, and an unrelated message.
    let payloads: [(&str, &[u8]); 3] = [
        (
            "msg-1001",
            b"From: forms@example.com\r\n\
              Subject: NEW M LEAD inquiry\r\n\
              Date: Mon, 6 Jan 2025 10:00:00 +0200\r\n\
              \r\n\
              Jane Doe\r\n0821234567\r\njane@example.com\r\nCape Town\r\nWants deep tissue",
        ),
        (
            "msg-1001",
            b"From: forms@example.com\r\n\
              Subject: Fwd: NEW M LEAD inquiry\r\n\
              \r\n\
              Jane Doe\r\n0821234567\r\njane@example.com\r\nCape Town\r\nWants deep tissue",
        ),
        (
            "msg-1002",
            b"From: billing@example.com\r\n\
              Subject: Your invoice for January\r\n\
              \r\n\
              Amount due: $42.00",
        ),
    ];

    for (id, raw) in payloads {
        let message = RawMessage::from_rfc822(id, raw)?;
        match pipeline.process(&message).await? {
            Outcome::Accepted { id } => println!("{}: stored as lead #{id}", message.id),
            Outcome::SkippedDuplicate => println!("{}: duplicate, skipped", message.id),
            Outcome::Rejected => println!("{}: recognized but unusable, rejected", message.id),
            Outcome::Dropped => println!("{}: not a lead subject, dropped", message.id),
        }
    }

    println!("\n{} lead(s) in the store:", store.len().await);
    for record in store.records().await {
        println!(
            "  #{} {} {} <{}> via {}",
            record.message_id, record.first_name, record.last_name, record.email,
            record.contact_method
        );
    }

    Ok(())
}
