//! # lead-intake
//!
//! Turns inbound notification emails into deduplicated, persisted leads.
//!
//! This crate provides the processing core for a mailbox-watching lead
//! capture service:
//!
//! - Classifying messages by subject line into a fixed set of known
//!   lead-generation templates (tolerant of forwarding prefixes)
//! - Extracting structured contact fields (name, phone, email, location,
//!   notes) from semi-structured plaintext bodies via per-template
//!   extraction routines
//! - Validating extracted fields and rejecting anything that doesn't match
//!   a known shape, rather than emitting corrupted data
//! - Deduplicating against both the transport's message identifier
//!   (at-least-once delivery) and each template's natural key
//!
//! The mailbox transport and the storage engine are collaborators behind
//! interface boundaries: the transport hands over [`RawMessage`]s (or raw
//! RFC 822 payloads via [`RawMessage::from_rfc822`]), and accepted leads go
//! through the [`LeadStore`] trait.
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use chrono::Utc;
//! use lead_intake::{LeadPipeline, MemoryLeadStore, Outcome, PipelineConfig, RawMessage};
//!
//! # async fn example() -> lead_intake::Result<()> {
//! let config = PipelineConfig::builder().build()?;
//! let pipeline = LeadPipeline::new(config, Arc::new(MemoryLeadStore::new()));
//!
//! let message = RawMessage {
//!     id: "gmail-18c2".into(),
//!     sender: "website@example.com".into(),
//!     subject: "Fwd: NEW M LEAD inquiry".into(),
//!     body: "Jane Doe\n0821234567\njane@example.com\nCape Town\nWants deep tissue".into(),
//!     date: Utc::now(),
//!     forwarded: true,
//! };
//!
//! let outcome = pipeline.process(&message).await?;
//! assert!(matches!(outcome, Outcome::Accepted { .. }));
//!
//! // Redelivery of the same message id is a no-op.
//! assert_eq!(pipeline.process(&message).await?, Outcome::SkippedDuplicate);
//! # Ok(())
//! # }
//! ```
//!
//! ## Adjusting the watched subjects
//!
//! The subject table is configuration, not code:
//!
//! ```
//! use lead_intake::{PipelineConfig, SubjectRegistry, TemplateKind};
//!
//! let mut subjects = SubjectRegistry::with_defaults();
//! subjects.register(TemplateKind::StructuredLead, "PRIORITY LEAD");
//!
//! let config = PipelineConfig::builder()
//!     .subjects(subjects)
//!     .build()
//!     .expect("valid config");
//! ```
//!
//! ## Error Handling
//!
//! Unrecognized subjects, failed extraction and duplicates are expected
//! [`Outcome`]s, not errors. [`Error`] is reserved for system faults; use
//! [`Error::is_retryable`] to decide whether the transport should redeliver:
//!
//! ```
//! use lead_intake::Error;
//!
//! fn handle_error(error: &Error) {
//!     if error.is_retryable() {
//!         println!("Transient error, can retry: {}", error);
//!     } else {
//!         println!("Permanent error: {}", error);
//!     }
//! }
//! ```
//!
//! ## Observability
//!
//! The crate uses `tracing` for instrumentation. Pipeline runs emit a
//! `LeadPipeline::process` span carrying the message id; expected-empty
//! outcomes are info-level events, system faults are errors. No subscriber
//! is installed by the crate itself.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Public modules
pub mod config;
pub mod error;
pub mod extract;
pub mod lead;
pub mod matcher;
pub mod message;
pub mod pipeline;
pub mod store;
pub mod templates;
pub mod validate;

// Re-exports for ergonomic API
pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use error::{Error, ErrorCategory, Result};
pub use extract::ExtractedLead;
pub use lead::{ContactMethod, LeadRecord};
pub use message::RawMessage;
pub use pipeline::{LeadPipeline, Outcome};
pub use store::{InsertOutcome, LeadStore, MemoryLeadStore};
pub use templates::{SubjectRegistry, TemplateKind};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api_accessible() {
        // Ensure all public types are accessible
        let _ = PipelineConfig::builder();
        let _ = SubjectRegistry::with_defaults();
        let _ = MemoryLeadStore::new();
    }
}
