//! The per-message processing pipeline.
//!
//! [`LeadPipeline`] is the main entry point for this crate. Each inbound
//! message runs the same strictly sequential chain:
//!
//! ```text
//! classify -> extract -> validate -> duplicate-check -> persist
//! ```
//!
//! with four terminal outcomes ([`Outcome`]): `Dropped` (subject matches no
//! known template), `Rejected` (body doesn't match the template's shape or
//! fails validation), `SkippedDuplicate` (already seen, by message id or
//! natural key), and `Accepted` (one durable insert happened).
//!
//! Every outcome counts as successful completion from the transport's point
//! of view; only genuine system faults (a failing store) surface as errors,
//! so the transport's retry/backoff applies to exactly the cases where a
//! retry can help.
//!
//! # Example
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
//!     id: "msg-1".into(),
//!     sender: "forms@example.com".into(),
//!     subject: "NEW M LEAD inquiry".into(),
//!     body: "Jane Doe\n0821234567\njane@example.com\nCape Town".into(),
//!     date: Utc::now(),
//!     forwarded: false,
//! };
//!
//! match pipeline.process(&message).await? {
//!     Outcome::Accepted { id } => println!("stored lead {id}"),
//!     other => println!("no insert: {other:?}"),
//! }
//! # Ok(())
//! # }
//! ```

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::extract;
use crate::lead::LeadRecord;
use crate::message::RawMessage;
use crate::store::{InsertOutcome, LeadStore};
use crate::templates::TemplateKind;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Terminal state of one message's trip through the pipeline.
///
/// All four variants are successful completions; none should trigger
/// redelivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The subject matched no known template. The common case for ordinary
    /// mail; deliberately content-free.
    Dropped,
    /// The template's extractor returned absence: the body didn't match the
    /// known shape or failed field validation. Expected, not an error.
    Rejected,
    /// A record for this message id or this lead's natural key already
    /// exists.
    SkippedDuplicate,
    /// A lead record was durably inserted.
    Accepted {
        /// Store-assigned identifier of the new record.
        id: i64,
    },
}

/// Processes inbound messages into deduplicated, persisted leads.
///
/// The pipeline holds no per-message state; `process` takes `&self` and
/// multiple messages may be processed concurrently against a shared store.
/// The duplicate pre-checks and the insert are not atomic with each other -
/// races on the same natural key are resolved by the store's own uniqueness
/// enforcement and collapse to [`Outcome::SkippedDuplicate`].
pub struct LeadPipeline {
    config: PipelineConfig,
    store: Arc<dyn LeadStore>,
}

impl LeadPipeline {
    /// Creates a pipeline over the given store.
    #[must_use]
    pub fn new(config: PipelineConfig, store: Arc<dyn LeadStore>) -> Self {
        Self { config, store }
    }

    /// Runs one message through classify → extract → dedup → persist.
    ///
    /// Idempotent with respect to `message.id`: redelivery of an already
    /// stored message yields [`Outcome::SkippedDuplicate`] without a second
    /// insert. The single durable side effect happens at the terminal
    /// accept; cancellation anywhere earlier leaves nothing behind.
    ///
    /// # Errors
    ///
    /// Returns an error only for store failures (retryable at the
    /// transport's discretion). Unrecognized, malformed and duplicate
    /// messages are all `Ok` outcomes.
    #[instrument(
        name = "LeadPipeline::process",
        skip_all,
        fields(message_id = %message.id)
    )]
    pub async fn process(&self, message: &RawMessage) -> Result<Outcome> {
        // Unrecognized mail is dropped before anything inspects the body:
        // no extractor, validator or store call, and no content logging.
        let Some(template) = self.config.subjects().classify(&message.subject) else {
            debug!("Subject matched no known template - dropping");
            return Ok(Outcome::Dropped);
        };

        debug!(template = %template, "Message classified");

        let Some(lead) = extract::extract(template, &message.body) else {
            info!(template = %template, "Extraction returned no valid lead - rejecting");
            return Ok(Outcome::Rejected);
        };

        if self.store.has_message(&message.id).await? {
            info!("Message already processed - skipping");
            return Ok(Outcome::SkippedDuplicate);
        }

        let record = LeadRecord::assemble(
            message,
            template,
            &lead,
            self.config.placeholder_domain(),
        );

        if let Some(key) = record.natural_key() {
            if self.store.has_lead_with_key(template, key).await? {
                info!(template = %template, "Lead with same natural key exists - skipping");
                return Ok(Outcome::SkippedDuplicate);
            }
        }

        match self.store.insert_lead(&record).await? {
            InsertOutcome::Inserted { id } => {
                info!(
                    id,
                    template = %template,
                    contact_method = %record.contact_method,
                    "Lead accepted and stored"
                );
                Ok(Outcome::Accepted { id })
            }
            // The pre-check and the insert aren't atomic; a constraint
            // firing here is a benign race, not a fault.
            InsertOutcome::DuplicateConflict => {
                info!(template = %template, "Insert reported duplicate conflict - skipping");
                Ok(Outcome::SkippedDuplicate)
            }
        }
    }

    /// Classifies a subject without running the rest of the pipeline.
    #[must_use]
    pub fn classify(&self, subject: &str) -> Option<TemplateKind> {
        self.config.subjects().classify(subject)
    }

    /// The pipeline's configuration.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

impl std::fmt::Debug for LeadPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeadPipeline")
            .field("subjects", &self.config.subjects().len())
            .field("placeholder_domain", &self.config.placeholder_domain())
            .finish_non_exhaustive()
    }
}
