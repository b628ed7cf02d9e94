//! The persistence boundary for accepted leads.
//!
//! The pipeline is storage-agnostic: it talks to any [`LeadStore`]
//! implementation through three operations - two existence checks and one
//! insert. The schema, transactions and connection pooling behind them are
//! the implementation's concern.
//!
//! [`MemoryLeadStore`] is a complete in-memory implementation used as the
//! reference for the boundary's contract (and by the integration tests):
//! it enforces message-id and natural-key uniqueness atomically, the way a
//! relational store's unique constraints would.

use crate::error::Result;
use crate::lead::LeadRecord;
use crate::templates::TemplateKind;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;
use tracing::debug;

/// Result of attempting to insert a lead.
///
/// A uniqueness conflict is a first-class outcome, not an error: the
/// existence pre-check and the insert are not executed atomically, so under
/// races the store's own constraint is the final arbiter and firing it is
/// benign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The record was durably inserted under this identifier.
    Inserted {
        /// Store-assigned identifier of the new record.
        id: i64,
    },
    /// A uniqueness constraint fired; an equivalent record already exists.
    DuplicateConflict,
}

/// Async boundary to wherever leads are durably kept.
///
/// Implementations must be safe to share across concurrently running
/// pipelines. The two query methods never mutate state; `insert_lead` is
/// the only durable side effect in the whole pipeline.
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Returns `true` if this message identifier has already produced a
    /// stored record (idempotency under at-least-once delivery).
    async fn has_message(&self, message_id: &str) -> Result<bool>;

    /// Returns `true` if a prior record exists for this template's natural
    /// key: an email address for structured leads, a phone number for
    /// contact-form leads.
    async fn has_lead_with_key(&self, template: TemplateKind, key: &str) -> Result<bool>;

    /// Inserts an accepted lead, or reports a uniqueness conflict.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`](crate::Error::Store) for genuine storage
    /// faults (connectivity, timeouts) - never for duplicates.
    async fn insert_lead(&self, record: &LeadRecord) -> Result<InsertOutcome>;
}

/// Natural keys are scoped per dedup family: structured leads key on email,
/// both contact forms share the phone keyspace.
fn key_family(template: TemplateKind) -> &'static str {
    if template.is_contact_form() {
        "phone"
    } else {
        "email"
    }
}

#[derive(Default)]
struct MemoryState {
    records: Vec<LeadRecord>,
    message_ids: HashSet<String>,
    natural_keys: HashMap<(&'static str, String), i64>,
    next_id: i64,
}

/// In-memory [`LeadStore`] with relational-style uniqueness enforcement.
///
/// All three operations take the same mutex, so the check inside
/// `insert_lead` is atomic with the insert itself: two racing pipelines
/// accepting the same natural key resolve to exactly one `Inserted` and one
/// `DuplicateConflict`, never two records.
#[derive(Default)]
pub struct MemoryLeadStore {
    state: Mutex<MemoryState>,
}

impl MemoryLeadStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    pub async fn len(&self) -> usize {
        self.state.lock().await.records.len()
    }

    /// Returns `true` if no records are stored.
    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.records.is_empty()
    }

    /// Returns a snapshot of all stored records, in insertion order.
    pub async fn records(&self) -> Vec<LeadRecord> {
        self.state.lock().await.records.clone()
    }
}

impl std::fmt::Debug for MemoryLeadStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryLeadStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl LeadStore for MemoryLeadStore {
    async fn has_message(&self, message_id: &str) -> Result<bool> {
        Ok(self.state.lock().await.message_ids.contains(message_id))
    }

    async fn has_lead_with_key(&self, template: TemplateKind, key: &str) -> Result<bool> {
        let state = self.state.lock().await;
        Ok(state
            .natural_keys
            .contains_key(&(key_family(template), key.to_string())))
    }

    async fn insert_lead(&self, record: &LeadRecord) -> Result<InsertOutcome> {
        let mut state = self.state.lock().await;

        // Uniqueness checks and insert under one lock, like a constraint.
        if state.message_ids.contains(&record.message_id) {
            debug!(message_id = %record.message_id, "Insert conflict on message id");
            return Ok(InsertOutcome::DuplicateConflict);
        }
        if let Some(key) = record.natural_key() {
            let family_key = (key_family(record.template), key.to_string());
            if state.natural_keys.contains_key(&family_key) {
                debug!(key = %key, "Insert conflict on natural key");
                return Ok(InsertOutcome::DuplicateConflict);
            }
        }

        state.next_id += 1;
        let id = state.next_id;

        state.message_ids.insert(record.message_id.clone());
        if let Some(key) = record.natural_key() {
            let family_key = (key_family(record.template), key.to_string());
            state.natural_keys.insert(family_key, id);
        }
        state.records.push(record.clone());

        debug!(id, message_id = %record.message_id, "Lead inserted");
        Ok(InsertOutcome::Inserted { id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract_structured_lead;
    use crate::message::RawMessage;
    use chrono::Utc;

    fn record(message_id: &str, email: &str) -> LeadRecord {
        let body = format!("Jane Doe\n0821234567\n{email}\nCape Town");
        let lead = extract_structured_lead(&body).unwrap();
        let msg = RawMessage {
            id: message_id.into(),
            sender: "forms@example.com".into(),
            subject: "NEW M LEAD".into(),
            body,
            date: Utc::now(),
            forwarded: false,
        };
        LeadRecord::assemble(&msg, TemplateKind::StructuredLead, &lead, "placeholder.invalid")
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let store = MemoryLeadStore::new();
        assert!(store.is_empty().await);

        let outcome = store.insert_lead(&record("m-1", "jane@example.com")).await.unwrap();
        assert!(matches!(outcome, InsertOutcome::Inserted { id: 1 }));

        assert!(store.has_message("m-1").await.unwrap());
        assert!(!store.has_message("m-2").await.unwrap());
        assert!(store
            .has_lead_with_key(TemplateKind::StructuredLead, "jane@example.com")
            .await
            .unwrap());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_message_id_conflict() {
        let store = MemoryLeadStore::new();
        store.insert_lead(&record("m-1", "a@example.com")).await.unwrap();

        let outcome = store.insert_lead(&record("m-1", "b@example.com")).await.unwrap();
        assert_eq!(outcome, InsertOutcome::DuplicateConflict);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_natural_key_conflict() {
        let store = MemoryLeadStore::new();
        store.insert_lead(&record("m-1", "same@example.com")).await.unwrap();

        let outcome = store.insert_lead(&record("m-2", "same@example.com")).await.unwrap();
        assert_eq!(outcome, InsertOutcome::DuplicateConflict);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_key_families_do_not_collide() {
        // A phone-keyed contact form and an email-keyed structured lead can
        // never conflict with each other even if the strings were equal.
        assert_ne!(
            key_family(TemplateKind::StructuredLead),
            key_family(TemplateKind::ContactFormA)
        );
        assert_eq!(
            key_family(TemplateKind::ContactFormA),
            key_family(TemplateKind::ContactFormB)
        );
    }
}
