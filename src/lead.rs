//! The persisted lead record and its derivation from an accepted extraction.
//!
//! A [`LeadRecord`] combines the validated [`ExtractedLead`] with the
//! [`RawMessage`]'s provenance. It is created exactly once per accepted
//! message and owned by the persistence boundary after hand-off; the core
//! never mutates it again.

use crate::extract::ExtractedLead;
use crate::message::RawMessage;
use crate::templates::TemplateKind;
use crate::validate::{is_valid_email, split_name};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// How a human should reach this lead first.
///
/// Contact-form submissions carry no email address, so their primary contact
/// method is always the phone; structured leads always carry a validated
/// email.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactMethod {
    /// Reach out by phone.
    Phone,
    /// Reach out by email.
    Email,
}

impl ContactMethod {
    /// Stable identifier used in logs and stored records.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ContactMethod::Phone => "phone",
            ContactMethod::Email => "email",
        }
    }
}

impl std::fmt::Display for ContactMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lead ready for durable insertion.
#[derive(Debug, Clone)]
pub struct LeadRecord {
    /// The originating message identifier (idempotency anchor).
    pub message_id: String,
    /// Which template produced this lead.
    pub template: TemplateKind,
    /// First-name component per the `split_name` policy.
    pub first_name: String,
    /// Last-name component per the `split_name` policy.
    pub last_name: String,
    /// Email address: real when the source supplied a valid one, otherwise
    /// a synthesized placeholder (see [`placeholder_email`]).
    pub email: String,
    /// Phone digits as extracted; may be empty for location-only leads.
    pub phone: String,
    /// Free-text location; may be empty.
    pub location: String,
    /// Free-text notes; may be empty.
    pub notes: String,
    /// The original subject line.
    pub subject: String,
    /// The original sender.
    pub sender: String,
    /// When the original message was sent.
    pub message_date: DateTime<Utc>,
    /// Whether the original message was forwarded.
    pub forwarded: bool,
    /// When the pipeline accepted this lead.
    pub processed_at: DateTime<Utc>,
    /// Whether `email` is a real collected address (vs. a placeholder).
    pub has_real_email: bool,
    /// Primary contact method derived from the template kind.
    pub contact_method: ContactMethod,
}

impl LeadRecord {
    /// Builds the record for an accepted lead.
    ///
    /// The name is decomposed via the `split_name` policy. When the template
    /// cannot supply an email (contact forms) or the supplied address fails
    /// validation, a placeholder is synthesized under `placeholder_domain`
    /// and `has_real_email` is set to `false`.
    #[must_use]
    pub fn assemble(
        message: &RawMessage,
        template: TemplateKind,
        lead: &ExtractedLead,
        placeholder_domain: &str,
    ) -> Self {
        let (first_name, last_name) = split_name(lead.name());

        let has_real_email = is_valid_email(lead.email());
        let email = if has_real_email {
            lead.email().to_string()
        } else {
            placeholder_email(placeholder_domain)
        };

        let contact_method = if template.is_contact_form() {
            ContactMethod::Phone
        } else {
            ContactMethod::Email
        };

        Self {
            message_id: message.id.clone(),
            template,
            first_name,
            last_name,
            email,
            phone: lead.phone().to_string(),
            location: lead.location().to_string(),
            notes: lead.notes().to_string(),
            subject: message.subject.clone(),
            sender: message.sender.clone(),
            message_date: message.date,
            forwarded: message.forwarded,
            processed_at: Utc::now(),
            has_real_email,
            contact_method,
        }
    }

    /// The value duplicate detection keys on for this record's template:
    /// the email address for structured leads, the phone number for
    /// contact-form leads. `None` when the keying field is empty or
    /// synthetic (nothing meaningful to compare).
    #[must_use]
    pub fn natural_key(&self) -> Option<&str> {
        if self.template.is_contact_form() {
            (!self.phone.is_empty()).then_some(self.phone.as_str())
        } else {
            self.has_real_email.then_some(self.email.as_str())
        }
    }
}

/// Synthesizes a recognizably-fake email address for leads that lack a real
/// one.
///
/// The random token makes collisions with other placeholders vanishingly
/// unlikely, and the dedicated domain guarantees no collision with real
/// collected addresses.
#[must_use]
pub fn placeholder_email(domain: &str) -> String {
    format!("lead-{}@{domain}", Uuid::new_v4().simple())
}

/// Returns `true` if the address was synthesized by [`placeholder_email`]
/// for the given domain.
#[must_use]
pub fn is_placeholder_email(email: &str, domain: &str) -> bool {
    email.starts_with("lead-") && email.ends_with(&format!("@{domain}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract_structured_lead;

    fn message(id: &str, subject: &str) -> RawMessage {
        RawMessage {
            id: id.into(),
            sender: "forms@example.com".into(),
            subject: subject.into(),
            body: String::new(),
            date: Utc::now(),
            forwarded: false,
        }
    }

    #[test]
    fn test_assemble_structured_lead() {
        let lead = extract_structured_lead(
            "Mary Jane Watson\n0821234567\nmary@example.com\nCape Town\nnotes here",
        )
        .unwrap();
        let msg = message("m-1", "NEW M LEAD");

        let record =
            LeadRecord::assemble(&msg, TemplateKind::StructuredLead, &lead, "placeholder.invalid");

        assert_eq!(record.first_name, "Mary Jane");
        assert_eq!(record.last_name, "Watson");
        assert_eq!(record.email, "mary@example.com");
        assert!(record.has_real_email);
        assert_eq!(record.contact_method, ContactMethod::Email);
        assert_eq!(record.natural_key(), Some("mary@example.com"));
        assert_eq!(record.message_id, "m-1");
    }

    #[test]
    fn test_assemble_contact_form_gets_placeholder_email() {
        let lead = crate::extract::extract_contact_form(
            "*Name and Surname**\nJohn Smith\n*Number (10 digits)**\n0834567890",
        )
        .unwrap();
        let msg = message("m-2", "SA Home page message");

        let record =
            LeadRecord::assemble(&msg, TemplateKind::ContactFormA, &lead, "placeholder.invalid");

        assert!(!record.has_real_email);
        assert!(is_placeholder_email(&record.email, "placeholder.invalid"));
        assert_eq!(record.contact_method, ContactMethod::Phone);
        assert_eq!(record.natural_key(), Some("0834567890"));
    }

    #[test]
    fn test_contact_form_without_phone_has_no_natural_key() {
        let lead = crate::extract::extract_contact_form(
            "*Name and Surname**\nJane Doe\n*Location*\nCape Town\n*Goals, injuries & other details*\nhi there",
        )
        .unwrap();
        let msg = message("m-3", "SA Packages page message");

        let record =
            LeadRecord::assemble(&msg, TemplateKind::ContactFormB, &lead, "placeholder.invalid");

        assert_eq!(record.phone, "");
        assert_eq!(record.natural_key(), None);
    }

    #[test]
    fn test_placeholder_emails_are_unique_and_recognizable() {
        let a = placeholder_email("placeholder.invalid");
        let b = placeholder_email("placeholder.invalid");

        assert_ne!(a, b);
        assert!(is_placeholder_email(&a, "placeholder.invalid"));
        assert!(!is_placeholder_email("jane@example.com", "placeholder.invalid"));
        assert!(!is_placeholder_email(&a, "other.invalid"));
    }
}
