//! Template identification from email subject lines.
//!
//! Each lead source produces a fixed, known notification-email shape; the
//! subject line is the only signal needed to tell them apart. This module
//! provides the closed [`TemplateKind`] enumeration and a runtime-adjustable
//! [`SubjectRegistry`] mapping each kind to its canonical subject fragment.
//!
//! # Example
//!
//! ```
//! use lead_intake::templates::{SubjectRegistry, TemplateKind};
//!
//! let registry = SubjectRegistry::with_defaults();
//! assert_eq!(registry.classify("NEW M LEAD inquiry"), Some(TemplateKind::StructuredLead));
//! assert_eq!(registry.classify("Fwd: NEW M LEAD inquiry"), Some(TemplateKind::StructuredLead));
//! assert_eq!(registry.classify("Weekly newsletter"), None);
//! ```

use regex::Regex;
use std::sync::LazyLock;

/// Matches a single leading forward-prefix token and trailing whitespace.
static FORWARD_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^fwd:\s*").expect("valid regex"));

/// The closed set of recognized lead-source templates.
///
/// Classification of a subject yields exactly one kind or none; there is no
/// "unknown template" member. Anything unrecognized is simply not a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    /// Machine-generated lead notification with a rigid 4-line header.
    StructuredLead,
    /// Home-page contact form relayed through the notification template.
    ContactFormA,
    /// Packages-page contact form relayed through the notification template.
    ContactFormB,
}

impl TemplateKind {
    /// Stable identifier used in logs and stored records.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TemplateKind::StructuredLead => "structured_lead",
            TemplateKind::ContactFormA => "contact_form_home",
            TemplateKind::ContactFormB => "contact_form_packages",
        }
    }

    /// Returns `true` for the free-text contact-form templates.
    ///
    /// Contact-form submissions carry no email address, which changes both
    /// the extraction routine and the deduplication key.
    #[must_use]
    pub fn is_contact_form(self) -> bool {
        matches!(self, TemplateKind::ContactFormA | TemplateKind::ContactFormB)
    }
}

impl std::fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered, runtime-adjustable map of template kinds to subject fragments.
///
/// Classification tests each `(kind, fragment)` entry in registration order
/// with case-insensitive substring containment against the cleaned subject;
/// the first match wins. The table can be adjusted without touching any
/// extractor logic.
///
/// # Example
///
/// ```
/// use lead_intake::templates::{SubjectRegistry, TemplateKind};
///
/// let mut registry = SubjectRegistry::new();
/// registry.register(TemplateKind::StructuredLead, "FRESH LEAD");
///
/// assert_eq!(registry.classify("FRESH LEAD from site"), Some(TemplateKind::StructuredLead));
/// assert_eq!(registry.classify("NEW M LEAD"), None); // defaults not loaded
/// ```
#[derive(Debug, Clone)]
pub struct SubjectRegistry {
    entries: Vec<(TemplateKind, String)>,
}

impl Default for SubjectRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl SubjectRegistry {
    /// Creates an empty registry with no subject mappings.
    #[must_use]
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Creates a registry preloaded with the known production fragments,
    /// in priority order.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_many([
            (TemplateKind::StructuredLead, "NEW M LEAD"),
            (TemplateKind::ContactFormA, "SA Home page message"),
            (TemplateKind::ContactFormB, "SA Packages page message"),
        ]);
        registry
    }

    /// Appends a subject-fragment mapping at the lowest priority.
    ///
    /// Registering the same kind twice is allowed; either fragment will then
    /// classify to that kind.
    pub fn register(&mut self, kind: TemplateKind, fragment: impl Into<String>) {
        self.entries.push((kind, fragment.into()));
    }

    /// Appends multiple mappings at once, preserving iteration order.
    pub fn register_many<I, F>(&mut self, mappings: I)
    where
        I: IntoIterator<Item = (TemplateKind, F)>,
        F: Into<String>,
    {
        for (kind, fragment) in mappings {
            self.register(kind, fragment);
        }
    }

    /// Removes all mappings for the given kind.
    pub fn unregister(&mut self, kind: TemplateKind) {
        self.entries.retain(|(k, _)| *k != kind);
    }

    /// Classifies a subject line into a template kind.
    ///
    /// A single leading `Fwd:` token is stripped (case-insensitively) before
    /// matching, so forwarded notifications classify identically to their
    /// originals. Pure function of the subject: total, deterministic, no
    /// side effects.
    #[must_use]
    pub fn classify(&self, subject: &str) -> Option<TemplateKind> {
        let cleaned = FORWARD_PREFIX.replace(subject, "");
        let cleaned_lower = cleaned.to_lowercase();

        self.entries
            .iter()
            .find(|(_, fragment)| cleaned_lower.contains(&fragment.to_lowercase()))
            .map(|(kind, _)| *kind)
    }

    /// Returns the registered `(kind, fragment)` entries in priority order.
    #[must_use]
    pub fn entries(&self) -> &[(TemplateKind, String)] {
        &self.entries
    }

    /// Returns the number of registered mappings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the registry has no mappings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
