//! Body extraction routines, one per template kind.
//!
//! Two very different input shapes flow through here:
//!
//! - [`TemplateKind::StructuredLead`] bodies are machine-generated with a
//!   rigid 4-line header, handled by a line splitter.
//! - The contact-form templates relay human-typed form fields through an
//!   email template with inconsistent whitespace and literal asterisks used
//!   as emphasis markers around field labels. Those are handled by per-field
//!   [`PatternCascade`]s, ordered newest-layout-first so that extraction
//!   keeps working across every historical template revision.
//!
//! Extraction either yields a fully validated [`ExtractedLead`] or `None`;
//! a partially valid record is never passed downstream. Failures here are
//! expected outcomes, logged at info level, never errors.

use crate::matcher::{FieldPattern, Matcher, PatternCascade};
use crate::templates::TemplateKind;
use crate::validate::{clean_text, is_valid_email, is_valid_name, is_valid_phone};
use regex::Regex;
use std::sync::LazyLock;
use tracing::info;

/// Strips a trailing emphasis-marker artifact: everything from the first
/// run of asterisks to the end of the (already whitespace-collapsed) value.
static TRAILING_EMPHASIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*+.*$").expect("valid regex"));

/// A validated, structured extraction result.
///
/// Instances are only constructed by the extractors in this module after the
/// template's validation gate has passed, so a value of this type is always
/// safe to persist: the name is non-empty and valid, and the remaining
/// fields satisfy the rules of the template that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedLead {
    name: String,
    phone: String,
    email: String,
    location: String,
    notes: String,
}

impl ExtractedLead {
    /// The lead's full name. Non-empty and valid per [`is_valid_name`].
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Digit-bearing phone string. May be empty for contact-form leads that
    /// supplied a location instead.
    #[must_use]
    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// Email address. Validated for structured leads, always empty for
    /// contact-form leads (the forms do not collect one).
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Free-text location. May be empty.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Free-text notes (goals, injuries, other details). May be empty.
    #[must_use]
    pub fn notes(&self) -> &str {
        &self.notes
    }
}

/// Runs the extractor for `kind` against a message body.
///
/// Returns `None` when the body does not match the template's known shape or
/// fails its validation gate; the caller treats that as an expected
/// rejection, not an error.
#[must_use]
pub fn extract(kind: TemplateKind, body: &str) -> Option<ExtractedLead> {
    match kind {
        TemplateKind::StructuredLead => extract_structured_lead(body),
        TemplateKind::ContactFormA | TemplateKind::ContactFormB => extract_contact_form(body),
    }
}

/// Parses a structured lead body: the first 4 non-empty lines are name,
/// phone, email and location, everything after is free-text notes.
///
/// The format is rigid by contract with the upstream tool, so fewer than 4
/// lines means the body is not what we think it is - no partial fallback.
#[must_use]
pub fn extract_structured_lead(body: &str) -> Option<ExtractedLead> {
    let lines: Vec<&str> = body
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if lines.len() < 4 {
        info!(
            lines = lines.len(),
            "Structured lead body doesn't have expected format - skipping"
        );
        return None;
    }

    let name = lines[0].to_string();
    let phone = lines[1].to_string();
    let email = lines[2].to_string();
    let location = lines[3].to_string();
    let notes = lines[4..].join("\n");

    if !is_valid_name(&name) {
        info!(field = "name", value = %name, "Invalid field in structured lead - skipping");
        return None;
    }
    if !is_valid_phone(&phone) {
        info!(field = "phone", value = %phone, "Invalid field in structured lead - skipping");
        return None;
    }
    if !is_valid_email(&email) {
        info!(field = "email", value = %email, "Invalid field in structured lead - skipping");
        return None;
    }

    info!(name = %name, email = %email, "Valid structured lead extracted");

    Some(ExtractedLead {
        name,
        phone,
        email,
        location,
        notes,
    })
}

/// The per-field cascades for the contact-form templates.
///
/// Pattern order is load-bearing: the first entries are anchored to the
/// current asterisk-emphasized layout (`*Name and Surname**`,
/// `*Number (10 digits)**`, ...), the middle entries cover historical
/// template revisions, and the last entry of each cascade is a bare
/// permissive fallback. Both contact-form templates share these cascades.
struct ContactFormCascades {
    name: PatternCascade,
    phone: PatternCascade,
    location: PatternCascade,
    notes: PatternCascade,
}

static CONTACT_FORM: LazyLock<ContactFormCascades> = LazyLock::new(|| {
    let pattern = |re: &str, desc: &str| FieldPattern::new(re, desc).expect("valid pattern");

    ContactFormCascades {
        name: PatternCascade::new(
            "name",
            vec![
                pattern(
                    r"(?is)\*Name and Surname\*\*\s*\n\s*([A-Za-z][A-Za-z\s]+?)\s*(?:\*Number|$)",
                    "exact asterisk layout, anchored to Number label",
                ),
                pattern(
                    r"(?is)\*?Name and Surname\*?\s*\n?\s*([A-Za-z][A-Za-z\s]+?)\s*(?:\*?Number|$)",
                    "optional asterisks, anchored to Number label",
                ),
                pattern(
                    r"(?is)Name and Surname\*?\s*\n.*?\n.*?\n.*?\n.*?\n.*?\n\s*([A-Z][A-Z\s]+)",
                    "value six lines below the label (old layout)",
                ),
                pattern(
                    r"(?is)\*?Name and Surname\*?\s*\n+\s*([^\n]+)",
                    "first line after the label",
                ),
                pattern(
                    r"(?is)Name and Surname\*?\s*([^\n\r]+)",
                    "value on the label line",
                ),
                pattern(
                    r"(?is)Name.*?\n+\s*([A-Z][A-Z\s]+)",
                    "permissive fallback after any Name label",
                ),
            ],
        ),
        phone: PatternCascade::new(
            "phone",
            vec![
                pattern(
                    r"(?is)\*Number \(10 digits\)\*\*\s*\n\s*([0-9]{9,})",
                    "exact asterisk layout",
                ),
                pattern(
                    r"(?is)\*?Number.*?\*?\s*\n?\s*([0-9]{9,})",
                    "optional asterisks after Number label",
                ),
                pattern(
                    r"(?is)Number \(10 digits\)\*?\s*\n.*?\n.*?\n.*?\n.*?\n.*?\n\s*(\d{9,})",
                    "value six lines below the label (old layout)",
                ),
                pattern(
                    r"(?is)\*?Number.*?\*?\s*\n+\s*([0-9]+)",
                    "any digit run after the label",
                ),
                pattern(r"(?is)Number.*?(\d{9,})", "digit run anywhere after Number"),
                pattern(r"(\d{9,})", "bare run of 9+ digits"),
            ],
        ),
        location: PatternCascade::new(
            "location",
            vec![
                pattern(
                    r"(?is)\*Location\*\s*\n\s*([^\n*]+?)\s*(?:\*?Goals|$)",
                    "exact asterisk layout, anchored to Goals label",
                ),
                pattern(
                    r"(?is)\*?Location\*?\s*\n?\s*([^\n*]+?)\s*(?:\*?Goals|$)",
                    "optional asterisks, anchored to Goals label",
                ),
                pattern(
                    r"(?is)Location\s*\n.*?\n.*?\n.*?\n.*?\n.*?\n\s*([^\n]+)",
                    "value six lines below the label (old layout)",
                ),
                pattern(
                    r"(?is)\*?Location\*?\s*\n+\s*([^\n]+)",
                    "first line after the label",
                ),
                pattern(r"(?is)Location\*?\s*([^\n\r]+)", "value on the label line"),
                pattern(
                    r"(?is)Location.*?\n+\s*([A-Za-z0-9\s,]+)",
                    "permissive fallback after Location",
                ),
            ],
        ),
        notes: PatternCascade::new(
            "notes",
            vec![
                pattern(
                    r"(?is)\*Goals, injuries & other details\*\s*\n\s*([^\n*]+?)\s*(?:Date:|$)",
                    "exact asterisk layout, anchored to Date line",
                ),
                pattern(
                    r"(?is)\*?Goals, injuries & other details\*?\s*\n?\s*([^\n*]+?)\s*(?:Date:|$)",
                    "optional asterisks, anchored to Date line",
                ),
                pattern(
                    r"(?is)Goals, injuries & other details\s*\n.*?\n.*?\n.*?\n.*?\n.*?\n\s*([^\n]+(?:\n[^\n]+)*?)(?:\n\s*Date:|$)",
                    "multi-line value six lines below the label (old layout)",
                ),
                pattern(
                    r"(?is)\*?Goals, injuries & other details\*?\s*\n+\s*([^\n\r]+)",
                    "first line after the label",
                ),
                pattern(
                    r"(?is)Goals.*?details.*?\s*([^\n\r]+)",
                    "value after any Goals...details label",
                ),
                pattern(
                    r"(?is)Goals.*?\n+\s*(.+?)\s*(?:Date:|$)",
                    "permissive fallback up to the Date line",
                ),
            ],
        ),
    }
});

/// Normalizes a raw capture: whitespace collapse, then removal of any
/// trailing emphasis-marker artifact, then a final trim.
fn clean_capture(raw: &str) -> String {
    let cleaned = clean_text(raw);
    TRAILING_EMPHASIS.replace(&cleaned, "").trim().to_string()
}

/// Parses a contact-form body via the pattern cascades.
///
/// A field no pattern matches yields an empty string, not failure. The
/// validation gate is deliberately asymmetric: the name must be valid, but
/// either a valid phone or a non-empty location is enough - form submitters
/// often omit a phone number while the form still captures a location.
#[must_use]
pub fn extract_contact_form(body: &str) -> Option<ExtractedLead> {
    let cascades = &*CONTACT_FORM;

    let name = cascades
        .name
        .find_match_where(body, |raw| {
            let value = clean_capture(raw);
            (value.len() >= 2 && value.chars().any(|c| c.is_ascii_alphabetic()))
                .then_some(value)
        })
        .unwrap_or_default();

    let phone = cascades
        .phone
        .find_match(body)
        .map(|raw| clean_text(&raw))
        .unwrap_or_default();

    let location = cascades
        .location
        .find_match_where(body, |raw| {
            let value = clean_capture(raw);
            (value.len() >= 2).then_some(value)
        })
        .unwrap_or_default();

    let notes = cascades
        .notes
        .find_match_where(body, |raw| {
            let value = clean_capture(raw);
            (value.len() >= 2).then_some(value)
        })
        .unwrap_or_default();

    if !is_valid_name(&name) {
        info!("Contact form missing valid name - skipping");
        return None;
    }

    if !is_valid_phone(&phone) && location.is_empty() {
        info!("Contact form missing both valid phone and location - skipping");
        return None;
    }

    info!(
        name = %name,
        phone = %phone,
        location = %location,
        "Contact form data extracted"
    );

    Some(ExtractedLead {
        name,
        phone,
        email: String::new(),
        location,
        notes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTACT_FORM_BODY: &str = "\
*Name and Surname**
Jane Doe
*Number (10 digits)**
0821234567
*Location*
Cape Town
*Goals, injuries & other details*
Wants deep tissue massage
Date: 2025-01-06";

    // ─────────────────────────────────────────────────────────────────────────
    // Structured lead extractor
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_structured_round_trip() {
        let body = "Jane Doe\n0821234567\njane@example.com\nCape Town\nWants deep tissue";
        let lead = extract_structured_lead(body).unwrap();

        assert_eq!(lead.name(), "Jane Doe");
        assert_eq!(lead.phone(), "0821234567");
        assert_eq!(lead.email(), "jane@example.com");
        assert_eq!(lead.location(), "Cape Town");
        assert_eq!(lead.notes(), "Wants deep tissue");
    }

    #[test]
    fn test_structured_multi_line_notes() {
        let body = "Jane Doe\n0821234567\njane@example.com\nCape Town\nline one\nline two";
        let lead = extract_structured_lead(body).unwrap();
        assert_eq!(lead.notes(), "line one\nline two");
    }

    #[test]
    fn test_structured_too_few_lines_is_absence() {
        let body = "Jane Doe\n0821234567\njane@example.com";
        assert_eq!(extract_structured_lead(body), None);
        assert_eq!(extract_structured_lead(""), None);
    }

    #[test]
    fn test_structured_blank_lines_ignored() {
        let body = "\nJane Doe\n\n0821234567\n\njane@example.com\n\nCape Town\n\n";
        let lead = extract_structured_lead(body).unwrap();
        assert_eq!(lead.name(), "Jane Doe");
        assert_eq!(lead.location(), "Cape Town");
        assert_eq!(lead.notes(), "");
    }

    #[test]
    fn test_structured_invalid_fields_abort_whole_extraction() {
        // Bad phone
        let body = "Jane Doe\n1234\njane@example.com\nCape Town";
        assert_eq!(extract_structured_lead(body), None);

        // Bad email
        let body = "Jane Doe\n0821234567\nnot-an-email\nCape Town";
        assert_eq!(extract_structured_lead(body), None);

        // Bad name
        let body = "J\n0821234567\njane@example.com\nCape Town";
        assert_eq!(extract_structured_lead(body), None);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Contact-form extractor
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_contact_form_exact_layout() {
        let lead = extract_contact_form(CONTACT_FORM_BODY).unwrap();
        assert_eq!(lead.name(), "Jane Doe");
        assert_eq!(lead.phone(), "0821234567");
        assert_eq!(lead.location(), "Cape Town");
        assert_eq!(lead.notes(), "Wants deep tissue massage");
        assert_eq!(lead.email(), "");
    }

    #[test]
    fn test_contact_form_without_asterisks() {
        let body = "\
Name and Surname
John Smith
Number (10 digits)
0834567890
Location
Durban
Goals, injuries & other details
Back pain";
        let lead = extract_contact_form(body).unwrap();
        assert_eq!(lead.name(), "John Smith");
        assert_eq!(lead.phone(), "0834567890");
        assert_eq!(lead.location(), "Durban");
        assert_eq!(lead.notes(), "Back pain");
    }

    #[test]
    fn test_contact_form_messy_whitespace() {
        let body = "\
*Name and Surname**

   Mary   Jane Watson
*Number (10 digits)**

  0829626790
*Location*

  Port   Elizabeth
*Goals, injuries & other details*

  Rehab after surgery
Date: today";
        let lead = extract_contact_form(body).unwrap();
        assert_eq!(lead.name(), "Mary Jane Watson");
        assert_eq!(lead.phone(), "0829626790");
        assert_eq!(lead.location(), "Port Elizabeth");
        assert_eq!(lead.notes(), "Rehab after surgery");
    }

    #[test]
    fn test_contact_form_leniency_location_without_phone() {
        let body = "\
*Name and Surname**
Jane Doe
*Number (10 digits)*

*Location*
Cape Town
*Goals, injuries & other details*
Just exploring";
        let lead = extract_contact_form(body).unwrap();
        assert_eq!(lead.name(), "Jane Doe");
        assert!(!is_valid_phone(lead.phone()));
        assert_eq!(lead.location(), "Cape Town");
    }

    #[test]
    fn test_contact_form_rejects_without_phone_and_location() {
        let body = "\
*Name and Surname**
Jane Doe
*Goals, injuries & other details*
No contact details at all";
        assert_eq!(extract_contact_form(body), None);
    }

    #[test]
    fn test_contact_form_rejects_without_name() {
        let body = "\
*Number (10 digits)**
0821234567
*Location*
Cape Town";
        assert_eq!(extract_contact_form(body), None);
    }

    #[test]
    fn test_contact_form_phone_fallback_bare_digits() {
        let body = "Someone called Jane Doe left this: reach her at 0827579541 please";
        // Name cascade's permissive fallback needs a label; this body has
        // none, so the gate fails on the name even though the phone matched.
        assert_eq!(extract_contact_form(body), None);

        let body = "Name and Surname\nJane Doe\nyou can reach her at 0827579541";
        let lead = extract_contact_form(body).unwrap();
        assert_eq!(lead.phone(), "0827579541");
    }

    #[test]
    fn test_dispatch_by_template_kind() {
        let structured = "Jane Doe\n0821234567\njane@example.com\nCape Town";
        assert!(extract(TemplateKind::StructuredLead, structured).is_some());
        assert!(extract(TemplateKind::ContactFormA, CONTACT_FORM_BODY).is_some());
        assert!(extract(TemplateKind::ContactFormB, CONTACT_FORM_BODY).is_some());
        // Wrong shape for the template: rejected, not mis-parsed
        assert!(extract(TemplateKind::StructuredLead, "only\ntwo lines").is_none());
    }

    #[test]
    fn test_clean_capture_strips_trailing_emphasis() {
        assert_eq!(clean_capture("Jane Doe **bold tail"), "Jane Doe");
        assert_eq!(clean_capture("  Jane   Doe  "), "Jane Doe");
        assert_eq!(clean_capture("*"), "");
    }
}
