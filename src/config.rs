//! Configuration for the lead-intake pipeline.
//!
//! Use [`PipelineConfigBuilder`] to create a configuration with sensible
//! defaults:
//!
//! ```
//! use lead_intake::PipelineConfig;
//!
//! let config = PipelineConfig::builder()
//!     .build()
//!     .expect("valid config");
//! assert_eq!(config.placeholder_domain(), "placeholder.invalid");
//! ```

use crate::error::{Error, Result};
use crate::templates::SubjectRegistry;

/// Default domain for synthesized placeholder emails. The `.invalid` TLD is
/// reserved and can never hold real collected addresses.
const DEFAULT_PLACEHOLDER_DOMAIN: &str = "placeholder.invalid";

/// Configuration for a [`LeadPipeline`](crate::LeadPipeline).
///
/// Create using [`PipelineConfig::builder()`].
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    subjects: SubjectRegistry,
    placeholder_domain: String,
}

impl PipelineConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// The subject-classification table.
    #[must_use]
    pub fn subjects(&self) -> &SubjectRegistry {
        &self.subjects
    }

    /// Domain under which placeholder emails are synthesized.
    #[must_use]
    pub fn placeholder_domain(&self) -> &str {
        &self.placeholder_domain
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            subjects: SubjectRegistry::with_defaults(),
            placeholder_domain: DEFAULT_PLACEHOLDER_DOMAIN.to_string(),
        }
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    subjects: Option<SubjectRegistry>,
    placeholder_domain: Option<String>,
}

impl PipelineConfigBuilder {
    /// Sets the subject-classification table.
    ///
    /// The default is [`SubjectRegistry::with_defaults`], the known
    /// production fragments. Adjusting the table never requires touching
    /// extractor logic.
    ///
    /// # Example
    ///
    /// ```
    /// use lead_intake::{PipelineConfig, SubjectRegistry, TemplateKind};
    ///
    /// let mut subjects = SubjectRegistry::with_defaults();
    /// subjects.register(TemplateKind::StructuredLead, "PRIORITY LEAD");
    ///
    /// let config = PipelineConfig::builder()
    ///     .subjects(subjects)
    ///     .build()
    ///     .expect("valid config");
    ///
    /// assert_eq!(
    ///     config.subjects().classify("PRIORITY LEAD for you"),
    ///     Some(TemplateKind::StructuredLead)
    /// );
    /// ```
    #[must_use]
    pub fn subjects(mut self, subjects: SubjectRegistry) -> Self {
        self.subjects = Some(subjects);
        self
    }

    /// Sets the domain for synthesized placeholder emails.
    ///
    /// Must contain a dot so the resulting addresses pass the same
    /// permissive email shape checks real addresses do.
    #[must_use]
    pub fn placeholder_domain(mut self, domain: impl Into<String>) -> Self {
        self.placeholder_domain = Some(domain.into());
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the placeholder domain is empty or lacks a dot,
    /// or if the subject table is empty (a pipeline that can classify
    /// nothing is a misconfiguration, not a quiet no-op).
    pub fn build(self) -> Result<PipelineConfig> {
        let subjects = self.subjects.unwrap_or_else(SubjectRegistry::with_defaults);
        if subjects.is_empty() {
            return Err(Error::InvalidConfig {
                message: "subject registry has no entries".into(),
            });
        }

        let placeholder_domain = self
            .placeholder_domain
            .unwrap_or_else(|| DEFAULT_PLACEHOLDER_DOMAIN.to_string());
        if placeholder_domain.is_empty() || !placeholder_domain.contains('.') {
            return Err(Error::InvalidConfig {
                message: format!("invalid placeholder domain: '{placeholder_domain}'"),
            });
        }

        Ok(PipelineConfig {
            subjects,
            placeholder_domain,
        })
    }
}
