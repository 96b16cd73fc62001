//! Field validator — checks a completed input set against a template's rules.
//!
//! `validate` dispatches on the template tag to one function per template
//! variant and returns a typed `ValidatedInputs`. It is pure and reports every
//! field failure at once.

pub mod schema;

use std::collections::BTreeMap;

use crate::error::SynthesisError;
use crate::templates::TemplateType;

pub use schema::{FieldErrors, FieldRule, ValidationSchema, schema_for};
use schema::{BLOG_SCHEMA, EMAIL_SCHEMA, JOURNAL_SCHEMA, NAMING_SCHEMA};

/// Why an input set was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The tag names no known template. Raised before any field is inspected.
    UnsupportedTemplate(String),
    /// One or more fields failed their rules.
    Fields(FieldErrors),
}

impl From<Rejection> for SynthesisError {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::UnsupportedTemplate(template_type) => {
                SynthesisError::InvalidTemplateType { template_type }
            }
            Rejection::Fields(fields) => SynthesisError::invalid_fields(fields),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogInputs {
    pub topic: String,
    pub target_audience: String,
    pub tone: String,
    pub constraints: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailInputs {
    pub recipient: String,
    pub purpose: String,
    pub key_points: String,
    pub tone: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingInputs {
    pub subject: String,
    pub description: String,
    pub style: String,
    pub avoid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalInputs {
    pub mood: String,
    pub events: String,
    pub reflection: Option<String>,
}

/// Validated inputs, one variant per template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatedInputs {
    Blog(BlogInputs),
    Email(EmailInputs),
    Naming(NamingInputs),
    Journal(JournalInputs),
}

impl ValidatedInputs {
    pub fn template_type(&self) -> TemplateType {
        match self {
            Self::Blog(_) => TemplateType::Blog,
            Self::Email(_) => TemplateType::Email,
            Self::Naming(_) => TemplateType::Naming,
            Self::Journal(_) => TemplateType::Journal,
        }
    }

    /// Present fields in schema order, using their wire keys.
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        let mut out = Vec::new();
        match self {
            Self::Blog(b) => {
                out.push(("topic", b.topic.as_str()));
                out.push(("targetAudience", b.target_audience.as_str()));
                out.push(("tone", b.tone.as_str()));
                if let Some(c) = &b.constraints {
                    out.push(("constraints", c.as_str()));
                }
            }
            Self::Email(e) => {
                out.push(("recipient", e.recipient.as_str()));
                out.push(("purpose", e.purpose.as_str()));
                out.push(("keyPoints", e.key_points.as_str()));
                out.push(("tone", e.tone.as_str()));
            }
            Self::Naming(n) => {
                out.push(("subject", n.subject.as_str()));
                out.push(("description", n.description.as_str()));
                out.push(("style", n.style.as_str()));
                if let Some(a) = &n.avoid {
                    out.push(("avoid", a.as_str()));
                }
            }
            Self::Journal(j) => {
                out.push(("mood", j.mood.as_str()));
                out.push(("events", j.events.as_str()));
                if let Some(r) = &j.reflection {
                    out.push(("reflection", r.as_str()));
                }
            }
        }
        out
    }

    /// An optional value, or `None` when absent or answered with a sentinel.
    pub fn meaningful<'a>(&self, value: &'a Option<String>) -> Option<&'a str> {
        let schema = schema_for(self.template_type());
        value.as_deref().filter(|v| !schema.is_none_sentinel(v))
    }
}

/// Validate `inputs` against the schema selected by `template_type`.
pub fn validate(
    template_type: &str,
    inputs: &BTreeMap<String, String>,
) -> Result<ValidatedInputs, Rejection> {
    let Some(tt) = TemplateType::from_tag(template_type) else {
        return Err(Rejection::UnsupportedTemplate(template_type.to_string()));
    };

    let validated = match tt {
        TemplateType::Blog => validate_blog(inputs).map(ValidatedInputs::Blog),
        TemplateType::Email => validate_email(inputs).map(ValidatedInputs::Email),
        TemplateType::Naming => validate_naming(inputs).map(ValidatedInputs::Naming),
        TemplateType::Journal => validate_journal(inputs).map(ValidatedInputs::Journal),
    };
    validated.map_err(Rejection::Fields)
}

fn validate_blog(inputs: &BTreeMap<String, String>) -> Result<BlogInputs, FieldErrors> {
    let mut f = BLOG_SCHEMA.check(inputs)?;
    Ok(BlogInputs {
        topic: f.required("topic"),
        target_audience: f.required("targetAudience"),
        tone: f.required("tone"),
        constraints: f.optional("constraints"),
    })
}

fn validate_email(inputs: &BTreeMap<String, String>) -> Result<EmailInputs, FieldErrors> {
    let mut f = EMAIL_SCHEMA.check(inputs)?;
    Ok(EmailInputs {
        recipient: f.required("recipient"),
        purpose: f.required("purpose"),
        key_points: f.required("keyPoints"),
        tone: f.required("tone"),
    })
}

fn validate_naming(inputs: &BTreeMap<String, String>) -> Result<NamingInputs, FieldErrors> {
    let mut f = NAMING_SCHEMA.check(inputs)?;
    Ok(NamingInputs {
        subject: f.required("subject"),
        description: f.required("description"),
        style: f.required("style"),
        avoid: f.optional("avoid"),
    })
}

fn validate_journal(inputs: &BTreeMap<String, String>) -> Result<JournalInputs, FieldErrors> {
    let mut f = JOURNAL_SCHEMA.check(inputs)?;
    Ok(JournalInputs {
        mood: f.required("mood"),
        events: f.required("events"),
        reflection: f.optional("reflection"),
    })
}
