//! Per-template validation schemas.
//!
//! Kept apart from the conversation copy in `templates` so hard validation
//! rules and UX wording can change independently.

use std::collections::BTreeMap;

use crate::templates::TemplateType;

/// Field name → every message raised for it.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Answers that mean "nothing to add" for optional fields.
pub const DEFAULT_NONE_SENTINELS: &[&str] = &["없음", "없어요", "없습니다", "패스"];

const PASSTHROUGH_REJECTED: &str = "허용되지 않는 항목입니다.";

/// Constraint on a single input field.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub key: &'static str,
    pub required: bool,
    /// Minimum trimmed character count.
    pub min_length: usize,
    /// Reported when a required field is missing or blank.
    pub missing: &'static str,
    /// Reported when the value is shorter than `min_length`.
    pub too_short: &'static str,
}

/// Validation rules for one template.
#[derive(Debug)]
pub struct ValidationSchema {
    pub template_type: TemplateType,
    pub fields: &'static [FieldRule],
    /// Whether keys not declared in `fields` are ignored (true) or rejected.
    pub passthrough: bool,
    pub none_sentinels: &'static [&'static str],
}

/// Trimmed values that passed every rule, keyed by field.
#[derive(Debug, Default)]
pub struct CheckedFields(BTreeMap<&'static str, String>);

impl CheckedFields {
    /// Value of a required field. Present whenever `check` succeeded.
    pub fn required(&mut self, key: &str) -> String {
        self.0.remove(key).unwrap_or_default()
    }

    pub fn optional(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }
}

impl ValidationSchema {
    pub fn rule(&self, key: &str) -> Option<&FieldRule> {
        self.fields.iter().find(|r| r.key == key)
    }

    pub fn is_none_sentinel(&self, value: &str) -> bool {
        let trimmed = value.trim();
        self.none_sentinels.iter().any(|s| *s == trimmed)
    }

    /// Whether `value` is a sentinel accepted for `key`. Only optional
    /// fields accept sentinels.
    pub fn accepts_sentinel(&self, key: &str, value: &str) -> bool {
        self.rule(key).is_some_and(|r| !r.required) && self.is_none_sentinel(value)
    }

    /// Check every rule and collect all failures.
    pub fn check(&self, inputs: &BTreeMap<String, String>) -> Result<CheckedFields, FieldErrors> {
        let mut errors = FieldErrors::new();
        let mut checked = CheckedFields::default();

        for rule in self.fields {
            let value = inputs
                .get(rule.key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty());

            match value {
                None if rule.required => push(&mut errors, rule.key, rule.missing),
                None => {}
                Some(v) if !rule.required && self.is_none_sentinel(v) => {
                    checked.0.insert(rule.key, v.to_string());
                }
                Some(v) if v.chars().count() < rule.min_length => {
                    push(&mut errors, rule.key, rule.too_short);
                }
                Some(v) => {
                    checked.0.insert(rule.key, v.to_string());
                }
            }
        }

        if !self.passthrough {
            for key in inputs.keys() {
                if self.rule(key).is_none() {
                    push(&mut errors, key, PASSTHROUGH_REJECTED);
                }
            }
        }

        if errors.is_empty() {
            Ok(checked)
        } else {
            Err(errors)
        }
    }
}

fn push(errors: &mut FieldErrors, key: &str, message: &str) {
    errors
        .entry(key.to_string())
        .or_default()
        .push(message.to_string());
}

/// Schema for a template.
pub fn schema_for(template_type: TemplateType) -> &'static ValidationSchema {
    match template_type {
        TemplateType::Blog => &BLOG_SCHEMA,
        TemplateType::Email => &EMAIL_SCHEMA,
        TemplateType::Naming => &NAMING_SCHEMA,
        TemplateType::Journal => &JOURNAL_SCHEMA,
    }
}

pub static BLOG_SCHEMA: ValidationSchema = ValidationSchema {
    template_type: TemplateType::Blog,
    fields: &[
        FieldRule {
            key: "topic",
            required: true,
            min_length: 2,
            missing: "글의 주제를 입력해주세요.",
            too_short: "주제는 2자 이상 입력해주세요.",
        },
        FieldRule {
            key: "targetAudience",
            required: true,
            min_length: 2,
            missing: "독자를 입력해주세요.",
            too_short: "독자는 2자 이상 입력해주세요.",
        },
        FieldRule {
            key: "tone",
            required: true,
            min_length: 2,
            missing: "글의 톤을 입력해주세요.",
            too_short: "톤은 2자 이상 입력해주세요.",
        },
        FieldRule {
            key: "constraints",
            required: false,
            min_length: 2,
            missing: "",
            too_short: "포함할 내용은 2자 이상 입력해주세요.",
        },
    ],
    passthrough: true,
    none_sentinels: DEFAULT_NONE_SENTINELS,
};

pub static EMAIL_SCHEMA: ValidationSchema = ValidationSchema {
    template_type: TemplateType::Email,
    fields: &[
        FieldRule {
            key: "recipient",
            required: true,
            min_length: 2,
            missing: "받는 사람을 입력해주세요.",
            too_short: "받는 사람은 2자 이상 입력해주세요.",
        },
        FieldRule {
            key: "purpose",
            required: true,
            min_length: 5,
            missing: "이메일의 목적을 입력해주세요.",
            too_short: "목적은 5자 이상 입력해주세요.",
        },
        FieldRule {
            key: "keyPoints",
            required: true,
            min_length: 5,
            missing: "핵심 내용을 입력해주세요.",
            too_short: "핵심 내용은 5자 이상 입력해주세요.",
        },
        FieldRule {
            key: "tone",
            required: true,
            min_length: 2,
            missing: "어조를 입력해주세요.",
            too_short: "어조는 2자 이상 입력해주세요.",
        },
    ],
    passthrough: true,
    none_sentinels: DEFAULT_NONE_SENTINELS,
};

pub static NAMING_SCHEMA: ValidationSchema = ValidationSchema {
    template_type: TemplateType::Naming,
    fields: &[
        FieldRule {
            key: "subject",
            required: true,
            min_length: 2,
            missing: "이름을 지을 대상을 입력해주세요.",
            too_short: "대상은 2자 이상 입력해주세요.",
        },
        FieldRule {
            key: "description",
            required: true,
            min_length: 5,
            missing: "대상의 특징을 입력해주세요.",
            too_short: "특징은 5자 이상 입력해주세요.",
        },
        FieldRule {
            key: "style",
            required: true,
            min_length: 2,
            missing: "원하는 이름의 느낌을 입력해주세요.",
            too_short: "느낌은 2자 이상 입력해주세요.",
        },
        FieldRule {
            key: "avoid",
            required: false,
            min_length: 1,
            missing: "",
            too_short: "피하고 싶은 내용을 입력해주세요.",
        },
    ],
    passthrough: true,
    none_sentinels: DEFAULT_NONE_SENTINELS,
};

pub static JOURNAL_SCHEMA: ValidationSchema = ValidationSchema {
    template_type: TemplateType::Journal,
    fields: &[
        FieldRule {
            key: "mood",
            required: true,
            min_length: 2,
            missing: "오늘의 기분을 입력해주세요.",
            too_short: "기분은 2자 이상 입력해주세요.",
        },
        FieldRule {
            key: "events",
            required: true,
            min_length: 5,
            missing: "오늘 있었던 일을 입력해주세요.",
            too_short: "있었던 일은 5자 이상 입력해주세요.",
        },
        FieldRule {
            key: "reflection",
            required: false,
            min_length: 2,
            missing: "",
            too_short: "느낀 점은 2자 이상 입력해주세요.",
        },
    ],
    passthrough: false,
    none_sentinels: DEFAULT_NONE_SENTINELS,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn blank_required_value_counts_as_missing() {
        let errors = BLOG_SCHEMA
            .check(&inputs(&[("topic", "   "), ("targetAudience", "대학생"), ("tone", "친근하게")]))
            .unwrap_err();
        assert_eq!(errors["topic"], vec!["글의 주제를 입력해주세요.".to_string()]);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn sentinel_is_accepted_only_for_optional_fields() {
        assert!(BLOG_SCHEMA.accepts_sentinel("constraints", "없음"));
        assert!(!BLOG_SCHEMA.accepts_sentinel("topic", "없음"));
        assert!(!BLOG_SCHEMA.accepts_sentinel("unknown", "없음"));
    }

    #[test]
    fn every_schema_accepts_every_sentinel_for_optional_fields() {
        for t in TemplateType::ALL {
            let schema = schema_for(t);
            for rule in schema.fields.iter().filter(|r| !r.required) {
                for sentinel in schema.none_sentinels {
                    assert!(
                        schema.accepts_sentinel(rule.key, sentinel),
                        "{t}.{} should accept {sentinel}",
                        rule.key
                    );
                }
            }
        }
    }

    #[test]
    fn strict_schema_rejects_unknown_keys() {
        let errors = JOURNAL_SCHEMA
            .check(&inputs(&[
                ("mood", "기뻤어요"),
                ("events", "친구와 산책을 했다"),
                ("password", "hunter2"),
            ]))
            .unwrap_err();
        assert_eq!(errors.keys().collect::<Vec<_>>(), vec!["password"]);
    }

    #[test]
    fn passthrough_schema_ignores_unknown_keys() {
        let checked = BLOG_SCHEMA.check(&inputs(&[
            ("topic", "AI 윤리"),
            ("targetAudience", "대학생"),
            ("tone", "전문적으로"),
            ("extra", "x"),
        ]));
        assert!(checked.is_ok());
    }

    #[test]
    fn checked_values_are_trimmed() {
        let mut checked = BLOG_SCHEMA
            .check(&inputs(&[
                ("topic", "  AI 윤리 "),
                ("targetAudience", "대학생"),
                ("tone", "전문적으로"),
            ]))
            .unwrap();
        assert_eq!(checked.required("topic"), "AI 윤리");
        assert_eq!(checked.optional("constraints"), None);
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // Two Hangul syllables are six UTF-8 bytes but two characters.
        let result = BLOG_SCHEMA.check(&inputs(&[
            ("topic", "윤리"),
            ("targetAudience", "대학생"),
            ("tone", "친근"),
        ]));
        assert!(result.is_ok());
    }
}
