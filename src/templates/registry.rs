//! Template registry — read-only catalog of dialogue flows.

use std::collections::HashSet;

use crate::error::ConfigError;
use crate::validation::schema_for;

use super::builtin::builtin_templates;
use super::model::{SuggestedReply, TemplateDefinition, TemplateType};

/// Catalog of flows, checked once at construction.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: Vec<TemplateDefinition>,
}

impl TemplateRegistry {
    /// Build a registry, rejecting malformed flows.
    pub fn new(templates: Vec<TemplateDefinition>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for def in &templates {
            if !seen.insert(def.template_type) {
                return Err(invalid(def, "duplicate template type"));
            }
            check_flow(def)?;
        }
        Ok(Self { templates })
    }

    /// The built-in flows.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::new(builtin_templates())
    }

    /// Find a flow by its wire tag.
    pub fn lookup(&self, tag: &str) -> Option<&TemplateDefinition> {
        let tt = TemplateType::from_tag(tag)?;
        self.get(tt)
    }

    pub fn get(&self, template_type: TemplateType) -> Option<&TemplateDefinition> {
        self.templates
            .iter()
            .find(|d| d.template_type == template_type)
    }

    /// Interpret free text as a template choice. First match in menu order wins.
    pub fn match_selection(&self, utterance: &str) -> Option<&TemplateDefinition> {
        self.templates.iter().find(|d| d.matches(utterance))
    }

    /// Top-level menu suggestions.
    pub fn menu(&self) -> Vec<SuggestedReply> {
        self.templates
            .iter()
            .map(|d| SuggestedReply::new(d.menu_label))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TemplateDefinition> {
        self.templates.iter()
    }
}

fn check_flow(def: &TemplateDefinition) -> Result<(), ConfigError> {
    let Some(last) = def.steps.last() else {
        return Err(invalid(def, "flow has no steps"));
    };
    if !last.terminal {
        return Err(invalid(def, "last step must be terminal"));
    }
    if def.steps.iter().filter(|s| s.terminal).count() != 1 {
        return Err(invalid(def, "exactly one terminal step is allowed"));
    }
    if !last.suggestions.iter().any(|s| s.triggers_final) {
        return Err(invalid(def, "terminal step offers no trigger"));
    }

    let schema = schema_for(def.template_type);
    let mut keys = HashSet::new();
    for step in def.steps.iter().filter(|s| !s.terminal) {
        let Some(key) = step.field_key else {
            return Err(invalid(def, "non-terminal step has no field key"));
        };
        if !keys.insert(key) {
            return Err(invalid(def, &format!("field '{key}' collected twice")));
        }
        if schema.rule(key).is_none() {
            return Err(invalid(def, &format!("field '{key}' has no validation rule")));
        }
    }
    Ok(())
}

fn invalid(def: &TemplateDefinition, reason: &str) -> ConfigError {
    ConfigError::InvalidTemplate {
        template: def.template_type.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::model::ConversationStep;

    #[test]
    fn builtin_registry_is_valid() {
        let registry = TemplateRegistry::builtin().unwrap();
        assert_eq!(registry.iter().count(), TemplateType::ALL.len());
        for t in TemplateType::ALL {
            assert!(registry.get(t).is_some(), "{t} missing");
        }
    }

    #[test]
    fn lookup_by_tag() {
        let registry = TemplateRegistry::builtin().unwrap();
        assert_eq!(
            registry.lookup("blog").map(|d| d.template_type),
            Some(TemplateType::Blog)
        );
        assert!(registry.lookup("poem").is_none());
    }

    #[test]
    fn selection_by_keyword_label_or_tag() {
        let registry = TemplateRegistry::builtin().unwrap();
        let pick = |s: &str| registry.match_selection(s).map(|d| d.template_type);
        assert_eq!(pick("블로그 글쓰기"), Some(TemplateType::Blog));
        assert_eq!(pick("블로그 글 좀 써줘"), Some(TemplateType::Blog));
        assert_eq!(pick("email"), Some(TemplateType::Email));
        assert_eq!(pick("오늘 일기 쓸래"), Some(TemplateType::Journal));
        assert_eq!(pick("시를 써줘"), None);
    }

    #[test]
    fn menu_lists_every_template() {
        let registry = TemplateRegistry::builtin().unwrap();
        let labels: Vec<String> = registry.menu().into_iter().map(|s| s.label).collect();
        assert_eq!(labels, vec!["블로그 글쓰기", "이메일 작성", "이름 짓기", "일기 쓰기"]);
    }

    #[test]
    fn rejects_flow_without_terminal_step() {
        let def = TemplateDefinition {
            template_type: TemplateType::Blog,
            menu_label: "블로그",
            keywords: &[],
            steps: vec![ConversationStep::ask("주제?", "topic")],
        };
        assert!(TemplateRegistry::new(vec![def]).is_err());
    }

    #[test]
    fn rejects_field_unknown_to_schema() {
        let def = TemplateDefinition {
            template_type: TemplateType::Blog,
            menu_label: "블로그",
            keywords: &[],
            steps: vec![
                ConversationStep::ask("색깔?", "colour"),
                ConversationStep::finish("끝", "생성"),
            ],
        };
        let err = TemplateRegistry::new(vec![def]).unwrap_err();
        assert!(err.to_string().contains("colour"));
    }

    #[test]
    fn rejects_duplicate_templates() {
        let defs = vec![builtin_templates().remove(0), builtin_templates().remove(0)];
        assert!(TemplateRegistry::new(defs).is_err());
    }
}
