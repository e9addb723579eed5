//! Email template operations and `{{placeholder}}` interpolation.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use rmcp::schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::models::{CreateTemplateInput, TemplateCategory, UpdateTemplateInput};
use crate::ops::{self, OpError};
use crate::store::Store;

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListTemplatesRequest {
    #[schemars(
        description = "Only templates in this category: introduction, follow_up, proposal, reminder or custom"
    )]
    pub category: Option<String>,
    #[schemars(description = "Page size, default 50")]
    pub limit: Option<u64>,
    #[schemars(description = "1-indexed page number, default 1")]
    pub page: Option<u64>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetTemplateRequest {
    #[schemars(description = "UUID of the template")]
    pub template_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplateRequest {
    #[schemars(description = "Template name shown in listings (required)")]
    pub name: Option<String>,
    #[schemars(description = "Subject line; may contain {{placeholders}} (required)")]
    pub subject: Option<String>,
    #[schemars(description = "Body text; may contain {{placeholders}} (required)")]
    pub body: Option<String>,
    #[schemars(
        description = "Category: introduction, follow_up, proposal, reminder or custom. Defaults to custom"
    )]
    pub category: Option<String>,
    #[schemars(description = "Declared placeholder names. Advisory only, never validated")]
    pub variables: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTemplateRequest {
    #[schemars(description = "UUID of the template to update")]
    pub template_id: Option<String>,
    #[schemars(description = "New name")]
    pub name: Option<String>,
    #[schemars(description = "New subject line")]
    pub subject: Option<String>,
    #[schemars(description = "New body text")]
    pub body: Option<String>,
    #[schemars(description = "New category")]
    pub category: Option<String>,
    #[schemars(description = "Replacement placeholder name list")]
    pub variables: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteTemplateRequest {
    #[schemars(description = "UUID of the template to delete")]
    pub template_id: Option<String>,
}

pub fn list_email_templates(store: &dyn Store, req: ListTemplatesRequest) -> Result<Value, OpError> {
    let category = parse_category(req.category.as_deref())?;
    let templates = store.list_templates(category)?;
    let (templates, total) = ops::paginate(templates, req.limit, req.page);
    let count = templates.len();
    Ok(json!({ "templates": templates, "count": count, "total": total }))
}

pub fn get_email_template(store: &dyn Store, req: GetTemplateRequest) -> Result<Value, OpError> {
    let id = ops::require_id(req.template_id, "templateId", "Template")?;
    let template = store.get_template(id)?.ok_or(OpError::NotFound("Template"))?;
    Ok(json!({ "template": template }))
}

pub fn create_email_template(
    store: &dyn Store,
    req: CreateTemplateRequest,
) -> Result<Value, OpError> {
    let name = ops::require(req.name, "name")?;
    let subject = ops::require(req.subject, "subject")?;
    let body = ops::require(req.body, "body")?;
    let category = parse_category(req.category.as_deref())?.unwrap_or(TemplateCategory::Custom);

    let template = store.create_template(CreateTemplateInput {
        name,
        subject,
        body,
        category,
        variables: req.variables.unwrap_or_default(),
    })?;

    Ok(json!({ "template": template }))
}

pub fn update_email_template(
    store: &dyn Store,
    req: UpdateTemplateRequest,
) -> Result<Value, OpError> {
    let id = ops::require_id(req.template_id, "templateId", "Template")?;
    let patch = UpdateTemplateInput {
        name: req.name,
        subject: req.subject,
        body: req.body,
        category: parse_category(req.category.as_deref())?,
        variables: req.variables,
    };
    let template = store
        .update_template(id, patch)?
        .ok_or(OpError::NotFound("Template"))?;
    Ok(json!({ "template": template }))
}

pub fn delete_email_template(
    store: &dyn Store,
    req: DeleteTemplateRequest,
) -> Result<Value, OpError> {
    let id = ops::require_id(req.template_id, "templateId", "Template")?;
    if !store.delete_template(id)? {
        return Err(OpError::NotFound("Template"));
    }
    Ok(json!({ "message": "Template deleted" }))
}

static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();

fn placeholder_re() -> &'static Regex {
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{\{(\w+)\}\}").expect("valid placeholder regex"))
}

/// Replaces every `{{identifier}}` with its value from the variable map in
/// a single pass, case-sensitively. Placeholders with no matching variable
/// stay literal; substituted values are never re-scanned.
pub fn interpolate(text: &str, variables: &HashMap<String, String>) -> String {
    placeholder_re()
        .replace_all(text, |caps: &regex::Captures<'_>| {
            match variables.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn parse_category(value: Option<&str>) -> Result<Option<TemplateCategory>, OpError> {
    value
        .map(|c| {
            TemplateCategory::from_str(c)
                .ok_or_else(|| OpError::InvalidArgument(format!("Invalid category: {c}")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn substitutes_known_placeholders() {
        let out = interpolate(
            "Hi {{name}}, greetings from {{company}}",
            &vars(&[("name", "Ada"), ("company", "Acme")]),
        );
        assert_eq!(out, "Hi Ada, greetings from Acme");
    }

    #[test]
    fn unknown_placeholders_stay_literal() {
        let out = interpolate("Your goal: {{goal}}", &vars(&[("name", "Ada")]));
        assert_eq!(out, "Your goal: {{goal}}");
    }

    #[test]
    fn matching_is_case_sensitive() {
        let out = interpolate("{{Name}} vs {{name}}", &vars(&[("name", "Ada")]));
        assert_eq!(out, "{{Name}} vs Ada");
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let out = interpolate(
            "{{outer}}",
            &vars(&[("outer", "{{inner}}"), ("inner", "nope")]),
        );
        assert_eq!(out, "{{inner}}");
    }
}
