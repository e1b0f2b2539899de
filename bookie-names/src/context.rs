//! Parameter binding: the resolved placeholder values of one template.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use bookie_core::{AttributeBag, NameTemplate, ValidationError};

use crate::engine::{segments, Segment};

/// Stringified value of every placeholder a template references.
///
/// Built once per resolution from the object's attributes; a template whose
/// binding cannot be built produces no names at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParameterBinding {
    values: BTreeMap<String, String>,
}

impl ParameterBinding {
    /// Bind every placeholder of every language in `template`.
    ///
    /// Fails with `TemplateParameterMissing` on the first placeholder (in
    /// language order) whose attribute path is absent or not a scalar.
    pub fn bind(
        template: &NameTemplate,
        attributes: &AttributeBag,
    ) -> Result<Self, ValidationError> {
        let mut values = BTreeMap::new();
        for (language, pattern) in &template.patterns {
            for segment in segments(pattern) {
                let Segment::Placeholder(name) = segment else {
                    continue;
                };
                if values.contains_key(name) {
                    continue;
                }
                let path = template.attribute_path(name);
                let value = attributes
                    .lookup(path)
                    .and_then(stringify)
                    .ok_or_else(|| ValidationError::TemplateParameterMissing {
                        parameter: name.to_string(),
                        language: language.clone(),
                    })?;
                values.insert(name.to_string(), value);
            }
        }
        Ok(Self { values })
    }

    pub fn get(&self, placeholder: &str) -> Option<&str> {
        self.values.get(placeholder).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Scalars only; objects, arrays and null cannot stand in for text.
fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
