//! Declared config fields and type checking

use serde_json::{Map, Value};

use super::path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    Bool,
    Integer,
    Float,
    Object,
    Array,
}

impl ValueKind {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ValueKind::String => value.is_string(),
            ValueKind::Bool => value.is_boolean(),
            ValueKind::Integer => value.is_i64() || value.is_u64(),
            // Whole numbers are accepted where a float is declared
            ValueKind::Float => value.is_number(),
            ValueKind::Object => value.is_object(),
            ValueKind::Array => value.is_array(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Bool => "bool",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::Object => "object",
            ValueKind::Array => "array",
        }
    }
}

/// One declared config key.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub key: &'static str,
    pub kind: ValueKind,
    pub nullable: bool,
    pub default: Value,
    pub description: &'static str,
}

impl FieldSpec {
    pub fn accepts(&self, value: &Value) -> bool {
        (self.nullable && value.is_null()) || self.kind.matches(value)
    }
}

/// Ordered set of declared fields.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<FieldSpec>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(
        mut self,
        key: &'static str,
        kind: ValueKind,
        default: impl Into<Value>,
        description: &'static str,
    ) -> Self {
        self.fields.push(FieldSpec {
            key,
            kind,
            nullable: false,
            default: default.into(),
            description,
        });
        self
    }

    /// Declare a field that may also hold `null` (its default).
    pub fn nullable_field(
        mut self,
        key: &'static str,
        kind: ValueKind,
        description: &'static str,
    ) -> Self {
        self.fields.push(FieldSpec {
            key,
            kind,
            nullable: true,
            default: Value::Null,
            description,
        });
        self
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Nested document holding every field's default.
    pub fn default_document(&self) -> Map<String, Value> {
        let mut doc = Map::new();
        self.fill_missing(&mut doc);
        doc
    }

    /// Insert defaults for declared keys absent from `doc`. Returns the keys filled.
    ///
    /// Keys whose parent segment holds a non-object are left alone so that
    /// validation reports them.
    pub fn fill_missing(&self, doc: &mut Map<String, Value>) -> Vec<&'static str> {
        let mut filled = Vec::new();
        for field in &self.fields {
            if path::lookup(doc, field.key).is_none()
                && path::insert(doc, field.key, field.default.clone()).is_ok()
            {
                filled.push(field.key);
            }
        }
        filled
    }

    /// Check every declared key and describe each offending one.
    pub fn validate(&self, doc: &Map<String, Value>) -> Vec<String> {
        let mut errors = Vec::new();
        for field in &self.fields {
            match path::lookup(doc, field.key) {
                None => errors.push(format!(
                    "config key '{}' is missing, expected {}",
                    field.key,
                    field.kind.name()
                )),
                Some(value) if !field.accepts(value) => errors.push(format!(
                    "config key '{}' has wrong type, expected {}",
                    field.key,
                    field.kind.name()
                )),
                Some(_) => {}
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new()
            .field("database.host", ValueKind::String, "localhost", "Host")
            .field("database.port", ValueKind::Integer, 3306, "Port")
            .field("debug", ValueKind::Bool, false, "Debug output")
            .nullable_field("ref.installed_version", ValueKind::Integer, "Installed build")
    }

    #[test]
    fn test_default_document_is_nested() {
        let doc = schema().default_document();
        assert_eq!(
            Value::Object(doc),
            json!({
                "database": {"host": "localhost", "port": 3306},
                "debug": false,
                "ref": {"installed_version": null}
            })
        );
    }

    #[test]
    fn test_validate_lists_every_offending_key() {
        let doc = json!({
            "database": {"host": 1, "port": "3306"},
            "debug": false,
            "ref": {"installed_version": 1090}
        });
        let errors = schema().validate(doc.as_object().unwrap());
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("database.host"));
        assert!(errors[1].contains("database.port"));
    }

    #[test]
    fn test_nullable_accepts_null_only_when_declared() {
        let schema = schema();
        let doc = json!({
            "database": {"host": null, "port": 1},
            "debug": true,
            "ref": {"installed_version": null}
        });
        let errors = schema.validate(doc.as_object().unwrap());
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("database.host"));
    }

    #[test]
    fn test_fill_missing_keeps_existing_values() {
        let mut doc = json!({"database": {"port": 5432}}).as_object().unwrap().clone();
        let filled = schema().fill_missing(&mut doc);
        assert_eq!(filled, vec!["database.host", "debug", "ref.installed_version"]);
        assert_eq!(doc["database"]["port"], json!(5432));
    }

    #[test]
    fn test_fill_missing_skips_blocked_paths() {
        let mut doc = json!({"database": "oops"}).as_object().unwrap().clone();
        let filled = schema().fill_missing(&mut doc);
        assert!(!filled.contains(&"database.host"));
        assert_eq!(schema().validate(&doc).len(), 2);
    }
}
