//! JSON Schema rewriting for MCP clients.
//!
//! schemars emits draft 2020-12. Several MCP clients only understand
//! draft-07 tool schemas, so every input schema is rewritten:
//! - `$defs` → `definitions`, with `$ref`s updated
//! - `anyOf: [X, {"type": "null"}]` → `X`
//! - root `$schema` and `title` dropped (the tool carries its own name)
//! - root `type: object` and `properties` always present

use serde_json::{Map, Value};

/// Rewrites schemars output into tool input schemas.
pub struct SchemaTransformer;

impl SchemaTransformer {
    /// Rewrite a schema and return the root object.
    pub fn transform(schema: Value) -> Map<String, Value> {
        let mut root = match schema {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        root.remove("$schema");
        root.remove("title");
        if let Some(defs) = root.remove("$defs") {
            root.insert("definitions".to_string(), defs);
        }

        Self::rewrite(&mut root);

        root.insert("type".to_string(), Value::String("object".to_string()));
        root.entry("properties")
            .or_insert_with(|| Value::Object(Map::new()));
        root
    }

    fn rewrite(obj: &mut Map<String, Value>) {
        if let Some(Value::Array(any_of)) = obj.get("anyOf") {
            if let Some(Value::Object(inner)) = Self::non_null_variant(any_of) {
                obj.remove("anyOf");
                for (k, v) in inner {
                    obj.entry(k).or_insert(v);
                }
            }
        }

        if let Some(Value::String(reference)) = obj.get_mut("$ref") {
            if let Some(name) = reference.strip_prefix("#/$defs/") {
                *reference = format!("#/definitions/{name}");
            }
        }

        for value in obj.values_mut() {
            Self::rewrite_value(value);
        }
    }

    fn rewrite_value(value: &mut Value) {
        match value {
            Value::Object(nested) => Self::rewrite(nested),
            Value::Array(items) => items.iter_mut().for_each(Self::rewrite_value),
            _ => {}
        }
    }

    /// The non-null member of a two-member nullable `anyOf`.
    fn non_null_variant(any_of: &[Value]) -> Option<Value> {
        let [a, b] = any_of else {
            return None;
        };
        match (Self::is_bare_null(a), Self::is_bare_null(b)) {
            (false, true) => Some(a.clone()),
            (true, false) => Some(b.clone()),
            _ => None,
        }
    }

    fn is_bare_null(schema: &Value) -> bool {
        schema
            .as_object()
            .is_some_and(|o| o.len() == 1 && o.get("type") == Some(&Value::from("null")))
    }
}
