use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Types that can be requested from a model as tool-call arguments.
///
/// Automatically implemented for any `JsonSchema + DeserializeOwned` type.
pub trait StructuredOutput: JsonSchema + DeserializeOwned {
    /// JSON schema for the tool's `parameters`, with every `$ref` inlined.
    ///
    /// Function parameters must be self-contained, so `definitions`, `$schema`
    /// and the root `title` are dropped after inlining.
    fn tool_schema() -> Value {
        let schema = schema_for!(Self);
        let mut value = serde_json::to_value(schema).unwrap_or_default();

        let definitions = value.get("definitions").cloned().unwrap_or(Value::Null);
        inline_refs(&mut value, &definitions);

        if let Value::Object(map) = &mut value {
            map.remove("definitions");
            map.remove("$schema");
            map.remove("title");
        }

        value
    }
}

impl<T: JsonSchema + DeserializeOwned> StructuredOutput for T {}

fn inline_refs(value: &mut Value, definitions: &Value) {
    match value {
        Value::Object(map) => {
            let target = map
                .get("$ref")
                .and_then(Value::as_str)
                .and_then(|path| path.strip_prefix("#/definitions/"))
                .and_then(|name| definitions.get(name))
                .cloned();
            if let Some(def) = target {
                *value = def;
                inline_refs(value, definitions);
                return;
            }

            // schemars wraps documented refs as a single-element allOf
            let single_all_of = match map.get("allOf") {
                Some(Value::Array(items)) if items.len() == 1 => Some(items[0].clone()),
                _ => None,
            };
            if let Some(inner) = single_all_of {
                map.remove("allOf");
                if let Value::Object(inner_map) = inner {
                    for (k, v) in inner_map {
                        map.entry(k).or_insert(v);
                    }
                }
                inline_refs(value, definitions);
                return;
            }

            for (_, v) in map.iter_mut() {
                inline_refs(v, definitions);
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                inline_refs(item, definitions);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, JsonSchema)]
    enum Weight {
        #[serde(rename = "1 - Light")]
        Light,
        #[serde(rename = "5 - Heavy")]
        Heavy,
    }

    #[derive(Deserialize, JsonSchema)]
    #[allow(dead_code)]
    struct Extracted {
        description: Option<String>,
        #[schemars(with = "Option<Weight>")]
        weight: Option<String>,
        tags: Vec<String>,
    }

    #[test]
    fn tool_schema_is_self_contained() {
        let schema = Extracted::tool_schema();
        let obj = schema.as_object().unwrap();

        assert!(!obj.contains_key("definitions"));
        assert!(!obj.contains_key("$schema"));
        assert!(!serde_json::to_string(&schema).unwrap().contains("$ref"));
        assert_eq!(obj.get("type"), Some(&Value::String("object".into())));
    }

    #[test]
    fn enum_labels_are_inlined_into_properties() {
        let schema = Extracted::tool_schema();
        let weight = serde_json::to_string(&schema["properties"]["weight"]).unwrap();
        assert!(weight.contains("1 - Light"));
        assert!(weight.contains("5 - Heavy"));
    }

    #[test]
    fn string_field_with_enum_schema_still_accepts_any_string() {
        let parsed: Extracted = serde_json::from_value(serde_json::json!({
            "description": null,
            "weight": "extremely heavy",
            "tags": []
        }))
        .unwrap();
        assert_eq!(parsed.weight.as_deref(), Some("extremely heavy"));
    }
}
