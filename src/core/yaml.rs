use serde::Deserialize;
use serde_json::Value;
use serde_yaml_ng::Value as YamlValue;

/// Parse YAML text and convert it to a JSON value for schema validation.
///
/// Only the first document of a multi-document stream is used. Merge keys
/// (`<<: *anchor`) are applied and local tags such as `!Ref` are dropped,
/// leaving the tagged node's plain value.
pub fn parse_yaml(content: &str) -> Result<Value, String> {
    let mut yaml_value = match serde_yaml_ng::Deserializer::from_str(content).next() {
        Some(document) => YamlValue::deserialize(document).map_err(|e| e.to_string())?,
        None => YamlValue::Null,
    };
    yaml_value = untag(yaml_value);
    yaml_value
        .apply_merge()
        .map_err(|e| format!("merge key error: {e}"))?;

    serde_json::to_value(yaml_value).map_err(|e| format!("YAML to JSON conversion error: {e}"))
}

fn untag(value: YamlValue) -> YamlValue {
    match value {
        YamlValue::Tagged(tagged) => untag(tagged.value),
        YamlValue::Sequence(items) => YamlValue::Sequence(items.into_iter().map(untag).collect()),
        YamlValue::Mapping(map) => YamlValue::Mapping(
            map.into_iter()
                .map(|(k, v)| (untag(k), untag(v)))
                .collect(),
        ),
        other => other,
    }
}
