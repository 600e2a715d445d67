//! See [`ToolCall`].

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A tool invocation the backend performed on behalf of the assistant.
///
/// Tool calls are informational only. The client never re-invokes them, it
/// merely shows which tools contributed to an assistant turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolCall {
    /// Name of the tool that was called.
    pub name: String,

    /// Arguments the tool was called with.
    pub arguments: Value,
}

impl ToolCall {
    /// Creates a new tool call record.
    #[must_use]
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    /// A single-line summary of the call, e.g. `calculate(expression: "2+2")`.
    #[must_use]
    pub fn summary(&self) -> String {
        let arguments = match &self.arguments {
            Value::Null => String::new(),
            Value::Object(map) => map
                .iter()
                .map(|(key, value)| format!("{key}: {value}"))
                .collect::<Vec<_>>()
                .join(", "),
            other => other.to_string(),
        };

        format!("{}({arguments})", self.name)
    }
}

impl fmt::Display for ToolCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

impl<'de> Deserialize<'de> for ToolCall {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Helper {
            name: String,
            #[serde(default)]
            arguments: Value,
        }

        let Helper { name, arguments } = Helper::deserialize(deserializer)?;

        // Function-calling APIs hand arguments over as a JSON-encoded string.
        // Backends that forward them verbatim are decoded here, anything that
        // does not parse stays a plain string.
        let arguments = match arguments {
            Value::String(raw) => serde_json::from_str::<Value>(&raw)
                .ok()
                .filter(Value::is_object)
                .unwrap_or(Value::String(raw)),
            other => other,
        };

        Ok(Self { name, arguments })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use test_log::test;

    use super::*;

    #[test]
    fn test_summary() {
        let cases = vec![
            (
                "object",
                ToolCall::new("calculate", json!({ "expression": "2+2" })),
                r#"calculate(expression: "2+2")"#,
            ),
            (
                "multiple",
                ToolCall::new("integrate", json!({ "expression": "sin(x)", "variable": "x" })),
                r#"integrate(expression: "sin(x)", variable: "x")"#,
            ),
            ("null", ToolCall::new("ping", Value::Null), "ping()"),
            ("scalar", ToolCall::new("echo", json!("hi")), r#"echo("hi")"#),
        ];

        for (name, call, expected) in cases {
            assert_eq!(call.summary(), expected, "failed case: {name}");
        }
    }

    #[test]
    fn test_deserialize_object_arguments() {
        let call: ToolCall =
            serde_json::from_value(json!({ "name": "calculate", "arguments": { "expression": "2+2" } }))
                .unwrap();

        assert_eq!(call, ToolCall::new("calculate", json!({ "expression": "2+2" })));
    }

    #[test]
    fn test_deserialize_string_encoded_arguments() {
        let call: ToolCall = serde_json::from_value(
            json!({ "name": "solve_equation", "arguments": "{\"equation\":\"x^2 = 4\"}" }),
        )
        .unwrap();

        assert_eq!(call.arguments, json!({ "equation": "x^2 = 4" }));
    }

    #[test]
    fn test_deserialize_plain_string_arguments() {
        let call: ToolCall =
            serde_json::from_value(json!({ "name": "echo", "arguments": "not json" })).unwrap();

        assert_eq!(call.arguments, json!("not json"));
    }

    #[test]
    fn test_deserialize_missing_arguments() {
        let call: ToolCall = serde_json::from_value(json!({ "name": "ping" })).unwrap();

        assert_eq!(call.arguments, Value::Null);
    }
}
