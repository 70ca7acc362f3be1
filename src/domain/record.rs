//! Function records as they appear in the static-analysis result.
//!
//! The analysis file is a flat JSON array. Only entries tagged `"type": "func"`
//! with a non-empty string `id` become [`FunctionRecord`]s; everything else is
//! skipped without surfacing an error.

use serde::Deserialize;
use serde_json::Value;

/// Record kind that marks an entry as a function.
pub const FUNCTION_KIND: &str = "func";

/// Where a function is defined in the analysed sources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: Option<String>,
    pub line: Option<u32>,
}

/// One analysed function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionRecord {
    pub id: String,
    pub name: Option<String>,
    pub location: SourceLocation,
    /// Callee ids as listed in the input, unfiltered. May name unknown ids or `id` itself.
    pub calls: Vec<String>,
}

impl FunctionRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            location: SourceLocation::default(),
            calls: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_calls<I, S>(mut self, calls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.calls = calls.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_location(mut self, file: impl Into<String>, line: Option<u32>) -> Self {
        self.location = SourceLocation {
            file: Some(file.into()),
            line,
        };
        self
    }

    /// Name if present and non-empty, otherwise the id.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.id,
        }
    }

    /// Interpret one raw analysis entry. Returns `None` for anything that is not
    /// a function record with a usable id.
    pub fn from_entry(entry: Value) -> Option<Self> {
        let raw: RawEntry = serde_json::from_value(entry).ok()?;
        if raw.kind.as_deref() != Some(FUNCTION_KIND) {
            return None;
        }
        let id = match raw.id {
            Value::String(id) if !id.is_empty() => id,
            _ => return None,
        };

        let calls = match raw.calls {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(callee) if !callee.is_empty() => Some(callee),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };

        Some(Self {
            id,
            name: non_empty_string(raw.name),
            location: SourceLocation {
                file: non_empty_string(raw.file),
                line: parse_line(&raw.line),
            },
            calls,
        })
    }
}

/// Lenient view of an analysis entry; every field tolerates a wrong JSON type.
#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    id: Value,
    #[serde(default)]
    name: Value,
    #[serde(default, alias = "path")]
    file: Value,
    #[serde(default, alias = "start_line")]
    line: Value,
    #[serde(default)]
    calls: Value,
}

fn non_empty_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    }
}

fn parse_line(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_function_entry_parsed() {
        let entry = json!({
            "type": "func",
            "id": "func_001",
            "name": "open_session",
            "file": "src/session.c",
            "line": 42,
            "calls": ["func_002", 7, "", "func_003"]
        });
        let record = FunctionRecord::from_entry(entry).unwrap();
        assert_eq!(record.id, "func_001");
        assert_eq!(record.name.as_deref(), Some("open_session"));
        assert_eq!(record.location.file.as_deref(), Some("src/session.c"));
        assert_eq!(record.location.line, Some(42));
        assert_eq!(record.calls, vec!["func_002", "func_003"]);
    }

    #[test]
    fn test_non_function_entries_skipped() {
        assert!(FunctionRecord::from_entry(json!({"type": "var", "id": "v1"})).is_none());
        assert!(FunctionRecord::from_entry(json!({"id": "f1"})).is_none());
        assert!(FunctionRecord::from_entry(json!("func_001")).is_none());
    }

    #[test]
    fn test_missing_or_empty_id_skipped() {
        assert!(FunctionRecord::from_entry(json!({"type": "func"})).is_none());
        assert!(FunctionRecord::from_entry(json!({"type": "func", "id": ""})).is_none());
        assert!(FunctionRecord::from_entry(json!({"type": "func", "id": 12})).is_none());
    }

    #[test]
    fn test_lenient_optional_fields() {
        let entry = json!({
            "type": "func",
            "id": "f1",
            "path": "a.c",
            "start_line": "17",
            "calls": "not-a-list"
        });
        let record = FunctionRecord::from_entry(entry).unwrap();
        assert_eq!(record.location.file.as_deref(), Some("a.c"));
        assert_eq!(record.location.line, Some(17));
        assert!(record.calls.is_empty());
        assert_eq!(record.display_name(), "f1");
    }
}
