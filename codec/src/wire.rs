//! Values as they cross the boundary with a data store driver.

use std::fmt;

use serde::Serialize;

/// JSON text as produced by a codec and stored by a driver.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct WireText(String);

impl WireText {
    /// Wrap text without checking it. Codecs are the only producers that
    /// guarantee the text is valid JSON.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for WireText {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for WireText {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

impl AsRef<str> for WireText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WireText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Column or parameter type a codec is registered against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WireType {
    /// A text/varchar column holding JSON.
    Text,
    /// A store-native JSON column.
    Json,
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireType::Text => f.write_str("text"),
            WireType::Json => f.write_str("json"),
        }
    }
}

/// A bound parameter or a retrieved cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WireValue {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Json(WireText),
}

impl WireValue {
    /// Wrap encoded text according to the wire type it targets.
    pub fn from_wire_text(text: WireText, wire: WireType) -> Self {
        match wire {
            WireType::Text => WireValue::Text(text.into_string()),
            WireType::Json => WireValue::Json(text),
        }
    }

    /// The textual content of `Text` and `Json` values.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            WireValue::Text(s) => Some(s),
            WireValue::Json(json) => Some(json.as_str()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            WireValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            WireValue::Int(i) => Some(*i as f64),
            WireValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            WireValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, WireValue::Null)
    }

    /// Type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            WireValue::Null => "null",
            WireValue::Int(_) => "int",
            WireValue::Float(_) => "float",
            WireValue::Bool(_) => "bool",
            WireValue::Text(_) => "text",
            WireValue::Json(_) => "json",
        }
    }
}

impl From<i64> for WireValue {
    fn from(value: i64) -> Self {
        WireValue::Int(value)
    }
}

impl From<i32> for WireValue {
    fn from(value: i32) -> Self {
        WireValue::Int(i64::from(value))
    }
}

impl From<f64> for WireValue {
    fn from(value: f64) -> Self {
        WireValue::Float(value)
    }
}

impl From<bool> for WireValue {
    fn from(value: bool) -> Self {
        WireValue::Bool(value)
    }
}

impl From<&str> for WireValue {
    fn from(value: &str) -> Self {
        WireValue::Text(value.to_string())
    }
}

impl From<String> for WireValue {
    fn from(value: String) -> Self {
        WireValue::Text(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_from_wire_text_follows_wire_type() {
        let text = WireText::new("{\"a\":1}");
        assert_eq!(
            WireValue::from_wire_text(text.clone(), WireType::Text),
            WireValue::Text("{\"a\":1}".to_string())
        );
        assert_eq!(
            WireValue::from_wire_text(text.clone(), WireType::Json),
            WireValue::Json(text)
        );
    }

    #[rstest]
    #[case(WireValue::Text("x".into()), Some("x"))]
    #[case(WireValue::Json(WireText::new("[]")), Some("[]"))]
    #[case(WireValue::Int(1), None)]
    #[case(WireValue::Null, None)]
    fn test_as_text(#[case] value: WireValue, #[case] expected: Option<&str>) {
        assert_eq!(value.as_text(), expected);
    }

    #[rstest]
    fn test_as_f64_widens_ints() {
        assert_eq!(WireValue::Int(3).as_f64(), Some(3.0));
        assert_eq!(WireValue::Float(2.5).as_f64(), Some(2.5));
        assert_eq!(WireValue::Text("3".into()).as_f64(), None);
    }

    #[rstest]
    fn test_type_name() {
        assert_eq!(WireValue::Null.type_name(), "null");
        assert_eq!(WireValue::Bool(true).type_name(), "bool");
        assert_eq!(WireValue::Json(WireText::new("{}")).type_name(), "json");
    }

    #[rstest]
    fn test_serializes_untagged() {
        let values = vec![
            WireValue::Int(1),
            WireValue::Text("a".into()),
            WireValue::Null,
            WireValue::Json(WireText::new("{}")),
        ];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"[1,"a",null,"{}"]"#);
    }

    #[rstest]
    fn test_wire_type_display() {
        assert_eq!(WireType::Text.to_string(), "text");
        assert_eq!(WireType::Json.to_string(), "json");
    }
}
