use std::fmt;

/// One labeled value in a structured log record.
#[derive(Debug, Clone, PartialEq)]
pub struct LogField {
    pub name: String,
    pub value: FieldValue,
}

impl LogField {
    pub fn str(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: FieldValue::Str(value.into()),
        }
    }

    pub fn int(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value: FieldValue::Int(value),
        }
    }

    pub fn str_list(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            value: FieldValue::StrList(values),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    Int(i64),
    StrList(Vec<String>),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Str(s) => {
                write!(f, "{}", serde_json::Value::from(s.as_str()))
            }
            FieldValue::Int(i) => write!(f, "{i}"),
            FieldValue::StrList(values) => {
                write!(f, "{}", serde_json::Value::from(values.clone()))
            }
        }
    }
}

/// Sink for structured log records: a message plus ordered fields, emitted
/// as one unit. Sinks are infallible — delivery problems are theirs to
/// handle.
pub trait LogSink: Send + Sync {
    fn emit(&self, message: &str, fields: &[LogField]);
}

/// Emits records through `tracing` at info level, fields rendered in order
/// as one `name=value` line with JSON-encoded values.
#[derive(Debug, Default, Clone)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&self, message: &str, fields: &[LogField]) {
        let rendered = fields
            .iter()
            .map(|field| format!("{}={}", field.name, field.value))
            .collect::<Vec<_>>()
            .join(" ");
        tracing::info!(target: "girder::request", fields = %rendered, "{message}");
    }
}
