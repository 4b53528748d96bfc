//! Commands handed to the native driver.

use jet_sql_core::SqlValue;
use serde::{Deserialize, Serialize};

/// How the native driver interprets the command text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandType {
    /// SQL text.
    #[default]
    Text,
    /// The name of a stored query.
    StoredProcedure,
}

/// Declared type of a parameter. Passed to the native driver unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlType {
    /// Yes/No.
    Boolean,
    /// Byte.
    Byte,
    /// Integer.
    Int16,
    /// Long Integer.
    Int32,
    /// Large Number.
    Int64,
    /// Single.
    Single,
    /// Double.
    Double,
    /// Decimal with precision and scale.
    Decimal {
        /// Total digits.
        precision: u8,
        /// Digits after the decimal point.
        scale: u8,
    },
    /// Currency.
    Currency,
    /// Text with an optional maximum length.
    Text {
        /// Maximum length in characters.
        length: Option<u32>,
    },
    /// Memo.
    Memo,
    /// Date/Time.
    DateTime,
    /// OLE Object / binary.
    Binary,
    /// Replication ID.
    Guid,
}

impl SqlType {
    /// A reasonable declared type for a value whose type is not known
    /// upfront.
    #[must_use]
    pub fn for_value(value: &SqlValue) -> Self {
        match value {
            SqlValue::Bool(_) => Self::Boolean,
            SqlValue::Int(n) if i32::try_from(*n).is_ok() => Self::Int32,
            SqlValue::Int(_) => Self::Int64,
            SqlValue::Float(_) => Self::Double,
            SqlValue::Null | SqlValue::Text(_) => Self::Text { length: None },
            SqlValue::Blob(_) => Self::Binary,
        }
    }
}

/// A parameter bound to a command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundParameter {
    /// Parameter name without the `@` prefix, `p<ordinal>`.
    pub name: String,
    /// Declared type, looked up by ordinal.
    pub sql_type: SqlType,
    /// Bound value.
    pub value: SqlValue,
}

/// A command ready for the native driver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Command {
    /// How to interpret `text`.
    pub command_type: CommandType,
    /// Command text.
    pub text: String,
    /// Parameters in the order their markers appear in `text`.
    pub parameters: Vec<BoundParameter>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_for_value() {
        assert_eq!(SqlType::for_value(&SqlValue::Int(5)), SqlType::Int32);
        assert_eq!(SqlType::for_value(&SqlValue::Int(i64::MAX)), SqlType::Int64);
        assert_eq!(SqlType::for_value(&SqlValue::Bool(true)), SqlType::Boolean);
        assert_eq!(
            SqlType::for_value(&SqlValue::Null),
            SqlType::Text { length: None }
        );
    }

    #[test]
    fn test_command_serializes() {
        let command = Command {
            command_type: CommandType::Text,
            text: String::from("select @p0"),
            parameters: vec![BoundParameter {
                name: String::from("p0"),
                sql_type: SqlType::Int32,
                value: SqlValue::Int(1),
            }],
        };
        let json = serde_json::to_value(&command).unwrap();
        assert_eq!(json["command_type"], "text");
        assert_eq!(json["parameters"][0]["sql_type"], "int32");
        assert_eq!(json["parameters"][0]["value"], 1);
    }
}
