use regex::Regex;
use std::sync::OnceLock;

/// Utility for parsing PostgreSQL constraint violation messages.
///
/// This parser uses regex patterns to extract structured information from
/// database constraint violation messages, with caching for performance.
pub struct ConstraintParser;

/// Compiled regex patterns for constraint parsing, cached for performance
struct RegexPatterns {
    key_value: Regex,
    column_name: Regex,
    table_name: Regex,
}

impl RegexPatterns {
    fn new() -> Self {
        Self {
            // Matches "Key (field)=(value)" in the DETAIL part of PostgreSQL errors
            key_value: Regex::new(r"Key \(([^)]+)\)=\(([^)]*)\)").expect("valid key/value regex"),
            column_name: Regex::new(r#"column "([^"]+)""#).expect("valid column regex"),
            // "table" for foreign keys, "relation" for check and not-null violations
            table_name: Regex::new(r#"(?:table|relation) "([^"]+)""#).expect("valid table regex"),
        }
    }
}

static REGEX_PATTERNS: OnceLock<RegexPatterns> = OnceLock::new();

/// Suffixes PostgreSQL appends to generated constraint names
const CONSTRAINT_SUFFIXES: [&str; 5] = ["_key", "_fkey", "_pkey", "_check", "_idx"];

/// Constraint violation context as reported by the database driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViolationInfo<'a> {
    pub message: &'a str,
    pub details: Option<&'a str>,
    pub table: Option<&'a str>,
    pub constraint: Option<&'a str>,
}

impl ConstraintParser {
    fn patterns() -> &'static RegexPatterns {
        REGEX_PATTERNS.get_or_init(RegexPatterns::new)
    }

    /// Parses a unique constraint violation.
    ///
    /// # Returns
    /// Optional tuple of (entity, field, value) if parsing succeeds
    ///
    /// # Examples
    /// ```
    /// use warehouse_rs::error::{ConstraintParser, ViolationInfo};
    ///
    /// let info = ViolationInfo {
    ///     message: "duplicate key value violates unique constraint \"users_username_key\"",
    ///     details: Some("Key (username)=(alice) already exists."),
    ///     table: Some("users"),
    ///     constraint: Some("users_username_key"),
    /// };
    /// let parsed = ConstraintParser::parse_unique_violation(&info);
    /// assert_eq!(parsed, Some(("users".to_string(), "username".to_string(), "alice".to_string())));
    /// ```
    pub fn parse_unique_violation(info: &ViolationInfo<'_>) -> Option<(String, String, String)> {
        let key_value = Self::key_value(info);

        if let Some((entity, field)) = info
            .constraint
            .and_then(|c| Self::parse_constraint_name(c, info.table))
        {
            let value = key_value
                .map(|(_, value)| value)
                .unwrap_or_else(|| "duplicate_value".to_string());
            return Some((entity, field, value));
        }

        let (field, value) = key_value?;
        let entity = Self::entity(info).unwrap_or_else(|| "resource".to_string());
        Some((entity, field, value))
    }

    /// Parses a foreign key violation into (entity, field, referenced value).
    pub fn parse_foreign_key_violation(
        info: &ViolationInfo<'_>,
    ) -> Option<(String, String, String)> {
        let key_value = Self::key_value(info);

        if let Some((entity, field)) = info
            .constraint
            .and_then(|c| Self::parse_constraint_name(c, info.table))
        {
            let value = key_value
                .map(|(_, value)| value)
                .unwrap_or_else(|| "invalid_reference".to_string());
            return Some((entity, field, value));
        }

        let (field, value) = key_value?;
        let entity = Self::entity(info).unwrap_or_else(|| "resource".to_string());
        Some((entity, field, value))
    }

    /// Parses a not-null violation into (entity, field).
    pub fn parse_not_null_violation(info: &ViolationInfo<'_>) -> Option<(String, String)> {
        let field = Self::extract_column_from_message(info.message)?;
        let entity = Self::entity(info).unwrap_or_else(|| "resource".to_string());
        Some((entity, field))
    }

    /// Parses a check violation into (entity, field).
    pub fn parse_check_violation(info: &ViolationInfo<'_>) -> Option<(String, String)> {
        if let Some(parsed) = info
            .constraint
            .and_then(|c| Self::parse_constraint_name(c, info.table))
        {
            return Some(parsed);
        }

        let field = Self::extract_column_from_message(info.message)?;
        let entity = Self::entity(info).unwrap_or_else(|| "resource".to_string());
        Some((entity, field))
    }

    /// Splits a generated constraint name into (table, column).
    ///
    /// When the owning table is known it is stripped as a prefix, so table
    /// names containing underscores resolve correctly:
    /// - ("users_username_key", None) -> ("users", "username")
    /// - ("items_part_number_key", Some("items")) -> ("items", "part_number")
    /// - ("item_images_item_id_fkey", Some("item_images")) -> ("item_images", "item_id")
    pub fn parse_constraint_name(
        constraint_name: &str,
        table: Option<&str>,
    ) -> Option<(String, String)> {
        let stem = CONSTRAINT_SUFFIXES
            .iter()
            .find_map(|suffix| constraint_name.strip_suffix(suffix))?;

        if let Some(table) = table {
            if let Some(field) = stem
                .strip_prefix(table)
                .and_then(|rest| rest.strip_prefix('_'))
                .filter(|field| !field.is_empty())
            {
                return Some((table.to_string(), field.to_string()));
            }
        }

        let (entity, field) = stem.split_once('_')?;
        if entity.is_empty() || field.is_empty() {
            return None;
        }
        Some((entity.to_string(), field.to_string()))
    }

    /// Extracts a column name from patterns like `column "field_name"`.
    pub fn extract_column_from_message(message: &str) -> Option<String> {
        Self::patterns()
            .column_name
            .captures(message)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Extracts a table name from patterns like `table "items"` or `relation "items"`.
    pub fn extract_table_from_message(message: &str) -> Option<String> {
        Self::patterns()
            .table_name
            .captures(message)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Extracts (field, value) from `Key (field)=(value)`.
    pub fn extract_key_value_from_message(message: &str) -> Option<(String, String)> {
        Self::patterns().key_value.captures(message).and_then(|caps| {
            let field = caps.get(1)?.as_str().to_string();
            let value = caps.get(2)?.as_str().to_string();
            Some((field, value))
        })
    }

    fn key_value(info: &ViolationInfo<'_>) -> Option<(String, String)> {
        info.details
            .and_then(Self::extract_key_value_from_message)
            .or_else(|| Self::extract_key_value_from_message(info.message))
    }

    fn entity(info: &ViolationInfo<'_>) -> Option<String> {
        info.table
            .map(str::to_string)
            .or_else(|| Self::extract_table_from_message(info.message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unique_violation_with_details() {
        let info = ViolationInfo {
            message: "duplicate key value violates unique constraint \"users_username_key\"",
            details: Some("Key (username)=(alice) already exists."),
            table: Some("users"),
            constraint: Some("users_username_key"),
        };
        assert_eq!(
            ConstraintParser::parse_unique_violation(&info),
            Some(("users".to_string(), "username".to_string(), "alice".to_string()))
        );
    }

    #[test]
    fn test_parse_unique_violation_without_constraint_name() {
        let info = ViolationInfo {
            message: "duplicate key value\nDETAIL: Key (username)=(bob) already exists.",
            ..Default::default()
        };
        assert_eq!(
            ConstraintParser::parse_unique_violation(&info),
            Some(("resource".to_string(), "username".to_string(), "bob".to_string()))
        );
    }

    #[test]
    fn test_parse_unique_violation_without_value() {
        let info = ViolationInfo {
            message: "duplicate key value violates unique constraint",
            constraint: Some("users_username_key"),
            ..Default::default()
        };
        assert_eq!(
            ConstraintParser::parse_unique_violation(&info),
            Some((
                "users".to_string(),
                "username".to_string(),
                "duplicate_value".to_string()
            ))
        );
    }

    #[test]
    fn test_parse_foreign_key_violation() {
        let info = ViolationInfo {
            message: "insert or update on table \"sales\" violates foreign key constraint \"sales_item_id_fkey\"",
            details: Some("Key (item_id)=(999) is not present in table \"items\"."),
            table: Some("sales"),
            constraint: Some("sales_item_id_fkey"),
        };
        assert_eq!(
            ConstraintParser::parse_foreign_key_violation(&info),
            Some(("sales".to_string(), "item_id".to_string(), "999".to_string()))
        );
    }

    #[test]
    fn test_parse_check_violation() {
        let info = ViolationInfo {
            message: "new row for relation \"items\" violates check constraint \"items_stock_check\"",
            constraint: Some("items_stock_check"),
            ..Default::default()
        };
        assert_eq!(
            ConstraintParser::parse_check_violation(&info),
            Some(("items".to_string(), "stock".to_string()))
        );
    }

    #[test]
    fn test_parse_not_null_violation_uses_relation() {
        let info = ViolationInfo {
            message: "null value in column \"brand\" of relation \"items\" violates not-null constraint",
            ..Default::default()
        };
        assert_eq!(
            ConstraintParser::parse_not_null_violation(&info),
            Some(("items".to_string(), "brand".to_string()))
        );
    }

    #[test]
    fn test_parse_constraint_name_with_known_table() {
        assert_eq!(
            ConstraintParser::parse_constraint_name(
                "item_images_item_id_fkey",
                Some("item_images")
            ),
            Some(("item_images".to_string(), "item_id".to_string()))
        );
        assert_eq!(
            ConstraintParser::parse_constraint_name("items_part_number_key", Some("items")),
            Some(("items".to_string(), "part_number".to_string()))
        );
    }

    #[test]
    fn test_parse_constraint_name_without_table() {
        assert_eq!(
            ConstraintParser::parse_constraint_name("users_username_key", None),
            Some(("users".to_string(), "username".to_string()))
        );
        assert_eq!(
            ConstraintParser::parse_constraint_name("sales_quantity_check", None),
            Some(("sales".to_string(), "quantity".to_string()))
        );
    }

    #[test]
    fn test_graceful_parsing_failures() {
        assert_eq!(ConstraintParser::parse_constraint_name("weird", None), None);
        assert_eq!(ConstraintParser::parse_constraint_name("_key", None), None);
        assert_eq!(ConstraintParser::extract_column_from_message("no column here"), None);
        assert_eq!(ConstraintParser::extract_key_value_from_message("Key without parens"), None);
        assert_eq!(
            ConstraintParser::parse_unique_violation(&ViolationInfo {
                message: "something odd",
                ..Default::default()
            }),
            None
        );
    }
}
