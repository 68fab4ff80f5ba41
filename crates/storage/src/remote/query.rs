//! Query-string builder for the hosted table API.

use std::fmt::Display;

/// A read against one table: column selection, equality filters, ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableQuery {
    table: &'static str,
    params: Vec<(String, String)>,
}

impl TableQuery {
    #[must_use]
    pub fn from(table: &'static str) -> Self {
        Self {
            table,
            params: Vec::new(),
        }
    }

    /// Columns to return. Embedded joins use `alias:fk(col, ...)` syntax.
    #[must_use]
    pub fn select(mut self, columns: &str) -> Self {
        let compact: String = columns.split_whitespace().collect();
        self.params.push(("select".to_string(), compact));
        self
    }

    #[must_use]
    pub fn eq(mut self, column: &str, value: impl Display) -> Self {
        self.params.push((column.to_string(), format!("eq.{value}")));
        self
    }

    #[must_use]
    pub fn order_desc(mut self, column: &str) -> Self {
        self.params.push(("order".to_string(), format!("{column}.desc")));
        self
    }

    #[must_use]
    pub fn table(&self) -> &'static str {
        self.table
    }

    /// Path relative to the backend base URL.
    #[must_use]
    pub fn path(&self) -> String {
        table_path(self.table)
    }

    #[must_use]
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}

#[must_use]
pub fn table_path(table: &str) -> String {
    format!("rest/v1/{table}")
}

/// Total row count from a `Content-Range` header such as `0-24/3573` or `*/0`.
///
/// Returns `None` when the total is unknown (`0-24/*`) or the header is malformed.
#[must_use]
pub fn parse_content_range_total(header: &str) -> Option<u32> {
    let (_, total) = header.trim().rsplit_once('/')?;
    total.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_filters_in_call_order() {
        let query = TableQuery::from("user_progress")
            .select("id")
            .eq("user_id", "u1")
            .eq("course_id", "c1");

        assert_eq!(query.path(), "rest/v1/user_progress");
        assert_eq!(
            query.params(),
            [
                ("select".to_string(), "id".to_string()),
                ("user_id".to_string(), "eq.u1".to_string()),
                ("course_id".to_string(), "eq.c1".to_string()),
            ]
        );
    }

    #[test]
    fn select_strips_whitespace_from_embedded_joins() {
        let query = TableQuery::from("user_progress")
            .select(
                "id, completed_at,
                 courses:course_id ( id, title )",
            )
            .order_desc("completed_at");

        assert_eq!(
            query.params()[0].1,
            "id,completed_at,courses:course_id(id,title)"
        );
        assert_eq!(query.params()[1], ("order".into(), "completed_at.desc".into()));
    }

    #[test]
    fn parses_content_range_totals() {
        assert_eq!(parse_content_range_total("0-24/3573"), Some(3573));
        assert_eq!(parse_content_range_total("*/0"), Some(0));
        assert_eq!(parse_content_range_total("0-24/*"), None);
        assert_eq!(parse_content_range_total("garbage"), None);
    }
}
