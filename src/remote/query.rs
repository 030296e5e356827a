//! Select Queries
//!
//! A small description of a read against one collection, and its encoding
//! as PostgREST query parameters.

use serde_json::Value;

/// A row filter
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `column = value`
    Eq { column: String, value: Value },
    /// `column IN (values)`
    In { column: String, values: Vec<Value> },
}

impl Filter {
    pub fn column(&self) -> &str {
        match self {
            Filter::Eq { column, .. } | Filter::In { column, .. } => column,
        }
    }

    /// Whether a row passes this filter
    pub fn matches(&self, row: &Value) -> bool {
        let Some(field) = row.get(self.column()) else {
            return false;
        };
        match self {
            Filter::Eq { value, .. } => same_value(field, value),
            Filter::In { values, .. } => values.iter().any(|v| same_value(field, v)),
        }
    }

    fn to_param(&self) -> (String, String) {
        match self {
            Filter::Eq { column, value } => (column.clone(), format!("eq.{}", plain_value(value))),
            Filter::In { column, values } => {
                let list: Vec<String> = values.iter().map(quoted_value).collect();
                (column.clone(), format!("in.({})", list.join(",")))
            }
        }
    }
}

/// Result ordering on one column
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// A read of `select *` from one collection
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    pub table: String,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
}

impl SelectQuery {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filters: Vec::new(),
            order: None,
        }
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    pub fn in_list<V: Into<Value>>(
        mut self,
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.filters.push(Filter::In {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn order(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.into(),
            ascending,
        });
        self
    }

    /// PostgREST query parameters, unencoded
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), "*".to_string())];
        params.extend(self.filters.iter().map(Filter::to_param));
        if let Some(order) = &self.order {
            let direction = if order.ascending { "asc" } else { "desc" };
            params.push(("order".to_string(), format!("{}.{}", order.column, direction)));
        }
        params
    }
}

/// Compare a stored field against a filter value, treating numbers and
/// their text form as equal (ids round-trip through HTML forms as text).
pub(crate) fn same_value(field: &Value, wanted: &Value) -> bool {
    field == wanted || plain_value(field) == plain_value(wanted)
}

fn plain_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Values inside `in.(...)` must be double-quoted when they contain
/// PostgREST reserved characters.
fn quoted_value(value: &Value) -> String {
    let raw = plain_value(value);
    let reserved = raw.is_empty()
        || raw
            .chars()
            .any(|c| matches!(c, ',' | '.' | ':' | '(' | ')' | '"' | '\\') || c.is_whitespace());
    if reserved {
        format!("\"{}\"", raw.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        raw
    }
}
