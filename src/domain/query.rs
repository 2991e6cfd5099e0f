//! List query construction: filtering, sorting, field selection, pagination.
//!
//! Every list endpoint funnels its raw query-string parameters through
//! [`ListQuery::parse`], which validates them against the entity's
//! [`EntitySchema`] and produces a structured query. Comparison operators use
//! the `field[op]=value` key syntax (`?price[lt]=1000&duration[gte]=5`), so
//! operator tokens appearing inside filter values are never reinterpreted.
//!
//! SQL composition from a `ListQuery` lives in the infrastructure layer; this
//! module is storage-agnostic.

use chrono::{DateTime, Utc};
use serde_json::json;
use std::collections::HashMap;

use crate::error::AppError;

/// Query keys with reserved meaning; everything else is a filter.
const RESERVED_KEYS: &[&str] = &["page", "sort", "limit", "fields"];

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_LIMIT: u32 = 100;

/// Value type of a filterable column, used to parse raw string values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    BigInt,
    Integer,
    Float,
    Bool,
    Text,
    Timestamp,
}

/// One column an entity exposes to list queries.
#[derive(Debug)]
pub struct Column {
    /// API-facing field name.
    pub name: &'static str,
    /// SQL expression the field maps to.
    pub sql: &'static str,
    pub kind: ColumnKind,
    pub filterable: bool,
    pub sortable: bool,
}

/// Column schema an entity exposes to the query builder.
#[derive(Debug)]
pub struct EntitySchema {
    pub resource: &'static str,
    pub columns: &'static [Column],
}

impl EntitySchema {
    pub fn column(&'static self, name: &str) -> Option<&'static Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Comparison operator of a filter clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FilterOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl FilterOp {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "ne" => Some(Self::Ne),
            "gt" => Some(Self::Gt),
            "gte" => Some(Self::Gte),
            "lt" => Some(Self::Lt),
            "lte" => Some(Self::Lte),
            _ => None,
        }
    }

    pub fn sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }
}

/// A filter value parsed according to its column's kind.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    BigInt(i64),
    Integer(i32),
    Float(f64),
    Bool(bool),
    Text(String),
    Timestamp(DateTime<Utc>),
}

/// One `field op value` condition.
#[derive(Debug)]
pub struct FilterClause {
    pub column: &'static Column,
    pub op: FilterOp,
    pub value: FilterValue,
}

/// One sort key; `descending` comes from a leading `-` in the sort parameter.
#[derive(Debug)]
pub struct SortClause {
    pub column: &'static Column,
    pub descending: bool,
}

/// A fully refined list query, ready for SQL composition.
#[derive(Debug)]
pub struct ListQuery {
    pub schema: &'static EntitySchema,
    pub filters: Vec<FilterClause>,
    pub sort: Vec<SortClause>,
    /// Exact projection requested via `fields`; `None` means all public
    /// fields.
    pub fields: Option<Vec<String>>,
    pub page: u32,
    pub limit: u32,
}

impl ListQuery {
    /// Parses raw query-string parameters against an entity schema.
    ///
    /// Applies, in order: filter extraction, sort parsing (default: creation
    /// time descending with id ascending as tie-break), field selection, and
    /// pagination (`page` default 1, `limit` default 100).
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] for unknown filter/sort fields, unsupported
    ///   operators, or non-positive page/limit values
    /// - [`AppError::Cast`] for values that do not parse as the column's type
    pub fn parse(
        params: &HashMap<String, String>,
        schema: &'static EntitySchema,
    ) -> Result<Self, AppError> {
        let mut filters = Vec::new();
        for (key, value) in params {
            if RESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }
            filters.push(parse_filter(key, value, schema)?);
        }
        // HashMap iteration order is arbitrary; keep clause order stable.
        filters.sort_by_key(|f| (f.column.name, f.op));

        let sort = match params.get("sort") {
            Some(raw) if !raw.trim().is_empty() => parse_sort(raw, schema)?,
            _ => default_sort(schema),
        };

        let fields = params.get("fields").and_then(|raw| {
            let names: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(String::from)
                .collect();
            if names.is_empty() { None } else { Some(names) }
        });

        let page = parse_positive(params, "page", DEFAULT_PAGE)?;
        let limit = parse_positive(params, "limit", DEFAULT_LIMIT)?;

        Ok(Self {
            schema,
            filters,
            sort,
            fields,
            page,
            limit,
        })
    }

    /// Number of records to skip; applied before the limit.
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.limit)
    }

    /// Prepends an equality filter, used to scope a list to a parent entity
    /// (e.g. the reviews of one tour).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the schema has no such column; scope
    /// columns are wired in code, not taken from client input.
    pub fn push_scope(&mut self, name: &str, id: i64) -> Result<(), AppError> {
        let column = self.schema.column(name).ok_or_else(|| {
            AppError::internal(
                "Invalid scope column",
                json!({ "resource": self.schema.resource, "column": name }),
            )
        })?;
        self.filters.insert(
            0,
            FilterClause {
                column,
                op: FilterOp::Eq,
                value: FilterValue::BigInt(id),
            },
        );
        Ok(())
    }
}

fn parse_filter(
    key: &str,
    value: &str,
    schema: &'static EntitySchema,
) -> Result<FilterClause, AppError> {
    let (field, op) = match key.strip_suffix(']').and_then(|k| k.split_once('[')) {
        Some((field, token)) => {
            let op = FilterOp::from_token(token).ok_or_else(|| {
                AppError::bad_request(
                    format!("Unsupported filter operator `{token}`"),
                    json!({ "field": field, "operator": token }),
                )
            })?;
            (field, op)
        }
        None => (key, FilterOp::Eq),
    };

    let column = schema.column(field).filter(|c| c.filterable).ok_or_else(|| {
        AppError::bad_request(
            format!("Cannot filter by field `{field}`"),
            json!({ "resource": schema.resource, "field": field }),
        )
    })?;

    Ok(FilterClause {
        column,
        op,
        value: parse_value(column, value)?,
    })
}

fn parse_value(column: &Column, raw: &str) -> Result<FilterValue, AppError> {
    let cast_error = || {
        AppError::cast(
            format!("Invalid {}: {}", column.name, raw),
            json!({ "field": column.name, "value": raw }),
        )
    };

    Ok(match column.kind {
        ColumnKind::BigInt => FilterValue::BigInt(raw.parse().map_err(|_| cast_error())?),
        ColumnKind::Integer => FilterValue::Integer(raw.parse().map_err(|_| cast_error())?),
        ColumnKind::Float => FilterValue::Float(raw.parse().map_err(|_| cast_error())?),
        ColumnKind::Bool => match raw {
            "true" => FilterValue::Bool(true),
            "false" => FilterValue::Bool(false),
            _ => return Err(cast_error()),
        },
        ColumnKind::Text => FilterValue::Text(raw.to_string()),
        ColumnKind::Timestamp => FilterValue::Timestamp(
            DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| cast_error())?,
        ),
    })
}

fn parse_sort(raw: &str, schema: &'static EntitySchema) -> Result<Vec<SortClause>, AppError> {
    let mut sort = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (name, descending) = match part.strip_prefix('-') {
            Some(name) => (name, true),
            None => (part, false),
        };
        let column = schema.column(name).filter(|c| c.sortable).ok_or_else(|| {
            AppError::bad_request(
                format!("Cannot sort by field `{name}`"),
                json!({ "resource": schema.resource, "field": name }),
            )
        })?;
        sort.push(SortClause { column, descending });
    }
    Ok(sort)
}

/// Creation time descending with id ascending as tie-break, so pagination is
/// stable when many records share a creation timestamp.
fn default_sort(schema: &'static EntitySchema) -> Vec<SortClause> {
    let mut sort = Vec::with_capacity(2);
    if let Some(column) = schema.column("created_at") {
        sort.push(SortClause {
            column,
            descending: true,
        });
    }
    if let Some(column) = schema.column("id") {
        sort.push(SortClause {
            column,
            descending: false,
        });
    }
    sort
}

fn parse_positive(
    params: &HashMap<String, String>,
    key: &str,
    default: u32,
) -> Result<u32, AppError> {
    let Some(raw) = params.get(key) else {
        return Ok(default);
    };
    let value: u32 = raw.parse().map_err(|_| {
        AppError::cast(
            format!("Invalid {key}: {raw}"),
            json!({ "field": key, "value": raw }),
        )
    })?;
    if value == 0 {
        return Err(AppError::bad_request(
            format!("{key} must be greater than 0"),
            json!({ "field": key }),
        ));
    }
    Ok(value)
}
