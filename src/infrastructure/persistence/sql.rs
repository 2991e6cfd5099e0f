//! SQL composition for refined list queries.
//!
//! Translates a validated [`ListQuery`] into WHERE / ORDER BY / LIMIT /
//! OFFSET clauses on a [`sqlx::QueryBuilder`]. Column SQL comes from the
//! entity's static schema and filter values are bound parameters, so no
//! client-controlled text ever reaches the SQL string.

use sqlx::{Postgres, QueryBuilder};

use crate::domain::query::{FilterValue, ListQuery};

/// Appends `AND <column> <op> <bound value>` for every filter clause.
///
/// The base query must already carry a WHERE clause to chain onto;
/// repositories anchor one (e.g. `WHERE secret_tour = FALSE`).
pub fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &ListQuery) {
    for filter in &query.filters {
        qb.push(" AND ");
        qb.push(filter.column.sql);
        qb.push(" ");
        qb.push(filter.op.sql());
        qb.push(" ");
        match &filter.value {
            FilterValue::BigInt(v) => qb.push_bind(*v),
            FilterValue::Integer(v) => qb.push_bind(*v),
            FilterValue::Float(v) => qb.push_bind(*v),
            FilterValue::Bool(v) => qb.push_bind(*v),
            FilterValue::Text(v) => qb.push_bind(v.clone()),
            FilterValue::Timestamp(v) => qb.push_bind(*v),
        };
    }
}

/// Appends ORDER BY, LIMIT, and OFFSET. Sorting always precedes skipping
/// and limiting.
pub fn push_order_and_page(qb: &mut QueryBuilder<'_, Postgres>, query: &ListQuery) {
    if !query.sort.is_empty() {
        qb.push(" ORDER BY ");
        for (i, clause) in query.sort.iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            qb.push(clause.column.sql);
            qb.push(if clause.descending { " DESC" } else { " ASC" });
        }
    }

    qb.push(" LIMIT ");
    qb.push_bind(i64::from(query.limit));
    qb.push(" OFFSET ");
    qb.push_bind(query.offset());
}
