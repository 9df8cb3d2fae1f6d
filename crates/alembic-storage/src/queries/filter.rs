//! Translate a [`SearchFilter`] into SQL predicates over `artifacts a`.

use rusqlite::types::Value;

use alembic_core::models::SearchFilter;

use super::format_ts;

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// `(" WHERE ...", params)`, or an empty clause when the filter matches everything.
/// `extra` predicates are ANDed in front of the filter's own.
pub(crate) fn where_clause(filter: &SearchFilter, extra: &[&str]) -> (String, Vec<Value>) {
    let mut clauses: Vec<String> = extra.iter().map(|c| c.to_string()).collect();
    let mut params = Vec::new();

    if !filter.phases.is_empty() {
        clauses.push(format!("a.phase IN ({})", placeholders(filter.phases.len())));
        params.extend(
            filter
                .phases
                .iter()
                .map(|p| Value::Text(p.as_str().to_string())),
        );
    }
    if !filter.providers.is_empty() {
        clauses.push(format!(
            "a.provider IN ({})",
            placeholders(filter.providers.len())
        ));
        params.extend(filter.providers.iter().cloned().map(Value::Text));
    }
    for tag in &filter.tags {
        clauses.push("EXISTS (SELECT 1 FROM json_each(a.tags) t WHERE t.value = ?)".to_string());
        params.push(Value::Text(tag.clone()));
    }
    if let Some(after) = &filter.created_after {
        clauses.push("a.created_at > ?".to_string());
        params.push(Value::Text(format_ts(after)));
    }
    if let Some(before) = &filter.created_before {
        clauses.push("a.created_at < ?".to_string());
        params.push(Value::Text(format_ts(before)));
    }
    if !filter.exclude_ids.is_empty() {
        clauses.push(format!(
            "a.id NOT IN ({})",
            placeholders(filter.exclude_ids.len())
        ));
        params.extend(filter.exclude_ids.iter().cloned().map(Value::Text));
    }

    if clauses.is_empty() {
        (String::new(), params)
    } else {
        (format!(" WHERE {}", clauses.join(" AND ")), params)
    }
}
