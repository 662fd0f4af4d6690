//! Parameter name deduplication
//!
//! A query that binds the same column more than once (`WHERE a = $1 OR a = $2`)
//! yields several parameters sharing one column name. Generated code keys
//! on that name, so every repeat after the first gets a numeric suffix:
//! `a`, `a1`, `a2`, ... in bind order.

use sqlrender_core::Query;
use std::collections::{HashMap, HashSet};

/// Deduplicate parameter names in every query
///
/// Returns the number of parameters renamed. Each query is handled with its
/// own counters; nothing carries over between queries.
pub fn dedupe_parameter_names(queries: &mut [Query]) -> usize {
    queries.iter_mut().map(dedupe_query).sum()
}

/// Deduplicate parameter names within one query
///
/// Only `Parameter.column.name` is rewritten. Result columns and every other
/// column attribute are left alone. Parameters without a column are skipped.
pub fn dedupe_query(query: &mut Query) -> usize {
    // Names the query binds before any renaming; suffixes never take one
    let originals: HashSet<String> = query
        .params
        .iter()
        .filter_map(|p| p.column_name())
        .map(String::from)
        .collect();

    // name -> next suffix to hand out
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut renamed = 0;

    for param in &mut query.params {
        let Some(column) = param.column.as_mut() else {
            continue;
        };

        let Some(&next) = seen.get(&column.name) else {
            seen.insert(column.name.clone(), 1);
            continue;
        };

        let mut n = next;
        let mut candidate = format!("{}{}", column.name, n);
        while seen.contains_key(&candidate) || originals.contains(&candidate) {
            n += 1;
            candidate = format!("{}{}", column.name, n);
        }

        tracing::trace!(
            query = %query.name,
            from = %column.name,
            to = %candidate,
            "renamed duplicate parameter"
        );

        seen.insert(column.name.clone(), n + 1);
        seen.insert(candidate.clone(), 1);
        column.name = candidate;
        renamed += 1;
    }

    renamed
}
