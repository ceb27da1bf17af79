use crate::errors::DbError;
use bson::{Bson, Document as BsonDocument};

use super::types::{CmpOp, Filter, MAX_IN_SET, MAX_NESTING, MAX_PATH_DEPTH, MAX_PATH_LEN};

fn malformed(msg: impl Into<String>) -> DbError {
    DbError::MalformedPattern(msg.into())
}

/// Compiles a decoded pattern into a [`Filter`].
///
/// # Errors
/// Returns `MalformedPattern` for unknown operators, operator arguments of the wrong shape,
/// oversized `$in`/`$nin` sets, over-deep nesting, or unusable field paths.
pub fn compile_pattern(pattern: &BsonDocument) -> Result<Filter, DbError> {
    compile_doc(pattern, 0)
}

fn compile_doc(doc: &BsonDocument, depth: usize) -> Result<Filter, DbError> {
    if depth > MAX_NESTING {
        return Err(malformed(format!("nesting deeper than {MAX_NESTING}")));
    }
    let mut clauses = Vec::with_capacity(doc.len());
    for (key, value) in doc {
        if let Some(op) = key.strip_prefix('$') {
            clauses.push(compile_logical(op, value, depth)?);
        } else {
            check_path(key)?;
            clauses.push(compile_field(key, value, depth)?);
        }
    }
    Ok(conjoin(clauses))
}

fn conjoin(mut clauses: Vec<Filter>) -> Filter {
    match clauses.len() {
        0 => Filter::True,
        1 => clauses.swap_remove(0),
        _ => Filter::And(clauses),
    }
}

fn compile_logical(op: &str, value: &Bson, depth: usize) -> Result<Filter, DbError> {
    if !matches!(op, "and" | "or" | "nor") {
        return Err(malformed(format!("unknown top-level operator ${op}")));
    }
    let items = match value {
        Bson::Array(items) if !items.is_empty() => items,
        _ => return Err(malformed(format!("${op} expects a non-empty array"))),
    };
    let branches = items
        .iter()
        .map(|b| match b {
            Bson::Document(d) => compile_doc(d, depth + 1),
            _ => Err(malformed(format!("${op} expects an array of documents"))),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(match op {
        "and" => Filter::And(branches),
        "or" => Filter::Or(branches),
        _ => Filter::Not(Box::new(Filter::Or(branches))),
    })
}

fn is_operator_doc(doc: &BsonDocument) -> bool {
    doc.keys().next().is_some_and(|k| k.starts_with('$'))
}

fn compile_field(path: &str, value: &Bson, depth: usize) -> Result<Filter, DbError> {
    match value {
        Bson::Document(ops) if is_operator_doc(ops) => compile_operators(path, ops, depth),
        other => Ok(Filter::Cmp { path: path.to_string(), op: CmpOp::Eq, value: other.clone() }),
    }
}

fn compile_operators(path: &str, ops: &BsonDocument, depth: usize) -> Result<Filter, DbError> {
    if depth > MAX_NESTING {
        return Err(malformed(format!("nesting deeper than {MAX_NESTING}")));
    }
    let cmp = |op: CmpOp, value: &Bson| Filter::Cmp { path: path.to_string(), op, value: value.clone() };
    let mut clauses = Vec::with_capacity(ops.len());
    for (key, value) in ops {
        let clause = match key.as_str() {
            "$eq" => cmp(CmpOp::Eq, value),
            "$ne" => cmp(CmpOp::Ne, value),
            "$gt" => cmp(CmpOp::Gt, value),
            "$gte" => cmp(CmpOp::Gte, value),
            "$lt" => cmp(CmpOp::Lt, value),
            "$lte" => cmp(CmpOp::Lte, value),
            "$in" => Filter::In { path: path.to_string(), values: value_set("$in", value)? },
            "$nin" => Filter::Nin { path: path.to_string(), values: value_set("$nin", value)? },
            "$exists" => Filter::Exists { path: path.to_string(), exists: truthy("$exists", value)? },
            "$not" => match value {
                Bson::Document(inner) if is_operator_doc(inner) => {
                    Filter::Not(Box::new(compile_operators(path, inner, depth + 1)?))
                }
                _ => return Err(malformed("$not expects an operator document")),
            },
            #[cfg(feature = "regex")]
            "$regex" => compile_regex(path, value, ops.get("$options"))?,
            #[cfg(feature = "regex")]
            "$options" if ops.contains_key("$regex") => continue,
            other => return Err(malformed(format!("unknown operator {other} on field {path}"))),
        };
        clauses.push(clause);
    }
    Ok(conjoin(clauses))
}

#[cfg(feature = "regex")]
fn compile_regex(path: &str, value: &Bson, options: Option<&Bson>) -> Result<Filter, DbError> {
    let Bson::String(pattern) = value else {
        return Err(malformed("$regex expects a string"));
    };
    let case_insensitive = match options {
        None => false,
        Some(Bson::String(o)) => o.contains('i'),
        Some(_) => return Err(malformed("$options expects a string")),
    };
    let re = regex::RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .size_limit(1 << 20)
        .build()
        .map_err(|e| malformed(format!("bad $regex: {e}")))?;
    Ok(Filter::Regex { path: path.to_string(), re })
}

fn value_set(op: &str, value: &Bson) -> Result<Vec<Bson>, DbError> {
    match value {
        Bson::Array(items) if items.len() <= MAX_IN_SET => Ok(items.clone()),
        Bson::Array(items) => Err(malformed(format!("{op} has {} values (max {MAX_IN_SET})", items.len()))),
        _ => Err(malformed(format!("{op} expects an array"))),
    }
}

fn truthy(op: &str, value: &Bson) -> Result<bool, DbError> {
    match value {
        Bson::Boolean(b) => Ok(*b),
        Bson::Int32(i) => Ok(*i != 0),
        Bson::Int64(i) => Ok(*i != 0),
        Bson::Double(f) => Ok(*f != 0.0),
        _ => Err(malformed(format!("{op} expects a boolean"))),
    }
}

fn check_path(path: &str) -> Result<(), DbError> {
    if path.is_empty() || path.len() > MAX_PATH_LEN {
        return Err(malformed("field path is empty or too long"));
    }
    let mut segs = 0usize;
    for seg in path.split('.') {
        segs += 1;
        if seg.is_empty() || segs > MAX_PATH_DEPTH {
            return Err(malformed(format!("unusable field path {path:?}")));
        }
    }
    Ok(())
}
