use bson::{Bson, Document as BsonDocument};
use std::cmp::Ordering;

use super::types::{CmpOp, Filter, MAX_PATH_DEPTH, MAX_PATH_LEN};

pub fn eval_filter(doc: &BsonDocument, filter: &Filter) -> bool {
    match filter {
        Filter::True => true,
        Filter::And(fs) => fs.iter().all(|f| eval_filter(doc, f)),
        Filter::Or(fs) => fs.iter().any(|f| eval_filter(doc, f)),
        Filter::Not(f) => !eval_filter(doc, f),
        Filter::Exists { path, exists } => get_path(doc, path).is_some() == *exists,
        Filter::In { path, values } => get_path(doc, path).is_some_and(|v| is_in_set(v, values)),
        Filter::Nin { path, values } => !get_path(doc, path).is_some_and(|v| is_in_set(v, values)),
        Filter::Cmp { path, op, value } => {
            let found = get_path(doc, path);
            match op {
                // A missing field is "not equal" to anything, as in the other document stores.
                CmpOp::Ne => !found.is_some_and(|v| bson_equal(v, value)),
                CmpOp::Eq => found.is_some_and(|v| bson_equal(v, value)),
                CmpOp::Gt => found.is_some_and(|v| comparable(v, value) && compare_bson(v, value) == Ordering::Greater),
                CmpOp::Gte => found.is_some_and(|v| comparable(v, value) && compare_bson(v, value) != Ordering::Less),
                CmpOp::Lt => found.is_some_and(|v| comparable(v, value) && compare_bson(v, value) == Ordering::Less),
                CmpOp::Lte => found.is_some_and(|v| comparable(v, value) && compare_bson(v, value) != Ordering::Greater),
            }
        }
        #[cfg(feature = "regex")]
        Filter::Regex { path, re } => {
            matches!(get_path(doc, path), Some(Bson::String(s)) if re.is_match(s))
        }
    }
}

fn is_in_set(v: &Bson, set: &[Bson]) -> bool {
    set.iter().any(|x| bson_equal(v, x))
}

fn get_path<'a>(doc: &'a BsonDocument, path: &str) -> Option<&'a Bson> {
    if path.is_empty() || path.len() > MAX_PATH_LEN {
        return None;
    }
    let mut cur = doc;
    let mut parts = path.split('.').take(MAX_PATH_DEPTH).peekable();
    while let Some(part) = parts.next() {
        let v = cur.get(part)?;
        if parts.peek().is_none() {
            return Some(v);
        }
        match v {
            Bson::Document(d) => cur = d,
            _ => return None,
        }
    }
    None
}

fn is_num(x: &Bson) -> bool {
    matches!(x, Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_))
}

fn as_f64_num(x: &Bson) -> f64 {
    match x {
        Bson::Int32(i) => f64::from(*i),
        #[allow(clippy::cast_precision_loss)]
        Bson::Int64(i) => *i as f64,
        Bson::Double(f) => *f,
        _ => f64::NAN,
    }
}

/// Equality with numeric widening: `Int32(1)`, `Int64(1)` and `Double(1.0)` are equal.
pub fn bson_equal(a: &Bson, b: &Bson) -> bool {
    match (a, b) {
        (Bson::Int64(x), Bson::Int64(y)) => x == y,
        _ if is_num(a) && is_num(b) => as_f64_num(a) == as_f64_num(b),
        _ => a == b,
    }
}

/// Range operators only order values of the same kind (numbers with numbers, strings with strings).
fn comparable(a: &Bson, b: &Bson) -> bool {
    (is_num(a) && is_num(b))
        || matches!(
            (a, b),
            (Bson::String(_), Bson::String(_))
                | (Bson::Boolean(_), Bson::Boolean(_))
                | (Bson::DateTime(_), Bson::DateTime(_))
        )
}

pub fn compare_bson(a: &Bson, b: &Bson) -> Ordering {
    if let (Bson::Int64(x), Bson::Int64(y)) = (a, b) {
        return x.cmp(y);
    }
    if is_num(a) && is_num(b) {
        return as_f64_num(a).total_cmp(&as_f64_num(b));
    }
    match (a, b) {
        (Bson::String(x), Bson::String(y)) => x.cmp(y),
        (Bson::Boolean(x), Bson::Boolean(y)) => x.cmp(y),
        (Bson::DateTime(x), Bson::DateTime(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(v: &Bson) -> u8 {
    use bson::Bson as T;
    match v {
        T::MinKey => 0,
        T::Null | T::Undefined => 1,
        T::Int32(_) | T::Int64(_) | T::Double(_) | T::Decimal128(_) => 2,
        T::String(_) | T::Symbol(_) => 3,
        T::Document(_) => 4,
        T::Array(_) => 5,
        T::Binary(_) => 6,
        T::ObjectId(_) => 7,
        T::Boolean(_) => 8,
        T::DateTime(_) => 9,
        T::Timestamp(_) => 10,
        T::RegularExpression(_) => 11,
        _ => 12,
    }
}
