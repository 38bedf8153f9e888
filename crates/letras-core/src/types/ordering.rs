//! Total ordering over JSON values.
//!
//! Mirrors PostgreSQL's `jsonb` ordering so every store backend pages
//! records in the same order: null < string < number < boolean < array <
//! object. Missing fields compare as null.

use std::cmp::Ordering;

use serde_json::Value;

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::String(_) => 1,
        Value::Number(_) => 2,
        Value::Bool(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Compare two JSON values.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::String(sa), Value::String(sb)) => sa.cmp(sb),
        (Value::Number(na), Value::Number(nb)) => {
            let lhs = na.as_f64().unwrap_or_default();
            let rhs = nb.as_f64().unwrap_or_default();
            lhs.total_cmp(&rhs)
        }
        (Value::Bool(ba), Value::Bool(bb)) => ba.cmp(bb),
        (Value::Array(xa), Value::Array(xb)) => xa
            .len()
            .cmp(&xb.len())
            .then_with(|| {
                xa.iter()
                    .zip(xb)
                    .map(|(x, y)| compare_values(x, y))
                    .find(|ord| ord.is_ne())
                    .unwrap_or(Ordering::Equal)
            }),
        (Value::Object(oa), Value::Object(ob)) => oa.len().cmp(&ob.len()).then_with(|| {
            let mut ka: Vec<_> = oa.iter().collect();
            let mut kb: Vec<_> = ob.iter().collect();
            ka.sort_by(|x, y| x.0.cmp(y.0));
            kb.sort_by(|x, y| x.0.cmp(y.0));
            ka.iter()
                .zip(&kb)
                .map(|((k1, v1), (k2, v2))| k1.cmp(k2).then_with(|| compare_values(v1, v2)))
                .find(|ord| ord.is_ne())
                .unwrap_or(Ordering::Equal)
        }),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_ranks() {
        assert_eq!(compare_values(&Value::Null, &json!("a")), Ordering::Less);
        assert_eq!(compare_values(&json!("z"), &json!(1)), Ordering::Less);
        assert_eq!(compare_values(&json!(100), &json!(false)), Ordering::Less);
    }

    #[test]
    fn test_numbers_compare_numerically() {
        assert_eq!(compare_values(&json!(2), &json!(10)), Ordering::Less);
        assert_eq!(compare_values(&json!(2.5), &json!(2)), Ordering::Greater);
    }

    #[test]
    fn test_rfc3339_strings_sort_chronologically() {
        let earlier = json!("2024-03-01T10:00:00.000000Z");
        let later = json!("2024-03-01T10:00:00.000001Z");
        assert_eq!(compare_values(&earlier, &later), Ordering::Less);
    }
}
