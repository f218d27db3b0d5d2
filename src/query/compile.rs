use bson::Bson;

use super::types::{Coercion, Filter, FilterClause};

/// Compiles filter clauses into a single AND predicate, preserving declared order.
#[must_use]
pub fn compile_filters(filters: &[FilterClause], coercion: Coercion) -> Filter {
    let mut parts: Vec<Filter> = filters.iter().map(|c| compile_clause(c, coercion)).collect();
    match parts.len() {
        0 => Filter::True,
        1 => parts.remove(0),
        _ => Filter::And(parts),
    }
}

#[must_use]
pub fn compile_clause(clause: &FilterClause, coercion: Coercion) -> Filter {
    let values = candidates(&clause.value, coercion);
    let path = clause.field.clone();
    if clause.negate { Filter::Nin { path, values } } else { Filter::In { path, values } }
}

/// Values a raw string may stand for. The raw string always comes first.
#[must_use]
pub fn candidates(raw: &str, coercion: Coercion) -> Vec<Bson> {
    let mut out = vec![Bson::String(raw.to_string())];
    if coercion == Coercion::Lenient
        && let Some(typed) = coerce_scalar(raw)
    {
        out.push(typed);
    }
    out
}

/// Boolean, null, integer or finite float reading of `raw`, tried in that order.
#[must_use]
pub fn coerce_scalar(raw: &str) -> Option<Bson> {
    match raw {
        "true" => return Some(Bson::Boolean(true)),
        "false" => return Some(Bson::Boolean(false)),
        "null" => return Some(Bson::Null),
        _ => {}
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Some(Bson::Int64(i));
    }
    raw.parse::<f64>().ok().filter(|f| f.is_finite()).map(Bson::Double)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clause(field: &str, negate: bool, value: &str) -> FilterClause {
        FilterClause { field: field.into(), negate, value: value.into() }
    }

    #[test]
    fn empty_compiles_to_true() {
        assert_eq!(compile_filters(&[], Coercion::Lenient), Filter::True);
    }

    #[test]
    fn single_and_multiple_clauses() {
        let f = compile_filters(&[clause("color", true, "blue")], Coercion::Strict);
        assert_eq!(f, Filter::Nin { path: "color".into(), values: vec![Bson::String("blue".into())] });

        let f = compile_filters(
            &[clause("a", false, "1"), clause("b", true, "x")],
            Coercion::Lenient,
        );
        match f {
            Filter::And(parts) => {
                assert_eq!(parts.len(), 2);
                assert!(matches!(&parts[0], Filter::In { path, values } if path == "a" && values.len() == 2));
                assert!(matches!(&parts[1], Filter::Nin { path, values } if path == "b" && values.len() == 1));
            }
            other => panic!("expected And, got {other:?}"),
        }
    }

    #[test]
    fn scalar_coercion_order() {
        assert_eq!(coerce_scalar("true"), Some(Bson::Boolean(true)));
        assert_eq!(coerce_scalar("null"), Some(Bson::Null));
        assert_eq!(coerce_scalar("42"), Some(Bson::Int64(42)));
        assert_eq!(coerce_scalar("-1.5"), Some(Bson::Double(-1.5)));
        assert_eq!(coerce_scalar("NaN"), None);
        assert_eq!(coerce_scalar("inf"), None);
        assert_eq!(coerce_scalar("blue"), None);
        assert_eq!(coerce_scalar(""), None);
    }

    #[test]
    fn strict_keeps_string_only() {
        assert_eq!(candidates("30", Coercion::Strict), vec![Bson::String("30".into())]);
        assert_eq!(
            candidates("30", Coercion::Lenient),
            vec![Bson::String("30".into()), Bson::Int64(30)]
        );
    }
}
