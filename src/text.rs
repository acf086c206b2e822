//! Textual vector form: `#<TYPE:KEY:LABEL:i1:v1 i2:v2 ...>` for sparse
//! vectors, `#<TYPE:WEIGHT:LABEL:v1 v2 ...>` for dense vectors, plus a
//! JSON-quoted wrapper (SPEC_FULL §6).

use crate::error::VectorTextError;
use crate::scalar::{parse, Cursor};
use crate::symbol::Symbol;
use crate::vector::{DenseVector, SparseVector};

fn render_symbol(sym: Option<Symbol>) -> String {
    sym.map(|s| s.as_str().to_owned()).unwrap_or_default()
}

/// Renders a sparse vector as `#<TYPE:KEY:LABEL:i1:v1 i2:v2 ...>`.
pub fn render_sparse(type_name: &str, v: &SparseVector) -> String {
    let (indices, values) = v.snapshot();
    let body = indices
        .iter()
        .zip(values.iter())
        .map(|(i, val)| format!("{i}:{val}"))
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "#<{}:{}:{}:{}>",
        type_name,
        render_symbol(v.key()),
        render_symbol(v.label()),
        body
    )
}

/// Renders a dense vector as `#<TYPE:WEIGHT:LABEL:v1 v2 ...>`.
pub fn render_dense(type_name: &str, v: &DenseVector) -> String {
    let values = v.snapshot();
    let body = values
        .iter()
        .map(|val| val.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "#<{}:{}:{}:{}>",
        type_name,
        v.weight(),
        render_symbol(v.label()),
        body
    )
}

/// Wraps a rendered vector form in a JSON string literal, escaping `"` and
/// `\` per JSON string rules (SPEC_FULL §6).
pub fn to_json_string(rendered: &str) -> String {
    let mut out = String::with_capacity(rendered.len() + 2);
    out.push('"');
    for c in rendered.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

struct Header<'a> {
    type_name: &'a str,
    field2: &'a str,
    label: &'a str,
    body: &'a str,
}

fn split_header(text: &str) -> Result<Header<'_>, VectorTextError> {
    let text = text.trim();
    let inner = text
        .strip_prefix("#<")
        .ok_or(VectorTextError::MissingOpenDelimiter)?;
    let inner = inner
        .strip_suffix('>')
        .ok_or(VectorTextError::MissingCloseDelimiter)?;
    let mut parts = inner.splitn(4, ':');
    let type_name = parts.next().unwrap_or("");
    let field2 = parts.next().unwrap_or("");
    let label = parts.next().unwrap_or("");
    let body = parts.next().unwrap_or("");
    Ok(Header {
        type_name,
        field2,
        label,
        body,
    })
}

/// Parses a sparse vector from its textual form.
pub fn parse_sparse(text: &str) -> Result<SparseVector, VectorTextError> {
    let header = split_header(text)?;
    let v = SparseVector::new(4);
    if !header.field2.is_empty() {
        v.set_key(Some(Symbol::intern(header.field2)));
    }
    if !header.label.is_empty() {
        v.set_label(Some(Symbol::intern(header.label)));
    }
    for token in header.body.split_whitespace() {
        let mut cursor = Cursor::new(token);
        let mut idx = 0u32;
        if !parse(&mut cursor, &mut idx) {
            return Err(VectorTextError::MalformedPair(token.to_owned()));
        }
        let value = if cursor.remaining().starts_with(':') {
            let rest = &cursor.remaining()[1..];
            let mut c2 = Cursor::new(rest);
            let mut val = 0f32;
            if !parse(&mut c2, &mut val) {
                return Err(VectorTextError::MalformedPair(token.to_owned()));
            }
            val
        } else {
            return Err(VectorTextError::MalformedPair(token.to_owned()));
        };
        v.set_element(idx, value);
    }
    Ok(v)
}

/// Parses a dense vector from its textual form.
pub fn parse_dense(text: &str) -> Result<DenseVector, VectorTextError> {
    let header = split_header(text)?;
    let mut weight = 1.0f32;
    let mut wc = Cursor::new(header.field2);
    if !header.field2.is_empty() && !parse(&mut wc, &mut weight) {
        return Err(VectorTextError::MalformedScalar {
            field: "weight".to_owned(),
            context: text.to_owned(),
        });
    }
    let mut values = Vec::new();
    for token in header.body.split_whitespace() {
        let mut c = Cursor::new(token);
        let mut val = 0f32;
        if !parse(&mut c, &mut val) {
            return Err(VectorTextError::MalformedScalar {
                field: "element".to_owned(),
                context: token.to_owned(),
            });
        }
        values.push(val);
    }
    let v = DenseVector::from_values(values);
    v.set_weight(weight);
    if !header.label.is_empty() {
        v.set_label(Some(Symbol::intern(header.label)));
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_round_trips_through_text() {
        let v = SparseVector::from_pairs(vec![(1, 2.0), (5, 9.0)]);
        let rendered = render_sparse("SparseVector", &v);
        let parsed = parse_sparse(&rendered).unwrap();
        assert_eq!(parsed.snapshot(), v.snapshot());
    }

    #[test]
    fn dense_round_trips_through_text() {
        let v = DenseVector::from_values(vec![1.0, 2.0, 3.0]);
        v.set_weight(0.5);
        let rendered = render_dense("DenseVector", &v);
        let parsed = parse_dense(&rendered).unwrap();
        assert_eq!(parsed.snapshot(), v.snapshot());
        assert_eq!(parsed.weight(), 0.5);
    }

    #[test]
    fn json_wrapper_escapes_quotes() {
        let json = to_json_string("#<Foo:\"bar\":>");
        assert_eq!(json, "\"#<Foo:\\\"bar\\\":>\"");
    }

    #[test]
    fn malformed_form_is_an_error_not_an_empty_vector() {
        assert!(parse_sparse("not a vector").is_err());
    }
}
