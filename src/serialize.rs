// Serialization (C9): a flat, line-oriented text encoding of an `R1cs`.
//
// Only the field-level grammar is specified; there is no surrounding parser
// combinator framework here, just line-by-line `str::parse`, in the style of
// the teacher's own small hand-rolled readers.

use num_bigint::BigUint;

use crate::bytecode::{Constraint, Lc, R1cs};
use crate::error::SerializeError;
use crate::field::{Field, FieldParams};

const MAGIC: &str = "r1cs 1";

pub fn to_string(r1cs: &R1cs) -> String {
    let mut out = String::new();
    out.push_str(MAGIC);
    out.push('\n');
    out.push_str(&format!("modulus {}\n", r1cs.params.modulus()));
    out.push_str(&format!("vars {}\n", r1cs.num_vars));
    out.push_str(&format!("elab_vars {}\n", r1cs.num_elab_vars));
    out.push_str(&format!("inputs {}\n", csv(&r1cs.input_vars)));
    out.push_str(&format!("outputs {}\n", csv(&r1cs.output_vars)));
    out.push_str(&format!("constraints {}\n", r1cs.constraints.len()));
    for c in &r1cs.constraints {
        out.push_str(&lc_to_string(&c.a));
        out.push_str(" | ");
        out.push_str(&lc_to_string(&c.b));
        out.push_str(" | ");
        out.push_str(&lc_to_string(&c.c));
        out.push('\n');
    }
    out
}

fn csv(xs: &[usize]) -> String {
    xs.iter().map(|x| x.to_string()).collect::<Vec<_>>().join(",")
}

fn lc_to_string(lc: &Lc) -> String {
    if lc.is_empty() {
        return "0".to_string();
    }
    lc.iter()
        .map(|(coeff, wire)| format!("{}*{}", coeff, wire))
        .collect::<Vec<_>>()
        .join(";")
}

pub fn from_str(s: &str) -> Result<R1cs, SerializeError> {
    let mut lines = s.lines().enumerate();

    let (_, magic) = lines.next().ok_or(SerializeError::Malformed(1, "empty input".into()))?;
    if magic.trim() != MAGIC {
        return Err(SerializeError::Malformed(1, format!("expected `{}` header", MAGIC)));
    }

    let modulus = parse_field_line(&mut lines, "modulus")?;
    let params = FieldParams::with_modulus(
        modulus.parse::<BigUint>().map_err(|e| SerializeError::Malformed(2, e.to_string()))?,
    );
    let num_vars = parse_usize_line(&mut lines, "vars")?;
    let num_elab_vars = parse_usize_line(&mut lines, "elab_vars")?;
    let input_vars = parse_csv_line(&mut lines, "inputs")?;
    let output_vars = parse_csv_line(&mut lines, "outputs")?;
    let num_constraints = parse_usize_line(&mut lines, "constraints")?;

    let mut constraints = Vec::with_capacity(num_constraints);
    for _ in 0..num_constraints {
        let (lineno, line) = lines.next().ok_or(SerializeError::Malformed(0, "missing constraint line".into()))?;
        constraints.push(parse_constraint_line(lineno + 1, line, &params)?);
    }

    Ok(R1cs { params, num_vars, num_elab_vars, input_vars, output_vars, constraints })
}

fn parse_field_line<'a>(
    lines: &mut impl Iterator<Item = (usize, &'a str)>,
    keyword: &'static str,
) -> Result<String, SerializeError> {
    let (lineno, line) = lines.next().ok_or(SerializeError::Malformed(0, format!("missing `{keyword}` line")))?;
    let rest = strip_keyword(lineno + 1, line, keyword)?;
    Ok(rest.trim().to_string())
}

fn parse_usize_line<'a>(
    lines: &mut impl Iterator<Item = (usize, &'a str)>,
    keyword: &'static str,
) -> Result<usize, SerializeError> {
    let (lineno, line) = lines.next().ok_or(SerializeError::Malformed(0, format!("missing `{keyword}` line")))?;
    let rest = strip_keyword(lineno + 1, line, keyword)?;
    rest.trim()
        .parse()
        .map_err(|_| SerializeError::Malformed(lineno + 1, format!("expected integer after `{keyword}`")))
}

fn parse_csv_line<'a>(
    lines: &mut impl Iterator<Item = (usize, &'a str)>,
    keyword: &'static str,
) -> Result<Vec<usize>, SerializeError> {
    let (lineno, line) = lines.next().ok_or(SerializeError::Malformed(0, format!("missing `{keyword}` line")))?;
    let rest = strip_keyword(lineno + 1, line, keyword)?;
    let rest = rest.trim();
    if rest.is_empty() {
        return Ok(Vec::new());
    }
    rest.split(',')
        .map(|tok| {
            tok.trim()
                .parse()
                .map_err(|_| SerializeError::Malformed(lineno + 1, format!("bad wire index in `{keyword}`")))
        })
        .collect()
}

fn strip_keyword<'a>(lineno: usize, line: &'a str, keyword: &str) -> Result<&'a str, SerializeError> {
    line.strip_prefix(keyword)
        .ok_or_else(|| SerializeError::Malformed(lineno, format!("expected `{keyword}` line")))
}

fn parse_constraint_line(lineno: usize, line: &str, params: &FieldParams) -> Result<Constraint, SerializeError> {
    let parts: Vec<&str> = line.split('|').collect();
    if parts.len() != 3 {
        return Err(SerializeError::Malformed(lineno, "constraint must have 3 `|`-separated parts".into()));
    }
    let a = parse_lc(lineno, parts[0].trim(), params)?;
    let b = parse_lc(lineno, parts[1].trim(), params)?;
    let c = parse_lc(lineno, parts[2].trim(), params)?;
    Ok(Constraint { a, b, c })
}

fn parse_lc(lineno: usize, s: &str, params: &FieldParams) -> Result<Lc, SerializeError> {
    if s == "0" {
        return Ok(Vec::new());
    }
    s.split(';')
        .map(|term| parse_term(lineno, term.trim(), params))
        .collect()
}

fn parse_term(lineno: usize, term: &str, params: &FieldParams) -> Result<(Field, usize), SerializeError> {
    let (coeff_str, wire_str) = term
        .split_once('*')
        .ok_or_else(|| SerializeError::Malformed(lineno, format!("malformed term `{term}`")))?;
    let coeff_value: BigUint = coeff_str
        .parse()
        .map_err(|_| SerializeError::Malformed(lineno, format!("bad coefficient `{coeff_str}`")))?;
    let wire: usize = wire_str
        .parse()
        .map_err(|_| SerializeError::Malformed(lineno, format!("bad wire index `{wire_str}`")))?;
    Ok((Field::from_biguint(coeff_value, params), wire))
}
