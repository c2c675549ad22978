//! Value operators.
//!
//! Only the operator surface that feeds declaration values: numeric
//! arithmetic with unit bookkeeping (same-unit or unitless operands; no
//! cross-unit conversion), string concatenation, comparisons and equality.
//! Non-numeric operands of `-`, `/` and `%` fall back to joining their CSS
//! text with the operator symbol, which is how slash-separated shorthand
//! values survive evaluation.

use crate::arena::{Arena, alloc_slice, alloc_str};
use crate::ast::expr::{BinaryOp, UnaryOp};
use crate::ast::value::{Number, QuoteMark, Str, Value};
use crate::printer::format::interpolate_value;

/// Apply a binary operator. `and`/`or` short-circuit in the evaluator and
/// never reach this function. Errors are plain messages; the evaluator
/// attaches spans and backtraces.
pub fn binary_op<'a>(
    arena: &'a Arena,
    op: BinaryOp,
    lhs: Value<'a>,
    rhs: Value<'a>,
    precision: usize,
) -> Result<Value<'a>, String> {
    match op {
        BinaryOp::Eq => Ok(Value::Bool(lhs == rhs)),
        BinaryOp::Ne => Ok(Value::Bool(lhs != rhs)),
        BinaryOp::And | BinaryOp::Or => Err(format!(
            "operator `{}` must be evaluated with short-circuiting",
            op.symbol()
        )),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let (Value::Number(a), Value::Number(b)) = (lhs, rhs) else {
                return Err(type_error(op, &lhs, &rhs));
            };
            if !a.units_compatible(&b) {
                return Err(format!(
                    "incompatible units: {} and {}",
                    a.unit(),
                    b.unit()
                ));
            }
            let result = match op {
                BinaryOp::Lt => a.value < b.value,
                BinaryOp::Le => a.value <= b.value,
                BinaryOp::Gt => a.value > b.value,
                _ => a.value >= b.value,
            };
            Ok(Value::Bool(result))
        }
        BinaryOp::Add => match (lhs, rhs) {
            (Value::Number(a), Value::Number(b)) => {
                arithmetic(arena, BinaryOp::Add, a, b).map(Value::Number)
            }
            _ => concat(arena, lhs, rhs, "", precision),
        },
        BinaryOp::Sub => match (lhs, rhs) {
            (Value::Number(a), Value::Number(b)) => {
                arithmetic(arena, BinaryOp::Sub, a, b).map(Value::Number)
            }
            _ => concat(arena, lhs, rhs, "-", precision),
        },
        BinaryOp::Div => match (lhs, rhs) {
            (Value::Number(a), Value::Number(b)) => {
                if b.value == 0.0 {
                    return Err("division by zero".to_string());
                }
                arithmetic(arena, BinaryOp::Div, a, b).map(Value::Number)
            }
            _ => concat(arena, lhs, rhs, "/", precision),
        },
        BinaryOp::Mul => {
            let (Value::Number(a), Value::Number(b)) = (lhs, rhs) else {
                return Err(type_error(op, &lhs, &rhs));
            };
            arithmetic(arena, BinaryOp::Mul, a, b).map(Value::Number)
        }
        BinaryOp::Mod => {
            let (Value::Number(a), Value::Number(b)) = (lhs, rhs) else {
                return Err(type_error(op, &lhs, &rhs));
            };
            if b.value == 0.0 {
                return Err("modulo by zero".to_string());
            }
            arithmetic(arena, BinaryOp::Mod, a, b).map(Value::Number)
        }
    }
}

/// Apply a unary operator.
pub fn unary_op<'a>(
    arena: &'a Arena,
    op: UnaryOp,
    operand: Value<'a>,
    precision: usize,
) -> Result<Value<'a>, String> {
    match op {
        UnaryOp::Not => Ok(Value::Bool(!operand.is_truthy())),
        UnaryOp::Neg => match operand {
            Value::Number(n) => Ok(Value::Number(Number {
                value: -n.value,
                ..n
            })),
            other => {
                let text = interpolate_value(&other, precision)?;
                Ok(Value::String(Str::unquoted(alloc_str(
                    arena,
                    &format!("-{text}"),
                ))))
            }
        },
        UnaryOp::Plus => match operand {
            Value::Number(_) => Ok(operand),
            other => {
                let text = interpolate_value(&other, precision)?;
                Ok(Value::String(Str::unquoted(alloc_str(
                    arena,
                    &format!("+{text}"),
                ))))
            }
        },
    }
}

fn type_error(op: BinaryOp, lhs: &Value<'_>, rhs: &Value<'_>) -> String {
    format!(
        "undefined operation: {} {} {}",
        lhs.type_name(),
        op.symbol(),
        rhs.type_name()
    )
}

fn arithmetic<'a>(
    arena: &'a Arena,
    op: BinaryOp,
    a: Number<'a>,
    b: Number<'a>,
) -> Result<Number<'a>, String> {
    match op {
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mod => {
            if !a.units_compatible(&b) {
                return Err(format!(
                    "incompatible units: {} and {}",
                    a.unit(),
                    b.unit()
                ));
            }
            let value = match op {
                BinaryOp::Add => a.value + b.value,
                BinaryOp::Sub => a.value - b.value,
                _ => a.value.rem_euclid(b.value),
            };
            let (numer, denom) = if a.is_unitless() {
                (b.numer, b.denom)
            } else {
                (a.numer, a.denom)
            };
            Ok(Number {
                value,
                numer,
                denom,
            })
        }
        BinaryOp::Mul => {
            let mut numer: Vec<&'a str> = a.numer.to_vec();
            numer.extend_from_slice(b.numer);
            let mut denom: Vec<&'a str> = a.denom.to_vec();
            denom.extend_from_slice(b.denom);
            cancel_units(&mut numer, &mut denom);
            Ok(Number {
                value: a.value * b.value,
                numer: alloc_slice(arena, &numer),
                denom: alloc_slice(arena, &denom),
            })
        }
        BinaryOp::Div => {
            let mut numer: Vec<&'a str> = a.numer.to_vec();
            numer.extend_from_slice(b.denom);
            let mut denom: Vec<&'a str> = a.denom.to_vec();
            denom.extend_from_slice(b.numer);
            cancel_units(&mut numer, &mut denom);
            Ok(Number {
                value: a.value / b.value,
                numer: alloc_slice(arena, &numer),
                denom: alloc_slice(arena, &denom),
            })
        }
        _ => Err(format!("`{}` is not arithmetic", op.symbol())),
    }
}

/// Remove unit pairs that appear in both lists.
fn cancel_units(numer: &mut Vec<&str>, denom: &mut Vec<&str>) {
    let mut i = 0;
    while i < denom.len() {
        if let Some(j) = numer.iter().position(|u| *u == denom[i]) {
            numer.remove(j);
            denom.remove(i);
        } else {
            i += 1;
        }
    }
}

/// Join two values as text. The result is quoted when either operand is a
/// quoted string, preferring the left operand's quote mark.
fn concat<'a>(
    arena: &'a Arena,
    lhs: Value<'a>,
    rhs: Value<'a>,
    joiner: &str,
    precision: usize,
) -> Result<Value<'a>, String> {
    let quote = match (lhs, rhs) {
        (Value::String(s), _) if s.quote != QuoteMark::None => s.quote,
        (_, Value::String(s)) if s.quote != QuoteMark::None => s.quote,
        _ => QuoteMark::None,
    };
    let text = format!(
        "{}{}{}",
        interpolate_value(&lhs, precision)?,
        joiner,
        interpolate_value(&rhs, precision)?
    );
    Ok(Value::String(Str {
        text: alloc_str(arena, &text),
        quote,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(v: f64) -> Value<'static> {
        Value::Number(Number::unitless(v))
    }

    #[test]
    fn unit_arithmetic() {
        let arena = Arena::default();
        let px = |v| Value::Number(Number::with_unit(&arena, v, "px"));

        let Value::Number(sum) = binary_op(&arena, BinaryOp::Add, px(1.0), px(2.0), 5).unwrap()
        else {
            panic!("expected number");
        };
        assert_eq!(sum.value, 3.0);
        assert_eq!(sum.unit(), "px");

        let Value::Number(scaled) = binary_op(&arena, BinaryOp::Mul, px(2.0), num(3.0), 5).unwrap()
        else {
            panic!("expected number");
        };
        assert_eq!(scaled.value, 6.0);
        assert_eq!(scaled.unit(), "px");

        let Value::Number(ratio) = binary_op(&arena, BinaryOp::Div, px(6.0), px(2.0), 5).unwrap()
        else {
            panic!("expected number");
        };
        assert_eq!(ratio.value, 3.0);
        assert!(ratio.is_unitless());
    }

    #[test]
    fn incompatible_units_error() {
        let arena = Arena::default();
        let px = Value::Number(Number::with_unit(&arena, 1.0, "px"));
        let em = Value::Number(Number::with_unit(&arena, 1.0, "em"));
        assert!(binary_op(&arena, BinaryOp::Add, px, em, 5).is_err());
        assert!(binary_op(&arena, BinaryOp::Lt, px, em, 5).is_err());
    }

    #[test]
    fn string_concatenation() {
        let arena = Arena::default();
        let quoted = Value::String(Str::quoted("a"));
        let unquoted = Value::String(Str::unquoted("b"));

        let Value::String(joined) =
            binary_op(&arena, BinaryOp::Add, quoted, unquoted, 5).unwrap()
        else {
            panic!("expected string");
        };
        assert_eq!(joined.text, "ab");
        assert_eq!(joined.quote, QuoteMark::Double);

        let Value::String(joined) = binary_op(&arena, BinaryOp::Add, unquoted, num(1.0), 5).unwrap()
        else {
            panic!("expected string");
        };
        assert_eq!(joined.text, "b1");
        assert_eq!(joined.quote, QuoteMark::None);
    }

    #[test]
    fn slash_join_preserves_shorthand() {
        let arena = Arena::default();
        let a = Value::String(Str::unquoted("12px"));
        let b = Value::String(Str::unquoted("30px"));
        let Value::String(joined) = binary_op(&arena, BinaryOp::Div, a, b, 5).unwrap() else {
            panic!("expected string");
        };
        assert_eq!(joined.text, "12px/30px");
    }

    #[test]
    fn comparisons_and_equality() {
        let arena = Arena::default();
        assert_eq!(
            binary_op(&arena, BinaryOp::Lt, num(1.0), num(2.0), 5).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            binary_op(&arena, BinaryOp::Eq, num(1.0), num(1.0), 5).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            binary_op(&arena, BinaryOp::Ne, num(1.0), Value::Null, 5).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn unary_operators() {
        let arena = Arena::default();
        assert_eq!(
            unary_op(&arena, UnaryOp::Not, Value::Null, 5).unwrap(),
            Value::Bool(true)
        );
        let Value::Number(negated) = unary_op(&arena, UnaryOp::Neg, num(4.0), 5).unwrap() else {
            panic!("expected number");
        };
        assert_eq!(negated.value, -4.0);
    }
}
