//! Constant folding over lowered expressions.
//!
//! `None` means "not a constant": non-constant operands, `null`, integer
//! division by zero, string identity comparison, and any reference the
//! resolver cannot (or, inside a cycle, may not) reduce.

use std::sync::Arc;

use tracing::trace;

use crate::base::Name;

use super::constant::{ConstValue, Num, compute_cast_to, promote};
use super::expr::{BinaryOp, Expr, UnaryOp};

/// Supplies the values of constants named by references.
pub trait ConstantResolver {
    fn resolve_reference(&mut self, path: &[Name]) -> Option<ConstValue>;
}

/// A resolver that knows no constants.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoReferences;

impl ConstantResolver for NoReferences {
    fn resolve_reference(&mut self, _path: &[Name]) -> Option<ConstValue> {
        None
    }
}

pub fn evaluate(expr: &Expr, resolver: &mut dyn ConstantResolver) -> Option<ConstValue> {
    match expr {
        Expr::Literal(value) => Some(value.clone()),
        Expr::Null | Expr::NonConstant => None,
        Expr::Reference(path) => {
            let value = resolver.resolve_reference(path);
            trace!(reference = %path.join("."), ?value, "resolved constant reference");
            value
        }
        Expr::Paren(inner) => evaluate(inner, resolver),
        Expr::Unary { op, operand } => unary(*op, evaluate(operand, resolver)?),
        Expr::Binary { op, lhs, rhs } => {
            // Both operands must be constant, even for `&&` and `||`.
            let lhs = evaluate(lhs, resolver)?;
            let rhs = evaluate(rhs, resolver)?;
            binary(*op, lhs, rhs)
        }
        Expr::Conditional {
            condition,
            then_branch,
            else_branch,
        } => {
            let condition = evaluate(condition, resolver)?.as_bool()?;
            let then_value = evaluate(then_branch, resolver)?;
            let else_value = evaluate(else_branch, resolver)?;
            conditional(condition, then_value, else_value)
        }
        Expr::Cast { ty, operand } => compute_cast_to(evaluate(operand, resolver)?, ty),
    }
}

fn unary(op: UnaryOp, value: ConstValue) -> Option<ConstValue> {
    if op == UnaryOp::Not {
        return value.as_bool().map(|b| ConstValue::Boolean(!b));
    }
    let num = value.numeric()?;
    let result = match (op, num) {
        (UnaryOp::Plus, n) => n,
        (UnaryOp::Neg, Num::Int(v)) => Num::Int(v.wrapping_neg()),
        (UnaryOp::Neg, Num::Long(v)) => Num::Long(v.wrapping_neg()),
        (UnaryOp::Neg, Num::Float(v)) => Num::Float(-v),
        (UnaryOp::Neg, Num::Double(v)) => Num::Double(-v),
        (UnaryOp::BitNot, Num::Int(v)) => Num::Int(!v),
        (UnaryOp::BitNot, Num::Long(v)) => Num::Long(!v),
        _ => return None,
    };
    Some(result.into_value())
}

fn binary(op: BinaryOp, lhs: ConstValue, rhs: ConstValue) -> Option<ConstValue> {
    match op {
        BinaryOp::Add if lhs.as_str().is_some() || rhs.as_str().is_some() => {
            let joined = format!("{}{}", lhs.to_java_string(), rhs.to_java_string());
            Some(ConstValue::String(Arc::from(joined)))
        }
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
            let (l, r) = promote(lhs.numeric()?, rhs.numeric()?);
            arithmetic(op, l, r).map(Num::into_value)
        }
        BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr => {
            // Each operand is promoted on its own; the left one decides.
            let distance = match rhs.numeric()? {
                Num::Int(v) => v as i64,
                Num::Long(v) => v,
                _ => return None,
            };
            let result = match lhs.numeric()? {
                Num::Int(v) => {
                    let d = (distance & 31) as u32;
                    Num::Int(match op {
                        BinaryOp::Shl => v.wrapping_shl(d),
                        BinaryOp::Shr => v.wrapping_shr(d),
                        _ => ((v as u32) >> d) as i32,
                    })
                }
                Num::Long(v) => {
                    let d = (distance & 63) as u32;
                    Num::Long(match op {
                        BinaryOp::Shl => v.wrapping_shl(d),
                        BinaryOp::Shr => v.wrapping_shr(d),
                        _ => ((v as u64) >> d) as i64,
                    })
                }
                _ => return None,
            };
            Some(result.into_value())
        }
        BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => {
            let (l, r) = promote(lhs.numeric()?, rhs.numeric()?);
            let ordering = compare(l, r);
            let result = match op {
                BinaryOp::Lt => ordering == Some(std::cmp::Ordering::Less),
                BinaryOp::Gt => ordering == Some(std::cmp::Ordering::Greater),
                BinaryOp::Le => matches!(ordering, Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)),
                _ => matches!(ordering, Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal)),
            };
            Some(ConstValue::Boolean(result))
        }
        BinaryOp::Eq | BinaryOp::Ne => {
            let equal = match (&lhs, &rhs) {
                (ConstValue::Boolean(a), ConstValue::Boolean(b)) => a == b,
                // Reference comparison of strings is not a constant.
                (ConstValue::String(_), _) | (_, ConstValue::String(_)) => return None,
                _ => {
                    let (l, r) = promote(lhs.numeric()?, rhs.numeric()?);
                    compare(l, r) == Some(std::cmp::Ordering::Equal)
                }
            };
            Some(ConstValue::Boolean(if op == BinaryOp::Eq { equal } else { !equal }))
        }
        BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor => {
            if let (Some(a), Some(b)) = (lhs.as_bool(), rhs.as_bool()) {
                let result = match op {
                    BinaryOp::BitAnd => a & b,
                    BinaryOp::BitOr => a | b,
                    _ => a ^ b,
                };
                return Some(ConstValue::Boolean(result));
            }
            let result = match promote(lhs.numeric()?, rhs.numeric()?) {
                (Num::Int(a), Num::Int(b)) => Num::Int(bitwise(op, a as i64, b as i64) as i32),
                (Num::Long(a), Num::Long(b)) => Num::Long(bitwise(op, a, b)),
                _ => return None,
            };
            Some(result.into_value())
        }
        BinaryOp::And => Some(ConstValue::Boolean(lhs.as_bool()? && rhs.as_bool()?)),
        BinaryOp::Or => Some(ConstValue::Boolean(lhs.as_bool()? || rhs.as_bool()?)),
    }
}

fn arithmetic(op: BinaryOp, lhs: Num, rhs: Num) -> Option<Num> {
    let result = match (lhs, rhs) {
        (Num::Int(a), Num::Int(b)) => Num::Int(match op {
            BinaryOp::Add => a.wrapping_add(b),
            BinaryOp::Sub => a.wrapping_sub(b),
            BinaryOp::Mul => a.wrapping_mul(b),
            BinaryOp::Div if b == 0 => return None,
            BinaryOp::Div => a.wrapping_div(b),
            BinaryOp::Rem if b == 0 => return None,
            _ => a.wrapping_rem(b),
        }),
        (Num::Long(a), Num::Long(b)) => Num::Long(match op {
            BinaryOp::Add => a.wrapping_add(b),
            BinaryOp::Sub => a.wrapping_sub(b),
            BinaryOp::Mul => a.wrapping_mul(b),
            BinaryOp::Div if b == 0 => return None,
            BinaryOp::Div => a.wrapping_div(b),
            BinaryOp::Rem if b == 0 => return None,
            _ => a.wrapping_rem(b),
        }),
        (Num::Float(a), Num::Float(b)) => Num::Float(match op {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            _ => a % b,
        }),
        (Num::Double(a), Num::Double(b)) => Num::Double(match op {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            _ => a % b,
        }),
        _ => return None,
    };
    Some(result)
}

fn bitwise(op: BinaryOp, a: i64, b: i64) -> i64 {
    match op {
        BinaryOp::BitAnd => a & b,
        BinaryOp::BitOr => a | b,
        _ => a ^ b,
    }
}

fn compare(lhs: Num, rhs: Num) -> Option<std::cmp::Ordering> {
    match (lhs, rhs) {
        (Num::Int(a), Num::Int(b)) => Some(a.cmp(&b)),
        (Num::Long(a), Num::Long(b)) => Some(a.cmp(&b)),
        (Num::Float(a), Num::Float(b)) => a.partial_cmp(&b),
        (Num::Double(a), Num::Double(b)) => a.partial_cmp(&b),
        _ => None,
    }
}

/// `c ? a : b` with both branches constant. Branches of different numeric
/// types are promoted; mixing strings with other values is not constant.
fn conditional(condition: bool, then_value: ConstValue, else_value: ConstValue) -> Option<ConstValue> {
    let same_kind = std::mem::discriminant(&then_value) == std::mem::discriminant(&else_value);
    if same_kind {
        return Some(if condition { then_value } else { else_value });
    }
    let (t, e) = promote(then_value.numeric()?, else_value.numeric()?);
    Some(if condition { t } else { e }.into_value())
}
