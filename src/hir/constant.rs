//! Compile-time constant values and their conversions.

use std::fmt;
use std::sync::Arc;

use super::types::{PrimitiveType, TypeDescriptor};

#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Boolean(bool),
    Byte(i8),
    Short(i16),
    /// UTF-16 code unit
    Char(u16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(Arc<str>),
}

/// A numeric value after unary promotion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Num {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

impl Num {
    pub(crate) fn into_value(self) -> ConstValue {
        match self {
            Num::Int(v) => ConstValue::Int(v),
            Num::Long(v) => ConstValue::Long(v),
            Num::Float(v) => ConstValue::Float(v),
            Num::Double(v) => ConstValue::Double(v),
        }
    }

    fn rank(self) -> u8 {
        match self {
            Num::Int(_) => 0,
            Num::Long(_) => 1,
            Num::Float(_) => 2,
            Num::Double(_) => 3,
        }
    }

    fn widen_to(self, rank: u8) -> Num {
        match (self, rank) {
            (n, r) if n.rank() >= r => n,
            (Num::Int(v), 1) => Num::Long(v as i64),
            (Num::Int(v), 2) => Num::Float(v as f32),
            (Num::Long(v), 2) => Num::Float(v as f32),
            (Num::Int(v), _) => Num::Double(v as f64),
            (Num::Long(v), _) => Num::Double(v as f64),
            (Num::Float(v), _) => Num::Double(v as f64),
            (n, _) => n,
        }
    }
}

/// Binary numeric promotion: both operands widened to the wider kind.
pub(crate) fn promote(lhs: Num, rhs: Num) -> (Num, Num) {
    let rank = lhs.rank().max(rhs.rank());
    (lhs.widen_to(rank), rhs.widen_to(rank))
}

impl ConstValue {
    pub fn string(text: impl Into<Arc<str>>) -> Self {
        ConstValue::String(text.into())
    }

    pub fn primitive_type(&self) -> Option<PrimitiveType> {
        let ty = match self {
            ConstValue::Boolean(_) => PrimitiveType::Boolean,
            ConstValue::Byte(_) => PrimitiveType::Byte,
            ConstValue::Short(_) => PrimitiveType::Short,
            ConstValue::Char(_) => PrimitiveType::Char,
            ConstValue::Int(_) => PrimitiveType::Int,
            ConstValue::Long(_) => PrimitiveType::Long,
            ConstValue::Float(_) => PrimitiveType::Float,
            ConstValue::Double(_) => PrimitiveType::Double,
            ConstValue::String(_) => return None,
        };
        Some(ty)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConstValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConstValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Unary numeric promotion; `None` for booleans and strings.
    pub(crate) fn numeric(&self) -> Option<Num> {
        let num = match *self {
            ConstValue::Byte(v) => Num::Int(v as i32),
            ConstValue::Short(v) => Num::Int(v as i32),
            ConstValue::Char(v) => Num::Int(v as i32),
            ConstValue::Int(v) => Num::Int(v),
            ConstValue::Long(v) => Num::Long(v),
            ConstValue::Float(v) => Num::Float(v),
            ConstValue::Double(v) => Num::Double(v),
            ConstValue::Boolean(_) | ConstValue::String(_) => return None,
        };
        Some(num)
    }

    /// Narrowing to `int` as the JVM does it: floats saturate, NaN is zero.
    fn to_i32(&self) -> Option<i32> {
        Some(match self.numeric()? {
            Num::Int(v) => v,
            Num::Long(v) => v as i32,
            Num::Float(v) => v as i32,
            Num::Double(v) => v as i32,
        })
    }

    fn to_i64(&self) -> Option<i64> {
        Some(match self.numeric()? {
            Num::Int(v) => v as i64,
            Num::Long(v) => v,
            Num::Float(v) => v as i64,
            Num::Double(v) => v as i64,
        })
    }

    fn to_f64(&self) -> Option<f64> {
        Some(match self.numeric()? {
            Num::Int(v) => v as f64,
            Num::Long(v) => v as f64,
            Num::Float(v) => v as f64,
            Num::Double(v) => v,
        })
    }

    /// Cast conversion to a primitive type. Booleans only convert to
    /// boolean; strings never convert.
    pub fn cast_to(&self, target: PrimitiveType) -> Option<ConstValue> {
        if let ConstValue::Boolean(b) = self {
            return (target == PrimitiveType::Boolean).then_some(ConstValue::Boolean(*b));
        }
        let value = match target {
            PrimitiveType::Boolean | PrimitiveType::Void => return None,
            // Narrowing from floating point goes through int first.
            PrimitiveType::Byte => ConstValue::Byte(self.to_i32()? as i8),
            PrimitiveType::Short => ConstValue::Short(self.to_i32()? as i16),
            PrimitiveType::Char => ConstValue::Char(self.to_i32()? as u16),
            PrimitiveType::Int => ConstValue::Int(self.to_i32()?),
            PrimitiveType::Long => ConstValue::Long(self.to_i64()?),
            PrimitiveType::Float => match self.numeric()? {
                Num::Int(v) => ConstValue::Float(v as f32),
                Num::Long(v) => ConstValue::Float(v as f32),
                Num::Float(v) => ConstValue::Float(v),
                Num::Double(v) => ConstValue::Float(v as f32),
            },
            PrimitiveType::Double => ConstValue::Double(self.to_f64()?),
        };
        Some(value)
    }

    /// String conversion as used by `+` concatenation.
    pub fn to_java_string(&self) -> String {
        match self {
            ConstValue::Boolean(b) => b.to_string(),
            ConstValue::Byte(v) => v.to_string(),
            ConstValue::Short(v) => v.to_string(),
            ConstValue::Char(c) => String::from_utf16_lossy(&[*c]),
            ConstValue::Int(v) => v.to_string(),
            ConstValue::Long(v) => v.to_string(),
            ConstValue::Float(v) => float_to_java_string(*v as f64, v.to_string(), format!("{v:e}")),
            ConstValue::Double(v) => float_to_java_string(*v, v.to_string(), format!("{v:e}")),
            ConstValue::String(s) => s.to_string(),
        }
    }
}

/// `Double.toString`: plain notation for magnitudes in `[1e-3, 1e7)`,
/// computerized scientific notation otherwise, always with a fraction digit.
fn float_to_java_string(value: f64, plain: String, scientific: String) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }
    let magnitude = value.abs();
    if (1e-3..1e7).contains(&magnitude) {
        if plain.contains('.') {
            plain
        } else {
            format!("{plain}.0")
        }
    } else {
        let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
        if mantissa.contains('.') {
            format!("{mantissa}E{exponent}")
        } else {
            format!("{mantissa}.0E{exponent}")
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::String(s) => write!(f, "{s:?}"),
            ConstValue::Char(_) => write!(f, "'{}'", self.to_java_string()),
            ConstValue::Long(v) => write!(f, "{v}L"),
            ConstValue::Float(_) => write!(f, "{}f", self.to_java_string()),
            _ => f.write_str(&self.to_java_string()),
        }
    }
}

/// Convert an evaluated initializer to the declared type of the entity it
/// initializes. String-typed entities accept only string values.
pub fn compute_cast_to(value: ConstValue, ty: &TypeDescriptor) -> Option<ConstValue> {
    if ty.is_string() {
        return matches!(value, ConstValue::String(_)).then_some(value);
    }
    let target = ty.as_primitive()?;
    if value.primitive_type() == Some(target) {
        return Some(value);
    }
    value.cast_to(target)
}
