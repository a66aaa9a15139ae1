//! The tagged value domain of the expression evaluator.
//!
//! `Undefined` is produced by unresolved forward references during pass 1 and
//! propagates through every operator and function, so that layout can proceed
//! before all symbols are known.

use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(Vec<u8>),
    List(Vec<Value>),
    Undefined,
}

impl Value {
    pub fn is_defined(&self) -> bool {
        *self != Value::Undefined
    }

    /// Numeric conversion used wherever bytes are emitted: floats truncate
    /// toward zero, strings and lists are rejected, `Undefined` yields `None`.
    pub fn to_int(&self) -> Result<Option<i64>, String> {
        match self {
            Value::Int(v) => Ok(Some(*v)),
            Value::Float(v) => Ok(Some(*v as i64)),
            Value::Undefined => Ok(None),
            Value::Str(_) => Err("expected a number, got a string".to_owned()),
            Value::List(_) => Err("expected a number, got a list".to_owned()),
        }
    }

    pub fn truthy(&self) -> Result<Option<bool>, String> {
        match self {
            Value::Int(v) => Ok(Some(*v != 0)),
            Value::Float(v) => Ok(Some(*v != 0.0)),
            Value::Undefined => Ok(None),
            Value::Str(_) => Err("expected a number, got a string".to_owned()),
            Value::List(_) => Err("expected a number, got a list".to_owned()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Str(bytes) => write!(f, "{}", String::from_utf8_lossy(bytes)),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Undefined => write!(f, "<undefined>"),
        }
    }
}

/// Both operands promoted to a common numeric domain, or `None` when either
/// side is `Undefined`.
enum NumPair {
    Int(i64, i64),
    Float(f64, f64),
}

fn numeric_pair(a: &Value, b: &Value) -> Result<Option<NumPair>, String> {
    match (a, b) {
        (Value::Undefined, _) | (_, Value::Undefined) => Ok(None),
        (Value::Int(x), Value::Int(y)) => Ok(Some(NumPair::Int(*x, *y))),
        (Value::Int(x), Value::Float(y)) => Ok(Some(NumPair::Float(*x as f64, *y))),
        (Value::Float(x), Value::Int(y)) => Ok(Some(NumPair::Float(*x, *y as f64))),
        (Value::Float(x), Value::Float(y)) => Ok(Some(NumPair::Float(*x, *y))),
        _ => Err("operator needs numeric operands".to_owned()),
    }
}

fn int_pair(a: &Value, b: &Value) -> Result<Option<(i64, i64)>, String> {
    match (a, b) {
        (Value::Undefined, _) | (_, Value::Undefined) => Ok(None),
        (Value::Int(x), Value::Int(y)) => Ok(Some((*x, *y))),
        (Value::Float(_), _) | (_, Value::Float(_)) => {
            Err("bitwise operator needs integer operands".to_owned())
        }
        _ => Err("operator needs numeric operands".to_owned()),
    }
}

fn bool_int(b: bool) -> Value {
    Value::Int(b as i64)
}

pub fn add(a: &Value, b: &Value) -> Result<Value, String> {
    Ok(match numeric_pair(a, b)? {
        None => Value::Undefined,
        Some(NumPair::Int(x, y)) => Value::Int(x.wrapping_add(y)),
        Some(NumPair::Float(x, y)) => Value::Float(x + y),
    })
}

pub fn sub(a: &Value, b: &Value) -> Result<Value, String> {
    Ok(match numeric_pair(a, b)? {
        None => Value::Undefined,
        Some(NumPair::Int(x, y)) => Value::Int(x.wrapping_sub(y)),
        Some(NumPair::Float(x, y)) => Value::Float(x - y),
    })
}

pub fn mul(a: &Value, b: &Value) -> Result<Value, String> {
    Ok(match numeric_pair(a, b)? {
        None => Value::Undefined,
        Some(NumPair::Int(x, y)) => Value::Int(x.wrapping_mul(y)),
        Some(NumPair::Float(x, y)) => Value::Float(x * y),
    })
}

/// Integer division truncates toward zero. Division by a known zero is an
/// error; an `Undefined` operand makes the result `Undefined` instead so
/// that pass 1 can lay out around unresolved symbols.
pub fn div(a: &Value, b: &Value) -> Result<Value, String> {
    Ok(match numeric_pair(a, b)? {
        None => Value::Undefined,
        Some(NumPair::Int(_, 0)) => return Err("division by zero".to_owned()),
        Some(NumPair::Int(x, y)) => Value::Int(x.wrapping_div(y)),
        Some(NumPair::Float(x, y)) => {
            if y == 0.0 {
                return Err("division by zero".to_owned());
            }
            Value::Float(x / y)
        }
    })
}

/// Remainder keeps the sign of the dividend (both for integers and floats).
pub fn rem(a: &Value, b: &Value) -> Result<Value, String> {
    Ok(match numeric_pair(a, b)? {
        None => Value::Undefined,
        Some(NumPair::Int(_, 0)) => return Err("division by zero".to_owned()),
        Some(NumPair::Int(x, y)) => Value::Int(x.wrapping_rem(y)),
        Some(NumPair::Float(x, y)) => {
            if y == 0.0 {
                return Err("division by zero".to_owned());
            }
            Value::Float(x % y)
        }
    })
}

/// Exponentiation always yields a float.
pub fn pow(a: &Value, b: &Value) -> Result<Value, String> {
    Ok(match numeric_pair(a, b)? {
        None => Value::Undefined,
        Some(NumPair::Int(x, y)) => Value::Float((x as f64).powf(y as f64)),
        Some(NumPair::Float(x, y)) => Value::Float(x.powf(y)),
    })
}

pub fn shl(a: &Value, b: &Value) -> Result<Value, String> {
    Ok(match int_pair(a, b)? {
        None => Value::Undefined,
        Some((x, y)) => {
            if y < 0 || y > 63 {
                return Err("shift amount out of range".to_owned());
            }
            Value::Int(x.wrapping_shl(y as u32))
        }
    })
}

pub fn shr(a: &Value, b: &Value) -> Result<Value, String> {
    Ok(match int_pair(a, b)? {
        None => Value::Undefined,
        Some((x, y)) => {
            if y < 0 || y > 63 {
                return Err("shift amount out of range".to_owned());
            }
            Value::Int(x.wrapping_shr(y as u32))
        }
    })
}

pub fn bit_and(a: &Value, b: &Value) -> Result<Value, String> {
    Ok(match int_pair(a, b)? {
        None => Value::Undefined,
        Some((x, y)) => Value::Int(x & y),
    })
}

pub fn bit_or(a: &Value, b: &Value) -> Result<Value, String> {
    Ok(match int_pair(a, b)? {
        None => Value::Undefined,
        Some((x, y)) => Value::Int(x | y),
    })
}

pub fn bit_xor(a: &Value, b: &Value) -> Result<Value, String> {
    Ok(match int_pair(a, b)? {
        None => Value::Undefined,
        Some((x, y)) => Value::Int(x ^ y),
    })
}

/// `&&` and `||` are arithmetic on truthiness; like ACME, both sides are
/// always evaluated.
pub fn log_and(a: &Value, b: &Value) -> Result<Value, String> {
    match (a.truthy()?, b.truthy()?) {
        (Some(x), Some(y)) => Ok(bool_int(x && y)),
        _ => Ok(Value::Undefined),
    }
}

pub fn log_or(a: &Value, b: &Value) -> Result<Value, String> {
    match (a.truthy()?, b.truthy()?) {
        (Some(x), Some(y)) => Ok(bool_int(x || y)),
        _ => Ok(Value::Undefined),
    }
}

pub fn cmp_eq(a: &Value, b: &Value) -> Result<Value, String> {
    if !a.is_defined() || !b.is_defined() {
        return Ok(Value::Undefined);
    }
    match (a, b) {
        (Value::Str(x), Value::Str(y)) => Ok(bool_int(x == y)),
        (Value::List(x), Value::List(y)) => Ok(bool_int(x == y)),
        _ => Ok(match numeric_pair(a, b)? {
            None => Value::Undefined,
            Some(NumPair::Int(x, y)) => bool_int(x == y),
            Some(NumPair::Float(x, y)) => bool_int(x == y),
        }),
    }
}

pub fn cmp_ne(a: &Value, b: &Value) -> Result<Value, String> {
    match cmp_eq(a, b)? {
        Value::Int(v) => Ok(bool_int(v == 0)),
        other => Ok(other),
    }
}

fn ordering(a: &Value, b: &Value) -> Result<Option<std::cmp::Ordering>, String> {
    Ok(match numeric_pair(a, b)? {
        None => None,
        Some(NumPair::Int(x, y)) => Some(x.cmp(&y)),
        Some(NumPair::Float(x, y)) => x.partial_cmp(&y),
    })
}

pub fn cmp_lt(a: &Value, b: &Value) -> Result<Value, String> {
    Ok(match ordering(a, b)? {
        None => Value::Undefined,
        Some(ord) => bool_int(ord == std::cmp::Ordering::Less),
    })
}

pub fn cmp_le(a: &Value, b: &Value) -> Result<Value, String> {
    Ok(match ordering(a, b)? {
        None => Value::Undefined,
        Some(ord) => bool_int(ord != std::cmp::Ordering::Greater),
    })
}

pub fn cmp_gt(a: &Value, b: &Value) -> Result<Value, String> {
    Ok(match ordering(a, b)? {
        None => Value::Undefined,
        Some(ord) => bool_int(ord == std::cmp::Ordering::Greater),
    })
}

pub fn cmp_ge(a: &Value, b: &Value) -> Result<Value, String> {
    Ok(match ordering(a, b)? {
        None => Value::Undefined,
        Some(ord) => bool_int(ord != std::cmp::Ordering::Less),
    })
}

pub fn neg(v: &Value) -> Result<Value, String> {
    match v {
        Value::Int(x) => Ok(Value::Int(x.wrapping_neg())),
        Value::Float(x) => Ok(Value::Float(-x)),
        Value::Undefined => Ok(Value::Undefined),
        _ => Err("unary minus needs a numeric operand".to_owned()),
    }
}

pub fn pos(v: &Value) -> Result<Value, String> {
    match v {
        Value::Int(_) | Value::Float(_) | Value::Undefined => Ok(v.clone()),
        _ => Err("unary plus needs a numeric operand".to_owned()),
    }
}

pub fn log_not(v: &Value) -> Result<Value, String> {
    match v.truthy()? {
        None => Ok(Value::Undefined),
        Some(b) => Ok(bool_int(!b)),
    }
}

pub fn bit_not(v: &Value) -> Result<Value, String> {
    match v {
        Value::Int(x) => Ok(Value::Int(!x)),
        Value::Undefined => Ok(Value::Undefined),
        Value::Float(_) => Err("bitwise operator needs integer operands".to_owned()),
        _ => Err("operator needs numeric operands".to_owned()),
    }
}

/// Unary `<`: low byte. Floats truncate toward zero first.
pub fn lo_byte(v: &Value) -> Result<Value, String> {
    match v.to_int()? {
        None => Ok(Value::Undefined),
        Some(x) => Ok(Value::Int(x & 0xff)),
    }
}

/// Unary `>`: high byte of the 16-bit value.
pub fn hi_byte(v: &Value) -> Result<Value, String> {
    match v.to_int()? {
        None => Ok(Value::Undefined),
        Some(x) => Ok(Value::Int((x >> 8) & 0xff)),
    }
}

/// The built-in function set. All functions propagate `Undefined`.
pub fn call_function(name: &str, arg: &Value) -> Result<Value, String> {
    if !arg.is_defined() {
        return Ok(Value::Undefined);
    }
    let float_arg = |unit_range: bool| -> Result<f64, String> {
        let x = match arg {
            Value::Int(v) => *v as f64,
            Value::Float(v) => *v,
            _ => return Err(format!("{}() needs a numeric argument", name)),
        };
        if unit_range && (x < -1.0 || x > 1.0) {
            return Err(format!("{}() argument out of range", name));
        }
        Ok(x)
    };
    match name {
        "sin" => Ok(Value::Float(float_arg(false)?.sin())),
        "cos" => Ok(Value::Float(float_arg(false)?.cos())),
        "tan" => Ok(Value::Float(float_arg(false)?.tan())),
        "arcsin" => Ok(Value::Float(float_arg(true)?.asin())),
        "arccos" => Ok(Value::Float(float_arg(true)?.acos())),
        "arctan" => Ok(Value::Float(float_arg(false)?.atan())),
        "int" => match arg {
            Value::Int(v) => Ok(Value::Int(*v)),
            Value::Float(v) => Ok(Value::Int(*v as i64)),
            _ => Err("int() needs a numeric argument".to_owned()),
        },
        "float" => match arg {
            Value::Int(v) => Ok(Value::Float(*v as f64)),
            Value::Float(v) => Ok(Value::Float(*v)),
            _ => Err("float() needs a numeric argument".to_owned()),
        },
        "is_number" => Ok(bool_int(matches!(arg, Value::Int(_) | Value::Float(_)))),
        "is_list" => Ok(bool_int(matches!(arg, Value::List(_)))),
        "is_string" => Ok(bool_int(matches!(arg, Value::Str(_)))),
        "len" => match arg {
            Value::Str(bytes) => Ok(Value::Int(bytes.len() as i64)),
            Value::List(items) => Ok(Value::Int(items.len() as i64)),
            _ => Err("len() needs a string or list argument".to_owned()),
        },
        _ => Err(format!("unknown function {}()", name)),
    }
}
