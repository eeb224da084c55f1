//! The two-level value model: polymorphic constants that have not committed
//! to a type yet, and typed values carrying a handle into the IR module.

use std::fmt;

use num_bigint::BigInt;

use crate::diag::UnboundDiag;
use crate::ir;
use crate::sem::scope::{BindingId, Scopes};
use crate::sem::types::{string_type, type_mismatch, IntKind, Type};

/// An integer constant whose type is not fixed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstInt {
    pub int: BigInt,
    pub signed: bool,
}

impl ConstInt {
    /// Commit to `expected`, or default to `int` when no expectation exists.
    /// Only integer types can receive an integer constant.
    pub fn rvalue(&self, expected: Option<&Type>) -> Result<Typed, UnboundDiag> {
        let ty = match expected {
            None => Type::int(IntKind::Word, true),
            Some(ty @ Type::Int { .. }) => ty.clone(),
            Some(other) => {
                return Err(UnboundDiag(format!(
                    "Expected type {other} but got integer constant"
                )))
            }
        };
        Ok(Typed::ConstInt {
            value: self.clone(),
            ty,
        })
    }
}

impl fmt::Display for ConstInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.int)
    }
}

/// Parse an integer literal. Base selection: a leading `0` means octal, a
/// leading `0x`/`0X` means hex, anything else is decimal.
pub fn parse_int(lit: &str) -> Option<ConstInt> {
    let b = lit.as_bytes();
    if b.is_empty() {
        return None;
    }
    let int = if b.len() == 1 {
        BigInt::parse_bytes(b, 10)
    } else if b.len() == 2 {
        if b[0] == b'0' {
            BigInt::parse_bytes(&b[1..], 8)
        } else {
            BigInt::parse_bytes(b, 10)
        }
    } else if b[0] == b'0' {
        if b[1] == b'x' || b[1] == b'X' {
            BigInt::parse_bytes(&b[2..], 16)
        } else {
            BigInt::parse_bytes(&b[1..], 8)
        }
    } else {
        BigInt::parse_bytes(b, 10)
    }?;
    Some(ConstInt { int, signed: true })
}

/// A function symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncValue {
    pub name: String,
    pub ty: Type,
    pub ir: ir::Value,
}

/// A value with a committed type and an IR projection.
#[derive(Debug, Clone, PartialEq)]
pub enum Typed {
    /// A committed integer constant.
    ConstInt { value: ConstInt, ty: Type },
    /// A string literal: the bytes and the backing byte-array global.
    /// Its IR projection is a pointer to the global's first element.
    Str { bytes: Vec<u8>, global: ir::GlobalId },
    Func(FuncValue),
    /// A committed IR value of known type: null pointers, call results.
    Raw { ty: Type, ir: ir::Value },
}

impl Typed {
    pub fn ty(&self) -> Type {
        match self {
            Typed::ConstInt { ty, .. } => ty.clone(),
            Typed::Str { .. } => string_type(),
            Typed::Func(f) => f.ty.clone(),
            Typed::Raw { ty, .. } => ty.clone(),
        }
    }

    /// A typed value refuses coercion to any unequal type.
    pub fn rvalue(&self, expected: Option<&Type>) -> Result<Typed, UnboundDiag> {
        match expected {
            None => Ok(self.clone()),
            Some(e) if *e == self.ty() => Ok(self.clone()),
            Some(e) => Err(type_mismatch(e, &self.ty())),
        }
    }

    pub fn ir_value(&self, word: u32) -> ir::Value {
        match self {
            Typed::ConstInt { value, ty } => ir::Value::ConstInt {
                ty: ty.ir_ty(word),
                value: value.int.clone(),
            },
            Typed::Str { global, .. } => ir::Value::GepFirst(*global),
            Typed::Func(f) => f.ir.clone(),
            Typed::Raw { ir, .. } => ir.clone(),
        }
    }
}

impl fmt::Display for Typed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Typed::ConstInt { value, .. } => write!(f, "{value}"),
            Typed::Str { bytes, .. } => {
                write!(f, "\"{}\"", String::from_utf8_lossy(bytes))
            }
            Typed::Func(fv) => write!(f, "{} {}", fv.name, fv.ty),
            Typed::Raw { ty, .. } => write!(f, "<{ty} value>"),
        }
    }
}

/// What a binding holds: a still-polymorphic constant or a committed value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(ConstInt),
    Typed(Typed),
}

impl Value {
    pub fn rvalue(&self, expected: Option<&Type>) -> Result<Typed, UnboundDiag> {
        match self {
            Value::Int(c) => c.rvalue(expected),
            Value::Typed(t) => t.rvalue(expected),
        }
    }

    /// The committed type, or `None` while the value is still polymorphic.
    pub fn committed_ty(&self) -> Option<Type> {
        match self {
            Value::Int(_) => None,
            Value::Typed(t) => Some(t.ty()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(c) => write!(f, "{c}"),
            Value::Typed(t) => write!(f, "{t}"),
        }
    }
}

/// The result of translating an expression: either a variable reference or
/// an immediate value. Only non-const variable references are lvalues.
#[derive(Debug, Clone)]
pub enum Operand {
    Var(BindingId),
    Val(Value),
}

impl Operand {
    pub fn rvalue(&self, scopes: &Scopes, expected: Option<&Type>) -> Result<Typed, UnboundDiag> {
        match self {
            Operand::Var(id) => scopes.binding(*id).value.rvalue(expected),
            Operand::Val(v) => v.rvalue(expected),
        }
    }

    pub fn is_lvalue(&self, scopes: &Scopes) -> bool {
        match self {
            Operand::Var(id) => !scopes.binding(*id).konst,
            Operand::Val(_) => false,
        }
    }

    pub fn committed_ty(&self, scopes: &Scopes) -> Option<Type> {
        match self {
            Operand::Var(id) => scopes.binding(*id).value.committed_ty(),
            Operand::Val(v) => v.committed_ty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sem::types::IntKind;

    fn int64() -> Type {
        Type::int(IntKind::W64, true)
    }

    #[test]
    fn literal_round_trip_all_bases() {
        let cases = [
            ("0", 0i64),
            ("7", 7),
            ("05", 5),
            ("12", 12),
            ("255", 255),
            ("017", 15),
            ("0777", 511),
            ("0x10", 16),
            ("0XfF", 255),
            ("0x0", 0),
        ];
        for (lit, want) in cases {
            let parsed = parse_int(lit).unwrap_or_else(|| panic!("failed to parse {lit}"));
            assert!(parsed.signed);
            let typed = parsed.rvalue(Some(&int64())).unwrap();
            let Typed::ConstInt { value, ty } = typed else {
                panic!("expected committed constant")
            };
            assert_eq!(value.int, BigInt::from(want), "literal {lit}");
            assert_eq!(ty, int64());
        }
    }

    #[test]
    fn bad_literals_fail() {
        assert!(parse_int("").is_none());
        assert!(parse_int("09").is_none()); // 9 is not an octal digit
        assert!(parse_int("0x").is_none());
    }

    #[test]
    fn untyped_constant_defaults_to_int() {
        let c = parse_int("5").unwrap();
        let typed = c.rvalue(None).unwrap();
        assert_eq!(typed.ty(), Type::int(IntKind::Word, true));
    }

    #[test]
    fn untyped_constant_refuses_non_integer_types() {
        let c = parse_int("5").unwrap();
        let err = c.rvalue(Some(&string_type())).unwrap_err();
        assert_eq!(
            err.0,
            "Expected type *uint8 but got integer constant"
        );
    }

    #[test]
    fn committed_constant_refuses_other_types() {
        let c = parse_int("5").unwrap();
        let typed = c.rvalue(Some(&int64())).unwrap();
        assert!(typed.rvalue(None).is_ok());
        assert!(typed.rvalue(Some(&int64())).is_ok());
        let int32 = Type::int(IntKind::W32, true);
        let err = typed.rvalue(Some(&int32)).unwrap_err();
        assert_eq!(err.0, "Expected type int32 but got type int64");
    }

    #[test]
    fn big_literals_survive() {
        let c = parse_int("0xffffffffffffffffffff").unwrap();
        assert!(c.int > BigInt::from(u64::MAX));
    }
}
