//! Source-level types: a closed family with structural comparison, base
//! projection, stable base identifiers, and zero-value production.

use std::fmt;

use num_bigint::BigInt;

use crate::diag::UnboundDiag;
use crate::ir;
use crate::sem::value::{ConstInt, Typed};

/// Width class of an integer type. `Word` matches the target pointer size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntKind {
    W8,
    W16,
    W32,
    W64,
    Word,
}

/// A source-level type. Equality is structural; an alias is equal only to
/// an alias with the same identifier and an equal referent.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Int {
        kind: IntKind,
        signed: bool,
    },
    Pointer(Box<Type>),
    Func {
        params: Vec<Type>,
        result: Option<Box<Type>>,
    },
    Alias {
        ident: String,
        referent: Box<Type>,
    },
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int { kind, signed } => {
                let name = match (kind, signed) {
                    (IntKind::W8, true) => "int8",
                    (IntKind::W16, true) => "int16",
                    (IntKind::W32, true) => "int32",
                    (IntKind::W64, true) => "int64",
                    (IntKind::Word, true) => "int",
                    (IntKind::W8, false) => "uint8",
                    (IntKind::W16, false) => "uint16",
                    (IntKind::W32, false) => "uint32",
                    (IntKind::W64, false) => "uint64",
                    (IntKind::Word, false) => "uint",
                };
                f.write_str(name)
            }
            Type::Pointer(at) => write!(f, "*{at}"),
            Type::Func { params, result } => {
                write!(f, "func (")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, ")")?;
                if let Some(r) = result {
                    write!(f, " {r}")?;
                }
                Ok(())
            }
            Type::Alias { ident, .. } => f.write_str(ident),
        }
    }
}

impl Type {
    pub fn int(kind: IntKind, signed: bool) -> Self {
        Type::Int { kind, signed }
    }

    /// The number of bits this type's values occupy, for integer types.
    pub fn bit_width(&self, word: u32) -> u32 {
        match self {
            Type::Int { kind, .. } => match kind {
                IntKind::W8 => 8,
                IntKind::W16 => 16,
                IntKind::W32 => 32,
                IntKind::W64 => 64,
                IntKind::Word => word,
            },
            Type::Alias { referent, .. } => referent.bit_width(word),
            _ => word,
        }
    }

    /// Project into the IR builder's type language. A function without a
    /// result becomes a void function type.
    pub fn ir_ty(&self, word: u32) -> ir::Ty {
        match self {
            Type::Int { .. } => ir::Ty::Int(self.bit_width(word)),
            Type::Pointer(at) => ir::Ty::Ptr(Box::new(at.ir_ty(word))),
            Type::Func { params, result } => ir::Ty::Func {
                params: params.iter().map(|p| p.ir_ty(word)).collect(),
                ret: Box::new(
                    result
                        .as_ref()
                        .map(|r| r.ir_ty(word))
                        .unwrap_or(ir::Ty::Void),
                ),
            },
            Type::Alias { referent, .. } => referent.ir_ty(word),
        }
    }

    /// Strip aliases recursively; compounds are rebuilt around the base of
    /// each constituent.
    pub fn base(&self) -> Type {
        match self {
            Type::Int { .. } => self.clone(),
            Type::Pointer(at) => Type::Pointer(Box::new(at.base())),
            Type::Func { params, result } => Type::Func {
                params: params.iter().map(|p| p.base()).collect(),
                result: result.as_ref().map(|r| Box::new(r.base())),
            },
            Type::Alias { referent, .. } => referent.base(),
        }
    }

    /// Stable textual tag used to derive unique names for anonymous globals.
    pub fn base_id(&self) -> String {
        match self {
            Type::Int { .. } => self.to_string(),
            Type::Pointer(at) => format!("p.{}", at.base_id()),
            Type::Func { params, result } => {
                let mut s = String::from("f.r.");
                if let Some(r) = result {
                    s.push_str(&r.base_id());
                    s.push('.');
                }
                s.push('p');
                for p in params {
                    s.push('.');
                    s.push_str(&p.base_id());
                }
                s
            }
            Type::Alias { .. } => self.base().base_id(),
        }
    }

    /// Named types are nominally distinct from their referents.
    pub fn is_named(&self) -> bool {
        match self {
            Type::Int { .. } | Type::Func { .. } => false,
            Type::Pointer(at) => at.is_named(),
            Type::Alias { .. } => true,
        }
    }

    /// The zero value of this type. Integers zero to a typed constant zero;
    /// pointers and functions zero to a typed null; aliases delegate to
    /// their referent.
    pub fn zero(&self, word: u32) -> Typed {
        match self {
            Type::Int { .. } => Typed::ConstInt {
                value: ConstInt {
                    int: BigInt::from(0),
                    signed: true,
                },
                ty: self.clone(),
            },
            Type::Pointer(_) | Type::Func { .. } => Typed::Raw {
                ty: self.clone(),
                ir: ir::Value::Null(self.ir_ty(word)),
            },
            Type::Alias { referent, .. } => referent.zero(word),
        }
    }
}

/// Whether a value of type `a` may initialize or be assigned to a location
/// of type `b`: the types are structurally equal, or their bases are and
/// neither is a named type.
pub fn assignable(a: &Type, b: &Type) -> bool {
    if a == b {
        return true;
    }
    a.base() == b.base() && !a.is_named() && !b.is_named()
}

/// The type of string literals: `*uint8`.
pub fn string_type() -> Type {
    Type::Pointer(Box::new(Type::int(IntKind::W8, false)))
}

pub fn type_mismatch(expected: &Type, actual: &Type) -> UnboundDiag {
    UnboundDiag(format!(
        "Expected type {expected} but got type {actual}"
    ))
}
