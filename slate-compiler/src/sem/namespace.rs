//! Per-module registry minting unique names for anonymous globals and
//! memoizing zero-value globals, keyed by stable base identifiers.

use std::collections::HashMap;

use crate::ir;
use crate::sem::value::Typed;

#[derive(Debug, Clone, Default)]
pub struct IrNamespace {
    counters: HashMap<String, u32>,
    zeros: HashMap<String, ir::GlobalId>,
}

impl IrNamespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a constant module global named `<base_id>.<n>`, where `n`
    /// counts up per base identifier.
    pub fn alloc_static_const(
        &mut self,
        module: &mut ir::Module,
        base_id: &str,
        ty: ir::Ty,
        init: ir::Value,
    ) -> ir::GlobalId {
        let counter = self.counters.entry(base_id.to_string()).or_insert(0);
        let name = format!("{base_id}.{counter}");
        *counter += 1;
        module.add_global_const(name, ty, init)
    }

    /// The module global holding the zero value of `zero`'s type, named
    /// `<base_id>.zero`. Created on first request, memoized after.
    pub fn zero_global(
        &mut self,
        module: &mut ir::Module,
        zero: &Typed,
        word: u32,
    ) -> ir::GlobalId {
        let base_id = zero.ty().base_id();
        if let Some(existing) = self.zeros.get(&base_id) {
            return *existing;
        }
        let name = format!("{base_id}.zero");
        let id = module.add_global_const(name, zero.ty().ir_ty(word), zero.ir_value(word));
        self.zeros.insert(base_id, id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sem::types::{IntKind, Type};

    #[test]
    fn minting_is_a_deterministic_sequence_per_base() {
        let mut module = ir::Module::new("m");
        let mut ns = IrNamespace::new();
        let arr = ir::Ty::Array {
            elem: Box::new(ir::Ty::Int(8)),
            len: 2,
        };
        let a = ns.alloc_static_const(
            &mut module,
            "p.uint8",
            arr.clone(),
            ir::Value::Bytes(b"a\0".to_vec()),
        );
        let b = ns.alloc_static_const(
            &mut module,
            "p.uint8",
            arr.clone(),
            ir::Value::Bytes(b"b\0".to_vec()),
        );
        let c = ns.alloc_static_const(
            &mut module,
            "int64",
            ir::Ty::Int(64),
            ir::Value::ConstInt {
                ty: ir::Ty::Int(64),
                value: 0.into(),
            },
        );
        assert_eq!(module.global(a).name, "p.uint8.0");
        assert_eq!(module.global(b).name, "p.uint8.1");
        assert_eq!(module.global(c).name, "int64.0");
    }

    #[test]
    fn zero_globals_are_idempotent() {
        let mut module = ir::Module::new("m");
        let mut ns = IrNamespace::new();
        let zero = Type::int(IntKind::W64, true).zero(64);
        let first = ns.zero_global(&mut module, &zero, 64);
        let second = ns.zero_global(&mut module, &zero, 64);
        assert_eq!(first, second);
        assert_eq!(module.global(first).name, "int64.zero");
        assert_eq!(module.globals().count(), 1);
    }
}
