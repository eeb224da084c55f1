//! Lexical environments: a tree of scopes addressed by index, each mapping
//! identifiers to types and to variable bindings.
//!
//! Insertion checks the whole parent chain, so at most one binding exists
//! for an identifier across the chain at definition time.

use std::collections::HashMap;

use crate::diag::UnboundDiag;
use crate::sem::types::Type;
use crate::sem::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId(usize);

/// A named slot holding an untyped-or-typed value.
#[derive(Debug, Clone)]
pub struct Binding {
    pub ident: String,
    pub konst: bool,
    pub value: Value,
}

#[derive(Debug, Clone, Default)]
struct ScopeData {
    types: HashMap<String, Type>,
    vars: HashMap<String, BindingId>,
    parent: Option<ScopeId>,
}

/// Arena owning every scope and binding of a translation.
#[derive(Debug, Clone, Default)]
pub struct Scopes {
    scopes: Vec<ScopeData>,
    bindings: Vec<Binding>,
}

impl Scopes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scope with no parent.
    pub fn root(&mut self) -> ScopeId {
        self.scopes.push(ScopeData::default());
        ScopeId(self.scopes.len() - 1)
    }

    /// Create an empty scope whose parent is `parent`.
    pub fn child(&mut self, parent: ScopeId) -> ScopeId {
        self.scopes.push(ScopeData {
            parent: Some(parent),
            ..ScopeData::default()
        });
        ScopeId(self.scopes.len() - 1)
    }

    pub fn binding(&self, id: BindingId) -> &Binding {
        &self.bindings[id.0]
    }

    pub fn binding_mut(&mut self, id: BindingId) -> &mut Binding {
        &mut self.bindings[id.0]
    }

    /// Walk parent links; the first hit wins.
    pub fn lookup_type(&self, scope: ScopeId, ident: &str) -> Option<&Type> {
        let mut cur = Some(scope);
        while let Some(id) = cur {
            let data = &self.scopes[id.0];
            if let Some(ty) = data.types.get(ident) {
                return Some(ty);
            }
            cur = data.parent;
        }
        None
    }

    pub fn lookup_var(&self, scope: ScopeId, ident: &str) -> Option<BindingId> {
        let mut cur = Some(scope);
        while let Some(id) = cur {
            let data = &self.scopes[id.0];
            if let Some(b) = data.vars.get(ident) {
                return Some(*b);
            }
            cur = data.parent;
        }
        None
    }

    /// Add a type iff `ident` is not already bound to a type visible from
    /// `scope`. Returns `true` on success.
    pub fn add_type(&mut self, scope: ScopeId, ident: &str, ty: Type) -> bool {
        if self.lookup_type(scope, ident).is_some() {
            return false;
        }
        self.scopes[scope.0].types.insert(ident.to_string(), ty);
        true
    }

    /// Resolve `rhs` and install `lhs` as an alias for it in `scope`.
    /// Requiring the referent to exist first keeps alias chains acyclic.
    pub fn add_alias(&mut self, scope: ScopeId, lhs: &str, rhs: &str) -> Result<(), UnboundDiag> {
        let referent = self
            .lookup_type(scope, rhs)
            .cloned()
            .ok_or_else(|| UnboundDiag(format!("Type \"{rhs}\" not found.")))?;
        let alias = Type::Alias {
            ident: lhs.to_string(),
            referent: Box::new(referent),
        };
        if !self.add_type(scope, lhs, alias) {
            return Err(UnboundDiag(format!("Type \"{lhs}\" already exists.")));
        }
        Ok(())
    }

    /// Bind `ident` to a fresh binding holding `value`, unless a variable
    /// with this identifier is visible from `scope`.
    pub fn add_value(
        &mut self,
        scope: ScopeId,
        ident: &str,
        konst: bool,
        value: Value,
    ) -> Option<BindingId> {
        if self.lookup_var(scope, ident).is_some() {
            return None;
        }
        self.bindings.push(Binding {
            ident: ident.to_string(),
            konst,
            value,
        });
        let id = BindingId(self.bindings.len() - 1);
        self.scopes[scope.0].vars.insert(ident.to_string(), id);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sem::types::{IntKind, Type};
    use crate::sem::value::{parse_int, Value};

    fn int64() -> Type {
        Type::int(IntKind::W64, true)
    }

    fn one() -> Value {
        Value::Int(parse_int("1").unwrap())
    }

    #[test]
    fn lookup_walks_parents() {
        let mut scopes = Scopes::new();
        let root = scopes.root();
        let child = scopes.child(root);
        assert!(scopes.add_type(root, "int64", int64()));
        assert_eq!(scopes.lookup_type(child, "int64"), Some(&int64()));
        assert!(scopes.lookup_type(child, "missing").is_none());
    }

    #[test]
    fn insertion_rejects_visible_duplicates() {
        let mut scopes = Scopes::new();
        let root = scopes.root();
        let child = scopes.child(root);
        assert!(scopes.add_type(root, "int64", int64()));
        assert!(!scopes.add_type(child, "int64", int64()));
        assert!(scopes.add_value(root, "x", false, one()).is_some());
        assert!(scopes.add_value(child, "x", false, one()).is_none());
    }

    #[test]
    fn child_binding_shadows_later_parent_binding() {
        let mut scopes = Scopes::new();
        let root = scopes.root();
        let child = scopes.child(root);
        let inner = scopes.add_value(child, "x", false, one()).unwrap();
        // The parent may gain the name afterwards; the child still sees its own.
        let outer = scopes.add_value(root, "x", false, one()).unwrap();
        assert_eq!(scopes.lookup_var(child, "x"), Some(inner));
        assert_eq!(scopes.lookup_var(root, "x"), Some(outer));
    }

    #[test]
    fn sibling_scopes_are_invisible() {
        let mut scopes = Scopes::new();
        let root = scopes.root();
        let a = scopes.child(root);
        let b = scopes.child(root);
        scopes.add_value(a, "x", false, one()).unwrap();
        assert!(scopes.lookup_var(b, "x").is_none());
        assert!(scopes.lookup_var(root, "x").is_none());
    }

    #[test]
    fn alias_requires_existing_referent() {
        let mut scopes = Scopes::new();
        let root = scopes.root();
        let err = scopes.add_alias(root, "byte", "uint8").unwrap_err();
        assert_eq!(err.0, "Type \"uint8\" not found.");

        scopes.add_type(root, "uint8", Type::int(IntKind::W8, false));
        scopes.add_alias(root, "byte", "uint8").unwrap();
        let ty = scopes.lookup_type(root, "byte").unwrap();
        assert!(matches!(ty, Type::Alias { ident, .. } if ident == "byte"));

        let err = scopes.add_alias(root, "byte", "uint8").unwrap_err();
        assert_eq!(err.0, "Type \"byte\" already exists.");
    }
}
