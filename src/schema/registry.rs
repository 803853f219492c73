//! Type registry
//!
//! Named types of one build pass. Scalars are registered on reset, record
//! kinds and inferred objects as they are built. Lists are memoized under
//! their bracketed name so `[Post]` is built once per pass.

use super::types::{Field, ObjectType, ScalarKind, TypeNode, TypeRef};
use crate::config::{DeclaredTypeRef, DeclaredTypes};
use crate::error::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::trace;

/// Registry of named types, reset at the start of every build pass
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: BTreeMap<String, TypeRef>,
    /// Names handed out, with the number of times each base was requested
    reserved: BTreeMap<String, usize>,
    declared: DeclaredTypes,
    kinds: BTreeSet<String>,
    /// Declared types being built, to catch self references
    resolving: BTreeSet<String>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        let mut registry = Self::default();
        registry.reset(DeclaredTypes::new());
        registry
    }

    /// Drop every type and start over with the built-in scalars
    pub fn reset(&mut self, declared: DeclaredTypes) {
        self.types.clear();
        self.reserved.clear();
        self.kinds.clear();
        self.resolving.clear();

        for kind in ScalarKind::ALL {
            self.register_type(kind.name(), TypeNode::Scalar(kind));
            self.reserve(kind.name());
        }
        for name in declared.keys() {
            self.reserve(name);
        }
        self.declared = declared;
    }

    /// Set the record kinds of the current pass; their names are reserved
    pub fn set_kinds<I, K>(&mut self, kinds: I)
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        for kind in kinds {
            let kind = kind.into();
            self.reserve(&kind);
            self.kinds.insert(kind);
        }
    }

    /// Check if `name` is a record kind of the current pass
    pub fn is_kind(&self, name: &str) -> bool {
        self.kinds.contains(name)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.kinds.iter().map(String::as_str)
    }

    /// Register a type; a later registration under the same name wins
    pub fn register_type(&mut self, name: impl Into<String>, node: TypeNode) -> TypeRef {
        let name = name.into();
        trace!(name = %name, "registering type");
        let ty = Arc::new(node);
        self.types.insert(name, Arc::clone(&ty));
        ty
    }

    pub fn get_type(&self, name: &str) -> Option<TypeRef> {
        self.types.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Built-in scalar type
    pub fn scalar(&self, kind: ScalarKind) -> TypeRef {
        self.get_type(kind.name())
            .unwrap_or_else(|| Arc::new(TypeNode::Scalar(kind)))
    }

    /// Link to the type of a record kind
    pub fn link(&self, kind: impl Into<String>) -> TypeRef {
        Arc::new(TypeNode::Link(kind.into()))
    }

    /// List of `item`, memoized by name
    pub fn wrap_in_list(&mut self, item: &TypeRef) -> TypeRef {
        let name = format!("[{}]", item.name());
        if let Some(existing) = self.types.get(&name) {
            return Arc::clone(existing);
        }
        self.register_type(name, TypeNode::List(Arc::clone(item)))
    }

    /// Mark a name as taken
    pub fn reserve(&mut self, name: &str) {
        self.reserved.entry(name.to_string()).or_insert(1);
    }

    /// Hand out a type name not used yet in this pass: `base`, then `base_2`...
    pub fn create_type_name(&mut self, base: &str) -> String {
        let mut count = self.reserved.get(base).copied().unwrap_or(0);
        loop {
            count += 1;
            let candidate = if count == 1 {
                base.to_string()
            } else {
                format!("{base}_{count}")
            };
            if count > 1 && self.reserved.contains_key(&candidate) {
                continue;
            }

            self.reserved.insert(base.to_string(), count);
            if count > 1 {
                self.reserved.insert(candidate.clone(), 1);
            }
            return candidate;
        }
    }

    /// Resolve a declared type reference.
    ///
    /// Record kinds resolve to links, scalars and already built types to
    /// themselves, and declared object types are built on first use.
    pub fn resolve_declared(&mut self, declared: &DeclaredTypeRef) -> Result<TypeRef> {
        let name = match declared {
            DeclaredTypeRef::List(inner) => {
                let item = self.resolve_declared(inner)?;
                return Ok(self.wrap_in_list(&item));
            }
            DeclaredTypeRef::Named(name) => name,
        };

        if self.kinds.contains(name) {
            return Ok(self.link(name.clone()));
        }
        if let Some(existing) = self.types.get(name) {
            return Ok(Arc::clone(existing));
        }

        let Some(fields) = self.declared.get(name).cloned() else {
            return Err(Error::UnknownDeclaredType { name: name.clone() });
        };
        if !self.resolving.insert(name.clone()) {
            return Err(Error::RecursiveDeclaredType { name: name.clone() });
        }

        let built = self.build_declared_fields(&fields);
        self.resolving.remove(name);

        let object = ObjectType {
            name: name.clone(),
            fields: built?,
        };
        Ok(self.register_type(name.clone(), TypeNode::Object(object)))
    }

    fn build_declared_fields(
        &mut self,
        fields: &BTreeMap<String, DeclaredTypeRef>,
    ) -> Result<BTreeMap<String, Field>> {
        let mut built = BTreeMap::new();
        for (field_name, field_ref) in fields {
            let ty = self.resolve_declared(field_ref)?;
            built.insert(
                super::heuristics::create_key(field_name),
                Field::declared(field_name, ty),
            );
        }
        Ok(built)
    }

    /// Copy of every registered type
    pub fn snapshot(&self) -> BTreeMap<String, TypeRef> {
        self.types.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_registers_scalars() {
        let registry = TypeRegistry::new();
        for name in ["String", "Int", "Float", "Boolean", "Date"] {
            assert!(registry.contains(name), "{name} missing");
        }
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn test_wrap_in_list_is_memoized() {
        let mut registry = TypeRegistry::new();
        let string = registry.scalar(ScalarKind::String);
        let a = registry.wrap_in_list(&string);
        let b = registry.wrap_in_list(&string);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.name(), "[String]");
    }

    #[test]
    fn test_later_registration_wins() {
        let mut registry = TypeRegistry::new();
        registry.register_type("Thing", TypeNode::Object(ObjectType::new("Thing")));
        let mut second = ObjectType::new("Thing");
        second.fields.insert(
            "a".to_string(),
            Field::declared("a", registry.scalar(ScalarKind::Int)),
        );
        registry.register_type("Thing", TypeNode::Object(second));

        let thing = registry.get_type("Thing").unwrap();
        assert_eq!(thing.as_object().unwrap().field_names(), vec!["a"]);
    }

    #[test]
    fn test_create_type_name_suffixes() {
        let mut registry = TypeRegistry::new();
        registry.set_kinds(["Post"]);
        assert_eq!(registry.create_type_name("PostAuthor"), "PostAuthor");
        assert_eq!(registry.create_type_name("PostAuthor"), "PostAuthor_2");
        assert_eq!(registry.create_type_name("Post"), "Post_2");
        assert_eq!(registry.create_type_name("String"), "String_2");
    }

    #[test]
    fn test_resolve_declared_types() {
        let mut declared = DeclaredTypes::new();
        declared.entry("Author".to_string()).or_default().insert(
            "name".to_string(),
            DeclaredTypeRef::named("String"),
        );
        let mut registry = TypeRegistry::new();
        registry.reset(declared);
        registry.set_kinds(["Post"]);

        let ty = registry
            .resolve_declared(&"[Author]".parse().unwrap())
            .unwrap();
        assert_eq!(ty.name(), "[Author]");
        assert!(registry.get_type("Author").unwrap().as_object().is_some());

        let link = registry.resolve_declared(&DeclaredTypeRef::named("Post")).unwrap();
        assert_eq!(*link, TypeNode::Link("Post".to_string()));

        let err = registry
            .resolve_declared(&DeclaredTypeRef::named("Nope"))
            .unwrap_err();
        assert!(matches!(err, Error::UnknownDeclaredType { .. }));
    }

    #[test]
    fn test_recursive_declared_type() {
        let mut declared = DeclaredTypes::new();
        declared.entry("Node".to_string()).or_default().insert(
            "next".to_string(),
            DeclaredTypeRef::named("Node"),
        );
        let mut registry = TypeRegistry::new();
        registry.reset(declared);

        let err = registry
            .resolve_declared(&DeclaredTypeRef::named("Node"))
            .unwrap_err();
        assert!(matches!(err, Error::RecursiveDeclaredType { .. }));
    }
}
