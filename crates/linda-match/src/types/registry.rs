// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use crate::types::{TypeDescriptor, TypeId};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// TypeRegistry trait + HashMap implementation
// ---------------------------------------------------------------------------

/// Read-only view of the shared type registry.
///
/// The comparator and the coercer resolve every [`TypeId`] through this
/// trait; lookups must be side-effect free for the duration of a comparison.
pub trait TypeRegistry {
    /// Look up a descriptor by id.
    ///
    /// Returns `None` if the id is unknown or only declared.
    fn lookup(&self, id: TypeId) -> Option<&TypeDescriptor>;
}

impl<R: TypeRegistry + ?Sized> TypeRegistry for &R {
    fn lookup(&self, id: TypeId) -> Option<&TypeDescriptor> {
        (**self).lookup(id)
    }
}

/// Simple [`HashMap`]-backed [`TypeRegistry`].
///
/// Recursive types are built in two steps: [`declare`](Self::declare) an id,
/// refer to it from other descriptors, then [`define`](Self::define) it.
#[derive(Debug, Default)]
pub struct HashMapTypeRegistry {
    types: HashMap<TypeId, TypeDescriptor>,
    builtins: HashMap<String, TypeId>,
    next_id: u32,
}

impl HashMapTypeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve an id without a definition.
    pub fn declare(&mut self) -> TypeId {
        let id = TypeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Attach (or replace) the definition of `id`.
    pub fn define(&mut self, id: TypeId, descriptor: TypeDescriptor) {
        self.types.insert(id, descriptor);
    }

    /// Register an anonymous descriptor.
    pub fn insert(&mut self, descriptor: TypeDescriptor) -> TypeId {
        let id = self.declare();
        self.define(id, descriptor);
        id
    }

    /// Register a named descriptor; its `type_tag` becomes its own id.
    pub fn insert_named(&mut self, descriptor: TypeDescriptor) -> TypeId {
        let id = self.declare();
        self.define(id, descriptor.with_tag(id));
        id
    }

    /// Define a previously declared id as a named descriptor.
    pub fn define_named(&mut self, id: TypeId, descriptor: TypeDescriptor) {
        self.define(id, descriptor.with_tag(id));
    }

    /// Interned builtin identifier, tagged with its own id.
    ///
    /// Accepts any name; callers are expected to pass one of
    /// [`BUILTIN_TYPE_NAMES`](crate::types::BUILTIN_TYPE_NAMES).
    pub fn builtin(&mut self, name: &str) -> TypeId {
        if let Some(id) = self.builtins.get(name) {
            return *id;
        }
        let id = self.insert_named(TypeDescriptor::builtin(name));
        self.builtins.insert(name.to_string(), id);
        id
    }

    /// Number of defined types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if no types are defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeRegistry for HashMapTypeRegistry {
    fn lookup(&self, id: TypeId) -> Option<&TypeDescriptor> {
        self.types.get(&id)
    }
}
