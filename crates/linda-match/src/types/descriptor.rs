// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Structural type descriptors.

use std::fmt;

/// Builtin primitive type names, recognised without a registry lookup.
///
/// Builtins never alias another type.
pub const BUILTIN_TYPE_NAMES: [&str; 13] = [
    "type",
    "bool",
    "int8",
    "int16",
    "int32",
    "int64",
    "uint8",
    "uint16",
    "uint32",
    "uint64",
    "ieeesingle",
    "ieeedouble",
    "string",
];

/// Returns `true` if `name` is one of the [`BUILTIN_TYPE_NAMES`].
pub fn is_builtin(name: &str) -> bool {
    BUILTIN_TYPE_NAMES.contains(&name)
}

/// Identity of a type descriptor inside a registry.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeId(pub u32);

impl TypeId {
    /// Raw numeric id.
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Shape of a type descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeKind {
    /// The unit/nil type.
    Nil,
    /// A named type: either a builtin primitive (`underlying` is `None`)
    /// or a user alias resolving to `underlying`.
    Identifier {
        name: String,
        underlying: Option<TypeId>,
    },
    /// Ordered aggregate. Members are not pre-flattened.
    Product(Vec<TypeId>),
    /// Tagged union.
    Sum(Vec<TypeId>),
    /// Reference to another type.
    Pointer(TypeId),
    /// Function from `argument` to `result`.
    Function { argument: TypeId, result: TypeId },
}

/// A type descriptor as stored in a [`TypeRegistry`](crate::types::TypeRegistry).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeDescriptor {
    /// Type shape.
    pub kind: TypeKind,
    /// Tag attached to values successfully coerced to this type.
    pub type_tag: Option<TypeId>,
}

impl TypeDescriptor {
    /// Create an untagged descriptor.
    pub fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            type_tag: None,
        }
    }

    /// The nil type.
    pub fn nil() -> Self {
        Self::new(TypeKind::Nil)
    }

    /// A builtin identifier. Use [`HashMapTypeRegistry::builtin`](crate::types::HashMapTypeRegistry::builtin)
    /// to get an interned, tagged one.
    pub fn builtin(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Identifier {
            name: name.into(),
            underlying: None,
        })
    }

    /// A user alias `name = target`.
    pub fn alias(name: impl Into<String>, target: TypeId) -> Self {
        Self::new(TypeKind::Identifier {
            name: name.into(),
            underlying: Some(target),
        })
    }

    /// A product of `members`, in order.
    pub fn product(members: Vec<TypeId>) -> Self {
        Self::new(TypeKind::Product(members))
    }

    /// A sum of `variants`.
    pub fn sum(variants: Vec<TypeId>) -> Self {
        Self::new(TypeKind::Sum(variants))
    }

    /// A pointer to `pointee`.
    pub fn pointer(pointee: TypeId) -> Self {
        Self::new(TypeKind::Pointer(pointee))
    }

    /// A function type.
    pub fn function(argument: TypeId, result: TypeId) -> Self {
        Self::new(TypeKind::Function { argument, result })
    }

    /// Set the type tag.
    pub fn with_tag(mut self, tag: TypeId) -> Self {
        self.type_tag = Some(tag);
        self
    }

    pub fn is_nil(&self) -> bool {
        matches!(self.kind, TypeKind::Nil)
    }

    pub fn is_identifier(&self) -> bool {
        matches!(self.kind, TypeKind::Identifier { .. })
    }

    pub fn is_product(&self) -> bool {
        matches!(self.kind, TypeKind::Product(_))
    }

    pub fn is_sum(&self) -> bool {
        matches!(self.kind, TypeKind::Sum(_))
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self.kind, TypeKind::Pointer(_))
    }

    pub fn is_function(&self) -> bool {
        matches!(self.kind, TypeKind::Function { .. })
    }

    /// Identifier name, if this is an identifier.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            TypeKind::Identifier { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Returns `true` for builtin identifiers.
    pub fn is_builtin(&self) -> bool {
        self.name().is_some_and(is_builtin)
    }

    /// Alias target of a non-builtin identifier.
    pub fn underlying(&self) -> Option<TypeId> {
        match &self.kind {
            TypeKind::Identifier { underlying, .. } => *underlying,
            _ => None,
        }
    }

    /// Product members.
    pub fn members(&self) -> Option<&[TypeId]> {
        match &self.kind {
            TypeKind::Product(members) => Some(members),
            _ => None,
        }
    }

    /// Pointer target.
    pub fn pointee(&self) -> Option<TypeId> {
        match self.kind {
            TypeKind::Pointer(pointee) => Some(pointee),
            _ => None,
        }
    }

    /// Short kind label for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            TypeKind::Nil => "nil",
            TypeKind::Identifier { .. } => "identifier",
            TypeKind::Product(_) => "product",
            TypeKind::Sum(_) => "sum",
            TypeKind::Pointer(_) => "pointer",
            TypeKind::Function { .. } => "function",
        }
    }
}
