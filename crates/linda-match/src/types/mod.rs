// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors and the registry they are resolved through.
//!
//! Descriptors refer to each other by [`TypeId`], so a type may refer to
//! itself directly, through aliases, or through pointers:
//!
//! ```rust
//! use linda_match::types::{HashMapTypeRegistry, TypeDescriptor, TypeRegistry};
//!
//! let mut registry = HashMapTypeRegistry::new();
//! let int32 = registry.builtin("int32");
//!
//! // List = (int32, *List)
//! let list = registry.declare();
//! let next = registry.insert(TypeDescriptor::pointer(list));
//! registry.define_named(list, TypeDescriptor::product(vec![int32, next]));
//!
//! assert!(registry.lookup(list).unwrap().is_product());
//! ```

mod descriptor;
mod registry;

pub use descriptor::{is_builtin, TypeDescriptor, TypeId, TypeKind, BUILTIN_TYPE_NAMES};
pub use registry::{HashMapTypeRegistry, TypeRegistry};
