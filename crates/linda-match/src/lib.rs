// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # linda-match - type matching and value coercion for tuple spaces
//!
//! Decides whether tuples written under one structural type may be read under
//! another, and converts the values when they may.
//!
//! ## Quick Start
//!
//! ```rust
//! use linda_match::types::{HashMapTypeRegistry, TypeDescriptor};
//! use linda_match::value::{Scalar, ValueHeap};
//!
//! let mut registry = HashMapTypeRegistry::new();
//! let int32 = registry.builtin("int32");
//! let point = registry.insert_named(TypeDescriptor::product(vec![int32, int32]));
//! let literal = registry.insert(TypeDescriptor::product(vec![int32, int32]));
//!
//! let coercion = linda_match::build_coercion(&registry, point, literal)
//!     .expect("no fault")
//!     .expect("compatible");
//!
//! let mut heap = ValueHeap::new();
//! let x = heap.scalar(Scalar::I32(3));
//! let y = heap.scalar(Scalar::I32(4));
//! let value = heap.tuple(vec![x, y]);
//!
//! let converted = linda_match::coerce(&coercion, &mut heap, value).expect("coerce");
//! assert_eq!(heap.type_tag(converted), Some(point));
//! ```
//!
//! ## Architecture
//!
//! ```text
//!   TypeRegistry --> Comparator --(pair memo)--> Coercion (plan table)
//!                                                    |
//!   ValueHeap -------------------------------> coerce (value memo + deferred links)
//! ```
//!
//! ## Modules Overview
//!
//! - [`types`] - type descriptors and the registry trait
//! - [`value`] - value graphs
//! - [`flatten`] - product flatten/raise
//! - [`compare`] - the comparator
//! - [`coerce`] - the coercer
//! - [`config`] - comparator configuration

pub mod coerce;
pub mod compare;
pub mod config;
pub mod error;
pub mod flatten;
pub mod types;
pub mod value;

pub use coerce::{coerce, Coercion};
pub use compare::{build_coercion, is_compatible, Comparator, Plan, TypePair};
pub use config::{MatchConfig, TypeCheckMode};
pub use error::{CoerceError, MatchError, ShapeError};
pub use types::{HashMapTypeRegistry, TypeDescriptor, TypeId, TypeKind, TypeRegistry};
pub use value::{Scalar, ValueData, ValueHeap, ValueId};
