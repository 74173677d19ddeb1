// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types.
//!
//! Ordinary incompatibility is never an error: the comparator reports it as
//! `Ok(None)`. The enums below are faults: unimplemented capabilities and
//! broken invariants.

use crate::compare::TypePair;
use crate::types::TypeId;
use crate::value::ValueId;
use thiserror::Error;

/// Product flatten/raise failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("unknown type {0}")]
    UnknownType(TypeId),

    #[error("type {0} is not a product")]
    NotAProduct(TypeId),

    #[error("value {value} is not a tuple")]
    NotATuple { value: ValueId },

    #[error("tuple {value} has {found} members, shape expects {expected}")]
    TupleArity {
        value: ValueId,
        expected: usize,
        found: usize,
    },

    #[error("raise ran out of leaf values")]
    Exhausted,

    #[error("raise left {0} leaf values unconsumed")]
    Leftover(usize),
}

/// Comparator faults.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("not implemented: {0}")]
    Unimplemented(&'static str),

    #[error("unknown type {0}")]
    UnknownType(TypeId),

    #[error("identifier {name} ({id}) has no underlying type")]
    UnresolvedAlias { id: TypeId, name: String },

    #[error("nominal matching needs identifiers, got {0}")]
    NominalRequiresIdentifier(TypeId),

    #[error("comparison of {0} never completed")]
    Invariant(TypePair),

    #[error(transparent)]
    Shape(#[from] ShapeError),
}

/// Coercer faults.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoerceError {
    #[error("no plan for {0}")]
    MissingPlan(TypePair),

    #[error("unknown value {0}")]
    UnknownValue(ValueId),

    #[error("value {value} is not a {expected} value")]
    ValueKindMismatch {
        value: ValueId,
        expected: &'static str,
    },

    #[error("pointer {0} has no target")]
    DanglingPointer(ValueId),

    #[error("value {value} re-entered its own coercion under {pair} outside a pointer")]
    UnguardedCycle { pair: TypePair, value: ValueId },

    #[error("deferred link to {value} under {pair} never resolved")]
    UnresolvedLink { pair: TypePair, value: ValueId },

    #[error(transparent)]
    Shape(#[from] ShapeError),
}
