// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Value coercer.
//!
//! Runs a [`Coercion`] over a value graph that may share substructure and
//! contain cycles through pointers.
//!
//! Each `coerce` call owns two structures:
//!
//! - `memo`: `(pair, value) -> result`, with an in-progress slot inserted
//!   before the plan for that value runs. Shared values are converted once
//!   and the result is reused.
//! - `waiting`: pointer cells whose target was still in progress when the
//!   pointer was converted. They are linked as soon as that target completes,
//!   and whatever is left is drained before the outermost call returns.
//!
//! A converted pointer cell is recorded in `memo` as soon as it is
//! allocated, before its target is converted, so a cycle that re-enters the
//! same pointer finds the cell instead of an in-progress slot.

use crate::compare::{Plan, TypePair};
use crate::error::{CoerceError, ShapeError};
use crate::flatten::{flatten_value, product_shape, raise};
use crate::types::{TypeId, TypeRegistry};
use crate::value::{ValueData, ValueHeap, ValueId};
use std::collections::HashMap;
use std::fmt;

/// Executable result of a successful comparison.
///
/// Holds the plan of every type pair reached while comparing, keyed by pair,
/// and the registry the product shapes are recomputed from.
pub struct Coercion<'r, R: TypeRegistry + ?Sized> {
    registry: &'r R,
    root: TypePair,
    plans: HashMap<TypePair, Plan>,
}

impl<'r, R: TypeRegistry + ?Sized> Coercion<'r, R> {
    pub(crate) fn new(registry: &'r R, root: TypePair, plans: HashMap<TypePair, Plan>) -> Self {
        Self {
            registry,
            root,
            plans,
        }
    }

    /// Pair this coercion was built for.
    pub fn root(&self) -> TypePair {
        self.root
    }

    /// Target type of the root pair.
    pub fn target(&self) -> TypeId {
        self.root.target
    }

    /// Plan stored for `pair`.
    pub fn plan(&self, pair: TypePair) -> Option<&Plan> {
        self.plans.get(&pair)
    }

    /// Number of stored plans.
    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    /// Coerce `value` (of the root source type) into the root target type.
    ///
    /// New nodes are allocated in `heap`; the source graph is left in place.
    /// The returned graph has every pointer linked.
    pub fn coerce(&self, heap: &mut ValueHeap, value: ValueId) -> Result<ValueId, CoerceError> {
        if heap.get(value).is_none() {
            return Err(CoerceError::UnknownValue(value));
        }
        let mut coercer = Coercer {
            coercion: self,
            memo: HashMap::new(),
            waiting: HashMap::new(),
        };
        coercer.run(heap, value)
    }
}

impl<R: TypeRegistry + ?Sized> fmt::Debug for Coercion<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coercion")
            .field("root", &self.root)
            .field("plans", &self.plans)
            .finish()
    }
}

/// Apply `coercion` to `value`.
pub fn coerce<R: TypeRegistry + ?Sized>(
    coercion: &Coercion<'_, R>,
    heap: &mut ValueHeap,
    value: ValueId,
) -> Result<ValueId, CoerceError> {
    coercion.coerce(heap, value)
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    InProgress,
    Done(ValueId),
}

enum Resolved {
    Ready(ValueId),
    /// The value is mid-conversion further up the stack.
    Pending,
}

type MemoKey = (TypePair, ValueId);

struct Coercer<'c, 'r, R: TypeRegistry + ?Sized> {
    coercion: &'c Coercion<'r, R>,
    memo: HashMap<MemoKey, Slot>,
    waiting: HashMap<MemoKey, Vec<ValueId>>,
}

impl<R: TypeRegistry + ?Sized> Coercer<'_, '_, R> {
    fn run(&mut self, heap: &mut ValueHeap, value: ValueId) -> Result<ValueId, CoerceError> {
        let root = self.coercion.root;
        let result = self.require(heap, root, value)?;

        while let Some(key) = self.waiting.keys().next().copied() {
            let cells = self.waiting.remove(&key).unwrap_or_default();
            let (pair, target) = key;
            log::trace!(
                "[coerce] draining {} deferred link(s) to {} under {}",
                cells.len(),
                target,
                pair
            );
            match self.resolve(heap, pair, target)? {
                Resolved::Ready(linked) => link(heap, &cells, linked)?,
                Resolved::Pending => {
                    return Err(CoerceError::UnresolvedLink {
                        pair,
                        value: target,
                    })
                }
            }
        }
        Ok(result)
    }

    fn resolve(
        &mut self,
        heap: &mut ValueHeap,
        pair: TypePair,
        value: ValueId,
    ) -> Result<Resolved, CoerceError> {
        let key = (pair, value);
        match self.memo.get(&key) {
            Some(Slot::Done(result)) => return Ok(Resolved::Ready(*result)),
            Some(Slot::InProgress) => return Ok(Resolved::Pending),
            None => {}
        }
        self.memo.insert(key, Slot::InProgress);

        let coercion = self.coercion;
        let plan = coercion
            .plans
            .get(&pair)
            .ok_or(CoerceError::MissingPlan(pair))?;
        let result = self.apply(heap, plan, pair, value)?;

        self.memo.insert(key, Slot::Done(result));
        if let Some(cells) = self.waiting.remove(&key) {
            log::trace!(
                "[coerce] {} under {} done, linking {} pointer(s)",
                value,
                pair,
                cells.len()
            );
            link(heap, &cells, result)?;
        }
        Ok(Resolved::Ready(result))
    }

    /// Resolve a value that must be available now (not through a pointer).
    fn require(
        &mut self,
        heap: &mut ValueHeap,
        pair: TypePair,
        value: ValueId,
    ) -> Result<ValueId, CoerceError> {
        match self.resolve(heap, pair, value)? {
            Resolved::Ready(result) => Ok(result),
            Resolved::Pending => Err(CoerceError::UnguardedCycle { pair, value }),
        }
    }

    fn apply(
        &mut self,
        heap: &mut ValueHeap,
        plan: &Plan,
        pair: TypePair,
        value: ValueId,
    ) -> Result<ValueId, CoerceError> {
        match plan {
            Plan::Identity => Ok(value),

            Plan::Retag { tag } | Plan::Function { tag, .. } => {
                let scalar = match heap.data(value) {
                    Some(ValueData::Scalar(scalar)) => scalar.clone(),
                    Some(_) => {
                        return Err(CoerceError::ValueKindMismatch {
                            value,
                            expected: "scalar",
                        })
                    }
                    None => return Err(CoerceError::UnknownValue(value)),
                };
                Ok(heap.alloc_tagged(ValueData::Scalar(scalar), *tag))
            }

            Plan::Alias { underlying, tag } => {
                let result = self.require(heap, *underlying, value)?;
                if tag.is_none() {
                    return Ok(result);
                }
                // A pending cell is patched through its id; a copy would never be linked.
                if matches!(heap.data(result), Some(ValueData::Pointer(None))) {
                    heap.set_type_tag(result, *tag);
                    return Ok(result);
                }
                // The underlying result may also be reached through the
                // underlying type, so it keeps its own tag.
                heap.retagged_copy(result, *tag).ok_or(CoerceError::UnknownValue(result))
            }

            Plan::Product {
                target,
                source,
                leaves,
            } => {
                let registry = self.coercion.registry;
                let source_shape = product_shape(registry, *source)?;
                let items = flatten_value(heap, value, &source_shape)?;
                if items.len() != leaves.len() {
                    return Err(CoerceError::Shape(ShapeError::TupleArity {
                        value,
                        expected: leaves.len(),
                        found: items.len(),
                    }));
                }

                let mut converted = Vec::with_capacity(items.len());
                for (leaf, item) in leaves.iter().zip(items) {
                    converted.push(self.require(heap, *leaf, item)?);
                }

                let target_shape = product_shape(registry, *target)?;
                Ok(raise(heap, converted, &target_shape)?)
            }

            Plan::Pointer { pointee, tag } => {
                let target = match heap.data(value) {
                    Some(ValueData::Nil) => return Ok(value),
                    Some(ValueData::Pointer(Some(target))) => *target,
                    Some(ValueData::Pointer(None)) => return Err(CoerceError::DanglingPointer(value)),
                    Some(_) => {
                        return Err(CoerceError::ValueKindMismatch {
                            value,
                            expected: "pointer",
                        })
                    }
                    None => return Err(CoerceError::UnknownValue(value)),
                };

                let cell = heap.alloc_tagged(ValueData::Pointer(None), *tag);
                self.memo.insert((pair, value), Slot::Done(cell));

                match self.resolve(heap, *pointee, target)? {
                    Resolved::Ready(result) => link(heap, &[cell], result)?,
                    Resolved::Pending => {
                        log::trace!(
                            "[coerce] {} under {} in progress, deferring link of {}",
                            target,
                            pointee,
                            cell
                        );
                        self.waiting
                            .entry((*pointee, target))
                            .or_default()
                            .push(cell);
                    }
                }
                Ok(cell)
            }
        }
    }
}

fn link(heap: &mut ValueHeap, cells: &[ValueId], target: ValueId) -> Result<(), CoerceError> {
    for &cell in cells {
        if !heap.set_pointee(cell, target) {
            return Err(CoerceError::ValueKindMismatch {
                value: cell,
                expected: "pointer",
            });
        }
    }
    Ok(())
}
