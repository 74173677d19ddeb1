// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Product flattening and reconstruction.
//!
//! Nested products, and identifiers aliasing products, are inlined into one
//! ordered sequence of leaves. Two products are compared leaf by leaf, so
//! `((int32, int32), string)` matches `(int32, int32, string)`.
//!
//! The same [`Shape`] drives all three walks ([`flatten_type`],
//! [`flatten_value`], [`raise`]), so they always agree on which members are
//! inlined and which are leaves.

use crate::error::ShapeError;
use crate::types::{TypeId, TypeKind, TypeRegistry};
use crate::value::{ValueData, ValueHeap, ValueId};

/// Inlining decisions for one product type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// A member kept as one leaf.
    Leaf(TypeId),
    /// An inlined product; `tag` is put on tuples rebuilt for it.
    Tuple {
        tag: Option<TypeId>,
        members: Vec<Shape>,
    },
}

impl Shape {
    /// Leaf types in traversal order.
    pub fn leaves(&self) -> Vec<TypeId> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves(&self, out: &mut Vec<TypeId>) {
        match self {
            Shape::Leaf(id) => out.push(*id),
            Shape::Tuple { members, .. } => {
                for member in members {
                    member.collect_leaves(out);
                }
            }
        }
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        match self {
            Shape::Leaf(_) => 1,
            Shape::Tuple { members, .. } => members.iter().map(Shape::leaf_count).sum(),
        }
    }
}

/// Compute the inlining shape of `product`.
///
/// A product already being inlined on the current path is kept as a leaf,
/// which stops self-referential product aliases from expanding forever.
pub fn product_shape<R: TypeRegistry + ?Sized>(
    registry: &R,
    product: TypeId,
) -> Result<Shape, ShapeError> {
    let desc = registry
        .lookup(product)
        .ok_or(ShapeError::UnknownType(product))?;
    if !desc.is_product() {
        return Err(ShapeError::NotAProduct(product));
    }
    let mut inlining = vec![product];
    let members = inline_members(registry, product, &mut inlining)?;
    Ok(Shape::Tuple {
        tag: desc.type_tag,
        members,
    })
}

fn inline_members<R: TypeRegistry + ?Sized>(
    registry: &R,
    product: TypeId,
    inlining: &mut Vec<TypeId>,
) -> Result<Vec<Shape>, ShapeError> {
    let desc = registry
        .lookup(product)
        .ok_or(ShapeError::UnknownType(product))?;
    let members = desc.members().ok_or(ShapeError::NotAProduct(product))?;

    let mut shapes = Vec::with_capacity(members.len());
    for &member in members {
        let member_desc = registry
            .lookup(member)
            .ok_or(ShapeError::UnknownType(member))?;

        // Resolve which product (if any) this member inlines.
        let inlined = match &member_desc.kind {
            TypeKind::Product(_) => Some((member, member_desc.type_tag)),
            TypeKind::Identifier {
                name,
                underlying: Some(target),
            } if !crate::types::is_builtin(name) => {
                let target_desc = registry
                    .lookup(*target)
                    .ok_or(ShapeError::UnknownType(*target))?;
                target_desc
                    .is_product()
                    .then(|| (*target, member_desc.type_tag.or(target_desc.type_tag)))
            }
            _ => None,
        };

        match inlined {
            Some((target, tag)) if !inlining.contains(&target) => {
                inlining.push(target);
                let nested = inline_members(registry, target, inlining);
                inlining.pop();
                shapes.push(Shape::Tuple {
                    tag,
                    members: nested?,
                });
            }
            _ => shapes.push(Shape::Leaf(member)),
        }
    }
    Ok(shapes)
}

/// Flattened leaf types of `product`.
pub fn flatten_type<R: TypeRegistry + ?Sized>(
    registry: &R,
    product: TypeId,
) -> Result<Vec<TypeId>, ShapeError> {
    Ok(product_shape(registry, product)?.leaves())
}

/// Flatten a tuple `value` along `shape`, returning leaf values in order.
pub fn flatten_value(
    heap: &ValueHeap,
    value: ValueId,
    shape: &Shape,
) -> Result<Vec<ValueId>, ShapeError> {
    let mut out = Vec::with_capacity(shape.leaf_count());
    flatten_into(heap, value, shape, &mut out)?;
    Ok(out)
}

fn flatten_into(
    heap: &ValueHeap,
    value: ValueId,
    shape: &Shape,
    out: &mut Vec<ValueId>,
) -> Result<(), ShapeError> {
    match shape {
        Shape::Leaf(_) => out.push(value),
        Shape::Tuple { members, .. } => {
            let items = match heap.data(value) {
                Some(ValueData::Tuple(items)) => items,
                _ => return Err(ShapeError::NotATuple { value }),
            };
            if items.len() != members.len() {
                return Err(ShapeError::TupleArity {
                    value,
                    expected: members.len(),
                    found: items.len(),
                });
            }
            for (item, member) in items.iter().zip(members) {
                flatten_into(heap, *item, member, out)?;
            }
        }
    }
    Ok(())
}

/// Rebuild nested tuples shaped like `shape` from `leaves`.
///
/// Every leaf must be consumed; a count mismatch is a defect in the caller.
pub fn raise(heap: &mut ValueHeap, leaves: Vec<ValueId>, shape: &Shape) -> Result<ValueId, ShapeError> {
    let mut leaves = leaves.into_iter();
    let value = raise_from(heap, &mut leaves, shape)?;
    match leaves.len() {
        0 => Ok(value),
        rest => Err(ShapeError::Leftover(rest)),
    }
}

fn raise_from(
    heap: &mut ValueHeap,
    leaves: &mut std::vec::IntoIter<ValueId>,
    shape: &Shape,
) -> Result<ValueId, ShapeError> {
    match shape {
        Shape::Leaf(_) => leaves.next().ok_or(ShapeError::Exhausted),
        Shape::Tuple { tag, members } => {
            let mut items = Vec::with_capacity(members.len());
            for member in members {
                items.push(raise_from(heap, leaves, member)?);
            }
            Ok(heap.alloc_tagged(ValueData::Tuple(items), *tag))
        }
    }
}
