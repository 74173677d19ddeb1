// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Arena of value nodes.

use crate::types::TypeId;
use std::collections::HashSet;
use std::fmt;

/// Identity of a value inside a [`ValueHeap`].
///
/// Two occurrences of the same `ValueId` in a graph are the same value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueId(pub usize);

impl ValueId {
    /// Position of the node in its heap.
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Leaf payload of identifier-typed values.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Scalar {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    /// Value of the `type` builtin.
    Type(TypeId),
    /// Handle the runtime does not look into (function references, blobs).
    Opaque(Vec<u8>),
}

/// Payload of a value node.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueData {
    /// The nil value; also the null pointer.
    Nil,
    Scalar(Scalar),
    Tuple(Vec<ValueId>),
    /// A live pointer. `None` only while a link is pending.
    Pointer(Option<ValueId>),
}

/// A value with its (mutable) type tag.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueNode {
    pub data: ValueData,
    pub type_tag: Option<TypeId>,
}

/// Owner of a value graph.
///
/// Values are never freed individually; cyclic graphs are expressed through
/// pointer nodes holding [`ValueId`]s.
#[derive(Debug, Default, Clone)]
pub struct ValueHeap {
    nodes: Vec<ValueNode>,
}

impl ValueHeap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an untagged node.
    pub fn alloc(&mut self, data: ValueData) -> ValueId {
        self.alloc_tagged(data, None)
    }

    /// Allocate a node with a tag.
    pub fn alloc_tagged(&mut self, data: ValueData, type_tag: Option<TypeId>) -> ValueId {
        let id = ValueId(self.nodes.len());
        self.nodes.push(ValueNode { data, type_tag });
        id
    }

    pub fn nil(&mut self) -> ValueId {
        self.alloc(ValueData::Nil)
    }

    pub fn scalar(&mut self, scalar: Scalar) -> ValueId {
        self.alloc(ValueData::Scalar(scalar))
    }

    pub fn tuple(&mut self, members: Vec<ValueId>) -> ValueId {
        self.alloc(ValueData::Tuple(members))
    }

    pub fn pointer(&mut self, target: ValueId) -> ValueId {
        self.alloc(ValueData::Pointer(Some(target)))
    }

    /// Allocate a pointer whose target is linked later with [`set_pointee`](Self::set_pointee).
    pub fn pointer_cell(&mut self) -> ValueId {
        self.alloc(ValueData::Pointer(None))
    }

    pub fn get(&self, id: ValueId) -> Option<&ValueNode> {
        self.nodes.get(id.index())
    }

    pub fn data(&self, id: ValueId) -> Option<&ValueData> {
        self.get(id).map(|node| &node.data)
    }

    pub fn type_tag(&self, id: ValueId) -> Option<TypeId> {
        self.get(id).and_then(|node| node.type_tag)
    }

    /// Overwrite the tag of `id`. Returns `false` if `id` is unknown.
    pub fn set_type_tag(&mut self, id: ValueId, tag: Option<TypeId>) -> bool {
        match self.nodes.get_mut(id.index()) {
            Some(node) => {
                node.type_tag = tag;
                true
            }
            None => false,
        }
    }

    /// Link pointer `cell` to `target`. Returns `false` if `cell` is not a pointer.
    pub fn set_pointee(&mut self, cell: ValueId, target: ValueId) -> bool {
        match self.nodes.get_mut(cell.index()) {
            Some(ValueNode {
                data: ValueData::Pointer(slot),
                ..
            }) => {
                *slot = Some(target);
                true
            }
            _ => false,
        }
    }

    /// Allocate a copy of `id` carrying `tag`; members and pointee are shared.
    ///
    /// Returns `None` if `id` is unknown.
    pub fn retagged_copy(&mut self, id: ValueId, tag: Option<TypeId>) -> Option<ValueId> {
        let data = self.data(id)?.clone();
        Some(self.alloc_tagged(data, tag))
    }

    /// Target of a linked pointer.
    pub fn pointee(&self, id: ValueId) -> Option<ValueId> {
        match self.data(id)? {
            ValueData::Pointer(target) => *target,
            _ => None,
        }
    }

    /// Members of a tuple.
    pub fn members(&self, id: ValueId) -> Option<&[ValueId]> {
        match self.data(id)? {
            ValueData::Tuple(members) => Some(members),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Structural equivalence of two (possibly cyclic) graphs, ignoring tags.
    ///
    /// Pairs already under comparison are assumed equal, so two cycles of
    /// different length through the same shape still compare equal.
    pub fn equivalent(&self, a: ValueId, b: ValueId) -> bool {
        let mut assumed = HashSet::new();
        self.equivalent_in(a, b, &mut assumed)
    }

    fn equivalent_in(
        &self,
        a: ValueId,
        b: ValueId,
        assumed: &mut HashSet<(ValueId, ValueId)>,
    ) -> bool {
        if a == b || !assumed.insert((a, b)) {
            return true;
        }
        let (Some(left), Some(right)) = (self.data(a), self.data(b)) else {
            return false;
        };
        match (left, right) {
            (ValueData::Nil, ValueData::Nil) => true,
            (ValueData::Scalar(x), ValueData::Scalar(y)) => x == y,
            (ValueData::Tuple(xs), ValueData::Tuple(ys)) => {
                xs.len() == ys.len()
                    && xs
                        .iter()
                        .zip(ys)
                        .all(|(x, y)| self.equivalent_in(*x, *y, assumed))
            }
            (ValueData::Pointer(Some(x)), ValueData::Pointer(Some(y))) => {
                self.equivalent_in(*x, *y, assumed)
            }
            (ValueData::Pointer(None), ValueData::Pointer(None)) => true,
            _ => false,
        }
    }
}
