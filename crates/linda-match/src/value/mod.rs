// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Value graphs.
//!
//! Values live in a [`ValueHeap`] and are addressed by [`ValueId`]. Identity
//! matters: a value referenced from two places is one node, and coercion
//! preserves that sharing.

mod heap;

pub use heap::{Scalar, ValueData, ValueHeap, ValueId, ValueNode};
