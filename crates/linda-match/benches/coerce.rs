// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Matching and coercion benchmarks.
//!
//! - comparison of two structurally identical recursive list types
//! - coercion of long linked lists, acyclic and closed into a ring
//! - coercion of a wide flat tuple into a nested product

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::missing_panics_doc)]

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use linda_match::types::{HashMapTypeRegistry, TypeDescriptor, TypeId};
use linda_match::value::{Scalar, ValueHeap, ValueId};
use linda_match::{build_coercion, Comparator};

/// `List = (int32, *List)`, declared twice.
fn list_types() -> (HashMapTypeRegistry, TypeId, TypeId) {
    let mut registry = HashMapTypeRegistry::new();
    let int32 = registry.builtin("int32");
    let mut declare = || {
        let list = registry.declare();
        let next = registry.insert(TypeDescriptor::pointer(list));
        registry.define_named(list, TypeDescriptor::product(vec![int32, next]));
        list
    };
    let target = declare();
    let source = declare();
    (registry, target, source)
}

/// Linked list of `len` nodes; closed into a ring when `ring` is set.
fn build_list(len: usize, ring: bool) -> (ValueHeap, ValueId) {
    let mut heap = ValueHeap::new();
    let back = heap.pointer_cell();
    let mut next = if ring { back } else { heap.nil() };
    let mut first = None;
    for i in (0..len).rev() {
        let head = heap.scalar(Scalar::I32(i as i32));
        let node = heap.tuple(vec![head, next]);
        next = heap.pointer(node);
        first = Some(node);
    }
    let first = first.expect("non-empty list");
    if ring {
        heap.set_pointee(back, first);
    }
    (heap, first)
}

fn bench_compare_recursive(c: &mut Criterion) {
    let (registry, target, source) = list_types();
    c.bench_function("compare_recursive_list", |b| {
        let comparator = Comparator::new(&registry);
        b.iter(|| {
            let coercion = comparator
                .build_coercion(black_box(target), black_box(source))
                .expect("no fault");
            black_box(coercion.is_some())
        })
    });
}

fn bench_coerce_list(c: &mut Criterion) {
    let (registry, target, source) = list_types();
    let coercion = build_coercion(&registry, target, source)
        .expect("no fault")
        .expect("compatible");

    let mut group = c.benchmark_group("coerce_list");
    for len in [16usize, 256, 1024] {
        for ring in [false, true] {
            let label = if ring { "ring" } else { "chain" };
            group.bench_with_input(BenchmarkId::new(label, len), &len, |b, &len| {
                b.iter_batched(
                    || build_list(len, ring),
                    |(mut heap, head)| {
                        let result = coercion.coerce(&mut heap, head).expect("coerce");
                        black_box(result)
                    },
                    BatchSize::LargeInput,
                )
            });
        }
    }
    group.finish();
}

fn bench_coerce_wide_tuple(c: &mut Criterion) {
    // Point = (int32, int32); Segment = (Point, Point) against 4 flat int32s.
    let mut registry = HashMapTypeRegistry::new();
    let int32 = registry.builtin("int32");
    let point = registry.insert_named(TypeDescriptor::product(vec![int32, int32]));
    let segment = registry.insert_named(TypeDescriptor::product(vec![point, point]));
    let flat = registry.insert(TypeDescriptor::product(vec![int32; 4]));
    let coercion = build_coercion(&registry, segment, flat)
        .expect("no fault")
        .expect("compatible");

    let mut heap = ValueHeap::new();
    let items = (0..4).map(|i| heap.scalar(Scalar::I32(i))).collect();
    let value = heap.tuple(items);

    c.bench_function("coerce_flat_to_nested", |b| {
        b.iter_batched(
            || heap.clone(),
            |mut heap| black_box(coercion.coerce(&mut heap, black_box(value)).expect("coerce")),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(compare_benches, bench_compare_recursive);
criterion_group!(coerce_benches, bench_coerce_list, bench_coerce_wide_tuple);
criterion_main!(compare_benches, coerce_benches);
