// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type comparator.
//!
//! Decides whether values of a *source* type can be reinterpreted as values
//! of a *target* type and, if so, builds the [`Plan`] table that performs the
//! reshaping.
//!
//! # Recursion
//!
//! Every [`TypePair`] is recorded in a pair memo before its substructure is
//! compared. Meeting the same pair again (a type that reaches itself through
//! aliases or pointers) is assumed compatible instead of recursing. Plans name
//! their sub-coercions by pair, so at run time the coercer looks up whatever
//! plan ended up stored for that pair.
//!
//! Because a forwarded pair is optimistically assumed compatible, a failure
//! discovered later can be masked by a plan already built above it. After the
//! outermost comparison the whole memo is scanned, and any incompatible entry
//! makes the entire comparison incompatible.

use crate::coerce::Coercion;
use crate::config::{MatchConfig, TypeCheckMode};
use crate::error::MatchError;
use crate::flatten::flatten_type;
use crate::types::{is_builtin, TypeDescriptor, TypeId, TypeKind, TypeRegistry};
use std::collections::HashMap;
use std::fmt;

/// A (target, source) pair of types.
///
/// The plan stored for a pair converts source-typed values into
/// target-typed values.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypePair {
    pub target: TypeId,
    pub source: TypeId,
}

impl TypePair {
    pub const fn new(target: TypeId, source: TypeId) -> Self {
        Self { target, source }
    }
}

impl fmt::Debug for TypePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} <- {})", self.target, self.source)
    }
}

impl fmt::Display for TypePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} <- {})", self.target, self.source)
    }
}

/// How to turn a source value into a target value.
///
/// Sub-coercions are referenced by [`TypePair`] and resolved through the
/// plan table at run time, so plans may refer to themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Return the value unchanged.
    Identity,
    /// Copy a leaf value and tag it.
    Retag { tag: Option<TypeId> },
    /// Coerce through the alias targets, then retag (if `tag` is set).
    Alias {
        underlying: TypePair,
        tag: Option<TypeId>,
    },
    /// Flatten per `source`, coerce each leaf, raise per `target`.
    Product {
        target: TypeId,
        source: TypeId,
        leaves: Vec<TypePair>,
    },
    /// Nil stays nil; otherwise coerce the pointee and wrap it.
    Pointer {
        pointee: TypePair,
        tag: Option<TypeId>,
    },
    /// Function values are opaque handles: both sides must be compatible,
    /// the handle itself is copied and tagged.
    Function {
        argument: TypePair,
        result: TypePair,
        tag: Option<TypeId>,
    },
}

#[derive(Debug)]
enum Checked {
    InProgress,
    Compatible(Plan),
    Incompatible,
}

/// Pair memo, scoped to one top-level comparison.
type PairMemo = HashMap<TypePair, Checked>;

const SUM_UNIMPLEMENTED: &str = "sum type comparison";

/// Builds coercions between types of one registry.
pub struct Comparator<'r, R: TypeRegistry + ?Sized> {
    registry: &'r R,
    config: MatchConfig,
}

impl<'r, R: TypeRegistry + ?Sized> Comparator<'r, R> {
    /// Structural comparator.
    pub fn new(registry: &'r R) -> Self {
        Self::with_config(registry, MatchConfig::default())
    }

    pub fn with_config(registry: &'r R, config: MatchConfig) -> Self {
        Self { registry, config }
    }

    /// `true` if values of `source` can be coerced to `target`.
    pub fn is_compatible(&self, target: TypeId, source: TypeId) -> Result<bool, MatchError> {
        Ok(self.build_coercion(target, source)?.is_some())
    }

    /// Build the coercion from `source` to `target`.
    ///
    /// Returns `Ok(None)` when the types are incompatible. Errors are
    /// reserved for sum types and registry/invariant faults.
    pub fn build_coercion(
        &self,
        target: TypeId,
        source: TypeId,
    ) -> Result<Option<Coercion<'r, R>>, MatchError> {
        let root = TypePair::new(target, source);
        match self.config.mode {
            TypeCheckMode::Structural => self.build_structural(root),
            TypeCheckMode::Nominal => self.build_nominal(root),
        }
    }

    fn build_structural(&self, root: TypePair) -> Result<Option<Coercion<'r, R>>, MatchError> {
        let mut checked = PairMemo::new();
        if !self.compare(root, &mut checked)? {
            return Ok(None);
        }

        let mut plans = HashMap::with_capacity(checked.len());
        for (pair, entry) in checked {
            match entry {
                Checked::Compatible(plan) => {
                    plans.insert(pair, plan);
                }
                Checked::Incompatible => {
                    log::debug!(
                        "[compare] {} incompatible: nested pair {} failed after being forwarded",
                        root,
                        pair
                    );
                    return Ok(None);
                }
                Checked::InProgress => return Err(MatchError::Invariant(pair)),
            }
        }

        log::debug!("[compare] {} compatible ({} plans)", root, plans.len());
        Ok(Some(Coercion::new(self.registry, root, plans)))
    }

    fn build_nominal(&self, root: TypePair) -> Result<Option<Coercion<'r, R>>, MatchError> {
        let target = self.lookup(root.target)?;
        let source = self.lookup(root.source)?;
        let target_name = target
            .name()
            .ok_or(MatchError::NominalRequiresIdentifier(root.target))?;
        let source_name = source
            .name()
            .ok_or(MatchError::NominalRequiresIdentifier(root.source))?;

        if target_name != source_name {
            log::debug!(
                "[compare] {} nominal mismatch: {} vs {}",
                root,
                target_name,
                source_name
            );
            return Ok(None);
        }
        let plans = HashMap::from([(root, Plan::Identity)]);
        Ok(Some(Coercion::new(self.registry, root, plans)))
    }

    fn lookup(&self, id: TypeId) -> Result<&'r TypeDescriptor, MatchError> {
        let registry: &'r R = self.registry;
        registry.lookup(id).ok_or(MatchError::UnknownType(id))
    }

    /// Compare `pair`, storing its verdict (and plan) in `checked`.
    ///
    /// A pair already in the memo reports compatible; a failure found for it
    /// later is caught by the scan in `build_structural`.
    fn compare(&self, pair: TypePair, checked: &mut PairMemo) -> Result<bool, MatchError> {
        if checked.contains_key(&pair) {
            return Ok(true);
        }
        checked.insert(pair, Checked::InProgress);

        let entry = match self.dispatch(pair, checked)? {
            Some(plan) => Checked::Compatible(plan),
            None => Checked::Incompatible,
        };
        let compatible = matches!(entry, Checked::Compatible(_));
        checked.insert(pair, entry);
        Ok(compatible)
    }

    fn dispatch(&self, pair: TypePair, checked: &mut PairMemo) -> Result<Option<Plan>, MatchError> {
        let target = self.lookup(pair.target)?;
        let source = self.lookup(pair.source)?;

        if target.is_sum() || source.is_sum() {
            return Err(MatchError::Unimplemented(SUM_UNIMPLEMENTED));
        }

        let tag = target.type_tag;
        let plan = match (&target.kind, &source.kind) {
            (TypeKind::Nil, TypeKind::Nil) => Some(Plan::Identity),

            (
                TypeKind::Identifier {
                    name: target_name,
                    underlying: target_alias,
                },
                TypeKind::Identifier {
                    name: source_name,
                    underlying: source_alias,
                },
            ) => {
                // Builtins never unify with aliases, only with the same builtin.
                if is_builtin(target_name) || is_builtin(source_name) {
                    (target_name == source_name).then_some(Plan::Retag { tag })
                } else {
                    let underlying = TypePair::new(
                        target_alias.ok_or_else(|| MatchError::UnresolvedAlias {
                            id: pair.target,
                            name: target_name.clone(),
                        })?,
                        source_alias.ok_or_else(|| MatchError::UnresolvedAlias {
                            id: pair.source,
                            name: source_name.clone(),
                        })?,
                    );
                    self.compare(underlying, checked)?
                        .then_some(Plan::Alias { underlying, tag })
                }
            }

            (TypeKind::Product(_), TypeKind::Product(_)) => self.compare_products(pair, checked)?,

            (TypeKind::Pointer(target_pointee), TypeKind::Pointer(source_pointee)) => {
                let pointee = TypePair::new(*target_pointee, *source_pointee);
                self.compare(pointee, checked)?
                    .then_some(Plan::Pointer { pointee, tag })
            }

            (
                TypeKind::Function {
                    argument: target_argument,
                    result: target_result,
                },
                TypeKind::Function {
                    argument: source_argument,
                    result: source_result,
                },
            ) => {
                let argument = TypePair::new(*target_argument, *source_argument);
                let result = TypePair::new(*target_result, *source_result);
                let argument_ok = self.compare(argument, checked)?;
                let result_ok = self.compare(result, checked)?;
                (argument_ok && result_ok).then_some(Plan::Function {
                    argument,
                    result,
                    tag,
                })
            }

            _ => None,
        };

        if plan.is_none() {
            log::debug!(
                "[compare] {} incompatible: {} vs {}",
                pair,
                target.kind_name(),
                source.kind_name()
            );
        }
        Ok(plan)
    }

    fn compare_products(
        &self,
        pair: TypePair,
        checked: &mut PairMemo,
    ) -> Result<Option<Plan>, MatchError> {
        let target_leaves = flatten_type(self.registry, pair.target)?;
        let source_leaves = flatten_type(self.registry, pair.source)?;
        self.reject_sum_leaves(&target_leaves)?;
        self.reject_sum_leaves(&source_leaves)?;
        if target_leaves.len() != source_leaves.len() {
            log::debug!(
                "[compare] {} arity mismatch: {} vs {} leaves",
                pair,
                target_leaves.len(),
                source_leaves.len()
            );
            return Ok(None);
        }

        // Every leaf is compared, so a fault behind a failing leaf still surfaces.
        let mut leaves = Vec::with_capacity(target_leaves.len());
        let mut compatible = true;
        for (target, source) in target_leaves.into_iter().zip(source_leaves) {
            let leaf = TypePair::new(target, source);
            compatible &= self.compare(leaf, checked)?;
            leaves.push(leaf);
        }

        Ok(compatible.then(|| Plan::Product {
            target: pair.target,
            source: pair.source,
            leaves,
        }))
    }

    /// Fail on any flattened leaf that is, or aliases, a sum type.
    fn reject_sum_leaves(&self, leaves: &[TypeId]) -> Result<(), MatchError> {
        for &leaf in leaves {
            let mut seen = Vec::new();
            let mut current = leaf;
            loop {
                let desc = self.lookup(current)?;
                if desc.is_sum() {
                    return Err(MatchError::Unimplemented(SUM_UNIMPLEMENTED));
                }
                match &desc.kind {
                    TypeKind::Identifier {
                        name,
                        underlying: Some(next),
                    } if !is_builtin(name) && !seen.contains(next) => {
                        seen.push(current);
                        current = *next;
                    }
                    _ => break,
                }
            }
        }
        Ok(())
    }
}

/// Structural compatibility check with a default [`Comparator`].
pub fn is_compatible<R: TypeRegistry + ?Sized>(
    registry: &R,
    target: TypeId,
    source: TypeId,
) -> Result<bool, MatchError> {
    Comparator::new(registry).is_compatible(target, source)
}

/// Build a structural coercion with a default [`Comparator`].
pub fn build_coercion<R: TypeRegistry + ?Sized>(
    registry: &R,
    target: TypeId,
    source: TypeId,
) -> Result<Option<Coercion<'_, R>>, MatchError> {
    Comparator::new(registry).build_coercion(target, source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HashMapTypeRegistry;

    fn registry_with_builtins() -> HashMapTypeRegistry {
        let mut registry = HashMapTypeRegistry::new();
        for name in crate::types::BUILTIN_TYPE_NAMES {
            registry.builtin(name);
        }
        registry
    }

    #[test]
    fn test_builtin_exactness() {
        let mut registry = registry_with_builtins();
        let int32 = registry.builtin("int32");
        let uint32 = registry.builtin("uint32");
        assert!(is_compatible(&registry, int32, int32).unwrap());
        assert!(!is_compatible(&registry, int32, uint32).unwrap());
        assert!(!is_compatible(&registry, uint32, int32).unwrap());
    }

    #[test]
    fn test_builtin_never_unifies_with_alias() {
        let mut registry = registry_with_builtins();
        let int32 = registry.builtin("int32");
        let count = registry.insert_named(TypeDescriptor::alias("Count", int32));
        assert!(!is_compatible(&registry, int32, count).unwrap());
        assert!(!is_compatible(&registry, count, int32).unwrap());
        assert!(is_compatible(&registry, count, count).unwrap());
    }

    #[test]
    fn test_nil_is_identity() {
        let mut registry = HashMapTypeRegistry::new();
        let nil = registry.insert(TypeDescriptor::nil());
        let coercion = build_coercion(&registry, nil, nil).unwrap().expect("compatible");
        assert_eq!(coercion.plan(TypePair::new(nil, nil)), Some(&Plan::Identity));
    }

    #[test]
    fn test_kind_mismatch_is_incompatible() {
        let mut registry = registry_with_builtins();
        let int32 = registry.builtin("int32");
        let nil = registry.insert(TypeDescriptor::nil());
        let ptr = registry.insert(TypeDescriptor::pointer(int32));
        let pair = registry.insert(TypeDescriptor::product(vec![int32, int32]));
        assert!(!is_compatible(&registry, nil, int32).unwrap());
        assert!(!is_compatible(&registry, ptr, int32).unwrap());
        assert!(!is_compatible(&registry, pair, ptr).unwrap());
    }

    #[test]
    fn test_product_arity_mismatch() {
        let mut registry = registry_with_builtins();
        let int32 = registry.builtin("int32");
        let string = registry.builtin("string");
        let boolean = registry.builtin("bool");
        let two = registry.insert(TypeDescriptor::product(vec![int32, string]));
        let three = registry.insert(TypeDescriptor::product(vec![int32, string, boolean]));
        assert!(!is_compatible(&registry, two, three).unwrap());
        assert!(!is_compatible(&registry, three, two).unwrap());
    }

    #[test]
    fn test_product_plan_pairs_leaves_in_order() {
        let mut registry = registry_with_builtins();
        let int32 = registry.builtin("int32");
        let string = registry.builtin("string");
        let inner = registry.insert(TypeDescriptor::product(vec![int32, string]));
        let nested = registry.insert(TypeDescriptor::product(vec![inner, int32]));
        let flat = registry.insert(TypeDescriptor::product(vec![int32, string, int32]));

        let coercion = build_coercion(&registry, nested, flat).unwrap().expect("compatible");
        assert_eq!(
            coercion.plan(TypePair::new(nested, flat)),
            Some(&Plan::Product {
                target: nested,
                source: flat,
                leaves: vec![
                    TypePair::new(int32, int32),
                    TypePair::new(string, string),
                    TypePair::new(int32, int32),
                ],
            })
        );
    }

    #[test]
    fn test_recursive_pointer_type_terminates() {
        // List = (int32, *List), compared with a structurally identical copy.
        let mut registry = registry_with_builtins();
        let int32 = registry.builtin("int32");
        let list_a = registry.declare();
        let next_a = registry.insert(TypeDescriptor::pointer(list_a));
        registry.define_named(list_a, TypeDescriptor::product(vec![int32, next_a]));
        let list_b = registry.declare();
        let next_b = registry.insert(TypeDescriptor::pointer(list_b));
        registry.define_named(list_b, TypeDescriptor::product(vec![int32, next_b]));

        let coercion = build_coercion(&registry, list_a, list_b)
            .unwrap()
            .expect("compatible");
        assert_eq!(
            coercion.plan(TypePair::new(next_a, next_b)),
            Some(&Plan::Pointer {
                pointee: TypePair::new(list_a, list_b),
                tag: None,
            })
        );
        // The recursive pair is referenced by key and its real plan is stored.
        assert!(matches!(
            coercion.plan(TypePair::new(list_a, list_b)),
            Some(Plan::Product { .. })
        ));
        assert_eq!(coercion.len(), 3);
    }

    #[test]
    fn test_forwarded_failure_poisons_whole_comparison() {
        // A = (*A, int32)      B = (*B, string)
        // The pointer pair is forwarded while (A, B) is still in progress; the
        // later leaf failure must still reject the whole comparison.
        let mut registry = registry_with_builtins();
        let int32 = registry.builtin("int32");
        let string = registry.builtin("string");
        let a = registry.declare();
        let ptr_a = registry.insert(TypeDescriptor::pointer(a));
        registry.define_named(a, TypeDescriptor::product(vec![ptr_a, int32]));
        let b = registry.declare();
        let ptr_b = registry.insert(TypeDescriptor::pointer(b));
        registry.define_named(b, TypeDescriptor::product(vec![ptr_b, string]));

        let wrapper_a = registry.insert(TypeDescriptor::pointer(a));
        let wrapper_b = registry.insert(TypeDescriptor::pointer(b));
        assert!(!is_compatible(&registry, a, b).unwrap());
        assert!(!is_compatible(&registry, wrapper_a, wrapper_b).unwrap());
    }

    #[test]
    fn test_sum_types_are_unimplemented() {
        let mut registry = registry_with_builtins();
        let int32 = registry.builtin("int32");
        let sum = registry.insert(TypeDescriptor::sum(vec![int32]));
        let err = is_compatible(&registry, sum, sum).unwrap_err();
        assert_eq!(err, MatchError::Unimplemented("sum type comparison"));
        assert!(is_compatible(&registry, sum, int32).is_err());
        assert!(is_compatible(&registry, int32, sum).is_err());

        // Nested inside a product.
        let wrapped = registry.insert(TypeDescriptor::product(vec![sum, int32]));
        assert!(build_coercion(&registry, wrapped, wrapped).is_err());
    }

    #[test]
    fn test_sum_leaf_behind_failing_leaf_is_fault() {
        let mut registry = registry_with_builtins();
        let int32 = registry.builtin("int32");
        let string = registry.builtin("string");
        let sum = registry.insert(TypeDescriptor::sum(vec![int32, string]));
        let named_sum = registry.insert_named(TypeDescriptor::alias("Choice", sum));

        // (int32, Sum) vs (string, Sum): the first leaf already fails.
        let left = registry.insert(TypeDescriptor::product(vec![int32, sum]));
        let right = registry.insert(TypeDescriptor::product(vec![string, sum]));
        assert_eq!(
            build_coercion(&registry, left, right).unwrap_err(),
            MatchError::Unimplemented(SUM_UNIMPLEMENTED)
        );

        // Arity mismatch, with the sum directly or through an alias.
        let lone = registry.insert(TypeDescriptor::product(vec![sum]));
        let aliased = registry.insert(TypeDescriptor::product(vec![named_sum]));
        let pair = registry.insert(TypeDescriptor::product(vec![int32, int32]));
        assert!(matches!(
            build_coercion(&registry, lone, pair),
            Err(MatchError::Unimplemented(_))
        ));
        assert!(matches!(
            build_coercion(&registry, pair, aliased),
            Err(MatchError::Unimplemented(_))
        ));
    }

    #[test]
    fn test_function_needs_both_sides() {
        let mut registry = registry_with_builtins();
        let int32 = registry.builtin("int32");
        let string = registry.builtin("string");
        let f = registry.insert(TypeDescriptor::function(int32, string));
        let g = registry.insert(TypeDescriptor::function(int32, string));
        let h = registry.insert(TypeDescriptor::function(int32, int32));
        let k = registry.insert(TypeDescriptor::function(string, string));

        let coercion = build_coercion(&registry, f, g).unwrap().expect("compatible");
        assert_eq!(
            coercion.plan(TypePair::new(f, g)),
            Some(&Plan::Function {
                argument: TypePair::new(int32, int32),
                result: TypePair::new(string, string),
                tag: None,
            })
        );
        assert!(!is_compatible(&registry, f, h).unwrap());
        assert!(!is_compatible(&registry, f, k).unwrap());
    }

    #[test]
    fn test_unknown_type_is_fault() {
        let registry = registry_with_builtins();
        assert_eq!(
            is_compatible(&registry, TypeId(999), TypeId(0)),
            Err(MatchError::UnknownType(TypeId(999)))
        );
    }

    #[test]
    fn test_alias_without_target_is_fault() {
        let mut registry = registry_with_builtins();
        let broken = registry.insert(TypeDescriptor::new(TypeKind::Identifier {
            name: "Broken".into(),
            underlying: None,
        }));
        assert!(matches!(
            is_compatible(&registry, broken, broken),
            Err(MatchError::UnresolvedAlias { .. })
        ));
    }

    #[test]
    fn test_nominal_mode_compares_names() {
        let mut registry = registry_with_builtins();
        let int32 = registry.builtin("int32");
        let body = registry.insert(TypeDescriptor::product(vec![int32, int32]));
        let point = registry.insert_named(TypeDescriptor::alias("Point", body));
        let other_point = registry.insert_named(TypeDescriptor::alias("Point", int32));
        let vector = registry.insert_named(TypeDescriptor::alias("Vector", body));

        let config = MatchConfig::new().with_mode(TypeCheckMode::Nominal);
        let comparator = Comparator::with_config(&registry, config);
        assert!(comparator.is_compatible(point, other_point).unwrap());
        assert!(!comparator.is_compatible(point, vector).unwrap());
        assert_eq!(
            comparator.is_compatible(point, body),
            Err(MatchError::NominalRequiresIdentifier(body))
        );
    }

    #[test]
    fn test_each_comparison_gets_fresh_memo() {
        let mut registry = registry_with_builtins();
        let int32 = registry.builtin("int32");
        let string = registry.builtin("string");
        let comparator = Comparator::new(&registry);
        assert!(!comparator.is_compatible(int32, string).unwrap());
        // A previous failure must not leak into an unrelated comparison.
        assert!(comparator.is_compatible(int32, int32).unwrap());
    }
}
