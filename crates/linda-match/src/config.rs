// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Comparator configuration.
//!
//! # Environment Variables
//!
//! - `LINDA_TYPE_CHECKING`: `structural` (default) or `nominal`

use std::str::FromStr;

/// Environment variable read by [`MatchConfig::from_env`].
pub const TYPE_CHECKING_ENV: &str = "LINDA_TYPE_CHECKING";

/// How two type descriptors are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeCheckMode {
    /// Full structural comparison with coercion plans.
    #[default]
    Structural,
    /// Types are compared by identifier name only; values pass through
    /// unchanged. Used when the runtime runs without type information.
    Nominal,
}

impl FromStr for TypeCheckMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "structural" | "types" | "on" => Ok(Self::Structural),
            "nominal" | "notypes" | "off" => Ok(Self::Nominal),
            other => Err(format!("unknown type checking mode: {}", other)),
        }
    }
}

/// Configuration for a [`Comparator`](crate::compare::Comparator).
#[derive(Debug, Clone, Default)]
pub struct MatchConfig {
    /// Comparison mode.
    pub mode: TypeCheckMode,
}

impl MatchConfig {
    /// Structural matching.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the mode from [`TYPE_CHECKING_ENV`], falling back to structural.
    pub fn from_env() -> Self {
        let mode = std::env::var(TYPE_CHECKING_ENV)
            .ok()
            .and_then(|value| match value.parse() {
                Ok(mode) => Some(mode),
                Err(err) => {
                    log::warn!("[config] {}: {}, using structural", TYPE_CHECKING_ENV, err);
                    None
                }
            })
            .unwrap_or_default();
        Self { mode }
    }

    /// Set the comparison mode.
    pub fn with_mode(mut self, mode: TypeCheckMode) -> Self {
        self.mode = mode;
        self
    }
}
