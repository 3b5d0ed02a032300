/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

#![doc = include_str!("../README.md")]
#![deny(unstable_features)]
#![deny(trivial_casts)]
#![deny(unconditional_recursion)]
#![deny(clippy::empty_loop)]
#![deny(unreachable_code)]
#![deny(unreachable_pub)]
#![deny(unreachable_patterns)]
#![deny(unused_macro_rules)]
#![deny(unused_doc_comments)]

#[cfg(feature = "cli")]
pub mod cli;
pub mod graph;
pub mod graphs;
pub mod ids;
pub mod rank;
pub mod utils;

/// Prelude module to import everything from this crate
pub mod prelude {
    pub use crate::graph::*;
    pub use crate::ids::*;
    pub use crate::rank::*;
    pub use crate::utils::*;
}
