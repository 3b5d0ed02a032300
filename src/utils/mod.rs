/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Synchronization and partitioning support for parallel computations.

mod barrier;
pub use barrier::*;

mod partition;
pub use partition::*;
