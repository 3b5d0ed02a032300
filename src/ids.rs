/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Ready-made [identifier functions](IdGenerator).

use crate::graph::{IdGenerator, NodeId};
use sha2::{Digest, Sha256};

/// Uses the content of a node as its identifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentIdGenerator;

impl IdGenerator for ContentIdGenerator {
    fn generate_id(&self, content: &str) -> NodeId {
        NodeId::from(content)
    }
}

/// Uses the lowercase hexadecimal SHA-256 digest of the content of a node as
/// its identifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256IdGenerator;

impl IdGenerator for Sha256IdGenerator {
    fn generate_id(&self, content: &str) -> NodeId {
        NodeId::from(format!("{:x}", Sha256::digest(content.as_bytes())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256() {
        let generator = Sha256IdGenerator;
        assert_eq!(
            generator.generate_id("abc").as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(
            generator.generate_id("").as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(generator.generate_id("x"), generator.generate_id("x"));
    }

    #[test]
    fn test_content() {
        assert_eq!(ContentIdGenerator.generate_id("page").as_str(), "page");
    }
}
