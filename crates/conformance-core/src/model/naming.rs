// crates/conformance-core/src/model/naming.rs
// ============================================================================
// Module: Resource Naming
// Description: Collision-resistant names for resources created by a run.
// Purpose: Keep concurrent runs from colliding on remote resource names.
// Dependencies: rand
// ============================================================================

//! ## Overview
//! Every run creates real resources whose names must not collide with other
//! runs sharing the same account. Names combine a fixed prefix, a random
//! process-scoped segment, and a monotonic counter, so two names issued by
//! one process never repeat and names from different processes collide only
//! if their random segments do.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::OnceLock;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use rand::RngCore;
use rand::rngs::OsRng;

// ============================================================================
// SECTION: Generator
// ============================================================================

/// Mask keeping the random segment at twelve hex digits.
const BOOT_SEGMENT_MASK: u64 = 0xffff_ffff_ffff;

/// Process-scoped name generator.
///
/// # Invariants
/// - Names issued by one generator are unique for its lifetime.
#[derive(Debug)]
pub struct NameGenerator {
    /// Random segment shared by every name this generator issues.
    boot_id: u64,
    /// Monotonic counter for names issued so far.
    counter: AtomicU64,
}

impl NameGenerator {
    /// Creates a generator with a fresh random segment.
    #[must_use]
    pub fn new() -> Self {
        let mut bytes = [0u8; 8];
        OsRng.fill_bytes(&mut bytes);
        Self {
            boot_id: u64::from_be_bytes(bytes) & BOOT_SEGMENT_MASK,
            counter: AtomicU64::new(1),
        }
    }

    /// Issues a name of the form `<prefix>-<random><sequence>`.
    #[must_use]
    pub fn issue(&self, prefix: &str) -> String {
        let seq = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{prefix}-{:012x}{seq}", self.boot_id)
    }
}

impl Default for NameGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide generator behind [`random_with_prefix`].
static GLOBAL_GENERATOR: OnceLock<NameGenerator> = OnceLock::new();

/// Issues a collision-resistant name from the process-wide generator.
#[must_use]
pub fn random_with_prefix(prefix: &str) -> String {
    GLOBAL_GENERATOR.get_or_init(NameGenerator::new).issue(prefix)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
