//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Unique identifier for agents (stable for the whole run)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub u32);

impl AgentId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

/// Identifier for a clan within one detection pass
///
/// Positional: pass N's `ClanId(0)` and pass N+1's `ClanId(0)` need not
/// contain the same agents. Clans carry no identity across passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClanId(pub u32);

impl ClanId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

/// Simulation cycle counter
pub type Cycle = u64;

/// Kind of a simulation cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CycleKind {
    Social,
    Economic,
}
