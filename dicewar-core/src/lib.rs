//! DICEWAR Core - Game engine
//!
//! This crate provides the core game logic for DICEWAR:
//! - Region graph board with ownership and dice stacks
//! - Connected-group ("region") queries and border bookkeeping
//! - Exact combat probability oracle
//! - Authoritative game rules (battles, transfers, reinforcement)
//! - Map files and random map generation
//! - Agent interface and a random baseline opponent

pub mod agent;
pub mod board;
pub mod game;
pub mod map;
pub mod probability;

// Re-exports for convenient access
pub use agent::{Agent, RandomAgent};
pub use board::{Board, PlayerId, Region, RegionId, MAX_DICE};
pub use game::{BattleOutcome, Command, GameState, RulesError};
pub use map::{Map, MapError};
pub use probability::{attack_success, probability_of_holding, probability_of_successful_attack};
