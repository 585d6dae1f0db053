//! Repair loop module - bounded generate/execute/feedback cycle.
//!
//! This module provides:
//! - RepairLoop, the controller that drives a single request
//! - RepairSuccess / RepairFailure for the terminal outcomes
//! - GenerationRequest and RepairConfig inputs

mod controller;

pub use controller::{
    DEFAULT_MAX_ATTEMPTS, GenerationRequest, RepairConfig, RepairFailure, RepairLoop, RepairSuccess,
};
