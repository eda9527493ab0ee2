//! CLI infrastructure for the grappling TD sandbox
//!
//! This module provides the command-line interface for training the agent
//! and inspecting the state space.

pub mod commands;
pub mod output;
