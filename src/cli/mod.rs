//! CLI infrastructure for the planewar agent
//!
//! This module provides the command-line interface for training the agent,
//! watching it play, and inspecting or exporting its learned table.

pub mod commands;
pub mod config;
pub mod output;
