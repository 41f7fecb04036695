//! Outbound adapters implementing the driven ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel ORM
//! - **memory**: in-process repositories for local runs and tests
//! - **vision**: HTTP client for the frame number recognition gateway
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no workshop rules.

pub mod memory;
pub mod persistence;
pub mod vision;
