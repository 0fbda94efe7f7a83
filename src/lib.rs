//! Clinic Agent - tool-calling orchestration for clinical appointment workflows
//!
//! A language model picks one registered operation per turn (patient search,
//! insurance eligibility, slot search, booking). The agent validates and
//! executes it, feeds the result back, and audits every decision point.

pub mod agent;
pub mod audit;
pub mod error;
pub mod llm;
pub mod operations;
pub mod schema;

pub use error::{AgentError, Result};
