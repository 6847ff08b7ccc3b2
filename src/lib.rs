//! DealMind Core - Conversation Orchestration & Provider Dispatch
//!
//! This crate is the orchestration core of the DealMind Lab negotiation
//! training backend. It turns a stored conversation session plus a training
//! scenario into a model-agnostic chat request, routes it to the matching AI
//! provider, and analyzes completed transcripts for negotiation signals.
//!
//! Persistence, authentication, and the wire transport are external
//! collaborators: the core is invoked as a function against in-memory
//! conversation state and returns structured results.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
