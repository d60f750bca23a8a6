//! Inbound adapters that translate external requests into domain service
//! calls while keeping framework details at the edge.
//!
//! HTTP handlers, including the orchestrator-facing workflow steps, live
//! under [`http`].

pub mod http;
