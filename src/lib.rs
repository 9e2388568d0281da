//! SpaceFed Members - Supporter Membership and Direct Debit Billing
//!
//! This crate implements the supporter membership workflow for the
//! foundation: application intake, direct-debit mandate setup through
//! GoCardless, approval by email, annual billing, and webhook-driven
//! reconciliation of gateway state.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
