//! Vitala - Practice Management Platform for Wellness Professionals
//!
//! This crate implements the billing and entitlement core: webhook ingestion
//! from the payment gateways, reconciliation into per-tenant subscription
//! records, and request-time access and feature gating.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
