//! Common test utilities and helpers
//!
//! Shared fixtures for the integration tests: a scriptable in-memory
//! [`mock_api::MockApi`], camera doubles and canned API responses.

#![allow(dead_code)]

pub mod fixtures;
