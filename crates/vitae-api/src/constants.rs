//! API constants

/// Versioned prefix for all resource routes.
pub const API_PREFIX: &str = "/api/v0";
