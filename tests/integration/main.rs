//! Integration tests for Rank-Ripple
//!
//! These tests use wiremock to serve a paginated listing and run full pulls
//! against it end-to-end.

mod pull_tests;
