//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run full crawls
//! end-to-end, then write and read back the sitemap files.

mod crawl_tests;
mod output_tests;
