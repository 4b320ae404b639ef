// The infra module contains implementations of core traits.
// External I/O (HTTP calls to Google APIs) lives here; the core layer only
// sees the DocsProvider port.

#[path = "google/mod.rs"]
pub mod google;
