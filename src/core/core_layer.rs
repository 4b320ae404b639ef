// The core module contains all business logic.
// Each feature gets its own submodule. Nothing in here knows about HTTP
// or the Google wire format - that lives in the http and infra layers.

#[path = "credentials/credential_resolver.rs"]
pub mod credentials;

#[path = "planning/mod.rs"]
pub mod planning;

#[path = "provisioning/provisioning_service.rs"]
pub mod provisioning;

#[path = "health/health_service.rs"]
pub mod health;
