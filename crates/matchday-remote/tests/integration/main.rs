//! Integration tests for matchday-remote
//!
//! Uses wiremock to simulate the Matchday API and verifies end-to-end
//! behavior of the ApiClient and the HttpChangeSource adapter.

mod common;

mod test_batch;
mod test_changes;
mod test_retry;
