//! Use cases (interactors) for Matchday
//!
//! Thin coordinators that combine port interfaces for UI-facing callers.
//! The synchronisation flow itself lives in `matchday-sync`.
//!
//! ## Use Cases
//!
//! - [`ReadingStateUseCase`] - Viewed/bookmarked state and unread counts

pub mod reading_state;

pub use reading_state::ReadingStateUseCase;
