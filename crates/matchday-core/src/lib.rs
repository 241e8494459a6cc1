//! Matchday Core - Domain logic and port definitions
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain types** - `Collection`, `ChangeRecord`, `ChangeSet`, `SyncVersions`,
//!   `NewsArticle`, `Transfer`
//! - **Port definitions** - Traits for adapters: `IRemoteChangeSource`, `ILocalStore`,
//!   `IVersionCursor`, `IViewedStateStore`, `INotifier`, `IChangeDataSignal`,
//!   `ISearchIndex`, `IPushTopics`
//! - **Use cases** - `ReadingStateUseCase`
//! - **Configuration** - YAML-backed [`config::Config`]
//!
//! # Architecture
//!
//! The domain module is pure data and rules with no I/O. Ports define the
//! trait interfaces that adapter crates (`matchday-cache`, `matchday-remote`)
//! implement, and that the sync engine in `matchday-sync` consumes.

pub mod config;
pub mod domain;
pub mod ports;
pub mod usecases;
