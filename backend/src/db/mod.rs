//! Persistent cache storage.
//!
//! This module provides abstractions for the persistent cache tier via the
//! Repository pattern, allowing different storage backends to be swapped easily.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Cache Manager (cache::manager) - two-tier read path    │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Trait (repository.rs) - Abstract Interface  │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!          ┌──────────┴──────────┐
//!          │                     │
//!   ┌──────▼──────┐       ┌──────▼──────┐
//!   │    Local    │       │    File     │
//!   │ (in-memory) │       │ (JSON/key)  │
//!   └─────────────┘       └─────────────┘
//! ```
//!
//! # Repository Pattern
//! - `repository`: Trait definition and error types
//! - `repositories::local`: In-memory implementation for tests and local development
//! - `repositories::file`: On-disk implementation used by the server
//! - `factory`: Factory for creating repository instances from env or TOML

pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;

pub use factory::{RepositoryFactory, RepositoryType};
pub use repo_config::RepositoryConfig;
pub use repositories::{FileRepository, LocalRepository};
pub use repository::{
    CacheDomain, CacheRepository, ErrorContext, KeyPredicate, RepositoryError, RepositoryResult,
};
