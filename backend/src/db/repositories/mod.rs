//! Repository implementations module.
//!
//! This module contains the implementations of the `CacheRepository` trait:
//! - `local`: In-memory implementation for unit testing and local development
//! - `file`: One JSON document per key on disk, used by the server
pub mod file;
pub mod local;

pub use file::FileRepository;
pub use local::LocalRepository;
