//! Tubely Database Layer
//!
//! Video metadata persistence. The pipeline talks to a [`VideoRepository`];
//! Postgres backs it in production and an in-memory map stands in when no
//! database is configured.

pub mod db;

pub use db::{InMemoryVideoRepository, PgVideoRepository, VideoRepository, VideoRow};
