//! Movie semantic-similarity engine.
//!
//! cinesim turns movie metadata (title, director, synopsis) into dense vector
//! embeddings, persists them in a SQLite-backed vector index, and answers
//! "find similar movies" queries via cosine-similarity nearest-neighbor search.
//!
//! # Architecture
//!
//! - **Storage**: SQLite with [sqlite-vec](https://github.com/asg017/sqlite-vec)
//!   for the vector index and a plain `movies` table for display metadata
//! - **Embeddings**: Local ONNX Runtime with all-MiniLM-L6-v2 (384 dimensions,
//!   mean-pooled, L2-normalized)
//! - **Search**: cosine top-K with exclusion lists, deterministic tie-breaks,
//!   and optional similarity thresholding
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`db`] — SQLite database initialization and schema
//! - [`embedding`] — Text-to-vector embedding pipeline via ONNX Runtime
//! - [`similarity`] — Core engine: text composition, vector index, query
//!   service, and bulk rebuild
//! - [`store`] — Relational movie store consumed for hydration and rebuilds

pub mod config;
pub mod db;
pub mod embedding;
pub mod similarity;
pub mod store;
