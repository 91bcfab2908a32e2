//! # facegate Core
//!
//! Core library for the facegate identity engine.
//!
//! This crate provides the fundamental data structures and algorithms:
//!
//! - [`Embedding`] - Fixed-length face embedding
//! - [`Face`] - A labeled, optionally encoded face sample
//! - [`Warehouse`] - Ordered sample collection with a per-uid index ledger
//! - [`MatchingEngine`] - Exhaustive 1-NN classifier fitted from a warehouse
//!
//! ## Example
//!
//! ```rust
//! use facegate_core::{Embedding, Face, MatchingEngine, Uid, Warehouse};
//! use image::GrayImage;
//!
//! let mut gallery = Warehouse::new();
//! let face = Face::new(GrayImage::new(1, 1), Uid(0))
//!     .with_embedding(Embedding::new(vec![1.0, 0.0, 0.0]));
//! gallery.add(face);
//!
//! let mut engine = MatchingEngine::default();
//! engine.fit(&gallery).unwrap();
//!
//! let uid = engine.classify(&Embedding::new(vec![0.9, 0.1, 0.0])).unwrap();
//! assert_eq!(uid, Some(Uid(0)));
//! ```

pub mod distance;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod face;
pub mod warehouse;

pub use embedding::Embedding;
pub use engine::{Distance, EngineConfig, Evaluation, Match, MatchingEngine};
pub use error::{Error, Result};
pub use face::{Face, Identity, Person, Uid};
pub use warehouse::Warehouse;
