//! # simrec Core
//!
//! Core library for simrec: turn a free-text entity name into a ranked list
//! of similar entities.
//!
//! - [`EntityCatalog`] - Ordered, normalized entity names with display attributes
//! - [`FeatureMatrix`] - One feature vector per catalog entity
//! - [`EntityResolver`] - Name matching strategies ([`SubstringResolver`], [`TrigramResolver`])
//! - [`NeighborIndex`] - Exact Euclidean k-nearest-neighbor search
//! - [`Recommender`] - The resolve-then-query pipeline
//!
//! ## Example
//!
//! ```rust
//! use simrec_core::{EntityCatalog, FeatureMatrix, IndexConfig, Recommender};
//!
//! let catalog = EntityCatalog::from_names(["The Coffee House", "Coffee Corner", "Pizza Place"]);
//! let matrix = FeatureMatrix::from_rows(vec![
//!     vec![0.0, 0.0],
//!     vec![1.0, 0.0],
//!     vec![5.0, 5.0],
//! ]).unwrap();
//!
//! let recommender = Recommender::build(catalog, matrix, IndexConfig::default()).unwrap();
//! let result = recommender.recommend("coffee", 2).unwrap();
//! assert_eq!(result.ids(), vec![1, 2]);
//! ```

pub mod catalog;
pub mod error;
pub mod index;
pub mod matrix;
pub mod recommender;
pub mod resolver;
pub mod vector;

pub use catalog::{normalize_name, Entity, EntityCatalog, EntityRecord};
pub use error::{Error, Result};
pub use index::{IndexConfig, Neighbor, NeighborIndex, NeighborResult};
pub use matrix::FeatureMatrix;
pub use recommender::{recommend, Recommender};
pub use resolver::{resolve, EntityResolver, ResolutionOutcome, SubstringResolver, TrigramResolver};
pub use vector::FeatureVector;
