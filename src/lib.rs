//! # simrec
//!
//! Similar-item recommendations: resolve a free-text entity name to a
//! catalog record and return its nearest neighbors in feature space.
//!
//! ## Quick Start
//!
//! ### From the Command Line
//!
//! ```bash
//! simrec --catalog Dataset.csv --features features.json list
//! simrec --catalog Dataset.csv --features features.json recommend "coffee" -k 5
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use simrec::prelude::*;
//!
//! let catalog = EntityCatalog::from_names(["The Coffee House", "Coffee Corner", "Pizza Place"]);
//! let matrix = FeatureMatrix::from_rows(vec![
//!     vec![0.0, 0.0],
//!     vec![1.0, 0.0],
//!     vec![5.0, 5.0],
//! ]).unwrap();
//!
//! let recommender = Recommender::build(catalog, matrix, IndexConfig::default()).unwrap();
//! for neighbor in recommender.recommend("coffee", 5).unwrap().iter() {
//!     let entity = recommender.entity(neighbor.entity_id).unwrap();
//!     println!("{} ({:.3})", entity.display_name, neighbor.distance);
//! }
//! ```
//!
//! ## Crate Structure
//!
//! - [`simrec-core`](https://docs.rs/simrec-core) - Catalog, resolvers, neighbor index and the recommender
//! - `simrec::loader` - CSV catalog and JSON feature loading used by the binary

pub mod loader;

// Re-export core types
pub use simrec_core::{
    normalize_name, recommend, resolve,
    Entity, EntityCatalog, EntityRecord,
    EntityResolver, SubstringResolver, TrigramResolver, ResolutionOutcome,
    FeatureMatrix, FeatureVector,
    IndexConfig, NeighborIndex, Neighbor, NeighborResult,
    Recommender,
    Error, Result,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Entity, EntityCatalog, EntityRecord,
        EntityResolver, SubstringResolver, TrigramResolver, ResolutionOutcome,
        FeatureMatrix, FeatureVector,
        IndexConfig, NeighborIndex, Neighbor, NeighborResult,
        Recommender,
        Error, Result,
    };
}
