use crate::{
    Entity, EntityCatalog, EntityResolver, Error, FeatureMatrix, IndexConfig, NeighborIndex,
    NeighborResult, ResolutionOutcome, Result, SubstringResolver,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Name-to-recommendations pipeline over a fixed catalog and index.
///
/// Both structures sit behind `Arc` and are never mutated, so one
/// `Recommender` can serve any number of threads without locking.
#[derive(Debug, Clone)]
pub struct Recommender<R = SubstringResolver> {
    catalog: Arc<EntityCatalog>,
    index: Arc<NeighborIndex>,
    resolver: R,
}

impl Recommender<SubstringResolver> {
    pub fn new(
        catalog: impl Into<Arc<EntityCatalog>>,
        index: impl Into<Arc<NeighborIndex>>,
    ) -> Result<Self> {
        Self::with_resolver(catalog, index, SubstringResolver)
    }

    /// Check alignment, then build the index and the pipeline in one step
    pub fn build(
        catalog: EntityCatalog,
        matrix: FeatureMatrix,
        config: IndexConfig,
    ) -> Result<Self> {
        check_alignment(catalog.len(), matrix.len())?;
        let index = NeighborIndex::with_config(matrix, config)?;
        Self::new(catalog, index)
    }
}

impl<R: EntityResolver> Recommender<R> {
    pub fn with_resolver(
        catalog: impl Into<Arc<EntityCatalog>>,
        index: impl Into<Arc<NeighborIndex>>,
        resolver: R,
    ) -> Result<Self> {
        let catalog = catalog.into();
        let index = index.into();
        check_alignment(catalog.len(), index.len())?;

        info!(
            entities = catalog.len(),
            dim = index.dim(),
            resolver = std::any::type_name::<R>(),
            "recommender ready"
        );
        Ok(Self {
            catalog,
            index,
            resolver,
        })
    }

    pub fn catalog(&self) -> &EntityCatalog {
        &self.catalog
    }

    pub fn index(&self) -> &NeighborIndex {
        &self.index
    }

    pub fn entity(&self, id: usize) -> Option<&Entity> {
        self.catalog.get(id)
    }

    pub fn resolve(&self, query: &str) -> ResolutionOutcome {
        self.resolver.resolve(query, &self.catalog)
    }

    /// Entities most similar to the one `query` names
    pub fn recommend(&self, query: &str, k: usize) -> Result<NeighborResult> {
        match self.resolve(query) {
            ResolutionOutcome::Found(id) => {
                debug!(query, entity_id = id, k, "resolved query");
                self.index.query(id, k)
            }
            ResolutionOutcome::NotFound => Err(Error::EntityNotFound(query.to_string())),
        }
    }

    pub fn recommend_default(&self, query: &str) -> Result<NeighborResult> {
        self.recommend(query, self.index.default_k())
    }
}

/// One-shot pipeline using the substring resolver
pub fn recommend(
    query: &str,
    catalog: &EntityCatalog,
    index: &NeighborIndex,
    k: usize,
) -> Result<NeighborResult> {
    check_alignment(catalog.len(), index.len())?;
    match crate::resolve(query, catalog) {
        ResolutionOutcome::Found(id) => index.query(id, k),
        ResolutionOutcome::NotFound => Err(Error::EntityNotFound(query.to_string())),
    }
}

fn check_alignment(catalog: usize, matrix: usize) -> Result<()> {
    if catalog != matrix {
        return Err(Error::DimensionMismatch { catalog, matrix });
    }
    Ok(())
}
