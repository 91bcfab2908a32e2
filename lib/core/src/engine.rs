use crate::{Embedding, Error, Result, Uid, Warehouse};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Distance {
    Euclidean,
    Cosine,
}

impl Distance {
    /// Ranking score, lower is closer
    #[inline]
    fn score(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Distance::Euclidean => crate::distance::l2_squared(a, b),
            Distance::Cosine => crate::distance::cosine_distance(a, b),
        }
    }

    /// Turn a ranking score into the reported distance
    #[inline]
    fn report(self, score: f32) -> f32 {
        match self {
            Distance::Euclidean => score.sqrt(),
            Distance::Cosine => score,
        }
    }
}

/// Configuration for the matching engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub distance: Distance,
    /// When set, every fitted and queried embedding must have this length
    pub expected_dim: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            distance: Distance::Euclidean,
            expected_dim: None,
        }
    }
}

/// Result of a nearest-neighbor lookup
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Match {
    pub uid: Uid,
    pub distance: f32,
    /// Position of the neighbor in fit order
    pub position: usize,
}

/// Accuracy of the engine on a labeled warehouse
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Evaluation {
    pub correct: usize,
    pub total: usize,
    pub accuracy: f32,
}

impl Evaluation {
    fn new(correct: usize, total: usize) -> Self {
        let accuracy = if total == 0 {
            0.0
        } else {
            correct as f32 / total as f32
        };
        Self {
            correct,
            total,
            accuracy,
        }
    }
}

/// Exhaustive 1-NN index over one warehouse snapshot.
/// Embeddings are kept in one contiguous buffer, in fit order.
#[derive(Debug, Clone)]
struct FlatIndex {
    vectors: Vec<f32>,
    labels: Vec<Uid>,
    dim: usize,
}

impl FlatIndex {
    fn build(warehouse: &Warehouse, expected_dim: Option<usize>) -> Result<Self> {
        let mut vectors = Vec::new();
        let mut labels = Vec::with_capacity(warehouse.len());
        let mut dim = expected_dim;

        for (position, face) in warehouse.get_faces().enumerate() {
            let embedding = face
                .embedding
                .as_ref()
                .ok_or(Error::MissingEmbedding { position })?;

            match dim {
                Some(expected) if expected != embedding.dim() => {
                    return Err(Error::InvalidDimension {
                        expected,
                        actual: embedding.dim(),
                    });
                }
                Some(_) => {}
                None => {
                    if embedding.is_empty() {
                        return Err(Error::InvalidConfig(
                            "embeddings must not be empty".to_string(),
                        ));
                    }
                    dim = Some(embedding.dim());
                    vectors.reserve(embedding.dim() * warehouse.len());
                }
            }

            vectors.extend_from_slice(embedding.as_slice());
            labels.push(face.uid);
        }

        Ok(Self {
            vectors,
            labels,
            dim: dim.unwrap_or(0),
        })
    }

    #[inline]
    fn len(&self) -> usize {
        self.labels.len()
    }

    /// Linear scan. Equal scores resolve to the lowest fit position.
    fn nearest(&self, query: &Embedding, distance: Distance) -> Result<Option<Match>> {
        if self.labels.is_empty() {
            return Ok(None);
        }
        if query.dim() != self.dim {
            return Err(Error::InvalidDimension {
                expected: self.dim,
                actual: query.dim(),
            });
        }

        let best = self
            .vectors
            .chunks_exact(self.dim)
            .enumerate()
            .map(|(position, stored)| {
                (OrderedFloat(distance.score(stored, query.as_slice())), position)
            })
            .min();

        Ok(best.map(|(score, position)| Match {
            uid: self.labels[position],
            distance: distance.report(score.into_inner()),
            position,
        }))
    }
}

/// Nearest-neighbor identity classifier.
///
/// A fit is a snapshot: the engine never watches the warehouse it was built
/// from, so callers refit after every gallery mutation.
#[derive(Debug, Clone, Default)]
pub struct MatchingEngine {
    config: EngineConfig,
    index: Option<FlatIndex>,
}

impl MatchingEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            index: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_fitted(&self) -> bool {
        self.index.is_some()
    }

    /// Number of fitted samples, 0 when unfitted
    pub fn len(&self) -> usize {
        self.index.as_ref().map(FlatIndex::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Embedding dimension of the fitted index
    pub fn dim(&self) -> Option<usize> {
        self.index
            .as_ref()
            .filter(|index| index.len() > 0)
            .map(|index| index.dim)
    }

    /// Build a new index from `warehouse` and replace the current one.
    /// On error the previous index is kept.
    pub fn fit(&mut self, warehouse: &Warehouse) -> Result<()> {
        let index = FlatIndex::build(warehouse, self.config.expected_dim)?;
        self.index = Some(index);
        Ok(())
    }

    /// Nearest stored sample, `None` when the fitted gallery is empty
    pub fn nearest(&self, embedding: &Embedding) -> Result<Option<Match>> {
        let index = self.index.as_ref().ok_or(Error::NotFitted)?;
        if let Some(expected) = self.config.expected_dim {
            if embedding.dim() != expected {
                return Err(Error::InvalidDimension {
                    expected,
                    actual: embedding.dim(),
                });
            }
        }
        index.nearest(embedding, self.config.distance)
    }

    /// Predicted uid of the nearest neighbor
    #[inline]
    pub fn classify(&self, embedding: &Embedding) -> Result<Option<Uid>> {
        Ok(self.nearest(embedding)?.map(|m| m.uid))
    }

    /// Fraction of `test` samples whose prediction matches their label
    pub fn evaluate(&self, test: &Warehouse) -> Result<Evaluation> {
        if !self.is_fitted() {
            return Err(Error::NotFitted);
        }

        let mut correct = 0;
        for (position, face) in test.get_faces().enumerate() {
            let embedding = face
                .embedding
                .as_ref()
                .ok_or(Error::MissingEmbedding { position })?;
            if self.classify(embedding)? == Some(face.uid) {
                correct += 1;
            }
        }

        Ok(Evaluation::new(correct, test.len()))
    }
}
