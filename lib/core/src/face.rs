use crate::embedding::Embedding;
use image::GrayImage;
use serde::{Deserialize, Serialize};

/// Identity label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uid(pub u32);

impl std::fmt::Display for Uid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who a sample should be enrolled as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Identity {
    /// Allocate a fresh uid
    New,
    Existing(Uid),
}

impl Identity {
    #[inline]
    pub fn uid(&self) -> Option<Uid> {
        match self {
            Identity::New => None,
            Identity::Existing(uid) => Some(*uid),
        }
    }
}

impl From<Option<Uid>> for Identity {
    fn from(uid: Option<Uid>) -> Self {
        uid.map(Identity::Existing).unwrap_or(Identity::New)
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Identity::New => write!(f, "new"),
            Identity::Existing(uid) => write!(f, "{}", uid),
        }
    }
}

/// One identity observation: a normalized face image and its label
#[derive(Debug, Clone)]
pub struct Face {
    pub image: GrayImage,
    /// Filled in by the encoding stage
    pub embedding: Option<Embedding>,
    pub uid: Uid,
    /// Sample index of the stored file this face came from
    pub index: Option<u32>,
}

impl Face {
    #[inline]
    #[must_use]
    pub fn new(image: GrayImage, uid: Uid) -> Self {
        Self {
            image,
            embedding: None,
            uid,
            index: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_index(mut self, index: u32) -> Self {
        self.index = Some(index);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_embedding(mut self, embedding: Embedding) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

/// All samples sharing a uid within one warehouse
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
    pub uid: Uid,
    pub samples: usize,
}
