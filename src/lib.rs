//! # facegate
//!
//! Face identification by nearest-neighbor matching over a labeled gallery,
//! with live enrollment and removal of identities.
//!
//! ## Quick Start
//!
//! ### As a CLI
//!
//! ```bash
//! facegate --data-dir . evaluate
//! facegate --data-dir . identify probe.jpg
//! facegate --data-dir . session --frames ./frames
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use facegate::prelude::*;
//!
//! let dataset = DatasetManager::new(".", NamingScheme::default()).unwrap();
//! let session = SessionController::new(
//!     dataset,
//!     Pipeline::reference(64, 16),
//!     EngineConfig::default(),
//!     SessionConfig::default(),
//! )
//! .unwrap();
//!
//! println!("accuracy: {}", session.evaluate().unwrap().accuracy);
//! ```
//!
//! ## Crate Structure
//!
//! - `facegate-core` - Embedding, Face, Warehouse, MatchingEngine
//! - `facegate-storage` - dataset layout, naming scheme, enrollment allocator
//! - `facegate-session` - collaborator traits and the interactive session

// Re-export core types
pub use facegate_core::{
    Distance, Embedding, EngineConfig, Error, Evaluation, Face, Identity, Match, MatchingEngine,
    Person, Result, Uid, Warehouse,
};

// Re-export storage
pub use facegate_storage::{
    DatasetManager, EnrollmentAllocator, NamingScheme, SampleKey, SampleStore,
};

// Re-export session
pub use facegate_session::{
    BoundingBox, CaptureSource, Command, CommandOutcome, CommandSource, Cropper, Detector,
    DirectoryCapture, Encoder, FrameOutcome, FullFrameDetector, GridEncoder, LineCommands,
    Pipeline, ResizeCropper, SessionConfig, SessionController, SessionState, SessionSummary,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        DatasetManager, Embedding, EngineConfig, Error, Face, Identity, MatchingEngine,
        NamingScheme, Pipeline, Result, SessionConfig, SessionController, Uid, Warehouse,
    };
}
