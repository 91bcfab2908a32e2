//! # facegate Session
//!
//! The interactive enrollment loop and the interfaces it consumes.
//!
//! - [`collaborators`] - detector, cropper, encoder, capture and command traits
//! - [`reference`] - simple implementations of those traits
//! - [`annotate`] - box and uid label drawn on frames
//! - [`SessionController`] - frame pipeline, commands, reacquire-and-refit
//!
//! ## State machine
//!
//! ```text
//! Idle -> FrameAcquired -> Detecting -> PerFaceClassifying -> AwaitingCommand
//!   ^          |                                                   |
//!   +--(drop)--+     +---------+-----------+-----------+-----------+
//!   |                |         |           |           |
//!   +-------------- Idle    Saving    Enrolling    Deleting    Terminated
//! ```

pub mod annotate;
pub mod collaborators;
pub mod controller;
pub mod reference;

pub use collaborators::{
    BoundingBox, CaptureSource, Command, CommandSource, Cropper, Detector, Encoder,
};
pub use controller::{
    CommandOutcome, FaceResult, FrameOutcome, Pipeline, Selection, SessionConfig, SessionController,
    SessionState, SessionSummary,
};
pub use reference::{DirectoryCapture, FullFrameDetector, GridEncoder, LineCommands, ResizeCropper};
