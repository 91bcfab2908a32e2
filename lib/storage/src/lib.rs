//! # facegate Storage
//!
//! On-disk dataset handling for facegate:
//!
//! - [`DatasetManager`] - the `dataset/{train,test}` layout
//! - [`SampleStore`] - scan, read, atomic write and removal of sample images
//! - [`NamingScheme`] / [`SampleKey`] - `(uid, index)` <-> file name
//! - [`EnrollmentAllocator`] - where the next sample goes, what a deletion removes

pub mod allocator;
pub mod manager;
pub mod naming;
pub mod store;

pub use allocator::EnrollmentAllocator;
pub use manager::DatasetManager;
pub use naming::{NamingScheme, SampleKey};
pub use store::{SampleStore, StoredSample};
