use crate::naming::NamingScheme;
use crate::store::SampleStore;
use facegate_core::Result;
use std::path::Path;
use tracing::info;

/// Name of the directory holding the splits, relative to the data dir
pub const DATASET_DIR: &str = "dataset";
pub const TRAIN_SPLIT: &str = "train";
pub const TEST_SPLIT: &str = "test";

/// Owns the dataset layout: `<data_dir>/dataset/{train,test}`
#[derive(Debug, Clone)]
pub struct DatasetManager {
    train: SampleStore,
    test: SampleStore,
}

impl DatasetManager {
    /// Open (and create if needed) the dataset under `data_dir`
    pub fn new<P: AsRef<Path>>(data_dir: P, scheme: NamingScheme) -> Result<Self> {
        scheme.validate()?;

        let root = data_dir.as_ref().join(DATASET_DIR);
        let train_dir = root.join(TRAIN_SPLIT);
        let test_dir = root.join(TEST_SPLIT);
        std::fs::create_dir_all(&train_dir)?;
        std::fs::create_dir_all(&test_dir)?;

        info!("Dataset opened at {:?}", root);

        Ok(Self {
            train: SampleStore::new(train_dir, scheme.clone()),
            test: SampleStore::new(test_dir, scheme),
        })
    }

    /// The gallery split; the only one enrollment writes to
    #[inline]
    pub fn train(&self) -> &SampleStore {
        &self.train
    }

    #[inline]
    pub fn test(&self) -> &SampleStore {
        &self.test
    }
}
