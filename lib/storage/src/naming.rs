use facegate_core::{Error, Result, Uid};
use serde::{Deserialize, Serialize};

/// Canonical identifier of a stored sample: its uid and its 0-based index
/// among that uid's samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SampleKey {
    pub uid: Uid,
    pub index: u32,
}

impl SampleKey {
    #[inline]
    #[must_use]
    pub fn new(uid: Uid, index: u32) -> Self {
        Self { uid, index }
    }
}

impl std::fmt::Display for SampleKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.uid, self.index)
    }
}

/// File naming for stored samples, e.g. `0001.0003.jpg`.
///
/// The same scheme must be used to write and to read a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingScheme {
    pub uid_width: usize,
    pub index_width: usize,
    pub separator: char,
    pub extension: String,
}

impl Default for NamingScheme {
    fn default() -> Self {
        Self {
            uid_width: 4,
            index_width: 4,
            separator: '.',
            extension: "jpg".to_string(),
        }
    }
}

impl NamingScheme {
    pub fn validate(&self) -> Result<()> {
        if self.uid_width == 0 || self.index_width == 0 {
            return Err(Error::InvalidConfig("padding widths must be positive".to_string()));
        }
        if self.separator.is_ascii_digit() || self.extension.contains(self.separator) {
            return Err(Error::InvalidConfig(format!(
                "separator {:?} is ambiguous with extension {:?}",
                self.separator, self.extension
            )));
        }
        if self.extension.is_empty() {
            return Err(Error::InvalidConfig("extension must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn file_name(&self, key: SampleKey) -> String {
        format!(
            "{:0uw$}{sep}{:0iw$}.{ext}",
            key.uid.0,
            key.index,
            uw = self.uid_width,
            iw = self.index_width,
            sep = self.separator,
            ext = self.extension,
        )
    }

    /// Whether `name` carries this scheme's extension
    pub fn has_extension(&self, name: &str) -> bool {
        name.rsplit_once('.')
            .map(|(_, ext)| ext == self.extension)
            .unwrap_or(false)
    }

    /// Recover the key from a file name. Returns `None` for names with
    /// another extension, without numeric uid/index components, or not in
    /// the exact padded form `file_name` produces for that key.
    pub fn parse(&self, name: &str) -> Option<SampleKey> {
        let (stem, ext) = name.rsplit_once('.')?;
        if ext != self.extension {
            return None;
        }

        let mut parts = stem.split(self.separator);
        let uid = parts.next()?.parse::<u32>().ok()?;
        let index = parts.next()?.parse::<u32>().ok()?;
        if parts.next().is_some() {
            return None;
        }

        let key = SampleKey::new(Uid(uid), index);
        (self.file_name(key) == name).then_some(key)
    }
}
