use crate::naming::SampleKey;
use facegate_core::{Identity, Uid, Warehouse};

/// Computes where a new sample goes and which samples a deletion removes.
///
/// Both answers come from the training warehouse's ledger, so they describe
/// exactly the snapshot the engine was last fitted from.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnrollmentAllocator;

impl EnrollmentAllocator {
    pub fn new() -> Self {
        Self
    }

    /// Key for the next sample of `identity`.
    ///
    /// A new identity takes the smallest uid not in use (first gap, not
    /// max + 1) with index 0. An existing identity gets the index after its
    /// highest stored one.
    pub fn allocate(&self, gallery: &Warehouse, identity: Identity) -> SampleKey {
        match identity {
            Identity::New => SampleKey::new(self.free_uid(gallery), 0),
            Identity::Existing(uid) => SampleKey::new(uid, gallery.next_index(uid)),
        }
    }

    /// Smallest non-negative uid absent from the gallery
    pub fn free_uid(&self, gallery: &Warehouse) -> Uid {
        let mut candidate = 0u32;
        for uid in gallery.uids() {
            if uid.0 != candidate {
                break;
            }
            candidate += 1;
        }
        Uid(candidate)
    }

    /// Every key recorded for `uid`, ascending
    pub fn deletion_targets(&self, gallery: &Warehouse, uid: Uid) -> Vec<SampleKey> {
        gallery
            .indices(uid)
            .into_iter()
            .map(|index| SampleKey::new(uid, index))
            .collect()
    }
}
