use crate::face::{Face, Person, Uid};
use ahash::AHashMap;
use std::collections::BTreeSet;

/// An ordered collection of labeled face samples.
///
/// Besides the samples themselves the warehouse keeps a ledger of the
/// sample indices in use per uid. Enrollment allocation and deletion read
/// that ledger instead of re-counting files, so a gap left by a partial
/// deletion never shifts later indices.
#[derive(Debug, Default, Clone)]
pub struct Warehouse {
    faces: Vec<Face>,
    ledger: AHashMap<Uid, BTreeSet<u32>>,
}

impl Warehouse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample. A sample without an index is given the next free
    /// index for its uid.
    pub fn add(&mut self, mut face: Face) {
        let index = match face.index {
            Some(index) => index,
            None => {
                let next = self.next_index(face.uid);
                face.index = Some(next);
                next
            }
        };
        self.ledger.entry(face.uid).or_default().insert(index);
        self.faces.push(face);
    }

    /// Mark `index` as in use for `uid` without adding a sample, for stored
    /// files that yielded no face
    pub fn record_index(&mut self, uid: Uid, index: u32) {
        self.ledger.entry(uid).or_default().insert(index);
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// All samples in insertion order
    pub fn get_faces(&self) -> std::slice::Iter<'_, Face> {
        self.faces.iter()
    }

    pub fn get_faces_mut(&mut self) -> std::slice::IterMut<'_, Face> {
        self.faces.iter_mut()
    }

    /// One person per distinct uid, in order of first appearance
    pub fn get_persons(&self) -> Vec<Person> {
        let mut positions: AHashMap<Uid, usize> = AHashMap::new();
        let mut persons: Vec<Person> = Vec::new();

        for face in &self.faces {
            match positions.get(&face.uid) {
                Some(&pos) => persons[pos].samples += 1,
                None => {
                    positions.insert(face.uid, persons.len());
                    persons.push(Person {
                        uid: face.uid,
                        samples: 1,
                    });
                }
            }
        }

        persons
    }

    /// Distinct uids, ascending
    pub fn uids(&self) -> Vec<Uid> {
        let mut uids: Vec<Uid> = self.ledger.keys().copied().collect();
        uids.sort_unstable();
        uids
    }

    #[inline]
    pub fn contains_uid(&self, uid: Uid) -> bool {
        self.ledger.contains_key(&uid)
    }

    /// Sample indices recorded for `uid`, ascending
    pub fn indices(&self, uid: Uid) -> Vec<u32> {
        self.ledger
            .get(&uid)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// One past the highest index in use for `uid`, 0 for an unknown uid
    pub fn next_index(&self, uid: Uid) -> u32 {
        self.ledger
            .get(&uid)
            .and_then(|set| set.iter().next_back())
            .map(|last| last + 1)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GrayImage;

    fn face(uid: u32) -> Face {
        Face::new(GrayImage::new(2, 2), Uid(uid))
    }

    #[test]
    fn test_empty_warehouse() {
        let wh = Warehouse::new();
        assert!(wh.is_empty());
        assert_eq!(wh.get_faces().count(), 0);
        assert!(wh.get_persons().is_empty());
        assert!(wh.uids().is_empty());
        assert_eq!(wh.next_index(Uid(7)), 0);
    }

    #[test]
    fn test_insertion_order_and_restartable_traversal() {
        let mut wh = Warehouse::new();
        for uid in [3, 1, 3, 0] {
            wh.add(face(uid));
        }
        let first: Vec<u32> = wh.get_faces().map(|f| f.uid.0).collect();
        let second: Vec<u32> = wh.get_faces().map(|f| f.uid.0).collect();
        assert_eq!(first, vec![3, 1, 3, 0]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_persons_grouping() {
        let mut wh = Warehouse::new();
        for uid in [3, 1, 3, 0, 3] {
            wh.add(face(uid));
        }
        let persons = wh.get_persons();
        assert_eq!(
            persons,
            vec![
                Person { uid: Uid(3), samples: 3 },
                Person { uid: Uid(1), samples: 1 },
                Person { uid: Uid(0), samples: 1 },
            ]
        );
        assert_eq!(wh.uids(), vec![Uid(0), Uid(1), Uid(3)]);
    }

    #[test]
    fn test_auto_assigned_indices() {
        let mut wh = Warehouse::new();
        wh.add(face(1));
        wh.add(face(1));
        wh.add(face(2));
        let indices: Vec<Option<u32>> = wh.get_faces().map(|f| f.index).collect();
        assert_eq!(indices, vec![Some(0), Some(1), Some(0)]);
        assert_eq!(wh.next_index(Uid(1)), 2);
    }

    #[test]
    fn test_ledger_tolerates_gaps() {
        let mut wh = Warehouse::new();
        wh.add(face(1).with_index(0));
        wh.add(face(1).with_index(2));
        assert_eq!(wh.indices(Uid(1)), vec![0, 2]);
        assert_eq!(wh.next_index(Uid(1)), 3);
    }

    #[test]
    fn test_recorded_index_without_sample() {
        let mut wh = Warehouse::new();
        wh.record_index(Uid(2), 0);
        assert!(wh.is_empty());
        assert!(wh.contains_uid(Uid(2)));
        assert_eq!(wh.next_index(Uid(2)), 1);
        assert!(wh.get_persons().is_empty());
    }

    #[test]
    fn test_faces_sharing_a_source_index() {
        // two faces detected in the same stored file
        let mut wh = Warehouse::new();
        wh.add(face(4).with_index(0));
        wh.add(face(4).with_index(0));
        assert_eq!(wh.len(), 2);
        assert_eq!(wh.indices(Uid(4)), vec![0]);
        assert_eq!(wh.next_index(Uid(4)), 1);
    }
}
