//! The loaded records of one grid.

use std::collections::HashMap;

use shipdeck_lib::model::FieldPatch;
use shipdeck_lib::model::Record;
use shipdeck_lib::model::RecordId;
use shipdeck_lib::model::RecordKind;

/// Records in load order, indexed by id.
///
/// Every mutation bumps [`generation`](Self::generation) so derived data
/// can be memoized on it.
#[derive(Debug, Clone)]
pub struct RecordCache {
    kind: RecordKind,
    records: Vec<Record>,
    index: HashMap<RecordId, usize>,
    generation: u64,
}

impl RecordCache {
    pub fn new(kind: RecordKind) -> Self {
        Self {
            kind,
            records: Vec::new(),
            index: HashMap::new(),
            generation: 0,
        }
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.index.get(id).map(|&i| &self.records[i])
    }

    pub fn position(&self, id: &RecordId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.index.contains_key(id)
    }

    /// Replaces every record.
    ///
    /// Records of another kind are skipped. A repeated id keeps the last
    /// occurrence.
    pub fn replace(&mut self, records: Vec<Record>) {
        let kind = self.kind;
        let (records, foreign): (Vec<_>, Vec<_>) =
            records.into_iter().partition(|r| r.kind() == kind);
        if !foreign.is_empty() {
            log::warn!("Skipped {} record(s) not of kind {kind}", foreign.len());
        }

        self.records.clear();
        self.index.clear();
        for record in records {
            match self.index.get(record.id()) {
                Some(&i) => self.records[i] = record,
                None => {
                    self.index.insert(record.id().clone(), self.records.len());
                    self.records.push(record);
                }
            }
        }
        self.generation += 1;
    }

    /// Applies a patch to a cached record.
    ///
    /// Returns `false` if the record is not loaded.
    pub fn apply(&mut self, id: &RecordId, patch: &FieldPatch) -> bool {
        let Some(&i) = self.index.get(id) else {
            return false;
        };
        self.records[i].apply(patch);
        self.generation += 1;
        true
    }

    /// Stores the current version of a loaded record.
    pub fn put(&mut self, record: Record) -> bool {
        let Some(&i) = self.index.get(record.id()) else {
            return false;
        };
        self.records[i] = record;
        self.generation += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipdeck_lib::model::Value;

    #[test]
    fn test_replace_and_patch() {
        let mut cache = RecordCache::new(RecordKind::Shipment);
        cache.replace(vec![
            Record::new(RecordKind::Shipment, "a").set("naviera", "MSC"),
            Record::new(RecordKind::Transport, "t"),
            Record::new(RecordKind::Shipment, "b"),
            Record::new(RecordKind::Shipment, "a").set("naviera", "ONE"),
        ]);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.generation(), 1);

        let a = RecordId::from("a");
        assert_eq!(cache.get(&a).unwrap().value("naviera"), &Value::from("ONE"));
        assert_eq!(cache.position(&RecordId::from("b")), Some(1));

        assert!(cache.apply(&a, &FieldPatch::single("naviera", "HAPAG")));
        assert!(!cache.apply(&RecordId::from("zz"), &FieldPatch::single("naviera", "X")));
        assert_eq!(cache.generation(), 2);
        assert_eq!(cache.get(&a).unwrap().value("naviera"), &Value::from("HAPAG"));
    }
}
