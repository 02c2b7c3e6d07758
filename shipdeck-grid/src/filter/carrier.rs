//! Vessel to carrier cross-reference.
//!
//! Vessels are often shared between carriers. Filtering by a carrier also
//! shows rows booked on a vessel that carrier operates, even when the row
//! names another carrier.

use std::collections::HashMap;

use shipdeck_lib::model::Record;

use crate::cache::RecordCache;

/// Carriers seen per vessel, in first-seen order.
///
/// Names are compared exactly as stored, case and surrounding spaces
/// included. Records missing either name are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VesselCarrierIndex {
    carriers: HashMap<String, Vec<String>>,
}

impl VesselCarrierIndex {
    pub fn build<'a>(
        records: impl IntoIterator<Item = &'a Record>,
        vessel_field: &str,
        carrier_field: &str,
    ) -> Self {
        let mut carriers: HashMap<String, Vec<String>> = HashMap::new();
        for record in records {
            let vessel = record.value(vessel_field).to_text();
            let carrier = record.value(carrier_field).to_text();
            if vessel.is_empty() || carrier.is_empty() {
                continue;
            }
            let entry = carriers.entry(vessel).or_default();
            if !entry.contains(&carrier) {
                entry.push(carrier);
            }
        }
        Self { carriers }
    }

    pub fn carriers_of(&self, vessel: &str) -> &[String] {
        self.carriers
            .get(vessel)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.carriers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.carriers.is_empty()
    }

    /// Returns `true` if the row's carrier is wanted, or its vessel is
    /// operated by a wanted carrier. No wanted carriers matches everything.
    pub fn matches(&self, wanted: &[&str], carrier: &str, vessel: &str) -> bool {
        if wanted.is_empty() || wanted.contains(&carrier) {
            return true;
        }
        self.carriers_of(vessel)
            .iter()
            .any(|c| wanted.contains(&c.as_str()))
    }
}

/// A [`VesselCarrierIndex`] rebuilt only when the cache generation changes.
#[derive(Debug, Clone, Default)]
pub struct CarrierIndexMemo {
    generation: Option<u64>,
    index: VesselCarrierIndex,
}

impl CarrierIndexMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(
        &mut self,
        cache: &RecordCache,
        vessel_field: &str,
        carrier_field: &str,
    ) -> &VesselCarrierIndex {
        if self.generation != Some(cache.generation()) {
            self.index = VesselCarrierIndex::build(cache.iter(), vessel_field, carrier_field);
            self.generation = Some(cache.generation());
            log::trace!("Rebuilt carrier index over {} vessel(s)", self.index.len());
        }
        &self.index
    }

    /// Generation the index was last built for.
    pub fn generation(&self) -> Option<u64> {
        self.generation
    }
}

/// Vessels offered by the filter panel: `(raw name, display name)`.
///
/// One entry per raw vessel name, first-seen voyage, sorted by display name
/// ignoring case.
pub fn filterable_vessels<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    vessel_field: &str,
    voyage_field: &str,
) -> Vec<(String, String)> {
    let mut seen: Vec<(String, String)> = Vec::new();
    for record in records {
        let raw = record.value(vessel_field).to_text();
        let vessel = raw.trim();
        if vessel.is_empty() || seen.iter().any(|(seen_raw, _)| *seen_raw == raw) {
            continue;
        }
        let voyage = record.value(voyage_field).to_text();
        let display = if !voyage.trim().is_empty() && !vessel.contains('[') {
            format!("{vessel} [{}]", voyage.trim())
        } else {
            vessel.to_string()
        };
        seen.push((raw.clone(), display));
    }
    seen.sort_by_cached_key(|(_, display)| display.to_lowercase());
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipdeck_lib::model::RecordKind;
    use shipdeck_lib::model::fields;

    fn booking(id: &str, vessel: &str, carrier: &str) -> Record {
        Record::new(RecordKind::Shipment, id)
            .set(fields::NAVE_INICIAL, vessel)
            .set(fields::NAVIERA, carrier)
    }

    #[test]
    fn test_index_first_seen_and_case_sensitive() {
        let records = vec![
            booking("1", "MSC ANNA", "MSC"),
            booking("2", "MSC ANNA", "Hapag"),
            booking("3", "MSC ANNA", "MSC"),
            booking("4", "MSC ANNA", "msc"),
            booking("5", "", "ONE"),
            booking("6", "ONE APUS", ""),
        ];
        let index = VesselCarrierIndex::build(&records, fields::NAVE_INICIAL, fields::NAVIERA);
        assert_eq!(index.carriers_of("MSC ANNA"), ["MSC", "Hapag", "msc"]);
        assert!(index.carriers_of("ONE APUS").is_empty());
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_names_are_not_trimmed() {
        let records = vec![booking("1", "MSC ANNA", "MSC "), booking("2", "MSC ANNA ", "ONE")];
        let index = VesselCarrierIndex::build(&records, fields::NAVE_INICIAL, fields::NAVIERA);
        assert_eq!(index.carriers_of("MSC ANNA"), ["MSC "]);
        assert_eq!(index.carriers_of("MSC ANNA "), ["ONE"]);
        assert!(!index.matches(&["MSC"], "ONE", "MSC ANNA "));
        assert!(!index.matches(&["MSC"], "MSC ", "SANTOS"));
    }

    #[test]
    fn test_shared_vessel_matches() {
        let records = vec![booking("1", "X", "A"), booking("2", "X", "B"), booking("3", "Y", "C")];
        let index = VesselCarrierIndex::build(&records, fields::NAVE_INICIAL, fields::NAVIERA);
        assert!(index.matches(&["A"], "B", "X"));
        assert!(!index.matches(&["A"], "C", "Y"));
        assert!(index.matches(&[], "C", "Y"));
    }

    #[test]
    fn test_memo_follows_generation() {
        let mut cache = RecordCache::new(RecordKind::Shipment);
        cache.replace(vec![booking("1", "X", "A")]);
        let mut memo = CarrierIndexMemo::new();
        memo.get(&cache, fields::NAVE_INICIAL, fields::NAVIERA);
        assert_eq!(memo.generation(), Some(1));

        cache.replace(vec![booking("1", "X", "A"), booking("2", "X", "B")]);
        let index = memo.get(&cache, fields::NAVE_INICIAL, fields::NAVIERA);
        assert_eq!(index.carriers_of("X"), ["A", "B"]);
        assert_eq!(memo.generation(), Some(2));
    }

    #[test]
    fn test_filterable_vessels() {
        let records = vec![
            booking("1", "zim iris", "ZIM").set(fields::VIAJE, "12E"),
            booking("2", "MSC ANNA", "MSC"),
            booking("3", "zim iris", "ZIM").set(fields::VIAJE, "13E"),
            booking("4", "ONE APUS [023W]", "ONE").set(fields::VIAJE, "999"),
        ];
        let vessels = filterable_vessels(&records, fields::NAVE_INICIAL, fields::VIAJE);
        let display: Vec<_> = vessels.iter().map(|(_, d)| d.as_str()).collect();
        assert_eq!(display, ["MSC ANNA", "ONE APUS [023W]", "zim iris [12E]"]);
    }
}
