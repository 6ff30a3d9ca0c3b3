//! Process-lifetime deduplication ledger.
//!
//! A run-scoped set of seen identity keys. `DashSet::insert` is an atomic
//! check-and-insert, so admission stays race-free even when candidates
//! arrive from concurrent stages. Keys are never removed within a run.

use dashmap::DashSet;

use crate::records::LawyerRecord;

/// Identity ledger for one run.
#[derive(Debug, Default)]
pub struct DedupLedger {
    seen: DashSet<String>,
}

impl DedupLedger {
    #[must_use]
    pub fn new() -> Self {
        Self {
            seen: DashSet::new(),
        }
    }

    /// Admit a candidate record. Returns true exactly once per identity key.
    pub fn admit(&self, record: &LawyerRecord) -> bool {
        self.seen.insert(record.identity_key())
    }

    /// Number of distinct identities admitted so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admit_is_idempotent_within_a_run() {
        let ledger = DedupLedger::new();
        let mut record = LawyerRecord::new();
        record.profile_url = Some("https://example.com/lawyers/tax/jane-doe".to_string());

        assert!(ledger.admit(&record));
        assert!(!ledger.admit(&record));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_fresh_ledger_admits_again() {
        let mut record = LawyerRecord::new();
        record.profile_url = Some("https://example.com/lawyers/tax/jane-doe".to_string());

        let first = DedupLedger::new();
        let second = DedupLedger::new();
        assert!(first.admit(&record));
        assert!(second.admit(&record));
    }

    #[test]
    fn test_composite_key_fallback_collision() {
        let ledger = DedupLedger::new();

        let mut a = LawyerRecord::new();
        a.set_name("Jane Doe");
        a.location = Some("Austin, TX".to_string());
        a.firm_name = Some("Doe LLP".to_string());

        let mut b = a.clone();
        assert!(ledger.admit(&a));
        assert!(!ledger.admit(&b));

        // Any differing component makes a distinct identity.
        b.firm_name = Some("Other LLP".to_string());
        assert!(ledger.admit(&b));
    }
}
