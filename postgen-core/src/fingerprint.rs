//! Change detection over the raw sheet export.

use sha2::{Digest, Sha256};

use crate::error::PostgenResult;
use crate::store::KeyValueStore;

/// Hex characters kept from the digest.
pub const FINGERPRINT_LEN: usize = 9;

const FINGERPRINT_KEY: &str = "fingerprint.txt";

/// Short content hash of a sheet export.
pub fn fingerprint(raw: &str) -> String {
    let digest = hex::encode(Sha256::digest(raw.as_bytes()));
    digest[..FINGERPRINT_LEN].to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetStatus {
    Changed,
    Unchanged,
}

/// Compares each fetched sheet against the last fingerprint seen.
pub struct ChangeDetector<S> {
    store: S,
}

impl<S: KeyValueStore> ChangeDetector<S> {
    pub fn new(store: S) -> Self {
        ChangeDetector { store }
    }

    /// Record `raw` as the latest sheet and report whether it differs from
    /// the previous one. A first run, with nothing stored, counts as changed.
    pub fn check(&mut self, raw: &str) -> PostgenResult<(String, SheetStatus)> {
        let current = fingerprint(raw);
        let previous = self.store.get(FINGERPRINT_KEY)?;

        if previous.as_deref().map(str::trim) == Some(current.as_str()) {
            tracing::info!(fingerprint = %current, "Sheet unchanged");
            return Ok((current, SheetStatus::Unchanged));
        }

        self.store.put(FINGERPRINT_KEY, &current)?;
        tracing::info!(fingerprint = %current, previous = ?previous, "Sheet changed");
        Ok((current, SheetStatus::Changed))
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_fingerprint_is_short_and_stable() {
        let a = fingerprint("Timestamp,Date\n");
        assert_eq!(a.len(), FINGERPRINT_LEN);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(a, fingerprint("Timestamp,Date\n"));
        assert_ne!(a, fingerprint("Timestamp,Date\r\n"));
    }

    #[test]
    fn test_first_sheet_is_changed_then_unchanged() {
        let mut detector = ChangeDetector::new(MemoryStore::new());

        let (fp, status) = detector.check("a,b\n1,2\n").unwrap();
        assert_eq!(status, SheetStatus::Changed);
        assert_eq!(
            detector.store().get(FINGERPRINT_KEY).unwrap(),
            Some(fp.clone())
        );

        let (again, status) = detector.check("a,b\n1,2\n").unwrap();
        assert_eq!(status, SheetStatus::Unchanged);
        assert_eq!(again, fp);
    }

    #[test]
    fn test_edited_sheet_replaces_fingerprint() {
        let mut detector = ChangeDetector::new(MemoryStore::new());
        detector.check("a,b\n1,2\n").unwrap();

        let (fp, status) = detector.check("a,b\n1,3\n").unwrap();
        assert_eq!(status, SheetStatus::Changed);
        assert_eq!(detector.store().get(FINGERPRINT_KEY).unwrap(), Some(fp));
    }
}
