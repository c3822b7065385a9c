use dirbase_fs::FileRecord;
use hashbrown::HashMap;
use log::debug;
use serde::{Deserialize, Serialize};

/// Differences between a fresh scan and a baseline.
///
/// `modified` and `new` hold scan records in scan order; `deleted` holds
/// baseline records in baseline order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffReport {
    pub modified: Vec<FileRecord>,
    pub new: Vec<FileRecord>,
    pub deleted: Vec<FileRecord>,
}

impl DiffReport {
    pub fn is_empty(&self) -> bool {
        self.modified.is_empty() && self.new.is_empty() && self.deleted.is_empty()
    }

    pub fn total(&self) -> usize {
        self.modified.len() + self.new.len() + self.deleted.len()
    }
}

/// Three-way diff of `scan` against `baseline`.
///
/// A record is unchanged when a baseline record has the same path and size.
/// Otherwise it is modified when its path is still in the baseline and new
/// when it is not. Baseline records left unmatched are deleted. Records
/// differing only in permissions or mtime count as unchanged.
pub fn diff(scan: &[FileRecord], baseline: &[FileRecord]) -> DiffReport {
    let mut consumed = vec![false; baseline.len()];

    let mut by_identity: HashMap<(&str, u64), Vec<usize>> = HashMap::with_capacity(baseline.len());
    for (i, rec) in baseline.iter().enumerate().rev() {
        by_identity.entry(rec.identity()).or_default().push(i);
    }

    let mut candidates: Vec<&FileRecord> = Vec::new();
    for rec in scan {
        match by_identity.get_mut(&rec.identity()).and_then(Vec::pop) {
            Some(i) => consumed[i] = true,
            None => candidates.push(rec),
        }
    }
    drop(by_identity);

    let mut by_path: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, rec) in baseline.iter().enumerate().rev() {
        if !consumed[i] {
            by_path.entry(rec.path.as_str()).or_default().push(i);
        }
    }

    let mut report = DiffReport::default();
    for rec in candidates {
        match by_path.get_mut(rec.path.as_str()).and_then(Vec::pop) {
            Some(i) => {
                consumed[i] = true;
                report.modified.push(rec.clone());
            }
            None => report.new.push(rec.clone()),
        }
    }

    report.deleted = baseline
        .iter()
        .zip(&consumed)
        .filter(|(_, c)| !**c)
        .map(|(rec, _)| rec.clone())
        .collect();

    debug!(
        "[diff] scan {} vs baseline {}: {} modified, {} new, {} deleted",
        scan.len(),
        baseline.len(),
        report.modified.len(),
        report.new.len(),
        report.deleted.len()
    );

    report
}

#[cfg(test)]
#[path = "diff_tests.rs"]
mod tests;
