//! Positional result placement

use tracing::warn;

use subtake_common::ScanResult;

pub const ABORTED_PROBE: &str = "probe task aborted";

/// One reserved slot per input subdomain, each written at most once.
#[derive(Debug)]
pub struct ResultSlots {
    slots: Vec<Option<ScanResult>>,
}

impl ResultSlots {
    pub fn new(len: usize) -> Self {
        Self {
            slots: (0..len).map(|_| None).collect(),
        }
    }

    /// Write `result` into slot `index`. Returns false (and keeps the
    /// existing value) if the slot is out of range or already filled.
    pub fn place(&mut self, index: usize, result: ScanResult) -> bool {
        match self.slots.get_mut(index) {
            Some(slot @ None) => {
                *slot = Some(result);
                true
            }
            Some(Some(_)) => {
                warn!("result slot {} already filled; dropping duplicate", index);
                false
            }
            None => {
                warn!("result slot {} out of range ({} slots)", index, self.slots.len());
                false
            }
        }
    }

    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Results in input order. Slots never written (a worker task died) get
    /// an error result so the output always has one entry per subdomain.
    pub fn into_results(self, subdomains: &[String]) -> Vec<ScanResult> {
        self.slots
            .into_iter()
            .zip(subdomains)
            .map(|(slot, subdomain)| {
                slot.unwrap_or_else(|| ScanResult::failed(subdomain.as_str(), ABORTED_PROBE))
            })
            .collect()
    }
}
