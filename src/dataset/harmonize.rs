use crate::taxonomy::WasteClass;

use super::DatasetError;

/// Maps raw, folder-order-derived label indices onto the canonical
/// taxonomy.
///
/// Folder enumeration is alphabetic, which is not guaranteed to match the
/// semantic class order, so the mapping is derived from the observed
/// folder names rather than assumed. With two classes this reduces to
/// identity or swap; any other observed ordering is rejected instead of
/// guessed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelMapping {
    swap: bool,
}

/// Folder names accepted for each canonical class. The original corpus
/// used O (organic) and R (recyclable) folders.
fn canonical_for_folder(folder: &str) -> Option<WasteClass> {
    match folder {
        "O" | "o" | "organic" | "biodegradable" => Some(WasteClass::Biodegradable),
        "R" | "r" | "recyclable" | "non_biodegradable" => Some(WasteClass::NonBiodegradable),
        _ => None,
    }
}

impl LabelMapping {
    /// Derives the mapping from the observed folder-name sequence.
    ///
    /// Returns `UnrecognizedTaxonomy` when any folder name fails to
    /// resolve, a class appears twice, or the folder count does not match
    /// the taxonomy.
    pub fn from_observed(observed_order: &[String]) -> Result<Self, DatasetError> {
        let unrecognized = || DatasetError::UnrecognizedTaxonomy(observed_order.to_vec());

        if observed_order.len() != WasteClass::COUNT {
            return Err(unrecognized());
        }

        let mut resolved = Vec::with_capacity(observed_order.len());
        for name in observed_order {
            let class = canonical_for_folder(name).ok_or_else(unrecognized)?;
            if resolved.contains(&class) {
                return Err(unrecognized());
            }
            resolved.push(class);
        }

        if resolved == WasteClass::all() {
            Ok(LabelMapping { swap: false })
        } else {
            // Two distinct resolved classes out of canonical order can
            // only be the exact reverse.
            Ok(LabelMapping { swap: true })
        }
    }

    pub fn is_swap(&self) -> bool {
        self.swap
    }

    /// Maps a raw label index to its canonical class. Applied exactly once
    /// per record while the corpus is built; in the swap case the mapping
    /// is an involution on indices, in the identity case a no-op.
    pub fn apply(&self, raw_index: usize) -> Option<WasteClass> {
        if raw_index >= WasteClass::COUNT {
            return None;
        }
        let canonical = if self.swap {
            (WasteClass::COUNT - 1) - raw_index
        } else {
            raw_index
        };
        WasteClass::from_index(canonical)
    }
}
