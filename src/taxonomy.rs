//! The canonical waste taxonomy: the two classes every engine, dataset
//! label and API response agrees on, plus the disposal-guidance metadata
//! attached to each class.

use std::fmt;

use lazy_static::lazy_static;
use serde::Serialize;

/// A waste class in canonical index order. The index order is the model's
/// logit order and must never change independently of the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WasteClass {
    Biodegradable = 0,
    NonBiodegradable = 1,
}

impl WasteClass {
    pub const COUNT: usize = 2;

    /// All classes in canonical index order.
    pub fn all() -> [WasteClass; Self::COUNT] {
        [WasteClass::Biodegradable, WasteClass::NonBiodegradable]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<WasteClass> {
        match index {
            0 => Some(WasteClass::Biodegradable),
            1 => Some(WasteClass::NonBiodegradable),
            _ => None,
        }
    }

    /// The wire-format class name used in API responses and provider
    /// labels.
    pub fn canonical_name(self) -> &'static str {
        match self {
            WasteClass::Biodegradable => "biodegradable",
            WasteClass::NonBiodegradable => "non_biodegradable",
        }
    }

    /// Resolves a provider-reported label to a class. Matching is
    /// case-insensitive and tolerates surrounding whitespace; anything
    /// outside the taxonomy is `None`.
    pub fn from_label(label: &str) -> Option<WasteClass> {
        match label.trim().to_ascii_lowercase().as_str() {
            "biodegradable" => Some(WasteClass::Biodegradable),
            "non_biodegradable" => Some(WasteClass::NonBiodegradable),
            _ => None,
        }
    }
}

impl fmt::Display for WasteClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

/// Disposal-guidance metadata for one waste class, returned alongside
/// predictions by the CLI and available to API consumers.
#[derive(Debug, Clone, Serialize)]
pub struct ClassInfo {
    pub label: &'static str,
    pub description: &'static str,
    pub recyclable: bool,
    pub disposal: &'static str,
    pub example_items: &'static [&'static str],
    pub environmental_benefit: &'static str,
    pub protection_tip: &'static str,
    pub poor_disposal_effects: &'static str,
}

lazy_static! {
    /// Per-class metadata, indexed in canonical class order.
    static ref TAXONOMY: [ClassInfo; WasteClass::COUNT] = [
        ClassInfo {
            label: "biodegradable",
            description: "Easily breaks down naturally. Good for composting.",
            recyclable: false,
            disposal: "Use compost or organic bin",
            example_items: &["banana peel", "food waste", "paper"],
            environmental_benefit: "Composting biodegradable waste returns nutrients to the \
                soil, reduces landfill use, and lowers greenhouse gas emissions.",
            protection_tip: "Compost at home or use municipal organic waste bins. Avoid \
                mixing with plastics or hazardous waste.",
            poor_disposal_effects: "If disposed of improperly, biodegradable waste can cause \
                methane emissions in landfills and contribute to water pollution and \
                eutrophication.",
        },
        ClassInfo {
            label: "non_biodegradable",
            description: "Does not break down easily. Should be disposed of carefully.",
            recyclable: false,
            disposal: "Use general waste bin or recycling if possible",
            example_items: &["plastic bag", "styrofoam", "metal can"],
            environmental_benefit: "Proper disposal and recycling of non-biodegradable waste \
                reduces pollution, conserves resources, and protects wildlife.",
            protection_tip: "Reduce use, reuse items, and recycle whenever possible. Never \
                burn or dump in nature.",
            poor_disposal_effects: "Improper disposal leads to soil and water pollution, \
                harms wildlife, and causes long-term environmental damage. Plastics can \
                persist for hundreds of years.",
        },
    ];
}

/// Metadata for a class. Total over the enum, so no failure path.
pub fn class_info(class: WasteClass) -> &'static ClassInfo {
    &TAXONOMY[class.index()]
}

/// Checks the metadata table against the enum at startup. The table is
/// hand-maintained, so a label drifting out of sync with
/// [`WasteClass::canonical_name`] must abort before traffic is served.
pub fn validate() -> Result<(), String> {
    for class in WasteClass::all() {
        let info = class_info(class);
        if info.label != class.canonical_name() {
            return Err(format!(
                "taxonomy metadata mismatch at index {}: {} != {}",
                class.index(),
                info.label,
                class.canonical_name()
            ));
        }
        if WasteClass::from_label(info.label) != Some(class) {
            return Err(format!("label {} does not resolve to its own class", info.label));
        }
    }
    Ok(())
}
