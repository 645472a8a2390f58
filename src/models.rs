use serde::Serialize;

/// Models the service knows how to fetch and run locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinModel {
    /// ViT fine-tuned on the two-class waste corpus, exported to ONNX.
    WasteVit,
}

/// Download metadata for a builtin model.
///
/// `sha256` is optional: hub artifacts are revisioned in place, so a pinned
/// hash is only present where the artifact is known to be frozen. When it
/// is `None` the manager skips verification and logs a warning.
#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub name: &'static str,
    pub model_url: &'static str,
    pub sha256: Option<&'static str>,
}

/// Fixed properties of a model the pipeline needs to know about.
#[derive(Debug, Clone, Serialize)]
pub struct ModelCharacteristics {
    /// Expected input edge length in pixels (inputs are square).
    pub input_size: u32,
    /// Number of output logits; must equal the taxonomy size.
    pub num_classes: usize,
    pub model_size_mb: usize,
}

impl BuiltinModel {
    pub fn get_model_info(&self) -> ModelInfo {
        match self {
            BuiltinModel::WasteVit => ModelInfo {
                name: "waste-vit",
                model_url: "https://huggingface.co/Claudineuwa/waste_classifier_Isaac/resolve/main/onnx/model.onnx",
                sha256: None,
            },
        }
    }

    pub fn characteristics(&self) -> ModelCharacteristics {
        match self {
            BuiltinModel::WasteVit => ModelCharacteristics {
                input_size: 224,
                num_classes: crate::taxonomy::WasteClass::COUNT,
                model_size_mb: 330,
            },
        }
    }
}
