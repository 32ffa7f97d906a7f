//! Model artifact persistence.

use super::network::Network;
use crate::errors::ModelError;
use std::path::Path;
use tracing::info;

/// Writes `network` to `path` as JSON.
///
/// The parent directory must already exist.
///
/// # Errors
///
/// Returns [`ModelError::Serialization`] if encoding or the write fails.
pub fn save_model(path: &Path, network: &Network) -> Result<(), ModelError> {
    let fail = |message: String| ModelError::Serialization {
        path: path.to_path_buf(),
        message,
    };
    let json = serde_json::to_vec_pretty(network).map_err(|e| fail(e.to_string()))?;
    std::fs::write(path, json).map_err(|e| fail(e.to_string()))?;
    info!(
        path = %path.display(),
        network = %network.name,
        layers = network.layers().len(),
        "Saved model"
    );
    Ok(())
}

/// Reads a network previously written by [`save_model`].
///
/// # Errors
///
/// Returns [`ModelError::Serialization`] if the file is missing or invalid.
pub fn load_model(path: &Path) -> Result<Network, ModelError> {
    let fail = |message: String| ModelError::Serialization {
        path: path.to_path_buf(),
        message,
    };
    let raw = std::fs::read(path).map_err(|e| fail(e.to_string()))?;
    let network: Network = serde_json::from_slice(&raw).map_err(|e| fail(e.to_string()))?;
    network.check_consistency().map_err(fail)?;
    info!(path = %path.display(), network = %network.name, "Loaded model");
    Ok(network)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ImageShape, WeightsSource};
    use crate::model::{BuiltinZoo, ModelZoo, PretrainedRequest, Architecture};

    #[test]
    fn test_save_then_load_preserves_network() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("base_model.json");
        let mut net = BuiltinZoo
            .pretrained(&PretrainedRequest {
                architecture: Architecture::Vgg16,
                input_shape: ImageShape::new(64, 64, 3).unwrap(),
                weights: WeightsSource::None,
                include_top: false,
            })
            .unwrap();
        net.freeze_all_but_last(3);

        save_model(&path, &net).unwrap();
        let loaded = load_model(&path).unwrap();
        assert_eq!(loaded, net);
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let net = Network::new("n", ImageShape::new(32, 32, 3).unwrap(), WeightsSource::None);

        let err = save_model(&tmp.path().join("missing/model.json"), &net).unwrap_err();
        assert!(matches!(err, ModelError::Serialization { .. }));
    }

    #[test]
    fn test_load_rejects_garbage() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("model.json");
        std::fs::write(&path, b"{not json").unwrap();

        assert!(load_model(&path).is_err());
    }

    #[test]
    fn test_load_rejects_network_without_layers() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("base_model.json");
        std::fs::write(
            &path,
            r#"{"name":"vgg16","input_shape":[224,224,3],"weights":"imagenet","layers":[],"trainable":{},"compile":null}"#,
        )
        .unwrap();

        let err = load_model(&path).unwrap_err();
        assert!(matches!(err, ModelError::Serialization { .. }));
        assert!(err.to_string().contains("no layers"));
    }

    #[test]
    fn test_load_rejects_tampered_layers() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("base_model.json");
        let net = Network::new("n", ImageShape::new(32, 32, 3).unwrap(), WeightsSource::None)
            .push("flatten", crate::model::LayerKind::Flatten)
            .unwrap();
        let mut json = serde_json::to_value(&net).unwrap();

        json["layers"][1]["output_shape"] = serde_json::json!([7]);
        std::fs::write(&path, serde_json::to_vec(&json).unwrap()).unwrap();
        assert!(load_model(&path).is_err());

        let mut json = serde_json::to_value(&net).unwrap();
        json["trainable"] = serde_json::json!({ "input_1": true });
        std::fs::write(&path, serde_json::to_vec(&json).unwrap()).unwrap();
        assert!(load_model(&path).is_err());
    }
}
