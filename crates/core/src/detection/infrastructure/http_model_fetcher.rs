use std::path::PathBuf;

use crate::detection::domain::model_bundle::{ModelFetcher, ModelKind};
use crate::detection::infrastructure::model_resolver;
use crate::shared::constants::{
    DETECTOR_MODEL_NAME, DETECTOR_MODEL_URL, EMBEDDING_MODEL_NAME, EMBEDDING_MODEL_URL,
    LANDMARK_MODEL_NAME, LANDMARK_MODEL_URL,
};

/// `ModelFetcher` backed by the release asset bundle: cache, then an
/// optional bundled directory, then download.
#[derive(Default)]
pub struct HttpModelFetcher {
    bundled_dir: Option<PathBuf>,
}

impl HttpModelFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also look in `dir` before downloading (development installs).
    pub fn with_bundled_dir(dir: PathBuf) -> Self {
        Self {
            bundled_dir: Some(dir),
        }
    }
}

impl ModelFetcher for HttpModelFetcher {
    fn fetch(&self, kind: ModelKind) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let (name, url) = asset_for(kind);
        Ok(model_resolver::resolve(
            name,
            url,
            self.bundled_dir.as_deref(),
            None,
        )?)
    }
}

fn asset_for(kind: ModelKind) -> (&'static str, &'static str) {
    match kind {
        ModelKind::Detector => (DETECTOR_MODEL_NAME, DETECTOR_MODEL_URL),
        ModelKind::Landmarks => (LANDMARK_MODEL_NAME, LANDMARK_MODEL_URL),
        ModelKind::Auxiliary => (EMBEDDING_MODEL_NAME, EMBEDDING_MODEL_URL),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_kind_has_a_distinct_asset() {
        let names: Vec<&str> = ModelKind::ALL.iter().map(|&k| asset_for(k).0).collect();
        assert_eq!(names.len(), 3);
        assert!(names.iter().all(|n| n.ends_with(".onnx")));
        assert_ne!(names[0], names[1]);
        assert_ne!(names[1], names[2]);
    }

    #[test]
    fn test_urls_point_at_release_bundle() {
        for kind in ModelKind::ALL {
            let (name, url) = asset_for(kind);
            assert!(url.ends_with(name));
        }
    }
}
