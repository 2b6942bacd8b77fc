use std::time::Duration;

pub const DETECTOR_MODEL_NAME: &str = "version-RFB-320.onnx";
pub const DETECTOR_MODEL_URL: &str =
    "https://github.com/facegate/facegate/releases/download/v0.1.0/version-RFB-320.onnx";

pub const LANDMARK_MODEL_NAME: &str = "pfld-68.onnx";
pub const LANDMARK_MODEL_URL: &str =
    "https://github.com/facegate/facegate/releases/download/v0.1.0/pfld-68.onnx";

pub const EMBEDDING_MODEL_NAME: &str = "w600k_r50.onnx";
pub const EMBEDDING_MODEL_URL: &str =
    "https://github.com/facegate/facegate/releases/download/v0.1.0/w600k_r50.onnx";

/// Keypoints per face produced by the landmark model.
pub const LANDMARK_POINTS: usize = 68;

/// Interval between detection passes while a capture session is active.
pub const SAMPLE_PERIOD: Duration = Duration::from_millis(1500);

/// Pause between releasing a camera and reacquiring one, so the platform
/// can let go of the prior hardware handle.
pub const DEVICE_SETTLE_DELAY: Duration = Duration::from_millis(100);
