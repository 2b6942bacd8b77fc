pub mod capture_session;
pub mod device_catalog;
pub mod error;
pub mod media_backend;
pub mod session_epoch;
pub mod video_device;
