//! Camera presence detection for gating a downstream start action.
//!
//! Samples a live camera stream on a fixed period, runs local face
//! detection and landmark inference on each sample, renders a mirrored
//! overlay, and reduces the latest outcome to a single "subject is
//! present" boolean.

pub mod capture;
pub mod detection;
pub mod pipeline;
pub mod shared;
