//! The owned periodic trigger driving detection passes.
//!
//! One sampler exists per session activation and runs its passes
//! synchronously on its own thread, so two passes can never be in flight
//! at once. Ticks that land while a pass is still running are drained and
//! dropped, never queued, which bounds pipeline latency to one period.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crossbeam_channel::select;

use crate::capture::domain::capture_session::SharedStream;
use crate::detection::domain::model_bundle::ModelBundle;
use crate::pipeline::detection_pipeline::DetectionPipeline;
use crate::pipeline::presence_gate::PresenceGate;

/// Handle to a running sampler thread.
///
/// Exists only while its capture session is Active; the session cancels it
/// synchronously on every exit path, including errors and device switches.
pub struct SamplerHandle {
    cancel_tx: Option<crossbeam_channel::Sender<()>>,
    thread: Option<thread::JoinHandle<()>>,
}

impl SamplerHandle {
    /// Spawn a sampler ticking every `period`.
    ///
    /// `epoch` is the session epoch at dispatch time; every outcome the
    /// sampler produces carries it, so completions that outlive the
    /// session are discarded by the gate.
    pub fn spawn(
        period: Duration,
        stream: SharedStream,
        bundle: Arc<ModelBundle>,
        pipeline: Arc<Mutex<DetectionPipeline>>,
        gate: Arc<PresenceGate>,
        epoch: u64,
    ) -> Self {
        let (cancel_tx, cancel_rx) = crossbeam_channel::bounded::<()>(0);
        let thread = thread::Builder::new()
            .name("frame-sampler".into())
            .spawn(move || run_loop(period, stream, bundle, pipeline, gate, epoch, cancel_rx))
            .expect("failed to spawn sampler thread");
        Self {
            cancel_tx: Some(cancel_tx),
            thread: Some(thread),
        }
    }

    /// Synchronous, total cancellation: when this returns, no further tick
    /// can fire and no pass is still running.
    pub fn cancel(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // Dropping the sender disconnects the cancel arm of the select.
        self.cancel_tx.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::warn!("sampler thread panicked");
            }
        }
    }
}

impl Drop for SamplerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[allow(clippy::too_many_arguments)]
fn run_loop(
    period: Duration,
    stream: SharedStream,
    bundle: Arc<ModelBundle>,
    pipeline: Arc<Mutex<DetectionPipeline>>,
    gate: Arc<PresenceGate>,
    epoch: u64,
    cancel_rx: crossbeam_channel::Receiver<()>,
) {
    let ticker = crossbeam_channel::tick(period);
    loop {
        select! {
            recv(cancel_rx) -> _ => break,
            recv(ticker) -> _ => {
                // Readiness is polled per tick, not awaited once: the
                // session may be Active before the models finish loading.
                if !bundle.is_gate_ready() {
                    log::debug!("models not ready; skipping tick");
                    continue;
                }
                let outcome = pipeline.lock().unwrap().run_pass(&stream, epoch);
                if let Some(outcome) = outcome {
                    gate.apply(&outcome);
                }
                // Ticks that arrived while the pass ran are lost, not
                // deferred.
                let mut dropped = 0;
                while ticker.try_recv().is_ok() {
                    dropped += 1;
                }
                if dropped > 0 {
                    log::debug!("dropped {dropped} tick(s) behind a slow pass");
                }
            }
        }
    }
}
