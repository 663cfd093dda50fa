//! Background palette worker.
//!
//! Clustering a large image takes long enough to stall an interactive thread,
//! so the worker owns a dedicated thread and talks to callers only through
//! channels: a request goes in, exactly one response comes back. Nothing is
//! shared between the caller and the worker apart from the messages.
//!
//! ```text
//! caller ──WorkerRequest──▶ queue ──▶ worker thread ──WorkerResponse──▶ reply channel
//! ```

use std::io;
use std::sync::mpsc::{self, Receiver, SendError, Sender};
use std::thread::{self, JoinHandle};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, warn};

use crate::analysis::{self, Analysis, AnalyzeOptions, INTERACTIVE_NUM_COLORS};
use crate::kmeans::Pixel;

#[derive(Clone, Debug, PartialEq)]
pub enum WorkerRequest {
    /// Analyze already-extracted pixels. A `num_colors` of 0 means the
    /// interactive default.
    Analyze { pixels: Vec<Pixel>, num_colors: usize },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkerResponse {
    Result { data: Analysis },
    Error { error: String },
}

impl WorkerResponse {
    pub fn into_result(self) -> Result<Analysis, String> {
        match self {
            WorkerResponse::Result { data } => Ok(data),
            WorkerResponse::Error { error } => Err(error),
        }
    }
}

struct Job {
    request: WorkerRequest,
    reply: Sender<WorkerResponse>,
}

/// Handle to a running worker thread. Dropping it drains the queue and joins
/// the thread.
pub struct PaletteWorker {
    queue: Sender<Job>,
    handle: Option<JoinHandle<()>>,
}

impl PaletteWorker {
    /// Start a worker seeded from the OS random source.
    pub fn spawn() -> io::Result<Self> {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Start a worker that draws centroid seeds from `rng`.
    pub fn with_rng<R: Rng + Send + 'static>(mut rng: R) -> io::Result<Self> {
        let (queue, jobs) = mpsc::channel::<Job>();

        let handle = thread::Builder::new()
            .name("palette-worker".into())
            .spawn(move || {
                while let Ok(job) = jobs.recv() {
                    let response = handle_request(job.request, &mut rng);
                    if job.reply.send(response).is_err() {
                        debug!("caller dropped reply channel");
                    }
                }
            })?;

        Ok(Self {
            queue,
            handle: Some(handle),
        })
    }

    /// Queue a request. The returned channel yields exactly one response.
    pub fn submit(&self, request: WorkerRequest) -> Receiver<WorkerResponse> {
        let (reply, response) = mpsc::channel();
        let job = Job { request, reply };

        if let Err(SendError(job)) = self.queue.send(job) {
            warn!("palette worker is not running");
            let _ = job.reply.send(WorkerResponse::Error {
                error: "palette worker is not running".to_string(),
            });
        }
        response
    }

    /// Submit and wait for the answer.
    pub fn analyze(&self, pixels: Vec<Pixel>, num_colors: usize) -> Result<Analysis, String> {
        self.submit(WorkerRequest::Analyze { pixels, num_colors })
            .recv()
            .map_err(|_| "palette worker stopped before replying".to_string())?
            .into_result()
    }
}

impl Drop for PaletteWorker {
    fn drop(&mut self) {
        // Swap in a disconnected sender so the worker's `recv` loop ends.
        drop(std::mem::replace(&mut self.queue, mpsc::channel().0));
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("palette worker panicked");
            }
        }
    }
}

/// Run one request to completion. Also used directly where no thread is
/// available (wasm).
pub fn handle_request<R: Rng>(request: WorkerRequest, rng: &mut R) -> WorkerResponse {
    match request {
        WorkerRequest::Analyze { pixels, num_colors } => {
            let num_colors = if num_colors == 0 {
                INTERACTIVE_NUM_COLORS
            } else {
                num_colors
            };
            let options = AnalyzeOptions::interactive().with_num_colors(num_colors);
            match analysis::analyze_pixels(&pixels, &options, rng) {
                Ok(data) => WorkerResponse::Result { data },
                Err(e) => WorkerResponse::Error {
                    error: e.to_string(),
                },
            }
        }
    }
}
