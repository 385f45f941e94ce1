use crate::error::VisionError;
use crate::pipeline::VisionBackend;
use crate::source::{ModelAssets, VisionProvider};
use crate::FALLBACK_MS;
use std::time::{Duration, Instant};
use tokio::sync::{oneshot, watch};
use tracing::{info, warn};

/// Background acquisition of the video source and landmarkers.
///
/// Runs on the tokio runtime; blocking provider calls go to the blocking pool.
/// Poll it from the render loop. Cancelling (or dropping) the startup releases
/// whatever it has acquired, including work that completes afterwards.
pub struct VisionStartup {
    outcome: oneshot::Receiver<Result<VisionBackend, VisionError>>,
    cancel: watch::Sender<bool>,
    started: Instant,
    finished: bool,
}

impl VisionStartup {
    /// Start acquiring. Must be called from within a tokio runtime.
    pub fn spawn(provider: Box<dyn VisionProvider>, assets: ModelAssets) -> Self {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (outcome_tx, outcome_rx) = oneshot::channel();

        tokio::spawn(async move {
            let result = run_startup(provider, assets, cancel_rx).await;
            match &result {
                Ok(_) => info!("Vision startup complete"),
                Err(VisionError::Cancelled) => info!("Vision startup cancelled"),
                Err(e) => warn!(error = %e, "Vision unavailable, running degraded"),
            }
            // A dropped receiver means nobody wants the backend; dropping it releases it.
            let _ = outcome_tx.send(result);
        });

        Self {
            outcome: outcome_rx,
            cancel: cancel_tx,
            started: Instant::now(),
            finished: false,
        }
    }

    /// Non-blocking check for the startup result. Yields `Some` exactly once.
    pub fn poll(&mut self) -> Option<Result<VisionBackend, VisionError>> {
        if self.finished {
            return None;
        }
        match self.outcome.try_recv() {
            Ok(result) => {
                self.finished = true;
                Some(result)
            }
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => {
                self.finished = true;
                Some(Err(VisionError::Cancelled))
            }
        }
    }

    /// Wait for the startup result.
    pub async fn wait(mut self) -> Result<VisionBackend, VisionError> {
        self.finished = true;
        (&mut self.outcome)
            .await
            .unwrap_or(Err(VisionError::Cancelled))
    }

    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn started(&self) -> Instant {
        self.started
    }

    /// Whether the ready fallback has expired at `now`.
    pub fn fallback_due_at(&self, now: Instant) -> bool {
        now.duration_since(self.started) >= Duration::from_millis(FALLBACK_MS as u64)
    }
}

impl Drop for VisionStartup {
    fn drop(&mut self) {
        if !self.finished {
            self.cancel();
        }
    }
}

async fn run_startup(
    provider: Box<dyn VisionProvider>,
    assets: ModelAssets,
    mut cancel: watch::Receiver<bool>,
) -> Result<VisionBackend, VisionError> {
    let (provider, video) = cancellable(&mut cancel, move || {
        let mut provider = provider;
        let video = provider.open_video();
        (provider, video)
    })
    .await?;
    let video = video?;
    info!("Video source acquired");

    cancellable(&mut cancel, move || {
        let mut provider = provider;
        let mut engine = provider.open_engine()?;
        VisionBackend::open(video, &mut *engine, &assets)
    })
    .await?
}

/// Run blocking `work`, abandoning it if `cancel` fires first.
///
/// Abandoned work still runs to completion; its output is dropped.
async fn cancellable<T, F>(cancel: &mut watch::Receiver<bool>, work: F) -> Result<T, VisionError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    if *cancel.borrow() {
        return Err(VisionError::Cancelled);
    }

    let task = tokio::task::spawn_blocking(work);
    let output = tokio::select! {
        joined = task => joined
            .map_err(|e| VisionError::Unavailable(format!("startup task failed: {e}")))?,
        _ = cancel.wait_for(|cancelled| *cancelled) => return Err(VisionError::Cancelled),
    };

    if *cancel.borrow() {
        return Err(VisionError::Cancelled);
    }
    Ok(output)
}
