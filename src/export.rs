//! Export of the composited canvas to PNG files on a background worker.
//!
//! A request captures an [`ExportSnapshot`] on the caller's thread, so strokes
//! drawn while the export runs never end up in the file. Requests that overlap
//! are queued and written one at a time, in request order, by a single worker
//! thread. Each request resolves exactly once through its [`ExportTicket`].

use std::fmt;
use std::fs::{self, File};
use std::future::Future;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};
use std::thread::JoinHandle;

use futures::StreamExt;
use futures::channel::{mpsc, oneshot};
use image::ImageFormat;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::error::{ExportError, RenderError};
use crate::renderer::{Background, RenderTarget, render_strokes};
use crate::stroke::StrokeRef;
use crate::surface::DrawingSurface;

pub const FILE_PREFIX: &str = "SketchIt_";

// Shared by every queue in the process so file names never repeat within a run
static NEXT_EXPORT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

pub type ExportResult = Result<PathBuf, ExportError>;

/// Frozen copy of everything needed to produce the exported image
#[derive(Debug, Clone)]
pub struct ExportSnapshot {
    strokes: Vec<StrokeRef>,
    background: Background,
    width: u32,
    height: u32,
    pixels_per_point: f32,
}

impl ExportSnapshot {
    /// Capture the completed strokes of `surface`. A stroke still in progress is left out.
    pub fn capture(
        surface: &DrawingSurface,
        background: &Background,
        width: u32,
        height: u32,
        pixels_per_point: f32,
    ) -> Self {
        Self {
            strokes: surface.snapshot(),
            background: background.clone(),
            width,
            height,
            pixels_per_point,
        }
    }

    pub fn stroke_count(&self) -> usize {
        self.strokes.len()
    }

    pub fn size(&self) -> [u32; 2] {
        [self.width, self.height]
    }

    pub fn render(&self) -> Result<RenderTarget, RenderError> {
        let mut target =
            RenderTarget::new(self.width, self.height)?.with_pixels_per_point(self.pixels_per_point);
        render_strokes(&mut target, &self.strokes, None, &self.background);
        Ok(target)
    }
}

/// Counters for the progress indicator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportStatus {
    pub pending: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl ExportStatus {
    pub fn is_busy(&self) -> bool {
        self.pending > 0
    }
}

struct ExportJob {
    id: Uuid,
    snapshot: ExportSnapshot,
    reply: oneshot::Sender<ExportResult>,
}

/// Handle for one export request. Resolves to the written file path or the error.
#[derive(Debug)]
pub struct ExportTicket {
    id: Uuid,
    receiver: oneshot::Receiver<ExportResult>,
    finished: bool,
}

impl ExportTicket {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Non-blocking check, for polling once per frame.
    /// Yields the outcome exactly once; later calls return `None`.
    pub fn try_outcome(&mut self) -> Option<ExportResult> {
        if self.finished {
            return None;
        }
        match self.receiver.try_recv() {
            Ok(Some(result)) => {
                self.finished = true;
                Some(result)
            }
            Ok(None) => None,
            Err(oneshot::Canceled) => {
                self.finished = true;
                Some(Err(ExportError::WorkerGone))
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Block the current thread until the export finishes
    pub fn wait(self) -> ExportResult {
        futures::executor::block_on(self)
    }
}

impl Future for ExportTicket {
    type Output = ExportResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver).poll(cx).map(|result| {
            self.finished = true;
            result.unwrap_or(Err(ExportError::WorkerGone))
        })
    }
}

/// Serial export worker. Dropping the queue lets queued jobs finish, then joins the worker.
pub struct ExportQueue {
    sender: mpsc::UnboundedSender<ExportJob>,
    status: Arc<Mutex<ExportStatus>>,
    export_dir: PathBuf,
    worker: Option<JoinHandle<()>>,
}

impl fmt::Debug for ExportQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportQueue")
            .field("export_dir", &self.export_dir)
            .field("status", &*self.status.lock())
            .finish()
    }
}

impl ExportQueue {
    pub fn new(export_dir: impl Into<PathBuf>) -> Result<Self, ExportError> {
        let export_dir = export_dir.into();
        let (sender, receiver) = mpsc::unbounded();
        let status = Arc::new(Mutex::new(ExportStatus::default()));

        let worker = std::thread::Builder::new().name("sketch-export".to_owned()).spawn({
            let export_dir = export_dir.clone();
            let status = status.clone();
            move || run_worker(receiver, &export_dir, &status)
        })?;

        log::info!("Export queue writing to {}", export_dir.display());
        Ok(Self {
            sender,
            status,
            export_dir,
            worker: Some(worker),
        })
    }

    /// Queue an export of `snapshot`. Never blocks on the export itself.
    pub fn request(&self, snapshot: ExportSnapshot) -> ExportTicket {
        let id = Uuid::new_v4();
        let (reply, receiver) = oneshot::channel();
        log::info!(
            "Export {} requested: {} strokes, {}x{}",
            id,
            snapshot.stroke_count(),
            snapshot.width,
            snapshot.height
        );

        self.status.lock().pending += 1;
        let job = ExportJob { id, snapshot, reply };
        if let Err(err) = self.sender.unbounded_send(job) {
            log::error!("Export {} could not be queued: worker stopped", id);
            {
                let mut status = self.status.lock();
                status.pending -= 1;
                status.failed += 1;
            }
            let job = err.into_inner();
            let _ = job.reply.send(Err(ExportError::WorkerGone));
        }

        ExportTicket {
            id,
            receiver,
            finished: false,
        }
    }

    pub fn status(&self) -> ExportStatus {
        *self.status.lock()
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }
}

impl Drop for ExportQueue {
    fn drop(&mut self) {
        self.sender.close_channel();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("Export worker panicked");
            }
        }
    }
}

fn run_worker(
    mut receiver: mpsc::UnboundedReceiver<ExportJob>,
    export_dir: &Path,
    status: &Mutex<ExportStatus>,
) {
    futures::executor::block_on(async {
        while let Some(job) = receiver.next().await {
            let result = write_export(&job.snapshot, export_dir);
            match &result {
                Ok(path) => log::info!("Export {} saved to {}", job.id, path.display()),
                Err(err) => log::error!("Export {} failed: {}", job.id, err),
            }

            {
                let mut status = status.lock();
                status.pending -= 1;
                if result.is_ok() {
                    status.succeeded += 1;
                } else {
                    status.failed += 1;
                }
            }

            if job.reply.send(result).is_err() {
                log::debug!("Export {} finished with nobody waiting", job.id);
            }
        }
    });
    log::debug!("Export worker stopped");
}

/// Render, encode and write one snapshot. The file only appears under its
/// final name once fully written; a failed export leaves nothing behind.
pub fn write_export(snapshot: &ExportSnapshot, export_dir: &Path) -> ExportResult {
    let target = snapshot.render()?;
    fs::create_dir_all(export_dir)?;

    let path = unique_export_path(export_dir);
    let partial = path.with_extension("png.part");

    let written = (|| -> Result<(), ExportError> {
        let mut writer = BufWriter::new(File::create(&partial)?);
        target.image().write_to(&mut writer, ImageFormat::Png)?;
        writer.flush()?;
        fs::rename(&partial, &path)?;
        Ok(())
    })();

    if let Err(err) = written {
        if let Err(cleanup) = fs::remove_file(&partial) {
            if cleanup.kind() != std::io::ErrorKind::NotFound {
                log::warn!("Failed to remove partial export {}: {}", partial.display(), cleanup);
            }
        }
        return Err(err);
    }

    Ok(path)
}

fn unique_export_path(export_dir: &Path) -> PathBuf {
    loop {
        let sequence = NEXT_EXPORT_SEQUENCE.fetch_add(1, Ordering::SeqCst);
        let path = export_dir.join(export_file_name(timestamp_secs(), sequence));
        if !path.exists() {
            return path;
        }
    }
}

pub fn export_file_name(timestamp_secs: u64, sequence: u64) -> String {
    format!("{FILE_PREFIX}{timestamp_secs}_{sequence:04}.png")
}

fn timestamp_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
