use crate::annotate::annotate;
use crate::collaborators::{
    BoundingBox, CaptureSource, Command, CommandSource, Cropper, Detector, Encoder,
};
use crate::reference::{FullFrameDetector, GridEncoder, ResizeCropper};
use facegate_core::{
    Embedding, EngineConfig, Error, Evaluation, Face, Identity, Match, MatchingEngine, Result, Uid,
    Warehouse,
};
use facegate_storage::{DatasetManager, EnrollmentAllocator, SampleKey, SampleStore};
use image::{GrayImage, RgbImage};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Configuration for an interactive session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Where `SaveFrame` writes the annotated frame
    pub snapshot_path: PathBuf,
    /// Nearest neighbors farther than this are reported as a new identity
    pub max_distance: Option<f32>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from("face.jpg"),
            max_distance: None,
        }
    }
}

/// The detect / crop / encode collaborators used for both frames and
/// stored samples
pub struct Pipeline {
    pub detector: Box<dyn Detector>,
    pub cropper: Box<dyn Cropper>,
    pub encoder: Box<dyn Encoder>,
}

impl Pipeline {
    pub fn new(
        detector: Box<dyn Detector>,
        cropper: Box<dyn Cropper>,
        encoder: Box<dyn Encoder>,
    ) -> Self {
        Self {
            detector,
            cropper,
            encoder,
        }
    }

    /// Whole-frame detection with the thumbnail encoder
    pub fn reference(face_size: u32, grid: u32) -> Self {
        Self::new(
            Box::new(FullFrameDetector),
            Box::new(ResizeCropper::new(face_size)),
            Box::new(GridEncoder::new(grid)),
        )
    }

    fn encode_one(&self, image: &GrayImage) -> Result<Embedding> {
        let mut embeddings = self.encoder.encode(std::slice::from_ref(image))?;
        match (embeddings.pop(), embeddings.is_empty()) {
            (Some(embedding), true) => Ok(embedding),
            _ => Err(Error::Encoder(
                "encoder must return exactly one embedding per image".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    Idle,
    FrameAcquired,
    Detecting,
    PerFaceClassifying,
    AwaitingCommand,
    Saving,
    Enrolling,
    Deleting,
    Terminated,
}

/// Classification of one detected face
#[derive(Debug, Clone, PartialEq)]
pub struct FaceResult {
    pub bbox: BoundingBox,
    pub identity: Identity,
    pub nearest: Option<Match>,
}

/// The face that enroll and delete act on: the last one processed in a frame
#[derive(Debug, Clone)]
pub struct Selection {
    /// Unprocessed crop, as it will be stored
    pub face: RgbImage,
    pub identity: Identity,
}

/// Everything produced for one frame
#[derive(Debug, Clone)]
pub struct FrameOutcome {
    pub annotated: RgbImage,
    pub faces: Vec<FaceResult>,
    pub selected: Option<Selection>,
}

/// What handling a command did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Continued,
    /// Enroll/delete/save without something to act on
    Skipped,
    Saved(PathBuf),
    Enrolled(SampleKey),
    Deleted { uid: Uid, removed: usize },
    Terminated,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub frames: u64,
    pub dropped: u64,
    pub enrolled: u64,
    pub deleted: u64,
}

/// Drives capture -> detect -> classify -> command, and keeps the fitted
/// engine consistent with the gallery on disk.
///
/// Every gallery mutation is followed by a full reacquire: both splits are
/// reloaded and re-encoded and a fresh engine is fitted before anything is
/// swapped in.
pub struct SessionController {
    dataset: DatasetManager,
    pipeline: Pipeline,
    allocator: EnrollmentAllocator,
    config: SessionConfig,
    engine: MatchingEngine,
    train: Warehouse,
    test: Warehouse,
    state: SessionState,
}

impl SessionController {
    /// Load both splits and fit the engine
    pub fn new(
        dataset: DatasetManager,
        pipeline: Pipeline,
        engine_config: EngineConfig,
        config: SessionConfig,
    ) -> Result<Self> {
        let mut controller = Self {
            dataset,
            pipeline,
            allocator: EnrollmentAllocator::new(),
            engine: MatchingEngine::new(engine_config),
            config,
            train: Warehouse::new(),
            test: Warehouse::new(),
            state: SessionState::Idle,
        };
        controller.reacquire()?;
        Ok(controller)
    }

    #[inline]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[inline]
    pub fn engine(&self) -> &MatchingEngine {
        &self.engine
    }

    /// The training gallery the engine was last fitted from
    #[inline]
    pub fn train(&self) -> &Warehouse {
        &self.train
    }

    #[inline]
    pub fn test(&self) -> &Warehouse {
        &self.test
    }

    #[inline]
    pub fn dataset(&self) -> &DatasetManager {
        &self.dataset
    }

    #[inline]
    pub fn allocator(&self) -> &EnrollmentAllocator {
        &self.allocator
    }

    /// Rebuild both warehouses from disk, encode them and refit.
    /// Nothing is replaced unless every step succeeds.
    pub fn reacquire(&mut self) -> Result<()> {
        let mut train = self.load_warehouse(self.dataset.train())?;
        let mut test = self.load_warehouse(self.dataset.test())?;
        self.encode_warehouse(&mut train)?;
        self.encode_warehouse(&mut test)?;

        let mut engine = MatchingEngine::new(self.engine.config().clone());
        engine.fit(&train)?;

        info!(
            "Reacquired gallery: {} train samples ({} identities), {} test samples",
            train.len(),
            train.get_persons().len(),
            test.len()
        );

        self.train = train;
        self.test = test;
        self.engine = engine;
        Ok(())
    }

    fn load_warehouse(&self, store: &SampleStore) -> Result<Warehouse> {
        let mut warehouse = Warehouse::new();

        for sample in store.scan()? {
            let image = store.read(&sample.path)?;
            let (width, height) = image.dimensions();
            let mut found = 0;

            for bbox in self.pipeline.detector.detect(&image)? {
                let Some(bbox) = bbox.clamp(width, height) else {
                    continue;
                };
                let crop = self.pipeline.cropper.crop(&image, bbox);
                let processed = self.pipeline.cropper.process(&crop);
                warehouse.add(Face::new(processed, sample.key.uid).with_index(sample.key.index));
                found += 1;
            }

            if found == 0 {
                warn!("No face detected in {:?}", sample.path);
                warehouse.record_index(sample.key.uid, sample.key.index);
            }
        }

        Ok(warehouse)
    }

    fn encode_warehouse(&self, warehouse: &mut Warehouse) -> Result<()> {
        for face in warehouse.get_faces_mut() {
            face.embedding = Some(self.pipeline.encode_one(&face.image)?);
        }
        Ok(())
    }

    /// Identity for a nearest-neighbor result under the distance threshold
    fn identity_for(&self, nearest: Option<&Match>) -> Identity {
        match (nearest, self.config.max_distance) {
            (Some(m), Some(max)) if m.distance > max => Identity::New,
            (Some(m), _) => Identity::Existing(m.uid),
            (None, _) => Identity::New,
        }
    }

    /// Run detection and classification on one frame.
    ///
    /// An absent or zero-sized frame is dropped and yields `Ok(None)` with
    /// no change to the gallery or the engine.
    pub fn process_frame(&mut self, frame: Option<RgbImage>) -> Result<Option<FrameOutcome>> {
        self.state = SessionState::FrameAcquired;
        let frame = match frame {
            Some(frame) if frame.width() > 0 && frame.height() > 0 => frame,
            _ => {
                debug!("Dropped empty frame");
                self.state = SessionState::Idle;
                return Ok(None);
            }
        };

        self.state = SessionState::Detecting;
        let boxes = self.pipeline.detector.detect(&frame)?;

        self.state = SessionState::PerFaceClassifying;
        let (width, height) = frame.dimensions();
        let mut annotated = frame.clone();
        let mut faces = Vec::with_capacity(boxes.len());
        let mut selected = None;

        for bbox in boxes {
            let Some(bbox) = bbox.clamp(width, height) else {
                debug!("Skipping box outside the frame: {:?}", bbox);
                continue;
            };

            let crop = self.pipeline.cropper.crop(&frame, bbox);
            let processed = self.pipeline.cropper.process(&crop);
            let embedding = self.pipeline.encode_one(&processed)?;
            let nearest = self.engine.nearest(&embedding)?;
            let identity = self.identity_for(nearest.as_ref());

            annotate(&mut annotated, bbox, identity);
            debug!("Face at {:?} classified as {}", bbox, identity);

            faces.push(FaceResult {
                bbox,
                identity,
                nearest,
            });
            selected = Some(Selection {
                face: crop,
                identity,
            });
        }

        self.state = SessionState::AwaitingCommand;
        Ok(Some(FrameOutcome {
            annotated,
            faces,
            selected,
        }))
    }

    /// React to a user command for the frame in `outcome`
    pub fn handle_command(
        &mut self,
        command: Command,
        outcome: Option<&FrameOutcome>,
    ) -> Result<CommandOutcome> {
        let result = match command {
            Command::Continue => Ok(CommandOutcome::Continued),
            Command::Quit => {
                self.state = SessionState::Terminated;
                return Ok(CommandOutcome::Terminated);
            }
            Command::SaveFrame => {
                self.state = SessionState::Saving;
                self.save_frame(outcome)
            }
            Command::Enroll => {
                self.state = SessionState::Enrolling;
                let selected = outcome.and_then(|o| o.selected.as_ref());
                match selected {
                    Some(selection) => self.enroll(&selection.face, selection.identity),
                    None => Ok(CommandOutcome::Skipped),
                }
            }
            Command::EnrollNew => {
                self.state = SessionState::Enrolling;
                let selected = outcome.and_then(|o| o.selected.as_ref());
                match selected {
                    Some(selection) => self.enroll(&selection.face, Identity::New),
                    None => Ok(CommandOutcome::Skipped),
                }
            }
            Command::Delete => {
                self.state = SessionState::Deleting;
                let uid = outcome
                    .and_then(|o| o.selected.as_ref())
                    .and_then(|s| s.identity.uid());
                match uid {
                    Some(uid) => self.delete(uid),
                    None => Ok(CommandOutcome::Skipped),
                }
            }
        };

        self.state = SessionState::Idle;
        result
    }

    fn save_frame(&self, outcome: Option<&FrameOutcome>) -> Result<CommandOutcome> {
        let Some(outcome) = outcome else {
            return Ok(CommandOutcome::Skipped);
        };
        let path = self.config.snapshot_path.clone();
        outcome
            .annotated
            .save(&path)
            .map_err(|e| Error::Image(format!("{}: {}", path.display(), e)))?;
        info!("Saved frame to {:?}", path);
        Ok(CommandOutcome::Saved(path))
    }

    /// Store `face` in the gallery under `identity`, then reacquire.
    ///
    /// If a file appeared at the allocated key since the last reacquire,
    /// the gallery is reloaded and the allocation retried once.
    pub fn enroll(&mut self, face: &RgbImage, identity: Identity) -> Result<CommandOutcome> {
        let key = self.allocator.allocate(&self.train, identity);
        let (key, path) = match self.dataset.train().write(key, face) {
            Ok(path) => (key, path),
            Err(Error::SampleExists(existing)) => {
                warn!("Sample {} appeared outside the session, reloading gallery", existing);
                self.reacquire()?;
                let key = self.allocator.allocate(&self.train, identity);
                (key, self.dataset.train().write(key, face)?)
            }
            Err(e) => return Err(e),
        };
        info!("Enrolled {} as {} at {:?}", identity, key, path);

        self.reacquire()?;
        Ok(CommandOutcome::Enrolled(key))
    }

    /// Remove every stored sample of `uid`, then reacquire
    pub fn delete(&mut self, uid: Uid) -> Result<CommandOutcome> {
        let targets = self.allocator.deletion_targets(&self.train, uid);
        let removed = self.dataset.train().remove(&targets)?;
        info!("Deleted {} samples of uid {}", removed, uid);

        self.reacquire()?;
        Ok(CommandOutcome::Deleted { uid, removed })
    }

    /// Classify a whole image as one face, without detection
    pub fn identify(&self, image: &RgbImage) -> Result<Option<Match>> {
        if image.width() == 0 || image.height() == 0 {
            return Ok(None);
        }
        let processed = self.pipeline.cropper.process(image);
        let embedding = self.pipeline.encode_one(&processed)?;
        self.engine.nearest(&embedding)
    }

    /// Accuracy of the current fit on the test split
    pub fn evaluate(&self) -> Result<Evaluation> {
        self.engine.evaluate(&self.test)
    }

    /// Run the interactive loop until `Quit` or a fatal error.
    /// The capture source is released on every exit path.
    pub fn run(
        &mut self,
        capture: &mut dyn CaptureSource,
        commands: &mut dyn CommandSource,
    ) -> Result<SessionSummary> {
        let result = self.run_loop(capture, commands);
        capture.release();
        self.state = SessionState::Terminated;

        match &result {
            Ok(summary) => info!(
                "Session ended: {} frames, {} dropped, {} enrolled, {} deleted",
                summary.frames, summary.dropped, summary.enrolled, summary.deleted
            ),
            Err(e) => warn!("Session halted: {}", e),
        }
        result
    }

    fn run_loop(
        &mut self,
        capture: &mut dyn CaptureSource,
        commands: &mut dyn CommandSource,
    ) -> Result<SessionSummary> {
        let mut summary = SessionSummary::default();

        loop {
            self.state = SessionState::Idle;
            let frame = capture.get_frame()?;
            summary.frames += 1;

            let Some(outcome) = self.process_frame(frame)? else {
                summary.dropped += 1;
                continue;
            };

            let command = commands.next_command()?;
            match self.handle_command(command, Some(&outcome))? {
                CommandOutcome::Terminated => return Ok(summary),
                CommandOutcome::Enrolled(_) => summary.enrolled += 1,
                CommandOutcome::Deleted { .. } => summary.deleted += 1,
                _ => {}
            }
        }
    }
}
