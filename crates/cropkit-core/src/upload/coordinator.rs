//! Drives one upload target through select, edit, commit and upload.
//!
//! The coordinator owns the lifecycle state and the editing session. Remote
//! calls are split into [`UploadCoordinator::begin_commit`], which produces an
//! [`UploadJob`], and [`UploadCoordinator::finish_commit`], which consumes its
//! outcome. Hosts that cannot hold the coordinator across an await (the web
//! bindings keep it in a `RefCell`) run the job themselves; everyone else can
//! use the async [`UploadCoordinator::commit`].

use std::fmt;

use bytes::Bytes;

use crate::config::{UploadTarget, ROTATION_STEP_DEGREES};
use crate::crop::{CropRect, CropRegion, CropSelector, DisplaySize};
use crate::decode::decode_source;
use crate::error::PipelineError;
use crate::session::{
    transition, EditingSession, PreviewProvider, SessionError, SessionEvent, SessionState,
};
use crate::transform::RenderedRaster;
use crate::validate::{validate_file, SelectedFile, ValidationError};

use super::job::UploadJob;
use super::path::random_object_id;
use super::storage::{ObjectStorage, RawStorageError, StorageError};

type UploadedFn = Box<dyn FnMut(&str)>;
type ErrorFn = Box<dyn FnMut(&PipelineError)>;

/// Host callbacks for upload outcomes.
#[derive(Default)]
pub struct UploadEvents {
    on_uploaded: Option<UploadedFn>,
    on_error: Option<ErrorFn>,
}

impl UploadEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called with the public URL after each successful upload.
    pub fn on_uploaded(mut self, callback: impl FnMut(&str) + 'static) -> Self {
        self.on_uploaded = Some(Box::new(callback));
        self
    }

    /// Called with every error the coordinator returns.
    pub fn on_error(mut self, callback: impl FnMut(&PipelineError) + 'static) -> Self {
        self.on_error = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for UploadEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadEvents")
            .field("on_uploaded", &self.on_uploaded.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

pub struct UploadCoordinator<P> {
    target: UploadTarget,
    previews: P,
    state: SessionState,
    session: Option<EditingSession>,
    pixel_density: f64,
    uploaded_url: Option<String>,
    last_error: Option<PipelineError>,
    events: UploadEvents,
}

impl<P: PreviewProvider> UploadCoordinator<P> {
    pub fn new(target: UploadTarget, previews: P) -> Self {
        Self {
            target,
            previews,
            state: SessionState::Idle,
            session: None,
            pixel_density: 1.0,
            uploaded_url: None,
            last_error: None,
            events: UploadEvents::default(),
        }
    }

    pub fn with_events(mut self, events: UploadEvents) -> Self {
        self.events = events;
        self
    }

    pub fn set_events(&mut self, events: UploadEvents) {
        self.events = events;
    }

    pub fn target(&self) -> &UploadTarget {
        &self.target
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn session(&self) -> Option<&EditingSession> {
        self.session.as_ref()
    }

    /// Public URL of the last successful upload.
    pub fn uploaded_url(&self) -> Option<&str> {
        self.uploaded_url.as_deref()
    }

    /// The error that moved the session to `Failed`.
    pub fn last_error(&self) -> Option<&PipelineError> {
        self.last_error.as_ref()
    }

    pub fn pixel_density(&self) -> f64 {
        self.pixel_density
    }

    /// Device pixels per logical pixel for future renders.
    ///
    /// Invalid values fall back to 1.
    pub fn set_pixel_density(&mut self, density: f64) {
        let density = if density.is_finite() && density > 0.0 {
            density
        } else {
            1.0
        };
        if density != self.pixel_density {
            self.pixel_density = density;
            if let Some(session) = self.session.as_mut() {
                session.invalidate();
            }
        }
    }

    /// Validate, decode and start a session for a newly selected file.
    ///
    /// A file that fails validation leaves any current session untouched.
    /// A valid file replaces it. When the target skips the editor the
    /// upload is prepared right away and returned.
    ///
    /// # Errors
    ///
    /// Validation, decode, preview and render/encode failures. The latter
    /// move the session to `Failed`.
    pub fn select_file(&mut self, file: SelectedFile) -> Result<Option<UploadJob>, PipelineError> {
        self.check(SessionEvent::FileAccepted)?;

        if let Err(err) = validate_file(&file, self.target.max_file_bytes) {
            return Err(self.report(err.into()));
        }
        let source = match decode_source(&file.bytes) {
            Ok(source) => source,
            Err(err) => {
                return Err(self.report(ValidationError::Undecodable(err.to_string()).into()))
            }
        };
        let (width, height) = source.natural_dimensions();
        let display = DisplaySize::natural(width, height);
        let editor = self.target.editor_enabled;
        let crop = if editor {
            CropSelector::with_default_region(
                self.target.shape,
                self.target.effective_aspect_ratio(),
                display,
            )
        } else {
            CropSelector::full_image(self.target.shape, display)
        };
        if crop.region().is_none() {
            let err = ValidationError::AspectUnreachable { width, height };
            return Err(self.report(err.into()));
        }

        let preview = match self.previews.acquire(&file.bytes, &file.mime_type) {
            Ok(preview) => preview,
            Err(err) => return Err(self.report(err.into())),
        };

        // Ends the previous session and releases its preview.
        self.session = None;
        self.uploaded_url = None;
        self.last_error = None;
        self.apply(SessionEvent::FileAccepted)?;

        log::info!(
            "selected {} ({width}x{height}, {} bytes)",
            file.name,
            file.bytes.len()
        );

        let SelectedFile {
            name,
            mime_type,
            bytes,
        } = file;
        self.session = Some(EditingSession::new(
            source,
            name,
            mime_type,
            Bytes::from(bytes),
            crop,
            Some(preview),
        ));

        if editor {
            self.apply(SessionEvent::EditorOpened)?;
            Ok(None)
        } else {
            self.apply(SessionEvent::EditorSkipped)?;
            self.prepare_upload().map(Some)
        }
    }

    pub fn set_crop(&mut self, candidate: CropRect) -> Result<Option<CropRegion>, PipelineError> {
        Ok(self.editing()?.set_crop(candidate))
    }

    pub fn clear_crop(&mut self) -> Result<(), PipelineError> {
        self.editing()?.clear_crop();
        Ok(())
    }

    pub fn reset_crop(&mut self) -> Result<(), PipelineError> {
        self.editing()?.reset_crop();
        Ok(())
    }

    pub fn set_display_size(&mut self, display: DisplaySize) -> Result<(), PipelineError> {
        self.editing()?.set_display_size(display);
        Ok(())
    }

    pub fn set_scale(&mut self, value: f64) -> Result<f64, PipelineError> {
        Ok(self.editing()?.set_scale(value))
    }

    pub fn zoom_by(&mut self, delta: f64) -> Result<f64, PipelineError> {
        Ok(self.editing()?.zoom_by(delta))
    }

    pub fn rotate_by(&mut self, delta_degrees: f64) -> Result<f64, PipelineError> {
        Ok(self.editing()?.rotate_by(delta_degrees))
    }

    /// Rotate a quarter turn, clockwise or counter-clockwise.
    pub fn rotate_step(&mut self, clockwise: bool) -> Result<f64, PipelineError> {
        let step = if clockwise {
            ROTATION_STEP_DEGREES
        } else {
            -ROTATION_STEP_DEGREES
        };
        self.rotate_by(step)
    }

    pub fn reset_transform(&mut self) -> Result<(), PipelineError> {
        self.editing()?.reset_transform();
        Ok(())
    }

    /// Render the current edit without encoding, for live previews.
    pub fn render_current(&mut self) -> Result<RenderedRaster, PipelineError> {
        let bounds = self.target.bounds;
        let density = self.pixel_density;
        let rendered = self.editing()?.render(bounds, density);
        rendered.map_err(|err| self.report(err.into()))
    }

    /// Move to `Processing` and prepare the upload of the current edit.
    ///
    /// Returns `Ok(None)` while an upload is already in flight. From `Failed`
    /// the cached output is reused unless the edit changed since.
    ///
    /// # Errors
    ///
    /// Invalid state, render or encode failure. Render and encode failures
    /// move the session to `Failed` and release the preview.
    pub fn begin_commit(&mut self) -> Result<Option<UploadJob>, PipelineError> {
        if self.state.is_busy() {
            log::debug!("commit ignored: an upload is already in flight");
            return Ok(None);
        }
        self.apply(SessionEvent::Commit)?;
        self.prepare_upload().map(Some)
    }

    /// Record the outcome of an upload started with [`Self::begin_commit`].
    ///
    /// Success ends the session and notifies `on_uploaded`. Failure moves to
    /// `Failed` while keeping the source, edit and encoded output for a retry.
    pub fn finish_commit(
        &mut self,
        result: Result<String, RawStorageError>,
    ) -> Result<String, PipelineError> {
        match result {
            Ok(url) => {
                self.apply(SessionEvent::UploadSucceeded)?;
                self.session = None;
                self.last_error = None;
                self.uploaded_url = Some(url.clone());
                log::info!("uploaded {url}");
                if let Some(callback) = self.events.on_uploaded.as_mut() {
                    callback(&url);
                }
                Ok(url)
            }
            Err(raw) => {
                self.check(SessionEvent::ProcessingFailed)?;
                let err = StorageError::classify(&self.target.bucket, &raw);
                Err(self.fail(err.into()))
            }
        }
    }

    /// Commit and upload in one call.
    ///
    /// Returns `Ok(None)` if an upload was already in flight.
    pub async fn commit<S>(&mut self, storage: &S) -> Result<Option<String>, PipelineError>
    where
        S: ObjectStorage + ?Sized,
    {
        let Some(job) = self.begin_commit()? else {
            return Ok(None);
        };
        let result = job.execute(storage).await;
        self.finish_commit(result).map(Some)
    }

    /// Select a file and, for targets without an editor, upload it.
    pub async fn accept_file<S>(
        &mut self,
        file: SelectedFile,
        storage: &S,
    ) -> Result<Option<String>, PipelineError>
    where
        S: ObjectStorage + ?Sized,
    {
        let Some(job) = self.select_file(file)? else {
            return Ok(None);
        };
        let result = job.execute(storage).await;
        self.finish_commit(result).map(Some)
    }

    /// Return from `Failed` to the editor with a fresh preview.
    pub fn retry_edit(&mut self) -> Result<(), PipelineError> {
        let next = self.check(SessionEvent::Retry)?;
        let Some(session) = self.session.as_ref() else {
            let state = self.state;
            return Err(self.report(SessionError::NotEditing { state }.into()));
        };
        let preview = self
            .previews
            .acquire(session.file_bytes(), session.mime_type());
        let preview = match preview {
            Ok(preview) => preview,
            Err(err) => return Err(self.report(err.into())),
        };

        if let Some(session) = self.session.as_mut() {
            session.attach_preview(preview);
        }
        self.state = next;
        self.last_error = None;
        Ok(())
    }

    /// Abandon the current session. Not allowed while uploading.
    pub fn cancel(&mut self) -> Result<(), PipelineError> {
        if self.state.is_busy() {
            return Err(self.report(SessionError::UploadInFlight.into()));
        }
        self.apply(SessionEvent::Cancel)?;
        self.session = None;
        self.uploaded_url = None;
        self.last_error = None;
        Ok(())
    }

    fn editing(&mut self) -> Result<&mut EditingSession, PipelineError> {
        if self.state != SessionState::Editing || self.session.is_none() {
            let state = self.state;
            return Err(self.report(SessionError::NotEditing { state }.into()));
        }
        self.session.as_mut().ok_or_else(|| {
            PipelineError::from(SessionError::NotEditing {
                state: SessionState::Editing,
            })
        })
    }

    fn prepare_upload(&mut self) -> Result<UploadJob, PipelineError> {
        match self.build_job() {
            Ok(job) => Ok(job),
            Err(err) => Err(self.fail(err)),
        }
    }

    fn build_job(&mut self) -> Result<UploadJob, PipelineError> {
        let bounds = self.target.bounds;
        let density = self.pixel_density;
        let session = self
            .session
            .as_mut()
            .ok_or(SessionError::NotEditing { state: self.state })?;
        let asset = session.encoded_asset(bounds, density)?;
        let object_id =
            random_object_id().map_err(|err| PipelineError::ObjectKey(err.to_string()))?;
        Ok(UploadJob::new(&self.target, &object_id, &asset))
    }

    /// Validate `event` against the current state without applying it.
    fn check(&mut self, event: SessionEvent) -> Result<SessionState, PipelineError> {
        match transition(self.state, event) {
            Some(next) => Ok(next),
            None if self.state.is_busy() => Err(self.report(SessionError::UploadInFlight.into())),
            None => {
                let state = self.state;
                Err(self.report(SessionError::InvalidTransition { state, event }.into()))
            }
        }
    }

    fn apply(&mut self, event: SessionEvent) -> Result<(), PipelineError> {
        let next = self.check(event)?;
        if next != self.state {
            log::info!("session {} -> {next} on {event:?}", self.state);
        }
        self.state = next;
        Ok(())
    }

    fn fail(&mut self, err: PipelineError) -> PipelineError {
        if let Some(next) = transition(self.state, SessionEvent::ProcessingFailed) {
            self.state = next;
        }
        if let Some(session) = self.session.as_mut() {
            session.release_preview();
        }
        self.last_error = Some(err.clone());
        self.report(err)
    }

    fn report(&mut self, err: PipelineError) -> PipelineError {
        log::warn!("{err}");
        if let Some(callback) = self.events.on_error.as_mut() {
            callback(&err);
        }
        err
    }
}

impl<P> fmt::Debug for UploadCoordinator<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadCoordinator")
            .field("target", &self.target)
            .field("state", &self.state)
            .field("session", &self.session)
            .field("uploaded_url", &self.uploaded_url)
            .finish_non_exhaustive()
    }
}
