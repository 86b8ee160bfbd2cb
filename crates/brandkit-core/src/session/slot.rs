use futures::future::AbortHandle;
use serde::{Deserialize, Serialize};

use super::pending::{
    Completion, ExportCompletion, LoadedSource, Pending, PendingExport, PendingSelect,
    SelectCompletion, Selection, Ticket,
};
use super::SlotError;
use crate::decode::{decode_source, DisplaySize};
use crate::encode::{export_crop, ExportedAsset};
use crate::guard::{validate_and_guard, AcceptedSource, MediaType, RawSource};
use crate::preview::Preview;
use crate::target::{TargetError, TargetSpec};
use crate::transform::{CropController, CropRegion};

/// Where a slot is in its edit flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditState {
    /// Nothing selected, or a selection is still loading.
    Idle,
    /// A guarded source is loaded. Terminal for slots without a cropper.
    Selected,
    /// The interactive cropper is open.
    Cropping,
    /// A cropped asset is committed.
    Committed,
}

/// An asset the form can submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmittableAsset {
    /// The guarded source itself, for slots that skip the cropper.
    Guarded(AcceptedSource),
    /// A fixed-resolution export of a crop.
    Cropped(ExportedAsset),
}

impl SubmittableAsset {
    pub fn bytes(&self) -> &bytes::Bytes {
        match self {
            SubmittableAsset::Guarded(source) => &source.bytes,
            SubmittableAsset::Cropped(asset) => &asset.bytes,
        }
    }

    pub fn filename(&self) -> &str {
        match self {
            SubmittableAsset::Guarded(source) => &source.filename,
            SubmittableAsset::Cropped(asset) => &asset.filename,
        }
    }

    pub fn media_type(&self) -> MediaType {
        match self {
            SubmittableAsset::Guarded(source) => source.media_type,
            SubmittableAsset::Cropped(asset) => asset.media_type,
        }
    }

    pub fn preview(&self) -> Preview {
        Preview::new(self.media_type(), self.bytes().clone())
    }
}

/// The state a slot settled into after an event, and what to show for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: EditState,
    pub preview: Option<Preview>,
}

/// Result of handing a completion back to a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotUpdate {
    Applied(Transition),
    /// The completion belonged to an abandoned session and was ignored.
    Discarded,
}

#[derive(Debug)]
struct Commit {
    asset: SubmittableAsset,
    /// Encoded source the asset was made from. Re-edit decodes it again.
    origin: AcceptedSource,
}

#[derive(Debug)]
struct InFlight {
    ticket: Ticket,
    abort: AbortHandle,
}

/// One independent edit pipeline for one asset role.
///
/// Asynchronous steps are returned as [`Pending`] futures. The host drives
/// them however it likes and hands the [`Completion`] back through
/// [`Slot::finish_select`] or [`Slot::finish_export`]. Only the most recent
/// step is ever applied.
#[derive(Debug)]
pub struct Slot {
    target: TargetSpec,
    state: EditState,
    last_ticket: u64,
    in_flight: Option<InFlight>,
    source: Option<LoadedSource>,
    cropper: Option<CropController>,
    committed: Option<Commit>,
}

impl Slot {
    pub fn new(target: TargetSpec) -> Result<Self, TargetError> {
        target.validate()?;
        Ok(Self {
            target,
            state: EditState::Idle,
            last_ticket: 0,
            in_flight: None,
            source: None,
            cropper: None,
            committed: None,
        })
    }

    pub fn target(&self) -> &TargetSpec {
        &self.target
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    pub fn committed(&self) -> Option<&SubmittableAsset> {
        self.committed.as_ref().map(|commit| &commit.asset)
    }

    /// The source being edited, if any.
    pub fn source(&self) -> Option<&LoadedSource> {
        self.source.as_ref()
    }

    /// Whether a select or export step is outstanding.
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn crop_region(&self) -> Option<CropRegion> {
        self.cropper.as_ref().map(CropController::region)
    }

    pub fn zoom(&self) -> Option<f64> {
        self.cropper.as_ref().map(CropController::zoom)
    }

    /// What the form should display for the slot right now.
    ///
    /// While a cropped slot is being edited this is the selected source;
    /// otherwise it is the committed asset.
    pub fn preview(&self) -> Option<Preview> {
        match self.state {
            EditState::Selected | EditState::Cropping if self.target.requires_crop => self
                .source
                .as_ref()
                .map(|source| source.accepted.preview()),
            _ => self.committed().map(SubmittableAsset::preview),
        }
    }

    /// Start loading a newly selected file, abandoning any edit in progress.
    ///
    /// A previously committed asset stays available until the new selection
    /// is committed.
    pub fn on_select(&mut self, raw: RawSource) -> PendingSelect {
        self.cropper = None;
        self.source = None;
        self.state = EditState::Idle;

        let target = self.target.clone();
        let ticket = self.begin();
        tracing::debug!(ticket = ticket.0, filename = %raw.filename, size = raw.len(), "select");

        let (pending, abort) = Pending::spawn(ticket, move || {
            let accepted = validate_and_guard(raw, &target)?;
            if !target.requires_crop {
                return Ok(Selection::Guarded(accepted));
            }
            let image = decode_source(&accepted.bytes)?;
            Ok(Selection::Loaded(LoadedSource { accepted, image }))
        });
        self.in_flight = Some(InFlight { ticket, abort });
        pending
    }

    /// Apply a finished select step.
    ///
    /// Slots without a cropper commit the guarded source immediately.
    pub fn finish_select(&mut self, completion: SelectCompletion) -> Result<SlotUpdate, SlotError> {
        let Some(result) = self.accept(completion) else {
            return Ok(SlotUpdate::Discarded);
        };

        let selection = match result {
            Ok(selection) => selection,
            Err(err) => {
                self.state = self.settled_state();
                return Err(err);
            }
        };

        match selection {
            Selection::Loaded(loaded) => self.source = Some(loaded),
            Selection::Guarded(accepted) => {
                self.committed = Some(Commit {
                    asset: SubmittableAsset::Guarded(accepted.clone()),
                    origin: accepted,
                });
            }
        }
        self.state = EditState::Selected;
        Ok(SlotUpdate::Applied(self.transition()))
    }

    /// Record the live on-screen size of the source.
    ///
    /// Returns the re-laid-out region when the cropper is open.
    pub fn on_layout(&mut self, display: DisplaySize) -> Option<CropRegion> {
        if let Some(source) = self.source.as_mut() {
            source.image = source.image.clone().with_display(display);
        }
        self.cropper
            .as_mut()
            .map(|cropper| cropper.relayout(display))
    }

    /// Enter the cropper for the selected source.
    pub fn on_open_cropper(
        &mut self,
        display: Option<DisplaySize>,
    ) -> Result<CropRegion, SlotError> {
        if self.state != EditState::Selected || !self.target.requires_crop {
            return Err(self.invalid("open the cropper"));
        }
        let Some(source) = self.source.as_mut() else {
            return Err(SlotError::InvalidState {
                event: "open the cropper",
                state: self.state,
            });
        };
        if let Some(display) = display {
            source.image = source.image.clone().with_display(display);
        }

        let cropper = CropController::new(&source.image, &self.target);
        let region = cropper.region();
        self.cropper = Some(cropper);
        self.state = EditState::Cropping;
        Ok(region)
    }

    pub fn on_crop_change(&mut self, proposal: CropRegion) -> Result<CropRegion, SlotError> {
        let cropper = self.cropper.as_mut().ok_or(SlotError::NoActiveCropRegion)?;
        Ok(cropper.update(proposal))
    }

    pub fn on_zoom(&mut self, zoom: f64) -> Result<f64, SlotError> {
        let cropper = self.cropper.as_mut().ok_or(SlotError::NoActiveCropRegion)?;
        Ok(cropper.set_zoom(zoom))
    }

    /// Start exporting the current crop.
    ///
    /// Fails with [`SlotError::NoActiveCropRegion`] when no region has
    /// resolved; the slot is left untouched in that case.
    pub fn on_apply_crop(&mut self) -> Result<PendingExport, SlotError> {
        let (Some(cropper), Some(source)) = (self.cropper.as_ref(), self.source.as_ref()) else {
            return Err(SlotError::NoActiveCropRegion);
        };
        let region = cropper.resolved_region();
        if !region.is_well_formed() {
            return Err(SlotError::NoActiveCropRegion);
        }

        let image = source.image.clone().with_display(cropper.display());
        let target = self.target.clone();
        let ticket = self.begin();
        tracing::debug!(ticket = ticket.0, ?region, "apply crop");

        let (pending, abort) = Pending::spawn(ticket, move || {
            Ok(export_crop(&image, &region, &target)?)
        });
        self.in_flight = Some(InFlight { ticket, abort });
        Ok(pending)
    }

    /// Apply a finished export step, committing the asset.
    ///
    /// On failure the cropper stays open so the user can retry or cancel.
    pub fn finish_export(&mut self, completion: ExportCompletion) -> Result<SlotUpdate, SlotError> {
        let Some(result) = self.accept(completion) else {
            return Ok(SlotUpdate::Discarded);
        };
        let asset = result?;

        let Some(source) = self.source.take() else {
            tracing::debug!("export finished without a source, discarding");
            return Ok(SlotUpdate::Discarded);
        };
        self.committed = Some(Commit {
            asset: SubmittableAsset::Cropped(asset),
            origin: source.accepted,
        });
        self.cropper = None;
        self.state = EditState::Committed;
        Ok(SlotUpdate::Applied(self.transition()))
    }

    /// Leave the cropper, keeping any previously committed asset as it was.
    pub fn on_cancel_crop(&mut self) -> Transition {
        self.abort_in_flight();
        self.cropper = None;
        self.source = None;
        self.state = self.settled_state();
        self.transition()
    }

    /// Reopen the committed asset's source for another crop, decoding it again.
    pub fn on_reedit(&mut self) -> Result<Transition, SlotError> {
        if self.state != EditState::Committed {
            return Err(self.invalid("re-edit"));
        }
        let Some(commit) = self.committed.as_ref() else {
            return Err(self.invalid("re-edit"));
        };
        let image = decode_source(&commit.origin.bytes)?;
        self.source = Some(LoadedSource {
            accepted: commit.origin.clone(),
            image,
        });
        self.state = EditState::Selected;
        Ok(self.transition())
    }

    /// Drop everything, including the committed asset.
    pub fn on_reset(&mut self) -> Transition {
        self.abort_in_flight();
        self.cropper = None;
        self.source = None;
        self.committed = None;
        self.state = EditState::Idle;
        self.transition()
    }

    fn transition(&self) -> Transition {
        Transition {
            state: self.state,
            preview: self.preview(),
        }
    }

    /// State to fall back to when an edit is abandoned.
    fn settled_state(&self) -> EditState {
        match (&self.committed, self.target.requires_crop) {
            (Some(_), true) => EditState::Committed,
            (Some(_), false) => EditState::Selected,
            (None, _) => EditState::Idle,
        }
    }

    fn invalid(&self, event: &'static str) -> SlotError {
        SlotError::InvalidState {
            event,
            state: self.state,
        }
    }

    /// Abort the previous step and open a new session.
    fn begin(&mut self) -> Ticket {
        self.abort_in_flight();
        self.last_ticket += 1;
        Ticket(self.last_ticket)
    }

    fn abort_in_flight(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            tracing::debug!(ticket = in_flight.ticket.0, "aborting in-flight step");
            in_flight.abort.abort();
        }
    }

    /// Unwrap a completion if it belongs to the current session.
    fn accept<T>(&mut self, completion: Completion<T>) -> Option<Result<T, SlotError>> {
        let current = self.in_flight.as_ref().map(|in_flight| in_flight.ticket);
        if current != Some(completion.ticket) {
            tracing::debug!(
                ticket = completion.ticket.0,
                current = ?current.map(|ticket| ticket.0),
                "discarding stale completion"
            );
            return None;
        }
        self.in_flight = None;

        match completion.outcome {
            Ok(result) => Some(result),
            Err(_) => {
                tracing::debug!(ticket = completion.ticket.0, "discarding aborted completion");
                None
            }
        }
    }
}

impl Drop for Slot {
    fn drop(&mut self) {
        self.abort_in_flight();
    }
}
