// Shift Gesture System
//
// Turns a pointer down/move/up stream on one shift box into a click, a move
// (start and end shift together, snapping whole days horizontally) or a resize
// (end time only, from the bottom-right corner of the final segment).

use chrono::Duration;
use egui::{Pos2, Vec2};

use crate::layout::geometry::{GeometryResolver, ShiftSegment};
use crate::layout::time_slot::SLOT_MINUTES;
use crate::models::settings::Settings;
use crate::models::shift::{Shift, ShiftId};

/// Tunables for gesture classification
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureConfig {
    /// Max distance from the final segment's bottom-right corner that grabs the resize handle
    pub resize_tolerance: f32,
    /// Squared pointer travel below which a move press counts as a click
    pub click_threshold_sq: f32,
    /// Resizing never makes a shift shorter than this
    pub min_duration: Duration,
}

impl GestureConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            resize_tolerance: settings.resize_tolerance,
            click_threshold_sq: settings.click_threshold_sq,
            min_duration: Duration::minutes(settings.min_shift_minutes),
        }
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { pos: Pos2 },
    Move { pos: Pos2 },
    Up { pos: Pos2 },
    /// Pointer lost or gesture aborted; the shift snaps back
    Cancel,
}

/// Transient state of one press-drag-release on a shift box.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    /// Segment that received the press
    pub segment_index: usize,
    pub segment_day: usize,
    /// Top-left of the pressed segment at press time
    pub segment_origin: Pos2,
    /// Global pointer position at press time
    pub pointer_origin: Pos2,
    /// Pointer position relative to the pressed segment's top-left
    pub pointer_offset: Vec2,
    /// Shift as it was before the gesture
    pub original: Shift,
    /// Shift with the gesture applied so far
    pub live: Shift,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Move(DragSession),
    Resize(DragSession),
}

impl GestureState {
    pub fn session(&self) -> Option<&DragSession> {
        match self {
            GestureState::Idle => None,
            GestureState::Move(session) | GestureState::Resize(session) => Some(session),
        }
    }

    fn session_mut(&mut self) -> Option<&mut DragSession> {
        match self {
            GestureState::Idle => None,
            GestureState::Move(session) | GestureState::Resize(session) => Some(session),
        }
    }
}

/// What the owner of the shift box has to do after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureEffect {
    /// Route all further pointer events to this interpreter
    CapturePointer,
    /// Stop routing pointer events to this interpreter
    ReleasePointer,
    /// Draw the shift at these provisional times
    Preview(Shift),
    /// Open the detail popover
    Click(ShiftId),
    /// Hand the gesture result to the reconciliation controller
    Commit { original: Shift, updated: Shift },
}

/// Per-shift-box state machine: `Idle → Move | Resize → Idle`.
#[derive(Debug, Clone)]
pub struct GestureInterpreter {
    shift_id: ShiftId,
    config: GestureConfig,
    state: GestureState,
}

impl GestureInterpreter {
    pub fn new(shift_id: ShiftId, config: GestureConfig) -> Self {
        Self {
            shift_id,
            config,
            state: GestureState::Idle,
        }
    }

    pub fn shift_id(&self) -> ShiftId {
        self.shift_id
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.state, GestureState::Idle)
    }

    /// Shift as currently previewed, if a gesture is in progress.
    pub fn live_shift(&self) -> Option<&Shift> {
        self.state.session().map(|session| &session.live)
    }

    /// Single transition function.
    ///
    /// `shift` and `segments` describe the box as currently rendered; they are
    /// read on press only.
    pub fn handle(
        &mut self,
        event: PointerEvent,
        shift: &Shift,
        segments: &[ShiftSegment],
        resolver: &GeometryResolver,
    ) -> Vec<GestureEffect> {
        match event {
            PointerEvent::Down { pos } => self.press(pos, shift, segments),
            PointerEvent::Move { pos } => self.drag(pos, resolver),
            PointerEvent::Up { pos } => self.release(pos),
            PointerEvent::Cancel => self.cancel(),
        }
    }

    fn press(&mut self, pos: Pos2, shift: &Shift, segments: &[ShiftSegment]) -> Vec<GestureEffect> {
        if self.is_active() {
            return Vec::new();
        }
        let Some(segment) = segments
            .iter()
            .find(|segment| segment.shift_id == self.shift_id && segment.rect.contains(pos))
        else {
            return Vec::new();
        };

        let session = DragSession {
            segment_index: segment.index,
            segment_day: segment.day,
            segment_origin: segment.rect.min,
            pointer_origin: pos,
            pointer_offset: pos - segment.rect.min,
            original: shift.clone(),
            live: shift.clone(),
        };

        self.state = if GeometryResolver::hits_resize_handle(segment, pos, self.config.resize_tolerance) {
            log::debug!("Shift {}: resize started on segment {}", self.shift_id, segment.index);
            GestureState::Resize(session)
        } else {
            log::debug!("Shift {}: move started on segment {}", self.shift_id, segment.index);
            GestureState::Move(session)
        };

        vec![GestureEffect::CapturePointer]
    }

    fn drag(&mut self, pos: Pos2, resolver: &GeometryResolver) -> Vec<GestureEffect> {
        let resizing = matches!(self.state, GestureState::Resize(_));
        let min_duration = self.config.min_duration;
        let Some(session) = self.state.session_mut() else {
            return Vec::new();
        };

        let snapped = pos - session.pointer_offset;
        let delta_days = resolver.day_delta(snapped.x - session.segment_origin.x);
        let delta_time = vertical_delta(resolver, session.segment_day, session.pointer_origin.y, pos.y);

        let original = &session.original;
        if resizing {
            // A shift already shorter than the minimum is never lengthened by the clamp.
            let floor = (original.start_time + min_duration).min(original.end_time);
            session.live.end_time = (original.end_time + delta_time).max(floor);
        } else {
            let offset = delta_time + Duration::days(delta_days);
            session.live.start_time = original.start_time + offset;
            session.live.end_time = original.end_time + offset;
        }

        vec![GestureEffect::Preview(session.live.clone())]
    }

    fn release(&mut self, pos: Pos2) -> Vec<GestureEffect> {
        let state = std::mem::take(&mut self.state);
        let (session, was_move) = match state {
            GestureState::Idle => return Vec::new(),
            GestureState::Move(session) => (session, true),
            GestureState::Resize(session) => (session, false),
        };

        let travel = session.pointer_origin.distance_sq(pos);
        let outcome = if was_move && travel < self.config.click_threshold_sq {
            log::debug!("Shift {}: click", self.shift_id);
            GestureEffect::Click(self.shift_id)
        } else {
            log::debug!(
                "Shift {}: {} committed {} → {}",
                self.shift_id,
                if was_move { "move" } else { "resize" },
                session.live.start_time,
                session.live.end_time
            );
            GestureEffect::Commit {
                original: session.original,
                updated: session.live,
            }
        };

        vec![GestureEffect::ReleasePointer, outcome]
    }

    fn cancel(&mut self) -> Vec<GestureEffect> {
        match std::mem::take(&mut self.state) {
            GestureState::Idle => Vec::new(),
            GestureState::Move(session) | GestureState::Resize(session) => vec![
                GestureEffect::ReleasePointer,
                GestureEffect::Preview(session.original),
            ],
        }
    }
}

/// Continuous time offset for a vertical pointer travel, rounded to whole minutes.
fn vertical_delta(resolver: &GeometryResolver, day: usize, from_y: f32, to_y: f32) -> Duration {
    let (Some(from), Some(to)) = (resolver.index_at(day, from_y), resolver.index_at(day, to_y)) else {
        return Duration::zero();
    };
    let minutes = ((to - from) * SLOT_MINUTES as f32).round() as i64;
    Duration::minutes(minutes)
}
