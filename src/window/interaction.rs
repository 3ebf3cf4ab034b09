//! Per-surface drag/resize state machine.
//!
//! `Idle -> Dragging -> Idle` and `Idle -> Resizing -> Idle`. While not idle
//! the controller holds a [`PointerLease`], the global pointer subscription
//! for exactly one interaction. Every path back to `Idle` drops the lease.
//!
//! Geometry produced while moving is a live mirror only; the registries see
//! a single commit (or a zone drop) on release.

use std::mem;

use super::{DesktopEvent, EntityId, GeometryPatch};
use crate::layout::floating::{HitRegion, ResizeEdge, apply_move, apply_resize_drag};
use crate::layout::{Point, Rect, Zone, ZoneId, detect_zone};

/// Global pointer-move/pointer-up subscription for one interaction.
#[derive(Debug)]
pub struct PointerLease {
    entity: EntityId,
}

impl PointerLease {
    fn acquire(entity: EntityId) -> Self {
        tracing::trace!(entity = %entity, "pointer captured");
        Self { entity }
    }
}

impl Drop for PointerLease {
    fn drop(&mut self) {
        tracing::trace!(entity = %self.entity, "pointer released");
    }
}

#[derive(Debug)]
struct DragSession {
    entity: EntityId,
    grab_offset: Point,
    live: Rect,
    hovered: Option<ZoneId>,
    announced: bool,
    _lease: PointerLease,
}

#[derive(Debug)]
struct ResizeSession {
    entity: EntityId,
    edge: ResizeEdge,
    pointer_start: Point,
    start: Rect,
    live: Rect,
    _lease: PointerLease,
}

#[derive(Debug, Default)]
enum State {
    #[default]
    Idle,
    Dragging(DragSession),
    Resizing(ResizeSession),
}

/// Outcome of releasing the pointer.
#[derive(Debug, Clone, PartialEq)]
pub enum Release {
    /// Write the live geometry back to the registry.
    Commit {
        entity: EntityId,
        patch: GeometryPatch,
    },
    /// The entity was released over a zone; placement is decided by the
    /// window manager.
    DroppedOnZone { entity: EntityId, zone: ZoneId },
}

#[derive(Debug, Default)]
pub struct InteractionController {
    state: State,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, State::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, State::Dragging(_))
    }

    pub fn is_resizing(&self) -> bool {
        matches!(self.state, State::Resizing(_))
    }

    pub fn entity(&self) -> Option<&EntityId> {
        match &self.state {
            State::Idle => None,
            State::Dragging(drag) => Some(&drag.entity),
            State::Resizing(resize) => Some(&resize.entity),
        }
    }

    /// Uncommitted geometry of the surface being manipulated.
    pub fn live_rect(&self) -> Option<Rect> {
        match &self.state {
            State::Idle => None,
            State::Dragging(drag) => Some(drag.live),
            State::Resizing(resize) => Some(resize.live),
        }
    }

    pub fn hovered_zone(&self) -> Option<ZoneId> {
        match &self.state {
            State::Dragging(drag) => drag.hovered,
            _ => None,
        }
    }

    /// Pointer-down on `entity` currently occupying `rect`. Returns `false`
    /// when `region` does not start an interaction (the tab strip).
    pub fn begin(&mut self, entity: EntityId, rect: Rect, region: HitRegion, pointer: Point) -> bool {
        if !self.is_idle() {
            tracing::warn!(entity = %entity, "pointer-down while an interaction was active; dropping it");
            self.state = State::Idle;
        }
        self.state = match region {
            HitRegion::Body => {
                tracing::debug!(entity = %entity, "drag started");
                State::Dragging(DragSession {
                    grab_offset: Point::new(pointer.x - rect.x, pointer.y - rect.y),
                    live: rect,
                    hovered: None,
                    announced: false,
                    _lease: PointerLease::acquire(entity.clone()),
                    entity,
                })
            }
            HitRegion::Resize(edge) => {
                tracing::debug!(entity = %entity, ?edge, "resize started");
                State::Resizing(ResizeSession {
                    edge,
                    pointer_start: pointer,
                    start: rect,
                    live: rect,
                    _lease: PointerLease::acquire(entity.clone()),
                    entity,
                })
            }
            HitRegion::TabStrip { .. } => return false,
        };
        true
    }

    /// Track a global pointer move. `zones` is the active zone set; it is
    /// empty when layout mode is off.
    pub fn pointer_move(&mut self, pointer: Point, zones: &[Zone], events: &mut Vec<DesktopEvent>) {
        match &mut self.state {
            State::Idle => {}
            State::Dragging(drag) => {
                drag.live = Rect::from_parts(apply_move(pointer, drag.grab_offset), drag.live.size());
                if zones.is_empty() {
                    if drag.hovered.take().is_some() {
                        events.push(DesktopEvent::ZoneHoverChanged(None));
                    }
                    return;
                }
                if !drag.announced {
                    drag.announced = true;
                    events.push(DesktopEvent::DragStarted(drag.entity.clone()));
                }
                let found = detect_zone(drag.live.center(), zones);
                if found != drag.hovered {
                    drag.hovered = found;
                    events.push(DesktopEvent::ZoneHoverChanged(found));
                }
            }
            State::Resizing(resize) => {
                resize.live =
                    apply_resize_drag(resize.start, resize.edge, pointer, resize.pointer_start);
            }
        }
    }

    /// Pointer-up: always returns to `Idle`.
    pub fn pointer_up(&mut self, events: &mut Vec<DesktopEvent>) -> Option<Release> {
        match mem::take(&mut self.state) {
            State::Idle => None,
            State::Dragging(drag) => {
                if let Some(zone) = drag.hovered {
                    events.push(DesktopEvent::ZoneHoverChanged(None));
                    return Some(Release::DroppedOnZone {
                        entity: drag.entity,
                        zone,
                    });
                }
                Some(Release::Commit {
                    entity: drag.entity,
                    patch: GeometryPatch::position(drag.live.position()),
                })
            }
            State::Resizing(resize) => Some(Release::Commit {
                entity: resize.entity,
                patch: GeometryPatch::rect(resize.live),
            }),
        }
    }

    /// Re-run zone detection for an in-flight drag after the zone set itself
    /// changed (layout switched, layout mode off, viewport resized).
    pub fn rezone(&mut self, zones: &[Zone], events: &mut Vec<DesktopEvent>) {
        let State::Dragging(drag) = &mut self.state else {
            return;
        };
        if !zones.is_empty() && !drag.announced {
            drag.announced = true;
            events.push(DesktopEvent::DragStarted(drag.entity.clone()));
        }
        let found = detect_zone(drag.live.center(), zones);
        if found != drag.hovered {
            drag.hovered = found;
            events.push(DesktopEvent::ZoneHoverChanged(found));
        }
    }

    /// Abandon the current interaction without committing anything. A
    /// hovered zone is cleared upward.
    pub fn cancel(&mut self, events: &mut Vec<DesktopEvent>) {
        if self.hovered_zone().is_some() {
            events.push(DesktopEvent::ZoneHoverChanged(None));
        }
        self.state = State::Idle;
    }
}
