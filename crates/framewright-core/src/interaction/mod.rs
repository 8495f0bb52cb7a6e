//! Pointer-drag state machine for crop and logo manipulation.
//!
//! One [`InteractionController::dispatch`] call handles every pointer event.
//! The controller never touches the collection: it returns the photo a drag
//! step would produce, and the caller records it as a live edit. Pointer-up
//! (or anything treated as one) finishes the drag so the caller can commit.

mod crop_drag;
mod snap;

use std::f64::consts::{FRAC_PI_2, PI};

use crate::config::EditorConfig;
use crate::model::{CropRect, LogoId, Photo};
use crate::transform::{active_viewport, effective_dimensions, DisplayMapping, OrientedPoint, ScreenPoint};

pub use crop_drag::{move_crop, resize_crop};
pub use hit_test::{hit_test, CropHandle, Hit, HitRadii, LogoCorner, LogoGeometry};
pub use snap::{snap_position, SnapGuides, SnapParams};

/// What the pointer is manipulating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionMode {
    /// Crop editing; `ratio` is width / height when locked.
    Crop { ratio: Option<f64> },
    Logo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Move,
    Up,
    CaptureLost,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub position: ScreenPoint,
    /// Whether any button is still held (moves only).
    pub buttons_down: bool,
}

impl PointerEvent {
    pub fn down(x: f64, y: f64) -> Self {
        Self {
            kind: PointerKind::Down,
            position: ScreenPoint::new(x, y),
            buttons_down: true,
        }
    }

    pub fn drag(x: f64, y: f64) -> Self {
        Self {
            kind: PointerKind::Move,
            position: ScreenPoint::new(x, y),
            buttons_down: true,
        }
    }

    pub fn up(x: f64, y: f64) -> Self {
        Self {
            kind: PointerKind::Up,
            position: ScreenPoint::new(x, y),
            buttons_down: false,
        }
    }

    pub fn with_kind(kind: PointerKind, x: f64, y: f64) -> Self {
        Self {
            kind,
            position: ScreenPoint::new(x, y),
            buttons_down: matches!(kind, PointerKind::Down | PointerKind::Move),
        }
    }
}

/// Drag state with everything the next move needs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    MovingCrop {
        start: OrientedPoint,
        start_crop: CropRect,
    },
    ResizingCrop {
        handle: CropHandle,
        start: OrientedPoint,
        start_crop: CropRect,
    },
    MovingLogo {
        logo: LogoId,
        /// Pointer minus logo center at grab time, viewport-normalized.
        grab_offset: (f64, f64),
    },
    ScalingLogo {
        logo: LogoId,
        start_scale: f64,
        start_distance: f64,
    },
    RotatingLogo {
        logo: LogoId,
    },
}

/// Everything dispatch needs besides the photo.
#[derive(Debug, Clone, Copy)]
pub struct InteractionContext<'a> {
    pub mode: InteractionMode,
    pub mapping: DisplayMapping,
    pub config: &'a EditorConfig,
}

/// Result of one dispatched event.
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    /// Nothing happened.
    Ignored,
    /// A drag started (selection may have changed).
    Started,
    /// A live edit: the photo as it should look now.
    Updated(Photo),
    /// The drag ended; commit whatever live edits it produced.
    Finished,
}

#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    state: DragState,
    active_logo: Option<LogoId>,
    guides: SnapGuides,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        self.state != DragState::Idle
    }

    pub fn active_logo(&self) -> Option<LogoId> {
        self.active_logo
    }

    pub fn select_logo(&mut self, logo: Option<LogoId>) {
        self.active_logo = logo;
    }

    /// Snap guides of the current logo drag.
    pub fn guides(&self) -> SnapGuides {
        self.guides
    }

    /// Abandon any drag without finishing it (photo switch, undo).
    pub fn reset(&mut self) {
        self.state = DragState::Idle;
        self.guides = SnapGuides::default();
    }

    pub fn dispatch(
        &mut self,
        photo: &Photo,
        ctx: &InteractionContext<'_>,
        event: PointerEvent,
    ) -> DragOutcome {
        let implicit_up = event.kind == PointerKind::Move && !event.buttons_down;
        match event.kind {
            PointerKind::Down => self.pointer_down(photo, ctx, event.position),
            PointerKind::Move if !implicit_up => self.pointer_move(photo, ctx, event.position),
            PointerKind::Move | PointerKind::Up | PointerKind::CaptureLost | PointerKind::Cancel => {
                self.pointer_up()
            }
        }
    }

    fn pointer_down(
        &mut self,
        photo: &Photo,
        ctx: &InteractionContext<'_>,
        position: ScreenPoint,
    ) -> DragOutcome {
        if self.is_dragging() {
            return DragOutcome::Ignored;
        }

        if self.active_logo.is_some_and(|id| photo.logo(id).is_none()) {
            self.active_logo = None;
        }

        let p = ctx.mapping.to_oriented(position);
        let radii = HitRadii::new(
            &ctx.mapping,
            ctx.config.handle_radius_px,
            ctx.config.rotate_handle_offset_px,
        );
        let viewport = active_viewport(photo);

        let Some(hit) = hit_test(photo, ctx.mode, self.active_logo, p, radii) else {
            if ctx.mode == InteractionMode::Logo {
                self.active_logo = None;
            }
            return DragOutcome::Ignored;
        };

        self.state = match hit {
            Hit::CropHandle(handle) => DragState::ResizingCrop {
                handle,
                start: p,
                start_crop: viewport,
            },
            Hit::CropBody => DragState::MovingCrop {
                start: p,
                start_crop: viewport,
            },
            Hit::LogoBody(id) => {
                let Some(logo) = photo.logo(id) else {
                    return DragOutcome::Ignored;
                };
                self.active_logo = Some(id);
                let v = p.to_viewport(&viewport);
                DragState::MovingLogo {
                    logo: id,
                    grab_offset: (v.x - logo.x, v.y - logo.y),
                }
            }
            Hit::LogoCorner(id, _) => {
                let Some(logo) = photo.logo(id) else {
                    return DragOutcome::Ignored;
                };
                let geo = LogoGeometry::resolve(logo, &viewport);
                DragState::ScalingLogo {
                    logo: id,
                    start_scale: logo.scale,
                    start_distance: geo.center.distance(p.to_kurbo()),
                }
            }
            Hit::LogoRotate(id) => DragState::RotatingLogo { logo: id },
        };
        DragOutcome::Started
    }

    fn pointer_move(
        &mut self,
        photo: &Photo,
        ctx: &InteractionContext<'_>,
        position: ScreenPoint,
    ) -> DragOutcome {
        let p = ctx.mapping.to_oriented(position);
        let viewport = active_viewport(photo);
        let (ew, eh) = effective_dimensions(photo);
        let bounds = (ew as f64, eh as f64);

        let next = match self.state {
            DragState::Idle => return DragOutcome::Ignored,
            DragState::MovingCrop { start, start_crop } => {
                let crop = move_crop(start_crop, p.x - start.x, p.y - start.y, bounds);
                photo.with_crop(Some(crop))
            }
            DragState::ResizingCrop {
                handle,
                start,
                start_crop,
            } => {
                let ratio = match ctx.mode {
                    InteractionMode::Crop { ratio } => ratio,
                    InteractionMode::Logo => None,
                };
                let min_size = ctx.mapping.screen_len(ctx.config.min_crop_px);
                let crop = resize_crop(
                    start_crop,
                    handle,
                    p.x - start.x,
                    p.y - start.y,
                    bounds,
                    ratio,
                    min_size,
                );
                photo.with_crop(Some(crop))
            }
            DragState::MovingLogo { logo, grab_offset } => {
                let Some(layer) = photo.logo(logo) else {
                    return DragOutcome::Ignored;
                };
                let v = p.to_viewport(&viewport);
                let geo = LogoGeometry::resolve(layer, &viewport);
                let extents = geo.half_extents();
                let params = SnapParams::new(
                    (extents.x, extents.y),
                    (viewport.width, viewport.height),
                    ctx.mapping.scale,
                    ctx.config.snap_threshold_px,
                );
                let (x, y, guides) =
                    snap_position(v.x - grab_offset.0, v.y - grab_offset.1, &params);
                self.guides = guides;

                let mut moved = layer.clone();
                moved.x = x;
                moved.y = y;
                match photo.with_logo(moved) {
                    Some(next) => next,
                    None => return DragOutcome::Ignored,
                }
            }
            DragState::ScalingLogo {
                logo,
                start_scale,
                start_distance,
            } => {
                let Some(layer) = photo.logo(logo) else {
                    return DragOutcome::Ignored;
                };
                if start_distance <= f64::EPSILON {
                    return DragOutcome::Ignored;
                }
                let geo = LogoGeometry::resolve(layer, &viewport);
                let distance = geo.center.distance(p.to_kurbo());
                let mut scaled = layer.clone();
                scaled.scale =
                    (start_scale * distance / start_distance).max(ctx.config.min_logo_scale);
                match photo.with_logo(scaled) {
                    Some(next) => next,
                    None => return DragOutcome::Ignored,
                }
            }
            DragState::RotatingLogo { logo } => {
                let Some(layer) = photo.logo(logo) else {
                    return DragOutcome::Ignored;
                };
                let geo = LogoGeometry::resolve(layer, &viewport);
                let mut rotated = layer.clone();
                rotated.rotation = normalize_angle(
                    (p.y - geo.center.y).atan2(p.x - geo.center.x) + FRAC_PI_2,
                );
                match photo.with_logo(rotated) {
                    Some(next) => next,
                    None => return DragOutcome::Ignored,
                }
            }
        };

        DragOutcome::Updated(next)
    }

    fn pointer_up(&mut self) -> DragOutcome {
        if !self.is_dragging() {
            return DragOutcome::Ignored;
        }
        self.reset();
        DragOutcome::Finished
    }
}

/// Wrap into (-PI, PI].
fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle % (2.0 * PI);
    if a <= -PI {
        a += 2.0 * PI;
    } else if a > PI {
        a -= 2.0 * PI;
    }
    a
}
