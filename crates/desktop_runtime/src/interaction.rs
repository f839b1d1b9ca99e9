//! Per-window drag and resize state machine.
//!
//! The controller is pure arithmetic over pointer coordinates. The window component feeds it
//! pointer events with a timestamp and forwards the returned commands to the window manager.
//! Geometry commits during a gesture are throttled; the final geometry is always committed on
//! release.

use desktop_app_contract::{WindowPosition, WindowSize};

use crate::{
    model::{PointerPosition, ResizeDirection, ShellConfig, Viewport, WindowGeometry},
    throttle::Throttle,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionPhase {
    Idle,
    Dragging {
        /// Pointer position relative to the window's top-left corner at press time.
        grab_offset: PointerPosition,
    },
    Resizing {
        direction: ResizeDirection,
    },
}

/// Alignment line a dragged window currently snaps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SnapGuide {
    /// Viewport left edge (`x = 0`).
    Left,
    /// Viewport top edge (`y = 0`).
    Top,
    /// Horizontally centered.
    CenterX,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerCommand {
    BringToFront,
    UpdateWindow(WindowGeometry),
}

#[derive(Debug, Clone)]
pub struct InteractionController {
    phase: InteractionPhase,
    geometry: WindowGeometry,
    guides: Vec<SnapGuide>,
    last_pointer: Option<PointerPosition>,
    travel_since_guides: i32,
    snap_threshold_px: i32,
    guide_recompute_px: i32,
    min_size: WindowSize,
    throttle: Throttle<WindowGeometry>,
}

impl InteractionController {
    pub fn new(geometry: WindowGeometry, config: &ShellConfig) -> Self {
        Self {
            phase: InteractionPhase::Idle,
            geometry,
            guides: Vec::new(),
            last_pointer: None,
            travel_since_guides: 0,
            snap_threshold_px: config.snap_threshold_px,
            guide_recompute_px: config.guide_recompute_px,
            min_size: config.min_size,
            throttle: Throttle::new(config.commit_interval_ms),
        }
    }

    pub fn phase(&self) -> InteractionPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase != InteractionPhase::Idle
    }

    /// Geometry to render: the live gesture geometry while active, else the last synced one.
    pub fn geometry(&self) -> WindowGeometry {
        self.geometry
    }

    pub fn guides(&self) -> &[SnapGuide] {
        &self.guides
    }

    /// Adopts geometry from the window manager. Ignored mid-gesture so the pointer stays in charge.
    pub fn sync_geometry(&mut self, geometry: WindowGeometry) {
        if !self.is_active() {
            self.geometry = geometry;
        }
    }

    /// Starts a titlebar drag. Returns the focus command, or nothing when a gesture is running.
    pub fn begin_drag(&mut self, pointer: PointerPosition) -> Option<ControllerCommand> {
        if self.is_active() {
            return None;
        }
        let position = self.geometry.position;
        self.phase = InteractionPhase::Dragging {
            grab_offset: PointerPosition::new(pointer.x - position.x, pointer.y - position.y),
        };
        self.start_gesture(pointer);
        Some(ControllerCommand::BringToFront)
    }

    /// Starts a resize from one of the edge handles.
    pub fn begin_resize(
        &mut self,
        direction: ResizeDirection,
        pointer: PointerPosition,
    ) -> Option<ControllerCommand> {
        if self.is_active() {
            return None;
        }
        self.phase = InteractionPhase::Resizing { direction };
        self.start_gesture(pointer);
        Some(ControllerCommand::BringToFront)
    }

    fn start_gesture(&mut self, pointer: PointerPosition) {
        self.last_pointer = Some(pointer);
        self.travel_since_guides = 0;
        self.guides.clear();
        self.throttle.reset();
    }

    /// Applies a pointer move. Returns a commit when the throttle lets one through.
    pub fn pointer_move(
        &mut self,
        pointer: PointerPosition,
        viewport: Viewport,
        now_ms: u64,
    ) -> Option<ControllerCommand> {
        match self.phase {
            InteractionPhase::Idle => return None,
            InteractionPhase::Dragging { grab_offset } => {
                let raw = WindowPosition::new(pointer.x - grab_offset.x, pointer.y - grab_offset.y);
                self.track_travel(pointer, raw, viewport);
                self.geometry.position = self.snapped(raw, viewport);
            }
            InteractionPhase::Resizing { direction } => {
                let origin = self.geometry.position;
                let mut size = self.geometry.size;
                if direction.resizes_width() {
                    size.width = pointer.x - origin.x;
                }
                if direction.resizes_height() {
                    size.height = pointer.y - origin.y;
                }
                self.geometry.size = size.clamped_min(self.min_size);
                self.last_pointer = Some(pointer);
            }
        }

        self.throttle
            .offer(now_ms, self.geometry)
            .map(ControllerCommand::UpdateWindow)
    }

    fn track_travel(&mut self, pointer: PointerPosition, raw: WindowPosition, viewport: Viewport) {
        if let Some(last) = self.last_pointer {
            self.travel_since_guides += (pointer.x - last.x).abs() + (pointer.y - last.y).abs();
        }
        self.last_pointer = Some(pointer);
        if self.travel_since_guides >= self.guide_recompute_px {
            self.travel_since_guides = 0;
            self.guides = self.guides_for(raw, viewport);
        }
    }

    fn center_x(&self, viewport: Viewport) -> i32 {
        (viewport.width - self.geometry.size.width) / 2
    }

    fn guides_for(&self, raw: WindowPosition, viewport: Viewport) -> Vec<SnapGuide> {
        let threshold = self.snap_threshold_px;
        let mut guides = Vec::new();
        if raw.x.abs() < threshold {
            guides.push(SnapGuide::Left);
        } else if (raw.x - self.center_x(viewport)).abs() < threshold {
            guides.push(SnapGuide::CenterX);
        }
        if raw.y.abs() < threshold {
            guides.push(SnapGuide::Top);
        }
        guides
    }

    fn snapped(&self, raw: WindowPosition, viewport: Viewport) -> WindowPosition {
        let threshold = self.snap_threshold_px;
        let mut position = raw;
        for guide in &self.guides {
            match guide {
                SnapGuide::Left if raw.x.abs() < threshold => position.x = 0,
                SnapGuide::Top if raw.y.abs() < threshold => position.y = 0,
                SnapGuide::CenterX => {
                    let center = self.center_x(viewport);
                    if (raw.x - center).abs() < threshold {
                        position.x = center;
                    }
                }
                _ => {}
            }
        }
        position
    }

    /// Emits the trailing throttled commit once it is due.
    pub fn poll_trailing(&mut self, now_ms: u64) -> Option<ControllerCommand> {
        if !self.is_active() {
            return None;
        }
        self.throttle.poll(now_ms).map(ControllerCommand::UpdateWindow)
    }

    /// When the trailing commit becomes due, if one is pending.
    pub fn trailing_deadline(&self) -> Option<u64> {
        self.throttle.trailing_deadline()
    }

    /// Ends the gesture and commits the final geometry unconditionally.
    pub fn pointer_up(&mut self) -> Option<ControllerCommand> {
        if !self.is_active() {
            return None;
        }
        self.phase = InteractionPhase::Idle;
        self.guides.clear();
        self.last_pointer = None;
        self.throttle.reset();
        Some(ControllerCommand::UpdateWindow(self.geometry))
    }

    /// Ends a gesture whose release was lost (window blur, pointer cancel). Commits like a release.
    pub fn cancel(&mut self) -> Option<ControllerCommand> {
        self.pointer_up()
    }
}
