#![forbid(unsafe_code)]

//! Interaction state machine: hold, drag, or nothing.
//!
//! [`InteractionController`] turns a stream of [`PointerEvent`]s into one
//! gesture per pointer-down: a **hold** (stationary press outlasting the
//! hold duration toggles the piece's holder), a **drag** (movement past the
//! threshold moves the piece and snaps it to a cell on release), or a
//! **no-op**. It never mutates pieces itself; it returns
//! [`InteractionCommand`]s for the board to apply.
//!
//! # State Machine
//!
//! ```text
//!            down on piece (drag+hold)         timer fires
//!   Idle ───────────────────────────> AwaitingEither ───────> Idle (toggle hold)
//!    │ ↑                                   │ move > threshold
//!    │ └── up / leave (from any state) ──  ↓
//!    │                                  Dragging ── up / leave ──> Idle (commit move)
//!    ├─ down on piece (hold only) ─> AwaitingHold  (moves ignored)
//!    └─ down on piece (drag only) ─> AwaitingMove  (no timer)
//! ```
//!
//! # Invariants
//!
//! 1. At most one hold timer is pending, and only in `AwaitingHold` or
//!    `AwaitingEither`.
//! 2. Entering `Dragging` cancels the hold timer; a gesture never both
//!    toggles a hold and commits a move.
//! 3. A drag commits exactly one position, at gesture end. Moves while
//!    dragging only emit previews.
//! 4. Every path out of a non-idle state clears the tracked piece and the
//!    timer.
//!
//! # Timing
//!
//! The controller never reads a clock. Every entry point takes `now`; a due
//! hold timer fires either from [`tick`](InteractionController::tick) or at
//! the start of the next [`process`](InteractionController::process) call,
//! whichever the host delivers first. Firing re-checks the state, so a timer
//! that lost the race to a drag is a no-op.

use boardkit_core::{PieceId, Point, PointerEvent, PointerEventKind};
use boardkit_layout::SpatialAllocator;
use tracing::{debug, trace};
use web_time::Instant;

use crate::config::BoardConfig;

/// Where the controller is within a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    /// Pressed on a piece; only holding is enabled.
    AwaitingHold,
    /// Pressed on a piece; only dragging is enabled.
    AwaitingMove,
    /// Pressed on a piece; the timer and the threshold race.
    AwaitingEither,
    Dragging,
}

impl InteractionState {
    /// States in which a fired hold timer is honoured.
    #[inline]
    #[must_use]
    pub const fn accepts_hold(self) -> bool {
        matches!(self, Self::AwaitingHold | Self::AwaitingEither)
    }

    /// States in which movement past the threshold starts a drag.
    #[inline]
    #[must_use]
    pub const fn accepts_drag(self) -> bool {
        matches!(self, Self::AwaitingMove | Self::AwaitingEither)
    }
}

/// Pointer affordance to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CursorHint {
    /// Nothing interactive under the pointer.
    #[default]
    Default,
    /// A piece that can be held or dragged is under the pointer.
    Grab,
    /// A piece is being dragged.
    Grabbing,
}

/// An effect for the board to apply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionCommand {
    /// Hold the piece for the acting party, or release it if they already
    /// hold it.
    ToggleHold { piece: PieceId },
    /// Freeze a rendering of every piece except `except`.
    CaptureSnapshot { except: PieceId },
    /// Draw `piece` at `at` over the frozen snapshot, without moving it.
    Preview { piece: PieceId, at: Point },
    /// Commit the dragged piece's position. `snapped` is false when no legal
    /// cell was found and the piece stays at its committed position.
    CommitMove {
        piece: PieceId,
        to: Point,
        snapped: bool,
    },
    /// Discard the frozen snapshot.
    ReleaseSnapshot,
    SetCursor(CursorHint),
}

/// The transient state of one gesture.
///
/// Only the pointer origin is remembered. The piece's committed position is
/// read from the allocator whenever it is needed, since the board may
/// re-place the piece while the gesture is in flight.
#[derive(Debug, Clone, Copy)]
struct Session {
    origin: Point,
    piece: PieceId,
}

impl Session {
    /// The piece's committed position, or `None` if it left the board.
    fn committed(&self, allocator: &SpatialAllocator) -> Option<Point> {
        allocator.piece(self.piece).and_then(|p| p.position())
    }

    /// Where the piece's corner sits with the pointer at `pos`.
    fn dragged_from(&self, committed: Point, pos: Point) -> Point {
        committed.offset(pos.delta(self.origin))
    }
}

/// Classifies pointer gestures on a board.
pub struct InteractionController {
    config: BoardConfig,
    state: InteractionState,
    session: Option<Session>,
    hold_deadline: Option<Instant>,
}

impl std::fmt::Debug for InteractionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionController")
            .field("state", &self.state)
            .field("piece", &self.tracked_piece())
            .field("timer_pending", &self.hold_deadline.is_some())
            .finish()
    }
}

impl InteractionController {
    #[must_use]
    pub fn new(config: BoardConfig) -> Self {
        Self {
            config,
            state: InteractionState::Idle,
            session: None,
            hold_deadline: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> InteractionState {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.state == InteractionState::Dragging
    }

    /// The piece the current gesture started on.
    #[inline]
    #[must_use]
    pub fn tracked_piece(&self) -> Option<PieceId> {
        self.session.map(|s| s.piece)
    }

    /// When the pending hold timer is due, if one is pending.
    #[inline]
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.hold_deadline
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Replace the feature toggles. Takes effect from the next pointer-down.
    pub fn set_config(&mut self, config: BoardConfig) {
        self.config = config;
    }

    /// Process one pointer event.
    pub fn process(
        &mut self,
        event: &PointerEvent,
        now: Instant,
        allocator: &SpatialAllocator,
    ) -> Vec<InteractionCommand> {
        let mut out = Vec::with_capacity(2);
        self.fire_due_timer(now, &mut out);

        match event.kind {
            PointerEventKind::Down => self.on_down(event.pos, now, allocator),
            PointerEventKind::Move => self.on_move(event.pos, allocator, &mut out),
            PointerEventKind::Up | PointerEventKind::Leave => {
                self.on_up(event.pos, allocator, &mut out);
            }
        }
        out
    }

    /// Fire the hold timer if it is due.
    pub fn tick(&mut self, now: Instant) -> Vec<InteractionCommand> {
        let mut out = Vec::new();
        self.fire_due_timer(now, &mut out);
        out
    }

    /// Abandon the current gesture without committing anything.
    ///
    /// Used on focus loss or when the tracked piece leaves the board.
    pub fn cancel(&mut self) -> Vec<InteractionCommand> {
        let mut out = Vec::new();
        if self.state == InteractionState::Dragging {
            out.push(InteractionCommand::ReleaseSnapshot);
        }
        self.finish("cancel");
        out
    }

    /// Return to `Idle`, dropping any gesture state silently.
    pub fn reset(&mut self) {
        self.state = InteractionState::Idle;
        self.session = None;
        self.hold_deadline = None;
    }

    /// The hover affordance for a pointer at `pos`.
    #[must_use]
    pub fn cursor_at(&self, pos: Point, allocator: &SpatialAllocator) -> CursorHint {
        if self.is_dragging() {
            return CursorHint::Grabbing;
        }
        let interactive = self.config.dragging_enabled() || self.config.holding_enabled();
        if interactive && allocator.hit_test(pos).is_some() {
            CursorHint::Grab
        } else {
            CursorHint::Default
        }
    }
}

// ---------------------------------------------------------------------------
// Internal event handlers
// ---------------------------------------------------------------------------

impl InteractionController {
    fn on_down(&mut self, pos: Point, now: Instant, allocator: &SpatialAllocator) {
        if self.state != InteractionState::Idle {
            return;
        }
        let Some(piece) = allocator.hit_test(pos).map(|p| p.id()) else {
            return;
        };

        let next = match (self.config.dragging_enabled(), self.config.holding_enabled()) {
            (true, true) => InteractionState::AwaitingEither,
            (false, true) => InteractionState::AwaitingHold,
            (true, false) => InteractionState::AwaitingMove,
            (false, false) => return,
        };

        self.session = Some(Session { origin: pos, piece });
        if next.accepts_hold() {
            self.hold_deadline = Some(now + self.config.hold_duration());
        }
        self.transition(next, "down");
    }

    fn on_move(
        &mut self,
        pos: Point,
        allocator: &SpatialAllocator,
        out: &mut Vec<InteractionCommand>,
    ) {
        if let Some(session) = self.session {
            if self.state.accepts_drag() && self.exceeds_threshold(session.origin, pos) {
                self.hold_deadline = None;
                self.transition(InteractionState::Dragging, "move");
                out.push(InteractionCommand::CaptureSnapshot {
                    except: session.piece,
                });
            }
            if self.state == InteractionState::Dragging
                && let Some(committed) = session.committed(allocator)
            {
                out.push(InteractionCommand::Preview {
                    piece: session.piece,
                    at: session.dragged_from(committed, pos),
                });
            }
        }
        out.push(InteractionCommand::SetCursor(self.cursor_at(pos, allocator)));
    }

    fn on_up(
        &mut self,
        pos: Point,
        allocator: &SpatialAllocator,
        out: &mut Vec<InteractionCommand>,
    ) {
        let Some(session) = self.session else {
            return;
        };

        if self.state == InteractionState::Dragging {
            if let Some(committed) = session.committed(allocator) {
                let target = session.dragged_from(committed, pos);
                let snapped = allocator.snap_to(target, Some(session.piece));
                let to = snapped.unwrap_or(committed);
                debug!(
                    piece = %session.piece,
                    x = to.x,
                    y = to.y,
                    snapped = snapped.is_some(),
                    "drag committed"
                );
                out.push(InteractionCommand::CommitMove {
                    piece: session.piece,
                    to,
                    snapped: snapped.is_some(),
                });
            }
            out.push(InteractionCommand::ReleaseSnapshot);
        }
        self.finish("up");
    }

    fn fire_due_timer(&mut self, now: Instant, out: &mut Vec<InteractionCommand>) {
        let Some(deadline) = self.hold_deadline else {
            return;
        };
        if now < deadline {
            return;
        }
        self.hold_deadline = None;

        if !self.state.accepts_hold() {
            return;
        }
        let Some(session) = self.session else {
            return;
        };
        debug!(piece = %session.piece, "hold toggled");
        out.push(InteractionCommand::ToggleHold {
            piece: session.piece,
        });
        self.finish("timer");
    }

    fn exceeds_threshold(&self, origin: Point, pos: Point) -> bool {
        let (dx, dy) = pos.delta(origin);
        let threshold = self.config.drag_threshold;
        dx.abs() > threshold || dy.abs() > threshold
    }

    fn finish(&mut self, trigger: &'static str) {
        self.session = None;
        self.hold_deadline = None;
        self.transition(InteractionState::Idle, trigger);
    }

    fn transition(&mut self, to: InteractionState, trigger: &'static str) {
        if self.state != to {
            trace!(from = ?self.state, to = ?to, trigger, "interaction transition");
        }
        self.state = to;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
