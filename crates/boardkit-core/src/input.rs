#![forbid(unsafe_code)]

//! Canonical pointer events and the touch adapter.
//!
//! The interaction state machine only ever sees [`PointerEvent`]s. Touch
//! input is normalized at the boundary by [`TouchAdapter`], which remembers
//! the most recent contact so that a touch-end (which carries no active
//! contact) can still be reported at a coordinate.
//!
//! # Invariants
//!
//! 1. Every `PointerEvent` carries a coordinate.
//! 2. A `TouchPhase::End` or `Cancel` with no remembered contact produces no
//!    pointer event.
//! 3. The adapter forgets its remembered contact once a gesture ends.

use crate::geometry::Point;

/// The four logical pointer events the controller understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    Down,
    Move,
    Up,
    /// The pointer left the board (or the gesture was cancelled by the
    /// platform); treated like `Up` by the state machine.
    Leave,
}

/// A device-agnostic pointer event in board space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub pos: Point,
}

impl PointerEvent {
    #[must_use]
    pub const fn new(kind: PointerEventKind, pos: Point) -> Self {
        Self { kind, pos }
    }

    #[must_use]
    pub const fn down(x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Down, Point::new(x, y))
    }

    #[must_use]
    pub const fn moved(x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Move, Point::new(x, y))
    }

    #[must_use]
    pub const fn up(x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Up, Point::new(x, y))
    }

    #[must_use]
    pub const fn leave(x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Leave, Point::new(x, y))
    }
}

/// Phase of a raw touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// A raw touch event.
///
/// `touches` lists the contacts still on the surface, first contact first.
/// On `End` it is usually empty.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchEvent {
    pub phase: TouchPhase,
    pub touches: Vec<Point>,
}

impl TouchEvent {
    #[must_use]
    pub fn new(phase: TouchPhase, touches: Vec<Point>) -> Self {
        Self { phase, touches }
    }
}

/// Converts touch events into [`PointerEvent`]s.
#[derive(Debug, Clone, Default)]
pub struct TouchAdapter {
    last_contact: Option<Point>,
}

impl TouchAdapter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent contact coordinate seen in the current gesture.
    #[inline]
    #[must_use]
    pub fn last_contact(&self) -> Option<Point> {
        self.last_contact
    }

    /// Normalize one touch event.
    pub fn normalize(&mut self, event: &TouchEvent) -> Option<PointerEvent> {
        let contact = event.touches.first().copied();
        match event.phase {
            TouchPhase::Start => {
                let pos = contact?;
                self.last_contact = Some(pos);
                Some(PointerEvent::new(PointerEventKind::Down, pos))
            }
            TouchPhase::Move => {
                let pos = contact.or(self.last_contact)?;
                self.last_contact = Some(pos);
                Some(PointerEvent::new(PointerEventKind::Move, pos))
            }
            TouchPhase::End => {
                let pos = self.last_contact.take().or(contact)?;
                Some(PointerEvent::new(PointerEventKind::Up, pos))
            }
            TouchPhase::Cancel => {
                let pos = self.last_contact.take().or(contact)?;
                Some(PointerEvent::new(PointerEventKind::Leave, pos))
            }
        }
    }

    /// Forget any remembered contact.
    pub fn reset(&mut self) {
        self.last_contact = None;
    }
}
