#![forbid(unsafe_code)]

//! Board composition: pieces, allocator, controller, and collaborators.
//!
//! [`Board`] is the thin shell the host talks to. It owns the piece store
//! (inside its [`SpatialAllocator`]), one [`InteractionController`], and an
//! outbox of [`BoardNotification`]s. Rendering and "who may act" are
//! delegated to the [`Renderer`] and [`Roster`] collaborators.
//!
//! Every structural change (piece added, removed, held, released, thrown,
//! or a new grid) re-runs `allocate` and then renders. Unheld pieces are
//! scattered afresh each time; holding a piece is what pins it in place.
//!
//! # Failure Modes
//!
//! A rejected operation returns [`ConfigError`] and leaves pieces, grid, and
//! toggles exactly as they were. Nothing is rendered and no notification is
//! queued for it.

use boardkit_core::{
    ConfigError, HolderId, Piece, PieceId, Point, PointerEvent, TouchAdapter, TouchEvent,
};
use boardkit_layout::{GridConfig, GridGeometry, SpatialAllocator};
use tracing::{debug, warn};
use web_time::Instant;

use crate::config::{BoardConfig, BoardSettings};
use crate::controller::{CursorHint, InteractionCommand, InteractionController};

/// Answers "who currently may act".
pub trait Roster {
    fn current_actor(&self) -> HolderId;
}

/// A roster with a single, explicitly chosen actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedRoster(pub HolderId);

impl Roster for FixedRoster {
    fn current_actor(&self) -> HolderId {
        self.0
    }
}

/// Draws the board. Only [`render`](Renderer::render) is required.
pub trait Renderer {
    /// Draw every piece at its committed position.
    fn render(&mut self, pieces: &[Piece]);

    /// Freeze the last rendered frame without `except`.
    fn capture_snapshot(&mut self, except: PieceId) {
        let _ = except;
    }

    /// Draw `piece` at `at` over the frozen frame.
    fn render_preview(&mut self, piece: &Piece, at: Point) {
        let _ = (piece, at);
    }

    fn release_snapshot(&mut self) {}

    fn set_cursor(&mut self, cursor: CursorHint) {
        let _ = cursor;
    }
}

/// A renderer that draws nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _pieces: &[Piece]) {}
}

/// Fire-and-forget notifications for the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardNotification {
    PieceAdded { piece: PieceId },
    PieceRemoved { piece: PieceId },
    PieceHeld { piece: PieceId, holder: HolderId },
    PieceReleased { piece: PieceId, holder: HolderId },
    PieceThrown { piece: PieceId },
}

/// A board of pieces on a grid.
pub struct Board<R: Roster, V: Renderer> {
    allocator: SpatialAllocator,
    controller: InteractionController,
    touch: TouchAdapter,
    config: BoardConfig,
    roster: R,
    renderer: V,
    outbox: Vec<BoardNotification>,
}

impl<R: Roster, V: Renderer> std::fmt::Debug for Board<R, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Board")
            .field("allocator", &self.allocator)
            .field("controller", &self.controller)
            .field("config", &self.config)
            .field("pending_notifications", &self.outbox.len())
            .finish()
    }
}

impl<R: Roster, V: Renderer> Board<R, V> {
    /// Create an empty board with an entropy-seeded allocator.
    pub fn new(settings: BoardSettings, roster: R, renderer: V) -> Result<Self, ConfigError> {
        settings.validate()?;
        let allocator = SpatialAllocator::new(settings.grid)?;
        Self::with_allocator(allocator, settings.board, roster, renderer)
    }

    /// Create an empty board around an existing allocator.
    ///
    /// The allocator's placed pieces become the board's pieces.
    pub fn with_allocator(
        mut allocator: SpatialAllocator,
        config: BoardConfig,
        roster: R,
        renderer: V,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        allocator.set_rotation_enabled(config.rotating_enabled());
        Ok(Self {
            allocator,
            controller: InteractionController::new(config),
            touch: TouchAdapter::new(),
            config,
            roster,
            renderer,
            outbox: Vec::new(),
        })
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn pieces(&self) -> &[Piece] {
        self.allocator.placed()
    }

    #[must_use]
    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.allocator.piece(id)
    }

    #[inline]
    #[must_use]
    pub fn allocator(&self) -> &SpatialAllocator {
        &self.allocator
    }

    #[inline]
    #[must_use]
    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn grid_config(&self) -> GridConfig {
        self.allocator.config()
    }

    #[inline]
    #[must_use]
    pub fn roster(&self) -> &R {
        &self.roster
    }

    #[inline]
    #[must_use]
    pub fn renderer(&self) -> &V {
        &self.renderer
    }

    #[inline]
    pub fn renderer_mut(&mut self) -> &mut V {
        &mut self.renderer
    }

    /// When the host should next call [`tick`](Self::tick), if ever.
    #[inline]
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.controller.next_deadline()
    }

    /// Drain queued notifications, oldest first.
    pub fn take_notifications(&mut self) -> Vec<BoardNotification> {
        std::mem::take(&mut self.outbox)
    }

    // -----------------------------------------------------------------------
    // Pieces
    // -----------------------------------------------------------------------

    pub fn add_piece(&mut self, piece: Piece) -> Result<(), ConfigError> {
        let id = piece.id();
        if self.allocator.piece(id).is_some() {
            warn!(piece = %id, "duplicate piece rejected");
            return Err(ConfigError::invalid("pieceId", id));
        }
        let mut pieces = self.allocator.placed().to_vec();
        pieces.push(piece);
        self.allocator.allocate(pieces)?;
        debug!(piece = %id, total = self.pieces().len(), "piece added");
        self.notify(BoardNotification::PieceAdded { piece: id });
        self.render();
        Ok(())
    }

    /// Take a piece off the board, handing it back.
    ///
    /// A gesture tracking the piece is cancelled first.
    pub fn remove_piece(&mut self, id: PieceId) -> Result<Piece, ConfigError> {
        let piece = self
            .allocator
            .piece(id)
            .cloned()
            .ok_or(ConfigError::UnknownPiece(id))?;

        let rest: Vec<Piece> = self
            .allocator
            .placed()
            .iter()
            .filter(|p| p.id() != id)
            .cloned()
            .collect();
        self.allocator.allocate(rest)?;

        if self.controller.tracked_piece() == Some(id) {
            // The render below redraws the unfrozen frame.
            for command in self.controller.cancel() {
                if command == InteractionCommand::ReleaseSnapshot {
                    self.renderer.release_snapshot();
                }
            }
        }
        debug!(piece = %id, "piece removed");
        self.notify(BoardNotification::PieceRemoved { piece: id });
        self.render();
        Ok(piece)
    }

    /// Hold a piece for the current actor, taking it from any other holder.
    pub fn hold(&mut self, id: PieceId) -> Result<(), ConfigError> {
        let holder = self.roster.current_actor();
        self.piece_mut(id)?.set_held_by(Some(holder));
        self.notify(BoardNotification::PieceHeld { piece: id, holder });
        self.relayout()
    }

    /// Release a held piece. Releasing an unheld piece does nothing.
    pub fn release(&mut self, id: PieceId) -> Result<(), ConfigError> {
        let piece = self.piece_mut(id)?;
        let Some(holder) = piece.held_by() else {
            return Ok(());
        };
        piece.set_held_by(None);
        self.notify(BoardNotification::PieceReleased { piece: id, holder });
        self.relayout()
    }

    /// Release if the current actor holds the piece, otherwise hold it.
    pub fn toggle_hold(&mut self, id: PieceId) -> Result<(), ConfigError> {
        let actor = self.roster.current_actor();
        let held_by_actor = self
            .allocator
            .piece(id)
            .ok_or(ConfigError::UnknownPiece(id))?
            .is_held_by(actor);
        if held_by_actor {
            self.release(id)
        } else {
            self.hold(id)
        }
    }

    /// Scatter every unheld piece afresh.
    pub fn throw(&mut self) -> Result<(), ConfigError> {
        let mut pieces = self.allocator.placed().to_vec();
        let mut thrown = Vec::new();
        for piece in pieces.iter_mut().filter(|p| !p.is_held()) {
            piece.set_position(None);
            thrown.push(piece.id());
        }
        self.allocator.allocate(pieces)?;
        debug!(thrown = thrown.len(), "pieces thrown");
        self.outbox
            .extend(thrown.into_iter().map(|piece| BoardNotification::PieceThrown { piece }));
        self.render();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Configuration
    // -----------------------------------------------------------------------

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), ConfigError> {
        let config = self.grid_config();
        self.set_grid(GridConfig {
            width,
            height,
            ..config
        })
    }

    pub fn set_cell_size(&mut self, cell_size: u32) -> Result<(), ConfigError> {
        let config = self.grid_config();
        self.set_grid(GridConfig { cell_size, ..config })
    }

    pub fn set_dispersion(&mut self, dispersion: u32) -> Result<(), ConfigError> {
        let config = self.grid_config();
        self.set_grid(GridConfig {
            dispersion,
            ..config
        })
    }

    /// Replace the grid and re-place pieces on it.
    ///
    /// Held pieces snap onto the new cells they overlap most; one left with
    /// no free cell is placed like an unheld piece but stays held. Fails
    /// without effect if the new grid is invalid or cannot hold the pieces
    /// already on the board.
    pub fn set_grid(&mut self, config: GridConfig) -> Result<(), ConfigError> {
        let geometry = GridGeometry::new(config)?;
        let requested = self.pieces().len();
        if requested > geometry.capacity() {
            warn!(requested, capacity = geometry.capacity(), "grid too small for board");
            return Err(ConfigError::OverCapacity {
                requested,
                capacity: geometry.capacity(),
            });
        }

        let previous = self.allocator.clone();
        self.allocator.set_config(config)?;
        self.allocator.realign_fixed();
        if let Err(err) = self.relayout() {
            self.allocator = previous;
            return Err(err);
        }
        Ok(())
    }

    /// Replace the feature toggles. A gesture already in progress keeps the
    /// state and timer it started with.
    pub fn set_config(&mut self, config: BoardConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.allocator.set_rotation_enabled(config.rotating_enabled());
        self.controller.set_config(config);
        self.config = config;
        debug!(?config, "board config updated");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    pub fn handle_pointer(&mut self, event: &PointerEvent, now: Instant) -> Result<(), ConfigError> {
        let commands = self.controller.process(event, now, &self.allocator);
        self.apply(commands)
    }

    pub fn handle_touch(&mut self, event: &TouchEvent, now: Instant) -> Result<(), ConfigError> {
        match self.touch.normalize(event) {
            Some(pointer) => self.handle_pointer(&pointer, now),
            None => Ok(()),
        }
    }

    /// Fire the hold timer if it is due.
    pub fn tick(&mut self, now: Instant) -> Result<(), ConfigError> {
        let commands = self.controller.tick(now);
        self.apply(commands)
    }

    /// Abandon any gesture in progress, e.g. on focus loss.
    pub fn cancel(&mut self) -> Result<(), ConfigError> {
        self.touch.reset();
        let commands = self.controller.cancel();
        self.apply(commands)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn apply(&mut self, commands: Vec<InteractionCommand>) -> Result<(), ConfigError> {
        for command in commands {
            match command {
                InteractionCommand::ToggleHold { piece } => self.toggle_hold(piece)?,
                InteractionCommand::CaptureSnapshot { except } => {
                    self.renderer.capture_snapshot(except);
                }
                InteractionCommand::Preview { piece, at } => {
                    if let Some(piece) = self.allocator.piece(piece) {
                        self.renderer.render_preview(piece, at);
                    }
                }
                InteractionCommand::CommitMove { piece, to, .. } => {
                    self.piece_mut(piece)?.set_position(Some(to));
                }
                InteractionCommand::ReleaseSnapshot => {
                    self.renderer.release_snapshot();
                    self.render();
                }
                InteractionCommand::SetCursor(cursor) => self.renderer.set_cursor(cursor),
            }
        }
        Ok(())
    }

    fn piece_mut(&mut self, id: PieceId) -> Result<&mut Piece, ConfigError> {
        self.allocator
            .piece_mut(id)
            .ok_or(ConfigError::UnknownPiece(id))
    }

    fn relayout(&mut self) -> Result<(), ConfigError> {
        let pieces = self.allocator.placed().to_vec();
        self.allocator.allocate(pieces)?;
        self.render();
        Ok(())
    }

    fn render(&mut self) {
        self.renderer.render(self.allocator.placed());
    }

    fn notify(&mut self, notification: BoardNotification) {
        self.outbox.push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use web_time::Duration;

    const ME: HolderId = HolderId(1);
    const OTHER: HolderId = HolderId(2);

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Render(usize),
        Capture(PieceId),
        Preview(PieceId, Point),
        Release,
        Cursor(CursorHint),
    }

    #[derive(Debug, Default)]
    struct Recorder {
        calls: Vec<Call>,
    }

    impl Renderer for Recorder {
        fn render(&mut self, pieces: &[Piece]) {
            self.calls.push(Call::Render(pieces.len()));
        }
        fn capture_snapshot(&mut self, except: PieceId) {
            self.calls.push(Call::Capture(except));
        }
        fn render_preview(&mut self, piece: &Piece, at: Point) {
            self.calls.push(Call::Preview(piece.id(), at));
        }
        fn release_snapshot(&mut self) {
            self.calls.push(Call::Release);
        }
        fn set_cursor(&mut self, cursor: CursorHint) {
            self.calls.push(Call::Cursor(cursor));
        }
    }

    fn board() -> Board<FixedRoster, Recorder> {
        let allocator =
            SpatialAllocator::with_seed(GridConfig::new(500, 500, 100, 1), 9).unwrap();
        Board::with_allocator(
            allocator,
            BoardConfig::default(),
            FixedRoster(ME),
            Recorder::default(),
        )
        .unwrap()
    }

    fn board_with(n: u64) -> Board<FixedRoster, Recorder> {
        let mut board = board();
        for i in 0..n {
            board.add_piece(Piece::new(PieceId(i))).unwrap();
        }
        board.take_notifications();
        board.renderer_mut().calls.clear();
        board
    }

    /// Centre of a piece's footprint.
    fn center_of(board: &Board<FixedRoster, Recorder>, id: PieceId) -> (f64, f64) {
        let pos = board.piece(id).unwrap().position().unwrap();
        (pos.x + 50.0, pos.y + 50.0)
    }

    #[test]
    fn new_validates_settings() {
        let settings = BoardSettings {
            grid: GridConfig::new(500, 500, 0, 1),
            board: BoardConfig::default(),
        };
        assert!(Board::new(settings, FixedRoster(ME), NullRenderer).is_err());

        let settings = BoardSettings {
            grid: GridConfig::new(500, 500, 100, 1),
            board: BoardConfig::default(),
        };
        let board = Board::new(settings, FixedRoster(ME), NullRenderer).unwrap();
        assert!(board.pieces().is_empty());
        assert_eq!(board.allocator().maximum_capacity(), 25);
    }

    #[test]
    fn add_places_notifies_and_renders() {
        let mut board = board();
        board.add_piece(Piece::new(PieceId(3))).unwrap();

        assert!(board.piece(PieceId(3)).unwrap().position().is_some());
        assert_eq!(
            board.take_notifications(),
            vec![BoardNotification::PieceAdded { piece: PieceId(3) }]
        );
        assert_eq!(board.renderer().calls, vec![Call::Render(1)]);
        assert!(board.take_notifications().is_empty());
    }

    #[test]
    fn duplicate_add_is_rejected() {
        let mut board = board_with(1);
        let err = board.add_piece(Piece::new(PieceId(0))).unwrap_err();
        assert_eq!(err.to_string(), "invalid pieceId: #0");
        assert_eq!(board.pieces().len(), 1);
        assert!(board.take_notifications().is_empty());
    }

    #[test]
    fn over_capacity_add_leaves_board_untouched() {
        let mut board = board_with(25);
        let before = board.pieces().to_vec();
        let err = board.add_piece(Piece::new(PieceId(99))).unwrap_err();
        assert_eq!(err.to_string(), "cannot place 26 pieces: capacity is 25");
        assert_eq!(board.pieces(), &before[..]);
        assert!(board.renderer().calls.is_empty());
    }

    #[test]
    fn remove_hands_piece_back() {
        let mut board = board_with(3);
        let piece = board.remove_piece(PieceId(1)).unwrap();
        assert_eq!(piece.id(), PieceId(1));
        assert_eq!(board.pieces().len(), 2);
        assert_eq!(
            board.take_notifications(),
            vec![BoardNotification::PieceRemoved { piece: PieceId(1) }]
        );
        assert_eq!(
            board.remove_piece(PieceId(1)),
            Err(ConfigError::UnknownPiece(PieceId(1)))
        );
    }

    #[test]
    fn hold_pins_piece_across_relayouts() {
        let mut board = board_with(4);
        board.hold(PieceId(2)).unwrap();
        let pinned = board.piece(PieceId(2)).unwrap().position();

        for _ in 0..10 {
            board.throw().unwrap();
            assert_eq!(board.piece(PieceId(2)).unwrap().position(), pinned);
        }
        let notes = board.take_notifications();
        assert_eq!(
            notes[0],
            BoardNotification::PieceHeld {
                piece: PieceId(2),
                holder: ME
            }
        );
        assert_eq!(
            notes
                .iter()
                .filter(|n| matches!(n, BoardNotification::PieceThrown { .. }))
                .count(),
            30
        );
        assert!(!notes.contains(&BoardNotification::PieceThrown { piece: PieceId(2) }));
    }

    #[test]
    fn release_reports_previous_holder() {
        let mut board = board_with(2);
        board
            .allocator
            .piece_mut(PieceId(0))
            .unwrap()
            .set_held_by(Some(OTHER));
        board.release(PieceId(0)).unwrap();
        assert_eq!(
            board.take_notifications(),
            vec![BoardNotification::PieceReleased {
                piece: PieceId(0),
                holder: OTHER
            }]
        );
        // Already free: nothing happens.
        board.release(PieceId(0)).unwrap();
        assert!(board.take_notifications().is_empty());
    }

    #[test]
    fn toggle_takes_from_other_holder_and_releases_own() {
        let mut board = board_with(1);
        board
            .allocator
            .piece_mut(PieceId(0))
            .unwrap()
            .set_held_by(Some(OTHER));

        board.toggle_hold(PieceId(0)).unwrap();
        assert!(board.piece(PieceId(0)).unwrap().is_held_by(ME));
        board.toggle_hold(PieceId(0)).unwrap();
        assert!(!board.piece(PieceId(0)).unwrap().is_held());
    }

    #[test]
    fn shrinking_below_piece_count_is_rejected() {
        let mut board = board_with(10);
        let err = board.resize(300, 300).unwrap_err();
        assert_eq!(
            err,
            ConfigError::OverCapacity {
                requested: 10,
                capacity: 9
            }
        );
        assert_eq!(board.grid_config(), GridConfig::new(500, 500, 100, 1));

        board.set_cell_size(50).unwrap();
        assert_eq!(board.allocator().maximum_capacity(), 100);
        assert!(board.set_cell_size(0).is_err());
        assert_eq!(board.grid_config().cell_size, 50);
    }

    #[test]
    fn set_dispersion_relayouts() {
        let mut board = board_with(2);
        board.set_dispersion(5).unwrap();
        assert_eq!(board.grid_config().dispersion, 5);
        assert_eq!(board.renderer().calls, vec![Call::Render(2)]);
    }

    #[test]
    fn set_config_syncs_rotation_and_rejects_bad_values() {
        let mut board = board();
        board
            .set_config(BoardConfig {
                rotating_disabled: true,
                ..BoardConfig::default()
            })
            .unwrap();
        assert!(!board.allocator().rotation_enabled());
        board.add_piece(Piece::new(PieceId(1))).unwrap();
        assert_eq!(board.piece(PieceId(1)).unwrap().rotation(), None);

        let bad = BoardConfig {
            hold_duration_ms: 0,
            ..BoardConfig::default()
        };
        assert!(board.set_config(bad).is_err());
        assert!(!board.config().rotating_enabled());
    }

    #[test]
    fn long_press_toggles_hold() {
        let mut board = board_with(1);
        let (x, y) = center_of(&board, PieceId(0));
        let t = Instant::now();

        board.handle_pointer(&PointerEvent::down(x, y), t).unwrap();
        assert_eq!(board.next_deadline(), Some(t + Duration::from_millis(375)));
        board.tick(t + Duration::from_millis(400)).unwrap();
        assert!(board.piece(PieceId(0)).unwrap().is_held_by(ME));
        assert_eq!(
            board.take_notifications(),
            vec![BoardNotification::PieceHeld {
                piece: PieceId(0),
                holder: ME
            }]
        );
        board
            .handle_pointer(&PointerEvent::up(x, y), t + Duration::from_millis(450))
            .unwrap();
        assert!(board.piece(PieceId(0)).unwrap().is_held());
    }

    #[test]
    fn drag_previews_then_commits_snapped_position() {
        let mut board = board_with(1);
        let start = board.piece(PieceId(0)).unwrap().position().unwrap();
        let (x, y) = center_of(&board, PieceId(0));
        let t = Instant::now();

        board.handle_pointer(&PointerEvent::down(x, y), t).unwrap();
        board
            .handle_pointer(&PointerEvent::moved(x + 10.0, y), t + Duration::from_millis(20))
            .unwrap();
        assert_eq!(
            board.renderer().calls,
            vec![
                Call::Capture(PieceId(0)),
                Call::Preview(PieceId(0), Point::new(start.x + 10.0, start.y)),
                Call::Cursor(CursorHint::Grabbing),
            ]
        );
        // Committed position is untouched mid-drag.
        assert_eq!(board.piece(PieceId(0)).unwrap().position(), Some(start));

        board
            .handle_pointer(&PointerEvent::up(x + 20.0, y + 15.0), t + Duration::from_millis(60))
            .unwrap();
        assert_eq!(board.piece(PieceId(0)).unwrap().position(), Some(start));
        let calls = &board.renderer().calls;
        assert_eq!(calls[calls.len() - 2..], [Call::Release, Call::Render(1)]);
        assert_eq!(board.next_deadline(), None);
    }

    #[test]
    fn touch_end_uses_last_contact() {
        let mut board = board_with(1);
        let (x, y) = center_of(&board, PieceId(0));
        let t = Instant::now();
        let touch = |phase, points: &[(f64, f64)]| {
            TouchEvent::new(phase, points.iter().map(|&p| Point::from(p)).collect())
        };

        board
            .handle_touch(&touch(boardkit_core::TouchPhase::Start, &[(x, y)]), t)
            .unwrap();
        board
            .handle_touch(
                &touch(boardkit_core::TouchPhase::Move, &[(x + 30.0, y)]),
                t + Duration::from_millis(10),
            )
            .unwrap();
        assert!(board.controller().is_dragging());
        board
            .handle_touch(
                &touch(boardkit_core::TouchPhase::End, &[]),
                t + Duration::from_millis(20),
            )
            .unwrap();
        assert!(!board.controller().is_dragging());
        assert!(board.renderer().calls.contains(&Call::Release));
    }

    #[test]
    fn removing_dragged_piece_cancels_gesture() {
        let mut board = board_with(2);
        let (x, y) = center_of(&board, PieceId(1));
        let t = Instant::now();

        board.handle_pointer(&PointerEvent::down(x, y), t).unwrap();
        board
            .handle_pointer(&PointerEvent::moved(x + 40.0, y), t)
            .unwrap();
        board.renderer_mut().calls.clear();
        board.remove_piece(PieceId(1)).unwrap();

        assert_eq!(board.controller().tracked_piece(), None);
        assert_eq!(board.renderer().calls, vec![Call::Release, Call::Render(1)]);
        // The late release finds no gesture.
        board
            .handle_pointer(&PointerEvent::up(x + 40.0, y), t)
            .unwrap();
        assert!(board.piece(PieceId(1)).is_none());
    }

    fn cells_are_distinct(board: &Board<FixedRoster, Recorder>) -> bool {
        let cell_size = board.grid_config().cell_size;
        let mut cells: Vec<_> = board
            .pieces()
            .iter()
            .map(|p| p.cell(cell_size).unwrap())
            .collect();
        cells.sort_by_key(|c| (c.row, c.col));
        cells.windows(2).all(|w| w[0] != w[1])
    }

    #[test]
    fn throw_during_drag_then_illegal_drop_keeps_cells_distinct() {
        for seed in 0..16 {
            let allocator =
                SpatialAllocator::with_seed(GridConfig::new(200, 100, 100, 1), seed).unwrap();
            let mut board = Board::with_allocator(
                allocator,
                BoardConfig::default(),
                FixedRoster(ME),
                Recorder::default(),
            )
            .unwrap();
            board.add_piece(Piece::new(PieceId(0))).unwrap();
            board.add_piece(Piece::new(PieceId(1))).unwrap();

            let (x, y) = center_of(&board, PieceId(0));
            let t = Instant::now();
            board.handle_pointer(&PointerEvent::down(x, y), t).unwrap();
            board
                .handle_pointer(&PointerEvent::moved(x + 10.0, y), t)
                .unwrap();
            board.throw().unwrap();
            let rethrown = board.piece(PieceId(0)).unwrap().position();

            board
                .handle_pointer(&PointerEvent::up(5000.0, 5000.0), t)
                .unwrap();
            assert!(cells_are_distinct(&board), "seed {seed}: {:?}", board.pieces());
            assert_eq!(board.piece(PieceId(0)).unwrap().position(), rethrown);
        }
    }

    #[test]
    fn cell_size_change_realigns_held_pieces() {
        let mut allocator =
            SpatialAllocator::with_seed(GridConfig::new(600, 600, 100, 1), 4).unwrap();
        allocator
            .allocate(vec![
                Piece::new(PieceId(0))
                    .with_position(Point::new(100.0, 100.0))
                    .with_holder(ME),
            ])
            .unwrap();
        let mut board = Board::with_allocator(
            allocator,
            BoardConfig::default(),
            FixedRoster(ME),
            Recorder::default(),
        )
        .unwrap();
        for i in 1..4 {
            board.add_piece(Piece::new(PieceId(i))).unwrap();
        }

        board.set_cell_size(150).unwrap();
        assert_eq!(
            board.piece(PieceId(0)).unwrap().position(),
            Some(Point::new(150.0, 150.0))
        );
        assert!(board.piece(PieceId(0)).unwrap().is_held_by(ME));
        assert!(board.pieces().iter().all(|p| {
            let pos = p.position().unwrap();
            pos.x % 150.0 == 0.0 && pos.y % 150.0 == 0.0
        }));
        assert!(cells_are_distinct(&board));

        // Shrinking strands the held piece; it is placed on the smaller grid.
        board.resize(300, 300).unwrap();
        let cell = board.piece(PieceId(0)).unwrap().cell(150).unwrap();
        assert!(board.allocator().grid().contains(cell));
        assert!(board.piece(PieceId(0)).unwrap().is_held());
        assert!(cells_are_distinct(&board));
    }

    #[test]
    fn cancel_on_focus_loss_restores_frame() {
        let mut board = board_with(1);
        let start = board.piece(PieceId(0)).unwrap().position();
        let (x, y) = center_of(&board, PieceId(0));
        let t = Instant::now();

        board.handle_pointer(&PointerEvent::down(x, y), t).unwrap();
        board
            .handle_pointer(&PointerEvent::moved(x + 60.0, y), t)
            .unwrap();
        board.cancel().unwrap();
        assert_eq!(board.piece(PieceId(0)).unwrap().position(), start);
        assert_eq!(board.renderer().calls.last(), Some(&Call::Render(1)));
        assert_eq!(board.controller().tracked_piece(), None);
    }
}
