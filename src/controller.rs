//! Press / drag / release state machine for wiring ports between the two
//! lists, plus the per-list context commands.
//!
//! Everything runs on the UI thread. The only timed behaviour is the deferred
//! highlight reveal, which is a stored deadline checked by [`poll`]; callers
//! pass the current [`Instant`] so the machine can be driven without a clock.
//!
//! [`poll`]: InteractionController::poll

use std::time::{Duration, Instant};

use log::{debug, error, info, warn};

use crate::config::{AnchorConfig, EditorConfig};
use crate::geometry::Point;
use crate::host::{Collaborators, CompatibilityOracle, ConnectionIndex, EditorHost};
use crate::list_view::{EntryId, ListPair, PortListView, anchor_point};
use crate::matcher::{MatchAssignment, match_connections};
use crate::model::{Port, Side};

pub const UNDO_CONNECT: &str = "Connect";
pub const UNDO_REMOVE_CONNECTIONS: &str = "Remove connections";
pub const UNDO_REMOVE_ALL_CONNECTIONS: &str = "Remove all connections";

/// Copied to the clipboard when the right-clicked entry has no UID.
pub const NO_UID_PLACEHOLDER: &str = "<no uid>";

// ────────────────────────────────────────────────────────────────────────────
// Gesture state
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureState {
    Idle,
    Dragging,
    /// Dragging while the highlight-reveal timer is still armed.
    PendingHighlightReveal,
}

/// Provisional assignment for the entry currently under the cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverMatch {
    /// Opposite-side entry the scan starts from.
    pub anchor: EntryId,
    /// One slot per gesture source: matched entry and its anchor point.
    pub targets: Vec<Option<(EntryId, Point)>>,
}

/// One continuous press-drag-release interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct DragGesture {
    /// List the drag started in.
    pub side: Side,
    /// Selected source ports, in selection order.
    pub sources: Vec<Port>,
    /// Entry of each source, parallel to `sources`.
    pub source_entries: Vec<EntryId>,
    /// Screen anchor of each source, parallel to `sources`.
    pub anchors: Vec<Point>,
    pub cursor: Point,
    /// Opposite-side entries pre-selected at press time, if every source had
    /// a candidate.
    pub candidates: Option<Vec<EntryId>>,
    pub hover: Option<HoverMatch>,
    /// Set once the reveal timer has fired.
    pub highlight_revealed: bool,
}

impl DragGesture {
    pub fn target_side(&self) -> Side {
        self.side.opposite()
    }
}

/// Result of a release event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// No gesture was in progress.
    NoGesture,
    /// Released over nothing connectable; nothing was committed.
    Abandoned,
    /// The matcher ran; `connected` connections were committed.
    Committed { connected: usize },
    /// A commit failed after `connected` earlier commits succeeded.
    Failed { connected: usize },
}

/// Single-shot deadline on the UI thread. Re-arming replaces any pending
/// deadline, so at most one is live.
#[derive(Debug, Clone, Copy, Default)]
pub struct HighlightTimer {
    deadline: Option<Instant>,
}

impl HighlightTimer {
    pub fn arm(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Disarm and return true if the deadline has passed.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(d) if now >= d => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Context commands
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextCommand {
    SelectAll,
    SelectVisible,
    SelectNone,
    ExpandAll,
    CollapseAll,
    RemoveConnections,
    RemoveAllConnections,
    Refresh,
    CopyUid,
}

impl ContextCommand {
    pub const ALL: [ContextCommand; 9] = [
        ContextCommand::SelectAll,
        ContextCommand::SelectVisible,
        ContextCommand::SelectNone,
        ContextCommand::ExpandAll,
        ContextCommand::CollapseAll,
        ContextCommand::RemoveConnections,
        ContextCommand::RemoveAllConnections,
        ContextCommand::Refresh,
        ContextCommand::CopyUid,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ContextCommand::SelectAll => "Select All",
            ContextCommand::SelectVisible => "Select Visible",
            ContextCommand::SelectNone => "Select None",
            ContextCommand::ExpandAll => "Expand All",
            ContextCommand::CollapseAll => "Collapse All",
            ContextCommand::RemoveConnections => "Remove Connection(s)",
            ContextCommand::RemoveAllConnections => "Remove All Connections",
            ContextCommand::Refresh => "Refresh",
            ContextCommand::CopyUid => "Copy UID",
        }
    }

    /// Separator goes in front of these commands in a menu.
    pub fn starts_group(self) -> bool {
        matches!(
            self,
            ContextCommand::ExpandAll | ContextCommand::RemoveConnections | ContextCommand::Refresh
        )
    }
}

/// The list (and entry, if any) a context menu was opened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextTarget {
    pub side: Side,
    pub entry: Option<EntryId>,
}

// ────────────────────────────────────────────────────────────────────────────
// Controller
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct InteractionController {
    highlight_delay: Duration,
    expand_depth: usize,
    anchors: AnchorConfig,
    gesture: Option<DragGesture>,
    timer: HighlightTimer,
    context: Option<ContextTarget>,
    redraw_requested: bool,
}

impl InteractionController {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            highlight_delay: config.highlight_delay(),
            expand_depth: config.expand_depth,
            anchors: config.anchors.clone(),
            gesture: None,
            timer: HighlightTimer::default(),
            context: None,
            redraw_requested: false,
        }
    }

    pub fn state(&self) -> GestureState {
        match (&self.gesture, self.timer.is_armed()) {
            (None, _) => GestureState::Idle,
            (Some(_), true) => GestureState::PendingHighlightReveal,
            (Some(_), false) => GestureState::Dragging,
        }
    }

    pub fn gesture(&self) -> Option<&DragGesture> {
        self.gesture.as_ref()
    }

    pub fn context_target(&self) -> Option<ContextTarget> {
        self.context
    }

    /// When the next timed event is due, so the host can schedule a wake-up.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// Returns and clears the pending redraw request.
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    /// Primary-button press at `pos` in the list on `side`.
    ///
    /// Returns true if a gesture started.
    pub fn press(
        &mut self,
        side: Side,
        pos: Point,
        now: Instant,
        lists: &mut ListPair<'_>,
        oracle: &dyn CompatibilityOracle,
    ) -> bool {
        self.timer.cancel();
        self.gesture = None;

        let view = lists.get_mut(side);
        let Some(pressed) = view.hit_test(pos) else {
            return false;
        };

        let mut selected = view.selected_ports();
        if selected.is_empty() {
            let Some(port) = view.port_of(pressed).cloned() else {
                debug!("press on list {side} over a non-port entry with nothing selected");
                return false;
            };
            view.set_selected_objects(&[pressed], false);
            selected.push((pressed, port));
        }

        let mut sources = Vec::with_capacity(selected.len());
        let mut source_entries = Vec::with_capacity(selected.len());
        let mut anchors = Vec::with_capacity(selected.len());
        for (entry, port) in selected {
            // Selected rows hidden under a collapsed ancestor have no anchor.
            if let Some(anchor) = anchor_point(&*view, side, entry, &self.anchors) {
                sources.push(port);
                source_entries.push(entry);
                anchors.push(anchor);
            }
        }
        if sources.is_empty() {
            return false;
        }

        let opposite = lists.get_mut(side.opposite());
        let candidates = feasible_candidates(&sources, &*opposite, oracle);
        if let Some(candidates) = &candidates {
            opposite.set_selected_objects(candidates, false);
            self.timer.arm(now, self.highlight_delay);
        }

        debug!(
            "drag started on list {side} with {} source(s), {} candidate(s)",
            sources.len(),
            candidates.as_ref().map_or(0, |c| c.len())
        );
        self.gesture = Some(DragGesture {
            side,
            sources,
            source_entries,
            anchors,
            cursor: pos,
            candidates,
            hover: None,
            highlight_revealed: false,
        });
        self.redraw_requested = true;
        true
    }

    /// Pointer moved to `pos` while the primary button is held.
    pub fn drag(&mut self, pos: Point, lists: &ListPair<'_>, oracle: &dyn CompatibilityOracle) {
        let Some(gesture) = self.gesture.as_mut() else {
            return;
        };
        gesture.cursor = pos;
        let target = lists.get(gesture.target_side());
        gesture.hover = target.hit_test(pos).and_then(|anchor| {
            let assignment = assign(&gesture.sources, anchor, target, oracle)?;
            let targets = assignment
                .slots()
                .iter()
                .map(|slot| {
                    slot.and_then(|e| {
                        anchor_point(target, gesture.side.opposite(), e, &self.anchors)
                            .map(|p| (e, p))
                    })
                })
                .collect();
            Some(HoverMatch { anchor, targets })
        });
        self.redraw_requested = true;
    }

    /// Primary-button release at `pos`: commit the matched connections or
    /// abandon the gesture.
    pub fn release(
        &mut self,
        pos: Point,
        lists: &mut ListPair<'_>,
        collab: &mut Collaborators<'_>,
    ) -> ReleaseOutcome {
        self.timer.cancel();
        let Some(gesture) = self.gesture.take() else {
            return ReleaseOutcome::NoGesture;
        };
        self.redraw_requested = true;
        let target_side = gesture.target_side();

        let anchor = lists.get(target_side).hit_test(pos);
        let assignment =
            anchor.and_then(|a| assign(&gesture.sources, a, lists.get(target_side), collab.oracle));
        let Some(assignment) = assignment else {
            debug!("gesture from list {} abandoned: nothing connectable under cursor", gesture.side);
            lists.get_mut(target_side).set_selected_objects(&[], false);
            return ReleaseOutcome::Abandoned;
        };

        let mut connected = 0;
        for (i, entry) in assignment.pairs() {
            let source = &gesture.sources[i];
            let Some(target) = lists.get(target_side).port_of(*entry).cloned() else {
                continue;
            };
            if let Err(err) = collab.connections.connect(source, &target) {
                let err = err.context(format!(
                    "Failed to connect '{}' to '{}'",
                    source.key(),
                    target.key()
                ));
                error!("{err:#}");
                collab.host.report_error(&err);
                if connected > 0 {
                    collab.host.add_undo_buffer_entry(UNDO_CONNECT);
                }
                lists.a.set_selected_objects(&[], false);
                lists.b.set_selected_objects(&[], false);
                return ReleaseOutcome::Failed { connected };
            }
            connected += 1;
        }

        if connected < gesture.sources.len() {
            warn!(
                "{} of {} source port(s) found no compatible target",
                gesture.sources.len() - connected,
                gesture.sources.len()
            );
        }
        info!("connected {connected} port(s) from list {} to list {target_side}", gesture.side);
        lists.a.set_selected_objects(&[], false);
        lists.b.set_selected_objects(&[], false);
        collab.host.add_undo_buffer_entry(UNDO_CONNECT);
        ReleaseOutcome::Committed { connected }
    }

    /// Fire the highlight-reveal timer if it is due. Returns true when the
    /// highlight became visible.
    pub fn poll(&mut self, now: Instant) -> bool {
        if !self.timer.fire_if_due(now) {
            return false;
        }
        if let Some(gesture) = self.gesture.as_mut() {
            gesture.highlight_revealed = true;
            self.redraw_requested = true;
            return true;
        }
        false
    }

    /// Secondary-button press: remember which list and entry the context
    /// menu refers to. Does not touch the gesture.
    pub fn open_context_menu(&mut self, side: Side, pos: Point, lists: &ListPair<'_>) -> ContextTarget {
        let target = ContextTarget {
            side,
            entry: lists.get(side).hit_test(pos),
        };
        self.context = Some(target);
        target
    }

    /// Run a context command against the list the menu was opened on.
    /// Collaborator failures are reported through the host.
    pub fn execute(
        &mut self,
        command: ContextCommand,
        lists: &mut ListPair<'_>,
        connections: &mut dyn ConnectionIndex,
        host: &mut dyn EditorHost,
    ) {
        let Some(target) = self.context.take() else {
            return;
        };
        if let Err(err) = self.run_command(command, target, lists, connections, host) {
            error!("{} failed: {err:#}", command.label());
            host.report_error(&err);
        }
        self.redraw_requested = true;
    }

    fn run_command(
        &self,
        command: ContextCommand,
        target: ContextTarget,
        lists: &mut ListPair<'_>,
        connections: &mut dyn ConnectionIndex,
        host: &mut dyn EditorHost,
    ) -> anyhow::Result<()> {
        let view = lists.get_mut(target.side);
        match command {
            ContextCommand::SelectAll => {
                let all: Vec<EntryId> = view
                    .all_objects()
                    .into_iter()
                    .filter(|&e| view.port_of(e).is_some())
                    .collect();
                view.set_selected_objects(&all, true);
            }
            ContextCommand::SelectVisible => {
                let visible: Vec<EntryId> = view.visible_ports().into_iter().map(|(e, _)| e).collect();
                view.set_selected_objects(&visible, false);
            }
            ContextCommand::SelectNone => view.set_selected_objects(&[], false),
            ContextCommand::ExpandAll => view.expand_all(self.expand_depth),
            ContextCommand::CollapseAll => view.collapse_all(),
            ContextCommand::RemoveConnections => {
                let mut ports: Vec<Port> = view.selected_ports().into_iter().map(|(_, p)| p).collect();
                if ports.is_empty() {
                    ports.extend(target.entry.and_then(|e| view.port_of(e)).cloned());
                }
                let mut removed = 0;
                for port in &ports {
                    for other in connections.connections_of(port.id) {
                        connections.disconnect(port.id, other)?;
                        removed += 1;
                    }
                }
                if removed > 0 {
                    info!("removed {removed} connection(s) on list {}", target.side);
                    host.add_undo_buffer_entry(UNDO_REMOVE_CONNECTIONS);
                }
            }
            ContextCommand::RemoveAllConnections => {
                let ports: Vec<Port> = view
                    .all_objects()
                    .into_iter()
                    .filter_map(|e| view.port_of(e).cloned())
                    .collect();
                let mut cleared = 0;
                for port in &ports {
                    if connections.connection_count(port.id) > 0 {
                        connections.clear_connections(port.id)?;
                        cleared += 1;
                    }
                }
                if cleared > 0 {
                    info!("cleared connections of {cleared} port(s) on list {}", target.side);
                    host.add_undo_buffer_entry(UNDO_REMOVE_ALL_CONNECTIONS);
                }
            }
            ContextCommand::Refresh => view.refresh(),
            ContextCommand::CopyUid => {
                let uid = target
                    .entry
                    .and_then(|e| view.uid_of(e))
                    .unwrap_or_else(|| NO_UID_PLACEHOLDER.to_string());
                host.set_clipboard_text(uid);
            }
        }
        Ok(())
    }
}

/// Union of opposite-side candidates, in display order, when every source has
/// at least one; `None` as soon as one source has none.
fn feasible_candidates(
    sources: &[Port],
    opposite: &dyn PortListView,
    oracle: &dyn CompatibilityOracle,
) -> Option<Vec<EntryId>> {
    let targets = opposite.visible_ports();
    let mut hit = vec![false; targets.len()];
    for source in sources {
        let mut any = false;
        for (i, (_, target)) in targets.iter().enumerate() {
            if oracle.can_connect(source, target) {
                hit[i] = true;
                any = true;
            }
        }
        if !any {
            return None;
        }
    }
    Some(
        targets
            .iter()
            .zip(hit)
            .filter_map(|((e, _), h)| h.then_some(*e))
            .collect(),
    )
}

/// Run the matcher with `anchor` as scan origin over the visible ports of
/// `target`. `None` if the anchor entry carries no port.
fn assign(
    sources: &[Port],
    anchor: EntryId,
    target: &dyn PortListView,
    oracle: &dyn CompatibilityOracle,
) -> Option<MatchAssignment<EntryId>> {
    target.port_of(anchor)?;
    let entries: Vec<EntryId> = target.visible_ports().into_iter().map(|(e, _)| e).collect();
    Some(match_connections(sources, &anchor, &entries, |s: &Port, e: &EntryId| {
        target.port_of(*e).is_some_and(|t| oracle.can_connect(s, t))
    }))
}
