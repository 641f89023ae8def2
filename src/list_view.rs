//! The surface the matcher, controller and renderer need from a list widget.
//!
//! Any widget that shows a collapsible hierarchy of port entries can take part
//! in wiring by implementing [`PortListView`]; the core never sees a concrete
//! widget type.

use crate::config::AnchorConfig;
use crate::geometry::{Point, Rect};
use crate::model::{Port, PortId, Side};

/// Row identity inside one list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub usize);

pub trait PortListView {
    /// Entries not hidden by a collapsed ancestor, in display order.
    fn visible_objects(&self) -> Vec<EntryId>;

    /// Every entry, visible or not, in display order.
    fn all_objects(&self) -> Vec<EntryId>;

    /// Currently selected entries, in selection order.
    fn selected_objects(&self) -> Vec<EntryId>;

    /// Replace the selection. With `expand_ancestors` any collapsed ancestor
    /// of a selected entry is expanded so the entry becomes visible.
    fn set_selected_objects(&mut self, entries: &[EntryId], expand_ancestors: bool);

    /// Screen bounds of an entry's row, or of the row plus its visible
    /// subtree when `include_subtree` is set. `None` for hidden entries.
    fn object_bounds(&self, entry: EntryId, include_subtree: bool) -> Option<Rect>;

    /// Entry whose row contains `point`.
    fn hit_test(&self, point: Point) -> Option<EntryId>;

    /// Port carried by an entry (group rows carry none).
    fn port_of(&self, entry: EntryId) -> Option<&Port>;

    /// Entry displaying `port`, if this list shows it.
    fn entry_of(&self, port: PortId) -> Option<EntryId>;

    fn is_visible(&self, entry: EntryId) -> bool;

    fn is_selected(&self, entry: EntryId) -> bool {
        self.selected_objects().contains(&entry)
    }

    /// Outer bounds of the whole list widget.
    fn bounds(&self) -> Rect;

    /// Currently scrolled-in region of the list.
    fn viewport(&self) -> Rect;

    /// Textual identifier exposed by an entry, if any.
    fn uid_of(&self, entry: EntryId) -> Option<String> {
        self.port_of(entry).and_then(|p| p.uid.clone())
    }

    /// Expand every node down to `max_depth` levels.
    fn expand_all(&mut self, max_depth: usize);

    fn collapse_all(&mut self);

    /// Re-read the underlying model.
    fn refresh(&mut self);

    /// Visible entries paired with the port they carry.
    fn visible_ports(&self) -> Vec<(EntryId, Port)> {
        self.visible_objects()
            .into_iter()
            .filter_map(|e| self.port_of(e).map(|p| (e, p.clone())))
            .collect()
    }

    /// Selected entries paired with the port they carry.
    fn selected_ports(&self) -> Vec<(EntryId, Port)> {
        self.selected_objects()
            .into_iter()
            .filter_map(|e| self.port_of(e).map(|p| (e, p.clone())))
            .collect()
    }
}

/// The two lists of the editor, addressable by [`Side`].
pub struct ListPair<'a> {
    pub a: &'a mut dyn PortListView,
    pub b: &'a mut dyn PortListView,
}

impl<'a> ListPair<'a> {
    pub fn new(a: &'a mut dyn PortListView, b: &'a mut dyn PortListView) -> Self {
        Self { a, b }
    }

    pub fn get(&self, side: Side) -> &dyn PortListView {
        match side {
            Side::A => &*self.a,
            Side::B => &*self.b,
        }
    }

    pub fn get_mut(&mut self, side: Side) -> &mut dyn PortListView {
        match side {
            Side::A => &mut *self.a,
            Side::B => &mut *self.b,
        }
    }
}

/// Mouse-down selection: a press on an unselected port makes it the
/// selection, or adds it when `extend` is set. Presses on selected ports or
/// non-port rows leave the selection alone. Returns the pressed entry.
pub fn select_on_press(view: &mut dyn PortListView, point: Point, extend: bool) -> Option<EntryId> {
    let entry = view.hit_test(point)?;
    if view.port_of(entry).is_none() || view.is_selected(entry) {
        return Some(entry);
    }
    let mut selection = if extend { view.selected_objects() } else { Vec::new() };
    selection.push(entry);
    view.set_selected_objects(&selection, false);
    Some(entry)
}

/// Screen point where lines attach to `entry` in the list drawn on `side`.
///
/// Side A sits on the left, so its lines leave through the right edge of the
/// row; side B mirrors this. Output ports stick out further than inputs. The
/// x coordinate never leaves the list's own bounds.
pub fn anchor_point(
    view: &dyn PortListView,
    side: Side,
    entry: EntryId,
    anchors: &AnchorConfig,
) -> Option<Point> {
    let row = view.object_bounds(entry, false)?;
    let port = view.port_of(entry);
    let offset = match port.map(|p| p.direction.is_output()) {
        Some(true) => anchors.output_offset,
        _ => anchors.input_offset,
    };
    let x = match side {
        Side::A => row.right() + offset,
        Side::B => row.left() - offset,
    };
    let y = row.center().y;
    Some(Point::new(view.bounds().clamp_x(x), y))
}
