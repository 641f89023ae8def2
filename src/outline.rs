//! Headless collapsible outline list.
//!
//! [`OutlineList`] flattens a [`NodeSpec`] hierarchy into rows laid out at a
//! fixed row height, tracks expansion, selection and vertical scroll, and
//! implements [`PortListView`]. The CLI and the tests drive it directly; the
//! egui front-end paints its rows and forwards pointer events.

use std::collections::HashMap;

use crate::config::EditorConfig;
use crate::geometry::{Point, Rect};
use crate::list_view::{EntryId, PortListView};
use crate::model::{NodeSpec, Port, PortId, Side};

/// Approximate glyph advance used to size row labels.
const CHAR_WIDTH: f32 = 7.0;
/// Space reserved in front of a label for the expander / port marker.
const ICON_WIDTH: f32 = 16.0;

#[derive(Debug, Clone)]
enum RowKind {
    Group,
    Port(Port),
}

#[derive(Debug, Clone)]
struct Row {
    label: String,
    depth: usize,
    parent: Option<usize>,
    kind: RowKind,
    expanded: bool,
    has_children: bool,
}

#[derive(Debug, Clone)]
pub struct OutlineList {
    side: Side,
    rows: Vec<Row>,
    /// Visible rows in display order, rebuilt when expansion changes.
    visible: Vec<EntryId>,
    /// Position of each row in `visible`.
    visible_pos: Vec<Option<usize>>,
    port_rows: HashMap<PortId, usize>,
    selection: Vec<EntryId>,
    bounds: Rect,
    scroll: f32,
    row_height: f32,
    indent: f32,
}

impl OutlineList {
    /// Flatten `root` into rows. Port ids are allocated from `next_id`, which
    /// is advanced past the last port created.
    pub fn from_spec(side: Side, root: &NodeSpec, next_id: &mut u32, cfg: &EditorConfig) -> Self {
        let mut rows = Vec::new();
        push_node(&mut rows, root, 0, None, "", next_id);
        let port_rows = rows
            .iter()
            .enumerate()
            .filter_map(|(i, r)| match &r.kind {
                RowKind::Port(p) => Some((p.id, i)),
                RowKind::Group => None,
            })
            .collect();
        let mut list = Self {
            side,
            rows,
            visible: Vec::new(),
            visible_pos: Vec::new(),
            port_rows,
            selection: Vec::new(),
            bounds: Rect::default(),
            scroll: 0.0,
            row_height: cfg.row_height,
            indent: cfg.indent,
        };
        list.rebuild_visible();
        list
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
        self.clamp_scroll();
    }

    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    /// Set the vertical scroll offset (pixels from the top of the content).
    pub fn scroll_to(&mut self, offset: f32) {
        self.scroll = offset;
        self.clamp_scroll();
    }

    /// Total height of all visible rows.
    pub fn content_height(&self) -> f32 {
        self.visible.len() as f32 * self.row_height
    }

    pub fn label(&self, entry: EntryId) -> Option<&str> {
        self.rows.get(entry.0).map(|r| r.label.as_str())
    }

    pub fn depth(&self, entry: EntryId) -> usize {
        self.rows.get(entry.0).map_or(0, |r| r.depth)
    }

    pub fn has_children(&self, entry: EntryId) -> bool {
        self.rows.get(entry.0).is_some_and(|r| r.has_children)
    }

    pub fn is_expanded(&self, entry: EntryId) -> bool {
        self.rows.get(entry.0).is_some_and(|r| r.expanded)
    }

    pub fn set_expanded(&mut self, entry: EntryId, expanded: bool) {
        if let Some(row) = self.rows.get_mut(entry.0) {
            if row.has_children {
                row.expanded = expanded;
            }
        }
        self.relayout();
    }

    /// Expand every ancestor of `entry` so it becomes visible.
    pub fn reveal(&mut self, entry: EntryId) {
        self.expand_ancestors(entry);
        self.relayout();
    }

    pub fn toggle_expanded(&mut self, entry: EntryId) {
        let expanded = self.is_expanded(entry);
        self.set_expanded(entry, !expanded);
    }

    /// Every port in this list, in display order.
    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.rows.iter().filter_map(|r| match &r.kind {
            RowKind::Port(p) => Some(p),
            RowKind::Group => None,
        })
    }

    /// Find a port by its persisted key.
    pub fn port_by_key(&self, key: &str) -> Option<&Port> {
        self.ports().find(|p| p.key() == key)
    }

    /// Entry of the row with the given label path (`"Group/Sub/port"`).
    pub fn find_entry(&self, path: &str) -> Option<EntryId> {
        (0..self.rows.len())
            .map(EntryId)
            .find(|&e| self.row_path(e) == path)
    }

    fn row_path(&self, entry: EntryId) -> String {
        let mut parts = Vec::new();
        let mut cur = Some(entry.0);
        while let Some(idx) = cur {
            parts.push(self.rows[idx].label.as_str());
            cur = self.rows[idx].parent;
        }
        parts.reverse();
        parts.join("/")
    }

    fn ancestors(&self, entry: EntryId) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.rows.get(entry.0).and_then(|r| r.parent), |&i| {
            self.rows[i].parent
        })
    }

    fn row_rect(&self, entry: EntryId, visible_index: usize) -> Rect {
        let row = &self.rows[entry.0];
        let top = self.bounds.top() + visible_index as f32 * self.row_height - self.scroll;
        let left = self.bounds.left() + row.depth as f32 * self.indent;
        let width = ICON_WIDTH + row.label.chars().count() as f32 * CHAR_WIDTH;
        let right = (left + width).min(self.bounds.right());
        Rect::from_min_max(Point::new(left, top), Point::new(right, top + self.row_height))
    }

    fn expand_ancestors(&mut self, entry: EntryId) {
        let ancestors: Vec<usize> = self.ancestors(entry).collect();
        for idx in ancestors {
            self.rows[idx].expanded = true;
        }
    }

    /// Recompute the visible row order. Rows are stored in pre-order, so a
    /// parent is always settled before its children.
    fn rebuild_visible(&mut self) {
        self.visible.clear();
        self.visible_pos = vec![None; self.rows.len()];
        for (i, row) in self.rows.iter().enumerate() {
            let shown = match row.parent {
                None => true,
                Some(p) => self.visible_pos[p].is_some() && self.rows[p].expanded,
            };
            if shown {
                self.visible_pos[i] = Some(self.visible.len());
                self.visible.push(EntryId(i));
            }
        }
    }

    fn relayout(&mut self) {
        self.rebuild_visible();
        self.clamp_scroll();
    }

    fn clamp_scroll(&mut self) {
        let max = (self.content_height() - self.bounds.height()).max(0.0);
        self.scroll = self.scroll.clamp(0.0, max);
    }
}

fn push_node(
    rows: &mut Vec<Row>,
    node: &NodeSpec,
    depth: usize,
    parent: Option<usize>,
    parent_path: &str,
    next_id: &mut u32,
) {
    let index = rows.len();
    let path = if parent_path.is_empty() {
        node.name.clone()
    } else {
        format!("{}/{}", parent_path, node.name)
    };
    rows.push(Row {
        label: node.name.clone(),
        depth,
        parent,
        kind: RowKind::Group,
        expanded: node.expanded,
        has_children: !node.ports.is_empty() || !node.children.is_empty(),
    });
    for spec in &node.ports {
        let port = Port {
            id: PortId(*next_id),
            name: spec.name.clone(),
            direction: spec.direction,
            node: path.clone(),
            type_tag: spec.type_tag.clone(),
            uid: spec.uid.clone(),
        };
        *next_id += 1;
        rows.push(Row {
            label: spec.name.clone(),
            depth: depth + 1,
            parent: Some(index),
            kind: RowKind::Port(port),
            expanded: false,
            has_children: false,
        });
    }
    for child in &node.children {
        push_node(rows, child, depth + 1, Some(index), &path, next_id);
    }
}

impl PortListView for OutlineList {
    fn visible_objects(&self) -> Vec<EntryId> {
        self.visible.clone()
    }

    fn all_objects(&self) -> Vec<EntryId> {
        (0..self.rows.len()).map(EntryId).collect()
    }

    fn selected_objects(&self) -> Vec<EntryId> {
        self.selection.clone()
    }

    fn set_selected_objects(&mut self, entries: &[EntryId], expand_ancestors: bool) {
        self.selection.clear();
        for &entry in entries {
            if entry.0 >= self.rows.len() || self.selection.contains(&entry) {
                continue;
            }
            if expand_ancestors {
                self.expand_ancestors(entry);
            }
            self.selection.push(entry);
        }
        if expand_ancestors {
            self.relayout();
        }
    }

    fn object_bounds(&self, entry: EntryId, include_subtree: bool) -> Option<Rect> {
        let index = self.visible_pos.get(entry.0).copied().flatten()?;
        let mut rect = self.row_rect(entry, index);
        if include_subtree {
            for (i, &other) in self.visible.iter().enumerate().skip(index + 1) {
                if !self.ancestors(other).any(|a| a == entry.0) {
                    break;
                }
                rect = rect.union(&self.row_rect(other, i));
            }
        }
        Some(rect)
    }

    fn hit_test(&self, point: Point) -> Option<EntryId> {
        if !self.bounds.contains(point) {
            return None;
        }
        let offset = point.y - self.bounds.top() + self.scroll;
        if offset < 0.0 {
            return None;
        }
        let index = (offset / self.row_height) as usize;
        self.visible.get(index).copied()
    }

    fn port_of(&self, entry: EntryId) -> Option<&Port> {
        match &self.rows.get(entry.0)?.kind {
            RowKind::Port(p) => Some(p),
            RowKind::Group => None,
        }
    }

    fn entry_of(&self, port: PortId) -> Option<EntryId> {
        self.port_rows.get(&port).copied().map(EntryId)
    }

    fn is_visible(&self, entry: EntryId) -> bool {
        self.visible_pos.get(entry.0).is_some_and(Option::is_some)
    }

    fn is_selected(&self, entry: EntryId) -> bool {
        self.selection.contains(&entry)
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn viewport(&self) -> Rect {
        self.bounds
    }

    fn expand_all(&mut self, max_depth: usize) {
        for row in &mut self.rows {
            if row.has_children && row.depth < max_depth {
                row.expanded = true;
            }
        }
        self.relayout();
    }

    fn collapse_all(&mut self) {
        for row in &mut self.rows {
            if row.has_children {
                row.expanded = false;
            }
        }
        self.relayout();
    }

    /// The outline owns its rows, so there is no external model to re-read.
    /// Refreshing drops stale selection entries and recomputes the visible
    /// row cache.
    fn refresh(&mut self) {
        let len = self.rows.len();
        self.selection.retain(|e| e.0 < len);
        self.relayout();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list_view::select_on_press;
    use crate::model::{PortDirection, PortSpec};

    fn spec() -> NodeSpec {
        NodeSpec {
            name: "Dev".into(),
            ports: vec![PortSpec {
                name: "out".into(),
                direction: PortDirection::Output,
                type_tag: "f64".into(),
                uid: Some("dev.out".into()),
            }],
            children: vec![NodeSpec {
                name: "Sub".into(),
                ports: vec![PortSpec {
                    name: "in".into(),
                    direction: PortDirection::Input,
                    type_tag: "f64".into(),
                    uid: None,
                }],
                children: vec![],
                expanded: false,
            }],
            expanded: true,
        }
    }

    fn list() -> OutlineList {
        let mut next = 0;
        let mut l = OutlineList::from_spec(Side::A, &spec(), &mut next, &EditorConfig::default());
        l.set_bounds(Rect::from_xywh(0.0, 0.0, 200.0, 100.0));
        assert_eq!(next, 2);
        l
    }

    #[test]
    fn test_flatten_and_visibility() {
        let l = list();
        assert_eq!(l.len(), 4);
        // Dev, out, Sub visible; Sub/in hidden by collapsed Sub.
        assert_eq!(l.visible_objects(), vec![EntryId(0), EntryId(1), EntryId(2)]);
        assert!(!l.is_visible(EntryId(3)));
        assert_eq!(l.port_of(EntryId(3)).map(|p| p.node.as_str()), Some("Dev/Sub"));
        assert_eq!(l.find_entry("Dev/Sub/in"), Some(EntryId(3)));
    }

    #[test]
    fn test_select_expands_ancestors() {
        let mut l = list();
        l.set_selected_objects(&[EntryId(3)], false);
        assert!(!l.is_visible(EntryId(3)));
        l.set_selected_objects(&[EntryId(3)], true);
        assert!(l.is_visible(EntryId(3)));
        assert_eq!(l.selected_objects(), vec![EntryId(3)]);
    }

    #[test]
    fn test_hit_test_and_bounds() {
        let l = list();
        let row_h = EditorConfig::default().row_height;
        assert_eq!(l.hit_test(Point::new(5.0, 1.0)), Some(EntryId(0)));
        assert_eq!(l.hit_test(Point::new(5.0, row_h * 1.5)), Some(EntryId(1)));
        assert_eq!(l.hit_test(Point::new(5.0, row_h * 3.5)), None);
        assert_eq!(l.hit_test(Point::new(500.0, 1.0)), None);
        assert!(l.object_bounds(EntryId(3), false).is_none());
        let whole = l.object_bounds(EntryId(0), true).unwrap();
        assert_eq!(whole.bottom(), 3.0 * row_h);
    }

    #[test]
    fn test_visible_cache_follows_expansion() {
        let mut l = list();
        let sub_in = l.find_entry("Dev/Sub/in").unwrap();
        let port = l.port_of(sub_in).unwrap().id;
        assert_eq!(l.entry_of(port), Some(sub_in));
        assert_eq!(l.entry_of(PortId(99)), None);

        let row_h = EditorConfig::default().row_height;
        assert_eq!(l.hit_test(Point::new(5.0, row_h * 3.5)), None);
        l.set_expanded(EntryId(2), true);
        assert_eq!(l.hit_test(Point::new(5.0, row_h * 3.5)), Some(sub_in));
        assert_eq!(l.object_bounds(sub_in, false).unwrap().top(), 3.0 * row_h);
        assert_eq!(l.content_height(), 4.0 * row_h);

        l.collapse_all();
        assert!(l.object_bounds(sub_in, false).is_none());
        l.set_selected_objects(&[sub_in], true);
        assert!(l.is_visible(sub_in));
        l.refresh();
        assert_eq!(l.visible_objects().len(), 4);
    }

    #[test]
    fn test_press_selects_port_under_pointer() {
        let mut l = list();
        l.expand_all(20);
        let row_h = EditorConfig::default().row_height;
        let out = Point::new(5.0, row_h * 1.5);
        let sub_in = Point::new(5.0, row_h * 3.5);

        l.set_selected_objects(&[EntryId(3)], false);
        assert_eq!(select_on_press(&mut l, out, false), Some(EntryId(1)));
        assert_eq!(l.selected_objects(), vec![EntryId(1)]);

        // Extending keeps the current selection.
        select_on_press(&mut l, sub_in, true);
        assert_eq!(l.selected_objects(), vec![EntryId(1), EntryId(3)]);

        // Pressing an already selected port keeps a multi-selection for dragging.
        select_on_press(&mut l, out, false);
        assert_eq!(l.selected_objects(), vec![EntryId(1), EntryId(3)]);

        // Group rows do not change the selection.
        assert_eq!(select_on_press(&mut l, Point::new(5.0, 1.0), false), Some(EntryId(0)));
        assert_eq!(l.selected_objects(), vec![EntryId(1), EntryId(3)]);
    }

    #[test]
    fn test_expand_collapse_all() {
        let mut l = list();
        l.expand_all(20);
        assert_eq!(l.visible_objects().len(), 4);
        l.collapse_all();
        assert_eq!(l.visible_objects(), vec![EntryId(0)]);
        l.expand_all(1);
        // Only depth-0 rows are expanded with a limit of one level.
        assert_eq!(l.visible_objects().len(), 3);
    }
}
