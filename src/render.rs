//! Builds the per-frame draw list for connection lines, candidate highlights
//! and port markers.
//!
//! [`Renderer::plan`] is backend-neutral: it decides *what* to draw (and what
//! to cull) and hands back a [`DrawPlan`] that a painter replays. Keeping the
//! decisions here means the culling and transparency rules are testable
//! without a window.

use std::collections::HashMap;

use crate::config::{AnchorConfig, EditorConfig, Rgba, Theme};
use crate::controller::{DragGesture, InteractionController};
use crate::geometry::{Point, Rect};
use crate::host::ConnectionIndex;
use crate::list_view::{EntryId, ListPair, PortListView, anchor_point};
use crate::model::{PortDirection, Side};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub width: f32,
    pub color: Rgba,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Committed,
    /// Drawn from a source anchor during a drag.
    Provisional,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawLine {
    pub from: Point,
    pub to: Point,
    pub kind: LineKind,
    pub emphasized: bool,
    pub style: LineStyle,
}

/// A row to paint with the candidate highlight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowHighlight {
    pub side: Side,
    pub entry: EntryId,
    pub rect: Rect,
    pub color: Rgba,
}

/// Small glyph marking a port's anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerStyle {
    pub glyph: char,
    pub color: Rgba,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortMarker {
    pub side: Side,
    pub entry: EntryId,
    pub at: Point,
    pub style: MarkerStyle,
}

/// Everything to paint in one pass, in paint order: highlights, committed
/// lines, provisional lines, markers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawPlan {
    /// False when the pass uses partial transparency for committed lines.
    pub opaque: bool,
    pub highlights: Vec<RowHighlight>,
    pub lines: Vec<DrawLine>,
    pub markers: Vec<PortMarker>,
}

impl DrawPlan {
    pub fn committed(&self) -> impl Iterator<Item = &DrawLine> {
        self.lines.iter().filter(|l| l.kind == LineKind::Committed)
    }

    pub fn provisional(&self) -> impl Iterator<Item = &DrawLine> {
        self.lines.iter().filter(|l| l.kind == LineKind::Provisional)
    }
}

/// Key of the marker style memo table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerKey {
    pub direction: PortDirection,
    pub connected: bool,
    pub selected: bool,
}

#[derive(Debug, Clone)]
pub struct Renderer {
    theme: Theme,
    anchors: AnchorConfig,
    transparency_threshold: usize,
    translucent_alpha: u8,
    line_width: f32,
    emphasis_width: f32,
    markers: HashMap<MarkerKey, MarkerStyle>,
}

impl Renderer {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            theme: config.theme.clone(),
            anchors: config.anchors.clone(),
            transparency_threshold: config.transparency_threshold,
            translucent_alpha: config.translucent_alpha,
            line_width: config.line_width,
            emphasis_width: config.emphasis_width,
            markers: HashMap::new(),
        }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Swap the theme; cached marker styles are dropped if anything changed.
    pub fn set_theme(&mut self, theme: Theme) {
        if theme != self.theme {
            self.theme = theme;
            self.markers.clear();
        }
    }

    /// Number of memoised marker styles.
    pub fn cached_styles(&self) -> usize {
        self.markers.len()
    }

    pub fn marker_style(&mut self, key: MarkerKey) -> MarkerStyle {
        let theme = &self.theme;
        *self.markers.entry(key).or_insert_with(|| {
            let glyph = match (key.direction, key.connected) {
                (PortDirection::Output, true) => '▶',
                (PortDirection::Output, false) => '▷',
                (PortDirection::Input, true) => '◀',
                (PortDirection::Input, false) => '◁',
            };
            let color = if key.selected {
                theme.selected_port
            } else {
                match key.direction {
                    PortDirection::Output => theme.output_port,
                    PortDirection::Input => theme.input_port,
                }
            };
            MarkerStyle { glyph, color }
        })
    }

    /// True when the pass should use partial transparency: at most
    /// `transparency_threshold` connection endpoints sit on visible side-B
    /// entries.
    pub fn use_transparency(&self, target: &dyn PortListView, connections: &dyn ConnectionIndex) -> bool {
        let endpoints: usize = target
            .visible_ports()
            .iter()
            .map(|(_, p)| connections.connection_count(p.id))
            .sum();
        endpoints <= self.transparency_threshold
    }

    /// Decide everything to paint this frame. `clip` is the region both lists
    /// and the gutter between them occupy.
    pub fn plan(
        &mut self,
        controller: &InteractionController,
        lists: &ListPair<'_>,
        connections: &dyn ConnectionIndex,
        clip: Rect,
    ) -> DrawPlan {
        let translucent = self.use_transparency(lists.get(Side::B), connections);
        let mut plan = DrawPlan {
            opaque: !translucent,
            ..DrawPlan::default()
        };

        if let Some(gesture) = controller.gesture() {
            self.plan_highlights(gesture, lists, &mut plan);
        }
        self.plan_committed(lists, connections, clip, translucent, &mut plan);
        if let Some(gesture) = controller.gesture() {
            self.plan_provisional(gesture, &mut plan);
        }
        self.plan_markers(lists, connections, &mut plan);
        plan
    }

    fn plan_highlights(&self, gesture: &DragGesture, lists: &ListPair<'_>, plan: &mut DrawPlan) {
        if !gesture.highlight_revealed {
            return;
        }
        let Some(candidates) = &gesture.candidates else {
            return;
        };
        let side = gesture.target_side();
        let view = lists.get(side);
        for &entry in candidates {
            if let Some(rect) = view.object_bounds(entry, false) {
                plan.highlights.push(RowHighlight {
                    side,
                    entry,
                    rect,
                    color: self.theme.highlight,
                });
            }
        }
    }

    fn plan_committed(
        &self,
        lists: &ListPair<'_>,
        connections: &dyn ConnectionIndex,
        clip: Rect,
        translucent: bool,
        plan: &mut DrawPlan,
    ) {
        let (a, b) = (lists.get(Side::A), lists.get(Side::B));
        let alpha = if translucent { self.translucent_alpha } else { 255 };
        for (a_entry, a_port) in a.visible_ports() {
            for partner in connections.connections_of(a_port.id) {
                let Some(b_entry) = b.entry_of(partner) else {
                    continue;
                };
                // Far endpoint hidden under a collapsed ancestor: never drawn.
                if !b.is_visible(b_entry) {
                    continue;
                }
                let (Some(from), Some(to)) = (
                    anchor_point(a, Side::A, a_entry, &self.anchors),
                    anchor_point(b, Side::B, b_entry, &self.anchors),
                ) else {
                    continue;
                };

                let in_view = a.viewport().contains(from) || b.viewport().contains(to);
                let emphasized = if in_view {
                    a.is_selected(a_entry) || b.is_selected(b_entry)
                } else if clip.intersects_segment(from, to) {
                    false
                } else {
                    continue;
                };

                let style = if emphasized {
                    LineStyle {
                        width: self.emphasis_width,
                        color: self.theme.emphasis.with_alpha(alpha),
                    }
                } else {
                    LineStyle {
                        width: self.line_width,
                        color: self.theme.line.with_alpha(alpha),
                    }
                };
                plan.lines.push(DrawLine {
                    from,
                    to,
                    kind: LineKind::Committed,
                    emphasized,
                    style,
                });
            }
        }
    }

    fn plan_provisional(&self, gesture: &DragGesture, plan: &mut DrawPlan) {
        for (i, &from) in gesture.anchors.iter().enumerate() {
            let matched = gesture
                .hover
                .as_ref()
                .and_then(|h| h.targets.get(i).copied().flatten());
            let line = match matched {
                Some((_, to)) => DrawLine {
                    from,
                    to,
                    kind: LineKind::Provisional,
                    emphasized: true,
                    style: LineStyle {
                        width: self.emphasis_width,
                        color: self.theme.emphasis,
                    },
                },
                None => DrawLine {
                    from,
                    to: gesture.cursor,
                    kind: LineKind::Provisional,
                    emphasized: false,
                    style: LineStyle {
                        width: self.line_width,
                        color: self.theme.provisional,
                    },
                },
            };
            plan.lines.push(line);
        }
    }

    fn plan_markers(&mut self, lists: &ListPair<'_>, connections: &dyn ConnectionIndex, plan: &mut DrawPlan) {
        for side in [Side::A, Side::B] {
            let view = lists.get(side);
            for (entry, port) in view.visible_ports() {
                let Some(at) = anchor_point(view, side, entry, &self.anchors) else {
                    continue;
                };
                let key = MarkerKey {
                    direction: port.direction,
                    connected: connections.connection_count(port.id) > 0,
                    selected: view.is_selected(entry),
                };
                let style = self.marker_style(key);
                plan.markers.push(PortMarker { side, entry, at, style });
            }
        }
    }
}
