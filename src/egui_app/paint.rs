#![cfg(feature = "egui")]

use eframe::egui::{self, Align2, Color32, Pos2, Stroke};

use crate::config::Rgba;
use crate::geometry::{Point, Rect};
use crate::render::DrawPlan;

pub fn to_pos2(p: Point) -> Pos2 {
    Pos2::new(p.x, p.y)
}

pub fn to_rect(r: Rect) -> egui::Rect {
    egui::Rect::from_min_max(to_pos2(r.min), to_pos2(r.max))
}

pub fn from_pos2(p: Pos2) -> Point {
    Point::new(p.x, p.y)
}

pub fn from_rect(r: egui::Rect) -> Rect {
    Rect::from_min_max(from_pos2(r.min), from_pos2(r.max))
}

pub fn to_color32(c: Rgba) -> Color32 {
    Color32::from_rgba_unmultiplied(c.0, c.1, c.2, c.3)
}

/// Replay a draw plan: highlights first, then lines, then port markers on top.
pub fn paint_plan(painter: &egui::Painter, plan: &DrawPlan) {
    for h in &plan.highlights {
        painter.rect_filled(to_rect(h.rect), 2.0, to_color32(h.color));
    }
    for line in &plan.lines {
        let stroke = Stroke::new(line.style.width, to_color32(line.style.color));
        painter.line_segment([to_pos2(line.from), to_pos2(line.to)], stroke);
    }
    let font = egui::FontId::proportional(10.0);
    for m in &plan.markers {
        painter.text(
            to_pos2(m.at),
            Align2::CENTER_CENTER,
            m.style.glyph,
            font.clone(),
            to_color32(m.style.color),
        );
    }
}
