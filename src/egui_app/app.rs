#![cfg(feature = "egui")]

use std::time::Instant;

use camino::Utf8PathBuf;
use eframe::egui::{self, Align2, Color32, PointerButton, RichText, Sense};

use crate::config::{EditorConfig, Theme};
use crate::controller::{ContextCommand, GestureState, InteractionController, ReleaseOutcome};
use crate::host::{Collaborators, EditorHost};
use crate::list_view::{ListPair, PortListView, select_on_press};
use crate::model::Side;
use crate::outline::OutlineList;
use crate::render::Renderer;
use crate::session::WiringSession;

use super::paint::{from_pos2, from_rect, paint_plan, to_color32, to_rect};

/// Horizontal space between the two lists where lines are drawn.
const GUTTER: f32 = 160.0;

/// Shell services for the GUI: an undo-label log, the last error for the
/// status bar and text waiting to be copied to the clipboard.
#[derive(Debug, Default)]
pub struct GuiHost {
    pub undo_labels: Vec<String>,
    pub last_error: Option<String>,
    pending_clipboard: Option<String>,
}

impl EditorHost for GuiHost {
    fn add_undo_buffer_entry(&mut self, label: &str) {
        self.undo_labels.push(label.to_string());
    }

    fn report_error(&mut self, err: &anyhow::Error) {
        self.last_error = Some(format!("{err:#}"));
    }

    fn set_clipboard_text(&mut self, text: String) {
        self.pending_clipboard = Some(text);
    }
}

pub struct WiringApp {
    session: WiringSession,
    controller: InteractionController,
    renderer: Renderer,
    host: GuiHost,
    document_path: Option<Utf8PathBuf>,
    dark_mode: bool,
}

impl WiringApp {
    pub fn new(session: WiringSession, config: &EditorConfig, document_path: Option<Utf8PathBuf>) -> Self {
        Self {
            session,
            controller: InteractionController::new(config),
            renderer: Renderer::new(config),
            host: GuiHost::default(),
            document_path,
            dark_mode: false,
        }
    }

    fn side_at(&self, pos: egui::Pos2) -> Option<Side> {
        let p = from_pos2(pos);
        [Side::A, Side::B]
            .into_iter()
            .find(|&s| self.session.list(s).bounds().contains(p))
    }

    fn save(&mut self) {
        let Some(path) = &self.document_path else {
            return;
        };
        if let Err(err) = self.session.to_document().save(path) {
            log::error!("{err:#}");
            self.host.report_error(&err);
        }
    }

    fn status_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let state = match self.controller.state() {
                GestureState::Idle => "Idle",
                GestureState::Dragging => "Dragging",
                GestureState::PendingHighlightReveal => "Dragging (highlight pending)",
            };
            ui.label(RichText::new(state).strong());
            ui.separator();
            ui.label(format!("{} connection(s)", self.session.connections.len()));
            if let Some(label) = self.host.undo_labels.last() {
                ui.separator();
                ui.label(format!("Last action: {label}"));
            }
            if let Some(err) = &self.host.last_error {
                ui.separator();
                ui.colored_label(Color32::from_rgb(200, 40, 40), err);
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if self.document_path.is_some() && ui.button("Save").clicked() {
                    self.save();
                }
                ui.checkbox(&mut self.dark_mode, "Dark");
            });
        });
    }

    fn handle_input(&mut self, ui: &egui::Ui, response: &egui::Response) {
        let now = Instant::now();

        if response.drag_started_by(PointerButton::Primary) {
            let origin = ui.input(|i| i.pointer.press_origin());
            if let Some((pos, side)) = origin.and_then(|p| self.side_at(p).map(|s| (p, s))) {
                let WiringSession {
                    side_a,
                    side_b,
                    oracle,
                    ..
                } = &mut self.session;
                let mut lists = ListPair::new(side_a, side_b);
                let extend = ui.input(|i| i.modifiers.command);
                select_on_press(lists.get_mut(side), from_pos2(pos), extend);
                self.controller.press(side, from_pos2(pos), now, &mut lists, &*oracle);
            }
        } else if response.dragged_by(PointerButton::Primary) {
            if let Some(pos) = response.interact_pointer_pos() {
                let WiringSession {
                    side_a,
                    side_b,
                    oracle,
                    ..
                } = &mut self.session;
                let lists = ListPair::new(side_a, side_b);
                self.controller.drag(from_pos2(pos), &lists, &*oracle);
            }
        }

        if response.drag_stopped_by(PointerButton::Primary) {
            let pos = response
                .interact_pointer_pos()
                .or_else(|| ui.input(|i| i.pointer.latest_pos()));
            if let Some(pos) = pos {
                let WiringSession {
                    side_a,
                    side_b,
                    connections,
                    oracle,
                    ..
                } = &mut self.session;
                let mut lists = ListPair::new(side_a, side_b);
                let mut collab = Collaborators {
                    oracle: &*oracle,
                    connections,
                    host: &mut self.host,
                };
                if let ReleaseOutcome::Committed { .. } =
                    self.controller.release(from_pos2(pos), &mut lists, &mut collab)
                {
                    self.host.last_error = None;
                }
            }
        }

        if response.clicked_by(PointerButton::Primary) {
            if let Some(pos) = response.interact_pointer_pos() {
                self.click(pos, ui.input(|i| i.modifiers.command));
            }
        }

        if response.secondary_clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                if let Some(side) = self.side_at(pos) {
                    let lists = self.session.lists();
                    self.controller.open_context_menu(side, from_pos2(pos), &lists);
                }
            }
        }

        self.controller.poll(now);
        if let Some(deadline) = self.controller.next_deadline() {
            ui.ctx()
                .request_repaint_after(deadline.saturating_duration_since(now));
        }
    }

    /// Plain click: groups toggle expansion, ports toggle (command held) or
    /// replace the selection.
    fn click(&mut self, pos: egui::Pos2, toggle: bool) {
        let Some(side) = self.side_at(pos) else {
            return;
        };
        let list = self.session.list_mut(side);
        let Some(entry) = list.hit_test(from_pos2(pos)) else {
            list.set_selected_objects(&[], false);
            return;
        };
        if list.port_of(entry).is_none() {
            list.toggle_expanded(entry);
            return;
        }
        let mut selection = if toggle { list.selected_objects() } else { Vec::new() };
        if let Some(i) = selection.iter().position(|&e| e == entry) {
            selection.remove(i);
        } else {
            selection.push(entry);
        }
        list.set_selected_objects(&selection, false);
    }

    fn context_menu(&mut self, ui: &mut egui::Ui) {
        for command in ContextCommand::ALL {
            if command.starts_group() {
                ui.separator();
            }
            if ui.button(command.label()).clicked() {
                let WiringSession {
                    side_a,
                    side_b,
                    connections,
                    ..
                } = &mut self.session;
                let mut lists = ListPair::new(side_a, side_b);
                self.controller
                    .execute(command, &mut lists, connections, &mut self.host);
                ui.close();
            }
        }
    }
}

fn paint_rows(painter: &egui::Painter, list: &OutlineList, text_color: Color32, selected_fill: Color32) {
    let font = egui::FontId::proportional(13.0);
    for entry in list.visible_objects() {
        let Some(rect) = list.object_bounds(entry, false) else {
            continue;
        };
        let rect = to_rect(rect);
        if list.is_selected(entry) {
            painter.rect_filled(rect, 2.0, selected_fill);
        }
        let label = list.label(entry).unwrap_or_default();
        let text = if list.port_of(entry).is_some() {
            label.to_string()
        } else if list.is_expanded(entry) {
            format!("▾ {label}")
        } else {
            format!("▸ {label}")
        };
        painter.text(
            rect.left_center() + egui::vec2(4.0, 0.0),
            Align2::LEFT_CENTER,
            text,
            font.clone(),
            text_color,
        );
    }
}

impl eframe::App for WiringApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let theme = if self.dark_mode { Theme::dark() } else { Theme::default() };
        ctx.set_visuals(if self.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        });
        self.renderer.set_theme(theme);

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| self.status_bar(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
            let area = from_rect(response.rect);
            self.session.layout(area, GUTTER);

            self.handle_input(ui, &response);
            response.context_menu(|ui| self.context_menu(ui));

            painter.rect_filled(response.rect, 0.0, to_color32(self.renderer.theme().background));
            let text_color = ui.visuals().text_color();
            let selected_fill = ui.visuals().selection.bg_fill;
            paint_rows(&painter, &self.session.side_a, text_color, selected_fill);
            paint_rows(&painter, &self.session.side_b, text_color, selected_fill);

            let WiringSession {
                side_a,
                side_b,
                connections,
                ..
            } = &mut self.session;
            let lists = ListPair::new(side_a, side_b);
            let plan = self.renderer.plan(&self.controller, &lists, &*connections, area);
            paint_plan(&painter, &plan);
        });

        if let Some(text) = self.host.pending_clipboard.take() {
            ctx.copy_text(text);
        }
        if self.controller.take_redraw_request() {
            ctx.request_repaint();
        }
    }
}
