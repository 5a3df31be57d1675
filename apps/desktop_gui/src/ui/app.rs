use eframe::egui;
use egui::TextureHandle;
use recognition::RecognitionEngine;
use session_core::{
    preview::scaled_preview_size, SessionController, SessionState, SystemClipboard,
};

use crate::controller::{
    events::{context_label, err_label, UiError},
    orchestration::{dispatch_action, ActionOutcome, UiAction},
};

pub const WINDOW_TITLE: &str = "Image to LaTeX";
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "bmp"];
const BUTTON_HEIGHT: f32 = 28.0;
const EDITOR_ID: &str = "latex-snap-editor";

/// Delivered as a plain key event by every backend, unlike Ctrl/Cmd+V.
const PASTE_IMAGE_SHORTCUT: egui::KeyboardShortcut =
    egui::KeyboardShortcut::new(egui::Modifiers::ALT, egui::Key::V);

pub type DesktopController = SessionController<Box<dyn RecognitionEngine>, SystemClipboard>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusBannerSeverity {
    Error,
}

#[derive(Debug, Clone)]
struct StatusBanner {
    severity: StatusBannerSeverity,
    message: String,
}

impl StatusBanner {
    fn from_error(err: &UiError) -> Self {
        let mut message = format!(
            "{} error while {}: {}",
            err_label(err.category()),
            context_label(err.context()),
            err.message()
        );
        if let Some(hint) = err.hint() {
            message.push(' ');
            message.push_str(hint);
        }
        Self {
            severity: StatusBannerSeverity::Error,
            message,
        }
    }
}

pub struct LatexSnapApp {
    controller: DesktopController,
    state: SessionState,
    preview_texture: Option<TextureHandle>,
    banner: Option<StatusBanner>,
}

impl LatexSnapApp {
    pub fn new(controller: DesktopController) -> Self {
        Self {
            controller,
            state: SessionState::new(),
            preview_texture: None,
            banner: None,
        }
    }

    fn run(&mut self, action: UiAction) {
        match dispatch_action(&mut self.controller, &mut self.state, action) {
            ActionOutcome::Updated { preview_changed } => {
                self.banner = None;
                if preview_changed {
                    self.preview_texture = None;
                }
            }
            ActionOutcome::Unchanged => {}
            ActionOutcome::Failed(err) => self.banner = Some(StatusBanner::from_error(&err)),
        }
    }

    fn pick_image(&mut self) {
        let picked = rfd::FileDialog::new()
            .set_title("Select an image")
            .add_filter("Images", IMAGE_EXTENSIONS)
            .add_filter("All Files", &["*"])
            .pick_file();
        if let Some(path) = picked {
            self.run(UiAction::LoadImage(path));
        }
    }

    fn show_banner(&self, ui: &mut egui::Ui) {
        let Some(banner) = &self.banner else {
            return;
        };
        let color = match banner.severity {
            StatusBannerSeverity::Error => ui.visuals().error_fg_color,
        };
        ui.colored_label(color, banner.message.as_str());
    }

    fn show_preview(&mut self, ui: &mut egui::Ui) {
        let Some(preview) = &self.state.preview else {
            return;
        };
        let texture = self.preview_texture.get_or_insert_with(|| {
            let color_image = egui::ColorImage::from_rgba_unmultiplied(preview.size(), &preview.rgba);
            ui.ctx().load_texture(
                "latex-snap-preview",
                color_image,
                egui::TextureOptions::LINEAR,
            )
        });

        let settings = self.controller.settings();
        let [width, height] = scaled_preview_size(
            preview.size(),
            settings.preview_label_size,
            settings.preview_scale,
        );
        let size = fit_to_width(egui::vec2(width, height), ui.available_width());
        if size.x > 0.0 && size.y > 0.0 {
            ui.add(egui::Image::new((texture.id(), size)));
        }
    }
}

impl eframe::App for LatexSnapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let editor_id = egui::Id::new(EDITOR_ID);
        let editor_focused = ctx.memory(|mem| mem.has_focus(editor_id));
        if ctx.input(|input| paste_shortcut_pressed(input, editor_focused)) {
            self.run(UiAction::PasteImage);
        }
        let paste_hint = format!(
            "Paste an image with {}",
            ctx.format_shortcut(&PASTE_IMAGE_SHORTCUT)
        );

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(self.state.status.as_str());
                self.show_banner(ui);
                self.show_preview(ui);
            });
            ui.add_space(6.0);

            let button_size = egui::vec2(ui.available_width(), BUTTON_HEIGHT);
            if ui
                .add_sized(button_size, egui::Button::new("Load Image"))
                .on_hover_text(paste_hint)
                .clicked()
            {
                self.pick_image();
            }
            if ui
                .add_sized(button_size, egui::Button::new("Copy LaTeX Code"))
                .clicked()
            {
                self.run(UiAction::CopyText);
            }
            ui.add_space(6.0);

            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add_sized(
                    ui.available_size(),
                    egui::TextEdit::multiline(&mut self.state.editor_text)
                        .id(editor_id)
                        .font(egui::TextStyle::Monospace)
                        .desired_rows(6),
                );
            });
        });
    }
}

/// Alt+V always pastes an image. Ctrl/Cmd+V reaches egui only when the
/// clipboard holds text (as `Event::Paste`, or as a key event on some
/// backends), and counts only while the editor is unfocused so text pastes
/// into the editor stay text pastes.
fn paste_shortcut_pressed(input: &egui::InputState, editor_focused: bool) -> bool {
    input.events.iter().any(|event| match event {
        egui::Event::Key {
            key,
            pressed: true,
            modifiers,
            ..
        } if *key == PASTE_IMAGE_SHORTCUT.logical_key => {
            (modifiers.alt && !modifiers.command) || (modifiers.command && !editor_focused)
        }
        egui::Event::Paste(_) => !editor_focused,
        _ => false,
    })
}

fn fit_to_width(size: egui::Vec2, max_width: f32) -> egui::Vec2 {
    if size.x <= max_width || size.x <= 0.0 {
        return size;
    }
    let scale = (max_width / size.x).max(0.0);
    size * scale
}
