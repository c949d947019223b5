use std::{cell::RefCell, num::NonZeroU32, rc::Rc};

use eframe::egui::{
    self, Color32, ColorImage, ComboBox, Pos2, Rect, Sense, TextureHandle, TextureOptions, Vec2,
};
use log::debug;
use pixel_selection::{
    combine_selection, select_points, InputEvent, Key, KeyModifiers, Mask, NamedVariant,
    PixelPos, PixelSelectionTool, PointerButton, PointerButtons, SelectionModifier,
    SelectionNotification, SelectionSettings, SelectionType, ViewportSize, BRUSH_RADIUS_MAX,
    BRUSH_RADIUS_MIN,
};

const POINT_COUNT: u32 = 4000;
const POINT_RADIUS: f32 = 1.5;
const SELECTED_COLOR: Color32 = Color32::from_rgb(255, 140, 0);

pub struct SelectionDemo {
    tool: PixelSelectionTool,
    notifications: Rc<RefCell<Vec<SelectionNotification>>>,
    buttons: PointerButtons,
    /// Point cloud in normalized viewport coordinates
    points: Vec<Vec2>,
    /// Sorted point indices
    selected: Vec<u32>,
    /// Selection before the running gesture started
    previous: Vec<u32>,
    textures: Option<[TextureHandle; 2]>,
    textures_dirty: bool,
    menu_pos: Option<Pos2>,
}

impl SelectionDemo {
    pub fn new(settings: SelectionSettings) -> Self {
        // Resized to the panel on the first frame
        let size = ViewportSize::new(NonZeroU32::MIN, NonZeroU32::MIN);
        let mut tool = PixelSelectionTool::with_settings(size, settings);
        let notifications = Rc::new(RefCell::new(Vec::new()));
        let sink = notifications.clone();
        tool.subscribe(move |n| sink.borrow_mut().push(*n));

        Self {
            tool,
            notifications,
            buttons: PointerButtons::NONE,
            points: (0..POINT_COUNT)
                .map(|i| egui::vec2(pseudo_random(2 * i), pseudo_random(2 * i + 1)))
                .collect(),
            selected: Vec::new(),
            previous: Vec::new(),
            textures: None,
            textures_dirty: true,
            menu_pos: None,
        }
    }

    fn menu(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let mut enabled = self.tool.is_enabled();
            if ui.checkbox(&mut enabled, "Enabled").changed() {
                self.tool.set_enabled(enabled);
            }

            let mut selection_type = self.tool.selection_type();
            ComboBox::from_label("Type")
                .selected_text(selection_type.name())
                .show_ui(ui, |ui| {
                    for t in SelectionType::ALL {
                        ui.selectable_value(&mut selection_type, *t, t.name());
                    }
                });
            self.tool.set_type(selection_type);

            let mut modifier = self.tool.modifier();
            ComboBox::from_label("Modifier")
                .selected_text(modifier.name())
                .show_ui(ui, |ui| {
                    for m in SelectionModifier::ALL {
                        ui.selectable_value(&mut modifier, *m, m.name());
                    }
                });
            self.tool.set_modifier(modifier);

            let mut radius = self.tool.brush_radius();
            if ui
                .add(egui::Slider::new(&mut radius, BRUSH_RADIUS_MIN..=BRUSH_RADIUS_MAX).text("Brush"))
                .changed()
            {
                self.tool.set_brush_radius(radius);
            }

            let mut notify = self.tool.is_notify_during_selection();
            if ui
                .checkbox(&mut notify, "Notify during selection")
                .changed()
            {
                self.tool.set_notify_during_selection(notify);
            }

            let mut color = self.tool.main_color();
            if ui.color_edit_button_srgb(&mut color).changed() {
                self.tool.set_main_color(color);
            }

            ui.label(format!("{} selected", self.selected.len()));
        });
    }

    fn viewport(&mut self, ui: &mut egui::Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        if let Some(size) =
            ViewportSize::try_from_dimensions(rect.width() as u32, rect.height() as u32)
        {
            if size != self.tool.viewport_size() {
                self.tool.on_resize(size);
            }
        }

        let hovered = response.hovered();
        let events = ui.input(|i| i.events.clone());
        for event in events {
            self.forward(event, rect.min, hovered);
        }
        if response.double_clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let pos = PixelPos::from(pos - rect.min.to_vec2());
                self.tool.on_double_click(pos, PointerButton::Primary);
            }
        }
        if response.secondary_clicked() && !self.tool.handle_event(InputEvent::ContextMenu) {
            self.menu_pos = response.interact_pointer_pos();
        }
        self.process_notifications();
        self.paint(ui, rect);
        self.context_menu(ui.ctx());
    }

    fn forward(&mut self, event: egui::Event, origin: Pos2, hovered: bool) {
        let to_pixel = |pos: Pos2| PixelPos::from(pos - origin.to_vec2());
        match event {
            egui::Event::PointerButton {
                pos,
                button,
                pressed,
                ..
            } => {
                let Some(button) = map_button(button) else {
                    return;
                };
                if pressed {
                    if !hovered {
                        return;
                    }
                    self.menu_pos = None;
                    self.buttons = self.buttons.with(button);
                    self.tool.on_pointer_down(to_pixel(pos), button);
                } else if self.buttons.contains(button) {
                    self.buttons = self.buttons.without(button);
                    self.tool.on_pointer_up(to_pixel(pos), button);
                }
            }
            egui::Event::PointerMoved(pos) => {
                self.tool.on_pointer_move(to_pixel(pos), self.buttons);
            }
            egui::Event::MouseWheel {
                delta, modifiers, ..
            } if hovered => {
                self.tool.on_wheel(
                    delta.y,
                    KeyModifiers {
                        shift: modifiers.shift,
                        ctrl: modifiers.ctrl,
                        alt: modifiers.alt,
                        command: modifiers.mac_cmd,
                    },
                );
            }
            egui::Event::Key {
                key,
                pressed: true,
                repeat,
                ..
            } => {
                let key = match key {
                    egui::Key::Escape => Key::Escape,
                    other => Key::Other(other as u32),
                };
                self.tool.on_key_down(key, repeat);
            }
            _ => {}
        }
    }

    fn process_notifications(&mut self) {
        let notifications = std::mem::take(&mut *self.notifications.borrow_mut());
        let policy = self.tool.notification_policy();
        for notification in notifications {
            match notification {
                SelectionNotification::Started => self.previous = self.selected.clone(),
                SelectionNotification::Changed { .. } => self.textures_dirty = true,
                _ => {}
            }
            if policy.selection_due(&notification) {
                self.select();
            }
        }
    }

    fn select(&mut self) {
        let scale = self.scale();
        let positions = self.points.iter().map(|p| (*p * scale).to_pos2());
        let targets = select_points(self.tool.area_mask(), positions);
        self.selected = combine_selection(self.tool.modifier(), &self.previous, &targets);
        debug!("{} points hit, {} selected", targets.len(), self.selected.len());
    }

    fn scale(&self) -> Vec2 {
        let size = self.tool.viewport_size();
        egui::vec2(size.width() as f32, size.height() as f32)
    }

    fn paint(&mut self, ui: &egui::Ui, rect: Rect) {
        if std::mem::take(&mut self.textures_dirty) {
            self.upload_masks(ui.ctx());
        }

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, ui.visuals().extreme_bg_color);

        let scale = self.scale();
        let idle = ui.visuals().weak_text_color();
        for (p, idx) in self.points.iter().zip(0u32..) {
            let color = if self.selected.binary_search(&idx).is_ok() {
                SELECTED_COLOR
            } else {
                idle
            };
            painter.circle_filled(rect.min + *p * scale, POINT_RADIUS, color);
        }

        let image_rect = Rect::from_min_size(rect.min, scale);
        let uv = Rect::from_min_max(Pos2::ZERO, egui::pos2(1.0, 1.0));
        for texture in self.textures.iter().flatten() {
            painter.image(texture.id(), image_rect, uv, Color32::WHITE);
        }
    }

    fn upload_masks(&mut self, ctx: &egui::Context) {
        let masks = self.tool.masks().clone();
        let images = [&masks.area, &masks.shape].map(color_image);
        match &mut self.textures {
            Some(handles) => {
                for (handle, image) in handles.iter_mut().zip(images) {
                    handle.set(image, TextureOptions::NEAREST);
                }
            }
            None => {
                let [area, shape] = images;
                self.textures = Some([
                    ctx.load_texture("area_mask", area, TextureOptions::NEAREST),
                    ctx.load_texture("shape_mask", shape, TextureOptions::NEAREST),
                ]);
            }
        }
    }

    fn context_menu(&mut self, ctx: &egui::Context) {
        let Some(pos) = self.menu_pos else {
            return;
        };
        egui::Area::new(egui::Id::new("viewport_menu"))
            .order(egui::Order::Foreground)
            .fixed_pos(pos)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    if ui.button("Clear selection").clicked() {
                        self.selected.clear();
                        self.previous.clear();
                        self.menu_pos = None;
                    }
                    if ui.button("Close").clicked() {
                        self.menu_pos = None;
                    }
                });
            });
    }
}

impl eframe::App for SelectionDemo {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("selection_settings").show(ctx, |ui| self.menu(ui));
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.viewport(ui));
    }
}

fn map_button(button: egui::PointerButton) -> Option<PointerButton> {
    match button {
        egui::PointerButton::Primary => Some(PointerButton::Primary),
        egui::PointerButton::Secondary => Some(PointerButton::Secondary),
        egui::PointerButton::Middle => Some(PointerButton::Middle),
        _ => None,
    }
}

fn color_image(mask: &Mask) -> ColorImage {
    ColorImage::from_rgba_unmultiplied([mask.width() as usize, mask.height() as usize], mask.as_raw())
}

/// Deterministic value in 0..=1
fn pseudo_random(seed: u32) -> f32 {
    let mut num = seed.wrapping_add(0x9E37_79B9);
    for _ in 0..3 {
        num = (num ^ (num >> 16)).wrapping_mul(0x045D_9F3B);
    }
    num as f32 / u32::MAX as f32
}
