use std::sync::Arc;

use crate::{
    raster::{self, RasterInput},
    KeyModifier, Mask, NotificationPolicy, PixelPos, PointerButtons, SelectionMasks,
    SelectionModifier, SelectionNotification, SelectionSettings, SelectionType, ViewportSize,
};
use crate::notify::Notifier;

mod interpreter;

pub const BRUSH_RADIUS_MIN: f32 = 10.0;
pub const BRUSH_RADIUS_MAX: f32 = 500.0;
pub const BRUSH_RADIUS_DEFAULT: f32 = 50.0;
/// Radius change per wheel step
pub const BRUSH_RADIUS_DELTA: f32 = 10.0;

/// Pixel selection tool of a single viewport.
///
/// The host forwards its input through [`PixelSelectionTool::handle_event`] and reads the
/// resulting area and shape masks. Every mutation rasterizes synchronously before returning.
pub struct PixelSelectionTool {
    enabled: bool,
    selection_type: SelectionType,
    modifier: SelectionModifier,
    active: bool,
    aborted: bool,
    notify_during_selection: bool,
    brush_radius: f32,
    main_color: [u8; 3],
    fixed_brush_radius_modifier: Option<KeyModifier>,
    mouse_position: Option<PixelPos>,
    mouse_positions: Vec<PixelPos>,
    mouse_buttons: PointerButtons,
    size: ViewportSize,
    masks: Arc<SelectionMasks>,
    prevent_context_menu: bool,
    notifier: Notifier,
}

impl PixelSelectionTool {
    pub fn new(size: ViewportSize) -> Self {
        Self::with_settings(size, SelectionSettings::default())
    }

    pub fn with_settings(size: ViewportSize, settings: SelectionSettings) -> Self {
        let mut tool = Self {
            enabled: settings.enabled,
            selection_type: settings.selection_type,
            modifier: settings.modifier,
            active: false,
            aborted: false,
            notify_during_selection: settings.notify_during_selection,
            brush_radius: BRUSH_RADIUS_DEFAULT,
            main_color: settings.main_color,
            fixed_brush_radius_modifier: settings.fixed_brush_radius_modifier,
            mouse_position: None,
            mouse_positions: Vec::new(),
            mouse_buttons: PointerButtons::NONE,
            size,
            masks: Arc::new(SelectionMasks::transparent(size)),
            prevent_context_menu: false,
            notifier: Notifier::default(),
        };
        tool.apply_brush_radius(settings.brush_radius);
        tool.paint();
        tool
    }

    /// Current values, e.g. to store them as defaults for the next viewport
    pub fn settings(&self) -> SelectionSettings {
        SelectionSettings {
            enabled: self.enabled,
            selection_type: self.selection_type,
            modifier: self.modifier,
            brush_radius: self.brush_radius,
            notify_during_selection: self.notify_during_selection,
            main_color: self.main_color,
            fixed_brush_radius_modifier: self.fixed_brush_radius_modifier,
        }
    }

    /// Registers a listener which is called synchronously for every notification
    pub fn subscribe(&mut self, listener: impl FnMut(&SelectionNotification) + 'static) {
        self.notifier.subscribe(Box::new(listener));
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling aborts a running gesture and clears both masks
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled == self.enabled {
            return;
        }
        self.enabled = enabled;
        if !enabled {
            self.abort_selection();
            self.masks = Arc::new(SelectionMasks::transparent(self.size));
        }
        self.notifier
            .emit(SelectionNotification::EnabledChanged(enabled));
        self.paint();
    }

    pub fn selection_type(&self) -> SelectionType {
        self.selection_type
    }

    pub fn set_type(&mut self, selection_type: SelectionType) {
        if selection_type == self.selection_type {
            return;
        }
        log::debug!("Selection type {} -> {selection_type}", self.selection_type);
        self.abort_selection();
        self.selection_type = selection_type;
        self.notifier
            .emit(SelectionNotification::TypeChanged(selection_type));
        self.paint();
    }

    pub fn modifier(&self) -> SelectionModifier {
        self.modifier
    }

    pub fn set_modifier(&mut self, modifier: SelectionModifier) {
        if modifier == self.modifier {
            return;
        }
        self.modifier = modifier;
        self.notifier
            .emit(SelectionNotification::ModifierChanged(modifier));
        self.paint();
    }

    pub fn brush_radius(&self) -> f32 {
        self.brush_radius
    }

    /// Out of range values are clamped to [`BRUSH_RADIUS_MIN`]..=[`BRUSH_RADIUS_MAX`]
    pub fn set_brush_radius(&mut self, brush_radius: f32) {
        if self.apply_brush_radius(brush_radius) {
            self.paint();
        }
    }

    pub fn is_notify_during_selection(&self) -> bool {
        self.notify_during_selection
    }

    pub fn set_notify_during_selection(&mut self, notify_during_selection: bool) {
        if notify_during_selection == self.notify_during_selection {
            return;
        }
        self.notify_during_selection = notify_during_selection;
        self.notifier
            .emit(SelectionNotification::NotifyDuringSelectionChanged(
                notify_during_selection,
            ));
    }

    pub fn notification_policy(&self) -> NotificationPolicy {
        NotificationPolicy::new(self.notify_during_selection)
    }

    pub fn main_color(&self) -> [u8; 3] {
        self.main_color
    }

    pub fn set_main_color(&mut self, main_color: [u8; 3]) {
        if main_color == self.main_color {
            return;
        }
        self.main_color = main_color;
        self.notifier
            .emit(SelectionNotification::MainColorChanged(main_color));
        self.paint();
    }

    pub fn fixed_brush_radius_modifier(&self) -> Option<KeyModifier> {
        self.fixed_brush_radius_modifier
    }

    /// While exactly this modifier is held, wheel events leave the brush radius untouched
    pub fn set_fixed_brush_radius_modifier(&mut self, modifier: Option<KeyModifier>) {
        self.fixed_brush_radius_modifier = modifier;
    }

    /// Whether a gesture is in progress
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the last gesture was aborted instead of completed.
    /// Reset when the next gesture starts.
    pub fn was_aborted(&self) -> bool {
        self.aborted
    }

    /// Positions recorded since the current gesture started
    pub fn mouse_positions(&self) -> &[PixelPos] {
        &self.mouse_positions
    }

    /// Last known pointer position
    pub fn mouse_position(&self) -> Option<PixelPos> {
        self.mouse_position
    }

    /// Masks of the last pass. Clone the `Arc` to keep them beyond the next event.
    pub fn masks(&self) -> &Arc<SelectionMasks> {
        &self.masks
    }

    pub fn area_mask(&self) -> &Mask {
        &self.masks.area
    }

    pub fn shape_mask(&self) -> &Mask {
        &self.masks.shape
    }

    pub fn viewport_size(&self) -> ViewportSize {
        self.size
    }

    /// Ends a running gesture without completing it. Listeners still receive
    /// [`SelectionNotification::Ended`].
    pub fn abort(&mut self) {
        if self.abort_selection() {
            self.paint();
        }
    }

    /// Re-emits the value notifications, so freshly attached listeners can sync up
    pub fn publish_values(&mut self) {
        self.notifier
            .emit(SelectionNotification::TypeChanged(self.selection_type));
        self.notifier
            .emit(SelectionNotification::ModifierChanged(self.modifier));
        self.notifier
            .emit(SelectionNotification::NotifyDuringSelectionChanged(
                self.notify_during_selection,
            ));
        self.notifier
            .emit(SelectionNotification::BrushRadiusChanged(self.brush_radius));
    }

    /// Rasterizes the current state outside of event handling
    pub fn repaint(&mut self) {
        self.paint();
    }

    fn paint(&mut self) {
        if !self.enabled {
            return;
        }
        let masks = raster::rasterize(&RasterInput {
            selection_type: self.selection_type,
            modifier: self.modifier,
            positions: &self.mouse_positions,
            pointer: self.mouse_position,
            buttons: self.mouse_buttons,
            brush_radius: self.brush_radius,
            main_color: self.main_color,
            size: self.size,
        });
        self.masks = Arc::new(masks);
        self.notifier.emit(SelectionNotification::Changed {
            gesture_active: self.active,
        });
    }

    /// Returns true if the radius changed. Does not rasterize.
    fn apply_brush_radius(&mut self, brush_radius: f32) -> bool {
        if brush_radius.is_nan() {
            log::debug!("Ignore NaN brush radius");
            return false;
        }
        let clamped = num_traits::clamp(brush_radius, BRUSH_RADIUS_MIN, BRUSH_RADIUS_MAX);
        if clamped == self.brush_radius {
            return false;
        }
        self.brush_radius = clamped;
        self.notifier
            .emit(SelectionNotification::BrushRadiusChanged(clamped));
        true
    }

    fn start_selection(&mut self) {
        if self.active {
            self.end_selection();
        }
        log::debug!("Start {} selection", self.selection_type);
        self.active = true;
        self.aborted = false;
        self.notifier.emit(SelectionNotification::Started);
    }

    /// Returns false if no gesture was running
    fn end_selection(&mut self) -> bool {
        if !self.active {
            return false;
        }
        log::debug!(
            "End {} selection with {} positions",
            self.selection_type,
            self.mouse_positions.len()
        );
        self.mouse_positions.clear();
        self.active = false;
        self.notifier.emit(SelectionNotification::Ended);
        true
    }

    fn abort_selection(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.aborted = true;
        self.end_selection()
    }
}
