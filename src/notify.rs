use crate::{SelectionModifier, SelectionType};

/// Everything the tool reports to its host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionNotification {
    EnabledChanged(bool),
    TypeChanged(SelectionType),
    ModifierChanged(SelectionModifier),
    BrushRadiusChanged(f32),
    NotifyDuringSelectionChanged(bool),
    MainColorChanged([u8; 3]),
    /// A gesture started
    Started,
    /// The masks were replaced; carries whether a gesture was in progress
    Changed { gesture_active: bool },
    /// The gesture ended, either completed or aborted
    Ended,
}

type Listener = Box<dyn FnMut(&SelectionNotification)>;

/// Synchronous fan-out to all subscribed listeners
#[derive(Default)]
pub(crate) struct Notifier {
    listeners: Vec<Listener>,
}

impl Notifier {
    pub fn subscribe(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    pub fn emit(&mut self, notification: SelectionNotification) {
        log::trace!("Emit {notification:?}");
        for listener in &mut self.listeners {
            listener(&notification);
        }
    }
}

/// Host side interpretation of the "notify during selection" flag.
///
/// The tool always emits [`SelectionNotification::Changed`]. Hosts use this policy to decide
/// on which notification the area mask should be intersected with their data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationPolicy {
    pub notify_during_selection: bool,
}

impl NotificationPolicy {
    pub fn new(notify_during_selection: bool) -> Self {
        Self {
            notify_during_selection,
        }
    }

    pub fn selection_due(&self, notification: &SelectionNotification) -> bool {
        match notification {
            SelectionNotification::Changed { gesture_active } => {
                self.notify_during_selection && *gesture_active
            }
            SelectionNotification::Ended => !self.notify_during_selection,
            _ => false,
        }
    }
}
