use egui::{Align2, Context, Direction};
use egui_toast::{Toast, ToastKind, ToastOptions, Toasts};

/// Seconds a toast stays on screen
pub const TOAST_DURATION_SECS: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Error,
}

/// A message that was shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub text: String,
}

/// Toasts in the bottom right corner, plus a record of what was sent
pub struct Notifications {
    toasts: Toasts,
    sent: Vec<Notification>,
}

impl Default for Notifications {
    fn default() -> Self {
        Self {
            toasts: Toasts::new()
                .anchor(Align2::RIGHT_BOTTOM, [-12.0, -12.0])
                .direction(Direction::BottomUp),
            sent: Vec::new(),
        }
    }
}

impl Notifications {
    pub fn info(&mut self, text: impl Into<String>) {
        self.push(NotificationKind::Info, text.into());
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(NotificationKind::Error, text.into());
    }

    fn push(&mut self, kind: NotificationKind, text: String) {
        let toast_kind = match kind {
            NotificationKind::Info => ToastKind::Success,
            NotificationKind::Error => ToastKind::Error,
        };
        self.toasts.add(Toast {
            text: text.clone().into(),
            kind: toast_kind,
            options: ToastOptions::default()
                .duration_in_seconds(TOAST_DURATION_SECS)
                .show_progress(true),
            ..Default::default()
        });
        self.sent.push(Notification { kind, text });
    }

    /// Every notification sent so far, oldest first
    pub fn sent(&self) -> &[Notification] {
        &self.sent
    }

    pub fn show(&mut self, ctx: &Context) {
        self.toasts.show(ctx);
    }
}
