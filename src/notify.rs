//! Transient user notifications ("toasts")

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

/// A short, dismissible message shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
    pub dismissible: bool,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: ToastLevel::Success, message: message.into(), dismissible: true }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: ToastLevel::Error, message: message.into(), dismissible: true }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);
}

/// Forwards toasts to the log
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, toast: Toast) {
        match toast.level {
            ToastLevel::Error => log::error!("{}", toast.message),
            _ => log::info!("{}", toast.message),
        }
    }
}

/// Keeps toasts in memory so callers (and tests) can inspect them
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    toasts: std::sync::Mutex<Vec<Toast>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().map(|t| t.clone()).unwrap_or_default()
    }

    /// Dismiss every toast
    pub fn clear(&self) {
        if let Ok(mut t) = self.toasts.lock() {
            t.clear();
        }
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, toast: Toast) {
        if let Ok(mut t) = self.toasts.lock() {
            t.push(toast);
        }
    }
}
