//! User-visible notifications

use std::sync::{Arc, Mutex};

use tracing::{info, warn};

/// Severity of a toast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToastVariant {
    #[default]
    Default,
    Destructive,
}

/// A transient notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub title: String,
    pub description: Option<String>,
    pub variant: ToastVariant,
}

impl Toast {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            description: None,
            variant: ToastVariant::Default,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn destructive(mut self) -> Self {
        self.variant = ToastVariant::Destructive;
        self
    }

    /// `Success` toast with the given description
    pub fn success(description: impl Into<String>) -> Self {
        Self::new("Success").with_description(description)
    }

    /// Destructive `Error` toast with the given description
    pub fn error(description: impl Into<String>) -> Self {
        Self::new("Error").with_description(description).destructive()
    }

    pub fn is_destructive(&self) -> bool {
        self.variant == ToastVariant::Destructive
    }
}

/// Receives toasts raised by mutations
pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);
}

/// Collects toasts until the view drains them
#[derive(Debug, Clone, Default)]
pub struct ToastQueue {
    toasts: Arc<Mutex<Vec<Toast>>>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every pending toast, oldest first
    pub fn drain(&self) -> Vec<Toast> {
        let mut guard = self
            .toasts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        std::mem::take(&mut *guard)
    }

    pub fn len(&self) -> usize {
        self.toasts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for ToastQueue {
    fn notify(&self, toast: Toast) {
        self.toasts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(toast);
    }
}

/// Writes toasts to the log; the default when no view is attached
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, toast: Toast) {
        let description = toast.description.as_deref().unwrap_or("");
        match toast.variant {
            ToastVariant::Default => info!(title = %toast.title, "{}", description),
            ToastVariant::Destructive => warn!(title = %toast.title, "{}", description),
        }
    }
}
