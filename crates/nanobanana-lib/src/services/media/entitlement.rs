// Video Entitlement Host
//
// Video synthesis needs a paid-tier key. The host decides whether such a key
// is selected and can prompt the user to pick one; the media client and the
// workflow controller only talk to it through `EntitlementHost`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

/// Host capability for video entitlement
pub trait EntitlementHost: Send + Sync {
    /// Whether a key with video entitlement has been selected
    fn has_video_entitlement(&self) -> bool;

    /// Ask the user to select a key. Fire and forget: must not block on the
    /// user completing the selection.
    fn request_key_selection(&self);

    /// Key selected through the host, preferred over the configured key
    fn selected_key(&self) -> Option<String> {
        None
    }
}

type Notifier = Box<dyn Fn() + Send + Sync>;

/// In-process entitlement host holding the user's selected paid key
pub struct KeySelector {
    selected: RwLock<Option<String>>,
    requests: AtomicUsize,
    notifier: Option<Notifier>,
}

impl KeySelector {
    pub fn new() -> Self {
        Self {
            selected: RwLock::new(None),
            requests: AtomicUsize::new(0),
            notifier: None,
        }
    }

    /// Start with a key already selected (e.g. from configuration)
    pub fn with_key(key: impl Into<String>) -> Self {
        let selector = Self::new();
        selector.select(key);
        selector
    }

    /// Callback run on every selection request; the UI uses it to tell the
    /// user how to provide a key.
    pub fn with_notifier(mut self, notifier: impl Fn() + Send + Sync + 'static) -> Self {
        self.notifier = Some(Box::new(notifier));
        self
    }

    /// Record the user's key choice. Blank input clears the selection.
    pub fn select(&self, key: impl Into<String>) {
        let key = key.into().trim().to_string();
        let value = if key.is_empty() { None } else { Some(key) };
        match self.selected.write() {
            Ok(mut guard) => *guard = value,
            Err(poisoned) => *poisoned.into_inner() = value,
        }
    }

    pub fn clear(&self) {
        self.select("");
    }

    /// Number of times a key selection was requested
    pub fn selection_requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl Default for KeySelector {
    fn default() -> Self {
        Self::new()
    }
}

impl EntitlementHost for KeySelector {
    fn has_video_entitlement(&self) -> bool {
        self.selected_key().is_some()
    }

    fn request_key_selection(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
        log::info!("Video API key selection requested");
        if let Some(notify) = &self.notifier {
            notify();
        }
    }

    fn selected_key(&self) -> Option<String> {
        match self.selected.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
