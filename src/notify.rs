//! Transient notification banners
//!
//! Banners stack without limit or de-duplication and expire after a fixed
//! lifetime. Expiry is evaluated against an injected `now`.

use serde::Serialize;

use crate::util::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    /// Bootstrap alert variant (`alert-<variant>`).
    pub fn css_variant(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "danger",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: u64,
    pub severity: Severity,
    pub message: String,
    created: Instant,
}

impl Notification {
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created)
    }

    pub fn view(&self) -> NotificationView {
        NotificationView {
            id: self.id,
            severity: self.severity,
            message: self.message.clone(),
        }
    }
}

/// Render-side copy of a banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationView {
    pub id: u64,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug)]
pub struct NotificationCenter {
    items: Vec<Notification>,
    lifetime: Duration,
    next_id: u64,
}

impl NotificationCenter {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            items: Vec::new(),
            lifetime,
            next_id: 1,
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Add a banner created at `now`; returns its id.
    pub fn push_at(&mut self, severity: Severity, message: impl Into<String>, now: Instant) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(Notification {
            id,
            severity,
            message: message.into(),
            created: now,
        });
        id
    }

    /// Remove expired banners; returns how many were removed.
    pub fn prune(&mut self, now: Instant) -> usize {
        let before = self.items.len();
        let lifetime = self.lifetime;
        self.items.retain(|n| n.age(now) < lifetime);
        before - self.items.len()
    }

    /// Manual dismissal from the banner's close button.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        before != self.items.len()
    }

    /// Banners still alive at `now`, oldest first.
    pub fn active(&self, now: Instant) -> impl Iterator<Item = &Notification> {
        let lifetime = self.lifetime;
        self.items.iter().filter(move |n| n.age(now) < lifetime)
    }

    pub fn all(&self) -> &[Notification] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
