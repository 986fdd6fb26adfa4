//! Host runtime bridge
//!
//! The Mini App runs inside Telegram, which provides the end-user identity,
//! viewport control and native alerts. The core only talks to this trait;
//! `webshim::TelegramHost` implements it in the browser and `StaticHost`
//! stands in for it on the terminal.

use crate::types::TelegramUser;

pub trait HostBridge {
    /// Ask the host to expand the Mini App to full height.
    fn expand(&self);

    /// Identity of the end user, if the host supplied one.
    fn user(&self) -> Option<TelegramUser>;

    /// Blocking native acknowledgment dialog.
    fn show_alert(&self, message: &str);

    /// Launch parameter (`start_param` or location hash) for deep links.
    fn start_param(&self) -> Option<String> {
        None
    }
}

/// Host with a fixed identity; alerts go to the log and stderr.
#[derive(Debug, Clone, Default)]
pub struct StaticHost {
    user: Option<TelegramUser>,
    start_param: Option<String>,
}

impl StaticHost {
    pub fn new(user: Option<TelegramUser>) -> Self {
        Self {
            user,
            start_param: None,
        }
    }

    pub fn with_start_param(mut self, param: impl Into<String>) -> Self {
        self.start_param = Some(param.into());
        self
    }
}

impl HostBridge for StaticHost {
    fn expand(&self) {}

    fn user(&self) -> Option<TelegramUser> {
        self.user.clone()
    }

    fn show_alert(&self, message: &str) {
        log::info!("[host] alert: {message}");
        eprintln!("{message}");
    }

    fn start_param(&self) -> Option<String> {
        self.start_param.clone()
    }
}
