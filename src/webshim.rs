//! WASM-specific JavaScript bridge functions
//!
//! Bindings for `window.Telegram.WebApp` and the page's Bootstrap modal
//! widget. Only functional on WebAssembly targets; native builds get no-op
//! stand-ins so shared code can call them unconditionally.

use crate::host::HostBridge;
use crate::types::TelegramUser;

#[cfg(target_arch = "wasm32")]
use js_sys::{Function, Reflect, JSON};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{JsCast, JsValue};

#[cfg(target_arch = "wasm32")]
use web_sys::window;

// ----------------------- JS PROPERTY HELPERS (wasm32) -----------------------

#[cfg(target_arch = "wasm32")]
fn get_path(root: &JsValue, path: &[&str]) -> Option<JsValue> {
    let mut cur = root.clone();
    for key in path {
        cur = Reflect::get(&cur, &JsValue::from_str(key)).ok()?;
        if cur.is_undefined() || cur.is_null() {
            return None;
        }
    }
    Some(cur)
}

#[cfg(target_arch = "wasm32")]
fn call_method(obj: &JsValue, name: &str, args: &[JsValue]) -> bool {
    let Ok(f) = Reflect::get(obj, &JsValue::from_str(name)) else {
        return false;
    };
    let Some(f) = f.dyn_ref::<Function>() else {
        return false;
    };
    let res = match args {
        [] => f.call0(obj),
        [a] => f.call1(obj, a),
        [a, b, ..] => f.call2(obj, a, b),
    };
    if let Err(e) = &res {
        log::warn!("[webshim] {name}() threw: {e:?}");
    }
    res.is_ok()
}

// ----------------------- TELEGRAM HOST --------------------------------------

/// Host bridge backed by `window.Telegram.WebApp`.
///
/// Every call degrades to a no-op (or `None`) when the page is opened
/// outside Telegram.
#[derive(Debug, Clone, Copy, Default)]
pub struct TelegramHost;

#[cfg(target_arch = "wasm32")]
impl TelegramHost {
    fn web_app() -> Option<JsValue> {
        let win = window()?;
        get_path(&JsValue::from(win), &["Telegram", "WebApp"])
    }

    fn location_hash() -> Option<String> {
        let hash = window()?.location().hash().ok()?;
        let hash = hash.trim_start_matches('#');
        (!hash.is_empty()).then(|| format!("#{hash}"))
    }
}

#[cfg(target_arch = "wasm32")]
impl HostBridge for TelegramHost {
    fn expand(&self) {
        match Self::web_app() {
            Some(app) => {
                call_method(&app, "expand", &[]);
            }
            None => log::info!("[webshim] Telegram.WebApp not present; running standalone"),
        }
    }

    fn user(&self) -> Option<TelegramUser> {
        let app = Self::web_app()?;
        let user = get_path(&app, &["initDataUnsafe", "user"])?;
        let json = JSON::stringify(&user).ok()?.as_string()?;
        match serde_json::from_str::<TelegramUser>(&json) {
            Ok(u) => Some(u),
            Err(e) => {
                log::warn!("[webshim] Unreadable Telegram user ({e}): {json}");
                None
            }
        }
    }

    fn show_alert(&self, message: &str) {
        let shown = Self::web_app()
            .map(|app| call_method(&app, "showAlert", &[JsValue::from_str(message)]))
            .unwrap_or(false);
        if !shown {
            if let Some(win) = window() {
                let _ = win.alert_with_message(message);
            }
        }
    }

    fn start_param(&self) -> Option<String> {
        Self::web_app()
            .and_then(|app| get_path(&app, &["initDataUnsafe", "start_param"]))
            .and_then(|v| v.as_string())
            .filter(|s| !s.is_empty())
            .or_else(Self::location_hash)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl HostBridge for TelegramHost {
    fn expand(&self) {}

    fn user(&self) -> Option<TelegramUser> {
        None
    }

    fn show_alert(&self, message: &str) {
        log::info!("[webshim] alert outside browser: {message}");
    }
}

// ----------------------- BOOTSTRAP MODAL ------------------------------------

/// Show the modal through `bootstrap.Modal`, falling back to toggling the
/// `show` class when the widget library is missing.
#[cfg(target_arch = "wasm32")]
pub fn modal_show(el: &web_sys::Element) {
    if !modal_call(el, "show") {
        modal_fallback(el, true);
    }
}

#[cfg(target_arch = "wasm32")]
pub fn modal_hide(el: &web_sys::Element) {
    if !modal_call(el, "hide") {
        modal_fallback(el, false);
    }
}

#[cfg(target_arch = "wasm32")]
fn modal_fallback(el: &web_sys::Element, visible: bool) {
    let classes = el.class_list();
    let (toggled, style) = if visible {
        (classes.add_1("show"), "display: block")
    } else {
        (classes.remove_1("show"), "display: none")
    };
    if let Err(e) = toggled.and_then(|_| el.set_attribute("style", style)) {
        log::warn!("[webshim] Failed to toggle modal fallback: {e:?}");
    }
}

#[cfg(target_arch = "wasm32")]
fn modal_call(el: &web_sys::Element, method: &str) -> bool {
    let Some(win) = window() else {
        return false;
    };
    let Some(modal) = get_path(&JsValue::from(win), &["bootstrap", "Modal"]) else {
        return false;
    };
    let Ok(factory) = Reflect::get(&modal, &JsValue::from_str("getOrCreateInstance")) else {
        return false;
    };
    let Some(factory) = factory.dyn_ref::<Function>() else {
        return false;
    };
    match factory.call1(&modal, el) {
        Ok(instance) => call_method(&instance, method, &[]),
        Err(e) => {
            log::warn!("[webshim] bootstrap.Modal.getOrCreateInstance threw: {e:?}");
            false
        }
    }
}
