//! Filterable debug logging
//!
//! Categories: SEARCH, LISTING, CONTACT, NOTIFY, HOST, RENDER
//! Enable via: ?otcdebug=all or localStorage.setItem('otcmarket.debug','search,contact')
//! Native builds read the same list from OTC_DEBUG.

use std::sync::atomic::{AtomicU32, Ordering};

pub mod cat {
    pub const SEARCH: u32 = 1 << 0;
    pub const LISTING: u32 = 1 << 1;
    pub const CONTACT: u32 = 1 << 2;
    pub const NOTIFY: u32 = 1 << 3;
    pub const HOST: u32 = 1 << 4;
    pub const RENDER: u32 = 1 << 5;
    pub const ALL: u32 = 0xffff_ffff;
}

static MASK: AtomicU32 = AtomicU32::new(0);

#[inline]
pub fn mask() -> u32 {
    MASK.load(Ordering::Relaxed)
}

#[inline]
pub fn set(mask: u32) {
    MASK.store(mask, Ordering::Relaxed)
}

#[inline]
pub fn is(cat: u32) -> bool {
    (MASK.load(Ordering::Relaxed) & cat) != 0
}

#[inline]
pub fn cat_name(cat: u32) -> &'static str {
    match cat {
        c if c == cat::SEARCH => "search",
        c if c == cat::LISTING => "listing",
        c if c == cat::CONTACT => "contact",
        c if c == cat::NOTIFY => "notify",
        c if c == cat::HOST => "host",
        c if c == cat::RENDER => "render",
        _ => "misc",
    }
}

/// Parse a comma-separated category list into a mask.
pub fn parse_list(list: &str) -> u32 {
    let mut m: u32 = 0;
    for tok in list.split(',').map(|s| s.trim().to_ascii_lowercase()) {
        match tok.as_str() {
            "" | "none" => m = 0,
            "all" => m = cat::ALL,
            "search" => m |= cat::SEARCH,
            "listing" => m |= cat::LISTING,
            "contact" => m |= cat::CONTACT,
            "notify" => m |= cat::NOTIFY,
            "host" => m |= cat::HOST,
            "render" => m |= cat::RENDER,
            _ => {}
        }
    }
    m
}

#[inline]
pub fn set_from_list(list: &str) {
    set(parse_list(list));
}

#[cfg(target_arch = "wasm32")]
pub fn init_once() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        use web_sys::window;
        const STORAGE_KEY: &str = "otcmarket.debug";
        const QUERY_KEY: &str = "otcdebug";
        let Some(win) = window() else {
            return;
        };
        // localStorage first so the URL can override it
        if let Ok(Some(storage)) = win.local_storage() {
            if let Ok(Some(v)) = storage.get_item(STORAGE_KEY) {
                set_from_list(&v);
            }
        }
        if let Ok(search) = win.location().search() {
            let qs = search.trim_start_matches('?');
            for part in qs.split('&') {
                let mut it = part.splitn(2, '=');
                let key = it.next().unwrap_or_default();
                let val = it.next().unwrap_or_default();
                if key.eq_ignore_ascii_case(QUERY_KEY) {
                    if let Ok(decoded_js) = js_sys::decode_uri_component(val) {
                        set_from_list(&decoded_js.as_string().unwrap_or_default());
                    }
                }
            }
        }
        log(cat::HOST, format!("debug init (wasm) mask={:#x}", mask()));
    });
}

#[cfg(not(target_arch = "wasm32"))]
pub fn init_once() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        if let Ok(v) = std::env::var("OTC_DEBUG") {
            set_from_list(&v);
        }
    });
}

#[cfg(target_arch = "wasm32")]
#[inline]
pub fn log(cat: u32, msg: impl AsRef<str>) {
    if !is(cat) {
        return;
    }
    let s = format!("[otcmarket][{}] {}", cat_name(cat), msg.as_ref());
    web_sys::console::log_1(&wasm_bindgen::JsValue::from_str(&s));
}

#[cfg(not(target_arch = "wasm32"))]
#[inline]
pub fn log(cat: u32, msg: impl AsRef<str>) {
    if !is(cat) {
        return;
    }
    eprintln!("[otcmarket][{}] {}", cat_name(cat), msg.as_ref());
}
