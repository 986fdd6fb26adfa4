#![cfg_attr(target_arch = "wasm32", no_main)]

// DOM front-end for the marketplace Mini App.
//
// The page template (server-rendered) provides the fixed ids and the initial
// category sections; this binary binds them, wires delegated listeners and
// re-renders from the App snapshot after every action or event.

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::RefCell;
    use std::rc::Rc;

    use gloo_timers::callback::Timeout;
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::spawn_local;
    use web_sys::{window, Element, Event};

    use otcmarket::api::HttpMarketApi;
    use otcmarket::constants::dom;
    use otcmarket::debug::{self, cat};
    use otcmarket::dom::Page;
    use otcmarket::source_api::run_api_worker;
    use otcmarket::util::Instant;
    use otcmarket::webshim::TelegramHost;
    use otcmarket::{App, AppEvent, Config, UiAction, UiSnapshot};

    // Timers can fire a hair early relative to performance.now()
    const TIMER_SLACK_MS: u32 = 5;

    struct Controller {
        app: App,
        page: Page,
        search_timer: Option<Timeout>,
        expiry_scheduled_up_to: u64,
    }

    type Shared = Rc<RefCell<Controller>>;

    fn duration_ms(d: otcmarket::util::Duration) -> u32 {
        u32::try_from(d.as_millis()).unwrap_or(u32::MAX)
    }

    fn dispatch(shared: &Shared, action: UiAction) {
        let Ok(mut ctl) = shared.try_borrow_mut() else {
            // Re-entrant call from inside a render; retry once the stack unwinds
            let shared = shared.clone();
            spawn_local(async move { dispatch(&shared, action) });
            return;
        };
        debug::log(cat::HOST, format!("action {action:?}"));
        let typed = matches!(action, UiAction::SearchInput { .. });
        ctl.app.apply_action(action, Instant::now());
        if typed {
            schedule_search(&mut ctl, shared);
        }
        refresh(&mut ctl, shared);
    }

    fn on_event(shared: &Shared, ev: AppEvent) {
        let Ok(mut ctl) = shared.try_borrow_mut() else {
            let shared = shared.clone();
            spawn_local(async move { on_event(&shared, ev) });
            return;
        };
        ctl.app.on_event(ev);
        refresh(&mut ctl, shared);
    }

    /// Replace the pending search timer; dropping the old one cancels it.
    fn schedule_search(ctl: &mut Controller, shared: &Shared) {
        let Some(remaining) = ctl.app.debounce_remaining(Instant::now()) else {
            ctl.search_timer = None;
            return;
        };
        let shared = shared.clone();
        ctl.search_timer = Some(Timeout::new(
            duration_ms(remaining) + TIMER_SLACK_MS,
            move || dispatch(&shared, UiAction::Tick),
        ));
    }

    fn refresh(ctl: &mut Controller, shared: &Shared) {
        let now = Instant::now();
        let snap = UiSnapshot::from_app(&ctl.app, now);

        // One expiry tick per new banner
        let lifetime_ms = duration_ms(ctl.app.notification_lifetime()) + TIMER_SLACK_MS;
        for n in &snap.notifications {
            if n.id > ctl.expiry_scheduled_up_to {
                ctl.expiry_scheduled_up_to = n.id;
                let shared = shared.clone();
                Timeout::new(lifetime_ms, move || dispatch(&shared, UiAction::Tick)).forget();
            }
        }

        ctl.page.render(&snap);
    }

    fn listen(target: &web_sys::EventTarget, kind: &str, f: impl FnMut(Event) + 'static) {
        let closure = Closure::<dyn FnMut(Event)>::new(f);
        if let Err(e) =
            target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
        {
            log::error!("[web] addEventListener({kind}) failed: {e:?}");
        }
        closure.forget();
    }

    fn target_element(ev: &Event) -> Option<Element> {
        ev.target().and_then(|t| t.dyn_into::<Element>().ok())
    }

    /// Map a click anywhere in the document to an action.
    fn click_action(target: &Element, shared: &Shared) -> Option<UiAction> {
        let action_sel = format!("[{}]", dom::ATTR_ACTION);
        if let Some(control) = target.closest(&action_sel).ok().flatten() {
            let kind = control.get_attribute(dom::ATTR_ACTION).unwrap_or_default();
            return match kind.as_str() {
                dom::action::SEND_MESSAGE => {
                    let text = shared.try_borrow().ok()?.page.message_text();
                    Some(UiAction::SendMessage { text })
                }
                dom::action::CANCEL_MESSAGE => Some(UiAction::CancelMessage),
                dom::action::LOAD_MORE => Some(UiAction::LoadMore),
                dom::action::DISMISS_NOTIFICATION => control
                    .get_attribute(dom::ATTR_NOTIFICATION_ID)
                    .and_then(|v| v.parse().ok())
                    .map(|id| UiAction::DismissNotification { id }),
                _ => None,
            };
        }
        if target.closest(dom::PRIMARY_ACTION).ok().flatten().is_some() {
            return Some(UiAction::ContactSeller);
        }
        let card_sel = format!(".{}", dom::LISTING_CARD);
        let card = target.closest(&card_sel).ok().flatten()?;
        card.get_attribute(dom::ATTR_LISTING_ID)
            .map(|id| UiAction::OpenListing { id })
    }

    fn wire_listeners(shared: &Shared) {
        let Some(doc) = window().and_then(|w| w.document()) else {
            return;
        };

        if let Some(input) = doc.get_element_by_id(dom::SEARCH_INPUT) {
            let s = shared.clone();
            listen(&input, "input", move |_| {
                let Ok(text) = s.try_borrow().map(|c| c.page.search_value()) else {
                    return;
                };
                dispatch(&s, UiAction::SearchInput { text });
            });
        }

        if let Some(select) = doc.get_element_by_id(dom::CATEGORY_FILTER) {
            let s = shared.clone();
            listen(&select, "change", move |_| {
                let Ok(category) = s.try_borrow().map(|c| c.page.category_value()) else {
                    return;
                };
                dispatch(&s, UiAction::SetCategory { category });
            });
        }

        if let Some(modal) = doc.get_element_by_id(dom::LISTING_MODAL) {
            let s = shared.clone();
            listen(&modal, "hidden.bs.modal", move |_| dispatch(&s, UiAction::CloseModal));
        }

        // Delegated so re-rendered cards and injected forms stay live
        let s = shared.clone();
        listen(&doc, "click", move |ev| {
            let Some(target) = target_element(&ev) else {
                return;
            };
            if let Some(action) = click_action(&target, &s) {
                ev.prevent_default();
                dispatch(&s, action);
            }
        });
    }

    fn spawn_event_loop(shared: Shared, mut event_rx: UnboundedReceiver<AppEvent>) {
        spawn_local(async move {
            while let Some(ev) = event_rx.recv().await {
                on_event(&shared, ev);
            }
            log::warn!("[web] Event channel closed");
        });
    }

    #[wasm_bindgen(start)]
    pub fn wasm_start() {
        console_error_panic_hook::set_once();
        wasm_logger::init(wasm_logger::Config::default());
        debug::init_once();

        let Some(win) = window() else {
            log::error!("[web] No window");
            return;
        };
        let Some(doc) = win.document() else {
            log::error!("[web] No document");
            return;
        };
        let origin = win.location().origin().unwrap_or_default();
        let config = Config::for_origin(&origin);

        let page = match Page::bind(doc) {
            Ok(p) => p,
            Err(e) => {
                log::error!("[web] {e:#}");
                return;
            }
        };
        let api = match HttpMarketApi::new(&config) {
            Ok(api) => api,
            Err(e) => {
                log::error!("[web] HTTP client: {e:#}");
                return;
            }
        };

        let (request_tx, request_rx) = unbounded_channel();
        let (event_tx, event_rx) = unbounded_channel();
        spawn_local(async move {
            log::info!("[web] Serving API requests against {}", api.base_url());
            run_api_worker(&api, request_rx, event_tx).await;
        });

        let app = App::new(Box::new(TelegramHost), Some(request_tx), config.per_page);
        let shared: Shared = Rc::new(RefCell::new(Controller {
            app,
            page,
            search_timer: None,
            expiry_scheduled_up_to: 0,
        }));

        wire_listeners(&shared);
        spawn_event_loop(shared.clone(), event_rx);

        if let Ok(mut ctl) = shared.try_borrow_mut() {
            ctl.app.start();
            refresh(&mut ctl, &shared);
        }
    }
}

// Native builds: just provide a stub main so `cargo build --all-features` doesn't explode.
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    eprintln!("otcmarket-web-dom is only supported on wasm32 (browser) target.");
}
