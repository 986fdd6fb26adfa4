//! End-to-end flows through the App core with a captured request channel

use std::cell::RefCell;
use std::rc::Rc;

use otcmarket::constants::messages;
use otcmarket::contact::ContactState;
use otcmarket::host::HostBridge;
use otcmarket::notify::Severity;
use otcmarket::types::{
    ApiRequest, AppEvent, ContactRequest, ContactResponse, ListingDetail, ListingSummary,
    ListingsPage, SearchQuery, Seller, TelegramUser,
};
use otcmarket::util::{Duration, Instant};
use otcmarket::{App, UiAction, UiSnapshot};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

#[derive(Default)]
struct RecordingHost {
    user: Option<TelegramUser>,
    start_param: Option<String>,
    alerts: Rc<RefCell<Vec<String>>>,
    expanded: Rc<RefCell<bool>>,
}

impl HostBridge for RecordingHost {
    fn expand(&self) {
        *self.expanded.borrow_mut() = true;
    }

    fn user(&self) -> Option<TelegramUser> {
        self.user.clone()
    }

    fn show_alert(&self, message: &str) {
        self.alerts.borrow_mut().push(message.to_string());
    }

    fn start_param(&self) -> Option<String> {
        self.start_param.clone()
    }
}

struct Harness {
    app: App,
    rx: UnboundedReceiver<ApiRequest>,
    alerts: Rc<RefCell<Vec<String>>>,
    expanded: Rc<RefCell<bool>>,
}

impl Harness {
    fn new(user: Option<TelegramUser>, start_param: Option<&str>) -> Self {
        let alerts = Rc::new(RefCell::new(Vec::new()));
        let expanded = Rc::new(RefCell::new(false));
        let host = RecordingHost {
            user,
            start_param: start_param.map(String::from),
            alerts: alerts.clone(),
            expanded: expanded.clone(),
        };
        let (tx, rx) = unbounded_channel();
        let mut app = App::new(Box::new(host), Some(tx), 20);
        app.start();
        let mut h = Harness {
            app,
            rx,
            alerts,
            expanded,
        };
        // Categories load issued by start()
        assert_eq!(h.next_request(), Some(ApiRequest::Categories));
        h
    }

    fn next_request(&mut self) -> Option<ApiRequest> {
        self.rx.try_recv().ok()
    }

    fn errors(&self) -> Vec<String> {
        self.app
            .notifications(Instant::now())
            .filter(|n| n.severity == Severity::Error)
            .map(|n| n.message.clone())
            .collect()
    }

    fn open_listing(&mut self, id: &str) {
        self.app.view_listing(id);
        let Some(ApiRequest::Listing { generation, .. }) = self.next_request() else {
            panic!("expected listing request");
        };
        self.app.on_event(AppEvent::ListingLoaded {
            generation,
            result: Ok(detail(id.parse().unwrap())),
        });
    }
}

fn user(id: i64) -> TelegramUser {
    TelegramUser {
        id,
        first_name: "Anna".into(),
        last_name: None,
        username: Some("anna".into()),
        language_code: None,
    }
}

fn detail(id: u64) -> ListingDetail {
    ListingDetail {
        id,
        title: format!("Listing {id}"),
        description: "desc".into(),
        price: 100.0,
        currency: "USDT".into(),
        category: "channels".into(),
        additional_info: None,
        created_at: "2024-03-05".into(),
        seller: Seller {
            first_name: "Bob".into(),
            username: None,
            rating: 4.5,
        },
    }
}

fn summary(id: u64, category: &str) -> ListingSummary {
    ListingSummary {
        id,
        title: format!("L{id}"),
        description: String::new(),
        price: 1.0,
        currency: "TON".into(),
        category: category.into(),
        seller: None,
        created_at: None,
        views: None,
    }
}

fn page(listings: Vec<ListingSummary>, current: u32, has_next: bool) -> ListingsPage {
    ListingsPage {
        listings,
        total: None,
        pages: None,
        current_page: Some(current),
        has_next,
        has_prev: current > 1,
    }
}

#[test]
fn start_expands_and_captures_user() {
    let h = Harness::new(Some(user(7)), None);
    assert!(*h.expanded.borrow());
    assert_eq!(h.app.current_user().map(|u| u.id), Some(7));
}

#[test]
fn contact_success_sends_payload_alerts_and_closes_modal() {
    let mut h = Harness::new(Some(user(7)), None);
    h.open_listing("42");
    assert!(h.app.modal_open());

    h.app.apply_action(UiAction::ContactSeller, Instant::now());
    assert_eq!(h.app.contact_state(), ContactState::Composing { sending: false });

    h.app.apply_action(
        UiAction::SendMessage {
            text: "hello".into(),
        },
        Instant::now(),
    );
    assert_eq!(
        h.next_request(),
        Some(ApiRequest::Contact {
            generation: 1,
            request: ContactRequest {
                listing_id: 42,
                message: "hello".into(),
                user_id: 7,
            }
        })
    );

    h.app.on_event(AppEvent::ContactSent {
        generation: 1,
        result: Ok(ContactResponse {
            success: true,
            ..Default::default()
        }),
    });

    assert_eq!(h.app.contact_state(), ContactState::Idle);
    assert!(!h.app.modal_open());
    assert_eq!(*h.alerts.borrow(), vec![messages::MESSAGE_SENT_ALERT.to_string()]);
    let sent: Vec<_> = h
        .app
        .notifications(Instant::now())
        .filter(|n| n.severity == Severity::Success)
        .collect();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].message, messages::MESSAGE_SENT);
}

#[test]
fn server_confirmation_text_is_used_for_alert() {
    let mut h = Harness::new(Some(user(7)), None);
    h.open_listing("42");
    h.app.contact_seller(Instant::now());
    h.app.send_message("hi", Instant::now());
    h.next_request();
    h.app.on_event(AppEvent::ContactSent {
        generation: 1,
        result: Ok(ContactResponse {
            success: true,
            message: Some("Delivered".into()),
            ..Default::default()
        }),
    });
    assert_eq!(*h.alerts.borrow(), vec!["Delivered".to_string()]);
}

#[test]
fn contact_failure_keeps_form_open() {
    let mut h = Harness::new(Some(user(7)), None);
    h.open_listing("42");
    h.app.contact_seller(Instant::now());
    h.app.send_message("hello", Instant::now());
    assert!(h.app.contact_sending());
    h.next_request();

    h.app.on_event(AppEvent::ContactSent {
        generation: 1,
        result: Ok(ContactResponse {
            success: false,
            error: Some("seller blocked".into()),
            ..Default::default()
        }),
    });

    assert_eq!(h.app.contact_state(), ContactState::Composing { sending: false });
    assert!(h.app.modal_open());
    assert!(h.alerts.borrow().is_empty());
    assert_eq!(h.errors(), vec![messages::MESSAGE_FAILED.to_string()]);
}

#[test]
fn resend_after_cancel_ignores_abandoned_send() {
    let mut h = Harness::new(Some(user(7)), None);
    h.open_listing("42");
    h.app.contact_seller(Instant::now());
    h.app.send_message("first", Instant::now());
    let Some(ApiRequest::Contact { generation: first, .. }) = h.next_request() else {
        panic!("expected contact request");
    };
    h.app.cancel_message();
    h.app.contact_seller(Instant::now());
    h.app.send_message("second", Instant::now());
    let Some(ApiRequest::Contact {
        generation: second,
        request,
    }) = h.next_request()
    else {
        panic!("expected contact request");
    };
    assert_eq!(request.message, "second");
    assert_ne!(first, second);

    // The abandoned send times out after the new one was issued
    h.app.on_event(AppEvent::ContactSent {
        generation: first,
        result: Err("timeout".into()),
    });
    assert_eq!(h.app.contact_state(), ContactState::Composing { sending: true });
    assert!(h.errors().is_empty());

    h.app.on_event(AppEvent::ContactSent {
        generation: second,
        result: Ok(ContactResponse {
            success: true,
            ..Default::default()
        }),
    });
    assert_eq!(h.app.contact_state(), ContactState::Idle);
    assert!(!h.app.modal_open());
    assert_eq!(*h.alerts.borrow(), vec![messages::MESSAGE_SENT_ALERT.to_string()]);
}

#[test]
fn late_contact_result_after_close_notifies_without_reopening() {
    let mut h = Harness::new(Some(user(7)), None);
    h.open_listing("42");
    h.app.contact_seller(Instant::now());
    h.app.send_message("hello", Instant::now());
    let Some(ApiRequest::Contact { generation, .. }) = h.next_request() else {
        panic!("expected contact request");
    };
    h.app.close_modal();

    h.app.on_event(AppEvent::ContactSent {
        generation,
        result: Ok(ContactResponse {
            success: true,
            ..Default::default()
        }),
    });
    assert_eq!(h.app.contact_state(), ContactState::Idle);
    assert!(!h.app.modal_open());
    assert_eq!(*h.alerts.borrow(), vec![messages::MESSAGE_SENT_ALERT.to_string()]);
    let sent = h
        .app
        .notifications(Instant::now())
        .filter(|n| n.severity == Severity::Success)
        .count();
    assert_eq!(sent, 1);
}

#[test]
fn action_banners_use_the_supplied_clock() {
    let mut h = Harness::new(Some(user(7)), None);
    h.open_listing("42");
    // A clock well ahead of the wall clock
    let t0 = Instant::now() + Duration::from_secs(60);
    h.app.apply_action(UiAction::ContactSeller, t0);
    h.app.apply_action(UiAction::SendMessage { text: " ".into() }, t0);

    let at = t0 + Duration::from_millis(4_900);
    assert_eq!(h.app.notifications(at).count(), 1);
    h.app.tick(t0 + Duration::from_secs(5));
    assert_eq!(h.app.notifications(t0 + Duration::from_secs(5)).count(), 0);
}

#[test]
fn compose_without_user_reports_missing_context() {
    let mut h = Harness::new(None, None);
    h.open_listing("42");
    h.app.contact_seller(Instant::now());
    assert_eq!(h.app.contact_state(), ContactState::Idle);
    assert_eq!(h.errors(), vec![messages::MISSING_CONTEXT.to_string()]);
}

#[test]
fn whitespace_message_warns_without_request() {
    let mut h = Harness::new(Some(user(7)), None);
    h.open_listing("42");
    h.app.contact_seller(Instant::now());
    h.app.send_message("   \n", Instant::now());
    assert_eq!(h.next_request(), None);
    let warnings: Vec<_> = h
        .app
        .notifications(Instant::now())
        .filter(|n| n.severity == Severity::Warning)
        .map(|n| n.message.clone())
        .collect();
    assert_eq!(warnings, vec![messages::EMPTY_MESSAGE.to_string()]);
    assert_eq!(h.app.contact_state(), ContactState::Composing { sending: false });
}

#[test]
fn closing_modal_resets_contact_flow() {
    let mut h = Harness::new(Some(user(7)), None);
    h.open_listing("42");
    h.app.contact_seller(Instant::now());
    h.app.apply_action(UiAction::CloseModal, Instant::now());
    assert!(!h.app.modal_open());
    assert_eq!(h.app.contact_state(), ContactState::Idle);
}

#[test]
fn debounced_typing_issues_one_search_after_quiet_period() {
    let mut h = Harness::new(None, None);
    let t0 = Instant::now();
    for (i, text) in ["b", "bo", "bot"].iter().enumerate() {
        let at = t0 + Duration::from_millis(100 * i as u64);
        h.app.apply_action(UiAction::SearchInput { text: text.to_string() }, at);
    }

    // 400 ms after the last keystroke: still quiet
    h.app.tick(t0 + Duration::from_millis(600));
    assert_eq!(h.next_request(), None);
    assert!(h.app.search_pending());

    h.app.tick(t0 + Duration::from_millis(700));
    match h.next_request() {
        Some(ApiRequest::Search { query, append, .. }) => {
            assert!(!append);
            assert_eq!(query.search, "bot");
            assert_eq!(query.page, 1);
        }
        other => panic!("expected search, got {other:?}"),
    }
    assert_eq!(h.next_request(), None);

    // Debounce does not re-fire
    h.app.tick(t0 + Duration::from_secs(5));
    assert_eq!(h.next_request(), None);
}

#[test]
fn category_change_searches_immediately_and_cancels_pending_typing() {
    let mut h = Harness::new(None, None);
    let t0 = Instant::now();
    h.app.set_search_text("gift".into(), t0);
    h.app.set_category("channels".into());

    let Some(ApiRequest::Search { query, .. }) = h.next_request() else {
        panic!("expected search");
    };
    assert_eq!(query.search, "gift");
    assert_eq!(query.category, "channels");

    h.app.tick(t0 + Duration::from_secs(1));
    assert_eq!(h.next_request(), None);
}

#[test]
fn search_results_are_grouped_by_first_occurrence() {
    let mut h = Harness::new(None, None);
    h.app.perform_search();
    let Some(ApiRequest::Search { generation, .. }) = h.next_request() else {
        panic!("expected search");
    };
    h.app.on_event(AppEvent::SearchLoaded {
        generation,
        append: false,
        result: Ok(page(
            vec![summary(1, "bots"), summary(2, "channels"), summary(3, "bots")],
            1,
            false,
        )),
    });

    let snap = UiSnapshot::from_app(&h.app, Instant::now());
    let cats: Vec<&str> = snap.groups.iter().map(|g| g.category.as_str()).collect();
    assert_eq!(cats, vec!["bots", "channels"]);
    assert_eq!(snap.groups[0].listings.len(), 2);
    assert_eq!(snap.listings_version, 1);
}

#[test]
fn search_failure_keeps_previous_results() {
    let mut h = Harness::new(None, None);
    h.app.perform_search();
    let Some(ApiRequest::Search { generation, .. }) = h.next_request() else {
        panic!("expected search");
    };
    h.app.on_event(AppEvent::SearchLoaded {
        generation,
        append: false,
        result: Ok(page(vec![summary(1, "bots")], 1, false)),
    });

    h.app.perform_search();
    let Some(ApiRequest::Search { generation, .. }) = h.next_request() else {
        panic!("expected search");
    };
    h.app.on_event(AppEvent::SearchLoaded {
        generation,
        append: false,
        result: Err("connection refused".into()),
    });

    assert_eq!(h.app.listings().len(), 1);
    assert_eq!(h.app.listings_version(), 1);
    assert_eq!(h.errors(), vec![messages::SEARCH_FAILED.to_string()]);
}

#[test]
fn stale_search_response_is_dropped() {
    let mut h = Harness::new(None, None);
    h.app.set_filters("old".into(), String::new());
    h.app.perform_search();
    let Some(ApiRequest::Search { generation: old, .. }) = h.next_request() else {
        panic!("expected search");
    };
    h.app.set_filters("new".into(), String::new());
    h.app.perform_search();
    let Some(ApiRequest::Search { generation: new, .. }) = h.next_request() else {
        panic!("expected search");
    };

    // Newer response lands first, older one afterwards
    h.app.on_event(AppEvent::SearchLoaded {
        generation: new,
        append: false,
        result: Ok(page(vec![summary(2, "channels")], 1, false)),
    });
    h.app.on_event(AppEvent::SearchLoaded {
        generation: old,
        append: false,
        result: Ok(page(vec![summary(1, "bots")], 1, false)),
    });

    let ids: Vec<u64> = h.app.listings().iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![2]);
}

#[test]
fn stale_listing_response_is_dropped() {
    let mut h = Harness::new(None, None);
    h.app.view_listing("1");
    let Some(ApiRequest::Listing { generation: first, .. }) = h.next_request() else {
        panic!("expected listing request");
    };
    h.app.view_listing("2");
    let Some(ApiRequest::Listing { generation: second, .. }) = h.next_request() else {
        panic!("expected listing request");
    };

    h.app.on_event(AppEvent::ListingLoaded {
        generation: second,
        result: Ok(detail(2)),
    });
    h.app.on_event(AppEvent::ListingLoaded {
        generation: first,
        result: Ok(detail(1)),
    });
    assert_eq!(h.app.current_listing().map(|l| l.id), Some(2));
    assert_eq!(h.app.detail_version(), 1);
}

#[test]
fn load_more_appends_next_page_of_applied_query() {
    let mut h = Harness::new(None, None);
    h.app.set_filters("bot".into(), String::new());
    h.app.perform_search();
    let Some(ApiRequest::Search { generation, .. }) = h.next_request() else {
        panic!("expected search");
    };
    h.app.on_event(AppEvent::SearchLoaded {
        generation,
        append: false,
        result: Ok(page(vec![summary(1, "bots")], 1, true)),
    });

    // Typing after the results arrived does not change the paged query
    h.app.set_search_text("other".into(), Instant::now());
    h.app.apply_action(UiAction::LoadMore, Instant::now());
    match h.next_request() {
        Some(ApiRequest::Search {
            generation,
            append: true,
            query,
        }) => {
            assert_eq!(
                query,
                SearchQuery {
                    search: "bot".into(),
                    category: String::new(),
                    page: 2,
                    per_page: 20,
                }
            );
            h.app.on_event(AppEvent::SearchLoaded {
                generation,
                append: true,
                result: Ok(page(vec![summary(2, "channels"), summary(3, "bots")], 2, false)),
            });
        }
        other => panic!("expected appended search, got {other:?}"),
    }

    assert_eq!(h.app.listings().len(), 3);
    assert_eq!(h.app.groups()[0].listings.len(), 2);
    assert!(!h.app.page_info().is_some_and(|p| p.has_next));

    // Last page reached
    h.app.load_more();
    assert_eq!(h.next_request(), None);
}

#[test]
fn start_param_opens_listing() {
    let mut h = Harness::new(Some(user(7)), Some("listing_42"));
    assert_eq!(
        h.next_request(),
        Some(ApiRequest::Listing {
            generation: 1,
            id: "42".into()
        })
    );
}

#[test]
fn start_param_selects_category() {
    let mut h = Harness::new(None, Some("category_channels"));
    let Some(ApiRequest::Search { query, .. }) = h.next_request() else {
        panic!("expected search");
    };
    assert_eq!(query.category, "channels");
    assert_eq!(h.app.category(), "channels");
}

#[test]
fn notifications_expire_on_tick() {
    let mut h = Harness::new(None, None);
    let t0 = Instant::now();
    h.app.notify_at(Severity::Info, "one", t0);
    h.app.notify_at(Severity::Info, "two", t0 + Duration::from_secs(2));

    h.app.tick(t0 + Duration::from_secs(5));
    let left: Vec<String> = h
        .app
        .notifications(t0 + Duration::from_secs(5))
        .map(|n| n.message.clone())
        .collect();
    assert_eq!(left, vec!["two".to_string()]);
}

#[test]
fn dismiss_removes_banner() {
    let mut h = Harness::new(None, None);
    let t0 = Instant::now();
    h.app.notify_at(Severity::Warning, "w", t0);
    let id = h.app.notifications(t0).next().map(|n| n.id).unwrap();
    h.app.apply_action(UiAction::DismissNotification { id }, t0);
    assert_eq!(h.app.notifications(t0).count(), 0);
}
