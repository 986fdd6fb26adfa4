//! App core driven through the request worker against an in-memory backend

use std::cell::RefCell;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::sync::mpsc::unbounded_channel;

use otcmarket::api::MarketApi;
use otcmarket::contact::ContactState;
use otcmarket::host::StaticHost;
use otcmarket::source_api::run_api_worker;
use otcmarket::types::{
    AppEvent, Category, ContactRequest, ContactResponse, ListingDetail, ListingSummary,
    ListingsPage, SearchQuery, Seller, TelegramUser,
};
use otcmarket::App;

#[derive(Default)]
struct MemoryBackend {
    contacts: RefCell<Vec<ContactRequest>>,
}

fn listing(id: u64, category: &str) -> ListingSummary {
    ListingSummary {
        id,
        title: format!("Listing {id}"),
        description: String::new(),
        price: 10.0,
        currency: "TON".into(),
        category: category.into(),
        seller: None,
        created_at: None,
        views: None,
    }
}

#[async_trait(?Send)]
impl MarketApi for MemoryBackend {
    async fn search_listings(&self, query: &SearchQuery) -> Result<ListingsPage> {
        let all = vec![listing(1, "bots"), listing(2, "channels"), listing(3, "bots")];
        let listings = all
            .into_iter()
            .filter(|l| query.category.is_empty() || l.category == query.category)
            .collect();
        Ok(ListingsPage {
            listings,
            current_page: Some(1),
            ..Default::default()
        })
    }

    async fn get_listing(&self, id: &str) -> Result<ListingDetail> {
        if id != "42" {
            return Err(anyhow!("Listing not found"));
        }
        Ok(ListingDetail {
            id: 42,
            title: "Premium channel".into(),
            description: "10k subscribers".into(),
            price: 250.0,
            currency: "USDT".into(),
            category: "channels".into(),
            additional_info: Some("Escrow only".into()),
            created_at: "2024-03-05T10:00:00".into(),
            seller: Seller {
                first_name: "Bob".into(),
                username: Some("bob".into()),
                rating: 4.8,
            },
        })
    }

    async fn contact_seller(&self, request: &ContactRequest) -> Result<ContactResponse> {
        self.contacts.borrow_mut().push(request.clone());
        Ok(ContactResponse {
            success: true,
            message_id: Some(1),
            ..Default::default()
        })
    }

    async fn categories(&self) -> Result<Vec<Category>> {
        Ok(vec![Category {
            name: "bots".into(),
            description: Some("Telegram bots".into()),
        }])
    }
}

fn user() -> TelegramUser {
    TelegramUser {
        id: 7,
        first_name: "Anna".into(),
        last_name: None,
        username: None,
        language_code: None,
    }
}

#[tokio::test]
async fn browse_open_and_contact_through_worker() {
    let backend = MemoryBackend::default();
    let (request_tx, request_rx) = unbounded_channel();
    let (event_tx, mut event_rx) = unbounded_channel::<AppEvent>();

    let mut app = App::new(Box::new(StaticHost::new(Some(user()))), Some(request_tx), 20);

    let driver = async move {
        app.start();
        app.set_category("bots".into());
        for _ in 0..2 {
            let ev = event_rx.recv().await.expect("event");
            app.on_event(ev);
        }
        assert_eq!(app.categories().len(), 1);
        let ids: Vec<u64> = app.listings().iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![1, 3]);

        app.view_listing("42");
        let ev = event_rx.recv().await.expect("event");
        app.on_event(ev);
        assert!(app.modal_open());
        assert_eq!(app.current_listing().map(|l| l.title.as_str()), Some("Premium channel"));

        let now = otcmarket::util::Instant::now();
        app.contact_seller(now);
        app.send_message("  is it still available?  ", now);
        let ev = event_rx.recv().await.expect("event");
        app.on_event(ev);
        assert_eq!(app.contact_state(), ContactState::Idle);
        assert!(!app.modal_open());

        // Closes the request channel so the worker can finish
        drop(app);
    };

    tokio::join!(run_api_worker(&backend, request_rx, event_tx), driver);

    let sent = backend.contacts.borrow();
    assert_eq!(
        *sent,
        vec![ContactRequest {
            listing_id: 42,
            message: "is it still available?".into(),
            user_id: 7,
        }]
    );
}

#[tokio::test]
async fn missing_listing_surfaces_one_error() {
    let backend = MemoryBackend::default();
    let (request_tx, request_rx) = unbounded_channel();
    let (event_tx, mut event_rx) = unbounded_channel::<AppEvent>();
    let mut app = App::new(Box::new(StaticHost::new(None)), Some(request_tx), 20);

    let driver = async move {
        app.view_listing("999");
        let ev = event_rx.recv().await.expect("event");
        app.on_event(ev);
        assert!(!app.modal_open());
        assert_eq!(app.notifications(otcmarket::util::Instant::now()).count(), 1);
        drop(app);
    };

    tokio::join!(run_api_worker(&backend, request_rx, event_tx), driver);
}
