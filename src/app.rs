use tokio::sync::mpsc::UnboundedSender;

use crate::constants::{messages, timing};
use crate::contact::{ContactError, ContactFlow, ContactState, SendOutcome};
use crate::debug::{self, cat};
use crate::grouping::{group_by_category, CategoryGroup};
use crate::host::HostBridge;
use crate::notify::{Notification, NotificationCenter, Severity};
use crate::router::{self, Route};
use crate::types::{
    ApiRequest, AppEvent, Category, ContactResponse, ListingDetail, ListingSummary, ListingsPage,
    SearchQuery, TelegramUser,
};
use crate::ui_snapshot::{PageInfo, UiAction};
use crate::util::debounce::Debounce;
use crate::util::{Duration, Instant};

/// Headless marketplace view controller.
///
/// Owns every piece of UI state. Network work is requested over
/// `request_tx` and completes through [`App::on_event`]; each search, listing
/// and contact request carries a generation number so only the response to
/// the most recently issued request is applied.
pub struct App {
    host: Box<dyn HostBridge>,
    request_tx: Option<UnboundedSender<ApiRequest>>,
    per_page: u32,

    current_user: Option<TelegramUser>,
    current_listing: Option<ListingDetail>,

    // Search state
    search_text: String,
    category: String,
    search_debounce: Debounce,
    search_generation: u64,
    search_loading: bool,
    issued_query: Option<SearchQuery>,  // query of the latest issued search
    applied_query: Option<SearchQuery>, // query behind the displayed results
    listings: Vec<ListingSummary>,
    groups: Vec<CategoryGroup>,
    page: Option<PageInfo>,
    listings_version: u64,

    categories: Vec<Category>,
    categories_version: u64,

    // Detail modal state
    listing_generation: u64,
    detail_version: u64,
    modal_open: bool,

    contact: ContactFlow,
    notifications: NotificationCenter,
}

impl App {
    pub fn new(
        host: Box<dyn HostBridge>,
        request_tx: Option<UnboundedSender<ApiRequest>>,
        per_page: u32,
    ) -> Self {
        Self {
            host,
            request_tx,
            per_page,
            current_user: None,
            current_listing: None,
            search_text: String::new(),
            category: String::new(),
            search_debounce: Debounce::new(Duration::from_millis(timing::SEARCH_DEBOUNCE_MS)),
            search_generation: 0,
            search_loading: false,
            issued_query: None,
            applied_query: None,
            listings: Vec::new(),
            groups: Vec::new(),
            page: None,
            listings_version: 0,
            categories: Vec::new(),
            categories_version: 0,
            listing_generation: 0,
            detail_version: 0,
            modal_open: false,
            contact: ContactFlow::default(),
            notifications: NotificationCenter::new(Duration::from_millis(
                timing::NOTIFICATION_LIFETIME_MS,
            )),
        }
    }

    /// Page-load initialisation: expand the viewport, capture the user,
    /// load categories and apply the launch route.
    pub fn start(&mut self) {
        self.host.expand();
        self.current_user = self.host.user();
        match &self.current_user {
            Some(u) => log::info!("[app] Telegram user {} ({})", u.id, u.first_name),
            None => log::warn!("[app] No Telegram user; contacting sellers is disabled"),
        }

        self.request(ApiRequest::Categories);

        if let Some(param) = self.host.start_param() {
            match router::parse(&param) {
                Some(route) => self.apply_route(route),
                None => log::warn!("[app] Ignoring malformed start parameter {param:?}"),
            }
        }
    }

    pub fn apply_route(&mut self, route: Route) {
        debug::log(cat::SEARCH, format!("route {route:?}"));
        match route {
            Route::Home => {}
            Route::Listing { id } => self.view_listing(&id),
            Route::Category { name } => self.set_category(name),
            Route::Search { text } => {
                self.search_text = text;
                self.perform_search();
            }
        }
    }

    // ----- getters -----
    pub fn current_user(&self) -> Option<&TelegramUser> {
        self.current_user.as_ref()
    }
    pub fn current_listing(&self) -> Option<&ListingDetail> {
        self.current_listing.as_ref()
    }
    pub fn search_text(&self) -> &str {
        &self.search_text
    }
    pub fn category(&self) -> &str {
        &self.category
    }
    pub fn search_pending(&self) -> bool {
        self.search_debounce.is_pending()
    }
    pub fn search_loading(&self) -> bool {
        self.search_loading
    }
    pub fn listings(&self) -> &[ListingSummary] {
        &self.listings
    }
    pub fn groups(&self) -> &[CategoryGroup] {
        &self.groups
    }
    pub fn page_info(&self) -> Option<PageInfo> {
        self.page
    }
    pub fn listings_version(&self) -> u64 {
        self.listings_version
    }
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }
    pub fn categories_version(&self) -> u64 {
        self.categories_version
    }
    pub fn detail_version(&self) -> u64 {
        self.detail_version
    }
    pub fn modal_open(&self) -> bool {
        self.modal_open
    }
    pub fn contact_state(&self) -> ContactState {
        self.contact.state()
    }
    pub fn contact_sending(&self) -> bool {
        self.contact.is_sending()
    }

    /// Notifications still alive at `now`.
    pub fn notifications(&self, now: Instant) -> impl Iterator<Item = &Notification> {
        self.notifications.active(now)
    }

    /// Time until the debounced search fires, `None` when nothing is pending.
    pub fn debounce_remaining(&self, now: Instant) -> Option<Duration> {
        self.search_debounce.remaining(now)
    }

    pub fn notification_lifetime(&self) -> Duration {
        self.notifications.lifetime()
    }

    // ----- actions -----
    pub fn apply_action(&mut self, action: UiAction, now: Instant) {
        match action {
            UiAction::SearchInput { text } => self.set_search_text(text, now),
            UiAction::SetCategory { category } => self.set_category(category),
            UiAction::Tick => self.tick(now),
            UiAction::LoadMore => self.load_more(),
            UiAction::OpenListing { id } => self.view_listing(&id),
            UiAction::ContactSeller => self.contact_seller(now),
            UiAction::SendMessage { text } => self.send_message(&text, now),
            UiAction::CancelMessage => self.cancel_message(),
            UiAction::CloseModal => self.close_modal(),
            UiAction::DismissNotification { id } => {
                self.notifications.dismiss(id);
            }
        }
    }

    /// Search box edit; the search itself waits for the quiet period.
    pub fn set_search_text(&mut self, text: String, now: Instant) {
        self.search_text = text;
        self.search_debounce.trigger(now);
    }

    /// Category change searches immediately.
    pub fn set_category(&mut self, category: String) {
        self.category = category;
        self.perform_search();
    }

    /// Fire due debounced work and expire old notifications.
    pub fn tick(&mut self, now: Instant) {
        if self.search_debounce.fire(now) {
            self.perform_search();
        }
        let expired = self.notifications.prune(now);
        if expired > 0 {
            debug::log(cat::NOTIFY, format!("expired {expired} notification(s)"));
        }
    }

    /// Replace both filters without searching.
    pub fn set_filters(&mut self, text: String, category: String) {
        self.search_text = text;
        self.category = category;
    }

    /// Issue a first-page search with the current inputs.
    pub fn perform_search(&mut self) {
        self.search_page(1);
    }

    /// Search the current inputs starting at `page`, replacing the results.
    pub fn search_page(&mut self, page: u32) {
        self.search_debounce.cancel();
        let query = SearchQuery {
            search: self.search_text.clone(),
            category: self.category.clone(),
            page: page.max(1),
            per_page: self.per_page,
        };
        self.issue_search(query, false);
    }

    /// Append the next page of the displayed results.
    pub fn load_more(&mut self) {
        let (Some(page), Some(applied)) = (self.page, self.applied_query.as_ref()) else {
            return;
        };
        if !page.has_next {
            return;
        }
        let query = SearchQuery {
            page: page.current_page + 1,
            ..applied.clone()
        };
        self.issue_search(query, true);
    }

    fn issue_search(&mut self, query: SearchQuery, append: bool) {
        self.search_generation += 1;
        let generation = self.search_generation;
        debug::log(cat::SEARCH, format!("search #{generation} {:?}", query.params()));
        self.issued_query = Some(query.clone());
        self.search_loading = self.request(ApiRequest::Search {
            generation,
            append,
            query,
        });
    }

    pub fn view_listing(&mut self, id: &str) {
        self.listing_generation += 1;
        let generation = self.listing_generation;
        debug::log(cat::LISTING, format!("open listing {id} (#{generation})"));
        self.request(ApiRequest::Listing {
            generation,
            id: id.to_string(),
        });
    }

    /// Open the message form for the current listing.
    pub fn contact_seller(&mut self, now: Instant) {
        match self
            .contact
            .open(self.current_listing.as_ref(), self.current_user.as_ref())
        {
            Ok(()) => debug::log(cat::CONTACT, "compose"),
            Err(e) => {
                log::warn!("[app] Cannot contact seller: {e}");
                self.notify_at(Severity::Error, messages::MISSING_CONTEXT, now);
            }
        }
    }

    pub fn send_message(&mut self, text: &str, now: Instant) {
        let submitted = self.contact.submit(
            self.current_listing.as_ref(),
            self.current_user.as_ref(),
            text,
        );
        match submitted {
            Ok(request) => {
                let generation = self.contact.generation();
                debug::log(
                    cat::CONTACT,
                    format!("send #{generation} for listing {}", request.listing_id),
                );
                if !self.request(ApiRequest::Contact {
                    generation,
                    request,
                }) {
                    self.contact
                        .complete(generation, &Err("request worker unavailable".to_string()));
                    self.notify_at(Severity::Error, messages::MESSAGE_FAILED, now);
                }
            }
            Err(ContactError::EmptyMessage) => {
                self.notify_at(Severity::Warning, messages::EMPTY_MESSAGE, now);
            }
            Err(ContactError::MissingContext) => {
                self.notify_at(Severity::Error, messages::MISSING_CONTEXT, now);
            }
            Err(e @ (ContactError::NotComposing | ContactError::AlreadySending)) => {
                debug::log(cat::CONTACT, format!("submit ignored: {e}"));
            }
        }
    }

    pub fn cancel_message(&mut self) {
        self.contact.cancel();
    }

    /// Modal closed; any open contact form goes with it.
    pub fn close_modal(&mut self) {
        self.modal_open = false;
        self.contact.cancel();
    }

    /// Raise a banner stamped with the current time. Used for responses,
    /// which carry no clock of their own.
    pub fn notify(&mut self, severity: Severity, message: &str) {
        self.notify_at(severity, message, Instant::now());
    }

    pub fn notify_at(&mut self, severity: Severity, message: &str, now: Instant) {
        let id = self.notifications.push_at(severity, message, now);
        debug::log(cat::NOTIFY, format!("#{id} {severity:?}: {message}"));
    }

    // ----- requests and events -----
    fn request(&self, req: ApiRequest) -> bool {
        match &self.request_tx {
            Some(tx) => match tx.send(req) {
                Ok(()) => true,
                Err(e) => {
                    log::error!("[app] Request worker gone, dropped {:?}", e.0);
                    false
                }
            },
            None => {
                log::warn!("[app] No request worker, dropped {req:?}");
                false
            }
        }
    }

    pub fn on_event(&mut self, ev: AppEvent) {
        match ev {
            AppEvent::SearchLoaded {
                generation,
                append,
                result,
            } => self.on_search_loaded(generation, append, result),
            AppEvent::ListingLoaded { generation, result } => {
                self.on_listing_loaded(generation, result)
            }
            AppEvent::ContactSent { generation, result } => {
                self.on_contact_sent(generation, result)
            }
            AppEvent::CategoriesLoaded { result } => match result {
                Ok(categories) => {
                    self.categories = categories;
                    self.categories_version += 1;
                }
                // Template options stay in place
                Err(e) => log::warn!("[app] Failed to load categories: {e}"),
            },
        }
    }

    fn on_search_loaded(
        &mut self,
        generation: u64,
        append: bool,
        result: Result<ListingsPage, String>,
    ) {
        if generation != self.search_generation {
            debug::log(
                cat::SEARCH,
                format!("drop stale search #{generation} (latest #{})", self.search_generation),
            );
            return;
        }
        self.search_loading = false;

        match result {
            Ok(page) => {
                let current_page = page.current_page.unwrap_or(1);
                self.page = Some(PageInfo {
                    current_page,
                    pages: page.pages,
                    total: page.total,
                    has_next: page.has_next,
                });
                if append {
                    self.listings.extend(page.listings);
                } else {
                    self.listings = page.listings;
                }
                self.groups = group_by_category(&self.listings);
                self.applied_query = self.issued_query.clone();
                self.listings_version += 1;
                log::info!(
                    "[app] {} listing(s) in {} categor{}",
                    self.listings.len(),
                    self.groups.len(),
                    if self.groups.len() == 1 { "y" } else { "ies" }
                );
            }
            Err(e) => {
                log::error!("[app] Search failed: {e}");
                self.notify(Severity::Error, messages::SEARCH_FAILED);
            }
        }
    }

    fn on_listing_loaded(&mut self, generation: u64, result: Result<ListingDetail, String>) {
        if generation != self.listing_generation {
            debug::log(
                cat::LISTING,
                format!("drop stale listing #{generation} (latest #{})", self.listing_generation),
            );
            return;
        }

        match result {
            Ok(listing) => {
                log::info!("[app] Opened listing {} {:?}", listing.id, listing.title);
                self.current_listing = Some(listing);
                self.contact.cancel();
                self.modal_open = true;
                self.detail_version += 1;
            }
            Err(e) => {
                log::error!("[app] Failed to load listing: {e}");
                self.notify(Severity::Error, messages::LISTING_FAILED);
            }
        }
    }

    fn on_contact_sent(&mut self, generation: u64, result: Result<ContactResponse, String>) {
        let was_sending = self.contact.is_sending();
        let Some(outcome) = self.contact.complete(generation, &result) else {
            debug::log(
                cat::CONTACT,
                format!(
                    "drop stale send #{generation} (latest #{})",
                    self.contact.generation()
                ),
            );
            return;
        };
        match outcome {
            SendOutcome::Sent { confirmation } => {
                log::info!("[app] Message delivered to seller");
                self.notify(Severity::Success, messages::MESSAGE_SENT);
                let alert = confirmation
                    .filter(|c| !c.is_empty())
                    .unwrap_or_else(|| messages::MESSAGE_SENT_ALERT.to_string());
                self.host.show_alert(&alert);
                if was_sending {
                    self.modal_open = false;
                }
            }
            SendOutcome::Failed { reason } => {
                log::error!("[app] Failed to send message: {reason}");
                self.notify(Severity::Error, messages::MESSAGE_FAILED);
            }
        }
    }
}
