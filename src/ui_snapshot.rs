//! UI snapshot and action types
//!
//! This module provides the boundary between the headless App core and the
//! front-ends: actions flow in, serializable snapshots flow out. Version
//! counters let a renderer skip fragments that did not change.

use serde::{Deserialize, Serialize};

use crate::app::App;
use crate::contact::ContactState;
use crate::grouping::CategoryGroup;
use crate::notify::NotificationView;
use crate::types::{Category, ListingDetail, TelegramUser};
use crate::util::Instant;

/// User intents the front-ends feed into the core.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum UiAction {
    /// Search box edited (debounced).
    SearchInput { text: String },
    /// Category selector changed (immediate).
    SetCategory { category: String },
    /// Timer callback: fire due debounced work, expire notifications.
    Tick,
    /// Fetch the next result page and append it.
    LoadMore,
    /// Listing card clicked.
    OpenListing { id: String },
    /// Primary modal action: open the contact form.
    ContactSeller,
    /// Contact form submitted with the textarea contents.
    SendMessage { text: String },
    CancelMessage,
    /// Modal closed by the user or the widget library.
    CloseModal,
    DismissNotification { id: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub current_page: u32,
    pub pages: Option<u32>,
    pub total: Option<u64>,
    pub has_next: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchState {
    pub text: String,
    pub category: String,
    /// A debounced search is waiting for the quiet period
    pub pending: bool,
    /// A search request is in flight
    pub loading: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModalState {
    pub open: bool,
    pub title: Option<String>,
    pub listing: Option<ListingDetail>,
    /// Bumped every time a listing is loaded into the modal
    pub detail_version: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UiSnapshot {
    pub user: Option<TelegramUser>,
    pub search: SearchState,
    pub categories: Vec<Category>,
    pub categories_version: u64,
    pub groups: Vec<CategoryGroup>,
    pub listings_version: u64,
    pub page: Option<PageInfo>,
    pub modal: ModalState,
    pub contact: ContactState,
    pub notifications: Vec<NotificationView>,
}

impl UiSnapshot {
    pub fn from_app(app: &App, now: Instant) -> Self {
        let listing = app.current_listing().cloned();
        UiSnapshot {
            user: app.current_user().cloned(),
            search: SearchState {
                text: app.search_text().to_string(),
                category: app.category().to_string(),
                pending: app.search_pending(),
                loading: app.search_loading(),
            },
            categories: app.categories().to_vec(),
            categories_version: app.categories_version(),
            groups: app.groups().to_vec(),
            listings_version: app.listings_version(),
            page: app.page_info(),
            modal: ModalState {
                open: app.modal_open(),
                title: listing.as_ref().map(|l| l.title.clone()),
                listing,
                detail_version: app.detail_version(),
            },
            contact: app.contact_state(),
            notifications: app.notifications(now).map(|n| n.view()).collect(),
        }
    }
}
