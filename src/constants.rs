//! Application constants
//!
//! Centralized timing values, HTTP paths, DOM hooks and user-facing strings
//! shared by the core and both front-ends.

/// Timing constants
pub mod timing {
    /// Quiet period after the last keystroke before a search is issued (ms)
    pub const SEARCH_DEBOUNCE_MS: u64 = 500;

    /// Lifetime of a notification banner before it is removed (ms)
    pub const NOTIFICATION_LIFETIME_MS: u64 = 5_000;
}

/// Backend HTTP API paths
pub mod api {
    pub const LISTINGS: &str = "/api/listings";
    pub const CONTACT_SELLER: &str = "/api/contact_seller";
    pub const CATEGORIES: &str = "/api/categories";

    /// Default page size sent with searches
    pub const DEFAULT_PER_PAGE: u32 = 20;
}

/// Element ids and class hooks shared with the page template
pub mod dom {
    pub const SEARCH_INPUT: &str = "searchInput";
    pub const CATEGORY_FILTER: &str = "categoryFilter";
    pub const LISTING_MODAL: &str = "listingModal";
    pub const LISTING_TITLE: &str = "listingTitle";
    pub const LISTING_CONTENT: &str = "listingContent";
    pub const MESSAGE_TEXT: &str = "messageText";

    pub const CATEGORY_SECTION: &str = "category-section";
    pub const LISTING_CARD: &str = "listing-card";
    pub const CONTACT_FORM: &str = "contact-form";

    /// Primary action control in the modal ("contact seller")
    pub const PRIMARY_ACTION: &str = ".modal-footer .btn-primary";

    /// Container inside a category section that receives the cards
    pub const SECTION_LISTINGS: &str = ".category-listings";

    pub const ATTR_LISTING_ID: &str = "data-listing-id";
    pub const ATTR_CATEGORY: &str = "data-category";
    pub const ATTR_ACTION: &str = "data-action";
    pub const ATTR_NOTIFICATION_ID: &str = "data-notification-id";

    /// Values of `data-action` on controls rendered by the crate
    pub mod action {
        pub const SEND_MESSAGE: &str = "send-message";
        pub const CANCEL_MESSAGE: &str = "cancel-message";
        pub const DISMISS_NOTIFICATION: &str = "dismiss-notification";
        pub const LOAD_MORE: &str = "load-more";
    }
}

/// User-facing message strings (the page template is Russian)
pub mod messages {
    pub const SEARCH_FAILED: &str = "Ошибка при поиске объявлений";
    pub const LISTING_FAILED: &str = "Ошибка при загрузке объявления";
    pub const MISSING_CONTEXT: &str = "Ошибка: недостаточно данных";
    pub const EMPTY_MESSAGE: &str = "Введите сообщение";
    pub const MESSAGE_SENT: &str = "Сообщение отправлено!";
    pub const MESSAGE_SENT_ALERT: &str = "Сообщение отправлено продавцу!";
    pub const MESSAGE_FAILED: &str = "Ошибка при отправке сообщения";

    pub const SELLER_HEADING: &str = "👤 Продавец";
    pub const DESCRIPTION_HEADING: &str = "📝 Описание";
    pub const PRICE_HEADING: &str = "💰 Цена";
    pub const ADDITIONAL_INFO_HEADING: &str = "ℹ️ Дополнительная информация";
    pub const CREATED_HEADING: &str = "📅 Дата создания";

    pub const CONTACT_HEADING: &str = "💬 Написать продавцу";
    pub const MESSAGE_PLACEHOLDER: &str = "Введите ваше сообщение...";
    pub const SEND_BUTTON: &str = "Отправить";
    pub const CANCEL_BUTTON: &str = "Отмена";
    pub const LOAD_MORE_BUTTON: &str = "Показать ещё";
    pub const ALL_CATEGORIES: &str = "Все категории";
}
