use serde::{Deserialize, Serialize};

/// End-user identity handed over by the Telegram host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub language_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seller {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub rating: f64,
}

/// One row of a search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingSummary {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub seller: Option<Seller>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub views: Option<u64>,
}

/// Full listing record returned by `GET /api/listings/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingDetail {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub additional_info: Option<String>,
    #[serde(default)]
    pub created_at: String,
    pub seller: Seller,
}

/// Search response with the pagination metadata the backend attaches.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ListingsPage {
    pub listings: Vec<ListingSummary>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub pages: Option<u32>,
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub has_next: bool,
    #[serde(default)]
    pub has_prev: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(alias = "title")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRequest {
    pub listing_id: u64,
    pub message: String,
    pub user_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContactResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub message_id: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Search parameters; empty values are not sent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    pub search: String,
    pub category: String,
    pub page: u32,
    pub per_page: u32,
}

impl SearchQuery {
    /// Query pairs with empty text and category dropped. Page 1 and a zero
    /// page size are left to the server defaults.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        if !self.search.is_empty() {
            out.push(("search", self.search.clone()));
        }
        if !self.category.is_empty() {
            out.push(("category", self.category.clone()));
        }
        if self.page > 1 {
            out.push(("page", self.page.to_string()));
        }
        if self.per_page > 0 {
            out.push(("per_page", self.per_page.to_string()));
        }
        out
    }
}

/// Work the core asks the request worker to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiRequest {
    Search {
        generation: u64,
        append: bool,
        query: SearchQuery,
    },
    Listing {
        generation: u64,
        id: String,
    },
    Contact {
        generation: u64,
        request: ContactRequest,
    },
    Categories,
}

/// Completed requests flowing back into the core. Errors are rendered
/// strings so events stay `Clone`.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    SearchLoaded {
        generation: u64,
        append: bool,
        result: Result<ListingsPage, String>,
    },
    ListingLoaded {
        generation: u64,
        result: Result<ListingDetail, String>,
    },
    ContactSent {
        generation: u64,
        result: Result<ContactResponse, String>,
    },
    CategoriesLoaded {
        result: Result<Vec<Category>, String>,
    },
}
