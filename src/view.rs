//! Typed UI trees
//!
//! Render functions turn view-models into `Node` trees. The DOM front-end
//! materializes them with `createElement`/`textContent`, so listing data is
//! never interpreted as markup. The CLI prints them with [`Node::to_text`].

use crate::constants::{dom, messages};
use crate::format::{format_created_date, format_price, format_rating, seller_display};
use crate::grouping::CategoryGroup;
use crate::notify::NotificationView;
use crate::types::{Category, ListingDetail, ListingSummary};

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: &'static str,
    pub classes: Vec<&'static str>,
    pub attrs: Vec<(&'static str, String)>,
    pub children: Vec<Node>,
}

/// Start an element builder.
pub fn el(tag: &'static str) -> Element {
    Element {
        tag,
        classes: Vec::new(),
        attrs: Vec::new(),
        children: Vec::new(),
    }
}

impl Element {
    /// Add one or more space-separated classes.
    pub fn class(mut self, classes: &'static str) -> Self {
        self.classes.extend(classes.split_whitespace());
        self
    }

    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((name, value.into()));
        self
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(nodes);
        self
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(Node::Text(text.into()))
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| *c == class)
    }
}

impl From<Element> for Node {
    fn from(e: Element) -> Self {
        Node::Element(e)
    }
}

fn is_block(tag: &str) -> bool {
    matches!(tag, "div" | "p" | "h5" | "h6" | "section" | "option" | "button")
}

impl Node {
    /// Concatenated text of the subtree (like DOM `textContent`).
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out, false);
        out
    }

    /// Text with block-level elements on their own lines, for terminals.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out, true);
        out.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn collect_text(&self, out: &mut String, lines: bool) {
        match self {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) => {
                let block = lines && is_block(e.tag);
                if block {
                    out.push('\n');
                }
                for (i, child) in e.children.iter().enumerate() {
                    if lines && i > 0 && !block {
                        out.push(' ');
                    }
                    child.collect_text(out, lines);
                }
                if block {
                    out.push('\n');
                }
            }
        }
    }

    /// First element in document order carrying `class`.
    pub fn find_class(&self, class: &str) -> Option<&Element> {
        match self {
            Node::Text(_) => None,
            Node::Element(e) => {
                if e.has_class(class) {
                    return Some(e);
                }
                e.children.iter().find_map(|c| c.find_class(class))
            }
        }
    }
}

/// Modal body for an opened listing.
pub fn listing_detail(listing: &ListingDetail) -> Vec<Node> {
    let mut nodes = vec![
        el("div")
            .class("seller-info")
            .child(el("h6").text(messages::SELLER_HEADING))
            .child(
                el("div")
                    .class("d-flex justify-content-between")
                    .child(el("span").text(seller_display(&listing.seller)))
                    .child(
                        el("span")
                            .class("rating")
                            .text(format!("⭐ {}", format_rating(listing.seller.rating))),
                    ),
            )
            .into(),
        section(
            messages::DESCRIPTION_HEADING,
            el("p").text(listing.description.clone()),
        ),
        section(
            messages::PRICE_HEADING,
            el("span")
                .class("price")
                .text(format_price(listing.price, &listing.currency)),
        ),
    ];

    if let Some(info) = listing.additional_info.as_deref().filter(|s| !s.is_empty()) {
        nodes.push(section(
            messages::ADDITIONAL_INFO_HEADING,
            el("p").text(info),
        ));
    }

    nodes.push(section(
        messages::CREATED_HEADING,
        el("small")
            .class("text-muted")
            .text(format_created_date(&listing.created_at)),
    ));
    nodes
}

fn section(heading: &'static str, body: Element) -> Node {
    el("div")
        .class("mb-3")
        .child(el("h6").text(heading))
        .child(body)
        .into()
}

/// Clickable card inside a category section.
pub fn listing_card(listing: &ListingSummary) -> Node {
    let mut card = el("div")
        .class("card listing-card mb-2")
        .attr(dom::ATTR_LISTING_ID, listing.id.to_string())
        .child(el("h6").class("card-title").text(listing.title.clone()))
        .child(
            el("span")
                .class("price")
                .text(format_price(listing.price, &listing.currency)),
        );
    if let Some(seller) = &listing.seller {
        card = card.child(
            el("small")
                .class("text-muted")
                .text(format!("{} ⭐ {}", seller_display(seller), format_rating(seller.rating))),
        );
    }
    card.into()
}

pub fn category_cards(group: &CategoryGroup) -> Vec<Node> {
    group.listings.iter().map(listing_card).collect()
}

/// Section created when the template has none for a category.
pub fn category_section(group: &CategoryGroup) -> Node {
    el("section")
        .class("category-section")
        .attr(dom::ATTR_CATEGORY, group.category.clone())
        .child(el("h5").text(group.category.clone()))
        .child(el("div").class("category-listings").children(category_cards(group)))
        .into()
}

/// Message form injected under the listing details.
pub fn contact_form() -> Node {
    el("div")
        .class("contact-form")
        .child(el("h6").text(messages::CONTACT_HEADING))
        .child(
            el("div").class("mb-3").child(
                el("textarea")
                    .class("form-control")
                    .attr("id", dom::MESSAGE_TEXT)
                    .attr("rows", "3")
                    .attr("placeholder", messages::MESSAGE_PLACEHOLDER),
            ),
        )
        .child(
            el("button")
                .class("btn btn-primary")
                .attr("type", "button")
                .attr(dom::ATTR_ACTION, dom::action::SEND_MESSAGE)
                .text(messages::SEND_BUTTON),
        )
        .child(
            el("button")
                .class("btn btn-secondary ms-2")
                .attr("type", "button")
                .attr(dom::ATTR_ACTION, dom::action::CANCEL_MESSAGE)
                .text(messages::CANCEL_BUTTON),
        )
        .into()
}

/// Fixed-position banner. Variant classes are picked from a closed set.
pub fn notification(n: &NotificationView) -> Node {
    let variant: &'static str = match n.severity.css_variant() {
        "success" => "alert-success",
        "warning" => "alert-warning",
        "danger" => "alert-danger",
        _ => "alert-info",
    };
    el("div")
        .class("alert alert-dismissible fade show position-fixed")
        .class(variant)
        .attr(dom::ATTR_NOTIFICATION_ID, n.id.to_string())
        .attr("role", "alert")
        .attr("style", "top: 20px; right: 20px; z-index: 9999; min-width: 300px;")
        .text(n.message.clone())
        .child(
            el("button")
                .class("btn-close")
                .attr("type", "button")
                .attr(dom::ATTR_ACTION, dom::action::DISMISS_NOTIFICATION)
                .attr(dom::ATTR_NOTIFICATION_ID, n.id.to_string()),
        )
        .into()
}

/// Options for the category selector; the empty value means "all".
pub fn category_options(categories: &[Category]) -> Vec<Node> {
    std::iter::once(
        el("option")
            .attr("value", "")
            .text(messages::ALL_CATEGORIES)
            .into(),
    )
    .chain(categories.iter().map(|c| {
        el("option")
            .attr("value", c.name.clone())
            .text(c.description.clone().unwrap_or_else(|| c.name.clone()))
            .into()
    }))
    .collect()
}

pub fn load_more_button() -> Node {
    el("button")
        .class("btn btn-outline-primary w-100 mt-2")
        .attr("type", "button")
        .attr(dom::ATTR_ACTION, dom::action::LOAD_MORE)
        .text(messages::LOAD_MORE_BUTTON)
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{NotificationCenter, Severity};
    use crate::types::Seller;
    use crate::util::{Duration, Instant};

    fn detail(additional_info: Option<&str>) -> ListingDetail {
        ListingDetail {
            id: 42,
            title: "Channel <b>".into(),
            description: "<script>alert(1)</script>".into(),
            price: 150.0,
            currency: "USDT".into(),
            category: "channel".into(),
            additional_info: additional_info.map(str::to_string),
            created_at: "2024-03-05T10:20:30".into(),
            seller: Seller {
                first_name: "Ivan".into(),
                username: Some("ivan".into()),
                rating: 4.56,
            },
        }
    }

    fn body(nodes: Vec<Node>) -> Node {
        el("div").children(nodes).into()
    }

    #[test]
    fn test_detail_sections() {
        let root = body(listing_detail(&detail(Some("Monetized"))));
        let text = root.text_content();
        assert!(text.contains("Ivan @ivan"));
        assert!(text.contains("⭐ 4.6"));
        assert!(text.contains("150 USDT"));
        assert!(text.contains(messages::ADDITIONAL_INFO_HEADING));
        assert!(text.contains("Monetized"));
        assert!(text.contains("05.03.2024"));
    }

    #[test]
    fn test_detail_hides_empty_additional_info() {
        for info in [None, Some("")] {
            let text = body(listing_detail(&detail(info))).text_content();
            assert!(!text.contains(messages::ADDITIONAL_INFO_HEADING));
        }
    }

    #[test]
    fn test_markup_stays_text() {
        let root = body(listing_detail(&detail(None)));
        // The description is a single text node, not parsed elements
        let desc = root.text_content();
        assert!(desc.contains("<script>alert(1)</script>"));
        assert!(root.find_class("script").is_none());
    }

    #[test]
    fn test_card_carries_listing_id() {
        let summary = ListingSummary {
            id: 9,
            title: "Bot".into(),
            description: String::new(),
            price: 5.0,
            currency: "TON".into(),
            category: "bot".into(),
            seller: None,
            created_at: None,
            views: None,
        };
        let card = listing_card(&summary);
        let root = card.find_class(dom::LISTING_CARD).unwrap();
        assert_eq!(root.get_attr(dom::ATTR_LISTING_ID), Some("9"));
        assert_eq!(card.to_text(), "Bot\n5 TON");
    }

    #[test]
    fn test_contact_form_controls() {
        let form = contact_form();
        let root = form.find_class(dom::CONTACT_FORM).unwrap();
        let actions: Vec<&str> = root
            .children
            .iter()
            .filter_map(|c| match c {
                Node::Element(e) => e.get_attr(dom::ATTR_ACTION),
                Node::Text(_) => None,
            })
            .collect();
        assert_eq!(
            actions,
            vec![dom::action::SEND_MESSAGE, dom::action::CANCEL_MESSAGE]
        );
    }

    #[test]
    fn test_notification_variant_class() {
        let mut center = NotificationCenter::new(Duration::from_secs(5));
        center.push_at(Severity::Error, "boom", Instant::now());
        let node = notification(&center.all()[0].view());
        let banner = node.find_class("alert").unwrap();
        assert!(banner.has_class("alert-danger"));
        assert_eq!(banner.get_attr(dom::ATTR_NOTIFICATION_ID), Some("1"));
    }

    #[test]
    fn test_category_options_start_with_all() {
        let opts = category_options(&[Category {
            name: "channel".into(),
            description: None,
        }]);
        assert_eq!(opts.len(), 2);
        assert_eq!(opts[0].text_content(), messages::ALL_CATEGORIES);
        assert_eq!(opts[1].text_content(), "channel");
    }
}
