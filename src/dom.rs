//! DOM renderer for the browser front-end
//!
//! Binds the page template's fixed element ids and applies [`UiSnapshot`]s to
//! them. View trees are materialized with `createElement` and text nodes;
//! nothing is ever assigned as HTML.

use anyhow::{anyhow, Result};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};

use crate::constants::dom;
use crate::contact::ContactState;
use crate::debug::{self, cat};
use crate::grouping::CategoryGroup;
use crate::ui_snapshot::UiSnapshot;
use crate::view;
use crate::webshim;

/// Build a live DOM subtree from a view tree.
pub fn materialize(doc: &Document, node: &view::Node) -> Result<web_sys::Node, JsValue> {
    match node {
        view::Node::Text(t) => Ok(doc.create_text_node(t).into()),
        view::Node::Element(e) => {
            let out = doc.create_element(e.tag)?;
            if !e.classes.is_empty() {
                out.set_class_name(&e.classes.join(" "));
            }
            for (name, value) in &e.attrs {
                out.set_attribute(name, value)?;
            }
            for child in &e.children {
                out.append_child(&materialize(doc, child)?)?;
            }
            Ok(out.into())
        }
    }
}

fn append_all(doc: &Document, parent: &Element, nodes: &[view::Node]) -> Result<(), JsValue> {
    for n in nodes {
        parent.append_child(&materialize(doc, n)?)?;
    }
    Ok(())
}

fn clear(el: &Element) {
    while let Some(child) = el.first_child() {
        let _ = el.remove_child(&child);
    }
}

fn set_visible(el: &Element, visible: bool) {
    if let Some(h) = el.dyn_ref::<HtmlElement>() {
        let res = if visible {
            h.style().remove_property("display").map(|_| ())
        } else {
            h.style().set_property("display", "none")
        };
        if let Err(e) = res {
            log::warn!("[dom] Failed to toggle display: {e:?}");
        }
    }
}

fn query_all(root: &Document, selector: &str) -> Vec<Element> {
    let Ok(list) = root.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|n| n.dyn_into::<Element>().ok())
        .collect()
}

/// What has already been written to the DOM.
#[derive(Debug, Default)]
struct Rendered {
    listings_version: u64,
    categories_version: u64,
    detail_version: u64,
    modal_open: bool,
    contact: Option<ContactState>,
    notifications: Vec<u64>,
    inputs_seeded: bool,
}

/// Handles to the page template's fixed elements.
pub struct Page {
    doc: Document,
    search_input: HtmlInputElement,
    category_filter: HtmlSelectElement,
    modal: Element,
    title: Element,
    content: Element,
    rendered: Rendered,
}

impl Page {
    pub fn bind(doc: Document) -> Result<Self> {
        let by_id = |id: &str| {
            doc.get_element_by_id(id)
                .ok_or_else(|| anyhow!("page template has no #{id}"))
        };
        let search_input = by_id(dom::SEARCH_INPUT)?
            .dyn_into::<HtmlInputElement>()
            .map_err(|_| anyhow!("#{} is not an <input>", dom::SEARCH_INPUT))?;
        let category_filter = by_id(dom::CATEGORY_FILTER)?
            .dyn_into::<HtmlSelectElement>()
            .map_err(|_| anyhow!("#{} is not a <select>", dom::CATEGORY_FILTER))?;
        Ok(Self {
            search_input,
            category_filter,
            modal: by_id(dom::LISTING_MODAL)?,
            title: by_id(dom::LISTING_TITLE)?,
            content: by_id(dom::LISTING_CONTENT)?,
            doc,
            rendered: Rendered::default(),
        })
    }

    pub fn search_value(&self) -> String {
        self.search_input.value()
    }

    pub fn category_value(&self) -> String {
        self.category_filter.value()
    }

    /// Contents of the contact textarea, empty when the form is absent.
    pub fn message_text(&self) -> String {
        self.doc
            .get_element_by_id(dom::MESSAGE_TEXT)
            .and_then(|e| e.dyn_into::<HtmlTextAreaElement>().ok())
            .map(|t| t.value())
            .unwrap_or_default()
    }

    pub fn render(&mut self, snap: &UiSnapshot) {
        if let Err(e) = self.try_render(snap) {
            log::error!("[dom] Render failed: {e:?}");
        }
    }

    fn try_render(&mut self, snap: &UiSnapshot) -> Result<(), JsValue> {
        if !self.rendered.inputs_seeded {
            self.rendered.inputs_seeded = true;
            if !snap.search.text.is_empty() {
                self.search_input.set_value(&snap.search.text);
            }
        }

        if snap.categories_version != self.rendered.categories_version {
            self.render_categories(snap)?;
            self.rendered.categories_version = snap.categories_version;
        }

        if snap.listings_version != self.rendered.listings_version {
            self.render_listings(&snap.groups, snap.page.is_some_and(|p| p.has_next))?;
            self.rendered.listings_version = snap.listings_version;
        }

        if snap.modal.detail_version != self.rendered.detail_version {
            self.render_detail(snap)?;
            self.rendered.detail_version = snap.modal.detail_version;
            // Content was replaced, form included
            self.rendered.contact = None;
        }

        if self.rendered.contact != Some(snap.contact) {
            self.render_contact(snap.contact)?;
            self.rendered.contact = Some(snap.contact);
        }

        if snap.modal.open != self.rendered.modal_open {
            if snap.modal.open {
                webshim::modal_show(&self.modal);
            } else {
                webshim::modal_hide(&self.modal);
            }
            self.rendered.modal_open = snap.modal.open;
        }

        self.render_notifications(snap)
    }

    fn render_categories(&self, snap: &UiSnapshot) -> Result<(), JsValue> {
        if snap.categories.is_empty() {
            return Ok(());
        }
        let select: &Element = self.category_filter.as_ref();
        clear(select);
        append_all(&self.doc, select, &view::category_options(&snap.categories))?;
        self.category_filter.set_value(&snap.search.category);
        Ok(())
    }

    fn render_listings(&self, groups: &[CategoryGroup], has_next: bool) -> Result<(), JsValue> {
        let selector = format!(".{}", dom::CATEGORY_SECTION);
        let sections = query_all(&self.doc, &selector);
        for s in &sections {
            set_visible(s, false);
        }

        let container = sections
            .first()
            .and_then(|s| s.parent_element())
            .or_else(|| self.doc.query_selector(".container").ok().flatten())
            .or_else(|| self.doc.body().map(Into::into));
        let Some(container) = container else {
            return Err(JsValue::from_str("no container for category sections"));
        };

        for group in groups {
            let existing = sections
                .iter()
                .find(|s| s.get_attribute(dom::ATTR_CATEGORY).as_deref() == Some(group.category.as_str()));
            match existing {
                Some(section) => {
                    match section.query_selector(dom::SECTION_LISTINGS)? {
                        Some(target) => {
                            clear(&target);
                            append_all(&self.doc, &target, &view::category_cards(group))?;
                        }
                        None => {
                            let stale = format!(".{}", dom::LISTING_CARD);
                            let old = section.query_selector_all(&stale)?;
                            for i in 0..old.length() {
                                if let Some(card) = old.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                                    card.remove();
                                }
                            }
                            append_all(&self.doc, section, &view::category_cards(group))?;
                        }
                    }
                    set_visible(section, true);
                }
                None => {
                    debug::log(cat::RENDER, format!("create section {:?}", group.category));
                    container.append_child(&materialize(&self.doc, &view::category_section(group))?)?;
                }
            }
        }

        let load_more = format!("[{}=\"{}\"]", dom::ATTR_ACTION, dom::action::LOAD_MORE);
        for old in query_all(&self.doc, &load_more) {
            old.remove();
        }
        if has_next {
            container.append_child(&materialize(&self.doc, &view::load_more_button())?)?;
        }

        debug::log(cat::RENDER, format!("{} group(s) rendered", groups.len()));
        Ok(())
    }

    fn render_detail(&self, snap: &UiSnapshot) -> Result<(), JsValue> {
        let Some(listing) = &snap.modal.listing else {
            return Ok(());
        };
        self.title.set_text_content(Some(&listing.title));
        clear(&self.content);
        append_all(&self.doc, &self.content, &view::listing_detail(listing))
    }

    fn render_contact(&self, state: ContactState) -> Result<(), JsValue> {
        let form_sel = format!(".{}", dom::CONTACT_FORM);
        let form = self.content.query_selector(&form_sel)?;
        let primary = self.modal.query_selector(dom::PRIMARY_ACTION)?;

        match state {
            ContactState::Idle => {
                if let Some(f) = form {
                    f.remove();
                }
                if let Some(p) = &primary {
                    set_visible(p, true);
                }
            }
            ContactState::Composing { sending } => {
                let form = match form {
                    Some(f) => f,
                    None => {
                        let node = materialize(&self.doc, &view::contact_form())?;
                        self.content.append_child(&node)?;
                        node.dyn_into::<Element>()?
                    }
                };
                if let Some(p) = &primary {
                    set_visible(p, false);
                }
                let send_sel = format!("[{}=\"{}\"]", dom::ATTR_ACTION, dom::action::SEND_MESSAGE);
                if let Some(send) = form.query_selector(&send_sel)? {
                    if sending {
                        send.set_attribute("disabled", "")?;
                    } else {
                        send.remove_attribute("disabled")?;
                    }
                }
            }
        }
        Ok(())
    }

    fn render_notifications(&mut self, snap: &UiSnapshot) -> Result<(), JsValue> {
        let live: Vec<u64> = snap.notifications.iter().map(|n| n.id).collect();
        if live == self.rendered.notifications {
            return Ok(());
        }

        let selector = format!(".alert[{}]", dom::ATTR_NOTIFICATION_ID);
        for el in query_all(&self.doc, &selector) {
            let id = el
                .get_attribute(dom::ATTR_NOTIFICATION_ID)
                .and_then(|v| v.parse::<u64>().ok());
            if !id.is_some_and(|id| live.contains(&id)) {
                el.remove();
            }
        }

        let Some(body) = self.doc.body() else {
            return Ok(());
        };
        for n in &snap.notifications {
            if !self.rendered.notifications.contains(&n.id) {
                body.append_child(&materialize(&self.doc, &view::notification(n))?)?;
            }
        }
        self.rendered.notifications = live;
        Ok(())
    }
}
