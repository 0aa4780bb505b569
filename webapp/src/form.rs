use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlInputElement};

use crate::config::ElementIds;
use crate::error::{Error, Result};
use crate::events::Category;
use crate::filters::FilterState;
use crate::page::element_by_id;

fn input_by_id(document: &Document, id: &str) -> Result<HtmlInputElement> {
    element_by_id(document, id)?
        .dyn_into::<HtmlInputElement>()
        .map_err(|_| Error::Dom(format!("#{id} is not an <input>")))
}

/// The filter inputs on the page. Category buttons are generated from
/// [`Category::ALL`] so the page markup never lists them itself.
pub struct FilterForm {
    start: HtmlInputElement,
    end: HtmlInputElement,
    query: HtmlInputElement,
    buttons: Vec<(Category, Element)>,
}

impl FilterForm {
    pub fn new(document: &Document, ids: &ElementIds) -> Result<Self> {
        let types = element_by_id(document, ids.filter_types)?;
        types.set_text_content(None);

        let mut buttons = Vec::with_capacity(Category::ALL.len());
        for category in Category::ALL {
            let button = document.create_element("button")?;
            button.set_attribute("type", "button")?;
            button.set_attribute("data-category", category.key())?;
            button.set_attribute("aria-pressed", "false")?;
            button.set_class_name("category-toggle");
            button.set_text_content(Some(category.label()));
            types.append_child(&button)?;
            buttons.push((category, button));
        }

        Ok(Self {
            start: input_by_id(document, ids.filter_start)?,
            end: input_by_id(document, ids.filter_end)?,
            query: input_by_id(document, ids.filter_query)?,
            buttons,
        })
    }

    pub fn text_inputs(&self) -> Vec<HtmlInputElement> {
        vec![self.start.clone(), self.end.clone(), self.query.clone()]
    }

    pub fn category_buttons(&self) -> &[(Category, Element)] {
        &self.buttons
    }

    /// Copy the current date and search input values into `filters`.
    pub fn read_text_inputs(&self, filters: &mut FilterState) {
        filters.start = self.start.value();
        filters.end = self.end.value();
        filters.query = self.query.value();
    }

    pub fn mark_selected(&self, category: Category, selected: bool) -> Result<()> {
        if let Some((_, button)) = self.buttons.iter().find(|(c, _)| *c == category) {
            button.class_list().toggle_with_force("selected", selected)?;
            button.set_attribute("aria-pressed", if selected { "true" } else { "false" })?;
        }
        Ok(())
    }
}
