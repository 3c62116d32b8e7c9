use std::collections::HashSet;
use std::error::Error;
use std::io;
use log::{debug, info};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use crate::modules::types::{
    Control, FilterBlock, FilterListContainer, FormModel, InfoPopup, VariantGroup, VariantSection,
    STORAGE_GROUP_KEY,
};

/// CSS selectors locating the parts of the server-rendered job form.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Selectors {
    pub filter_container: String,
    pub filter_template: String,
    pub active_filter: String,
    pub panel_title: String,
    pub inputs: String,
    pub plugin_table: String,
    pub plugin_section: String,
    pub plugin_info: String,
    pub storage_table: String,
    pub storage_section: String,
    pub radio: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            filter_container: ".filter-container".to_string(),
            filter_template: ".filter-template div.panel".to_string(),
            active_filter: ".active-filters div.panel".to_string(),
            panel_title: ".panel-title".to_string(),
            inputs: "input, select, textarea, button".to_string(),
            plugin_table: "table[data-plugin]".to_string(),
            plugin_section: "tbody[data-plugin]".to_string(),
            plugin_info: "span.plugin-info".to_string(),
            storage_table: format!("table#{STORAGE_GROUP_KEY}"),
            storage_section: "tbody[data-storage-type]".to_string(),
            radio: "input[type=radio]".to_string(),
        }
    }
}

struct Compiled {
    filter_container: Selector,
    filter_template: Selector,
    active_filter: Selector,
    panel_title: Selector,
    inputs: Selector,
    plugin_table: Selector,
    plugin_section: Selector,
    plugin_info: Selector,
    storage_table: Selector,
    storage_section: Selector,
    radio: Selector,
    option: Selector,
}

fn compile(css: &str) -> Result<Selector, Box<dyn Error>> {
    let selector = Selector::parse(css)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("{css}: {e}")))?;
    Ok(selector)
}

impl Compiled {
    fn new(s: &Selectors) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            filter_container: compile(&s.filter_container)?,
            filter_template: compile(&s.filter_template)?,
            active_filter: compile(&s.active_filter)?,
            panel_title: compile(&s.panel_title)?,
            inputs: compile(&s.inputs)?,
            plugin_table: compile(&s.plugin_table)?,
            plugin_section: compile(&s.plugin_section)?,
            plugin_info: compile(&s.plugin_info)?,
            storage_table: compile(&s.storage_table)?,
            storage_section: compile(&s.storage_section)?,
            radio: compile(&s.radio)?,
            option: compile("option")?,
        })
    }
}

/// Builds the form model from server-rendered markup.
pub fn parse_form(html: &str, selectors: &Selectors) -> Result<FormModel, Box<dyn Error>> {
    let sel = Compiled::new(selectors)?;
    let document = Html::parse_document(html);
    let mut form = FormModel::default();

    let mut inside_lists = HashSet::new();
    for (n, element) in document.select(&sel.filter_container).enumerate() {
        inside_lists.insert(element.id());
        let container = parse_filter_list(element, n, &sel);
        info!("Found filter list {container}");
        form.filter_lists.push(container);
    }

    for table in document.select(&sel.plugin_table) {
        if table.ancestors().any(|a| inside_lists.contains(&a.id())) {
            continue;
        }
        let group = parse_group(table, "data-plugin", &sel.plugin_section, document.root_element(), &sel);
        info!("Found plugin group {group}");
        form.groups.push(group);
    }

    if let Some(table) = document.select(&sel.storage_table).next() {
        let mut storage = parse_sections(table, "data-storage-type", &sel.storage_section, &sel);
        storage.key = STORAGE_GROUP_KEY.to_string();
        info!("Found storage group {storage}");
        form.storage = Some(storage);
    }

    for radio in document.select(&sel.radio) {
        let el = radio.value();
        if let (Some(name), Some(_)) = (el.attr("name"), el.attr("checked")) {
            form.radios
                .insert(name.to_string(), el.attr("value").unwrap_or("on").to_string());
        }
    }
    Ok(form)
}

fn parse_filter_list(element: ElementRef, n: usize, sel: &Compiled) -> FilterListContainer {
    let template = element
        .select(&sel.filter_template)
        .next()
        .map(|panel| parse_block(panel, sel));
    let blocks: Vec<_> = element
        .select(&sel.active_filter)
        .map(|panel| parse_block(panel, sel))
        .collect();

    let key = template
        .iter()
        .chain(blocks.iter())
        .find_map(|b| list_prefix(&b.id))
        .or_else(|| element.value().attr("id").map(str::to_string))
        .unwrap_or_else(|| format!("filters{n}"));

    let mut container = FilterListContainer::new(key, template);
    for block in blocks {
        container.push_rendered(block);
    }
    container
}

/// `job.filters[3]` -> `job`
fn list_prefix(id: &str) -> Option<String> {
    id.find(".filters[").map(|pos| id[..pos].to_string())
}

fn parse_block(panel: ElementRef, sel: &Compiled) -> FilterBlock {
    let id = panel.value().attr("id").unwrap_or_default();
    let mut label = String::new();
    let mut controls = Vec::new();
    for title in panel.select(&sel.panel_title) {
        if label.is_empty() {
            // kept verbatim, the template renders a bare "Filter "
            if let Some(text) = title.text().find(|t| t.contains("Filter ")) {
                label = text.to_string();
            }
        }
        controls.extend(parse_controls(title, sel));
    }

    let mut block = FilterBlock::new(id, label, controls);
    if let Some(table) = panel.select(&sel.plugin_table).next() {
        block.plugin = Some(parse_group(table, "data-plugin", &sel.plugin_section, panel, sel));
    }
    debug!("Parsed filter block {block}");
    block
}

fn parse_group(
    table: ElementRef,
    attr: &str,
    sections: &Selector,
    scope: ElementRef,
    sel: &Compiled,
) -> VariantGroup {
    let mut group = parse_sections(table, attr, sections, sel);
    group.info = scope
        .select(&sel.plugin_info)
        .find(|span| span.value().attr("data-plugin") == Some(group.key.as_str()))
        .map(|span| InfoPopup {
            content: span.value().attr("data-content").map(str::to_string),
            visible: !is_hidden(span),
        });
    group
}

fn parse_sections(table: ElementRef, attr: &str, sections: &Selector, sel: &Compiled) -> VariantGroup {
    let key = table.value().attr(attr).unwrap_or_default();
    let sections = table
        .select(sections)
        .map(|tbody| {
            let controls = parse_controls(tbody, sel);
            let visible = !is_hidden(tbody);
            VariantSection {
                variant_id: tbody.value().attr(attr).unwrap_or_default().to_string(),
                info: tbody.value().attr("data-info").map(str::to_string),
                visible,
                enabled: visible && controls.iter().all(|c| !c.disabled),
                controls,
            }
        })
        .collect();
    VariantGroup::new(key, sections)
}

fn parse_controls(scope: ElementRef, sel: &Compiled) -> Vec<Control> {
    scope
        .select(&sel.inputs)
        .filter(|el| el.value().attr("type") != Some("radio"))
        .map(|el| parse_control(el, sel))
        .collect()
}

fn parse_control(el: ElementRef, sel: &Compiled) -> Control {
    let element = el.value();
    let tag = element.name().to_string();
    let value = match tag.as_str() {
        "select" => {
            let mut options = el.select(&sel.option);
            let first = el.select(&sel.option).next();
            options
                .find(|o| o.value().attr("selected").is_some())
                .or(first)
                .map(|o| match o.value().attr("value") {
                    Some(v) => v.to_string(),
                    None => o.text().collect::<String>().trim().to_string(),
                })
                .unwrap_or_default()
        }
        "textarea" => el.text().collect(),
        _ => element.attr("value").unwrap_or_default().to_string(),
    };

    Control {
        tag,
        id: element.attr("id").map(str::to_string),
        name: element.attr("name").map(str::to_string),
        value,
        disabled: element.attr("disabled").is_some() || element.classes().any(|c| c == "disabled"),
        attrs: element
            .attrs()
            .filter(|(k, _)| *k == "onclick" || *k == "onchange" || k.starts_with("data-"))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    }
}

fn is_hidden(el: ElementRef) -> bool {
    el.value()
        .attr("style")
        .map(|s| s.replace(' ', "").contains("display:none"))
        .unwrap_or(false)
}
