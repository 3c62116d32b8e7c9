use derive_more::with_trait::Display;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use crate::modules::filters::{append, remove, renumber};
use crate::modules::types::{BlockHandle, FormModel};
use crate::modules::variants::{select_block_plugin, select_storage_variant, select_variant};

/// A UI interaction, as delivered by whatever layer binds the page.
#[derive(Debug, Deserialize, Clone, Display, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormEvent {
    #[display("add filter to {container}")]
    AddFilter { container: String },
    #[display("remove filter {handle} from {container}")]
    RemoveFilter { container: String, handle: BlockHandle },
    #[display("renumber {container}")]
    Renumber { container: String },
    #[display("change plugin {group} to {value}")]
    ChangePlugin {
        /// Filter list holding the group, for "Filter N" groups on pages with several lists.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        container: Option<String>,
        group: String,
        value: String,
    },
    #[display("change storage {radio} to {value}")]
    ChangeStorage { radio: String, value: String },
}

/// Applies one event to the form. Returns whether anything was found to act on.
pub fn apply(form: &mut FormModel, event: &FormEvent) -> bool {
    info!("Applying: {event}");
    match event {
        FormEvent::AddFilter { container } => match form.filter_list_mut(container) {
            Some(c) => append(c).is_some(),
            None => missing("filter container", container),
        },
        FormEvent::RemoveFilter { container, handle } => match form.filter_list_mut(container) {
            Some(c) => remove(c, *handle),
            None => missing("filter container", container),
        },
        FormEvent::Renumber { container } => match form.filter_list_mut(container) {
            Some(c) => {
                renumber(c);
                true
            }
            None => missing("filter container", container),
        },
        FormEvent::ChangePlugin { container, group, value } => {
            if container.is_none() {
                if let Some(g) = form.group_mut(group) {
                    return select_variant(g, value);
                }
            }
            // a filter's own selector fires this, so it moves with the sections
            match form.plugin_block_mut(container.as_deref(), group) {
                Some(block) => select_block_plugin(block, value),
                None => missing("plugin group", group),
            }
        }
        FormEvent::ChangeStorage { radio, value } => select_storage_variant(form, radio, value),
    }
}

pub fn apply_all(form: &mut FormModel, events: &[FormEvent]) {
    for event in events {
        apply(form, event);
    }
}

fn missing(what: &str, key: &str) -> bool {
    warn!("No {what} named {key}");
    false
}
