use log::{debug, warn};
use crate::modules::types::{FilterBlock, FormModel, VariantGroup, STORAGE_GROUP_KEY};

/// Strips any namespace from a selection value: `com.example.PluginB` -> `PluginB`.
///
/// An id that itself contains a `.` cannot be told apart from a qualified name and
/// resolves to its last component.
pub fn normalize_variant_id(raw: &str) -> &str {
    raw.rsplit('.').next().unwrap_or(raw)
}

/// Shows and enables the section keyed by `variant_id`, hiding and disabling all others.
///
/// Returns whether a section matched. When none does, every section ends up inactive.
pub fn select_variant(group: &mut VariantGroup, variant_id: &str) -> bool {
    let wanted = normalize_variant_id(variant_id);
    group.selection = Some(variant_id.to_string());

    if let Some(info) = group.info.as_mut() {
        info.visible = false;
    }
    for section in &mut group.sections {
        section.set_active(false);
    }

    let Some(section) = group.sections.iter_mut().find(|s| s.variant_id == wanted) else {
        debug!("{}: no section for {variant_id}, nothing selected", group.key);
        return false;
    };
    section.set_active(true);
    let payload = section.info.clone();

    if let Some(info) = group.info.as_mut() {
        info.visible = payload.is_some();
        info.content = payload;
    }
    debug!("{}: selected {wanted}", group.key);
    true
}

/// Switches a filter block's plugin sections and sets its type selector to the same value.
pub fn select_block_plugin(block: &mut FilterBlock, value: &str) -> bool {
    if let Some(selector) = block.selector_mut() {
        selector.value = value.to_string();
    }
    match block.plugin.as_mut() {
        Some(plugin) => select_variant(plugin, value),
        None => false,
    }
}

/// Switches the storage section table and records the checked radio value.
///
/// Without a storage table nothing changes.
pub fn select_storage_variant(form: &mut FormModel, radio_group_key: &str, storage_type: &str) -> bool {
    let Some(storage) = form.storage.as_mut() else {
        warn!("no {STORAGE_GROUP_KEY} table, ignoring storage type {storage_type}");
        return false;
    };
    let matched = select_variant(storage, storage_type);
    form.radios
        .insert(radio_group_key.to_string(), storage_type.to_string());
    matched
}
