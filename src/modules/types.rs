use derive_more::with_trait::Display;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Group key of the storage section table rendered by the server.
pub const STORAGE_GROUP_KEY: &str = "storage-configuration";

/// Page-lifetime identity of a filter block inside its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize, Display)]
#[display("#{_0}")]
pub struct BlockHandle(pub u64);

#[derive(Debug, Deserialize, Clone, Display, Serialize, PartialEq, Eq)]
#[display("<{tag} id={id:?} name={name:?} disabled={disabled}>")]
pub struct Control {
    pub tag: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
}

impl Control {
    pub fn new(tag: impl Into<String>, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            id: None,
            name: Some(name.into()),
            value: value.into(),
            disabled: false,
            attrs: BTreeMap::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

#[derive(Debug, Deserialize, Clone, Display, Serialize, PartialEq, Eq)]
#[display("{variant_id} visible={visible} enabled={enabled}")]
pub struct VariantSection {
    pub variant_id: String,
    #[serde(default)]
    pub info: Option<String>,
    #[serde(default)]
    pub visible: bool,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub controls: Vec<Control>,
}

impl VariantSection {
    pub fn new(variant_id: impl Into<String>, controls: Vec<Control>) -> Self {
        let mut section = Self {
            variant_id: variant_id.into(),
            info: None,
            visible: false,
            enabled: false,
            controls,
        };
        section.set_active(false);
        section
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = Some(info.into());
        self
    }

    /// Shows and enables the section, or hides it and disables every input under it.
    pub fn set_active(&mut self, active: bool) {
        self.visible = active;
        self.enabled = active;
        for control in &mut self.controls {
            control.disabled = !active;
        }
    }

    pub fn is_active(&self) -> bool {
        self.visible && self.enabled
    }
}

#[derive(Debug, Deserialize, Clone, Display, Serialize, PartialEq, Eq, Default)]
#[display("info visible={visible}")]
pub struct InfoPopup {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub visible: bool,
}

#[derive(Debug, Deserialize, Clone, Display, Serialize, PartialEq, Eq)]
#[display("{key} ({} sections)", sections.len())]
pub struct VariantGroup {
    pub key: String,
    #[serde(default)]
    pub sections: Vec<VariantSection>,
    #[serde(default)]
    pub info: Option<InfoPopup>,
    #[serde(default)]
    pub selection: Option<String>,
}

impl VariantGroup {
    pub fn new(key: impl Into<String>, sections: Vec<VariantSection>) -> Self {
        Self {
            key: key.into(),
            sections,
            info: None,
            selection: None,
        }
    }

    pub fn with_info(mut self) -> Self {
        self.info = Some(InfoPopup::default());
        self
    }

    pub fn section(&self, variant_id: &str) -> Option<&VariantSection> {
        self.sections.iter().find(|s| s.variant_id == variant_id)
    }

    pub fn active_sections(&self) -> impl Iterator<Item = &VariantSection> {
        self.sections.iter().filter(|s| s.is_active())
    }
}

#[derive(Debug, Deserialize, Clone, Display, Serialize, PartialEq, Eq)]
#[display("{handle} {label} ({id})")]
pub struct FilterBlock {
    pub handle: BlockHandle,
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub controls: Vec<Control>,
    #[serde(default)]
    pub plugin: Option<VariantGroup>,
}

impl FilterBlock {
    pub fn new(id: impl Into<String>, label: impl Into<String>, controls: Vec<Control>) -> Self {
        Self {
            handle: BlockHandle(0),
            id: id.into(),
            label: label.into(),
            controls,
            plugin: None,
        }
    }

    pub fn with_plugin(mut self, plugin: VariantGroup) -> Self {
        self.plugin = Some(plugin);
        self
    }

    /// Current value of the block's plugin selector, if it has one.
    pub fn selected_plugin(&self) -> Option<&str> {
        self.controls
            .iter()
            .find(|c| c.tag == "select")
            .map(|c| c.value.as_str())
    }

    pub fn selector_mut(&mut self) -> Option<&mut Control> {
        self.controls.iter_mut().find(|c| c.tag == "select")
    }
}

#[derive(Debug, Deserialize, Clone, Display, Serialize, PartialEq, Eq)]
#[display("{key} ({} filters)", blocks.len())]
pub struct FilterListContainer {
    pub key: String,
    #[serde(default)]
    pub template: Option<FilterBlock>,
    #[serde(default)]
    pub blocks: Vec<FilterBlock>,
    #[serde(default)]
    pub next_handle: u64,
}

impl FilterListContainer {
    pub fn new(key: impl Into<String>, template: Option<FilterBlock>) -> Self {
        Self {
            key: key.into(),
            template,
            blocks: Vec::new(),
            next_handle: 0,
        }
    }

    /// Hands out a handle that has never been used in this container.
    pub fn issue_handle(&mut self) -> BlockHandle {
        let handle = BlockHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    /// Adds an already rendered block, as found in server markup.
    pub fn push_rendered(&mut self, mut block: FilterBlock) -> BlockHandle {
        block.handle = self.issue_handle();
        let handle = block.handle;
        self.blocks.push(block);
        handle
    }

    pub fn position(&self, handle: BlockHandle) -> Option<usize> {
        self.blocks.iter().position(|b| b.handle == handle)
    }

    pub fn handle_at(&self, index: usize) -> Option<BlockHandle> {
        self.blocks.get(index).map(|b| b.handle)
    }
}

#[derive(Debug, Deserialize, Clone, Serialize, PartialEq, Eq, Default)]
pub struct FormModel {
    #[serde(default)]
    pub filter_lists: Vec<FilterListContainer>,
    #[serde(default)]
    pub groups: Vec<VariantGroup>,
    #[serde(default)]
    pub storage: Option<VariantGroup>,
    #[serde(default)]
    pub radios: BTreeMap<String, String>,
}

impl FormModel {
    pub fn filter_list(&self, key: &str) -> Option<&FilterListContainer> {
        self.filter_lists.iter().find(|c| c.key == key)
    }

    pub fn filter_list_mut(&mut self, key: &str) -> Option<&mut FilterListContainer> {
        self.filter_lists.iter_mut().find(|c| c.key == key)
    }

    /// Page-level variant group by key.
    pub fn group_mut(&mut self, key: &str) -> Option<&mut VariantGroup> {
        self.groups.iter_mut().find(|g| g.key == key)
    }

    /// Filter block whose nested plugin group has `key`.
    ///
    /// Every list numbers its groups "Filter 1", "Filter 2", ..., so with more than one
    /// list `container` picks which one; without it the first list holding the key wins.
    pub fn plugin_block_mut(&mut self, container: Option<&str>, key: &str) -> Option<&mut FilterBlock> {
        self.filter_lists
            .iter_mut()
            .filter(|c| container.is_none_or(|wanted| c.key == wanted))
            .flat_map(|c| c.blocks.iter_mut())
            .find(|b| b.plugin.as_ref().is_some_and(|g| g.key == key))
    }
}
