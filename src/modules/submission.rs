use crate::modules::types::{Control, FilterBlock, FilterListContainer, FormModel, VariantGroup};

/// Name/value pairs a browser would post for the implementing part of the form.
pub trait Submittable {
    fn submission(&self) -> Vec<(String, String)>;
}

impl Submittable for Control {
    fn submission(&self) -> Vec<(String, String)> {
        match self.name.as_deref() {
            Some(name) if !self.disabled && !name.is_empty() && self.tag != "button" => {
                vec![(name.to_string(), self.value.clone())]
            }
            _ => Vec::new(),
        }
    }
}

impl Submittable for VariantGroup {
    fn submission(&self) -> Vec<(String, String)> {
        self.sections
            .iter()
            .flat_map(|s| s.controls.iter())
            .flat_map(|c| c.submission())
            .collect()
    }
}

impl Submittable for FilterBlock {
    fn submission(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<_> = self.controls.iter().flat_map(|c| c.submission()).collect();
        if let Some(plugin) = &self.plugin {
            pairs.extend(plugin.submission());
        }
        pairs
    }
}

impl Submittable for FilterListContainer {
    // the template is inert and never posted
    fn submission(&self) -> Vec<(String, String)> {
        self.blocks.iter().flat_map(|b| b.submission()).collect()
    }
}

impl Submittable for FormModel {
    fn submission(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<_> = self
            .radios
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        pairs.extend(self.filter_lists.iter().flat_map(|c| c.submission()));
        pairs.extend(self.groups.iter().flat_map(|g| g.submission()));
        if let Some(storage) = &self.storage {
            pairs.extend(storage.submission());
        }
        pairs
    }
}
