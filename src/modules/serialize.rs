use serde::{Deserialize, Serialize};
use std::fs;
use crate::modules::events::FormEvent;
use crate::modules::markup::Selectors;
use crate::modules::types::FormModel;

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct EventsFile {
    #[serde(default)]
    pub events: Vec<FormEvent>,
}

pub fn load_form(path: &str) -> Result<FormModel, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)?;
    let form: FormModel = toml::from_str(&text)?;
    Ok(form)
}

pub fn save_form(path: &str, form: &FormModel) -> Result<(), Box<dyn std::error::Error>> {
    let toml_str = toml::to_string_pretty(form)?;
    fs::write(path, toml_str)?;
    Ok(())
}

pub fn load_events(path: &str) -> Result<Vec<FormEvent>, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)?;
    let file: EventsFile = toml::from_str(&text)?;
    Ok(file.events)
}

/// Missing selector files fall back to the default selectors.
pub fn load_selectors(path: Option<&str>) -> Result<Selectors, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(Selectors::default());
    };
    let text = fs::read_to_string(path)?;
    let selectors: Selectors = toml::from_str(&text)?;
    Ok(selectors)
}
