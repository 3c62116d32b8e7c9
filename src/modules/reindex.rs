use regex::Regex;
use std::sync::LazyLock;
use crate::modules::types::{Control, FilterBlock, VariantGroup};

static FIELD_INDEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.filters\[[0-9]*]").expect("valid field index pattern"));
static ORDINAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Filter [0-9]*").expect("valid ordinal pattern"));

/// Which token an attribute embeds the block position in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteRule {
    /// `.filters[N]`, zero-based.
    FieldIndex,
    /// `Filter N`, one-based.
    Ordinal,
}

/// Secondary references carried in control attributes.
pub const SECONDARY_REFERENCES: &[(&str, RewriteRule)] = &[
    ("onclick", RewriteRule::FieldIndex),
    ("onchange", RewriteRule::Ordinal),
    ("data-plugin", RewriteRule::Ordinal),
];

impl RewriteRule {
    pub fn apply(self, text: &str, index: usize) -> String {
        match self {
            RewriteRule::FieldIndex => FIELD_INDEX
                .replace_all(text, format!(".filters[{index}]").as_str())
                .into_owned(),
            RewriteRule::Ordinal => ORDINAL
                .replace_all(text, format!("Filter {}", index + 1).as_str())
                .into_owned(),
        }
    }

    fn rewrite(self, text: &mut String, index: usize) {
        *text = self.apply(text, index);
    }
}

/// Rewrites every index-bearing attribute of `block` to embed `index`.
///
/// Matching is done on the token pattern, not on the previous value, so calling this
/// again with the same index changes nothing.
pub fn reindex_block(block: &mut FilterBlock, index: usize) {
    RewriteRule::FieldIndex.rewrite(&mut block.id, index);
    RewriteRule::Ordinal.rewrite(&mut block.label, index);
    for control in &mut block.controls {
        reindex_control(control, index);
    }
    if let Some(plugin) = block.plugin.as_mut() {
        reindex_group(plugin, index);
    }
}

fn reindex_group(group: &mut VariantGroup, index: usize) {
    // the group key is the table's data-plugin value
    RewriteRule::Ordinal.rewrite(&mut group.key, index);
    for section in &mut group.sections {
        for control in &mut section.controls {
            reindex_control(control, index);
        }
    }
}

fn reindex_control(control: &mut Control, index: usize) {
    if let Some(id) = control.id.as_mut() {
        RewriteRule::FieldIndex.rewrite(id, index);
    }
    if let Some(name) = control.name.as_mut() {
        RewriteRule::FieldIndex.rewrite(name, index);
    }
    for (attr, rule) in SECONDARY_REFERENCES {
        if let Some(value) = control.attrs.get_mut(*attr) {
            rule.rewrite(value, index);
        }
    }
}
