use log::{debug, warn};
use crate::modules::reindex::reindex_block;
use crate::modules::types::{BlockHandle, FilterListContainer};
use crate::modules::variants::select_block_plugin;

/// Clones the inert template into a new last block and renumbers the list.
///
/// The new block's own inputs are enabled; its plugin sections are switched to match
/// the block's plugin selector. Returns `None` when the container has no template.
pub fn append(container: &mut FilterListContainer) -> Option<BlockHandle> {
    let Some(template) = container.template.as_ref() else {
        warn!("{}: no filter template, cannot add filter", container.key);
        return None;
    };
    let mut block = template.clone();
    block.handle = container.issue_handle();
    for control in &mut block.controls {
        control.disabled = false;
    }
    if let Some(selected) = block.selected_plugin().map(str::to_string) {
        select_block_plugin(&mut block, &selected);
    }

    let handle = block.handle;
    container.blocks.push(block);
    renumber(container);
    debug!("{}: added filter {handle}, {} total", container.key, container.blocks.len());
    Some(handle)
}

/// Removes the block with `handle` and renumbers the list.
///
/// A handle that is no longer in the container is ignored, so repeated removal
/// requests for the same block are harmless.
pub fn remove(container: &mut FilterListContainer, handle: BlockHandle) -> bool {
    let Some(position) = container.position(handle) else {
        debug!("{}: filter {handle} already gone", container.key);
        return false;
    };
    let removed = container.blocks.remove(position);
    renumber(container);
    debug!("{}: removed {removed}", container.key);
    true
}

/// Rewrites every block to embed its current position.
///
/// Always computed from the final order in one pass.
pub fn renumber(container: &mut FilterListContainer) {
    for (index, block) in container.blocks.iter_mut().enumerate() {
        reindex_block(block, index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::types::{Control, FilterBlock, VariantGroup, VariantSection};

    fn template() -> FilterBlock {
        let plugin = VariantGroup::new("Filter ", vec![
            VariantSection::new("IdLogging", vec![Control::new("input", "job.filters[].idLogging.file", "")]),
            VariantSection::new("Metadata", vec![Control::new("input", "job.filters[].metadata.add", "")]),
        ]);
        FilterBlock::new("job.filters[]", "Filter ", vec![
            Control::new("select", "job.filters[].type", "IdLogging")
                .with_id("job.filters[].type")
                .with_attr("onchange", "changePlugin('Filter ', this)")
                .disabled(),
            Control::new("button", "", "")
                .with_attr("onclick", "deleteFilter('job.filters[]')")
                .disabled(),
        ])
        .with_plugin(plugin)
    }

    fn container_with(count: usize) -> FilterListContainer {
        let mut container = FilterListContainer::new("job", Some(template()));
        for _ in 0..count {
            append(&mut container);
        }
        container
    }

    #[test]
    fn append_to_empty_container() {
        let mut container = container_with(0);
        let handle = append(&mut container).unwrap();

        assert_eq!(container.blocks.len(), 1);
        let block = &container.blocks[0];
        assert_eq!(block.handle, handle);
        assert_eq!(block.id, "job.filters[0]");
        assert_eq!(block.label, "Filter 1");
        assert!(block.controls.iter().all(|c| !c.disabled));
        assert_eq!(block.controls[0].attrs["onchange"], "changePlugin('Filter 1', this)");
    }

    #[test]
    fn append_keeps_template_inert() {
        let container = container_with(2);
        let template = container.template.as_ref().unwrap();
        assert!(template.controls.iter().all(|c| c.disabled));
        assert_eq!(template.id, "job.filters[]");
    }

    #[test]
    fn append_syncs_plugin_sections_to_selector() {
        let container = container_with(1);
        let plugin = container.blocks[0].plugin.as_ref().unwrap();
        assert_eq!(plugin.key, "Filter 1");
        assert!(plugin.section("IdLogging").unwrap().is_active());
        assert!(!plugin.section("Metadata").unwrap().is_active());
    }

    #[test]
    fn append_without_template_is_a_no_op() {
        let mut container = FilterListContainer::new("job", None);
        assert_eq!(append(&mut container), None);
        assert!(container.blocks.is_empty());
    }

    #[test]
    fn remove_middle_block_closes_the_gap() {
        let mut container = container_with(3);
        let middle = container.handle_at(1).unwrap();
        assert!(remove(&mut container, middle));

        let ids: Vec<_> = container.blocks.iter().map(|b| b.id.as_str()).collect();
        let labels: Vec<_> = container.blocks.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(ids, vec!["job.filters[0]", "job.filters[1]"]);
        assert_eq!(labels, vec!["Filter 1", "Filter 2"]);
        assert_eq!(
            container.blocks[1].controls[1].attrs["onclick"],
            "deleteFilter('job.filters[1]')"
        );
    }

    #[test]
    fn stale_handle_is_ignored() {
        let mut container = container_with(3);
        let first = container.handle_at(0).unwrap();
        assert!(remove(&mut container, first));
        let snapshot = container.clone();

        assert!(!remove(&mut container, first));
        assert_eq!(container, snapshot);
    }

    #[test]
    fn handles_are_not_reused() {
        let mut container = container_with(2);
        let last = container.handle_at(1).unwrap();
        remove(&mut container, last);
        let fresh = append(&mut container).unwrap();
        assert_ne!(fresh, last);
    }

    #[test]
    fn renumber_twice_is_same_as_once() {
        let mut container = container_with(4);
        container.blocks.swap(0, 3);
        renumber(&mut container);
        let once = container.clone();
        renumber(&mut container);
        assert_eq!(container, once);
        assert_eq!(container.blocks[0].id, "job.filters[0]");
    }
}
