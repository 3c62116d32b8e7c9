//! End-to-end checks over a rendered job form.

use jobform::modules::events::{apply, apply_all, FormEvent};
use jobform::modules::markup::{parse_form, Selectors};
use jobform::modules::submission::Submittable;
use jobform::modules::types::FormModel;
use pretty_assertions::assert_eq;

const JOB_PAGE: &str = r#"<!doctype html>
<html><body>
<form id="job">
  <table data-plugin="source-plugin">
    <tbody data-plugin="FilesystemSource" data-info="Reads files from a local directory">
      <tr><td><input id="source.path" name="source.path" value="/data"></td></tr>
    </tbody>
    <tbody data-plugin="S3Source" style="display: none">
      <tr><td><input id="source.bucket" name="source.bucket" value="b1" class="disabled"></td></tr>
    </tbody>
  </table>
  <span class="plugin-info" data-plugin="source-plugin" data-content="Reads files from a local directory"></span>

  <div class="filter-container">
    <div class="filter-template" style="display: none">
      <div class="panel" id="job.filters[]">
        <div class="panel-title">
          <span>Filter </span>
          <select name="job.filters[].type" id="job.filters[].type" class="disabled"
                  onchange="changePlugin('Filter ', this)">
            <option value="IdLoggingFilter" selected>ID Logging</option>
            <option value="MetadataFilter">Metadata</option>
          </select>
          <button type="button" class="disabled" onclick="deleteFilter(document.getElementById('job.filters[]'))">x</button>
          <span class="plugin-info" data-plugin="Filter " data-content=""></span>
        </div>
        <table data-plugin="Filter ">
          <tbody data-plugin="IdLoggingFilter" data-info="Logs object ids">
            <tr><td><input name="job.filters[].idLogging.file" class="disabled" value="ids.log"></td></tr>
          </tbody>
          <tbody data-plugin="MetadataFilter" style="display: none">
            <tr><td><input name="job.filters[].metadata.add" class="disabled" value=""></td></tr>
          </tbody>
        </table>
      </div>
    </div>
    <div class="active-filters">
      <div class="panel" id="job.filters[0]">
        <div class="panel-title">
          <span>Filter 1</span>
          <select name="job.filters[0].type" onchange="changePlugin('Filter 1', this)">
            <option value="IdLoggingFilter" selected>ID Logging</option>
          </select>
        </div>
        <table data-plugin="Filter 1">
          <tbody data-plugin="IdLoggingFilter"><tr><td><input name="job.filters[0].idLogging.file" value="a.log"></td></tr></tbody>
        </table>
      </div>
      <div class="panel" id="job.filters[1]">
        <div class="panel-title">
          <span>Filter 2</span>
          <select name="job.filters[1].type" onchange="changePlugin('Filter 2', this)">
            <option value="IdLoggingFilter" selected>ID Logging</option>
          </select>
        </div>
        <table data-plugin="Filter 2">
          <tbody data-plugin="IdLoggingFilter"><tr><td><input name="job.filters[1].idLogging.file" value="b.log"></td></tr></tbody>
        </table>
      </div>
      <div class="panel" id="job.filters[2]">
        <div class="panel-title">
          <span>Filter 3</span>
          <select name="job.filters[2].type" onchange="changePlugin('Filter 3', this)">
            <option value="IdLoggingFilter" selected>ID Logging</option>
          </select>
        </div>
        <table data-plugin="Filter 3">
          <tbody data-plugin="IdLoggingFilter"><tr><td><input name="job.filters[2].idLogging.file" value="c.log"></td></tr></tbody>
        </table>
      </div>
    </div>
  </div>

  <label><input type="radio" name="storageType" value="file" checked onchange="changeConfigStorage(this)"> File</label>
  <label><input type="radio" name="storageType" value="sqlite" onchange="changeConfigStorage(this)"> SQLite</label>
  <table id="storage-configuration">
    <tbody data-storage-type="file"><tr><td><input name="storage.file.path" value="/var/sync"></td></tr></tbody>
    <tbody data-storage-type="sqlite" style="display: none"><tr><td><input name="storage.sqlite.db" value="sync.db" class="disabled"></td></tr></tbody>
  </table>
</form>
</body></html>"#;

fn job_form() -> FormModel {
    parse_form(JOB_PAGE, &Selectors::default()).unwrap()
}

fn ids_and_labels(form: &FormModel) -> Vec<(String, String)> {
    form.filter_list("job")
        .unwrap()
        .blocks
        .iter()
        .map(|b| (b.id.clone(), b.label.clone()))
        .collect()
}

#[test]
fn markup_is_read_into_the_model() {
    let form = job_form();

    let list = form.filter_list("job").unwrap();
    assert_eq!(list.blocks.len(), 3);
    let template = list.template.as_ref().unwrap();
    assert_eq!(template.label, "Filter ");
    assert!(template.controls.iter().all(|c| c.disabled));
    assert_eq!(list.blocks[1].plugin.as_ref().unwrap().key, "Filter 2");

    // the filter plugin tables belong to their blocks, not the page
    let page_groups: Vec<_> = form.groups.iter().map(|g| g.key.as_str()).collect();
    assert_eq!(page_groups, vec!["source-plugin"]);
}

#[test]
fn removing_the_middle_filter_renumbers_the_rest() {
    let mut form = job_form();
    let middle = form.filter_list("job").unwrap().handle_at(1).unwrap();
    assert!(apply(&mut form, &FormEvent::RemoveFilter {
        container: "job".to_string(),
        handle: middle,
    }));

    assert_eq!(ids_and_labels(&form), vec![
        ("job.filters[0]".to_string(), "Filter 1".to_string()),
        ("job.filters[1]".to_string(), "Filter 2".to_string()),
    ]);
    let last = &form.filter_list("job").unwrap().blocks[1];
    assert_eq!(last.controls[0].name.as_deref(), Some("job.filters[1].type"));
    assert_eq!(last.controls[0].attrs["onchange"], "changePlugin('Filter 2', this)");
    let plugin = last.plugin.as_ref().unwrap();
    assert_eq!(plugin.key, "Filter 2");
    assert_eq!(plugin.sections[0].controls[0].value, "c.log");
    assert_eq!(plugin.sections[0].controls[0].name.as_deref(), Some("job.filters[1].idLogging.file"));
}

#[test]
fn appended_filter_is_submittable_and_template_is_not() {
    let mut form = job_form();
    apply(&mut form, &FormEvent::AddFilter { container: "job".to_string() });

    let list = form.filter_list("job").unwrap();
    let added = list.blocks.last().unwrap();
    assert_eq!(added.id, "job.filters[3]");
    assert_eq!(added.label, "Filter 4");
    assert_eq!(
        added.controls[1].attrs["onclick"],
        "deleteFilter(document.getElementById('job.filters[3]'))"
    );

    let submitted = form.submission();
    let filter_names: Vec<_> = submitted
        .iter()
        .map(|(name, _)| name.as_str())
        .filter(|name| name.starts_with("job.filters"))
        .collect();
    assert_eq!(filter_names, vec![
        "job.filters[0].type",
        "job.filters[0].idLogging.file",
        "job.filters[1].type",
        "job.filters[1].idLogging.file",
        "job.filters[2].type",
        "job.filters[2].idLogging.file",
        "job.filters[3].type",
        "job.filters[3].idLogging.file",
    ]);
}

#[test]
fn switching_plugins_changes_what_is_submitted() {
    let mut form = job_form();
    apply_all(&mut form, &[
        FormEvent::ChangePlugin {
            container: None,
            group: "source-plugin".to_string(),
            value: "com.example.source.S3Source".to_string(),
        },
        FormEvent::ChangeStorage {
            radio: "storageType".to_string(),
            value: "sqlite".to_string(),
        },
    ]);

    let submitted = form.submission();
    let has = |name: &str| submitted.iter().any(|(n, _)| n == name);
    assert!(has("source.bucket"));
    assert!(!has("source.path"));
    assert!(has("storage.sqlite.db"));
    assert!(!has("storage.file.path"));
    assert!(submitted.contains(&("storageType".to_string(), "sqlite".to_string())));

    let info = form.groups[0].info.as_ref().unwrap();
    assert!(!info.visible);
}

#[test]
fn unknown_plugin_submits_nothing_for_the_group() {
    let mut form = job_form();
    apply(&mut form, &FormEvent::ChangePlugin {
        container: None,
        group: "source-plugin".to_string(),
        value: "AtmosSource".to_string(),
    });
    assert_eq!(form.groups[0].active_sections().count(), 0);
    assert!(!form.submission().iter().any(|(n, _)| n.starts_with("source.")));
}

#[test]
fn model_survives_a_toml_round_trip_unchanged() {
    let mut form = job_form();
    apply(&mut form, &FormEvent::AddFilter { container: "job".to_string() });
    let text = toml::to_string_pretty(&form).unwrap();
    let back: FormModel = toml::from_str(&text).unwrap();
    assert_eq!(back, form);
}
