//! Template rendering and document splitting.

use super::filters;
use crate::error::ClusterError;
use reana_backend::{BackendConfig, Manifest};
use serde_json::{Map, Value};
use tracing::debug;

/// Parameter file read from the templates folder
const PARAMETERS_FILE: &str = "config.yaml";

/// Entry template including every resource template
const ENTRY_TEMPLATE: &str = "backend_conf.yaml";

/// Load the parameter file of the templates folder
pub(crate) fn load_parameters(config: &BackendConfig) -> Result<Map<String, Value>, ClusterError> {
    let path = config.template_path(PARAMETERS_FILE);
    let contents = std::fs::read_to_string(&path).map_err(|e| {
        ClusterError::configuration(format!("cannot read parameters file {}: {e}", path.display()))
    })?;
    let parameters: Option<Map<String, Value>> = serde_yaml::from_str(&contents).map_err(|e| {
        ClusterError::configuration(format!("malformed parameters file {}: {e}", path.display()))
    })?;
    Ok(parameters.unwrap_or_default())
}

/// Render the entry template with `context`
pub fn render_templates(config: &BackendConfig, context: &Value) -> Result<String, ClusterError> {
    let mut env = minijinja::Environment::new();
    env.set_loader(minijinja::path_loader(&config.templates_folder));
    env.set_undefined_behavior(minijinja::UndefinedBehavior::Strict);
    env.add_filter("quote", filters::quote);

    let template = env.get_template(ENTRY_TEMPLATE).map_err(|e| {
        ClusterError::configuration(format!(
            "cannot load templates from {}: {e}",
            config.templates_folder.display()
        ))
    })?;
    let rendered = template
        .render(context)
        .map_err(|e| ClusterError::configuration(format!("failed to render templates: {e:#}")))?;

    debug!("Rendered {} bytes of manifests", rendered.len());
    Ok(rendered)
}

/// Split rendered text into manifests.
///
/// Blank lines are dropped, documents are separated by `---` lines and
/// empty documents are skipped. Every remaining document must carry a
/// `kind` and `metadata.name`.
pub fn split_documents(rendered: &str) -> Result<Vec<Manifest>, ClusterError> {
    let mut documents = vec![String::new()];
    for line in rendered.lines().filter(|line| !line.trim().is_empty()) {
        if line.trim_end() == "---" {
            documents.push(String::new());
        } else if let Some(current) = documents.last_mut() {
            current.push_str(line);
            current.push('\n');
        }
    }

    let mut manifests = Vec::new();
    for (index, document) in documents.iter().enumerate() {
        if document.lines().all(|line| line.trim_start().starts_with('#')) {
            continue;
        }
        let value: Value = serde_yaml::from_str(document).map_err(|e| {
            ClusterError::configuration(format!("rendered document #{index} is not valid YAML: {e}"))
        })?;
        if value.is_null() {
            continue;
        }
        let manifest = Manifest::try_from(value)
            .map_err(|e| ClusterError::configuration(format!("rendered document #{index}: {e}")))?;
        manifests.push(manifest);
    }
    Ok(manifests)
}
