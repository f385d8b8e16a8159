//! Subcommand implementations.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use annotations::{
    annotation_to_json, Annotation, ContainerMode, MetadataDocument, ResolutionContext,
    SynthesizedAnnotation,
};

/// Output of `repeatables check`.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub annotation_types: usize,
    pub repeatable_types: Vec<String>,
    pub chain: String,
}

/// Output of `repeatables resolve`.
#[derive(Debug, Serialize)]
pub struct ResolveReport {
    pub annotation_type: String,
    pub chain: String,
    pub container: bool,
    pub elements: Vec<Value>,
}

pub fn load_json(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

pub fn load_metadata(path: &Path) -> Result<MetadataDocument> {
    let document = serde_json::from_value(load_json(path)?)
        .with_context(|| format!("invalid metadata document {}", path.display()))?;
    debug!(path = %path.display(), "loaded metadata document");
    Ok(document)
}

/// Validates the document's types and container mappings.
pub fn check(document: &MetadataDocument) -> Result<CheckReport> {
    let registry = document.registry().context("invalid annotation types")?;
    let chain = document
        .repeatable_containers
        .build(&registry)
        .context("invalid repeatable container configuration")?;

    let repeatable_types = registry
        .iter()
        .filter(|descriptor| descriptor.is_repeatable())
        .map(|descriptor| descriptor.id.to_string())
        .collect();

    info!(annotation_types = registry.len(), chain = %chain, "metadata document is valid");
    Ok(CheckReport {
        annotation_types: registry.len(),
        repeatable_types,
        chain: chain.to_string(),
    })
}

/// Resolves `instance` against the chain configured in `document`.
///
/// `mode` replaces the document's configured base strategy when given; the
/// explicit mappings are applied on top either way.
pub fn resolve(
    document: &MetadataDocument,
    instance: &Value,
    mode: Option<ContainerMode>,
) -> Result<ResolveReport> {
    let registry = Arc::new(document.registry().context("invalid annotation types")?);

    let mut config = document.repeatable_containers.clone();
    if let Some(mode) = mode {
        config.mode = mode;
    }
    let chain = config
        .build(&registry)
        .context("invalid repeatable container configuration")?;

    let annotation =
        SynthesizedAnnotation::from_json(&registry, instance).context("invalid annotation")?;
    let context = ResolutionContext::new(Arc::clone(&registry));
    let repeated = chain
        .find_repeated_annotations(&annotation, &context)
        .context("failed to read container attributes")?;

    let container = repeated.is_some();
    let elements = repeated
        .unwrap_or_default()
        .iter()
        .map(|element| annotation_to_json(element.as_ref(), &registry))
        .collect::<Result<Vec<_>, _>>()
        .context("failed to render contained annotations")?;

    info!(
        annotation_type = %annotation.annotation_type(),
        chain = %chain,
        container,
        elements = elements.len(),
        "resolved annotation"
    );
    Ok(ResolveReport {
        annotation_type: annotation.annotation_type().to_string(),
        chain: chain.to_string(),
        container,
        elements,
    })
}
