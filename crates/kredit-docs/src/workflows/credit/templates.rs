//! Document templates: flat ODF text files (`.fodt`) with `{{ key }}` placeholders.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use regex::{Captures, Regex};
use tracing::{debug, info};

use super::category::Category;
use super::context::ContextValue;

/// The only file extension accepted for uploaded templates.
pub const TEMPLATE_EXTENSION: &str = "fodt";

/// Content type of rendered documents.
pub const DOCUMENT_CONTENT_TYPE: &str = "application/vnd.oasis.opendocument.text-flat-xml";

const LINE_BREAK: &str = "<text:line-break/>";
const OPEN_DELIMITER: &str = "{{";
const FRAGMENT_CHARS: usize = 24;

/// Errors raised while loading, storing or rendering templates.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("template '{template_id}' not found")]
    NotFound { template_id: String },
    #[error("template '{template_id}' is not valid UTF-8 text")]
    Encoding { template_id: String },
    #[error("template '{template_id}' has a malformed placeholder near '{fragment}'")]
    Render {
        template_id: String,
        fragment: String,
    },
    #[error("'{file_name}' rejected: only .{} templates are accepted", TEMPLATE_EXTENSION)]
    UnsupportedExtension { file_name: String },
    #[error("template storage failed for '{template_id}': {source}")]
    Io {
        template_id: String,
        #[source]
        source: io::Error,
    },
}

/// Renders a template with the given context into document bytes.
pub trait TemplateRenderer: Send + Sync {
    fn render(
        &self,
        template_id: &str,
        fields: &BTreeMap<String, ContextValue>,
    ) -> Result<Vec<u8>, TemplateError>;
}

/// Where template files live.
pub trait TemplateAssetStore: Send + Sync {
    fn load(&self, template_id: &str) -> Result<Vec<u8>, TemplateError>;
    /// Replaces the document template of `category`, returning its template id.
    fn save(
        &self,
        category: Category,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<String, TemplateError>;
}

/// Substitutes `{{ key }}` placeholders in templates read from an asset store.
pub struct PlaceholderRenderer<S> {
    assets: Arc<S>,
}

impl<S> PlaceholderRenderer<S>
where
    S: TemplateAssetStore,
{
    pub fn new(assets: Arc<S>) -> Self {
        Self { assets }
    }
}

impl<S> TemplateRenderer for PlaceholderRenderer<S>
where
    S: TemplateAssetStore,
{
    fn render(
        &self,
        template_id: &str,
        fields: &BTreeMap<String, ContextValue>,
    ) -> Result<Vec<u8>, TemplateError> {
        let raw = self.assets.load(template_id)?;
        let text = String::from_utf8(raw).map_err(|_| TemplateError::Encoding {
            template_id: template_id.to_string(),
        })?;
        render_placeholders(template_id, &text, fields).map(String::into_bytes)
    }
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").expect("placeholder pattern compiles")
    })
}

/// Replaces every placeholder. Keys without a value render as empty text; a
/// `{{` that does not open a well-formed placeholder fails the render.
pub fn render_placeholders(
    template_id: &str,
    template: &str,
    fields: &BTreeMap<String, ContextValue>,
) -> Result<String, TemplateError> {
    let pattern = placeholder_pattern();

    let starts: BTreeSet<usize> = pattern
        .find_iter(template)
        .map(|found| found.start())
        .collect();
    if let Some((offset, _)) = template
        .match_indices(OPEN_DELIMITER)
        .find(|(offset, _)| !starts.contains(offset))
    {
        return Err(TemplateError::Render {
            template_id: template_id.to_string(),
            fragment: template[offset..].chars().take(FRAGMENT_CHARS).collect(),
        });
    }

    let rendered = pattern.replace_all(template, |captures: &Captures<'_>| {
        match fields.get(&captures[1]) {
            Some(ContextValue::Text(value)) => escape_xml(value),
            Some(ContextValue::List(items)) => items
                .iter()
                .map(|item| escape_xml(item))
                .collect::<Vec<_>>()
                .join(LINE_BREAK),
            None => {
                debug!(
                    template_id,
                    placeholder = &captures[1],
                    "placeholder has no value"
                );
                String::new()
            }
        }
    });
    Ok(rendered.into_owned())
}

fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Templates stored as `<template_id>.fodt` under a root directory.
#[derive(Debug, Clone)]
pub struct FsTemplateStore {
    root: PathBuf,
}

impl FsTemplateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, template_id: &str) -> PathBuf {
        self.root.join(format!("{template_id}.{TEMPLATE_EXTENSION}"))
    }
}

impl TemplateAssetStore for FsTemplateStore {
    fn load(&self, template_id: &str) -> Result<Vec<u8>, TemplateError> {
        match fs::read(self.path_for(template_id)) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Err(TemplateError::NotFound {
                template_id: template_id.to_string(),
            }),
            Err(source) => Err(TemplateError::Io {
                template_id: template_id.to_string(),
                source,
            }),
        }
    }

    fn save(
        &self,
        category: Category,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<String, TemplateError> {
        if !has_template_extension(file_name) {
            return Err(TemplateError::UnsupportedExtension {
                file_name: file_name.to_string(),
            });
        }

        let template_id = category.descriptor().document_template;
        let io_error = |source| TemplateError::Io {
            template_id: template_id.to_string(),
            source,
        };

        fs::create_dir_all(&self.root).map_err(io_error)?;
        let target = self.path_for(template_id);
        let staging = target.with_extension(format!("{TEMPLATE_EXTENSION}.upload"));
        fs::write(&staging, bytes).map_err(io_error)?;
        fs::rename(&staging, &target).map_err(io_error)?;

        info!(%category, template_id, size = bytes.len(), "document template replaced");
        Ok(template_id.to_string())
    }
}

fn has_template_extension(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(TEMPLATE_EXTENSION))
        .unwrap_or(false)
}
