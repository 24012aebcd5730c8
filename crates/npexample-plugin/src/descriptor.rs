//! MIME registration and plugin identity strings.
//!
//! The host asks for these before the plugin is initialized, so everything
//! here is static and side-effect free.

use std::ffi::CStr;

use crate::error::PluginError;

/// Value of the plugin's name property.
pub const PLUGIN_NAME: &CStr = c"example";

/// Value of the plugin's description property.
pub const PLUGIN_DESCRIPTION: &CStr = c"Example plugin";

/// MIME description handed to the host, NUL-terminated for the C ABI.
pub const MIME_DESCRIPTION_C: &CStr = c"application/x-npexample:example:Example plugin data";

/// [`MIME_DESCRIPTION_C`] without the terminator.
pub const MIME_DESCRIPTION: &str = "application/x-npexample:example:Example plugin data";

/// One content type the plugin handles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimeType {
    pub mime: String,
    pub extensions: Vec<String>,
    pub description: String,
}

impl MimeType {
    pub fn new(mime: &str, extensions: &[&str], description: &str) -> Self {
        Self {
            mime: mime.to_string(),
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
            description: description.to_string(),
        }
    }
}

/// The content types this plugin registers.
pub fn supported_mime_types() -> Vec<MimeType> {
    vec![MimeType::new(
        "application/x-npexample",
        &["example"],
        "Example plugin data",
    )]
}

/// The descriptor string `<mime>:<ext,...>:<description>[;...]`.
pub fn describe() -> &'static str {
    MIME_DESCRIPTION
}

// ─── Validation helpers ─────────────────────────────────────────────

/// Characters with structural meaning in the descriptor string.
const SEPARATORS: &[char] = &[':', ';', ','];

/// Validate a MIME type as `type/subtype` with no separators or whitespace.
fn validate_mime(mime: &str) -> Result<(), PluginError> {
    let Some((top, sub)) = mime.split_once('/') else {
        return Err(PluginError::InvalidDescriptor(format!(
            "MIME type must be 'type/subtype', got '{mime}'"
        )));
    };
    if top.is_empty() || sub.is_empty() || sub.contains('/') {
        return Err(PluginError::InvalidDescriptor(format!(
            "MIME type must be 'type/subtype', got '{mime}'"
        )));
    }
    if mime.contains(SEPARATORS) || mime.chars().any(char::is_whitespace) {
        return Err(PluginError::InvalidDescriptor(format!(
            "MIME type contains a reserved character: '{mime}'"
        )));
    }
    Ok(())
}

/// Validate a file extension hint (no dot, no separators, no whitespace).
fn validate_extension(ext: &str) -> Result<(), PluginError> {
    if ext.is_empty()
        || ext.starts_with('.')
        || ext.contains(SEPARATORS)
        || ext.chars().any(char::is_whitespace)
    {
        return Err(PluginError::InvalidDescriptor(format!(
            "invalid file extension: '{ext}'"
        )));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), PluginError> {
    if description.contains(';') {
        return Err(PluginError::InvalidDescriptor(format!(
            "description contains a reserved character: '{description}'"
        )));
    }
    Ok(())
}

// ─── Formatting / parsing ───────────────────────────────────────────

/// Build a descriptor string from a list of content types.
pub fn format_mime_description(types: &[MimeType]) -> Result<String, PluginError> {
    if types.is_empty() {
        return Err(PluginError::InvalidDescriptor(
            "at least one MIME type is required".into(),
        ));
    }

    let mut groups = Vec::with_capacity(types.len());
    for t in types {
        validate_mime(&t.mime)?;
        for ext in &t.extensions {
            validate_extension(ext)?;
        }
        validate_description(&t.description)?;
        groups.push(format!(
            "{}:{}:{}",
            t.mime,
            t.extensions.join(","),
            t.description
        ));
    }

    Ok(groups.join(";"))
}

/// Parse a descriptor string into its content types.
///
/// Empty groups (a trailing `;`) are skipped, but at least one group must
/// remain.
pub fn parse_mime_description(description: &str) -> Result<Vec<MimeType>, PluginError> {
    let mut types = Vec::new();
    for group in description.split(';').filter(|g| !g.trim().is_empty()) {
        let mut fields = group.splitn(3, ':');
        let mime = fields.next().unwrap_or_default().trim();
        let (Some(exts), Some(desc)) = (fields.next(), fields.next()) else {
            return Err(PluginError::InvalidDescriptor(format!(
                "expected '<mime>:<extensions>:<description>', got '{group}'"
            )));
        };

        validate_mime(mime)?;
        let extensions: Vec<String> = exts
            .split(',')
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string)
            .collect();
        for ext in &extensions {
            validate_extension(ext)?;
        }

        types.push(MimeType {
            mime: mime.to_string(),
            extensions,
            description: desc.to_string(),
        });
    }
    if types.is_empty() {
        return Err(PluginError::InvalidDescriptor(
            "at least one MIME type is required".into(),
        ));
    }
    Ok(types)
}
