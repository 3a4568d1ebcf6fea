//! Explicit binding of a JSON document onto a [`Manifest`].
//!
//! Fields are looked up one by one rather than derived, so the leniency rules
//! live in one place:
//! - keys match case-insensitively (configurable);
//! - unknown keys are ignored (configurable);
//! - `null` is the same as leaving a field out;
//! - anything present with the wrong type is an error, never a silent default.

use crate::error::{ErrorKind, Result};
use crate::manifest::{DebugConfig, Manifest, WindowConfig};
use exn::ResultExt;
use serde_json::{Map, Value};

const MANIFEST_FIELDS: &[&str] = &["name", "version", "entry", "window", "debug"];
const WINDOW_FIELDS: &[&str] = &["title", "width", "height", "resizable"];
const DEBUG_FIELDS: &[&str] = &["openDevTools"];

const BOM: &[u8] = b"\xEF\xBB\xBF";

/// How strictly a manifest document is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Match keys ignoring ASCII case (`OpenDevTools` == `opendevtools`).
    pub case_insensitive: bool,
    /// Skip keys that don't correspond to a field instead of failing.
    pub ignore_unknown: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { case_insensitive: true, ignore_unknown: true }
    }
}

impl ParseOptions {
    /// Exact key names, unknown keys rejected.
    pub fn strict() -> Self {
        Self { case_insensitive: false, ignore_unknown: false }
    }
}

pub(crate) fn parse(bytes: &[u8], options: &ParseOptions) -> Result<Manifest> {
    let bytes = bytes.strip_prefix(BOM).unwrap_or(bytes);
    let document: Value = serde_json::from_slice(bytes).or_raise(|| ErrorKind::Parse)?;
    let object = match document {
        Value::Null => return Ok(Manifest::default()),
        Value::Object(object) if options.case_insensitive => fold_keys(object),
        Value::Object(object) => object,
        other => exn::bail!(invalid("(document)", &other)),
    };

    let root = Record { path: "", object: &object, options };
    root.check_unknown(MANIFEST_FIELDS)?;

    let mut window = WindowConfig::default();
    if let Some(record) = root.record("window")? {
        record.check_unknown(WINDOW_FIELDS)?;
        window.title = record.string("title")?;
        window.width = record.dimension("width")?.unwrap_or(window.width);
        window.height = record.dimension("height")?.unwrap_or(window.height);
        window.resizable = record.flag("resizable")?.unwrap_or(window.resizable);
    }
    let mut debug = DebugConfig::default();
    if let Some(record) = root.record("debug")? {
        record.check_unknown(DEBUG_FIELDS)?;
        debug.open_dev_tools = record.flag("openDevTools")?.unwrap_or(debug.open_dev_tools);
    }

    Ok(Manifest {
        name: root.string("name")?,
        version: root.string("version")?,
        entry: root.string("entry")?,
        window,
        debug,
    })
}

/// Lowercases every object key, recursively. Later duplicates win.
fn fold_keys(object: Map<String, Value>) -> Map<String, Value> {
    object.into_iter().map(|(key, value)| (key.to_ascii_lowercase(), fold_value(value))).collect()
}

fn fold_value(value: Value) -> Value {
    match value {
        Value::Object(object) => Value::Object(fold_keys(object)),
        Value::Array(items) => Value::Array(items.into_iter().map(fold_value).collect()),
        other => other,
    }
}

fn invalid(field: &str, value: &Value) -> ErrorKind {
    ErrorKind::InvalidValue { field: field.to_string(), value: value.to_string() }
}

/// One JSON object in the manifest, with the dotted path that led to it.
struct Record<'a> {
    path: &'static str,
    object: &'a Map<String, Value>,
    options: &'a ParseOptions,
}

impl<'a> Record<'a> {
    fn field_path(&self, key: &str) -> String {
        match self.path {
            "" => key.to_string(),
            path => format!("{path}.{key}"),
        }
    }

    /// Present, non-null value for `key`.
    fn get(&self, key: &str) -> Option<&'a Value> {
        let value = match self.options.case_insensitive {
            true => self.object.get(&key.to_ascii_lowercase()),
            false => self.object.get(key),
        };
        value.filter(|value| !value.is_null())
    }

    fn check_unknown(&self, known: &[&str]) -> Result<()> {
        if self.options.ignore_unknown {
            return Ok(());
        }
        for key in self.object.keys() {
            let is_known = known.iter().any(|known| match self.options.case_insensitive {
                true => known.eq_ignore_ascii_case(key),
                false => *known == key,
            });
            if !is_known {
                exn::bail!(ErrorKind::UnknownField(self.field_path(key)));
            }
        }
        Ok(())
    }

    fn record(&self, key: &'static str) -> Result<Option<Record<'a>>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Object(object)) => Ok(Some(Record { path: key, object, options: self.options })),
            Some(other) => exn::bail!(invalid(&self.field_path(key), other)),
        }
    }

    fn string(&self, key: &str) -> Result<Option<String>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => exn::bail!(invalid(&self.field_path(key), other)),
        }
    }

    fn flag(&self, key: &str) -> Result<Option<bool>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => exn::bail!(invalid(&self.field_path(key), other)),
        }
    }

    /// A window dimension: a whole number from 1 to `u32::MAX`.
    fn dimension(&self, key: &str) -> Result<Option<u32>> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        match value.as_u64().and_then(|n| u32::try_from(n).ok()) {
            Some(n) if n >= 1 => Ok(Some(n)),
            _ => exn::bail!(invalid(&self.field_path(key), value)),
        }
    }
}
