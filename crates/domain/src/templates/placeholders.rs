//! `{{NAME}}` placeholder scanning and substitution over a JSON skeleton
//!
//! Substitution is structural: the skeleton is walked once and every string
//! node is resolved against a [`SlotArena`] built from the validated
//! parameters. Substituted text is never re-scanned, so a parameter value can
//! not introduce new placeholders or change the shape of the rule.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::{Map, Value};

use crate::entities::TemplateParameter;

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("valid regex")
});
static WHOLE_PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}$").expect("valid regex")
});
// Anything between double braces; tokens that do not also match
// PLACEHOLDER_RE are malformed.
static BRACED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^{}]*)\}\}").expect("valid regex"));

/// Placeholders found in a skeleton.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceholderScan {
    /// Distinct names in order of first appearance.
    pub names: Vec<String>,
    /// Brace tokens whose content is not a valid parameter name.
    pub malformed: Vec<String>,
}

impl PlaceholderScan {
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.malformed.is_empty()
    }

    /// Every token found, names rendered back in brace form.
    pub fn tokens(&self) -> Vec<String> {
        self.names
            .iter()
            .map(|name| format!("{{{{{}}}}}", name))
            .chain(self.malformed.iter().cloned())
            .collect()
    }

    fn scan_text(&mut self, text: &str) {
        for token in BRACED_RE.find_iter(text) {
            match PLACEHOLDER_RE.captures(token.as_str()) {
                Some(caps) => {
                    let name = &caps[1];
                    if !self.contains(name) {
                        self.names.push(name.to_string());
                    }
                }
                None => {
                    let token = token.as_str().to_string();
                    if !self.malformed.contains(&token) {
                        self.malformed.push(token);
                    }
                }
            }
        }
    }
}

/// Collect every placeholder token in the skeleton, keys included.
pub fn scan(skeleton: &Value) -> PlaceholderScan {
    let mut scan = PlaceholderScan::default();
    walk_text(skeleton, &mut |text| scan.scan_text(text));
    scan
}

/// Whether a (parameter) value carries a placeholder or a fragment of one.
///
/// Any `{{` or `}}` counts: two adjacent embedded placeholders could
/// otherwise assemble a token from harmless-looking halves.
pub fn contains_placeholder(value: &Value) -> bool {
    let mut found = false;
    walk_text(value, &mut |text| {
        found |= text.contains("{{") || text.contains("}}")
    });
    found
}


fn walk_text(value: &Value, visit: &mut impl FnMut(&str)) {
    match value {
        Value::String(text) => visit(text),
        Value::Array(items) => {
            for item in items {
                walk_text(item, visit);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                visit(key);
                walk_text(item, visit);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

/// Canonical textual form of a parameter value: strings literal, everything
/// else JSON-encoded, absent values empty.
pub fn render_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone)]
struct Slot {
    value: Value,
    text: String,
}

/// Named slots resolved once from the declared parameters and their final
/// values.
#[derive(Debug, Clone, Default)]
pub struct SlotArena {
    slots: Vec<Slot>,
    index: HashMap<String, usize>,
}

impl SlotArena {
    /// One slot per declared parameter. Parameters without a value resolve
    /// to `null` (whole-node) or empty text (embedded).
    pub fn from_parameters(parameters: &[TemplateParameter], values: &Map<String, Value>) -> Self {
        let mut arena = Self::default();
        for parameter in parameters {
            let value = values.get(&parameter.name).cloned().unwrap_or(Value::Null);
            arena.insert(&parameter.name, value);
        }
        arena
    }

    pub fn insert(&mut self, name: &str, value: Value) {
        let slot = Slot {
            text: render_text(&value),
            value,
        };
        match self.index.get(name) {
            Some(&i) => self.slots[i] = slot,
            None => {
                self.index.insert(name.to_string(), self.slots.len());
                self.slots.push(slot);
            }
        }
    }

    fn get(&self, name: &str) -> Option<&Slot> {
        self.index.get(name).map(|&i| &self.slots[i])
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Replace every placeholder in `skeleton`.
///
/// # Errors
///
/// Returns the name of the first placeholder with no slot. Templates that
/// passed their save-time definition check never produce this.
pub fn substitute(skeleton: &Value, arena: &SlotArena) -> Result<Value, String> {
    match skeleton {
        Value::String(text) => {
            if let Some(caps) = WHOLE_PLACEHOLDER_RE.captures(text) {
                let name = &caps[1];
                return arena
                    .get(name)
                    .map(|slot| slot.value.clone())
                    .ok_or_else(|| name.to_string());
            }
            substitute_text(text, arena).map(Value::String)
        }
        Value::Array(items) => items
            .iter()
            .map(|item| substitute(item, arena))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, item) in map {
                out.insert(substitute_text(key, arena)?, substitute(item, arena)?);
            }
            Ok(Value::Object(out))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_text(text: &str, arena: &SlotArena) -> Result<String, String> {
    let mut missing = None;
    let replaced = PLACEHOLDER_RE.replace_all(text, |caps: &Captures| match arena.get(&caps[1]) {
        Some(slot) => slot.text.clone(),
        None => {
            missing.get_or_insert_with(|| caps[1].to_string());
            String::new()
        }
    });
    match missing {
        Some(name) => Err(name),
        None => Ok(replaced.into_owned()),
    }
}
