use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    Auto,
}

impl Default for Theme {
    fn default() -> Self {
        Self::Auto
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SearchEngine {
    Google,
    Bing,
    DuckDuckGo,
    Yahoo,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::Google
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Comfortable,
    Compact,
    Spacious,
}

impl Default for Layout {
    fn default() -> Self {
        Self::Comfortable
    }
}

pub const DEFAULT_ACCENT_COLOR: &str = "59, 130, 246";

/// User preferences persisted next to the tabs.
///
/// Deserialization fills every missing key from [`Settings::default`], so an
/// older document that lacks e.g. `layout` still loads. Keys this version does
/// not know about are kept in `extra` and written back unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub theme: Theme,
    /// "R, G, B" triple, e.g. "59, 130, 246".
    pub accent_color: String,
    pub search_engine: SearchEngine,
    pub layout: Layout,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            accent_color: DEFAULT_ACCENT_COLOR.to_string(),
            search_engine: SearchEngine::default(),
            layout: Layout::default(),
            extra: Map::new(),
        }
    }
}

impl Settings {
    fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// Returns the value stored under a wire key (`"accentColor"`, not `accent_color`).
    pub fn get(&self, key: &str) -> Option<Value> {
        self.to_map().remove(key)
    }

    /// Replaces a single existing key. Unknown keys and values that do not fit
    /// the key's type are rejected and leave the settings untouched.
    pub fn set(&mut self, key: &str, value: Value) -> bool {
        let mut map = self.to_map();
        if !map.contains_key(key) {
            log::warn!("[Settings] Ignoring unknown setting '{}'", key);
            return false;
        }
        map.insert(key.to_string(), value);

        match serde_json::from_value::<Settings>(Value::Object(map)) {
            Ok(updated) => {
                *self = updated;
                true
            }
            Err(e) => {
                log::warn!("[Settings] Rejected value for '{}': {}", key, e);
                false
            }
        }
    }

    /// Overlays `overrides` key by key on top of `self`.
    pub fn merge(&self, overrides: &Map<String, Value>) -> Result<Settings, serde_json::Error> {
        let mut map = self.to_map();
        for (key, value) in overrides {
            map.insert(key.clone(), value.clone());
        }
        serde_json::from_value(Value::Object(map))
    }

    /// Like [`Settings::merge`], but each key is applied on its own and a key
    /// whose value does not fit is dropped instead of failing the whole map.
    pub fn merge_lenient(&self, overrides: &Map<String, Value>) -> Settings {
        let mut merged = self.clone();
        for (key, value) in overrides {
            let mut single = Map::new();
            single.insert(key.clone(), value.clone());
            match merged.merge(&single) {
                Ok(updated) => merged = updated,
                Err(e) => log::warn!("[Settings] Dropping stored value for '{}': {}", key, e),
            }
        }
        merged
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Accent colour as plain RGB components, `None` if the stored string is malformed.
    pub fn accent_rgb(&self) -> Option<(u8, u8, u8)> {
        let parts: Vec<u8> = self
            .accent_color
            .split(',')
            .map(|p| p.trim().parse::<u8>())
            .collect::<Result<_, _>>()
            .ok()?;

        match parts.as_slice() {
            [r, g, b] => Some((*r, *g, *b)),
            _ => None,
        }
    }
}
