use crate::editor::autosave::DEFAULT_AUTOSAVE_MS;
use crate::editor::core::EditorSettings;
use crate::editor::history::DEFAULT_HISTORY_LIMIT;

pub(crate) const DEFAULT_API_URL: &str = "http://localhost:6689";

/// Runtime configuration, injected by the host page as `window.ENV`.
#[derive(Clone, Debug, PartialEq)]
pub struct EditorConfig {
    pub api_url: String,
    pub autosave_ms: i64,
    pub history_limit: usize,
    /// Queue pending debounced saves on unmount instead of dropping them.
    pub flush_on_unmount: bool,
    pub log_level: log::LevelFilter,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            autosave_ms: DEFAULT_AUTOSAVE_MS,
            history_limit: DEFAULT_HISTORY_LIMIT,
            flush_on_unmount: false,
            log_level: log::LevelFilter::Info,
        }
    }
}

impl EditorConfig {
    /// Read `window.ENV`. Anything missing or unparsable keeps its default.
    pub fn new() -> Self {
        let env = web_sys::window()
            .and_then(|w| w.get("ENV"))
            .filter(|env| !env.is_undefined() && env.is_object());

        match env {
            Some(env) => Self::from_lookup(|key| {
                let v = js_sys::Reflect::get(&env, &key.into()).ok()?;
                v.as_string()
                    .or_else(|| v.as_f64().map(|n| n.to_string()))
                    .or_else(|| v.as_bool().map(|b| b.to_string()))
            }),
            None => Self::default(),
        }
    }

    /// Both `API_URL` (documented) and `api_url` are accepted; the upper-case
    /// form wins. The same holds for every other key.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| get(key).or_else(|| get(&key.to_lowercase()));
        let mut cfg = Self::default();

        if let Some(url) = read("API_URL").filter(|s| !s.trim().is_empty()) {
            cfg.api_url = url;
        }
        if let Some(ms) = read("AUTOSAVE_MS").and_then(|s| parse_number(&s)) {
            if ms >= 0 {
                cfg.autosave_ms = ms;
            }
        }
        if let Some(n) = read("HISTORY_LIMIT").and_then(|s| parse_number(&s)) {
            if n > 0 {
                cfg.history_limit = n as usize;
            }
        }
        if let Some(b) = read("FLUSH_ON_UNMOUNT").and_then(|s| parse_flag(&s)) {
            cfg.flush_on_unmount = b;
        }
        if let Some(level) = read("LOG_LEVEL").and_then(|s| s.trim().parse().ok()) {
            cfg.log_level = level;
        }
        cfg
    }

    pub fn editor_settings(&self) -> EditorSettings {
        EditorSettings {
            autosave_ms: self.autosave_ms,
            history_limit: self.history_limit,
            text_burst_ms: self.autosave_ms,
        }
    }
}

fn parse_number(s: &str) -> Option<i64> {
    let s = s.trim();
    s.parse::<i64>()
        .ok()
        .or_else(|| s.parse::<f64>().ok().map(|f| f.round() as i64))
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
