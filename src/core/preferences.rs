//! Persisted user preferences: theme, font size and favorite topics.

use std::fmt;

use tracing::warn;

use crate::core::storage::{
    SharedStore, StorageError, KEY_FAVORITES, KEY_FONT_SIZE, KEY_THEME,
};

pub const MIN_FONT_SIZE_PX: u8 = 10;
pub const MAX_FONT_SIZE_PX: u8 = 22;
pub const DEFAULT_FONT_SIZE_PX: u8 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    Light,
    #[default]
    Dark,
}

impl ThemeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "light" => Some(ThemeMode::Light),
            "dark" => Some(ThemeMode::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preferences {
    pub theme: ThemeMode,
    pub font_size_px: u8,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: ThemeMode::default(),
            font_size_px: DEFAULT_FONT_SIZE_PX,
        }
    }
}

pub fn clamp_font_size(size: i64) -> u8 {
    size.clamp(MIN_FONT_SIZE_PX as i64, MAX_FONT_SIZE_PX as i64) as u8
}

pub struct PreferenceStore {
    storage: SharedStore,
    prefs: Preferences,
    favorites: Vec<String>,
}

impl PreferenceStore {
    /// Read every preference, falling back to defaults for anything missing
    /// or malformed.
    pub fn load(storage: SharedStore) -> Self {
        let theme = match storage.get(KEY_THEME) {
            Some(raw) => ThemeMode::parse(&raw).unwrap_or_else(|| {
                warn!(value = %raw, "unknown theme preference");
                ThemeMode::default()
            }),
            None => ThemeMode::default(),
        };

        let font_size_px = match storage.get(KEY_FONT_SIZE) {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(size) => clamp_font_size(size),
                Err(err) => {
                    warn!(value = %raw, error = %err, "malformed font size preference");
                    DEFAULT_FONT_SIZE_PX
                }
            },
            None => DEFAULT_FONT_SIZE_PX,
        };

        let favorites = match storage.get(KEY_FAVORITES) {
            Some(raw) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(list) => dedup_in_order(list),
                Err(err) => {
                    warn!(error = %err, "discarding malformed favorites");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        Self {
            storage,
            prefs: Preferences {
                theme,
                font_size_px,
            },
            favorites,
        }
    }

    pub fn preferences(&self) -> Preferences {
        self.prefs
    }

    pub fn theme(&self) -> ThemeMode {
        self.prefs.theme
    }

    pub fn font_size_px(&self) -> u8 {
        self.prefs.font_size_px
    }

    pub fn favorites(&self) -> &[String] {
        &self.favorites
    }

    pub fn is_favorite(&self, name: &str) -> bool {
        self.favorites.iter().any(|fav| fav == name)
    }

    pub fn toggle_theme(&mut self) -> Result<ThemeMode, StorageError> {
        self.prefs.theme = self.prefs.theme.toggled();
        self.storage.set(KEY_THEME, self.prefs.theme.as_str())?;
        Ok(self.prefs.theme)
    }

    /// Shift the font size by `delta`, clamped to the supported range. The
    /// value is written even when the clamp leaves it unchanged.
    pub fn change_font_size(&mut self, delta: i32) -> Result<u8, StorageError> {
        self.prefs.font_size_px = clamp_font_size(self.prefs.font_size_px as i64 + delta as i64);
        self.storage
            .set(KEY_FONT_SIZE, &self.prefs.font_size_px.to_string())?;
        Ok(self.prefs.font_size_px)
    }

    /// Add or remove `name`; returns whether it is now a favorite.
    pub fn toggle_favorite(&mut self, name: &str) -> Result<bool, StorageError> {
        let now_favorite = match self.favorites.iter().position(|fav| fav == name) {
            Some(index) => {
                self.favorites.remove(index);
                false
            }
            None => {
                self.favorites.push(name.to_string());
                true
            }
        };
        let encoded = serde_json::to_string(&self.favorites).map_err(StorageError::Encode)?;
        self.storage.set(KEY_FAVORITES, &encoded)?;
        Ok(now_favorite)
    }
}

fn dedup_in_order(list: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(list.len());
    for item in list {
        if !seen.contains(&item) {
            seen.push(item);
        }
    }
    seen
}

/// Star glyph shown next to a topic.
pub fn star_glyph(is_favorite: bool) -> &'static str {
    if is_favorite {
        "★"
    } else {
        "☆"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::{KeyValueStore, MemoryStore};
    use std::sync::Arc;

    fn load_with(entries: &[(&str, &str)]) -> (PreferenceStore, SharedStore) {
        let storage: SharedStore = Arc::new(MemoryStore::with_entries(entries.iter().copied()));
        (PreferenceStore::load(storage.clone()), storage)
    }

    #[test]
    fn defaults_when_nothing_is_stored() {
        let (prefs, _) = load_with(&[]);
        assert_eq!(prefs.preferences(), Preferences::default());
        assert_eq!(prefs.theme(), ThemeMode::Dark);
        assert_eq!(prefs.font_size_px(), 16);
        assert!(prefs.favorites().is_empty());
    }

    #[test]
    fn malformed_values_fall_back_to_defaults() {
        let (prefs, _) = load_with(&[
            (KEY_THEME, "sepia"),
            (KEY_FONT_SIZE, "huge"),
            (KEY_FAVORITES, "not json"),
        ]);
        assert_eq!(prefs.preferences(), Preferences::default());
        assert!(prefs.favorites().is_empty());
    }

    #[test]
    fn stored_font_size_is_clamped_on_load() {
        let (prefs, _) = load_with(&[(KEY_FONT_SIZE, "40")]);
        assert_eq!(prefs.font_size_px(), MAX_FONT_SIZE_PX);
        let (prefs, _) = load_with(&[(KEY_FONT_SIZE, "-3")]);
        assert_eq!(prefs.font_size_px(), MIN_FONT_SIZE_PX);
    }

    #[test]
    fn toggle_theme_persists_each_change() {
        let (mut prefs, storage) = load_with(&[(KEY_THEME, "light")]);
        assert_eq!(prefs.theme(), ThemeMode::Light);

        assert_eq!(prefs.toggle_theme().unwrap(), ThemeMode::Dark);
        assert_eq!(storage.get(KEY_THEME).as_deref(), Some("dark"));
        assert_eq!(prefs.toggle_theme().unwrap(), ThemeMode::Light);
        assert_eq!(storage.get(KEY_THEME).as_deref(), Some("light"));
    }

    #[test]
    fn font_size_is_idempotent_at_boundaries() {
        let (mut prefs, storage) = load_with(&[(KEY_FONT_SIZE, "22")]);
        assert_eq!(prefs.change_font_size(5).unwrap(), 22);
        assert_eq!(storage.get(KEY_FONT_SIZE).as_deref(), Some("22"));

        let (mut prefs, storage) = load_with(&[(KEY_FONT_SIZE, "10")]);
        assert_eq!(prefs.change_font_size(-5).unwrap(), 10);
        assert_eq!(storage.get(KEY_FONT_SIZE).as_deref(), Some("10"));
    }

    #[test]
    fn boundary_no_op_still_writes() {
        let (mut prefs, storage) = load_with(&[(KEY_FONT_SIZE, "22")]);
        storage.remove(KEY_FONT_SIZE).unwrap();
        prefs.change_font_size(1).unwrap();
        assert_eq!(storage.get(KEY_FONT_SIZE).as_deref(), Some("22"));
    }

    #[test]
    fn font_size_steps_within_range() {
        let (mut prefs, _) = load_with(&[]);
        assert_eq!(prefs.change_font_size(1).unwrap(), 17);
        assert_eq!(prefs.change_font_size(-3).unwrap(), 14);
    }

    #[test]
    fn toggling_a_favorite_twice_restores_set_and_glyph() {
        let (mut prefs, storage) = load_with(&[(KEY_FAVORITES, r#"["Cough (Sual)"]"#)]);
        let name = "Fever (Humma)";
        let before = prefs.favorites().to_vec();
        let glyph_before = star_glyph(prefs.is_favorite(name));

        assert!(prefs.toggle_favorite(name).unwrap());
        assert_eq!(star_glyph(prefs.is_favorite(name)), "★");
        assert_eq!(
            storage.get(KEY_FAVORITES).as_deref(),
            Some(r#"["Cough (Sual)","Fever (Humma)"]"#)
        );

        assert!(!prefs.toggle_favorite(name).unwrap());
        assert_eq!(prefs.favorites(), before.as_slice());
        assert_eq!(star_glyph(prefs.is_favorite(name)), glyph_before);
        assert_eq!(
            storage.get(KEY_FAVORITES).as_deref(),
            Some(r#"["Cough (Sual)"]"#)
        );
    }

    #[test]
    fn duplicate_stored_favorites_collapse() {
        let (prefs, _) = load_with(&[(KEY_FAVORITES, r#"["A","B","A"]"#)]);
        assert_eq!(prefs.favorites(), &["A".to_string(), "B".to_string()]);
    }
}
