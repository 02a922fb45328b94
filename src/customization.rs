use crate::storage::SharedStore;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

// hex codes or bare colour names - anything else could break out of a style attribute.
// constant pattern, forced by the colour validation tests
static COLOR_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(#[0-9a-fA-F]{3}|#[0-9a-fA-F]{6}|[a-zA-Z]{3,20})$").expect("valid colour regex")
});

pub const SETTING_KEYS: [&str; 6] = [
    "TERMINAL_BACKGROUND_COLOR",
    "TERMINAL_REPLY_COLOR",
    "TERMINAL_DIRECTORY_PROMPT_COLOR",
    "TERMINAL_COMMAND_PROMPT_COLOR",
    "TERMINAL_LS_FILE_COLOR",
    "TERMINAL_LS_FOLDER_COLOR",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ColorSettings {
    pub terminal_background_color: String,
    pub terminal_reply_color: String,
    pub terminal_directory_prompt_color: String,
    pub terminal_command_prompt_color: String,
    pub terminal_ls_file_color: String,
    pub terminal_ls_folder_color: String,
}

impl ColorSettings {
    fn slot_mut(&mut self, key: &str) -> Option<&mut String> {
        match key {
            "TERMINAL_BACKGROUND_COLOR" => Some(&mut self.terminal_background_color),
            "TERMINAL_REPLY_COLOR" => Some(&mut self.terminal_reply_color),
            "TERMINAL_DIRECTORY_PROMPT_COLOR" => Some(&mut self.terminal_directory_prompt_color),
            "TERMINAL_COMMAND_PROMPT_COLOR" => Some(&mut self.terminal_command_prompt_color),
            "TERMINAL_LS_FILE_COLOR" => Some(&mut self.terminal_ls_file_color),
            "TERMINAL_LS_FOLDER_COLOR" => Some(&mut self.terminal_ls_folder_color),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        let value = match key {
            "TERMINAL_BACKGROUND_COLOR" => &self.terminal_background_color,
            "TERMINAL_REPLY_COLOR" => &self.terminal_reply_color,
            "TERMINAL_DIRECTORY_PROMPT_COLOR" => &self.terminal_directory_prompt_color,
            "TERMINAL_COMMAND_PROMPT_COLOR" => &self.terminal_command_prompt_color,
            "TERMINAL_LS_FILE_COLOR" => &self.terminal_ls_file_color,
            "TERMINAL_LS_FOLDER_COLOR" => &self.terminal_ls_folder_color,
            _ => return None,
        };
        Some(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Classic,
    Solarized,
    Dracula,
    Paper,
}

impl Theme {
    pub const ALL: [Theme; 4] = [Theme::Classic, Theme::Solarized, Theme::Dracula, Theme::Paper];

    pub fn name(&self) -> &'static str {
        match self {
            Theme::Classic => "classic",
            Theme::Solarized => "solarized",
            Theme::Dracula => "dracula",
            Theme::Paper => "paper",
        }
    }

    pub fn from_name(name: &str) -> Option<Theme> {
        Theme::ALL.into_iter().find(|t| t.name() == name)
    }

    /// full set of defaults for all six settings
    pub fn palette(&self) -> ColorSettings {
        let [bg, reply, dir, cmd, file, folder] = match self {
            Theme::Classic => ["#000000", "#e6e6fa", "#07bd07", "#f5f5f5", "#dbff00", "#007bff"],
            Theme::Solarized => ["#002b36", "#93a1a1", "#859900", "#eee8d5", "#b58900", "#268bd2"],
            Theme::Dracula => ["#282a36", "#f8f8f2", "#50fa7b", "#f8f8f2", "#f1fa8c", "#bd93f9"],
            Theme::Paper => ["#fdf6e3", "#333333", "#2e7d32", "#111111", "#8d6e00", "#1565c0"],
        };
        ColorSettings {
            terminal_background_color: bg.to_string(),
            terminal_reply_color: reply.to_string(),
            terminal_directory_prompt_color: dir.to_string(),
            terminal_command_prompt_color: cmd.to_string(),
            terminal_ls_file_color: file.to_string(),
            terminal_ls_folder_color: folder.to_string(),
        }
    }
}

pub fn is_valid_color(value: &str) -> bool {
    COLOR_VALUE.is_match(value)
}

/// Colour settings and the selected theme, each persisted under its own key.
pub struct CustomizationStore {
    colors: ColorSettings,
    theme: Theme,
    store: SharedStore,
    colors_key: String,
    theme_key: String,
}

impl CustomizationStore {
    pub fn load_or_seed(store: SharedStore, colors_key: &str, theme_key: &str) -> Self {
        let theme = match store.get(theme_key) {
            Ok(Some(name)) => Theme::from_name(&name).unwrap_or_else(|| {
                warn!("unknown stored theme '{}', using default", name);
                Theme::default()
            }),
            Ok(None) => Theme::default(),
            Err(e) => {
                warn!("could not read theme: {}", e);
                Theme::default()
            }
        };

        let stored_colors = match store.get(colors_key) {
            Ok(Some(json)) => serde_json::from_str::<ColorSettings>(&json)
                .map_err(|e| warn!("stored colours unreadable, using theme defaults: {}", e))
                .ok(),
            Ok(None) => None,
            Err(e) => {
                warn!("could not read colours: {}", e);
                None
            }
        };

        let seeded = stored_colors.is_none();
        let custom = Self {
            colors: stored_colors.unwrap_or_else(|| theme.palette()),
            theme,
            store,
            colors_key: colors_key.to_string(),
            theme_key: theme_key.to_string(),
        };
        if seeded {
            custom.persist();
        }
        custom
    }

    pub fn colors(&self) -> &ColorSettings {
        &self.colors
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn ls_file_color(&self) -> &str {
        &self.colors.terminal_ls_file_color
    }

    pub fn ls_folder_color(&self) -> &str {
        &self.colors.terminal_ls_folder_color
    }

    /// Err carries a message fit for the user
    pub fn set_color(&mut self, key: &str, value: &str) -> Result<(), String> {
        if !is_valid_color(value) {
            return Err(format!("'{}' is not a colour", value));
        }
        let slot = self
            .colors
            .slot_mut(key)
            .ok_or_else(|| format!("unknown setting '{}'", key))?;
        *slot = value.to_string();
        self.persist();
        Ok(())
    }

    pub fn apply_theme(&mut self, name: &str) -> Result<(), String> {
        let theme = Theme::from_name(name).ok_or_else(|| format!("unknown theme '{}'", name))?;
        self.theme = theme;
        self.colors = theme.palette();
        self.persist();
        Ok(())
    }

    fn persist(&self) {
        let colors = match serde_json::to_string(&self.colors) {
            Ok(json) => json,
            Err(e) => {
                warn!("colours not serialised: {}", e);
                return;
            }
        };
        let written = self
            .store
            .set(&self.colors_key, &colors)
            .and_then(|_| self.store.set(&self.theme_key, self.theme.name()));
        match written {
            Ok(()) => debug!("saved customization (theme {})", self.theme.name()),
            Err(e) => warn!("customization not persisted: {}", e),
        }
    }
}
