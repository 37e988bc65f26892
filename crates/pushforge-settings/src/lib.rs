//! # pushforge-settings
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** - [`ForgeSettings::default()`]
//! 2. **User file** - `~/.pushforge/settings.json` (deep-merged over defaults)
//! 3. **Environment variables** - `PUSHFORGE_*` overrides

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, expand_tilde, forge_dir, load_settings, load_settings_from_path, settings_path};
pub use types::*;
