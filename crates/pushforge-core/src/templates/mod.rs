//! Read-only catalog of starter payloads.
//!
//! Built-ins ship with the binary; a user directory can add templates or
//! replace built-ins that share an id.

mod builtin;
mod loader;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::TemplateError;
use crate::platform::TargetPlatform;

pub use loader::{load_dir, parse_template_file};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateCategory {
    Alert,
    Badge,
    Silent,
    Rich,
    Advanced,
}

impl TemplateCategory {
    /// Lenient parse for template files. Unknown names land in `Alert`.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "badge" => Self::Badge,
            "silent" => Self::Silent,
            "rich" => Self::Rich,
            "advanced" => Self::Advanced,
            _ => Self::Alert,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alert => "alert",
            Self::Badge => "badge",
            Self::Silent => "silent",
            Self::Rich => "rich",
            Self::Advanced => "advanced",
        }
    }
}

/// Which payload dialect a template is written in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplatePlatform {
    #[default]
    Ios,
    Android,
    Web,
}

impl TemplatePlatform {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "ios" => Some(Self::Ios),
            "android" => Some(Self::Android),
            "web" => Some(Self::Web),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ios => "ios",
            Self::Android => "android",
            Self::Web => "web",
        }
    }

    pub fn target(&self) -> TargetPlatform {
        match self {
            Self::Ios => TargetPlatform::IosSimulator,
            Self::Android => TargetPlatform::AndroidEmulator,
            Self::Web => TargetPlatform::Desktop,
        }
    }
}

impl From<TargetPlatform> for TemplatePlatform {
    fn from(target: TargetPlatform) -> Self {
        match target {
            TargetPlatform::IosSimulator => Self::Ios,
            TargetPlatform::AndroidEmulator => Self::Android,
            TargetPlatform::Desktop => Self::Web,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PayloadTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: TemplateCategory,
    pub platform: TemplatePlatform,
    pub payload: String,
}

#[derive(Clone, Debug, Default)]
pub struct TemplateCatalog {
    templates: Vec<PayloadTemplate>,
}

impl TemplateCatalog {
    pub fn builtin() -> Self {
        Self {
            templates: builtin::templates(),
        }
    }

    /// Built-ins overlaid with everything under `user_dir`.
    pub fn load(user_dir: Option<&Path>) -> Result<Self, TemplateError> {
        let mut catalog = Self::builtin();
        if let Some(dir) = user_dir {
            let user = load_dir(dir)?;
            tracing::debug!(dir = %dir.display(), count = user.len(), "loaded user templates");
            catalog.extend(user);
        }
        Ok(catalog)
    }

    /// Adds templates in order; an existing id is replaced in place.
    pub fn extend(&mut self, templates: impl IntoIterator<Item = PayloadTemplate>) {
        for template in templates {
            match self.templates.iter_mut().find(|t| t.id == template.id) {
                Some(slot) => *slot = template,
                None => self.templates.push(template),
            }
        }
    }

    pub fn all(&self) -> &[PayloadTemplate] {
        &self.templates
    }

    pub fn get(&self, id: &str) -> Option<&PayloadTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn for_platform(&self, platform: TemplatePlatform) -> impl Iterator<Item = &PayloadTemplate> {
        self.templates.iter().filter(move |t| t.platform == platform)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
