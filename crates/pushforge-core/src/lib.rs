pub mod device;
pub mod errors;
pub mod payload;
pub mod platform;
pub mod record;
pub mod status;
pub mod templates;

pub use device::{AndroidEmulator, AppInfo, EmulatorState, SimulatorDevice, SimulatorState};
pub use errors::TemplateError;
pub use payload::{extract_content, validate, NotificationContent, ValidationVerdict, MAX_PAYLOAD_BYTES};
pub use platform::TargetPlatform;
pub use record::{NewRecord, NotificationRecord, SavedDevice};
pub use status::SendStatus;
pub use templates::{PayloadTemplate, TemplateCatalog, TemplateCategory, TemplatePlatform};

/// Product name used as the fallback notification title.
pub const APP_NAME: &str = "PushForge";
