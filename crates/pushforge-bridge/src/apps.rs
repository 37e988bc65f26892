//! Well-known application identifiers per platform.

use pushforge_core::device::sort_apps;
use pushforge_core::{AppInfo, TargetPlatform};

/// Used when an iOS send names no bundle id.
pub const DEFAULT_IOS_BUNDLE_ID: &str = "com.apple.Preferences";

pub const IOS_APPS: &[(&str, &str)] = &[
    ("Settings", "com.apple.Preferences"),
    ("Safari", "com.apple.mobilesafari"),
    ("Messages", "com.apple.MobileSMS"),
    ("Maps", "com.apple.Maps"),
    ("Calendar", "com.apple.mobilecal"),
    ("Photos", "com.apple.mobileslideshow"),
    ("Notes", "com.apple.mobilenotes"),
    ("Contacts", "com.apple.MobileAddressBook"),
    ("Reminders", "com.apple.reminders"),
    ("Clock", "com.apple.mobiletimer"),
    ("Weather", "com.apple.weather"),
    ("Files", "com.apple.DocumentsApp"),
    ("Camera", "com.apple.camera"),
    ("Health", "com.apple.Health"),
    ("Microsoft Teams", "com.microsoft.skype.teams"),
];

pub const ANDROID_APPS: &[(&str, &str)] = &[
    ("Settings", "com.android.settings"),
    ("Contacts", "com.android.contacts"),
    ("Phone", "com.android.dialer"),
    ("Messages", "com.android.messaging"),
    ("Messages", "com.google.android.apps.messaging"),
    ("Calendar", "com.android.calendar"),
    ("Calendar", "com.google.android.calendar"),
    ("Camera", "com.android.camera2"),
    ("Gallery", "com.android.gallery3d"),
    ("Photos", "com.google.android.apps.photos"),
    ("Chrome", "com.android.chrome"),
    ("Gmail", "com.google.android.gm"),
    ("Google Maps", "com.google.android.apps.maps"),
    ("YouTube", "com.google.android.youtube"),
    ("Play Store", "com.android.vending"),
    ("Clock", "com.google.android.deskclock"),
    ("Calculator", "com.google.android.calculator"),
    ("Files", "com.google.android.documentsui"),
    ("Microsoft Teams", "com.microsoft.teams"),
];

pub const DESKTOP_APPS: &[(&str, &str)] = &[
    ("Safari", "com.apple.Safari"),
    ("Mail", "com.apple.mail"),
    ("Messages", "com.apple.MobileSMS"),
    ("Calendar", "com.apple.iCal"),
    ("Notes", "com.apple.Notes"),
    ("Reminders", "com.apple.reminders"),
    ("Maps", "com.apple.Maps"),
    ("Finder", "com.apple.finder"),
    ("Music", "com.apple.Music"),
    ("News", "com.apple.news"),
    ("Slack", "com.tinyspeck.slackmacgap"),
    ("Microsoft Teams", "com.microsoft.teams2"),
    ("Chrome", "com.google.Chrome"),
    ("Firefox", "org.mozilla.firefox"),
    ("VS Code", "com.microsoft.VSCode"),
];

fn table(platform: TargetPlatform) -> &'static [(&'static str, &'static str)] {
    match platform {
        TargetPlatform::IosSimulator => IOS_APPS,
        TargetPlatform::AndroidEmulator => ANDROID_APPS,
        TargetPlatform::Desktop => DESKTOP_APPS,
    }
}

/// The static table for `platform`, sorted by name.
pub fn well_known(platform: TargetPlatform) -> Vec<AppInfo> {
    let mut apps: Vec<AppInfo> = table(platform)
        .iter()
        .map(|(name, id)| AppInfo::new(*name, *id))
        .collect();
    sort_apps(&mut apps);
    apps
}

/// Display name for an Android package: the table entry when known, else
/// the last dotted segment with underscores as spaces and a capital first
/// letter (`com.example.my_app` -> `My app`).
pub fn package_display_name(package: &str) -> String {
    if let Some((name, _)) = ANDROID_APPS.iter().find(|(_, id)| *id == package) {
        return name.to_string();
    }
    let segment = package.rsplit('.').next().unwrap_or(package).replace('_', " ");
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => package.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_sorted_and_nonempty() {
        for platform in TargetPlatform::ALL {
            let apps = well_known(platform);
            assert!(!apps.is_empty());
            let names: Vec<String> = apps.iter().map(|a| a.name.to_lowercase()).collect();
            let mut sorted = names.clone();
            sorted.sort();
            assert_eq!(names, sorted);
        }
    }

    #[test]
    fn ios_table_has_default_bundle() {
        assert!(well_known(TargetPlatform::IosSimulator)
            .iter()
            .any(|a| a.bundle_id == DEFAULT_IOS_BUNDLE_ID));
    }

    #[test]
    fn known_package_uses_table_name() {
        assert_eq!(package_display_name("com.google.android.gm"), "Gmail");
    }

    #[test]
    fn unknown_package_is_cleaned_up() {
        assert_eq!(package_display_name("com.example.my_app"), "My app");
        assert_eq!(package_display_name("plain"), "Plain");
    }
}
