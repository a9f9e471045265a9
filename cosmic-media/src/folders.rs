//! Logical upload category → physical storage folder

use serde::Serialize;
use std::fmt;

/// Physical folder in the object store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageFolder {
    Services,
    PoojaServices,
    Others,
    About,
    GallerySlides,
    HeroSlides,
}

/// Logical folders that always get background removal
const FORCED_REMOVAL: &[&str] = &["branding", "services", "astrological-services", "pooja-services"];

impl StorageFolder {
    /// Order used when searching the mirror for a bare filename
    pub const LOOKUP_ORDER: [StorageFolder; 6] = [
        StorageFolder::Services,
        StorageFolder::PoojaServices,
        StorageFolder::Others,
        StorageFolder::About,
        StorageFolder::GallerySlides,
        StorageFolder::HeroSlides,
    ];

    /// Map a logical folder name from an upload form; unknown or missing → `Others`
    pub fn resolve(logical: Option<&str>) -> Self {
        match logical.map(str::trim).unwrap_or_default() {
            "services" | "astrological-services" => StorageFolder::Services,
            "pooja-services" => StorageFolder::PoojaServices,
            "about" => StorageFolder::About,
            "gallery-slides" | "gallery" => StorageFolder::GallerySlides,
            "hero-slides" | "hero" => StorageFolder::HeroSlides,
            // branding, services-backgrounds, others, anything else
            _ => StorageFolder::Others,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageFolder::Services => "services",
            StorageFolder::PoojaServices => "pooja-services",
            StorageFolder::Others => "others",
            StorageFolder::About => "about",
            StorageFolder::GallerySlides => "gallery-slides",
            StorageFolder::HeroSlides => "hero-slides",
        }
    }

    /// Object key for `filename` inside this folder
    pub fn object_path(&self, filename: &str) -> String {
        format!("{}/{}", self.as_str(), filename)
    }
}

impl fmt::Display for StorageFolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether uploads to this logical folder get background removal regardless of the request flag
pub fn forces_background_removal(logical: Option<&str>) -> bool {
    logical
        .map(str::trim)
        .is_some_and(|f| FORCED_REMOVAL.contains(&f))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_table() {
        let cases = [
            ("services", StorageFolder::Services),
            ("astrological-services", StorageFolder::Services),
            ("pooja-services", StorageFolder::PoojaServices),
            ("others", StorageFolder::Others),
            ("about", StorageFolder::About),
            ("gallery-slides", StorageFolder::GallerySlides),
            ("gallery", StorageFolder::GallerySlides),
            ("hero-slides", StorageFolder::HeroSlides),
            ("hero", StorageFolder::HeroSlides),
            ("branding", StorageFolder::Others),
            ("services-backgrounds", StorageFolder::Others),
            ("../etc", StorageFolder::Others),
        ];
        for (logical, expected) in cases {
            assert_eq!(StorageFolder::resolve(Some(logical)), expected, "{}", logical);
        }
        assert_eq!(StorageFolder::resolve(None), StorageFolder::Others);
    }

    #[test]
    fn test_forced_removal() {
        assert!(forces_background_removal(Some("branding")));
        assert!(forces_background_removal(Some("services")));
        assert!(forces_background_removal(Some("astrological-services")));
        assert!(forces_background_removal(Some("pooja-services")));
        assert!(!forces_background_removal(Some("hero")));
        assert!(!forces_background_removal(Some("services-backgrounds")));
        assert!(!forces_background_removal(None));
    }

    #[test]
    fn test_object_path() {
        assert_eq!(
            StorageFolder::GallerySlides.object_path("a.png"),
            "gallery-slides/a.png"
        );
    }
}
