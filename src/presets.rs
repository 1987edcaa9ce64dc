//! Platform size presets.
//!
//! An immutable, compiled-in table mapping `platform → preset name →
//! (width, height)`. Platforms and presets keep their table order so
//! enumeration and batch output are stable. Keys are part of the public
//! contract: external tooling discovers presets through [`find_by_size`], so
//! existing keys are never renamed between [`REGISTRY_VERSION`]s.
//!
//! Platform keys are matched case-insensitively; preset names are exact.

use crate::error::PresetMiss;
use serde::Serialize;

/// Bumped whenever a preset is added or its dimensions change.
pub const REGISTRY_VERSION: u32 = 1;

/// One resolved registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PresetSize {
    pub platform: &'static str,
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
}

impl PresetSize {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

struct Platform {
    key: &'static str,
    presets: &'static [(&'static str, u32, u32)],
}

const TABLE: &[Platform] = &[
    Platform {
        key: "ios",
        presets: &[
            ("icon_1024", 1024, 1024),
            ("icon_180", 180, 180),
            ("icon_167", 167, 167),
            ("icon_152", 152, 152),
            ("icon_120", 120, 120),
            ("icon_87", 87, 87),
            ("icon_80", 80, 80),
            ("icon_76", 76, 76),
            ("icon_60", 60, 60),
            ("icon_58", 58, 58),
            ("icon_40", 40, 40),
            ("icon_29", 29, 29),
            ("icon_20", 20, 20),
        ],
    },
    Platform {
        key: "android",
        presets: &[
            ("icon_xxxhdpi", 192, 192),
            ("icon_xxhdpi", 144, 144),
            ("icon_xhdpi", 96, 96),
            ("icon_hdpi", 72, 72),
            ("icon_mdpi", 48, 48),
            ("icon_ldpi", 36, 36),
            ("adaptive_foreground", 432, 432),
            ("play_store", 512, 512),
        ],
    },
    Platform {
        key: "linkedin",
        presets: &[
            ("profile_photo", 400, 400),
            ("profile_photo_display", 200, 200),
            ("company_logo", 300, 300),
            ("company_logo_display", 60, 60),
            ("cover_photo", 1584, 396),
            ("company_cover", 1128, 191),
            ("post_image", 1200, 627),
            ("post_image_square", 1200, 1200),
            ("article_cover", 744, 400),
            ("carousel_slide", 1080, 1080),
            ("app_logo", 180, 180),
        ],
    },
    Platform {
        key: "twitter",
        presets: &[
            ("profile_photo", 400, 400),
            ("header_photo", 1500, 500),
            ("post_image", 1200, 675),
            ("post_image_square", 1200, 1200),
            ("card_image", 800, 418),
            ("card_image_large", 1200, 628),
        ],
    },
    Platform {
        key: "facebook",
        presets: &[
            ("profile_photo", 180, 180),
            ("cover_photo", 820, 312),
            ("post_image", 1200, 630),
            ("post_image_square", 1200, 1200),
            ("event_cover", 1920, 1080),
            ("page_profile", 170, 170),
        ],
    },
    Platform {
        key: "instagram",
        presets: &[
            ("profile_photo", 320, 320),
            ("post_square", 1080, 1080),
            ("post_portrait", 1080, 1350),
            ("post_landscape", 1080, 608),
            ("story", 1080, 1920),
            ("carousel", 1080, 1080),
        ],
    },
    Platform {
        key: "web",
        presets: &[
            ("favicon_ico", 48, 48),
            ("favicon_16", 16, 16),
            ("favicon_32", 32, 32),
            ("favicon_192", 192, 192),
            ("favicon_512", 512, 512),
            ("apple_touch_icon", 180, 180),
            ("og_image", 1200, 630),
            ("twitter_card", 1200, 628),
            ("thumbnail_small", 150, 150),
            ("thumbnail_medium", 300, 300),
            ("thumbnail_large", 600, 600),
        ],
    },
    Platform {
        key: "ecommerce",
        presets: &[
            ("product_thumb", 100, 100),
            ("product_small", 300, 300),
            ("product_medium", 600, 600),
            ("product_large", 1200, 1200),
            ("product_zoom", 2000, 2000),
            ("banner_wide", 1920, 600),
            ("banner_square", 600, 600),
        ],
    },
    Platform {
        key: "app_store",
        presets: &[
            ("ios_app_store", 1024, 1024),
            ("google_play", 512, 512),
            ("mac_app_store", 1024, 1024),
            ("windows_store", 300, 300),
            ("windows_store_wide", 558, 270),
        ],
    },
    Platform {
        key: "messaging",
        presets: &[
            ("slack_emoji", 128, 128),
            ("slack_app_icon", 512, 512),
            ("discord_emoji", 128, 128),
            ("discord_server_icon", 512, 512),
            ("discord_banner", 960, 540),
            ("teams_app_icon", 192, 192),
            ("whatsapp_sticker", 512, 512),
        ],
    },
];

/// Named lists of `(platform, preset)` keys for common batch jobs.
///
/// `ios_icons_all` and `android_icons_all` expand to the whole platform and
/// are resolved by [`group`], not listed here.
const GROUPS: &[(&str, &[(&str, &str)])] = &[
    (
        "social_profiles",
        &[
            ("linkedin", "profile_photo"),
            ("twitter", "profile_photo"),
            ("facebook", "profile_photo"),
            ("instagram", "profile_photo"),
        ],
    ),
    (
        "social_posts",
        &[
            ("linkedin", "post_image"),
            ("twitter", "post_image"),
            ("facebook", "post_image"),
            ("instagram", "post_square"),
        ],
    ),
    (
        "favicons_all",
        &[
            ("web", "favicon_16"),
            ("web", "favicon_32"),
            ("web", "favicon_ico"),
            ("web", "favicon_192"),
            ("web", "favicon_512"),
            ("web", "apple_touch_icon"),
        ],
    ),
];

/// Group names accepted by [`group`], in display order.
pub const GROUP_NAMES: [&str; 5] = [
    "ios_icons_all",
    "android_icons_all",
    "social_profiles",
    "social_posts",
    "favicons_all",
];

fn find_platform(platform: &str) -> Option<&'static Platform> {
    let key = platform.to_ascii_lowercase();
    TABLE.iter().find(|p| p.key == key)
}

fn entry(platform: &'static Platform, preset: &(&'static str, u32, u32)) -> PresetSize {
    let &(name, width, height) = preset;
    PresetSize {
        platform: platform.key,
        name,
        width,
        height,
    }
}

/// Resolve `platform/name` to its dimensions.
pub fn lookup(platform: &str, name: &str) -> Result<PresetSize, PresetMiss> {
    let p = find_platform(platform).ok_or_else(|| PresetMiss::UnknownPlatform {
        platform: platform.to_string(),
    })?;
    p.presets
        .iter()
        .find(|(n, _, _)| *n == name)
        .map(|preset| entry(p, preset))
        .ok_or_else(|| PresetMiss::UnknownPreset {
            platform: p.key.to_string(),
            name: name.to_string(),
        })
}

/// All platform keys, in table order.
pub fn platforms() -> impl Iterator<Item = &'static str> {
    TABLE.iter().map(|p| p.key)
}

/// Every preset under `platform`, in table order.
pub fn presets_for(platform: &str) -> Result<Vec<PresetSize>, PresetMiss> {
    let p = find_platform(platform).ok_or_else(|| PresetMiss::UnknownPlatform {
        platform: platform.to_string(),
    })?;
    Ok(p.presets.iter().map(|preset| entry(p, preset)).collect())
}

/// Every preset in the registry, in table order.
pub fn all() -> impl Iterator<Item = PresetSize> {
    TABLE
        .iter()
        .flat_map(|p| p.presets.iter().map(move |preset| entry(p, preset)))
}

/// Reverse lookup: every preset whose dimensions are exactly `width` x `height`.
pub fn find_by_size(width: u32, height: u32) -> Vec<PresetSize> {
    all()
        .filter(|p| p.width == width && p.height == height)
        .collect()
}

/// Expand a named group into `(platform, preset)` keys.
///
/// Returns `None` for an unknown group name.
pub fn group(name: &str) -> Option<Vec<(&'static str, &'static str)>> {
    let whole_platform = |key: &'static str| {
        find_platform(key).map(|p| p.presets.iter().map(|(n, _, _)| (p.key, *n)).collect())
    };
    match name {
        "ios_icons_all" => whole_platform("ios"),
        "android_icons_all" => whole_platform("android"),
        _ => GROUPS
            .iter()
            .find(|(g, _)| *g == name)
            .map(|(_, keys)| keys.to_vec()),
    }
}
