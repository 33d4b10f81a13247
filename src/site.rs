//! Front-end manifest: page head, theme extension and content scan paths.
//!
//! These are the records the UI toolchain consumes; the service only publishes
//! them and answers which project files fall under the content scan.

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;

pub const TITLE: &str = "Paste Vercel";
pub const DESCRIPTION: &str = "Advanced Link Decryption & Hosting System.";
pub const VIEWPORT: &str = "width=device-width, initial-scale=1";
pub const FONTS_STYLESHEET: &str = "https://fonts.googleapis.com/css2?family=JetBrains+Mono:wght@400;700&family=Orbitron:wght@400;600;800&family=Inter:wght@400;600&display=swap";

pub const CONTENT_PATTERNS: [&str; 6] = [
    "./components/**/*.{js,vue,ts}",
    "./layouts/**/*.vue",
    "./pages/**/*.vue",
    "./plugins/**/*.{js,ts}",
    "./app.vue",
    "./error.vue",
];

const GRID_PATTERN: &str = "linear-gradient(to right, #18181b 1px, transparent 1px), linear-gradient(to bottom, #18181b 1px, transparent 1px)";

#[derive(Debug, Clone, Serialize)]
pub struct SiteManifest {
    pub head: Head,
    pub theme: Theme,
    pub content: Vec<&'static str>,
    pub modules: Vec<&'static str>,
    pub css: Vec<&'static str>,
    pub devtools: bool,
    /// Public runtime values; nothing is exposed today.
    pub public: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Head {
    pub title: &'static str,
    pub meta: Vec<Meta>,
    pub link: Vec<Link>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Meta {
    pub name: &'static str,
    pub content: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Link {
    pub rel: &'static str,
    pub href: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Theme {
    #[serde(rename = "fontFamily")]
    pub font_family: FontFamilies,
    pub colors: Colors,
    #[serde(rename = "backgroundImage")]
    pub background_image: BackgroundImages,
}

#[derive(Debug, Clone, Serialize)]
pub struct FontFamilies {
    pub sans: Vec<&'static str>,
    pub cyber: Vec<&'static str>,
    pub mono: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Colors {
    pub cyber: CyberPalette,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CyberPalette {
    pub black: &'static str,
    pub dark: &'static str,
    pub gray: &'static str,
    pub primary: &'static str,
    pub secondary: &'static str,
    pub accent: &'static str,
}

impl CyberPalette {
    pub const fn new() -> Self {
        Self {
            black: "#020205",
            dark: "#09090b",
            gray: "#18181b",
            primary: "#00f3ff",
            secondary: "#ff00ff",
            accent: "#7000ff",
        }
    }

    pub fn entries(&self) -> [(&'static str, &'static str); 6] {
        [
            ("black", self.black),
            ("dark", self.dark),
            ("gray", self.gray),
            ("primary", self.primary),
            ("secondary", self.secondary),
            ("accent", self.accent),
        ]
    }
}

impl Default for CyberPalette {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BackgroundImages {
    #[serde(rename = "grid-pattern")]
    pub grid_pattern: &'static str,
}

pub fn theme() -> Theme {
    Theme {
        font_family: FontFamilies {
            sans: vec!["Inter", "sans-serif"],
            cyber: vec!["Orbitron", "sans-serif"],
            mono: vec!["JetBrains Mono", "monospace"],
        },
        colors: Colors {
            cyber: CyberPalette::new(),
        },
        background_image: BackgroundImages {
            grid_pattern: GRID_PATTERN,
        },
    }
}

pub fn head() -> Head {
    Head {
        title: TITLE,
        meta: vec![
            Meta {
                name: "description",
                content: DESCRIPTION,
            },
            Meta {
                name: "viewport",
                content: VIEWPORT,
            },
        ],
        link: vec![Link {
            rel: "stylesheet",
            href: FONTS_STYLESHEET,
        }],
    }
}

pub fn manifest() -> SiteManifest {
    SiteManifest {
        head: head(),
        theme: theme(),
        content: CONTENT_PATTERNS.to_vec(),
        modules: vec!["@nuxtjs/tailwindcss"],
        css: vec!["~/assets/css/main.css"],
        devtools: true,
        public: Map::new(),
    }
}

/// Compiled content globs, matched against project-relative paths.
#[derive(Debug, Clone)]
pub struct ContentScan {
    set: GlobSet,
}

impl ContentScan {
    pub fn from_patterns<'a>(
        patterns: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, globset::Error> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            builder.add(Glob::new(strip_dot(pattern))?);
        }
        Ok(Self {
            set: builder.build()?,
        })
    }

    pub fn is_match(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        let relative = path.strip_prefix(".").unwrap_or(path);
        self.set.is_match(relative)
    }
}

fn strip_dot(pattern: &str) -> &str {
    pattern.strip_prefix("./").unwrap_or(pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_list_matches_declared_entries() {
        let m = manifest();
        assert_eq!(
            m.content,
            vec![
                "./components/**/*.{js,vue,ts}",
                "./layouts/**/*.vue",
                "./pages/**/*.vue",
                "./plugins/**/*.{js,ts}",
                "./app.vue",
                "./error.vue",
            ]
        );
    }

    #[test]
    fn cyber_palette_values() {
        let palette = theme().colors.cyber;
        assert_eq!(
            palette.entries(),
            [
                ("black", "#020205"),
                ("dark", "#09090b"),
                ("gray", "#18181b"),
                ("primary", "#00f3ff"),
                ("secondary", "#ff00ff"),
                ("accent", "#7000ff"),
            ]
        );
    }

    #[test]
    fn font_stacks() {
        let fonts = theme().font_family;
        assert_eq!(fonts.sans, vec!["Inter", "sans-serif"]);
        assert_eq!(fonts.cyber, vec!["Orbitron", "sans-serif"]);
        assert_eq!(fonts.mono, vec!["JetBrains Mono", "monospace"]);
    }

    #[test]
    fn manifest_serializes_theme_keys() {
        let value = serde_json::to_value(manifest()).expect("serialize manifest");
        assert_eq!(value["head"]["title"], "Paste Vercel");
        assert_eq!(value["head"]["meta"][0]["content"], DESCRIPTION);
        assert_eq!(value["theme"]["colors"]["cyber"]["primary"], "#00f3ff");
        assert_eq!(value["theme"]["fontFamily"]["mono"][0], "JetBrains Mono");
        assert!(
            value["theme"]["backgroundImage"]["grid-pattern"]
                .as_str()
                .is_some_and(|s| s.starts_with("linear-gradient"))
        );
        assert_eq!(value["public"], serde_json::json!({}));
    }

    #[test]
    fn content_scan_matches_declared_paths() {
        let scan = ContentScan::from_patterns(CONTENT_PATTERNS).expect("valid globs");
        assert!(scan.is_match("components/Editor.vue"));
        assert!(scan.is_match("components/ui/Button.ts"));
        assert!(scan.is_match("./pages/index.vue"));
        assert!(scan.is_match("plugins/highlight.js"));
        assert!(scan.is_match("app.vue"));
        assert!(scan.is_match("error.vue"));

        assert!(!scan.is_match("components/readme.md"));
        assert!(!scan.is_match("layouts/default.ts"));
        assert!(!scan.is_match("plugins/theme.vue"));
        assert!(!scan.is_match("server/api/main.rs"));
    }
}
