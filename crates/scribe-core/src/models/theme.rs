/// A card theme. Static, never persisted; quotes reference themes by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub id: &'static str,
    pub name: &'static str,
    pub background: &'static str,
    pub foreground: &'static str,
}

/// The fixed theme set. The first entry is the default for unknown ids.
pub const THEMES: [Theme; 6] = [
    Theme {
        id: "classic",
        name: "Classic",
        background: "#ffffff",
        foreground: "#2c1810",
    },
    Theme {
        id: "dark",
        name: "Noir",
        background: "#1a1a1a",
        foreground: "#e0d6c9",
    },
    Theme {
        id: "parchment",
        name: "Antique",
        background: "#f0e6d2",
        foreground: "#3e2723",
    },
    Theme {
        id: "warm",
        name: "Sepia",
        background: "#eaddcf",
        foreground: "#4a3b32",
    },
    Theme {
        id: "midnight",
        name: "Ink",
        background: "#232f3e",
        foreground: "#f2f2f2",
    },
    Theme {
        id: "forest",
        name: "Moss",
        background: "#354f42",
        foreground: "#f1f8e9",
    },
];

impl Theme {
    /// Look up a theme by id, falling back to the default for unknown or
    /// missing ids.
    pub fn by_id(id: &str) -> &'static Theme {
        THEMES.iter().find(|t| t.id == id).unwrap_or(&THEMES[0])
    }

    pub fn default_theme() -> &'static Theme {
        &THEMES[0]
    }
}
