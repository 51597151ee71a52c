//! The board registry: built-in profiles, user overrides, and fallback resolution.
//!
//! Resolution never fails. An unknown board name resolves to the configured
//! default board, and an unknown default resolves to [`DEFAULT_BOARD`].

use std::collections::BTreeMap;
use std::fmt;

use crate::types::VivflowConfig;

/// The board every resolution ultimately falls back to.
pub const DEFAULT_BOARD: &str = "basys3";

/// Built-in profiles as `(name, part, board_part)`.
const BUILTIN_BOARDS: &[(&str, &str, &str)] = &[
    (
        "basys3",
        "xc7a35tcpg236-1",
        "digilentinc.com:basys3:part0:1.2",
    ),
    (
        "arty",
        "xc7a35ticsg324-1L",
        "digilentinc.com:arty-a7-35:part0:1.1",
    ),
];

/// A named target board: the FPGA part plus the optional board-part identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardProfile {
    /// Registry name (lowercase).
    pub name: String,
    /// FPGA part identifier passed to project creation.
    pub part: String,
    /// Board-part identifier; the tool may not recognize it.
    pub board_part: Option<String>,
}

impl BoardProfile {
    /// Creates a profile from its parts.
    pub fn new(name: &str, part: &str, board_part: Option<&str>) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            part: part.to_string(),
            board_part: board_part.map(str::to_string),
        }
    }

    fn fallback() -> Self {
        let (name, part, board_part) = BUILTIN_BOARDS[0];
        Self::new(name, part, Some(board_part))
    }
}

impl fmt::Display for BoardProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.part)
    }
}

/// Outcome of resolving a requested board name against the registry.
#[derive(Debug, Clone)]
pub struct ResolvedBoard {
    /// The profile that will be used.
    pub profile: BoardProfile,
    /// The name that was asked for, if any.
    pub requested: Option<String>,
    /// Whether the requested name was unknown and a fallback was used.
    pub fell_back: bool,
}

/// The set of boards known to this invocation.
#[derive(Debug, Clone)]
pub struct BoardRegistry {
    boards: BTreeMap<String, BoardProfile>,
    default: String,
}

impl BoardRegistry {
    /// Returns a registry holding only the built-in boards.
    pub fn builtin() -> Self {
        let boards = BUILTIN_BOARDS
            .iter()
            .map(|(name, part, board_part)| {
                (
                    name.to_string(),
                    BoardProfile::new(name, part, Some(board_part)),
                )
            })
            .collect();
        Self {
            boards,
            default: DEFAULT_BOARD.to_string(),
        }
    }

    /// Builds the registry for a configuration: built-ins overlaid with
    /// `[boards.*]` entries, and the configured default board.
    pub fn from_config(config: &VivflowConfig) -> Self {
        let mut registry = Self::builtin();
        for (name, def) in &config.boards {
            let profile = BoardProfile::new(name, &def.part, def.board_part.as_deref());
            registry.boards.insert(profile.name.clone(), profile);
        }
        registry.default = config.defaults.board.to_ascii_lowercase();
        registry
    }

    /// Looks up a board by name, case-insensitively.
    pub fn get(&self, name: &str) -> Option<&BoardProfile> {
        self.boards.get(&name.to_ascii_lowercase())
    }

    /// Returns all registered board names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.boards.keys().map(String::as_str)
    }

    /// Returns the default profile.
    pub fn default_profile(&self) -> BoardProfile {
        self.get(&self.default)
            .or_else(|| self.get(DEFAULT_BOARD))
            .cloned()
            .unwrap_or_else(BoardProfile::fallback)
    }

    /// Resolves a requested board, falling back to the default profile when
    /// the name is absent or unknown.
    pub fn resolve(&self, requested: Option<&str>) -> ResolvedBoard {
        match requested {
            Some(name) => match self.get(name) {
                Some(profile) => ResolvedBoard {
                    profile: profile.clone(),
                    requested: Some(name.to_string()),
                    fell_back: false,
                },
                None => {
                    let profile = self.default_profile();
                    log::warn!("unknown board '{name}', falling back to '{}'", profile.name);
                    ResolvedBoard {
                        profile,
                        requested: Some(name.to_string()),
                        fell_back: true,
                    }
                }
            },
            None => ResolvedBoard {
                profile: self.default_profile(),
                requested: None,
                fell_back: false,
            },
        }
    }
}

impl Default for BoardRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;

    #[test]
    fn builtin_boards_present() {
        let registry = BoardRegistry::builtin();
        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["arty", "basys3"]);
        let arty = registry.get("arty").unwrap();
        assert_eq!(arty.part, "xc7a35ticsg324-1L");
        assert_eq!(
            arty.board_part.as_deref(),
            Some("digilentinc.com:arty-a7-35:part0:1.1")
        );
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let registry = BoardRegistry::builtin();
        assert_eq!(registry.get("BASYS3").unwrap().name, "basys3");
        assert_eq!(registry.get("Arty").unwrap().name, "arty");
    }

    #[test]
    fn unknown_board_falls_back_to_basys3() {
        let registry = BoardRegistry::builtin();
        let resolved = registry.resolve(Some("unknown-board"));
        assert!(resolved.fell_back);
        assert_eq!(resolved.profile.name, "basys3");
        assert_eq!(resolved.profile.part, "xc7a35tcpg236-1");
        assert_eq!(resolved.requested.as_deref(), Some("unknown-board"));
    }

    #[test]
    fn no_request_uses_default_without_fallback_flag() {
        let resolved = BoardRegistry::builtin().resolve(None);
        assert!(!resolved.fell_back);
        assert_eq!(resolved.profile.name, "basys3");
    }

    #[test]
    fn known_board_resolves_directly() {
        let resolved = BoardRegistry::builtin().resolve(Some("arty"));
        assert!(!resolved.fell_back);
        assert_eq!(resolved.profile.name, "arty");
    }

    #[test]
    fn config_boards_extend_and_override() {
        let toml = r#"
[defaults]
board = "nexys"

[boards.nexys]
part = "xc7a100tcsg324-1"
board_part = "digilentinc.com:nexys-a7-100t:part0:1.0"

[boards.arty]
part = "xc7a100ticsg324-1L"
"#;
        let config = load_config_from_str(toml).unwrap();
        let registry = BoardRegistry::from_config(&config);

        assert_eq!(registry.get("arty").unwrap().part, "xc7a100ticsg324-1L");
        assert!(registry.get("arty").unwrap().board_part.is_none());
        assert_eq!(registry.get("basys3").unwrap().part, "xc7a35tcpg236-1");

        let resolved = registry.resolve(Some("does-not-exist"));
        assert!(resolved.fell_back);
        assert_eq!(resolved.profile.name, "nexys");
    }

    #[test]
    fn unknown_configured_default_uses_basys3() {
        let config = load_config_from_str("[defaults]\nboard = \"ghost\"\n").unwrap();
        let registry = BoardRegistry::from_config(&config);
        assert_eq!(registry.default_profile().name, "basys3");
        assert_eq!(registry.resolve(None).profile.name, "basys3");
    }

    #[test]
    fn display_shows_name_and_part() {
        let profile = BoardRegistry::builtin().default_profile();
        assert_eq!(profile.to_string(), "basys3 (xc7a35tcpg236-1)");
    }
}
