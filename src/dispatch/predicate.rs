use serde::{Deserialize, Serialize};

/// Rendering capabilities a polling factory advertises for one of its
/// browsers. A request only matches when the factory covers everything
/// the request asked for: bit depth at least `bpp`, and every feature
/// flag the request set also enabled here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Display bit depth the factory renders at.
    pub bpp: i64,
    pub js: bool,
    pub java: bool,
    pub flash: bool,
    pub media: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Capabilities {
            bpp: 24,
            js: false,
            java: false,
            flash: false,
            media: false,
        }
    }
}

/// Structured matching filter for one poll: the concrete browser a
/// factory is offering, plus its capabilities.
///
/// A pending request satisfies the predicate when platform and browser
/// group are equal, the request's `major` / `minor` are either
/// unspecified or equal to the offered version, and the capabilities
/// cover the request's flags. Version narrowing is one-directional:
/// the factory states exactly what it runs, the request decides how
/// picky it is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchPredicate {
    pub platform_id: i64,
    pub browser_group_id: i64,
    /// Major version of the offered browser (Firefox 3.5 -> 3).
    pub major: i64,
    /// Minor version of the offered browser (Firefox 3.5 -> 5).
    pub minor: i64,
    pub capabilities: Capabilities,
}

impl MatchPredicate {
    pub fn new(platform_id: i64, browser_group_id: i64, major: i64, minor: i64) -> Self {
        MatchPredicate {
            platform_id,
            browser_group_id,
            major,
            minor,
            capabilities: Capabilities::default(),
        }
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }
}
