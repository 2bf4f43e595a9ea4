//! Conversion policy.
//!
//! A pure, ordered rule table over [`ColorProfileInfo`]; the first rule that
//! applies decides.

use crate::ColorProfileInfo;
use csf_io::Colorspace;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Profile descriptions recognized as sRGB out of the box.
///
/// Camera and editor vendors label sRGB-equivalent profiles this way.
pub const DEFAULT_ALIASES: [&str; 3] = ["c2", "uRGB", "nRGB"];

/// Why the policy decided what it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    /// No embedded profile; pixels are assumed sRGB.
    NoProfile,
    /// Profile description identifies sRGB.
    AlreadySrgb,
    /// Raster colorspace is not sRGB (CMYK, gray, linear RGB...).
    NonSrgbColorspace,
    /// sRGB raster tagged with a non-sRGB profile (e.g. Adobe RGB).
    MismatchedProfile,
    /// Nothing to do.
    NoActionNeeded,
}

impl ReasonCode {
    /// Upper-case name, as serialized.
    pub fn as_str(self) -> &'static str {
        match self {
            ReasonCode::NoProfile => "NO_PROFILE",
            ReasonCode::AlreadySrgb => "ALREADY_SRGB",
            ReasonCode::NonSrgbColorspace => "NON_SRGB_COLORSPACE",
            ReasonCode::MismatchedProfile => "MISMATCHED_PROFILE",
            ReasonCode::NoActionNeeded => "NO_ACTION_NEEDED",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of [`Policy::decide`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionDecision {
    /// True if the image must be converted to sRGB.
    pub should_convert: bool,
    /// Rule that fired.
    pub reason: ReasonCode,
}

/// Profile descriptions that count as sRGB in addition to any description
/// containing "srgb".
///
/// Matching is exact and case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrgbAliases {
    aliases: Vec<String>,
}

impl Default for SrgbAliases {
    fn default() -> Self {
        Self::new(DEFAULT_ALIASES)
    }
}

impl SrgbAliases {
    /// Creates an alias list. Blank entries are dropped.
    pub fn new<I, S>(aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Self { aliases: Vec::new() };
        list.extend(aliases);
        list
    }

    /// Adds aliases, skipping blanks and duplicates.
    pub fn extend<I, S>(&mut self, aliases: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for alias in aliases {
            let alias = alias.into().trim().to_string();
            if !alias.is_empty() && !self.contains(&alias) {
                self.aliases.push(alias);
            }
        }
    }

    /// True if `description` equals one of the aliases, ignoring case.
    pub fn contains(&self, description: &str) -> bool {
        let description = description.trim();
        self.aliases.iter().any(|a| a.eq_ignore_ascii_case(description))
    }

    /// Iterates the aliases.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.aliases.iter().map(String::as_str)
    }
}

type Predicate = fn(&ColorProfileInfo, &SrgbAliases) -> bool;

struct Rule {
    applies: Predicate,
    should_convert: bool,
    reason: ReasonCode,
}

const RULES: [Rule; 5] = [
    Rule {
        applies: lacks_profile,
        should_convert: false,
        reason: ReasonCode::NoProfile,
    },
    Rule {
        applies: described_as_srgb,
        should_convert: false,
        reason: ReasonCode::AlreadySrgb,
    },
    Rule {
        applies: non_srgb_raster,
        should_convert: true,
        reason: ReasonCode::NonSrgbColorspace,
    },
    Rule {
        applies: srgb_raster_with_foreign_profile,
        should_convert: true,
        reason: ReasonCode::MismatchedProfile,
    },
    Rule {
        applies: always,
        should_convert: false,
        reason: ReasonCode::NoActionNeeded,
    },
];

fn lacks_profile(info: &ColorProfileInfo, _: &SrgbAliases) -> bool {
    !info.has_icc_profile()
}

fn described_as_srgb(info: &ColorProfileInfo, aliases: &SrgbAliases) -> bool {
    info.description().is_some_and(|d| recognizes(aliases, d))
}

fn non_srgb_raster(info: &ColorProfileInfo, _: &SrgbAliases) -> bool {
    info.colorspace() != Colorspace::Srgb
}

fn srgb_raster_with_foreign_profile(info: &ColorProfileInfo, aliases: &SrgbAliases) -> bool {
    info.colorspace() == Colorspace::Srgb && !described_as_srgb(info, aliases)
}

fn always(_: &ColorProfileInfo, _: &SrgbAliases) -> bool {
    true
}

fn recognizes(aliases: &SrgbAliases, description: &str) -> bool {
    description.to_lowercase().contains("srgb") || aliases.contains(description)
}

/// Decides whether an image needs conversion to sRGB.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Policy {
    aliases: SrgbAliases,
}

impl Policy {
    /// Creates a policy with a custom alias list.
    pub fn new(aliases: SrgbAliases) -> Self {
        Self { aliases }
    }

    /// Returns the shared default policy.
    pub fn global() -> &'static Policy {
        static INSTANCE: OnceLock<Policy> = OnceLock::new();
        INSTANCE.get_or_init(Policy::default)
    }

    /// Adds aliases on top of the current ones.
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases);
        self
    }

    /// Alias list in use.
    pub fn aliases(&self) -> &SrgbAliases {
        &self.aliases
    }

    /// True if this description identifies an sRGB profile.
    pub fn recognizes(&self, description: &str) -> bool {
        recognizes(&self.aliases, description)
    }

    /// Applies the rule table to `info`.
    pub fn decide(&self, info: &ColorProfileInfo) -> ConversionDecision {
        RULES
            .iter()
            .find(|rule| (rule.applies)(info, &self.aliases))
            .map(|rule| ConversionDecision {
                should_convert: rule.should_convert,
                reason: rule.reason,
            })
            .unwrap_or(ConversionDecision {
                should_convert: false,
                reason: ReasonCode::NoActionNeeded,
            })
    }
}

/// Decides with the default policy.
pub fn decide(info: &ColorProfileInfo) -> ConversionDecision {
    Policy::global().decide(info)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(cs: Colorspace, desc: Option<&str>) -> ColorProfileInfo {
        ColorProfileInfo::new(cs, true, desc.map(String::from))
    }

    #[test]
    fn test_deterministic() {
        let samples = [
            ColorProfileInfo::new(Colorspace::Cmyk, false, None),
            info(Colorspace::Srgb, Some("Adobe RGB (1998)")),
            info(Colorspace::Srgb, Some("sRGB IEC61966-2.1")),
            info(Colorspace::Gray, None),
        ];
        for s in &samples {
            assert_eq!(decide(s), decide(&s.clone()));
        }
    }

    #[test]
    fn test_no_profile_never_converts() {
        for cs in Colorspace::all() {
            let d = decide(&ColorProfileInfo::new(cs, false, Some("Adobe RGB (1998)".into())));
            assert!(!d.should_convert, "{}", cs);
            assert_eq!(d.reason, ReasonCode::NoProfile);
        }
    }

    #[test]
    fn test_aliases_any_case() {
        for desc in ["c2", "C2", "urgb", "URGB", "nRGB", "NRGB", "sRGB IEC61966-2.1", "my SRGB v4", "sRGB built-in"] {
            for cs in [Colorspace::Srgb, Colorspace::Cmyk, Colorspace::Gray] {
                let d = decide(&info(cs, Some(desc)));
                assert!(!d.should_convert, "{} / {}", desc, cs);
                assert_eq!(d.reason, ReasonCode::AlreadySrgb);
            }
        }
    }

    #[test]
    fn test_alias_needs_exact_match() {
        let d = decide(&info(Colorspace::Srgb, Some("c2 wide gamut")));
        assert_eq!(d.reason, ReasonCode::MismatchedProfile);
    }

    #[test]
    fn test_cmyk_converts() {
        for desc in [None, Some("U.S. Web Coated (SWOP) v2")] {
            let d = decide(&info(Colorspace::Cmyk, desc));
            assert!(d.should_convert);
            assert_eq!(d.reason, ReasonCode::NonSrgbColorspace);
        }
    }

    #[test]
    fn test_adobe_rgb_converts() {
        let d = decide(&info(Colorspace::Srgb, Some("Adobe RGB (1998)")));
        assert!(d.should_convert);
        assert_eq!(d.reason, ReasonCode::MismatchedProfile);
    }

    #[test]
    fn test_unreadable_profile_converts() {
        let d = decide(&info(Colorspace::Srgb, None));
        assert_eq!(d.reason, ReasonCode::MismatchedProfile);
    }

    #[test]
    fn test_clean_srgb_noop() {
        let d = decide(&info(Colorspace::Srgb, Some("sRGB IEC61966-2.1")));
        assert_eq!(
            d,
            ConversionDecision {
                should_convert: false,
                reason: ReasonCode::AlreadySrgb
            }
        );
    }

    #[test]
    fn test_extra_aliases() {
        let policy = Policy::default().with_aliases(["Display Standard", " ", "c2"]);
        assert_eq!(policy.aliases().iter().count(), 4);
        let d = policy.decide(&info(Colorspace::Srgb, Some("display standard")));
        assert_eq!(d.reason, ReasonCode::AlreadySrgb);
        assert!(decide(&info(Colorspace::Srgb, Some("display standard"))).should_convert);
    }

    #[test]
    fn test_reason_serialization() {
        let d = ConversionDecision {
            should_convert: true,
            reason: ReasonCode::NonSrgbColorspace,
        };
        assert_eq!(
            serde_json::to_string(&d).unwrap(),
            r#"{"should_convert":true,"reason":"NON_SRGB_COLORSPACE"}"#
        );
        assert_eq!(ReasonCode::AlreadySrgb.to_string(), "ALREADY_SRGB");
    }
}
