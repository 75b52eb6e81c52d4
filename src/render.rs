//! Transcription renderer — simplifies MST phonetic text for display.
//!
//! An ordered cascade of (pattern, replacement) rules turns one phonetic
//! stream into a human-readable transcription at one of three verbosity
//! [`Level`]s.  Later rules see the output of earlier ones, so rule order
//! is part of the contract:
//!
//! 1. line breaks → `<br/>` markers;
//! 2. universal replacements (`y→ü`, `c→ky`);
//! 3. the level-specific block;
//! 4. the common cross-level tail.
//!
//! Applying the cascade twice with the same level is NOT idempotent:
//! markup inserted by the level rules (`<sub>…</sub>`, styled spans)
//! contains ASCII letters that later passes would rewrite.  Callers render
//! exactly once.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Verbosity tier: how much phonological detail survives into the display
/// string.  Total order of increasing detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Level {
    /// No tone, aspiration or glottal marking at all.
    #[default]
    Simple,
    /// Glottal marking kept; tone and aspiration stripped.
    Intermediate,
    /// Tone and aspiration markers kept (styled).
    Advanced,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Simple, Level::Intermediate, Level::Advanced];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Simple => "simple",
            Level::Intermediate => "intermediate",
            Level::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Invalid-argument condition: unrecognized level name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("level '{0}' is invalid, valid levels are simple, intermediate, advanced")]
pub struct InvalidLevel(pub String);

impl FromStr for Level {
    type Err = InvalidLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simple" => Ok(Level::Simple),
            "intermediate" => Ok(Level::Intermediate),
            "advanced" => Ok(Level::Advanced),
            other => Err(InvalidLevel(other.to_string())),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rule records
// ─────────────────────────────────────────────────────────────────────────────

/// One substitution step of the cascade.
enum Rule {
    Literal(&'static str, &'static str),
    Pattern(Regex, &'static str),
}

impl Rule {
    fn re(pattern: &str, replacement: &'static str) -> Rule {
        Rule::Pattern(Regex::new(pattern).unwrap(), replacement)
    }

    fn apply(&self, text: &str) -> String {
        match self {
            Rule::Literal(from, to) => text.replace(from, to),
            Rule::Pattern(re, to) => re.replace_all(text, *to).into_owned(),
        }
    }
}

fn apply_all(rules: &[Rule], text: String) -> String {
    rules.iter().fold(text, |acc, rule| rule.apply(&acc))
}

static RE_LINE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r\n|\r|\n").unwrap());

static UNIVERSAL: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::Literal("y", "ü"),
        Rule::Literal("c", "ky"),
    ]
});

static ADVANCED: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        // Reduced vowels keep their diacritic but get grayed out.
        Rule::re(
            "ɔ([\u{0304}\u{0331}])?",
            "<span class='gray'>o${1}</span>",
        ),
        Rule::re(
            "ə([\u{0304}\u{0331}])?",
            "<span class='gray'>a${1}</span>",
        ),
        Rule::Literal("3", "<span class='gray'>ʰ</span>"),
        Rule::re("ʔ([kp])\u{031A}", "<sub>${1}</sub>"),
        Rule::Literal("ʔ", "<sub>ʔ</sub>"),
        Rule::Literal("n\u{031A}", "n"),
    ]
});

static INTERMEDIATE: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        // Tone and weak-aspiration marks go away entirely.
        Rule::re("[\u{0331}\u{0304}3˥˦˧˨˩]", ""),
        Rule::re("ʔ([kp])\u{031A}", "<sub>${1}</sub>"),
        Rule::Literal("ʔ", "<sub>ʔ</sub>"),
        Rule::Literal("ɔ", "o"),
        Rule::Literal("ə", "<span class='gray'>a</span>"),
        Rule::Literal("n\u{031A}", "n"),
    ]
});

static SIMPLE: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::re("[\u{0331}\u{0304}3ʰʔ\u{031A}ː˥˦˧˨˩]", ""),
        Rule::Literal("ɔ", "o"),
        Rule::Literal("ə", "a"),
        Rule::Literal("n\u{031A}", "n"),
    ]
});

static COMMON: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::Literal("ɣ", "g"),
        // Half-voicing rings are not displayed at any level.
        Rule::re("[\u{0325}\u{030A}]", ""),
        Rule::Literal("ɖ", "ḍ"),
        Rule::Literal("ʈ", "ṭ"),
        Rule::Literal("ɲ", "ny"),
        Rule::Literal("ø", "ö"),
        Rule::Literal("ɟ", "gy"),
        Rule::Literal("j", "y"),
        Rule::Literal("ɛ", "è"),
        Rule::Literal("e", "é"),
        // Word-final velar nasal reads ng; elsewhere ṅ.
        Rule::re(r"ŋ(\s)", "ng${1}"),
        Rule::Literal("ŋ", "ṅ"),
        Rule::Literal("tɕ", "ch"),
        Rule::Literal("ɕ", "sh"),
        Rule::Literal("dʑ", "j"),
        Rule::Literal("dz", "z"),
    ]
});

// ─────────────────────────────────────────────────────────────────────────────
// Renderer
// ─────────────────────────────────────────────────────────────────────────────

/// Render one MST phonetic stream at the requested level.
pub fn render(ipa: &str, level: Level) -> String {
    let text = RE_LINE_BREAK.replace_all(ipa, "<br/>").into_owned();
    let text = apply_all(&UNIVERSAL, text);
    let text = match level {
        Level::Advanced => apply_all(&ADVANCED, text),
        Level::Intermediate => apply_all(&INTERMEDIATE, text),
        Level::Simple => apply_all(&SIMPLE, text),
    };
    apply_all(&COMMON, text)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_str() {
        assert_eq!("simple".parse::<Level>().unwrap(), Level::Simple);
        assert_eq!("advanced".parse::<Level>().unwrap(), Level::Advanced);
        let err = "fancy".parse::<Level>().unwrap_err();
        assert!(err.to_string().contains("simple, intermediate, advanced"));
    }

    #[test]
    fn test_simple_strips_all_diacritics() {
        let out = render("ʈa\u{0304}ɕiʔ", Level::Simple);
        assert_eq!(out, "ṭashi");
        for c in ['\u{0304}', '\u{0331}', '3', 'ʰ', 'ʔ', '\u{031A}', 'ː'] {
            assert!(!out.contains(c), "simple output still contains {c:?}");
        }
    }

    #[test]
    fn test_advanced_keeps_tone() {
        let out = render("ʈa\u{0304}ɕiʔ", Level::Advanced);
        assert!(out.contains('\u{0304}'), "got: {out}");
        assert!(out.contains("<sub>ʔ</sub>"), "got: {out}");
    }

    #[test]
    fn test_advanced_weak_aspiration_styled() {
        let out = render("k3a\u{0331}", Level::Advanced);
        assert!(out.contains("<span class='gray'>ʰ</span>"), "got: {out}");
        assert!(out.contains('\u{0331}'));
    }

    #[test]
    fn test_unreleased_stop_becomes_subscript() {
        let out = render("naʔk\u{031A}", Level::Intermediate);
        assert!(out.contains("<sub>k</sub>"), "got: {out}");
        let out = render("naʔk\u{031A}", Level::Simple);
        assert_eq!(out, "nak");
    }

    #[test]
    fn test_intermediate_strips_tone_keeps_glottal() {
        let out = render("ɕi\u{0304}ʔ", Level::Intermediate);
        assert!(!out.contains('\u{0304}'));
        assert!(out.contains("<sub>ʔ</sub>"), "got: {out}");
    }

    #[test]
    fn test_schwa_by_level() {
        assert_eq!(render("pə", Level::Simple), "pa");
        assert!(render("pə", Level::Intermediate).contains("<span class='gray'>a</span>"));
        assert!(render("pə", Level::Advanced).contains("<span class='gray'>a</span>"));
    }

    #[test]
    fn test_universal_replacements() {
        assert_eq!(render("ci", Level::Simple), "kyi");
        assert_eq!(render("ty", Level::Simple), "tü");
    }

    #[test]
    fn test_velar_nasal_positional() {
        // Before whitespace reads ng, elsewhere ṅ.
        assert_eq!(render("saŋ ", Level::Simple), "sang ");
        assert_eq!(render("saŋma", Level::Simple), "saṅma");
    }

    #[test]
    fn test_common_consonant_substitutions() {
        assert_eq!(render("tɕa", Level::Simple), "cha");
        assert_eq!(render("ɕa", Level::Simple), "sha");
        assert_eq!(render("ɲa", Level::Simple), "nya");
        assert_eq!(render("ɟa", Level::Simple), "gya");
        assert_eq!(render("ja", Level::Simple), "ya");
        assert_eq!(render("ɛ", Level::Simple), "è");
        assert_eq!(render("e", Level::Simple), "é");
        assert_eq!(render("pø", Level::Simple), "pö");
    }

    #[test]
    fn test_half_voicing_stripped_everywhere() {
        assert_eq!(render("l\u{0325}a", Level::Advanced), "la");
        assert_eq!(render("l\u{0325}a", Level::Simple), "la");
    }

    #[test]
    fn test_line_breaks_become_markers() {
        let out = render("ka\nkha", Level::Simple);
        assert_eq!(out, "ka<br/>kha");
    }
}
