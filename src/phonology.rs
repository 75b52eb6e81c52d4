//! Unicode → phonetic conversion and the two configured schema tables.
//!
//! [`UnicodeToPhonetic`] converts one segmented word (possibly several
//! tsheg-delimited syllables) into a phonetic string under a target
//! [`Schema`].  It is a deterministic pure function of its configuration
//! and input: each syllable is parsed into prefix, superscript, root,
//! medials, vowel sign, suffixes and affix, then rewritten through the
//! schema's consonant/vowel tables plus tone and final rules controlled
//! by [`PhonOptions`].
//!
//! [`PhoneticMapper`] owns the two table instances the pipeline uses —
//! Schema A (KVP romanization, default options) and Schema B (MST phonetic
//! notation with the fastidious option set) — and applies them word by
//! word to segmented text, producing two parallel streams.  There are no
//! module-level singletons; construct a mapper once and pass it around.

use crate::tokenize::{is_punct_char, is_syllable_char};

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Target phonetic notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    /// Romanized transcription (Schema A).
    Kvp,
    /// MST phonetic notation (Schema B), consumed by the renderer.
    Mst,
}

/// When prefix-consonant rules apply to the onset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrefixStrategy {
    /// Prefixes never alter the onset.
    #[default]
    Default,
    /// Prefix rules always apply (devoicing cover, tone raise).
    Always,
}

/// How suffix ད/ས finals are realized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopSdMode {
    /// Umlaut only, no stop mark.
    #[default]
    None,
    /// Glottal stop, but only on the last syllable of a word.
    EndOfWord,
}

/// Rule knobs of the phonological table.  Fixed at construction.
#[derive(Debug, Clone)]
pub struct PhonOptions {
    /// Marker for weak (low-tone) aspiration; `None` disables the marking.
    pub weak_aspiration_char: Option<char>,
    /// Aspirate voiced-origin low-tone initials at all.
    pub aspirate_low_tones: bool,
    pub prefix_strategy: PrefixStrategy,
    /// Marker appended for the འི genitive affix.
    pub ai_affix_char: Option<char>,
    /// Prenasalization marker; `None` drops nasal marking.
    pub nasal_char: Option<char>,
    pub stop_sd_mode: StopSdMode,
    /// Elide syllable-initial བ in non-initial position (lenition to w).
    pub eat_p: bool,
    /// Elide syllable-initial ག in non-initial position.
    pub eat_k: bool,
    /// Render final stops as unreleased (◌̚) after the glottal onset.
    pub use_unreleased_stops: bool,
    /// Separator between syllables of one word; `None` joins directly.
    pub syllable_sep: Option<char>,
    /// Tone marks placed after the first syllable's vowel.
    pub high_tone_char: Option<char>,
    pub low_tone_char: Option<char>,
}

impl Default for PhonOptions {
    fn default() -> Self {
        Self {
            weak_aspiration_char: None,
            aspirate_low_tones: false,
            prefix_strategy: PrefixStrategy::Default,
            ai_affix_char: None,
            nasal_char: None,
            stop_sd_mode: StopSdMode::None,
            eat_p: false,
            eat_k: false,
            use_unreleased_stops: false,
            syllable_sep: None,
            high_tone_char: None,
            low_tone_char: None,
        }
    }
}

impl PhonOptions {
    /// The fastidious option set used for Schema B (MST): weak aspiration
    /// marked with `3`, tone-conditioned aspiration, always-apply prefix
    /// rules, `ː` affix marker, no nasal marking, end-of-word stop release,
    /// unreleased stops, no syllable separator.
    pub fn fastidious() -> Self {
        Self {
            weak_aspiration_char: Some('3'),
            aspirate_low_tones: true,
            prefix_strategy: PrefixStrategy::Always,
            ai_affix_char: Some('ː'),
            nasal_char: None,
            stop_sd_mode: StopSdMode::EndOfWord,
            eat_p: false,
            eat_k: false,
            use_unreleased_stops: true,
            syllable_sep: None,
            high_tone_char: Some('\u{0304}'),
            low_tone_char: Some('\u{0331}'),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Consonant and vowel tables
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct Consonant {
    roman: &'static str,
    ipa: &'static str,
    high_tone: bool,
    /// Voiced-origin initials carry weak aspiration when uncovered.
    voiced_origin: bool,
}

const fn c(roman: &'static str, ipa: &'static str, high: bool, vo: bool) -> Consonant {
    Consonant { roman, ipa, high_tone: high, voiced_origin: vo }
}

fn consonant(base: char) -> Option<Consonant> {
    Some(match base {
        'ཀ' => c("k", "k", true, false),
        'ཁ' => c("kh", "kʰ", true, false),
        'ག' => c("g", "k", false, true),
        'ང' => c("ng", "ŋ", false, false),
        'ཅ' => c("c", "tɕ", true, false),
        'ཆ' => c("ch", "tɕʰ", true, false),
        'ཇ' => c("j", "tɕ", false, true),
        'ཉ' => c("ny", "ɲ", false, false),
        'ཊ' => c("t", "ʈ", true, false),
        'ཋ' => c("th", "ʈʰ", true, false),
        'ཌ' => c("d", "ʈ", false, true),
        'ཎ' => c("n", "n", false, false),
        'ཏ' => c("t", "t", true, false),
        'ཐ' => c("th", "tʰ", true, false),
        'ད' => c("d", "t", false, true),
        'ན' => c("n", "n", false, false),
        'པ' => c("p", "p", true, false),
        'ཕ' => c("ph", "pʰ", true, false),
        'བ' => c("b", "p", false, true),
        'མ' => c("m", "m", false, false),
        'ཙ' => c("ts", "ts", true, false),
        'ཚ' => c("tsh", "tsʰ", true, false),
        'ཛ' => c("dz", "ts", false, true),
        'ཝ' => c("w", "w", false, false),
        'ཞ' => c("zh", "ɕ", false, false),
        'ཟ' => c("z", "s", false, false),
        'འ' => c("", "", false, false),
        'ཡ' => c("y", "j", false, false),
        'ར' => c("r", "r", false, false),
        'ལ' => c("l", "l", false, false),
        'ཤ' => c("sh", "ɕ", true, false),
        'ཥ' => c("sh", "ɕ", true, false),
        'ས' => c("s", "s", true, false),
        'ཧ' => c("h", "h", true, false),
        'ཨ' => c("", "", true, false),
        _ => return None,
    })
}

/// Medial (subjoined) transforms on the onset, by stop series.
fn apply_medial(base: char, cons: Consonant, medial: char) -> Consonant {
    let velar = matches!(base, 'ཀ' | 'ཁ' | 'ག');
    let labial = matches!(base, 'པ' | 'ཕ' | 'བ');
    let dental = matches!(base, 'ཏ' | 'ཐ' | 'ད');
    match medial {
        // ya-btags: palatalization
        SUB_YA if velar => match base {
            'ཀ' => c("ky", "c", true, false),
            'ཁ' => c("khy", "cʰ", true, false),
            _ => c("gy", "ɟ", false, true),
        },
        SUB_YA if labial => match base {
            'པ' => c("ch", "c", true, false),
            'ཕ' => c("ch", "cʰ", true, false),
            _ => c("j", "ɟ", false, true),
        },
        SUB_YA if base == 'མ' => c("ny", "ɲ", false, false),
        // ra-btags: retroflexion
        SUB_RA if velar || labial || dental => match base {
            'ཀ' | 'ཏ' | 'པ' => c("tr", "ʈ", true, false),
            'ཁ' | 'ཐ' | 'ཕ' => c("thr", "ʈʰ", true, false),
            _ => c("dr", "ʈ", false, true),
        },
        // la-btags: onset l, high tone
        SUB_LA => c("l", "l", true, false),
        _ => cons,
    }
}

/// Subjoined code points with onset-altering effect.
const SUB_YA: char = '\u{0FB1}';
const SUB_RA: char = '\u{0FB2}';
const SUB_LA: char = '\u{0FB3}';

const PREFIXES: [char; 5] = ['ག', 'ད', 'བ', 'མ', 'འ'];
const SUFFIXES: [char; 10] = ['ག', 'ང', 'ད', 'ན', 'བ', 'མ', 'འ', 'ར', 'ལ', 'ས'];
const SECONDARY_SUFFIXES: [char; 2] = ['ས', 'ད'];

/// Convert a subjoined letter to its base form.
fn subjoined_to_base(sub: char) -> Option<char> {
    let code = sub as u32;
    match code {
        0x0F90..=0x0FB8 => char::from_u32(code - 0x50),
        0x0FBB => Some('ཡ'),
        0x0FBC => Some('ར'),
        _ => None,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Syllable parsing
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Clone)]
struct Stack {
    base: char,
    sub: Vec<char>,
    vowel: Option<char>,
    long: bool,
}

#[derive(Debug)]
struct Syllable {
    prefix: Option<char>,
    superscript: Option<char>,
    root: char,
    medials: Vec<char>,
    vowel: Option<char>,
    long: bool,
    suffix: Option<char>,
    /// འི genitive affix attached to this syllable.
    ai_affix: bool,
    /// འོ affix — overrides the vowel with o.
    o_affix: bool,
    /// Anusvara ཾ — nasal final.
    nasal_final: bool,
}

fn build_stacks(syl: &str) -> (Vec<Stack>, bool) {
    let mut stacks: Vec<Stack> = Vec::new();
    let mut nasal_final = false;
    for ch in syl.chars() {
        match ch {
            'ཀ'..='ཬ' => stacks.push(Stack { base: ch, ..Stack::default() }),
            '\u{0F90}'..='\u{0FBC}' => {
                if let Some(stack) = stacks.last_mut() {
                    stack.sub.push(ch);
                }
            }
            '\u{0F71}' => {
                if let Some(stack) = stacks.last_mut() {
                    stack.long = true;
                }
            }
            '\u{0F72}' | '\u{0F80}' => set_vowel(&mut stacks, '\u{0F72}'),
            '\u{0F74}' => set_vowel(&mut stacks, '\u{0F74}'),
            '\u{0F7A}' | '\u{0F7B}' => set_vowel(&mut stacks, '\u{0F7A}'),
            '\u{0F7C}' | '\u{0F7D}' => set_vowel(&mut stacks, '\u{0F7C}'),
            '\u{0F7E}' => nasal_final = true,
            // Honorific and other combining marks carry no phonetic weight.
            _ => {}
        }
    }
    (stacks, nasal_final)
}

fn set_vowel(stacks: &mut [Stack], vowel: char) {
    if let Some(stack) = stacks.last_mut() {
        stack.vowel = Some(vowel);
    }
}

/// Pick the root stack: the one carrying a vowel sign or subjoined letters
/// wins (an འ affix stack never does); otherwise fall back to the
/// positional rules of Tibetan orthography.
fn root_index(stacks: &[Stack]) -> usize {
    if let Some(i) = stacks
        .iter()
        .position(|s| !s.sub.is_empty() || s.vowel.is_some() || s.long)
    {
        if !(i > 0 && stacks[i].base == 'འ') {
            return i;
        }
    }
    match stacks.len() {
        0 | 1 => 0,
        2 => {
            if SUFFIXES.contains(&stacks[1].base) {
                0
            } else {
                1
            }
        }
        3 => {
            let suffix_reading = SUFFIXES.contains(&stacks[1].base)
                && SECONDARY_SUFFIXES.contains(&stacks[2].base);
            if PREFIXES.contains(&stacks[0].base) && !suffix_reading {
                1
            } else {
                0
            }
        }
        _ => 1,
    }
}

fn parse_syllable(syl: &str) -> Option<Syllable> {
    let (stacks, nasal_final) = build_stacks(syl);
    if stacks.is_empty() {
        return None;
    }
    let root_idx = root_index(&stacks);
    let root_stack = &stacks[root_idx];

    let prefix = (root_idx > 0 && PREFIXES.contains(&stacks[root_idx - 1].base))
        .then(|| stacks[root_idx - 1].base);

    // A ར/ལ/ས base above subjoined letters is a superscript; the first
    // subjoined letter is the actual root.
    let (superscript, root, medials) = if matches!(root_stack.base, 'ར' | 'ལ' | 'ས')
        && !root_stack.sub.is_empty()
        && root_stack.sub[0] != SUB_YA
        && root_stack.sub[0] != SUB_RA
        && root_stack.sub[0] != SUB_LA
    {
        let root = subjoined_to_base(root_stack.sub[0])?;
        (Some(root_stack.base), root, root_stack.sub[1..].to_vec())
    } else {
        (None, root_stack.base, root_stack.sub.clone())
    };

    let mut syllable = Syllable {
        prefix,
        superscript,
        root,
        medials,
        vowel: root_stack.vowel,
        long: root_stack.long,
        suffix: None,
        ai_affix: false,
        o_affix: false,
        nasal_final,
    };

    for stack in &stacks[root_idx + 1..] {
        if stack.base == 'འ' {
            match stack.vowel {
                Some('\u{0F72}') => syllable.ai_affix = true,
                Some('\u{0F7C}') => syllable.o_affix = true,
                _ => {}
            }
        } else if syllable.suffix.is_none() && SUFFIXES.contains(&stack.base) {
            syllable.suffix = Some(stack.base);
        }
        // Secondary suffix ས/ད is orthographic only.
    }

    Some(syllable)
}

// ─────────────────────────────────────────────────────────────────────────────
// UnicodeToPhonetic
// ─────────────────────────────────────────────────────────────────────────────

/// One configured character-to-phonetic conversion table.
#[derive(Debug, Clone)]
pub struct UnicodeToPhonetic {
    schema: Schema,
    options: PhonOptions,
}

impl UnicodeToPhonetic {
    pub fn new(schema: Schema, options: PhonOptions) -> Self {
        Self { schema, options }
    }

    /// Convert one segmented word to its phonetic string.
    ///
    /// Unparseable syllables map to the empty string; a token that holds
    /// only script punctuation maps to `"."`.  Never fails.
    pub fn get_api(&self, word: &str) -> String {
        let syllables: Vec<&str> = word
            .split(['\u{0F0B}', '\u{0F0C}'])
            .map(|part| part.trim_matches(|c: char| !is_syllable_char(c)))
            .filter(|part| !part.is_empty())
            .collect();

        if syllables.is_empty() {
            if word.chars().any(is_punct_char) {
                return ".".to_string();
            }
            return String::new();
        }

        let last = syllables.len() - 1;
        let parts: Vec<String> = syllables
            .iter()
            .enumerate()
            .map(|(i, syl)| self.convert_syllable(syl, i == 0, i == last))
            .collect();

        match self.options.syllable_sep {
            Some(sep) => parts.join(&sep.to_string()),
            None => parts.concat(),
        }
    }

    fn convert_syllable(&self, syl: &str, first: bool, last: bool) -> String {
        let Some(parsed) = parse_syllable(syl) else {
            return String::new();
        };
        match self.schema {
            Schema::Kvp => self.roman_syllable(&parsed),
            Schema::Mst => self.mst_syllable(&parsed, first, last),
        }
    }

    // ── Schema A: romanization ────────────────────────────────────────────────

    fn roman_syllable(&self, syl: &Syllable) -> String {
        let Some(mut cons) = consonant(syl.root) else {
            return String::new();
        };
        // ལྷ — voiceless l
        if syl.root == 'ཧ' && syl.superscript == Some('ལ') {
            cons = c("lh", "l\u{0325}", true, false);
        }
        for &m in &syl.medials {
            cons = apply_medial(syl.root, cons, m);
        }

        let umlaut = self.suffix_umlauts(syl);
        let vowel = match syl.vowel {
            None => {
                if umlaut {
                    "ä"
                } else {
                    "a"
                }
            }
            Some('\u{0F72}') => "i",
            Some('\u{0F74}') => {
                if umlaut {
                    "ü"
                } else {
                    "u"
                }
            }
            Some('\u{0F7A}') => "e",
            Some('\u{0F7C}') => {
                if umlaut {
                    "ö"
                } else {
                    "o"
                }
            }
            _ => "a",
        };
        let vowel = if syl.o_affix { "o" } else { vowel };

        let coda = if syl.nasal_final {
            "m"
        } else {
            match syl.suffix {
                Some('ག') => "k",
                Some('ང') => "ng",
                Some('ན') => "n",
                Some('བ') => "p",
                Some('མ') => "m",
                Some('ར') => "r",
                Some('ལ') => "l",
                _ => "",
            }
        };

        format!("{}{}{}", cons.roman, vowel, coda)
    }

    // ── Schema B: MST phonetic notation ───────────────────────────────────────

    fn mst_syllable(&self, syl: &Syllable, first: bool, last: bool) -> String {
        let opts = &self.options;
        let Some(mut cons) = consonant(syl.root) else {
            return String::new();
        };
        if syl.root == 'ཧ' && syl.superscript == Some('ལ') {
            cons = c("lh", "l\u{0325}", true, false);
        }
        for &m in &syl.medials {
            cons = apply_medial(syl.root, cons, m);
        }

        // The onset is "covered" when a superscript sits on it, or a prefix
        // does and prefix rules always apply.
        let covered = syl.superscript.is_some()
            || (syl.prefix.is_some() && opts.prefix_strategy == PrefixStrategy::Always);

        let mut onset = String::new();
        if !first && !covered {
            // Intervocalic lenition knobs.
            if opts.eat_p && syl.root == 'བ' && syl.medials.is_empty() {
                onset.push('w');
            } else if opts.eat_k && syl.root == 'ག' && syl.medials.is_empty() {
                // elided
            } else {
                onset.push_str(cons.ipa);
            }
        } else {
            onset.push_str(cons.ipa);
        }

        let mut tone_high = cons.high_tone;
        if covered {
            // Covered voiced-origin stops lose weak aspiration (handled
            // below); covered sonorants are raised to high tone.
            if matches!(cons.ipa, "ŋ" | "ɲ" | "n" | "m" | "l" | "r" | "j" | "w") {
                tone_high = true;
            }
        } else if cons.voiced_origin && opts.aspirate_low_tones && onset == cons.ipa {
            if let Some(weak) = opts.weak_aspiration_char {
                onset.push(weak);
            } else {
                onset.push('ʰ');
            }
        }

        let umlaut = self.suffix_umlauts(syl);
        let mut vowel = match syl.vowel {
            None => {
                if umlaut {
                    "ɛ".to_string()
                } else {
                    "a".to_string()
                }
            }
            Some('\u{0F72}') => "i".to_string(),
            Some('\u{0F74}') => {
                if umlaut {
                    "y".to_string()
                } else {
                    "u".to_string()
                }
            }
            Some('\u{0F7A}') => "e".to_string(),
            Some('\u{0F7C}') => {
                if umlaut {
                    "ø".to_string()
                } else {
                    "o".to_string()
                }
            }
            _ => "a".to_string(),
        };
        if syl.o_affix {
            vowel = "o".to_string();
        }

        let coda = if syl.nasal_final {
            "m".to_string()
        } else {
            match syl.suffix {
                Some('ག') => {
                    if opts.use_unreleased_stops {
                        "ʔk\u{031A}".to_string()
                    } else {
                        "k".to_string()
                    }
                }
                Some('བ') => {
                    if opts.use_unreleased_stops {
                        "ʔp\u{031A}".to_string()
                    } else {
                        "p".to_string()
                    }
                }
                Some('ང') => "ŋ".to_string(),
                Some('ན') => {
                    if opts.use_unreleased_stops {
                        "n\u{031A}".to_string()
                    } else {
                        "n".to_string()
                    }
                }
                Some('མ') => "m".to_string(),
                Some('ར') => "ː".to_string(),
                Some('ལ') => "ː".to_string(),
                Some('ད') | Some('ས') => match opts.stop_sd_mode {
                    StopSdMode::EndOfWord if last => "ʔ".to_string(),
                    _ => String::new(),
                },
                _ => String::new(),
            }
        };

        // Unstressed plain a reduces to schwa; o lowers before a
        // glottalized final.
        if !first && vowel == "a" && !syl.long {
            vowel = "ə".to_string();
        }
        if vowel == "o" && coda.starts_with('ʔ') {
            vowel = "ɔ".to_string();
        }

        let mut out = onset;
        out.push_str(&vowel);
        if first {
            let mark = if tone_high {
                opts.high_tone_char
            } else {
                opts.low_tone_char
            };
            if let Some(mark) = mark {
                out.push(mark);
            }
        }
        if syl.long {
            out.push('ː');
        }
        if syl.ai_affix {
            if let Some(affix) = opts.ai_affix_char {
                out.push(affix);
            }
        }
        out.push_str(&coda);
        out
    }

    /// Suffixes ད/ས/ན/ལ and the འི affix front the vowel.
    fn suffix_umlauts(&self, syl: &Syllable) -> bool {
        syl.ai_affix
            || matches!(syl.suffix, Some('ད') | Some('ས') | Some('ན') | Some('ལ'))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PhoneticMapper
// ─────────────────────────────────────────────────────────────────────────────

/// Two newline-aligned phonetic renderings of the same segmented input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneticPair {
    pub kvp: String,
    pub ipa: String,
}

/// The two process-wide table configurations, constructed once and passed
/// by reference into the pipeline.  Read-only after construction.
#[derive(Debug, Clone)]
pub struct PhoneticMapper {
    kvp: UnicodeToPhonetic,
    mst: UnicodeToPhonetic,
}

impl Default for PhoneticMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl PhoneticMapper {
    pub fn new() -> Self {
        Self {
            kvp: UnicodeToPhonetic::new(Schema::Kvp, PhonOptions::default()),
            mst: UnicodeToPhonetic::new(Schema::Mst, PhonOptions::fastidious()),
        }
    }

    /// Convert segmented text word-by-word under both schemas.
    ///
    /// Line and word order mirror the input exactly: each word contributes
    /// its phonetic string plus two trailing spaces, each input line one
    /// trailing newline (empty lines stay empty phonetic lines).
    pub fn map(&self, segmented: &str) -> PhoneticPair {
        let mut kvp = String::new();
        let mut ipa = String::new();
        for line in segmented.split('\n') {
            for word in line.split_whitespace() {
                kvp.push_str(&self.kvp.get_api(word));
                kvp.push_str("  ");
                ipa.push_str(&self.mst.get_api(word));
                ipa.push_str("  ");
            }
            kvp.push('\n');
            ipa.push('\n');
        }
        PhoneticPair { kvp, ipa }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
