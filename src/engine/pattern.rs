//! Pattern compilation
//!
//! Turns a search request into an executable matcher. Keyword sets become one
//! combined Aho-Corasick automaton with leftmost-first semantics over
//! rank-ordered patterns, so at a shared start offset the higher-ranked (and,
//! on rank ties, longer) keyword wins; this is what keeps "category" from
//! being eaten by a lower-ranked "cat". Raw patterns go through the `regex`
//! crate with a JS-style flag string.
//!
//! Keywords are matched literally (the automaton needs no escaping), and
//! case-insensitivity uses the ASCII fast path. Color assignment is
//! deterministic: the Nth original keyword maps to `palette[N % len]`,
//! independent of rank ordering.

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use regex::RegexBuilder;

use crate::engine::types::{SearchMode, SearchRequest};
use crate::error::SearchError;

// =============================================================================
// Color Palette
// =============================================================================

/// One palette entry: background and text color as CSS hex strings
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaletteColor {
    pub background: &'static str,
    pub foreground: &'static str,
}

/// Severity palette: magenta (most severe) through green (least severe)
pub const HIGHLIGHT_COLORS: [PaletteColor; 8] = [
    PaletteColor { background: "#c026d3", foreground: "#ffffff" }, // magenta
    PaletteColor { background: "#db2777", foreground: "#ffffff" }, // pink-red
    PaletteColor { background: "#dc2626", foreground: "#ffffff" }, // red
    PaletteColor { background: "#ea580c", foreground: "#ffffff" }, // deep orange
    PaletteColor { background: "#f97316", foreground: "#000000" }, // orange
    PaletteColor { background: "#eab308", foreground: "#000000" }, // yellow
    PaletteColor { background: "#84cc16", foreground: "#000000" }, // lime
    PaletteColor { background: "#22c55e", foreground: "#000000" }, // green
];

/// Palette index for the Nth original keyword
pub fn color_index(original_index: usize) -> usize {
    original_index % HIGHLIGHT_COLORS.len()
}

// =============================================================================
// Match Spans
// =============================================================================

/// A single match located inside one leaf's text
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
    /// Original keyword index, when the matcher knows which keyword fired
    pub keyword: Option<usize>,
}

impl MatchSpan {
    /// Palette index for this span's highlight
    pub fn color(&self) -> usize {
        self.keyword.map(color_index).unwrap_or(0)
    }
}

// =============================================================================
// Keyword Matcher
// =============================================================================

#[derive(Clone, Debug)]
struct RankedKeyword {
    original_index: usize,
}

/// Compiled multi-keyword matcher (OR and intersection modes)
#[derive(Debug)]
pub struct KeywordMatcher {
    /// Combined automaton over rank-ordered keywords
    automaton: AhoCorasick,
    /// Pattern-id -> original keyword, parallel to the automaton's patterns
    ranked: Vec<RankedKeyword>,
    /// One single-pattern automaton per original keyword, for the independent
    /// per-line and whole-document tests intersection mode needs
    single: Vec<AhoCorasick>,
    /// Keywords in original input order
    keywords: Vec<String>,
    /// False only for the alternation form of a non-global regex request
    pub global: bool,
}

impl KeywordMatcher {
    pub fn compile(
        keywords: &[String],
        case_insensitive: bool,
        global: bool,
    ) -> Result<Self, SearchError> {
        if keywords.is_empty() {
            return Err(SearchError::NoKeywords);
        }

        // Implicit rank = input order + 1; sort by descending rank, ties by
        // descending byte length, so higher-priority and longer keywords are
        // attempted first.
        let mut order: Vec<usize> = (0..keywords.len()).collect();
        order.sort_by(|&a, &b| {
            let rank_a = a + 1;
            let rank_b = b + 1;
            rank_b
                .cmp(&rank_a)
                .then_with(|| keywords[b].len().cmp(&keywords[a].len()))
        });

        let patterns: Vec<&str> = order.iter().map(|&i| keywords[i].as_str()).collect();
        let ranked: Vec<RankedKeyword> = order
            .iter()
            .map(|&i| RankedKeyword { original_index: i })
            .collect();

        let automaton = AhoCorasickBuilder::new()
            .match_kind(MatchKind::LeftmostFirst)
            .ascii_case_insensitive(case_insensitive)
            .build(&patterns)
            .map_err(|e| SearchError::InvalidPattern(e.to_string()))?;

        let mut single = Vec::with_capacity(keywords.len());
        for keyword in keywords {
            let one = AhoCorasickBuilder::new()
                .ascii_case_insensitive(case_insensitive)
                .build([keyword.as_str()])
                .map_err(|e| SearchError::InvalidPattern(e.to_string()))?;
            single.push(one);
        }

        Ok(Self {
            automaton,
            ranked,
            single,
            keywords: keywords.to_vec(),
            global,
        })
    }

    /// Non-overlapping matches in `text`, leftmost-first over ranked keywords
    pub fn find_spans(&self, text: &str) -> Vec<MatchSpan> {
        self.automaton
            .find_iter(text)
            .map(|m| MatchSpan {
                start: m.start(),
                end: m.end(),
                keyword: Some(self.ranked[m.pattern().as_usize()].original_index),
            })
            .collect()
    }

    /// True iff every keyword individually matches somewhere in `text`
    pub fn all_present(&self, text: &str) -> bool {
        self.single.iter().all(|a| a.is_match(text))
    }

    /// The keywords absent from `text`, in original order
    pub fn missing_keywords(&self, text: &str) -> Vec<String> {
        self.single
            .iter()
            .zip(&self.keywords)
            .filter(|(automaton, _)| !automaton.is_match(text))
            .map(|(_, keyword)| keyword.clone())
            .collect()
    }

    pub fn keyword_count(&self) -> usize {
        self.keywords.len()
    }
}

// =============================================================================
// Regex Matcher
// =============================================================================

/// Compiled raw-pattern matcher (regex mode)
#[derive(Debug)]
pub struct RegexMatcher {
    re: regex::Regex,
    /// Without the `g` flag the scan stops after the first match
    pub global: bool,
}

/// Parsed JS-style flag string
#[derive(Clone, Copy, Debug, Default)]
struct RegexFlags {
    global: bool,
    case_insensitive: bool,
    multi_line: bool,
    dot_all: bool,
}

fn parse_flags(flags: &str) -> Result<RegexFlags, SearchError> {
    let mut parsed = RegexFlags::default();
    for ch in flags.chars() {
        match ch {
            'g' => parsed.global = true,
            'i' => parsed.case_insensitive = true,
            'm' => parsed.multi_line = true,
            's' => parsed.dot_all = true,
            // Valid JS flags with no engine-side meaning here
            'd' | 'u' | 'v' | 'y' => {}
            other => {
                return Err(SearchError::InvalidPattern(format!(
                    "Unknown regex flag '{other}'"
                )))
            }
        }
    }
    Ok(parsed)
}

impl RegexMatcher {
    pub fn compile(pattern: &str, flags: &str) -> Result<Self, SearchError> {
        if pattern.is_empty() {
            return Err(SearchError::NoKeywords);
        }
        let parsed = parse_flags(flags)?;
        let re = RegexBuilder::new(pattern)
            .case_insensitive(parsed.case_insensitive)
            .multi_line(parsed.multi_line)
            .dot_matches_new_line(parsed.dot_all)
            .build()
            .map_err(|e| SearchError::InvalidPattern(e.to_string()))?;
        Ok(Self {
            re,
            global: parsed.global,
        })
    }

    /// Non-overlapping matches in `text`. Empty matches are yielded and the
    /// iterator advances past them, so zero-width patterns terminate.
    pub fn find_spans(&self, text: &str) -> Vec<MatchSpan> {
        self.re
            .find_iter(text)
            .map(|m| MatchSpan {
                start: m.start(),
                end: m.end(),
                keyword: None,
            })
            .collect()
    }
}

// =============================================================================
// Compiled Pattern
// =============================================================================

/// A compiled search pattern, ready to run against leaf text
#[derive(Debug)]
pub enum CompiledPattern {
    Keywords(KeywordMatcher),
    Regex(RegexMatcher),
}

impl CompiledPattern {
    pub fn find_spans(&self, text: &str) -> Vec<MatchSpan> {
        match self {
            CompiledPattern::Keywords(m) => m.find_spans(text),
            CompiledPattern::Regex(m) => m.find_spans(text),
        }
    }

    /// Whether the scan should continue past the first match
    pub fn global(&self) -> bool {
        match self {
            CompiledPattern::Keywords(m) => m.global,
            CompiledPattern::Regex(m) => m.global,
        }
    }
}

/// Compile the matcher a request calls for. Validation happens here, before
/// any tree mutation.
pub fn compile_request(request: &SearchRequest) -> Result<CompiledPattern, SearchError> {
    match request.mode {
        SearchMode::Keywords | SearchMode::Intersection => Ok(CompiledPattern::Keywords(
            KeywordMatcher::compile(&request.keywords, request.case_insensitive, true)?,
        )),
        SearchMode::Regex => {
            let parsed = parse_flags(&request.flags)?;
            if let Some(branches) = split_alternation(&request.pattern) {
                // Multi-keyword form (k1|k2|...): compile as a ranked keyword
                // set so each branch gets its own palette color.
                let matcher =
                    KeywordMatcher::compile(&branches, parsed.case_insensitive, parsed.global)?;
                return Ok(CompiledPattern::Keywords(matcher));
            }
            Ok(CompiledPattern::Regex(RegexMatcher::compile(
                &request.pattern,
                &request.flags,
            )?))
        }
    }
}

/// Detect the `(k1|k2|...)` multi-keyword pattern shape: one outer group
/// containing two or more branches split on unescaped `|`. Returns the
/// unescaped branch literals, or None if the pattern is anything else.
fn split_alternation(pattern: &str) -> Option<Vec<String>> {
    let inner = pattern.strip_prefix('(')?.strip_suffix(')')?;
    if inner.is_empty() {
        return None;
    }

    let mut branches = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut escaped = false;
    for ch in inner.chars() {
        if escaped {
            // Keep only the escaped character, undoing literal escaping
            current.push(ch);
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '(' => {
                depth += 1;
                current.push(ch);
            }
            ')' => {
                depth = depth.checked_sub(1)?;
                current.push(ch);
            }
            '|' if depth == 0 => {
                branches.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    if escaped || depth != 0 {
        return None;
    }
    branches.push(current);

    if branches.len() > 1 && branches.iter().all(|b| !b.is_empty()) {
        Some(branches)
    } else {
        None
    }
}
