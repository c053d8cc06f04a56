//! Parser configuration

/// Maximum nesting depth of arrays and dictionaries
pub const MAX_RECURSION_DEPTH: usize = 1000;

/// Largest integer exactly representable as an IEEE-754 double (2^53 - 1)
pub const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_991;

/// Options controlling how tolerant the object parser is
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Clamp numbers whose magnitude exceeds [`MAX_SAFE_INTEGER`]
    pub cap_numbers: bool,

    /// Recover from unterminated literal strings instead of failing
    pub lenient_syntax: bool,

    /// Keep warnings in the parse result in addition to logging them
    pub collect_warnings: bool,

    /// Decode `#xx` escapes in names (`/A#20B` becomes `A B`)
    pub decode_name_escapes: bool,

    /// Maximum nesting depth of arrays and dictionaries
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            cap_numbers: false,
            lenient_syntax: true,
            collect_warnings: true,
            decode_name_escapes: false,
            max_depth: MAX_RECURSION_DEPTH,
        }
    }
}

impl ParseOptions {
    /// No recovery: every irregularity is an error
    pub fn strict() -> Self {
        Self {
            cap_numbers: false,
            lenient_syntax: false,
            collect_warnings: true,
            decode_name_escapes: false,
            max_depth: MAX_RECURSION_DEPTH,
        }
    }

    /// Maximum tolerance for files from buggy producers
    pub fn lenient() -> Self {
        Self {
            cap_numbers: true,
            lenient_syntax: true,
            collect_warnings: true,
            decode_name_escapes: true,
            max_depth: MAX_RECURSION_DEPTH,
        }
    }
}
