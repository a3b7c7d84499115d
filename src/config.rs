//! Parser options.

/// Options shared by module and script parsing.
///
/// ```
/// use kasm_text::Config;
///
/// let config = Config::new().max_depth(64).simd(false);
/// assert_eq!(config.max_depth, 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Deepest allowed parenthesis nesting. Deeper input is rejected with a
    /// structural error.
    pub max_depth: usize,
    /// Accept `v128` and SIMD instructions.
    pub simd: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: 512,
            simd: true,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    #[must_use]
    pub fn simd(mut self, enabled: bool) -> Self {
        self.simd = enabled;
        self
    }
}
