//! Parser configuration and crate-wide constants.

/// Name of the synthetic end-of-input terminal.
pub const EOF_NAME: &str = "EOF";

/// Placeholder used in the AST where recovery left a name underived.
pub const MISSING_NAME: &str = "<missing>";

/// Default cap on the parse stack depth.
pub const DEFAULT_MAX_STACK_DEPTH: usize = 10_000;

/// Default cap on expression and statement nesting during AST reduction.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 1_000;

/// Default number of trace steps recorded before the trace is truncated.
pub const DEFAULT_TRACE_LIMIT: usize = 100_000;

/// Runtime knobs for the parsing engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// The parse stops with a diagnostic if the stack grows past this.
    pub max_stack_depth: usize,
    /// AST reduction turns subtrees nested deeper than this into error nodes.
    pub max_nesting_depth: usize,
    /// Record a [`TraceStep`](crate::trace::TraceStep) for every engine step.
    pub trace: bool,
    /// Maximum number of recorded trace steps.
    pub trace_limit: usize,
}

impl ParserConfig {
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn with_trace_limit(mut self, limit: usize) -> Self {
        self.trace_limit = limit;
        self
    }

    pub fn with_max_stack_depth(mut self, depth: usize) -> Self {
        self.max_stack_depth = depth;
        self
    }

    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            max_stack_depth: DEFAULT_MAX_STACK_DEPTH,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            trace: false,
            trace_limit: DEFAULT_TRACE_LIMIT,
        }
    }
}
