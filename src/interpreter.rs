// ABOUTME: Embedding facade wiring lexer, parser, and evaluator together

use crate::error::ExecError;
use crate::eval::Evaluator;
use crate::lexer;
use crate::library::Library;
use crate::parser;
use crate::value::Value;
use once_cell::sync::Lazy;
use regex::Regex;

static CODE_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:lua)?[ \t]*\r?\n?(.*?)```").expect("code-block regex is valid")
});

/// One interpreter instance: feed it source with [`execute`], read captured
/// output from [`logs`].
///
/// Scripts never touch the outside world; `print` output lands in the log
/// buffer and host capabilities are limited to the libraries passed to
/// [`Interpreter::new`] plus the built-in set.
///
/// [`execute`]: Interpreter::execute
/// [`logs`]: Interpreter::logs
///
/// ```
/// use moonlet::Interpreter;
///
/// let mut interpreter = Interpreter::default();
/// interpreter.execute("print(1 + 2)").unwrap();
/// assert_eq!(interpreter.logs(), "3\n");
/// ```
pub struct Interpreter {
    evaluator: Evaluator,
}

impl Interpreter {
    /// Create an interpreter. `libraries` become available to scripts via
    /// `require(name)`.
    pub fn new(libraries: Vec<Library>) -> Self {
        Interpreter {
            evaluator: Evaluator::new(libraries),
        }
    }

    /// Run a source text to completion.
    ///
    /// On success the result is the script's returned value (or the value
    /// of its last statement); on failure the error carries the cause
    /// chain. State and logs persist across calls.
    pub fn execute(&mut self, source: &str) -> Result<Value, ExecError> {
        let tokens = lexer::tokenize(source)?;
        let root = parser::parse(tokens, source)?;
        self.evaluator.set_source(source);
        Ok(self.evaluator.run(&root)?)
    }

    /// Captured `print` output accumulated since the last clear.
    pub fn logs(&self) -> &str {
        self.evaluator.logs()
    }

    pub fn clear_logs(&mut self) {
        self.evaluator.clear_logs();
    }

    /// Drop user definitions and reinstall natives and libraries.
    pub fn reset_environment(&mut self) {
        self.evaluator.reset_environment();
    }

    /// Reset environment and logs, returning the interpreter to its
    /// freshly constructed state.
    pub fn reset(&mut self) {
        self.reset_environment();
        self.clear_logs();
    }

    /// Extract the contents of fenced code blocks from a text, for hosts
    /// that receive scripts embedded in prose.
    pub fn find_code_blocks(text: &str) -> Vec<String> {
        CODE_BLOCK
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|block| block.as_str().trim().to_string())
            .filter(|block| !block.is_empty())
            .collect()
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter::new(Vec::new())
    }
}
