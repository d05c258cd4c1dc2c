// ABOUTME: Constants and limits for the interpreter and its REPL

pub const VERSION: &str = "1.0.0";
pub const WELCOME_MESSAGE: &str = "Moonlet v1.0";
pub const WELCOME_SUBTITLE: &str = "A sandboxed Lua-flavored scripting interpreter";

/// Hard cap on iterations of a single loop statement. Runaway scripts hit
/// this long before they can starve the host.
pub const MAX_LOOP_ITERATIONS: usize = 65_536;

/// Hard cap on nested call frames, the recursion counterpart of the loop cap.
pub const MAX_CALL_DEPTH: usize = 200;

pub const HELP_TEXT: &str = r#"
Available commands:
  exit                 - Leave the REPL (Ctrl-D also works)
  help                 - Show this help message

Type any script statement to evaluate it. Output produced by print() is
captured and echoed after each evaluation.
"#;
