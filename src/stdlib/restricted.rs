//! Fully blocked libraries: `io`, `coroutine`, and `package`.
//!
//! The names resolve so scripts written against the reference language
//! fail with a clear permission error instead of an undeclared-name one.

use crate::library::Library;

pub fn io_library() -> Library {
    Library::new("io").block(&[
        "open", "close", "read", "write", "lines", "input", "output", "flush", "popen",
        "tmpfile", "type",
    ])
}

pub fn coroutine_library() -> Library {
    Library::new("coroutine").block(&[
        "create",
        "resume",
        "yield",
        "status",
        "wrap",
        "running",
        "isyieldable",
    ])
}

pub fn package_library() -> Library {
    Library::new("package").block(&[
        "loadlib",
        "searchpath",
        "seeall",
        "path",
        "cpath",
        "loaded",
        "preload",
    ])
}
