use std::io::{self, Write};

pub(crate) const RESET: &str = "\x1b[0m";
pub(crate) const BOLD: &str = "\x1b[1m";
pub(crate) const DIM: &str = "\x1b[2m";
pub(crate) const GREEN: &str = "\x1b[32m";
pub(crate) const CYAN: &str = "\x1b[36m";
pub(crate) const YELLOW: &str = "\x1b[33m";
pub(crate) const RED: &str = "\x1b[31m";

pub(crate) const DASH_LINE: &str = "────────────────────────────────────────────────────────────";
pub(crate) const DOUBLE_LINE: &str = "════════════════════════════════════════════════════════════";

pub(crate) fn header(title: &str) {
    println!();
    println!("  {BOLD}{title}{RESET}");
    println!("  {DIM}{DOUBLE_LINE}{RESET}");
}

pub(crate) fn section(title: &str) {
    println!();
    println!("  {CYAN}{BOLD}{title}{RESET}");
    println!("  {DIM}{DASH_LINE}{RESET}");
}

pub(crate) fn kv(key: &str, value: &str) {
    println!("  {DIM}{key:<18}{RESET} {value}");
}

pub(crate) fn kv_highlight(key: &str, value: &str) {
    println!("  {DIM}{key:<18}{RESET} {BOLD}{GREEN}{value}{RESET}");
}

pub(crate) fn tree_line(depth: usize, last: bool, text: &str) {
    let indent = "  ".repeat(depth);
    let branch = if depth == 0 {
        ""
    } else if last {
        "└── "
    } else {
        "├── "
    };
    println!("  {DIM}{indent}{branch}{RESET}{text}");
}

pub(crate) fn warning_line(kind: &str, offset: usize, message: &str) {
    eprintln!("  {YELLOW}[{kind}]{RESET} {DIM}@0x{offset:X}:{RESET} {message}");
}

pub(crate) fn error_line(message: &str) {
    eprintln!("{RED}{BOLD}error:{RESET} {message}");
    io::stderr().flush().ok();
}
