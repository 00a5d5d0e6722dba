//! bgui-cli — dump the decoded model of a `.bgui` file.
//!
//! ```text
//! bgui-cli parse <path>                     Parse and dump the model
//! bgui-cli parse <path> --warnings-only     Print only the diagnostics list
//! ```
//!
//! This is not the viewer; it is the minimal external surface the core
//! crate names for inspecting a parse result from the command line.

mod style;

use std::env;
use std::process;

use bgui::{BguiFile, ParseOptions, TreeNode};
use style::{BOLD, DIM, GREEN, RED, RESET};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "parse" => cmd_parse(&args[2..]),
        "-h" | "--help" | "help" => {
            print_usage();
            Ok(())
        }
        _ => {
            eprintln!("{RED}unknown command: {}{RESET}", args[1]);
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        style::error_line(&e.to_string());
        process::exit(2);
    }
}

fn print_usage() {
    eprintln!(
        r#"
{BOLD}bgui-cli{RESET} — dump the decoded model of a .bgui file

{BOLD}USAGE:{RESET}
    bgui-cli parse <path>
    bgui-cli parse <path> --warnings-only

{DIM}parse <path>                 dump header, containers and tree
parse <path> --warnings-only  print only the diagnostics list{RESET}
"#
    );
}

fn cmd_parse(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    if args.is_empty() {
        eprintln!("Usage: bgui-cli parse <path> [--warnings-only]");
        process::exit(1);
    }
    let path = &args[0];
    let warnings_only = args.get(1).map(|s| s.as_str()) == Some("--warnings-only");

    let bytes = std::fs::read(path).map_err(bgui::BguiError::Io)?;
    let (file, warnings) = bgui::parse(bytes, ParseOptions::default())?;

    if warnings_only {
        print_warnings(&warnings);
        return Ok(());
    }

    print_model(path, &file);
    print_warnings(&warnings);
    Ok(())
}

fn print_model(path: &str, file: &BguiFile) {
    style::header(&format!("BGUI: {path}"));

    style::section("Header");
    style::kv("Magic variant", &format!("{:?}", file.header.magic_variant));
    match &file.header.sprite_path {
        Some(s) => style::kv_highlight("Sprite", s),
        None => style::kv("Sprite", "(absent)"),
    }
    style::kv(
        "Project root",
        if file.header.project_root_range.is_some() {
            "found"
        } else {
            "(absent)"
        },
    );
    style::kv("Manifest strings", &file.header.manifest_strings.len().to_string());

    style::section("Containers");
    for c in &file.containers {
        let label = if c.is_manifest() {
            "<manifest>".to_string()
        } else {
            c.name.clone()
        };
        let resource = c
            .resource
            .as_ref()
            .map(|r| r.path.as_str())
            .unwrap_or("-");
        let color = match c.color {
            Some(col) => format!("#{:02X}{:02X}{:02X}", col.r, col.g, col.b),
            None => "-".to_string(),
        };
        style::kv(
            &format!("id {}", c.id),
            &format!("{label:<16} resource={resource:<12} color={color}"),
        );
    }

    style::section("Tree");
    if let Some(root) = &file.root {
        print_tree(root, 0, true);
    } else {
        println!("  {DIM}(empty){RESET}");
    }
    for extra in &file.extra_roots {
        print_tree(extra, 0, true);
    }
}

fn print_tree(node: &TreeNode, depth: usize, last: bool) {
    let label = if node.dangling {
        format!("id {} {RED}(dangling){RESET}", node.id)
    } else {
        format!("id {}", node.id)
    };
    style::tree_line(depth, last, &label);
    for (i, child) in node.children.iter().enumerate() {
        print_tree(child, depth + 1, i + 1 == node.children.len());
    }
}

fn print_warnings(warnings: &[bgui::Warning]) {
    if warnings.is_empty() {
        eprintln!("  {GREEN}no warnings{RESET}");
        return;
    }
    for w in warnings {
        style::warning_line(&w.kind.to_string(), w.offset, &w.message);
    }
}
