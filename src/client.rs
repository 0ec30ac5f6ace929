//! Command-line parsing and command execution for the `vsstree` binary.

use std::io::Write;

use crate::codec::NodeRecord;
use crate::config::{RecordLayout, TreeConfig};
use crate::cursor::Cursor;
use crate::errors::{VssResult, VssTreeError};
use crate::export::{ExportFormat, ExportKind, export_to_path};
use crate::search::{SearchQuery, search};
use crate::tree::{DecodeReport, NodeId, VssTree, write_tree_atomic};

/// One parsed subcommand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Stats,
    Show {
        path: String,
    },
    Search {
        path: String,
        max: Option<usize>,
        all_kinds: bool,
        any_depth: bool,
    },
    Subtree {
        path: String,
        depth: usize,
    },
    Export {
        kind: ExportKind,
        out: String,
        format: ExportFormat,
    },
    Write {
        out: String,
    },
    Nav {
        steps: String,
    },
}

impl Command {
    pub fn parse(name: &str, args: &[&str]) -> Result<Self, String> {
        let mut positional = Vec::new();
        let mut max = None;
        let mut all_kinds = false;
        let mut any_depth = false;
        let mut json = false;
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match *arg {
                "--max" => {
                    let value = iter
                        .next()
                        .ok_or_else(|| "--max requires a value".to_string())?;
                    max = Some(parse_number("--max", value)?);
                }
                "--all-kinds" => all_kinds = true,
                "--any-depth" => any_depth = true,
                "--json" => json = true,
                other if other.starts_with("--") => {
                    return Err(format!("unknown flag {other} for {name}"));
                }
                other => positional.push(other.to_string()),
            }
        }
        let format = if json {
            ExportFormat::Json
        } else {
            ExportFormat::Lines
        };

        let command = match (name, positional.as_slice()) {
            ("stats", []) => Command::Stats,
            ("show", [path]) => Command::Show { path: path.clone() },
            ("search", [path]) => Command::Search {
                path: path.clone(),
                max,
                all_kinds,
                any_depth,
            },
            ("subtree", [path, depth]) => Command::Subtree {
                path: path.clone(),
                depth: parse_number("DEPTH", depth)?,
            },
            ("leaves", [out]) => Command::Export {
                kind: ExportKind::LeafPaths,
                out: out.clone(),
                format,
            },
            ("uuids", [out]) => Command::Export {
                kind: ExportKind::Uuids,
                out: out.clone(),
                format,
            },
            ("write", [out]) => Command::Write { out: out.clone() },
            ("nav", [steps]) => Command::Nav {
                steps: steps.clone(),
            },
            ("stats" | "show" | "search" | "subtree" | "leaves" | "uuids" | "write" | "nav", _) => {
                return Err(format!("wrong arguments for {name}\n{}", CommandLineConfig::help()));
            }
            (other, _) => return Err(format!("unknown command {other}")),
        };
        Ok(command)
    }
}

fn parse_number(what: &str, value: &str) -> Result<usize, String> {
    value
        .parse()
        .map_err(|_| format!("{what} expects a non-negative number, got {value}"))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandLineConfig {
    pub input: String,
    pub config: Option<String>,
    pub layout: Option<RecordLayout>,
    pub command: Command,
}

impl CommandLineConfig {
    pub fn from_args(args: &[&str]) -> Result<Self, String> {
        let mut config = None;
        let mut layout = None;
        let mut input = None;
        let mut iter = args.iter().skip(1);
        while let Some(arg) = iter.next() {
            match *arg {
                "--config" => {
                    config = Some(
                        iter.next()
                            .ok_or_else(|| "--config requires a value".to_string())?
                            .to_string(),
                    );
                }
                "--layout" => {
                    let value = iter
                        .next()
                        .ok_or_else(|| "--layout requires a value".to_string())?;
                    layout = Some(match *value {
                        "wide" | "2" => RecordLayout::Wide,
                        "narrow" | "1" => RecordLayout::Narrow,
                        other => return Err(format!("unknown layout {other}")),
                    });
                }
                other if other.starts_with('-') => {
                    return Err(format!("unknown flag {other}"));
                }
                _ if input.is_none() => input = Some(arg.to_string()),
                name => {
                    let rest: Vec<&str> = iter.by_ref().copied().collect();
                    let command = Command::parse(name, &rest)?;
                    return Ok(Self {
                        input: input.unwrap_or_default(),
                        config,
                        layout,
                        command,
                    });
                }
            }
        }
        let input = input.ok_or_else(|| format!("missing input file\n{}", Self::help()))?;
        Ok(Self {
            input,
            config,
            layout,
            command: Command::Stats,
        })
    }

    /// Configuration file contents (if any) with the `--layout` override applied.
    pub fn tree_config(&self) -> VssResult<TreeConfig> {
        let mut tree_config = match &self.config {
            Some(path) => TreeConfig::from_path(path)?,
            None => TreeConfig::default(),
        };
        if let Some(layout) = self.layout {
            tree_config.codec.layout = layout;
        }
        Ok(tree_config)
    }

    pub fn help() -> &'static str {
        "Usage: vsstree [--config FILE] [--layout wide|narrow] INPUT [COMMAND]\n\
         Commands:\n\
         \x20 stats                                          node count and depth (default)\n\
         \x20 show PATH                                      fields of the node at a full path\n\
         \x20 search PATH [--max N] [--all-kinds] [--any-depth]\n\
         \x20 subtree PATH DEPTH                             indented subtree listing\n\
         \x20 leaves OUT [--json]                            write leaf paths\n\
         \x20 uuids OUT [--json]                             write node uuids\n\
         \x20 write OUT                                      re-encode the tree atomically\n\
         \x20 nav STEPS                                      walk with u/d/l/r from the root\n"
    }
}

/// Run `command` against a loaded tree, printing results to `out`.
pub fn run_command<W: Write>(
    tree: &VssTree,
    report: &DecodeReport,
    config: &TreeConfig,
    command: &Command,
    out: &mut W,
) -> VssResult<()> {
    match command {
        Command::Stats => {
            writeln!(
                out,
                "nodes={} max_depth={} bytes={} trailing={}",
                report.total_nodes, report.max_depth, report.bytes_consumed, report.trailing_bytes
            )?;
        }
        Command::Show { path } => {
            let id = resolve(tree, path)?;
            print_node(tree, id, out)?;
        }
        Command::Search {
            path,
            max,
            all_kinds,
            any_depth,
        } => {
            let mut query = SearchQuery::from_config(path.clone(), &config.search);
            if let Some(max) = max {
                query = query.with_max_results(*max);
            }
            if *all_kinds {
                query = query.all_kinds();
            }
            if *any_depth {
                query = query.with_any_depth(true);
            }
            let result = search(tree, tree.root(), &query)?;
            writeln!(
                out,
                "count={} truncated={} validation={}",
                result.count(),
                result.truncated,
                result.validation
            )?;
            for found in &result.matches {
                writeln!(out, "{}", found.path)?;
            }
        }
        Command::Subtree { path, depth } => {
            let start = resolve(tree, path)?;
            let base = tree.depth(start);
            for id in tree.preorder(start) {
                let level = tree.depth(id) - base;
                if level > *depth {
                    continue;
                }
                let node = tree.get(id)?;
                writeln!(out, "{}{} ({})", "  ".repeat(level), node.name(), node.kind())?;
            }
        }
        Command::Export { kind, out: file, format } => {
            let count = export_to_path(tree, tree.root(), *kind, *format, file)?;
            writeln!(out, "wrote {count} entries to {file}")?;
        }
        Command::Write { out: file } => {
            let bytes = write_tree_atomic(tree, file, &config.codec)?;
            writeln!(out, "wrote {} nodes ({bytes} bytes) to {file}", tree.len())?;
        }
        Command::Nav { steps } => {
            let mut cursor = Cursor::new(tree);
            cursor.apply(steps)?;
            writeln!(out, "current={}", tree.path(cursor.current()))?;
            match cursor.selected_child() {
                Some(child) => writeln!(
                    out,
                    "selected={} index={}",
                    tree.name(child).unwrap_or_default(),
                    cursor.child_index()
                )?,
                None => writeln!(out, "selected=-")?,
            }
        }
    }
    Ok(())
}

fn resolve(tree: &VssTree, path: &str) -> VssResult<NodeId> {
    tree.path_index()
        .lookup(path)
        .ok_or_else(|| VssTreeError::not_found(path.to_string()))
}

fn print_node<W: Write>(tree: &VssTree, id: NodeId, out: &mut W) -> VssResult<()> {
    let node = tree.get(id)?;
    let record: &NodeRecord = node.record();
    writeln!(out, "path={}", tree.path(id))?;
    writeln!(out, "kind={}", node.kind())?;
    writeln!(out, "uuid={}", record.uuid)?;
    writeln!(out, "description={}", record.description)?;
    if let Some(datatype) = node.datatype() {
        writeln!(out, "datatype={datatype}")?;
    }
    for (label, value) in [("min", node.min()), ("max", node.max()), ("unit", node.unit())] {
        if let Some(value) = value {
            writeln!(out, "{label}={value}")?;
        }
    }
    if node.allowed_count() > 0 {
        writeln!(out, "allowed={}", node.allowed_values().join(","))?;
    }
    if let Some(default) = node.default_allowed() {
        writeln!(out, "default={default}")?;
    }
    writeln!(out, "validate={}", node.validate())?;
    writeln!(out, "children={}", node.child_count())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_stats() {
        let cfg = CommandLineConfig::from_args(&["vsstree", "tree.binary"]).unwrap();
        assert_eq!(cfg.input, "tree.binary");
        assert_eq!(cfg.command, Command::Stats);
    }

    #[test]
    fn test_search_flags() {
        let cfg = CommandLineConfig::from_args(&[
            "vsstree",
            "--layout",
            "narrow",
            "tree.binary",
            "search",
            "Seat.*",
            "--max",
            "5",
            "--any-depth",
        ])
        .unwrap();
        assert_eq!(cfg.layout, Some(RecordLayout::Narrow));
        assert_eq!(
            cfg.command,
            Command::Search {
                path: "Seat.*".into(),
                max: Some(5),
                all_kinds: false,
                any_depth: true,
            }
        );
    }

    #[test]
    fn test_usage_errors() {
        assert!(CommandLineConfig::from_args(&["vsstree"]).is_err());
        assert!(CommandLineConfig::from_args(&["vsstree", "t", "subtree", "A"]).is_err());
        assert!(CommandLineConfig::from_args(&["vsstree", "t", "subtree", "A", "x"]).is_err());
        assert!(CommandLineConfig::from_args(&["vsstree", "t", "frobnicate"]).is_err());
        assert!(CommandLineConfig::from_args(&["vsstree", "--bogus"]).is_err());
    }
}
