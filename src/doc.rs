//! Generated help text.

use {
    crate::{
        alias::{prefix, sort_aliases},
        Context, Flow, NodeId, Resolved, Result, Router, ANY_OPERANDS,
    },
    std::io::{self, Write},
};

const INDENT: &str = "  ";
// Space between a row's label and its text
const GAP: usize = 4;

/// One row of an aligned two-column table. `more` holds the extra
/// aliases shown on their own line underneath.
struct Row {
    label: String,
    text: String,
    more: Vec<String>,
}

fn push_table(s: &mut String, title: &str, rows: &[Row]) {
    let width =
        rows.iter().map(|r| r.label.chars().count()).max().unwrap_or(0);
    s.push('\n');
    s.push_str(title);
    s.push('\n');
    s.push_str(&"-".repeat(title.chars().count()));
    s.push('\n');
    for row in rows {
        let line = format!(
            "{}{:width$}{}{}",
            INDENT,
            row.label,
            " ".repeat(GAP),
            row.text,
            width = width
        );
        s.push_str(line.trim_end());
        s.push('\n');
        if !row.more.is_empty() {
            s.push_str(INDENT);
            s.push_str("    aliases: ");
            s.push_str(&row.more.join(", "));
            s.push('\n');
        }
    }
}

/// The usage text of a single command
pub fn usage(router: &Router, id: NodeId) -> String {
    let node = router.node(id);
    let mut s = String::with_capacity(256);
    s.push_str(router.label());
    s.push_str("\n\nUsage: ");
    s.push_str(&router.chain(id).join(" "));

    let has_children = node.children().next().is_some();
    let has_options = node.flags().flags().next().is_some();
    if has_children {
        s.push_str(" [COMMAND]");
    }
    if has_options {
        s.push_str(" [OPTIONS]");
    }
    // Commands with children take their operands through them
    if !has_children {
        match node.operands() {
            0 => (),
            1 => s.push_str(" <ARG>"),
            ANY_OPERANDS => s.push_str(" [ARGS]"),
            n => {
                s.push_str(" <ARG; ");
                s.push_str(&n.to_string());
                s.push('>');
            }
        }
    }
    s.push('\n');
    if !node.summary().is_empty() {
        s.push('\n');
        s.push_str(node.summary());
        s.push('\n');
    }

    if has_options {
        let rows: Vec<Row> = node
            .flags()
            .flags()
            .map(|flag| {
                let target = prefix(&flag.name);
                let mut aliases: Vec<String> = node
                    .option_aliases()
                    .iter()
                    .filter(|(_, t)| **t == target)
                    .map(|(alias, _)| alias.clone())
                    .collect();
                sort_aliases(&mut aliases);
                // POSIX spellings go in front of the canonical name
                let short = aliases
                    .iter()
                    .take_while(|a| a.chars().count() == 2)
                    .count();
                let more = aliases.split_off(short);
                aliases.push(target);

                let default = if flag.default.is_empty() {
                    "(no default)".to_owned()
                } else {
                    format!("(default: {})", flag.default)
                };
                let text = if flag.usage.is_empty() {
                    default
                } else {
                    format!("{} {}", flag.usage, default)
                };
                Row {
                    label: aliases.join(", "),
                    text,
                    more,
                }
            })
            .collect();
        push_table(&mut s, "OPTIONS", &rows);
    }

    if has_children {
        let rows: Vec<Row> = node
            .children()
            .map(|(name, child)| command_row(router, child, name.to_owned()))
            .collect();
        push_table(&mut s, "COMMANDS", &rows);
    }

    // The nearest epilogue up the chain
    let mut next = Some(id);
    while let Some(id) = next {
        let node = router.node(id);
        if !node.epilogue().is_empty() {
            s.push('\n');
            s.push_str(node.epilogue());
            s.push('\n');
            break;
        }
        next = node.parent();
    }
    s
}

fn command_row(router: &Router, id: NodeId, mut label: String) -> Row {
    let aliases = router.command_aliases(id);
    let mut more = Vec::new();
    match aliases.as_slice() {
        [] => (),
        [one] => {
            label.push_str(", ");
            label.push_str(one);
        }
        many => more = many.iter().map(|a| a.to_string()).collect(),
    }
    Row {
        label,
        text: router.node(id).summary().to_owned(),
        more,
    }
}

/// The label followed by every command in the tree
pub fn summary(router: &Router) -> String {
    let mut rows = Vec::new();
    // Depth-first, siblings in name order
    let mut stack: Vec<NodeId> =
        router.root().children().map(|(_, id)| id).rev().collect();
    while let Some(id) = stack.pop() {
        let chain = router.chain(id);
        rows.push(command_row(router, id, chain[1..].join(" ")));
        stack.extend(router.node(id).children().map(|(_, id)| id).rev());
    }

    let mut s = String::with_capacity(256);
    s.push_str(router.label());
    s.push('\n');
    push_table(&mut s, "COMMAND SUMMARY", &rows);
    s
}

pub(crate) fn write_usage(
    router: &Router,
    id: NodeId,
    out: &mut dyn io::Write,
) -> io::Result<()> {
    out.write_all(usage(router, id).as_bytes())
}

/// Prints the usage of the command its arguments lead to, or the
/// summary of all commands
pub fn help_action(mut c: Context) -> Result<Flow> {
    let text = match c.router.resolve(c.args()) {
        Ok(Resolved { node: Some(id), .. }) => usage(c.router, id),
        _ => summary(c.router),
    };
    c.out().write_all(text.as_bytes())?;
    Ok(Flow::Exit(0))
}

/// Prints the application label
pub fn version_action(mut c: Context) -> Result<Flow> {
    let label = c.router.label().to_owned();
    writeln!(c.out(), "{}", label)?;
    Ok(Flow::Exit(0))
}

#[cfg(test)]
mod tests {
    use crate::*;

    fn data() -> (Router, NodeId, NodeId) {
        let mut cli = Router::new("git");
        cli.set_label("Git v2.0.0");
        cli.cmd(NodeId::ROOT).epilogue("See the manual for more.");
        let remote = cli.add(NodeId::ROOT, "remote", ErrorPolicy::Exit);
        cli.cmd(remote)
            .summary("Manage remotes")
            .alias(&["rem", "rmt"]);
        let add = cli.add(remote, "add", ErrorPolicy::Exit);
        let mut cmd = cli.cmd(add);
        cmd.summary("Add a remote").alias(&["a"]).operands(2);
        cmd.option_bool(&["f", "fetch"], false, "Fetch after adding");
        cmd.option_string(&["t", "track", "branch", "br"], "", "Branch");
        (cli, remote, add)
    }

    #[test]
    fn should_write_command_usage() {
        let (cli, _, add) = data();
        assert_eq!(
            usage(&cli, add),
            [
                "Git v2.0.0",
                "",
                "Usage: git remote add [OPTIONS] <ARG; 2>",
                "",
                "Add a remote",
                "",
                "OPTIONS",
                "-------",
                "  -t, --branch    Branch (no default)",
                "      aliases: -br, -track, --br, --track",
                "  -f, --fetch     Fetch after adding (default: false)",
                "",
                "See the manual for more.",
                "",
            ]
            .join("\n")
        );
    }
    #[test]
    fn should_list_child_commands() {
        let (cli, remote, _) = data();
        let text = usage(&cli, remote);
        assert!(text.contains("Usage: git remote [COMMAND]\n"));
        assert!(
            text.contains("COMMANDS\n--------\n  add, a    Add a remote\n")
        );
    }
    #[test]
    fn should_summarize_every_command() {
        let (cli, ..) = data();
        assert_eq!(
            summary(&cli),
            [
                "Git v2.0.0",
                "",
                "COMMAND SUMMARY",
                "---------------",
                "  help, hlp        Displays this help information",
                "  remote           Manage remotes",
                "      aliases: rem, rmt",
                "  remote add, a    Add a remote",
                "  version, ver     Displays the app name and version",
                "",
            ]
            .join("\n")
        );
    }
    #[test]
    fn should_fall_back_to_the_summary_for_unknown_commands() {
        let (mut cli, ..) = data();
        let mut out = Vec::new();
        let outcome =
            cli.parse_to(&["git", "help", "nope"], &mut out).unwrap();
        assert_eq!(outcome.exit, Some(0));
        assert_eq!(String::from_utf8(out).unwrap(), summary(&cli));

        let mut out = Vec::new();
        cli.parse_to(&["git", "help", "rmt", "a"], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Usage: git remote add"));
    }
}
