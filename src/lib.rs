//! Subcommand routing on top of a single-level flag parser.
//!
//! A `Router` owns a tree of commands. Parsing walks the arguments
//! down that tree, rewrites the selected command's option aliases to
//! their canonical names, hands the rest to that command's `FlagSet`,
//! and calls the command's `Action` with whatever positional
//! arguments are left.
//!
//! ```ignore
//! let mut cli = Router::new("myapp");
//! let test = cli.add(NodeId::ROOT, "test", ErrorPolicy::Exit);
//! let count = cli.cmd(test).option_int(&["c", "count"], 0, "How many");
//! cli.parse(&["myapp", "test", "-c", "2"])?;
//! assert_eq!(count.get(), 2);
//! ```
//!
//! # Features
//! * **eq-separator** (default) -
//!   Allow separating options from option-arguments
//!   with a '='
//! * **literal-bool-strings** -
//!   String options holding "false" convert to a `false`
//!   bool instead of following the non-empty rule

mod alias;
mod builder;
mod doc;
mod error;
mod flag;
mod opt;
use {
    std::{
        collections::BTreeMap,
        ffi::OsString,
        io::{self, Write},
    },
    tracing::debug,
};
pub use {alias::*, builder::*, doc::*, error::*, flag::*, opt::*};

pub type Action = fn(c: Context) -> Result<Flow>;

/// The `operands` value of a command that takes any number of
/// positional arguments
pub const ANY_OPERANDS: u16 = u16::MAX;

/// An index into the `Router`'s list of commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u16);
impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What the outermost driver should do once an `Action` returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Terminate the process with this status
    Exit(i32),
}

/// Handed to a command's `Action`
pub struct Context<'a> {
    pub router: &'a Router,
    pub selected: NodeId,
    args: &'a [String],
    out: &'a mut dyn io::Write,
}
impl<'a> Context<'a> {
    /// Positional arguments left after flag parsing
    #[inline]
    pub fn args(&self) -> &[String] {
        self.args
    }
    #[inline]
    pub fn node(&self) -> &Node {
        self.router.node(self.selected)
    }
    /// Where help and version text is written
    pub fn out(&mut self) -> &mut dyn io::Write {
        &mut *self.out
    }
    /// Looks up one of the selected command's options by its
    /// canonical name or any alias
    pub fn opt(&self, name: &str) -> Option<&Opt> {
        self.node().option(name)
    }
}

/// A command in the tree
#[derive(Debug)]
pub struct Node {
    name: String,
    level: u16,
    /// Only used to walk upwards
    parent: Option<NodeId>,
    children: BTreeMap<String, NodeId>,
    pub(crate) flags: FlagSet,
    pub(crate) option_aliases: AliasTable,
    pub(crate) action: Option<Action>,
    pub(crate) summary: String,
    pub(crate) epilogue: String,
    pub(crate) default_command: Option<String>,
    pub(crate) operands: u16,
}
impl Node {
    fn new(
        name: String,
        level: u16,
        parent: Option<NodeId>,
        policy: ErrorPolicy,
    ) -> Self {
        Self {
            flags: FlagSet::new(name.clone(), policy),
            name,
            level,
            parent,
            children: BTreeMap::new(),
            option_aliases: AliasTable::new(),
            action: None,
            summary: String::new(),
            epilogue: String::new(),
            default_command: None,
            operands: ANY_OPERANDS,
        }
    }
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
    /// 0 for the root
    #[inline]
    pub fn level(&self) -> u16 {
        self.level
    }
    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
    /// Child commands in name order
    pub fn children(
        &self,
    ) -> impl DoubleEndedIterator<Item = (&str, NodeId)> + '_ {
        self.children.iter().map(|(name, id)| (name.as_str(), *id))
    }
    #[inline]
    pub fn flags(&self) -> &FlagSet {
        &self.flags
    }
    #[inline]
    pub fn option_aliases(&self) -> &AliasTable {
        &self.option_aliases
    }
    pub fn summary(&self) -> &str {
        &self.summary
    }
    pub fn epilogue(&self) -> &str {
        &self.epilogue
    }
    pub fn default_command(&self) -> Option<&str> {
        self.default_command.as_deref()
    }
    pub fn operands(&self) -> u16 {
        self.operands
    }
    /// Finds an option by its canonical name or any of its aliases,
    /// with or without leading dashes
    pub fn option(&self, name: &str) -> Option<&Opt> {
        let bare = name.trim_start_matches('-');
        if let Some(flag) = self.flags.lookup(bare) {
            return Some(&flag.value);
        }
        let target = self.option_aliases.get(&format!("-{bare}"))?;
        self.flags
            .lookup(target.trim_start_matches('-'))
            .map(|flag| &flag.value)
    }
}

/// Where a command line led
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Empty when not even the first argument matched a command
    pub name: String,
    /// How many arguments were commands
    pub depth: usize,
    pub node: Option<NodeId>,
}

#[derive(Debug)]
pub struct Outcome {
    /// The selected command's name, or empty if none matched
    pub command: String,
    pub depth: usize,
    /// Positional arguments left after flag parsing
    pub args: Vec<String>,
    /// Set when an `Action` or the flag error policy asks to
    /// terminate
    pub exit: Option<i32>,
    /// A condition worth reporting that didn't stop parsing, such
    /// as `Error::NoArguments` when the default command ran
    pub notice: Option<Error>,
}

/// Owns the whole command tree. The root is always `NodeId::ROOT`.
#[derive(Debug)]
pub struct Router {
    nodes: Vec<Node>,
    label: String,
    // Command aliases for every level, keyed by (level, alias)
    command_aliases: BTreeMap<(u16, String), NodeId>,
    command: String,
    selected: Option<NodeId>,
    args: Vec<String>,
    parsed: bool,
}

impl Router {
    /// A tree holding only the root and the `help` and `version`
    /// commands. `help` is the default command.
    pub fn new(name: impl Into<String>) -> Self {
        let mut root = Node::new(name.into(), 0, None, ErrorPolicy::Exit);
        root.default_command = Some("help".to_owned());
        let mut router = Self {
            nodes: vec![root],
            label: String::new(),
            command_aliases: BTreeMap::new(),
            command: String::new(),
            selected: None,
            args: Vec::new(),
            parsed: false,
        };
        let version = router.add(NodeId::ROOT, "version", ErrorPolicy::Exit);
        router
            .cmd(version)
            .action(version_action)
            .summary("Displays the app name and version")
            .alias(&["ver"]);
        let help = router.add(NodeId::ROOT, "help", ErrorPolicy::Exit);
        router
            .cmd(help)
            .action(help_action)
            .summary("Displays this help information")
            .alias(&["hlp"]);
        router
    }

    #[inline]
    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }
    /// # Panics
    /// If `id` didn't come from this `Router`
    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }
    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }
    pub(crate) fn push_node(&mut self, node: Node) -> NodeId {
        let Ok(index) = u16::try_from(self.nodes.len()) else {
            panic!("a router holds at most {} commands", u16::MAX);
        };
        self.nodes.push(node);
        NodeId(index)
    }
    pub(crate) fn command_aliases_mut(
        &mut self,
    ) -> &mut BTreeMap<(u16, String), NodeId> {
        &mut self.command_aliases
    }

    /// The application name and version, or the root's name when no
    /// label was set
    pub fn label(&self) -> &str {
        if self.label.is_empty() {
            &self.root().name
        } else {
            &self.label
        }
    }
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// Command names from the root down to `id`
    pub fn chain(&self, id: NodeId) -> Vec<&str> {
        let mut list = Vec::new();
        let mut next = Some(id);
        while let Some(id) = next {
            let node = self.node(id);
            list.push(node.name.as_str());
            next = node.parent;
        }
        list.reverse();
        list
    }
    pub fn parent_name(&self, id: NodeId) -> Option<&str> {
        self.node(id).parent.map(|p| self.node(p).name.as_str())
    }
    /// The aliases registered for a command, sorted
    pub fn command_aliases(&self, id: NodeId) -> Vec<&str> {
        // Already sorted by the map's (level, alias) key
        self.command_aliases
            .iter()
            .filter(|((level, _), target)| {
                *level == self.node(id).level && **target == id
            })
            .map(|((_, alias), _)| alias.as_str())
            .collect()
    }

    /// Matches `arg` against the children of `parent`, first by
    /// name then by alias. Case doesn't matter.
    pub fn find(&self, parent: NodeId, arg: &str) -> Option<NodeId> {
        let arg = arg.to_lowercase();
        let node = self.node(parent);
        if let Some(id) = node.children.get(&arg) {
            return Some(*id);
        }
        self.command_aliases
            .get(&(node.level + 1, arg))
            .copied()
            .filter(|id| self.node(*id).parent == Some(parent))
    }

    /// Walks `args` (without the program name) down the tree for as
    /// long as each one names a child of the last match.
    pub fn resolve<S: AsRef<str>>(&self, args: &[S]) -> Result<Resolved> {
        if args.is_empty() {
            return Err(Error::NoArguments);
        }
        let mut resolved = Resolved {
            name: String::new(),
            depth: 0,
            node: None,
        };
        let mut current = NodeId::ROOT;
        for arg in args {
            let Some(id) = self.find(current, arg.as_ref()) else {
                break;
            };
            current = id;
            resolved.depth += 1;
            resolved.node = Some(id);
            resolved.name.clone_from(&self.node(id).name);
            debug!(arg = arg.as_ref(), depth = resolved.depth, "matched");
        }
        Ok(resolved)
    }

    /// Like `parse_to`, writing to stdout
    pub fn parse<S: AsRef<str>>(&mut self, argv: &[S]) -> Result<Outcome> {
        self.parse_to(argv, &mut io::stdout().lock())
    }

    /// Parses a full argument vector, program name first, and runs the
    /// selected command's `Action`. Help, version and usage text go
    /// to `out`.
    pub fn parse_to<S: AsRef<str>>(
        &mut self,
        argv: &[S],
        out: &mut dyn io::Write,
    ) -> Result<Outcome> {
        let Some((program, rest)) = argv.split_first() else {
            return Err(Error::InvalidCommand);
        };
        debug!(program = program.as_ref(), args = rest.len(), "parse");
        self.parsed = true;
        self.command.clear();
        self.selected = None;
        self.args.clear();

        let mut tokens: Vec<String> =
            rest.iter().map(|a| a.as_ref().to_owned()).collect();
        let mut notice = None;
        if tokens.is_empty() {
            match &self.root().default_command {
                Some(default) => {
                    debug!(default = %default, "no arguments");
                    tokens.push(default.clone());
                    notice = Some(Error::NoArguments);
                }
                None => return Err(Error::NoArguments),
            }
        }

        let mut resolved = self.resolve(&tokens)?;
        // Descend through default commands when nothing follows
        while let Some(id) = resolved.node {
            if resolved.depth < tokens.len() {
                break;
            }
            let Some(default) = self.node(id).default_command.clone() else {
                break;
            };
            let Some(child) = self.find(id, &default) else {
                break;
            };
            tokens.push(default);
            resolved.depth += 1;
            resolved.node = Some(child);
            resolved.name.clone_from(&self.node(child).name);
        }

        let Some(id) = resolved.node else {
            debug!("no command matched");
            return Ok(Outcome {
                command: String::new(),
                depth: 0,
                args: Vec::new(),
                exit: None,
                notice,
            });
        };
        self.command.clone_from(&resolved.name);
        self.selected = Some(id);

        let mut rest = tokens.split_off(resolved.depth);
        let node = self.node_mut(id);
        alias::rewrite(&node.option_aliases, &node.flags, &mut rest);
        let parsed = node.flags.parse(&rest);
        let policy = node.flags.policy();
        let args = match parsed {
            Ok(args) => args,
            Err(e) => match policy {
                ErrorPolicy::Continue => return Err(e.into()),
                ErrorPolicy::Panic => panic!("{}", e),
                ErrorPolicy::Exit => {
                    let code = if e == FlagError::Help {
                        0
                    } else {
                        writeln!(out, "{}", e)?;
                        2
                    };
                    write_usage(self, id, out)?;
                    return Ok(Outcome {
                        command: resolved.name,
                        depth: resolved.depth,
                        args: Vec::new(),
                        exit: Some(code),
                        notice,
                    });
                }
            },
        };

        let expected = self.node(id).operands;
        if expected != ANY_OPERANDS && args.len() != expected as usize {
            return Err(Error::Operands {
                command: self.chain(id).join(" "),
                expected,
                found: args.len(),
            });
        }
        self.args.clone_from(&args);

        let mut exit = None;
        if let Some(action) = self.node(id).action {
            debug!(command = %resolved.name, args = args.len(), "dispatch");
            let flow = action(Context {
                router: self,
                selected: id,
                args: &args,
                out,
            })?;
            if let Flow::Exit(code) = flow {
                exit = Some(code);
            }
        }

        Ok(Outcome {
            command: resolved.name,
            depth: resolved.depth,
            args,
            exit,
            notice,
        })
    }

    /// Parses the process arguments and exits if the selected command
    /// asks to
    pub fn run(&mut self) -> Result<Outcome> {
        let argv = unicode_args(std::env::args_os())?;
        let outcome = self.parse(&argv)?;
        if let Some(code) = outcome.exit {
            std::process::exit(code);
        }
        Ok(outcome)
    }

    /// The command selected by the last parse, or empty
    #[inline]
    pub fn command(&self) -> &str {
        &self.command
    }
    #[inline]
    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }
    /// Positional arguments left by the last parse
    #[inline]
    pub fn args(&self) -> &[String] {
        &self.args
    }
    #[inline]
    pub fn parsed(&self) -> bool {
        self.parsed
    }
}

/// Fails on the first argument that isn't valid UTF-8
pub(crate) fn unicode_args(
    args: impl IntoIterator<Item = OsString>,
) -> Result<Vec<String>> {
    args.into_iter()
        .map(|arg| arg.into_string().map_err(Error::NotUnicode))
        .collect()
}
