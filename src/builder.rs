use {
    crate::{
        alias::setup_aliases, Action, ErrorPolicy, Handle, Node, NodeId, Opt,
        Router, Value,
    },
    std::{cell::RefCell, rc::Rc},
    tracing::warn,
};

impl Router {
    /// Adds a command under `parent`. Names are stored lowercase.
    ///
    /// # Panics
    /// If `parent` doesn't exist or already has a command by that name
    pub fn add(
        &mut self,
        parent: NodeId,
        name: &str,
        policy: ErrorPolicy,
    ) -> NodeId {
        let name = name.to_lowercase();
        let Some(p) = self.get(parent) else {
            panic!("no command with id {} to add {} to", parent.index(), name);
        };
        if p.children.contains_key(&name) {
            panic!("{} already has a command named {}", p.name(), name);
        }
        let level = p.level() + 1;
        let node = Node::new(name.clone(), level, Some(parent), policy);
        let id = self.push_node(node);
        self.node_mut(parent).children.insert(name, id);
        id
    }

    /// Configures a command
    pub fn cmd(&mut self, id: NodeId) -> Cmd<'_> {
        Cmd { router: self, id }
    }
}

/// Chainable setters for one command.
///
/// ```ignore
/// cli.cmd(remote)
///     .summary("Manage remotes")
///     .alias(&["rem"])
///     .default_command("list");
/// ```
pub struct Cmd<'a> {
    router: &'a mut Router,
    id: NodeId,
}
impl<'a> Cmd<'a> {
    #[inline]
    fn node(&mut self) -> &mut Node {
        self.router.node_mut(self.id)
    }
    pub fn action(&mut self, f: Action) -> &mut Self {
        self.node().action = Some(f);
        self
    }
    /// One line shown in command listings
    pub fn summary(&mut self, text: impl Into<String>) -> &mut Self {
        self.node().summary = text.into();
        self
    }
    /// Printed at the end of this command's help, and of its
    /// descendants' unless they set their own
    pub fn epilogue(&mut self, text: impl Into<String>) -> &mut Self {
        self.node().epilogue = text.into();
        self
    }
    /// Other names this command answers to. An alias already taken
    /// by another command on the same level moves to this one.
    pub fn alias<S: AsRef<str>>(&mut self, aliases: &[S]) -> &mut Self {
        let (id, level) = (self.id, self.router.node(self.id).level());
        for alias in aliases {
            let alias = alias.as_ref().to_lowercase();
            let registry = self.router.command_aliases_mut();
            if let Some(previous) = registry.insert((level, alias.clone()), id)
            {
                if previous != id {
                    warn!(
                        alias = %alias,
                        level,
                        previous = previous.index(),
                        now = id.index(),
                        "command alias reassigned"
                    );
                }
            }
        }
        self
    }
    /// The child to run when nothing follows this command
    pub fn default_command(&mut self, name: &str) -> &mut Self {
        self.node().default_command = Some(name.to_lowercase());
        self
    }
    pub fn no_default_command(&mut self) -> &mut Self {
        self.node().default_command = None;
        self
    }
    /// How many positional arguments this command takes, or
    /// `ANY_OPERANDS`
    pub fn operands(&mut self, count: u16) -> &mut Self {
        self.node().operands = count;
        self
    }

    // The longest alias becomes the flag's name
    fn define<S: AsRef<str>>(
        &mut self,
        aliases: &[S],
        value: Opt,
        usage: &str,
    ) {
        let node = self.node();
        let Some(set) = setup_aliases(aliases) else {
            panic!("option on {} declared without a name", node.name());
        };
        node.flags.define(&set.canonical, value, usage);
        set.merge_into(&mut node.option_aliases);
    }

    /// # Panics
    /// If `aliases` is empty or its longest entry is already an option
    /// of this command
    pub fn option_bool<S: AsRef<str>>(
        &mut self,
        aliases: &[S],
        default: bool,
        usage: &str,
    ) -> Handle<bool> {
        let handle = Handle::new(default);
        self.define(aliases, Opt::Bool(handle.clone()), usage);
        handle
    }
    pub fn option_int<S: AsRef<str>>(
        &mut self,
        aliases: &[S],
        default: i64,
        usage: &str,
    ) -> Handle<i64> {
        let handle = Handle::new(default);
        self.define(aliases, Opt::Int(handle.clone()), usage);
        handle
    }
    pub fn option_uint<S: AsRef<str>>(
        &mut self,
        aliases: &[S],
        default: u64,
        usage: &str,
    ) -> Handle<u64> {
        let handle = Handle::new(default);
        self.define(aliases, Opt::Uint(handle.clone()), usage);
        handle
    }
    pub fn option_float<S: AsRef<str>>(
        &mut self,
        aliases: &[S],
        default: f64,
        usage: &str,
    ) -> Handle<f64> {
        let handle = Handle::new(default);
        self.define(aliases, Opt::Float(handle.clone()), usage);
        handle
    }
    pub fn option_string<S: AsRef<str>>(
        &mut self,
        aliases: &[S],
        default: &str,
        usage: &str,
    ) -> Handle<String> {
        let handle = Handle::new(default.to_owned());
        self.define(aliases, Opt::Str(handle.clone()), usage);
        handle
    }
    /// Registers an application-defined value. Its current state is
    /// its default.
    pub fn option_var<S: AsRef<str>, V: Value + 'static>(
        &mut self,
        aliases: &[S],
        value: V,
        usage: &str,
    ) -> Rc<RefCell<V>> {
        let cell = Rc::new(RefCell::new(value));
        let shared: Rc<RefCell<dyn Value>> = cell.clone();
        self.define(aliases, Opt::Custom(shared), usage);
        cell
    }
}
