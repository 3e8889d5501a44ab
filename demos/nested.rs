use {
    flagtree::*,
    std::{fmt, io::Write},
    tracing_subscriber::EnvFilter,
};

#[derive(Debug, Clone, Copy)]
enum Level {
    Quiet,
    Normal,
    Loud,
}
impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Quiet => "quiet",
            Level::Normal => "normal",
            Level::Loud => "loud",
        })
    }
}
impl Value for Level {
    fn set(&mut self, raw: &str) -> std::result::Result<(), String> {
        *self = match raw.to_lowercase().as_str() {
            "quiet" => Level::Quiet,
            "normal" => Level::Normal,
            "loud" => Level::Loud,
            _ => return Err("expected quiet, normal or loud".to_owned()),
        };
        Ok(())
    }
    fn type_name(&self) -> &'static str {
        "level"
    }
}

fn remote_add(mut c: Context) -> Result<Flow> {
    let fetch = c.opt("fetch").map(Opt::as_bool).transpose()?;
    let (name, url) = (c.args()[0].clone(), c.args()[1].clone());
    writeln!(c.out(), "added {name} -> {url} (fetch: {fetch:?})")?;
    Ok(Flow::Continue)
}

fn remote_list(mut c: Context) -> Result<Flow> {
    let chain = c.router.chain(c.selected).join(" ");
    writeln!(c.out(), "{chain}: origin")?;
    Ok(Flow::Continue)
}

fn push(mut c: Context) -> Result<Flow> {
    let retries = match c.opt("retries") {
        Some(opt) => opt.as_uint()?,
        None => 0,
    };
    let args = c.args().to_vec();
    if args.is_empty() {
        writeln!(c.out(), "nothing to push")?;
        return Ok(Flow::Exit(1));
    }
    writeln!(c.out(), "push {args:?} retries={retries}")?;
    Ok(Flow::Continue)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut cli = Router::new("vcs");
    cli.set_label("vcs v0.3.1");
    cli.cmd(NodeId::ROOT)
        .epilogue("Run `vcs help <command>` for details on a command.");

    let remote = cli.add(NodeId::ROOT, "remote", ErrorPolicy::Exit);
    cli.cmd(remote)
        .summary("Manage tracked repositories")
        .alias(&["rem", "rmt"])
        .default_command("list");

    let add = cli.add(remote, "add", ErrorPolicy::Exit);
    let mut cmd = cli.cmd(add);
    cmd.summary("Add a remote")
        .alias(&["a"])
        .operands(2)
        .action(remote_add);
    cmd.option_bool(&["f", "fetch"], false, "Fetch after adding");

    let list = cli.add(remote, "list", ErrorPolicy::Exit);
    cli.cmd(list)
        .summary("List remotes")
        .alias(&["ls"])
        .operands(0)
        .action(remote_list);

    let push_id = cli.add(NodeId::ROOT, "push", ErrorPolicy::Continue);
    let mut cmd = cli.cmd(push_id);
    cmd.summary("Send changes").action(push);
    cmd.option_uint(&["r", "retries", "retry"], 3, "Attempts before failing");
    cmd.option_float(&["t", "timeout"], 2.5, "Seconds per attempt");
    cmd.option_string(&["m", "message", "msg"], "", "Push note");
    let level =
        cmd.option_var(&["l", "level", "lvl"], Level::Normal, "Log level");

    let outcome = match cli.run() {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("vcs: {e}");
            std::process::exit(2);
        }
    };
    if let Some(notice) = &outcome.notice {
        tracing::debug!(%notice, "parsed with a notice");
    }
    if outcome.command == "push" {
        println!("level: {}", level.borrow());
    }
    Ok(())
}
