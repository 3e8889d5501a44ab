use {flagtree::*, std::io::Write, tracing_subscriber::EnvFilter};

fn test(mut c: Context) -> Result<Flow> {
    let args = c.args().to_vec();
    writeln!(
        c.out(),
        "test was called with {} parameters {:?}",
        args.len(),
        args
    )?;
    Ok(Flow::Continue)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut cli = Router::new("myapp");
    cli.set_label("MyApp v0.1.0");
    let id = cli.add(NodeId::ROOT, "test", ErrorPolicy::Exit);
    let count = cli
        .cmd(id)
        .action(test)
        .summary("Tests the basic usage of the parser")
        .option_int(
            &["c", "count"],
            0,
            "What number will invoke 'The Count'",
        );

    // help and version exit the process here
    let outcome = cli.run()?;

    println!();
    println!("command: {:?} | depth: {}", outcome.command, outcome.depth);
    println!("count: {}", count.get());
    println!(
        "argument count: {} | arguments: {:?}",
        cli.args().len(),
        cli.args()
    );
    Ok(())
}
