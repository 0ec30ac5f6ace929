use std::{env, io, process};

use vsstree::client::{CommandLineConfig, run_command};
use vsstree::read_tree_from_path;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        println!("{}", CommandLineConfig::help());
        return;
    }
    let arg_refs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
    let cli = match CommandLineConfig::from_args(&arg_refs) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(2);
        }
    };

    let tree_config = match cli.tree_config() {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(2);
        }
    };

    let (tree, report) = match read_tree_from_path(&cli.input, &tree_config.codec) {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("failed to load {}: {err}", cli.input);
            process::exit(2);
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(err) = run_command(&tree, &report, &tree_config, &cli.command, &mut out) {
        eprintln!("command failed: {err}");
        process::exit(1);
    }
}
