use super::*;

use clap::CommandFactory;
use dirbase_codec::Encoding;
use dirbase_fs::{PolicyKind, TraversalOrder};

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn baseline_defaults_and_overrides() {
    let cli = Cli::try_parse_from(["dirbase", "baseline", "/a", "/b"]).expect("parse");
    let Command::Baseline(args) = cli.command else {
        panic!("expected baseline");
    };
    assert_eq!(args.roots, vec![PathBuf::from("/a"), PathBuf::from("/b")]);
    assert_eq!(args.policy, PolicyKind::Normal);
    assert_eq!(args.order, TraversalOrder::Dfs);
    assert_eq!(args.encoding, Encoding::Binary);
    assert!(args.store.store.is_none());

    let cli = Cli::try_parse_from([
        "dirbase",
        "baseline",
        "--store",
        "/tmp/s.db",
        "--policy",
        "tooling",
        "--order",
        "bfs",
        "--encoding",
        "json",
        "/a",
    ])
    .expect("parse");
    let Command::Baseline(args) = cli.command else {
        panic!("expected baseline");
    };
    assert_eq!(args.store.path(), PathBuf::from("/tmp/s.db"));
    assert_eq!(args.policy, PolicyKind::Tooling);
    assert_eq!(args.order, TraversalOrder::Bfs);
    assert_eq!(args.encoding, Encoding::Json);
}

#[test]
fn baseline_requires_a_root() {
    assert!(Cli::try_parse_from(["dirbase", "baseline"]).is_err());
    assert!(Cli::try_parse_from(["dirbase", "baseline", "--policy", "bogus", "/a"]).is_err());
}

#[test]
fn diff_accepts_no_folders() {
    let cli = Cli::try_parse_from(["dirbase", "diff", "--json"]).expect("parse");
    let Command::Diff(args) = cli.command else {
        panic!("expected diff");
    };
    assert!(args.folders.is_empty());
    assert!(args.output.json);
    assert!(args.policy.is_none());

    let cli = Cli::try_parse_from(["dirbase", "diff", "--policy", "all", "/x", "/y"]).expect("parse");
    let Command::Diff(args) = cli.command else {
        panic!("expected diff");
    };
    assert_eq!(args.folders, vec!["/x".to_owned(), "/y".to_owned()]);
    assert_eq!(args.policy, Some(PolicyKind::All));
}
