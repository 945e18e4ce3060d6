use super::*;
use clap::Parser;

#[test]
fn parses_submit_with_defaults() {
    let cli = Cli::parse_from(["oms", "submit", "RiskPaths"]);
    match cli.command {
        Commands::Submit { model, threads, np, .. } => {
            assert_eq!(model, "RiskPaths");
            assert_eq!(threads, 1);
            assert_eq!(np, 1);
        }
        other => panic!("expected Submit, got a different command: {}", matches!(other, Commands::Submit { .. })),
    }
}

#[test]
fn parses_submit_with_env_overrides() {
    let cli = Cli::parse_from(["oms", "submit", "RiskPaths", "--env", "OpenM.Threads=4", "--threads", "4"]);
    match cli.command {
        Commands::Submit { env, threads, .. } => {
            assert_eq!(threads, 4);
            assert_eq!(env, vec![("OpenM.Threads".to_string(), "4".to_string())]);
        }
        _ => panic!("expected Submit"),
    }
}

#[test]
fn parses_stop_with_positional_args() {
    let cli = Cli::parse_from(["oms", "stop", "RiskPaths", "12345"]);
    match cli.command {
        Commands::Stop { model, submit_stamp } => {
            assert_eq!(model, "RiskPaths");
            assert_eq!(submit_stamp, 12345);
        }
        _ => panic!("expected Stop"),
    }
}

#[test]
fn parses_output_format_flag() {
    let cli = Cli::parse_from(["oms", "-o", "json", "queue"]);
    assert!(matches!(cli.output, OutputFormat::Json));
}

#[test]
fn parse_key_val_splits_on_first_equals() {
    let (k, v) = parse_key_val("OpenM.MessageLanguage=en-US").unwrap();
    assert_eq!(k, "OpenM.MessageLanguage");
    assert_eq!(v, "en-US");
}

#[test]
fn parse_key_val_rejects_missing_equals() {
    assert!(parse_key_val("no-equals-sign").is_err());
}
