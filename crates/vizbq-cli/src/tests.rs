use super::*;

#[test]
fn parses_run_command() {
    let cli = Cli::try_parse_from([
        "vizbq-cli",
        "run",
        "--project-id",
        "proj",
        "--input-bucket",
        "creatives",
        "--output-dataset",
        "insights",
        "--auth-file",
        "key.json",
        "--write-disposition",
        "write_append",
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Run {
            ref project_id,
            ref input_bucket,
            write_disposition: WriteDisposition::WriteAppend,
            ..
        } if project_id == "proj" && input_bucket == "creatives"
    ));
}

#[test]
fn run_rejects_unknown_write_disposition() {
    let result = Cli::try_parse_from([
        "vizbq-cli",
        "run",
        "--project-id",
        "proj",
        "--input-bucket",
        "creatives",
        "--output-dataset",
        "insights",
        "--auth-file",
        "key.json",
        "--write-disposition",
        "WRITE_SOMETIMES",
    ]);
    assert!(result.is_err());
}

#[test]
fn parses_inspect_command() {
    let cli = Cli::try_parse_from([
        "vizbq-cli",
        "inspect",
        "gs://creatives/a.png",
        "--auth-file",
        "key.json",
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Inspect { ref image_uri, ref auth_file }
            if image_uri == "gs://creatives/a.png" && auth_file == &PathBuf::from("key.json")
    ));
}

#[test]
fn parses_schema_command() {
    let cli = Cli::try_parse_from(["vizbq-cli", "schema"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Schema));
}

#[test]
fn missing_subcommand_is_an_error() {
    assert!(Cli::try_parse_from(["vizbq-cli"]).is_err());
}
