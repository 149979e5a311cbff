use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use kindred::{Engine, FamilyChart, LayoutConfig, LoadPolicy, PersonStore, TreeOptions};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
kindred-cli: build, lay out and render family trees

USAGE:
  kindred-cli [tree|layout|colors|render] [OPTIONS] [<path>|-]

OPTIONS:
  --json               input is a JSON array of people (default: sheet/CSV with a header row)
  --strict             reject the whole input on the first invalid or duplicate record
  --root <id>          start the tree at this person
  --spouse-ancestors   attach each spouse's own parent lineage
  --config <file>      layout settings as JSON (top level or a \"layout\" object)
  --pretty             indent JSON output
  --out <path>         render: write the SVG here instead of stdout

Input is read from stdin when <path> is omitted or '-'.
Set KINDRED_LOG (e.g. KINDRED_LOG=debug) for diagnostics on stderr.
";

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("help requested")]
    Help,
    #[error("cannot read {what}: {source}")]
    Read {
        what: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot write output: {0}")]
    Write(#[from] std::io::Error),
    #[error(transparent)]
    Kindred(#[from] kindred::Error),
    #[error("cannot encode output: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("no family data to display")]
    NoData,
}

impl From<kindred::LayoutError> for CliError {
    fn from(err: kindred::LayoutError) -> Self {
        Self::Kindred(err.into())
    }
}

impl CliError {
    fn exit_code(&self) -> u8 {
        match self {
            CliError::Help => 0,
            CliError::Usage(_) => 2,
            CliError::NoData => 3,
            _ => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Command {
    #[default]
    Tree,
    Layout,
    Colors,
    Render,
}

impl Command {
    fn from_word(word: &str) -> Option<Self> {
        Some(match word {
            "tree" => Command::Tree,
            "layout" => Command::Layout,
            "colors" => Command::Colors,
            "render" => Command::Render,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum Input {
    #[default]
    Stdin,
    File(PathBuf),
}

impl Input {
    fn read(&self) -> Result<String, CliError> {
        let text = match self {
            Input::Stdin => {
                let mut text = String::new();
                std::io::stdin().read_to_string(&mut text).map(|_| text)
            }
            Input::File(path) => std::fs::read_to_string(path),
        };
        text.map_err(|source| CliError::Read {
            what: self.describe(),
            source,
        })
    }

    fn describe(&self) -> String {
        match self {
            Input::Stdin => "stdin".to_string(),
            Input::File(path) => path.display().to_string(),
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<Input>,
    json: bool,
    strict: bool,
    pretty: bool,
    root: Option<String>,
    spouse_ancestors: bool,
    config: Option<PathBuf>,
    out: Option<PathBuf>,
}

fn value_of(flag: &str, words: &mut impl Iterator<Item = String>) -> Result<String, CliError> {
    words
        .next()
        .ok_or_else(|| CliError::Usage(format!("{flag} needs a value")))
}

impl Args {
    fn parse(argv: impl IntoIterator<Item = String>) -> Result<Self, CliError> {
        let mut args = Args::default();
        let mut words = argv.into_iter();
        let mut seen_command = false;
        while let Some(word) = words.next() {
            match word.as_str() {
                "-h" | "--help" => return Err(CliError::Help),
                "--json" => args.json = true,
                "--strict" => args.strict = true,
                "--pretty" => args.pretty = true,
                "--spouse-ancestors" => args.spouse_ancestors = true,
                "--root" => args.root = Some(value_of("--root", &mut words)?),
                "--config" => args.config = Some(value_of("--config", &mut words)?.into()),
                "--out" => args.out = Some(value_of("--out", &mut words)?.into()),
                w if w.starts_with('-') && w != "-" => {
                    return Err(CliError::Usage(format!("unknown option {w}")));
                }
                w => {
                    if !seen_command && args.input.is_none() {
                        if let Some(command) = Command::from_word(w) {
                            args.command = command;
                            seen_command = true;
                            continue;
                        }
                    }
                    if args.input.is_some() {
                        return Err(CliError::Usage(format!("unexpected extra input {w}")));
                    }
                    args.input = Some(if w == "-" {
                        Input::Stdin
                    } else {
                        Input::File(w.into())
                    });
                }
            }
        }
        Ok(args)
    }

    fn engine(&self) -> Result<Engine, CliError> {
        let layout = match &self.config {
            Some(path) => {
                let text = Input::File(path.clone()).read()?;
                LayoutConfig::from_json_str(&text)?
            }
            None => LayoutConfig::default(),
        };
        let policy = if self.strict {
            LoadPolicy::Strict
        } else {
            LoadPolicy::Lenient
        };
        Ok(Engine::new()
            .with_options(TreeOptions {
                root: self.root.clone(),
                spouse_ancestors: self.spouse_ancestors,
            })
            .with_layout_config(layout)
            .with_load_policy(policy))
    }

    fn output(&self) -> Output {
        match self.command {
            Command::Render => Output::Svg(self.out.clone()),
            _ => Output::Json {
                pretty: self.pretty,
            },
        }
    }
}

/// Where and how a command's result is written.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Output {
    Json { pretty: bool },
    Svg(Option<PathBuf>),
}

impl Output {
    fn json(&self, value: &impl Serialize) -> Result<(), CliError> {
        let mut stdout = std::io::stdout().lock();
        match self {
            Output::Json { pretty: true } => serde_json::to_writer_pretty(&mut stdout, value)?,
            _ => serde_json::to_writer(&mut stdout, value)?,
        }
        writeln!(stdout)?;
        Ok(())
    }

    fn svg(&self, chart: &FamilyChart) -> Result<(), CliError> {
        let svg = chart.to_svg();
        match self {
            Output::Svg(Some(path)) => std::fs::write(path, svg)?,
            _ => std::io::stdout().lock().write_all(svg.as_bytes())?,
        }
        Ok(())
    }
}

fn load(engine: &Engine, args: &Args) -> Result<PersonStore, CliError> {
    let input = args.input.clone().unwrap_or_default();
    let text = input.read()?;
    let store = if args.json {
        engine.load_json(&text)?
    } else {
        engine.load_sheet(&text)?
    };
    tracing::debug!(people = store.len(), input = %input.describe(), "input loaded");
    Ok(store)
}

fn run(args: &Args) -> Result<(), CliError> {
    let engine = args.engine()?;
    let store = load(&engine, args)?;
    let output = args.output();

    if args.command == Command::Tree {
        let tree = engine.tree(&store)?.ok_or(CliError::NoData)?;
        return output.json(&tree);
    }
    let chart = engine.chart(&store)?.ok_or(CliError::NoData)?;
    match args.command {
        Command::Layout => output.json(&chart.layout),
        Command::Colors => output.json(&chart.colors),
        _ => output.svg(&chart),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("KINDRED_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    init_logging();

    match Args::parse(std::env::args().skip(1)).and_then(|args| run(&args)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Help) => {
            print!("{USAGE}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("kindred-cli: {err}");
            if matches!(err, CliError::Usage(_)) {
                eprint!("\n{USAGE}");
            }
            ExitCode::from(err.exit_code())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(words: &[&str]) -> Result<Args, CliError> {
        Args::parse(words.iter().map(|w| w.to_string()))
    }

    #[test]
    fn parses_command_flags_and_path() {
        let args = parse(&[
            "layout",
            "--json",
            "--root",
            "7",
            "--spouse-ancestors",
            "people.json",
        ])
        .unwrap();
        assert_eq!(args.command, Command::Layout);
        assert!(args.json && args.spouse_ancestors && !args.strict);
        assert_eq!(args.root.as_deref(), Some("7"));
        assert_eq!(args.input, Some(Input::File("people.json".into())));
        assert_eq!(args.output(), Output::Json { pretty: false });
    }

    #[test]
    fn dash_means_stdin_and_a_file_may_share_a_command_name() {
        let args = parse(&["render", "-", "--out", "x.svg"]).unwrap();
        assert_eq!(args.input, Some(Input::Stdin));
        assert_eq!(args.output(), Output::Svg(Some("x.svg".into())));

        let args = parse(&["tree", "layout"]).unwrap();
        assert_eq!(args.command, Command::Tree);
        assert_eq!(args.input, Some(Input::File("layout".into())));
    }

    #[test]
    fn usage_errors_map_to_exit_code_two() {
        let cases: [&[&str]; 3] = [&["--frobnicate"], &["a.csv", "b.csv"], &["--root"]];
        for words in cases {
            let err = parse(words).unwrap_err();
            assert!(matches!(err, CliError::Usage(_)), "{words:?}");
            assert_eq!(err.exit_code(), 2);
        }
        assert_eq!(parse(&["--help"]).unwrap_err().exit_code(), 0);
        assert_eq!(CliError::NoData.exit_code(), 3);
    }
}
