use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, ValueEnum};
use common::Metadata;

#[derive(Parser, Debug)]
#[command(name = "code2doc", version)]
#[command(about = "Run source files and collect code, output and screenshots into a .docx report")]
pub struct Cli {
    /// Source files, in the order they should appear
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Directory the report is written to
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    #[arg(long, env = "CODE2DOC_NAME")]
    pub name: Option<String>,

    #[arg(long, env = "CODE2DOC_SUBJECT")]
    pub subject: Option<String>,

    /// Registration number
    #[arg(long, env = "CODE2DOC_REG_NO")]
    pub reg_no: Option<String>,

    #[arg(long, env = "CODE2DOC_GROUP")]
    pub group: Option<String>,

    #[arg(long, env = "CODE2DOC_SEMESTER")]
    pub semester: Option<String>,

    /// Experiment number
    #[arg(long, env = "CODE2DOC_EXPERIMENT")]
    pub experiment: Option<String>,

    /// How values for interactive programs are obtained
    #[arg(long, value_enum)]
    pub inputs: Option<InputMode>,

    /// Value to feed interactive programs; repeat for several, used in order
    #[arg(long = "input", value_name = "VALUE")]
    pub scripted: Vec<String>,

    /// Skip browser screenshots of markup files
    #[arg(long)]
    pub no_screenshots: bool,

    /// Open the report once written
    #[arg(long)]
    pub open: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputMode {
    /// Ask on the terminal for every value
    Console,
    /// Use placeholder values without asking
    Auto,
}

impl Cli {
    /// Explicit mode, else console when attached to a terminal.
    pub fn input_mode(&self, attended: bool) -> InputMode {
        self.inputs.unwrap_or(if attended {
            InputMode::Console
        } else {
            InputMode::Auto
        })
    }

    /// Metadata given on the command line; missing fields are empty.
    pub fn metadata(&self) -> Metadata {
        let field = |value: &Option<String>| value.clone().unwrap_or_default();
        Metadata {
            name: field(&self.name),
            subject: field(&self.subject),
            reg_no: field(&self.reg_no),
            group: field(&self.group),
            semester: field(&self.semester),
            experiment_no: field(&self.experiment),
        }
    }

    /// Arguments whose extension is not one the runner handles.
    pub fn unsupported_files(&self) -> Vec<&Path> {
        self.files
            .iter()
            .filter(|file| {
                let ext = file
                    .extension()
                    .map(|e| e.to_string_lossy().to_ascii_lowercase())
                    .unwrap_or_default();
                !runner::SUPPORTED_EXTENSIONS.contains(&ext.as_str())
            })
            .map(PathBuf::as_path)
            .collect()
    }

    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_are_required() {
        assert!(Cli::try_parse_from(["code2doc"]).is_err());
    }

    #[test]
    fn parses_files_in_order_with_defaults() {
        let cli = Cli::try_parse_from(["code2doc", "b.py", "a.c"]).unwrap();
        assert_eq!(cli.files, vec![PathBuf::from("b.py"), PathBuf::from("a.c")]);
        assert_eq!(cli.output_dir, PathBuf::from("."));
        assert!(!cli.open);
        assert_eq!(cli.log_level(), "warn");
    }

    #[test]
    fn metadata_flags_fill_metadata() {
        let cli = Cli::try_parse_from([
            "code2doc",
            "--name",
            "Ada Lovelace",
            "--subject",
            "Physics",
            "--experiment",
            "3",
            "main.py",
        ])
        .unwrap();
        let meta = cli.metadata();
        assert_eq!(meta.name, "Ada Lovelace");
        assert_eq!(meta.subject, "Physics");
        assert_eq!(meta.experiment_no, "3");
    }

    #[test]
    fn input_mode_follows_terminal_unless_given() {
        let cli = Cli::try_parse_from(["code2doc", "x.py"]).unwrap();
        assert_eq!(cli.input_mode(true), InputMode::Console);
        assert_eq!(cli.input_mode(false), InputMode::Auto);

        let cli = Cli::try_parse_from(["code2doc", "--inputs", "auto", "x.py"]).unwrap();
        assert_eq!(cli.input_mode(true), InputMode::Auto);
    }

    #[test]
    fn flags_files_outside_the_allow_list() {
        let cli =
            Cli::try_parse_from(["code2doc", "a.py", "notes.txt", "Main.JAVA", "Makefile"]).unwrap();
        assert_eq!(
            cli.unsupported_files(),
            vec![Path::new("notes.txt"), Path::new("Makefile")]
        );
    }

    #[test]
    fn repeated_input_values_keep_order() {
        let cli =
            Cli::try_parse_from(["code2doc", "--input", "4", "--input", "6", "-vv", "x.py"]).unwrap();
        assert_eq!(cli.scripted, vec!["4", "6"]);
        assert_eq!(cli.log_level(), "debug");
    }
}
