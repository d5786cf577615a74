//! Slash Commands
//!
//! Input lines starting with `/` are commands; everything else is a query.

use std::path::PathBuf;

use crate::session::{UiMode, View};
use crate::settings::Theme;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Upload(Vec<PathBuf>),
    Model(String),
    ModelCustom,
    Path(String),
    DeleteModel,
    Temperature(f32),
    Tokens(u32),
    Mode(UiMode),
    View(View),
    Theme(Theme),
    Clear,
    ClearDocs,
    /// Chart data as CSV
    Export(Option<PathBuf>),
    /// Chart as PNG
    SaveChart(Option<PathBuf>),
    /// Backend-generated report
    Report(Option<PathBuf>),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("Unknown command: /{0} (try /help)")]
    Unknown(String),

    #[error("/{command} needs {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },

    #[error("/{command}: invalid value '{value}'")]
    InvalidArgument {
        command: &'static str,
        value: String,
    },
}

/// One-line usage strings for the help overlay
pub const HELP: &[(&str, &str)] = &[
    ("/upload <paths…>", "Add PDF files (quote paths with spaces)"),
    ("/model <id>", "Select a catalog model"),
    ("/model custom", "Enter a custom model path"),
    ("/path <p>", "Set and confirm the custom path"),
    ("/delete-model", "Remove the selected model"),
    ("/temp <0-1>", "Set temperature"),
    ("/tokens <n>", "Set max tokens"),
    ("/mode single|compare", "Switch UI mode"),
    ("/view chat|compare|chart", "Switch main view"),
    ("/theme light|dark|system", "Change theme"),
    ("/clear", "Clear chat"),
    ("/clear-docs", "Clear documents and chat"),
    ("/export [file]", "Save chart data as CSV"),
    ("/save-chart [file]", "Save chart as PNG"),
    ("/report [file]", "Generate a report"),
    ("/help", "Show this help"),
    ("/quit", "Exit"),
];

pub fn is_command(line: &str) -> bool {
    line.trim_start().starts_with('/')
}

/// Parse a `/command args…` line.
pub fn parse(line: &str) -> Result<Command, CommandError> {
    let line = line.trim().trim_start_matches('/');
    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };

    match name.to_lowercase().as_str() {
        "upload" => {
            let paths: Vec<PathBuf> = shell_words::split(rest)
                .map_err(|_| invalid("upload", rest))?
                .into_iter()
                .map(PathBuf::from)
                .collect();
            if paths.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: "upload",
                    expected: "at least one file path",
                });
            }
            Ok(Command::Upload(paths))
        }
        "model" => match rest {
            "" => Err(CommandError::MissingArgument {
                command: "model",
                expected: "a model id or 'custom'",
            }),
            "custom" => Ok(Command::ModelCustom),
            id => Ok(Command::Model(id.to_string())),
        },
        "path" => {
            // Blank paths are passed through; the controller refuses them
            Ok(Command::Path(rest.to_string()))
        }
        "delete-model" => Ok(Command::DeleteModel),
        "temp" => required(rest, "temp", "a temperature between 0 and 1")?
            .parse::<f32>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Command::Temperature)
            .ok_or_else(|| invalid("temp", rest)),
        "tokens" => required(rest, "tokens", "a token count")?
            .parse::<u32>()
            .map(Command::Tokens)
            .map_err(|_| invalid("tokens", rest)),
        "mode" => required(rest, "mode", "single or compare")?
            .parse::<UiMode>()
            .map(Command::Mode)
            .map_err(|_| invalid("mode", rest)),
        "view" => {
            let view = match required(rest, "view", "chat, compare or chart")?
                .to_lowercase()
                .as_str()
            {
                "chat" => View::Chat,
                "compare" => View::Compare,
                "chart" | "visualization" => View::Visualization,
                _ => return Err(invalid("view", rest)),
            };
            Ok(Command::View(view))
        }
        "theme" => required(rest, "theme", "light, dark or system")?
            .parse::<Theme>()
            .map(Command::Theme)
            .map_err(|_| invalid("theme", rest)),
        "clear" => Ok(Command::Clear),
        "clear-docs" => Ok(Command::ClearDocs),
        "export" => Ok(Command::Export(optional_path(rest))),
        "save-chart" => Ok(Command::SaveChart(optional_path(rest))),
        "report" => Ok(Command::Report(optional_path(rest))),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

fn required<'a>(
    rest: &'a str,
    command: &'static str,
    expected: &'static str,
) -> Result<&'a str, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument { command, expected })
    } else {
        Ok(rest)
    }
}

fn invalid(command: &'static str, value: &str) -> CommandError {
    CommandError::InvalidArgument {
        command,
        value: value.to_string(),
    }
}

fn optional_path(rest: &str) -> Option<PathBuf> {
    (!rest.is_empty()).then(|| PathBuf::from(rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_command() {
        assert!(is_command("/help"));
        assert!(is_command("  /quit"));
        assert!(!is_command("show me a bar chart"));
        assert!(!is_command("a/b"));
    }

    #[test]
    fn test_upload_paths() {
        assert_eq!(
            parse("/upload a.pdf  docs/b.pdf").unwrap(),
            Command::Upload(vec![PathBuf::from("a.pdf"), PathBuf::from("docs/b.pdf")])
        );
        assert!(matches!(
            parse("/upload"),
            Err(CommandError::MissingArgument { command: "upload", .. })
        ));
    }

    #[test]
    fn test_upload_quoted_paths_keep_spaces() {
        assert_eq!(
            parse(r#"/upload "My Reports/q1 2024.pdf" 'b c.pdf' d\ e.pdf"#).unwrap(),
            Command::Upload(vec![
                PathBuf::from("My Reports/q1 2024.pdf"),
                PathBuf::from("b c.pdf"),
                PathBuf::from("d e.pdf"),
            ])
        );
        assert!(matches!(
            parse(r#"/upload "unterminated.pdf"#),
            Err(CommandError::InvalidArgument { command: "upload", .. })
        ));
    }

    #[test]
    fn test_model_commands() {
        assert_eq!(parse("/model phi-2").unwrap(), Command::Model("phi-2".into()));
        assert_eq!(parse("/model custom").unwrap(), Command::ModelCustom);
        assert_eq!(
            parse("/path /models/llama.gguf").unwrap(),
            Command::Path("/models/llama.gguf".into())
        );
        assert_eq!(parse("/path").unwrap(), Command::Path(String::new()));
        assert_eq!(parse("/delete-model").unwrap(), Command::DeleteModel);
        assert!(parse("/model").is_err());
    }

    #[test]
    fn test_params() {
        assert_eq!(parse("/temp 0.3").unwrap(), Command::Temperature(0.3));
        assert_eq!(parse("/tokens 1024").unwrap(), Command::Tokens(1024));
        assert_eq!(
            parse("/temp hot"),
            Err(CommandError::InvalidArgument {
                command: "temp",
                value: "hot".into()
            })
        );
        assert!(parse("/temp NaN").is_err());
        assert!(parse("/tokens -5").is_err());
    }

    #[test]
    fn test_mode_view_theme() {
        assert_eq!(parse("/mode compare").unwrap(), Command::Mode(UiMode::Compare));
        assert_eq!(parse("/view chart").unwrap(), Command::View(View::Visualization));
        assert_eq!(parse("/VIEW Chat").unwrap(), Command::View(View::Chat));
        assert_eq!(parse("/theme dark").unwrap(), Command::Theme(Theme::Dark));
        assert!(parse("/mode triple").is_err());
        assert!(parse("/view table").is_err());
        assert!(parse("/theme sepia").is_err());
    }

    #[test]
    fn test_outputs_take_optional_paths() {
        assert_eq!(parse("/export").unwrap(), Command::Export(None));
        assert_eq!(
            parse("/save-chart out/chart.png").unwrap(),
            Command::SaveChart(Some(PathBuf::from("out/chart.png")))
        );
        assert_eq!(
            parse("/report r.csv").unwrap(),
            Command::Report(Some(PathBuf::from("r.csv")))
        );
    }

    #[test]
    fn test_simple_and_unknown() {
        assert_eq!(parse("/clear").unwrap(), Command::Clear);
        assert_eq!(parse("/clear-docs").unwrap(), Command::ClearDocs);
        assert_eq!(parse("/help").unwrap(), Command::Help);
        assert_eq!(parse("/quit").unwrap(), Command::Quit);
        assert_eq!(parse("/dance"), Err(CommandError::Unknown("dance".into())));
    }
}
