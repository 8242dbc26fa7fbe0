//! REPL line parsing
//!
//! Plain lines are questions; lines starting with `/` are commands.

use crate::chat::Language;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Blank line
    Empty,
    /// A question for the chat
    Ask(String),
    /// Select a passage and ask about it
    Select(String),
    ToggleStrict,
    ClearSelection,
    Language(Language),
    ToggleStreaming,
    Stop,
    Help,
    Quit,
    /// Unknown command or bad argument, with the message to show
    Invalid(String),
}

impl Command {
    pub fn parse(line: &str) -> Command {
        let line = line.trim();
        if line.is_empty() {
            return Command::Empty;
        }

        let Some(rest) = line.strip_prefix('/') else {
            return Command::Ask(line.to_string());
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        match name {
            "select" if arg.is_empty() => Command::Invalid("Usage: /select <text>".to_string()),
            "select" => Command::Select(arg.to_string()),
            "strict" => Command::ToggleStrict,
            "clear" => Command::ClearSelection,
            "lang" => match Language::from_code(arg) {
                Some(language) => Command::Language(language),
                None => Command::Invalid("Usage: /lang en|ur".to_string()),
            },
            "stream" => Command::ToggleStreaming,
            "stop" => Command::Stop,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            _ => Command::Invalid(format!("Unknown command: /{name} (try /help)")),
        }
    }
}

pub const HELP_TEXT: &str = "\
Type a question and press Enter.
  /select <text>  ask about a passage
  /strict         answer only from the selected passage (toggle)
  /clear          forget the selected passage
  /lang en|ur     answer language
  /stream         toggle streaming answers
  /stop           stop the current answer
  /quit           leave";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_line_is_question() {
        assert_eq!(
            Command::parse("  What is SLAM?  "),
            Command::Ask("What is SLAM?".to_string())
        );
    }

    #[test]
    fn test_blank_line() {
        assert_eq!(Command::parse("   "), Command::Empty);
    }

    #[test]
    fn test_select_keeps_inner_whitespace() {
        assert_eq!(
            Command::parse("/select  forward   kinematics "),
            Command::Select("forward   kinematics".to_string())
        );
        assert!(matches!(Command::parse("/select"), Command::Invalid(_)));
    }

    #[test]
    fn test_lang() {
        assert_eq!(Command::parse("/lang ur"), Command::Language(Language::Ur));
        assert_eq!(Command::parse("/lang EN"), Command::Language(Language::En));
        assert_eq!(
            Command::parse("/lang fr"),
            Command::Invalid("Usage: /lang en|ur".to_string())
        );
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(Command::parse("/strict"), Command::ToggleStrict);
        assert_eq!(Command::parse("/clear"), Command::ClearSelection);
        assert_eq!(Command::parse("/stream"), Command::ToggleStreaming);
        assert_eq!(Command::parse("/stop"), Command::Stop);
        assert_eq!(Command::parse("/quit"), Command::Quit);
        assert_eq!(Command::parse("/exit"), Command::Quit);
        assert_eq!(Command::parse("/help"), Command::Help);
    }

    #[test]
    fn test_unknown_command() {
        insta::assert_snapshot!(
            match Command::parse("/frobnicate now") {
                Command::Invalid(msg) => msg,
                other => format!("{:?}", other),
            },
            @"Unknown command: /frobnicate (try /help)"
        );
    }
}
