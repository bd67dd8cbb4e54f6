use crate::error::{ ClientError, Result };

pub const HELP_TEXT: &str = "\
Type a message and press Enter to send it.
  /new                 start a new conversation
  /switch <id>         open another conversation
  /delete <id>         delete a conversation
  /yes, /no            answer a pending confirmation
  /clear               clear the current conversation
  /collection <name>   switch knowledge collection
  /suggest <n>         copy welcome suggestion n into the input
  /help                show this help
  /quit                exit";

/// One line of terminal input mapped onto a UI affordance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    Send(String),
    NewConversation,
    Switch(String),
    Delete(String),
    Confirm(bool),
    Clear,
    Collection(String),
    Suggest(usize),
    Help,
    Quit,
}

impl UiCommand {
    /// Parses a line. Returns `Ok(None)` for blank input.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return Ok(None);
        }
        let Some(rest) = line.trim_start().strip_prefix('/') else {
            return Ok(Some(UiCommand::Send(line.to_string())));
        };

        let mut parts = rest.splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or("").to_lowercase();
        let arg = parts.next().map(str::trim).filter(|a| !a.is_empty());

        let command = match (name.as_str(), arg) {
            ("new", None) => UiCommand::NewConversation,
            ("switch", Some(id)) => UiCommand::Switch(id.to_string()),
            ("delete", Some(id)) => UiCommand::Delete(id.to_string()),
            ("yes" | "y", None) => UiCommand::Confirm(true),
            ("no" | "n", None) => UiCommand::Confirm(false),
            ("clear", None) => UiCommand::Clear,
            ("collection", Some(name)) => UiCommand::Collection(name.to_string()),
            ("suggest", Some(n)) => {
                let index = n
                    .parse::<usize>()
                    .map_err(|_| ClientError::InvalidCommand(format!("not a number: {}", n)))?;
                UiCommand::Suggest(index)
            }
            ("help" | "?", None) => UiCommand::Help,
            ("quit" | "exit", None) => UiCommand::Quit,
            ("switch" | "delete" | "collection" | "suggest", None) => {
                return Err(ClientError::InvalidCommand(format!("/{} needs an argument", name)));
            }
            _ => {
                return Err(ClientError::InvalidCommand(format!("unknown command: /{}", rest)));
            }
        };
        Ok(Some(command))
    }
}
