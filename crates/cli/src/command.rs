use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, bail, ensure};
use hexed_editor::{hex, EditMode};

/// A line of input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Type hex digits one nibble at a time
    Type(String),
    Delete(usize),
    Backspace(usize),
    Undo,
    Redo,
    /// Move the caret to a nibble position
    Goto(u64),
    /// Select a byte range
    Select(u64, u64),
    Mode(EditMode),
    Copy,
    Cut,
    Paste,
    /// Replace all occurrences of the first byte string with the second
    Replace(Vec<u8>, Vec<u8>),
    Dump,
    Save(Option<PathBuf>),
    Reload,
    Quit { force: bool },
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let name = words.next().ok_or_else(|| anyhow!("Empty command"))?;
        let args: Vec<&str> = words.collect();

        let cmd = match name {
            "type" | "t" => {
                ensure!(!args.is_empty(), "type needs hex digits");
                let digits = args.concat();
                if let Some(ch) = digits.chars().find(|ch| !ch.is_ascii_hexdigit()) {
                    bail!("Invalid hex digit {ch:?}");
                }
                Command::Type(digits)
            }
            "del" | "delete" => Command::Delete(count(&args)?),
            "bs" | "backspace" => Command::Backspace(count(&args)?),
            "undo" | "u" => Command::Undo,
            "redo" | "r" => Command::Redo,
            "goto" | "g" => {
                let [caret] = args[..] else {
                    bail!("goto needs a nibble position");
                };
                Command::Goto(caret.parse()?)
            }
            "select" | "s" => {
                let [start, end] = args[..] else {
                    bail!("select needs a start and an end byte");
                };
                Command::Select(start.parse()?, end.parse()?)
            }
            "mode" | "m" => {
                let [mode] = args[..] else {
                    bail!("mode needs insert or replace");
                };
                Command::Mode(mode.parse()?)
            }
            "copy" => Command::Copy,
            "cut" => Command::Cut,
            "paste" => Command::Paste,
            "replace" => {
                let [pattern, replacement] = args[..] else {
                    bail!("replace needs a pattern and a replacement");
                };
                let pattern = hex::decode(pattern)?;
                ensure!(!pattern.is_empty(), "Empty pattern");
                Command::Replace(pattern, hex::decode(replacement)?)
            }
            "dump" | "d" => Command::Dump,
            "save" | "w" => Command::Save(args.first().map(PathBuf::from)),
            "reload" => Command::Reload,
            "quit" | "q" => Command::Quit { force: false },
            "quit!" | "q!" => Command::Quit { force: true },
            _ => bail!("Unknown command {name:?}"),
        };

        Ok(cmd)
    }
}

/// Whether the session may end. Unsaved changes need a forced quit.
pub fn can_quit(force: bool, dirty: bool) -> bool {
    force || !dirty
}

fn count(args: &[&str]) -> anyhow::Result<usize> {
    match args.first() {
        Some(n) => Ok(n.parse()?),
        None => Ok(1),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(s: &str) -> Command {
        s.parse().unwrap()
    }

    #[test]
    fn commands() {
        assert_eq!(Command::Type("12ab".into()), parse("type 12 ab"));
        assert_eq!(Command::Delete(1), parse("del"));
        assert_eq!(Command::Backspace(3), parse("bs 3"));
        assert_eq!(Command::Goto(10), parse("goto 10"));
        assert_eq!(Command::Select(1, 4), parse("select 1 4"));
        assert_eq!(Command::Mode(EditMode::Replace), parse("mode replace"));
        assert_eq!(
            Command::Replace(vec![0xab], vec![0x01, 0x02]),
            parse("replace ab 0102")
        );
        assert_eq!(Command::Save(None), parse("save"));
        assert_eq!(Command::Save(Some("out.bin".into())), parse("w out.bin"));
        assert_eq!(Command::Quit { force: true }, parse("q!"));
    }

    #[test]
    fn quit_with_unsaved_changes() {
        assert!(can_quit(false, false));
        assert!(can_quit(true, false));
        assert!(can_quit(true, true));
        assert!(!can_quit(false, true));
    }

    #[test]
    fn invalid() {
        assert!("".parse::<Command>().is_err());
        assert!("type".parse::<Command>().is_err());
        assert!("type 1g".parse::<Command>().is_err());
        assert!("goto".parse::<Command>().is_err());
        assert!("select 1".parse::<Command>().is_err());
        assert!("mode sideways".parse::<Command>().is_err());
        assert!("replace 1 2".parse::<Command>().is_err());
        assert!("replace  02".parse::<Command>().is_err());
        assert!("jump".parse::<Command>().is_err());
    }
}
