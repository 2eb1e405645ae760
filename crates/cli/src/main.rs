mod command;
mod logging;

use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use argh::FromArgs;
use hexed_editor::{hex, read_config, BufferObserver, Session};

use crate::command::Command;

#[derive(FromArgs)]
/// Hex editor reading edit commands from standard input
struct Args {
    /// file to open
    #[argh(positional)]
    file: Option<PathBuf>,

    /// turn debug logging on
    #[argh(switch, short = 'd')]
    debug: bool,

    /// configuration file
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,
}

/// Logs buffer changes
#[derive(Debug)]
struct LogObserver;

impl BufferObserver for LogObserver {
    fn length_changed(&mut self, len: u64) {
        log::debug!("Buffer length changed to {len}");
    }

    fn undo_redo_changed(&mut self, undo: bool, redo: bool) {
        log::debug!("Undo available: {undo}, redo available: {redo}");
    }
}

fn main() {
    let args: Args = argh::from_env();

    if let Err(e) = logging::setup(args.debug) {
        eprintln!("Failed to setup logging: {e}");
    }

    if let Err(e) = run(args) {
        log::error!("{e:?}");
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let working_dir = env::current_dir()?;
    let config = read_config(args.config.as_deref(), &working_dir)?;
    log::info!("Starting with {:?}", config.editor);

    let mut session = Session::open(args.file.as_deref(), config.editor)?;
    session.set_observer(Box::new(LogObserver));

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let cmd = match line.parse::<Command>() {
            Ok(cmd) => cmd,
            Err(e) => {
                writeln!(out, "error: {e}")?;
                continue;
            }
        };

        if let Command::Quit { force } = cmd {
            if command::can_quit(force, session.is_dirty()) {
                break;
            }
            writeln!(out, "error: unsaved changes, use quit! to discard them")?;
            continue;
        }

        if let Err(e) = execute(&mut session, cmd, &mut out) {
            log::warn!("{line:?} failed: {e}");
            writeln!(out, "error: {e}")?;
        }
    }

    Ok(())
}

fn execute<W: Write>(session: &mut Session, cmd: Command, out: &mut W) -> anyhow::Result<()> {
    use hexed_editor::nibble::NibbleEvent;

    match cmd {
        Command::Type(digits) => {
            for ch in digits.chars() {
                if let Some(event) = NibbleEvent::from_digit(ch) {
                    session.input(event)?;
                }
            }
        }
        Command::Delete(n) => {
            for _ in 0..n {
                session.input(NibbleEvent::Delete)?;
            }
        }
        Command::Backspace(n) => {
            for _ in 0..n {
                session.input(NibbleEvent::Backspace)?;
            }
        }
        Command::Undo => session.undo()?,
        Command::Redo => session.redo()?,
        Command::Goto(caret) => session.move_to(caret),
        Command::Select(start, end) => session.select(start..end)?,
        Command::Mode(mode) => session.set_mode(mode),
        Command::Copy => {
            if !session.copy()? {
                writeln!(out, "nothing selected")?;
            }
        }
        Command::Cut => {
            if !session.cut()? {
                writeln!(out, "nothing selected")?;
            }
        }
        Command::Paste => session.paste()?,
        Command::Replace(pattern, replacement) => {
            let n = session.replace_all(&pattern, &replacement)?;
            writeln!(out, "replaced {n} occurrences")?;
        }
        Command::Dump => dump(session, out)?,
        Command::Save(Some(path)) => session.save_as(&path)?,
        Command::Save(None) => session.save()?,
        Command::Reload => session.reload()?,
        Command::Quit { .. } => {}
    }

    Ok(())
}

/// Print the buffer as hex rows followed by a status line
fn dump<W: Write>(session: &Session, out: &mut W) -> io::Result<()> {
    let options = session.options();
    let bytes = session.buffer().slice(..);
    let row = options.bytes_per_row.max(1);

    for (i, chunk) in bytes.chunks(row).enumerate() {
        let offset = i * row;
        let text = hex::encode(chunk, options.uppercase);
        writeln!(out, "{offset:08x}: {text}")?;
    }

    let (undo, redo) = session.buffer().can_undo_redo();
    let selection = session
        .selection()
        .map(|sel| format!("{}..{}", sel.start, sel.end))
        .unwrap_or_else(|| "none".into());
    writeln!(
        out,
        "len {} caret {} state {} mode {} selection {} undo {} redo {} dirty {}",
        bytes.len(),
        session.caret(),
        session.state(),
        session.mode(),
        selection,
        undo,
        redo,
        session.is_dirty(),
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use hexed_editor::nibble::NibbleEvent;
    use hexed_editor::{Buffer, ClipboardKind, EditMode, Internal, Options};

    fn session(bytes: &[u8]) -> Session {
        let options = Options {
            mode: EditMode::Insert,
            clipboard: ClipboardKind::Internal,
            uppercase: true,
            bytes_per_row: 4,
        };
        Session::with_clipboard(Buffer::from(bytes), None, options, Box::new(Internal::new()))
    }

    fn dumped(session: &Session) -> String {
        let mut out = Vec::new();
        dump(session, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn dump_rows_and_status() {
        let mut s = session(&[0xAB, 0xCD, 0x01, 0x02, 0x03, 0x04]);
        s.select(1..3).unwrap();

        let expected = "\
00000000: AB CD 01 02
00000004: 03 04
len 6 caret 2 state Even mode insert selection 1..3 undo false redo false dirty false
";
        assert_eq!(expected, dumped(&s));
    }

    #[test]
    fn dump_after_edit() {
        let mut s = session(&[]);
        s.input(NibbleEvent::Insert(0x1)).unwrap();

        let expected = "\
00000000: 10
len 1 caret 1 state OddPendingInsert mode insert selection none undo true redo false dirty true
";
        assert_eq!(expected, dumped(&s));
    }

    #[test]
    fn quit_refused_when_dirty() {
        let mut s = session(&[0x11]);
        assert!(command::can_quit(false, s.is_dirty()));

        execute(&mut s, Command::Type("2".into()), &mut Vec::<u8>::new()).unwrap();
        assert!(s.is_dirty());
        assert!(!command::can_quit(false, s.is_dirty()));
        assert!(command::can_quit(true, s.is_dirty()));

        execute(&mut s, Command::Undo, &mut Vec::<u8>::new()).unwrap();
        assert!(command::can_quit(false, s.is_dirty()));
    }
}
