use crate::commands::chapters::write_table;
use crate::runner::{Flow, Runner};
use crate::session::{Command, Session};
use anyhow::Result;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

const HELP: &str = "\
Commands:
  open <pdf>        load a PDF and list its bookmark chapters
  keyword [text]    filter bookmark chapters by title (empty shows all)
  toggle <n>...     select or deselect chapter rows by number
  ranges <list>     add chapters from page ranges, e.g. 1-5, 7-9
  output <dir>      choose the output folder
  list              show chapters and the current selection
  submit            write the selected chapters
  cancel            quit without writing";

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Open(PathBuf),
    Session(Command),
    Toggle(Vec<usize>),
    List,
    Help,
    Empty,
    Unknown(String),
}

fn parse_line(line: &str) -> Input {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word.to_ascii_lowercase().as_str() {
        "" => Input::Empty,
        "open" if !rest.is_empty() => Input::Open(PathBuf::from(rest)),
        "keyword" => Input::Session(Command::KeywordChanged(rest.to_string())),
        "toggle" => {
            let rows: Option<Vec<usize>> = rest
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|s| !s.is_empty())
                .map(|s| s.parse().ok())
                .collect();
            match rows {
                Some(rows) if !rows.is_empty() => Input::Toggle(rows),
                _ => Input::Unknown(line.to_string()),
            }
        }
        "ranges" => Input::Session(Command::ApplyRanges(rest.to_string())),
        "output" if !rest.is_empty() => {
            Input::Session(Command::OutputFolderSelected(PathBuf::from(rest)))
        }
        "list" | "ls" => Input::List,
        "submit" => Input::Session(Command::Submit),
        "cancel" | "quit" | "exit" => Input::Session(Command::Cancel),
        "help" | "?" => Input::Help,
        _ => Input::Unknown(line.to_string()),
    }
}

/// Line-driven session over `input`, writing everything the user should see to `out`.
pub fn run_with<R: BufRead, W: Write>(
    initial: Option<&Path>,
    keyword: &str,
    input: R,
    out: W,
) -> Result<W> {
    let mut runner = Runner::new(Session::new(keyword), out);

    if let Some(path) = initial {
        open(&mut runner, path)?;
    }
    writeln!(runner.output(), "Type 'help' for commands.")?;

    for line in input.lines() {
        let flow = match parse_line(&line?) {
            Input::Open(path) => open(&mut runner, &path)?,
            Input::Session(command) => {
                let lists_rows = matches!(
                    command,
                    Command::KeywordChanged(_) | Command::ApplyRanges(_)
                );
                let flow = runner.dispatch(command)?;
                if lists_rows {
                    list(&mut runner)?;
                }
                flow
            }
            Input::Toggle(rows) => {
                for row in rows {
                    // Rows are shown 1-based.
                    match row.checked_sub(1) {
                        Some(index) if index < runner.session().candidates.len() => {
                            runner.dispatch(Command::RowToggled(index))?;
                        }
                        _ => writeln!(runner.output(), "No chapter row {}", row)?,
                    }
                }
                list(&mut runner)?;
                Flow::Continue
            }
            Input::List => {
                list(&mut runner)?;
                Flow::Continue
            }
            Input::Help => {
                writeln!(runner.output(), "{}", HELP)?;
                Flow::Continue
            }
            Input::Empty => Flow::Continue,
            Input::Unknown(line) => {
                writeln!(runner.output(), "Unknown command: {} (try 'help')", line)?;
                Flow::Continue
            }
        };

        if flow == Flow::Quit {
            break;
        }
    }

    let (_, out, _) = runner.into_parts();
    Ok(out)
}

pub fn run(initial: Option<&Path>, keyword: &str) -> Result<()> {
    let stdin = std::io::stdin();
    let _stdout = run_with(initial, keyword, stdin.lock(), std::io::stdout().lock())?;
    Ok(())
}

fn open<W: Write>(runner: &mut Runner<W>, path: &Path) -> Result<Flow> {
    let flow = match runner.open(path) {
        Ok(flow) => flow,
        Err(err) => {
            tracing::debug!("{:#}", err);
            writeln!(runner.output(), "{:#}", err)?;
            return Ok(Flow::Continue);
        }
    };
    writeln!(runner.output(), "PDF path: {}", path.display())?;
    list(runner)?;
    Ok(flow)
}

fn list<W: Write>(runner: &mut Runner<W>) -> Result<()> {
    let table = runner.session().candidates.clone();
    let selected: Vec<String> = runner
        .session()
        .registry
        .iter()
        .map(|c| format!("{} ({}-{})", c.name, c.start_page, c.end_page))
        .collect();

    let out = runner.output();
    write_table(&table, out)?;
    if !selected.is_empty() {
        writeln!(out, "Chapters: {}", selected.join(", "))?;
    }
    Ok(())
}
