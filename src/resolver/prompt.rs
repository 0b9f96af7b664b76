//! Line-based terminal menu for the resolver.
//!
//! Each group is shown as a numbered list of files followed by the `skip`,
//! `open` and `quit` entries. The operator answers with an entry number, a
//! keyword (or its first letter), or a path exactly as listed. End of input
//! counts as `quit`.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use bytesize::ByteSize;
use yansi::Paint;

use super::{Choice, GroupMenu, Prompter, ResolveError};

const KEYWORDS: [&str; 3] = ["skip", "open", "quit"];

/// Interactive prompter reading answers from `input` and writing the menu to `output`.
pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    /// Create a prompter over arbitrary streams.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn render(&mut self, menu: &GroupMenu<'_>) -> std::io::Result<()> {
        let size = match menu.size {
            Some(bytes) => format!("{} ({} bytes)", ByteSize::b(bytes), bytes),
            None => "of unknown size".to_string(),
        };
        let header = format!(
            "{}/{} These {} files are {} each.",
            menu.number,
            menu.total,
            menu.files.len(),
            size
        );
        writeln!(self.output)?;
        writeln!(self.output, "{}", header.bold())?;
        for (i, file) in menu.files.iter().enumerate() {
            writeln!(self.output, "{:>3}. {}", i + 1, file.display())?;
        }
        for (i, keyword) in KEYWORDS.iter().enumerate() {
            writeln!(
                self.output,
                "{:>3}. {}",
                menu.files.len() + i + 1,
                keyword.cyan()
            )?;
        }
        write!(self.output, "> ")?;
        self.output.flush()
    }
}

/// Interpret one answer line against the listed files.
#[must_use]
pub fn parse_answer(answer: &str, files: &[PathBuf]) -> Option<Choice> {
    let answer = answer.trim();
    if answer.is_empty() {
        return None;
    }

    match answer.to_lowercase().as_str() {
        "s" | "skip" => return Some(Choice::Skip),
        "o" | "open" => return Some(Choice::Open),
        "q" | "quit" => return Some(Choice::Quit),
        _ => {}
    }

    if let Ok(n) = answer.parse::<usize>() {
        return match n.checked_sub(1) {
            Some(i) if i < files.len() => Some(Choice::Discard(files[i].clone())),
            Some(i) if i == files.len() => Some(Choice::Skip),
            Some(i) if i == files.len() + 1 => Some(Choice::Open),
            Some(i) if i == files.len() + 2 => Some(Choice::Quit),
            _ => None,
        };
    }

    files
        .iter()
        .find(|f| f.to_string_lossy() == answer)
        .map(|f| Choice::Discard(f.clone()))
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn choose(&mut self, menu: &GroupMenu<'_>) -> Result<Choice, ResolveError> {
        loop {
            self.render(menu).map_err(ResolveError::Prompt)?;

            let mut line = String::new();
            let read = self
                .input
                .read_line(&mut line)
                .map_err(ResolveError::Prompt)?;
            if read == 0 {
                writeln!(self.output).map_err(ResolveError::Prompt)?;
                return Ok(Choice::Quit);
            }

            match parse_answer(&line, menu.files) {
                Some(choice) => return Ok(choice),
                None => {
                    writeln!(
                        self.output,
                        "{}",
                        "Please choose one of the listed entries.".yellow()
                    )
                    .map_err(ResolveError::Prompt)?;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn files() -> Vec<PathBuf> {
        vec![PathBuf::from("./a.txt"), PathBuf::from("./b.txt")]
    }

    #[test]
    fn test_parse_keywords() {
        let files = files();
        assert_eq!(parse_answer("skip", &files), Some(Choice::Skip));
        assert_eq!(parse_answer(" O \n", &files), Some(Choice::Open));
        assert_eq!(parse_answer("q", &files), Some(Choice::Quit));
    }

    #[test]
    fn test_parse_numbers() {
        let files = files();
        assert_eq!(
            parse_answer("2", &files),
            Some(Choice::Discard(PathBuf::from("./b.txt")))
        );
        assert_eq!(parse_answer("3", &files), Some(Choice::Skip));
        assert_eq!(parse_answer("4", &files), Some(Choice::Open));
        assert_eq!(parse_answer("5", &files), Some(Choice::Quit));
        assert_eq!(parse_answer("0", &files), None);
        assert_eq!(parse_answer("6", &files), None);
    }

    #[test]
    fn test_parse_exact_path() {
        let files = files();
        assert_eq!(
            parse_answer("./a.txt", &files),
            Some(Choice::Discard(PathBuf::from("./a.txt")))
        );
        assert_eq!(parse_answer("a.txt", &files), None);
        assert_eq!(parse_answer("", &files), None);
    }

    #[test]
    fn test_choose_reprompts_on_invalid_answer() {
        let files = files();
        let menu = GroupMenu {
            number: 1,
            total: 4,
            size: Some(2048),
            files: &files,
        };
        let mut output = Vec::new();
        let mut prompter = TerminalPrompter::new(Cursor::new("nonsense\n1\n"), &mut output);

        let choice = prompter.choose(&menu).unwrap();
        assert_eq!(choice, Choice::Discard(PathBuf::from("./a.txt")));

        let shown = String::from_utf8_lossy(&output).to_string();
        assert!(shown.contains("1/4 These 2 files are"));
        assert!(shown.contains("2048 bytes"));
        assert!(shown.contains("Please choose one of the listed entries."));
        assert_eq!(shown.matches("> ").count(), 2);
    }

    #[test]
    fn test_end_of_input_quits() {
        let files = files();
        let menu = GroupMenu {
            number: 1,
            total: 1,
            size: None,
            files: &files,
        };
        let mut prompter = TerminalPrompter::new(Cursor::new(""), Vec::new());
        assert_eq!(prompter.choose(&menu).unwrap(), Choice::Quit);
    }
}
