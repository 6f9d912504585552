use std::io::Write;

use colored::Colorize;
use rift_diff::{format_line, Delta, DiffResult, DiffVisitor, LineOrigin, PatchSink, Range};

/// Writes rendered fragments, optionally colored by origin.
pub struct Printer<W: Write> {
    out: W,
    color: bool,
}

impl<W: Write> Printer<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    pub fn write_raw(&mut self, text: &str) -> DiffResult<()> {
        self.emit(LineOrigin::FileHeader, text.as_bytes())
    }

    pub fn finish(mut self) -> std::io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

impl<W: Write> PatchSink for Printer<W> {
    fn emit(&mut self, origin: LineOrigin, content: &[u8]) -> DiffResult<()> {
        if !self.color {
            self.out.write_all(content)?;
            return Ok(());
        }
        let text = String::from_utf8_lossy(content);
        for line in text.split_inclusive('\n') {
            let (body, newline) = match line.strip_suffix('\n') {
                Some(body) => (body, "\n"),
                None => (line, ""),
            };
            let styled = match origin {
                LineOrigin::FileHeader | LineOrigin::Binary => body.bold(),
                LineOrigin::HunkHeader => body.cyan(),
                LineOrigin::Addition => body.green(),
                LineOrigin::Deletion => body.red(),
                _ => body.normal(),
            };
            write!(self.out, "{styled}{newline}")?;
        }
        Ok(())
    }
}

/// Hunk and line events from a two-buffer diff, formatted as patch text.
impl<W: Write> DiffVisitor for Printer<W> {
    fn wants_file(&self) -> bool {
        false
    }

    fn hunk(&mut self, _delta: &Delta, _range: &Range, header: &[u8]) -> DiffResult<()> {
        self.emit(LineOrigin::HunkHeader, header)
    }

    fn line(&mut self, _delta: &Delta, origin: LineOrigin, content: &[u8]) -> DiffResult<()> {
        let mut line = Vec::with_capacity(content.len() + 1);
        if !format_line(origin, content, &mut line) {
            return Ok(());
        }
        self.emit(origin, &line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rift_diff::DiffOptions;

    #[test]
    fn plain_output_is_byte_exact() {
        let mut printer = Printer::new(Vec::new(), false);
        printer.emit(LineOrigin::Addition, b"+caf\xe9\n").unwrap();
        assert_eq!(printer.finish().unwrap(), b"+caf\xe9\n");
    }

    #[test]
    fn colored_output_keeps_newlines_outside_escapes() {
        colored::control::set_override(true);
        let mut printer = Printer::new(Vec::new(), true);
        printer.emit(LineOrigin::Deletion, b"-gone\n").unwrap();
        let out = String::from_utf8(printer.finish().unwrap()).unwrap();
        assert!(out.contains("\u{1b}["));
        assert!(out.ends_with('\n'));
        assert!(out.contains("-gone"));
    }

    #[test]
    fn formats_buffer_diff() {
        let mut printer = Printer::new(Vec::new(), false);
        rift_diff::diff_contents(
            Some(b"a\nb"),
            Some(b"a\nc\n"),
            &DiffOptions::default(),
            &mut printer,
        )
        .unwrap();
        let out = String::from_utf8(printer.finish().unwrap()).unwrap();
        assert_eq!(
            out,
            "@@ -1,2 +1,2 @@\n a\n-b\n\\ No newline at end of file\n+c\n"
        );
    }
}
