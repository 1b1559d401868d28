//! Indented line buffer for proto source

/// Accumulates proto source one line at a time
#[derive(Debug)]
pub struct LineWriter {
    buf: String,
    depth: usize,
    indent_width: usize,
}

impl LineWriter {
    pub fn new(indent_width: usize) -> Self {
        Self {
            buf: String::new(),
            depth: 0,
            indent_width,
        }
    }

    /// Write a line at the current depth
    pub fn write_line(&mut self, line: impl AsRef<str>) {
        let line = line.as_ref();
        if !line.is_empty() {
            self.buf
                .extend(std::iter::repeat(' ').take(self.depth * self.indent_width));
            self.buf.push_str(line);
        }
        self.buf.push('\n');
    }

    /// Separate blocks. No-op at the start of the buffer, after an opening
    /// brace, or after another blank line.
    pub fn blank_line(&mut self) {
        if self.buf.is_empty() || self.buf.ends_with("{\n") || self.buf.ends_with("\n\n") {
            return;
        }
        self.buf.push('\n');
    }

    /// Write `<header> {` and indent
    pub fn open(&mut self, header: impl AsRef<str>) {
        self.write_line(format!("{} {{", header.as_ref()));
        self.depth += 1;
    }

    /// Dedent and write `}<suffix>`
    pub fn close(&mut self, suffix: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.write_line(format!("}}{}", suffix));
    }

    pub fn into_string(self) -> String {
        self.buf
    }
}
