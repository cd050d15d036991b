use std::fmt;

/// A byte range into the source text. A zero-length span at offset 0 stands
/// for "no position" and is skipped when rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn dummy() -> Self {
        Self { start: 0, end: 0 }
    }

    pub fn is_dummy(&self) -> bool {
        self.start == 0 && self.end == 0
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Label {
    pub span: Span,
    pub message: String,
}

impl Label {
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }
}

/// A renderable report: severity, code, message, an optional source label,
/// and free-form notes.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: Option<String>,
    pub message: String,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.notes.push(format!("help: {}", help.into()));
        self
    }
}

/// 1-based line and column of a byte offset.
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;
    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

fn line_content(source: &str, line_num: usize) -> Option<&str> {
    source.lines().nth(line_num - 1)
}

pub struct DiagnosticRenderer<'a> {
    source: &'a str,
    file_name: &'a str,
    use_color: bool,
}

impl<'a> DiagnosticRenderer<'a> {
    pub fn new(source: &'a str, file_name: &'a str, use_color: bool) -> Self {
        Self {
            source,
            file_name,
            use_color,
        }
    }

    /// Renders in the familiar compiler shape: severity header, `-->`
    /// location line, gutter with the offending source line and carets,
    /// then notes.
    pub fn render(&self, diagnostic: &Diagnostic) -> String {
        let mut out = String::new();

        let severity = match diagnostic.severity {
            Severity::Error => self.bold_red("error"),
            Severity::Warning => self.bold_yellow("warning"),
        };
        match &diagnostic.code {
            Some(code) => out.push_str(&format!(
                "{}[{}]: {}\n",
                severity,
                code,
                self.bold(&diagnostic.message)
            )),
            None => out.push_str(&format!("{}: {}\n", severity, self.bold(&diagnostic.message))),
        }

        for label in diagnostic.labels.iter().filter(|l| !l.span.is_dummy()) {
            self.render_label(&mut out, label);
        }

        for note in &diagnostic.notes {
            out.push_str(&format!("  {} {}\n", self.blue("="), note));
        }

        out
    }

    fn render_label(&self, out: &mut String, label: &Label) {
        let (line, col) = line_col(self.source, label.span.start);
        let Some(content) = line_content(self.source, line) else {
            return;
        };

        out.push_str(&format!(
            "  {} {}:{}:{}\n",
            self.blue("-->"),
            self.file_name,
            line,
            col
        ));

        let gutter_width = line.to_string().len();
        let blank_gutter = " ".repeat(gutter_width);
        out.push_str(&format!("{} {}\n", blank_gutter, self.blue("|")));
        out.push_str(&format!(
            "{} {} {}\n",
            self.blue(&line.to_string()),
            self.blue("|"),
            content
        ));

        // The caret run is clamped to the labeled line.
        let (end_line, end_col) = line_col(self.source, label.span.end.max(label.span.start + 1) - 1);
        let width = if end_line == line {
            (end_col + 1).min(content.chars().count() + 1).saturating_sub(col).max(1)
        } else {
            (content.chars().count() + 1).saturating_sub(col).max(1)
        };
        let carets = format!("{}{}", " ".repeat(col - 1), "^".repeat(width));
        out.push_str(&format!(
            "{} {} {}\n",
            blank_gutter,
            self.blue("|"),
            self.red(&carets)
        ));

        if !label.message.is_empty() {
            out.push_str(&format!(
                "{} {} {}{}\n",
                blank_gutter,
                self.blue("|"),
                " ".repeat(col - 1),
                self.red(&label.message)
            ));
        }
    }

    fn styled(&self, code: &str, text: &str) -> String {
        if self.use_color {
            format!("\x1b[{}m{}\x1b[0m", code, text)
        } else {
            text.to_string()
        }
    }

    fn red(&self, text: &str) -> String {
        self.styled("31", text)
    }

    fn bold_red(&self, text: &str) -> String {
        self.styled("1;31", text)
    }

    fn bold_yellow(&self, text: &str) -> String {
        self.styled("1;33", text)
    }

    fn blue(&self, text: &str) -> String {
        self.styled("34", text)
    }

    fn bold(&self, text: &str) -> String {
        self.styled("1", text)
    }
}

pub fn render_diagnostic(
    source: &str,
    file_name: &str,
    diagnostic: &Diagnostic,
    use_color: bool,
) -> String {
    DiagnosticRenderer::new(source, file_name, use_color).render(diagnostic)
}
