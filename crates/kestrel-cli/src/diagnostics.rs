//! Turning byte offsets into `file:line:col` and errors into readable reports.

use std::fmt::Write;
use std::rc::Rc;

use kestrel_ast::span::Span;
use kestrel_runtime::RuntimeError;

/// Byte offsets of line starts in one source text.
#[derive(Debug, Clone)]
pub struct LineMap {
    line_starts: Vec<usize>,
}

impl LineMap {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(source.match_indices('\n').map(|(i, _)| i + 1));
        Self { line_starts }
    }

    /// 1-based line and column of `offset`. Columns count characters.
    pub fn location(&self, source: &str, offset: usize) -> (usize, usize) {
        let offset = offset.min(source.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let start = self.line_starts[line];
        let column = source
            .get(start..offset)
            .map_or(offset - start, |prefix| prefix.chars().count());
        (line + 1, column + 1)
    }

    /// Text of the 1-based `line`, without its terminator.
    pub fn line_text<'s>(&self, source: &'s str, line: usize) -> &'s str {
        let Some(&start) = self.line_starts.get(line.wrapping_sub(1)) else {
            return "";
        };
        let end = self
            .line_starts
            .get(line)
            .map_or(source.len(), |next| next - 1);
        source
            .get(start..end)
            .map_or("", |text| text.strip_suffix('\r').unwrap_or(text))
    }
}

/// Looks up the text of a file by the name its spans carry.
pub trait SourceLookup {
    fn source(&self, file: &str) -> Option<Rc<str>>;
}

impl SourceLookup for kestrel_runtime::GlobalContext {
    fn source(&self, file: &str) -> Option<Rc<str>> {
        kestrel_runtime::GlobalContext::source(self, file)
    }
}

/// A single named source, for errors raised before any module runs.
pub struct SingleSource<'a> {
    pub file: &'a str,
    pub source: &'a str,
}

impl SourceLookup for SingleSource<'_> {
    fn source(&self, file: &str) -> Option<Rc<str>> {
        (file == self.file).then(|| Rc::from(self.source))
    }
}

fn position(span: &Span, sources: &dyn SourceLookup) -> String {
    match sources.source(&span.file) {
        Some(source) => {
            let (line, col) = LineMap::new(&source).location(&source, span.start);
            format!("{}:{line}:{col}", span.file)
        }
        None => span.file.to_string(),
    }
}

fn snippet(out: &mut String, span: &Span, sources: &dyn SourceLookup) {
    let Some(source) = sources.source(&span.file) else {
        return;
    };
    let map = LineMap::new(&source);
    let (line, col) = map.location(&source, span.start);
    let text = map.line_text(&source, line);
    let (end_line, end_col) = map.location(&source, span.end);
    let width = if end_line == line {
        end_col.saturating_sub(col).max(1)
    } else {
        text.chars().count().saturating_sub(col - 1).max(1)
    };
    let gutter = line.to_string().len();
    let _ = writeln!(out, "{:gutter$} |", "");
    let _ = writeln!(out, "{line} | {text}");
    let _ = writeln!(
        out,
        "{:gutter$} | {}{}",
        "",
        " ".repeat(col - 1),
        "^".repeat(width)
    );
}

/// Multi-line report: message, location with the offending line, and the
/// call trace innermost first.
pub fn render_error(err: &RuntimeError, sources: &dyn SourceLookup) -> String {
    let mut out = format!("error: {}\n", err.message);
    if let Some(span) = err.span.as_ref().filter(|span| !span.is_empty) {
        let _ = writeln!(out, "  --> {}", position(span, sources));
        snippet(&mut out, span, sources);
    }
    if let Some(trace) = err.stack_trace.as_ref().filter(|trace| !trace.is_empty()) {
        out.push_str("call trace:\n");
        for frame in trace.iter().rev() {
            if frame.call_site.is_empty {
                let _ = writeln!(out, "  in {}", frame.name);
            } else {
                let _ = writeln!(
                    out,
                    "  in {} called at {}",
                    frame.name,
                    position(&frame.call_site, sources)
                );
            }
        }
    }
    out
}
