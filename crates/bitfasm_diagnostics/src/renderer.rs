//! Diagnostic rendering backends.

use crate::diagnostic::Diagnostic;

/// Trait for rendering diagnostics into formatted output strings.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic into a formatted string.
    ///
    /// The result ends with a newline.
    fn render(&self, diag: &Diagnostic) -> String;

    /// Renders a batch of diagnostics, concatenated in order.
    fn render_all(&self, diags: &[Diagnostic]) -> String {
        diags.iter().map(|d| self.render(d)).collect()
    }
}

/// Renders diagnostics in a rustc-style terminal format.
///
/// Produces output like:
/// ```text
/// note[N302]: 2 bits were not converted
///   --> frame 0x00020500
///    = note: unknown_bit 00020500_000_17
/// ```
pub struct TerminalRenderer {
    /// Whether to use ANSI color codes in the header line.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn header(&self, diag: &Diagnostic) -> String {
        let label = format!("{}[{}]", diag.severity, diag.code);
        if !self.color {
            return label;
        }
        let ansi = match diag.severity {
            crate::Severity::Warning => "33",
            crate::Severity::Note => "36",
        };
        format!("\x1b[1;{ansi}m{label}\x1b[0m")
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        let mut out = format!("{}: {}\n", self.header(diag), diag.message);
        if let Some(location) = &diag.location {
            out.push_str(&format!("  --> {location}\n"));
        }
        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }
        out
    }
}

/// Renders diagnostics as FASM comment lines.
///
/// FASM readers ignore everything after `#`, so the rendered text can be
/// appended to a feature listing without changing its meaning.
#[derive(Default)]
pub struct CommentRenderer;

impl DiagnosticRenderer for CommentRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        let mut out = format!("# {}[{}]: {}", diag.severity, diag.code, diag.message);
        if let Some(location) = &diag.location {
            out.push_str(&format!(" ({location})"));
        }
        out.push('\n');
        for note in &diag.notes {
            out.push_str(&format!("#   {note}\n"));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::DiagnosticCode;

    fn unconverted() -> Diagnostic {
        Diagnostic::note(DiagnosticCode::UNCONVERTED_BITS, "1 bits were not converted")
            .at("frame 0x00020500")
            .with_note("unknown_bit 00020500_000_17")
    }

    #[test]
    fn terminal_render_with_location_and_notes() {
        let output = TerminalRenderer::new(false).render(&unconverted());
        assert_eq!(
            output,
            "note[N302]: 1 bits were not converted\n  --> frame 0x00020500\n   = note: unknown_bit 00020500_000_17\n"
        );
    }

    #[test]
    fn terminal_render_without_location() {
        let diag = Diagnostic::warning(DiagnosticCode::MISSING_SEGBITS, "no segbits for HCLK_L");
        let output = TerminalRenderer::new(false).render(&diag);
        assert_eq!(output, "warning[W201]: no segbits for HCLK_L\n");
        assert!(!output.contains("-->"));
    }

    #[test]
    fn terminal_render_colored_header() {
        let diag = Diagnostic::warning(DiagnosticCode::MISSING_SEGBITS, "x");
        let output = TerminalRenderer::new(true).render(&diag);
        assert!(output.starts_with("\x1b[1;33mwarning[W201]\x1b[0m: x"));
    }

    #[test]
    fn comment_render_prefixes_every_line() {
        let output = CommentRenderer.render(&unconverted());
        for line in output.lines() {
            assert!(line.starts_with('#'), "line not commented: {line}");
        }
        assert!(output.contains("(frame 0x00020500)"));
    }

    #[test]
    fn render_all_concatenates() {
        let diags = vec![unconverted(), unconverted()];
        let output = CommentRenderer.render_all(&diags);
        assert_eq!(output.lines().count(), 4);
    }
}
