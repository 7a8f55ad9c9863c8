use console::style;

use crate::diagnostics::{Diagnostic, Severity};
use crate::policy::DiagnosticPolicy;

/// Render a surfaced diagnostic.
///
/// Registered kinds get a hint naming the codes that would suppress them and the target whose
/// `suppress` attribute they belong in.
pub fn render_diagnostic(diagnostic: &Diagnostic, module: &str, policy: &DiagnosticPolicy) -> String {
    let mut text = String::new();

    if let Some(file) = &diagnostic.file {
        text.push_str(&file.display().to_string());
        if let Some(line) = diagnostic.line {
            text.push_str(&format!(":{line}"));
            if let Some(column) = diagnostic.column {
                text.push_str(&format!(":{column}"));
            }
        }
        text.push_str(": ");
    }
    text.push_str(&format!("{} - ", diagnostic.severity));
    if let Some(key) = &diagnostic.key {
        text.push_str(&format!("[{key}] "));
    }
    text.push_str(&diagnostic.message);

    for line in &diagnostic.excerpt {
        text.push('\n');
        text.push_str(line);
    }

    if let Some(kind) = diagnostic.kind() {
        let group = kind.group().name();
        text.push_str(&format!(
            "\n  ProTip: \"{}\" or \"{}\" can be added to the `suppress` attribute of:\n  {}",
            kind.key(),
            group,
            policy.attribution(module)
        ));
        if diagnostic.file.is_some() {
            text.push_str(&format!(
                "\n  Alternatively /** @suppress {{{group}}} */ can be added to the source file."
            ));
        }
    }

    text
}

pub fn summary(error_count: usize, warning_count: usize) -> String {
    format!("{error_count} error(s), {warning_count} warning(s)")
}

/// Colour a rendered line for the terminal.
pub fn paint(text: &str, severity: Option<Severity>, colorize: bool) -> String {
    if !colorize {
        return text.to_string();
    }
    let styled = style(text).force_styling(true);
    match severity {
        Some(Severity::Error) => styled.red().to_string(),
        Some(Severity::Warning) => styled.yellow().to_string(),
        None => styled.bold().to_string(),
    }
}
