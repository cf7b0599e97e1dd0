use console::{Term, style};

/// Status lines go to stderr; replies and reports go to stdout
pub struct Output {
    status: Term,
    content: Term,
}

impl Output {
    pub fn new() -> Self {
        Self {
            status: Term::stderr(),
            content: Term::stdout(),
        }
    }

    pub fn success(&self, message: &str) {
        let _ = self
            .status
            .write_line(&format!("{} {}", style("✓").green(), message));
    }

    pub fn error(&self, message: &str) {
        let _ = self
            .status
            .write_line(&format!("{} {}", style("✗").red(), message));
    }

    pub fn warning(&self, message: &str) {
        let _ = self
            .status
            .write_line(&format!("{} {}", style("⚠").yellow(), message));
    }

    pub fn info(&self, message: &str) {
        let _ = self
            .status
            .write_line(&format!("{} {}", style("ℹ").blue(), message));
    }

    pub fn header(&self, message: &str) {
        let _ = self
            .status
            .write_line(&format!("\n{}", style(message).bold().underlined()));
    }

    /// Inline prompt without a trailing newline
    pub fn prompt(&self, label: &str) {
        let _ = self
            .status
            .write_str(&style(label).cyan().bold().to_string());
        let _ = self.status.flush();
    }

    /// Mentor reply, followed by a blank line
    pub fn reply(&self, text: &str) {
        let _ = self
            .content
            .write_line(&format!("{} {}\n", style("mentor>").magenta().bold(), text));
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
