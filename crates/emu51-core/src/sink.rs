//! Host output sink consumed by the output-family instructions.

/// Append-only text sink for CLS/PRINT instructions.
///
/// Hosts satisfy this with a console or UI adapter; tests use
/// [`BufferSink`]. Appends are synchronous and ordered: two PRINTs executed
/// in program order appear in the sink in that order.
pub trait OutputSink {
    /// Discards everything written so far.
    fn clear(&mut self);

    /// Appends one finished line of text.
    fn append_line(&mut self, line: &str);
}

/// In-memory sink collecting lines for assertions and simple hosts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferSink {
    lines: Vec<String>,
}

impl BufferSink {
    /// Creates an empty sink.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Lines appended so far, oldest first.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl OutputSink for BufferSink {
    fn clear(&mut self) {
        self.lines.clear();
    }

    fn append_line(&mut self, line: &str) {
        self.lines.push(line.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::{BufferSink, OutputSink};

    #[test]
    fn appends_preserve_order_and_clear_discards() {
        let mut sink = BufferSink::new();
        sink.append_line("first");
        sink.append_line("second");
        assert_eq!(sink.lines(), ["first", "second"]);

        sink.clear();
        assert!(sink.lines().is_empty());

        sink.append_line("after clear");
        assert_eq!(sink.lines(), ["after clear"]);
    }
}
