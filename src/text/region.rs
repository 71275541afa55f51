use super::{Fragment, Line};
use std::fmt::{self, Display, Formatter};

/// A Region is a 2D collection of lines with chainable in-place operations,
/// so multi-line transforms like quoting do not repeatedly reallocate
/// strings.
#[derive(Clone, Debug, Default)]
pub struct Region {
    lines: Vec<Line>,
}

impl Region {
    pub fn new() -> Self {
        Region { lines: Vec::new() }
    }

    /// Create a region from a multiline &str (split on "\n")
    pub fn from_str(s: &str) -> Self {
        let lines = if s.is_empty() {
            Vec::new()
        } else {
            s.split('\n').map(Line::from_str).collect()
        };
        Region { lines }
    }

    /// Push a line to the back
    pub fn push_back_line(&mut self, line: Line) -> &mut Self {
        self.lines.push(line);
        self
    }

    /// Add a prefix fragment to every line
    pub fn prefix_each_line<F: Into<Fragment>>(&mut self, prefix: F) -> &mut Self {
        let p = prefix.into();
        for line in &mut self.lines {
            line.prepend(p.clone());
        }
        self
    }

    /// Convert the region into a String, joining lines with '\n'. This is the
    /// only place the final result is eagerly allocated.
    pub fn apply(&self) -> String {
        let mut out = String::new();
        let mut first = true;
        for line in &self.lines {
            if !first {
                out.push('\n');
            }
            out.push_str(&line.apply());
            first = false;
        }
        out
    }

    /// Convenience to check whether the region is empty
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.apply())
    }
}
