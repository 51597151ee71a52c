//! An ordered sequence of directives, serialized to Tcl at the boundary.

use std::fmt;
use std::io;
use std::path::Path;

use crate::directive::Directive;

/// A complete control script.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ControlScript {
    directives: Vec<Directive>,
}

impl ControlScript {
    /// Creates an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one directive.
    pub fn push(&mut self, directive: Directive) {
        self.directives.push(directive);
    }

    /// Appends several directives in order.
    pub fn extend<I: IntoIterator<Item = Directive>>(&mut self, directives: I) {
        self.directives.extend(directives);
    }

    /// The directives in emission order.
    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    /// Index of the first directive equal to `directive`.
    pub fn position(&self, directive: &Directive) -> Option<usize> {
        self.directives.iter().position(|d| d == directive)
    }

    /// Returns `true` if the script contains `directive`.
    pub fn contains(&self, directive: &Directive) -> bool {
        self.position(directive).is_some()
    }

    /// Renders the script as Tcl text, one directive per line group.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for directive in &self.directives {
            out.push_str(&directive.to_string());
            out.push('\n');
        }
        out
    }

    /// Writes the rendered script to `path`, replacing any previous file.
    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        std::fs::write(path, self.render())
    }
}

impl fmt::Display for ControlScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> ControlScript {
        let mut script = ControlScript::new();
        script.push(Directive::Comment("generated".into()));
        script.push(Directive::Blank);
        script.extend([Directive::CloseProject, Directive::Exit(0)]);
        script
    }

    #[test]
    fn render_one_line_per_directive() {
        assert_eq!(sample().render(), "# generated\n\nclose_project\nexit 0\n");
    }

    #[test]
    fn display_matches_render() {
        let script = sample();
        assert_eq!(script.to_string(), script.render());
    }

    #[test]
    fn position_and_contains() {
        let script = sample();
        assert_eq!(script.position(&Directive::CloseProject), Some(2));
        assert!(script.contains(&Directive::Exit(0)));
        assert!(!script.contains(&Directive::Exit(1)));
    }

    #[test]
    fn write_overwrites() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("run_sim.tcl");
        std::fs::write(&path, "stale contents that are longer than the script\n").unwrap();
        sample().write_to(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), sample().render());
    }
}
