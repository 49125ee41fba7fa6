//! Line output with indentation for rendered TypeScript.
//!
//! The writer renders into a `String`, so writing never fails. Blank lines
//! carry no trailing indentation.

/// Writes lines into a `String`, prefixing each with the current indentation.
#[derive(Debug)]
pub struct CodeWriter<'o> {
    out: &'o mut String,
    depth: usize,
    unit: &'static str,
}

impl<'o> CodeWriter<'o> {
    /// A writer indenting by two spaces per level.
    pub fn new(out: &'o mut String) -> Self {
        CodeWriter {
            out,
            depth: 0,
            unit: "  ",
        }
    }

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    pub fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn line(&mut self, text: &str) {
        if !text.trim().is_empty() {
            for _ in 0..self.depth {
                self.out.push_str(self.unit);
            }
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    pub fn blank(&mut self) {
        self.out.push('\n');
    }

    /// A JSDoc block. Single-line text collapses to `/** text */`.
    pub fn jsdoc(&mut self, text: &str) {
        let lines: Vec<&str> = text.lines().collect();
        match lines.as_slice() {
            [] => {}
            [single] => self.line(&format!("/** {} */", single)),
            _ => {
                self.line("/**");
                for line in lines {
                    if line.is_empty() {
                        self.line(" *");
                    } else {
                        self.line(&format!(" * {}", line));
                    }
                }
                self.line(" */");
            }
        }
    }

    /// `//` comment lines. Empty lines keep a bare `//`.
    pub fn line_comment(&mut self, text: &str) {
        for line in text.lines() {
            if line.is_empty() {
                self.line("//");
            } else {
                self.line(&format!("// {}", line));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_indentation() {
        let mut out = String::new();
        let mut w = CodeWriter::new(&mut out);
        w.line("a {");
        w.indent();
        w.line("b;");
        w.blank();
        w.line("c;");
        w.dedent();
        w.line("}");
        assert_eq!(out, "a {\n  b;\n\n  c;\n}\n");
    }

    #[test]
    fn test_dedent_saturates() {
        let mut out = String::new();
        let mut w = CodeWriter::new(&mut out);
        w.dedent();
        w.line("x");
        assert_eq!(out, "x\n");
    }

    #[test]
    fn test_jsdoc() {
        let mut out = String::new();
        let mut w = CodeWriter::new(&mut out);
        w.indent();
        w.jsdoc("single");
        w.jsdoc("first\n\nthird");
        assert_eq!(out, "  /** single */\n  /**\n   * first\n   *\n   * third\n   */\n");
    }

    #[test]
    fn test_line_comment() {
        let mut out = String::new();
        let mut w = CodeWriter::new(&mut out);
        w.line_comment("header\n\nsyntax");
        assert_eq!(out, "// header\n//\n// syntax\n");
    }
}
