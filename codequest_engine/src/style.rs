//! Styling helpers for terminal output.
//!
//! [`GameStyle`] applies ANSI styling via the `colored` crate. It is
//! implemented for `&str` and `String` so literals can be styled directly.

use colored::{ColoredString, Colorize};

pub trait GameStyle {
    fn title_style(&self) -> ColoredString;
    fn subheading_style(&self) -> ColoredString;
    fn section_style(&self) -> ColoredString;
    fn instructions_style(&self) -> ColoredString;
    fn code_style(&self) -> ColoredString;
    fn trace_style(&self) -> ColoredString;
    fn event_style(&self) -> ColoredString;
    fn error_style(&self) -> ColoredString;
    fn success_style(&self) -> ColoredString;
    fn hint_style(&self) -> ColoredString;
}

impl GameStyle for &str {
    fn title_style(&self) -> ColoredString {
        self.bold().truecolor(250, 200, 60).underline()
    }
    fn subheading_style(&self) -> ColoredString {
        self.underline()
    }
    fn section_style(&self) -> ColoredString {
        let bracketed = format!("[{self}]");
        bracketed.truecolor(75, 80, 75)
    }
    fn instructions_style(&self) -> ColoredString {
        self.italic().truecolor(102, 208, 250)
    }
    fn code_style(&self) -> ColoredString {
        self.truecolor(200, 200, 200)
    }
    fn trace_style(&self) -> ColoredString {
        self.truecolor(150, 230, 150)
    }
    fn event_style(&self) -> ColoredString {
        self.dimmed().truecolor(120, 120, 230)
    }
    fn error_style(&self) -> ColoredString {
        self.truecolor(230, 30, 30)
    }
    fn success_style(&self) -> ColoredString {
        self.bold().truecolor(40, 220, 90)
    }
    fn hint_style(&self) -> ColoredString {
        self.italic().dimmed()
    }
}

impl GameStyle for String {
    fn title_style(&self) -> ColoredString {
        self.as_str().title_style()
    }
    fn subheading_style(&self) -> ColoredString {
        self.as_str().subheading_style()
    }
    fn section_style(&self) -> ColoredString {
        self.as_str().section_style()
    }
    fn instructions_style(&self) -> ColoredString {
        self.as_str().instructions_style()
    }
    fn code_style(&self) -> ColoredString {
        self.as_str().code_style()
    }
    fn trace_style(&self) -> ColoredString {
        self.as_str().trace_style()
    }
    fn event_style(&self) -> ColoredString {
        self.as_str().event_style()
    }
    fn error_style(&self) -> ColoredString {
        self.as_str().error_style()
    }
    fn success_style(&self) -> ColoredString {
        self.as_str().success_style()
    }
    fn hint_style(&self) -> ColoredString {
        self.as_str().hint_style()
    }
}
