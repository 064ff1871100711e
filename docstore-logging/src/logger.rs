use std::fmt::{Display, Write};

use crate::level::LogLevel;

/// A sink for leveled, templated log entries.
///
/// Templates use `{}` placeholders filled positionally from `args`. Arguments without a
/// placeholder are appended, separated by spaces; placeholders without an argument are
/// kept as-is.
pub trait Logger: Send + Sync {
    fn log(&self, level: LogLevel, template: &str, args: &[&dyn Display]);

    fn debug(&self, template: &str, args: &[&dyn Display]) {
        self.log(LogLevel::Debug, template, args);
    }

    fn info(&self, template: &str, args: &[&dyn Display]) {
        self.log(LogLevel::Info, template, args);
    }

    fn warn(&self, template: &str, args: &[&dyn Display]) {
        self.log(LogLevel::Warn, template, args);
    }

    fn error(&self, template: &str, args: &[&dyn Display]) {
        self.log(LogLevel::Error, template, args);
    }
}

/// Fills the `{}` placeholders of `template` with `args`.
pub fn render<S: AsRef<str>>(template: &str, args: &[S]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut pieces = template.split("{}");

    if let Some(first) = pieces.next() {
        out.push_str(first);
    }
    for piece in pieces {
        match args.next() {
            Some(arg) => out.push_str(arg.as_ref()),
            None => out.push_str("{}"),
        }
        out.push_str(piece);
    }
    for arg in args {
        out.push(' ');
        out.push_str(arg.as_ref());
    }

    out
}

pub(crate) fn stringify(args: &[&dyn Display]) -> Vec<String> {
    args.iter()
        .map(|arg| {
            let mut rendered = String::new();
            // Writing into a String only fails if the Display impl itself reports an error.
            if write!(rendered, "{arg}").is_err() {
                rendered.push_str("<unprintable>");
            }
            rendered
        })
        .collect()
}

impl<L: Logger + ?Sized> Logger for std::sync::Arc<L> {
    fn log(&self, level: LogLevel, template: &str, args: &[&dyn Display]) {
        (**self).log(level, template, args);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_filled_in_order() {
        assert_eq!(render("{} met {}", &["John", "Jane"]), "John met Jane");
    }

    #[test]
    fn surplus_arguments_are_appended() {
        assert_eq!(render("connected", &["db", "42"]), "connected db 42");
        assert_eq!(render("{}:", &["a", "b"]), "a: b");
    }

    #[test]
    fn missing_arguments_keep_the_placeholder() {
        assert_eq!(render("{} and {}", &["one"]), "one and {}");
        assert_eq!(render::<&str>("", &[]), "");
    }
}
