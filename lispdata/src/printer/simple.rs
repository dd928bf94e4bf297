use crate::escape::{escape_string, format_bool, format_real};
use std::convert::Infallible;
use std::fmt::Write as _;

use super::{Print, Printer};

/// A printer that formats the output on a single line.
struct SimplePrinter {
    needs_whitespace: bool,
    string: String,
}

impl SimplePrinter {
    pub fn new() -> Self {
        Self {
            needs_whitespace: false,
            string: String::new(),
        }
    }

    #[inline]
    fn separate(&mut self) {
        if self.needs_whitespace {
            self.string.push(' ');
        }
        self.needs_whitespace = true;
    }

    #[inline]
    fn print_delimited<F>(&mut self, open: &str, f: F) -> Result<(), Infallible>
    where
        F: FnOnce(&mut Self) -> Result<(), Infallible>,
    {
        self.separate();
        self.string.push_str(open);
        self.needs_whitespace = false;
        f(self)?;
        self.string.push(')');
        self.needs_whitespace = true;

        Ok(())
    }
}

impl Printer for SimplePrinter {
    type Error = Infallible;

    fn symbol(&mut self, symbol: &str) -> Result<(), Self::Error> {
        self.separate();
        self.string.push_str(symbol);
        Ok(())
    }

    fn string(&mut self, string: &str) -> Result<(), Self::Error> {
        self.separate();
        self.string.push_str(&escape_string(string));
        Ok(())
    }

    fn int(&mut self, int: i64) -> Result<(), Self::Error> {
        self.separate();
        let _ = write!(&mut self.string, "{}", int);
        Ok(())
    }

    fn real(&mut self, real: f64) -> Result<(), Self::Error> {
        self.separate();
        self.string.push_str(&format_real(real));
        Ok(())
    }

    fn bool(&mut self, bool: bool) -> Result<(), Self::Error> {
        self.separate();
        self.string.push_str(format_bool(bool));
        Ok(())
    }

    #[inline]
    fn list<F>(&mut self, f: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>,
    {
        self.print_delimited("(", f)
    }

    #[inline]
    fn translation<F>(&mut self, f: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>,
    {
        self.print_delimited("_(", f)
    }
}

/// Print a `T` into an s-expression string.
///
/// This function does not produce any line breaks, indentation, or unnecessary whitespace.
/// Where human readability is a concern, consider using the [`to_string_pretty`] function instead.
///
/// To print a whole document, print its [`forms`](crate::node::Node::forms) rather than
/// the root node, which would add an extra pair of parentheses.
///
/// [`to_string_pretty`]: `crate::printer::to_string_pretty`
pub fn to_string<T: Print>(value: T) -> String {
    let mut printer = SimplePrinter::new();
    let _ = value.print(&mut printer);
    printer.string
}
