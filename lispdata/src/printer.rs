//! Print whole trees back into s-expressions.
//!
//! Unlike the [`Writer`], which streams forms as they are produced, printers
//! serialise an existing [`Node`] tree in one go. Printing the forms of a
//! parsed document and parsing the result again gives back an equal tree.
//!
//! [`Writer`]: crate::writer::Writer
use crate::node::{Atom, Forms, Node};
use std::rc::Rc;
use std::sync::Arc;
mod pretty;
mod simple;
pub use pretty::to_string_pretty;
pub use simple::to_string;

/// Trait for types that can print s-expressions.
pub trait Printer: Sized {
    type Error;

    /// Print a symbol verbatim.
    fn symbol(&mut self, symbol: &str) -> Result<(), Self::Error>;

    /// Print a string.
    fn string(&mut self, string: &str) -> Result<(), Self::Error>;

    /// Print an integer.
    fn int(&mut self, int: i64) -> Result<(), Self::Error>;

    /// Print a real.
    fn real(&mut self, real: f64) -> Result<(), Self::Error>;

    /// Print a boolean.
    fn bool(&mut self, bool: bool) -> Result<(), Self::Error>;

    /// Print a list given a function that prints the contents.
    fn list<F>(&mut self, f: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>;

    /// Print a translatable form `_( ... )` given a function that prints the contents.
    fn translation<F>(&mut self, f: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>;

    /// Print a printable value.
    fn print(&mut self, value: impl Print) -> Result<(), Self::Error> {
        value.print(self)
    }
}

/// Trait for types that can be printed as an s-expression.
pub trait Print {
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), P::Error>;
}

impl Print for Atom {
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), P::Error> {
        match self {
            Atom::String(string) => printer.string(string),
            Atom::Integer(int) => printer.int(*int),
            Atom::Real(real) => printer.real(real.into_inner()),
            Atom::Boolean(bool) => printer.bool(*bool),
            Atom::Symbol(symbol) => printer.symbol(symbol),
        }
    }
}

impl Print for Node {
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), P::Error> {
        match self {
            Node::List(items) if self.is_translation() => {
                printer.translation(|printer| printer.print(&items[1..]))
            }
            Node::List(items) => printer.list(|printer| printer.print(items)),
            Node::Atom(atom) => printer.print(atom),
        }
    }
}

impl Print for Forms<'_> {
    #[inline]
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), P::Error> {
        printer.print(self.as_slice())
    }
}

impl<T: Print + ?Sized> Print for &T {
    #[inline]
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), P::Error> {
        (*self).print(printer)
    }
}

impl<T: Print + ?Sized> Print for Box<T> {
    #[inline]
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), P::Error> {
        printer.print(self.as_ref())
    }
}

impl<T: Print + ?Sized> Print for Rc<T> {
    #[inline]
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), P::Error> {
        printer.print(self.as_ref())
    }
}

impl<T: Print + ?Sized> Print for Arc<T> {
    #[inline]
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), P::Error> {
        printer.print(self.as_ref())
    }
}

impl<T: Print> Print for [T] {
    #[inline]
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), P::Error> {
        for item in self {
            printer.print(item)?;
        }
        Ok(())
    }
}

impl<T: Print> Print for Vec<T> {
    #[inline]
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), P::Error> {
        printer.print(self.as_slice())
    }
}
