use std::convert::Infallible;

use crate::escape::{escape_string, format_bool, format_real};

use super::{Print, Printer};
use pretty::DocAllocator as _;

/// A pretty printer that uses the `pretty` crate to format the output.
struct PrettyPrinter<'a> {
    arena: &'a pretty::Arena<'a>,
    items: Vec<pretty::DocBuilder<'a, pretty::Arena<'a>>>,
}

impl<'a> PrettyPrinter<'a> {
    fn text(&mut self, text: String) {
        let doc = self.arena.text(text);
        self.items.push(doc);
    }

    fn delimited<F>(&mut self, open: &'static str, f: F) -> Result<(), Infallible>
    where
        F: FnOnce(&mut Self) -> Result<(), Infallible>,
    {
        let position = self.items.len();
        f(self)?;
        let items = self.items.drain(position..);

        let docs = self
            .arena
            .intersperse(items, self.arena.line())
            .nest(2)
            .group();

        self.items.push(
            self.arena
                .text(open)
                .append(docs)
                .append(self.arena.text(")")),
        );

        Ok(())
    }
}

impl<'a> Printer for PrettyPrinter<'a> {
    type Error = Infallible;

    fn symbol(&mut self, symbol: &str) -> Result<(), Self::Error> {
        self.text(symbol.to_string());
        Ok(())
    }

    fn string(&mut self, string: &str) -> Result<(), Self::Error> {
        self.text(escape_string(string));
        Ok(())
    }

    fn int(&mut self, int: i64) -> Result<(), Self::Error> {
        self.text(int.to_string());
        Ok(())
    }

    fn real(&mut self, real: f64) -> Result<(), Self::Error> {
        self.text(format_real(real));
        Ok(())
    }

    fn bool(&mut self, bool: bool) -> Result<(), Self::Error> {
        self.text(format_bool(bool).to_string());
        Ok(())
    }

    fn list<F>(&mut self, f: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>,
    {
        self.delimited("(", f)
    }

    fn translation<F>(&mut self, f: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>,
    {
        self.delimited("_(", f)
    }
}

/// Pretty print a `T` into an s-expression string, breaking lists that do
/// not fit into `width` columns. Top-level items are separated by blank lines.
pub fn to_string_pretty<T: Print>(value: T, width: usize) -> String {
    let arena = pretty::Arena::new();
    let mut printer = PrettyPrinter {
        items: vec![],
        arena: &arena,
    };

    let _ = value.print(&mut printer);

    let double_line = arena.line().append(arena.line());
    let doc = arena.intersperse(printer.items, double_line);

    let mut string = String::new();
    let _ = doc.render_fmt(width, &mut string);
    string
}
