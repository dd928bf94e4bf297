//! The parsed tree and typed lookups over it.
//!
//! Documents are conventionally lists of *headed forms*: lists whose first
//! element is a symbol naming a field, followed by its values.
//!
//! ```text
//! (highscores
//!   (file-version 3)
//!   (colors 1.0 0.5 0.0))
//! ```
//!
//! Lookups never fail loudly. A missing field, a form with the wrong number
//! of values or a value of the wrong type all come back as `None`/`false`,
//! leaving the caller to fall back to a default.
use ordered_float::OrderedFloat;
use proptest::arbitrary::Arbitrary;
use smol_str::SmolStr;
use std::fmt;

/// Head symbol of a translatable form, as produced by `_( ... )`.
pub const TRANSLATION_HEAD: &str = "_";

/// A leaf value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Atom {
    String(SmolStr),
    Integer(i64),
    Real(OrderedFloat<f64>),
    Boolean(bool),
    Symbol(SmolStr),
}

/// A parsed s-expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    List(Vec<Node>),
    Atom(Atom),
}

impl Node {
    pub fn symbol(symbol: impl Into<SmolStr>) -> Self {
        Self::Atom(Atom::Symbol(symbol.into()))
    }

    pub fn as_list(&self) -> Option<&[Node]> {
        match self {
            Node::List(items) => Some(items),
            Node::Atom(_) => None,
        }
    }

    pub fn as_atom(&self) -> Option<&Atom> {
        match self {
            Node::Atom(atom) => Some(atom),
            Node::List(_) => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Node::Atom(Atom::Symbol(symbol)) => Some(symbol),
            _ => None,
        }
    }

    /// The naming symbol of a headed form.
    pub fn head(&self) -> Option<&str> {
        self.as_list()?.first()?.as_symbol()
    }

    /// Whether this is a list produced by `_( ... )`.
    pub fn is_translation(&self) -> bool {
        self.head() == Some(TRANSLATION_HEAD)
    }

    /// The children of a list, as [`Forms`]. Atoms have no forms.
    pub fn forms(&self) -> Forms<'_> {
        Forms::new(self.as_list().unwrap_or_default())
    }

    /// See [`Forms::get_list`].
    pub fn get_list(&self, name: &str) -> Option<Forms<'_>> {
        self.forms().get_list(name)
    }

    /// See [`Forms::get_value`].
    pub fn get_value<T: FromNode>(&self, name: &str, out: &mut T) -> bool {
        self.forms().get_value(name, out)
    }

    /// See [`Forms::value`].
    pub fn value<T: FromNode>(&self, name: &str) -> Option<T> {
        self.forms().value(name)
    }

    /// See [`Forms::values`].
    pub fn values<T: FromNode>(&self, name: &str) -> Option<Vec<T>> {
        self.forms().values(name)
    }

    /// Text of a string atom, or of a translation form holding exactly one string.
    fn text(&self) -> Option<&SmolStr> {
        match self {
            Node::Atom(Atom::String(string)) => Some(string),
            Node::List(items) if self.is_translation() => match items.as_slice() {
                [_, Node::Atom(Atom::String(string))] => Some(string),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Drops nested lists with a heap work list instead of recursion, so
/// releasing a deeply nested tree cannot exhaust the stack.
impl Drop for Node {
    fn drop(&mut self) {
        let Node::List(items) = self else {
            return;
        };
        if !items.iter().any(|item| matches!(item, Node::List(_))) {
            return;
        }

        let mut pending = std::mem::take(items);
        while let Some(mut node) = pending.pop() {
            if let Node::List(children) = &mut node {
                pending.append(children);
            }
        }
    }
}

/// A borrowed sequence of nodes, searched by form name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Forms<'a> {
    nodes: &'a [Node],
}

impl<'a> Forms<'a> {
    #[inline]
    pub fn new(nodes: &'a [Node]) -> Self {
        Self { nodes }
    }

    #[inline]
    pub fn as_slice(self) -> &'a [Node] {
        self.nodes
    }

    #[inline]
    pub fn len(self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.nodes.is_empty()
    }

    /// Values of the first form headed by `name`.
    fn find(self, name: &str) -> Option<&'a [Node]> {
        self.nodes.iter().find_map(|node| match node {
            Node::List(items) => match items.split_first() {
                Some((Node::Atom(Atom::Symbol(head)), rest)) if head.as_str() == name => {
                    Some(rest)
                }
                _ => None,
            },
            Node::Atom(_) => None,
        })
    }

    /// Finds the first form headed by `name` and returns the forms after its head.
    pub fn get_list(self, name: &str) -> Option<Forms<'a>> {
        self.find(name).map(Forms::new)
    }

    /// Stores the single value of the form named `name` into `out` if it has
    /// the right type, and reports whether it did. `out` is untouched on a miss.
    pub fn get_value<T: FromNode>(self, name: &str, out: &mut T) -> bool {
        match self.value(name) {
            Some(value) => {
                *out = value;
                true
            }
            None => false,
        }
    }

    /// The single value of the form named `name`, if it has the right type.
    pub fn value<T: FromNode>(self, name: &str) -> Option<T> {
        match self.find(name)? {
            [value] => T::from_node(value),
            _ => None,
        }
    }

    /// All values of the form named `name`, if every one has the right type.
    pub fn values<T: FromNode>(self, name: &str) -> Option<Vec<T>> {
        self.find(name)?.iter().map(T::from_node).collect()
    }

    /// Headed forms in source order, as `(name, values)` pairs.
    /// Nodes that are not headed forms are skipped.
    pub fn iter(self) -> impl Iterator<Item = (&'a str, Forms<'a>)> {
        self.nodes.iter().filter_map(|node| {
            let (head, rest) = node.as_list()?.split_first()?;
            Some((head.as_symbol()?, Forms::new(rest)))
        })
    }
}

/// Types that can be extracted from a single value node.
pub trait FromNode: Sized {
    /// Returns `None` if the node is not of this type.
    fn from_node(node: &Node) -> Option<Self>;
}

impl FromNode for i64 {
    fn from_node(node: &Node) -> Option<Self> {
        match node {
            Node::Atom(Atom::Integer(int)) => Some(*int),
            _ => None,
        }
    }
}

impl FromNode for i32 {
    fn from_node(node: &Node) -> Option<Self> {
        i64::from_node(node)?.try_into().ok()
    }
}

impl FromNode for u32 {
    fn from_node(node: &Node) -> Option<Self> {
        i64::from_node(node)?.try_into().ok()
    }
}

impl FromNode for f64 {
    fn from_node(node: &Node) -> Option<Self> {
        match node {
            Node::Atom(Atom::Real(real)) => Some(real.into_inner()),
            _ => None,
        }
    }
}

impl FromNode for f32 {
    fn from_node(node: &Node) -> Option<Self> {
        let real = f64::from_node(node)?;
        let narrowed = real as f32;
        if real.is_finite() && !narrowed.is_finite() {
            return None;
        }
        Some(narrowed)
    }
}

impl FromNode for bool {
    fn from_node(node: &Node) -> Option<Self> {
        match node {
            Node::Atom(Atom::Boolean(bool)) => Some(*bool),
            _ => None,
        }
    }
}

impl FromNode for SmolStr {
    fn from_node(node: &Node) -> Option<Self> {
        node.text().cloned()
    }
}

impl FromNode for String {
    fn from_node(node: &Node) -> Option<Self> {
        node.text().map(|text| text.to_string())
    }
}

impl FromNode for Node {
    fn from_node(node: &Node) -> Option<Self> {
        Some(node.clone())
    }
}

impl From<Atom> for Node {
    fn from(value: Atom) -> Self {
        Self::Atom(value)
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Self::Atom(Atom::Integer(value))
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Self::Atom(Atom::Real(value.into()))
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Self::Atom(Atom::Boolean(value))
    }
}

impl From<SmolStr> for Node {
    fn from(value: SmolStr) -> Self {
        Self::Atom(Atom::String(value))
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Self::Atom(Atom::String(value.into()))
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Self::Atom(Atom::String(value.into()))
    }
}

impl From<Vec<Node>> for Node {
    fn from(value: Vec<Node>) -> Self {
        Self::List(value)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::printer::to_string(self))
    }
}

impl Arbitrary for Node {
    type Parameters = ();
    type Strategy = proptest::strategy::BoxedStrategy<Self>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        use proptest::num::f64 as float;
        use proptest::prelude::*;

        let finite = float::POSITIVE | float::NEGATIVE | float::NORMAL | float::SUBNORMAL | float::ZERO;

        let leaf = proptest::prop_oneof![
            any::<String>().prop_map(Node::from),
            any::<i64>().prop_map(Node::from),
            finite.prop_map(Node::from),
            any::<bool>().prop_map(Node::from),
            "[a-z][a-z0-9-]{0,12}".prop_map(Node::symbol),
        ];

        leaf.prop_recursive(8, 256, 10, |inner| {
            proptest::collection::vec(inner, 0..10).prop_map(Node::List)
        })
        .boxed()
    }
}

#[cfg(test)]
mod test {
    use super::{Atom, Forms, Node};
    use crate::from_str;
    use rstest::rstest;
    use smol_str::SmolStr;

    const HIGHSCORES: &str = r#"
        (highscores
          (file-version 3)
          (number-entries 0)
          (ratio 0.75)
          (name "Tux")
          (title _("Best Times"))
          (enabled #t)
          (color 1.0 0.5 0.25)
          (levels "a" "b")
          (file-version 4)
          (entry (name "one") (score 10))
          (entry (name "two") (score 20)))
    "#;

    fn scores() -> Node {
        from_str(HIGHSCORES).unwrap()
    }

    #[test]
    fn lookup_headed_form() {
        let root = from_str("(highscores (file-version 3) (number-entries 0))").unwrap();
        let highscores = root.get_list("highscores").unwrap();

        let mut version = 0i64;
        assert!(highscores.get_value("file-version", &mut version));
        assert_eq!(3, version);

        let mut missing = 17i64;
        assert!(!highscores.get_value("missing-field", &mut missing));
        assert_eq!(17, missing);
    }

    #[test]
    fn get_list_strips_the_head() {
        let root = scores();
        let entry = root.get_list("highscores").unwrap().get_list("entry").unwrap();
        assert_eq!(2, entry.len());
        assert_eq!(Some("one".to_string()), entry.value("name"));
    }

    #[test]
    fn first_match_wins() {
        let root = scores();
        let highscores = root.get_list("highscores").unwrap();
        assert_eq!(Some(3), highscores.value::<i64>("file-version"));
        assert_eq!(Some(10), highscores.get_list("entry").unwrap().value::<i64>("score"));
    }

    #[rstest]
    #[case("file-version")]
    #[case("ratio")]
    #[case("name")]
    #[case("enabled")]
    #[case("color")]
    #[case("nope")]
    #[case("File-Version")]
    fn integer_misses(#[case] name: &str) {
        let root = scores();
        let highscores = root.get_list("highscores").unwrap();
        let expected = (name == "file-version").then_some(3i64);
        assert_eq!(expected, highscores.value::<i64>(name));
    }

    #[test]
    fn typed_values() {
        let root = scores();
        let highscores = root.get_list("highscores").unwrap();
        assert_eq!(Some(0.75), highscores.value::<f64>("ratio"));
        assert_eq!(Some(0.75f32), highscores.value::<f32>("ratio"));
        assert_eq!(Some("Tux".to_string()), highscores.value("name"));
        assert_eq!(Some(SmolStr::new("Tux")), highscores.value("name"));
        assert_eq!(Some(true), highscores.value("enabled"));
        assert_eq!(Some(3i32), highscores.value("file-version"));
        assert_eq!(Some(3u32), highscores.value("file-version"));
    }

    #[test]
    fn real_out_of_f32_range_is_a_miss() {
        let nodes = vec![
            Node::List(vec![Node::symbol("huge"), Node::from(1e300)]),
            Node::List(vec![Node::symbol("small"), Node::from(-1.5)]),
        ];
        let forms = Forms::new(&nodes);
        assert_eq!(None, forms.value::<f32>("huge"));
        assert_eq!(Some(1e300), forms.value::<f64>("huge"));
        assert_eq!(Some(-1.5f32), forms.value::<f32>("small"));

        let mut out = 2.0f32;
        assert!(!forms.get_value("huge", &mut out));
        assert_eq!(2.0, out);
    }

    #[test]
    fn infinite_reals_stay_infinite() {
        let nodes = vec![Node::List(vec![Node::symbol("x"), Node::from(f64::INFINITY)])];
        assert_eq!(Some(f32::INFINITY), Forms::new(&nodes).value::<f32>("x"));
    }

    #[test]
    fn dropping_a_deep_tree() {
        let mut node = Node::from(1i64);
        for _ in 0..200_000 {
            node = Node::List(vec![node, Node::symbol("x")]);
        }
        drop(node);
    }

    #[test]
    fn integers_are_not_reals() {
        let root = scores();
        let highscores = root.get_list("highscores").unwrap();
        assert_eq!(None, highscores.value::<f64>("file-version"));
        assert_eq!(None, highscores.value::<i64>("ratio"));
    }

    #[test]
    fn narrowing_overflow_is_a_miss() {
        let root = from_str("(big 5000000000) (neg -1)").unwrap();
        assert_eq!(None, root.value::<i32>("big"));
        assert_eq!(Some(5_000_000_000i64), root.value("big"));
        assert_eq!(None, root.value::<u32>("neg"));
    }

    #[test]
    fn translation_is_seen_through() {
        let root = scores();
        let highscores = root.get_list("highscores").unwrap();
        assert_eq!(Some("Best Times".to_string()), highscores.value("title"));
    }

    #[test]
    fn wrong_arity_is_a_miss() {
        let root = scores();
        let highscores = root.get_list("highscores").unwrap();
        assert_eq!(None, highscores.value::<f64>("color"));
        assert_eq!(None, highscores.value::<String>("levels"));
        assert_eq!(None, from_str("(empty)").unwrap().value::<i64>("empty"));
    }

    #[test]
    fn multiple_values() {
        let root = scores();
        let highscores = root.get_list("highscores").unwrap();
        assert_eq!(Some(vec![1.0, 0.5, 0.25]), highscores.values::<f64>("color"));
        assert_eq!(
            Some(vec!["a".to_string(), "b".to_string()]),
            highscores.values::<String>("levels")
        );
        assert_eq!(None, highscores.values::<i64>("color"));
        assert_eq!(Some(vec![]), from_str("(empty)").unwrap().values::<i64>("empty"));
    }

    #[test]
    fn iterate_forms() {
        let root = scores();
        let highscores = root.get_list("highscores").unwrap();
        let entries: Vec<i64> = highscores
            .iter()
            .filter(|(name, _)| *name == "entry")
            .filter_map(|(_, forms)| forms.value("score"))
            .collect();
        assert_eq!(vec![10, 20], entries);
    }

    #[test]
    fn iter_skips_unheaded_nodes() {
        let root = from_str(r#"(a 1) 5 ("b" 2) () (c)"#).unwrap();
        let names: Vec<&str> = root.forms().iter().map(|(name, _)| name).collect();
        assert_eq!(vec!["a", "c"], names);
    }

    #[test]
    fn atoms_have_no_forms() {
        let node = Node::from(5i64);
        assert!(node.forms().is_empty());
        assert!(node.get_list("x").is_none());
    }

    #[test]
    fn head_and_translation() {
        let root = from_str(r#"(greeting _("hi"))"#).unwrap();
        let greeting = &root.as_list().unwrap()[0];
        assert_eq!(Some("greeting"), greeting.head());
        let translation = &greeting.as_list().unwrap()[1];
        assert!(translation.is_translation());
        assert!(!greeting.is_translation());
        assert_eq!(
            Some(&Atom::String("hi".into())),
            translation.as_list().unwrap()[1].as_atom()
        );
    }

    #[test]
    fn forms_over_slice() {
        let nodes = vec![Node::List(vec![Node::symbol("x"), Node::from(true)])];
        assert_eq!(Some(true), Forms::new(&nodes).value("x"));
    }
}
