//! Safe traversal of loosely-typed feed JSON
//!
//! A [`Node`] is a possibly-absent position inside a `serde_json::Value`.
//! Navigation never fails: stepping into a missing key, a `null`, or a value of
//! the wrong shape yields an absent node, and every scalar accessor on an absent
//! node returns `None`. This lets extractors write `entry.get("logo").get("file")
//! .get("url").string()` without a presence check at each level.

use regatta_common::model::lenient;
use serde_json::Value;

/// Possibly-absent position in a JSON document
#[derive(Debug, Clone, Copy, Default)]
pub struct Node<'a>(Option<&'a Value>);

impl<'a> Node<'a> {
    /// Wrap a value; `null` is treated as absent
    pub fn new(value: &'a Value) -> Self {
        Node(Some(value).filter(|v| !v.is_null()))
    }

    pub fn absent() -> Self {
        Node(None)
    }

    /// Child under `key` (absent unless this node is an object holding it)
    pub fn get(self, key: &str) -> Node<'a> {
        Node(self.0.and_then(|v| v.get(key)).filter(|v| !v.is_null()))
    }

    /// Element `index` of an array node
    pub fn at(self, index: usize) -> Node<'a> {
        Node(
            self.0
                .and_then(Value::as_array)
                .and_then(|items| items.get(index))
                .filter(|v| !v.is_null()),
        )
    }

    /// Array elements (empty for anything that is not an array)
    pub fn items(self) -> impl Iterator<Item = Node<'a>> {
        self.0
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .map(Node::new)
    }

    /// First node that carries a truthy value
    pub fn or(self, other: Node<'a>) -> Node<'a> {
        if self.is_truthy() {
            self
        } else {
            other
        }
    }

    pub fn is_present(self) -> bool {
        self.0.is_some()
    }

    pub fn is_object(self) -> bool {
        self.0.is_some_and(Value::is_object)
    }

    /// Present and not empty, zero, or false
    pub fn is_truthy(self) -> bool {
        match self.0 {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(a)) => !a.is_empty(),
            Some(Value::Object(o)) => !o.is_empty(),
        }
    }

    pub fn value(self) -> Option<&'a Value> {
        self.0
    }

    /// Owned copy of the value, for free-form content carried verbatim
    pub fn cloned(self) -> Option<Value> {
        self.0.cloned()
    }

    /// Scalar as text (numbers and booleans stringified)
    pub fn string(self) -> Option<String> {
        self.0.and_then(lenient::as_text)
    }

    /// Scalar as non-empty text
    pub fn text(self) -> Option<String> {
        self.string().filter(|s| !s.is_empty())
    }

    /// Number, string or boolean in its source form
    pub fn scalar(self) -> Option<Value> {
        self.0.and_then(lenient::as_scalar)
    }

    pub fn i64(self) -> Option<i64> {
        self.0.and_then(lenient::as_i64)
    }

    pub fn f64(self) -> Option<f64> {
        self.0.and_then(lenient::as_f64)
    }

    pub fn bool(self) -> Option<bool> {
        self.0.and_then(lenient::as_bool)
    }

    /// URL of a media asset node (`{"file": {"url": ...}}`)
    pub fn asset_url(self) -> Option<String> {
        self.get("file").get("url").string()
    }
}
