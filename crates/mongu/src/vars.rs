use serde_json::{Map, Value};

/// Variable scope.
///
/// A scope is never mutated once built. Operators that bind names (`$let`,
/// `$map`, `$filter`, `$reduce`, `$sortArray`) create a child frame that
/// overlays the new bindings on top of its parent; lookups walk from the
/// innermost frame outwards. Dropping the child leaves the parent exactly as
/// it was.
#[derive(Debug, Default)]
pub struct Vars<'p> {
    bindings: Map<String, Value>,
    parent: Option<&'p Vars<'p>>,
}

impl<'p> Vars<'p> {
    pub fn new(bindings: Map<String, Value>) -> Self {
        Vars {
            bindings,
            parent: None,
        }
    }

    /// Scope with no bindings at all.
    pub fn empty() -> Self {
        Vars::default()
    }

    /// Overlays `bindings` on top of this scope.
    pub fn child(&self, bindings: Map<String, Value>) -> Vars<'_> {
        Vars {
            bindings,
            parent: Some(self),
        }
    }

    /// Child scope with a single binding.
    pub fn bind(&self, name: impl Into<String>, value: Value) -> Vars<'_> {
        let mut bindings = Map::new();
        bindings.insert(name.into(), value);
        self.child(bindings)
    }

    /// Returns the value bound to `name` in the innermost frame that has it.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let mut frame = Some(self);
        while let Some(vars) = frame {
            if let Some(value) = vars.bindings.get(name) {
                return Some(value);
            }
            frame = vars.parent;
        }
        None
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Resolves a variable reference such as `$user.name` or `$$item.tags.0`.
    ///
    /// The leading `$` is stripped and the rest is split on `.`. The first
    /// segment names a binding; each further segment descends into an object
    /// key or an in-bounds array index. Returns `None` as soon as a segment
    /// cannot be followed. The value found is returned as stored.
    pub fn find(&self, reference: &str) -> Option<&Value> {
        let path = reference.strip_prefix('$').unwrap_or(reference);
        let mut segments = path.split('.');
        let head = segments.next()?;
        let mut current = self.get(head)?;
        for segment in segments {
            current = step(current, segment)?;
        }
        Some(current)
    }
}

impl From<Map<String, Value>> for Vars<'_> {
    fn from(bindings: Map<String, Value>) -> Self {
        Vars::new(bindings)
    }
}

fn step<'v>(value: &'v Value, segment: &str) -> Option<&'v Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => {
            if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            segment.parse::<usize>().ok().and_then(|i| items.get(i))
        }
        _ => None,
    }
}
