use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use rg_lang::{Type, Value};

use crate::error::BindingError;

/// A host type with a stable binding name, usable with [`Bindings::push_typed`].
pub trait TypedInput {
    const BINDING: &'static str;

    fn into_value(self) -> Value;
}

/// Named runtime inputs for one `run` call, kept sorted by name.
///
/// The sorted order fixes the slot order of input symbols, so it must stay
/// the same from one call to the next for a given set of names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    values: BTreeMap<String, Value>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `value`. Blank and repeated names are rejected.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Result<(), BindingError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(BindingError::BlankName);
        }
        match self.values.entry(name) {
            Entry::Occupied(e) => Err(BindingError::Duplicate(e.key().clone())),
            Entry::Vacant(e) => {
                e.insert(value.into());
                Ok(())
            }
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Result<Self, BindingError> {
        self.insert(name, value)?;
        Ok(self)
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, BindingError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut bindings = Self::new();
        for (name, value) in pairs {
            bindings.insert(name, value)?;
        }
        Ok(bindings)
    }

    /// Key every value by its type name. Anonymous records and `null` have no
    /// type name and are rejected, as are two values sharing a type name.
    pub fn auto_keyed<I>(values: I) -> Result<Self, BindingError>
    where
        I: IntoIterator<Item = Value>,
    {
        let mut bindings = Self::new();
        for value in values {
            let name = value.type_name().ok_or(BindingError::Anonymous)?.to_string();
            bindings.insert(name, value)?;
        }
        Ok(bindings)
    }

    /// Bind a host value under its declared [`TypedInput::BINDING`] name.
    pub fn push_typed<T: TypedInput>(&mut self, input: T) -> Result<(), BindingError> {
        self.insert(T::BINDING, input.into_value())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Values in name order, i.e. the slot order of input symbols.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.values.values()
    }

    /// Names with their concrete run-time types, in name order.
    pub fn shape(&self) -> Vec<(String, Type)> {
        self.values
            .iter()
            .map(|(k, v)| (k.clone(), v.type_of()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use rg_lang::Record;

    use super::*;

    struct Car {
        price: i64,
    }

    impl TypedInput for Car {
        const BINDING: &'static str = "Car";

        fn into_value(self) -> Value {
            Record::named("Car").with("Price", self.price).into()
        }
    }

    #[test]
    fn blank_and_duplicate_names_rejected() {
        let mut b = Bindings::new();
        assert_eq!(b.insert("  ", 1), Err(BindingError::BlankName));
        b.insert("X", 1).unwrap();
        assert_eq!(b.insert("X", 2), Err(BindingError::Duplicate("X".into())));
    }

    #[test]
    fn names_iterate_sorted() {
        let b = Bindings::from_pairs([("b", 2), ("a", 1), ("c", 3)]).unwrap();
        let names: Vec<_> = b.iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn auto_keyed_uses_type_names() {
        let b = Bindings::auto_keyed([
            Value::from(Record::named("Person").with("Age", 30)),
            Value::Int(2025),
        ])
        .unwrap();
        assert!(b.get("Person").is_some());
        assert_eq!(b.get("Int"), Some(&Value::Int(2025)));
    }

    #[test]
    fn auto_keyed_rejects_anonymous_and_repeats() {
        let anon = Value::from(Record::anonymous().with("Age", 30));
        assert_eq!(Bindings::auto_keyed([anon]), Err(BindingError::Anonymous));
        assert_eq!(
            Bindings::auto_keyed([Value::Int(1), Value::Int(2)]),
            Err(BindingError::Duplicate("Int".into()))
        );
    }

    #[test]
    fn typed_inputs_bind_by_declared_name() {
        let mut b = Bindings::new();
        b.push_typed(Car { price: 9000 }).unwrap();
        assert_eq!(b.shape()[0].0, "Car");
    }
}
