use std::collections::BTreeMap;

use crate::calculator::CalculatorCache;
use crate::constants::{ANSWER_KEY, VAR_NAMESPACE};
use crate::error::{CalcError, Result};
use crate::serde_compat::WireContext;
use crate::value::Value;

/// The `var` namespace: named values plus the latest result in `$ans`.
///
/// An entry may exist without a value; it persists as `null`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VariableContext {
    answer: Option<Value>,
    values: BTreeMap<String, Option<Value>>,
}

impl VariableContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        if key == ANSWER_KEY {
            return self.answer.as_ref();
        }
        self.values.get(key).and_then(Option::as_ref)
    }

    /// Store a user value. The answer slot is read-only.
    pub fn set(&mut self, key: &str, value: Value) -> Result<()> {
        if key == ANSWER_KEY {
            return Err(CalcError::Range(format!(
                "{VAR_NAMESPACE}.{ANSWER_KEY} is reserved for the latest result"
            )));
        }
        self.values.insert(key.to_string(), Some(value));
        Ok(())
    }

    /// Keep `key` in the namespace without a value.
    pub fn declare(&mut self, key: &str) {
        if key != ANSWER_KEY {
            self.values.entry(key.to_string()).or_insert(None);
        }
    }

    pub fn answer(&self) -> Option<&Value> {
        self.answer.as_ref()
    }

    pub fn record_answer(&mut self, value: Value) {
        self.answer = Some(value);
    }

    pub(crate) fn restore_answer(&mut self, value: Option<Value>) {
        self.answer = value;
    }

    pub(crate) fn restore_entry(&mut self, key: String, value: Option<Value>) {
        self.values.insert(key, value);
    }

    /// User entries in key order, excluding the answer slot.
    pub fn entries(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.values
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.answer.is_none()
    }

    /// Detached persisted form. The live context is untouched.
    pub fn save(&self) -> WireContext {
        WireContext::from_context(self)
    }

    /// Merge persisted entries over the current ones. Calculator references
    /// resolve through `cache`.
    pub fn load(&mut self, wire: WireContext, cache: &CalculatorCache) -> Result<()> {
        wire.merge_into(self, cache)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_set_and_get() {
        let mut ctx = VariableContext::new();
        ctx.set("x", Value::Number(5.0)).unwrap();
        assert_eq!(ctx.get("x"), Some(&Value::Number(5.0)));
        assert_eq!(ctx.get("y"), None);
    }

    #[test]
    fn test_answer_is_read_only() {
        let mut ctx = VariableContext::new();
        let err = ctx.set(ANSWER_KEY, Value::Number(1.0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);

        ctx.record_answer(Value::Bool(true));
        assert_eq!(ctx.get(ANSWER_KEY), Some(&Value::Bool(true)));
        assert_eq!(ctx.len(), 0);
    }

    #[test]
    fn test_declared_entry_has_no_value() {
        let mut ctx = VariableContext::new();
        ctx.declare("later");
        assert_eq!(ctx.get("later"), None);
        assert_eq!(ctx.entries().collect::<Vec<_>>(), vec![("later", None)]);

        ctx.set("later", Value::Number(2.0)).unwrap();
        ctx.declare("later");
        assert_eq!(ctx.get("later"), Some(&Value::Number(2.0)));
    }

    #[test]
    fn test_save_load_merges() {
        let cache = CalculatorCache::default();
        let mut saved = VariableContext::new();
        saved.set("a", Value::Number(1.0)).unwrap();
        saved.record_answer(Value::Number(3.0));
        let wire = saved.save();

        let mut ctx = VariableContext::new();
        ctx.set("b", Value::Bool(false)).unwrap();
        ctx.load(wire, &cache).unwrap();
        assert_eq!(ctx.get("a"), Some(&Value::Number(1.0)));
        assert_eq!(ctx.get("b"), Some(&Value::Bool(false)));
        assert_eq!(ctx.answer(), Some(&Value::Number(3.0)));
    }
}
