//! The partially filled record owned by one session.

use serde::Serialize;
use serde_json::{Map, Value};

use super::errors::FormError;
use super::field::FieldValue;

/// Storage state of one slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Slot {
    Unset,
    /// Recognized but not yet accepted by its validator.
    Pending(FieldValue),
    /// Accepted value, or `None` when the user chose no preference.
    Confirmed(Option<FieldValue>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct NamedSlot {
    name: String,
    slot: Slot,
}

/// One slot per declared field, in declaration order.
///
/// A slot only becomes `Confirmed` through `confirm` (after a `stage`) or
/// `skip`, so every confirmed value has been through validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRecord {
    slots: Vec<NamedSlot>,
}

impl OrderRecord {
    /// Creates a record with every slot unset.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            slots: names
                .into_iter()
                .map(|name| NamedSlot {
                    name: name.into(),
                    slot: Slot::Unset,
                })
                .collect(),
        }
    }

    /// Returns the slot for a field.
    pub fn slot(&self, name: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.name == name).map(|s| &s.slot)
    }

    /// Returns the confirmed value of a field, if any.
    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        match self.slot(name) {
            Some(Slot::Confirmed(Some(value))) => Some(value),
            _ => None,
        }
    }

    /// Returns the confirmed choice value of a field.
    pub fn choice(&self, name: &str) -> Option<&str> {
        self.value(name).and_then(FieldValue::as_choice)
    }

    /// Returns true once the field has been confirmed or skipped.
    pub fn is_answered(&self, name: &str) -> bool {
        matches!(self.slot(name), Some(Slot::Confirmed(_)))
    }

    /// Stores a recognized value awaiting validation.
    pub fn stage(&mut self, name: &str, value: FieldValue) -> Result<(), FormError> {
        *self.slot_mut(name)? = Slot::Pending(value);
        Ok(())
    }

    /// Confirms a staged slot with the validator's accepted value.
    pub fn confirm(&mut self, name: &str, value: Option<FieldValue>) -> Result<(), FormError> {
        let slot = self.slot_mut(name)?;
        if !matches!(slot, Slot::Pending(_)) {
            return Err(FormError::SlotNotPending(name.to_string()));
        }
        *slot = Slot::Confirmed(value);
        Ok(())
    }

    /// Confirms a slot as explicitly left without preference.
    pub fn skip(&mut self, name: &str) -> Result<(), FormError> {
        *self.slot_mut(name)? = Slot::Confirmed(None);
        Ok(())
    }

    /// Resets a slot to unset.
    pub fn clear(&mut self, name: &str) -> Result<(), FormError> {
        *self.slot_mut(name)? = Slot::Unset;
        Ok(())
    }

    /// Iterates over `(name, slot)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Slot)> {
        self.slots.iter().map(|s| (s.name.as_str(), &s.slot))
    }

    /// Flattens confirmed values into a JSON object, skipped fields as null.
    ///
    /// Unset and pending slots are omitted.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (name, slot) in self.iter() {
            if let Slot::Confirmed(value) = slot {
                let json = value
                    .as_ref()
                    .and_then(|v| serde_json::to_value(v).ok())
                    .and_then(|v| v.get("value").cloned())
                    .unwrap_or(Value::Null);
                map.insert(name.to_string(), json);
            }
        }
        Value::Object(map)
    }

    fn slot_mut(&mut self, name: &str) -> Result<&mut Slot, FormError> {
        self.slots
            .iter_mut()
            .find(|s| s.name == name)
            .map(|s| &mut s.slot)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))
    }
}
