//! Static declaration of the Stardust order dialog.
//!
//! Field order: primary selections, optional modifiers, the price and
//! repeat-order confirms, then the remaining contact fields and a closing
//! message. Texts come from an `OrderTexts` resolved per locale.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::form::{
    humanize, render, ChoiceOption, CompiledDialog, CompletionCallback, ConfirmStep, FieldDescriptor,
    FieldKind, FieldValue, FormBuilder, FormError, OrderRecord, SchemaError, TextPattern,
};

use super::options::{format_price, Coffee, Size, Sugar, Temperature, Topping};

pub const ORDER_FORM_NAME: &str = "StardustOrder";

/// Slot names of the order record.
pub mod fields {
    pub const COFFEE: &str = "Coffee";
    pub const TEMPERATURE: &str = "Temperature";
    pub const SIZE: &str = "Size";
    pub const TOPPINGS: &str = "Toppings";
    pub const SUGAR: &str = "Sugar";
    pub const NAME: &str = "Name";
    pub const DELIVERY_ADDRESS: &str = "DeliveryAddress";
    pub const PHONE_NUMBER: &str = "PhoneNumber";
    pub const DELIVERY_TIME: &str = "DeliveryTime";
    pub const RATING: &str = "Rating";
}

/// Confirm step names, used in cancellation replies.
pub mod confirms {
    pub const COST: &str = "Cost";
    pub const ORDER: &str = "Order";
}

/// Identifiers of order-specific localized texts.
pub mod text_ids {
    pub const WELCOME: &str = "welcome";
    pub const THANK_YOU: &str = "thank_you";
    pub const PROCESSING: &str = "processing";
    pub const PROCESSED: &str = "processed";
    pub const QUIT_ON: &str = "quit_on";
    pub const SHORT_CIRCUIT: &str = "short_circuit";
    /// `{0}`: formatted price.
    pub const COST: &str = "cost";
    /// `{0}` size, `{1}` temperature, `{2}` drink.
    pub const REPEAT_ORDER_PART1: &str = "repeat_order_part1";
    /// `{0}`: the chosen extras.
    pub const REPEAT_ORDER_PART2: &str = "repeat_order_part2";
    pub const DESCRIBE_COST: &str = "describe_cost";
    pub const DESCRIBE_ORDER: &str = "describe_order";

    /// `(field, prompt id, description id)` for every order field.
    pub const FIELD_TEXTS: [(&str, &str, &str); 10] = [
        (super::fields::COFFEE, "prompt_coffee", "describe_coffee"),
        (super::fields::TEMPERATURE, "prompt_temperature", "describe_temperature"),
        (super::fields::SIZE, "prompt_size", "describe_size"),
        (super::fields::TOPPINGS, "prompt_toppings", "describe_toppings"),
        (super::fields::SUGAR, "prompt_sugar", "describe_sugar"),
        (super::fields::NAME, "prompt_name", "describe_name"),
        (super::fields::DELIVERY_ADDRESS, "prompt_delivery_address", "describe_delivery_address"),
        (super::fields::PHONE_NUMBER, "prompt_phone_number", "describe_phone_number"),
        (super::fields::DELIVERY_TIME, "prompt_delivery_time", "describe_delivery_time"),
        (super::fields::RATING, "prompt_rating", "describe_rating"),
    ];
}

pub const PHONE_PATTERN: &str = r"(\(\d{3}\))?\s*\d{3}(-|\s*)\d{4}";

/// Locale-resolved texts used to declare the order form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTexts {
    pub welcome: String,
    pub thank_you: String,
    pub cost: String,
    pub repeat_order_part1: String,
    pub repeat_order_part2: String,
    /// Descriptions of the price and order confirms.
    pub cost_description: String,
    pub order_description: String,
    prompts: HashMap<&'static str, String>,
    descriptions: HashMap<&'static str, String>,
}

impl OrderTexts {
    /// Resolves every text through `lookup`, keyed by `text_ids`.
    pub fn from_lookup<E, F>(mut lookup: F) -> Result<Self, E>
    where
        F: FnMut(&'static str) -> Result<String, E>,
    {
        let mut prompts = HashMap::new();
        let mut descriptions = HashMap::new();
        for (field, prompt_id, describe_id) in text_ids::FIELD_TEXTS {
            prompts.insert(field, lookup(prompt_id)?);
            descriptions.insert(field, lookup(describe_id)?);
        }
        Ok(Self {
            welcome: lookup(text_ids::WELCOME)?,
            thank_you: lookup(text_ids::THANK_YOU)?,
            cost: lookup(text_ids::COST)?,
            repeat_order_part1: lookup(text_ids::REPEAT_ORDER_PART1)?,
            repeat_order_part2: lookup(text_ids::REPEAT_ORDER_PART2)?,
            cost_description: lookup(text_ids::DESCRIBE_COST)?,
            order_description: lookup(text_ids::DESCRIBE_ORDER)?,
            prompts,
            descriptions,
        })
    }

    fn describe(&self, mut field: FieldDescriptor) -> FieldDescriptor {
        let name = field.name.as_str();
        if let Some(description) = self.descriptions.get(name) {
            field.description = description.clone();
        }
        if let Some(prompt) = self.prompts.get(name) {
            field.prompt = prompt.clone();
        }
        field
    }
}

/// Declares the order fields in record order.
pub fn order_fields() -> Result<Vec<FieldDescriptor>, SchemaError> {
    let choice = |values: Vec<&'static str>| FieldKind::Choice {
        options: values.into_iter().map(ChoiceOption::new).collect(),
    };
    let toppings = Topping::all()
        .iter()
        .map(|t| match t {
            Topping::Everything => {
                ChoiceOption::new(t.as_str()).with_terms(Topping::sentinel_terms().iter().copied())
            }
            _ => ChoiceOption::new(t.as_str()),
        })
        .collect();

    Ok(vec![
        FieldDescriptor::new(fields::COFFEE, choice(Coffee::all().iter().map(Coffee::as_str).collect())),
        FieldDescriptor::new(
            fields::TEMPERATURE,
            choice(Temperature::all().iter().map(Temperature::as_str).collect()),
        ),
        FieldDescriptor::new(fields::SIZE, choice(Size::all().iter().map(Size::as_str).collect())),
        FieldDescriptor::new(
            fields::TOPPINGS,
            FieldKind::MultiChoice {
                options: toppings,
                all_option: Some(Topping::Everything.as_str().to_string()),
            },
        )
        .optional(),
        FieldDescriptor::new(fields::SUGAR, choice(Sugar::all().iter().map(Sugar::as_str).collect()))
            .optional(),
        FieldDescriptor::new(fields::NAME, FieldKind::Text { pattern: None }),
        FieldDescriptor::new(fields::DELIVERY_ADDRESS, FieldKind::Text { pattern: None }),
        FieldDescriptor::new(
            fields::PHONE_NUMBER,
            FieldKind::Text {
                pattern: Some(TextPattern::new(fields::PHONE_NUMBER, PHONE_PATTERN)?),
            },
        ),
        FieldDescriptor::new(fields::DELIVERY_TIME, FieldKind::DateTime)
            .optional()
            .with_display("{&}: {:t}"),
        FieldDescriptor::new(
            fields::RATING,
            FieldKind::Number {
                min: Some(1.0),
                max: Some(5.0),
            },
        )
        .optional()
        .with_description("your experience today"),
    ])
}

/// Starts a builder with the full order declaration and plan.
pub fn order_form_builder(texts: &OrderTexts) -> Result<FormBuilder, SchemaError> {
    let mut builder = FormBuilder::new(ORDER_FORM_NAME);
    for field in order_fields()? {
        builder = builder.declare(texts.describe(field));
    }
    Ok(builder
        .message(texts.welcome.clone())
        .field(fields::COFFEE)
        .field(fields::TEMPERATURE)
        .field(fields::SIZE)
        .field(fields::SUGAR)
        .field(fields::TOPPINGS)
        .confirm(cost_confirm(texts.cost_description.clone(), texts.cost.clone()))
        .confirm(order_confirm(
            texts.order_description.clone(),
            texts.repeat_order_part1.clone(),
            texts.repeat_order_part2.clone(),
        ))
        .add_remaining_fields()
        .message(texts.thank_you.clone()))
}

/// Compiles the order dialog.
pub fn build_order_form(
    texts: &OrderTexts,
    on_completion: Option<Arc<dyn CompletionCallback>>,
) -> Result<CompiledDialog, SchemaError> {
    let builder = order_form_builder(texts)?;
    match on_completion {
        Some(callback) => builder.on_completion(callback),
        None => builder,
    }
    .build()
}

/// Price of the order in cents, from the chosen size.
pub fn order_total_cents(record: &OrderRecord) -> Result<u32, FormError> {
    record
        .choice(fields::SIZE)
        .and_then(Size::from_value)
        .map(|size| size.price_cents())
        .ok_or_else(|| FormError::Prompt {
            step: confirms::COST.to_string(),
            reason: "size is not set".to_string(),
        })
}

fn cost_confirm(description: String, template: String) -> ConfirmStep {
    ConfirmStep::new(confirms::COST, description, move |record: &OrderRecord| {
        let total = format_price(order_total_cents(record)?);
        Ok(render(&template, &[&total]))
    })
}

fn order_confirm(description: String, part1: String, part2: String) -> ConfirmStep {
    ConfirmStep::new(confirms::ORDER, description, move |record: &OrderRecord| {
        let label = |field: &str| {
            record
                .choice(field)
                .map(|v| humanize(v).to_lowercase())
                .unwrap_or_default()
        };
        let mut text = render(
            &part1,
            &[&label(fields::SIZE), &label(fields::TEMPERATURE), &label(fields::COFFEE)],
        );

        let mut extras: Vec<String> = Vec::new();
        if let Some(FieldValue::Choice(sugar)) = record.value(fields::SUGAR) {
            extras.push(humanize(sugar).to_lowercase());
        }
        if let Some(FieldValue::Choices(toppings)) = record.value(fields::TOPPINGS) {
            extras.extend(toppings.iter().map(|t| humanize(t).to_lowercase()));
        }
        if !extras.is_empty() {
            text.push_str(&render(&part2, &[&extras.join(", ")]));
        }
        text.push('?');
        Ok(text)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::form::{DialogState, Step};

    fn english_texts() -> OrderTexts {
        OrderTexts::from_lookup(|id| -> Result<String, String> {
            Ok(match id {
                text_ids::WELCOME => "Welcome!".to_string(),
                text_ids::THANK_YOU => "Thanks!".to_string(),
                text_ids::COST => "Total is ${0}, ok?".to_string(),
                text_ids::REPEAT_ORDER_PART1 => "Order a {0} {1} {2}".to_string(),
                text_ids::REPEAT_ORDER_PART2 => " with {0}".to_string(),
                other if other.starts_with("describe_") => other.trim_start_matches("describe_").replace('_', " "),
                _ => "Please enter {&} {||}".to_string(),
            })
        })
        .unwrap()
    }

    fn record_with(values: &[(&str, FieldValue)]) -> OrderRecord {
        let mut record = OrderRecord::new(order_fields().unwrap().into_iter().map(|f| f.name));
        for (name, value) in values {
            record.stage(name, value.clone()).unwrap();
            record.confirm(name, Some(value.clone())).unwrap();
        }
        record
    }

    fn choice(v: &str) -> FieldValue {
        FieldValue::Choice(v.to_string())
    }

    #[test]
    fn steps_follow_order_layout() {
        let dialog = build_order_form(&english_texts(), None).unwrap();
        let names: Vec<String> = dialog
            .steps()
            .iter()
            .map(|s| match s {
                Step::Message(text) => text.clone(),
                Step::Field { field, .. } => dialog.fields()[*field].name.clone(),
                Step::Confirm { confirm } => dialog.confirms()[*confirm].name.clone(),
            })
            .collect();
        assert_eq!(
            names,
            vec![
                "Welcome!",
                "Coffee",
                "Temperature",
                "Size",
                "Sugar",
                "Toppings",
                "Cost",
                "Order",
                "Name",
                "DeliveryAddress",
                "PhoneNumber",
                "DeliveryTime",
                "Rating",
                "Thanks!"
            ]
        );
    }

    #[test]
    fn cost_prompt_follows_size() {
        let step = cost_confirm("cost".into(), "Total is ${0}, ok?".into());
        assert_eq!(
            step.prompt(&record_with(&[(fields::SIZE, choice("Short"))])).unwrap(),
            "Total is $3.49, ok?"
        );
        assert_eq!(
            step.prompt(&record_with(&[(fields::SIZE, choice("Big"))])).unwrap(),
            "Total is $8.99, ok?"
        );
    }

    #[test]
    fn cost_prompt_without_size_is_a_fault() {
        let step = cost_confirm("cost".into(), "{0}".into());
        assert!(matches!(
            step.prompt(&record_with(&[])),
            Err(FormError::Prompt { .. })
        ));
    }

    #[test]
    fn repeat_order_adds_extras_only_when_chosen() {
        let step = order_confirm(
            "order".into(),
            "Order a {0} {1} {2}".into(),
            " with {0}".into(),
        );
        let plain = record_with(&[
            (fields::SIZE, choice("Big")),
            (fields::TEMPERATURE, choice("Hot")),
            (fields::COFFEE, choice("CaramelMacchiato")),
        ]);
        assert_eq!(step.prompt(&plain).unwrap(), "Order a big hot caramel macchiato?");

        let extras = record_with(&[
            (fields::SIZE, choice("Short")),
            (fields::TEMPERATURE, choice("Cold")),
            (fields::COFFEE, choice("Mocha")),
            (fields::SUGAR, choice("ALot")),
            (
                fields::TOPPINGS,
                FieldValue::Choices(vec!["Milk".into(), "Vanilla".into()]),
            ),
        ]);
        assert_eq!(
            step.prompt(&extras).unwrap(),
            "Order a short cold mocha with a lot, milk, vanilla?"
        );
    }

    #[test]
    fn phone_number_must_be_the_whole_answer() {
        let pattern = TextPattern::new(fields::PHONE_NUMBER, PHONE_PATTERN).unwrap();
        assert!(pattern.is_match("(555) 123-4567"));
        assert!(pattern.is_match("555 1234"));
        assert!(!pattern.is_match("my number is 555-1234"));
    }

    #[test]
    fn rating_uses_experience_description() {
        let fields = order_fields().unwrap();
        let rating = fields.iter().find(|f| f.name == fields::RATING).unwrap();
        assert_eq!(rating.description, "your experience today");
        assert!(rating.optional);
    }

    #[test]
    fn confirm_descriptions_come_from_texts() {
        let mut texts = english_texts();
        texts.cost_description = "confirmation du prix".to_string();
        let dialog = build_order_form(&texts, None).unwrap();
        assert_eq!(dialog.describe(confirms::COST), Some("confirmation du prix"));
        assert_eq!(dialog.describe(confirms::ORDER), Some("order"));
    }

    #[test]
    fn delivery_time_status_shows_short_time() {
        let fields = order_fields().unwrap();
        let delivery = fields.iter().find(|f| f.name == fields::DELIVERY_TIME).unwrap();
        assert_eq!(delivery.display, "{&}: {:t}");
    }

    #[test]
    fn fresh_dialog_starts_at_first_field() {
        let dialog = build_order_form(&english_texts(), None).unwrap();
        assert_eq!(dialog.fields()[0].name, fields::COFFEE);
        assert_eq!(DialogState::initial(), DialogState::AwaitingField { field: 0 });
    }
}
