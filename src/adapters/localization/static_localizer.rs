//! Built-in localization tables.
//!
//! English and French texts for the generic dialog templates and the
//! Stardust order. Lookups fall back from the full tag (`fr-ca`) to its
//! language (`fr`) and finally to the default locale.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::domain::form::{render, template_ids};
use crate::domain::foundation::Locale;
use crate::domain::order::text_ids;
use crate::ports::{LocalizationError, Localizer};

type Table = HashMap<&'static str, &'static str>;

static ENGLISH: Lazy<Table> = Lazy::new(|| {
    HashMap::from([
        (template_ids::NOT_UNDERSTOOD, "I do not understand \"{0}\"."),
        (
            template_ids::OUT_OF_RANGE,
            "Please enter a value between {1} and {2} for {0}.",
        ),
        (template_ids::PATTERN_MISMATCH, "\"{0}\" is not a valid {1}."),
        (template_ids::REQUIRED, "A {0} is required."),
        (template_ids::NO_PREFERENCE, "None"),
        (template_ids::STATUS_HEADER, "Here is your order so far:"),
        (template_ids::UNSPECIFIED, "Unspecified"),
        (
            text_ids::WELCOME,
            "Welcome to Stardust coffee! Let's get your order started.",
        ),
        (text_ids::THANK_YOU, "Thanks for your order!"),
        (text_ids::PROCESSING, "We are processing your order..."),
        (text_ids::PROCESSED, "Your order has been processed. Enjoy!"),
        (
            text_ids::QUIT_ON,
            "You quit on {0}--maybe you can finish next time!",
        ),
        (
            text_ids::SHORT_CIRCUIT,
            "Sorry, I've had a short circuit.  Please try again.",
        ),
        (text_ids::COST, "Total for your coffee is ${0}. Is that ok?"),
        (text_ids::REPEAT_ORDER_PART1, "Do you want to order a {0} {1} {2}"),
        (text_ids::REPEAT_ORDER_PART2, " with {0}"),
        ("prompt_coffee", "What kind of {&} would you like? {||}"),
        ("prompt_temperature", "Which temperature do you want? {||}"),
        ("prompt_size", "What size do you want? {||}"),
        ("prompt_toppings", "Choose your toppings? {||}"),
        ("prompt_sugar", "Do you want some sugar? {||}"),
        ("prompt_name", "Please enter your {&}."),
        ("prompt_delivery_address", "Please enter your {&}."),
        ("prompt_phone_number", "Please enter your {&}."),
        (
            "prompt_delivery_time",
            "When should we deliver your coffee? (e.g. 14:30)",
        ),
        ("prompt_rating", "How would you rate {&} from 1 to 5?"),
        ("describe_coffee", "coffee"),
        ("describe_temperature", "temperature"),
        ("describe_size", "size"),
        ("describe_toppings", "toppings"),
        ("describe_sugar", "sugar"),
        ("describe_name", "name"),
        ("describe_delivery_address", "delivery address"),
        ("describe_phone_number", "phone number"),
        ("describe_delivery_time", "delivery time"),
        ("describe_rating", "your experience today"),
        (text_ids::DESCRIBE_COST, "price confirmation"),
        (text_ids::DESCRIBE_ORDER, "order confirmation"),
    ])
});

static FRENCH: Lazy<Table> = Lazy::new(|| {
    HashMap::from([
        (template_ids::NOT_UNDERSTOOD, "Je ne comprends pas \"{0}\"."),
        (
            template_ids::OUT_OF_RANGE,
            "Veuillez saisir une valeur entre {1} et {2} pour {0}.",
        ),
        (template_ids::PATTERN_MISMATCH, "\"{0}\" n'est pas un {1} valide."),
        (template_ids::REQUIRED, "Le champ {0} est obligatoire."),
        (template_ids::NO_PREFERENCE, "Aucun"),
        (template_ids::STATUS_HEADER, "Voici votre commande pour l'instant :"),
        (template_ids::UNSPECIFIED, "Non précisé"),
        (
            text_ids::WELCOME,
            "Bienvenue chez Stardust coffee ! Commençons votre commande.",
        ),
        (text_ids::THANK_YOU, "Merci pour votre commande !"),
        (text_ids::PROCESSING, "Nous préparons votre commande..."),
        (text_ids::PROCESSED, "Votre commande a été traitée. Bonne dégustation !"),
        (
            text_ids::QUIT_ON,
            "Vous avez abandonné à l'étape {0}. Vous pourrez terminer la prochaine fois !",
        ),
        (
            text_ids::SHORT_CIRCUIT,
            "Désolé, j'ai eu un court-circuit. Veuillez réessayer.",
        ),
        (
            text_ids::COST,
            "Le total pour votre café est de {0} $. Est-ce que cela vous convient ?",
        ),
        (text_ids::REPEAT_ORDER_PART1, "Voulez-vous commander : {2}, {1}, {0}"),
        (text_ids::REPEAT_ORDER_PART2, " avec {0}"),
        ("prompt_coffee", "Quelle sorte de {&} souhaitez-vous ? {||}"),
        ("prompt_temperature", "Quelle température voulez-vous ? {||}"),
        ("prompt_size", "Quelle taille voulez-vous ? {||}"),
        ("prompt_toppings", "Choisissez vos garnitures ? {||}"),
        ("prompt_sugar", "Voulez-vous du sucre ? {||}"),
        ("prompt_name", "Veuillez saisir votre {&}."),
        ("prompt_delivery_address", "Veuillez saisir votre {&}."),
        ("prompt_phone_number", "Veuillez saisir votre {&}."),
        (
            "prompt_delivery_time",
            "À quelle heure devons-nous livrer votre café ? (ex. 14:30)",
        ),
        ("prompt_rating", "Comment noteriez-vous {&} de 1 à 5 ?"),
        ("describe_coffee", "café"),
        ("describe_temperature", "température"),
        ("describe_size", "taille"),
        ("describe_toppings", "garnitures"),
        ("describe_sugar", "sucre"),
        ("describe_name", "nom"),
        ("describe_delivery_address", "adresse de livraison"),
        ("describe_phone_number", "numéro de téléphone"),
        ("describe_delivery_time", "heure de livraison"),
        ("describe_rating", "votre expérience du jour"),
        (text_ids::DESCRIBE_COST, "confirmation du prix"),
        (text_ids::DESCRIBE_ORDER, "confirmation de la commande"),
    ])
});

/// Localizer backed by the built-in tables.
#[derive(Debug, Clone)]
pub struct StaticLocalizer {
    fallback_language: String,
}

impl StaticLocalizer {
    /// Creates a localizer falling back to `default_locale`.
    ///
    /// A default without a table of its own falls back to English.
    pub fn new(default_locale: Locale) -> Self {
        Self {
            fallback_language: default_locale.language().to_string(),
        }
    }

    fn table(tag: &str) -> Option<&'static Table> {
        match tag {
            "en" => Some(&*ENGLISH),
            "fr" => Some(&*FRENCH),
            _ => None,
        }
    }

    fn resolve(&self, locale: &Locale) -> &'static Table {
        Self::table(locale.as_str())
            .or_else(|| Self::table(locale.language()))
            .or_else(|| Self::table(&self.fallback_language))
            .unwrap_or(&*ENGLISH)
    }
}

impl Default for StaticLocalizer {
    fn default() -> Self {
        Self {
            fallback_language: "en".to_string(),
        }
    }
}

impl Localizer for StaticLocalizer {
    fn lookup(
        &self,
        locale: &Locale,
        template_id: &str,
        args: &[&str],
    ) -> Result<String, LocalizationError> {
        let template = self.resolve(locale).get(template_id).ok_or_else(|| {
            LocalizationError::MissingTemplate {
                locale: locale.to_string(),
                template_id: template_id.to_string(),
            }
        })?;
        Ok(render(template, args))
    }

    fn supported_locales(&self) -> Vec<Locale> {
        ["en", "fr"]
            .iter()
            .filter_map(|tag| Locale::parse(tag).ok())
            .collect()
    }
}
