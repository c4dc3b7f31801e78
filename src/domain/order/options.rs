//! Menu options of the Stardust coffee order.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Drink kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Coffee {
    Coffee,
    CaramelMacchiato,
    Mocha,
    Chocolate,
    Tea,
}

impl Coffee {
    pub fn all() -> &'static [Coffee] {
        &[
            Coffee::Coffee,
            Coffee::CaramelMacchiato,
            Coffee::Mocha,
            Coffee::Chocolate,
            Coffee::Tea,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Coffee::Coffee => "Coffee",
            Coffee::CaramelMacchiato => "CaramelMacchiato",
            Coffee::Mocha => "Mocha",
            Coffee::Chocolate => "Chocolate",
            Coffee::Tea => "Tea",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Temperature {
    Hot,
    Cold,
}

impl Temperature {
    pub fn all() -> &'static [Temperature] {
        &[Temperature::Hot, Temperature::Cold]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Temperature::Hot => "Hot",
            Temperature::Cold => "Cold",
        }
    }
}

/// Cup size, which alone determines the price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Size {
    Ristretto,
    Short,
    Medium,
    Long,
    Big,
}

impl Size {
    pub fn all() -> &'static [Size] {
        &[Size::Ristretto, Size::Short, Size::Medium, Size::Long, Size::Big]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Size::Ristretto => "Ristretto",
            Size::Short => "Short",
            Size::Medium => "Medium",
            Size::Long => "Long",
            Size::Big => "Big",
        }
    }

    /// Parses a stored choice value.
    pub fn from_value(value: &str) -> Option<Size> {
        Self::all().iter().copied().find(|s| s.as_str() == value)
    }

    /// Price in cents.
    pub fn price_cents(&self) -> u32 {
        match self {
            Size::Ristretto => 200,
            Size::Short => 349,
            Size::Medium => 500,
            Size::Long => 649,
            Size::Big => 899,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sugar {
    ALittleBitOfSugar,
    ALot,
}

impl Sugar {
    pub fn all() -> &'static [Sugar] {
        &[Sugar::ALittleBitOfSugar, Sugar::ALot]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sugar::ALittleBitOfSugar => "ALittleBitOfSugar",
            Sugar::ALot => "ALot",
        }
    }
}

/// Topping; `Everything` is the sentinel that selects all the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topping {
    Cream,
    Milk,
    Vanilla,
    Chocolate,
    Caramel,
    Everything,
}

impl Topping {
    pub fn all() -> &'static [Topping] {
        &[
            Topping::Cream,
            Topping::Milk,
            Topping::Vanilla,
            Topping::Chocolate,
            Topping::Caramel,
            Topping::Everything,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Topping::Cream => "Cream",
            Topping::Milk => "Milk",
            Topping::Vanilla => "Vanilla",
            Topping::Chocolate => "Chocolate",
            Topping::Caramel => "Caramel",
            Topping::Everything => "Everything",
        }
    }

    /// Words that select the sentinel, as in "everything but milk".
    pub fn sentinel_terms() -> &'static [&'static str] {
        &["except", "but", "not", "no", "all", "everything"]
    }
}

/// Formats cents as `3.49`.
pub fn format_price(cents: u32) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
