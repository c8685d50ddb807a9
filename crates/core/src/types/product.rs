//! Catalog products.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// A product as served by the catalog API.
///
/// Products are immutable once loaded; the catalog is only ever replaced
/// wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Opaque product identifier.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Long-form description shown in the preview.
    #[serde(default)]
    pub description: String,
    /// Price, or priceless.
    #[serde(default)]
    pub price: Price,
    /// Catalog category.
    pub category: Category,
    /// Image URL. Relative on the wire; absolute once the API client has
    /// applied the CDN prefix.
    pub image: String,
}

/// Product category.
///
/// The API uses Russian labels on the wire. The English names are accepted
/// on input so fixtures and configuration can use either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Category {
    #[default]
    #[serde(rename = "другое", alias = "other")]
    Other,
    #[serde(rename = "софт-скил", alias = "soft-skill")]
    SoftSkill,
    #[serde(rename = "хард-скил", alias = "hard-skill")]
    HardSkill,
    #[serde(rename = "кнопка", alias = "button")]
    Button,
    #[serde(rename = "дополнительное", alias = "additional")]
    Additional,
}

impl Category {
    /// Stable English identifier (used for styling hooks and logs).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Other => "other",
            Self::SoftSkill => "soft-skill",
            Self::HardSkill => "hard-skill",
            Self::Button => "button",
            Self::Additional => "additional",
        }
    }

    /// Label as shown to shoppers.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Other => "другое",
            Self::SoftSkill => "софт-скил",
            Self::HardSkill => "хард-скил",
            Self::Button => "кнопка",
            Self::Additional => "дополнительное",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "other" | "другое" => Ok(Self::Other),
            "soft-skill" | "софт-скил" => Ok(Self::SoftSkill),
            "hard-skill" | "хард-скил" => Ok(Self::HardSkill),
            "button" | "кнопка" => Ok(Self::Button),
            "additional" | "дополнительное" => Ok(Self::Additional),
            _ => Err(format!("invalid category: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_api_product() {
        let json = r#"{
            "id": "854cef69-976d-4c2a-a18c-2aa45046c390",
            "description": "Если планируете решать задачи в тренажёре, берите два.",
            "image": "/5_Dots.svg",
            "title": "+1 час в сутках",
            "category": "софт-скил",
            "price": 750
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id.as_str(), "854cef69-976d-4c2a-a18c-2aa45046c390");
        assert_eq!(product.category, Category::SoftSkill);
        assert_eq!(product.price, Price::from_units(750));
        assert_eq!(product.image, "/5_Dots.svg");
    }

    #[test]
    fn test_deserialize_priceless_product() {
        let json = r#"{
            "id": "b06cde61-912f-4663-9751-09956c0eed67",
            "description": "Будет стоять над душой и не давать прокрастинировать.",
            "image": "/Asterisk_2.svg",
            "title": "Мамка-таймер",
            "category": "другое",
            "price": null
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert!(product.price.is_priceless());
        assert_eq!(product.category, Category::Other);
    }

    #[test]
    fn test_category_accepts_english_alias() {
        let category: Category = serde_json::from_str("\"hard-skill\"").unwrap();
        assert_eq!(category, Category::HardSkill);
        assert_eq!(serde_json::to_string(&category).unwrap(), "\"хард-скил\"");
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("button".parse::<Category>().unwrap(), Category::Button);
        assert_eq!("дополнительное".parse::<Category>().unwrap(), Category::Additional);
        assert!("gadget".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_display() {
        assert_eq!(Category::SoftSkill.to_string(), "soft-skill");
        assert_eq!(Category::SoftSkill.label(), "софт-скил");
    }
}
