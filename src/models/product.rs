//! Product model
//!
//! Catalogue items with a price and optional links to a provider and a
//! category. When saving, the links can be given either as an existing id
//! or as a name to find-or-create in the same transaction.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{CategoryId, ProductId, ProviderId};
use super::money::Money;
use super::validation::{
    check_name, check_non_negative, optional_text, required_name, ValidationError,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    pub provider_id: Option<ProviderId>,
    pub category_id: Option<CategoryId>,
    pub observations: Option<String>,
}

impl Product {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_name("Product name", &self.name)?;
        check_non_negative("Price", self.price)
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.price)
    }
}

/// A product joined with the names of its provider and category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductListing {
    pub product: Product,
    pub provider_name: Option<String>,
    pub category_name: Option<String>,
}

/// How a product refers to a parent row when it is saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentRef<I> {
    /// An existing row, which must be present at write time
    Existing(I),
    /// A name matched case-insensitively; created when absent
    ByName(String),
}

/// Input for creating or updating a product
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub price: Money,
    pub provider: Option<ParentRef<ProviderId>>,
    pub category: Option<ParentRef<CategoryId>>,
    pub observations: Option<String>,
}

impl ProductDraft {
    pub fn new(name: impl Into<String>, price: Money) -> Self {
        Self {
            name: name.into(),
            price,
            provider: None,
            category: None,
            observations: None,
        }
    }

    pub fn with_provider(mut self, id: ProviderId) -> Self {
        self.provider = Some(ParentRef::Existing(id));
        self
    }

    pub fn with_provider_name(mut self, name: impl Into<String>) -> Self {
        self.provider = Some(ParentRef::ByName(name.into()));
        self
    }

    pub fn with_category(mut self, id: CategoryId) -> Self {
        self.category = Some(ParentRef::Existing(id));
        self
    }

    pub fn with_category_name(mut self, name: impl Into<String>) -> Self {
        self.category = Some(ParentRef::ByName(name.into()));
        self
    }

    pub fn with_observations(mut self, observations: impl Into<String>) -> Self {
        self.observations = Some(observations.into());
        self
    }

    /// Trim and validate every field. A blank parent name means "no parent".
    pub fn normalize(self) -> Result<Self, ValidationError> {
        check_non_negative("Price", self.price)?;
        Ok(Self {
            name: required_name("Product name", &self.name)?,
            price: self.price,
            provider: normalize_ref(self.provider, "Provider name")?,
            category: normalize_ref(self.category, "Category name")?,
            observations: optional_text(self.observations),
        })
    }
}

fn normalize_ref<I>(
    parent: Option<ParentRef<I>>,
    field: &'static str,
) -> Result<Option<ParentRef<I>>, ValidationError> {
    match parent {
        Some(ParentRef::ByName(name)) if name.trim().is_empty() => Ok(None),
        Some(ParentRef::ByName(name)) => {
            Ok(Some(ParentRef::ByName(required_name(field, &name)?)))
        }
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_price_rejected() {
        let draft = ProductDraft::new("Widget", Money::from_cents(-1));
        assert_eq!(
            draft.normalize(),
            Err(ValidationError::NegativeAmount("Price"))
        );
    }

    #[test]
    fn test_zero_price_allowed() {
        assert!(ProductDraft::new("Sample", Money::zero()).normalize().is_ok());
    }

    #[test]
    fn test_blank_parent_name_is_none() {
        let draft = ProductDraft::new("Widget", Money::from_cents(4999))
            .with_provider_name("   ")
            .with_category_name(" Tools ")
            .normalize()
            .unwrap();
        assert!(draft.provider.is_none());
        assert_eq!(draft.category, Some(ParentRef::ByName("Tools".into())));
    }
}
