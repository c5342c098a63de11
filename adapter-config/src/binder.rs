//! Binding attribute sets onto adapter settings.
//!
//! Every bindable type publishes a static [`PropertySchema`]: the name of
//! its primary attribute, passed to construction positionally, and a
//! table of the other attributes it recognises with a setter for each.

use tracing::debug;

use crate::config::AdapterConfig;
use crate::error::{AdapterError, Result};

/// Setter converting a raw attribute value and storing it on `T`.
pub type Setter<T> = fn(&mut T, &str) -> std::result::Result<(), String>;

/// One recognised attribute.
pub struct Property<T: 'static> {
    pub name: &'static str,
    pub apply: Setter<T>,
}

impl<T> Property<T> {
    pub const fn new(name: &'static str, apply: Setter<T>) -> Self {
        Self { name, apply }
    }
}

/// Attributes understood by a bindable type.
pub struct PropertySchema<T: 'static> {
    /// Attribute consumed by [`Bindable::construct`] rather than a setter.
    pub primary: Option<&'static str>,

    /// Attributes applied through setters, if present.
    pub properties: &'static [Property<T>],
}

impl<T> PropertySchema<T> {
    /// Whether `name` is bound through a setter. The primary attribute
    /// never is.
    pub fn is_eligible(&self, name: &str) -> bool {
        self.primary != Some(name) && self.property(name).is_some()
    }

    pub fn property(&self, name: &str) -> Option<&Property<T>> {
        self.properties.iter().find(|property| property.name == name)
    }

    /// Names of all attributes this schema knows, primary first.
    pub fn attribute_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.primary
            .into_iter()
            .chain(self.properties.iter().map(|property| property.name))
    }
}

/// A type that can be built from an [`AdapterConfig`].
pub trait Bindable: Sized + 'static {
    fn schema() -> &'static PropertySchema<Self>;

    /// Construct from the primary attribute's value. `primary` is `Some`
    /// whenever the schema declares a primary attribute.
    fn construct(primary: Option<&str>) -> std::result::Result<Self, String>;
}

/// Builds [`Bindable`] values from attribute sets.
pub struct ConfigBinder;

impl ConfigBinder {
    /// Build a `T` from `config`.
    ///
    /// The primary attribute must be present and non-empty. Remaining
    /// attributes are applied in configuration order when the schema
    /// recognises them; anything else is ignored so newer configuration
    /// can be read by older adapters.
    pub fn bind<T: Bindable>(config: &AdapterConfig) -> Result<T> {
        let schema = T::schema();

        let primary = match schema.primary {
            Some(name) => match config.get(name) {
                Some(value) if !value.trim().is_empty() => Some(value),
                Some(_) => {
                    return Err(AdapterError::Configuration(format!(
                        "attribute `{name}` must not be empty"
                    )));
                }
                None => {
                    return Err(AdapterError::Configuration(format!(
                        "missing required attribute `{name}`"
                    )));
                }
            },
            None => None,
        };

        let mut target = T::construct(primary).map_err(AdapterError::Configuration)?;

        for (name, value) in config.iter() {
            if schema.primary == Some(name) {
                continue;
            }

            match schema.property(name) {
                Some(property) => (property.apply)(&mut target, value).map_err(|reason| {
                    AdapterError::Configuration(format!(
                        "invalid value `{value}` for attribute `{name}`: {reason}"
                    ))
                })?,
                None => debug!("Ignoring unrecognized attribute `{name}`"),
            }
        }

        Ok(target)
    }
}
