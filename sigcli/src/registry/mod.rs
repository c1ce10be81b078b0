//! Conversion, validation and composite lookup tables.
//!
//! A [`Registry`] is assembled once through [`RegistryBuilder`] and is
//! immutable afterwards; clones share the same tables. Commands are built
//! against an explicit registry or against the process-wide one published
//! with [`install`].
//!
//! ```
//! use sigcli::registry::Registry;
//! use sigcli::{TypeTag, ValidationError, Value};
//!
//! let registry = Registry::builder()
//!     .validation(TypeTag::Int, |value| match value {
//!         Value::Int(n) if *n < 0 => Err(ValidationError::new("must not be negative")),
//!         _ => Ok(()),
//!     })
//!     .build();
//! assert_eq!(registry.validations(&TypeTag::Int).len(), 1);
//! ```

mod composite;
mod convert;

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, LazyLock, OnceLock};

use tracing::debug;

pub use composite::{CompositeDescriptor, Constructor};
pub use convert::{Conversion, Converter};

use crate::error::ValidationError;
use crate::options::CompositeOptions;
use crate::signature::{Annotation, Parameters, TypeTag};
use crate::value::{Value, short_type_name};

/// Checks a single parsed value of a registered type.
pub type ValueCheck = Arc<dyn Fn(&Value) -> Result<(), ValidationError> + Send + Sync>;

#[derive(Clone, Default)]
struct Tables {
    names: BTreeMap<String, Annotation>,
    conversions: HashMap<TypeTag, Converter>,
    validations: HashMap<TypeTag, Vec<ValueCheck>>,
    composites: HashMap<TypeTag, CompositeDescriptor>,
}

/// Immutable set of lookup tables consulted while building commands.
#[derive(Clone)]
pub struct Registry {
    tables: Arc<Tables>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("names", &self.tables.names.keys().collect::<Vec<_>>())
            .field("conversions", &self.tables.conversions.len())
            .field("validations", &self.tables.validations.len())
            .field("composites", &self.tables.composites.len())
            .finish()
    }
}

static BUILTIN: LazyLock<Registry> = LazyLock::new(|| Registry::builder().build());
static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// Publishes `registry` as the process-wide registry.
///
/// # Errors
///
/// Returns the rejected registry when one was already installed.
pub fn install(registry: Registry) -> Result<(), Registry> {
    GLOBAL.set(registry)
}

/// The installed registry, or the built-in one when none was installed.
#[must_use]
pub fn global() -> Registry {
    GLOBAL.get().unwrap_or(&*BUILTIN).clone()
}

impl Default for Registry {
    fn default() -> Self {
        BUILTIN.clone()
    }
}

impl Registry {
    /// Builder pre-populated with the built-in names and conversions.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        let mut builder = RegistryBuilder {
            tables: Tables::default(),
        };
        for (tag, func) in convert::builtins() {
            builder = builder.install_conversion(tag, func);
        }
        for (name, tag) in [
            ("String", TypeTag::Str),
            ("i64", TypeTag::Int),
            ("f64", TypeTag::Float),
            ("PathBuf", TypeTag::Path),
            ("None", TypeTag::None),
        ] {
            builder = builder.type_name(name, Annotation::of(tag));
        }
        builder
    }

    /// Builder seeded with this registry's tables.
    #[must_use]
    pub fn to_builder(&self) -> RegistryBuilder {
        RegistryBuilder {
            tables: (*self.tables).clone(),
        }
    }

    /// Annotation bound to `name` in the type namespace.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Annotation> {
        self.tables.names.get(name)
    }

    /// Conversion registered for `tag`.
    #[must_use]
    pub fn conversion(&self, tag: &TypeTag) -> Option<&Converter> {
        self.tables.conversions.get(tag)
    }

    /// Validations registered for `tag`, in registration order.
    #[must_use]
    pub fn validations(&self, tag: &TypeTag) -> &[ValueCheck] {
        self.tables.validations.get(tag).map_or(&[], Vec::as_slice)
    }

    /// Composite registered for `tag`.
    #[must_use]
    pub fn composite(&self, tag: &TypeTag) -> Option<&CompositeDescriptor> {
        self.tables.composites.get(tag)
    }
}

/// Collects registrations before freezing them into a [`Registry`].
#[must_use]
pub struct RegistryBuilder {
    tables: Tables,
}

impl RegistryBuilder {
    fn install_conversion(mut self, tag: TypeTag, func: Conversion) -> Self {
        self.tables
            .names
            .entry(tag.name().to_owned())
            .or_insert_with(|| Annotation::of(tag.clone()));
        self.tables
            .conversions
            .insert(tag.clone(), Converter::new(&tag, func));
        self
    }

    /// Registers a conversion for `tag`, replacing any earlier one.
    ///
    /// Custom tags also become resolvable by name.
    pub fn conversion<F>(self, tag: TypeTag, func: F) -> Self
    where
        F: Fn(&str) -> Result<Value, String> + Send + Sync + 'static,
    {
        debug!(%tag, "registering conversion");
        self.install_conversion(tag, Arc::new(func))
    }

    /// Appends a validation for every parameter resolving to `tag`.
    pub fn validation<F>(mut self, tag: TypeTag, check: F) -> Self
    where
        F: Fn(&Value) -> Result<(), ValidationError> + Send + Sync + 'static,
    {
        debug!(%tag, "registering validation");
        self.tables
            .validations
            .entry(tag)
            .or_default()
            .push(Arc::new(check));
        self
    }

    /// Registers `T` as a composite under its short type name.
    pub fn composite<T>(self, options: CompositeOptions) -> Self
    where
        T: Parameters + Send + Sync + 'static,
    {
        self.composite_factory(
            TypeTag::custom(short_type_name::<T>()),
            CompositeDescriptor::of::<T>(options),
        )
    }

    /// Registers an arbitrary factory for parameters resolving to `tag`.
    pub fn composite_factory(mut self, tag: TypeTag, descriptor: CompositeDescriptor) -> Self {
        debug!(%tag, callable = descriptor.signature().name(), "registering composite");
        self.tables
            .names
            .entry(tag.name().to_owned())
            .or_insert_with(|| Annotation::of(tag.clone()));
        self.tables.composites.insert(tag, descriptor);
        self
    }

    /// Binds `name` to `annotation` in the type namespace.
    pub fn type_name(mut self, name: impl Into<String>, annotation: Annotation) -> Self {
        self.tables.names.insert(name.into(), annotation);
        self
    }

    /// Declares `name` as a distinct type backed by `base`.
    pub fn newtype(self, name: impl Into<String>, base: Annotation) -> Self {
        let type_name: String = name.into();
        let annotation = Annotation::new_type(type_name.clone(), base);
        self.type_name(type_name, annotation)
    }

    /// Freezes the registrations.
    pub fn build(self) -> Registry {
        Registry {
            tables: Arc::new(self.tables),
        }
    }
}

#[cfg(test)]
mod tests;
