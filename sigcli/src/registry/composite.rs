//! Registered composite types and their constructors.

use std::fmt;
use std::sync::Arc;

use crate::error::SigResult;
use crate::invocation::Invocation;
use crate::options::CompositeOptions;
use crate::signature::{Parameters, Signature};
use crate::value::Value;

/// Builds a composite value from its un-prefixed sub-parameter values.
pub type Constructor = Arc<dyn Fn(&mut Invocation) -> SigResult<Value> + Send + Sync>;

/// A type whose value is assembled from several command-line parameters.
///
/// Registered once, then shared read-only by every command that uses it.
#[derive(Clone)]
pub struct CompositeDescriptor {
    signature: Signature,
    constructor: Constructor,
    options: CompositeOptions,
}

impl CompositeDescriptor {
    /// Composite built by `constructor` from the parameters in `signature`.
    #[must_use]
    pub fn new<F>(signature: Signature, options: CompositeOptions, constructor: F) -> Self
    where
        F: Fn(&mut Invocation) -> SigResult<Value> + Send + Sync + 'static,
    {
        Self {
            signature,
            constructor: Arc::new(constructor),
            options,
        }
    }

    /// Composite for a struct deriving [`Parameters`].
    #[must_use]
    pub fn of<T>(options: CompositeOptions) -> Self
    where
        T: Parameters + Send + Sync + 'static,
    {
        Self::new(T::signature(), options, |invocation| {
            T::from_invocation(invocation).map(Value::object)
        })
    }

    /// Parameters expanded into the owning command.
    #[must_use]
    pub const fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Options supplied at registration.
    #[must_use]
    pub const fn options(&self) -> &CompositeOptions {
        &self.options
    }

    pub(crate) fn construct(&self, invocation: &mut Invocation) -> SigResult<Value> {
        (self.constructor)(invocation)
    }
}

impl fmt::Debug for CompositeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeDescriptor")
            .field("signature", &self.signature.name())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
