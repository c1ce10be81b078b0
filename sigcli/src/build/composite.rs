//! Expansion of composite parameters and their post-parse collapse.

use serde::Serialize;
use tracing::trace;

use super::{BuildContext, Descriptor, ParamBuilder};
use crate::error::SigResult;
use crate::invocation::{Invocation, ValueMap};
use crate::options::{Grouped, Validation};
use crate::registry::CompositeDescriptor;
use crate::resolve::ResolvedType;
use crate::signature::TypeTag;

/// One composite parameter of a built command.
#[derive(Clone)]
pub(crate) struct CompositeSlot {
    name: String,
    type_tag: TypeTag,
    /// `(sub-parameter, value key)` pairs.
    fields: Vec<(String, String)>,
    validations: Grouped<Validation>,
    composite: CompositeDescriptor,
}

/// Serialisable view of a composite parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompositeSummary {
    /// Parameter receiving the constructed value.
    pub name: String,
    /// Registered composite type.
    pub type_tag: TypeTag,
    /// Value keys of the sub-parameters.
    pub fields: Vec<String>,
}

/// Builds the prefixed sub-parameter descriptors for `param`.
pub(crate) fn expand(
    parent: &ParamBuilder<'_>,
    ctx: &mut BuildContext,
    param: &str,
    resolved: &ResolvedType,
    composite: &CompositeDescriptor,
) -> SigResult<(Vec<Descriptor>, CompositeSlot)> {
    let options = composite.options();
    let builder = ParamBuilder {
        registry: parent.registry,
        options: options.params(),
        hooks: options.hooks(),
        prefix: Some(param),
        keep_underscores: parent.keep_underscores || options.params().keep_underscores,
    };
    let built = builder.build(composite.signature(), ctx)?;
    let fields = built
        .descriptors
        .iter()
        .map(|d| (d.param.clone(), d.name.clone()))
        .collect();
    trace!(
        parameter = param,
        composite = %resolved.match_key(),
        count = built.descriptors.len(),
        "expanded composite"
    );
    let slot = CompositeSlot {
        name: param.to_owned(),
        type_tag: resolved.match_key().clone(),
        fields,
        validations: built.validations,
        composite: composite.clone(),
    };
    Ok((built.descriptors, slot))
}

impl CompositeSlot {
    pub(crate) fn summary(&self) -> CompositeSummary {
        CompositeSummary {
            name: self.name.clone(),
            type_tag: self.type_tag.clone(),
            fields: self.fields.iter().map(|(_, key)| key.clone()).collect(),
        }
    }

    /// Replaces the prefixed entries in `values` with the constructed value.
    ///
    /// The composite's own conditionals and validations run against the
    /// un-prefixed values before the constructor is called.
    pub(crate) fn collapse(&self, values: &mut ValueMap) -> SigResult<()> {
        let mut own: ValueMap = self
            .fields
            .iter()
            .map(|(param, key)| (param.clone(), values.remove(key).unwrap_or_default()))
            .collect();
        let hooks = self.composite.options().hooks();
        hooks.run(&mut own)?;
        self.validations.validate(&own)?;
        let mut invocation = Invocation::new(own);
        let value = self.composite.construct(&mut invocation)?;
        trace!(parameter = %self.name, composite = %self.type_tag, "collapsed composite");
        values.insert(self.name.clone(), value);
        Ok(())
    }
}
