//! Rendering context built from merged repository variables.

use tera::Context;

use pilot_core::Vars;

use crate::error::RenderError;

/// Convert merged [`Vars`] into a [`tera::Context`].
///
/// Every key becomes a top-level template variable.
pub fn to_tera_context(vars: &Vars) -> Result<Context, RenderError> {
    Context::from_serialize(vars).map_err(RenderError::from)
}
