//! `REF(<addr>)` substitution.
//!
//! The referenced display value is pasted in as text, except when it is an
//! error token: then the reading cell fails with that same error instead of
//! carrying the token into later steps. So `REF(A1)+tail` with A1 showing
//! `#SELF-REF` shows `#SELF-REF`, not `#INVALID-FORMULA`.

use super::{EvalContext, substitute_invocations};
use crate::engine::cell_ref::CellRef;
use crate::engine::error::{ErrorKind, EvalResult};

const TRIGGER: &str = "REF(";

pub(super) fn parse(input: &str, ctx: &mut EvalContext<'_>) -> EvalResult<String> {
    substitute_invocations(input, TRIGGER, ErrorKind::InvalidCellReference, |inner| {
        let target = CellRef::parse(inner.trim())?;
        if target == ctx.origin() {
            return Err(ErrorKind::SelfReference);
        }
        let display = ctx.read(target)?;
        // A broken cell propagates its own error to every cell referencing it.
        match ErrorKind::from_token(display) {
            Some(kind) => Err(kind),
            None => Ok(display.to_string()),
        }
    })
}
