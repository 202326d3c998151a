//! Draft-and-diff mutation of typed state.

use serde::Serialize;

use crate::{MutateError, Patch, PatchError, diff};

/// A new state revision plus the patch that produces it from the previous
/// one.
#[derive(Debug, Clone)]
pub struct Revision<S> {
    pub state: S,
    pub patch: Patch,
}

/// Runs `recipe` against a draft copy of `current`.
///
/// The recipe must be synchronous and either fully succeed or return an
/// error. On success the draft becomes the next revision and the patch
/// is computed by diffing the JSON shapes of both revisions. On error the
/// draft is dropped, so a half-applied mutation can never escape.
pub fn mutate<S, E, F>(current: &S, recipe: F) -> Result<Revision<S>, MutateError<E>>
where
    S: Clone + Serialize,
    F: FnOnce(&mut S) -> Result<(), E>,
{
    let mut draft = current.clone();
    recipe(&mut draft).map_err(MutateError::Rejected)?;

    let before = serde_json::to_value(current).map_err(PatchError::from)?;
    let after = serde_json::to_value(&draft).map_err(PatchError::from)?;

    Ok(Revision {
        patch: diff(&before, &after),
        state: draft,
    })
}
