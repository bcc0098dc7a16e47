//! Sibling ordering for cards and ports.
//!
//! Card names look like `<shelf>-<slot>` and port names like
//! `<shelf>-<slot>-<port>`; the last numeric token decides the position among
//! siblings. A name without that token cannot be placed, which fails the run.

use models::inventory::{InventoryEntity, InventoryKind};

use crate::prelude::ReportError;

pub const NAME_DELIMITER: char = '-';

/// Index of the positional token in a hyphen-split name, for kinds that have one.
pub fn token_position(kind: InventoryKind) -> Option<usize> {
    match kind {
        InventoryKind::Card => Some(1),
        InventoryKind::Port => Some(2),
        _ => None,
    }
}

/// Sort key of `entity` among its siblings.
///
/// Kinds without a positional token all share key `0`, so a stable sort keeps
/// them in fetch order.
///
/// # Errors
///
/// Returns [`ReportError::MalformedName`] if a card or port name has no
/// integer at its token position.
pub fn order_key(entity: &InventoryEntity) -> Result<i64, ReportError> {
    let Some(position) = token_position(entity.kind) else {
        return Ok(0);
    };

    entity
        .name
        .split(NAME_DELIMITER)
        .nth(position)
        .and_then(|token| token.trim().parse::<i64>().ok())
        .ok_or_else(|| ReportError::MalformedName {
            kind: entity.kind,
            name: entity.name.clone(),
        })
}

/// Returns `siblings` in ascending key order. Equal keys keep their input order.
pub fn sort_siblings<'a>(
    siblings: &[&'a InventoryEntity],
) -> Result<Vec<&'a InventoryEntity>, ReportError> {
    let mut keyed = siblings
        .iter()
        .map(|&sibling| order_key(sibling).map(|key| (key, sibling)))
        .collect::<Result<Vec<_>, _>>()?;

    keyed.sort_by_key(|(key, _)| *key);

    Ok(keyed.into_iter().map(|(_, sibling)| sibling).collect())
}
