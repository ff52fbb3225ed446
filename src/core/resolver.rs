/// Role variant merging. Turns authored event data into a concrete payload.

use crate::schema::event::{EventTemplate, ResolvedEvent};
use crate::schema::role::Role;

/// Merge the variant for `role` onto a copy of `event`.
///
/// A variant description replaces the base description. Variant options
/// merge per key: supplied fields (`text`, `effect`) win, omitted fields
/// keep the base value, and base options the variant does not mention pass
/// through unchanged. Without a variant for `role` the copy is returned as-is.
pub fn apply_role_variant(event: &EventTemplate, role: Role) -> ResolvedEvent {
    let mut resolved = ResolvedEvent::from(event);
    let Some(variant) = event.variants.get(&role) else {
        return resolved;
    };

    if let Some(description) = &variant.description {
        resolved.description = description.clone();
    }

    for (key, patch) in &variant.options {
        let option = resolved.options.entry(key.clone()).or_default();
        if let Some(text) = &patch.text {
            option.text = text.clone();
        }
        if let Some(effect) = patch.effect {
            option.effect = effect;
        }
    }

    resolved
}
