use super::{Compendium, Migration, MigrationError};
use crate::{Actor, ActorType};

const OLD_STOUTNESS: &str = "mountain-s-stoutness";
const STOUTNESS: &str = "mountains-stoutness";
const TOUGHNESS: &str = "toughness";

/// Renames the misspelled Mountain's Stoutness slug and refreshes both it
/// and Toughness from the compendium, keeping where the feat was slotted.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToughnessMountainsStoutness;

impl Migration for ToughnessMountainsStoutness {
    fn version(&self) -> f64 {
        0.611
    }

    fn update_actor(
        &self,
        actor: &mut Actor,
        compendium: &dyn Compendium,
    ) -> Result<(), MigrationError> {
        if actor.actor_type != ActorType::Character {
            return Ok(());
        }

        for item in &mut actor.items {
            if item.item_type != "feat" {
                continue;
            }
            let slug = match item.slug() {
                Some(OLD_STOUTNESS | STOUTNESS) => STOUTNESS,
                Some(TOUGHNESS) => TOUGHNESS,
                _ => continue,
            };

            let mut replacement =
                compendium
                    .feat(slug)
                    .ok_or_else(|| MigrationError::MissingCompendiumEntry {
                        slug: slug.to_owned(),
                    })?;
            // The stored id stays so references to the feat keep resolving.
            replacement.id.clone_from(&item.id);
            match item.system.get("location") {
                Some(location) => replacement.system.set("location", location.clone()),
                None => {
                    replacement.system.delete("location");
                }
            }
            *item = replacement;
        }
        Ok(())
    }
}
