//! The catalogue of installed games.

use parlor_room::{Game, NamespaceHandle, spawn_namespace};
use serde::Serialize;

/// Starts a game's namespace actor under a route key with the given inbox size.
pub type Installer = fn(&str, usize) -> NamespaceHandle;

/// One installable game: the name people see, the namespace clients
/// address, and how to start it.
#[derive(Clone)]
pub struct GameDescriptor {
    pub display_name: String,
    pub route_key: String,
    pub install: Installer,
}

impl GameDescriptor {
    /// A descriptor that installs game `G`.
    pub fn of<G: Game>(display_name: impl Into<String>, route_key: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            route_key: route_key.into(),
            install: install::<G>,
        }
    }
}

impl std::fmt::Debug for GameDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameDescriptor")
            .field("display_name", &self.display_name)
            .field("route_key", &self.route_key)
            .finish_non_exhaustive()
    }
}

fn install<G: Game>(route_key: &str, buffer: usize) -> NamespaceHandle {
    spawn_namespace::<G>(route_key, buffer)
}

/// A listing entry for an external catalogue service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogueEntry {
    pub display_name: String,
    pub route_key: String,
}

/// Installed games in registration order.
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    games: Vec<GameDescriptor>,
}

impl Catalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chess, Escampe, Solitaire and Petit Bac.
    pub fn standard() -> Self {
        use parlor_games::{Chess, Escampe, PetitBac, Solitaire};

        let mut catalogue = Self::new();
        catalogue.register(GameDescriptor::of::<Chess>("Chess", "chess"));
        catalogue.register(GameDescriptor::of::<Escampe>("Escampe", "escampe"));
        catalogue.register(GameDescriptor::of::<Solitaire>("Solitaire", "solitaire"));
        catalogue.register(GameDescriptor::of::<PetitBac>("Petit Bac", "petitbac"));
        catalogue
    }

    /// Adds a game. A descriptor whose route key is already taken replaces
    /// the earlier one in place.
    pub fn register(&mut self, descriptor: GameDescriptor) {
        match self
            .games
            .iter_mut()
            .find(|g| g.route_key == descriptor.route_key)
        {
            Some(existing) => {
                tracing::warn!(route_key = %descriptor.route_key, "game registered twice, replacing");
                *existing = descriptor;
            }
            None => self.games.push(descriptor),
        }
    }

    pub fn get(&self, route_key: &str) -> Option<&GameDescriptor> {
        self.games.iter().find(|g| g.route_key == route_key)
    }

    pub fn list(&self) -> Vec<CatalogueEntry> {
        self.games
            .iter()
            .map(|g| CatalogueEntry {
                display_name: g.display_name.clone(),
                route_key: g.route_key.clone(),
            })
            .collect()
    }

    pub fn route_keys(&self) -> impl Iterator<Item = &str> {
        self.games.iter().map(|g| g.route_key.as_str())
    }

    pub fn descriptors(&self) -> &[GameDescriptor] {
        &self.games
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalogue_order() {
        let catalogue = Catalogue::standard();
        let keys: Vec<&str> = catalogue.route_keys().collect();
        assert_eq!(keys, ["chess", "escampe", "solitaire", "petitbac"]);
        assert_eq!(catalogue.get("petitbac").unwrap().display_name, "Petit Bac");
        assert!(catalogue.get("bataille").is_none());
    }

    #[test]
    fn test_register_same_key_replaces() {
        let mut catalogue = Catalogue::new();
        catalogue.register(GameDescriptor::of::<parlor_games::Chess>("Chess", "chess"));
        catalogue.register(GameDescriptor::of::<parlor_games::Chess>("Échecs", "chess"));
        assert_eq!(catalogue.len(), 1);
        assert_eq!(
            catalogue.list(),
            vec![CatalogueEntry {
                display_name: "Échecs".into(),
                route_key: "chess".into(),
            }]
        );
    }

    #[test]
    fn test_listing_json_shape() {
        let json = serde_json::to_value(Catalogue::standard().list()).unwrap();
        assert_eq!(json[1]["displayName"], "Escampe");
        assert_eq!(json[1]["routeKey"], "escampe");
    }
}
