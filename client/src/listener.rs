use std::sync::Arc;

use wildlink_types::{AvatarCatalog, PlayerAvatar, StarterSpecies};

/// Hooks for choices made during bootstrap. Returning `None` defers to the
/// next listener, and to a random choice after the last one.
pub trait BootstrapListener: Send + Sync {
    fn select_avatar(&self, _catalog: &AvatarCatalog) -> Option<PlayerAvatar> {
        None
    }

    fn select_starter(&self) -> Option<StarterSpecies> {
        None
    }

    /// Propose a codename. `last_failure` is the previous rejected attempt.
    fn claim_name(&self, _last_failure: Option<&str>) -> Option<String> {
        None
    }
}

/// Listeners consulted in registration order.
#[derive(Clone, Default)]
pub struct Listeners {
    listeners: Vec<Arc<dyn BootstrapListener>>,
}

impl Listeners {
    pub fn register(&mut self, listener: Arc<dyn BootstrapListener>) {
        self.listeners.push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn avatar(&self, catalog: &AvatarCatalog) -> Option<PlayerAvatar> {
        self.listeners
            .iter()
            .find_map(|listener| listener.select_avatar(catalog))
    }

    pub fn starter(&self) -> Option<StarterSpecies> {
        self.listeners
            .iter()
            .find_map(|listener| listener.select_starter())
    }

    pub fn codename(&self, last_failure: Option<&str>) -> Option<String> {
        self.listeners
            .iter()
            .find_map(|listener| listener.claim_name(last_failure))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Silent;

    impl BootstrapListener for Silent {}

    struct Squirtles;

    impl BootstrapListener for Squirtles {
        fn select_starter(&self) -> Option<StarterSpecies> {
            Some(StarterSpecies::Squirtle)
        }

        fn claim_name(&self, last_failure: Option<&str>) -> Option<String> {
            Some(match last_failure {
                Some(previous) => format!("{previous}x"),
                None => "Gary".to_string(),
            })
        }
    }

    #[test]
    fn test_first_answer_wins() {
        let mut listeners = Listeners::default();
        assert_eq!(listeners.starter(), None);

        listeners.register(Arc::new(Silent));
        listeners.register(Arc::new(Squirtles));
        assert_eq!(listeners.len(), 2);
        assert_eq!(listeners.starter(), Some(StarterSpecies::Squirtle));
        assert_eq!(listeners.codename(None).as_deref(), Some("Gary"));
        assert_eq!(listeners.codename(Some("Gary")).as_deref(), Some("Garyx"));
        assert_eq!(listeners.avatar(&AvatarCatalog::default()), None);
    }
}
