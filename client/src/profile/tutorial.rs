use std::collections::BTreeSet;

use wildlink_types::Milestone;

/// Milestones the server has confirmed for this account.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TutorialProgress {
    completed: BTreeSet<Milestone>,
}

impl TutorialProgress {
    pub fn from_states(states: &[Milestone]) -> Self {
        Self {
            completed: states.iter().copied().collect(),
        }
    }

    /// Record `milestone`. Returns false if it was already recorded.
    pub fn mark(&mut self, milestone: Milestone) -> bool {
        self.completed.insert(milestone)
    }

    pub fn is_complete(&self, milestone: Milestone) -> bool {
        self.completed.contains(&milestone)
    }

    pub fn completed(&self) -> impl Iterator<Item = Milestone> + '_ {
        self.completed.iter().copied()
    }

    /// First bootstrap milestone not yet reached.
    pub fn next_bootstrap_step(&self) -> Option<Milestone> {
        Milestone::BOOTSTRAP_ORDER
            .into_iter()
            .find(|milestone| !self.is_complete(*milestone))
    }

    pub fn is_bootstrapped(&self) -> bool {
        self.next_bootstrap_step().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_is_idempotent() {
        let mut progress = TutorialProgress::default();
        assert!(progress.mark(Milestone::LegalScreen));
        assert!(!progress.mark(Milestone::LegalScreen));
        assert_eq!(progress.completed().count(), 1);
    }

    #[test]
    fn test_next_bootstrap_step() {
        let mut progress = TutorialProgress::from_states(&[
            Milestone::LegalScreen,
            Milestone::PokemonCapture,
            Milestone::GymTutorial,
        ]);
        assert_eq!(
            progress.next_bootstrap_step(),
            Some(Milestone::AvatarSelection)
        );
        progress.mark(Milestone::AvatarSelection);
        assert_eq!(progress.next_bootstrap_step(), Some(Milestone::NameSelection));
        progress.mark(Milestone::NameSelection);
        progress.mark(Milestone::FirstTimeExperienceComplete);
        assert!(progress.is_bootstrapped());
    }
}
