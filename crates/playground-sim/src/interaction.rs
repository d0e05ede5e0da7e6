//! Collision categories, the handler table and touch edge tracking.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ids::{AgentId, ElementId, Owner};

/// What a shape means to the interaction layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Agent,
    Contact,
    Activable,
    Zone,
    Gem,
    ActivableByGem,
    Trigger,
    /// Grasp halo around a part.
    Grasp,
    None,
}

/// Why a shape exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeRole {
    /// The entity's own body outline.
    Visible,
    /// Sensor halo widening the interaction reach.
    Interactive,
    /// Sensor halo used to pick up graspable entities.
    Grasp,
}

/// Registry entry for one collider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeTag {
    pub owner: Owner,
    pub role: ShapeRole,
    pub category: Category,
}

/// One handler per category pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    AgentContact,
    AgentActivable,
    AgentZone,
    GemActivable,
    TriggerActivable,
    ActivableActivable,
    Grasp,
}

/// Look up the handler for a pair of categories.
///
/// Returns the handler and whether the pair must be swapped so that the
/// first shape plays the left-hand role (agent, gem, trigger, grasper).
#[must_use]
pub fn handler_for(a: Category, b: Category) -> Option<(Handler, bool)> {
    use Category as C;
    let direct = |a, b| match (a, b) {
        (C::Agent, C::Contact) => Some(Handler::AgentContact),
        (C::Agent, C::Activable) => Some(Handler::AgentActivable),
        (C::Agent, C::Zone) => Some(Handler::AgentZone),
        (C::Gem, C::ActivableByGem) => Some(Handler::GemActivable),
        (C::Trigger, C::Activable) => Some(Handler::TriggerActivable),
        (C::Activable, C::Activable) => Some(Handler::ActivableActivable),
        (C::Grasp, other) if other != C::Grasp && other != C::Agent => Some(Handler::Grasp),
        _ => None,
    };
    direct(a, b)
        .map(|h| (h, false))
        .or_else(|| direct(b, a).map(|h| (h, true)))
}

/// How an activable element is set off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// On the first tick of contact.
    #[default]
    Touch,
    /// While in contact and the agent's command is active.
    Command(ActivationCommand),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationCommand {
    Activate,
    Eat,
}

/// Whatever sets off a touch trigger. All parts of an agent count as one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Toucher {
    Agent(AgentId),
    Element(ElementId),
}

impl Toucher {
    #[must_use]
    pub const fn from_owner(owner: Owner) -> Option<Self> {
        match owner {
            Owner::Element(id) => Some(Self::Element(id)),
            Owner::Part(agent, _) => Some(Self::Agent(agent)),
            Owner::Wall => None,
        }
    }
}

/// Pairs in contact, this tick and the previous one.
///
/// Touch triggers fire only for pairs absent from the previous tick.
#[derive(Debug, Default, Clone)]
pub struct TouchLedger {
    previous: BTreeSet<(Toucher, ElementId)>,
    current: BTreeSet<(Toucher, ElementId)>,
}

impl TouchLedger {
    pub fn begin_tick(&mut self) {
        self.previous = std::mem::take(&mut self.current);
    }

    /// Record contact. `true` when the contact starts this tick.
    pub fn touch(&mut self, toucher: Toucher, element: ElementId) -> bool {
        let key = (toucher, element);
        self.current.insert(key) && !self.previous.contains(&key)
    }

    /// Treat the pair as already touching, so the next contact is not an edge.
    pub fn suppress(&mut self, toucher: Toucher, element: ElementId) {
        self.current.insert((toucher, element));
    }

    pub fn clear(&mut self) {
        self.previous.clear();
        self.current.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn table_is_symmetric() {
        let cases = [
            (Category::Agent, Category::Contact, Handler::AgentContact),
            (Category::Agent, Category::Activable, Handler::AgentActivable),
            (Category::Agent, Category::Zone, Handler::AgentZone),
            (Category::Gem, Category::ActivableByGem, Handler::GemActivable),
            (Category::Trigger, Category::Activable, Handler::TriggerActivable),
        ];
        for (a, b, h) in cases {
            assert_eq!(handler_for(a, b), Some((h, false)));
            assert_eq!(handler_for(b, a), Some((h, true)));
        }
        assert_eq!(
            handler_for(Category::Activable, Category::Activable),
            Some((Handler::ActivableActivable, false))
        );
    }

    #[test]
    fn unrelated_categories_have_no_handler() {
        assert_eq!(handler_for(Category::Agent, Category::Agent), None);
        assert_eq!(handler_for(Category::None, Category::Zone), None);
        assert_eq!(handler_for(Category::Gem, Category::Activable), None);
        assert_eq!(handler_for(Category::Grasp, Category::Agent), None);
        assert_eq!(handler_for(Category::Grasp, Category::Grasp), None);
    }

    #[test]
    fn grasp_halo_meets_any_element_category() {
        assert_eq!(
            handler_for(Category::Gem, Category::Grasp),
            Some((Handler::Grasp, true))
        );
        assert_eq!(
            handler_for(Category::Grasp, Category::None),
            Some((Handler::Grasp, false))
        );
    }

    #[test]
    fn touch_is_edge_triggered() {
        let mut ids = SlotMap::<ElementId, ()>::with_key();
        let e = ids.insert(());
        let t = Toucher::Element(ids.insert(()));
        let mut ledger = TouchLedger::default();

        assert!(ledger.touch(t, e));
        assert!(!ledger.touch(t, e), "second sub-step same tick");
        ledger.begin_tick();
        assert!(!ledger.touch(t, e), "still touching");
        ledger.begin_tick();
        ledger.begin_tick();
        assert!(ledger.touch(t, e), "after a tick apart");
    }

    #[test]
    fn parts_of_one_agent_share_a_toucher() {
        let mut agents = SlotMap::<AgentId, ()>::with_key();
        let a = agents.insert(());
        assert_eq!(
            Toucher::from_owner(Owner::Part(a, 0)),
            Toucher::from_owner(Owner::Part(a, 3))
        );
        assert_eq!(Toucher::from_owner(Owner::Wall), None);
    }

    #[test]
    fn suppressed_pair_does_not_fire_next_tick() {
        let mut ids = SlotMap::<ElementId, ()>::with_key();
        let e = ids.insert(());
        let t = Toucher::Element(ids.insert(()));
        let mut ledger = TouchLedger::default();
        ledger.suppress(t, e);
        ledger.begin_tick();
        assert!(!ledger.touch(t, e));
    }
}
