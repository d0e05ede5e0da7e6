use slotmap::new_key_type;

new_key_type! {
    /// Handle to a scene element. Never reused after the element is destroyed.
    pub struct ElementId;
    /// Handle to an agent.
    pub struct AgentId;
}

/// Whatever owns a collider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Owner {
    Element(ElementId),
    /// Agent and part index.
    Part(AgentId, usize),
    Wall,
}

impl Owner {
    #[must_use]
    pub const fn agent(&self) -> Option<AgentId> {
        match self {
            Self::Part(agent, _) => Some(*agent),
            _ => None,
        }
    }

    #[must_use]
    pub const fn element(&self) -> Option<ElementId> {
        match self {
            Self::Element(id) => Some(*id),
            _ => None,
        }
    }
}
