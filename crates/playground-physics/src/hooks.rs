use rapier2d::prelude::{PairFilterContext, PhysicsHooks, SolverFlags};

/// Drops contacts between colliders that carry the same non-zero group in
/// their `user_data`. Parts of one agent share a group and never collide.
#[derive(Debug, Default, Clone, Copy)]
pub struct SameGroupFilter;

impl PhysicsHooks for SameGroupFilter {
    fn filter_contact_pair(&self, context: &PairFilterContext) -> Option<SolverFlags> {
        let g1 = context.colliders[context.collider1].user_data;
        let g2 = context.colliders[context.collider2].user_data;
        if g1 != 0 && g1 == g2 {
            None
        } else {
            Some(SolverFlags::COMPUTE_IMPULSES)
        }
    }
}
