/// A transition `(o_t, a_t, r_t, done_t, o_t+1)`.
///
/// `next_state` is `None` for the last transition of an episode. Transitions with
/// `is_done == true` are never bootstrapped past, whatever `next_state` holds.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition<O, A> {
    /// Observation `o_t`.
    pub state: O,

    /// Action `a_t`.
    pub act: A,

    /// Reward `r_t`.
    pub reward: f32,

    /// Flag denoting if the episode ended with this transition.
    pub is_done: bool,

    /// Observation `o_t+1`.
    pub next_state: Option<O>,
}

impl<O, A> Transition<O, A> {
    /// Constructs a transition.
    pub fn new(state: O, act: A, reward: f32, is_done: bool, next_state: Option<O>) -> Self {
        Self {
            state,
            act,
            reward,
            is_done,
            next_state,
        }
    }
}
