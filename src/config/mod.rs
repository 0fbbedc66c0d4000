/// Resize behavior that an [`IndexConfig`] can select.
#[derive(PartialEq, Clone, Copy, Debug)]
pub enum ResizePolicy {
    /// `set`/`delete` resize automatically when the load factor crosses a
    /// threshold. This is the policy that keeps the table's load bounds
    /// intact and is what most callers want by default.
    Automatic,
    /// Never resize internally; `set` returns `Allocation` once
    /// `upper_limit` would be exceeded instead. Useful when a caller wants
    /// to pre-size a table once (via `init`) and bound its memory use for
    /// the table's lifetime.
    Manual,
}

impl Default for ResizePolicy {
    fn default() -> Self {
        ResizePolicy::Automatic
    }
}

/// Construction-time knobs for a [`crate::table::Table`].
#[derive(Default)]
pub struct IndexConfig {
    /// Capacity hint passed through `fit` at `init` time. `None` picks the
    /// ladder minimum.
    initial_capacity: Option<u32>,
    resize_policy: ResizePolicy,
}

impl IndexConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hint the initial capacity; actual capacity is `ladder::fit(n)`.
    pub fn with_initial_capacity(mut self, n: u32) -> Self {
        self.initial_capacity = Some(n);
        self
    }

    pub fn with_resize_policy(mut self, policy: ResizePolicy) -> Self {
        self.resize_policy = policy;
        self
    }

    #[inline(always)]
    pub fn initial_capacity(&self) -> u32 {
        self.initial_capacity.unwrap_or(crate::ladder::MIN_CAPACITY)
    }

    #[inline(always)]
    pub fn is_automatic(&self) -> bool {
        self.resize_policy == ResizePolicy::Automatic
    }
}
