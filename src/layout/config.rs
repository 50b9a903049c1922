//! Configuration for the layout engine

/// Upper bound on [`LayoutConfig::rounds_per_person`]
pub const MAX_ROUNDS_PER_PERSON: usize = 100;

/// Configuration options for layout computation
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Horizontal distance between two adjacent grid columns
    pub column_width: f64,

    /// Vertical distance between two generation rows
    pub row_height: f64,

    /// Size of a person's box (width, height)
    pub node_size: (f64, f64),

    /// Requested offset of each partner from the couple's shared center, in
    /// columns. Widened when partners' boxes would otherwise overlap, see
    /// [`LayoutConfig::spouse_gap`].
    pub spouse_offset: f64,

    /// Distance of the union bar below the partners' boxes
    pub union_bar_offset: f64,

    /// Propagation rounds allowed per person before the solver gives up
    pub rounds_per_person: usize,

    /// Hang a single-parent child from that parent's only child-bearing couple
    pub adopt_single_parent_children: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            column_width: 160.0,
            row_height: 120.0,
            node_size: (128.0, 48.0),
            spouse_offset: 0.5,
            union_bar_offset: 16.0,
            rounds_per_person: 10,
            adopt_single_parent_children: false,
        }
    }
}

impl LayoutConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the grid cell size
    pub fn with_cell_size(mut self, column_width: f64, row_height: f64) -> Self {
        self.column_width = column_width;
        self.row_height = row_height;
        self
    }

    /// Set the person box size
    pub fn with_node_size(mut self, width: f64, height: f64) -> Self {
        self.node_size = (width, height);
        self
    }

    /// Set the partner offset from the couple center (clamped to `0.05..=0.5`)
    pub fn with_spouse_offset(mut self, offset: f64) -> Self {
        self.spouse_offset = offset.clamp(0.05, 0.5);
        self
    }

    /// Set the union bar offset below the partners
    pub fn with_union_bar_offset(mut self, offset: f64) -> Self {
        self.union_bar_offset = offset;
        self
    }

    /// Set the propagation round budget per person (clamped to
    /// `1..=MAX_ROUNDS_PER_PERSON`)
    pub fn with_rounds_per_person(mut self, rounds: usize) -> Self {
        self.rounds_per_person = rounds.clamp(1, MAX_ROUNDS_PER_PERSON);
        self
    }

    /// Enable or disable hanging single-parent children from a couple
    pub fn with_adopt_single_parent_children(mut self, adopt: bool) -> Self {
        self.adopt_single_parent_children = adopt;
        self
    }

    /// Column distance between two partners: twice the spouse offset, but
    /// never less than one box width and never more than one column
    pub fn spouse_gap(&self) -> f64 {
        let box_width = self.node_size.0 / self.column_width;
        (2.0 * self.spouse_offset).max(box_width).min(1.0)
    }

    /// Offset of each partner from the couple's shared center, in columns
    pub fn partner_offset(&self) -> f64 {
        self.spouse_gap() / 2.0
    }

    /// Smallest column distance allowed between two nodes of one row
    pub fn min_separation(&self) -> f64 {
        self.spouse_gap()
    }

    /// Propagation round cap for a family of `people` members
    pub fn max_rounds(&self, people: usize) -> usize {
        self.rounds_per_person
            .min(MAX_ROUNDS_PER_PERSON)
            .saturating_mul(people)
            .max(1)
    }
}
