use serde::{Deserialize, Serialize};

use crate::config::Schema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MapLevel {
    #[default]
    Village,
    AssemblyConstituency,
}

/// What one session is looking at. Owned by the session, never shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub level: MapLevel,
    /// Group by the editable dummy constituency instead of the official one.
    pub use_dummy: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self { level: MapLevel::Village, use_dummy: true }
    }
}

impl ViewState {
    /// Column driving constituency aggregation and dissolve.
    pub fn group_column<'a>(&self, schema: &'a Schema) -> &'a str {
        if self.use_dummy { &schema.dummy_ac } else { &schema.ac }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dummy_toggle_picks_group_column() {
        let schema = Schema::default();
        let mut state = ViewState::default();
        assert_eq!(state.group_column(&schema), "dummy_ac");
        state.use_dummy = false;
        assert_eq!(state.group_column(&schema), "AC_name");
    }
}
