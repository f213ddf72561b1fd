use shared::protocol::ControlSpec;

/// Collapsible presentation group.
///
/// Holds member names only. Members are owned by the registry, and removing
/// a member (or the group) does not touch the other side of the relation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Group {
    collapsed: bool,
    controls: Vec<String>,
}

impl Group {
    pub fn new(collapsed: bool) -> Self {
        Self {
            collapsed,
            controls: Vec::new(),
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn members(&self) -> &[String] {
        &self.controls
    }

    pub fn contains(&self, name: &str) -> bool {
        self.controls.iter().any(|member| member == name)
    }

    /// Returns `false` when `name` was already a member.
    pub(crate) fn add_member(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.controls.push(name.to_string());
        true
    }

    pub(crate) fn spec(&self) -> ControlSpec {
        ControlSpec::Group {
            collapsed: self.collapsed,
            controls: self.controls.clone(),
        }
    }
}
