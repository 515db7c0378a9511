//! Group ordering and membership of form instances.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::aggregate::flatten_display_order;
use crate::model::{FormInstance, GroupRole, InstanceId};

/// How instances are arranged into experimental-condition groups.
///
/// Reordering only rearranges ids; responses stay keyed by [`InstanceId`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyLayout {
    /// Group ids in display order.
    pub group_order: Vec<String>,
    /// Instance ids of each group, in display order.
    #[serde(default)]
    pub membership: HashMap<String, Vec<InstanceId>>,
    /// Role of each group; groups without an entry are `Normal`.
    #[serde(default)]
    pub roles: HashMap<String, GroupRole>,
}

impl StudyLayout {
    /// Append a group (no-op if it already exists, apart from updating its role).
    pub fn add_group(&mut self, id: &str, role: GroupRole) {
        if !self.group_order.iter().any(|g| g == id) {
            self.group_order.push(id.to_string());
        }
        self.membership.entry(id.to_string()).or_default();
        self.roles.insert(id.to_string(), role);
    }

    /// Append an instance to the end of a group, creating the group if needed.
    pub fn push_member(&mut self, group: &str, id: InstanceId) {
        if !self.group_order.iter().any(|g| g == group) {
            self.group_order.push(group.to_string());
        }
        self.membership.entry(group.to_string()).or_default().push(id);
    }

    pub fn role_of(&self, group: &str) -> GroupRole {
        self.roles.get(group).copied().unwrap_or_default()
    }

    /// Move the group at position `from` to position `to` (clamped).
    ///
    /// Returns `false` when `from` is out of range.
    pub fn move_group(&mut self, from: usize, to: usize) -> bool {
        move_item(&mut self.group_order, from, to)
    }

    /// Move an instance within its group. Returns `false` when the group or
    /// position does not exist.
    pub fn move_form(&mut self, group: &str, from: usize, to: usize) -> bool {
        match self.membership.get_mut(group) {
            Some(members) => move_item(members, from, to),
            None => false,
        }
    }

    /// Replace every occurrence of an id, used when identities are re-minted.
    pub fn rename_member(&mut self, old: InstanceId, new: InstanceId) {
        for members in self.membership.values_mut() {
            for id in members.iter_mut().filter(|id| **id == old) {
                *id = new;
            }
        }
    }

    /// Instances in display order: groups in `group_order`, members in stored order.
    pub fn display_order<'a>(&self, instances: &'a [FormInstance]) -> Vec<&'a FormInstance> {
        flatten_display_order(&self.group_order, &self.membership, instances)
    }
}

fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from >= items.len() {
        return false;
    }
    let item = items.remove(from);
    let to = to.min(items.len());
    items.insert(to, item);
    true
}
