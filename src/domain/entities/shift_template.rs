//! ShiftTemplate entity.

use std::collections::HashSet;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{ShiftClass, ShiftTemplateId, Skill};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShiftTemplate {
    pub id: ShiftTemplateId,
    pub name: String,
    pub class: ShiftClass,
    pub default_start: NaiveTime,
    pub default_end: NaiveTime,
    /// `>= 1`.
    pub default_headcount: u32,
    pub category: String,
    pub tags: HashSet<String>,
    pub required_skills: HashSet<Skill>,
    pub favorite: bool,
    /// Monotonically non-decreasing.
    pub usage_count: u64,
    pub active: bool,
}

impl ShiftTemplate {
    pub fn new(
        id: ShiftTemplateId,
        name: impl Into<String>,
        class: ShiftClass,
        default_start: NaiveTime,
        default_end: NaiveTime,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            class,
            default_start,
            default_end,
            default_headcount: 1,
            category: String::new(),
            tags: HashSet::new(),
            required_skills: HashSet::new(),
            favorite: false,
            usage_count: 0,
            active: true,
        }
    }

    pub fn record_usage(&mut self) {
        self.usage_count += 1;
    }
}
