//! Testimonial model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Author role attached to a testimonial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestimonialRole {
    Student,
    Teacher,
    Parent,
}

impl TestimonialRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestimonialRole::Student => "student",
            TestimonialRole::Teacher => "teacher",
            TestimonialRole::Parent => "parent",
        }
    }
}

impl FromStr for TestimonialRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(TestimonialRole::Student),
            "teacher" => Ok(TestimonialRole::Teacher),
            "parent" => Ok(TestimonialRole::Parent),
            other => Err(anyhow::anyhow!("unknown testimonial role: {}", other)),
        }
    }
}

/// Testimonial entity
#[derive(Debug, Clone, Serialize)]
pub struct Testimonial {
    pub id: Uuid,
    pub name: String,
    pub content: String,
    pub role: TestimonialRole,
    pub is_visible: bool,
    pub created_at: DateTime<Utc>,
}

/// New testimonial payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewTestimonial {
    pub name: String,
    pub content: String,
    pub role: TestimonialRole,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
}

fn default_visible() -> bool {
    true
}

/// Testimonial update payload
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateTestimonial {
    pub name: Option<String>,
    pub content: Option<String>,
    pub role: Option<TestimonialRole>,
    pub is_visible: Option<bool>,
}

impl UpdateTestimonial {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.content.is_none()
            && self.role.is_none()
            && self.is_visible.is_none()
    }
}
