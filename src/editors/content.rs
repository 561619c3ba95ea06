//! Site copy form.

use serde::Deserialize;

use crate::models::SiteContent;

/// The editable subset of the site copy. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteContentForm {
    pub hero_badge: Option<String>,
    pub hero_title: Option<String>,
    pub hero_description: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub contact_office: Option<String>,
    /// Version the form was loaded at. Stale saves are rejected.
    pub expected_version: Option<i64>,
}

impl SiteContentForm {
    /// Apply the submitted fields onto `content`.
    pub fn apply(&self, mut content: SiteContent) -> SiteContent {
        let fields = [
            (&self.hero_badge, &mut content.hero.badge),
            (&self.hero_title, &mut content.hero.title),
            (&self.hero_description, &mut content.hero.description),
            (&self.contact_phone, &mut content.contact.phone),
            (&self.contact_email, &mut content.contact.email),
            (&self.contact_office, &mut content.contact.office),
        ];
        for (value, target) in fields {
            if let Some(value) = value {
                *target = value.clone();
            }
        }
        content
    }
}
