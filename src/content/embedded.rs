//! Knowledge files compiled into the binary.

use super::ContentKey;

/// Embedded text for `key`. File names mirror [`ContentKey::file_name`].
pub fn text(key: ContentKey) -> &'static str {
    match key {
        ContentKey::Intro => include_str!("../../knowledge/intro.md"),
        ContentKey::Overview => include_str!("../../knowledge/nvc-overview.md"),
        ContentKey::FourComponents => include_str!("../../knowledge/four-components.md"),
        ContentKey::Principles => include_str!("../../knowledge/principles.md"),
        ContentKey::Examples => include_str!("../../knowledge/examples.md"),
        ContentKey::Feelings => include_str!("../../knowledge/catalogs/feelings.yaml"),
        ContentKey::Needs => include_str!("../../knowledge/catalogs/needs.yaml"),
        ContentKey::TransformationGuide => {
            include_str!("../../knowledge/message-transformation-guide.md")
        }
        ContentKey::TrainerGuide => include_str!("../../knowledge/trainer-guide.md"),
        ContentKey::DiscourseGuide => include_str!("../../knowledge/political-discourse-guide.md"),
        ContentKey::DebateGuide => include_str!("../../knowledge/political-debate-guide.md"),
    }
}
